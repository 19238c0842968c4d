use serde::{Deserialize, Serialize};

use super::ProductOpenerError;

/// Envelope of `GET /api/v2/product/{code}`. Only the parts we read are typed.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductResponse {
    pub product: RemoteProduct,
}

/// Product as returned by Product Opener.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RemoteProduct {
    pub ingredients: Vec<RemoteIngredient>,
}

/// One ingredient of the remote product with its computed share.
///
/// Both fields may be absent or `null`; they are only required once the
/// entry is compared against (`id`) or merged into (`percent_estimate`) a
/// local ingredient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteIngredient {
    /// Namespaced id, e.g. `en:salt`.
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub percent_estimate: Option<f64>,
}

impl RemoteIngredient {
    pub fn new(id: impl Into<String>, percent_estimate: f64) -> Self {
        Self {
            id: Some(id.into()),
            percent_estimate: Some(percent_estimate),
        }
    }
}

impl ProductResponse {
    /// Decode a response body. A missing or mistyped field is an error,
    /// never a silently skipped ingredient.
    pub fn parse(body: &str) -> Result<Self, ProductOpenerError> {
        serde_json::from_str(body).map_err(|e| {
            ProductOpenerError::UnexpectedShape(format!("Failed to parse product response: {}", e))
        })
    }
}
