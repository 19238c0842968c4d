//! Product Opener (openfoodfacts.net) integration.
//!
//! The remote service is used as a calculator: a scratch product is written
//! with an ingredient list, then read back with the ingredient percentage
//! estimates the server computed for it.

mod client;
mod types;

pub use client::{ProductOpenerClient, DEFAULT_BASE_URL};
pub use types::*;

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur when talking to Product Opener.
#[derive(Debug, Error)]
pub enum ProductOpenerError {
    /// Transport failure (DNS, connect, TLS, body read).
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Anything other than 200 OK. The body is kept for diagnosis.
    #[error("{url} got response status {status}\n{body}")]
    Status {
        url: String,
        status: u16,
        body: String,
    },

    /// The response decoded but lacked the fields we read.
    #[error("Unexpected response shape: {0}")]
    UnexpectedShape(String),
}

/// Remote product database able to estimate ingredient percentages.
#[async_trait]
pub trait ProductDatabase: Send + Sync {
    /// Create or update product `code` with the given comma separated ingredients.
    async fn submit_ingredients(
        &self,
        code: &str,
        ingredients_text: &str,
    ) -> Result<(), ProductOpenerError>;

    /// Fetch product `code`, including per-ingredient percentage estimates.
    async fn fetch_product(&self, code: &str) -> Result<RemoteProduct, ProductOpenerError>;
}
