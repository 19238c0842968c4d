//! Mock product database for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::product_opener::{ProductDatabase, ProductOpenerError, RemoteIngredient, RemoteProduct};

/// A recorded remote call for test assertions.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedCall {
    SubmitIngredients {
        code: String,
        ingredients_text: String,
    },
    FetchProduct {
        code: String,
    },
}

/// Mock implementation of the ProductDatabase trait.
///
/// Behaves like a tiny Product Opener: `fetch_product` answers with the
/// estimates registered for the most recently submitted ingredients text,
/// falling back to the default estimates.
///
/// - Register estimates per ingredients text or as a default
/// - Track calls for assertions
/// - Fail a chosen submit or fetch call
#[derive(Debug, Clone)]
pub struct MockProductDatabase {
    /// Estimates keyed by submitted ingredients text.
    estimates_by_text: Arc<RwLock<HashMap<String, Vec<RemoteIngredient>>>>,
    /// Estimates returned when the submitted text has no entry.
    default_estimates: Arc<RwLock<Vec<RemoteIngredient>>>,
    /// Last ingredients text submitted, per product code.
    submitted: Arc<RwLock<HashMap<String, String>>>,
    /// Recorded calls.
    calls: Arc<RwLock<Vec<RecordedCall>>>,
    /// If set, the next submit fails with this error.
    submit_error: Arc<RwLock<Option<ProductOpenerError>>>,
    /// Fetch failures keyed by zero-based fetch call index.
    fetch_errors: Arc<RwLock<HashMap<usize, ProductOpenerError>>>,
    /// Number of fetch calls seen so far.
    fetch_count: Arc<RwLock<usize>>,
}

impl Default for MockProductDatabase {
    fn default() -> Self {
        Self::new()
    }
}

impl MockProductDatabase {
    /// Create a mock that returns no estimates.
    pub fn new() -> Self {
        Self {
            estimates_by_text: Arc::new(RwLock::new(HashMap::new())),
            default_estimates: Arc::new(RwLock::new(Vec::new())),
            submitted: Arc::new(RwLock::new(HashMap::new())),
            calls: Arc::new(RwLock::new(Vec::new())),
            submit_error: Arc::new(RwLock::new(None)),
            fetch_errors: Arc::new(RwLock::new(HashMap::new())),
            fetch_count: Arc::new(RwLock::new(0)),
        }
    }

    // =========================================================================
    // Response Configuration
    // =========================================================================

    /// Set the estimates returned when no per-text entry matches.
    pub async fn set_estimates(&self, estimates: Vec<RemoteIngredient>) {
        *self.default_estimates.write().await = estimates;
    }

    /// Set the estimates returned after `ingredients_text` was submitted.
    pub async fn set_estimates_for(&self, ingredients_text: &str, estimates: Vec<RemoteIngredient>) {
        self.estimates_by_text
            .write()
            .await
            .insert(ingredients_text.to_string(), estimates);
    }

    // =========================================================================
    // Call Recording
    // =========================================================================

    /// Get all recorded calls.
    pub async fn recorded_calls(&self) -> Vec<RecordedCall> {
        self.calls.read().await.clone()
    }

    /// Ingredients texts submitted so far, in order.
    pub async fn submitted_texts(&self) -> Vec<String> {
        self.calls
            .read()
            .await
            .iter()
            .filter_map(|call| match call {
                RecordedCall::SubmitIngredients {
                    ingredients_text, ..
                } => Some(ingredients_text.clone()),
                RecordedCall::FetchProduct { .. } => None,
            })
            .collect()
    }

    // =========================================================================
    // Error Injection
    // =========================================================================

    /// Configure the next submit to fail with the given error.
    pub async fn fail_submit(&self, error: ProductOpenerError) {
        *self.submit_error.write().await = Some(error);
    }

    /// Configure the next fetch to fail with the given error.
    pub async fn fail_fetch(&self, error: ProductOpenerError) {
        let next = *self.fetch_count.read().await;
        self.fail_fetch_at(next, error).await;
    }

    /// Configure the fetch with zero-based index `call` to fail.
    pub async fn fail_fetch_at(&self, call: usize, error: ProductOpenerError) {
        self.fetch_errors.write().await.insert(call, error);
    }

    async fn record(&self, call: RecordedCall) {
        self.calls.write().await.push(call);
    }
}

#[async_trait]
impl ProductDatabase for MockProductDatabase {
    async fn submit_ingredients(
        &self,
        code: &str,
        ingredients_text: &str,
    ) -> Result<(), ProductOpenerError> {
        self.record(RecordedCall::SubmitIngredients {
            code: code.to_string(),
            ingredients_text: ingredients_text.to_string(),
        })
        .await;

        if let Some(err) = self.submit_error.write().await.take() {
            return Err(err);
        }

        self.submitted
            .write()
            .await
            .insert(code.to_string(), ingredients_text.to_string());
        Ok(())
    }

    async fn fetch_product(&self, code: &str) -> Result<RemoteProduct, ProductOpenerError> {
        self.record(RecordedCall::FetchProduct {
            code: code.to_string(),
        })
        .await;

        let call = {
            let mut count = self.fetch_count.write().await;
            let call = *count;
            *count += 1;
            call
        };
        if let Some(err) = self.fetch_errors.write().await.remove(&call) {
            return Err(err);
        }

        let submitted = self.submitted.read().await.get(code).cloned();
        let Some(text) = submitted else {
            return Err(ProductOpenerError::Status {
                url: format!("mock://api/v2/product/{}", code),
                status: 404,
                body: r#"{"status":0,"status_verbose":"product not found"}"#.to_string(),
            });
        };

        let ingredients = match self.estimates_by_text.read().await.get(&text) {
            Some(estimates) => estimates.clone(),
            None => self.default_estimates.read().await.clone(),
        };
        Ok(RemoteProduct { ingredients })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fetch_before_submit_is_not_found() {
        let database = MockProductDatabase::new();
        let err = database.fetch_product("1337").await.unwrap_err();
        assert!(matches!(err, ProductOpenerError::Status { status: 404, .. }));
    }

    #[tokio::test]
    async fn test_fetch_uses_per_text_estimates() {
        let database = MockProductDatabase::new();
        database
            .set_estimates(vec![RemoteIngredient::new("en:water", 100.0)])
            .await;
        database
            .set_estimates_for("salt", vec![RemoteIngredient::new("en:salt", 100.0)])
            .await;

        database.submit_ingredients("1337", "salt").await.unwrap();
        let product = database.fetch_product("1337").await.unwrap();
        assert_eq!(product.ingredients[0].id.as_deref(), Some("en:salt"));

        database.submit_ingredients("1337", "water").await.unwrap();
        let product = database.fetch_product("1337").await.unwrap();
        assert_eq!(product.ingredients[0].id.as_deref(), Some("en:water"));

        assert_eq!(database.submitted_texts().await, vec!["salt", "water"]);
    }

    #[tokio::test]
    async fn test_fail_fetch_at_only_fails_that_call() {
        let database = MockProductDatabase::new();
        database
            .fail_fetch_at(1, ProductOpenerError::UnexpectedShape("second".to_string()))
            .await;
        database.submit_ingredients("1337", "salt").await.unwrap();

        assert!(database.fetch_product("1337").await.is_ok());
        assert!(database.fetch_product("1337").await.is_err());
        assert!(database.fetch_product("1337").await.is_ok());
    }

    #[tokio::test]
    async fn test_fail_submit_is_consumed() {
        let database = MockProductDatabase::new();
        database
            .fail_submit(ProductOpenerError::UnexpectedShape("once".to_string()))
            .await;

        assert!(database.submit_ingredients("1337", "salt").await.is_err());
        assert!(database.submit_ingredients("1337", "salt").await.is_ok());
        assert_eq!(database.recorded_calls().await.len(), 2);
    }
}
