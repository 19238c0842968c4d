//! Food product records as stored in the dataset files.

mod types;

pub use types::*;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProductError {
    /// Ingredient ids are taxonomy-namespaced (`en:salt`); this one has no prefix.
    #[error("Ingredient id {0:?} has no namespace prefix")]
    MissingNamespace(String),
}
