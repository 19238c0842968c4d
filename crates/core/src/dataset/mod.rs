//! Reading the input dataset and streaming enriched records back out.

mod encoder;
mod loader;
mod writer;

pub use encoder::encode_record;
pub use loader::{load_products, parse_products};
pub use writer::{OutputFraming, RecordWriter, ARRAY_OPENER, RECORD_SEPARATOR};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("Failed to open {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse products from {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to encode product: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("Failed to write output: {0}")]
    Write(#[source] std::io::Error),
}
