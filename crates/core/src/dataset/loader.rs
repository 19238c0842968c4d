use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use tracing::debug;

use super::DatasetError;
use crate::product::Product;

/// Read a JSON array of products, keeping array order.
pub fn load_products(path: &Path) -> Result<Vec<Product>, DatasetError> {
    let file = File::open(path).map_err(|source| DatasetError::Io {
        path: path.display().to_string(),
        source,
    })?;

    let products: Vec<Product> =
        serde_json::from_reader(BufReader::new(file)).map_err(|source| DatasetError::Parse {
            path: path.display().to_string(),
            source,
        })?;

    debug!("Loaded {} products from {}", products.len(), path.display());
    Ok(products)
}

/// Parse products from an in-memory JSON array.
pub fn parse_products(json: &str) -> Result<Vec<Product>, DatasetError> {
    serde_json::from_str(json).map_err(|source| DatasetError::Parse {
        path: "<memory>".to_string(),
        source,
    })
}
