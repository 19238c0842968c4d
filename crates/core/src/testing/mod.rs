//! Testing utilities and mock implementations.
//!
//! `MockProductDatabase` stands in for Product Opener so the enrichment
//! pipeline can be exercised without network access.
//!
//! # Example
//!
//! ```rust,ignore
//! use percentages_core::testing::{fixtures, MockProductDatabase};
//! use percentages_core::{Enricher, RemoteIngredient};
//!
//! let database = MockProductDatabase::new();
//! database.set_estimates(vec![RemoteIngredient::new("en:salt", 12.5)]).await;
//!
//! let enricher = Enricher::new(database);
//! let mut product = fixtures::product("Crisps", &["en:salt"]);
//! enricher.enrich(&mut product).await?;
//! ```

mod mock_product_database;

pub use mock_product_database::{MockProductDatabase, RecordedCall};

/// Test fixtures and helper functions.
pub mod fixtures {
    use crate::product::{Ingredient, Product};

    /// An ingredient with the given id and percent, zero mass and rank.
    pub fn ingredient(id: &str, percent: f64) -> Ingredient {
        Ingredient {
            mass: 0.0,
            id: id.to_string(),
            percent,
            rank: 0,
        }
    }

    /// A product whose ingredients are ranked in the given order, percent 0.
    pub fn product(name: &str, ingredient_ids: &[&str]) -> Product {
        Product {
            product_name: name.to_string(),
            ingredients: Some(
                ingredient_ids
                    .iter()
                    .enumerate()
                    .map(|(index, id)| Ingredient {
                        rank: index as i64 + 1,
                        ..ingredient(id, 0.0)
                    })
                    .collect(),
            ),
            nutriments: None,
            impacts: None,
            categories_tags: None,
        }
    }
}
