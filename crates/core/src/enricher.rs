//! Per-record percentage enrichment.
//!
//! Each product's ingredient list is written to a scratch product on Product
//! Opener, the product is read back, and the server's `percent_estimate` for
//! every ingredient is copied onto the matching local ingredient.

use thiserror::Error;
use tracing::debug;

use crate::product::{Ingredient, Product, ProductError};
use crate::product_opener::{ProductDatabase, ProductOpenerError, RemoteIngredient};

/// Code of the throwaway product every record is round-tripped through.
pub const PLACEHOLDER_CODE: &str = "1337";

#[derive(Debug, Error)]
pub enum EnrichError {
    #[error(transparent)]
    Product(#[from] ProductError),

    #[error(transparent)]
    Remote(#[from] ProductOpenerError),
}

/// What one enrichment changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EnrichOutcome {
    /// Entries in the remote ingredient list.
    pub remote_ingredients: usize,
    /// Percent overwrites applied to local ingredients.
    pub updated: usize,
}

/// Obtains percentage estimates for products from a [`ProductDatabase`].
pub struct Enricher<D: ProductDatabase> {
    database: D,
}

impl<D: ProductDatabase> Enricher<D> {
    pub fn new(database: D) -> Self {
        Self { database }
    }

    pub fn database(&self) -> &D {
        &self.database
    }

    /// Round-trip `product` through the remote database and merge the estimates in.
    ///
    /// The product is only modified once both remote calls have succeeded.
    pub async fn enrich(&self, product: &mut Product) -> Result<EnrichOutcome, EnrichError> {
        let ingredients_text = product.ingredients_text()?;

        self.database
            .submit_ingredients(PLACEHOLDER_CODE, &ingredients_text)
            .await?;
        let remote = self.database.fetch_product(PLACEHOLDER_CODE).await?;

        let updated = merge_percent_estimates(product.ingredients_mut(), &remote.ingredients)?;
        debug!(
            "Enriched '{}': {} of {} remote estimates applied",
            product.product_name,
            updated,
            remote.ingredients.len()
        );

        Ok(EnrichOutcome {
            remote_ingredients: remote.ingredients.len(),
            updated,
        })
    }
}

/// Copy remote estimates onto local ingredients with the same id.
///
/// Remote entries are applied in order, so the last duplicate wins. Local
/// ingredients without a match keep their percent. An entry without an `id`
/// is an error when there is anything to compare it with, and a matching
/// entry without a `percent_estimate` is an error; in both cases `local` is
/// left untouched. Returns the number of overwrites applied.
pub fn merge_percent_estimates(
    local: &mut [Ingredient],
    remote: &[RemoteIngredient],
) -> Result<usize, ProductOpenerError> {
    if local.is_empty() {
        return Ok(0);
    }

    let mut updates = Vec::new();
    for (position, estimate) in remote.iter().enumerate() {
        let id = estimate.id.as_deref().ok_or_else(|| {
            ProductOpenerError::UnexpectedShape(format!("ingredient #{} has no id", position))
        })?;
        for (index, _) in local.iter().enumerate().filter(|(_, i)| i.id == id) {
            let percent = estimate.percent_estimate.ok_or_else(|| {
                ProductOpenerError::UnexpectedShape(format!(
                    "ingredient {} has no percent_estimate",
                    id
                ))
            })?;
            updates.push((index, percent));
        }
    }

    for &(index, percent) in &updates {
        local[index].percent = percent;
    }
    Ok(updates.len())
}
