use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

use super::ProductError;

/// One food product under analysis.
///
/// Field order matters: records are re-encoded in declaration order. Absent
/// and `null` collections stay `None` and are written back as `null`; a
/// `null` scalar, map value or list element reads as its zero value.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Product {
    #[serde(default, deserialize_with = "null_as_default")]
    pub product_name: String,
    #[serde(default, deserialize_with = "null_elements_as_default")]
    pub ingredients: Option<Vec<Ingredient>>,
    #[serde(default, deserialize_with = "null_values_as_default")]
    pub nutriments: Option<BTreeMap<String, f64>>,
    #[serde(default, deserialize_with = "null_values_as_default")]
    pub impacts: Option<BTreeMap<String, f64>>,
    #[serde(default, deserialize_with = "null_elements_as_default")]
    pub categories_tags: Option<Vec<String>>,
}

/// One entry of a product's ingredient list, in ranking order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Ingredient {
    #[serde(default, deserialize_with = "null_as_default")]
    pub mass: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    /// Mass share in percent. The only field the pipeline rewrites.
    #[serde(default, deserialize_with = "null_as_default")]
    pub percent: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub rank: i64,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn null_values_as_default<'de, D, T>(
    deserializer: D,
) -> Result<Option<BTreeMap<String, T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    let map = Option::<BTreeMap<String, Option<T>>>::deserialize(deserializer)?;
    Ok(map.map(|values| {
        values
            .into_iter()
            .map(|(key, value)| (key, value.unwrap_or_default()))
            .collect()
    }))
}

fn null_elements_as_default<'de, D, T>(deserializer: D) -> Result<Option<Vec<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    let list = Option::<Vec<Option<T>>>::deserialize(deserializer)?;
    Ok(list.map(|items| items.into_iter().map(Option::unwrap_or_default).collect()))
}

impl Ingredient {
    /// Identifier without its taxonomy prefix: `"salt"` for `"en:salt"`.
    pub fn bare_id(&self) -> Result<&str, ProductError> {
        self.id
            .split_once(':')
            .map(|(_, bare)| bare)
            .ok_or_else(|| ProductError::MissingNamespace(self.id.clone()))
    }
}

impl Product {
    /// Ingredients in ranking order; empty when the list is absent.
    pub fn ingredients(&self) -> &[Ingredient] {
        self.ingredients.as_deref().unwrap_or_default()
    }

    pub fn ingredients_mut(&mut self) -> &mut [Ingredient] {
        self.ingredients.as_deref_mut().unwrap_or_default()
    }

    /// Bare ids of every ingredient, in ingredient order.
    pub fn ingredient_ids(&self) -> Result<Vec<&str>, ProductError> {
        self.ingredients().iter().map(Ingredient::bare_id).collect()
    }

    /// Ingredient list as submitted to Product Opener: bare ids joined with commas.
    pub fn ingredients_text(&self) -> Result<String, ProductError> {
        Ok(self.ingredient_ids()?.join(","))
    }
}
