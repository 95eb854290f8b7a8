//! Product Aggregate

use serde::Deserialize;

use crate::pricing::coerce::{lenient_discount_tag, lenient_id, lenient_number};
use crate::pricing::{compute_discounted_price, DiscountComputation, DiscountTag, Priceable};

/// A catalog product as the backend returns it.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct Product {
    #[serde(deserialize_with = "lenient_id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_number")]
    pub price: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub discount: Option<f64>,
    #[serde(default, deserialize_with = "lenient_discount_tag")]
    pub discount_type: Option<DiscountTag>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub discount_amount: Option<f64>,
    #[serde(default)]
    pub variants: Vec<Variant>,
}

/// A size or pack of a product. A variant with its own price shares the
/// product's discount.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct Variant {
    #[serde(deserialize_with = "lenient_id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_number")]
    pub price: Option<f64>,
}

impl Product {
    pub fn new(id: impl Into<String>, name: impl Into<String>, price: f64) -> Self {
        Self { id: id.into(), name: name.into(), price: Some(price), ..Self::default() }
    }

    pub fn with_percentage(mut self, percent: f64) -> Self {
        self.discount = Some(percent);
        self.discount_type = Some(DiscountTag::Percentage);
        self
    }

    pub fn with_amount(mut self, amount: f64) -> Self {
        self.discount_amount = Some(amount);
        self.discount_type = Some(DiscountTag::Amount);
        self
    }

    pub fn with_variant(mut self, id: impl Into<String>, name: impl Into<String>, price: Option<f64>) -> Self {
        self.variants.push(Variant { id: id.into(), name: name.into(), price });
        self
    }

    pub fn variant(&self, variant_id: &str) -> Option<&Variant> {
        self.variants.iter().find(|v| v.id == variant_id)
    }

    /// Price shown on the product detail page for the selected variant.
    pub fn pricing(&self, variant_id: Option<&str>) -> Result<DiscountComputation, ProductError> {
        let base = match variant_id {
            None => None,
            Some(id) => self.variant(id).ok_or_else(|| ProductError::VariantNotFound(id.to_string()))?.price,
        };
        Ok(compute_discounted_price(self, base))
    }

    /// "From" price for search cards: the cheapest variant after discount.
    pub fn starting_price(&self) -> DiscountComputation {
        self.variants
            .iter()
            .map(|v| compute_discounted_price(self, v.price))
            .reduce(|best, next| if next.final_price < best.final_price { next } else { best })
            .unwrap_or_else(|| compute_discounted_price(self, None))
    }
}

impl Priceable for Product {
    fn price(&self) -> Option<f64> { self.price }
    fn discount(&self) -> Option<f64> { self.discount }
    fn discount_type(&self) -> Option<DiscountTag> { self.discount_type }
    fn discount_amount(&self) -> Option<f64> { self.discount_amount }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProductError {
    #[error("Variant not found: {0}")]
    VariantNotFound(String),
}
