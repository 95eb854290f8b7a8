//! Cart Aggregate
//!
//! The cart is a view assembled from the lines a shopper holds; it is priced
//! on demand and never stored here.

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationErrors};

use crate::domain::value_objects::{validate_quantity, Quantity};
use crate::pricing::coerce::{coerce, lenient_discount_tag, lenient_id, lenient_number, lenient_optional_id};
use crate::pricing::{compute_discounted_price, DiscountComputation, DiscountTag, Priceable};

#[derive(Clone, Debug, Default)]
pub struct Cart {
    items: Vec<CartItem>,
}

#[derive(Clone, Debug, Default, Deserialize, Validate)]
pub struct CartItem {
    #[serde(deserialize_with = "lenient_id")]
    pub product_id: String,
    #[serde(default, deserialize_with = "lenient_optional_id")]
    pub variant_id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[validate(custom = "validate_quantity")]
    pub quantity: Quantity,
    #[serde(default, deserialize_with = "lenient_number")]
    pub price: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub discount: Option<f64>,
    #[serde(default, deserialize_with = "lenient_discount_tag")]
    pub discount_type: Option<DiscountTag>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub discount_amount: Option<f64>,
    /// Price of the selected variant, when it differs from the list price.
    #[serde(default, deserialize_with = "lenient_number")]
    pub variant_price: Option<f64>,
}

impl CartItem {
    fn same_line(&self, product_id: &str, variant_id: Option<&str>) -> bool {
        self.product_id == product_id && self.variant_id.as_deref() == variant_id
    }

    pub fn unit_pricing(&self) -> DiscountComputation {
        compute_discounted_price(self, self.variant_price)
    }
}

impl Priceable for CartItem {
    fn price(&self) -> Option<f64> { self.price }
    fn discount(&self) -> Option<f64> { self.discount }
    fn discount_type(&self) -> Option<DiscountTag> { self.discount_type }
    fn discount_amount(&self) -> Option<f64> { self.discount_amount }
}

/// One priced cart line.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CartLine {
    pub product_id: String,
    pub variant_id: Option<String>,
    pub name: String,
    pub quantity: Quantity,
    pub unit: DiscountComputation,
    pub line_total: f64,
    pub line_savings: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CartSummary {
    pub lines: Vec<CartLine>,
    pub item_count: u32,
    pub original_subtotal: f64,
    pub subtotal: f64,
    pub total_savings: f64,
    pub shipping_fee: f64,
    pub total: f64,
}

impl Cart {
    pub fn new() -> Self { Self::default() }

    pub fn items(&self) -> &[CartItem] { &self.items }
    pub fn is_empty(&self) -> bool { self.items.is_empty() }
    pub fn item_count(&self) -> u32 {
        self.items.iter().fold(Quantity::default(), |acc, i| acc.add(i.quantity.value())).value()
    }

    pub fn add_item(&mut self, item: CartItem) {
        let variant_id = item.variant_id.clone();
        if let Some(existing) = self.items.iter_mut().find(|i| i.same_line(&item.product_id, variant_id.as_deref())) {
            existing.quantity = existing.quantity.add(item.quantity.value());
        } else {
            self.items.push(item);
        }
    }

    pub fn update_quantity(&mut self, product_id: &str, variant_id: Option<&str>, quantity: u32) -> Result<(), CartError> {
        let item = self.items.iter_mut().find(|i| i.same_line(product_id, variant_id)).ok_or(CartError::ItemNotFound)?;
        if quantity == 0 {
            self.items.retain(|i| !i.same_line(product_id, variant_id));
        } else {
            item.quantity = Quantity::new(quantity);
        }
        Ok(())
    }

    pub fn remove_item(&mut self, product_id: &str, variant_id: Option<&str>) -> Result<(), CartError> {
        let before = self.items.len();
        self.items.retain(|i| !i.same_line(product_id, variant_id));
        if self.items.len() == before { return Err(CartError::ItemNotFound); }
        Ok(())
    }

    pub fn clear(&mut self) { self.items.clear(); }

    /// Checks every line after merging, so repeated lines cannot add up past
    /// the per-line quantity limit.
    pub fn validate_lines(&self) -> Result<(), ValidationErrors> {
        self.items.iter().try_for_each(|item| item.validate())
    }

    /// Prices every line and totals the cart. A missing or negative shipping
    /// fee counts as free shipping.
    pub fn summary(&self, shipping_fee: Option<f64>) -> CartSummary {
        let lines: Vec<CartLine> = self
            .items
            .iter()
            .map(|item| {
                let unit = item.unit_pricing();
                let qty = item.quantity.as_f64();
                CartLine {
                    product_id: item.product_id.clone(),
                    variant_id: item.variant_id.clone(),
                    name: item.name.clone(),
                    quantity: item.quantity,
                    line_total: unit.final_price * qty,
                    line_savings: unit.savings * qty,
                    unit,
                }
            })
            .collect();

        let original_subtotal: f64 = lines.iter().map(|l| l.unit.base_price * l.quantity.as_f64()).sum();
        let subtotal: f64 = lines.iter().map(|l| l.line_total).sum();
        let total_savings: f64 = lines.iter().map(|l| l.line_savings).sum();
        let shipping_fee = coerce(shipping_fee).max(0.0);

        CartSummary {
            item_count: self.item_count(),
            lines,
            original_subtotal,
            subtotal,
            total_savings,
            shipping_fee,
            total: subtotal + shipping_fee,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CartError {
    #[error("Item not found")]
    ItemNotFound,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(product_id: &str, variant_id: Option<&str>, qty: u32, price: f64) -> CartItem {
        CartItem {
            product_id: product_id.into(),
            variant_id: variant_id.map(Into::into),
            name: "Widget".into(),
            quantity: Quantity::new(qty),
            price: Some(price),
            ..CartItem::default()
        }
    }

    #[test]
    fn test_cart_operations() {
        let mut cart = Cart::new();
        cart.add_item(item("P1", None, 2, 10.0));
        cart.add_item(item("P1", None, 1, 10.0));
        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.items()[0].quantity.value(), 3); // Merged
        cart.add_item(item("P1", Some("V1"), 1, 10.0));
        assert_eq!(cart.items().len(), 2);
        assert_eq!(cart.item_count(), 4);

        cart.update_quantity("P1", Some("V1"), 0).unwrap();
        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.update_quantity("P2", None, 1), Err(CartError::ItemNotFound));
        assert_eq!(cart.remove_item("P1", Some("V1")), Err(CartError::ItemNotFound));
        cart.remove_item("P1", None).unwrap();
        assert!(cart.is_empty());
    }

    #[test]
    fn test_summary_with_discounts() {
        let mut cart = Cart::new();
        cart.add_item(CartItem {
            discount: Some(10.0),
            discount_type: Some(DiscountTag::Percentage),
            ..item("P1", None, 2, 1000.0)
        });
        cart.add_item(CartItem {
            discount_amount: Some(50.0),
            discount_type: Some(DiscountTag::Amount),
            variant_price: Some(300.0),
            ..item("P2", Some("250ml"), 1, 600.0)
        });
        cart.add_item(item("P3", None, 3, 99.5));

        let s = cart.summary(Some(150.0));
        assert_eq!(s.item_count, 6);
        assert_eq!(s.lines[0].line_total, 1800.0);
        assert_eq!(s.lines[0].line_savings, 200.0);
        assert_eq!(s.lines[1].unit.base_price, 300.0);
        assert_eq!(s.lines[1].line_total, 250.0);
        assert_eq!(s.lines[2].line_total, 298.5);
        assert_eq!(s.original_subtotal, 2598.5);
        assert_eq!(s.subtotal, 2348.5);
        assert_eq!(s.total_savings, 250.0);
        assert_eq!(s.total, 2498.5);
    }

    #[test]
    fn test_summary_shipping_fee_coercion() {
        let mut cart = Cart::new();
        cart.add_item(item("P1", None, 1, 100.0));
        assert_eq!(cart.summary(None).shipping_fee, 0.0);
        assert_eq!(cart.summary(Some(-20.0)).total, 100.0);
        assert_eq!(cart.summary(Some(f64::NAN)).total, 100.0);
    }

    #[test]
    fn test_merged_lines_over_limit() {
        let mut cart = Cart::new();
        cart.add_item(item("P1", None, 999, 10.0));
        assert!(cart.validate_lines().is_ok());
        cart.add_item(item("P1", None, 1, 10.0));
        assert_eq!(cart.items()[0].quantity.value(), 1000);
        assert!(cart.validate_lines().is_err());
    }

    #[test]
    fn test_quantity_validation() {
        assert!(item("P1", None, 0, 1.0).validate().is_err());
        assert!(item("P1", None, 1000, 1.0).validate().is_err());
        assert!(item("P1", None, 5, 1.0).validate().is_ok());
    }
}
