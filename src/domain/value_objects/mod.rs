//! Value Objects for the storefront catalog

use serde::{Deserialize, Serialize};
use validator::ValidationError;

/// Largest quantity a single cart line may hold.
pub const MAX_LINE_QUANTITY: u32 = 999;

/// Quantity value object
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Quantity(u32);

impl Quantity {
    pub fn new(value: u32) -> Self { Self(value) }
    pub fn value(&self) -> u32 { self.0 }
    pub fn add(&self, other: u32) -> Self { Self(self.0.saturating_add(other)) }
    pub fn is_zero(&self) -> bool { self.0 == 0 }
    pub fn as_f64(&self) -> f64 { f64::from(self.0) }
}

/// Validator hook for cart line quantities.
pub fn validate_quantity(qty: &Quantity) -> Result<(), ValidationError> {
    if qty.is_zero() || qty.value() > MAX_LINE_QUANTITY {
        let mut err = ValidationError::new("quantity_range");
        err.message = Some(format!("quantity must be between 1 and {}", MAX_LINE_QUANTITY).into());
        return Err(err);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn test_quantity() {
        let q = Quantity::new(3).add(2);
        assert_eq!(q.value(), 5);
        assert!(!q.is_zero());
        assert_eq!(q.as_f64(), 5.0);
        assert_eq!(Quantity::new(u32::MAX).add(1).value(), u32::MAX);
    }
    #[test]
    fn test_quantity_bounds() {
        assert!(validate_quantity(&Quantity::new(0)).is_err());
        assert!(validate_quantity(&Quantity::new(1)).is_ok());
        assert!(validate_quantity(&Quantity::new(MAX_LINE_QUANTITY)).is_ok());
        assert!(validate_quantity(&Quantity::new(MAX_LINE_QUANTITY + 1)).is_err());
    }
}
