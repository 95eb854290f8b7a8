//! Aggregates module
pub mod product;
pub mod cart;

pub use product::{Product, ProductError, Variant};
pub use cart::{Cart, CartError, CartItem, CartLine, CartSummary};
