//! Catalog domain: products, variants and the cart view that consume pricing.
pub mod aggregates;
pub mod value_objects;
