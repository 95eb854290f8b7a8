//! Freshmart storefront pricing
//!
//! Prices catalog records for the storefront: search cards, product detail,
//! cart lines and the checkout summary all go through the same discount rules.
//!
//! ## Features
//! - Percentage and fixed-amount discounts, with legacy percentage inference
//! - Variant price overrides
//! - Cart and checkout totals
//! - Stateless JSON API over the above

pub mod api;
pub mod config;
pub mod domain;
pub mod pricing;

use axum::{http::StatusCode, response::{IntoResponse, Response}, Json};
use thiserror::Error;

pub use config::Config;
pub use pricing::{compute_discounted_price, DiscountComputation, DiscountKind, DiscountType, PriceFields, Priceable};

// =============================================================================
// Error Types
// =============================================================================

#[derive(Error, Debug)]
pub enum StorefrontError {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("{0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("At least one item is required")]
    EmptyRequest,

    #[error("Too many items: at most {max} per request")]
    TooManyItems { max: usize },

    #[error(transparent)]
    Product(#[from] domain::aggregates::ProductError),
}

impl StorefrontError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Validation(_) | Self::EmptyRequest | Self::TooManyItems { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Product(_) => StatusCode::NOT_FOUND,
        }
    }
}

impl IntoResponse for StorefrontError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(error = %self, "request rejected");
        }
        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}

pub type Result<T> = std::result::Result<T, StorefrontError>;
