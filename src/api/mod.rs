//! JSON API over the pricing rules.
//!
//! Every endpoint is derived from its request body alone; nothing is stored.

use std::sync::Arc;

use axum::{extract::State, routing::{get, post}, Json, Router};
use serde::{Deserialize, Serialize};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::Config;
use crate::domain::aggregates::{Cart, CartItem, CartSummary, Product};
use crate::pricing::coerce::{lenient_number, lenient_optional_id};
use crate::pricing::{compute_discounted_price, DiscountComputation, PriceFields};
use crate::{Result, StorefrontError};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self { config: Arc::new(config) }
    }

    fn check_batch(&self, len: usize) -> Result<()> {
        if len == 0 {
            return Err(StorefrontError::EmptyRequest);
        }
        let max = self.config.max_batch_items;
        if len > max {
            tracing::warn!(len, max, "batch over limit");
            return Err(StorefrontError::TooManyItems { max });
        }
        Ok(())
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/v1/pricing/quote", post(quote))
        .route("/api/v1/pricing/batch", post(quote_batch))
        .route("/api/v1/products/pricing", post(product_pricing))
        .route("/api/v1/cart/summary", post(cart_summary))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(CorsLayer::permissive()))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
pub struct QuoteRequest {
    pub item: PriceFields,
    /// Variant price; used only when it is a finite number.
    #[serde(default)]
    pub override_price: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct BatchRequest {
    pub items: Vec<QuoteRequest>,
}

#[derive(Debug, Serialize)]
pub struct BatchResponse {
    pub data: Vec<DiscountComputation>,
    pub total: usize,
}

#[derive(Debug, Deserialize)]
pub struct ProductPricingRequest {
    pub product: Product,
    #[serde(default, deserialize_with = "lenient_optional_id")]
    pub variant_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ProductPricingResponse {
    pub product_id: String,
    pub variant_id: Option<String>,
    pub pricing: DiscountComputation,
    pub starting_price: DiscountComputation,
}

#[derive(Debug, Deserialize)]
pub struct CartSummaryRequest {
    pub items: Vec<CartItem>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub shipping_fee: Option<f64>,
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "healthy", "service": "freshmart-pricing"}))
}

async fn quote(Json(r): Json<QuoteRequest>) -> Json<DiscountComputation> {
    Json(compute_discounted_price(&r.item, r.override_price))
}

async fn quote_batch(State(s): State<AppState>, Json(r): Json<BatchRequest>) -> Result<Json<BatchResponse>> {
    s.check_batch(r.items.len())?;
    let data: Vec<_> = r.items.iter().map(|q| compute_discounted_price(&q.item, q.override_price)).collect();
    tracing::debug!(count = data.len(), "priced batch");
    Ok(Json(BatchResponse { total: data.len(), data }))
}

async fn product_pricing(Json(r): Json<ProductPricingRequest>) -> Result<Json<ProductPricingResponse>> {
    let pricing = r.product.pricing(r.variant_id.as_deref())?;
    Ok(Json(ProductPricingResponse {
        product_id: r.product.id.clone(),
        starting_price: r.product.starting_price(),
        variant_id: r.variant_id,
        pricing,
    }))
}

async fn cart_summary(State(s): State<AppState>, Json(r): Json<CartSummaryRequest>) -> Result<Json<CartSummary>> {
    s.check_batch(r.items.len())?;
    let mut cart = Cart::new();
    for item in r.items {
        cart.add_item(item);
    }
    cart.validate_lines()?;
    let summary = cart.summary(r.shipping_fee);
    tracing::debug!(lines = summary.lines.len(), total = summary.total, "priced cart");
    Ok(Json(summary))
}
