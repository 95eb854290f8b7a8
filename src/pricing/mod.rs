//! Discounted pricing
//!
//! Every storefront surface (search cards, product detail, cart lines, the
//! checkout summary) prices items through [`compute_discounted_price`]. A record
//! carries at most one active discount: a percentage or a fixed amount. Which one
//! is active comes from `discount_type`; legacy records without it fall back to
//! a percentage when `discount > 0`.

pub mod coerce;

use serde::{Deserialize, Serialize};

use self::coerce::{coerce, lenient_discount_tag, lenient_number};

/// Discounts smaller than this are treated as noise.
pub const DISCOUNT_EPSILON: f64 = 0.005;

/// Currency prefix used in amount labels.
pub const CURRENCY_LABEL: &str = "Rs";

/// `discount_type` as stored on a catalog record.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DiscountTag {
    Percentage,
    Amount,
    /// Set, but not a type we know how to apply.
    Unrecognized,
}

/// The discount type reported on a computed price.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscountType {
    Percentage,
    Amount,
}

/// The discount selected for a record, before it is applied to a base price.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DiscountKind {
    None,
    Percentage(f64),
    Amount(f64),
}

impl DiscountKind {
    /// Resolves the active discount of a record.
    ///
    /// An explicit tag always wins, even when it selects nothing (an `amount`
    /// tag with no amount does not fall back to a stale percentage).
    pub fn resolve<P: Priceable + ?Sized>(entity: &P) -> Self {
        let percent = coerce(entity.discount());
        let amount = coerce(entity.discount_amount());
        let tag = match entity.discount_type() {
            Some(tag) => Some(tag),
            None if percent > 0.0 => Some(DiscountTag::Percentage),
            None => None,
        };
        match tag {
            Some(DiscountTag::Percentage) if percent > 0.0 => Self::Percentage(percent),
            Some(DiscountTag::Amount) if amount > 0.0 => Self::Amount(amount),
            _ => Self::None,
        }
    }

    fn apply(&self, base: f64) -> f64 {
        match *self {
            Self::Percentage(percent) => base * (1.0 - percent / 100.0),
            Self::Amount(amount) => base - amount,
            Self::None => base,
        }
    }
}

/// Anything that carries catalog pricing fields.
pub trait Priceable {
    fn price(&self) -> Option<f64>;
    fn discount(&self) -> Option<f64>;
    fn discount_type(&self) -> Option<DiscountTag>;
    fn discount_amount(&self) -> Option<f64>;
}

/// Bare pricing fields of a product or cart line, as the backend sends them.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct PriceFields {
    #[serde(default, deserialize_with = "lenient_number")]
    pub price: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub discount: Option<f64>,
    #[serde(default, deserialize_with = "lenient_discount_tag")]
    pub discount_type: Option<DiscountTag>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub discount_amount: Option<f64>,
}

impl PriceFields {
    pub fn new(price: f64) -> Self {
        Self { price: Some(price), ..Self::default() }
    }

    pub fn percentage(price: f64, percent: f64) -> Self {
        Self { discount: Some(percent), discount_type: Some(DiscountTag::Percentage), ..Self::new(price) }
    }

    pub fn amount(price: f64, amount: f64) -> Self {
        Self { discount_amount: Some(amount), discount_type: Some(DiscountTag::Amount), ..Self::new(price) }
    }
}

impl Priceable for PriceFields {
    fn price(&self) -> Option<f64> { self.price }
    fn discount(&self) -> Option<f64> { self.discount }
    fn discount_type(&self) -> Option<DiscountTag> { self.discount_type }
    fn discount_amount(&self) -> Option<f64> { self.discount_amount }
}

/// Result of pricing one record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscountComputation {
    pub base_price: f64,
    /// Rounded to a whole unit when discounted, the raw base price otherwise.
    pub final_price: f64,
    pub has_discount: bool,
    pub discount_type: Option<DiscountType>,
    pub discount_value: f64,
    pub savings: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount_label: Option<String>,
}

impl DiscountComputation {
    fn undiscounted(base: f64) -> Self {
        Self {
            base_price: base,
            final_price: base,
            has_discount: false,
            discount_type: None,
            discount_value: 0.0,
            savings: 0.0,
            discount_label: None,
        }
    }
}

/// Prices `entity`, using `override_base_price` (a variant price) as the base
/// when it is finite.
pub fn compute_discounted_price<P: Priceable + ?Sized>(
    entity: &P,
    override_base_price: Option<f64>,
) -> DiscountComputation {
    let base = match override_base_price {
        Some(v) if v.is_finite() => v,
        _ => coerce(entity.price()),
    };

    let kind = DiscountKind::resolve(entity);
    let discounted = kind.apply(base);
    if !(discounted < base - DISCOUNT_EPSILON) {
        return DiscountComputation::undiscounted(base);
    }

    let final_price = discounted.max(0.0).round();
    let savings = base - final_price;
    let (discount_type, discount_value, label) = match kind {
        DiscountKind::Percentage(percent) => {
            let label = format!("-{}%", js_number_string(percent));
            (DiscountType::Percentage, percent, label)
        }
        DiscountKind::Amount(amount) => {
            let shown = amount.max(0.0).round() as i64;
            let label = format!("-{} {}", CURRENCY_LABEL, group_thousands(shown));
            (DiscountType::Amount, amount, label)
        }
        DiscountKind::None => return DiscountComputation::undiscounted(base),
    };

    DiscountComputation {
        base_price: base,
        final_price,
        has_discount: true,
        discount_type: Some(discount_type),
        discount_value,
        savings,
        discount_label: Some(label),
    }
}

/// Formats a number the way browsers stringify it: plain decimals between
/// `1e-6` and `1e21`, exponent notation outside that range.
pub fn js_number_string(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if n == 0.0 {
        return "0".to_string();
    }
    let magnitude = n.abs();
    if (1e-6..1e21).contains(&magnitude) {
        return format!("{}", n);
    }
    let exp = format!("{:e}", n);
    match exp.split_once('e') {
        Some((mantissa, power)) if !power.starts_with('-') => format!("{}e+{}", mantissa, power),
        _ => exp,
    }
}

/// Formats an integer with comma thousands separators.
pub fn group_thousands(n: i64) -> String {
    let digits = n.unsigned_abs().to_string();
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3 + 1);
    if n < 0 {
        out.push('-');
    }
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
