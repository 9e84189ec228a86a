//! Per-variant price derivation from the merged rate table.
//!
//! Derivation is pure and per-variant independent: each variant either gets
//! a complete, consistent price set across every eligible currency, or it is
//! skipped and its stored prices stay exactly as they were.

use super::merge::MergedRates;
use super::setting::normalize_code;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// One per-currency price on a variant, amount in minor units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceRecord {
    /// Storage identifier of an existing record; absent for inserts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub currency_code: String,
    pub amount: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variant {
    pub id: String,
    #[serde(default)]
    pub prices: Vec<PriceRecord>,
}

impl Variant {
    pub fn price_for(&self, currency_code: &str) -> Option<&PriceRecord> {
        self.prices
            .iter()
            .find(|p| p.currency_code.eq_ignore_ascii_case(currency_code))
    }
}

/// Full replacement of one variant's price set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantPriceUpdate {
    pub variant_id: String,
    pub prices: Vec<PriceRecord>,
}

/// Recomputes every variant's per-currency prices from its base-currency
/// price and the merged rate table. Variants that cannot be fully resolved
/// emit nothing (all-or-nothing policy).
pub fn derive_prices(
    merged: &MergedRates,
    base_currency: &str,
    variants: &[Variant],
) -> Vec<VariantPriceUpdate> {
    let base = normalize_code(base_currency);
    let mut updates = Vec::new();
    let mut skipped = 0usize;

    for variant in variants {
        match reprice_variant(variant, merged, &base) {
            Some(prices) => updates.push(VariantPriceUpdate {
                variant_id: variant.id.clone(),
                prices,
            }),
            None => {
                skipped += 1;
                debug!(variant = %variant.id, "skipping variant: no base price or incomplete rate coverage");
            }
        }
    }

    debug!(updated = updates.len(), skipped, "prepared variant price updates");
    updates
}

/// Resolves one variant, or `None` when it must be left untouched: missing
/// base-currency price, missing or non-positive rate for any eligible
/// currency, or a derived amount that rounds to zero.
fn reprice_variant(
    variant: &Variant,
    merged: &MergedRates,
    base_currency: &str,
) -> Option<Vec<PriceRecord>> {
    let base_price = variant.price_for(base_currency)?;

    let mut prices = Vec::with_capacity(variant.prices.len());
    for code in &merged.eligible {
        let amount = if code == base_currency {
            base_price.amount
        } else {
            let rate = merged.rate_for(code)?;
            if rate <= 0.0 {
                return None;
            }
            (base_price.amount as f64 * rate).round() as i64
        };
        if amount <= 0 {
            return None;
        }

        // Update semantics when a record already exists for this currency,
        // insert semantics otherwise.
        let existing_id = variant.price_for(code).and_then(|p| p.id.clone());
        prices.push(PriceRecord {
            id: existing_id,
            currency_code: code.clone(),
            amount,
        });
    }

    // Prices of currencies outside the eligible set are carried forward
    // verbatim, never recomputed, never dropped.
    prices.extend(
        variant
            .prices
            .iter()
            .filter(|p| !merged.eligible.contains(&normalize_code(&p.currency_code)))
            .cloned(),
    );

    Some(prices)
}
