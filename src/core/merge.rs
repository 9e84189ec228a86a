//! Reconciles provider-fetched rates with stored settings into one
//! authoritative rate table per sync.

use super::setting::{ExchangeSetting, RateMode, normalize_code};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::debug;

/// Ephemeral output of a merge: never persisted, rebuilt on every sync.
///
/// A currency can be eligible without a table entry — an enabled auto
/// setting whose code the provider omitted. Downstream derivation treats
/// that as unresolvable per variant instead of dropping the currency here.
#[derive(Debug, Clone, PartialEq)]
pub struct MergedRates {
    pub table: BTreeMap<String, f64>,
    pub eligible: BTreeSet<String>,
}

impl MergedRates {
    pub fn rate_for(&self, currency_code: &str) -> Option<f64> {
        self.table.get(currency_code).copied()
    }
}

/// Builds the rate table and eligible set from the full settings collection
/// and a provider snapshot keyed by lowercase currency code.
///
/// Enabled manual settings contribute their pinned rate; enabled auto
/// settings take the snapshot value when present. Disabled settings are
/// excluded entirely, whatever their stored mode or rate. The base currency
/// is inserted unconditionally at rate 1, setting or no setting.
pub fn merge_rates(
    settings: &[ExchangeSetting],
    snapshot: &HashMap<String, f64>,
    base_currency: &str,
) -> MergedRates {
    let mut table = BTreeMap::new();
    let mut eligible = BTreeSet::new();
    let mut manual_count = 0usize;
    let mut auto_count = 0usize;

    for setting in settings {
        if !setting.is_enabled() {
            continue;
        }
        let code = normalize_code(&setting.currency_code);
        eligible.insert(code.clone());

        match setting.mode {
            RateMode::Manual => {
                debug!(code = %code, rate = setting.exchange_rate, "using manual rate");
                table.insert(code, setting.exchange_rate);
                manual_count += 1;
            }
            RateMode::Auto => {
                if let Some(rate) = snapshot.get(&code) {
                    debug!(code = %code, rate, "using provider rate");
                    table.insert(code, *rate);
                    auto_count += 1;
                } else {
                    // Stays eligible with no entry; resolved (or not) per
                    // variant during derivation.
                    debug!(code = %code, "provider snapshot has no rate; currency stays eligible");
                }
            }
        }
    }

    let base = normalize_code(base_currency);
    eligible.insert(base.clone());
    table.insert(base, 1.0);

    debug!(
        eligible = eligible.len(),
        manual = manual_count,
        auto = auto_count,
        "merged rate table"
    );

    MergedRates { table, eligible }
}
