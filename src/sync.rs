//! The full price-sync pipeline: resolve base currency, fetch a provider
//! snapshot, merge with stored settings, derive per-variant prices, apply
//! the batch to the catalog.
//!
//! The pipeline keeps no state of its own and never retries; given the
//! same inputs it produces the same catalog, so the caller can rerun the
//! whole thing after a transient failure.

use crate::catalog::Catalog;
use crate::config::DefaultCurrencySource;
use crate::core::{derive_prices, merge_rates};
use crate::rate_provider::RateProvider;
use crate::store::SettingStore;
use anyhow::Result;
use tracing::info;

#[derive(Debug, Clone)]
pub struct SyncReport {
    pub base_currency: String,
    pub eligible_currencies: Vec<String>,
    pub variants_updated: usize,
    pub variants_skipped: usize,
}

pub async fn run_sync(
    provider: &dyn RateProvider,
    base_source: &dyn DefaultCurrencySource,
    store: &dyn SettingStore,
    catalog: &dyn Catalog,
) -> Result<SyncReport> {
    let base = base_source.default_currency()?;
    info!(base = %base, "Starting price sync");

    // Provider fetch and catalog read are independent
    let (snapshot, variants) =
        futures::try_join!(provider.fetch_rates(&base), catalog.read_variants())?;
    let settings = store.list().await?;
    info!(
        rates = snapshot.len(),
        settings = settings.len(),
        variants = variants.len(),
        "Loaded sync inputs"
    );

    let merged = merge_rates(&settings, &snapshot, &base);
    let updates = derive_prices(&merged, &base, &variants);
    let skipped = variants.len() - updates.len();

    let updated = catalog.apply_price_updates(updates).await?;
    info!(updated, skipped, "Price sync finished");

    Ok(SyncReport {
        base_currency: base,
        eligible_currencies: merged.eligible.iter().cloned().collect(),
        variants_updated: updated,
        variants_skipped: skipped,
    })
}
