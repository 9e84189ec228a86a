//! Exchange-rate snapshot source for the application.

use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;

#[async_trait]
pub trait RateProvider: Send + Sync {
    /// Rates relative to `base_currency`, keyed by lowercase currency code.
    /// Snapshots may be partial; no code can be assumed present.
    async fn fetch_rates(&self, base_currency: &str) -> Result<HashMap<String, f64>>;
}
