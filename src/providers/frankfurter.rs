use anyhow::{Result, anyhow};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use tokio::sync::Mutex;
use tracing::{debug, instrument};

use crate::rate_provider::RateProvider;

/// Rate snapshots from the Frankfurter API (or anything speaking its
/// `GET /v1/latest?base=XXX` shape). Snapshots are cached per base currency
/// for the lifetime of the provider, so a multi-currency enable run and a
/// following sync in the same process fetch once.
pub struct FrankfurterProvider {
    base_url: String,
    client: reqwest::Client,
    snapshots: Mutex<HashMap<String, HashMap<String, f64>>>,
}

#[derive(Debug, Deserialize)]
struct LatestRatesResponse {
    #[allow(dead_code)]
    base: String,
    rates: HashMap<String, f64>,
}

impl FrankfurterProvider {
    pub fn new(base_url: &str) -> Result<Self> {
        let client = reqwest::Client::builder().user_agent("fxsync/1.0").build()?;
        Ok(FrankfurterProvider {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            snapshots: Mutex::new(HashMap::new()),
        })
    }
}

#[async_trait]
impl RateProvider for FrankfurterProvider {
    #[instrument(
        name = "FrankfurterFetch",
        skip(self),
        fields(base = %base_currency)
    )]
    async fn fetch_rates(&self, base_currency: &str) -> Result<HashMap<String, f64>> {
        let base = base_currency.to_lowercase();
        if let Some(cached) = self.snapshots.lock().await.get(&base) {
            debug!("Snapshot cache HIT for base {base}");
            return Ok(cached.clone());
        }

        let url = format!("{}/v1/latest?base={}", self.base_url, base.to_uppercase());
        debug!("Requesting rate snapshot from {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| anyhow!("Request error: {} for base currency: {}", e, base))?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "HTTP error: {} for base currency: {}",
                response.status(),
                base
            ));
        }

        let data = response
            .json::<LatestRatesResponse>()
            .await
            .map_err(|e| anyhow!("Failed to parse rate response for {}: {}", base, e))?;

        // The API reports uppercase ISO codes; everything downstream keys
        // on lowercase.
        let rates: HashMap<String, f64> = data
            .rates
            .into_iter()
            .map(|(code, rate)| (code.to_lowercase(), rate))
            .collect();

        debug!("Received {} rates for base {}", rates.len(), base);
        self.snapshots.lock().await.insert(base, rates.clone());
        Ok(rates)
    }
}
