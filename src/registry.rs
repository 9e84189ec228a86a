//! Setting lifecycle: enable (create-or-force-auto), update via the
//! decision table, lookup and paginated listing.

use crate::config::DefaultCurrencySource;
use crate::core::setting::{
    ExchangeSetting, RateMode, SettingChangeset, SettingStatus, UpdateRequest, normalize_code,
    plan_update,
};
use crate::error::ExchangeError;
use crate::rate_provider::RateProvider;
use crate::store::SettingStore;
use anyhow::Result;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// List pagination; defaults match the admin contract.
#[derive(Debug, Clone, Copy)]
pub struct ListParams {
    pub limit: usize,
    pub offset: usize,
}

impl Default for ListParams {
    fn default() -> Self {
        ListParams {
            limit: 20,
            offset: 0,
        }
    }
}

pub struct SettingRegistry {
    store: Arc<dyn SettingStore>,
    provider: Arc<dyn RateProvider>,
    base_currency: Arc<dyn DefaultCurrencySource>,
    // Serializes create/update so two concurrent enables for one code
    // cannot produce two settings; later write wins.
    write_lock: Mutex<()>,
}

impl SettingRegistry {
    pub fn new(
        store: Arc<dyn SettingStore>,
        provider: Arc<dyn RateProvider>,
        base_currency: Arc<dyn DefaultCurrencySource>,
    ) -> Self {
        SettingRegistry {
            store,
            provider,
            base_currency,
            write_lock: Mutex::new(()),
        }
    }

    /// Settings sorted by currency code, paginated.
    pub async fn list(&self, params: &ListParams) -> Result<Vec<ExchangeSetting>> {
        let mut settings = self.store.list().await?;
        settings.sort_by(|a, b| a.currency_code.cmp(&b.currency_code));
        Ok(settings
            .into_iter()
            .skip(params.offset)
            .take(params.limit)
            .collect())
    }

    pub async fn get(&self, id: &str) -> Result<ExchangeSetting> {
        self.store
            .get(id)
            .await?
            .ok_or_else(|| ExchangeError::SettingNotFound(id.to_string()).into())
    }

    /// Enables a currency for price propagation.
    ///
    /// Requires a resolvable base currency and a provider rate for the
    /// target code; fails without persisting anything otherwise. An
    /// existing setting — even a disabled or manually pinned one — is
    /// forced back to enabled auto mode with a fresh rate.
    pub async fn enable(&self, currency_code: &str) -> Result<ExchangeSetting> {
        let code = normalize_code(currency_code);
        let base = self.base_currency.default_currency()?;
        info!(code = %code, base = %base, "Enabling currency");

        let rates = self.provider.fetch_rates(&base).await?;
        let rate = *rates
            .get(&code)
            .ok_or_else(|| ExchangeError::RateNotFound(code.clone()))?;

        let _guard = self.write_lock.lock().await;
        match self.store.find_by_code(&code).await? {
            Some(mut existing) => {
                existing.apply(&SettingChangeset {
                    status: Some(SettingStatus::Enable),
                    mode: Some(RateMode::Auto),
                    exchange_rate: Some(rate),
                });
                info!(code = %code, rate, "Re-enabled currency with fresh auto rate");
                self.store.upsert(existing).await
            }
            None => {
                let setting = ExchangeSetting::new(&code, rate);
                info!(code = %code, rate, "Created exchange setting");
                self.store.upsert(setting).await
            }
        }
    }

    /// Applies an admin update to an existing setting.
    ///
    /// Switching to auto resolves a fresh provider rate first; when the
    /// provider has no rate for the code, the mode still flips and the
    /// stored rate survives. An update that changes nothing succeeds.
    pub async fn update(&self, id: &str, request: &UpdateRequest) -> Result<ExchangeSetting> {
        let _guard = self.write_lock.lock().await;
        let mut current = self
            .store
            .get(id)
            .await?
            .ok_or_else(|| ExchangeError::SettingNotFound(id.to_string()))?;

        let provider_rate = if request.mode == Some(RateMode::Auto)
            && current.mode != RateMode::Auto
        {
            let base = self.base_currency.default_currency()?;
            let rates = self.provider.fetch_rates(&base).await?;
            let rate = rates.get(&current.currency_code).copied();
            match rate {
                Some(rate) => {
                    info!(code = %current.currency_code, rate, "Fetched auto rate for mode switch")
                }
                None => {
                    warn!(code = %current.currency_code, "Provider has no rate; keeping stored rate")
                }
            }
            rate
        } else {
            None
        };

        let change = plan_update(&current, request, provider_rate);
        if change.is_empty() {
            debug!(code = %current.currency_code, "No changes detected");
            return Ok(current);
        }

        if let Some(status) = change.status {
            info!(code = %current.currency_code, from = %current.status, to = %status, "Status change");
        }
        if let Some(mode) = change.mode {
            info!(code = %current.currency_code, from = %current.mode, to = %mode, "Mode change");
        }
        if let Some(rate) = change.exchange_rate {
            debug!(code = %current.currency_code, rate, "Rate change");
        }

        current.apply(&change);
        self.store.upsert(current).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemoryStore;
    use async_trait::async_trait;
    use std::collections::HashMap;

    struct FakeProvider {
        rates: HashMap<String, f64>,
    }

    impl FakeProvider {
        fn with(rates: &[(&str, f64)]) -> Arc<Self> {
            Arc::new(FakeProvider {
                rates: rates.iter().map(|(c, r)| (c.to_string(), *r)).collect(),
            })
        }
    }

    #[async_trait]
    impl RateProvider for FakeProvider {
        async fn fetch_rates(&self, _base: &str) -> Result<HashMap<String, f64>> {
            Ok(self.rates.clone())
        }
    }

    struct FixedBase(&'static str);

    impl DefaultCurrencySource for FixedBase {
        fn default_currency(&self) -> Result<String> {
            Ok(self.0.to_string())
        }
    }

    struct NoBase;

    impl DefaultCurrencySource for NoBase {
        fn default_currency(&self) -> Result<String> {
            Err(ExchangeError::BaseCurrencyNotFound.into())
        }
    }

    fn registry_with(
        store: Arc<MemoryStore>,
        provider: Arc<dyn RateProvider>,
        base: Arc<dyn DefaultCurrencySource>,
    ) -> SettingRegistry {
        SettingRegistry::new(store, provider, base)
    }

    #[tokio::test]
    async fn test_enable_creates_auto_setting() {
        let store = Arc::new(MemoryStore::new());
        let registry = registry_with(
            store.clone(),
            FakeProvider::with(&[("eur", 0.92)]),
            Arc::new(FixedBase("usd")),
        );

        let setting = registry.enable("EUR").await.unwrap();
        assert_eq!(setting.currency_code, "eur");
        assert_eq!(setting.exchange_rate, 0.92);
        assert_eq!(setting.mode, RateMode::Auto);
        assert_eq!(setting.status, SettingStatus::Enable);
        assert!(!setting.id.is_empty());
    }

    #[tokio::test]
    async fn test_enable_without_provider_rate_persists_nothing() {
        let store = Arc::new(MemoryStore::new());
        let registry = registry_with(
            store.clone(),
            FakeProvider::with(&[]),
            Arc::new(FixedBase("usd")),
        );

        let err = registry.enable("xyz").await.unwrap_err();
        assert_eq!(
            err.downcast_ref::<ExchangeError>(),
            Some(&ExchangeError::RateNotFound("xyz".to_string()))
        );
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_enable_without_base_currency_fails() {
        let store = Arc::new(MemoryStore::new());
        let registry = registry_with(
            store.clone(),
            FakeProvider::with(&[("eur", 0.92)]),
            Arc::new(NoBase),
        );

        let err = registry.enable("eur").await.unwrap_err();
        assert_eq!(
            err.downcast_ref::<ExchangeError>(),
            Some(&ExchangeError::BaseCurrencyNotFound)
        );
    }

    #[tokio::test]
    async fn test_reenable_forces_auto_over_manual_pin() {
        let store = Arc::new(MemoryStore::new());
        let registry = registry_with(
            store.clone(),
            FakeProvider::with(&[("eur", 0.90)]),
            Arc::new(FixedBase("usd")),
        );

        let created = registry.enable("eur").await.unwrap();
        registry
            .update(
                &created.id,
                &UpdateRequest {
                    mode: Some(RateMode::Manual),
                    exchange_rate: Some(0.95),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        registry
            .update(
                &created.id,
                &UpdateRequest {
                    status: Some(SettingStatus::Disable),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let reenabled = registry.enable("eur").await.unwrap();
        assert_eq!(reenabled.id, created.id);
        assert_eq!(reenabled.mode, RateMode::Auto);
        assert_eq!(reenabled.status, SettingStatus::Enable);
        assert_eq!(reenabled.exchange_rate, 0.90);
        assert_eq!(store.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_update_unknown_id_is_typed_error() {
        let store = Arc::new(MemoryStore::new());
        let registry = registry_with(
            store,
            FakeProvider::with(&[]),
            Arc::new(FixedBase("usd")),
        );

        let err = registry
            .update("nope", &UpdateRequest::default())
            .await
            .unwrap_err();
        assert_eq!(
            err.downcast_ref::<ExchangeError>(),
            Some(&ExchangeError::SettingNotFound("nope".to_string()))
        );
    }

    #[tokio::test]
    async fn test_switch_to_auto_without_provider_rate_keeps_stored_rate() {
        let store = Arc::new(MemoryStore::new());
        let mut setting = ExchangeSetting::new("xyz", 2.5);
        setting.mode = RateMode::Manual;
        let id = setting.id.clone();
        store.upsert(setting).await.unwrap();

        let registry = registry_with(
            store,
            FakeProvider::with(&[]),
            Arc::new(FixedBase("usd")),
        );

        let updated = registry
            .update(
                &id,
                &UpdateRequest {
                    mode: Some(RateMode::Auto),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.mode, RateMode::Auto);
        assert_eq!(updated.exchange_rate, 2.5);
    }

    #[tokio::test]
    async fn test_empty_update_is_noop_success() {
        let store = Arc::new(MemoryStore::new());
        let registry = registry_with(
            store.clone(),
            FakeProvider::with(&[("eur", 0.92)]),
            Arc::new(FixedBase("usd")),
        );

        let created = registry.enable("eur").await.unwrap();
        let unchanged = registry
            .update(&created.id, &UpdateRequest::default())
            .await
            .unwrap();
        assert_eq!(unchanged.exchange_rate, created.exchange_rate);
        assert_eq!(unchanged.updated_at, created.updated_at);
    }

    #[tokio::test]
    async fn test_list_pagination() {
        let store = Arc::new(MemoryStore::new());
        let registry = registry_with(
            store.clone(),
            FakeProvider::with(&[("aud", 1.5), ("eur", 0.92), ("gbp", 0.79)]),
            Arc::new(FixedBase("usd")),
        );

        for code in ["gbp", "aud", "eur"] {
            registry.enable(code).await.unwrap();
        }

        let all = registry.list(&ListParams::default()).await.unwrap();
        let codes: Vec<_> = all.iter().map(|s| s.currency_code.as_str()).collect();
        assert_eq!(codes, ["aud", "eur", "gbp"]);

        let page = registry
            .list(&ListParams {
                limit: 1,
                offset: 1,
            })
            .await
            .unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].currency_code, "eur");
    }
}
