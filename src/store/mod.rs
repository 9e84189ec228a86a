pub mod disk;
pub mod memory;

use crate::core::setting::ExchangeSetting;
use anyhow::Result;
use async_trait::async_trait;

/// Persistence seam for exchange settings.
///
/// Settings are upserted by id and never deleted; disabling a currency
/// keeps its row. Code uniqueness is enforced by the registry, not here.
#[async_trait]
pub trait SettingStore: Send + Sync {
    async fn list(&self) -> Result<Vec<ExchangeSetting>>;
    async fn get(&self, id: &str) -> Result<Option<ExchangeSetting>>;
    async fn find_by_code(&self, currency_code: &str) -> Result<Option<ExchangeSetting>>;
    async fn upsert(&self, setting: ExchangeSetting) -> Result<ExchangeSetting>;
}
