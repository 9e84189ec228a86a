use crate::core::setting::{ExchangeSetting, normalize_code};
use crate::store::SettingStore;
use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::Mutex;

/// In-memory setting store, keyed by setting id. Useful for tests and
/// dry runs; nothing survives the process.
pub struct MemoryStore {
    inner: Mutex<HashMap<String, ExchangeSetting>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(HashMap::new()),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SettingStore for MemoryStore {
    async fn list(&self) -> Result<Vec<ExchangeSetting>> {
        let settings = self.inner.lock().await;
        Ok(settings.values().cloned().collect())
    }

    async fn get(&self, id: &str) -> Result<Option<ExchangeSetting>> {
        let settings = self.inner.lock().await;
        Ok(settings.get(id).cloned())
    }

    async fn find_by_code(&self, currency_code: &str) -> Result<Option<ExchangeSetting>> {
        let code = normalize_code(currency_code);
        let settings = self.inner.lock().await;
        Ok(settings
            .values()
            .find(|s| s.currency_code == code)
            .cloned())
    }

    async fn upsert(&self, setting: ExchangeSetting) -> Result<ExchangeSetting> {
        let mut settings = self.inner.lock().await;
        settings.insert(setting.id.clone(), setting.clone());
        Ok(setting)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::setting::SettingStatus;

    #[tokio::test]
    async fn test_upsert_and_get() {
        let store = MemoryStore::new();
        let setting = ExchangeSetting::new("eur", 0.92);
        let id = setting.id.clone();

        store.upsert(setting).await.unwrap();
        let loaded = store.get(&id).await.unwrap().unwrap();
        assert_eq!(loaded.currency_code, "eur");

        assert!(store.get("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_find_by_code_normalizes() {
        let store = MemoryStore::new();
        store.upsert(ExchangeSetting::new("eur", 0.92)).await.unwrap();

        let found = store.find_by_code("EUR").await.unwrap();
        assert!(found.is_some());
        assert!(store.find_by_code("gbp").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_upsert_replaces_existing() {
        let store = MemoryStore::new();
        let mut setting = ExchangeSetting::new("eur", 0.92);
        store.upsert(setting.clone()).await.unwrap();

        setting.status = SettingStatus::Disable;
        store.upsert(setting.clone()).await.unwrap();

        let loaded = store.get(&setting.id).await.unwrap().unwrap();
        assert_eq!(loaded.status, SettingStatus::Disable);
        assert_eq!(store.list().await.unwrap().len(), 1);
    }
}
