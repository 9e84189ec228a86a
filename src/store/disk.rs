use crate::core::setting::{ExchangeSetting, normalize_code};
use crate::store::SettingStore;
use anyhow::{Context, Result};
use async_trait::async_trait;
use fjall::{Keyspace, PartitionCreateOptions, PartitionHandle};
use std::path::Path;
use tracing::debug;

/// Fjall-backed setting store: one partition, setting id as key,
/// JSON-encoded value. The collection stays tiny (one row per currency),
/// so code lookups scan the partition.
pub struct FjallStore {
    _keyspace: Keyspace,
    partition: PartitionHandle,
}

impl FjallStore {
    pub fn open(path: &Path) -> Result<Self> {
        std::fs::create_dir_all(path)
            .with_context(|| format!("Failed to create store directory: {}", path.display()))?;

        let keyspace = fjall::Config::new(path)
            .open()
            .with_context(|| format!("Failed to open setting store at {}", path.display()))?;
        let partition =
            keyspace.open_partition("exchange_settings", PartitionCreateOptions::default())?;

        Ok(Self {
            _keyspace: keyspace,
            partition,
        })
    }

    fn decode(bytes: &[u8]) -> Result<ExchangeSetting> {
        serde_json::from_slice(bytes).context("Corrupt exchange setting record")
    }
}

#[async_trait]
impl SettingStore for FjallStore {
    async fn list(&self) -> Result<Vec<ExchangeSetting>> {
        let mut settings = Vec::new();
        for kv in self.partition.iter() {
            let (_, value) = kv?;
            settings.push(Self::decode(&value)?);
        }
        debug!("Loaded {} exchange settings from disk", settings.len());
        Ok(settings)
    }

    async fn get(&self, id: &str) -> Result<Option<ExchangeSetting>> {
        match self.partition.get(id)? {
            Some(value) => Ok(Some(Self::decode(&value)?)),
            None => Ok(None),
        }
    }

    async fn find_by_code(&self, currency_code: &str) -> Result<Option<ExchangeSetting>> {
        let code = normalize_code(currency_code);
        for kv in self.partition.iter() {
            let (_, value) = kv?;
            let setting = Self::decode(&value)?;
            if setting.currency_code == code {
                return Ok(Some(setting));
            }
        }
        Ok(None)
    }

    async fn upsert(&self, setting: ExchangeSetting) -> Result<ExchangeSetting> {
        self.partition
            .insert(setting.id.as_bytes(), serde_json::to_vec(&setting)?)?;
        debug!(code = %setting.currency_code, "Persisted exchange setting");
        Ok(setting)
    }
}
