//! Catalog collaborators: where variants and their prices live.

use crate::core::derive::{PriceRecord, Variant, VariantPriceUpdate};
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

#[async_trait]
pub trait Catalog: Send + Sync {
    async fn read_variants(&self) -> Result<Vec<Variant>>;

    /// Replaces the price sets of the named variants in one batch; variants
    /// not named are untouched. Returns the number of variants updated.
    async fn apply_price_updates(&self, updates: Vec<VariantPriceUpdate>) -> Result<usize>;
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct CatalogDocument {
    #[serde(default)]
    variants: Vec<Variant>,
}

/// JSON-document catalog: `{ "variants": [ { "id", "prices": [...] } ] }`.
/// Each apply rewrites the whole document, which makes the batch atomic
/// per call.
pub struct FileCatalog {
    path: PathBuf,
}

impl FileCatalog {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        FileCatalog {
            path: path.as_ref().to_path_buf(),
        }
    }

    fn read_document(&self) -> Result<CatalogDocument> {
        let raw = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read catalog file: {}", self.path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse catalog file: {}", self.path.display()))
    }
}

#[async_trait]
impl Catalog for FileCatalog {
    async fn read_variants(&self) -> Result<Vec<Variant>> {
        let document = self.read_document()?;
        debug!("Loaded {} variants from catalog", document.variants.len());
        Ok(document.variants)
    }

    async fn apply_price_updates(&self, updates: Vec<VariantPriceUpdate>) -> Result<usize> {
        let mut document = self.read_document()?;
        let applied = replace_prices(&mut document.variants, updates, assign_record_id);

        let raw = serde_json::to_string_pretty(&document)?;
        std::fs::write(&self.path, raw)
            .with_context(|| format!("Failed to write catalog file: {}", self.path.display()))?;

        debug!("Applied price updates to {} variants", applied);
        Ok(applied)
    }
}

/// In-memory catalog for tests and dry runs.
pub struct MemoryCatalog {
    inner: Mutex<Vec<Variant>>,
}

impl MemoryCatalog {
    pub fn new(variants: Vec<Variant>) -> Self {
        MemoryCatalog {
            inner: Mutex::new(variants),
        }
    }

    pub async fn snapshot(&self) -> Vec<Variant> {
        self.inner.lock().await.clone()
    }
}

#[async_trait]
impl Catalog for MemoryCatalog {
    async fn read_variants(&self) -> Result<Vec<Variant>> {
        Ok(self.inner.lock().await.clone())
    }

    async fn apply_price_updates(&self, updates: Vec<VariantPriceUpdate>) -> Result<usize> {
        let mut variants = self.inner.lock().await;
        Ok(replace_prices(variants.as_mut_slice(), updates, assign_record_id))
    }
}

/// Applies replacements in place; price records without an id (inserts)
/// get one assigned, since these catalogs are the storage layer.
fn replace_prices(
    variants: &mut [Variant],
    updates: Vec<VariantPriceUpdate>,
    mut new_id: impl FnMut() -> String,
) -> usize {
    let mut by_variant: HashMap<String, Vec<PriceRecord>> = updates
        .into_iter()
        .map(|u| (u.variant_id, u.prices))
        .collect();

    let mut applied = 0usize;
    for variant in variants.iter_mut() {
        if let Some(mut prices) = by_variant.remove(&variant.id) {
            for price in prices.iter_mut() {
                if price.id.is_none() {
                    price.id = Some(new_id());
                }
            }
            variant.prices = prices;
            applied += 1;
        }
    }
    applied
}

fn assign_record_id() -> String {
    format!("price_{}", Uuid::new_v4())
}
