pub mod catalog;
pub mod config;
pub mod core;
pub mod error;
pub mod log;
pub mod providers;
pub mod rate_provider;
pub mod registry;
pub mod store;
pub mod sync;
pub mod ui;

use crate::catalog::FileCatalog;
use crate::config::AppConfig;
use crate::core::setting::UpdateRequest;
use crate::providers::frankfurter::FrankfurterProvider;
use crate::registry::{ListParams, SettingRegistry};
use crate::store::disk::FjallStore;
use anyhow::Result;
use std::sync::Arc;
use tracing::{debug, info};

pub enum AppCommand {
    Sync,
    Enable { currency_codes: Vec<String> },
    Update { id: String, request: UpdateRequest },
    List { params: ListParams },
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let provider = Arc::new(FrankfurterProvider::new(&config.provider.base_url)?);
    let store = Arc::new(FjallStore::open(&config.store_path()?)?);
    let catalog = FileCatalog::new(&config.catalog_path);
    let base_source = Arc::new(config.clone());
    let registry = SettingRegistry::new(store.clone(), provider.clone(), base_source.clone());

    match command {
        AppCommand::Sync => {
            let report = sync::run_sync(
                provider.as_ref(),
                base_source.as_ref(),
                store.as_ref(),
                &catalog,
            )
            .await?;
            println!("{}", ui::render_sync_report(&report));
        }
        AppCommand::Enable { currency_codes } => {
            for code in &currency_codes {
                let setting = registry.enable(code).await?;
                info!(code = %setting.currency_code, rate = setting.exchange_rate, "Currency enabled");
                println!(
                    "Enabled {} at rate {} (id {})",
                    setting.currency_code.to_uppercase(),
                    setting.exchange_rate,
                    setting.id
                );
            }
        }
        AppCommand::Update { id, request } => {
            let setting = registry.update(&id, &request).await?;
            println!("{}", ui::render_settings_table(std::slice::from_ref(&setting)));
        }
        AppCommand::List { params } => {
            let settings = registry.list(&params).await?;
            if settings.is_empty() {
                println!("No exchange settings configured.");
            } else {
                println!("{}", ui::render_settings_table(&settings));
            }
        }
    }

    Ok(())
}
