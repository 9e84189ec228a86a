//! Failure kinds the orchestrating caller needs to tell apart.
//!
//! Everything else propagates as plain `anyhow` context; these are the
//! cases where retry policy differs, so they stay downcastable.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExchangeError {
    /// No default currency configured for the store; fatal to any sync,
    /// enable, or switch-to-auto operation.
    #[error("No default currency configured for the store")]
    BaseCurrencyNotFound,

    /// Provider omitted the requested code; fatal for a single-currency
    /// enable, degraded to per-variant skips during sync.
    #[error("Exchange rate not found for currency: {0}")]
    RateNotFound(String),

    /// Update addressed to an unknown setting id.
    #[error("Exchange setting not found: {0}")]
    SettingNotFound(String),
}
