//! Exchange setting model and the update decision table.
//!
//! A setting pairs a currency code with a rate and two orthogonal toggles:
//! `mode` (where the rate comes from) and `status` (whether the currency
//! participates in price propagation). Updates are planned as an immutable
//! [`SettingChangeset`] so the branch precedence is an explicit, testable
//! contract rather than a pile of conditional mutations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;
use uuid::Uuid;

/// Upper bound accepted for any exchange rate, manual or provider-sourced.
pub const MAX_EXCHANGE_RATE: f64 = 999_999.0;

/// Normalizes a currency code the way every boundary stores and compares it.
pub fn normalize_code(code: &str) -> String {
    code.trim().to_lowercase()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RateMode {
    /// Rate is user-pinned and frozen until the next manual edit.
    Manual,
    /// Rate is provider-sourced and refreshed on each sync or mode switch.
    Auto,
}

impl Display for RateMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RateMode::Manual => write!(f, "manual"),
            RateMode::Auto => write!(f, "auto"),
        }
    }
}

impl FromStr for RateMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "manual" => Ok(RateMode::Manual),
            "auto" => Ok(RateMode::Auto),
            _ => Err(anyhow::anyhow!("Invalid rate mode: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SettingStatus {
    /// Currency participates in price propagation.
    Enable,
    /// Setting is frozen but kept; disabled currencies are never deleted.
    Disable,
}

impl Display for SettingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SettingStatus::Enable => write!(f, "enable"),
            SettingStatus::Disable => write!(f, "disable"),
        }
    }
}

impl FromStr for SettingStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "enable" => Ok(SettingStatus::Enable),
            "disable" => Ok(SettingStatus::Disable),
            _ => Err(anyhow::anyhow!("Invalid setting status: {}", s)),
        }
    }
}

/// Per-currency exchange configuration. At most one exists per currency
/// code; the base currency never has one (it is implicit, always rate 1).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExchangeSetting {
    pub id: String,
    pub currency_code: String,
    pub exchange_rate: f64,
    pub mode: RateMode,
    pub status: SettingStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ExchangeSetting {
    /// Fresh setting for a newly enabled currency: auto mode, enabled, with
    /// the provider rate captured at creation time.
    pub fn new(currency_code: &str, exchange_rate: f64) -> Self {
        let now = Utc::now();
        ExchangeSetting {
            id: Uuid::new_v4().to_string(),
            currency_code: normalize_code(currency_code),
            exchange_rate,
            mode: RateMode::Auto,
            status: SettingStatus::Enable,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.status == SettingStatus::Enable
    }

    /// Applies a planned changeset. Absent fields keep their stored value.
    pub fn apply(&mut self, change: &SettingChangeset) {
        if let Some(status) = change.status {
            self.status = status;
        }
        if let Some(mode) = change.mode {
            self.mode = mode;
        }
        if let Some(rate) = change.exchange_rate {
            self.exchange_rate = rate;
        }
        self.updated_at = Utc::now();
    }
}

/// Fields an admin update may carry. All optional; boundary validation has
/// already checked ranges and enum values by the time this reaches the core.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateRequest {
    pub status: Option<SettingStatus>,
    pub mode: Option<RateMode>,
    pub exchange_rate: Option<f64>,
}

/// The planned outcome of an update. `None` fields are untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SettingChangeset {
    pub status: Option<SettingStatus>,
    pub mode: Option<RateMode>,
    pub exchange_rate: Option<f64>,
}

impl SettingChangeset {
    /// An empty changeset is a no-op update that still succeeds.
    pub fn is_empty(&self) -> bool {
        self.status.is_none() && self.mode.is_none() && self.exchange_rate.is_none()
    }
}

/// Plans an update against the current setting.
///
/// Branch precedence, first match wins for the mode/rate half (status is
/// handled independently first):
/// 1. a supplied `status` that differs from the current one is applied;
/// 2. switching to auto takes `provider_rate` when the caller resolved one;
///    when the provider had no rate for this code, the mode still flips but
///    the stored rate survives (known asymmetry, kept on purpose);
/// 3. switching to manual takes the request rate when supplied;
/// 4. otherwise a supplied rate alone becomes a rate-only change — for auto
///    mode a temporary override until the next refresh.
pub fn plan_update(
    current: &ExchangeSetting,
    request: &UpdateRequest,
    provider_rate: Option<f64>,
) -> SettingChangeset {
    let mut change = SettingChangeset::default();

    if let Some(status) = request.status {
        if status != current.status {
            change.status = Some(status);
        }
    }

    match request.mode {
        Some(RateMode::Auto) if current.mode != RateMode::Auto => {
            change.mode = Some(RateMode::Auto);
            change.exchange_rate = provider_rate;
        }
        Some(RateMode::Manual) if current.mode != RateMode::Manual => {
            change.mode = Some(RateMode::Manual);
            change.exchange_rate = request.exchange_rate;
        }
        _ => {
            change.exchange_rate = request.exchange_rate;
        }
    }

    change
}
