//! Pure rate-resolution and price-derivation logic

pub mod derive;
pub mod merge;
pub mod setting;

// Re-export main types for cleaner imports
pub use derive::{PriceRecord, Variant, VariantPriceUpdate, derive_prices};
pub use merge::{MergedRates, merge_rates};
pub use setting::{
    ExchangeSetting, RateMode, SettingChangeset, SettingStatus, UpdateRequest, plan_update,
};
