//! Core library for the `locinfo` CLI.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - Collectors for country facts, weather, exchange rates and news
//! - Timezone lookup for the capital
//! - The aggregation pipeline and the table renderer
//!
//! It is used by `locinfo-cli`, but can also be reused by other binaries or services.

pub mod collector;
pub mod config;
pub mod error;
pub mod model;
pub mod pipeline;
pub mod render;
pub mod timezone;

pub use collector::{
    CollectorId, Collectors, CurrencyCollector, LocationResolver, NewsCollector, WeatherCollector,
};
pub use config::{CollectorConfig, Config};
pub use error::CollectorError;
pub use model::{CurrencyRate, CurrencyRates, Language, Location, LocationInfo, News, Weather};
pub use pipeline::Pipeline;
pub use render::{Row, render};
pub use timezone::{TimezoneResolver, TzfTimezoneResolver};
