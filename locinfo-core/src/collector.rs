use crate::{
    Config, CurrencyRates, Location, News, Weather,
    collector::{
        cbr::CbrCurrencyCollector, newsapi::NewsApiClient, openweather::OpenWeatherClient,
        restcountries::RestCountriesResolver,
    },
    error::CollectorError,
};
use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use std::{convert::TryFrom, fmt::Debug, time::Duration};

pub mod cbr;
pub mod newsapi;
pub mod openweather;
pub mod restcountries;

/// Collectors that need an API key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollectorId {
    OpenWeather,
    NewsApi,
}

impl CollectorId {
    pub fn as_str(&self) -> &'static str {
        match self {
            CollectorId::OpenWeather => "openweather",
            CollectorId::NewsApi => "newsapi",
        }
    }

    /// Environment variable that overrides the configured key.
    pub fn env_var(&self) -> &'static str {
        match self {
            CollectorId::OpenWeather => "LOCINFO_OPENWEATHER_API_KEY",
            CollectorId::NewsApi => "LOCINFO_NEWSAPI_API_KEY",
        }
    }

    pub const fn all() -> &'static [CollectorId] {
        &[CollectorId::OpenWeather, CollectorId::NewsApi]
    }
}

impl std::fmt::Display for CollectorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for CollectorId {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let lower = value.to_lowercase();

        match lower.as_str() {
            "openweather" => Ok(CollectorId::OpenWeather),
            "newsapi" => Ok(CollectorId::NewsApi),
            _ => Err(anyhow::anyhow!(
                "Unknown collector '{value}'. Supported collectors: openweather, newsapi."
            )),
        }
    }
}

/// Turns free text into a country with its capital.
#[async_trait]
pub trait LocationResolver: Send + Sync + Debug {
    /// `Ok(None)` when nothing matches the query.
    async fn resolve(&self, query: &str) -> anyhow::Result<Option<Location>>;
}

#[async_trait]
pub trait WeatherCollector: Send + Sync + Debug {
    async fn fetch_weather(&self, latitude: f64, longitude: f64) -> anyhow::Result<Weather>;
}

#[async_trait]
pub trait CurrencyCollector: Send + Sync + Debug {
    async fn fetch_rates(&self, location: &Location) -> anyhow::Result<CurrencyRates>;
}

#[async_trait]
pub trait NewsCollector: Send + Sync + Debug {
    async fn fetch_top_news(&self, location: &Location) -> anyhow::Result<News>;
}

/// The full set of collectors a pipeline runs.
#[derive(Debug)]
pub struct Collectors {
    pub location: Box<dyn LocationResolver>,
    pub weather: Box<dyn WeatherCollector>,
    pub currency: Box<dyn CurrencyCollector>,
    pub news: Box<dyn NewsCollector>,
}

impl Collectors {
    /// Construct the network-backed collectors from config.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let openweather_key = require_api_key(config, CollectorId::OpenWeather)?;
        let newsapi_key = require_api_key(config, CollectorId::NewsApi)?;

        let http = http_client(config.timeout())?;
        let openweather = OpenWeatherClient::new(http.clone(), openweather_key.to_owned());

        Ok(Self {
            location: Box::new(RestCountriesResolver::new(http.clone(), Some(openweather.clone()))),
            weather: Box::new(openweather),
            currency: Box::new(CbrCurrencyCollector::new(http.clone(), config.currencies.clone())),
            news: Box::new(NewsApiClient::new(http, newsapi_key.to_owned())),
        })
    }
}

fn require_api_key(config: &Config, id: CollectorId) -> anyhow::Result<&str> {
    config.api_key(id).ok_or_else(|| CollectorError::MissingApiKey(id).into())
}

/// Shared HTTP client. newsapi.org rejects requests without a user agent.
pub fn http_client(timeout: Duration) -> anyhow::Result<Client> {
    Client::builder()
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .timeout(timeout)
        .build()
        .context("Failed to build HTTP client")
}
