use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;
use tracing::debug;

use crate::{Language, Location, error::CollectorError};

use super::{LocationResolver, openweather::OpenWeatherClient};

const SOURCE: &str = "REST Countries";
const BASE_URL: &str = "https://restcountries.com/v2";
const FIELDS: &str = "name,alpha2Code,capital,subregion,population,latlng,area,languages,currencies";

#[derive(Debug, Clone, Copy)]
enum Endpoint {
    Name,
    Capital,
}

impl Endpoint {
    fn as_str(&self) -> &'static str {
        match self {
            Endpoint::Name => "name",
            Endpoint::Capital => "capital",
        }
    }
}

/// Country lookup against restcountries.com.
///
/// Capital coordinates come from the OpenWeather geocoder when one is given;
/// otherwise (or when geocoding fails) the country's own coordinates are used.
#[derive(Debug, Clone)]
pub struct RestCountriesResolver {
    http: Client,
    geocoder: Option<OpenWeatherClient>,
}

impl RestCountriesResolver {
    pub fn new(http: Client, geocoder: Option<OpenWeatherClient>) -> Self {
        Self { http, geocoder }
    }

    async fn search(&self, endpoint: Endpoint, term: &str) -> Result<Vec<RcCountry>> {
        let mut url = Url::parse(BASE_URL).context("Invalid REST Countries base URL")?;
        url.path_segments_mut()
            .map_err(|_| anyhow!("REST Countries base URL cannot have path segments"))?
            .push(endpoint.as_str())
            .push(term);

        let res = self
            .http
            .get(url)
            .query(&[("fields", FIELDS)])
            .send()
            .await
            .with_context(|| {
                format!("Failed to send request to REST Countries ({})", endpoint.as_str())
            })?;

        let status = res.status();
        let body = res.text().await.context("Failed to read REST Countries response body")?;

        if status == StatusCode::NOT_FOUND {
            return Ok(Vec::new());
        }
        if !status.is_success() {
            return Err(CollectorError::status(SOURCE, status, &body).into());
        }

        parse_countries(&body)
    }

    async fn find_country(&self, term: &str) -> Result<Option<RcCountry>> {
        for endpoint in [Endpoint::Name, Endpoint::Capital] {
            let found = self.search(endpoint, term).await?;
            if let Some(country) = best_match(found, endpoint, term) {
                debug!(term, endpoint = endpoint.as_str(), country = %country.name, "country found");
                return Ok(Some(country));
            }
        }
        Ok(None)
    }

    async fn capital_coordinates(&self, location: &Location) -> Option<(f64, f64)> {
        let geocoder = self.geocoder.as_ref()?;
        if location.capital.is_empty() {
            return None;
        }

        match geocoder.geocode(&location.capital, &location.alpha2_code).await {
            Ok(coordinates) => coordinates,
            Err(err) => {
                debug!(capital = %location.capital, "capital geocoding failed: {err:#}");
                None
            }
        }
    }
}

#[async_trait]
impl LocationResolver for RestCountriesResolver {
    async fn resolve(&self, query: &str) -> Result<Option<Location>> {
        for term in search_terms(query) {
            if let Some(country) = self.find_country(&term).await? {
                let mut location = Location::from(country);
                if let Some((latitude, longitude)) = self.capital_coordinates(&location).await {
                    location.latitude = latitude;
                    location.longitude = longitude;
                }
                return Ok(Some(location));
            }
        }

        debug!(query, "no country matches the query");
        Ok(None)
    }
}

/// The whole query first, then each comma-separated part.
fn search_terms(query: &str) -> Vec<String> {
    let mut terms: Vec<String> = Vec::new();
    let whole = query.trim();
    if whole.is_empty() {
        return terms;
    }
    terms.push(whole.to_string());

    for part in whole.split(',').map(str::trim).filter(|part| !part.is_empty()) {
        if !terms.iter().any(|t| t.eq_ignore_ascii_case(part)) {
            terms.push(part.to_string());
        }
    }
    terms
}

/// Searches match substrings, so prefer an exact (case-insensitive) hit.
fn best_match(countries: Vec<RcCountry>, endpoint: Endpoint, term: &str) -> Option<RcCountry> {
    let term = term.to_lowercase();
    let exact = countries.iter().position(|c| {
        let candidate = match endpoint {
            Endpoint::Name => Some(c.name.as_str()),
            Endpoint::Capital => c.capital.as_deref(),
        };
        candidate.is_some_and(|value| value.to_lowercase() == term)
    });

    let idx = exact.unwrap_or(0);
    countries.into_iter().nth(idx)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RcLanguage {
    name: String,
    #[serde(default)]
    native_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RcCurrency {
    code: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RcCountry {
    name: String,
    #[serde(default)]
    alpha2_code: String,
    capital: Option<String>,
    subregion: Option<String>,
    #[serde(default)]
    population: u64,
    #[serde(default)]
    latlng: Vec<f64>,
    area: Option<f64>,
    #[serde(default)]
    languages: Vec<RcLanguage>,
    #[serde(default)]
    currencies: Vec<RcCurrency>,
}

impl From<RcCountry> for Location {
    fn from(c: RcCountry) -> Self {
        let (latitude, longitude) = match c.latlng.as_slice() {
            [lat, lon, ..] => (*lat, *lon),
            _ => (0.0, 0.0),
        };

        Location {
            name: c.name,
            alpha2_code: c.alpha2_code,
            capital: c.capital.unwrap_or_default(),
            latitude,
            longitude,
            area: c.area,
            population: c.population,
            subregion: c.subregion.unwrap_or_default(),
            languages: c
                .languages
                .into_iter()
                .map(|l| Language {
                    native_name: l.native_name.unwrap_or_else(|| l.name.clone()),
                    name: l.name,
                })
                .collect(),
            currencies: c.currencies.into_iter().filter_map(|cur| cur.code).collect(),
            ..Location::default()
        }
    }
}

fn parse_countries(body: &str) -> Result<Vec<RcCountry>> {
    serde_json::from_str(body).context("Failed to parse REST Countries JSON")
}
