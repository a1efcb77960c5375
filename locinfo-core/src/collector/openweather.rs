use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::{Weather, error::CollectorError};

use super::WeatherCollector;

const SOURCE: &str = "OpenWeather";

/// Current weather and direct geocoding from openweathermap.org.
#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    api_key: String,
    http: Client,
}

impl OpenWeatherClient {
    pub fn new(http: Client, api_key: String) -> Self {
        Self { api_key, http }
    }

    async fn fetch_current(&self, latitude: f64, longitude: f64) -> Result<Weather> {
        let url = "https://api.openweathermap.org/data/2.5/weather";

        let res = self
            .http
            .get(url)
            .query(&[
                ("lat", latitude.to_string()),
                ("lon", longitude.to_string()),
                ("appid", self.api_key.clone()),
                ("units", "metric".to_string()),
                ("lang", "ru".to_string()),
            ])
            .send()
            .await
            .context("Failed to send request to OpenWeather (current weather)")?;

        let status = res.status();
        let body = res
            .text()
            .await
            .context("Failed to read OpenWeather current response body")?;

        if !status.is_success() {
            return Err(CollectorError::status(SOURCE, status, &body).into());
        }

        parse_current(&body)
    }

    /// Coordinates of a city, optionally narrowed to a country.
    ///
    /// `Ok(None)` when the geocoder knows no such place.
    pub async fn geocode(&self, city: &str, alpha2_code: &str) -> Result<Option<(f64, f64)>> {
        let url = "https://api.openweathermap.org/geo/1.0/direct";
        let q = if alpha2_code.is_empty() {
            city.to_string()
        } else {
            format!("{city},{alpha2_code}")
        };

        let res = self
            .http
            .get(url)
            .query(&[("q", q.as_str()), ("limit", "1"), ("appid", self.api_key.as_str())])
            .send()
            .await
            .context("Failed to send request to OpenWeather (geocoding)")?;

        let status = res.status();
        let body = res
            .text()
            .await
            .context("Failed to read OpenWeather geocoding response body")?;

        if !status.is_success() {
            return Err(CollectorError::status(SOURCE, status, &body).into());
        }

        parse_geocoding(&body)
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    description: String,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    main: OwMain,
    weather: Vec<OwWeather>,
    wind: OwWind,
    visibility: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct OwGeocodingEntry {
    lat: f64,
    lon: f64,
}

fn parse_current(body: &str) -> Result<Weather> {
    let parsed: OwCurrentResponse =
        serde_json::from_str(body).context("Failed to parse OpenWeather current JSON")?;

    let description = parsed
        .weather
        .into_iter()
        .next()
        .map(|w| w.description)
        .unwrap_or_else(|| crate::model::NO_DATA.to_string());

    Ok(Weather {
        temperature: parsed.main.temp,
        description,
        visibility: parsed.visibility,
        wind_speed: parsed.wind.speed,
    })
}

fn parse_geocoding(body: &str) -> Result<Option<(f64, f64)>> {
    let parsed: Vec<OwGeocodingEntry> =
        serde_json::from_str(body).context("Failed to parse OpenWeather geocoding JSON")?;

    Ok(parsed.first().map(|entry| (entry.lat, entry.lon)))
}

#[async_trait]
impl WeatherCollector for OpenWeatherClient {
    async fn fetch_weather(&self, latitude: f64, longitude: f64) -> Result<Weather> {
        tracing::debug!(latitude, longitude, "fetching current weather");
        self.fetch_current(latitude, longitude).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_current_weather() {
        let body = r#"{
            "coord": {"lon": 2.3488, "lat": 48.8534},
            "weather": [{"id": 800, "main": "Clear", "description": "ясно", "icon": "01d"}],
            "main": {"temp": 18.5, "feels_like": 17.9, "pressure": 1021, "humidity": 60},
            "visibility": 10000,
            "wind": {"speed": 3.6, "deg": 250},
            "dt": 1700000000,
            "name": "Paris"
        }"#;

        let weather = parse_current(body).expect("valid body");

        assert_eq!(weather.temperature, 18.5);
        assert_eq!(weather.description, "ясно");
        assert_eq!(weather.visibility, Some(10000));
        assert_eq!(weather.wind_speed, 3.6);
    }

    #[test]
    fn missing_visibility_and_description_are_tolerated() {
        let body = r#"{"weather": [], "main": {"temp": -2.0}, "wind": {"speed": 0.5}}"#;

        let weather = parse_current(body).expect("valid body");

        assert_eq!(weather.visibility, None);
        assert_eq!(weather.description, crate::model::NO_DATA);
    }

    #[test]
    fn malformed_current_weather_is_an_error() {
        let err = parse_current(r#"{"cod": 401}"#).unwrap_err();
        assert!(err.to_string().contains("Failed to parse OpenWeather current JSON"));
    }

    #[test]
    fn geocoding_takes_first_match() {
        let body = r#"[
            {"name": "Paris", "lat": 48.8588897, "lon": 2.3200410, "country": "FR"},
            {"name": "Paris", "lat": 33.66, "lon": -95.55, "country": "US"}
        ]"#;

        assert_eq!(parse_geocoding(body).expect("valid body"), Some((48.8588897, 2.3200410)));
    }

    #[test]
    fn geocoding_without_matches_is_none() {
        assert_eq!(parse_geocoding("[]").expect("valid body"), None);
    }
}
