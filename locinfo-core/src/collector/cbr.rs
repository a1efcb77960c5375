use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::{collections::HashMap, str::FromStr};
use tracing::debug;

use crate::{CurrencyRates, Location, error::CollectorError};

use super::CurrencyCollector;

const SOURCE: &str = "CBR daily rates";
const DAILY_URL: &str = "https://www.cbr-xml-daily.ru/daily_json.js";
const RUBLE: &str = "RUB";

/// Official daily rates of the Central Bank of Russia.
///
/// Every rate is expressed as rubles per one unit of the foreign currency.
#[derive(Debug, Clone)]
pub struct CbrCurrencyCollector {
    http: Client,
    base_currencies: Vec<String>,
}

impl CbrCurrencyCollector {
    pub fn new(http: Client, base_currencies: Vec<String>) -> Self {
        Self { http, base_currencies }
    }

    async fn fetch_daily(&self) -> Result<CbrDaily> {
        let res = self
            .http
            .get(DAILY_URL)
            .send()
            .await
            .context("Failed to send request to CBR daily rates")?;

        let status = res.status();
        let body = res.text().await.context("Failed to read CBR daily rates response body")?;

        if !status.is_success() {
            return Err(CollectorError::status(SOURCE, status, &body).into());
        }

        serde_json::from_str(&body).context("Failed to parse CBR daily rates JSON")
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct CbrValute {
    nominal: u32,
    value: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct CbrDaily {
    valute: HashMap<String, CbrValute>,
}

/// Base currencies first, then the country's own, without duplicates or rubles.
fn requested_codes(base: &[String], location: &Location) -> Vec<String> {
    let mut codes: Vec<String> = Vec::new();
    for code in base.iter().chain(location.currencies.iter()) {
        let code = code.trim().to_uppercase();
        if code.is_empty() || code == RUBLE || codes.contains(&code) {
            continue;
        }
        codes.push(code);
    }
    codes
}

/// `f64` goes through its shortest textual form so 61.005 stays 61.005.
fn decimal_from_f64(value: f64) -> Option<Decimal> {
    Decimal::from_str(&value.to_string()).ok()
}

fn select_rates(daily: &CbrDaily, codes: &[String]) -> CurrencyRates {
    let mut rates = CurrencyRates::new();
    for code in codes {
        let Some(valute) = daily.valute.get(code) else {
            debug!(code = %code, "currency not published by CBR");
            continue;
        };

        let rate = decimal_from_f64(valute.value)
            .and_then(|value| value.checked_div(Decimal::from(valute.nominal)));
        match rate {
            Some(rate) => rates.insert(code.clone(), rate),
            None => debug!(code = %code, value = valute.value, nominal = valute.nominal, "unusable rate"),
        }
    }
    rates
}

#[async_trait]
impl CurrencyCollector for CbrCurrencyCollector {
    async fn fetch_rates(&self, location: &Location) -> Result<CurrencyRates> {
        let codes = requested_codes(&self.base_currencies, location);
        if codes.is_empty() {
            return Ok(CurrencyRates::new());
        }

        let daily = self.fetch_daily().await?;
        Ok(select_rates(&daily, &codes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DAILY: &str = r#"{
        "Date": "2024-05-18T11:30:00+03:00",
        "Valute": {
            "USD": {"ID": "R01235", "CharCode": "USD", "Nominal": 1, "Name": "Доллар США", "Value": 91.0305, "Previous": 90.9},
            "EUR": {"ID": "R01239", "CharCode": "EUR", "Nominal": 1, "Name": "Евро", "Value": 99.0388, "Previous": 98.5},
            "JPY": {"ID": "R01820", "CharCode": "JPY", "Nominal": 100, "Name": "Японских иен", "Value": 58.4427, "Previous": 58.1},
            "XXX": {"ID": "R0", "CharCode": "XXX", "Nominal": 0, "Name": "broken", "Value": 1.0, "Previous": 1.0}
        }
    }"#;

    fn daily() -> CbrDaily {
        serde_json::from_str(DAILY).expect("valid body")
    }

    fn location_with(currencies: &[&str]) -> Location {
        Location {
            currencies: currencies.iter().map(|c| c.to_string()).collect(),
            ..Location::default()
        }
    }

    fn base() -> Vec<String> {
        vec!["USD".into(), "EUR".into()]
    }

    #[test]
    fn base_currencies_come_first_without_duplicates() {
        let codes = requested_codes(&base(), &location_with(&["jpy", "EUR", "RUB"]));

        assert_eq!(codes, ["USD", "EUR", "JPY"]);
    }

    #[test]
    fn rates_are_per_single_unit() {
        let rates = select_rates(&daily(), &["JPY".to_string()]);

        assert_eq!(rates.get("JPY"), Some(Decimal::from_str("0.584427").unwrap()));
    }

    #[test]
    fn float_values_keep_their_decimal_digits() {
        assert_eq!(decimal_from_f64(61.005), Some(Decimal::from_str("61.005").unwrap()));
    }

    #[test]
    fn unknown_and_unusable_codes_are_skipped() {
        let codes: Vec<String> = ["USD", "ABC", "XXX", "EUR"].map(String::from).to_vec();
        let rates = select_rates(&daily(), &codes);

        let listed: Vec<_> = rates.iter().map(|r| r.code.as_str()).collect();
        assert_eq!(listed, ["USD", "EUR"]);
        assert_eq!(rates.get("USD"), Some(Decimal::from_str("91.0305").unwrap()));
    }

    #[tokio::test]
    async fn ruble_only_country_needs_no_request() {
        // No base currencies and only rubles: nothing to fetch, so no network use.
        let collector = CbrCurrencyCollector::new(Client::new(), Vec::new());
        let rates = collector.fetch_rates(&location_with(&["RUB"])).await.expect("no request");

        assert!(rates.is_empty());
    }
}
