use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::{Location, News, error::CollectorError};

use super::NewsCollector;

const SOURCE: &str = "NewsAPI";
/// Some results come back as "[Removed]", so ask for more than three.
const PAGE_SIZE: &str = "10";

/// Top headlines from newsapi.org.
#[derive(Debug, Clone)]
pub struct NewsApiClient {
    api_key: String,
    http: Client,
}

impl NewsApiClient {
    pub fn new(http: Client, api_key: String) -> Self {
        Self { api_key, http }
    }

    async fn fetch_headlines(&self, location: &Location) -> Result<News> {
        let url = "https://newsapi.org/v2/top-headlines";
        let country = location.alpha2_code.to_lowercase();

        let res = self
            .http
            .get(url)
            .query(&[("country", country.as_str()), ("pageSize", PAGE_SIZE)])
            .header("X-Api-Key", self.api_key.as_str())
            .send()
            .await
            .context("Failed to send request to NewsAPI (top headlines)")?;

        let status = res.status();
        let body = res.text().await.context("Failed to read NewsAPI response body")?;

        if !status.is_success() {
            return Err(CollectorError::status(SOURCE, status, &body).into());
        }

        parse_headlines(&body)
    }
}

#[derive(Debug, Deserialize)]
struct NaArticle {
    title: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NaResponse {
    status: String,
    message: Option<String>,
    #[serde(default)]
    articles: Vec<NaArticle>,
}

fn parse_headlines(body: &str) -> Result<News> {
    let parsed: NaResponse = serde_json::from_str(body).context("Failed to parse NewsAPI JSON")?;

    if parsed.status != "ok" {
        return Err(anyhow!(
            "NewsAPI returned status '{}': {}",
            parsed.status,
            parsed.message.unwrap_or_default()
        ));
    }

    let titles = parsed
        .articles
        .into_iter()
        .filter_map(|a| a.title)
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty() && t != "[Removed]");

    Ok(News::from_headlines(titles))
}

#[async_trait]
impl NewsCollector for NewsApiClient {
    async fn fetch_top_news(&self, location: &Location) -> Result<News> {
        if location.alpha2_code.is_empty() {
            tracing::debug!(country = %location.name, "no country code, skipping news");
            return Ok(News::from_headlines(Vec::new()));
        }
        self.fetch_headlines(location).await
    }
}
