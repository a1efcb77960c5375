use reqwest::StatusCode;
use thiserror::Error;

use crate::collector::CollectorId;

/// Failures raised by collectors and the timezone service.
///
/// Call sites wrap these in `anyhow::Error` with context; tests and the CLI
/// can still `downcast_ref` to the concrete variant.
#[derive(Debug, Error)]
pub enum CollectorError {
    #[error("{source_name} request failed with status {status}: {body}")]
    Status { source_name: &'static str, status: StatusCode, body: String },

    #[error(
        "No API key configured for collector '{0}'.\n\
         Hint: run `locinfo configure {0}` or set {env}.",
        env = .0.env_var()
    )]
    MissingApiKey(CollectorId),

    #[error("Coordinates ({latitude}, {longitude}) are outside any known timezone")]
    UnknownTimezone { latitude: f64, longitude: f64 },
}

impl CollectorError {
    pub(crate) fn status(source_name: &'static str, status: StatusCode, body: &str) -> Self {
        Self::Status { source_name, status, body: truncate_body(body) }
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        let mut end = MAX;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &body[..end])
    } else {
        body.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn long_bodies_are_truncated() {
        let body = "x".repeat(500);
        let err = CollectorError::status("OpenWeather", StatusCode::BAD_GATEWAY, &body);
        let msg = err.to_string();

        assert!(msg.starts_with("OpenWeather request failed with status 502"));
        assert!(msg.ends_with("..."));
        assert!(msg.len() < 300);
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        // Cyrillic letters are two bytes each, so byte 200 may split one.
        let body = "ж".repeat(150);
        let truncated = truncate_body(&body);

        assert!(truncated.ends_with("..."));
        assert!(truncated.chars().filter(|c| *c == 'ж').count() <= 100);
    }

    #[test]
    fn missing_key_mentions_configure_hint() {
        let msg = CollectorError::MissingApiKey(CollectorId::NewsApi).to_string();

        assert!(msg.contains("No API key configured for collector 'newsapi'"));
        assert!(msg.contains("locinfo configure newsapi"));
        assert!(msg.contains("LOCINFO_NEWSAPI_API_KEY"));
    }
}
