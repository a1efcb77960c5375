use anyhow::{Result, anyhow};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use std::fmt::Debug;
use tzf_rs::DefaultFinder;

use crate::error::CollectorError;

/// Maps coordinates to IANA timezones and formats local wall-clock time.
pub trait TimezoneResolver: Send + Sync + Debug {
    /// IANA name, e.g. `Europe/Paris`.
    fn resolve(&self, latitude: f64, longitude: f64) -> Result<String>;

    /// `now` rendered as `HH:MM:SS` in `timezone`.
    fn local_time(&self, timezone: &str, now: DateTime<Utc>) -> Result<String> {
        let tz: Tz = timezone
            .parse()
            .map_err(|_| anyhow!("Unknown IANA timezone '{timezone}'"))?;
        Ok(now.with_timezone(&tz).format("%H:%M:%S").to_string())
    }
}

/// Offline lookup backed by the polygon index bundled with `tzf-rs`.
///
/// Building the index takes a noticeable moment, so construct it once and
/// share it.
pub struct TzfTimezoneResolver {
    finder: DefaultFinder,
}

impl TzfTimezoneResolver {
    pub fn new() -> Self {
        Self { finder: DefaultFinder::new() }
    }
}

impl Default for TzfTimezoneResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl Debug for TzfTimezoneResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TzfTimezoneResolver").finish_non_exhaustive()
    }
}

impl TimezoneResolver for TzfTimezoneResolver {
    fn resolve(&self, latitude: f64, longitude: f64) -> Result<String> {
        let name = self.finder.get_tz_name(longitude, latitude);
        if name.is_empty() {
            return Err(CollectorError::UnknownTimezone { latitude, longitude }.into());
        }
        Ok(name.to_string())
    }
}
