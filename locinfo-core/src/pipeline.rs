use anyhow::{Context, Result};
use chrono::Utc;
use tracing::{debug, info, warn};

use crate::{
    Location, LocationInfo,
    collector::Collectors,
    model::NO_DATA,
    timezone::TimezoneResolver,
};

/// One query from free text to a complete [`LocationInfo`].
///
/// Location resolution gates everything else; weather, currency and news
/// are then fetched concurrently and joined before the record is built.
#[derive(Debug)]
pub struct Pipeline {
    collectors: Collectors,
    timezone: Box<dyn TimezoneResolver>,
}

impl Pipeline {
    pub fn new(collectors: Collectors, timezone: Box<dyn TimezoneResolver>) -> Self {
        Self { collectors, timezone }
    }

    /// `Ok(None)` when the query matches no location; no other collector is
    /// called in that case.
    pub async fn run(&self, query: &str) -> Result<Option<LocationInfo>> {
        let Some(mut location) = self
            .collectors
            .location
            .resolve(query)
            .await
            .context("Failed to resolve location")?
        else {
            info!(query, "location not found");
            return Ok(None);
        };

        self.back_fill_local_time(&mut location);

        let (weather, currency_rates, news) = tokio::try_join!(
            async {
                self.collectors
                    .weather
                    .fetch_weather(location.latitude, location.longitude)
                    .await
                    .context("Failed to fetch weather")
            },
            async {
                self.collectors
                    .currency
                    .fetch_rates(&location)
                    .await
                    .context("Failed to fetch currency rates")
            },
            async {
                self.collectors
                    .news
                    .fetch_top_news(&location)
                    .await
                    .context("Failed to fetch news")
            },
        )?;

        debug!(country = %location.name, rates = currency_rates.len(), "all collectors finished");

        Ok(Some(LocationInfo { location, weather, news, currency_rates }))
    }

    /// A timezone failure is not fatal: both fields fall back to [`NO_DATA`].
    fn back_fill_local_time(&self, location: &mut Location) {
        let resolved = self.timezone.resolve(location.latitude, location.longitude).and_then(|tz| {
            let time = self.timezone.local_time(&tz, Utc::now())?;
            Ok((tz, time))
        });

        match resolved {
            Ok((timezone, current_time)) => location.set_local_time(timezone, current_time),
            Err(err) => {
                warn!(
                    latitude = location.latitude,
                    longitude = location.longitude,
                    "timezone lookup failed: {err:#}"
                );
                location.set_local_time(NO_DATA.to_string(), NO_DATA.to_string());
            }
        }
    }
}
