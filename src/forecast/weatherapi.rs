use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;

use chrono_tz::Tz;

use super::{local_hour_now, next_hour_index, ForecastHour, ForecastSource, NextHour};
use crate::error::{AlertError, Result};

pub const DEFAULT_FORECAST_URL: &str = "http://api.weatherapi.com/v1/forecast.json";
const USER_AGENT: &str = "rain-alert/1.0";

// --- wire shape of the forecast endpoint (only the fields we read) ---

#[derive(Debug, Clone, Deserialize)]
pub struct ForecastResponse {
    pub location: WireLocation,
    pub forecast: WireForecast,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WireLocation {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WireForecast {
    #[serde(default)]
    pub forecastday: Vec<WireDay>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WireDay {
    #[serde(default)]
    pub hour: Vec<WireHour>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WireHour {
    pub time: String,
    #[serde(default)]
    pub precip_mm: f64,
    #[serde(default)]
    pub will_it_rain: i64,
    pub chance_of_rain: i64,
}

impl TryFrom<WireHour> for ForecastHour {
    type Error = AlertError;

    fn try_from(w: WireHour) -> Result<Self> {
        let chance_of_rain = u8::try_from(w.chance_of_rain)
            .ok()
            .filter(|c| *c <= 100)
            .ok_or_else(|| {
                AlertError::MalformedData(format!(
                    "chance_of_rain {} at {} outside 0..=100",
                    w.chance_of_rain, w.time
                ))
            })?;
        if w.precip_mm.is_nan() || w.precip_mm < 0.0 {
            return Err(AlertError::MalformedData(format!(
                "precip_mm {} at {} is not a non-negative number",
                w.precip_mm, w.time
            )));
        }
        Ok(ForecastHour {
            time: w.time,
            precipitation_mm: w.precip_mm,
            chance_of_rain,
            will_it_rain: w.will_it_rain != 0,
        })
    }
}

/// Pick the slot after `current_hour` from the first forecast day.
pub fn select_next_hour(resp: ForecastResponse, current_hour: u32) -> Result<NextHour> {
    let day = resp
        .forecast
        .forecastday
        .into_iter()
        .next()
        .ok_or_else(|| AlertError::MalformedData("no forecast days found".into()))?;

    if day.hour.len() < 24 {
        return Err(AlertError::MalformedData(format!(
            "hourly forecast incomplete: {} of 24 entries",
            day.hour.len()
        )));
    }

    let idx = next_hour_index(current_hour);
    let wire = day
        .hour
        .into_iter()
        .nth(idx)
        .ok_or_else(|| AlertError::MalformedData(format!("missing hour slot {idx}")))?;

    Ok(NextHour {
        location_name: resp.location.name,
        hour: ForecastHour::try_from(wire)?,
    })
}

#[derive(Clone)]
pub struct WeatherApiClient {
    client: Client,
    url: String,
    api_key: String,
    timeout: Duration,
}

impl WeatherApiClient {
    pub fn new(url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            url: url.into(),
            api_key: api_key.into(),
            timeout: Duration::from_secs(10),
        }
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout = Duration::from_secs(secs);
        self
    }

    /// One-day forecast for `location`, decoded but not yet narrowed to an hour.
    pub async fn fetch_day(&self, location: &str) -> Result<ForecastResponse> {
        let resp = self
            .client
            .get(&self.url)
            .timeout(self.timeout)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .query(&[
                ("key", self.api_key.as_str()),
                ("q", location),
                ("days", "1"),
                ("aqi", "no"),
                ("alerts", "no"),
            ])
            .send()
            .await
            .map_err(|e| AlertError::upstream("forecast request failed", e))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(AlertError::Upstream(format!(
                "forecast endpoint returned {status}"
            )));
        }

        let body = resp
            .text()
            .await
            .map_err(|e| AlertError::upstream("reading forecast body", e))?;

        serde_json::from_str(&body)
            .map_err(|e| AlertError::MalformedData(format!("decoding forecast: {e}")))
    }
}

#[async_trait::async_trait]
impl ForecastSource for WeatherApiClient {
    async fn fetch_next_hour(&self, location: &str, tz: Tz) -> Result<NextHour> {
        let day = self.fetch_day(location).await?;
        select_next_hour(day, local_hour_now(tz))
    }
}
