use std::time::Duration;

use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use log::debug;
use serde::Deserialize;

use crate::config::NetworkConfig;
use crate::models::{ApiTimings, DayTimes};
use crate::prayer_times::{AsrSchool, Coordinates, TimingSource};
use crate::utils::clock::normalize_api_time;

#[derive(Debug, Deserialize)]
struct TimingsResponse {
    status: String,
    data: Option<TimingsData>,
}

#[derive(Debug, Deserialize)]
struct TimingsData {
    timings: DayTimes,
}

/// Client for the AlAdhan daily timings endpoint.
#[derive(Debug, Clone)]
pub struct AlAdhanClient {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl AlAdhanClient {
    pub fn new(network: &NetworkConfig) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(network.request_timeout_secs))
            .connect_timeout(Duration::from_secs(network.connect_timeout_secs))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: network.api_base_url.trim_end_matches('/').to_string(),
        })
    }

    fn timings_url(&self, date: NaiveDate) -> String {
        format!("{}/v1/timings/{}", self.base_url, date.format("%d-%m-%Y"))
    }

    pub fn fetch_day(
        &self,
        position: Coordinates,
        date: NaiveDate,
        method: u8,
        school: AsrSchool,
    ) -> Result<DayTimes> {
        let url = self.timings_url(date);
        debug!("GET {} ({}, {})", url, position.latitude, position.longitude);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("latitude", position.latitude.to_string()),
                ("longitude", position.longitude.to_string()),
                ("method", method.to_string()),
                ("school", school.api_code().to_string()),
            ])
            .send()
            .context("Failed to send request to AlAdhan")?;

        let status = response.status();
        if !status.is_success() {
            bail!("AlAdhan returned error status: {}", status);
        }

        let body: TimingsResponse = response
            .json()
            .context("Failed to parse AlAdhan response")?;
        if body.status != "OK" {
            bail!("AlAdhan answered with status '{}'", body.status);
        }
        let timings = body
            .data
            .map(|d| d.timings)
            .context("AlAdhan response has no timings")?;

        Ok(normalize_day(timings))
    }
}

fn normalize_day(day: DayTimes) -> DayTimes {
    let clean = |t: Option<String>| t.map(|v| normalize_api_time(&v));
    DayTimes {
        fajr: clean(day.fajr),
        sunrise: clean(day.sunrise),
        dhuhr: clean(day.dhuhr),
        asr: clean(day.asr),
        maghrib: clean(day.maghrib),
        isha: clean(day.isha),
    }
}

impl TimingSource for AlAdhanClient {
    fn name(&self) -> &'static str {
        "aladhan"
    }

    fn fetch(
        &self,
        position: Coordinates,
        date: NaiveDate,
        method: u8,
        school: AsrSchool,
    ) -> Result<Option<ApiTimings>> {
        let day = self.fetch_day(position, date, method, school)?;
        Ok(Some(ApiTimings::from_day_times(day)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_uses_day_month_year() {
        let network = NetworkConfig {
            api_base_url: "https://api.aladhan.com/".into(),
            ..NetworkConfig::default()
        };
        let client = AlAdhanClient::new(&network).unwrap();
        let date = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        assert_eq!(
            client.timings_url(date),
            "https://api.aladhan.com/v1/timings/05-03-2024"
        );
    }

    #[test]
    fn response_times_lose_timezone_suffix() {
        let raw: TimingsResponse = serde_json::from_str(
            r#"{"code":200,"status":"OK","data":{"timings":{
                "Fajr":"04:52 (IST)","Sunrise":"06:10 (IST)","Dhuhr":"12:20 (IST)",
                "Asr":"16:38 (IST)","Sunset":"18:29","Maghrib":"18:29 (IST)",
                "Isha":"19:45 (IST)","Imsak":"04:42"}}}"#,
        )
        .unwrap();
        let day = normalize_day(raw.data.unwrap().timings);
        assert_eq!(day.fajr.as_deref(), Some("04:52"));
        assert_eq!(day.isha.as_deref(), Some("19:45"));
    }
}
