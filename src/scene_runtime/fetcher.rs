use std::sync::mpsc::{self, Receiver};

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use serde::Deserialize;

use crate::sky_core::suntimes::{parse_clock_time, TimeWindow};

#[derive(Debug, Deserialize)]
struct SunApiResponse {
    results: SunApiResults,
    status: String,
}

#[derive(Debug, Deserialize)]
struct SunApiResults {
    sunrise: String,
    sunset: String,
}

/// One-shot background fetch of today's sunrise/sunset from
/// api.sunrisesunset.io. The frame loop polls `try_take()`; nothing
/// here ever blocks it. There is no retry: a failed fetch leaves the
/// scene without bounds for the rest of the session.
pub struct SunTimesFetcher {
    rx: Receiver<Result<TimeWindow>>,
}

impl SunTimesFetcher {
    pub fn spawn(latitude: f64, longitude: f64, date: NaiveDate) -> Self {
        let (tx, rx) = mpsc::channel();

        let spawned = std::thread::Builder::new()
            .name("sun-times-fetch".to_string())
            .spawn(move || {
                let _ = tx.send(fetch_window(latitude, longitude, date));
            });
        if let Err(e) = spawned {
            log::warn!("failed to spawn sun times fetch thread: {e}");
        }

        Self { rx }
    }

    /// Non-blocking poll. Yields the fetch outcome exactly once, then
    /// `None` forever.
    pub fn try_take(&self) -> Option<Result<TimeWindow>> {
        self.rx.try_recv().ok()
    }
}

fn fetch_window(latitude: f64, longitude: f64, date: NaiveDate) -> Result<TimeWindow> {
    let url = format!("https://api.sunrisesunset.io/json?lat={latitude}&lng={longitude}");
    let response: SunApiResponse = reqwest::blocking::get(&url)
        .context("sun times request failed")?
        .json()
        .context("sun times response was not valid json")?;

    if response.status != "OK" {
        bail!("sun times api returned status {:?}", response.status);
    }

    let sunrise = parse_clock_time(&response.results.sunrise, date)?;
    let sunset = parse_clock_time(&response.results.sunset, date)?;
    TimeWindow::new(sunrise, sunset)
}

#[cfg(test)]
mod tests {
    use super::SunApiResponse;

    #[test]
    fn response_shape_matches_the_api_payload() {
        let parsed: SunApiResponse = serde_json::from_str(
            r#"{
                "results": {
                    "date": "2024-06-01",
                    "sunrise": "5:26:12 AM",
                    "sunset": "8:19:46 PM",
                    "day_length": "14:53:34"
                },
                "status": "OK"
            }"#,
        )
        .unwrap();

        assert_eq!(parsed.status, "OK");
        assert_eq!(parsed.results.sunrise, "5:26:12 AM");
        assert_eq!(parsed.results.sunset, "8:19:46 PM");
    }
}
