//! Weekly weather context from Open-Meteo.

use chrono::{Datelike, Local};

use crate::error::{AppError, AppResult};
use crate::models::{ApiForecast, WeatherDay, WeeklyWeather};

/// Known cities; unknown cities fall back to the first entry (Tokyo).
const CITY_COORDS: &[(&str, f64, f64)] = &[
    ("Tokyo", 35.6895, 139.6917),
    ("Osaka", 34.6937, 135.5023),
    ("Sapporo", 43.0618, 141.3545),
    ("Fukuoka", 33.5902, 130.4017),
];

pub const DEFAULT_CITY: &str = "Tokyo";

/// Neutral feel used when no forecast is available.
pub const NEUTRAL_FEEL: &str = "快適";

const FEEL_COLD_BELOW_C: f64 = 10.0;
const FEEL_COOL_BELOW_C: f64 = 18.0;
const FEEL_COMFORTABLE_BELOW_C: f64 = 24.0;
const FEEL_WARM_BELOW_C: f64 = 30.0;

/// Fetches the weekly forecast for a city.
pub struct WeatherService {
    http_client: reqwest::Client,
    api_url: String,
}

impl WeatherService {
    pub fn new(api_url: String) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            api_url,
        }
    }

    pub async fn weekly(&self, city: &str) -> AppResult<WeeklyWeather> {
        let (lat, lon) = city_coords(city);

        let response = self
            .http_client
            .get(&self.api_url)
            .query(&[
                ("latitude", lat.to_string()),
                ("longitude", lon.to_string()),
                (
                    "daily",
                    "temperature_2m_max,temperature_2m_min".to_string(),
                ),
                ("timezone", "Asia/Tokyo".to_string()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!(
                "Weather API returned status {}: {}",
                status, body
            )));
        }

        let forecast: ApiForecast = response.json().await?;
        let weekly = into_weekly(city, forecast);

        tracing::info!(city, days = weekly.days.len(), "forecast fetched");

        Ok(weekly)
    }
}

fn city_coords(city: &str) -> (f64, f64) {
    CITY_COORDS
        .iter()
        .find(|(name, _, _)| *name == city)
        .or_else(|| CITY_COORDS.first())
        .map(|(_, lat, lon)| (*lat, *lon))
        .unwrap_or((35.6895, 139.6917))
}

fn into_weekly(city: &str, forecast: ApiForecast) -> WeeklyWeather {
    let days = forecast
        .daily
        .map(|daily| {
            daily
                .time
                .iter()
                .zip(daily.temperature_2m_max.iter())
                .zip(daily.temperature_2m_min.iter())
                .map(|((date, max_c), min_c)| WeatherDay {
                    date: date.clone(),
                    max_c: *max_c,
                    min_c: *min_c,
                    feel: temp_to_feel(*max_c),
                })
                .collect()
        })
        .unwrap_or_default();

    WeeklyWeather {
        city: city.to_string(),
        days,
    }
}

/// Maps a temperature to the feel label used in prompts and responses.
pub fn temp_to_feel(temp_c: f64) -> &'static str {
    if temp_c < FEEL_COLD_BELOW_C {
        "寒い"
    } else if temp_c < FEEL_COOL_BELOW_C {
        "涼しい"
    } else if temp_c < FEEL_COMFORTABLE_BELOW_C {
        "快適"
    } else if temp_c < FEEL_WARM_BELOW_C {
        "やや暑い"
    } else {
        "暑い"
    }
}

/// The season label for a month number.
pub fn season_for_month(month: u32) -> &'static str {
    match month {
        12 | 1 | 2 => "冬",
        3..=5 => "春",
        6..=8 => "夏",
        _ => "秋",
    }
}

/// The season label for today.
pub fn current_season() -> &'static str {
    season_for_month(Local::now().month())
}
