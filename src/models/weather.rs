use serde::{Deserialize, Serialize};

/// Raw Open-Meteo forecast response.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiForecast {
    #[serde(default)]
    pub daily: Option<ApiDailySeries>,
}

/// Parallel arrays of the daily forecast series.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiDailySeries {
    pub time: Vec<String>,
    pub temperature_2m_max: Vec<f64>,
    pub temperature_2m_min: Vec<f64>,
}

/// One forecast day with the derived temperature-feel label.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherDay {
    pub date: String,
    pub max_c: f64,
    pub min_c: f64,
    pub feel: &'static str,
}

/// A week of forecast days for one city.
#[derive(Debug, Clone, Serialize)]
pub struct WeeklyWeather {
    pub city: String,
    pub days: Vec<WeatherDay>,
}

impl WeeklyWeather {
    /// The feel label for the first forecast day, if any.
    pub fn today_feel(&self) -> Option<&'static str> {
        self.days.first().map(|d| d.feel)
    }
}
