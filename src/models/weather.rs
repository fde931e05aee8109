use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Simplified single-day forecast
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ForecastDay {
    pub date: NaiveDate,
    pub avg_temp_c: Option<f64>,
    pub condition_text: Option<String>,
    pub condition_icon: Option<String>,
}

// ============================================================================
// WeatherAPI.com Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct WeatherApiResponse {
    pub forecast: WeatherApiForecast,
}

#[derive(Debug, Deserialize)]
pub struct WeatherApiForecast {
    #[serde(default)]
    pub forecastday: Vec<WeatherApiForecastDay>,
}

#[derive(Debug, Deserialize)]
pub struct WeatherApiForecastDay {
    pub date: NaiveDate,
    pub day: WeatherApiDay,
}

#[derive(Debug, Deserialize)]
pub struct WeatherApiDay {
    #[serde(default)]
    pub avgtemp_c: Option<f64>,
    #[serde(default)]
    pub condition: Option<WeatherApiCondition>,
}

#[derive(Debug, Deserialize)]
pub struct WeatherApiCondition {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
}

impl From<WeatherApiForecastDay> for ForecastDay {
    fn from(day: WeatherApiForecastDay) -> Self {
        let (condition_text, condition_icon) = match day.day.condition {
            Some(condition) => (condition.text, condition.icon),
            None => (None, None),
        };

        ForecastDay {
            date: day.date,
            avg_temp_c: day.day.avgtemp_c,
            condition_text,
            condition_icon,
        }
    }
}
