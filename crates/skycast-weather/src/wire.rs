//! Provider payload schema for `forecast.json`.
//!
//! Every field is optional and unknown fields are ignored: the provider has
//! added humidity, astro and hourly data over time and older payloads must
//! still parse. Only the place name and a current temperature are required.

use serde::{Deserialize, Deserializer};
use thiserror::Error;

use crate::types::{
    Astro, Condition, CurrentConditions, DayForecast, ForecastSnapshot, HourForecast, Place,
};

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Missing required field: {0}")]
    MissingField(&'static str),
}

/// Parse a provider response body into a chronologically ordered snapshot.
pub fn parse_forecast(body: &str) -> Result<ForecastSnapshot, ParseError> {
    let wire: WireForecast = serde_json::from_str(body)?;
    wire.into_snapshot()
}

/// Extract `error.message` from a provider error body, if present.
pub fn parse_error_message(body: &str) -> Option<String> {
    serde_json::from_str::<WireErrorBody>(body)
        .ok()?
        .error?
        .message
        .filter(|m| !m.is_empty())
}

#[derive(Debug, Deserialize)]
struct WireErrorBody {
    error: Option<WireErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct WireErrorDetail {
    #[allow(dead_code)]
    code: Option<i64>,
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct WireForecast {
    location: Option<WireLocation>,
    current: Option<WireCurrent>,
    forecast: Option<WireForecastBlock>,
}

#[derive(Debug, Deserialize)]
struct WireLocation {
    name: Option<String>,
    region: Option<String>,
    country: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct WireCondition {
    text: Option<String>,
    icon: Option<String>,
    code: Option<i32>,
}

#[derive(Debug, Deserialize)]
struct WireCurrent {
    last_updated_epoch: Option<i64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    temp_c: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    temp_f: Option<f64>,
    condition: Option<WireCondition>,
    #[serde(default, deserialize_with = "lenient_f64")]
    humidity: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    feelslike_c: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    feelslike_f: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    uv: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pressure_mb: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pressure_in: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    wind_kph: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    wind_mph: Option<f64>,
    wind_dir: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireForecastBlock {
    forecastday: Option<Vec<WireForecastDay>>,
}

#[derive(Debug, Deserialize)]
struct WireForecastDay {
    date_epoch: Option<i64>,
    day: Option<WireDay>,
    astro: Option<WireAstro>,
    hour: Option<Vec<WireHour>>,
}

#[derive(Debug, Deserialize)]
struct WireDay {
    #[serde(default, deserialize_with = "lenient_f64")]
    maxtemp_c: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    maxtemp_f: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    mintemp_c: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    mintemp_f: Option<f64>,
    // Older payloads send this as a string ("87").
    #[serde(default, deserialize_with = "lenient_f64")]
    daily_chance_of_rain: Option<f64>,
    condition: Option<WireCondition>,
}

#[derive(Debug, Deserialize)]
struct WireAstro {
    sunrise: Option<String>,
    sunset: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireHour {
    time_epoch: Option<i64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    temp_c: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    temp_f: Option<f64>,
    condition: Option<WireCondition>,
}

/// Accepts a JSON number or a numeric string; anything else becomes `None`.
fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => n.as_f64(),
        Some(serde_json::Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

fn c_to_f(c: f64) -> f64 {
    c * 9.0 / 5.0 + 32.0
}

fn f_to_c(f: f64) -> f64 {
    (f - 32.0) * 5.0 / 9.0
}

/// Pair of Celsius/Fahrenheit values, deriving whichever side is missing.
fn temperature_pair(c: Option<f64>, f: Option<f64>) -> Option<(f64, f64)> {
    match (c, f) {
        (Some(c), Some(f)) => Some((c, f)),
        (Some(c), None) => Some((c, c_to_f(c))),
        (None, Some(f)) => Some((f_to_c(f), f)),
        (None, None) => None,
    }
}

fn percent(value: Option<f64>) -> Option<u8> {
    value.map(|v| v.round().clamp(0.0, 100.0) as u8)
}

fn condition(wire: Option<WireCondition>) -> Condition {
    let wire = wire.unwrap_or_default();
    Condition {
        text: wire.text.unwrap_or_default(),
        icon: wire.icon.unwrap_or_default(),
        code: wire.code,
    }
}

impl WireForecast {
    pub fn into_snapshot(self) -> Result<ForecastSnapshot, ParseError> {
        let location = self.location.ok_or(ParseError::MissingField("location"))?;
        let name = location
            .name
            .filter(|n| !n.is_empty())
            .ok_or(ParseError::MissingField("location.name"))?;

        let current = self.current.ok_or(ParseError::MissingField("current"))?;
        let (temp_c, temp_f) = temperature_pair(current.temp_c, current.temp_f)
            .ok_or(ParseError::MissingField("current.temp_c"))?;

        let current = CurrentConditions {
            observed_at_epoch: current.last_updated_epoch.unwrap_or_default(),
            temp_c,
            temp_f,
            condition: condition(current.condition),
            humidity_pct: percent(current.humidity),
            feels_like_c: current.feelslike_c,
            feels_like_f: current.feelslike_f,
            uv_index: current.uv,
            pressure_mb: current.pressure_mb,
            pressure_in: current.pressure_in,
            wind_kph: current.wind_kph,
            wind_mph: current.wind_mph,
            wind_direction: current.wind_dir,
        };

        let daily = self
            .forecast
            .and_then(|f| f.forecastday)
            .unwrap_or_default()
            .into_iter()
            .filter_map(WireForecastDay::into_day)
            .collect();

        let mut snapshot = ForecastSnapshot {
            location: Place {
                name,
                region: location.region.unwrap_or_default(),
                country: location.country.unwrap_or_default(),
            },
            current,
            daily,
        };
        snapshot.sort_chronologically();
        Ok(snapshot)
    }
}

impl WireForecastDay {
    fn into_day(self) -> Option<DayForecast> {
        let Some(date_epoch) = self.date_epoch else {
            tracing::debug!("Dropping forecast day without date_epoch");
            return None;
        };
        let Some(day) = self.day else {
            tracing::debug!(date_epoch, "Dropping forecast day without day summary");
            return None;
        };
        let (Some((max_c, max_f)), Some((min_c, min_f))) = (
            temperature_pair(day.maxtemp_c, day.maxtemp_f),
            temperature_pair(day.mintemp_c, day.mintemp_f),
        ) else {
            tracing::debug!(date_epoch, "Dropping forecast day without temperatures");
            return None;
        };

        let hourly = self
            .hour
            .unwrap_or_default()
            .into_iter()
            .filter_map(|h| {
                let time_epoch = h.time_epoch?;
                let (temp_c, temp_f) = temperature_pair(h.temp_c, h.temp_f)?;
                Some(HourForecast {
                    time_epoch,
                    temp_c,
                    temp_f,
                    condition: condition(h.condition),
                })
            })
            .collect();

        let astro = self
            .astro
            .map(|a| Astro {
                sunrise: a.sunrise,
                sunset: a.sunset,
            })
            .unwrap_or_default();

        Some(DayForecast {
            date_epoch,
            max_temp_c: max_c,
            max_temp_f: max_f,
            min_temp_c: min_c,
            min_temp_f: min_f,
            chance_of_rain_pct: percent(day.daily_chance_of_rain),
            condition: condition(day.condition),
            astro,
            hourly,
        })
    }
}
