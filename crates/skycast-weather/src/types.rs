use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Placeholder shown for fields an older provider payload did not carry.
pub const UNKNOWN: &str = "unknown";

/// Geographic position from the device.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoCoordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoCoordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Provider query form, `"lat,lon"`.
    pub fn to_query(&self) -> String {
        format!("{},{}", self.latitude, self.longitude)
    }
}

/// Resolved place the forecast belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub name: String,
    pub region: String,
    pub country: String,
}

/// Provider condition text and icon reference.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Condition {
    pub text: String,
    pub icon: String,
    pub code: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub observed_at_epoch: i64,
    pub temp_c: f64,
    pub temp_f: f64,
    pub condition: Condition,
    pub humidity_pct: Option<u8>,
    pub feels_like_c: Option<f64>,
    pub feels_like_f: Option<f64>,
    pub uv_index: Option<f64>,
    pub pressure_mb: Option<f64>,
    pub pressure_in: Option<f64>,
    pub wind_kph: Option<f64>,
    pub wind_mph: Option<f64>,
    pub wind_direction: Option<String>,
}

impl CurrentConditions {
    pub fn observed_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.observed_at_epoch, 0)
    }
}

/// Sunrise/sunset as provider-local clock strings (e.g. "06:41 AM").
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Astro {
    pub sunrise: Option<String>,
    pub sunset: Option<String>,
}

impl Astro {
    pub fn sunrise_or_unknown(&self) -> &str {
        self.sunrise.as_deref().unwrap_or(UNKNOWN)
    }

    pub fn sunset_or_unknown(&self) -> &str {
        self.sunset.as_deref().unwrap_or(UNKNOWN)
    }
}

/// Hourly forecast entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourForecast {
    pub time_epoch: i64,
    pub temp_c: f64,
    pub temp_f: f64,
    pub condition: Condition,
}

impl HourForecast {
    pub fn time(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.time_epoch, 0)
    }
}

/// Daily forecast entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayForecast {
    pub date_epoch: i64,
    pub max_temp_c: f64,
    pub max_temp_f: f64,
    pub min_temp_c: f64,
    pub min_temp_f: f64,
    pub chance_of_rain_pct: Option<u8>,
    pub condition: Condition,
    pub astro: Astro,
    pub hourly: Vec<HourForecast>,
}

impl DayForecast {
    pub fn date(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.date_epoch, 0)
    }
}

/// Last successfully fetched forecast. Immutable once committed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastSnapshot {
    pub location: Place,
    pub current: CurrentConditions,
    pub daily: Vec<DayForecast>,
}

impl ForecastSnapshot {
    /// Orders days by `date_epoch` and each day's hours by `time_epoch`.
    pub fn sort_chronologically(&mut self) {
        self.daily.sort_by_key(|d| d.date_epoch);
        for day in &mut self.daily {
            day.hourly.sort_by_key(|h| h.time_epoch);
        }
    }

    pub fn is_chronological(&self) -> bool {
        self.daily.windows(2).all(|w| w[0].date_epoch <= w[1].date_epoch)
            && self
                .daily
                .iter()
                .all(|d| d.hourly.windows(2).all(|w| w[0].time_epoch <= w[1].time_epoch))
    }

    pub fn first_day(&self) -> Option<&DayForecast> {
        self.daily.first()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hour(epoch: i64) -> HourForecast {
        HourForecast {
            time_epoch: epoch,
            temp_c: 10.0,
            temp_f: 50.0,
            condition: Condition::default(),
        }
    }

    fn day(epoch: i64, hours: &[i64]) -> DayForecast {
        DayForecast {
            date_epoch: epoch,
            max_temp_c: 20.0,
            max_temp_f: 68.0,
            min_temp_c: 10.0,
            min_temp_f: 50.0,
            chance_of_rain_pct: None,
            condition: Condition::default(),
            astro: Astro::default(),
            hourly: hours.iter().copied().map(hour).collect(),
        }
    }

    fn snapshot(days: Vec<DayForecast>) -> ForecastSnapshot {
        ForecastSnapshot {
            location: Place {
                name: "Warsaw".into(),
                region: "Mazowieckie".into(),
                country: "Poland".into(),
            },
            current: CurrentConditions {
                observed_at_epoch: 1_700_000_000,
                temp_c: 12.0,
                temp_f: 53.6,
                condition: Condition::default(),
                humidity_pct: None,
                feels_like_c: None,
                feels_like_f: None,
                uv_index: None,
                pressure_mb: None,
                pressure_in: None,
                wind_kph: None,
                wind_mph: None,
                wind_direction: None,
            },
            daily: days,
        }
    }

    #[test]
    fn test_coordinate_query_format() {
        let c = GeoCoordinate::new(52.23, 21.01);
        assert_eq!(c.to_query(), "52.23,21.01");
    }

    #[test]
    fn test_sort_chronologically() {
        let mut s = snapshot(vec![day(300, &[330, 310]), day(100, &[120, 110, 100])]);
        assert!(!s.is_chronological());

        s.sort_chronologically();

        assert!(s.is_chronological());
        assert_eq!(s.first_day().map(|d| d.date_epoch), Some(100));
        assert_eq!(s.daily[1].hourly[0].time_epoch, 310);
    }

    #[test]
    fn test_astro_defaults_to_unknown() {
        let astro = Astro::default();
        assert_eq!(astro.sunrise_or_unknown(), UNKNOWN);
        assert_eq!(astro.sunset_or_unknown(), UNKNOWN);

        let astro = Astro {
            sunrise: Some("06:41 AM".into()),
            sunset: None,
        };
        assert_eq!(astro.sunrise_or_unknown(), "06:41 AM");
    }

    #[test]
    fn test_epoch_helpers() {
        let s = snapshot(vec![day(1_700_006_400, &[])]);
        assert_eq!(
            s.current.observed_at().map(|t| t.timestamp()),
            Some(1_700_000_000)
        );
        assert!(s.daily[0].date().is_some());
    }
}
