use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::city::City;

/// One weather observation for one city, as returned to API clients.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherReading {
    pub city: City,
    /// Degrees Celsius, one decimal.
    pub temperature: f64,
    pub description: String,
    pub humidity: u8,
    /// Meters per second, one decimal.
    pub wind_speed: f64,
    pub icon: String,
    pub timestamp: DateTime<Utc>,
}

/// A reading that has not been persisted yet.
///
/// When `timestamp` is `None` the store stamps the reading with the current
/// time at the moment it is saved.
#[derive(Debug, Clone, PartialEq)]
pub struct NewReading {
    pub city: City,
    pub temperature: f64,
    pub description: String,
    pub humidity: u8,
    pub wind_speed: f64,
    pub icon: String,
    pub timestamp: Option<DateTime<Utc>>,
}

impl NewReading {
    /// Resolve the timestamp, substituting `now` when none was supplied.
    pub fn into_reading(self, now: DateTime<Utc>) -> WeatherReading {
        WeatherReading {
            city: self.city,
            temperature: self.temperature,
            description: self.description,
            humidity: self.humidity,
            wind_speed: self.wind_speed,
            icon: self.icon,
            timestamp: self.timestamp.unwrap_or(now),
        }
    }
}

/// A persisted reading together with its storage identity.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredReading {
    pub id: i64,
    pub reading: WeatherReading,
}

/// Round to one decimal place, ties away from zero.
pub fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn rounds_to_one_decimal() {
        assert_eq!(round_tenth(15.27), 15.3);
        assert_eq!(round_tenth(3.44), 3.4);
        assert_eq!(round_tenth(0.0), 0.0);
        assert_eq!(round_tenth(-7.06), -7.1);
    }

    #[test]
    fn rounding_ties_go_away_from_zero() {
        // 2.25 and -2.25 are exact in binary, so these are true ties.
        assert_eq!(round_tenth(2.25), 2.3);
        assert_eq!(round_tenth(-2.25), -2.3);
        assert_eq!(round_tenth(0.75), 0.8);
    }

    fn new_reading(timestamp: Option<DateTime<Utc>>) -> NewReading {
        NewReading {
            city: City::Hamburg,
            temperature: 9.1,
            description: "overcast clouds".into(),
            humidity: 91,
            wind_speed: 6.2,
            icon: "04n".into(),
            timestamp,
        }
    }

    #[test]
    fn into_reading_defaults_timestamp_to_now() {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let reading = new_reading(None).into_reading(now);
        assert_eq!(reading.timestamp, now);
    }

    #[test]
    fn into_reading_keeps_supplied_timestamp() {
        let observed = Utc.with_ymd_and_hms(2024, 2, 29, 8, 30, 0).unwrap();
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let reading = new_reading(Some(observed)).into_reading(now);
        assert_eq!(reading.timestamp, observed);
    }

    #[test]
    fn reading_serializes_with_api_field_names() {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let value = serde_json::to_value(new_reading(None).into_reading(now)).unwrap();

        assert_eq!(value["city"], "Hamburg");
        assert_eq!(value["wind_speed"], 6.2);
        assert_eq!(value["humidity"], 91);
        assert_eq!(value["timestamp"], "2024-03-01T12:00:00Z");
        assert!(value.get("id").is_none());
    }
}
