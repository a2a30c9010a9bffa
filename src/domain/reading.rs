// Sensor reading domain model and inbound validation
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// One telemetry sample as held by the proxy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SensorReading {
    pub sand_level: f64,
    pub sampling_rate: f64,
    pub sample_interval: u64,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
}

/// Fallbacks applied when the sensor omits its self-reported timing fields.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReadingDefaults {
    pub sampling_rate: f64,
    pub sample_interval: u64,
}

impl Default for ReadingDefaults {
    fn default() -> Self {
        Self {
            sampling_rate: 1.0,
            sample_interval: 1000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Invalid data format: payload must be a JSON object")]
    NotAnObject,
    #[error("Invalid data format: sandLevel must be a number")]
    SandLevelNotNumeric,
    #[error("Invalid data format: sandLevel must be finite")]
    SandLevelNotFinite,
    #[error("Invalid data format: sandLevel must not be negative (got {0})")]
    SandLevelNegative(f64),
}

impl SensorReading {
    /// Reading held before the sensor has ever been heard from.
    pub fn initial(defaults: ReadingDefaults, now: DateTime<Utc>) -> Self {
        Self {
            sand_level: 0.0,
            sampling_rate: defaults.sampling_rate,
            sample_interval: defaults.sample_interval,
            timestamp: now,
        }
    }

    /// Validate an untrusted payload and build a reading stamped with `now`.
    ///
    /// `sandLevel` must be a JSON number; strings are rejected even when they
    /// parse. The timing fields are coerced leniently and fall back to
    /// `defaults` when absent, unparseable or not positive.
    pub fn from_candidate(
        candidate: &Value,
        defaults: ReadingDefaults,
        now: DateTime<Utc>,
    ) -> Result<Self, ValidationError> {
        let fields = candidate.as_object().ok_or(ValidationError::NotAnObject)?;

        let sand_level = match fields.get("sandLevel") {
            Some(Value::Number(n)) => n.as_f64().ok_or(ValidationError::SandLevelNotFinite)?,
            _ => return Err(ValidationError::SandLevelNotNumeric),
        };
        if !sand_level.is_finite() {
            return Err(ValidationError::SandLevelNotFinite);
        }
        if sand_level < 0.0 {
            return Err(ValidationError::SandLevelNegative(sand_level));
        }

        let sampling_rate = coerce_positive(fields.get("samplingRate"))
            .unwrap_or(defaults.sampling_rate);
        let sample_interval = coerce_positive(fields.get("sampleInterval"))
            .map(|ms| ms.round() as u64)
            .filter(|ms| *ms > 0)
            .unwrap_or(defaults.sample_interval);

        Ok(Self {
            sand_level,
            sampling_rate,
            sample_interval,
            timestamp: now,
        })
    }
}

fn coerce_positive(value: Option<&Value>) -> Option<f64> {
    let number = match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    (number.is_finite() && number > 0.0).then_some(number)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_full_payload_is_accepted() {
        let reading = SensorReading::from_candidate(
            &json!({"sandLevel": 321.5, "samplingRate": 44.1, "sampleInterval": 250}),
            ReadingDefaults::default(),
            now(),
        )
        .unwrap();

        assert_eq!(reading.sand_level, 321.5);
        assert_eq!(reading.sampling_rate, 44.1);
        assert_eq!(reading.sample_interval, 250);
        assert_eq!(reading.timestamp, now());
    }

    #[test]
    fn test_missing_timing_fields_use_defaults() {
        let defaults = ReadingDefaults {
            sampling_rate: 2.0,
            sample_interval: 500,
        };
        let reading =
            SensorReading::from_candidate(&json!({"sandLevel": 12}), defaults, now()).unwrap();

        assert_eq!(reading.sampling_rate, 2.0);
        assert_eq!(reading.sample_interval, 500);
    }

    #[test]
    fn test_timing_fields_are_coerced() {
        let reading = SensorReading::from_candidate(
            &json!({"sandLevel": 1, "samplingRate": "8", "sampleInterval": 999.6}),
            ReadingDefaults::default(),
            now(),
        )
        .unwrap();
        assert_eq!(reading.sampling_rate, 8.0);
        assert_eq!(reading.sample_interval, 1000);

        let reading = SensorReading::from_candidate(
            &json!({"sandLevel": 1, "samplingRate": "fast", "sampleInterval": 0}),
            ReadingDefaults::default(),
            now(),
        )
        .unwrap();
        assert_eq!(reading.sampling_rate, 1.0);
        assert_eq!(reading.sample_interval, 1000);
    }

    #[test]
    fn test_string_sand_level_is_rejected() {
        let err = SensorReading::from_candidate(
            &json!({"sandLevel": "12"}),
            ReadingDefaults::default(),
            now(),
        )
        .unwrap_err();
        assert_eq!(err, ValidationError::SandLevelNotNumeric);
    }

    #[test]
    fn test_structural_failures() {
        let defaults = ReadingDefaults::default();
        assert_eq!(
            SensorReading::from_candidate(&json!([1, 2]), defaults, now()).unwrap_err(),
            ValidationError::NotAnObject
        );
        assert_eq!(
            SensorReading::from_candidate(&json!({"samplingRate": 1}), defaults, now())
                .unwrap_err(),
            ValidationError::SandLevelNotNumeric
        );
        assert_eq!(
            SensorReading::from_candidate(&json!({"sandLevel": -3.0}), defaults, now())
                .unwrap_err(),
            ValidationError::SandLevelNegative(-3.0)
        );
    }

    #[test]
    fn test_zero_sand_level_is_valid_on_the_proxy() {
        let reading = SensorReading::from_candidate(
            &json!({"sandLevel": 0}),
            ReadingDefaults::default(),
            now(),
        )
        .unwrap();
        assert_eq!(reading.sand_level, 0.0);
    }

    #[test]
    fn test_serializes_camel_case_with_millis() {
        let reading = SensorReading::initial(ReadingDefaults::default(), now());
        let value = serde_json::to_value(reading).unwrap();

        assert_eq!(value["sandLevel"], json!(0.0));
        assert_eq!(value["samplingRate"], json!(1.0));
        assert_eq!(value["sampleInterval"], json!(1000));
        assert_eq!(value["timestamp"], json!(now().timestamp_millis()));
    }
}
