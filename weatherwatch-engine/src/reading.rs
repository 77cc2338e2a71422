//! Inbound reading decoding and raw value coercion.

use std::fmt;

use serde_json::{Map, Value};

use crate::error::DecodeError;

/// A field of an inbound reading, as delivered.
///
/// Kept verbatim for display; numeric coercion is explicit through
/// [`RawValue::as_number`] and [`RawValue::as_finite`].
#[derive(Debug, Clone, PartialEq, Default)]
pub enum RawValue {
    /// Key missing or JSON `null`.
    #[default]
    Absent,
    Number(f64),
    Text(String),
    /// Booleans, arrays and objects, kept as their JSON text. Only a
    /// timestamp can carry one; [`Reading::decode`] rejects them elsewhere.
    Other(String),
}

impl RawValue {
    /// Numeric coercion: numbers as-is, text trimmed and parsed as a float.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            RawValue::Number(n) => Some(*n),
            RawValue::Text(s) => s.trim().parse::<f64>().ok(),
            RawValue::Absent | RawValue::Other(_) => None,
        }
    }

    /// Numeric coercion restricted to finite values; the gate into aggregation.
    pub fn as_finite(&self) -> Option<f64> {
        self.as_number().filter(|n| n.is_finite())
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, RawValue::Absent)
    }

    /// Text used when quoting the value inside a problem description.
    ///
    /// A missing value reads as the JSON literal `null`.
    pub(crate) fn quoted(&self) -> String {
        match self {
            RawValue::Absent => "null".to_string(),
            other => other.to_string(),
        }
    }
}

impl From<Value> for RawValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => RawValue::Absent,
            // Only fails for arbitrary-precision numbers, which we do not enable.
            Value::Number(n) => n.as_f64().map_or(RawValue::Absent, RawValue::Number),
            Value::String(s) => RawValue::Text(s),
            other => RawValue::Other(other.to_string()),
        }
    }
}

impl From<&str> for RawValue {
    fn from(s: &str) -> Self {
        RawValue::Text(s.to_string())
    }
}

impl From<f64> for RawValue {
    fn from(n: f64) -> Self {
        RawValue::Number(n)
    }
}

impl<T: Into<RawValue>> From<Option<T>> for RawValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(RawValue::Absent, Into::into)
    }
}

impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawValue::Absent => f.write_str("n/a"),
            RawValue::Number(n) => write!(f, "{}", n),
            RawValue::Text(s) | RawValue::Other(s) => f.write_str(s),
        }
    }
}

/// A decoded inbound message.
#[derive(Debug, Clone, PartialEq)]
pub struct Reading {
    pub station_id: String,
    pub temperature: RawValue,
    pub humidity: RawValue,
    pub timestamp: RawValue,
}

impl Reading {
    /// Decode a payload of the form
    /// `{"stationId": "...", "temperature": .., "humidity": .., "timestamp": ".."}`.
    ///
    /// Invalid UTF-8 is replaced rather than rejected. Unknown keys are ignored.
    /// Temperature and humidity must be numbers, strings, `null` or missing;
    /// any other JSON shape fails the decode.
    pub fn decode(payload: &[u8]) -> Result<Self, DecodeError> {
        let text = String::from_utf8_lossy(payload);
        let value: Value = serde_json::from_str(&text)?;
        let Value::Object(mut fields) = value else {
            return Err(DecodeError::NotAnObject);
        };

        let station_id = match fields.remove("stationId") {
            Some(Value::String(id)) => id,
            _ => return Err(DecodeError::MissingStationId),
        };

        Ok(Self {
            station_id,
            temperature: take_measurement(&mut fields, "temperature")?,
            humidity: take_measurement(&mut fields, "humidity")?,
            timestamp: take(&mut fields, "timestamp"),
        })
    }
}

fn take(fields: &mut Map<String, Value>, key: &str) -> RawValue {
    fields.remove(key).map_or(RawValue::Absent, RawValue::from)
}

fn take_measurement(
    fields: &mut Map<String, Value>,
    key: &'static str,
) -> Result<RawValue, DecodeError> {
    match take(fields, key) {
        RawValue::Other(_) => Err(DecodeError::UnsupportedValue(key)),
        value => Ok(value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_full_reading() {
        let payload = br#"{"stationId":"S1","temperature":20.5,"humidity":"50","timestamp":"2024-01-02T12:34:56Z"}"#;
        let reading = Reading::decode(payload).unwrap();

        assert_eq!(reading.station_id, "S1");
        assert_eq!(reading.temperature, RawValue::Number(20.5));
        assert_eq!(reading.humidity, RawValue::Text("50".to_string()));
        assert_eq!(
            reading.timestamp,
            RawValue::Text("2024-01-02T12:34:56Z".to_string())
        );
    }

    #[test]
    fn missing_and_null_fields_are_absent() {
        let reading = Reading::decode(br#"{"stationId":"S1","humidity":null}"#).unwrap();
        assert!(reading.temperature.is_absent());
        assert!(reading.humidity.is_absent());
        assert!(reading.timestamp.is_absent());
    }

    #[test]
    fn non_scalar_measurements_fail_decode() {
        assert!(matches!(
            Reading::decode(br#"{"stationId":"S1","temperature":true,"humidity":50}"#),
            Err(DecodeError::UnsupportedValue("temperature"))
        ));
        assert!(matches!(
            Reading::decode(br#"{"stationId":"S1","temperature":20,"humidity":[1]}"#),
            Err(DecodeError::UnsupportedValue("humidity"))
        ));
        assert!(matches!(
            Reading::decode(br#"{"stationId":"S1","humidity":{"v":1}}"#),
            Err(DecodeError::UnsupportedValue("humidity"))
        ));
    }

    #[test]
    fn non_text_timestamp_keeps_json_text() {
        let reading = Reading::decode(br#"{"stationId":"S1","timestamp":[2024]}"#).unwrap();
        assert_eq!(reading.timestamp, RawValue::Other("[2024]".to_string()));
        assert_eq!(reading.timestamp.as_number(), None);
    }

    #[test]
    fn decode_rejects_malformed_payloads() {
        assert!(matches!(Reading::decode(b"not json"), Err(DecodeError::Json(_))));
        assert!(matches!(Reading::decode(b"[1,2]"), Err(DecodeError::NotAnObject)));
        assert!(matches!(
            Reading::decode(br#"{"temperature":1}"#),
            Err(DecodeError::MissingStationId)
        ));
        assert!(matches!(
            Reading::decode(br#"{"stationId":42}"#),
            Err(DecodeError::MissingStationId)
        ));
    }

    #[test]
    fn invalid_utf8_is_replaced_not_fatal() {
        let mut payload = br#"{"stationId":"S"#.to_vec();
        payload.push(0xff);
        payload.extend_from_slice(br#"","temperature":1}"#);

        let reading = Reading::decode(&payload).unwrap();
        assert!(reading.station_id.starts_with('S'));
    }

    #[test]
    fn numeric_coercion() {
        assert_eq!(RawValue::from(" 20.5 ").as_number(), Some(20.5));
        assert_eq!(RawValue::from("-999").as_number(), Some(-999.0));
        assert_eq!(RawValue::from("1e2").as_number(), Some(100.0));
        assert_eq!(RawValue::from("abc").as_number(), None);
        assert_eq!(RawValue::Absent.as_number(), None);

        assert!(RawValue::from("NaN").as_number().unwrap().is_nan());
        assert_eq!(RawValue::from("NaN").as_finite(), None);
        assert_eq!(RawValue::from("inf").as_finite(), None);
    }

    #[test]
    fn display_and_quoting() {
        assert_eq!(RawValue::Absent.to_string(), "n/a");
        assert_eq!(RawValue::Absent.quoted(), "null");
        assert_eq!(RawValue::from("abc").quoted(), "abc");
        assert_eq!(RawValue::Number(20.5).to_string(), "20.5");
    }
}
