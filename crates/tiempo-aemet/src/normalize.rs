//! Projection of the AEMET daily payload into [`DailySummary`] records.
//!
//! The payload is a JSON array whose first element holds `prediccion.dia`,
//! an array of loosely typed day objects. Shape problems above `dia` fail the
//! whole request; problems inside a single day only drop that day.

use serde_json::{Map, Value};

use crate::encoding::latin1_to_utf8;
use crate::error::{DayProjectionError, ForecastError};
use crate::types::{
    DailySummary, DATE_PLACEHOLDER, MAX_FORECAST_DAYS, SKY_PLACEHOLDER,
    WIND_DIRECTION_PLACEHOLDER,
};

/// Repair, parse and project a raw payload.
pub fn normalize(raw: &[u8]) -> Result<Vec<DailySummary>, ForecastError> {
    let utf8 = latin1_to_utf8(raw)?;
    let days = extract_days(&utf8)?;
    Ok(project_days(&days))
}

/// Parse a UTF-8 payload and pull out the `dia` array.
pub fn extract_days(utf8: &[u8]) -> Result<Vec<Value>, ForecastError> {
    let root: Value = serde_json::from_slice(utf8)
        .map_err(|e| ForecastError::MalformedPayload(format!("invalid JSON: {}", e)))?;

    let mut entries = match root {
        Value::Array(entries) => entries,
        other => {
            return Err(ForecastError::MalformedPayload(format!(
                "expected a top-level array, found {}",
                json_type(&other)
            )))
        }
    };

    if entries.is_empty() {
        return Err(ForecastError::MalformedPayload(
            "top-level array is empty".to_string(),
        ));
    }

    let mut first = entries.swap_remove(0);
    let prediction = first
        .get_mut("prediccion")
        .filter(|p| p.is_object())
        .ok_or_else(|| ForecastError::MalformedPayload("missing 'prediccion' object".into()))?;

    match prediction.get_mut("dia").map(Value::take) {
        Some(Value::Array(days)) => Ok(days),
        _ => Err(ForecastError::MalformedPayload(
            "missing 'dia' array in 'prediccion'".into(),
        )),
    }
}

/// Project the first [`MAX_FORECAST_DAYS`] days, skipping any that fail.
///
/// `day_index` is the 1-based position in the source window, so a dropped
/// day leaves a gap rather than renumbering the rest.
pub fn project_days(days: &[Value]) -> Vec<DailySummary> {
    days.iter()
        .take(MAX_FORECAST_DAYS)
        .enumerate()
        .filter_map(|(i, day)| match project_day(i + 1, day) {
            Ok(summary) => Some(summary),
            Err(e) => {
                tracing::warn!(day_index = i + 1, "Dropping forecast day: {}", e);
                None
            }
        })
        .collect()
}

/// Build one summary. Missing or mistyped fields fall back to defaults.
pub fn project_day(day_index: usize, day: &Value) -> Result<DailySummary, DayProjectionError> {
    let day = day.as_object().ok_or(DayProjectionError::NotAnObject {
        found: json_type(day),
    })?;

    let date = day
        .get("fecha")
        .and_then(Value::as_str)
        .map(|s| s.chars().take(10).collect())
        .unwrap_or_else(|| DATE_PLACEHOLDER.to_string());

    let sky_description = entries(day, "estadoCielo")
        .find_map(|entry| {
            entry
                .get("descripcion")
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
        })
        .unwrap_or(SKY_PLACEHOLDER)
        .to_string();

    let temperature = day.get("temperatura");
    let humidity = day.get("humedadRelativa");

    // First entry carrying `value`, even when it is not a number
    let precipitation_probability = entries(day, "probPrecipitacion")
        .find(|entry| entry.contains_key("value"))
        .and_then(|entry| int_field(entry.get("value")))
        .unwrap_or(0);

    let wind = entries(day, "viento")
        .find(|entry| int_field(entry.get("velocidad")).unwrap_or(0) > 0);
    let wind_direction = wind
        .and_then(|entry| entry.get("direccion"))
        .and_then(Value::as_str)
        .unwrap_or(WIND_DIRECTION_PLACEHOLDER)
        .to_string();
    let wind_speed = wind
        .and_then(|entry| int_field(entry.get("velocidad")))
        .unwrap_or(0);

    Ok(DailySummary {
        day_index,
        date,
        sky_description,
        temperature_max: nested_int(temperature, "maxima"),
        temperature_min: nested_int(temperature, "minima"),
        precipitation_probability,
        humidity_max: nested_int(humidity, "maxima"),
        humidity_min: nested_int(humidity, "minima"),
        wind_direction,
        wind_speed,
    })
}

/// Object entries of an array field; absent or non-array fields yield nothing.
fn entries<'a>(
    day: &'a Map<String, Value>,
    key: &str,
) -> impl Iterator<Item = &'a Map<String, Value>> {
    day.get(key)
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(Value::as_object)
}

/// Integer value of a JSON number. Whole-valued floats such as `30.0` count.
fn int_field(value: Option<&Value>) -> Option<i32> {
    let value = value?;
    if let Some(n) = value.as_i64() {
        return i32::try_from(n).ok();
    }

    value
        .as_f64()
        .filter(|f| f.fract() == 0.0 && *f >= f64::from(i32::MIN) && *f <= f64::from(i32::MAX))
        .map(|f| f as i32)
}

fn nested_int(parent: Option<&Value>, key: &str) -> i32 {
    int_field(parent.and_then(|p| p.get(key))).unwrap_or(0)
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;
    use crate::error::ForecastErrorKind;
    use serde_json::json;

    fn full_day(date: &str) -> Value {
        json!({
            "fecha": format!("{}T00:00:00", date),
            "estadoCielo": [
                { "value": "", "periodo": "00-24", "descripcion": "" },
                { "value": "12", "periodo": "00-12", "descripcion": "Poco nuboso" }
            ],
            "temperatura": { "maxima": 31, "minima": 17, "dato": [] },
            "probPrecipitacion": [
                { "periodo": "00-24" },
                { "value": 15, "periodo": "00-12" }
            ],
            "humedadRelativa": { "maxima": 80, "minima": 35, "dato": [] },
            "viento": [
                { "direccion": "C", "velocidad": 0, "periodo": "00-24" },
                { "direccion": "NE", "velocidad": 20, "periodo": "00-12" }
            ]
        })
    }

    fn payload(days: Vec<Value>) -> Vec<u8> {
        serde_json::to_vec(&json!([{
            "origen": { "productor": "Agencia Estatal de Meteorología - AEMET" },
            "nombre": "Madrid",
            "prediccion": { "dia": days }
        }]))
        .unwrap()
    }

    #[test]
    fn test_full_day_has_no_defaults() {
        let summary = project_day(1, &full_day("2025-07-20")).unwrap();

        assert_eq!(
            summary,
            DailySummary {
                day_index: 1,
                date: "2025-07-20".into(),
                sky_description: "Poco nuboso".into(),
                temperature_max: 31,
                temperature_min: 17,
                precipitation_probability: 15,
                humidity_max: 80,
                humidity_min: 35,
                wind_direction: "NE".into(),
                wind_speed: 20,
            }
        );
    }

    #[test]
    fn test_empty_day_gets_defaults() {
        let summary = project_day(3, &json!({})).unwrap();

        assert_eq!(summary.day_index, 3);
        assert_eq!(summary.date, DATE_PLACEHOLDER);
        assert_eq!(summary.sky_description, SKY_PLACEHOLDER);
        assert_eq!(summary.temperature_max, 0);
        assert_eq!(summary.temperature_min, 0);
        assert_eq!(summary.precipitation_probability, 0);
        assert_eq!(summary.humidity_max, 0);
        assert_eq!(summary.humidity_min, 0);
        assert_eq!(summary.wind_direction, "?");
        assert_eq!(summary.wind_speed, 0);
    }

    #[test]
    fn test_missing_precipitation_defaults_to_zero() {
        let mut day = full_day("2025-07-20");
        day.as_object_mut().unwrap().remove("probPrecipitacion");
        assert_eq!(project_day(1, &day).unwrap().precipitation_probability, 0);
    }

    #[test]
    fn test_precipitation_first_entry_with_value_wins() {
        let day = json!({
            "probPrecipitacion": [
                { "periodo": "00-24" },
                { "value": null, "periodo": "00-12" },
                { "value": 40, "periodo": "12-24" }
            ]
        });
        // The null entry carries `value`, so it is the one chosen
        assert_eq!(project_day(1, &day).unwrap().precipitation_probability, 0);
    }

    #[test]
    fn test_calm_wind_defaults() {
        let day = json!({
            "viento": [
                { "direccion": "C", "velocidad": 0 },
                { "direccion": "N" }
            ]
        });
        let summary = project_day(1, &day).unwrap();
        assert_eq!(summary.wind_direction, "?");
        assert_eq!(summary.wind_speed, 0);
    }

    #[test]
    fn test_non_integer_fields_default_to_zero() {
        let day = json!({
            "temperatura": { "maxima": "30", "minima": 18.5 },
            "humedadRelativa": "n/a"
        });
        let summary = project_day(1, &day).unwrap();
        assert_eq!(summary.temperature_max, 0);
        assert_eq!(summary.temperature_min, 0);
        assert_eq!(summary.humidity_max, 0);
    }

    #[test]
    fn test_whole_floats_are_integers() {
        let day = json!({
            "temperatura": { "maxima": 30.0, "minima": -2.0 },
            "humedadRelativa": { "maxima": 1e12, "minima": 45.0 },
            "viento": [{ "direccion": "N", "velocidad": 15.0 }]
        });
        let summary = project_day(1, &day).unwrap();
        assert_eq!(summary.temperature_max, 30);
        assert_eq!(summary.temperature_min, -2);
        assert_eq!(summary.humidity_max, 0);
        assert_eq!(summary.humidity_min, 45);
        assert_eq!(summary.wind_speed, 15);
    }

    #[test]
    fn test_date_is_truncated_to_ten_chars() {
        let short = project_day(1, &json!({ "fecha": "2025-07" })).unwrap();
        assert_eq!(short.date, "2025-07");

        let full = project_day(1, &json!({ "fecha": "2025-07-20T00:00:00" })).unwrap();
        assert_eq!(full.date, "2025-07-20");
    }

    #[test]
    fn test_non_object_day_is_an_error() {
        let err = project_day(1, &json!("2025-07-20")).unwrap_err();
        assert_eq!(err, DayProjectionError::NotAnObject { found: "string" });
    }

    #[test]
    fn test_truncates_to_four_days_in_order() {
        let days: Vec<Value> = (20..27)
            .map(|d| full_day(&format!("2025-07-{}", d)))
            .collect();

        let summaries = project_days(&days);
        assert_eq!(summaries.len(), 4);
        for (i, summary) in summaries.iter().enumerate() {
            assert_eq!(summary.day_index, i + 1);
            assert_eq!(summary.date, format!("2025-07-{}", 20 + i));
        }
    }

    #[test]
    fn test_short_array_keeps_all_days() {
        let days = vec![full_day("2025-07-20"), full_day("2025-07-21")];
        assert_eq!(project_days(&days).len(), 2);
    }

    #[test]
    fn test_bad_day_is_dropped_without_renumbering() {
        let days = vec![
            full_day("2025-07-20"),
            json!(42),
            full_day("2025-07-22"),
        ];

        let summaries = project_days(&days);
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].day_index, 1);
        assert_eq!(summaries[1].day_index, 3);
        assert_eq!(summaries[1].date, "2025-07-22");
    }

    #[test]
    fn test_projection_is_idempotent() {
        let days = vec![full_day("2025-07-20"), json!({}), full_day("2025-07-22")];
        assert_eq!(project_days(&days), project_days(&days));
    }

    #[test]
    fn test_empty_dia_is_success() {
        assert!(normalize(&payload(vec![])).unwrap().is_empty());
    }

    #[test]
    fn test_payload_shape_errors() {
        let cases = [
            "[]",
            "{}",
            "not json",
            r#"[{"nombre":"Madrid"}]"#,
            r#"[{"prediccion":{}}]"#,
            r#"[{"prediccion":{"dia":{}}}]"#,
            r#"[{"prediccion":[]}]"#,
        ];

        for raw in cases {
            let err = normalize(raw.as_bytes()).unwrap_err();
            assert_eq!(err.kind(), ForecastErrorKind::MalformedPayload, "{}", raw);
        }
    }

    #[test]
    fn test_normalize_repairs_latin1() {
        let day = json!({
            "fecha": "2025-07-20T00:00:00",
            "estadoCielo": [{ "descripcion": "Cubierto con lluvia escasa en Cádiz" }]
        });
        let utf8 = payload(vec![day]);

        // Re-encode the UTF-8 JSON as Latin-1 bytes
        let latin1: Vec<u8> = String::from_utf8(utf8)
            .unwrap()
            .chars()
            .map(|c| u8::try_from(u32::from(c)).unwrap())
            .collect();

        let summaries = normalize(&latin1).unwrap();
        assert_eq!(
            summaries[0].sky_description,
            "Cubierto con lluvia escasa en Cádiz"
        );
    }
}
