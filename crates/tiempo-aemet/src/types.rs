use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use url::Url;

use crate::error::{ForecastError, NetworkError};

/// Number of forecast days kept from the payload.
pub const MAX_FORECAST_DAYS: usize = 4;

pub const DATE_PLACEHOLDER: &str = "Date unavailable";
pub const SKY_PLACEHOLDER: &str = "No data";
pub const WIND_DIRECTION_PLACEHOLDER: &str = "?";

/// Status AEMET reports in the envelope for a successful lookup.
const ENVELOPE_OK: u16 = 200;

/// Five-digit INE municipality code, e.g. `28079` for Madrid.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MunicipalityCode(String);

impl MunicipalityCode {
    pub const LEN: usize = 5;

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for MunicipalityCode {
    type Err = ForecastError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() == Self::LEN && s.bytes().all(|b| b.is_ascii_digit()) {
            Ok(Self(s.to_string()))
        } else {
            Err(ForecastError::InvalidRequest(format!(
                "municipality code must be exactly {} digits, got '{}'",
                Self::LEN,
                s
            )))
        }
    }
}

impl TryFrom<&str> for MunicipalityCode {
    type Error = ForecastError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl fmt::Display for MunicipalityCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Locator response: points at the actual forecast payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatorEnvelope {
    pub description: String,
    pub status: u16,
    pub data_url: Url,
    pub metadata_url: String,
}

/// Envelope as sent on the wire. Only `datos` is required.
#[derive(Debug, Deserialize)]
pub(crate) struct EnvelopeWire {
    #[serde(rename = "descripcion")]
    description: Option<String>,
    #[serde(rename = "estado")]
    status: Option<u16>,
    #[serde(rename = "datos")]
    data_url: Option<String>,
    #[serde(rename = "metadatos")]
    metadata_url: Option<String>,
}

impl TryFrom<EnvelopeWire> for LocatorEnvelope {
    type Error = ForecastError;

    fn try_from(wire: EnvelopeWire) -> Result<Self, Self::Error> {
        let description = wire.description.unwrap_or_default();

        let Some(data_url) = wire.data_url else {
            // Rejections (bad key, unknown code) come back as an envelope
            // with a non-200 `estado` and no `datos`.
            return match wire.status {
                Some(status) if status != ENVELOPE_OK => {
                    Err(ForecastError::Network(NetworkError::ServerError {
                        status,
                        message: description,
                    }))
                }
                _ => Err(ForecastError::MalformedEnvelope(
                    "missing 'datos' field".to_string(),
                )),
            };
        };

        Ok(Self {
            description,
            status: wire.status.unwrap_or(ENVELOPE_OK),
            data_url: parse_data_url(&data_url)?,
            metadata_url: wire.metadata_url.unwrap_or_default(),
        })
    }
}

/// Parse the secondary data URL. Only absolute http(s) URLs are accepted.
pub fn parse_data_url(raw: &str) -> Result<Url, ForecastError> {
    let invalid = |reason: String| ForecastError::InvalidDataUrl {
        url: raw.to_string(),
        reason,
    };

    let url = Url::parse(raw.trim()).map_err(|e| invalid(e.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(invalid(format!("unsupported scheme '{}'", other))),
    }
}

/// One normalized forecast day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailySummary {
    /// 1-based position within the kept window
    pub day_index: usize,
    /// `YYYY-MM-DD`, or [`DATE_PLACEHOLDER`]
    pub date: String,
    pub sky_description: String,
    /// Degrees Celsius
    pub temperature_max: i32,
    pub temperature_min: i32,
    /// Percent
    pub precipitation_probability: i32,
    /// Percent
    pub humidity_max: i32,
    pub humidity_min: i32,
    pub wind_direction: String,
    /// km/h
    pub wind_speed: i32,
}

impl DailySummary {
    /// The forecast date, when the upstream sent a well-formed one.
    pub fn calendar_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(&self.date, "%Y-%m-%d").ok()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;
    use crate::error::ForecastErrorKind;

    #[test]
    fn test_municipality_code_accepts_five_digits() {
        let code: MunicipalityCode = "04013".parse().unwrap();
        assert_eq!(code.as_str(), "04013");
        assert_eq!(code.to_string(), "04013");
    }

    #[test]
    fn test_municipality_code_rejects_bad_input() {
        for bad in ["", "1234", "123456", "28O79", " 2807", "２８０７９"] {
            let err = MunicipalityCode::try_from(bad).unwrap_err();
            assert_eq!(err.kind(), ForecastErrorKind::InvalidRequest, "{:?}", bad);
        }
    }

    fn wire(json: serde_json::Value) -> EnvelopeWire {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_envelope_full() {
        let envelope = LocatorEnvelope::try_from(wire(serde_json::json!({
            "descripcion": "exito",
            "estado": 200,
            "datos": "https://opendata.aemet.es/opendata/sh/abc123",
            "metadatos": "https://opendata.aemet.es/opendata/sh/meta456"
        })))
        .unwrap();

        assert_eq!(envelope.description, "exito");
        assert_eq!(envelope.status, 200);
        assert_eq!(
            envelope.data_url.as_str(),
            "https://opendata.aemet.es/opendata/sh/abc123"
        );
        assert_eq!(
            envelope.metadata_url,
            "https://opendata.aemet.es/opendata/sh/meta456"
        );
    }

    #[test]
    fn test_envelope_only_datos() {
        let envelope =
            LocatorEnvelope::try_from(wire(serde_json::json!({ "datos": "https://x/y" }))).unwrap();
        assert_eq!(envelope.data_url.as_str(), "https://x/y");
        assert_eq!(envelope.status, 200);
        assert!(envelope.metadata_url.is_empty());
    }

    #[test]
    fn test_envelope_missing_datos_is_malformed() {
        let err = LocatorEnvelope::try_from(wire(serde_json::json!({ "foo": "bar" }))).unwrap_err();
        assert_eq!(err.kind(), ForecastErrorKind::MalformedEnvelope);
    }

    #[test]
    fn test_envelope_rejection_is_network_error() {
        let err = LocatorEnvelope::try_from(wire(serde_json::json!({
            "descripcion": "API key invalido",
            "estado": 401
        })))
        .unwrap_err();

        match err {
            ForecastError::Network(NetworkError::ServerError { status, message }) => {
                assert_eq!(status, 401);
                assert_eq!(message, "API key invalido");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_envelope_bad_datos_url() {
        let err =
            LocatorEnvelope::try_from(wire(serde_json::json!({ "datos": "not a url" }))).unwrap_err();
        assert_eq!(err.kind(), ForecastErrorKind::InvalidDataUrl);
    }

    #[test]
    fn test_parse_data_url_rejects_other_schemes() {
        let err = parse_data_url("ftp://opendata.aemet.es/file").unwrap_err();
        assert_eq!(err.kind(), ForecastErrorKind::InvalidDataUrl);
        assert!(parse_data_url("http://localhost:8080/datos").is_ok());
    }

    #[test]
    fn test_calendar_date() {
        let mut summary = DailySummary {
            day_index: 1,
            date: "2025-07-20".into(),
            sky_description: "Despejado".into(),
            temperature_max: 30,
            temperature_min: 18,
            precipitation_probability: 0,
            humidity_max: 0,
            humidity_min: 0,
            wind_direction: "?".into(),
            wind_speed: 0,
        };
        assert_eq!(
            summary.calendar_date(),
            NaiveDate::from_ymd_opt(2025, 7, 20)
        );

        summary.date = DATE_PLACEHOLDER.into();
        assert_eq!(summary.calendar_date(), None);
    }
}
