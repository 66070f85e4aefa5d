//! Forecast pipeline error types.

use thiserror::Error;

pub use tiempo_core::NetworkError;

/// Failure of a forecast request, one variant per pipeline stage.
#[derive(Debug, Error)]
pub enum ForecastError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Invalid data URL '{url}': {reason}")]
    InvalidDataUrl { url: String, reason: String },

    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    #[error("Malformed locator envelope: {0}")]
    MalformedEnvelope(String),

    #[error("Encoding repair failed: {0}")]
    Encoding(String),

    #[error("Malformed forecast payload: {0}")]
    MalformedPayload(String),
}

/// Fieldless discriminant of [`ForecastError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ForecastErrorKind {
    InvalidRequest,
    InvalidDataUrl,
    Network,
    MalformedEnvelope,
    Encoding,
    MalformedPayload,
}

impl ForecastError {
    pub fn kind(&self) -> ForecastErrorKind {
        match self {
            Self::InvalidRequest(_) => ForecastErrorKind::InvalidRequest,
            Self::InvalidDataUrl { .. } => ForecastErrorKind::InvalidDataUrl,
            Self::Network(_) => ForecastErrorKind::Network,
            Self::MalformedEnvelope(_) => ForecastErrorKind::MalformedEnvelope,
            Self::Encoding(_) => ForecastErrorKind::Encoding,
            Self::MalformedPayload(_) => ForecastErrorKind::MalformedPayload,
        }
    }

    /// User-friendly error message for display.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::InvalidRequest(_) => "Select a valid province.",
            Self::InvalidDataUrl { .. } => "The weather service returned an invalid data link.",
            Self::Network(e) => e.user_message(),
            Self::MalformedEnvelope(_) => "Could not read the weather service response.",
            Self::Encoding(_) => "The forecast data has an unsupported text encoding.",
            Self::MalformedPayload(_) => "Could not interpret the weather forecast.",
        }
    }
}

/// Why a single forecast day could not be projected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DayProjectionError {
    #[error("day entry is a JSON {found}, expected an object")]
    NotAnObject { found: &'static str },
}
