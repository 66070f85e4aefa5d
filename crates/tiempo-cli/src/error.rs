//! Maps configuration and forecast failures to one CLI error with a short
//! user-facing message.

use thiserror::Error;
use tiempo_aemet::ForecastError;
use tiempo_core::{AppError, ConfigError};

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    App(#[from] AppError),

    #[error(transparent)]
    Forecast(#[from] ForecastError),

    #[error("Unknown province: {0}")]
    UnknownProvince(String),

    #[error("Unknown community: {0}")]
    UnknownCommunity(String),

    #[error("No province or municipality code given")]
    NoLocation,
}

impl CliError {
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::App(e) => e.user_message(),
            Self::Forecast(e) => e.user_message(),
            Self::UnknownProvince(_) => "Unknown province. Use --list to see the options.",
            Self::UnknownCommunity(_) => "Unknown community. Use --list to see the options.",
            Self::NoLocation => "Select a location with --code, --province or --community.",
        }
    }
}

impl From<anyhow::Error> for CliError {
    fn from(e: anyhow::Error) -> Self {
        match e.downcast::<ConfigError>() {
            Ok(config) => Self::App(AppError::Config(config)),
            Err(other) => Self::App(AppError::Other(other)),
        }
    }
}
