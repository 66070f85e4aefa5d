//! Municipal weather forecasts from AEMET OpenData.
//!
//! Looks up the data URL for a municipality, fetches the daily prediction
//! payload (repairing its Latin-1 encoding) and condenses the first days into
//! [`DailySummary`] records.

pub mod client;
pub mod encoding;
pub mod error;
pub mod normalize;
pub mod render;
pub mod service;
pub mod types;

pub use client::AemetClient;
pub use error::{DayProjectionError, ForecastError, ForecastErrorKind};
pub use render::{render_day, render_forecast};
pub use service::{ForecastMessage, ForecastReceiver, ForecastService};
pub use types::*;
