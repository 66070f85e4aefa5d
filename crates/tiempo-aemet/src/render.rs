//! Plain-text rendering of forecast summaries.

use std::fmt;

use crate::types::DailySummary;

impl fmt::Display for DailySummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Day {} - {}", self.day_index, self.date)?;
        writeln!(f, "Sky: {}", self.sky_description)?;
        writeln!(f, "Rain: {}%", self.precipitation_probability)?;
        writeln!(
            f,
            "Max: {}°C / Min: {}°C",
            self.temperature_max, self.temperature_min
        )?;
        writeln!(
            f,
            "Humidity: {}% / {}%",
            self.humidity_max, self.humidity_min
        )?;
        write!(f, "Wind: {} {} km/h", self.wind_direction, self.wind_speed)
    }
}

pub fn render_day(day: &DailySummary) -> String {
    day.to_string()
}

/// Render all days, separated by a blank line.
pub fn render_forecast(days: &[DailySummary]) -> String {
    days.iter()
        .map(render_day)
        .collect::<Vec<_>>()
        .join("\n\n")
}
