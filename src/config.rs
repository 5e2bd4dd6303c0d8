//! Library configuration.

use chrono_tz::Tz;
use serde::Deserialize;

use crate::domain::window::BookingWindow;

/// Booking engine configuration.
///
/// Front ends deserialise this from their own configuration layer; the
/// defaults are Berlin time and an 11:00 to 15:30 booking window.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BookingConfig {
    /// Time zone in which "today" and the booking window are evaluated.
    ///
    /// All calendar-day decisions derive from the wall clock converted to
    /// this zone, so behaviour around midnight is deterministic.
    pub timezone: Tz,
    /// Daily time-of-day range during which proposals and reservations are
    /// permitted.
    pub window: BookingWindow,
}

impl Default for BookingConfig {
    fn default() -> Self {
        Self {
            timezone: chrono_tz::Europe::Berlin,
            window: BookingWindow::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::domain::window::WindowBound;

    #[rstest]
    fn defaults_are_berlin_lunch_hours() {
        let config = BookingConfig::default();

        assert_eq!(config.timezone, chrono_tz::Europe::Berlin);
        assert_eq!(config.window.start, WindowBound::new(11, 0));
        assert_eq!(config.window.end, WindowBound::new(15, 30));
    }

    #[rstest]
    fn deserialises_with_partial_overrides() {
        let config: BookingConfig = serde_json::from_value(serde_json::json!({
            "timezone": "Europe/Vienna",
        }))
        .unwrap();

        assert_eq!(config.timezone, chrono_tz::Europe::Vienna);
        assert_eq!(config.window, BookingWindow::default());
    }

    #[rstest]
    fn rejects_unknown_fields() {
        let result = serde_json::from_value::<BookingConfig>(serde_json::json!({
            "time_zone": "Europe/Vienna",
        }));

        assert!(result.is_err());
    }
}
