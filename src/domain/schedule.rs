//! Read model for today's schedule.

use chrono::{NaiveTime, Timelike};
use serde::Serialize;

use crate::domain::departure::{DepartureId, Station};

/// One row of today's schedule: a departure and its passengers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScheduleRow {
    pub departure_id: DepartureId,
    pub departs_at: NaiveTime,
    pub station: Station,
    /// Display names of active ticket holders, in ticket creation order.
    pub passengers: Vec<String>,
}

impl ScheduleRow {
    /// Departure time as an `HH:MM` label for tabular rendering.
    pub fn departs_at_label(&self) -> String {
        format!("{:02}:{:02}", self.departs_at.hour(), self.departs_at.minute())
    }
}
