//! Parameters structure for the RouteMgr

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::Deserialize;
use std::time::Duration;

use super::RouteMgrError;

// ------------------------------------------------------------------------------------------------
// DATA STRUCTURES
// ------------------------------------------------------------------------------------------------

/// Parameters for the route schedule.
///
/// The route is dead-reckoned, every phase is a fixed-duration hold taken from here. Values are
/// loaded once at startup and never change during a mission.
#[derive(Debug, Clone, Deserialize)]
pub struct RouteMgrParams {
    // ---- SCHEDULE ----
    /// Forward drive duration of one segment.
    ///
    /// Units: seconds
    pub move_time_s: f64,

    /// Scan window duration at each stop.
    ///
    /// Units: seconds
    pub stop_time_s: f64,

    /// Forward drive duration of the traverse between the two quarter turns.
    ///
    /// Units: seconds
    pub gap_move_time_s: f64,

    /// Rotation duration of one quarter turn.
    ///
    /// Units: seconds
    pub turn_time_s: f64,

    /// Hold between the startup signal and moving off.
    ///
    /// Units: seconds
    pub start_delay_s: f64,

    /// Number of move-then-scan segments per leg
    pub segments_per_leg: u8,

    // ---- SIGNALS ----
    /// Number of pulses in the startup signal
    pub startup_signal_num: u8,

    /// Number of pulses in the route-complete signal
    pub complete_signal_num: u8,

    // ---- CONNECTIVITY ----
    /// Interval between link probes while waiting for connectivity.
    ///
    /// Units: seconds
    pub link_poll_interval_s: f64,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl RouteMgrParams {
    /// Check the parameter set describes a runnable route.
    ///
    /// All durations must be finite and non-negative, and a leg must have at least one segment.
    pub fn validate(&self) -> Result<(), RouteMgrError> {
        let durations = [
            ("move_time_s", self.move_time_s),
            ("stop_time_s", self.stop_time_s),
            ("gap_move_time_s", self.gap_move_time_s),
            ("turn_time_s", self.turn_time_s),
            ("start_delay_s", self.start_delay_s),
            ("link_poll_interval_s", self.link_poll_interval_s),
        ];

        for (name, value) in durations.iter() {
            if !value.is_finite() || *value < 0.0 {
                return Err(RouteMgrError::InvalidParam(name));
            }
        }

        if self.segments_per_leg == 0 {
            return Err(RouteMgrError::InvalidParam("segments_per_leg"));
        }

        Ok(())
    }

    pub fn move_time(&self) -> Duration {
        Duration::from_secs_f64(self.move_time_s)
    }

    pub fn stop_time(&self) -> Duration {
        Duration::from_secs_f64(self.stop_time_s)
    }

    pub fn gap_move_time(&self) -> Duration {
        Duration::from_secs_f64(self.gap_move_time_s)
    }

    pub fn turn_time(&self) -> Duration {
        Duration::from_secs_f64(self.turn_time_s)
    }

    pub fn start_delay(&self) -> Duration {
        Duration::from_secs_f64(self.start_delay_s)
    }

    pub fn link_poll_interval(&self) -> Duration {
        Duration::from_secs_f64(self.link_poll_interval_s)
    }
}
