//! # RouteMgr module
//!
//! This module implements the [`RouteMgr`] state machine, which executes the fixed patrol route.
//! The route is broken down into a number of states:
//!
//! - `NotStarted` - Waiting for uplink connectivity, the vehicle has not yet moved.
//! - `LegOutbound(n)` - Driving segment `n` of the outbound leg, ending in a scan stop.
//! - `Turning` - Performing the turnaround between the outbound and return legs.
//! - `LegReturn(n)` - Driving segment `n` of the return leg, ending in a scan stop.
//! - `Complete` - The route has finished and no further commands will be issued.
//!
//! The route is dead-reckoned, all phases are fixed-duration holds taken from
//! [`RouteMgrParams`]. Once `Complete` is reached the state is terminal, further calls to
//! [`RouteMgr::step`] return immediately without touching the equipment.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

mod params;

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::info;
use std::{fmt::Display, thread};

use eqpt_if::{
    mech::{Mech, TurnDirection},
    tag::TagReader,
};

use crate::{
    scan::{self, ScanStats},
    uplink::Uplink,
};

// ------------------------------------------------------------------------------------------------
// EXPORTS
// ------------------------------------------------------------------------------------------------

pub use params::RouteMgrParams;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Route Manager
///
/// This struct is responsible for stepping the vehicle through the patrol route, stopping at
/// each scan stop to run a scan-and-upload window (see [`crate::scan`]).
pub struct RouteMgr {
    /// Parameters controlling the route schedule
    pub params: RouteMgrParams,

    /// Current state of the route
    state: RouteState,

    /// Set once the route has finished. Checked at the top of every step, nothing is commanded
    /// once this is true.
    route_complete: bool,

    /// Scan statistics accumulated over the whole route
    mission_stats: ScanStats,

    /// Number of scan stops executed so far
    num_scan_stops: u64,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Errors that can occur in the route manager.
#[derive(Debug, thiserror::Error)]
pub enum RouteMgrError {
    #[error("Failed to load RouteMgrParams: {0:?}")]
    ParamLoadError(util::params::LoadError),

    #[error("Parameter `{0}` is out of range")]
    InvalidParam(&'static str),
}

/// States of the patrol route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteState {
    /// The vehicle has not started moving yet
    NotStarted,

    /// Driving the given segment (1-indexed) of the outbound leg
    LegOutbound(u8),

    /// Turning around at the far end of the patrol area
    Turning,

    /// Driving the given segment (1-indexed) of the return leg
    LegReturn(u8),

    /// The route has finished, this state is terminal
    Complete,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl RouteMgr {
    /// Initialise the route manager from the parameter file at the given path.
    pub fn init(params_path: &str) -> Result<Self, RouteMgrError> {
        // Load parameters
        let params: RouteMgrParams = match util::params::load(params_path) {
            Ok(p) => p,
            Err(e) => return Err(RouteMgrError::ParamLoadError(e)),
        };

        Self::new(params)
    }

    /// Create a new route manager from an already loaded parameter set.
    pub fn new(params: RouteMgrParams) -> Result<Self, RouteMgrError> {
        params.validate()?;

        Ok(Self {
            params,
            state: RouteState::NotStarted,
            route_complete: false,
            mission_stats: ScanStats::default(),
            num_scan_stops: 0,
        })
    }

    /// Current state of the route.
    pub fn state(&self) -> RouteState {
        self.state
    }

    /// True once the route has finished.
    pub fn is_complete(&self) -> bool {
        self.route_complete
    }

    /// Scan statistics accumulated over the route so far.
    pub fn mission_stats(&self) -> ScanStats {
        self.mission_stats
    }

    /// Number of scan stops executed so far.
    pub fn num_scan_stops(&self) -> u64 {
        self.num_scan_stops
    }

    /// Execute one state of the route, returning the state the route is in afterwards.
    ///
    /// Each call runs a whole phase to completion (a drive-and-scan segment, the turnaround, or
    /// the startup wait), so a single call may block for several seconds. Once the route is
    /// complete calls return immediately.
    pub fn step<M, R, U>(&mut self, mech: &mut M, reader: &mut R, uplink: &mut U) -> RouteState
    where
        M: Mech,
        R: TagReader,
        U: Uplink,
    {
        // The complete flag is checked before any state processing, a finished route must never
        // command the equipment again.
        if self.route_complete {
            return self.state;
        }

        match self.state {
            RouteState::NotStarted => {
                info!("Waiting for uplink connectivity");

                while !uplink.is_connected() {
                    thread::sleep(self.params.link_poll_interval());
                }

                info!("Uplink connected");

                // Signal that the route is about to start, then hold so the area around the
                // vehicle can be cleared
                mech.signal(self.params.startup_signal_num);
                thread::sleep(self.params.start_delay());

                self.set_state(RouteState::LegOutbound(1));
            }
            RouteState::LegOutbound(segment) => {
                self.exec_segment(segment, mech, reader, uplink);

                if segment < self.params.segments_per_leg {
                    self.set_state(RouteState::LegOutbound(segment + 1));
                } else {
                    self.set_state(RouteState::Turning);
                }
            }
            RouteState::Turning => {
                // Lawnmower turnaround: quarter turn, drive the gap between the legs, then a
                // second quarter turn in the same direction, leaving the vehicle facing back
                // along the adjacent lane.
                mech.rotate_in_place(TurnDirection::Clockwise);
                thread::sleep(self.params.turn_time());

                mech.drive_forward();
                thread::sleep(self.params.gap_move_time());

                mech.rotate_in_place(TurnDirection::Clockwise);
                thread::sleep(self.params.turn_time());

                self.set_state(RouteState::LegReturn(1));
            }
            RouteState::LegReturn(segment) => {
                self.exec_segment(segment, mech, reader, uplink);

                if segment < self.params.segments_per_leg {
                    self.set_state(RouteState::LegReturn(segment + 1));
                } else {
                    self.complete_route(mech);
                }
            }
            RouteState::Complete => (),
        }

        self.state
    }

    /// Drive one segment and run the scan window at its stop.
    fn exec_segment<M, R, U>(&mut self, segment: u8, mech: &mut M, reader: &mut R, uplink: &mut U)
    where
        M: Mech,
        R: TagReader,
        U: Uplink,
    {
        info!("Segment {} of {}", segment, self.params.segments_per_leg);

        mech.drive_forward();
        thread::sleep(self.params.move_time());
        mech.stop();

        // Single pulse marks the scan window opening
        mech.signal(1);

        let stats = scan::run(self.params.stop_time(), mech, reader, uplink);

        if stats.tags_detected == 0 {
            info!("Scan window closed, no tags detected");
        } else {
            info!(
                "Scan window closed, {} tag(s) detected, {} upload(s) ok, {} failed",
                stats.tags_detected, stats.uploads_ok, stats.upload_failures
            );
        }

        self.mission_stats += stats;
        self.num_scan_stops += 1;
    }

    /// Finish the route, leaving the vehicle stopped and the manager in the terminal state.
    fn complete_route<M: Mech>(&mut self, mech: &mut M) {
        mech.stop();
        mech.signal(self.params.complete_signal_num);

        self.route_complete = true;
        self.set_state(RouteState::Complete);

        info!(
            "Route complete: {} scan stops, {} tags detected, {} uploads ok, {} uploads failed",
            self.num_scan_stops,
            self.mission_stats.tags_detected,
            self.mission_stats.uploads_ok,
            self.mission_stats.upload_failures
        );
    }

    fn set_state(&mut self, new_state: RouteState) {
        self.state = new_state;
        info!("RouteMgr state change to: {}", self.state);
    }
}

impl Display for RouteState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RouteState::NotStarted => write!(f, "RouteState::NotStarted"),
            RouteState::LegOutbound(segment) => write!(f, "RouteState::LegOutbound({})", segment),
            RouteState::Turning => write!(f, "RouteState::Turning"),
            RouteState::LegReturn(segment) => write!(f, "RouteState::LegReturn({})", segment),
            RouteState::Complete => write!(f, "RouteState::Complete"),
        }
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::uplink::SimUplink;
    use eqpt_if::{
        mech::MechCmd,
        sim::{SimMech, SimPresentation, SimTagReader},
    };

    /// Millisecond-scale schedule so tests run quickly.
    fn test_params() -> RouteMgrParams {
        RouteMgrParams {
            move_time_s: 0.002,
            stop_time_s: 0.005,
            gap_move_time_s: 0.002,
            turn_time_s: 0.001,
            start_delay_s: 0.001,
            segments_per_leg: 3,
            startup_signal_num: 3,
            complete_signal_num: 5,
            link_poll_interval_s: 0.001,
        }
    }

    fn run_to_completion(
        mgr: &mut RouteMgr,
        mech: &mut SimMech,
        reader: &mut SimTagReader,
        uplink: &mut SimUplink,
    ) {
        while !mgr.is_complete() {
            mgr.step(mech, reader, uplink);
        }
    }

    #[test]
    fn test_route_visits_states_in_order() {
        let mut mgr = RouteMgr::new(test_params()).unwrap();
        let mut mech = SimMech::new();
        let mut reader = SimTagReader::new(vec![]);
        let mut uplink = SimUplink::new();

        let mut visited = vec![mgr.state()];
        while !mgr.is_complete() {
            visited.push(mgr.step(&mut mech, &mut reader, &mut uplink));
        }

        assert_eq!(
            visited,
            vec![
                RouteState::NotStarted,
                RouteState::LegOutbound(1),
                RouteState::LegOutbound(2),
                RouteState::LegOutbound(3),
                RouteState::Turning,
                RouteState::LegReturn(1),
                RouteState::LegReturn(2),
                RouteState::LegReturn(3),
                RouteState::Complete,
            ]
        );
    }

    #[test]
    fn test_route_makes_six_scan_stops() {
        let mut mgr = RouteMgr::new(test_params()).unwrap();
        let mut mech = SimMech::new();
        let mut reader = SimTagReader::new(vec![]);
        let mut uplink = SimUplink::new();

        run_to_completion(&mut mgr, &mut mech, &mut reader, &mut uplink);

        assert_eq!(mgr.num_scan_stops(), 6);

        // One stop per segment plus the final stop on completion
        assert_eq!(mech.num_cmds(MechCmd::Stop), 7);

        // Six segment drives plus the gap drive in the turnaround
        assert_eq!(mech.num_cmds(MechCmd::DriveForward), 7);
        assert_eq!(
            mech.num_cmds(MechCmd::RotateInPlace(TurnDirection::Clockwise)),
            2
        );

        // Startup signal first, complete signal last
        assert_eq!(mech.cmd_history.first(), Some(&MechCmd::Signal(3)));
        assert_eq!(mech.cmd_history.last(), Some(&MechCmd::Signal(5)));
    }

    #[test]
    fn test_complete_is_absorbing() {
        let mut mgr = RouteMgr::new(test_params()).unwrap();
        let mut mech = SimMech::new();
        let mut reader = SimTagReader::new(vec![SimPresentation::Tag(vec![0x04, 0xA2])]);
        let mut uplink = SimUplink::new();

        run_to_completion(&mut mgr, &mut mech, &mut reader, &mut uplink);

        let num_cmds = mech.cmd_history.len();
        let num_polls = reader.num_polls;
        let num_uploads = uplink.uploads.len();

        // Further steps must return immediately without touching the equipment
        for _ in 0..3 {
            assert_eq!(
                mgr.step(&mut mech, &mut reader, &mut uplink),
                RouteState::Complete
            );
        }

        assert_eq!(mech.cmd_history.len(), num_cmds);
        assert_eq!(reader.num_polls, num_polls);
        assert_eq!(uplink.uploads.len(), num_uploads);
    }

    #[test]
    fn test_failed_uploads_do_not_stall_route() {
        let mut mgr = RouteMgr::new(test_params()).unwrap();
        let mut mech = SimMech::new();
        let mut reader = SimTagReader::new(vec![
            SimPresentation::Tag(vec![0x04, 0xA2, 0x3F, 0x19]),
            SimPresentation::Tag(vec![0xDE, 0xAD, 0xBE, 0xEF]),
        ]);
        let mut uplink = SimUplink::new();
        uplink.fail_uploads = true;

        run_to_completion(&mut mgr, &mut mech, &mut reader, &mut uplink);

        // The route runs to the end, the failures show up only in the stats
        assert_eq!(mgr.state(), RouteState::Complete);
        assert_eq!(mgr.mission_stats().tags_detected, 2);
        assert_eq!(mgr.mission_stats().uploads_ok, 0);
        assert_eq!(mgr.mission_stats().upload_failures, 2);
        assert_eq!(uplink.uploads.len(), 2);
    }

    #[test]
    fn test_same_tag_at_two_stops_uploads_twice() {
        let mut mgr = RouteMgr::new(test_params()).unwrap();
        let mut mech = SimMech::new();
        let mut reader = SimTagReader::new(vec![]);
        let mut uplink = SimUplink::new();

        while !mgr.is_complete() {
            // Present the same tag at the second stop of each leg
            if matches!(
                mgr.state(),
                RouteState::LegOutbound(2) | RouteState::LegReturn(2)
            ) {
                reader.present(SimPresentation::Tag(vec![0x04, 0xA2, 0x3F, 0x19]));
            }

            mgr.step(&mut mech, &mut reader, &mut uplink);
        }

        // No de-duplication across stops
        assert_eq!(
            uplink.uploads,
            vec!["04 A2 3F 19".to_string(), "04 A2 3F 19".to_string()]
        );
        assert_eq!(mgr.mission_stats().tags_detected, 2);
        assert_eq!(mgr.mission_stats().uploads_ok, 2);
    }

    #[test]
    fn test_invalid_params_rejected() {
        let mut params = test_params();
        params.move_time_s = -1.0;
        assert!(RouteMgr::new(params).is_err());

        let mut params = test_params();
        params.stop_time_s = f64::NAN;
        assert!(RouteMgr::new(params).is_err());

        let mut params = test_params();
        params.segments_per_leg = 0;
        assert!(RouteMgr::new(params).is_err());
    }
}
