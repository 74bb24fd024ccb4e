//! Full-route integration tests against simulated equipment and uplink.

use eqpt_if::{
    mech::{MechCmd, TurnDirection},
    sim::{SimMech, SimPresentation, SimTagReader},
};
use patrol_lib::{
    route_mgr::{RouteMgr, RouteMgrParams, RouteState},
    uplink::SimUplink,
};

/// Millisecond-scale schedule so the full route runs in well under a second.
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

#[test]
fn full_route_command_sequence_and_uploads() {
    let mut mgr = RouteMgr::new(test_params()).unwrap();
    let mut mech = SimMech::new();

    // One tag already waiting at the first stop, a second presented later in the route
    let mut reader = SimTagReader::new(vec![SimPresentation::Tag(vec![0x04, 0xA2, 0x3F, 0x19])]);
    let mut uplink = SimUplink::new();

    while !mgr.is_complete() {
        if mgr.state() == RouteState::LegReturn(2) {
            reader.present(SimPresentation::Tag(vec![0xDE, 0xAD, 0xBE, 0xEF]));
        }

        mgr.step(&mut mech, &mut reader, &mut uplink);
    }

    assert_eq!(mgr.state(), RouteState::Complete);
    assert_eq!(mgr.num_scan_stops(), 6);

    // Uploads arrive in detection order, formatted as spaced uppercase hex
    assert_eq!(
        uplink.uploads,
        vec!["04 A2 3F 19".to_string(), "DE AD BE EF".to_string()]
    );

    // Command sequence shape over the whole route
    assert_eq!(mech.cmd_history.first(), Some(&MechCmd::Signal(3)));
    assert_eq!(mech.cmd_history.last(), Some(&MechCmd::Signal(5)));

    // Six segment drives plus the gap drive in the turnaround
    assert_eq!(mech.num_cmds(MechCmd::DriveForward), 7);

    // One stop per segment plus the final stop on completion
    assert_eq!(mech.num_cmds(MechCmd::Stop), 7);

    // Both turnaround quarter turns are in the same direction
    assert_eq!(
        mech.num_cmds(MechCmd::RotateInPlace(TurnDirection::Clockwise)),
        2
    );
    assert_eq!(
        mech.num_cmds(MechCmd::RotateInPlace(TurnDirection::CounterClockwise)),
        0
    );

    // A window-open pulse at each of the six stops, plus one pulse per detected tag
    assert_eq!(mech.num_cmds(MechCmd::Signal(1)), 8);
}

#[test]
fn full_route_with_failing_uplink_still_completes() {
    let mut mgr = RouteMgr::new(test_params()).unwrap();
    let mut mech = SimMech::new();
    let mut reader = SimTagReader::new(vec![
        SimPresentation::Tag(vec![0x11, 0x22, 0x33, 0x44]),
        SimPresentation::CorruptRead,
        SimPresentation::Tag(vec![0x55, 0x66, 0x77, 0x88]),
    ]);
    let mut uplink = SimUplink::new();
    uplink.fail_uploads = true;

    while !mgr.is_complete() {
        mgr.step(&mut mech, &mut reader, &mut uplink);
    }

    assert_eq!(mgr.state(), RouteState::Complete);

    // Both clean reads were attempted in order, the corrupted one was dropped silently
    assert_eq!(
        uplink.uploads,
        vec!["11 22 33 44".to_string(), "55 66 77 88".to_string()]
    );

    let stats = mgr.mission_stats();
    assert_eq!(stats.tags_detected, 2);
    assert_eq!(stats.uploads_ok, 0);
    assert_eq!(stats.upload_failures, 2);

    // The failures never shortened the route
    assert_eq!(mgr.num_scan_stops(), 6);
    assert_eq!(mech.cmd_history.last(), Some(&MechCmd::Signal(5)));
}
