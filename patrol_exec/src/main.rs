//! Main patrol vehicle executable entry point.
//!
//! # Architecture
//!
//! The general execution methodology consists of:
//!
//!     - Initialise all modules
//!     - Route loop:
//!         - Step the RouteMgr until the route is complete
//!
//! There is no cyclic executive here, the route is a single linear schedule and each RouteMgr
//! step runs a whole phase of it (drive a segment and scan at its stop, turn around, or wait
//! for connectivity), so one step may block for several seconds.
//!
//! On ARM targets the real drive, signalling, and tag reader equipment is used. On any other
//! target the equipment is simulated so the executable can be exercised on a dev machine.

// ------------------------------------------------------------------------------------------------
// USE MODULES FROM LIBRARY
// ------------------------------------------------------------------------------------------------

use patrol_lib::{
    route_mgr::RouteMgr,
    uplink::{HttpUplink, UplinkParams},
};

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

// External
use color_eyre::{eyre::WrapErr, Report};
use log::{info, warn};

// Internal
use util::{
    host,
    logger::{logger_init, LevelFilter},
    session::Session,
};

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session =
        Session::new("patrol_exec", "sessions").wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(LevelFilter::Trace, &session).wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("Patrol Vehicle Executable\n");
    info!(
        "Running on: {:#?}",
        host::get_uname().wrap_err("Failed to get host information")?
    );
    info!("Session directory: {:?}\n", session.session_root);

    // ---- LOAD PARAMETERS ----

    let uplink_params: UplinkParams =
        util::params::load("uplink.toml").wrap_err("Could not load uplink params")?;

    info!("Exec parameters loaded");

    // ---- INITIALISE MODULES ----

    info!("Initialising modules...");

    let mut uplink = HttpUplink::new(&uplink_params).wrap_err("Failed to initialise the uplink")?;
    info!("Uplink init complete");

    let mut route_mgr =
        RouteMgr::init("route_mgr.toml").wrap_err("Failed to initialise RouteMgr")?;
    info!("RouteMgr init complete");

    info!("Module initialisation complete\n");

    // ---- INITIALISE EQUIPMENT ----

    #[cfg(target_arch = "arm")]
    let (mut mech, mut reader) = {
        let eqpt_params: eqpt_if::params::EqptParams =
            util::params::load("eqpt.toml").wrap_err("Could not load eqpt params")?;

        let mech = eqpt_if::hw::GpioMech::new(&eqpt_params.mech)
            .wrap_err("Failed to initialise the drive and signalling equipment")?;
        info!("GpioMech initialised");

        let reader = eqpt_if::hw::tag_reader(&eqpt_params.tag_reader)
            .wrap_err("Failed to initialise the tag reader")?;
        info!("Tag reader initialised");

        (mech, reader)
    };

    #[cfg(not(target_arch = "arm"))]
    let (mut mech, mut reader) = {
        warn!("Not an ARM target, equipment is simulated and no tags will be detected");
        (
            eqpt_if::sim::SimMech::new(),
            eqpt_if::sim::SimTagReader::new(vec![]),
        )
    };

    info!("Equipment initialisation complete\n");

    // ---- ROUTE EXECUTION ----

    info!("Begining route execution\n");

    while !route_mgr.is_complete() {
        route_mgr.step(&mut mech, &mut reader, &mut uplink);
    }

    info!("End of execution");

    Ok(())
}
