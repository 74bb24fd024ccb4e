//! Library of functionality behind the patrol executable.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

/// Route manager, the mission state machine.
pub mod route_mgr;

/// Time-boxed tag scan window run at each stop.
pub mod scan;

/// Uplink client delivering tag identifiers to the remote endpoint.
pub mod uplink;
