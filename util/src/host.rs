//! Host platform (linux for example) utility functions

use std::path::PathBuf;
use thiserror::Error;
use uname;

/// Possible errors associated with the host module.
#[derive(Debug, Error)]
pub enum HostError {
    #[error("The software root environment variable (PATROL_SW_ROOT) is not set")]
    SwRootNotSet,
}

/// Retrieve uname information.
pub fn get_uname() -> std::io::Result<uname::Info> {
    uname::uname()
}

/// Get the path to the root of the patrol software installation.
///
/// The root is read from the PATROL_SW_ROOT environment variable, which must
/// be set before running any executable. Session and parameter directories are
/// resolved relative to this root.
pub fn get_patrol_sw_root() -> Result<PathBuf, HostError> {
    match std::env::var("PATROL_SW_ROOT") {
        Ok(v) => Ok(PathBuf::from(v)),
        Err(_) => Err(HostError::SwRootNotSet),
    }
}
