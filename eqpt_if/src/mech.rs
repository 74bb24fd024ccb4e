//! # Locomotion and signalling interface
//!
//! [`Mech`] gives the control logic a discrete-command view of the drive and signalling
//! hardware. The vehicle is a skid-steer platform, so the only motion commands are forward bias
//! on both sides, an in-place rotation, and neutral. Commands are level-triggered, the hardware
//! holds the last commanded state until the next command arrives.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Rotational sense of an in-place turn, viewed from above the vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TurnDirection {
    Clockwise,
    CounterClockwise,
}

/// A discrete command accepted by the locomotion/signalling hardware.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MechCmd {
    /// Both drive sides forward
    DriveForward,

    /// In-place rotation in the given sense
    RotateInPlace(TurnDirection),

    /// Both drive sides neutral
    Stop,

    /// Pulse the audible indicator the given number of times
    Signal(u8),
}

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// Trait providing a unified API for the locomotion and signalling hardware.
///
/// The operations are infallible. They are pure hardware-state writes, and failure is not
/// detectable at this level.
pub trait Mech {
    /// Set both drive sides to forward bias. The vehicle moves until the next command.
    fn drive_forward(&mut self);

    /// Set the drive sides to opposing bias, rotating the vehicle in place in the given sense.
    fn rotate_in_place(&mut self, direction: TurnDirection);

    /// Set both drive sides to neutral. Idempotent.
    fn stop(&mut self);

    /// Pulse the audible indicator `times` times, each pulse a fixed on duration followed by a
    /// fixed off duration. Blocks the caller for the full pattern.
    fn signal(&mut self, times: u8);
}
