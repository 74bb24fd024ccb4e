//! # Equipment Interface Library
//!
//! This library provides the interfaces between the patrol software and the vehicle's equipment,
//! namely the locomotion/signalling hardware and the proximity tag reader. Each piece of
//! equipment is expressed as a trait so that the control logic can run against either the real
//! hardware or the simulated bench equipment in [`sim`].

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Raspberry Pi hardware equipment, only available on the vehicle's target architecture.
#[cfg(target_arch = "arm")]
pub mod hw;

/// Locomotion and signalling interface.
pub mod mech;

/// Parameter structures for the equipment.
pub mod params;

/// Simulated bench equipment.
pub mod sim;

/// Proximity tag reader interface.
pub mod tag;
