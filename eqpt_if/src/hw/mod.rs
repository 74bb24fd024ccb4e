//! # Raspberry Pi hardware equipment
//!
//! Implementations of the equipment interfaces for the vehicle itself, built on `rppal`. Only
//! available when compiling for the vehicle's target architecture.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// [`crate::mech::Mech`] implementation over the vehicle's GPIO.
pub mod mech_gpio;

/// Platform glue putting an [`crate::tag::rc522::Rc522Reader`] on the vehicle's SPI bus.
pub mod tag_spi;

// ------------------------------------------------------------------------------------------------
// EXPORTS
// ------------------------------------------------------------------------------------------------

pub use mech_gpio::{GpioMech, GpioMechError};
pub use tag_spi::{tag_reader, TagSpiError};
