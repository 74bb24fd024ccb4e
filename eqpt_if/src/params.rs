//! Parameter structures for the vehicle equipment

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::Deserialize;

// ------------------------------------------------------------------------------------------------
// DATA STRUCTURES
// ------------------------------------------------------------------------------------------------

/// Parameters for all vehicle equipment.
#[derive(Debug, Clone, Deserialize)]
pub struct EqptParams {
    pub mech: MechParams,
    pub tag_reader: TagReaderParams,
}

/// Parameters for the locomotion and signalling hardware.
#[derive(Debug, Clone, Deserialize)]
pub struct MechParams {
    // ---- DRIVE ----
    /// GPIO pin driving the left side forward
    pub left_fwd_pin: u8,

    /// GPIO pin driving the left side in reverse
    pub left_rev_pin: u8,

    /// GPIO pin driving the right side forward
    pub right_fwd_pin: u8,

    /// GPIO pin driving the right side in reverse
    pub right_rev_pin: u8,

    /// GPIO pin enabling the left drive side
    pub left_en_pin: u8,

    /// GPIO pin enabling the right drive side
    pub right_en_pin: u8,

    /// PWM duty cycle applied to the left drive side.
    ///
    /// The left and right duties differ so that the vehicle's drive bias can be trimmed out and
    /// it runs straight.
    ///
    /// Units: dimensionless, in [0.0, 1.0]
    pub left_duty: f64,

    /// PWM duty cycle applied to the right drive side.
    ///
    /// Units: dimensionless, in [0.0, 1.0]
    pub right_duty: f64,

    /// Software PWM frequency of the drive enable pins.
    ///
    /// Units: hertz
    pub pwm_frequency_hz: f64,

    // ---- SIGNALLING ----
    /// GPIO pin driving the audible indicator
    pub buzzer_pin: u8,

    /// On duration of a single signal pulse.
    ///
    /// Units: milliseconds
    pub signal_on_time_ms: u64,

    /// Off duration following a single signal pulse.
    ///
    /// Units: milliseconds
    pub signal_off_time_ms: u64,
}

/// Parameters for the proximity tag reader.
#[derive(Debug, Clone, Deserialize)]
pub struct TagReaderParams {
    /// Index of the SPI bus the reader is attached to
    pub spi_bus: u8,

    /// Index of the reader's slave select line on the bus
    pub spi_slave_select: u8,

    /// SPI clock speed.
    ///
    /// Units: hertz
    pub spi_clock_hz: u32,
}
