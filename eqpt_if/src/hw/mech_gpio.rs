//! [`Mech`] implementation for the vehicle's GPIO driven drive and signalling hardware

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::{debug, trace};
use rppal::gpio::{Gpio, OutputPin};
use std::{thread, time::Duration};
use thiserror::Error;

use crate::mech::{Mech, TurnDirection};
use crate::params::MechParams;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// The vehicle's h-bridge drive and buzzer, driven over GPIO.
///
/// Each drive side has two direction pins and a PWM enable pin. The enable duties are fixed at
/// construction, with the two sides trimmed separately so the vehicle runs straight, and only the
/// direction pins switch afterwards.
pub struct GpioMech {
    left_fwd: OutputPin,
    left_rev: OutputPin,
    right_fwd: OutputPin,
    right_rev: OutputPin,
    buzzer: OutputPin,

    signal_on_time: Duration,
    signal_off_time: Duration,

    // Held so the enable PWMs keep running for the life of the mech
    _left_en: OutputPin,
    _right_en: OutputPin,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Errors which can occur while setting up the GPIO hardware.
#[derive(Debug, Error)]
pub enum GpioMechError {
    #[error("Cannot access the GPIO peripheral: {0}")]
    GpioAcquireError(rppal::gpio::Error),

    #[error("Cannot configure GPIO pin {0}: {1}")]
    PinConfigError(u8, rppal::gpio::Error),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl GpioMech {
    /// Set up the drive and signalling hardware from the given parameters.
    ///
    /// All direction pins and the buzzer are driven low, and the enable PWMs are started at
    /// their fixed duties.
    pub fn new(params: &MechParams) -> Result<Self, GpioMechError> {
        let gpio = Gpio::new().map_err(GpioMechError::GpioAcquireError)?;

        let output_pin = |pin: u8| -> Result<OutputPin, GpioMechError> {
            let mut output = gpio
                .get(pin)
                .map_err(|e| GpioMechError::PinConfigError(pin, e))?
                .into_output();
            output.set_low();
            Ok(output)
        };

        let left_fwd = output_pin(params.left_fwd_pin)?;
        let left_rev = output_pin(params.left_rev_pin)?;
        let right_fwd = output_pin(params.right_fwd_pin)?;
        let right_rev = output_pin(params.right_rev_pin)?;
        let buzzer = output_pin(params.buzzer_pin)?;

        let mut left_en = output_pin(params.left_en_pin)?;
        left_en
            .set_pwm_frequency(params.pwm_frequency_hz, params.left_duty)
            .map_err(|e| GpioMechError::PinConfigError(params.left_en_pin, e))?;

        let mut right_en = output_pin(params.right_en_pin)?;
        right_en
            .set_pwm_frequency(params.pwm_frequency_hz, params.right_duty)
            .map_err(|e| GpioMechError::PinConfigError(params.right_en_pin, e))?;

        debug!(
            "GpioMech initialised, drive duties left {:.2} right {:.2}",
            params.left_duty, params.right_duty
        );

        Ok(Self {
            left_fwd,
            left_rev,
            right_fwd,
            right_rev,
            buzzer,
            signal_on_time: Duration::from_millis(params.signal_on_time_ms),
            signal_off_time: Duration::from_millis(params.signal_off_time_ms),
            _left_en: left_en,
            _right_en: right_en,
        })
    }
}

impl Mech for GpioMech {
    fn drive_forward(&mut self) {
        trace!("GpioMech: drive forward");

        // The two pins of a side are never high together, clear before set
        self.left_rev.set_low();
        self.right_rev.set_low();
        self.left_fwd.set_high();
        self.right_fwd.set_high();
    }

    fn rotate_in_place(&mut self, direction: TurnDirection) {
        trace!("GpioMech: rotate {:?}", direction);

        match direction {
            // Left side forward with right side in reverse turns the vehicle clockwise when
            // viewed from above
            TurnDirection::Clockwise => {
                self.left_rev.set_low();
                self.right_fwd.set_low();
                self.left_fwd.set_high();
                self.right_rev.set_high();
            }
            TurnDirection::CounterClockwise => {
                self.left_fwd.set_low();
                self.right_rev.set_low();
                self.left_rev.set_high();
                self.right_fwd.set_high();
            }
        }
    }

    fn stop(&mut self) {
        trace!("GpioMech: stop");

        self.left_fwd.set_low();
        self.left_rev.set_low();
        self.right_fwd.set_low();
        self.right_rev.set_low();
    }

    fn signal(&mut self, times: u8) {
        trace!("GpioMech: signal {} times", times);

        for _ in 0..times {
            self.buzzer.set_high();
            thread::sleep(self.signal_on_time);
            self.buzzer.set_low();
            thread::sleep(self.signal_off_time);
        }
    }
}
