//! [`TagReader`] implementation for the MFRC522 reader chip

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use embedded_hal::blocking::spi::{Transfer, Write};
use log::{debug, warn};
use mfrc522::comm::eh02::spi::{DummyDelay, DummyNSS, SpiInterface};
use mfrc522::comm::Interface;
use mfrc522::{Initialized, Mfrc522};
use std::fmt;
use thiserror::Error;

use super::{TagReader, TagUid};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// An MFRC522 proximity tag reader on an SPI bus.
///
/// The chip is polled with a request-wakeup then a select. A successful select latches the tag's
/// identifier, and [`TagReader::release`] halts the tag and clears the chip's crypto session so
/// the same presentation is not picked up again.
pub struct Rc522Reader<SPI>
where
    SpiInterface<SPI, DummyNSS, DummyDelay>: Interface,
{
    mfrc522: Mfrc522<SpiInterface<SPI, DummyNSS, DummyDelay>, Initialized>,
    latched: Option<TagUid>,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Errors which can occur while setting up the reader chip.
#[derive(Debug, Error)]
pub enum Rc522Error {
    #[error("Cannot initialise the MFRC522: {0}")]
    InitError(String),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl<SPI, E> Rc522Reader<SPI>
where
    SPI: Transfer<u8, Error = E> + Write<u8, Error = E>,
    E: fmt::Debug,
{
    /// Set up the reader chip on the given SPI bus.
    ///
    /// The bus is expected to drive the chip's slave select line itself.
    pub fn new(spi: SPI) -> Result<Self, Rc522Error> {
        let mut mfrc522 = Mfrc522::new(SpiInterface::new(spi))
            .init()
            .map_err(|e| Rc522Error::InitError(format!("{:?}", e)))?;

        match mfrc522.version() {
            Ok(version) => debug!("MFRC522 version: 0x{:02X}", version),
            Err(e) => warn!("Could not read the MFRC522 version: {:?}", e),
        }

        Ok(Self {
            mfrc522,
            latched: None,
        })
    }
}

impl<SPI, E> TagReader for Rc522Reader<SPI>
where
    SPI: Transfer<u8, Error = E> + Write<u8, Error = E>,
    E: fmt::Debug,
{
    fn poll_for_tag(&mut self) -> bool {
        // An unreleased tag blocks the field
        if self.latched.is_some() {
            return false;
        }

        // A failed request or select is a tag which is absent or unreadable this poll, it will
        // be retried on a later one
        let atqa = match self.mfrc522.reqa() {
            Ok(atqa) => atqa,
            Err(_) => return false,
        };

        match self.mfrc522.select(&atqa) {
            Ok(uid) => {
                self.latched = Some(TagUid::new(uid.as_bytes()));
                true
            }
            Err(_) => false,
        }
    }

    fn read_uid(&self) -> TagUid {
        self.latched.clone().unwrap_or_default()
    }

    fn release(&mut self) {
        if self.latched.take().is_none() {
            return;
        }

        if let Err(e) = self.mfrc522.hlta() {
            warn!("Could not halt the current tag: {:?}", e);
        }

        if let Err(e) = self.mfrc522.stop_crypto1() {
            warn!("Could not reset the reader's crypto session: {:?}", e);
        }
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
