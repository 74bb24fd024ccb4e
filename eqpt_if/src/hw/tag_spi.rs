//! Platform glue for the tag reader on the vehicle's SPI bus

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use rppal::spi::{Bus, Mode, SlaveSelect, Spi};
use thiserror::Error;

use crate::params::TagReaderParams;
use crate::tag::rc522::{Rc522Error, Rc522Reader};

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Errors which can occur while putting the reader on the SPI bus.
#[derive(Debug, Error)]
pub enum TagSpiError {
    #[error("No SPI bus with index {0}")]
    UnknownSpiBus(u8),

    #[error("No SPI slave select line with index {0}")]
    UnknownSlaveSelect(u8),

    #[error("Cannot open the SPI bus: {0}")]
    SpiOpenError(rppal::spi::Error),

    #[error("Reader setup failed: {0}")]
    ReaderInitError(Rc522Error),
}

// ------------------------------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Build a tag reader on the SPI bus given in the parameters.
///
/// The bus's own slave select line drives the chip, in mode 0 as the MFRC522 requires.
pub fn tag_reader(params: &TagReaderParams) -> Result<Rc522Reader<Spi>, TagSpiError> {
    let bus = match params.spi_bus {
        0 => Bus::Spi0,
        1 => Bus::Spi1,
        2 => Bus::Spi2,
        b => return Err(TagSpiError::UnknownSpiBus(b)),
    };

    let slave_select = match params.spi_slave_select {
        0 => SlaveSelect::Ss0,
        1 => SlaveSelect::Ss1,
        2 => SlaveSelect::Ss2,
        s => return Err(TagSpiError::UnknownSlaveSelect(s)),
    };

    let spi = Spi::new(bus, slave_select, params.spi_clock_hz, Mode::Mode0)
        .map_err(TagSpiError::SpiOpenError)?;

    Rc522Reader::new(spi).map_err(TagSpiError::ReaderInitError)
}
