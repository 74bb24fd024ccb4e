//! # Proximity tag reader interface
//!
//! [`TagReader`] gives the control logic a poll/read/release view of a proximity tag reader, and
//! [`TagUid`] carries a tag's identifier along with its uplink wire formatting. The reader is
//! edge-triggered: a presentation is reported once, read, then released so the next presentation
//! can latch.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// [`TagReader`] implementation for the MFRC522 reader chip.
pub mod rc522;

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use std::fmt;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// The unique identifier of a proximity tag.
///
/// Identifiers are 4, 7 or 10 bytes long depending on the tag type, so the bytes are kept as a
/// variable length sequence rather than a fixed array.
///
/// The `Display` implementation renders the identifier in the uplink wire format, uppercase
/// hexadecimal bytes separated by single spaces, for example `"04 A2 3F 19"`.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagUid(Vec<u8>);

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// Trait providing a unified API for proximity tag readers.
pub trait TagReader {
    /// Poll for a newly presented tag.
    ///
    /// Non-blocking and edge-triggered, returns true only when a new tag is present in the field
    /// and its identifier has been latched. Returns false when no tag is present, when the
    /// latched tag has not yet been released, or when a read fails part way through. A failed
    /// read is retried on a later poll, no error is surfaced.
    fn poll_for_tag(&mut self) -> bool;

    /// Get the latched identifier.
    ///
    /// Valid immediately after a poll which returned true. Returns an empty identifier if no tag
    /// is latched.
    fn read_uid(&self) -> TagUid;

    /// Halt the latched tag and reset the reader's session state.
    ///
    /// Must be called exactly once per successful detection, before the next poll, so that the
    /// same presentation is not detected twice.
    fn release(&mut self);
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl TagUid {
    /// Create a new identifier from the given raw bytes.
    pub fn new(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }

    /// Get the raw bytes of the identifier.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// True if the identifier contains no bytes.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for TagUid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, byte) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{:02X}", byte)?;
        }
        Ok(())
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
