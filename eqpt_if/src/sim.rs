//! # Simulated bench equipment
//!
//! Simulated implementations of [`Mech`] and [`TagReader`], used when the software runs on a
//! non-vehicle host and in tests. [`SimMech`] records every command it is given without
//! sleeping, and [`SimTagReader`] plays back a scripted sequence of tag presentations.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::trace;
use std::collections::VecDeque;

use crate::mech::{Mech, MechCmd, TurnDirection};
use crate::tag::{TagReader, TagUid};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Simulated locomotion and signalling hardware.
///
/// Records every command issued, allowing tests to assert on the exact command sequence. Signal
/// pulses do not block.
#[derive(Debug, Default)]
pub struct SimMech {
    /// Every command issued, in order
    pub cmd_history: Vec<MechCmd>,
}

/// Simulated proximity tag reader.
///
/// Presentations are consumed from the front of the queue, one per poll. A clean presentation
/// latches its identifier and is reported exactly once, a corrupted one is consumed silently as
/// "no tag". While an identifier is latched further polls report no tag, matching the real
/// reader, where an unreleased tag blocks the field.
#[derive(Debug, Default)]
pub struct SimTagReader {
    presentations: VecDeque<SimPresentation>,
    latched: Option<TagUid>,

    /// Number of polls made against this reader
    pub num_polls: u64,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// A single scripted presentation to a [`SimTagReader`].
#[derive(Debug, Clone)]
pub enum SimPresentation {
    /// A tag with the given identifier bytes is presented and reads cleanly
    Tag(Vec<u8>),

    /// A tag is presented but the read is corrupted part way through
    CorruptRead,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl SimMech {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of issued commands matching the given command.
    pub fn num_cmds(&self, cmd: MechCmd) -> usize {
        self.cmd_history.iter().filter(|c| **c == cmd).count()
    }
}

impl Mech for SimMech {
    fn drive_forward(&mut self) {
        trace!("SimMech: drive forward");
        self.cmd_history.push(MechCmd::DriveForward);
    }

    fn rotate_in_place(&mut self, direction: TurnDirection) {
        trace!("SimMech: rotate {:?}", direction);
        self.cmd_history.push(MechCmd::RotateInPlace(direction));
    }

    fn stop(&mut self) {
        trace!("SimMech: stop");
        self.cmd_history.push(MechCmd::Stop);
    }

    fn signal(&mut self, times: u8) {
        trace!("SimMech: signal {} times", times);
        self.cmd_history.push(MechCmd::Signal(times));
    }
}

impl SimTagReader {
    /// Create a new reader which will play back the given presentations in order.
    pub fn new(presentations: Vec<SimPresentation>) -> Self {
        Self {
            presentations: presentations.into(),
            latched: None,
            num_polls: 0,
        }
    }

    /// Queue another presentation behind any still pending.
    pub fn present(&mut self, presentation: SimPresentation) {
        self.presentations.push_back(presentation);
    }

    /// Number of presentations not yet consumed.
    pub fn num_pending(&self) -> usize {
        self.presentations.len()
    }
}

impl TagReader for SimTagReader {
    fn poll_for_tag(&mut self) -> bool {
        self.num_polls += 1;

        // An unreleased tag blocks the field
        if self.latched.is_some() {
            return false;
        }

        match self.presentations.pop_front() {
            Some(SimPresentation::Tag(bytes)) => {
                self.latched = Some(TagUid::new(&bytes));
                true
            }
            Some(SimPresentation::CorruptRead) => false,
            None => false,
        }
    }

    fn read_uid(&self) -> TagUid {
        self.latched.clone().unwrap_or_default()
    }

    fn release(&mut self) {
        self.latched = None;
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_sim_reader_detects_each_presentation_once() {
        let mut reader = SimTagReader::new(vec![
            SimPresentation::Tag(vec![0x04, 0xA2, 0x3F, 0x19]),
            SimPresentation::Tag(vec![0xDE, 0xAD, 0xBE, 0xEF]),
        ]);

        assert!(reader.poll_for_tag());
        assert_eq!(reader.read_uid().to_string(), "04 A2 3F 19");
        reader.release();

        assert!(reader.poll_for_tag());
        assert_eq!(reader.read_uid().to_string(), "DE AD BE EF");
        reader.release();

        // Queue exhausted
        assert!(!reader.poll_for_tag());
        assert!(reader.read_uid().is_empty());
    }

    #[test]
    fn test_sim_reader_corrupt_reads_are_silent() {
        let mut reader = SimTagReader::new(vec![
            SimPresentation::CorruptRead,
            SimPresentation::Tag(vec![0x01, 0x02, 0x03, 0x04]),
        ]);

        // The corrupted presentation is consumed as "no tag"
        assert!(!reader.poll_for_tag());

        assert!(reader.poll_for_tag());
        assert_eq!(reader.read_uid().to_string(), "01 02 03 04");
    }

    #[test]
    fn test_sim_reader_requires_release_before_next_latch() {
        let mut reader = SimTagReader::new(vec![
            SimPresentation::Tag(vec![0x01]),
            SimPresentation::Tag(vec![0x02]),
        ]);

        assert!(reader.poll_for_tag());

        // Polling again without releasing reports nothing and leaves the second presentation
        // pending
        assert!(!reader.poll_for_tag());
        assert_eq!(reader.read_uid().to_string(), "01");
        assert_eq!(reader.num_pending(), 1);

        reader.release();
        assert!(reader.poll_for_tag());
        assert_eq!(reader.read_uid().to_string(), "02");
    }

    #[test]
    fn test_sim_mech_records_commands() {
        let mut mech = SimMech::new();

        mech.signal(3);
        mech.drive_forward();
        mech.rotate_in_place(TurnDirection::Clockwise);
        mech.stop();

        assert_eq!(
            mech.cmd_history,
            vec![
                MechCmd::Signal(3),
                MechCmd::DriveForward,
                MechCmd::RotateInPlace(TurnDirection::Clockwise),
                MechCmd::Stop,
            ]
        );
        assert_eq!(mech.num_cmds(MechCmd::Stop), 1);
    }
}
