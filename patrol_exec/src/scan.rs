//! # Scan window
//!
//! A scan window is the bounded interval at each stop in which the vehicle looks for proximity
//! tags. The reader is busy-polled until the deadline passes. The control loop has nothing else
//! to do while the vehicle is stationary, so polling flat out costs nothing and keeps detection
//! latency as low as the reader allows.
//!
//! Each detection is handled exactly once and in presentation order: the identifier is read and
//! rendered, a short signal pulse is emitted, the identifier is handed to the uplink, then the
//! reader is released ready for the next presentation. Upload failures are logged and the window
//! carries on, an identifier is never retried.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::{info, warn};
use std::ops::AddAssign;
use std::time::{Duration, Instant};

use eqpt_if::mech::Mech;
use eqpt_if::tag::TagReader;

use crate::uplink::Uplink;

// ------------------------------------------------------------------------------------------------
// DATA STRUCTURES
// ------------------------------------------------------------------------------------------------

/// Counts of what happened during one or more scan windows.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ScanStats {
    /// Number of tags detected
    pub tags_detected: u64,

    /// Number of identifiers accepted by the uplink
    pub uploads_ok: u64,

    /// Number of upload attempts which failed and were dropped
    pub upload_failures: u64,
}

// ------------------------------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Run one scan window of the given duration.
///
/// Returns once the deadline has passed, never earlier. A detection in flight when the deadline
/// passes is finished before the window closes, the schedule absorbs the overrun.
pub fn run<M, R, U>(window: Duration, mech: &mut M, reader: &mut R, uplink: &mut U) -> ScanStats
where
    M: Mech,
    R: TagReader,
    U: Uplink,
{
    let start = Instant::now();
    let mut stats = ScanStats::default();

    while start.elapsed() < window {
        if !reader.poll_for_tag() {
            continue;
        }

        let uid = reader.read_uid().to_string();
        stats.tags_detected += 1;
        info!("Tag detected: {}", uid);

        // Detection feedback pulse
        mech.signal(1);

        match uplink.upload(&uid) {
            Ok(()) => {
                stats.uploads_ok += 1;
                info!("Tag identifier uploaded");
            }
            Err(e) => {
                stats.upload_failures += 1;
                warn!("Upload failed, identifier dropped: {}", e);
            }
        }

        reader.release();
    }

    stats
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl AddAssign for ScanStats {
    fn add_assign(&mut self, rhs: Self) {
        self.tags_detected += rhs.tags_detected;
        self.uploads_ok += rhs.uploads_ok;
        self.upload_failures += rhs.upload_failures;
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::uplink::{SimUplink, UplinkError};
    use eqpt_if::sim::{SimMech, SimPresentation, SimTagReader};

    /// Uplink which stalls on every upload, standing in for a slow endpoint.
    struct SlowUplink {
        delay: Duration,
        uploads: Vec<String>,
    }

    impl Uplink for SlowUplink {
        fn upload(&mut self, uid: &str) -> Result<(), UplinkError> {
            std::thread::sleep(self.delay);
            self.uploads.push(uid.to_string());
            Ok(())
        }

        fn is_connected(&self) -> bool {
            true
        }
    }

    #[test]
    fn test_empty_window_runs_to_deadline_with_no_uploads() {
        let window = Duration::from_millis(40);
        let mut mech = SimMech::new();
        let mut reader = SimTagReader::new(vec![]);
        let mut uplink = SimUplink::new();

        let start = Instant::now();
        let stats = run(window, &mut mech, &mut reader, &mut uplink);
        let elapsed = start.elapsed();

        assert!(elapsed >= window, "window closed after {:?}", elapsed);
        assert_eq!(stats, ScanStats::default());
        assert!(uplink.uploads.is_empty());
        assert!(mech.cmd_history.is_empty());
        assert!(reader.num_polls > 0);
    }

    #[test]
    fn test_zero_window_returns_immediately() {
        let mut mech = SimMech::new();
        let mut reader = SimTagReader::new(vec![SimPresentation::Tag(vec![0x01])]);
        let mut uplink = SimUplink::new();

        let stats = run(Duration::from_secs(0), &mut mech, &mut reader, &mut uplink);

        assert_eq!(stats, ScanStats::default());
        assert!(uplink.uploads.is_empty());
        assert_eq!(reader.num_pending(), 1);
    }

    #[test]
    fn test_each_presentation_uploaded_once_in_order() {
        let mut mech = SimMech::new();
        let mut reader = SimTagReader::new(vec![
            SimPresentation::Tag(vec![0x04, 0xA2, 0x3F, 0x19]),
            SimPresentation::CorruptRead,
            SimPresentation::Tag(vec![0xDE, 0xAD, 0xBE, 0xEF]),
            SimPresentation::Tag(vec![0x01, 0x02]),
        ]);
        let mut uplink = SimUplink::new();

        let stats = run(
            Duration::from_millis(40),
            &mut mech,
            &mut reader,
            &mut uplink,
        );

        assert_eq!(stats.tags_detected, 3);
        assert_eq!(stats.uploads_ok, 3);
        assert_eq!(stats.upload_failures, 0);
        assert_eq!(uplink.uploads, vec!["04 A2 3F 19", "DE AD BE EF", "01 02"]);

        // One feedback pulse per detection, the corrupted read is silent
        assert_eq!(
            mech.num_cmds(eqpt_if::mech::MechCmd::Signal(1)),
            3
        );
    }

    #[test]
    fn test_failed_uploads_do_not_end_window() {
        let window = Duration::from_millis(40);
        let mut mech = SimMech::new();
        let mut reader = SimTagReader::new(vec![
            SimPresentation::Tag(vec![0x01]),
            SimPresentation::Tag(vec![0x02]),
        ]);
        let mut uplink = SimUplink::new();
        uplink.fail_uploads = true;

        let start = Instant::now();
        let stats = run(window, &mut mech, &mut reader, &mut uplink);
        let elapsed = start.elapsed();

        assert!(elapsed >= window, "window closed after {:?}", elapsed);
        assert_eq!(stats.tags_detected, 2);
        assert_eq!(stats.uploads_ok, 0);
        assert_eq!(stats.upload_failures, 2);

        // Both attempts were made despite both failing
        assert_eq!(uplink.uploads, vec!["01", "02"]);
    }

    #[test]
    fn test_detection_in_flight_at_deadline_is_finished() {
        let window = Duration::from_millis(5);
        let upload_time = Duration::from_millis(50);

        let mut mech = SimMech::new();
        let mut reader =
            SimTagReader::new(vec![SimPresentation::Tag(vec![0x04, 0xA2, 0x3F, 0x19])]);
        let mut uplink = SlowUplink {
            delay: upload_time,
            uploads: Vec::new(),
        };

        let start = Instant::now();
        let stats = run(window, &mut mech, &mut reader, &mut uplink);
        let elapsed = start.elapsed();

        // The tag is picked up at the very start of the window and its upload alone outlasts
        // the whole window. The detection is still handled to completion, the window closes
        // only once the upload has come back.
        assert!(elapsed >= upload_time, "window closed after {:?}", elapsed);
        assert_eq!(stats.tags_detected, 1);
        assert_eq!(stats.uploads_ok, 1);
        assert_eq!(uplink.uploads, vec!["04 A2 3F 19"]);

        // The reader was released rather than left latched at the deadline
        assert!(reader.read_uid().is_empty());
    }

    #[test]
    fn test_same_tag_in_two_windows_uploads_twice() {
        let bytes = vec![0x04, 0xA2, 0x3F, 0x19];
        let mut mech = SimMech::new();
        let mut reader = SimTagReader::new(vec![SimPresentation::Tag(bytes.clone())]);
        let mut uplink = SimUplink::new();

        run(
            Duration::from_millis(10),
            &mut mech,
            &mut reader,
            &mut uplink,
        );

        reader.present(SimPresentation::Tag(bytes));

        run(
            Duration::from_millis(10),
            &mut mech,
            &mut reader,
            &mut uplink,
        );

        // No deduplication across windows
        assert_eq!(uplink.uploads, vec!["04 A2 3F 19", "04 A2 3F 19"]);
    }

    #[test]
    fn test_stats_accumulate() {
        let mut total = ScanStats::default();
        total += ScanStats {
            tags_detected: 2,
            uploads_ok: 1,
            upload_failures: 1,
        };
        total += ScanStats {
            tags_detected: 1,
            uploads_ok: 1,
            upload_failures: 0,
        };

        assert_eq!(
            total,
            ScanStats {
                tags_detected: 3,
                uploads_ok: 2,
                upload_failures: 1,
            }
        );
    }
}
