//! Transfer counters
//!
//! Nothing in the pipeline can report failure back to the host: the disk
//! write always succeeds from the host's point of view. These counters are
//! the only record of what actually happened to an image.

use hexdrop_protocol::{DecodeError, DecodeErrorKind};

use crate::coalescer::FlushOutcome;

/// Saturating event counters for one session
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Diagnostics {
    /// Characters fed to the decoder
    pub bytes_accepted: u32,
    /// Records that passed their checksum
    pub records_accepted: u32,
    /// Lines dropped for a stray character or a non-hex digit
    pub malformed: u32,
    /// Lines dropped for an oversized byte count or unknown record type
    pub structural: u32,
    /// Lines dropped for a bad checksum
    pub checksum_errors: u32,
    /// Flushes of any kind
    pub rows_flushed: u32,
    /// Rows programmed
    pub rows_written: u32,
    /// Flushes skipped because the row was blank
    pub rows_blank: u32,
    /// Rows dropped below the protected boundary
    pub rows_protected: u32,
    /// Configuration rows handed to the fuse hook
    pub config_rows: u32,
    /// Rows the memory driver failed to program
    pub write_errors: u32,
    /// Sector writes refused by the disk
    pub sectors_rejected: u32,
}

fn bump(counter: &mut u32) {
    *counter = counter.saturating_add(1);
}

impl Diagnostics {
    /// Count one character offered to the decoder
    pub fn record_byte(&mut self) {
        bump(&mut self.bytes_accepted);
    }

    /// Count one decoded record
    pub fn record_accepted(&mut self) {
        bump(&mut self.records_accepted);
    }

    /// Count a dropped line by error class
    pub fn record_decode_error(&mut self, error: DecodeError) {
        match error.kind() {
            DecodeErrorKind::Malformed => bump(&mut self.malformed),
            DecodeErrorKind::Structural => bump(&mut self.structural),
            DecodeErrorKind::Checksum => bump(&mut self.checksum_errors),
        }
    }

    /// Count a flush by outcome
    pub fn record_flush(&mut self, outcome: FlushOutcome) {
        bump(&mut self.rows_flushed);
        match outcome {
            FlushOutcome::Blank => bump(&mut self.rows_blank),
            FlushOutcome::Written => bump(&mut self.rows_written),
            FlushOutcome::Protected => bump(&mut self.rows_protected),
            FlushOutcome::ConfigWords => bump(&mut self.config_rows),
            FlushOutcome::Failed(_) => bump(&mut self.write_errors),
        }
    }

    /// Count a refused sector write
    pub fn record_rejected_sector(&mut self) {
        bump(&mut self.sectors_rejected);
    }

    /// Lines dropped for any reason
    pub fn decode_errors(&self) -> u32 {
        self.malformed
            .saturating_add(self.structural)
            .saturating_add(self.checksum_errors)
    }
}
