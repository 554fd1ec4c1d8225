//! Test doubles for the unit tests

use hexdrop_hal::{MemoryError, OutputPin, ProgramMemory};
use hexdrop_protocol::HexRecord;

use crate::packer::RowSink;
use crate::row::Row;

/// Program memory that records every write
#[derive(Debug, Default)]
pub struct RecordingMemory {
    pub rows: Vec<(u32, Vec<u16>)>,
    pub config_words: Vec<(u32, Vec<u16>)>,
    pub fail_with: Option<MemoryError>,
}

impl ProgramMemory for RecordingMemory {
    fn write_row(&mut self, address: u32, words: &[u16]) -> Result<(), MemoryError> {
        if let Some(error) = self.fail_with {
            return Err(error);
        }
        self.rows.push((address, words.to_vec()));
        Ok(())
    }

    fn write_config_words(&mut self, address: u32, words: &[u16]) -> Result<(), MemoryError> {
        if let Some(error) = self.fail_with {
            return Err(error);
        }
        self.config_words.push((address, words.to_vec()));
        Ok(())
    }
}

/// Output pin that counts toggles
#[derive(Debug, Default)]
pub struct MockPin {
    pub high: bool,
    pub toggles: u32,
}

impl OutputPin for MockPin {
    fn set_high(&mut self) {
        self.high = true;
    }

    fn set_low(&mut self) {
        self.high = false;
    }

    fn toggle(&mut self) {
        self.high = !self.high;
        self.toggles += 1;
    }

    fn is_set_high(&self) -> bool {
        self.high
    }
}

/// Row sink that keeps a copy of every row it is handed
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub flushes: Vec<(u32, Vec<u16>)>,
}

impl<const N: usize> RowSink<N> for RecordingSink {
    fn flush(&mut self, row: &mut Row<N>) {
        self.flushes.push((row.base(), row.words().to_vec()));
        row.clear();
    }
}

/// Encoded text of a record, CR LF included
pub fn line(record: &HexRecord) -> Vec<u8> {
    record.encode_to_vec().unwrap().to_vec()
}
