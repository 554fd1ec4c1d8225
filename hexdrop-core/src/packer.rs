//! Row packing
//!
//! HEX records arrive in whatever chunks the toolchain chose, at byte
//! addresses. Program memory is written a row at a time, in words. The
//! packer converts each record's byte address to a (row, word) position,
//! pairs payload bytes into little-endian words, and hands a row to its
//! [`RowSink`] whenever the data moves on to a different row.

use hexdrop_protocol::ERASED_BYTE;

use crate::config::TargetConfig;
use crate::row::Row;

/// Receiver of completed rows
///
/// The sink owns what happens to a row's contents and must leave the row
/// blank when it returns.
pub trait RowSink<const N: usize> {
    /// Take the contents of `row`
    fn flush(&mut self, row: &mut Row<N>);
}

/// Aligns decoded payload bytes into rows of `N` words
#[derive(Debug, Clone)]
pub struct RowPacker<const N: usize> {
    row: Row<N>,
    address_mask: u32,
}

impl<const N: usize> RowPacker<N> {
    /// Create a packer whose row sits at the configuration sentinel
    pub fn new(config: &TargetConfig) -> Self {
        Self {
            row: Row::new(config.config_word_address),
            address_mask: config.address_mask,
        }
    }

    /// The row being assembled
    pub fn row(&self) -> &Row<N> {
        &self.row
    }

    /// Blank the row and park it at `base` without flushing
    pub fn reset(&mut self, base: u32) {
        self.row.clear();
        self.row.set_base(base);
    }

    /// Row base (word address) and word index for a HEX byte address
    pub fn locate(&self, address: u32) -> (u32, usize) {
        let word = (address & self.address_mask) >> 1;
        let index = word % Row::<N>::STRIDE;
        (word - index, index as usize)
    }

    /// Pack `payload` starting at byte `address`
    ///
    /// Flushes the current row first if `address` falls in another row.
    /// A row that fills up is flushed at once; any payload left over
    /// continues at the start of the following row.
    pub fn pack<S: RowSink<N>>(&mut self, address: u32, payload: &[u8], sink: &mut S) {
        let (base, mut index) = self.locate(address);
        if base != self.row.base() {
            sink.flush(&mut self.row);
            self.row.set_base(base);
        }

        // Odd byte counts round up; the missing high byte reads as erased
        let mut words = payload
            .chunks(2)
            .map(|pair| u16::from_le_bytes([pair[0], pair.get(1).copied().unwrap_or(ERASED_BYTE)]))
            .peekable();

        while let Some(word) = words.next() {
            self.row.set_word(index, word);
            index += 1;

            if index == N {
                sink.flush(&mut self.row);
                if words.peek().is_none() {
                    break;
                }
                self.row.set_base(self.row.base().wrapping_add(Row::<N>::STRIDE));
                index = 0;
            }
        }
    }

    /// Flush the current row, full or not
    pub fn flush<S: RowSink<N>>(&mut self, sink: &mut S) {
        sink.flush(&mut self.row);
    }
}
