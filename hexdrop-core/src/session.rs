//! Programming session
//!
//! Owns everything one firmware transfer needs: the HEX decoder, the
//! extended address base, the row being assembled and the coalescer that
//! writes rows out. Characters go in through [`ProgrammingSession::feed`];
//! rows come out through the [`ProgramMemory`] driver.

use hexdrop_hal::{OutputPin, ProgramMemory};
use hexdrop_protocol::{DecodeError, DecoderState, HexDecoder, HexRecord, RecordType};

use crate::coalescer::WriteCoalescer;
use crate::config::{TargetConfig, ROW_WORDS};
use crate::diagnostics::Diagnostics;
use crate::packer::{RowPacker, RowSink};
use crate::row::Row;

/// Routes packer flushes through the coalescer and counts the outcome
struct CountingSink<'a, M, P> {
    coalescer: &'a mut WriteCoalescer<M, P>,
    diagnostics: &'a mut Diagnostics,
}

impl<M: ProgramMemory, P: OutputPin, const N: usize> RowSink<N> for CountingSink<'_, M, P> {
    fn flush(&mut self, row: &mut Row<N>) {
        let outcome = self.coalescer.flush(row);
        self.diagnostics.record_flush(outcome);
    }
}

/// One firmware transfer, from the first record to end of file
pub struct ProgrammingSession<M, P, const N: usize = ROW_WORDS> {
    config: TargetConfig,
    decoder: HexDecoder,
    extended_base: u32,
    in_progress: bool,
    packer: RowPacker<N>,
    coalescer: WriteCoalescer<M, P>,
    diagnostics: Diagnostics,
    last_error: Option<DecodeError>,
}

impl<M: ProgramMemory, P: OutputPin, const N: usize> ProgrammingSession<M, P, N> {
    /// Create an initialized session
    pub fn new(memory: M, status: P, config: TargetConfig) -> Self {
        Self {
            config,
            decoder: HexDecoder::with_case(config.digit_case()),
            extended_base: 0,
            in_progress: false,
            packer: RowPacker::new(&config),
            coalescer: WriteCoalescer::new(memory, status, config),
            diagnostics: Diagnostics::default(),
            last_error: None,
        }
    }

    /// Start over for a new transfer
    ///
    /// The row is blanked and parked at the configuration-word address,
    /// which stands for "no row yet". Whatever the previous transfer left
    /// behind is discarded, not flushed.
    pub fn initialize(&mut self) {
        self.packer.reset(self.config.config_word_address);
        self.decoder.reset();
        self.extended_base = 0;
        self.in_progress = false;
        info!("session initialized");
    }

    /// Feed one character of HEX text
    ///
    /// An error means the current line was dropped; rows already flushed
    /// and the extended address base are left alone.
    pub fn feed(&mut self, c: u8) -> Result<(), DecodeError> {
        self.diagnostics.record_byte();

        match self.decoder.feed(c) {
            Ok(Some(record)) => {
                self.diagnostics.record_accepted();
                self.dispatch(&record);
                Ok(())
            }
            Ok(None) => Ok(()),
            Err(error) => {
                debug!("line dropped: {}", error);
                self.diagnostics.record_decode_error(error);
                self.last_error = Some(error);
                Err(error)
            }
        }
    }

    /// Feed a run of characters, returning how many were rejected
    pub fn feed_all(&mut self, text: &[u8]) -> usize {
        text.iter().filter(|&&c| self.feed(c).is_err()).count()
    }

    fn dispatch(&mut self, record: &HexRecord) {
        match record.record_type {
            RecordType::Data => {
                if self.config.mark_in_progress_on_data {
                    self.in_progress = true;
                }
                let address = self.extended_base.wrapping_add(u32::from(record.address));
                let mut sink = CountingSink {
                    coalescer: &mut self.coalescer,
                    diagnostics: &mut self.diagnostics,
                };
                self.packer.pack(address, &record.payload, &mut sink);
            }
            RecordType::ExtendedLinearAddress => {
                if let Some(base) = record.extended_base() {
                    debug!("extended base {=u32:#x}", base);
                    self.extended_base = base;
                }
            }
            RecordType::EndOfFile => self.finalize(),
        }
    }

    /// Close the transfer
    ///
    /// Flushes the current row whether or not it is full, clears the
    /// in-progress flag and the extended base, and drives the status
    /// output low.
    pub fn finalize(&mut self) {
        let mut sink = CountingSink {
            coalescer: &mut self.coalescer,
            diagnostics: &mut self.diagnostics,
        };
        self.packer.flush(&mut sink);

        self.in_progress = false;
        self.extended_base = 0;
        self.coalescer.finish();
        info!("end of file, {=u32} rows written", self.diagnostics.rows_written);
    }

    /// Whether a transfer is being programmed
    pub fn programming_in_progress(&self) -> bool {
        self.in_progress
    }

    /// Upper address bits applied to data records
    pub fn extended_base(&self) -> u32 {
        self.extended_base
    }

    /// Decoder position within the current line
    pub fn decoder_state(&self) -> DecoderState {
        self.decoder.state()
    }

    /// Row being assembled
    pub fn row(&self) -> &Row<N> {
        self.packer.row()
    }

    pub fn config(&self) -> &TargetConfig {
        &self.config
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Zero all counters and forget the last error
    pub fn reset_diagnostics(&mut self) {
        self.diagnostics = Diagnostics::default();
        self.last_error = None;
    }

    /// Most recent reason a line was dropped
    pub fn last_error(&self) -> Option<DecodeError> {
        self.last_error
    }

    pub fn memory(&self) -> &M {
        self.coalescer.memory()
    }

    pub fn memory_mut(&mut self) -> &mut M {
        self.coalescer.memory_mut()
    }

    pub fn status(&self) -> &P {
        self.coalescer.status()
    }

    /// Give back the driver and the pin
    pub fn into_parts(self) -> (M, P) {
        self.coalescer.into_parts()
    }

    pub(crate) fn note_rejected_sector(&mut self) {
        self.diagnostics.record_rejected_sector();
    }
}
