//! Write coalescing
//!
//! Decides what happens to a row once the packer lets go of it. A row that
//! was never touched costs nothing; a configuration row has its fuse words
//! handed to the configuration hook; a row that would overwrite the
//! bootloader is dropped; everything else is programmed as one unit.

use hexdrop_hal::{MemoryError, OutputPin, ProgramMemory};

use crate::config::TargetConfig;
use crate::row::Row;

/// What a flush did with a row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FlushOutcome {
    /// Every word was erased, nothing was written
    Blank,
    /// The row was programmed
    Written,
    /// The row lies below the protected boundary and was discarded
    Protected,
    /// The fuse words were passed to the configuration hook
    ConfigWords,
    /// The memory driver reported an error; the row is lost
    Failed(MemoryError),
}

/// Turns flushed rows into program-memory writes
pub struct WriteCoalescer<M, P> {
    memory: M,
    status: P,
    config: TargetConfig,
}

impl<M: ProgramMemory, P: OutputPin> WriteCoalescer<M, P> {
    /// Create a coalescer writing through `memory` and signalling on `status`
    pub fn new(memory: M, status: P, config: TargetConfig) -> Self {
        Self {
            memory,
            status,
            config,
        }
    }

    /// Write out `row` and leave it blank
    ///
    /// The status pin toggles on every call, blank rows included, so the
    /// LED flickers while an image streams in.
    pub fn flush<const N: usize>(&mut self, row: &mut Row<N>) -> FlushOutcome {
        let outcome = if row.is_blank() {
            FlushOutcome::Blank
        } else {
            let outcome = self.program(row);
            row.clear();
            outcome
        };

        self.status.toggle();
        outcome
    }

    fn program<const N: usize>(&mut self, row: &Row<N>) -> FlushOutcome {
        let base = row.base();

        let result = if self.config.is_config_row(base) {
            let address = base + u32::from(self.config.config_word_offset);
            let words = self.config.config_words(row.words());
            debug!("config words at {=u32:#x}", address);
            self.memory
                .write_config_words(address, words)
                .map(|()| FlushOutcome::ConfigWords)
        } else if self.config.is_protected(base) {
            debug!("row {=u32:#x} is below the protected boundary, dropped", base);
            Ok(FlushOutcome::Protected)
        } else {
            trace!("writing row {=u32:#x}", base);
            self.memory
                .write_row(base, row.words())
                .map(|()| FlushOutcome::Written)
        };

        result.unwrap_or_else(|error| {
            warn!("row {=u32:#x} write failed: {}", base, error);
            FlushOutcome::Failed(error)
        })
    }

    /// Drive the status pin low; the transfer is over
    pub fn finish(&mut self) {
        self.status.set_low();
    }

    /// Program-memory driver
    pub fn memory(&self) -> &M {
        &self.memory
    }

    /// Mutable program-memory driver
    pub fn memory_mut(&mut self) -> &mut M {
        &mut self.memory
    }

    /// Status output
    pub fn status(&self) -> &P {
        &self.status
    }

    /// Configuration the coalescer routes rows by
    pub fn config(&self) -> &TargetConfig {
        &self.config
    }

    /// Give back the driver and the pin
    pub fn into_parts(self) -> (M, P) {
        (self.memory, self.status)
    }
}
