//! Program memory abstractions
//!
//! The bootloader core decides *what* to program and *when*; the timing
//! and the actual write/erase sequence belong to the implementor of
//! [`ProgramMemory`].

/// Value of a program-memory word in the erased state
pub const ERASED_WORD: u16 = 0xFFFF;

/// Errors from program memory operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MemoryError {
    /// Address is not a valid row start or lies outside program memory
    Address,
    /// Program sequence failed
    Program,
    /// Controller still busy with a previous operation
    Busy,
    /// Something went wrong, but the driver does not know what it was
    Unknown,
}

/// Row-oriented program memory driver
///
/// Addresses are word addresses. `write_row` is always called with an
/// address aligned to the row size the caller was built for, and with a
/// slice holding exactly one row.
pub trait ProgramMemory {
    /// Program one full row of words starting at `address`
    ///
    /// The row is erased and rewritten as one unit. Implementations must
    /// not return before the write has finished.
    fn write_row(&mut self, address: u32, words: &[u16]) -> Result<(), MemoryError>;

    /// Program configuration words starting at `address`
    ///
    /// Configuration fuses need a different programming sequence than
    /// ordinary rows. The default does nothing, leaving the fuses untouched.
    fn write_config_words(&mut self, address: u32, words: &[u16]) -> Result<(), MemoryError> {
        let _ = (address, words);
        Ok(())
    }
}

impl<T: ProgramMemory + ?Sized> ProgramMemory for &mut T {
    fn write_row(&mut self, address: u32, words: &[u16]) -> Result<(), MemoryError> {
        (**self).write_row(address, words)
    }

    fn write_config_words(&mut self, address: u32, words: &[u16]) -> Result<(), MemoryError> {
        (**self).write_config_words(address, words)
    }
}
