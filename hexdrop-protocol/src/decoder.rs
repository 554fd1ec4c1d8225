//! Streaming Intel HEX decoder
//!
//! Characters are fed one at a time. The decoder keeps only the record it
//! is currently assembling, so a line split across USB segments (or
//! sectors) decodes the same as one delivered in a single buffer.

use heapless::Vec;

use crate::record::{HexRecord, RecordType, ERASED_BYTE, MAX_DATA_LEN, START_CODE};

/// Errors that can occur while decoding a line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DecodeError {
    /// Character other than ':' or a line end between records
    UnexpectedCharacter,
    /// Character is not a hex digit where one is expected
    InvalidDigit,
    /// Byte count above [`MAX_DATA_LEN`]
    ByteCountTooLarge,
    /// Record type other than data, end of file or extended linear address
    UnsupportedRecordType,
    /// Sum of the record bytes is not zero
    ChecksumMismatch,
}

/// Broad classes of decode failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DecodeErrorKind {
    /// Character where a digit or line start was expected
    Malformed,
    /// Line is well formed text but not an acceptable record
    Structural,
    /// Record bytes do not sum to zero
    Checksum,
}

impl DecodeError {
    /// Class of this error
    pub fn kind(self) -> DecodeErrorKind {
        match self {
            DecodeError::UnexpectedCharacter | DecodeError::InvalidDigit => {
                DecodeErrorKind::Malformed
            }
            DecodeError::ByteCountTooLarge | DecodeError::UnsupportedRecordType => {
                DecodeErrorKind::Structural
            }
            DecodeError::ChecksumMismatch => DecodeErrorKind::Checksum,
        }
    }
}

/// Which letter case is accepted for hex digits `A`-`F`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DigitCase {
    /// Only `A`-`F`, as emitted by the XC8 toolchain
    #[default]
    Upper,
    /// `A`-`F` and `a`-`f`
    Any,
}

impl DigitCase {
    /// Map a hex digit character to its value
    pub fn nibble(self, c: u8) -> Option<u8> {
        match c {
            b'0'..=b'9' => Some(c - b'0'),
            b'A'..=b'F' => Some(c - b'A' + 10),
            b'a'..=b'f' if self == DigitCase::Any => Some(c - b'a' + 10),
            _ => None,
        }
    }
}

/// Position of the decoder within a line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DecoderState {
    /// Waiting for ':'; line ends are skipped
    ScanForStart,
    /// Reading the 2-digit byte count
    ByteCount,
    /// Reading the 4-digit address
    Address,
    /// Reading the 2-digit record type
    RecordType,
    /// Reading payload digits
    Data,
    /// Reading the 2-digit checksum
    Checksum,
}

/// Character-at-a-time state machine for Intel HEX text
#[derive(Debug, Clone)]
pub struct HexDecoder {
    state: DecoderState,
    case: DigitCase,
    /// High nibble of the byte being assembled
    high: Option<u8>,
    /// Bytes consumed in the current multi-byte field
    field: u8,
    checksum: u8,
    byte_count: u8,
    address: u16,
    record_type: RecordType,
    payload: [u8; MAX_DATA_LEN],
    index: usize,
}

impl Default for HexDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl HexDecoder {
    /// Create a decoder accepting upper-case digits only
    pub fn new() -> Self {
        Self::with_case(DigitCase::Upper)
    }

    /// Create a decoder with an explicit digit case policy
    pub fn with_case(case: DigitCase) -> Self {
        Self {
            state: DecoderState::ScanForStart,
            case,
            high: None,
            field: 0,
            checksum: 0,
            byte_count: 0,
            address: 0,
            record_type: RecordType::Data,
            payload: [ERASED_BYTE; MAX_DATA_LEN],
            index: 0,
        }
    }

    /// Current position within the line
    pub fn state(&self) -> DecoderState {
        self.state
    }

    /// Digit case policy in use
    pub fn digit_case(&self) -> DigitCase {
        self.case
    }

    /// Drop any partially decoded line
    pub fn reset(&mut self) {
        self.state = DecoderState::ScanForStart;
        self.high = None;
        self.field = 0;
    }

    /// Feed a single character to the decoder
    ///
    /// Returns `Ok(Some(record))` when a line completes with a valid
    /// checksum, `Ok(None)` when more characters are needed, or `Err` when
    /// the character ends the line in failure. After an error the decoder
    /// is back in [`DecoderState::ScanForStart`].
    pub fn feed(&mut self, c: u8) -> Result<Option<HexRecord>, DecodeError> {
        if self.state == DecoderState::ScanForStart {
            return match c {
                b'\r' | b'\n' => Ok(None),
                START_CODE => {
                    self.begin_line();
                    Ok(None)
                }
                _ => Err(DecodeError::UnexpectedCharacter),
            };
        }

        let Some(nibble) = self.case.nibble(c) else {
            return self.fail(DecodeError::InvalidDigit);
        };

        // Record types are below 0x10; reject on the first digit
        if self.state == DecoderState::RecordType && self.high.is_none() && nibble != 0 {
            return self.fail(DecodeError::UnsupportedRecordType);
        }

        let Some(byte) = self.assemble(nibble) else {
            return Ok(None);
        };
        self.checksum = self.checksum.wrapping_add(byte);

        match self.state {
            DecoderState::ByteCount => {
                if usize::from(byte) > MAX_DATA_LEN {
                    return self.fail(DecodeError::ByteCountTooLarge);
                }
                self.byte_count = byte;
                self.state = DecoderState::Address;
            }
            DecoderState::Address => {
                self.address = (self.address << 8) | u16::from(byte);
                self.field += 1;
                if self.field == 2 {
                    self.field = 0;
                    self.state = DecoderState::RecordType;
                }
            }
            DecoderState::RecordType => {
                let Some(record_type) = RecordType::from_u8(byte) else {
                    return self.fail(DecodeError::UnsupportedRecordType);
                };
                self.record_type = record_type;
                self.payload = [ERASED_BYTE; MAX_DATA_LEN];
                self.index = 0;
                self.state = if record_type == RecordType::EndOfFile || self.byte_count == 0 {
                    DecoderState::Checksum
                } else {
                    DecoderState::Data
                };
            }
            DecoderState::Data => {
                self.payload[self.index] = byte;
                self.index += 1;
                if self.index == usize::from(self.byte_count) {
                    self.state = DecoderState::Checksum;
                }
            }
            DecoderState::Checksum => {
                if self.checksum != 0 {
                    return self.fail(DecodeError::ChecksumMismatch);
                }
                self.reset();
                return Ok(Some(self.finish(byte)));
            }
            DecoderState::ScanForStart => {}
        }

        Ok(None)
    }

    fn begin_line(&mut self) {
        self.state = DecoderState::ByteCount;
        self.high = None;
        self.field = 0;
        self.checksum = 0;
        self.address = 0;
    }

    fn assemble(&mut self, nibble: u8) -> Option<u8> {
        match self.high.take() {
            None => {
                self.high = Some(nibble);
                None
            }
            Some(high) => Some((high << 4) | nibble),
        }
    }

    fn fail(&mut self, error: DecodeError) -> Result<Option<HexRecord>, DecodeError> {
        self.reset();
        Err(error)
    }

    fn finish(&self, checksum: u8) -> HexRecord {
        let mut payload = Vec::new();
        // index never exceeds MAX_DATA_LEN, the Vec capacity
        let _ = payload.extend_from_slice(&self.payload[..self.index]);

        HexRecord {
            record_type: self.record_type,
            address: self.address,
            payload,
            checksum,
        }
    }
}
