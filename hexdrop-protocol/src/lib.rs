//! Intel HEX stream decoding
//!
//! This crate turns the text of an Intel HEX file, delivered one character
//! at a time in whatever chunks the USB stack hands over, into checksummed
//! records. Only the record types a small-device toolchain emits are
//! understood:
//!
//! ```text
//! ┌───┬────┬──────┬────┬──────────┬────┐
//! │ : │ BB │ AAAA │ TT │ DD … DD  │ CC │
//! │   │ 2  │ 4    │ 2  │ 2×BB     │ 2  │   (hex digits)
//! └───┴────┴──────┴────┴──────────┴────┘
//! ```
//!
//! - `BB` byte count (0-16)
//! - `AAAA` 16-bit big-endian address
//! - `TT` record type: `00` data, `01` end of file, `04` extended linear address
//! - `CC` two's complement of the sum of every preceding byte
//!
//! The decoder never buffers a whole line. A bad character, an unsupported
//! record or a checksum mismatch drops the current line only; decoding
//! picks up again at the next `:`.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod decoder;
pub mod record;

pub use decoder::{DecodeError, DecodeErrorKind, DecoderState, DigitCase, HexDecoder};
pub use record::{
    EncodeError, HexRecord, RecordType, ERASED_BYTE, MAX_DATA_LEN, MAX_LINE_LEN, START_CODE,
};
