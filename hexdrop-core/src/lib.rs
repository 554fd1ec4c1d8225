//! Board-agnostic core of the drag-and-drop bootloader
//!
//! The device shows up as a small USB disk. Whatever the host writes to the
//! data area of that disk is taken to be an Intel HEX image and programmed
//! into the device as it streams in:
//!
//! ```text
//! sector write ─▶ VirtualDisk ─▶ HexDecoder ─▶ RowPacker ─▶ WriteCoalescer ─▶ ProgramMemory
//!                (by sector)     (per char)    (per record)  (per row)
//! ```
//!
//! Every stage runs to completion inside the sector-write call; the only
//! state carried between calls is the line being decoded and the one row
//! being assembled.
//!
//! - [`config`] - target geometry and disk layout
//! - [`row`] - fixed-size row buffer
//! - [`packer`] - byte address to row/word alignment
//! - [`coalescer`] - blank check, region routing, memory writes
//! - [`session`] - one firmware transfer, from first record to end of file
//! - [`disk`] - virtual sector dispatch
//! - [`diagnostics`] - counters for decode and flush activity

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

#[macro_use]
mod fmt;

pub mod coalescer;
pub mod config;
pub mod diagnostics;
pub mod disk;
pub mod packer;
pub mod row;
pub mod session;

#[cfg(test)]
mod testing;

pub use coalescer::{FlushOutcome, WriteCoalescer};
pub use config::{DiskGeometry, TargetConfig, ROW_WORDS};
pub use diagnostics::Diagnostics;
pub use disk::{VirtualDisk, VolumeImage};
pub use packer::{RowPacker, RowSink};
pub use row::Row;
pub use session::ProgrammingSession;
