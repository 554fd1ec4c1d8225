//! hexdrop Hardware Abstraction Layer
//!
//! Traits the bootloader core is written against. A board crate implements
//! them for its program-memory controller, its status LED, and hands the
//! resulting block device to a USB mass-storage class driver.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────┐
//! │  USB mass-storage class driver (extern)  │
//! └──────────────────────────────────────────┘
//!                     │ BlockMedia
//!                     ▼
//! ┌──────────────────────────────────────────┐
//! │  hexdrop-core (VirtualDisk, session)     │
//! └──────────────────────────────────────────┘
//!          │ ProgramMemory      │ OutputPin
//!          ▼                    ▼
//! ┌─────────────────┐   ┌─────────────────┐
//! │ memory driver   │   │ status LED      │
//! └─────────────────┘   └─────────────────┘
//! ```
//!
//! # Traits
//!
//! - [`flash::ProgramMemory`] - Row-granular program memory writes
//! - [`gpio::OutputPin`] - Activity/status output
//! - [`media::BlockMedia`] - Segmented sector device for the storage shim

#![no_std]
#![deny(unsafe_code)]

pub mod flash;
pub mod gpio;
pub mod media;

// Re-export key traits at crate root for convenience
pub use flash::{MemoryError, ProgramMemory, ERASED_WORD};
pub use gpio::{NoPin, OutputPin};
pub use media::{BlockMedia, MediaError, MediaInfo};
