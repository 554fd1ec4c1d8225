//! Target and disk configuration
//!
//! Defaults describe a PIC16F1455-class part: 8K words of program memory
//! written in 32-word rows, the bootloader resident below word `0x1600`,
//! and configuration fuses at word `0x8007`.

use hexdrop_protocol::DigitCase;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Words per program-memory row
pub const ROW_WORDS: usize = 32;

/// First word address of the configuration-word region
pub const CONFIG_WORD_ADDRESS: u32 = 0x8000;

/// First word address the bootloader may program
pub const PROTECTED_BOUNDARY: u32 = 0x1600;

/// Significant bits of a HEX byte address
pub const ADDRESS_MASK: u32 = 0x000F_FFFF;

/// Offset of the first fuse word within the configuration row
pub const CONFIG_WORD_OFFSET: u8 = 7;

/// Number of fuse words
pub const CONFIG_WORD_COUNT: u8 = 5;

/// Logical sector size in bytes
pub const SECTOR_SIZE: u16 = 512;

/// Bytes moved per class-driver call
pub const SEGMENT_SIZE: u16 = 64;

/// Sectors on the virtual disk; fits a single-sector FAT12 table
pub const TOTAL_SECTORS: u32 = 320;

/// Device geometry and programming policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TargetConfig {
    /// Word address where the configuration-word region begins.
    /// Also the base of the "no row yet" sentinel row.
    pub config_word_address: u32,
    /// Rows below this word address belong to the bootloader and are never written
    pub protected_boundary: u32,
    /// Bits of the HEX byte address that select program memory
    pub address_mask: u32,
    /// Offset of the fuse words within a configuration row
    pub config_word_offset: u8,
    /// Number of fuse words handed to the configuration hook
    pub config_word_count: u8,
    /// Raise the in-progress flag when the first data record is accepted
    pub mark_in_progress_on_data: bool,
    /// Accept `a`-`f` as hex digits
    pub accept_lowercase_hex: bool,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self::pic16f1455()
    }
}

impl TargetConfig {
    /// Geometry of the PIC16F1455 family
    pub const fn pic16f1455() -> Self {
        Self {
            config_word_address: CONFIG_WORD_ADDRESS,
            protected_boundary: PROTECTED_BOUNDARY,
            address_mask: ADDRESS_MASK,
            config_word_offset: CONFIG_WORD_OFFSET,
            config_word_count: CONFIG_WORD_COUNT,
            mark_in_progress_on_data: false,
            accept_lowercase_hex: false,
        }
    }

    /// Same geometry with a different protected boundary
    pub const fn with_protected_boundary(mut self, boundary: u32) -> Self {
        self.protected_boundary = boundary;
        self
    }

    /// Digit policy for the HEX decoder
    pub fn digit_case(&self) -> DigitCase {
        if self.accept_lowercase_hex {
            DigitCase::Any
        } else {
            DigitCase::Upper
        }
    }

    /// Check whether a row at `base` lies in the configuration-word region
    pub fn is_config_row(&self, base: u32) -> bool {
        base >= self.config_word_address
    }

    /// Check whether a row at `base` overlaps the bootloader
    pub fn is_protected(&self, base: u32) -> bool {
        base < self.protected_boundary
    }

    /// Fuse words of a configuration row, clamped to the row length
    pub fn config_words<'a>(&self, words: &'a [u16]) -> &'a [u16] {
        let start = usize::from(self.config_word_offset).min(words.len());
        let end = (start + usize::from(self.config_word_count)).min(words.len());
        &words[start..end]
    }
}

/// Layout of the virtual disk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DiskGeometry {
    /// Logical sector size in bytes
    pub sector_size: u16,
    /// Bytes per segment
    pub segment_size: u16,
    /// Number of sectors
    pub total_sectors: u32,
}

impl Default for DiskGeometry {
    fn default() -> Self {
        Self::new()
    }
}

impl DiskGeometry {
    /// Default layout: 512-byte sectors in 64-byte segments
    pub const fn new() -> Self {
        Self {
            sector_size: SECTOR_SIZE,
            segment_size: SEGMENT_SIZE,
            total_sectors: TOTAL_SECTORS,
        }
    }

    /// Segments per sector
    pub const fn segments_per_sector(&self) -> u16 {
        self.sector_size / self.segment_size
    }

    /// Last valid logical block address
    pub const fn last_lba(&self) -> u32 {
        self.total_sectors.saturating_sub(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_geometry() {
        let config = TargetConfig::default();
        assert_eq!(config, TargetConfig::pic16f1455());
        assert!(config.is_config_row(0x8000));
        assert!(!config.is_config_row(0x7FE0));
        assert!(config.is_protected(0x15E0));
        assert!(!config.is_protected(0x1600));
        assert_eq!(config.digit_case(), DigitCase::Upper);
    }

    #[test]
    fn test_config_words_slice() {
        let config = TargetConfig::default();
        let mut row = [0xFFFFu16; ROW_WORDS];
        for (i, word) in row.iter_mut().enumerate() {
            *word = i as u16;
        }
        assert_eq!(config.config_words(&row), &[7, 8, 9, 10, 11]);

        // Short rows clamp instead of panicking
        assert_eq!(config.config_words(&row[..9]), &[7, 8]);
        assert!(config.config_words(&row[..4]).is_empty());
    }

    #[test]
    fn test_lowercase_policy() {
        let config = TargetConfig {
            accept_lowercase_hex: true,
            ..TargetConfig::default()
        };
        assert_eq!(config.digit_case(), DigitCase::Any);
    }

    #[test]
    fn test_disk_geometry() {
        let disk = DiskGeometry::default();
        assert_eq!(disk.segments_per_sector(), 8);
        assert_eq!(disk.last_lba(), TOTAL_SECTORS - 1);
    }
}
