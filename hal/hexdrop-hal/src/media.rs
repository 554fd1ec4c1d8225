//! Block media abstractions
//!
//! A mass-storage class driver moves sectors in fixed-size segments. Each
//! call carries the logical sector number and the index of the segment
//! within that sector; segments of a sector always arrive in order.

/// Errors reported by [`BlockMedia::media_initialize`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MediaError {
    /// Media is not present
    NotPresent,
    /// Media could not be brought up
    InitFailed,
}

/// Media description returned to the class driver at initialization
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MediaInfo {
    /// Logical sector size in bytes
    pub sector_size: u16,
    /// Initialization error, if any
    pub error: Option<MediaError>,
}

/// Sector device served to the host, one segment at a time
pub trait BlockMedia {
    /// Whether media is present in the drive
    fn media_detect(&self) -> bool;

    /// Bring up the I/O behind the media
    fn init_io(&mut self) -> bool;

    /// Initialize the media and describe it
    fn media_initialize(&mut self) -> MediaInfo;

    /// Logical sector size in bytes
    fn sector_size(&self) -> u16;

    /// Last valid logical block address (sector count minus one)
    fn capacity(&self) -> u32;

    /// Whether the media refuses writes
    fn write_protected(&self) -> bool;

    /// Fill `buffer` with segment `segment` of `sector`
    fn read_segment(&mut self, sector: u32, buffer: &mut [u8], segment: u8) -> bool;

    /// Store `buffer` as segment `segment` of `sector`
    fn write_segment(&mut self, sector: u32, buffer: &[u8], segment: u8) -> bool;
}
