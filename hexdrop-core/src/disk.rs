//! Virtual disk
//!
//! Sector dispatch for the mass-storage class driver. The low sectors hold
//! a tiny FAT volume whose content is supplied by a [`VolumeImage`]; every
//! sector past them is a data sector, and anything the host writes there
//! is streamed into the programming session as HEX text.
//!
//! ```text
//! sector 0      master boot record          read-only
//! sector 1      volume boot record          read-only
//! sector 2      FAT                         read/write (RAM image)
//! sector 3      root directory              read/write (RAM image)
//! sector 4      README                      read: text, write: HEX
//! sector 5..    data                        read: zeros, write: HEX
//! ```

use hexdrop_hal::{BlockMedia, MediaInfo, OutputPin, ProgramMemory};

use crate::config::{DiskGeometry, ROW_WORDS};
use crate::diagnostics::Diagnostics;
use crate::session::ProgrammingSession;

/// Master boot record
pub const MBR_SECTOR: u32 = 0;
/// Volume boot record
pub const VBR_SECTOR: u32 = 1;
/// File allocation table
pub const FAT_SECTOR: u32 = 2;
/// Root directory
pub const ROOT_SECTOR: u32 = 3;
/// Help document
pub const README_SECTOR: u32 = 4;

/// Static and RAM-backed content of the FAT volume
///
/// Every method works on one segment of one sector.
pub trait VolumeImage {
    fn master_boot_record(&self, buffer: &mut [u8], segment: u8);

    fn volume_boot_record(&self, buffer: &mut [u8], segment: u8);

    fn fat(&self, buffer: &mut [u8], segment: u8);

    fn root_directory(&self, buffer: &mut [u8], segment: u8);

    /// Fill in the help document; `buffer` arrives zeroed
    fn readme(&self, buffer: &mut [u8], segment: u8) {
        let _ = (buffer, segment);
    }

    /// Keep the host's FAT update so later reads agree with it
    fn set_fat(&mut self, buffer: &[u8], segment: u8);

    /// Keep the host's directory update so later reads agree with it
    fn set_root_directory(&mut self, buffer: &[u8], segment: u8);
}

/// Mass-storage view of the bootloader
pub struct VirtualDisk<V, M, P, const N: usize = ROW_WORDS> {
    geometry: DiskGeometry,
    volume: V,
    session: ProgrammingSession<M, P, N>,
}

impl<V, M, P, const N: usize> VirtualDisk<V, M, P, N>
where
    V: VolumeImage,
    M: ProgramMemory,
    P: OutputPin,
{
    pub fn new(volume: V, session: ProgrammingSession<M, P, N>, geometry: DiskGeometry) -> Self {
        Self {
            geometry,
            volume,
            session,
        }
    }

    /// Start a fresh programming session
    pub fn initialize(&mut self) {
        self.session.initialize();
    }

    /// Read one segment of `sector` into `buffer`
    ///
    /// Always succeeds; sectors without content read as zeros.
    pub fn read(&mut self, sector: u32, buffer: &mut [u8], segment: u8) -> bool {
        match sector {
            MBR_SECTOR => self.volume.master_boot_record(buffer, segment),
            VBR_SECTOR => self.volume.volume_boot_record(buffer, segment),
            FAT_SECTOR => self.volume.fat(buffer, segment),
            ROOT_SECTOR => self.volume.root_directory(buffer, segment),
            _ => {
                buffer.fill(0);
                if sector == README_SECTOR {
                    self.volume.readme(buffer, segment);
                }
            }
        }
        true
    }

    /// Write one segment of `sector` from `buffer`
    ///
    /// Boot sectors and sectors past the end of the disk are refused. The
    /// FAT and root directory go to the volume image. Everything else is
    /// HEX text; lines that fail to decode are dropped and counted, but the
    /// write still succeeds.
    pub fn write(&mut self, sector: u32, buffer: &[u8], segment: u8) -> bool {
        if sector < FAT_SECTOR || sector >= self.geometry.total_sectors {
            warn!("write to sector {=u32} refused", sector);
            self.session.note_rejected_sector();
            return false;
        }

        match sector {
            FAT_SECTOR => self.volume.set_fat(buffer, segment),
            ROOT_SECTOR => self.volume.set_root_directory(buffer, segment),
            _ => {
                let len = buffer.len().min(usize::from(self.geometry.segment_size));
                let rejected = self.session.feed_all(&buffer[..len]);
                if rejected > 0 {
                    debug!(
                        "sector {=u32} segment {=u8}: {=usize} characters rejected",
                        sector,
                        segment,
                        rejected
                    );
                }
            }
        }
        true
    }

    pub fn geometry(&self) -> &DiskGeometry {
        &self.geometry
    }

    pub fn volume(&self) -> &V {
        &self.volume
    }

    pub fn session(&self) -> &ProgrammingSession<M, P, N> {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut ProgrammingSession<M, P, N> {
        &mut self.session
    }

    /// Counters of the underlying session
    pub fn diagnostics(&self) -> &Diagnostics {
        self.session.diagnostics()
    }

    /// Take the disk apart
    pub fn into_parts(self) -> (V, ProgrammingSession<M, P, N>) {
        (self.volume, self.session)
    }
}

impl<V, M, P, const N: usize> BlockMedia for VirtualDisk<V, M, P, N>
where
    V: VolumeImage,
    M: ProgramMemory,
    P: OutputPin,
{
    fn media_detect(&self) -> bool {
        true
    }

    fn init_io(&mut self) -> bool {
        true
    }

    fn media_initialize(&mut self) -> MediaInfo {
        MediaInfo {
            sector_size: self.geometry.sector_size,
            error: None,
        }
    }

    fn sector_size(&self) -> u16 {
        self.geometry.sector_size
    }

    fn capacity(&self) -> u32 {
        self.geometry.last_lba()
    }

    fn write_protected(&self) -> bool {
        false
    }

    fn read_segment(&mut self, sector: u32, buffer: &mut [u8], segment: u8) -> bool {
        self.read(sector, buffer, segment)
    }

    fn write_segment(&mut self, sector: u32, buffer: &[u8], segment: u8) -> bool {
        self.write(sector, buffer, segment)
    }
}
