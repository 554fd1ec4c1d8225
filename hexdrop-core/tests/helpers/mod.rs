#![allow(dead_code)]
use std::collections::BTreeMap;

use hexdrop_core::{DiskGeometry, ProgrammingSession, TargetConfig, VirtualDisk, VolumeImage};
use hexdrop_hal::{MemoryError, OutputPin, ProgramMemory, ERASED_WORD};
use hexdrop_protocol::HexRecord;

/// Program memory of the default target, in words
pub const FLASH_WORDS: usize = 0x2000;

/// First sector a host would put file data in
pub const FIRST_DATA_SECTOR: u32 = 5;

pub const SECTOR_SIZE: usize = 512;
pub const SEGMENT_SIZE: usize = 64;

/// Emulated row-erase program memory
///
/// A row write erases the row and programs the new words. Bits can only be
/// cleared by programming, so writing over a row that was not erased
/// first would show up as corruption; the erase count catches that.
pub struct NorFlash {
    pub words: Vec<u16>,
    pub row_writes: BTreeMap<u32, u32>,
    pub config_words: Vec<(u32, Vec<u16>)>,
}

impl Default for NorFlash {
    fn default() -> Self {
        Self {
            words: vec![ERASED_WORD; FLASH_WORDS],
            row_writes: BTreeMap::new(),
            config_words: Vec::new(),
        }
    }
}

impl NorFlash {
    /// Words starting at word address `address`
    pub fn read(&self, address: u32, len: usize) -> &[u16] {
        let start = address as usize;
        &self.words[start..start + len]
    }
}

impl ProgramMemory for NorFlash {
    fn write_row(&mut self, address: u32, words: &[u16]) -> Result<(), MemoryError> {
        let start = address as usize;
        let end = start + words.len();
        if end > self.words.len() || start % words.len() != 0 {
            return Err(MemoryError::Address);
        }

        let row = &mut self.words[start..end];
        row.fill(ERASED_WORD);
        for (cell, &word) in row.iter_mut().zip(words) {
            *cell &= word;
        }
        *self.row_writes.entry(address).or_default() += 1;
        Ok(())
    }

    fn write_config_words(&mut self, address: u32, words: &[u16]) -> Result<(), MemoryError> {
        self.config_words.push((address, words.to_vec()));
        Ok(())
    }
}

/// Status LED that remembers how often it blinked
#[derive(Debug, Default)]
pub struct Led {
    pub on: bool,
    pub toggles: u32,
}

impl OutputPin for Led {
    fn set_high(&mut self) {
        self.on = true;
    }

    fn set_low(&mut self) {
        self.on = false;
    }

    fn toggle(&mut self) {
        self.on = !self.on;
        self.toggles += 1;
    }

    fn is_set_high(&self) -> bool {
        self.on
    }
}

/// Volume with a fixed boot area and RAM-backed FAT and directory
pub struct StaticVolume {
    pub fat: [u8; SECTOR_SIZE],
    pub root: [u8; SECTOR_SIZE],
    pub readme: &'static [u8],
}

impl Default for StaticVolume {
    fn default() -> Self {
        Self {
            fat: [0; SECTOR_SIZE],
            root: [0; SECTOR_SIZE],
            readme: b"Drop a .hex file on this drive to update the firmware.\r\n",
        }
    }
}

fn copy_segment(source: &[u8], buffer: &mut [u8], segment: u8) {
    let start = usize::from(segment) * SEGMENT_SIZE;
    if start >= source.len() {
        return;
    }
    let chunk = &source[start..source.len().min(start + SEGMENT_SIZE)];
    let len = chunk.len().min(buffer.len());
    buffer[..len].copy_from_slice(&chunk[..len]);
}

fn store_segment(target: &mut [u8], buffer: &[u8], segment: u8) {
    let start = usize::from(segment) * SEGMENT_SIZE;
    let len = buffer.len().min(SEGMENT_SIZE).min(target.len().saturating_sub(start));
    target[start..start + len].copy_from_slice(&buffer[..len]);
}

impl VolumeImage for StaticVolume {
    fn master_boot_record(&self, buffer: &mut [u8], segment: u8) {
        buffer.fill(0);
        if segment == 7 {
            buffer[62..64].copy_from_slice(&[0x55, 0xAA]);
        }
    }

    fn volume_boot_record(&self, buffer: &mut [u8], segment: u8) {
        self.master_boot_record(buffer, segment);
    }

    fn fat(&self, buffer: &mut [u8], segment: u8) {
        copy_segment(&self.fat, buffer, segment);
    }

    fn root_directory(&self, buffer: &mut [u8], segment: u8) {
        copy_segment(&self.root, buffer, segment);
    }

    fn readme(&self, buffer: &mut [u8], segment: u8) {
        copy_segment(self.readme, buffer, segment);
    }

    fn set_fat(&mut self, buffer: &[u8], segment: u8) {
        store_segment(&mut self.fat, buffer, segment);
    }

    fn set_root_directory(&mut self, buffer: &[u8], segment: u8) {
        store_segment(&mut self.root, buffer, segment);
    }
}

pub type Disk = VirtualDisk<StaticVolume, NorFlash, Led>;

pub fn disk(config: TargetConfig) -> Disk {
    let session = ProgrammingSession::new(NorFlash::default(), Led::default(), config);
    VirtualDisk::new(StaticVolume::default(), session, DiskGeometry::default())
}

/// Encode `data` as HEX text starting at byte address `address`
///
/// Records carry at most `chunk` bytes and never cross a 64 KiB page; an
/// extended linear address record is emitted for every page touched.
pub fn hex_image(address: u32, data: &[u8], chunk: usize) -> Vec<u8> {
    let mut text = Vec::new();
    let mut page = None;
    let mut offset = 0;

    while offset < data.len() {
        let at = address + offset as u32;
        let upper = (at >> 16) as u16;
        if page != Some(upper) {
            text.extend_from_slice(&HexRecord::extended_linear_address(upper).encode_to_vec().unwrap());
            page = Some(upper);
        }

        let room = 0x1_0000 - (at & 0xFFFF) as usize;
        let len = chunk.min(room).min(data.len() - offset);
        let record = HexRecord::data(at as u16, &data[offset..offset + len]).unwrap();
        text.extend_from_slice(&record.encode_to_vec().unwrap());
        offset += len;
    }

    text
}

pub fn end_of_file() -> Vec<u8> {
    HexRecord::end_of_file().encode_to_vec().unwrap().to_vec()
}

/// Write `text` the way a host copies a file: whole sectors from
/// [`FIRST_DATA_SECTOR`], zero padded, one segment per call
pub fn copy_file(disk: &mut Disk, text: &[u8]) {
    for (i, chunk) in text.chunks(SECTOR_SIZE).enumerate() {
        let mut sector = [0u8; SECTOR_SIZE];
        sector[..chunk.len()].copy_from_slice(chunk);

        for (segment, bytes) in sector.chunks(SEGMENT_SIZE).enumerate() {
            assert!(disk.write(FIRST_DATA_SECTOR + i as u32, bytes, segment as u8));
        }
    }
}

/// Little-endian words of `data`, odd tail padded with 0xFF
pub fn words_of(data: &[u8]) -> Vec<u16> {
    data.chunks(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair.get(1).copied().unwrap_or(0xFF)]))
        .collect()
}
