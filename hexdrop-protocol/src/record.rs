//! Intel HEX records
//!
//! Record layout (all fields as pairs of hex digits):
//! - START (1 char): ':'
//! - BYTE COUNT (1 byte): payload length (0-16)
//! - ADDRESS (2 bytes): big-endian offset from the current extended base
//! - TYPE (1 byte): record type
//! - PAYLOAD (0-16 bytes)
//! - CHECKSUM (1 byte): two's complement of the sum of all preceding bytes

use heapless::Vec;

/// Line start marker
pub const START_CODE: u8 = b':';

/// Maximum payload bytes per record
pub const MAX_DATA_LEN: usize = 16;

/// Erased program-memory byte; fills payload slots a record does not carry
pub const ERASED_BYTE: u8 = 0xFF;

/// Longest encoded line: ':' + (count, address, type, payload, checksum) + CR LF
pub const MAX_LINE_LEN: usize = 1 + 2 * (1 + 2 + 1 + MAX_DATA_LEN + 1) + 2;

const HEX_DIGITS: &[u8; 16] = b"0123456789ABCDEF";

/// Supported record types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum RecordType {
    /// Payload bytes for the address in the record
    Data = 0x00,
    /// Last record of the image
    EndOfFile = 0x01,
    /// Upper 16 bits of the address for subsequent data records
    ExtendedLinearAddress = 0x04,
}

impl RecordType {
    /// Get the record type as a byte value
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Create a record type from a byte value
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0x00 => Some(RecordType::Data),
            0x01 => Some(RecordType::EndOfFile),
            0x04 => Some(RecordType::ExtendedLinearAddress),
            _ => None,
        }
    }
}

/// Errors that can occur while encoding a record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EncodeError {
    /// Payload exceeds [`MAX_DATA_LEN`]
    PayloadTooLarge,
    /// Buffer too small for the encoded line
    BufferTooSmall,
}

/// One decoded (or to-be-encoded) record
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct HexRecord {
    /// Record type
    pub record_type: RecordType,
    /// 16-bit address field
    pub address: u16,
    /// Payload bytes
    pub payload: Vec<u8, MAX_DATA_LEN>,
    /// Checksum byte as carried on the line
    pub checksum: u8,
}

impl HexRecord {
    /// Create a record with a correct checksum
    pub fn new(record_type: RecordType, address: u16, payload: &[u8]) -> Result<Self, EncodeError> {
        let payload: Vec<u8, MAX_DATA_LEN> =
            Vec::from_slice(payload).map_err(|_| EncodeError::PayloadTooLarge)?;
        let checksum = Self::calculate_checksum(
            payload.len() as u8,
            address,
            record_type.as_u8(),
            &payload,
        );

        Ok(Self {
            record_type,
            address,
            payload,
            checksum,
        })
    }

    /// Create a data record
    pub fn data(address: u16, payload: &[u8]) -> Result<Self, EncodeError> {
        Self::new(RecordType::Data, address, payload)
    }

    /// Create the end-of-file record (`:00000001FF`)
    pub fn end_of_file() -> Self {
        Self {
            record_type: RecordType::EndOfFile,
            address: 0,
            payload: Vec::new(),
            checksum: 0xFF,
        }
    }

    /// Create an extended linear address record selecting `upper` as the
    /// high 16 bits of subsequent data addresses
    pub fn extended_linear_address(upper: u16) -> Self {
        let bytes = upper.to_be_bytes();
        let mut payload = Vec::new();
        // Capacity is MAX_DATA_LEN, two bytes always fit
        let _ = payload.extend_from_slice(&bytes);
        let checksum = Self::calculate_checksum(
            2,
            0,
            RecordType::ExtendedLinearAddress.as_u8(),
            &bytes,
        );

        Self {
            record_type: RecordType::ExtendedLinearAddress,
            address: 0,
            payload,
            checksum,
        }
    }

    /// Number of payload bytes
    pub fn byte_count(&self) -> u8 {
        self.payload.len() as u8
    }

    /// Checksum that makes the record's byte sum zero modulo 256
    pub fn calculate_checksum(byte_count: u8, address: u16, record_type: u8, payload: &[u8]) -> u8 {
        let [address_high, address_low] = address.to_be_bytes();
        let sum = payload.iter().fold(
            byte_count
                .wrapping_add(address_high)
                .wrapping_add(address_low)
                .wrapping_add(record_type),
            |acc, &byte| acc.wrapping_add(byte),
        );
        sum.wrapping_neg()
    }

    /// Check the checksum law: all bytes including the checksum sum to zero
    pub fn is_valid(&self) -> bool {
        let expected = Self::calculate_checksum(
            self.byte_count(),
            self.address,
            self.record_type.as_u8(),
            &self.payload,
        );
        expected == self.checksum
    }

    /// Base address carried by an extended linear address record
    ///
    /// The two payload bytes become bits 31..16. A short record reads the
    /// missing bytes as [`ERASED_BYTE`]. Returns `None` for other record types.
    pub fn extended_base(&self) -> Option<u32> {
        if self.record_type != RecordType::ExtendedLinearAddress {
            return None;
        }

        let high = self.payload.first().copied().unwrap_or(ERASED_BYTE);
        let low = self.payload.get(1).copied().unwrap_or(ERASED_BYTE);
        Some((u32::from(high) << 24) | (u32::from(low) << 16))
    }

    /// Encode this record as a text line terminated by CR LF
    ///
    /// Returns the number of bytes written
    pub fn encode(&self, buffer: &mut [u8]) -> Result<usize, EncodeError> {
        let line_len = 1 + 2 * (5 + self.payload.len()) + 2;
        if buffer.len() < line_len {
            return Err(EncodeError::BufferTooSmall);
        }

        let [address_high, address_low] = self.address.to_be_bytes();
        let header = [
            self.byte_count(),
            address_high,
            address_low,
            self.record_type.as_u8(),
        ];

        buffer[0] = START_CODE;
        let mut pos = 1;
        for &byte in header
            .iter()
            .chain(self.payload.iter())
            .chain(core::iter::once(&self.checksum))
        {
            buffer[pos] = HEX_DIGITS[usize::from(byte >> 4)];
            buffer[pos + 1] = HEX_DIGITS[usize::from(byte & 0x0F)];
            pos += 2;
        }
        buffer[pos] = b'\r';
        buffer[pos + 1] = b'\n';

        Ok(line_len)
    }

    /// Encode this record into a heapless Vec
    pub fn encode_to_vec(&self) -> Result<Vec<u8, MAX_LINE_LEN>, EncodeError> {
        let mut buffer = [0u8; MAX_LINE_LEN];
        let len = self.encode(&mut buffer)?;
        Vec::from_slice(&buffer[..len]).map_err(|_| EncodeError::BufferTooSmall)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_end_of_file_line() {
        let line = HexRecord::end_of_file().encode_to_vec().unwrap();
        assert_eq!(&line[..], b":00000001FF\r\n");
    }

    #[test]
    fn test_data_checksum() {
        let record = HexRecord::data(0x0000, &[0x01, 0x02]).unwrap();
        assert_eq!(record.checksum, 0xFB);
        assert!(record.is_valid());

        let line = record.encode_to_vec().unwrap();
        assert_eq!(&line[..], b":020000000102FB\r\n");
    }

    #[test]
    fn test_extended_linear_address() {
        let record = HexRecord::extended_linear_address(0x0001);
        let line = record.encode_to_vec().unwrap();
        assert_eq!(&line[..], b":020000040001F9\r\n");
        assert_eq!(record.extended_base(), Some(0x0001_0000));
    }

    #[test]
    fn test_short_extended_record_reads_erased() {
        let record = HexRecord::new(RecordType::ExtendedLinearAddress, 0, &[0x12]).unwrap();
        assert_eq!(record.extended_base(), Some(0x12FF_0000));
        assert_eq!(HexRecord::end_of_file().extended_base(), None);
    }

    #[test]
    fn test_invalid_checksum_detected() {
        let mut record = HexRecord::data(0x1234, &[0xAA]).unwrap();
        record.checksum = record.checksum.wrapping_add(1);
        assert!(!record.is_valid());
    }

    #[test]
    fn test_payload_too_large() {
        let payload = [0u8; MAX_DATA_LEN + 1];
        assert_eq!(
            HexRecord::data(0, &payload),
            Err(EncodeError::PayloadTooLarge)
        );
    }

    #[test]
    fn test_buffer_too_small() {
        let record = HexRecord::data(0, &[1, 2, 3, 4]).unwrap();
        let mut buffer = [0u8; 20];
        assert_eq!(record.encode(&mut buffer), Err(EncodeError::BufferTooSmall));
    }

    #[test]
    fn test_record_type_from_u8() {
        assert_eq!(RecordType::from_u8(0), Some(RecordType::Data));
        assert_eq!(RecordType::from_u8(1), Some(RecordType::EndOfFile));
        assert_eq!(RecordType::from_u8(4), Some(RecordType::ExtendedLinearAddress));
        assert_eq!(RecordType::from_u8(2), None);
        assert_eq!(RecordType::from_u8(5), None);
    }
}
