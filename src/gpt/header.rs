use std::io::{self, Write};

use crate::crc::crc32_with_zeroed_field;
use crate::guid::{GUID_SIZE, Guid};
use crate::utils::write_padded;

pub const GPT_SIGNATURE: [u8; 8] = *b"EFI PART";
pub const GPT_REVISION: u32 = 0x0001_0000; // Version 1.0
/// Bytes of the header covered by its CRC. The rest of the sector is zero.
pub const GPT_HEADER_SIZE: usize = 92;
const HEADER_CRC32_OFFSET: usize = 16;

// GPT Header structure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GptHeader {
    pub signature: [u8; 8],
    pub revision: u32,
    pub header_size: u32,
    pub header_crc32: u32,
    pub reserved: u32,
    pub my_lba: u64,
    pub alternate_lba: u64,
    pub first_usable_lba: u64,
    pub last_usable_lba: u64,
    pub disk_guid: Guid,
    pub partition_table_lba: u64,
    pub number_of_entries: u32,
    pub size_of_entries: u32,
    pub partition_table_crc32: u32,
}

impl GptHeader {
    pub fn to_bytes(&self) -> [u8; GPT_HEADER_SIZE] {
        let mut bytes = [0u8; GPT_HEADER_SIZE];
        let mut offset = 0;

        bytes[offset..offset + 8].copy_from_slice(&self.signature);
        offset += 8;
        bytes[offset..offset + 4].copy_from_slice(&self.revision.to_le_bytes());
        offset += 4;
        bytes[offset..offset + 4].copy_from_slice(&self.header_size.to_le_bytes());
        offset += 4;
        bytes[offset..offset + 4].copy_from_slice(&self.header_crc32.to_le_bytes());
        offset += 4;
        bytes[offset..offset + 4].copy_from_slice(&self.reserved.to_le_bytes());
        offset += 4;
        bytes[offset..offset + 8].copy_from_slice(&self.my_lba.to_le_bytes());
        offset += 8;
        bytes[offset..offset + 8].copy_from_slice(&self.alternate_lba.to_le_bytes());
        offset += 8;
        bytes[offset..offset + 8].copy_from_slice(&self.first_usable_lba.to_le_bytes());
        offset += 8;
        bytes[offset..offset + 8].copy_from_slice(&self.last_usable_lba.to_le_bytes());
        offset += 8;
        bytes[offset..offset + GUID_SIZE].copy_from_slice(&self.disk_guid.to_bytes());
        offset += GUID_SIZE;
        bytes[offset..offset + 8].copy_from_slice(&self.partition_table_lba.to_le_bytes());
        offset += 8;
        bytes[offset..offset + 4].copy_from_slice(&self.number_of_entries.to_le_bytes());
        offset += 4;
        bytes[offset..offset + 4].copy_from_slice(&self.size_of_entries.to_le_bytes());
        offset += 4;
        bytes[offset..offset + 4].copy_from_slice(&self.partition_table_crc32.to_le_bytes());

        bytes
    }

    /// Parses the first 92 bytes of a header sector.
    pub fn from_bytes(bytes: &[u8; GPT_HEADER_SIZE]) -> Self {
        let u32_at = |offset: usize| {
            u32::from_le_bytes([
                bytes[offset],
                bytes[offset + 1],
                bytes[offset + 2],
                bytes[offset + 3],
            ])
        };
        let u64_at = |offset: usize| {
            let mut raw = [0u8; 8];
            raw.copy_from_slice(&bytes[offset..offset + 8]);
            u64::from_le_bytes(raw)
        };
        let mut signature = [0u8; 8];
        signature.copy_from_slice(&bytes[0..8]);
        let mut disk_guid = [0u8; GUID_SIZE];
        disk_guid.copy_from_slice(&bytes[56..72]);

        Self {
            signature,
            revision: u32_at(8),
            header_size: u32_at(12),
            header_crc32: u32_at(16),
            reserved: u32_at(20),
            my_lba: u64_at(24),
            alternate_lba: u64_at(32),
            first_usable_lba: u64_at(40),
            last_usable_lba: u64_at(48),
            disk_guid: Guid::from_bytes(&disk_guid),
            partition_table_lba: u64_at(72),
            number_of_entries: u32_at(80),
            size_of_entries: u32_at(84),
            partition_table_crc32: u32_at(88),
        }
    }

    /// CRC32 of the serialized header with `header_crc32` treated as zero.
    pub fn compute_crc32(&self) -> u32 {
        crc32_with_zeroed_field(&self.to_bytes(), HEADER_CRC32_OFFSET)
    }

    /// Recomputes and stores `header_crc32`. Must be the last change to the header.
    pub fn update_crc32(&mut self) {
        self.header_crc32 = self.compute_crc32();
    }

    pub fn is_crc32_valid(&self) -> bool {
        self.header_crc32 == self.compute_crc32()
    }

    /// Writes the header zero-padded to one `lba_size` sector.
    pub fn write_to<W: Write>(&self, writer: &mut W, lba_size: u64) -> io::Result<()> {
        write_padded(writer, &self.to_bytes(), lba_size)
    }
}
