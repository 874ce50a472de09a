// src/mbr.rs

use std::io::{self, Write};

// MBR constants
pub const MBR_SIZE: usize = 512;
const BOOT_CODE_SIZE: usize = 440;
const DISK_SIGNATURE_OFFSET: usize = 440;
const PARTITION_TABLE_OFFSET: usize = 446;
const PARTITION_RECORD_SIZE: usize = 16;
const BOOT_SIGNATURE_OFFSET: usize = 510;
pub const BOOT_SIGNATURE: u16 = 0xAA55;

/// OS type marking the whole disk as owned by a GPT.
pub const GPT_PROTECTIVE_OS_TYPE: u8 = 0xEE;

// Partition record structure (16 bytes)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MbrPartitionRecord {
    /// 0x80 for an active partition.
    pub boot_indicator: u8,
    pub starting_chs: [u8; 3],
    pub os_type: u8,
    pub ending_chs: [u8; 3],
    pub starting_lba: u32,
    pub size_lba: u32,
}

impl MbrPartitionRecord {
    /// Record 0 of a protective MBR for a disk of `image_size_lbas` sectors.
    pub fn protective(image_size_lbas: u64) -> Self {
        let size_lba = image_size_lbas.saturating_sub(1).min(u32::MAX as u64) as u32;
        Self {
            boot_indicator: 0,
            starting_chs: [0x00, 0x02, 0x00],
            os_type: GPT_PROTECTIVE_OS_TYPE,
            ending_chs: [0xFF, 0xFF, 0xFF],
            starting_lba: 1,
            size_lba,
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn to_bytes(&self) -> [u8; PARTITION_RECORD_SIZE] {
        let mut bytes = [0u8; PARTITION_RECORD_SIZE];
        bytes[0] = self.boot_indicator;
        bytes[1..4].copy_from_slice(&self.starting_chs);
        bytes[4] = self.os_type;
        bytes[5..8].copy_from_slice(&self.ending_chs);
        bytes[8..12].copy_from_slice(&self.starting_lba.to_le_bytes());
        bytes[12..16].copy_from_slice(&self.size_lba.to_le_bytes());
        bytes
    }

    pub fn from_bytes(bytes: &[u8; PARTITION_RECORD_SIZE]) -> Self {
        Self {
            boot_indicator: bytes[0],
            starting_chs: [bytes[1], bytes[2], bytes[3]],
            os_type: bytes[4],
            ending_chs: [bytes[5], bytes[6], bytes[7]],
            starting_lba: u32::from_le_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]),
            size_lba: u32::from_le_bytes([bytes[12], bytes[13], bytes[14], bytes[15]]),
        }
    }
}

/// Represents the Master Boot Record (MBR).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mbr {
    /// No boot loader is installed, so this stays zeroed.
    pub boot_code: [u8; BOOT_CODE_SIZE],
    pub disk_signature: u32,
    pub reserved: u16,
    pub partitions: [MbrPartitionRecord; 4],
    pub boot_signature: u16,
}

impl Default for Mbr {
    fn default() -> Self {
        Self {
            boot_code: [0u8; BOOT_CODE_SIZE],
            disk_signature: 0,
            reserved: 0,
            partitions: [MbrPartitionRecord::default(); 4],
            boot_signature: BOOT_SIGNATURE,
        }
    }
}

/// Creates a protective MBR covering a disk of `image_size_lbas` sectors.
pub fn build_mbr(image_size_lbas: u64) -> Mbr {
    let mut mbr = Mbr::default();
    mbr.partitions[0] = MbrPartitionRecord::protective(image_size_lbas);
    mbr
}

impl Mbr {
    pub fn to_bytes(&self) -> [u8; MBR_SIZE] {
        let mut bytes = [0u8; MBR_SIZE];
        bytes[..BOOT_CODE_SIZE].copy_from_slice(&self.boot_code);
        bytes[DISK_SIGNATURE_OFFSET..DISK_SIGNATURE_OFFSET + 4]
            .copy_from_slice(&self.disk_signature.to_le_bytes());
        bytes[DISK_SIGNATURE_OFFSET + 4..PARTITION_TABLE_OFFSET]
            .copy_from_slice(&self.reserved.to_le_bytes());
        for (i, record) in self.partitions.iter().enumerate() {
            let offset = PARTITION_TABLE_OFFSET + i * PARTITION_RECORD_SIZE;
            bytes[offset..offset + PARTITION_RECORD_SIZE].copy_from_slice(&record.to_bytes());
        }
        bytes[BOOT_SIGNATURE_OFFSET..].copy_from_slice(&self.boot_signature.to_le_bytes());
        bytes
    }

    pub fn from_bytes(bytes: &[u8; MBR_SIZE]) -> Self {
        let mut mbr = Mbr::default();
        mbr.boot_code.copy_from_slice(&bytes[..BOOT_CODE_SIZE]);
        mbr.disk_signature = u32::from_le_bytes([
            bytes[DISK_SIGNATURE_OFFSET],
            bytes[DISK_SIGNATURE_OFFSET + 1],
            bytes[DISK_SIGNATURE_OFFSET + 2],
            bytes[DISK_SIGNATURE_OFFSET + 3],
        ]);
        mbr.reserved = u16::from_le_bytes([
            bytes[DISK_SIGNATURE_OFFSET + 4],
            bytes[DISK_SIGNATURE_OFFSET + 5],
        ]);
        for (i, record) in mbr.partitions.iter_mut().enumerate() {
            let offset = PARTITION_TABLE_OFFSET + i * PARTITION_RECORD_SIZE;
            let mut raw = [0u8; PARTITION_RECORD_SIZE];
            raw.copy_from_slice(&bytes[offset..offset + PARTITION_RECORD_SIZE]);
            *record = MbrPartitionRecord::from_bytes(&raw);
        }
        mbr.boot_signature =
            u16::from_le_bytes([bytes[BOOT_SIGNATURE_OFFSET], bytes[BOOT_SIGNATURE_OFFSET + 1]]);
        mbr
    }

    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_all(&self.to_bytes())
    }
}
