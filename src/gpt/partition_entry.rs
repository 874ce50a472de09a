use std::io::{self, Write};

use crate::crc::crc32;
use crate::guid::{GUID_SIZE, Guid};

pub const GPT_PARTITION_ENTRY_SIZE: usize = 128;
pub const NUM_PARTITION_ENTRIES: usize = 128;
pub const PARTITION_NAME_LEN: usize = 36; // UTF-16 code units

// GPT Partition Entry structure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GptPartitionEntry {
    pub partition_type_guid: Guid,
    pub unique_partition_guid: Guid,
    pub starting_lba: u64,
    /// Inclusive.
    pub ending_lba: u64,
    pub attributes: u64,
    pub partition_name: [u16; PARTITION_NAME_LEN],
}

impl Default for GptPartitionEntry {
    fn default() -> Self {
        Self {
            partition_type_guid: Guid::NIL,
            unique_partition_guid: Guid::NIL,
            starting_lba: 0,
            ending_lba: 0,
            attributes: 0,
            partition_name: [0; PARTITION_NAME_LEN],
        }
    }
}

impl GptPartitionEntry {
    /// Creates an entry; names longer than 36 UTF-16 code units are truncated.
    pub fn new(
        partition_type_guid: Guid,
        unique_partition_guid: Guid,
        starting_lba: u64,
        ending_lba: u64,
        partition_name: &str,
        attributes: u64,
    ) -> Self {
        let mut name = [0u16; PARTITION_NAME_LEN];
        for (i, c) in partition_name
            .encode_utf16()
            .take(PARTITION_NAME_LEN)
            .enumerate()
        {
            name[i] = c;
        }

        GptPartitionEntry {
            partition_type_guid,
            unique_partition_guid,
            starting_lba,
            ending_lba,
            attributes,
            partition_name: name,
        }
    }

    /// An unused slot is all zero.
    pub fn is_unused(&self) -> bool {
        self.partition_type_guid.is_nil()
    }

    pub fn size_lbas(&self) -> u64 {
        self.ending_lba - self.starting_lba + 1
    }

    pub fn name(&self) -> String {
        let len = self
            .partition_name
            .iter()
            .position(|&c| c == 0)
            .unwrap_or(PARTITION_NAME_LEN);
        String::from_utf16_lossy(&self.partition_name[..len])
    }

    pub fn to_bytes(&self) -> [u8; GPT_PARTITION_ENTRY_SIZE] {
        let mut bytes = [0u8; GPT_PARTITION_ENTRY_SIZE];
        let mut offset = 0;

        bytes[offset..offset + GUID_SIZE].copy_from_slice(&self.partition_type_guid.to_bytes());
        offset += GUID_SIZE;
        bytes[offset..offset + GUID_SIZE].copy_from_slice(&self.unique_partition_guid.to_bytes());
        offset += GUID_SIZE;
        bytes[offset..offset + 8].copy_from_slice(&self.starting_lba.to_le_bytes());
        offset += 8;
        bytes[offset..offset + 8].copy_from_slice(&self.ending_lba.to_le_bytes());
        offset += 8;
        bytes[offset..offset + 8].copy_from_slice(&self.attributes.to_le_bytes());
        offset += 8;
        for c in self.partition_name {
            bytes[offset..offset + 2].copy_from_slice(&c.to_le_bytes());
            offset += 2;
        }

        bytes
    }

    pub fn from_bytes(bytes: &[u8; GPT_PARTITION_ENTRY_SIZE]) -> Self {
        let guid_at = |offset: usize| {
            let mut raw = [0u8; GUID_SIZE];
            raw.copy_from_slice(&bytes[offset..offset + GUID_SIZE]);
            Guid::from_bytes(&raw)
        };
        let u64_at = |offset: usize| {
            let mut raw = [0u8; 8];
            raw.copy_from_slice(&bytes[offset..offset + 8]);
            u64::from_le_bytes(raw)
        };

        let mut partition_name = [0u16; PARTITION_NAME_LEN];
        for (i, c) in partition_name.iter_mut().enumerate() {
            *c = u16::from_le_bytes([bytes[56 + 2 * i], bytes[57 + 2 * i]]);
        }

        GptPartitionEntry {
            partition_type_guid: guid_at(0),
            unique_partition_guid: guid_at(16),
            starting_lba: u64_at(32),
            ending_lba: u64_at(40),
            attributes: u64_at(48),
            partition_name,
        }
    }
}

/// The fixed 128-slot partition entry array.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionTable {
    entries: Vec<GptPartitionEntry>,
}

impl PartitionTable {
    /// Places `used` in the first slots and zero-fills the rest.
    ///
    /// Panics if `used` holds more than 128 entries.
    pub fn new(used: &[GptPartitionEntry]) -> Self {
        assert!(used.len() <= NUM_PARTITION_ENTRIES);
        let mut entries = vec![GptPartitionEntry::default(); NUM_PARTITION_ENTRIES];
        entries[..used.len()].copy_from_slice(used);
        Self { entries }
    }

    pub fn entries(&self) -> &[GptPartitionEntry] {
        &self.entries
    }

    pub fn used_entries(&self) -> impl Iterator<Item = &GptPartitionEntry> {
        self.entries.iter().filter(|entry| !entry.is_unused())
    }

    /// The serialized array, all 128 entries.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(NUM_PARTITION_ENTRIES * GPT_PARTITION_ENTRY_SIZE);
        for entry in &self.entries {
            bytes.extend_from_slice(&entry.to_bytes());
        }
        bytes
    }

    /// Parses a serialized array. Returns `None` if `bytes` has the wrong length.
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() != NUM_PARTITION_ENTRIES * GPT_PARTITION_ENTRY_SIZE {
            return None;
        }
        let entries = bytes
            .chunks_exact(GPT_PARTITION_ENTRY_SIZE)
            .map(|chunk| {
                let mut raw = [0u8; GPT_PARTITION_ENTRY_SIZE];
                raw.copy_from_slice(chunk);
                GptPartitionEntry::from_bytes(&raw)
            })
            .collect();
        Some(Self { entries })
    }

    /// CRC32 over the full array, unused slots included.
    pub fn crc32(&self) -> u32 {
        crc32(&self.to_bytes())
    }

    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_all(&self.to_bytes())
    }
}
