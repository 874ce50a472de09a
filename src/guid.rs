// gptbemak/src/guid.rs

//! GUIDs as GPT stores them.
//!
//! The first three fields are little-endian on disk while the clock sequence
//! and node bytes keep their textual order.

use std::fmt;
use uuid::{Builder, Uuid};

pub const GUID_SIZE: usize = 16;

/// Partition type of an EFI System Partition.
pub const EFI_SYSTEM_PARTITION_GUID: Guid = Guid::from_fields(
    0xC12A_7328,
    0xF81F,
    0x11D2,
    [0xBA, 0x4B, 0x00, 0xA0, 0xC9, 0x3E, 0xC9, 0x3B],
);

/// Microsoft basic data partition type.
pub const BASIC_DATA_PARTITION_GUID: Guid = Guid::from_fields(
    0xEBD0_A0A2,
    0xB9E5,
    0x4433,
    [0x87, 0xC0, 0x68, 0xB6, 0xB7, 0x26, 0x99, 0xC7],
);

/// Linux filesystem data partition type.
pub const LINUX_FILESYSTEM_PARTITION_GUID: Guid = Guid::from_fields(
    0x0FC6_3DAF,
    0x8483,
    0x4772,
    [0x8E, 0x79, 0x3D, 0x69, 0xD8, 0x47, 0x7D, 0xE4],
);

/// A Globally Unique IDentifier in RFC 4122 field layout.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Guid {
    pub time_lo: u32,
    pub time_mid: u16,
    /// The highest 4 bits hold the version.
    pub time_hi_and_ver: u16,
    /// The highest 2 bits hold the variant.
    pub clock_seq_hi_and_res: u8,
    pub clock_seq_lo: u8,
    pub node: [u8; 6],
}

/// Generates a fresh random version 4, variant 2 GUID.
pub fn new_guid() -> Guid {
    Guid::from(Uuid::new_v4())
}

impl Guid {
    /// All-zero GUID, marking an unused partition entry.
    pub const NIL: Guid = Guid::from_fields(0, 0, 0, [0; 8]);

    /// Builds a GUID from its textual fields, e.g. `C12A7328-F81F-11D2-BA4B-00A0C93EC93B`
    /// is `(0xC12A7328, 0xF81F, 0x11D2, [0xBA, 0x4B, 0x00, ...])`.
    pub const fn from_fields(time_lo: u32, time_mid: u16, time_hi_and_ver: u16, rest: [u8; 8]) -> Self {
        Self {
            time_lo,
            time_mid,
            time_hi_and_ver,
            clock_seq_hi_and_res: rest[0],
            clock_seq_lo: rest[1],
            node: [rest[2], rest[3], rest[4], rest[5], rest[6], rest[7]],
        }
    }

    /// Turns 16 random bytes into a version 4, variant 2 GUID. Only the version
    /// and variant bits are overwritten.
    pub fn from_random_bytes(bytes: [u8; GUID_SIZE]) -> Self {
        Self::from(Builder::from_random_bytes(bytes).into_uuid())
    }

    /// Value of the version nibble.
    pub fn version(&self) -> u8 {
        (self.time_hi_and_ver >> 12) as u8 & 0xF
    }

    /// Value of the two variant bits.
    pub fn variant_bits(&self) -> u8 {
        (self.clock_seq_hi_and_res >> 6) & 0x3
    }

    pub fn is_nil(&self) -> bool {
        *self == Self::NIL
    }

    /// Serializes to the on-disk GPT layout.
    pub fn to_bytes(&self) -> [u8; GUID_SIZE] {
        let mut bytes = [0u8; GUID_SIZE];
        bytes[0..4].copy_from_slice(&self.time_lo.to_le_bytes());
        bytes[4..6].copy_from_slice(&self.time_mid.to_le_bytes());
        bytes[6..8].copy_from_slice(&self.time_hi_and_ver.to_le_bytes());
        bytes[8] = self.clock_seq_hi_and_res;
        bytes[9] = self.clock_seq_lo;
        bytes[10..16].copy_from_slice(&self.node);
        bytes
    }

    /// Reads the on-disk GPT layout.
    pub fn from_bytes(bytes: &[u8; GUID_SIZE]) -> Self {
        Self {
            time_lo: u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]),
            time_mid: u16::from_le_bytes([bytes[4], bytes[5]]),
            time_hi_and_ver: u16::from_le_bytes([bytes[6], bytes[7]]),
            clock_seq_hi_and_res: bytes[8],
            clock_seq_lo: bytes[9],
            node: [
                bytes[10], bytes[11], bytes[12], bytes[13], bytes[14], bytes[15],
            ],
        }
    }

    pub fn to_uuid(&self) -> Uuid {
        let mut rest = [0u8; 8];
        rest[0] = self.clock_seq_hi_and_res;
        rest[1] = self.clock_seq_lo;
        rest[2..].copy_from_slice(&self.node);
        Uuid::from_fields(self.time_lo, self.time_mid, self.time_hi_and_ver, &rest)
    }
}

impl From<Uuid> for Guid {
    fn from(uuid: Uuid) -> Self {
        let (time_lo, time_mid, time_hi_and_ver, rest) = uuid.as_fields();
        Self::from_fields(time_lo, time_mid, time_hi_and_ver, *rest)
    }
}

impl fmt::Display for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut buf = Uuid::encode_buffer();
        f.write_str(self.to_uuid().hyphenated().encode_upper(&mut buf))
    }
}
