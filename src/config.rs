// gptbemak/src/config.rs

use std::path::PathBuf;

use crate::guid::{BASIC_DATA_PARTITION_GUID, Guid, LINUX_FILESYSTEM_PARTITION_GUID};

pub const MIB: u64 = 1024 * 1024;

pub const DEFAULT_IMAGE_NAME: &str = "test.img";
pub const DEFAULT_LBA_SIZE: u64 = 512;
pub const DEFAULT_ESP_SIZE: u64 = 33 * MIB;
pub const DEFAULT_DATA_SIZE: u64 = MIB;
/// Room left around the partitions for the MBR and both GPT copies.
pub const DEFAULT_RESERVE_PADDING: u64 = MIB;

/// Partition type written into the data partition entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DataPartitionType {
    /// Microsoft basic data, readable by every firmware and OS.
    #[default]
    BasicData,
    LinuxFilesystem,
}

impl DataPartitionType {
    pub fn type_guid(self) -> Guid {
        match self {
            DataPartitionType::BasicData => BASIC_DATA_PARTITION_GUID,
            DataPartitionType::LinuxFilesystem => LINUX_FILESYSTEM_PARTITION_GUID,
        }
    }

    pub fn partition_name(self) -> &'static str {
        match self {
            DataPartitionType::BasicData => "BASIC DATA",
            DataPartitionType::LinuxFilesystem => "LINUX DATA",
        }
    }
}

/// Everything needed to build one image. Built once and passed by reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageConfig {
    /// Path of the image file to create.
    pub image_name: PathBuf,
    /// Sector size in bytes.
    pub lba_size: u64,
    /// ESP size in bytes, rounded up to whole sectors.
    pub esp_size: u64,
    /// Data partition size in bytes, rounded up to whole sectors.
    pub data_size: u64,
    /// Extra bytes added to the partition sizes when the image size is derived.
    pub reserve_padding: u64,
    /// Fixed total image size in bytes. Derived from the partition sizes when `None`.
    pub image_size: Option<u64>,
    pub data_type: DataPartitionType,
    /// Raw bytes copied to the start of the ESP.
    pub esp_content: Option<Vec<u8>>,
    /// Raw bytes copied to the start of the data partition.
    pub data_content: Option<Vec<u8>>,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            image_name: PathBuf::from(DEFAULT_IMAGE_NAME),
            lba_size: DEFAULT_LBA_SIZE,
            esp_size: DEFAULT_ESP_SIZE,
            data_size: DEFAULT_DATA_SIZE,
            reserve_padding: DEFAULT_RESERVE_PADDING,
            image_size: None,
            data_type: DataPartitionType::default(),
            esp_content: None,
            data_content: None,
        }
    }
}

impl ImageConfig {
    /// Default configuration writing to `image_name`.
    pub fn new(image_name: impl Into<PathBuf>) -> Self {
        Self {
            image_name: image_name.into(),
            ..Self::default()
        }
    }
}
