// gptbemak/src/layout.rs

//! Image geometry: how many sectors each region of the disk takes.

use log::debug;

use crate::config::ImageConfig;
use crate::error::LayoutError;
use crate::gpt::partition_entry::{GPT_PARTITION_ENTRY_SIZE, NUM_PARTITION_ENTRIES};
use crate::utils::bytes_to_lbas;

pub const MIN_LBA_SIZE: u64 = 512;

/// Byte size of the full partition entry array.
pub const PARTITION_TABLE_SIZE: u64 = (NUM_PARTITION_ENTRIES * GPT_PARTITION_ENTRY_SIZE) as u64;

/// Sector counts of the image and both partitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiskGeometry {
    pub lba_size: u64,
    pub image_size_lbas: u64,
    pub esp_lbas: u64,
    pub data_lbas: u64,
}

impl DiskGeometry {
    /// Derives and validates the geometry requested by `config`.
    pub fn from_config(config: &ImageConfig) -> Result<Self, LayoutError> {
        check_lba_size(config.lba_size)?;
        let lba_size = config.lba_size;

        let image_size = match config.image_size {
            Some(size) => size,
            None => config
                .esp_size
                .checked_add(config.data_size)
                .and_then(|size| size.checked_add(config.reserve_padding))
                .ok_or(LayoutError::SizeOverflow)?,
        };

        let geometry = Self {
            lba_size,
            image_size_lbas: bytes_to_lbas(image_size, lba_size),
            esp_lbas: bytes_to_lbas(config.esp_size, lba_size),
            data_lbas: bytes_to_lbas(config.data_size, lba_size),
        };
        geometry.validate()?;
        debug!("{geometry:?}");
        Ok(geometry)
    }

    /// Checks that the MBR, both GPT copies and both partitions fit in the image.
    pub fn validate(&self) -> Result<(), LayoutError> {
        self.validate_reserved()?;
        let required_lbas = self.required_lbas()?;
        if self.image_size_lbas < required_lbas {
            return Err(LayoutError::ImageTooSmall {
                image_lbas: self.image_size_lbas,
                required_lbas,
            });
        }
        Ok(())
    }

    /// Checks the sector size, the partition sizes and that the MBR and both
    /// GPT copies fit, leaving the partitions' fit to the caller.
    pub fn validate_reserved(&self) -> Result<(), LayoutError> {
        check_lba_size(self.lba_size)?;
        if self.esp_lbas == 0 {
            return Err(LayoutError::EmptyPartition { name: "ESP" });
        }
        if self.data_lbas == 0 {
            return Err(LayoutError::EmptyPartition { name: "data" });
        }
        let required_lbas = self.reserved_lbas();
        if self.image_size_lbas < required_lbas {
            return Err(LayoutError::ImageTooSmall {
                image_lbas: self.image_size_lbas,
                required_lbas,
            });
        }
        self.image_size_bytes()?;
        Ok(())
    }

    /// MBR + primary header + table + backup table + backup header.
    pub fn reserved_lbas(&self) -> u64 {
        1 + 1 + 2 * self.partition_table_lbas() + 1
    }

    /// Reserved sectors plus both partitions.
    pub fn required_lbas(&self) -> Result<u64, LayoutError> {
        self.reserved_lbas()
            .checked_add(self.esp_lbas)
            .and_then(|lbas| lbas.checked_add(self.data_lbas))
            .ok_or(LayoutError::SizeOverflow)
    }

    /// Sectors taken by one copy of the partition entry array.
    pub fn partition_table_lbas(&self) -> u64 {
        bytes_to_lbas(PARTITION_TABLE_SIZE, self.lba_size)
    }

    pub fn first_usable_lba(&self) -> u64 {
        2 + self.partition_table_lbas()
    }

    pub fn last_usable_lba(&self) -> u64 {
        self.backup_table_lba() - 1
    }

    pub fn backup_header_lba(&self) -> u64 {
        self.image_size_lbas - 1
    }

    pub fn backup_table_lba(&self) -> u64 {
        self.backup_header_lba() - self.partition_table_lbas()
    }

    pub fn image_size_bytes(&self) -> Result<u64, LayoutError> {
        self.image_size_lbas
            .checked_mul(self.lba_size)
            .ok_or(LayoutError::SizeOverflow)
    }
}

fn check_lba_size(lba_size: u64) -> Result<(), LayoutError> {
    if lba_size < MIN_LBA_SIZE || !lba_size.is_power_of_two() {
        return Err(LayoutError::InvalidLbaSize(lba_size));
    }
    Ok(())
}
