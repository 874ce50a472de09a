// gptbemak/src/gpt/mod.rs

//! Primary and backup GPT headers plus the partition entry array.

pub mod header;
pub mod partition_entry;

use log::debug;

use crate::config::DataPartitionType;
use crate::error::LayoutError;
use crate::guid::{EFI_SYSTEM_PARTITION_GUID, new_guid};
use crate::layout::DiskGeometry;

use self::header::{GPT_HEADER_SIZE, GPT_REVISION, GPT_SIGNATURE, GptHeader};
use self::partition_entry::{
    GPT_PARTITION_ENTRY_SIZE, GptPartitionEntry, NUM_PARTITION_ENTRIES, PartitionTable,
};

pub const ESP_PARTITION_NAME: &str = "EFI SYSTEM";

/// Both headers and the table they describe. The table is stored once since
/// the primary and backup copies are byte-identical.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GptStructures {
    pub primary: GptHeader,
    pub backup: GptHeader,
    pub table: PartitionTable,
}

impl GptStructures {
    pub fn esp(&self) -> &GptPartitionEntry {
        &self.table.entries()[0]
    }

    pub fn data(&self) -> &GptPartitionEntry {
        &self.table.entries()[1]
    }
}

/// Lays out the ESP and the data partition back to back at the first usable
/// LBA and builds the checksummed primary and backup GPT.
pub fn build_gpt(
    geometry: &DiskGeometry,
    data_type: DataPartitionType,
) -> Result<GptStructures, LayoutError> {
    geometry.validate_reserved()?;

    let first_usable_lba = geometry.first_usable_lba();
    let last_usable_lba = geometry.last_usable_lba();

    let esp_start = first_usable_lba;
    let esp_end = esp_start
        .checked_add(geometry.esp_lbas - 1)
        .ok_or(LayoutError::SizeOverflow)?;
    let data_start = esp_end.checked_add(1).ok_or(LayoutError::SizeOverflow)?;
    let data_end = data_start
        .checked_add(geometry.data_lbas - 1)
        .ok_or(LayoutError::SizeOverflow)?;
    if data_end > last_usable_lba {
        return Err(LayoutError::PartitionsExceedUsable {
            end_lba: data_end,
            last_usable_lba,
        });
    }

    let esp = GptPartitionEntry::new(
        EFI_SYSTEM_PARTITION_GUID,
        new_guid(),
        esp_start,
        esp_end,
        ESP_PARTITION_NAME,
        0,
    );
    let data = GptPartitionEntry::new(
        data_type.type_guid(),
        new_guid(),
        data_start,
        data_end,
        data_type.partition_name(),
        0,
    );
    debug!(
        "ESP {} at LBA {esp_start}..={esp_end}, data {} at LBA {data_start}..={data_end}",
        esp.unique_partition_guid, data.unique_partition_guid
    );

    let table = PartitionTable::new(&[esp, data]);
    let partition_table_crc32 = table.crc32();

    let mut primary = GptHeader {
        signature: GPT_SIGNATURE,
        revision: GPT_REVISION,
        header_size: GPT_HEADER_SIZE as u32,
        header_crc32: 0, // Calculated later
        reserved: 0,
        my_lba: 1,
        alternate_lba: geometry.backup_header_lba(),
        first_usable_lba,
        last_usable_lba,
        disk_guid: new_guid(),
        partition_table_lba: 2,
        number_of_entries: NUM_PARTITION_ENTRIES as u32,
        size_of_entries: GPT_PARTITION_ENTRY_SIZE as u32,
        partition_table_crc32,
    };
    primary.update_crc32();

    let mut backup = primary;
    backup.my_lba = primary.alternate_lba;
    backup.alternate_lba = primary.my_lba;
    backup.partition_table_lba = geometry.backup_table_lba();
    backup.update_crc32();

    debug!(
        "disk {}: table CRC32 {partition_table_crc32:#010x}, header CRC32 {:#010x} / {:#010x}",
        primary.disk_guid, primary.header_crc32, backup.header_crc32
    );

    Ok(GptStructures {
        primary,
        backup,
        table,
    })
}
