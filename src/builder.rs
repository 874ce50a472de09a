// src/builder.rs

use log::info;

use crate::config::ImageConfig;
use crate::error::Result;
use crate::gpt::build_gpt;
use crate::guid::Guid;
use crate::image::{PartitionContents, write_image};
use crate::layout::DiskGeometry;
use crate::mbr::build_mbr;

/// Where everything ended up in a built image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildReport {
    pub geometry: DiskGeometry,
    pub disk_guid: Guid,
    /// Inclusive LBA range of the ESP.
    pub esp_lbas: (u64, u64),
    /// Inclusive LBA range of the data partition.
    pub data_lbas: (u64, u64),
}

/// High-level function to create a GPT disk image from `config`.
///
/// Every layout check runs before the output file is opened, so a layout
/// error leaves the file system untouched.
pub fn build_disk_image(config: &ImageConfig) -> Result<BuildReport> {
    info!(
        "build_disk_image: Starting {}...",
        config.image_name.display()
    );

    // 1. Geometry and on-disk structures.
    let geometry = DiskGeometry::from_config(config)?;
    let mbr = build_mbr(geometry.image_size_lbas);
    let gpt = build_gpt(&geometry, config.data_type)?;

    // 2. Write the image. Contents are size-checked before the file is opened.
    let contents = PartitionContents {
        esp: config.esp_content.as_deref(),
        data: config.data_content.as_deref(),
    };
    write_image(&config.image_name, &geometry, &mbr, &gpt, &contents)?;

    let report = BuildReport {
        geometry,
        disk_guid: gpt.primary.disk_guid,
        esp_lbas: (gpt.esp().starting_lba, gpt.esp().ending_lba),
        data_lbas: (gpt.data().starting_lba, gpt.data().ending_lba),
    };
    info!(
        "build_disk_image: {} created, disk GUID {}",
        config.image_name.display(),
        report.disk_guid
    );
    Ok(report)
}
