// gptbemak/src/image.rs

use log::{debug, info};
use std::{
    fs::OpenOptions,
    io::{BufWriter, Seek, SeekFrom, Write},
    path::Path,
};

use crate::error::{Error, LayoutError, Result, Stage};
use crate::gpt::GptStructures;
use crate::gpt::partition_entry::GptPartitionEntry;
use crate::layout::DiskGeometry;
use crate::mbr::Mbr;
use crate::utils::{pad_to_lba, write_padded};

/// Raw bytes copied to the start of each partition. Whatever they do not
/// cover is zero-filled.
#[derive(Debug, Clone, Copy, Default)]
pub struct PartitionContents<'a> {
    pub esp: Option<&'a [u8]>,
    pub data: Option<&'a [u8]>,
}

impl PartitionContents<'_> {
    /// Rejects contents larger than their partition.
    pub fn check_fits(
        &self,
        gpt: &GptStructures,
        lba_size: u64,
    ) -> std::result::Result<(), LayoutError> {
        check_content_fits("ESP", self.esp, gpt.esp(), lba_size)?;
        check_content_fits("data", self.data, gpt.data(), lba_size)
    }
}

fn check_content_fits(
    name: &'static str,
    content: Option<&[u8]>,
    entry: &GptPartitionEntry,
    lba_size: u64,
) -> std::result::Result<(), LayoutError> {
    let Some(content) = content else {
        return Ok(());
    };
    let capacity = entry
        .size_lbas()
        .checked_mul(lba_size)
        .ok_or(LayoutError::SizeOverflow)?;
    let len = content.len() as u64;
    if len > capacity {
        return Err(LayoutError::ContentTooLarge {
            name,
            len,
            capacity,
        });
    }
    Ok(())
}

/// Creates (or truncates) the file at `path` and writes the complete image.
///
/// Contents are checked before the file is opened. On failure the partially
/// written file stays on disk.
pub fn write_image(
    path: &Path,
    geometry: &DiskGeometry,
    mbr: &Mbr,
    gpt: &GptStructures,
    contents: &PartitionContents<'_>,
) -> Result<()> {
    contents.check_fits(gpt, geometry.lba_size)?;

    let file = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
        .map_err(Error::io(Stage::Open))?;
    info!(
        "Writing {} LBAs of {} bytes to {}",
        geometry.image_size_lbas,
        geometry.lba_size,
        path.display()
    );

    let mut writer = BufWriter::new(file);
    write_image_to(&mut writer, geometry, mbr, gpt, contents)?;
    let file = writer
        .into_inner()
        .map_err(|e| Error::io(Stage::Flush)(e.into_error()))?;
    file.sync_all().map_err(Error::io(Stage::Flush))?;
    Ok(())
}

/// Writes every sector of the image to `writer`, strictly in LBA order.
pub fn write_image_to<W: Write + Seek>(
    writer: &mut W,
    geometry: &DiskGeometry,
    mbr: &Mbr,
    gpt: &GptStructures,
    contents: &PartitionContents<'_>,
) -> Result<()> {
    let lba_size = geometry.lba_size;
    let image_size = geometry.image_size_bytes()?;
    contents.check_fits(gpt, lba_size)?;

    writer
        .seek(SeekFrom::Start(0))
        .and_then(|_| write_padded(writer, &mbr.to_bytes(), lba_size))
        .map_err(Error::io(Stage::Mbr))?;

    pad_to_lba(writer, gpt.primary.my_lba, lba_size)
        .and_then(|_| gpt.primary.write_to(writer, lba_size))
        .map_err(Error::io(Stage::PrimaryHeader))?;

    pad_to_lba(writer, gpt.primary.partition_table_lba, lba_size)
        .and_then(|_| write_padded(writer, &gpt.table.to_bytes(), lba_size))
        .map_err(Error::io(Stage::PrimaryTable))?;
    debug!("Primary GPT written");

    write_partition(writer, gpt.esp(), contents.esp, lba_size, Stage::EspContents)?;
    write_partition(writer, gpt.data(), contents.data, lba_size, Stage::DataContents)?;

    pad_to_lba(writer, gpt.backup.partition_table_lba, lba_size)
        .map_err(Error::io(Stage::Padding))?;
    write_padded(writer, &gpt.table.to_bytes(), lba_size).map_err(Error::io(Stage::BackupTable))?;

    pad_to_lba(writer, gpt.backup.my_lba, lba_size)
        .and_then(|_| gpt.backup.write_to(writer, lba_size))
        .map_err(Error::io(Stage::BackupHeader))?;
    debug!("Backup GPT written");

    let end = writer.stream_position().map_err(Error::io(Stage::Padding))?;
    if end != image_size {
        return Err(Error::Io {
            stage: Stage::Padding,
            source: std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("image ends at byte {end}, expected {image_size}"),
            ),
        });
    }
    Ok(())
}

/// Zero-fills up to the partition start and copies `content` into it. The
/// rest of the partition is filled by the next padding step.
fn write_partition<W: Write + Seek>(
    writer: &mut W,
    entry: &GptPartitionEntry,
    content: Option<&[u8]>,
    lba_size: u64,
    stage: Stage,
) -> Result<()> {
    pad_to_lba(writer, entry.starting_lba, lba_size).map_err(Error::io(Stage::Padding))?;
    if let Some(content) = content {
        writer.write_all(content).map_err(Error::io(stage))?;
        debug!(
            "Copied {} bytes to LBA {} ({})",
            content.len(),
            entry.starting_lba,
            entry.name()
        );
    }
    Ok(())
}
