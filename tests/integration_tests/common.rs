use std::{
    fs::File,
    io::{self, Read, Seek, SeekFrom},
    path::Path,
};

use gptbemak::crc::crc32;
use gptbemak::gpt::header::{GPT_HEADER_SIZE, GptHeader};
use gptbemak::gpt::partition_entry::{GptPartitionEntry, PartitionTable};
use gptbemak::mbr::{MBR_SIZE, Mbr};

pub const PARTITION_TABLE_SIZE: usize = 128 * 128;

/// Reads `len` bytes at `lba`.
pub fn read_at(file: &mut File, lba: u64, lba_size: u64, len: usize) -> io::Result<Vec<u8>> {
    file.seek(SeekFrom::Start(lba * lba_size))?;
    let mut buf = vec![0u8; len];
    file.read_exact(&mut buf)?;
    Ok(buf)
}

pub fn read_mbr(file: &mut File) -> io::Result<Mbr> {
    let bytes = read_at(file, 0, 512, MBR_SIZE)?;
    let mut raw = [0u8; MBR_SIZE];
    raw.copy_from_slice(&bytes);
    Ok(Mbr::from_bytes(&raw))
}

pub fn read_header(file: &mut File, lba: u64, lba_size: u64) -> io::Result<GptHeader> {
    let bytes = read_at(file, lba, lba_size, GPT_HEADER_SIZE)?;
    let mut raw = [0u8; GPT_HEADER_SIZE];
    raw.copy_from_slice(&bytes);
    Ok(GptHeader::from_bytes(&raw))
}

/// Independently re-verifies everything a firmware checks on a GPT disk and
/// returns the used partition entries.
pub fn verify_gpt_image(path: &Path, lba_size: u64) -> io::Result<Vec<GptPartitionEntry>> {
    let mut file = File::open(path)?;
    let len = file.metadata()?.len();
    assert_eq!(len % lba_size, 0, "Image is not a whole number of sectors");
    let total_lbas = len / lba_size;

    // 1. Protective MBR
    let mbr = read_mbr(&mut file)?;
    assert_eq!(mbr.boot_signature, 0xAA55);
    assert_eq!(mbr.partitions[0].os_type, 0xEE);
    assert_eq!(mbr.partitions[0].starting_lba, 1);
    assert_eq!(
        mbr.partitions[0].size_lba as u64,
        (total_lbas - 1).min(0xFFFF_FFFF)
    );
    assert!(mbr.partitions[1..].iter().all(|p| p.is_empty()));

    // 2. Headers
    let primary = read_header(&mut file, 1, lba_size)?;
    let backup = read_header(&mut file, total_lbas - 1, lba_size)?;
    for header in [&primary, &backup] {
        assert_eq!(&header.signature, b"EFI PART");
        assert_eq!(header.revision, 0x0001_0000);
        assert_eq!(header.header_size, 92);
        assert_eq!(header.number_of_entries, 128);
        assert_eq!(header.size_of_entries, 128);

        let mut bytes = header.to_bytes();
        bytes[16..20].copy_from_slice(&[0; 4]);
        assert_eq!(crc32(&bytes), header.header_crc32, "Header CRC32 mismatch");
    }
    assert_eq!(primary.my_lba, 1);
    assert_eq!(primary.alternate_lba, total_lbas - 1);
    assert_eq!(primary.my_lba, backup.alternate_lba);
    assert_eq!(primary.alternate_lba, backup.my_lba);
    assert_eq!(primary.partition_table_lba, 2);
    assert_eq!(backup.partition_table_lba, primary.last_usable_lba + 1);
    assert_eq!(primary.disk_guid, backup.disk_guid);

    // 3. Tables
    let primary_table = read_at(&mut file, 2, lba_size, PARTITION_TABLE_SIZE)?;
    let backup_table = read_at(
        &mut file,
        backup.partition_table_lba,
        lba_size,
        PARTITION_TABLE_SIZE,
    )?;
    assert_eq!(primary_table, backup_table, "Backup table differs from primary");
    assert_eq!(crc32(&primary_table), primary.partition_table_crc32);
    assert_eq!(crc32(&backup_table), backup.partition_table_crc32);

    let table = PartitionTable::from_bytes(&primary_table).expect("table size");
    let used: Vec<GptPartitionEntry> = table.used_entries().copied().collect();

    // 4. Partitions are ascending, disjoint and inside the usable range.
    let mut next_free = primary.first_usable_lba;
    for entry in &used {
        assert!(entry.starting_lba >= next_free);
        assert!(entry.starting_lba <= entry.ending_lba);
        assert!(entry.ending_lba <= primary.last_usable_lba);
        next_free = entry.ending_lba + 1;
    }

    Ok(used)
}
