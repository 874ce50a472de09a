use std::{
    fs::{self, File},
    io::Read,
};

use gptbemak::guid::{BASIC_DATA_PARTITION_GUID, EFI_SYSTEM_PARTITION_GUID};
use gptbemak::{DataPartitionType, ImageConfig, Result, build_disk_image};
use tempfile::tempdir;

use crate::integration_tests::common::{PARTITION_TABLE_SIZE, read_at, verify_gpt_image};

#[test]
fn test_build_default_image() -> Result<()> {
    let temp_dir = tempdir().unwrap();
    let image_path = temp_dir.path().join("test.img");
    let config = ImageConfig::new(&image_path);

    let report = build_disk_image(&config)?;
    assert!(image_path.exists());

    // 33 MiB ESP + 1 MiB data + 1 MiB of reserve.
    let geometry = report.geometry;
    assert_eq!(geometry.image_size_lbas, 35 * 2048);
    let len = fs::metadata(&image_path).unwrap().len();
    assert_eq!(len, geometry.image_size_lbas * 512);

    let mut file = File::open(&image_path).unwrap();
    let signature = read_at(&mut file, 1, 512, 8).unwrap();
    assert_eq!(&signature, b"EFI PART");

    // Exactly two non-zero entries in the primary table.
    let table = read_at(&mut file, 2, 512, PARTITION_TABLE_SIZE).unwrap();
    let non_zero = table
        .chunks_exact(128)
        .filter(|entry| entry.iter().any(|&b| b != 0))
        .count();
    assert_eq!(non_zero, 2);

    let used = verify_gpt_image(&image_path, 512).unwrap();
    assert_eq!(used.len(), 2);
    assert_eq!(used[0].partition_type_guid, EFI_SYSTEM_PARTITION_GUID);
    assert_eq!(used[0].name(), "EFI SYSTEM");
    assert_eq!(
        (used[0].starting_lba, used[0].ending_lba),
        report.esp_lbas
    );
    assert_eq!(used[0].size_lbas(), 33 * 2048);
    assert_eq!(used[1].partition_type_guid, BASIC_DATA_PARTITION_GUID);
    assert_eq!(
        (used[1].starting_lba, used[1].ending_lba),
        report.data_lbas
    );
    assert_eq!(used[1].size_lbas(), 2048);
    assert_eq!(used[0].unique_partition_guid.version(), 4);
    assert_eq!(used[1].unique_partition_guid.variant_bits(), 2);

    Ok(())
}

#[test]
fn test_build_4k_image() -> Result<()> {
    let temp_dir = tempdir().unwrap();
    let image_path = temp_dir.path().join("4k.img");
    let config = ImageConfig {
        lba_size: 4096,
        esp_size: 2 * 1024 * 1024,
        data_size: 512 * 1024,
        data_type: DataPartitionType::LinuxFilesystem,
        ..ImageConfig::new(&image_path)
    };

    let report = build_disk_image(&config)?;
    let len = fs::metadata(&image_path).unwrap().len();
    assert_eq!(len, report.geometry.image_size_lbas * 4096);
    assert_eq!(report.esp_lbas.0, 6);

    let used = verify_gpt_image(&image_path, 4096).unwrap();
    assert_eq!(used.len(), 2);
    assert_eq!(used[1].name(), "LINUX DATA");
    Ok(())
}

#[test]
fn test_build_with_contents() -> Result<()> {
    let temp_dir = tempdir().unwrap();
    let image_path = temp_dir.path().join("contents.img");
    let esp_content = b"this is a mock FAT image".to_vec();
    let data_content = vec![0x5A; 4096];
    let config = ImageConfig {
        esp_size: 1024 * 1024,
        esp_content: Some(esp_content.clone()),
        data_content: Some(data_content.clone()),
        ..ImageConfig::new(&image_path)
    };

    let report = build_disk_image(&config)?;
    verify_gpt_image(&image_path, 512).unwrap();

    let mut file = File::open(&image_path).unwrap();
    let esp = read_at(&mut file, report.esp_lbas.0, 512, esp_content.len() + 1).unwrap();
    assert_eq!(&esp[..esp_content.len()], esp_content.as_slice());
    assert_eq!(esp[esp_content.len()], 0);
    let data = read_at(&mut file, report.data_lbas.0, 512, data_content.len()).unwrap();
    assert_eq!(data, data_content);
    Ok(())
}

#[test]
fn test_rebuild_truncates_previous_image() -> Result<()> {
    let temp_dir = tempdir().unwrap();
    let image_path = temp_dir.path().join("rebuild.img");
    fs::write(&image_path, vec![0xFFu8; 64 * 1024 * 1024]).unwrap();

    let report = build_disk_image(&ImageConfig::new(&image_path))?;
    let mut bytes = Vec::new();
    File::open(&image_path)
        .unwrap()
        .read_to_end(&mut bytes)
        .unwrap();
    assert_eq!(bytes.len() as u64, report.geometry.image_size_lbas * 512);
    assert!(bytes[512 * 34..512 * 40].iter().all(|&b| b == 0));
    Ok(())
}
