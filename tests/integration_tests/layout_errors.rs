use std::fs;

use gptbemak::{Error, ImageConfig, LayoutError, Stage, build_disk_image};
use tempfile::tempdir;

#[test]
fn test_oversized_data_partition_writes_nothing() {
    let temp_dir = tempdir().unwrap();
    let image_path = temp_dir.path().join("too_small.img");
    let config = ImageConfig {
        image_size: Some(35 * 1024 * 1024),
        data_size: 8 * 1024 * 1024,
        ..ImageConfig::new(&image_path)
    };

    let err = build_disk_image(&config).unwrap_err();
    assert!(matches!(
        err,
        Error::Layout(LayoutError::ImageTooSmall { .. })
    ));
    assert_eq!(err.stage(), None);
    assert!(!image_path.exists());
}

#[test]
fn test_layout_error_keeps_existing_file() {
    let temp_dir = tempdir().unwrap();
    let image_path = temp_dir.path().join("keep.img");
    fs::write(&image_path, b"previous image").unwrap();
    let config = ImageConfig {
        lba_size: 1000,
        ..ImageConfig::new(&image_path)
    };

    let err = build_disk_image(&config).unwrap_err();
    assert!(matches!(err, Error::Layout(LayoutError::InvalidLbaSize(1000))));
    assert_eq!(fs::read(&image_path).unwrap(), b"previous image");
}

#[test]
fn test_oversized_content_writes_nothing() {
    let temp_dir = tempdir().unwrap();
    let image_path = temp_dir.path().join("content.img");
    let config = ImageConfig {
        esp_size: 4096,
        esp_content: Some(vec![1u8; 4097]),
        ..ImageConfig::new(&image_path)
    };

    let err = build_disk_image(&config).unwrap_err();
    assert!(matches!(
        err,
        Error::Layout(LayoutError::ContentTooLarge { name: "ESP", len: 4097, capacity: 4096 })
    ));
    assert!(!image_path.exists());
}

#[test]
fn test_oversized_content_keeps_existing_file() {
    let temp_dir = tempdir().unwrap();
    let image_path = temp_dir.path().join("content.img");
    fs::write(&image_path, b"previous image").unwrap();
    let config = ImageConfig {
        data_size: 512,
        data_content: Some(vec![2u8; 513]),
        ..ImageConfig::new(&image_path)
    };

    let err = build_disk_image(&config).unwrap_err();
    assert!(matches!(
        err,
        Error::Layout(LayoutError::ContentTooLarge { name: "data", len: 513, capacity: 512 })
    ));
    assert_eq!(fs::read(&image_path).unwrap(), b"previous image");
}

#[test]
fn test_unopenable_path_reports_open_stage() {
    let temp_dir = tempdir().unwrap();
    let image_path = temp_dir.path().join("missing_dir").join("disk.img");

    let err = build_disk_image(&ImageConfig::new(&image_path)).unwrap_err();
    assert_eq!(err.stage(), Some(Stage::Open));
    assert!(err.to_string().starts_with("opening the image file failed"));
}
