//! Build raw GPT disk images: a protective MBR, the primary GPT, an EFI System
//! Partition, a data partition and the backup GPT at the end of the image.

pub mod builder;
pub mod config;
pub mod crc;
pub mod error;
pub mod gpt;
pub mod guid;
pub mod image;
pub mod layout;
pub mod mbr;
pub mod utils;

pub use builder::{BuildReport, build_disk_image};
pub use config::{DataPartitionType, ImageConfig};
pub use error::{Error, LayoutError, Result, Stage};
pub use gpt::{GptStructures, build_gpt};
pub use guid::{Guid, new_guid};
pub use image::{PartitionContents, write_image, write_image_to};
pub use layout::DiskGeometry;
pub use mbr::{Mbr, build_mbr};
