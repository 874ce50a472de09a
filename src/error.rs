// gptbemak/src/error.rs

use std::{fmt, io};
use thiserror::Error;

/// Result type used across the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Any failure of an image build.
#[derive(Debug, Error)]
pub enum Error {
    /// The requested geometry cannot hold the GPT structures or the partitions.
    /// Always detected before the output file is touched.
    #[error("layout validation failed: {0}")]
    Layout(#[from] LayoutError),
    /// An I/O operation failed while producing the image.
    #[error("{stage} failed: {source}")]
    Io {
        stage: Stage,
        #[source]
        source: io::Error,
    },
}

impl Error {
    pub(crate) fn io(stage: Stage) -> impl FnOnce(io::Error) -> Self {
        move |source| Error::Io { stage, source }
    }

    /// The stage that failed, for I/O errors.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            Error::Layout(_) => None,
            Error::Io { stage, .. } => Some(*stage),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LayoutError {
    #[error("invalid LBA size {0}: must be a power of two no smaller than 512")]
    InvalidLbaSize(u64),
    #[error("the {name} partition is empty")]
    EmptyPartition { name: &'static str },
    #[error("image size overflows a 64-bit byte count")]
    SizeOverflow,
    #[error("image of {image_lbas} LBAs is smaller than the {required_lbas} LBAs required")]
    ImageTooSmall { image_lbas: u64, required_lbas: u64 },
    #[error("partitions end at LBA {end_lba}, past the last usable LBA {last_usable_lba}")]
    PartitionsExceedUsable { end_lba: u64, last_usable_lba: u64 },
    #[error("{name} contents of {len} bytes do not fit in a {capacity}-byte partition")]
    ContentTooLarge {
        name: &'static str,
        len: u64,
        capacity: u64,
    },
}

/// Step of the image assembly an I/O error is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Open,
    Mbr,
    PrimaryHeader,
    PrimaryTable,
    EspContents,
    DataContents,
    Padding,
    BackupTable,
    BackupHeader,
    Flush,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Open => "opening the image file",
            Stage::Mbr => "writing the protective MBR",
            Stage::PrimaryHeader => "writing the primary GPT header",
            Stage::PrimaryTable => "writing the primary partition table",
            Stage::EspContents => "writing the ESP contents",
            Stage::DataContents => "writing the data partition contents",
            Stage::Padding => "zero-padding the image",
            Stage::BackupTable => "writing the backup partition table",
            Stage::BackupHeader => "writing the backup GPT header",
            Stage::Flush => "flushing the image file",
        };
        f.write_str(name)
    }
}
