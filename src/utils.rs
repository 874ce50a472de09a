// gptbemak/src/utils.rs

use std::{
    fs::File,
    io::{self, Read, Seek, Write},
    path::Path,
};

/// Number of `lba_size` sectors needed to hold `bytes`. A partially filled
/// final sector counts as a whole one.
pub fn bytes_to_lbas(bytes: u64, lba_size: u64) -> u64 {
    bytes.div_ceil(lba_size)
}

/// Reads the entire file from a specified path and returns its content.
pub fn read_file_from_path(file_path: &Path) -> io::Result<Vec<u8>> {
    let mut file = File::open(file_path)?;
    let mut content = Vec::new();
    file.read_to_end(&mut content)?;
    Ok(content)
}

/// Writes zeros from the current position up to the start of `lba`.
pub fn pad_to_lba<W: Write + Seek>(writer: &mut W, lba: u64, lba_size: u64) -> io::Result<()> {
    let target_pos = lba * lba_size;
    let current_pos = writer.stream_position()?;
    if current_pos < target_pos {
        let padding_bytes = target_pos - current_pos;
        io::copy(&mut io::repeat(0).take(padding_bytes), writer)?;
    } else if current_pos > target_pos {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("already past LBA {lba} (at byte {current_pos})"),
        ));
    }
    Ok(())
}

/// Writes `bytes` followed by zeros up to a whole number of sectors.
pub fn write_padded<W: Write>(writer: &mut W, bytes: &[u8], lba_size: u64) -> io::Result<()> {
    writer.write_all(bytes)?;
    let len = bytes.len() as u64;
    let padding = bytes_to_lbas(len, lba_size) * lba_size - len;
    io::copy(&mut io::repeat(0).take(padding), writer)?;
    Ok(())
}
