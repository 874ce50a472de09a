//! `gptbemak` creates a GPT disk image with an ESP and a data partition.

use std::env;
use std::fmt;
use std::path::PathBuf;
use std::process::exit;

use gptbemak::utils::read_file_from_path;
use gptbemak::{DataPartitionType, ImageConfig, build_disk_image};

const USAGE: &str = "\
Usage: gptbemak [OPTIONS]

Options:
  -o, --image-name <PATH>   output image file (default: test.img)
      --lba-size <BYTES>    sector size (default: 512)
      --esp-size <SIZE>     EFI System Partition size (default: 33M)
      --data-size <SIZE>    data partition size (default: 1M)
      --image-size <SIZE>   total image size (default: partitions + 1M)
      --data-type <TYPE>    data partition type, `basic` or `linux` (default: basic)
      --esp-content <PATH>  file copied to the start of the ESP
      --data-content <PATH> file copied to the start of the data partition
  -h, --help                print this help

SIZE is a byte count with an optional K, M or G (binary) suffix.";

/// Structure storing command line arguments.
#[derive(Default)]
struct Args {
    config: ImageConfig,
    esp_content: Option<PathBuf>,
    data_content: Option<PathBuf>,
    help: bool,
}

fn failure_message(stage: &str, msg: impl fmt::Display) -> String {
    format!("gptbemak: {stage}: {msg}")
}

/// Prints an error with the stage it comes from, then exits.
fn fail(stage: &str, msg: impl fmt::Display) -> ! {
    eprintln!("{}", failure_message(stage, msg));
    exit(1);
}

/// Parses a byte count such as `4096`, `512K`, `33M` or `2G`.
fn parse_size(s: &str) -> Result<u64, String> {
    let (digits, shift) = match s.char_indices().last() {
        Some((i, 'k' | 'K')) => (&s[..i], 10),
        Some((i, 'm' | 'M')) => (&s[..i], 20),
        Some((i, 'g' | 'G')) => (&s[..i], 30),
        _ => (s, 0),
    };
    let value: u64 = digits
        .parse()
        .map_err(|_| format!("invalid size `{s}`"))?;
    value
        .checked_mul(1 << shift)
        .ok_or_else(|| format!("size `{s}` is too large"))
}

fn parse_args<I: Iterator<Item = String>>(mut args: I) -> Result<Args, String> {
    let mut res = Args::default();
    while let Some(arg) = args.next() {
        let mut value = || {
            args.next()
                .ok_or_else(|| format!("missing value for `{arg}`"))
        };
        match arg.as_str() {
            "-h" | "--help" => res.help = true,
            "-o" | "--image-name" => res.config.image_name = PathBuf::from(value()?),
            "--lba-size" => {
                let v = value()?;
                res.config.lba_size = v.parse().map_err(|_| format!("invalid LBA size `{v}`"))?;
            }
            "--esp-size" => res.config.esp_size = parse_size(&value()?)?,
            "--data-size" => res.config.data_size = parse_size(&value()?)?,
            "--image-size" => res.config.image_size = Some(parse_size(&value()?)?),
            "--data-type" => {
                res.config.data_type = match value()?.as_str() {
                    "basic" => DataPartitionType::BasicData,
                    "linux" => DataPartitionType::LinuxFilesystem,
                    other => return Err(format!("unknown data partition type `{other}`")),
                }
            }
            "--esp-content" => res.esp_content = Some(PathBuf::from(value()?)),
            "--data-content" => res.data_content = Some(PathBuf::from(value()?)),
            _ => return Err(format!("unexpected argument `{arg}`")),
        }
    }
    Ok(res)
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = parse_args(env::args().skip(1)).unwrap_or_else(|e| {
        eprintln!("{USAGE}");
        fail("parsing arguments", e);
    });
    if args.help {
        println!("{USAGE}");
        return;
    }

    let mut config = args.config;
    if let Some(path) = &args.esp_content {
        config.esp_content = Some(read_file_from_path(path).unwrap_or_else(|e| {
            fail("reading ESP contents", format_args!("{}: {e}", path.display()));
        }));
    }
    if let Some(path) = &args.data_content {
        config.data_content = Some(read_file_from_path(path).unwrap_or_else(|e| {
            fail("reading data contents", format_args!("{}: {e}", path.display()));
        }));
    }

    match build_disk_image(&config) {
        Ok(report) => {
            println!(
                "{}: {} LBAs of {} bytes, disk GUID {}",
                config.image_name.display(),
                report.geometry.image_size_lbas,
                report.geometry.lba_size,
                report.disk_guid
            );
            println!("  ESP:  LBA {}..={}", report.esp_lbas.0, report.esp_lbas.1);
            println!("  data: LBA {}..={}", report.data_lbas.0, report.data_lbas.1);
        }
        Err(e) => fail(&config.image_name.display().to_string(), e),
    }
}
