//! BCM CLI - BWT-based file compressor
//!
//! Compresses a single file into the `.bcm` stream format, or restores one.

use bcm_codec::{Level, compress, decompress};
use clap::Parser;
use dialoguer::Confirm;
use filetime::FileTime;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::Instant;

#[derive(Parser)]
#[command(name = "bcm")]
#[command(author, version, about = "BWT-based file compressor")]
#[command(long_about = "
BCM compresses one file at a time: a Burrows-Wheeler transform over
fixed-size blocks followed by a context-mixing arithmetic coder, with a
CRC-32 of the original data checked on decompression.

Examples:
  bcm file.txt                  compress to file.txt.bcm
  bcm -l 8 big.iso              compress with 256 MB blocks
  bcm -d file.txt.bcm           restore file.txt
  bcm -d -f archive.bcm out     restore to an explicit name, overwriting
")]
struct Cli {
    /// Decompress instead of compress
    #[arg(short, long)]
    decompress: bool,

    /// Block size level: 1 = 1 MB blocks up to 9 = 2 GB blocks
    #[arg(short, long, default_value_t = 4, value_parser = clap::value_parser!(u8).range(1..=9))]
    level: u8,

    /// Force overwrite of the output file without asking
    #[arg(short, long)]
    force: bool,

    /// Mirror the input's modification time onto the output
    #[arg(short = 't', long)]
    preserve_timestamps: bool,

    /// Suppress the progress bar
    #[arg(short, long)]
    quiet: bool,

    /// File to compress or decompress
    input: PathBuf,

    /// Output file (derived from the input when omitted)
    output: Option<PathBuf>,
}

/// Derive the output name: append `.bcm` when compressing; strip it when
/// decompressing, falling back to `.out` for inputs without the suffix.
fn default_output(input: &Path, decompressing: bool) -> PathBuf {
    if decompressing {
        if input.extension().is_some_and(|ext| ext == "bcm") {
            input.with_extension("")
        } else {
            append_suffix(input, ".out")
        }
    } else {
        append_suffix(input, ".bcm")
    }
}

fn append_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(suffix);
    PathBuf::from(name)
}

/// Create a progress bar with standard styling.
fn create_progress_bar(len: u64, enable: bool) -> ProgressBar {
    if !enable {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new(len);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} {msg}")
            .expect("progress bar template is valid")
            .progress_chars("█▓▒░ "),
    );
    pb
}

fn run(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    let input_file =
        File::open(&cli.input).map_err(|e| format!("{}: {}", cli.input.display(), e))?;
    let metadata = input_file.metadata()?;

    let output_path = cli
        .output
        .clone()
        .unwrap_or_else(|| default_output(&cli.input, cli.decompress));

    if !cli.force && output_path.exists() {
        let overwrite = Confirm::new()
            .with_prompt(format!(
                "{} already exists. Overwrite?",
                output_path.display()
            ))
            .default(false)
            .interact()?;
        if !overwrite {
            return Err("not overwritten".into());
        }
    }

    let output_file =
        File::create(&output_path).map_err(|e| format!("{}: {}", output_path.display(), e))?;

    let pb = create_progress_bar(metadata.len(), !cli.quiet);
    pb.set_message(if cli.decompress {
        format!("decompressing {}", cli.input.display())
    } else {
        format!("compressing {}", cli.input.display())
    });
    let reader = pb.wrap_read(input_file);

    let start = Instant::now();
    let (bytes_in, bytes_out) = if cli.decompress {
        decompress(reader, output_file)?
    } else {
        let block_size = Level::new(cli.level).block_size_for(metadata.len());
        compress(reader, output_file, block_size)?
    };
    pb.finish_and_clear();

    if cli.preserve_timestamps {
        let mtime = FileTime::from_last_modification_time(&metadata);
        filetime::set_file_mtime(&output_path, mtime)?;
    }

    eprintln!(
        "{} -> {} in {:.1} sec",
        bytes_in,
        bytes_out,
        start.elapsed().as_secs_f64()
    );
    Ok(())
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(&cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
