//! Mixview CLI - inspect DDS textures and convert them to PNG.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;

use mixview_dds::{decode_header, DdsFile};

/// Mixview - DDS texture inspection and conversion tool
#[derive(Parser)]
#[command(name = "mixview")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print DDS header information
    Info {
        /// DDS files to inspect
        files: Vec<PathBuf>,
    },

    /// Convert DDS textures to PNG, one file per mipmap level
    Convert {
        /// DDS files to convert
        files: Vec<PathBuf>,

        /// Output directory
        #[arg(short, long, env = "OUTPUT_FOLDER")]
        output: PathBuf,

        /// Decode only the base level, skipping the mipmap chain
        #[arg(short, long)]
        shallow: bool,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Info { files } => {
            cmd_info(&files)?;
        }
        Commands::Convert {
            files,
            output,
            shallow,
        } => {
            cmd_convert(&files, &output, shallow)?;
        }
    }

    Ok(())
}

fn cmd_info(files: &[PathBuf]) -> Result<()> {
    for path in files {
        let data = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
        let header =
            decode_header(&data).with_context(|| format!("Failed to parse {}", path.display()))?;

        // copy out of the packed struct before formatting
        let (width, height) = (header.width, header.height);
        let (flags, caps, caps2) = (header.flags, header.caps, header.caps2);
        let four_cc = header.pixel_format.four_cc;

        println!("{}", path.display());
        println!("  {}x{} {}", width, height, four_cc);
        println!("  mip levels: {}", header.mip_count());
        println!("  flags: {flags:#x}  caps: {caps:#x}  caps2: {caps2:#x}");
    }

    Ok(())
}

fn cmd_convert(files: &[PathBuf], output: &Path, shallow: bool) -> Result<()> {
    fs::create_dir_all(output)?;

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")?
            .progress_chars("#>-"),
    );

    let errors = AtomicUsize::new(0);

    files.par_iter().for_each(|path| {
        if let Err(e) = convert_file(path, output, shallow) {
            eprintln!("Error converting {}: {:#}", path.display(), e);
            errors.fetch_add(1, Ordering::Relaxed);
        }
        pb.inc(1);
    });

    pb.finish_with_message("Done");

    let errors = errors.into_inner();
    println!("Converted {} files ({} errors)", files.len() - errors, errors);

    Ok(())
}

fn convert_file(path: &Path, output: &Path, shallow: bool) -> Result<()> {
    let dds = DdsFile::read(path, shallow)?;
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("texture");

    for (level, image) in dds.images.iter().enumerate() {
        // deep mip chains bottom out at 0x0 once dimensions halve away
        if image.width == 0 || image.height == 0 {
            continue;
        }

        let name = if level == 0 {
            format!("{stem}.png")
        } else {
            format!("{stem}.mip{level}.png")
        };

        let rgba = image::RgbaImage::from_raw(image.width, image.height, image.data.clone())
            .context("decoded buffer length mismatch")?;
        rgba.save(output.join(name))
            .context("Failed to write PNG")?;
    }

    Ok(())
}
