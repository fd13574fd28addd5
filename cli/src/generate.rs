//! generate-pdf - render a text file onto a single PDF page

use std::path::{Path, PathBuf};

use clap::error::ErrorKind;
use clap::{Parser, ValueEnum};
use colored::Colorize;

use txtpdf::{PageSize, StandardFont, WriteOptions};

const USAGE: &str = "Usage: generate-pdf <input_file> <output_file>";

#[derive(Parser)]
#[command(name = "generate-pdf")]
#[command(author = "iyulab")]
#[command(version)]
#[command(about = "Render a plain-text file onto a single PDF page", long_about = None)]
struct Cli {
    /// Input text file (UTF-8)
    #[arg(value_name = "INPUT_FILE")]
    input: PathBuf,

    /// Output PDF file
    #[arg(value_name = "OUTPUT_FILE")]
    output: PathBuf,

    /// Font size in points
    #[arg(long, default_value = "12")]
    font_size: f32,

    /// Font family
    #[arg(long, value_enum, default_value = "helvetica")]
    font: FontFamily,

    /// Page size
    #[arg(long, value_enum, default_value = "letter")]
    page_size: PaperSize,

    /// Document title stored in the PDF metadata
    #[arg(long)]
    title: Option<String>,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum FontFamily {
    /// Helvetica (sans-serif)
    Helvetica,
    /// Courier (monospace)
    Courier,
    /// Times Roman (serif)
    Times,
}

impl From<FontFamily> for StandardFont {
    fn from(family: FontFamily) -> Self {
        match family {
            FontFamily::Helvetica => StandardFont::Helvetica,
            FontFamily::Courier => StandardFont::Courier,
            FontFamily::Times => StandardFont::TimesRoman,
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum PaperSize {
    /// US Letter (8.5 x 11 in)
    Letter,
    /// ISO A4 (210 x 297 mm)
    A4,
    /// US Legal (8.5 x 14 in)
    Legal,
}

impl From<PaperSize> for PageSize {
    fn from(size: PaperSize) -> Self {
        match size {
            PaperSize::Letter => PageSize::Letter,
            PaperSize::A4 => PageSize::A4,
            PaperSize::Legal => PageSize::Legal,
        }
    }
}

fn main() {
    env_logger::init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => e.exit(),
        Err(e) => {
            log::debug!("argument error: {}", e);
            println!("{}", USAGE.yellow());
            std::process::exit(1);
        }
    };

    let mut options = WriteOptions::new()
        .with_font(cli.font.into())
        .with_font_size(cli.font_size)
        .with_page_size(cli.page_size.into());
    if let Some(title) = cli.title {
        options = options.with_title(title);
    }

    if let Err(e) = cmd_generate(&cli.input, &cli.output, options) {
        eprintln!("{}: {}", "Error generating PDF".red().bold(), e);
        std::process::exit(1);
    }
}

fn cmd_generate(
    input: &Path,
    output: &Path,
    options: WriteOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let count = txtpdf::generate_pdf_with_options(input, output, options)?;
    log::info!("{} lines from {}", count, input.display());

    println!("{} {}", "Successfully generated".green(), output.display());
    Ok(())
}
