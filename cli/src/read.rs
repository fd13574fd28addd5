//! read-pdf - print the text of every page of a PDF

use std::path::{Path, PathBuf};

use clap::error::ErrorKind;
use clap::Parser;
use colored::Colorize;

use txtpdf::{PageSelection, PdfReader, ReadOptions};

const USAGE: &str = "Usage: read-pdf <pdf_path>";

#[derive(Parser)]
#[command(name = "read-pdf")]
#[command(author = "iyulab")]
#[command(version)]
#[command(about = "Print the text of every page of a PDF", long_about = None)]
struct Cli {
    /// Input PDF file
    #[arg(value_name = "PDF_FILE")]
    input: PathBuf,

    /// Treat pages without text as empty instead of failing
    #[arg(long)]
    lenient: bool,

    /// Page range (e.g., "1-10", "1,3,5")
    #[arg(long)]
    pages: Option<String>,

    /// Print pages as JSON
    #[arg(long)]
    json: bool,
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

    if let Err(e) = cmd_read(&cli.input, cli.lenient, cli.pages.as_deref(), cli.json) {
        eprintln!("{}: {}", "Error reading PDF".red().bold(), e);
        std::process::exit(1);
    }
}

fn cmd_read(
    input: &Path,
    lenient: bool,
    pages: Option<&str>,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let page_selection = match pages {
        Some(p) => PageSelection::parse(p)?,
        None => PageSelection::All,
    };

    let mut options = ReadOptions::new().with_pages(page_selection);
    if lenient {
        options = options.lenient();
    }

    let reader = PdfReader::open_with_options(input, options)?;
    let extracted = reader.extract()?;

    if json {
        println!("{}", extracted.to_json()?);
    } else {
        println!("{}", extracted.to_text());
    }

    Ok(())
}
