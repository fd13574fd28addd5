//! # txtpdf
//!
//! Render plain text onto a single PDF page, and read the text of PDF
//! documents back out.
//!
//! ## Quick Start
//!
//! ```no_run
//! fn main() -> txtpdf::Result<()> {
//!     // One input line per output line, 12pt Helvetica on a Letter page
//!     let lines = txtpdf::generate_pdf("notes.txt", "notes.pdf")?;
//!     println!("wrote {} lines", lines);
//!
//!     // Every page's text, each followed by a newline
//!     let text = txtpdf::extract_text("notes.pdf")?;
//!     print!("{}", text);
//!     Ok(())
//! }
//! ```
//!
//! The writer neither wraps nor paginates. The reader reconstructs lines from
//! text positions, so the output follows the page layout rather than the
//! order operators appear in the content stream.

pub mod detect;
pub mod error;
pub mod model;
pub mod reader;
pub mod writer;

// Re-export commonly used types
pub use detect::{detect_header_from_bytes, detect_header_from_path, is_pdf, PdfHeader};
pub use error::{Error, Result};
pub use model::{ExtractedText, PageText};
pub use reader::{ErrorMode, PageSelection, PdfReader, ReadOptions};
pub use writer::{read_lines, PageSize, StandardFont, TextPdfWriter, WriteOptions};

use std::path::Path;

/// Render a text file onto a single-page PDF with default options.
///
/// Returns the number of lines written.
///
/// # Example
///
/// ```no_run
/// let count = txtpdf::generate_pdf("input.txt", "output.pdf").unwrap();
/// ```
pub fn generate_pdf<P: AsRef<Path>, Q: AsRef<Path>>(input: P, output: Q) -> Result<usize> {
    generate_pdf_with_options(input, output, WriteOptions::default())
}

/// Render a text file onto a single-page PDF.
///
/// The input is read in full before the output file is created, so an
/// unreadable input never leaves an output file behind.
///
/// # Example
///
/// ```no_run
/// use txtpdf::{generate_pdf_with_options, PageSize, StandardFont, WriteOptions};
///
/// let options = WriteOptions::new()
///     .with_page_size(PageSize::A4)
///     .with_font(StandardFont::Courier)
///     .with_font_size(10.0);
/// generate_pdf_with_options("input.txt", "output.pdf", options).unwrap();
/// ```
pub fn generate_pdf_with_options<P: AsRef<Path>, Q: AsRef<Path>>(
    input: P,
    output: Q,
    options: WriteOptions,
) -> Result<usize> {
    let lines = read_lines(input)?;
    TextPdfWriter::new(options).save(&lines, output)?;
    Ok(lines.len())
}

/// Extract the text of every page, each page followed by a newline.
///
/// Fails with [`Error::NoText`] if any page has no extractable text.
///
/// # Example
///
/// ```no_run
/// let text = txtpdf::extract_text("document.pdf").unwrap();
/// print!("{}", text);
/// ```
pub fn extract_text<P: AsRef<Path>>(path: P) -> Result<String> {
    extract_text_with_options(path, ReadOptions::default())
}

/// Extract text with custom options.
///
/// # Example
///
/// ```no_run
/// use txtpdf::{extract_text_with_options, PageSelection, ReadOptions};
///
/// let options = ReadOptions::new()
///     .lenient()
///     .with_pages(PageSelection::Range(1..=3));
/// let text = extract_text_with_options("document.pdf", options).unwrap();
/// ```
pub fn extract_text_with_options<P: AsRef<Path>>(path: P, options: ReadOptions) -> Result<String> {
    let reader = PdfReader::open_with_options(path, options)?;
    Ok(reader.extract()?.to_text())
}
