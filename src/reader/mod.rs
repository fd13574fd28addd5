//! PDF text extraction.

mod layout;
mod options;
mod pdf_reader;

pub use layout::{group_spans_into_lines, lines_to_text, LayoutAnalyzer, TextLine, TextSpan};
pub use options::{ErrorMode, PageSelection, ReadOptions};
pub use pdf_reader::PdfReader;
