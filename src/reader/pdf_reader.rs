//! PDF text reader using lopdf.

use std::io::Read;
use std::path::Path;

use lopdf::Document as LopdfDocument;

use crate::detect::{detect_header_from_bytes, detect_header_from_path};
use crate::error::{Error, Result};
use crate::model::ExtractedText;

use super::layout::LayoutAnalyzer;
use super::options::{ErrorMode, ReadOptions};

/// Reads the text of a PDF document page by page.
pub struct PdfReader {
    doc: LopdfDocument,
    options: ReadOptions,
}

impl PdfReader {
    /// Open a PDF file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with_options(path, ReadOptions::default())
    }

    /// Open a PDF file with custom options.
    pub fn open_with_options<P: AsRef<Path>>(path: P, options: ReadOptions) -> Result<Self> {
        let path = path.as_ref();
        let header = detect_header_from_path(path)?;
        log::debug!("{}: {}", path.display(), header);

        let doc = LopdfDocument::load(path)?;
        Self::with_document(doc, options)
    }

    /// Read a PDF from bytes.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        Self::from_bytes_with_options(data, ReadOptions::default())
    }

    /// Read a PDF from bytes with custom options.
    pub fn from_bytes_with_options(data: &[u8], options: ReadOptions) -> Result<Self> {
        detect_header_from_bytes(data)?;
        let doc = LopdfDocument::load_mem(data)?;
        Self::with_document(doc, options)
    }

    /// Read a PDF from a reader.
    pub fn from_reader<R: Read>(mut reader: R) -> Result<Self> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Self::from_bytes(&data)
    }

    fn with_document(doc: LopdfDocument, options: ReadOptions) -> Result<Self> {
        if doc.is_encrypted() {
            return Err(Error::Encrypted);
        }

        let page_count = doc.get_pages().len() as u32;
        if let Some(last) = options.pages.last_page() {
            if last > page_count {
                return Err(Error::PageOutOfRange(last, page_count));
            }
        }

        Ok(Self { doc, options })
    }

    /// Number of pages in the document.
    pub fn page_count(&self) -> u32 {
        self.doc.get_pages().len() as u32
    }

    /// PDF version declared by the document.
    pub fn version(&self) -> String {
        self.doc.version.to_string()
    }

    /// Reconstruct the text of one page (1-indexed).
    ///
    /// Returns an empty string for a page without text; the page selection
    /// and error mode are applied by [`PdfReader::extract`].
    pub fn extract_page_text(&self, page_num: u32) -> Result<String> {
        let pages = self.doc.get_pages();
        let page_id = pages
            .get(&page_num)
            .ok_or(Error::PageOutOfRange(page_num, pages.len() as u32))?;

        LayoutAnalyzer::new(&self.doc).page_text(*page_id)
    }

    /// Extract the selected pages in document order.
    ///
    /// In [`ErrorMode::Strict`] a page without any text fails the whole
    /// extraction with [`Error::NoText`].
    pub fn extract(&self) -> Result<ExtractedText> {
        let mut extracted = ExtractedText::new();

        for page_num in self.doc.get_pages().into_keys() {
            if !self.options.pages.includes(page_num) {
                continue;
            }

            let text = self.extract_page_text(page_num)?;
            if text.trim().is_empty() {
                match self.options.error_mode {
                    ErrorMode::Strict => return Err(Error::NoText(page_num)),
                    ErrorMode::Lenient => {
                        log::warn!("Page {} has no extractable text, leaving it empty", page_num);
                    }
                }
            }
            log::debug!("Page {}: {} characters", page_num, text.len());
            extracted.add_page(page_num, text);
        }

        Ok(extracted)
    }
}
