//! Extraction results.

use serde::{Deserialize, Serialize};

/// Text of one page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageText {
    /// Page number (1-indexed)
    pub number: u32,
    /// Reconstructed text, lines separated by `\n`
    pub text: String,
}

/// Text extracted from a document, page by page in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedText {
    /// Pages that were extracted
    pub pages: Vec<PageText>,
}

impl ExtractedText {
    /// Create an empty result.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a page.
    pub fn add_page(&mut self, number: u32, text: impl Into<String>) {
        self.pages.push(PageText {
            number,
            text: text.into(),
        });
    }

    /// Number of extracted pages.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Whether no page was extracted.
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Concatenate every page's text, each followed by a newline.
    pub fn to_text(&self) -> String {
        let mut out = String::with_capacity(self.pages.iter().map(|p| p.text.len() + 1).sum());
        for page in &self.pages {
            out.push_str(&page.text);
            out.push('\n');
        }
        out
    }

    /// Pretty-printed JSON.
    pub fn to_json(&self) -> crate::Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| crate::Error::Other(e.to_string()))
    }
}
