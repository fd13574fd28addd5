//! Reading options and page selection.

use std::ops::RangeInclusive;

use crate::error::{Error, Result};

/// Options for extracting text from a PDF.
#[derive(Debug, Clone, Default)]
pub struct ReadOptions {
    /// What to do with pages that yield no text
    pub error_mode: ErrorMode,

    /// Which pages to extract
    pub pages: PageSelection,
}

impl ReadOptions {
    /// Create new read options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set error mode.
    pub fn with_error_mode(mut self, mode: ErrorMode) -> Self {
        self.error_mode = mode;
        self
    }

    /// Treat pages without text as empty instead of failing.
    pub fn lenient(mut self) -> Self {
        self.error_mode = ErrorMode::Lenient;
        self
    }

    /// Set page selection.
    pub fn with_pages(mut self, pages: PageSelection) -> Self {
        self.pages = pages;
        self
    }
}

/// Handling of pages that produce no text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorMode {
    /// A page without text fails the whole extraction
    #[default]
    Strict,
    /// A page without text contributes an empty string
    Lenient,
}

/// Page selection for extraction (1-indexed).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PageSelection {
    /// Every page
    #[default]
    All,
    /// An inclusive range of pages
    Range(RangeInclusive<u32>),
    /// Specific pages, sorted and deduplicated
    Pages(Vec<u32>),
}

impl PageSelection {
    /// Check if a page number should be included.
    pub fn includes(&self, page: u32) -> bool {
        match self {
            PageSelection::All => true,
            PageSelection::Range(range) => range.contains(&page),
            PageSelection::Pages(pages) => pages.binary_search(&page).is_ok(),
        }
    }

    /// Highest page number the selection names, if it names any.
    pub fn last_page(&self) -> Option<u32> {
        match self {
            PageSelection::All => None,
            PageSelection::Range(range) => Some(*range.end()),
            PageSelection::Pages(pages) => pages.last().copied(),
        }
    }

    /// Parse a page selection string (e.g., "all", "2-4", "1,3,5-7").
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();

        if s.is_empty() || s.eq_ignore_ascii_case("all") {
            return Ok(PageSelection::All);
        }

        if !s.contains(',') {
            if let Some((start, end)) = s.split_once('-') {
                let (start, end) = (parse_page(start, s)?, parse_page(end, s)?);
                if start > end {
                    return Err(Error::InvalidPageRange(s.to_string()));
                }
                return Ok(PageSelection::Range(start..=end));
            }
        }

        let mut pages = Vec::new();
        for part in s.split(',') {
            let part = part.trim();
            if let Some((start, end)) = part.split_once('-') {
                let (start, end) = (parse_page(start, s)?, parse_page(end, s)?);
                if start > end {
                    return Err(Error::InvalidPageRange(s.to_string()));
                }
                pages.extend(start..=end);
            } else {
                pages.push(parse_page(part, s)?);
            }
        }

        pages.sort_unstable();
        pages.dedup();
        Ok(PageSelection::Pages(pages))
    }
}

fn parse_page(part: &str, whole: &str) -> Result<u32> {
    match part.trim().parse::<u32>() {
        Ok(0) | Err(_) => Err(Error::InvalidPageRange(whole.to_string())),
        Ok(n) => Ok(n),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_options_builder() {
        let options = ReadOptions::new()
            .lenient()
            .with_pages(PageSelection::Range(1..=2));
        assert_eq!(options.error_mode, ErrorMode::Lenient);
        assert!(options.pages.includes(2));
        assert!(!options.pages.includes(3));
    }

    #[test]
    fn test_default_options_are_strict() {
        let options = ReadOptions::default();
        assert_eq!(options.error_mode, ErrorMode::Strict);
        assert_eq!(options.pages, PageSelection::All);
    }

    #[test]
    fn test_page_selection_includes() {
        let all = PageSelection::All;
        assert!(all.includes(1));
        assert!(all.includes(100));
        assert_eq!(all.last_page(), None);

        let range = PageSelection::Range(5..=10);
        assert!(!range.includes(4));
        assert!(range.includes(5));
        assert!(range.includes(10));
        assert!(!range.includes(11));
        assert_eq!(range.last_page(), Some(10));

        let pages = PageSelection::Pages(vec![1, 3, 5, 7]);
        assert!(pages.includes(1));
        assert!(!pages.includes(2));
        assert!(pages.includes(3));
        assert_eq!(pages.last_page(), Some(7));
    }

    #[test]
    fn test_page_selection_parse() {
        assert_eq!(PageSelection::parse("all").unwrap(), PageSelection::All);
        assert_eq!(PageSelection::parse("").unwrap(), PageSelection::All);
        assert_eq!(
            PageSelection::parse("2-4").unwrap(),
            PageSelection::Range(2..=4)
        );
        assert_eq!(
            PageSelection::parse("7, 1,3,5-7,3").unwrap(),
            PageSelection::Pages(vec![1, 3, 5, 6, 7])
        );
    }

    #[test]
    fn test_page_selection_parse_errors() {
        for bad in ["0", "x", "3-1", "1,,2", "1-", "-2"] {
            assert!(
                matches!(PageSelection::parse(bad), Err(Error::InvalidPageRange(_))),
                "{bad} should be rejected"
            );
        }
    }
}
