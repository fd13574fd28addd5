//! PDF header sniffing.
//!
//! `lopdf` reports a fairly opaque parse error when handed something that is
//! not a PDF at all, so the reader checks the `%PDF-x.y` header first and
//! fails with [`Error::UnknownFormat`] instead.

use crate::error::{Error, Result};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// PDF magic bytes: %PDF-
const PDF_MAGIC: &[u8] = b"%PDF-";
const VERSION_LEN: usize = 3; // e.g., "1.7"
const HEADER_LEN: usize = 16;

/// Header information of a PDF file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfHeader {
    /// PDF version (e.g., "1.4", "2.0")
    pub version: String,
}

impl std::fmt::Display for PdfHeader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PDF {}", self.version)
    }
}

/// Read the header of the file at `path`.
///
/// Files shorter than a PDF header are reported as [`Error::UnknownFormat`],
/// missing files as [`Error::Io`].
pub fn detect_header_from_path<P: AsRef<Path>>(path: P) -> Result<PdfHeader> {
    let file = File::open(path)?;
    let mut header = Vec::with_capacity(HEADER_LEN);
    file.take(HEADER_LEN as u64).read_to_end(&mut header)?;
    detect_header_from_bytes(&header)
}

/// Parse the header from the first bytes of a file.
pub fn detect_header_from_bytes(data: &[u8]) -> Result<PdfHeader> {
    if data.len() < PDF_MAGIC.len() + VERSION_LEN || !data.starts_with(PDF_MAGIC) {
        return Err(Error::UnknownFormat);
    }

    let version_bytes = &data[PDF_MAGIC.len()..PDF_MAGIC.len() + VERSION_LEN];
    let version = String::from_utf8_lossy(version_bytes).to_string();

    if !is_valid_version(&version) {
        return Err(Error::UnsupportedVersion(version));
    }

    Ok(PdfHeader { version })
}

fn is_valid_version(version: &str) -> bool {
    matches!(
        version.as_bytes(),
        [major, b'.', minor] if major.is_ascii_digit() && minor.is_ascii_digit()
    )
}

/// Check whether the file at `path` starts with a PDF header.
pub fn is_pdf<P: AsRef<Path>>(path: P) -> bool {
    detect_header_from_path(path).is_ok()
}

/// Check whether `data` starts with a PDF header.
pub fn is_pdf_bytes(data: &[u8]) -> bool {
    detect_header_from_bytes(data).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_detect_valid_header() {
        let data = b"%PDF-1.4\n%\xe2\xe3\xcf\xd3";
        let header = detect_header_from_bytes(data).unwrap();
        assert_eq!(header.version, "1.4");
        assert_eq!(header.to_string(), "PDF 1.4");
    }

    #[test]
    fn test_detect_plain_text() {
        let result = detect_header_from_bytes(b"Hello\nWorld\n");
        assert!(matches!(result, Err(Error::UnknownFormat)));
    }

    #[test]
    fn test_detect_too_short() {
        assert!(matches!(
            detect_header_from_bytes(b"%PDF"),
            Err(Error::UnknownFormat)
        ));
        assert!(matches!(
            detect_header_from_bytes(b""),
            Err(Error::UnknownFormat)
        ));
    }

    #[test]
    fn test_detect_bad_version() {
        let result = detect_header_from_bytes(b"%PDF-x.y\n");
        assert!(matches!(result, Err(Error::UnsupportedVersion(v)) if v == "x.y"));
    }

    #[test]
    fn test_detect_short_file_is_unknown_format() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"%P").unwrap();
        assert!(matches!(
            detect_header_from_path(file.path()),
            Err(Error::UnknownFormat)
        ));
    }

    #[test]
    fn test_detect_missing_file_is_io() {
        let result = detect_header_from_path("/definitely/not/here.pdf");
        assert!(matches!(result, Err(Error::Io(_))));
        assert!(!is_pdf("/definitely/not/here.pdf"));
    }

    #[test]
    fn test_is_pdf_bytes() {
        assert!(is_pdf_bytes(b"%PDF-2.0\n"));
        assert!(!is_pdf_bytes(b"Not a PDF"));
    }
}
