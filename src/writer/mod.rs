//! Plain text to single-page PDF rendering.
//!
//! Every input line becomes one line of a single text object on one page.
//! The writer does not wrap or paginate: long lines run past the right edge
//! and long files run past the bottom of the page.

mod encoding;
mod options;
mod text_object;

pub use encoding::{encode_winansi, unicode_to_winansi, EncodedText, REPLACEMENT_BYTE};
pub use options::{PageSize, StandardFont, WriteOptions};
pub use text_object::TextObject;

use std::io::Write;
use std::path::Path;

use chrono::{DateTime, FixedOffset, Local};
use lopdf::content::Content;
use lopdf::{dictionary, Document as LopdfDocument, Object, Stream, StringFormat};

use crate::error::{Error, Result};

/// Resource name the page uses for its only font.
const FONT_RESOURCE: &str = "F1";

/// Read a UTF-8 text file into lines with trailing whitespace removed.
///
/// A final line without a newline still counts as a line; a leading byte
/// order mark is dropped.
pub fn read_lines<P: AsRef<Path>>(path: P) -> Result<Vec<String>> {
    let path = path.as_ref();
    let bytes = std::fs::read(path)?;
    let text = String::from_utf8(bytes).map_err(|e| {
        Error::Encoding(format!("{} is not valid UTF-8: {}", path.display(), e))
    })?;
    let text = text.strip_prefix('\u{FEFF}').unwrap_or(&text);
    Ok(split_lines(text))
}

/// Split text into lines, trimming trailing whitespace from each.
pub fn split_lines(text: &str) -> Vec<String> {
    text.lines().map(|line| line.trim_end().to_string()).collect()
}

/// Renders lines of text onto a single PDF page.
#[derive(Debug, Clone, Default)]
pub struct TextPdfWriter {
    options: WriteOptions,
}

impl TextPdfWriter {
    /// Create a writer with the given options.
    pub fn new(options: WriteOptions) -> Self {
        Self { options }
    }

    /// The options this writer renders with.
    pub fn options(&self) -> &WriteOptions {
        &self.options
    }

    /// Build the PDF document in memory.
    pub fn build<S: AsRef<str>>(&self, lines: &[S]) -> Result<LopdfDocument> {
        self.options.validate()?;

        let (width, height) = self.options.page_size.dimensions();
        let (x, y) = self.options.text_origin();

        let mut text = TextObject::new(x, y);
        text.set_font(FONT_RESOURCE, self.options.font_size);
        if self.options.leading.is_some() {
            text.set_leading(self.options.line_leading());
        }
        for line in lines {
            text.text_line(line.as_ref());
        }
        log::debug!(
            "Rendering {} lines in {} {}pt ({} characters replaced)",
            text.line_count(),
            self.options.font.base_font(),
            self.options.font_size,
            text.replaced_chars()
        );

        let content = Content {
            operations: text.into_operations(),
        };

        let mut doc = LopdfDocument::with_version("1.4");
        let pages_id = doc.new_object_id();

        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => Object::Name(self.options.font.base_font().as_bytes().to_vec()),
            "Encoding" => "WinAnsiEncoding",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { FONT_RESOURCE => font_id },
        });
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Real(width),
                Object::Real(height),
            ],
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![Object::Reference(page_id)],
                "Count" => Object::Integer(1),
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });

        let mut info = dictionary! {
            "Producer" => Object::string_literal(format!("txtpdf {}", env!("CARGO_PKG_VERSION"))),
            "CreationDate" => Object::string_literal(pdf_date(&DateTime::<FixedOffset>::from(Local::now()))),
        };
        if let Some(ref title) = self.options.title {
            info.set("Title", text_string(title));
        }
        let info_id = doc.add_object(info);

        doc.trailer.set("Root", catalog_id);
        doc.trailer.set("Info", info_id);
        doc.compress();

        Ok(doc)
    }

    /// Render `lines` and write the PDF to `writer`.
    pub fn write_to<S: AsRef<str>, W: Write>(&self, lines: &[S], writer: &mut W) -> Result<()> {
        let mut doc = self.build(lines)?;
        doc.save_to(writer)?;
        Ok(())
    }

    /// Render `lines` and save the PDF at `path`.
    ///
    /// The document is built completely before the file is created.
    pub fn save<S: AsRef<str>, P: AsRef<Path>>(&self, lines: &[S], path: P) -> Result<()> {
        let mut doc = self.build(lines)?;
        doc.save(path.as_ref())?;
        log::info!("Wrote {}", path.as_ref().display());
        Ok(())
    }
}

/// Format a timestamp as a PDF date string, e.g. `D:20240131120000+09'00'`.
pub fn pdf_date(dt: &DateTime<FixedOffset>) -> String {
    let offset = dt.offset().local_minus_utc();
    let sign = if offset < 0 { '-' } else { '+' };
    let minutes = offset.abs() / 60;
    format!(
        "{}{}{:02}'{:02}'",
        dt.format("D:%Y%m%d%H%M%S"),
        sign,
        minutes / 60,
        minutes % 60
    )
}

/// Encode an info-dictionary text string, using UTF-16BE for non-ASCII text.
fn text_string(s: &str) -> Object {
    if s.is_ascii() {
        return Object::string_literal(s);
    }
    let mut bytes = vec![0xFE, 0xFF];
    for unit in s.encode_utf16() {
        bytes.extend_from_slice(&unit.to_be_bytes());
    }
    Object::String(bytes, StringFormat::Hexadecimal)
}
