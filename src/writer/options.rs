//! Page and font configuration for the text writer.

use crate::error::{Error, Result};

/// Standard page sizes, in PostScript points.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum PageSize {
    /// US Letter, 8.5 x 11 in
    #[default]
    Letter,
    /// ISO A4, 210 x 297 mm
    A4,
    /// US Legal, 8.5 x 14 in
    Legal,
    /// Arbitrary width and height
    Custom(f32, f32),
}

impl PageSize {
    /// Width and height in points.
    pub fn dimensions(&self) -> (f32, f32) {
        match *self {
            PageSize::Letter => (612.0, 792.0),
            PageSize::A4 => (595.2756, 841.8898),
            PageSize::Legal => (612.0, 1008.0),
            PageSize::Custom(width, height) => (width, height),
        }
    }
}

/// The Type1 fonts every PDF viewer is required to provide.
///
/// Only the Latin text faces are offered; Symbol and ZapfDingbats do not use
/// WinAnsi encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StandardFont {
    #[default]
    Helvetica,
    HelveticaBold,
    HelveticaOblique,
    Courier,
    CourierBold,
    TimesRoman,
    TimesBold,
    TimesItalic,
}

impl StandardFont {
    /// PostScript name used as the font's `/BaseFont`.
    pub fn base_font(&self) -> &'static str {
        match self {
            StandardFont::Helvetica => "Helvetica",
            StandardFont::HelveticaBold => "Helvetica-Bold",
            StandardFont::HelveticaOblique => "Helvetica-Oblique",
            StandardFont::Courier => "Courier",
            StandardFont::CourierBold => "Courier-Bold",
            StandardFont::TimesRoman => "Times-Roman",
            StandardFont::TimesBold => "Times-Bold",
            StandardFont::TimesItalic => "Times-Italic",
        }
    }
}

/// Options for rendering text onto a PDF page.
#[derive(Debug, Clone)]
pub struct WriteOptions {
    /// Page size
    pub page_size: PageSize,

    /// Font used for every line
    pub font: StandardFont,

    /// Font size in points
    pub font_size: f32,

    /// Distance of the first baseline from the top-left corner, in points
    pub margin: f32,

    /// Baseline-to-baseline distance (defaults to 1.2 x font size)
    pub leading: Option<f32>,

    /// Document title written to the info dictionary
    pub title: Option<String>,
}

impl WriteOptions {
    /// Create new write options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the page size.
    pub fn with_page_size(mut self, page_size: PageSize) -> Self {
        self.page_size = page_size;
        self
    }

    /// Set the font.
    pub fn with_font(mut self, font: StandardFont) -> Self {
        self.font = font;
        self
    }

    /// Set the font size in points.
    pub fn with_font_size(mut self, size: f32) -> Self {
        self.font_size = size;
        self
    }

    /// Set the margin in points.
    pub fn with_margin(mut self, margin: f32) -> Self {
        self.margin = margin;
        self
    }

    /// Set an explicit leading in points.
    pub fn with_leading(mut self, leading: f32) -> Self {
        self.leading = Some(leading);
        self
    }

    /// Set the document title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Effective leading.
    pub fn line_leading(&self) -> f32 {
        self.leading.unwrap_or(self.font_size * 1.2)
    }

    /// Position of the first baseline, measured from the bottom-left corner.
    pub fn text_origin(&self) -> (f32, f32) {
        let (_, height) = self.page_size.dimensions();
        (self.margin, height - self.margin)
    }

    /// Reject values that would produce an unusable page.
    pub fn validate(&self) -> Result<()> {
        let (width, height) = self.page_size.dimensions();
        if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
            return Err(Error::InvalidOption(format!(
                "page size must be positive, got {}x{}",
                width, height
            )));
        }
        if !(self.font_size.is_finite() && self.font_size > 0.0) {
            return Err(Error::InvalidOption(format!(
                "font size must be positive, got {}",
                self.font_size
            )));
        }
        if !(self.margin.is_finite() && self.margin >= 0.0) {
            return Err(Error::InvalidOption(format!(
                "margin must not be negative, got {}",
                self.margin
            )));
        }
        let leading = self.line_leading();
        if !(leading.is_finite() && leading > 0.0) {
            return Err(Error::InvalidOption(format!(
                "leading must be positive, got {}",
                leading
            )));
        }
        Ok(())
    }
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            page_size: PageSize::Letter,
            font: StandardFont::Helvetica,
            font_size: 12.0,
            margin: 40.0,
            leading: None,
            title: None,
        }
    }
}
