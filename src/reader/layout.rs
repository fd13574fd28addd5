//! Page text reconstruction from positioned text runs.
//!
//! Content-stream text operators are replayed against a text matrix to find
//! where each string lands on the page. The resulting spans are grouped into
//! lines by baseline and read top-to-bottom, left-to-right.

use std::collections::BTreeMap;

use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document as LopdfDocument, Object, ObjectId};

use crate::error::{Error, Result};

/// A run of text drawn by one show operator.
#[derive(Debug, Clone)]
pub struct TextSpan {
    /// The decoded text
    pub text: String,
    /// X position of the run's origin
    pub x: f32,
    /// Y position of the baseline
    pub y: f32,
    /// Estimated advance width of the run
    pub width: f32,
    /// Font size after text and graphics scaling
    pub font_size: f32,
}

impl TextSpan {
    /// Create a span, estimating its width at half an em per character.
    pub fn new(text: String, x: f32, y: f32, font_size: f32) -> Self {
        let width = text.chars().count() as f32 * font_size * 0.5;
        Self {
            text,
            x,
            y,
            width,
            font_size,
        }
    }
}

/// Spans that share a baseline.
#[derive(Debug, Clone)]
pub struct TextLine {
    /// Spans sorted by X position
    pub spans: Vec<TextSpan>,
    /// Baseline of the first span
    pub y: f32,
}

impl TextLine {
    /// Build a line from spans, sorting them left to right.
    pub fn from_spans(mut spans: Vec<TextSpan>) -> Self {
        spans.sort_by(|a, b| a.x.partial_cmp(&b.x).unwrap_or(std::cmp::Ordering::Equal));
        let y = spans.first().map(|s| s.y).unwrap_or(0.0);
        Self { spans, y }
    }

    /// Text of the line, with a space wherever two spans leave a visible gap.
    pub fn text(&self) -> String {
        let mut result = String::new();
        let mut prev: Option<&TextSpan> = None;

        for span in &self.spans {
            if let Some(prev) = prev {
                let gap = span.x - (prev.x + prev.width);
                let threshold = span.font_size * 0.1;
                let needs_space = gap > threshold
                    && !result.ends_with(char::is_whitespace)
                    && !span.text.starts_with(char::is_whitespace)
                    && !(ends_spaceless(&result) && starts_spaceless(&span.text));
                if needs_space {
                    result.push(' ');
                }
            }
            result.push_str(&span.text);
            prev = Some(span);
        }

        result
    }
}

/// Group spans into lines, top of the page first.
///
/// Spans whose baselines lie within 30% of the font size of the line's first
/// span belong to that line.
pub fn group_spans_into_lines(mut spans: Vec<TextSpan>) -> Vec<TextLine> {
    spans.sort_by(|a, b| {
        b.y.partial_cmp(&a.y)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.x.partial_cmp(&b.x).unwrap_or(std::cmp::Ordering::Equal))
    });

    let mut lines = Vec::new();
    let mut current: Vec<TextSpan> = Vec::new();
    let mut current_y: Option<f32> = None;

    for span in spans {
        let tolerance = span.font_size.abs() * 0.3;
        match current_y {
            Some(y) if (span.y - y).abs() <= tolerance => current.push(span),
            _ => {
                if !current.is_empty() {
                    lines.push(TextLine::from_spans(std::mem::take(&mut current)));
                }
                current_y = Some(span.y);
                current.push(span);
            }
        }
    }
    if !current.is_empty() {
        lines.push(TextLine::from_spans(current));
    }

    lines
}

/// Join lines into page text.
pub fn lines_to_text(lines: &[TextLine]) -> String {
    lines
        .iter()
        .map(TextLine::text)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Extracts positioned text spans from the pages of a document.
pub struct LayoutAnalyzer<'a> {
    doc: &'a LopdfDocument,
}

impl<'a> LayoutAnalyzer<'a> {
    /// Create a new layout analyzer.
    pub fn new(doc: &'a LopdfDocument) -> Self {
        Self { doc }
    }

    /// Reconstruct the plain text of a page.
    pub fn page_text(&self, page_id: ObjectId) -> Result<String> {
        let spans = self.page_spans(page_id)?;
        log::debug!("Page {:?}: {} text spans", page_id, spans.len());
        Ok(lines_to_text(&group_spans_into_lines(spans)))
    }

    /// Collect the text spans drawn on a page, including those drawn by
    /// Form XObjects.
    pub fn page_spans(&self, page_id: ObjectId) -> Result<Vec<TextSpan>> {
        let fonts = self
            .doc
            .get_page_fonts(page_id)
            .map_err(|e| Error::PdfParse(e.to_string()))?;
        let resources = self.page_resources(page_id);
        let content = self.page_content(page_id)?;
        let content = Content::decode(&content)
            .map_err(|e| Error::Corrupted(format!("content stream: {}", e)))?;

        let mut state = TextState::default();
        let mut spans = Vec::new();
        self.replay(&content.operations, &fonts, resources, &mut state, &mut spans, 0);

        Ok(spans)
    }

    fn replay(
        &self,
        operations: &[Operation],
        fonts: &BTreeMap<Vec<u8>, &'a Dictionary>,
        resources: Option<&'a Dictionary>,
        state: &mut TextState,
        spans: &mut Vec<TextSpan>,
        depth: usize,
    ) {
        for op in operations {
            let operands = &op.operands;
            match op.operator.as_str() {
                "q" => state.save(),
                "Q" => state.restore(),
                "cm" => {
                    if let Some(m) = Matrix::from_operands(operands) {
                        state.ctm = m.multiply(&state.ctm);
                    }
                }
                "Do" => {
                    if let Some(Object::Name(name)) = operands.first() {
                        self.replay_form(name, fonts, resources, state, spans, depth);
                    }
                }
                "BT" => state.begin_text(),
                "Tf" => {
                    if let (Some(Object::Name(name)), Some(size)) =
                        (operands.first(), operands.get(1).and_then(number))
                    {
                        state.font = name.clone();
                        state.font_size = size;
                    }
                }
                "TL" => {
                    if let Some(leading) = operands.first().and_then(number) {
                        state.leading = leading;
                    }
                }
                "Td" | "TD" => {
                    if let (Some(tx), Some(ty)) = (
                        operands.first().and_then(number),
                        operands.get(1).and_then(number),
                    ) {
                        if op.operator == "TD" {
                            state.leading = -ty;
                        }
                        state.move_line(tx, ty);
                    }
                }
                "Tm" => {
                    if let Some(m) = Matrix::from_operands(operands) {
                        state.line_matrix = m;
                        state.text_matrix = m;
                    }
                }
                "T*" => state.next_line(),
                "Tj" => {
                    if let Some(Object::String(bytes, _)) = operands.first() {
                        let text = self.decode(fonts, &state.font, bytes);
                        state.show(text, spans);
                    }
                }
                "TJ" => {
                    if let Some(Object::Array(items)) = operands.first() {
                        let text = self.decode_array(fonts, &state.font, items);
                        state.show(text, spans);
                    }
                }
                "'" => {
                    state.next_line();
                    if let Some(Object::String(bytes, _)) = operands.first() {
                        let text = self.decode(fonts, &state.font, bytes);
                        state.show(text, spans);
                    }
                }
                "\"" => {
                    state.next_line();
                    if let Some(Object::String(bytes, _)) = operands.get(2) {
                        let text = self.decode(fonts, &state.font, bytes);
                        state.show(text, spans);
                    }
                }
                _ => {}
            }
        }
    }

    /// Replay a Form XObject's content in its own graphics state. Image and
    /// unknown XObjects draw no text and are skipped.
    fn replay_form(
        &self,
        name: &[u8],
        fonts: &BTreeMap<Vec<u8>, &'a Dictionary>,
        resources: Option<&'a Dictionary>,
        state: &mut TextState,
        spans: &mut Vec<TextSpan>,
        depth: usize,
    ) {
        const MAX_FORM_DEPTH: usize = 8;

        let label = String::from_utf8_lossy(name);
        if depth >= MAX_FORM_DEPTH {
            log::warn!("XObject /{} nested too deeply, skipped", label);
            return;
        }

        let stream = match resources
            .and_then(|res| res.get(b"XObject").ok())
            .and_then(|obj| self.resolve_dict(obj))
            .and_then(|xobjects| xobjects.get(name).ok())
            .and_then(|obj| self.resolve(obj))
            .and_then(|obj| obj.as_stream().ok())
        {
            Some(stream) => stream,
            None => {
                log::debug!("XObject /{} not found in resources", label);
                return;
            }
        };

        let subtype = stream.dict.get(b"Subtype").and_then(|o| o.as_name()).ok();
        if subtype != Some(&b"Form"[..]) {
            return;
        }

        let data = stream
            .decompressed_content()
            .unwrap_or_else(|_| stream.content.clone());
        let content = match Content::decode(&data) {
            Ok(content) => content,
            Err(e) => {
                log::warn!("XObject /{}: undecodable content stream: {}", label, e);
                return;
            }
        };

        let form_resources = stream
            .dict
            .get(b"Resources")
            .ok()
            .and_then(|obj| self.resolve_dict(obj));
        let form_fonts = form_resources.and_then(|res| self.font_map(res));
        let fonts = form_fonts.as_ref().unwrap_or(fonts);
        let resources = form_resources
            .filter(|res| res.has(b"XObject"))
            .or(resources);

        state.save();
        if let Some(m) = stream
            .dict
            .get(b"Matrix")
            .ok()
            .and_then(|obj| obj.as_array().ok())
            .and_then(|arr| Matrix::from_operands(arr))
        {
            state.ctm = m.multiply(&state.ctm);
        }
        self.replay(&content.operations, fonts, resources, state, spans, depth + 1);
        state.restore();
    }

    /// The page's resource dictionary, inherited from the page tree if the
    /// page has none of its own.
    fn page_resources(&self, page_id: ObjectId) -> Option<&'a Dictionary> {
        const MAX_TREE_DEPTH: usize = 32;

        let mut node = self.doc.get_dictionary(page_id).ok()?;
        for _ in 0..MAX_TREE_DEPTH {
            if let Some(res) = node
                .get(b"Resources")
                .ok()
                .and_then(|obj| self.resolve_dict(obj))
            {
                return Some(res);
            }
            let parent = node.get(b"Parent").ok()?.as_reference().ok()?;
            node = self.doc.get_dictionary(parent).ok()?;
        }
        None
    }

    /// Fonts declared in a resource dictionary, keyed by resource name.
    fn font_map(&self, resources: &'a Dictionary) -> Option<BTreeMap<Vec<u8>, &'a Dictionary>> {
        let fonts = resources
            .get(b"Font")
            .ok()
            .and_then(|obj| self.resolve_dict(obj))?;
        Some(
            fonts
                .iter()
                .filter_map(|(name, obj)| Some((name.clone(), self.resolve_dict(obj)?)))
                .collect(),
        )
    }

    fn resolve(&self, obj: &'a Object) -> Option<&'a Object> {
        match obj {
            Object::Reference(id) => self.doc.get_object(*id).ok(),
            other => Some(other),
        }
    }

    fn resolve_dict(&self, obj: &'a Object) -> Option<&'a Dictionary> {
        self.resolve(obj)?.as_dict().ok()
    }

    /// Raw (decompressed) content of a page; a page without contents is empty.
    fn page_content(&self, page_id: ObjectId) -> Result<Vec<u8>> {
        let page_dict = self
            .doc
            .get_dictionary(page_id)
            .map_err(|e| Error::PdfParse(e.to_string()))?;

        let contents = match page_dict.get(b"Contents") {
            Ok(contents) => contents,
            Err(_) => return Ok(Vec::new()),
        };

        let mut content = Vec::new();
        match contents {
            Object::Reference(r) => match self.doc.get_object(*r) {
                Ok(Object::Stream(s)) => append_stream(&mut content, s),
                Ok(Object::Array(arr)) => self.append_stream_refs(&mut content, arr),
                _ => return Err(Error::PdfParse("Invalid content stream".to_string())),
            },
            Object::Array(arr) => self.append_stream_refs(&mut content, arr),
            Object::Stream(s) => append_stream(&mut content, s),
            _ => return Err(Error::PdfParse("Invalid content stream".to_string())),
        }
        Ok(content)
    }

    fn append_stream_refs(&self, content: &mut Vec<u8>, refs: &[Object]) {
        for obj in refs {
            if let Object::Reference(r) = obj {
                if let Ok(Object::Stream(s)) = self.doc.get_object(*r) {
                    append_stream(content, s);
                }
            }
        }
    }

    /// Decode a string operand with the named font's encoding.
    fn decode(&self, fonts: &BTreeMap<Vec<u8>, &Dictionary>, font: &[u8], bytes: &[u8]) -> String {
        if let Some(font_dict) = fonts.get(font) {
            if let Ok(encoding) = font_dict.get_font_encoding(self.doc) {
                if let Ok(text) = LopdfDocument::decode_text(&encoding, bytes) {
                    return text;
                }
            }
        }
        decode_text_simple(bytes)
    }

    /// Decode a `TJ` array; large negative adjustments become word spaces.
    fn decode_array(
        &self,
        fonts: &BTreeMap<Vec<u8>, &Dictionary>,
        font: &[u8],
        items: &[Object],
    ) -> String {
        // In thousandths of an em.
        const SPACE_THRESHOLD: f32 = 200.0;

        let mut combined = String::new();
        for item in items {
            match item {
                Object::String(bytes, _) => combined.push_str(&self.decode(fonts, font, bytes)),
                other => {
                    let adjustment = number(other).map(|n| -n).unwrap_or(0.0);
                    if adjustment > SPACE_THRESHOLD
                        && !combined.is_empty()
                        && !combined.ends_with(char::is_whitespace)
                        && !ends_spaceless(&combined)
                    {
                        combined.push(' ');
                    }
                }
            }
        }
        combined
    }
}

fn append_stream(content: &mut Vec<u8>, stream: &lopdf::Stream) {
    match stream.decompressed_content() {
        Ok(data) => content.extend_from_slice(&data),
        Err(_) => content.extend_from_slice(&stream.content),
    }
    content.push(b'\n');
}

/// A PDF transformation matrix `[a b c d e f]`.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Matrix {
    a: f32,
    b: f32,
    c: f32,
    d: f32,
    e: f32,
    f: f32,
}

impl Matrix {
    const IDENTITY: Matrix = Matrix {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        e: 0.0,
        f: 0.0,
    };

    fn translation(tx: f32, ty: f32) -> Self {
        Matrix {
            e: tx,
            f: ty,
            ..Self::IDENTITY
        }
    }

    fn from_operands(operands: &[Object]) -> Option<Self> {
        if operands.len() < 6 {
            return None;
        }
        let n: Vec<f32> = operands[..6].iter().filter_map(number).collect();
        match n[..] {
            [a, b, c, d, e, f] => Some(Matrix { a, b, c, d, e, f }),
            _ => None,
        }
    }

    /// `self x other`, in PDF's row-vector convention.
    fn multiply(&self, other: &Matrix) -> Matrix {
        Matrix {
            a: self.a * other.a + self.b * other.c,
            b: self.a * other.b + self.b * other.d,
            c: self.c * other.a + self.d * other.c,
            d: self.c * other.b + self.d * other.d,
            e: self.e * other.a + self.f * other.c + other.e,
            f: self.e * other.b + self.f * other.d + other.f,
        }
    }

    fn vertical_scale(&self) -> f32 {
        (self.c * self.c + self.d * self.d).sqrt()
    }
}

/// The parts of the graphics state that `q`/`Q` save and restore.
#[derive(Debug, Clone)]
struct SavedState {
    ctm: Matrix,
    font: Vec<u8>,
    font_size: f32,
    leading: f32,
}

/// Text-related graphics state.
#[derive(Debug, Clone)]
struct TextState {
    ctm: Matrix,
    saved: Vec<SavedState>,
    text_matrix: Matrix,
    line_matrix: Matrix,
    font: Vec<u8>,
    font_size: f32,
    leading: f32,
}

impl Default for TextState {
    fn default() -> Self {
        Self {
            ctm: Matrix::IDENTITY,
            saved: Vec::new(),
            text_matrix: Matrix::IDENTITY,
            line_matrix: Matrix::IDENTITY,
            font: Vec::new(),
            font_size: 12.0,
            leading: 0.0,
        }
    }
}

impl TextState {
    fn save(&mut self) {
        self.saved.push(SavedState {
            ctm: self.ctm,
            font: self.font.clone(),
            font_size: self.font_size,
            leading: self.leading,
        });
    }

    fn restore(&mut self) {
        if let Some(saved) = self.saved.pop() {
            self.ctm = saved.ctm;
            self.font = saved.font;
            self.font_size = saved.font_size;
            self.leading = saved.leading;
        }
    }

    fn begin_text(&mut self) {
        self.text_matrix = Matrix::IDENTITY;
        self.line_matrix = Matrix::IDENTITY;
    }

    fn move_line(&mut self, tx: f32, ty: f32) {
        self.line_matrix = Matrix::translation(tx, ty).multiply(&self.line_matrix);
        self.text_matrix = self.line_matrix;
    }

    fn next_line(&mut self) {
        self.move_line(0.0, -self.leading);
    }

    /// Record a span at the current position and advance past it.
    fn show(&mut self, text: String, spans: &mut Vec<TextSpan>) {
        let rendering = self.text_matrix.multiply(&self.ctm);
        let size = self.font_size * rendering.vertical_scale();
        let span = TextSpan::new(text, rendering.e, rendering.f, size);

        let advance = span.text.chars().count() as f32 * self.font_size * 0.5;
        self.text_matrix = Matrix::translation(advance, 0.0).multiply(&self.text_matrix);

        if !span.text.trim().is_empty() {
            spans.push(span);
        }
    }
}

fn number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}

/// Chinese and Japanese are written without spaces between words.
fn is_spaceless_script_char(c: char) -> bool {
    matches!(c as u32,
        0x3000..=0x303F     // CJK symbols and punctuation
        | 0x3040..=0x30FF   // Hiragana, Katakana
        | 0x3400..=0x4DBF   // CJK extension A
        | 0x4E00..=0x9FFF   // CJK unified ideographs
        | 0x20000..=0x2EBEF // CJK extensions B-F
    )
}

fn ends_spaceless(s: &str) -> bool {
    s.chars().last().map(is_spaceless_script_char).unwrap_or(false)
}

fn starts_spaceless(s: &str) -> bool {
    s.chars().next().map(is_spaceless_script_char).unwrap_or(false)
}

/// Fallback decoding when the font's encoding is unavailable.
fn decode_text_simple(bytes: &[u8]) -> String {
    if let [0xFE, 0xFF, rest @ ..] = bytes {
        let utf16: Vec<u16> = rest
            .chunks_exact(2)
            .map(|c| u16::from_be_bytes([c[0], c[1]]))
            .collect();
        return String::from_utf16_lossy(&utf16);
    }

    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        // Latin-1
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}
