//! WinAnsi (Windows-1252) encoding for standard Type1 fonts.

/// Byte written for characters WinAnsi cannot represent.
pub const REPLACEMENT_BYTE: u8 = b'?';

/// Map a character to its WinAnsi code.
///
/// ASCII and Latin-1 map to themselves; the 0x80-0x9F block holds the
/// Windows-1252 punctuation that Latin-1 lacks.
pub fn unicode_to_winansi(ch: char) -> Option<u8> {
    let code = ch as u32;
    if code < 0x80 || (0xA0..=0xFF).contains(&code) {
        return Some(code as u8);
    }

    match code {
        0x20AC => Some(0x80), // €
        0x201A => Some(0x82),
        0x0192 => Some(0x83),
        0x201E => Some(0x84),
        0x2026 => Some(0x85), // …
        0x2020 => Some(0x86),
        0x2021 => Some(0x87),
        0x02C6 => Some(0x88),
        0x2030 => Some(0x89),
        0x0160 => Some(0x8A),
        0x2039 => Some(0x8B),
        0x0152 => Some(0x8C),
        0x017D => Some(0x8E),
        0x2018 => Some(0x91),
        0x2019 => Some(0x92),
        0x201C => Some(0x93),
        0x201D => Some(0x94),
        0x2022 => Some(0x95), // •
        0x2013 => Some(0x96),
        0x2014 => Some(0x97),
        0x02DC => Some(0x98),
        0x2122 => Some(0x99),
        0x0161 => Some(0x9A),
        0x203A => Some(0x9B),
        0x0153 => Some(0x9C),
        0x017E => Some(0x9E),
        0x0178 => Some(0x9F),
        _ => None,
    }
}

/// Text encoded for a WinAnsi font.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedText {
    /// Encoded bytes, one per input character
    pub bytes: Vec<u8>,
    /// Number of characters replaced by [`REPLACEMENT_BYTE`]
    pub replaced: usize,
}

/// Encode `text` as WinAnsi bytes, replacing unmappable characters.
pub fn encode_winansi(text: &str) -> EncodedText {
    let mut bytes = Vec::with_capacity(text.len());
    let mut replaced = 0;
    for ch in text.chars() {
        match unicode_to_winansi(ch) {
            Some(b) => bytes.push(b),
            None => {
                bytes.push(REPLACEMENT_BYTE);
                replaced += 1;
            }
        }
    }
    EncodedText { bytes, replaced }
}
