// Copyright (c) 2026 rezky_nightky

use unicode_width::UnicodeWidthChar;

use crate::error::ConfigError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Charset(u32);

impl Charset {
    pub const UPPER_LETTERS: Charset = Charset(0x1);
    pub const LOWER_LETTERS: Charset = Charset(0x2);
    pub const DIGITS: Charset = Charset(0x4);
    pub const PUNCTUATION: Charset = Charset(0x8);
    pub const KATAKANA: Charset = Charset(0x10);
    pub const BRACKETS: Charset = Charset(0x20);
    pub const BINARY: Charset = Charset(0x40);
    pub const HEX: Charset = Charset(0x80);
    pub const SYMBOLS: Charset = Charset(0x100);
    pub const BLOCKS: Charset = Charset(0x200);

    /// Katakana, digits, capitals and the bracket/operator run.
    pub const MATRIX: Charset = Charset(0x1 | 0x4 | 0x10 | 0x20);
    pub const ASCII: Charset = Charset(0x1 | 0x2 | 0x4 | 0x8);

    pub fn contains(self, other: Charset) -> bool {
        (self.0 & other.0) != 0
    }
}

pub fn charset_from_str(spec: &str) -> Result<Charset, ConfigError> {
    let spec = spec.trim().to_ascii_lowercase();
    match spec.as_str() {
        "matrix" => Ok(Charset::MATRIX),
        "ascii" => Ok(Charset::ASCII),
        "katakana" => Ok(Charset::KATAKANA),
        "digits" | "dec" | "decimal" => Ok(Charset::DIGITS),
        "bin" | "binary" | "01" => Ok(Charset::BINARY),
        "hex" | "hexadecimal" => Ok(Charset::HEX),
        "symbols" => Ok(Charset::SYMBOLS),
        "blocks" => Ok(Charset::BLOCKS),
        _ => Err(ConfigError::Charset(spec)),
    }
}

fn push_range(out: &mut Vec<char>, start: u32, end: u32) {
    out.extend((start..=end).filter_map(char::from_u32));
}

pub fn build_glyphs(charset: Charset) -> Vec<char> {
    let mut out: Vec<char> = Vec::new();

    if charset.contains(Charset::KATAKANA) {
        // Half-width forms: one terminal cell each.
        push_range(&mut out, 0xFF66, 0xFF9D);
    }
    if charset.contains(Charset::BINARY) {
        push_range(&mut out, 0x30, 0x31);
    }
    if charset.contains(Charset::HEX) {
        push_range(&mut out, 0x30, 0x39);
        push_range(&mut out, 0x41, 0x46);
    }
    if charset.contains(Charset::DIGITS) {
        push_range(&mut out, 0x30, 0x39);
    }
    if charset.contains(Charset::UPPER_LETTERS) {
        push_range(&mut out, 0x41, 0x5A);
    }
    if charset.contains(Charset::LOWER_LETTERS) {
        push_range(&mut out, 0x61, 0x7A);
    }
    if charset.contains(Charset::PUNCTUATION) {
        push_range(&mut out, 0x21, 0x2F);
        push_range(&mut out, 0x3A, 0x40);
        push_range(&mut out, 0x5B, 0x60);
        push_range(&mut out, 0x7B, 0x7E);
    }
    if charset.contains(Charset::BRACKETS) {
        out.extend("{}[]<>/\\|@#$%^&*()".chars());
    }
    if charset.contains(Charset::SYMBOLS) {
        out.extend("∞∑∫√π∆Ωµλ≈≠≤≥×÷±∂∇∈∉∩∪⊂⊃⊕⊗".chars());
    }
    if charset.contains(Charset::BLOCKS) {
        push_range(&mut out, 0x2580, 0x259F);
    }

    if out.is_empty() {
        out.push('0');
        out.push('1');
    }

    out
}

/// Literal glyph override. Whitespace is ignored; every remaining char must
/// occupy exactly one terminal cell.
pub fn glyphs_from_literal(s: &str) -> Result<Vec<char>, ConfigError> {
    let mut out = Vec::new();
    for ch in s.chars().filter(|c| !c.is_whitespace()) {
        if ch.width() != Some(1) {
            return Err(ConfigError::WideGlyph(ch));
        }
        if !out.contains(&ch) {
            out.push(ch);
        }
    }
    if out.is_empty() {
        return Err(ConfigError::NoGlyphs);
    }
    Ok(out)
}
