// Copyright (c) 2026 rezky_nightky

use thiserror::Error;

/// Failures while building an effect component.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EffectError {
    #[error("text cycler needs at least one candidate string")]
    NoCandidates,

    #[error("glyph set is empty")]
    EmptyGlyphSet,
}

/// Command line values that parse but cannot be applied.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("failed to apply {name} {value} (must be a finite number)")]
    NotFinite { name: &'static str, value: f64 },

    #[error("failed to apply {name} {value} (min {min} max {max})")]
    OutOfRange {
        name: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("invalid --colormode: {0} (allowed: 0,16,8,256,24,32)")]
    ColorMode(u16),

    #[error("invalid color: {0} (see --list-colors)")]
    ColorScheme(String),

    #[error("unsupported charset: {0} (see --list-charsets)")]
    Charset(String),

    #[error("--glyphs: {0:?} is not a single-width character")]
    WideGlyph(char),

    #[error("--glyphs: no usable characters given")]
    NoGlyphs,
}
