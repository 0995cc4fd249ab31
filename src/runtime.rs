// Copyright (c) 2026 rezky_nightky

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColorMode {
    Mono,
    Color16,
    Color256,
    TrueColor,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColorScheme {
    Green,
    Cyan,
    Blue,
    Gold,
    Red,
    Purple,
    Neon,
    Gray,
}

impl ColorScheme {
    pub const ALL: [ColorScheme; 8] = [
        ColorScheme::Green,
        ColorScheme::Cyan,
        ColorScheme::Blue,
        ColorScheme::Gold,
        ColorScheme::Red,
        ColorScheme::Purple,
        ColorScheme::Neon,
        ColorScheme::Gray,
    ];

    /// Following scheme in `ALL`, wrapping around.
    pub fn next(self) -> ColorScheme {
        let i = Self::ALL.iter().position(|&s| s == self).unwrap_or(0);
        Self::ALL[(i + 1) % Self::ALL.len()]
    }
}

/// What the rain does with its column array when the surface changes size.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ResizePolicy {
    /// Resize the surface only. Columns computed at mount keep drawing;
    /// newly exposed columns stay empty and lost ones are clipped.
    Keep,
    /// Recompute the column count; surviving columns keep their position.
    #[default]
    Reflow,
}
