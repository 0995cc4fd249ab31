// Copyright (c) 2026 rezky_nightky

use crossterm::style::Color;

use crate::runtime::{ColorMode, ColorScheme};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Paints `top` over `self` at opacity `alpha`.
    pub fn blend(self, top: Rgb, alpha: f32) -> Rgb {
        let a = alpha.clamp(0.0, 1.0);
        Rgb::new(
            lerp_u8(self.r, top.r, a),
            lerp_u8(self.g, top.g, a),
            lerp_u8(self.b, top.b, a),
        )
    }

    /// Largest per-channel distance to `other`.
    pub fn distance(self, other: Rgb) -> u8 {
        self.r
            .abs_diff(other.r)
            .max(self.g.abs_diff(other.g))
            .max(self.b.abs_diff(other.b))
    }
}

/// Colours for one theme. The three rain tones follow the brightness bands
/// of the rain tick; `overlay` is what the trail fades toward.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Tones {
    pub base: Rgb,
    pub accent: Rgb,
    pub bright: Rgb,
    pub overlay: Rgb,
    pub muted: Rgb,
    pub glitch_a: Rgb,
    pub glitch_b: Rgb,
}

#[derive(Clone, Debug)]
pub struct Palette {
    pub mode: ColorMode,
    pub tones: Tones,
    pub bg: Option<Color>,
}

impl Palette {
    /// Terminal colour for `rgb` in this palette's colour mode. Mono yields
    /// `None` so the terminal default foreground is used.
    pub fn color(&self, rgb: Rgb) -> Option<Color> {
        rgb_to_color(self.mode, rgb)
    }
}

fn lerp_u8(a: u8, b: u8, t: f32) -> u8 {
    let a = a as f32;
    let b = b as f32;
    (a + (b - a) * t).round().clamp(0.0, 255.0) as u8
}

fn dist2(r0: u8, g0: u8, b0: u8, r1: u8, g1: u8, b1: u8) -> i32 {
    let dr = (r0 as i32) - (r1 as i32);
    let dg = (g0 as i32) - (g1 as i32);
    let db = (b0 as i32) - (b1 as i32);
    (dr * dr) + (dg * dg) + (db * db)
}

fn rgb_to_ansi256(r: u8, g: u8, b: u8) -> u8 {
    const CUBE_LEVELS: [u8; 6] = [0, 95, 135, 175, 215, 255];

    let r6 = ((r as u16 * 5) + 127) / 255;
    let g6 = ((g as u16 * 5) + 127) / 255;
    let b6 = ((b as u16 * 5) + 127) / 255;

    let cube_idx = 16 + (36 * r6 as u8) + (6 * g6 as u8) + (b6 as u8);
    let cube_dist = dist2(
        r,
        g,
        b,
        CUBE_LEVELS[r6 as usize],
        CUBE_LEVELS[g6 as usize],
        CUBE_LEVELS[b6 as usize],
    );

    let avg = ((r as u16 + g as u16 + b as u16) / 3) as u8;
    let (gray_idx, gray_level) = match avg {
        0..=7 => (16, 0),
        239..=255 => (231, 255),
        _ => {
            let step = (avg - 8) / 10;
            (232 + step, 8 + 10 * step)
        }
    };
    let gray_dist = dist2(r, g, b, gray_level, gray_level, gray_level);

    if gray_dist < cube_dist {
        gray_idx
    } else {
        cube_idx
    }
}

fn rgb_to_color16(r: u8, g: u8, b: u8) -> Color {
    const TABLE: [(Color, (u8, u8, u8)); 16] = [
        (Color::Black, (0, 0, 0)),
        (Color::DarkGrey, (128, 128, 128)),
        (Color::Grey, (192, 192, 192)),
        (Color::White, (255, 255, 255)),
        (Color::DarkRed, (128, 0, 0)),
        (Color::Red, (255, 0, 0)),
        (Color::DarkGreen, (0, 128, 0)),
        (Color::Green, (0, 255, 0)),
        (Color::DarkBlue, (0, 0, 128)),
        (Color::Blue, (0, 0, 255)),
        (Color::DarkCyan, (0, 128, 128)),
        (Color::Cyan, (0, 255, 255)),
        (Color::DarkMagenta, (128, 0, 128)),
        (Color::Magenta, (255, 0, 255)),
        (Color::DarkYellow, (128, 128, 0)),
        (Color::Yellow, (255, 255, 0)),
    ];

    let mut best = Color::White;
    let mut best_d = i32::MAX;
    for (c, (cr, cg, cb)) in TABLE {
        let d = dist2(r, g, b, cr, cg, cb);
        if d < best_d {
            best_d = d;
            best = c;
        }
    }
    best
}

pub fn rgb_to_color(mode: ColorMode, rgb: Rgb) -> Option<Color> {
    let Rgb { r, g, b } = rgb;
    match mode {
        ColorMode::Mono => None,
        ColorMode::TrueColor => Some(Color::Rgb { r, g, b }),
        ColorMode::Color256 => Some(Color::AnsiValue(rgb_to_ansi256(r, g, b))),
        ColorMode::Color16 => Some(rgb_to_color16(r, g, b)),
    }
}

const GLITCH_RED: Rgb = Rgb::new(255, 0, 0);
const GLITCH_CYAN: Rgb = Rgb::new(0, 255, 255);

fn tones(base: Rgb, accent: Rgb, overlay: Rgb, muted: Rgb) -> Tones {
    Tones {
        base,
        accent,
        bright: Rgb::WHITE,
        overlay,
        muted,
        glitch_a: GLITCH_RED,
        glitch_b: GLITCH_CYAN,
    }
}

pub fn scheme_tones(scheme: ColorScheme) -> Tones {
    match scheme {
        ColorScheme::Green => tones(
            Rgb::new(0, 255, 85),
            Rgb::new(0, 255, 136),
            Rgb::new(0, 10, 0),
            Rgb::new(120, 150, 128),
        ),
        ColorScheme::Cyan => tones(
            Rgb::new(0, 220, 255),
            Rgb::new(120, 240, 255),
            Rgb::new(0, 8, 10),
            Rgb::new(120, 145, 150),
        ),
        ColorScheme::Blue => tones(
            Rgb::new(40, 110, 255),
            Rgb::new(120, 170, 255),
            Rgb::new(0, 0, 12),
            Rgb::new(120, 130, 155),
        ),
        ColorScheme::Gold => tones(
            Rgb::new(255, 190, 0),
            Rgb::new(255, 225, 120),
            Rgb::new(10, 8, 0),
            Rgb::new(155, 145, 120),
        ),
        ColorScheme::Red => tones(
            Rgb::new(255, 40, 40),
            Rgb::new(255, 130, 120),
            Rgb::new(10, 0, 0),
            Rgb::new(155, 120, 120),
        ),
        ColorScheme::Purple => tones(
            Rgb::new(170, 80, 255),
            Rgb::new(215, 160, 255),
            Rgb::new(8, 0, 10),
            Rgb::new(140, 125, 155),
        ),
        ColorScheme::Neon => tones(
            Rgb::new(255, 0, 200),
            Rgb::new(0, 255, 255),
            Rgb::new(8, 0, 10),
            Rgb::new(150, 120, 150),
        ),
        ColorScheme::Gray => tones(
            Rgb::new(170, 170, 170),
            Rgb::new(220, 220, 220),
            Rgb::new(6, 6, 6),
            Rgb::new(130, 130, 130),
        ),
    }
}

pub fn build_palette(scheme: ColorScheme, mode: ColorMode, default_background: bool) -> Palette {
    let bg = if default_background {
        None
    } else {
        Some(match mode {
            ColorMode::Mono | ColorMode::Color16 => Color::Black,
            ColorMode::TrueColor => Color::Rgb { r: 0, g: 0, b: 0 },
            ColorMode::Color256 => Color::AnsiValue(16),
        })
    };

    Palette {
        mode,
        tones: scheme_tones(scheme),
        bg,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blend_moves_toward_top_by_alpha() {
        let c = Rgb::new(0, 200, 100).blend(Rgb::new(0, 0, 0), 0.5);
        assert_eq!(c, Rgb::new(0, 100, 50));
        assert_eq!(Rgb::WHITE.blend(Rgb::BLACK, 0.0), Rgb::WHITE);
        assert_eq!(Rgb::WHITE.blend(Rgb::BLACK, 1.0), Rgb::BLACK);
    }

    #[test]
    fn ansi256_maps_pure_colors_onto_the_cube() {
        assert_eq!(rgb_to_ansi256(0, 0, 0), 16);
        assert_eq!(rgb_to_ansi256(255, 255, 255), 231);
        assert_eq!(rgb_to_ansi256(0, 255, 0), 46);
    }

    #[test]
    fn mono_mode_has_no_foreground_colors() {
        let p = build_palette(ColorScheme::Green, ColorMode::Mono, true);
        assert_eq!(p.color(p.tones.base), None);
        assert_eq!(p.bg, None);
    }
}
