// Copyright (c) 2026 rezky_nightky

use crossterm::style::Color;

use crate::cell::Cell;
use crate::frame::Frame;
use crate::palette::{Palette, Rgb};

/// Colour and opacity a glyph is painted with.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tone {
    pub rgb: Rgb,
    pub alpha: f32,
}

impl Tone {
    pub fn solid(rgb: Rgb) -> Self {
        Self { rgb, alpha: 1.0 }
    }
}

/// Raster target the rain draws on. Coordinates are in cells; anything
/// outside `width` x `height` is clipped by the implementation.
pub trait Surface {
    fn width(&self) -> u16;
    fn height(&self) -> u16;
    fn resize(&mut self, width: u16, height: u16);
    /// Paints `overlay` over the whole surface at opacity `alpha`.
    fn fade(&mut self, overlay: Rgb, alpha: f32);
    fn draw_glyph(&mut self, x: u32, y: u32, ch: char, tone: Tone);
}

/// Channel distance under which a fading cell counts as gone. Blending by a
/// few percent with rounding stalls about ten steps short of the overlay, so
/// this must stay above that.
const VANISH_DISTANCE: u8 = 16;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct TrailCell {
    ch: char,
    rgb: Rgb,
}

/// Terminal surface that keeps a colour per cell so old glyphs fade out
/// over successive ticks instead of being cleared.
#[derive(Clone, Debug)]
pub struct TrailCanvas {
    width: u16,
    height: u16,
    floor: Rgb,
    cells: Vec<TrailCell>,
}

impl TrailCanvas {
    pub fn new(width: u16, height: u16, floor: Rgb) -> Self {
        let blank = TrailCell { ch: ' ', rgb: floor };
        Self {
            width,
            height,
            floor,
            cells: vec![blank; width as usize * height as usize],
        }
    }

    fn blank(&self) -> TrailCell {
        TrailCell {
            ch: ' ',
            rgb: self.floor,
        }
    }

    fn index(&self, x: u32, y: u32) -> Option<usize> {
        if x >= self.width as u32 || y >= self.height as u32 {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }

    /// Copies the canvas into `frame`, dimmed toward black by `opacity`.
    pub fn paint(&self, frame: &mut Frame, palette: &Palette, opacity: f32) {
        let bg: Option<Color> = palette.bg;
        let w = self.width.min(frame.width);
        let h = self.height.min(frame.height);
        for y in 0..h {
            for x in 0..w {
                let cell = self.cells[y as usize * self.width as usize + x as usize];
                let out = if cell.ch == ' ' {
                    Cell::blank_with_bg(bg)
                } else {
                    let rgb = Rgb::BLACK.blend(cell.rgb, opacity);
                    Cell::glyph(cell.ch, palette.color(rgb), bg, false)
                };
                frame.set(x, y, out);
            }
        }
    }
}

impl Surface for TrailCanvas {
    fn width(&self) -> u16 {
        self.width
    }

    fn height(&self) -> u16 {
        self.height
    }

    fn resize(&mut self, width: u16, height: u16) {
        if width == self.width && height == self.height {
            return;
        }
        let mut cells = vec![self.blank(); width as usize * height as usize];
        for y in 0..height.min(self.height) {
            for x in 0..width.min(self.width) {
                cells[y as usize * width as usize + x as usize] =
                    self.cells[y as usize * self.width as usize + x as usize];
            }
        }
        self.width = width;
        self.height = height;
        self.cells = cells;
    }

    fn fade(&mut self, overlay: Rgb, alpha: f32) {
        let blank = TrailCell {
            ch: ' ',
            rgb: overlay,
        };
        self.floor = overlay;
        for cell in &mut self.cells {
            if cell.ch == ' ' {
                continue;
            }
            let rgb = cell.rgb.blend(overlay, alpha);
            *cell = if rgb.distance(overlay) <= VANISH_DISTANCE {
                blank
            } else {
                TrailCell { ch: cell.ch, rgb }
            };
        }
    }

    fn draw_glyph(&mut self, x: u32, y: u32, ch: char, tone: Tone) {
        let Some(i) = self.index(x, y) else {
            return;
        };
        let under = self.cells[i].rgb;
        self.cells[i] = TrailCell {
            ch,
            rgb: under.blend(tone.rgb, tone.alpha),
        };
    }
}
