// Copyright (c) 2026 rezky_nightky

use crossterm::style::Color;
use unicode_width::UnicodeWidthChar;

use crate::cell::Cell;

/// Back buffer for one terminal screen with change tracking.
///
/// `set` records which cells changed since the last `clear_dirty` so the
/// terminal layer can repaint only those, unless the whole frame was
/// invalidated.
#[derive(Clone, Debug)]
pub struct Frame {
    pub width: u16,
    pub height: u16,
    cells: Vec<Cell>,
    blank: Cell,
    dirty_all: bool,
    dirty_map: Vec<bool>,
    dirty: Vec<usize>,
}

impl Frame {
    pub fn new(width: u16, height: u16, bg: Option<Color>) -> Self {
        let len = width as usize * height as usize;
        let blank = Cell::blank_with_bg(bg);
        Self {
            width,
            height,
            cells: vec![blank; len],
            blank,
            dirty_all: true,
            dirty_map: vec![false; len],
            dirty: Vec::new(),
        }
    }

    pub fn is_dirty_all(&self) -> bool {
        self.dirty_all
    }

    pub fn has_changes(&self) -> bool {
        self.dirty_all || !self.dirty.is_empty()
    }

    pub fn dirty_indices(&self) -> &[usize] {
        &self.dirty
    }

    pub fn clear_dirty(&mut self) {
        if self.dirty_all {
            self.dirty_all = false;
            self.dirty_map.fill(false);
        } else {
            for &i in &self.dirty {
                self.dirty_map[i] = false;
            }
        }
        self.dirty.clear();
    }

    pub fn index(&self, x: u16, y: u16) -> Option<usize> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }

    #[allow(dead_code)]
    pub fn get(&self, x: u16, y: u16) -> Option<&Cell> {
        self.index(x, y).map(|i| &self.cells[i])
    }

    pub fn cell_at_index(&self, i: usize) -> Cell {
        self.cells.get(i).copied().unwrap_or(self.blank)
    }

    pub fn set(&mut self, x: u16, y: u16, cell: Cell) {
        let Some(i) = self.index(x, y) else {
            return;
        };
        if self.cells[i] == cell {
            return;
        }
        self.cells[i] = cell;
        if !self.dirty_all && !self.dirty_map[i] {
            self.dirty_map[i] = true;
            self.dirty.push(i);
        }
    }

    /// Writes `text` starting at column `x`, one cell per display column.
    ///
    /// `style` picks the foreground and bold flag per char index. Zero-width
    /// and double-width chars are skipped; anything right of the frame is
    /// clipped. Returns the column after the last written cell.
    pub fn put_str<F>(&mut self, x: u16, y: u16, text: &str, bg: Option<Color>, mut style: F) -> u16
    where
        F: FnMut(usize) -> (Option<Color>, bool),
    {
        let mut col = x;
        for (i, ch) in text.chars().enumerate() {
            if ch.width() != Some(1) {
                continue;
            }
            if col >= self.width {
                break;
            }
            let (fg, bold) = style(i);
            self.set(col, y, Cell::glyph(ch, fg, bg, bold));
            col += 1;
        }
        col
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_frame_is_blank_and_fully_dirty() {
        let f = Frame::new(2, 2, Some(Color::Black));
        assert!(f.is_dirty_all());
        assert_eq!(f.get(1, 1), Some(&Cell::blank_with_bg(Some(Color::Black))));
        assert_eq!(f.get(2, 0), None);
    }

    #[test]
    fn set_tracks_only_real_changes() {
        let mut f = Frame::new(4, 1, None);
        f.clear_dirty();
        assert!(!f.has_changes());

        f.set(1, 0, Cell::blank_with_bg(None));
        assert!(!f.has_changes());

        f.set(1, 0, Cell::glyph('a', None, None, false));
        f.set(1, 0, Cell::glyph('b', None, None, false));
        assert_eq!(f.dirty_indices(), &[1]);
    }

    #[test]
    fn put_str_clips_at_right_edge() {
        let mut f = Frame::new(3, 1, None);
        let end = f.put_str(1, 0, "abc", None, |_| (None, false));
        assert_eq!(end, 3);
        assert_eq!(f.get(1, 0).unwrap().ch, 'a');
        assert_eq!(f.get(2, 0).unwrap().ch, 'b');
    }
}
