//! Double-buffered pixel canvas.
//!
//! All drawing goes to the back buffer. `swap` freezes the back buffer into
//! an immutable [`Frame`] (shared as `Arc<Frame>`), makes it the front buffer
//! and starts a fresh black back buffer. A frame can never be written to once
//! it has been promoted.

use crate::layout::TextBlock;
use embedded_graphics::{
    pixelcolor::{Rgb888, RgbColor},
    prelude::*,
};
use led_ticker_types::Rgb;
use std::convert::Infallible;
use std::sync::Arc;

/// An immutable, fully painted frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    width: u32,
    height: u32,
    pixels: Vec<Rgb>,
    texts: Vec<String>,
}

impl Frame {
    /// An all-black frame with no text
    pub fn blank(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Rgb::BLACK; (width * height) as usize],
            texts: Vec::new(),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgb> {
        if x < self.width && y < self.height {
            Some(self.pixels[(y * self.width + x) as usize])
        } else {
            None
        }
    }

    /// Every non-black pixel as (x, y, color)
    pub fn lit_pixels(&self) -> impl Iterator<Item = (u32, u32, Rgb)> + '_ {
        let width = self.width;
        self.pixels
            .iter()
            .enumerate()
            .filter(|(_, c)| c.is_lit())
            .map(move |(i, c)| (i as u32 % width, i as u32 / width, *c))
    }

    pub fn lit_count(&self) -> usize {
        self.pixels.iter().filter(|c| c.is_lit()).count()
    }

    /// Text drawn into this frame, one entry per text block
    pub fn texts(&self) -> &[String] {
        &self.texts
    }

    /// Text drawn into this frame, lines joined with `\n`
    pub fn text(&self) -> String {
        self.texts.join("\n")
    }

    /// Packed RGB8 bytes, row-major
    pub fn to_rgb_bytes(&self) -> Vec<u8> {
        self.pixels.iter().flat_map(|c| c.to_array()).collect()
    }
}

/// Canvas counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CanvasStats {
    pub clears: u64,
    pub swaps: u64,
    pub discards: u64,
}

/// Fixed-size double-buffered RGB canvas
#[derive(Debug)]
pub struct Canvas {
    width: u32,
    height: u32,
    back: Vec<Rgb>,
    back_texts: Vec<String>,
    front: Arc<Frame>,
    dirty: bool,
    stats: CanvasStats,
}

impl Canvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            back: vec![Rgb::BLACK; (width * height) as usize],
            back_texts: Vec::new(),
            front: Arc::new(Frame::blank(width, height)),
            dirty: false,
            stats: CanvasStats::default(),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Back buffer has been written since the last swap
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn stats(&self) -> CanvasStats {
        self.stats
    }

    /// Blacken the back buffer
    pub fn clear(&mut self) {
        self.back.fill(Rgb::BLACK);
        self.back_texts.clear();
        self.dirty = true;
        self.stats.clears += 1;
    }

    /// Write one back-buffer pixel; out-of-bounds coordinates are ignored
    pub fn set_pixel(&mut self, x: i32, y: i32, color: Rgb) {
        if x < 0 || y < 0 || x as u32 >= self.width || y as u32 >= self.height {
            return;
        }
        self.back[(y as u32 * self.width + x as u32) as usize] = color;
        self.dirty = true;
    }

    /// Back-buffer pixel, for inspection before a swap
    pub fn back_pixel(&self, x: u32, y: u32) -> Option<Rgb> {
        if x < self.width && y < self.height {
            Some(self.back[(y * self.width + x) as usize])
        } else {
            None
        }
    }

    /// Rasterize a text block glyph by glyph. Characters the face lacks
    /// leave a gap of the face's average advance.
    pub fn draw_text_block(&mut self, block: &TextBlock<'_>) {
        let (mut pen_x, top) = block.origin;
        let baseline = top + block.font.ascent() as i32;

        for c in block.text.chars() {
            match block.font.glyph(c) {
                Some(glyph) => {
                    for (dx, dy) in glyph.lit_pixels() {
                        self.set_pixel(pen_x + dx, baseline + dy, block.color);
                    }
                    pen_x += glyph.advance as i32;
                }
                None => pen_x += block.font.average_advance() as i32,
            }
        }

        if !block.text.is_empty() {
            self.back_texts.push(block.text.clone());
            self.dirty = true;
        }
    }

    /// Promote the back buffer to the front and start a fresh back buffer.
    /// Returns the new front frame for the sink.
    pub fn swap(&mut self) -> Arc<Frame> {
        let blank = vec![Rgb::BLACK; (self.width * self.height) as usize];
        let pixels = std::mem::replace(&mut self.back, blank);
        let texts = std::mem::take(&mut self.back_texts);
        self.front = Arc::new(Frame {
            width: self.width,
            height: self.height,
            pixels,
            texts,
        });
        self.dirty = false;
        self.stats.swaps += 1;
        Arc::clone(&self.front)
    }

    /// Drop a partially painted back buffer; the front frame stays visible
    pub fn discard_back(&mut self) {
        self.back.fill(Rgb::BLACK);
        self.back_texts.clear();
        self.dirty = false;
        self.stats.discards += 1;
    }

    /// The currently visible frame
    pub fn front(&self) -> Arc<Frame> {
        Arc::clone(&self.front)
    }
}

impl OriginDimensions for Canvas {
    fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

impl DrawTarget for Canvas {
    type Color = Rgb888;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            self.set_pixel(point.x, point.y, Rgb::new(color.r(), color.g(), color.b()));
        }
        Ok(())
    }
}
