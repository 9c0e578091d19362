//! Pixel sinks: where finished frames go.
//!
//! The matrix hardware, a console fallback, a PNG preview file and an
//! in-memory capture all implement [`PixelSink`].

use crate::canvas::Frame;
use crate::errors::SinkError;
use led_ticker_types::Rgb;
use log::{debug, trace};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

/// Default preview location
pub const DEFAULT_SNAPSHOT_PATH: &str = "/tmp/led_matrix_preview.png";
/// Default minimum time between preview writes
pub const DEFAULT_SNAPSHOT_INTERVAL: Duration = Duration::from_millis(200);

/// Capability interface of the physical (or emulated) display
pub trait PixelSink: Send {
    /// Short name for logs
    fn name(&self) -> &str;

    fn clear(&mut self) -> Result<(), SinkError>;

    fn set_pixel(&mut self, x: u32, y: u32, color: Rgb) -> Result<(), SinkError>;

    /// Make everything written since `clear` visible
    fn flush(&mut self) -> Result<(), SinkError>;

    /// Hand a complete frame to the display
    fn present(&mut self, frame: &Frame) -> Result<(), SinkError> {
        paint_frame(self, frame)
    }

    /// Called on ticks with no new frame; finishes output a sink deferred
    fn poll(&mut self) -> Result<(), SinkError> {
        Ok(())
    }
}

/// Clear, write every lit pixel of `frame`, flush
pub fn paint_frame<S: PixelSink + ?Sized>(sink: &mut S, frame: &Frame) -> Result<(), SinkError> {
    sink.clear()?;
    for (x, y, color) in frame.lit_pixels() {
        sink.set_pixel(x, y, color)?;
    }
    sink.flush()
}

/// Row-major pixel buffer shared by the buffering sinks
#[derive(Debug, Clone)]
struct PixelBuffer {
    width: u32,
    height: u32,
    pixels: Vec<Rgb>,
}

impl PixelBuffer {
    fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Rgb::BLACK; (width * height) as usize],
        }
    }

    fn resize(&mut self, width: u32, height: u32) {
        if self.width != width || self.height != height {
            *self = Self::new(width, height);
        }
    }

    fn clear(&mut self) {
        self.pixels.fill(Rgb::BLACK);
    }

    fn set(&mut self, x: u32, y: u32, color: Rgb) {
        if x < self.width && y < self.height {
            self.pixels[(y * self.width + x) as usize] = color;
        }
    }

    fn ascii_rows(&self) -> impl Iterator<Item = String> + '_ {
        self.pixels
            .chunks(self.width.max(1) as usize)
            .map(|row| row.iter().map(|c| if c.is_lit() { '#' } else { '.' }).collect())
    }

    fn rgb_bytes(&self) -> Vec<u8> {
        self.pixels.iter().flat_map(|c| c.to_array()).collect()
    }
}

/// Console fallback for machines without a matrix.
///
/// Prints `DISPLAY: <text>` for every presented frame and, optionally, an
/// ASCII rendering of the lit pixels.
pub struct ConsoleSink<W: Write + Send = io::Stdout> {
    out: W,
    ascii_art: bool,
    text: String,
    buffer: PixelBuffer,
}

impl ConsoleSink<io::Stdout> {
    pub fn stdout(ascii_art: bool) -> Self {
        Self::new(io::stdout(), ascii_art)
    }
}

impl<W: Write + Send> ConsoleSink<W> {
    pub fn new(out: W, ascii_art: bool) -> Self {
        Self {
            out,
            ascii_art,
            text: String::new(),
            buffer: PixelBuffer::new(0, 0),
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write + Send> PixelSink for ConsoleSink<W> {
    fn name(&self) -> &str {
        "console"
    }

    fn clear(&mut self) -> Result<(), SinkError> {
        self.buffer.clear();
        Ok(())
    }

    fn set_pixel(&mut self, x: u32, y: u32, color: Rgb) -> Result<(), SinkError> {
        self.buffer.set(x, y, color);
        Ok(())
    }

    fn flush(&mut self) -> Result<(), SinkError> {
        writeln!(self.out, "DISPLAY: {}", self.text.replace('\n', " / "))?;
        if self.ascii_art {
            for row in self.buffer.ascii_rows() {
                writeln!(self.out, "{}", row)?;
            }
        }
        self.out.flush()?;
        Ok(())
    }

    fn present(&mut self, frame: &Frame) -> Result<(), SinkError> {
        self.text = frame.text();
        self.buffer.resize(frame.width(), frame.height());
        paint_frame(self, frame)
    }
}

/// Writes each presented frame to a PNG preview file, at most once per
/// `min_interval`. A frame flushed too soon is kept and written by a later
/// `poll` once the interval has passed.
pub struct SnapshotSink {
    path: PathBuf,
    min_interval: Duration,
    last_written: Option<Instant>,
    /// Buffer holds a frame not yet on disk
    deferred: bool,
    buffer: PixelBuffer,
}

impl SnapshotSink {
    pub fn new(path: impl Into<PathBuf>, min_interval: Duration) -> Self {
        Self {
            path: path.into(),
            min_interval,
            last_written: None,
            deferred: false,
            buffer: PixelBuffer::new(0, 0),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_png(&self) -> Result<(), SinkError> {
        // Write beside the target and rename so readers never see a partial file
        let tmp = self.path.with_extension("png.tmp");
        {
            let file = File::create(&tmp)?;
            let (width, height) = (self.buffer.width, self.buffer.height);
            let mut encoder = png::Encoder::new(BufWriter::new(file), width, height);
            encoder.set_color(png::ColorType::Rgb);
            encoder.set_depth(png::BitDepth::Eight);
            let mut writer = encoder
                .write_header()
                .map_err(|e| SinkError::Rejected(format!("png header: {}", e)))?;
            writer
                .write_image_data(&self.buffer.rgb_bytes())
                .map_err(|e| SinkError::Rejected(format!("png data: {}", e)))?;
        }
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn write_if_due(&mut self) -> Result<(), SinkError> {
        let now = Instant::now();
        if let Some(last) = self.last_written {
            if now.duration_since(last) < self.min_interval {
                trace!("Snapshot throttled");
                self.deferred = true;
                return Ok(());
            }
        }
        self.write_png()?;
        self.last_written = Some(now);
        self.deferred = false;
        debug!("Wrote preview {}", self.path.display());
        Ok(())
    }
}

impl Default for SnapshotSink {
    fn default() -> Self {
        Self::new(DEFAULT_SNAPSHOT_PATH, DEFAULT_SNAPSHOT_INTERVAL)
    }
}

impl PixelSink for SnapshotSink {
    fn name(&self) -> &str {
        "snapshot"
    }

    fn clear(&mut self) -> Result<(), SinkError> {
        self.buffer.clear();
        Ok(())
    }

    fn set_pixel(&mut self, x: u32, y: u32, color: Rgb) -> Result<(), SinkError> {
        self.buffer.set(x, y, color);
        Ok(())
    }

    fn flush(&mut self) -> Result<(), SinkError> {
        self.write_if_due()
    }

    fn present(&mut self, frame: &Frame) -> Result<(), SinkError> {
        self.buffer.resize(frame.width(), frame.height());
        paint_frame(self, frame)
    }

    fn poll(&mut self) -> Result<(), SinkError> {
        if self.deferred {
            self.write_if_due()?;
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
struct MemoryState {
    frames: Vec<Frame>,
    failures_remaining: u32,
    disconnected: bool,
}

/// Keeps every presented frame in memory (headless runs and tests).
///
/// Pixel-level calls are accepted and ignored; frames are captured whole
/// in `present`.
#[derive(Debug, Default)]
pub struct MemorySink {
    state: Arc<Mutex<MemoryState>>,
}

/// Inspection and fault-injection handle for a [`MemorySink`] that has been
/// moved into an orchestrator
#[derive(Debug, Clone)]
pub struct MemorySinkHandle {
    state: Arc<Mutex<MemoryState>>,
}

fn lock(state: &Mutex<MemoryState>) -> MutexGuard<'_, MemoryState> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle(&self) -> MemorySinkHandle {
        MemorySinkHandle {
            state: Arc::clone(&self.state),
        }
    }
}

impl MemorySinkHandle {
    pub fn frames(&self) -> Vec<Frame> {
        lock(&self.state).frames.clone()
    }

    pub fn frame_count(&self) -> usize {
        lock(&self.state).frames.len()
    }

    pub fn last_frame(&self) -> Option<Frame> {
        lock(&self.state).frames.last().cloned()
    }

    /// Reject the next `count` frames
    pub fn fail_next(&self, count: u32) {
        lock(&self.state).failures_remaining = count;
    }

    /// Reject every frame from now on
    pub fn disconnect(&self) {
        lock(&self.state).disconnected = true;
    }
}

impl PixelSink for MemorySink {
    fn name(&self) -> &str {
        "memory"
    }

    fn clear(&mut self) -> Result<(), SinkError> {
        Ok(())
    }

    fn set_pixel(&mut self, _x: u32, _y: u32, _color: Rgb) -> Result<(), SinkError> {
        Ok(())
    }

    fn flush(&mut self) -> Result<(), SinkError> {
        Ok(())
    }

    fn present(&mut self, frame: &Frame) -> Result<(), SinkError> {
        let mut state = lock(&self.state);
        if state.disconnected {
            return Err(SinkError::Disconnected);
        }
        if state.failures_remaining > 0 {
            state.failures_remaining -= 1;
            return Err(SinkError::Rejected("injected failure".to_string()));
        }
        state.frames.push(frame.clone());
        Ok(())
    }
}
