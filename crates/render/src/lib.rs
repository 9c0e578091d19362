//! led-ticker-render: bitmap fonts, text layout, the double-buffered canvas
//! and the pixel sinks frames are handed to.

pub mod bdf;
pub mod canvas;
pub mod errors;
pub mod font;
pub mod layout;
pub mod sink;

pub use canvas::{Canvas, CanvasStats, Frame};
pub use errors::{FontLoadError, RenderError, SinkError};
pub use font::{CharMetrics, FontBook, FontMetrics, Glyph, DEFAULT_FACE};
pub use layout::{TextBlock, TextLayoutEngine, WrapResult};
pub use sink::{
    paint_frame, ConsoleSink, MemorySink, MemorySinkHandle, PixelSink, SnapshotSink,
    DEFAULT_SNAPSHOT_INTERVAL, DEFAULT_SNAPSHOT_PATH,
};
