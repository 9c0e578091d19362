//! Layout shared by the text-only providers

use led_ticker_core::LINE_GAP;
use led_ticker_render::{Canvas, FontMetrics, TextLayoutEngine};
use led_ticker_types::Rgb;

/// Wrap `text` to the canvas width (minus `margin` on each side) into as
/// many lines as fit, then centre the block both ways
pub(crate) fn paint_paragraph(
    canvas: &mut Canvas,
    layout: &TextLayoutEngine,
    font: &FontMetrics,
    color: Rgb,
    text: &str,
    margin: u32,
) {
    let pitch = font.height() + LINE_GAP;
    let max_lines = ((canvas.height() + LINE_GAP) / pitch).max(1) as usize;
    let wrapped = layout.wrap(text, canvas.width().saturating_sub(2 * margin), font, max_lines);

    // Filled lines always come first
    let used = wrapped.lines().iter().take_while(|l| !l.is_empty()).count();
    let block_height = (used as u32 * pitch).saturating_sub(LINE_GAP);
    let top = (canvas.height() as i32 - block_height as i32).div_euclid(2);

    let lines = &wrapped.lines()[..used];
    for block in layout.stack_centered(lines, font, color, top, LINE_GAP, canvas.width()) {
        canvas.draw_text_block(&block);
    }
}
