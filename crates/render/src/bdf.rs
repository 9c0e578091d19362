//! Minimal BDF (Glyph Bitmap Distribution Format) reader.
//!
//! Only the subset needed for fixed-metric matrix fonts is understood:
//! face ascent/descent, per-glyph encoding, DWIDTH, BBX and BITMAP rows.
//! Everything else is skipped.

use crate::errors::FontLoadError;
use crate::font::Glyph;
use std::collections::HashMap;

/// Parsed face before it is wrapped into a `FontMetrics`
#[derive(Debug)]
pub struct BdfFace {
    pub ascent: u32,
    pub descent: u32,
    pub glyphs: HashMap<char, Glyph>,
}

#[derive(Default)]
struct PendingGlyph {
    encoding: Option<i64>,
    advance: Option<u32>,
    bbx: Option<(u32, u32, i32, i32)>,
    rows: Vec<Vec<bool>>,
}

fn parse_err(line: usize, message: impl Into<String>) -> FontLoadError {
    FontLoadError::Parse {
        line,
        message: message.into(),
    }
}

fn int_fields<T: std::str::FromStr>(
    line: usize,
    fields: &[&str],
    count: usize,
    key: &str,
) -> Result<Vec<T>, FontLoadError> {
    if fields.len() < count {
        return Err(parse_err(line, format!("{} expects {} values", key, count)));
    }
    fields[..count]
        .iter()
        .map(|f| {
            f.parse::<T>()
                .map_err(|_| parse_err(line, format!("invalid {} value '{}'", key, f)))
        })
        .collect()
}

fn hex_row(line: usize, row: &str, width: u32) -> Result<Vec<bool>, FontLoadError> {
    let mut bits = Vec::with_capacity(row.len() * 4);
    for c in row.chars() {
        let nibble = c
            .to_digit(16)
            .ok_or_else(|| parse_err(line, format!("invalid bitmap digit '{}'", c)))?;
        for shift in (0..4).rev() {
            bits.push(nibble & (1 << shift) != 0);
        }
    }
    bits.resize(width as usize, false);
    Ok(bits)
}

pub fn parse(source: &str) -> Result<BdfFace, FontLoadError> {
    let mut started = false;
    let mut bbox: Option<(u32, u32, i32, i32)> = None;
    let mut ascent: Option<u32> = None;
    let mut descent: Option<u32> = None;
    let mut glyphs = HashMap::new();
    let mut pending: Option<PendingGlyph> = None;
    let mut in_bitmap = false;

    for (idx, raw) in source.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }
        let mut parts = line.split_whitespace();
        let key = parts.next().unwrap_or_default();
        let fields: Vec<&str> = parts.collect();

        if !started {
            if key == "STARTFONT" {
                started = true;
                continue;
            }
            return Err(parse_err(line_no, "missing STARTFONT"));
        }

        if in_bitmap {
            if key == "ENDCHAR" {
                in_bitmap = false;
                let glyph = pending
                    .take()
                    .ok_or_else(|| parse_err(line_no, "ENDCHAR outside STARTCHAR"))?;
                if let Some((c, g)) = finish_glyph(line_no, glyph, bbox)? {
                    glyphs.insert(c, g);
                }
            } else if let Some(glyph) = pending.as_mut() {
                let width = glyph.bbx.or(bbox).map(|b| b.0).unwrap_or(0);
                glyph.rows.push(hex_row(line_no, key, width)?);
            }
            continue;
        }

        match key {
            "FONTBOUNDINGBOX" => {
                let v: Vec<i32> = int_fields(line_no, &fields, 4, key)?;
                bbox = Some((v[0].max(0) as u32, v[1].max(0) as u32, v[2], v[3]));
            }
            "FONT_ASCENT" => ascent = Some(int_fields::<u32>(line_no, &fields, 1, key)?[0]),
            "FONT_DESCENT" => descent = Some(int_fields::<u32>(line_no, &fields, 1, key)?[0]),
            "STARTCHAR" => pending = Some(PendingGlyph::default()),
            "ENCODING" => {
                if let Some(glyph) = pending.as_mut() {
                    glyph.encoding = Some(int_fields::<i64>(line_no, &fields, 1, key)?[0]);
                }
            }
            "DWIDTH" => {
                if let Some(glyph) = pending.as_mut() {
                    let v: Vec<i32> = int_fields(line_no, &fields, 1, key)?;
                    glyph.advance = Some(v[0].max(0) as u32);
                }
            }
            "BBX" => {
                if let Some(glyph) = pending.as_mut() {
                    let v: Vec<i32> = int_fields(line_no, &fields, 4, key)?;
                    glyph.bbx = Some((v[0].max(0) as u32, v[1].max(0) as u32, v[2], v[3]));
                }
            }
            "BITMAP" => {
                if pending.is_none() {
                    return Err(parse_err(line_no, "BITMAP outside STARTCHAR"));
                }
                in_bitmap = true;
            }
            "ENDFONT" => break,
            _ => {}
        }
    }

    if !started {
        return Err(parse_err(0, "empty font file"));
    }
    if in_bitmap {
        return Err(parse_err(source.lines().count(), "unterminated BITMAP"));
    }

    // Face metrics fall back to the bounding box when the properties are absent
    let (ascent, descent) = match (ascent, descent, bbox) {
        (Some(a), Some(d), _) => (a, d),
        (_, _, Some((_, h, _, yoff))) => {
            let descent = (-yoff).max(0) as u32;
            (h.saturating_sub(descent), descent)
        }
        _ => return Err(parse_err(0, "no FONT_ASCENT/FONT_DESCENT or FONTBOUNDINGBOX")),
    };

    Ok(BdfFace {
        ascent,
        descent,
        glyphs,
    })
}

fn finish_glyph(
    line: usize,
    glyph: PendingGlyph,
    font_bbox: Option<(u32, u32, i32, i32)>,
) -> Result<Option<(char, Glyph)>, FontLoadError> {
    let encoding = glyph
        .encoding
        .ok_or_else(|| parse_err(line, "glyph without ENCODING"))?;
    // Negative encodings are unmapped glyphs
    let Some(c) = u32::try_from(encoding).ok().and_then(char::from_u32) else {
        return Ok(None);
    };
    let (width, height, x_offset, y_offset) = glyph
        .bbx
        .or(font_bbox)
        .ok_or_else(|| parse_err(line, "glyph without BBX"))?;
    let advance = glyph.advance.unwrap_or(width);

    let mut bits = Vec::with_capacity((width * height) as usize);
    for y in 0..height as usize {
        match glyph.rows.get(y) {
            Some(row) => bits.extend_from_slice(&row[..width as usize]),
            None => bits.extend(std::iter::repeat(false).take(width as usize)),
        }
    }

    let top = -(y_offset + height as i32);
    Ok(Some((c, Glyph::new(advance, width, height, x_offset, top, bits))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::FontMetrics;

    const TINY: &str = "\
STARTFONT 2.1
FONT -tiny-3x5
SIZE 5 75 75
FONTBOUNDINGBOX 3 5 0 -1
STARTPROPERTIES 2
FONT_ASCENT 4
FONT_DESCENT 1
ENDPROPERTIES
CHARS 2
STARTCHAR space
ENCODING 32
SWIDTH 500 0
DWIDTH 4 0
BBX 3 5 0 -1
BITMAP
00
00
00
00
00
ENDCHAR
STARTCHAR A
ENCODING 65
SWIDTH 500 0
DWIDTH 4 0
BBX 3 5 0 -1
BITMAP
40
A0
E0
A0
00
ENDCHAR
ENDFONT
";

    #[test]
    fn test_parse_tiny_font() {
        let face = FontMetrics::from_bdf("tiny", TINY).unwrap();
        assert_eq!(face.ascent(), 4);
        assert_eq!(face.descent(), 1);
        assert_eq!(face.height(), 5);
        assert_eq!(face.width_of("A A").unwrap(), 12);

        let glyph = face.glyph('A').unwrap();
        assert_eq!(glyph.top, -4);
        assert!(glyph.is_set(1, 0));
        assert!(!glyph.is_set(0, 0));
        assert!(glyph.is_set(0, 1) && glyph.is_set(2, 1));
        assert_eq!(glyph.lit_pixels().count(), 8);
    }

    #[test]
    fn test_missing_startfont_is_rejected() {
        let err = parse("FONT foo\n").unwrap_err();
        assert!(matches!(err, FontLoadError::Parse { line: 1, .. }));
    }

    #[test]
    fn test_bad_bitmap_digit_reports_line() {
        let broken = TINY.replace("A0\nE0", "A0\nZZ");
        match parse(&broken).unwrap_err() {
            FontLoadError::Parse { line, .. } => assert_eq!(line, 30),
            other => panic!("unexpected error {:?}", other),
        }
    }
}
