use std::path::{Path, PathBuf};

use ab_glyph::{Font, FontVec, GlyphId, PxScale, ScaleFont, point};
use font8x8::legacy::BASIC_LEGACY;
use image::{Rgb, RgbImage};
use imageproc::{
    drawing::{draw_filled_rect_mut, draw_text_mut},
    rect::Rect,
};
use snafu::ResultExt;
use tracing::*;

use crate::{consts::BUILTIN_GLYPH_SIZE, error::*};

/// Font used to measure and draw captions.
pub enum CaptionFont {
    /// A truetype font loaded from disk.
    TrueType {
        font: FontVec,
        scale: PxScale,
        path: PathBuf,
    },
    /// The built-in 8x8 bitmap font, each glyph pixel drawn as a
    /// `scale` x `scale` block.
    Builtin { scale: u32 },
}

impl CaptionFont {
    /// Loads the truetype font `name` at `size` pixels.
    ///
    /// `name` is tried as given, then inside each of `search_dirs`. When no
    /// candidate can be read and parsed the built-in font is returned; font
    /// resolution never fails.
    pub fn resolve(name: &str, size: f32, search_dirs: &[PathBuf]) -> Self {
        for path in font_candidates(name, search_dirs) {
            let Ok(data) = std::fs::read(&path) else {
                continue;
            };

            match FontVec::try_from_vec(data).context(FontSnafu {}) {
                Ok(font) => {
                    info!("caption font loaded from {}", path.display());
                    return Self::TrueType {
                        font,
                        scale: PxScale::from(size),
                        path,
                    };
                }
                Err(err) => warn!("skip font {}: {}", path.display(), err),
            }
        }

        warn!("font `{name}` not found, falling back to built-in font");
        Self::builtin(size)
    }

    /// The built-in font scaled to approximate `size` pixels.
    pub fn builtin(size: f32) -> Self {
        let scale = (size / BUILTIN_GLYPH_SIZE as f32).round() as u32;
        Self::Builtin {
            scale: scale.max(1),
        }
    }

    pub fn is_builtin(&self) -> bool {
        matches!(self, Self::Builtin { .. })
    }

    /// Rendered width and height of `text` in pixels.
    ///
    /// For a truetype font this is the extent of the inked pixels, not the
    /// advance box, so it matches what [`CaptionFont::draw`] covers.
    pub fn measure(&self, text: &str) -> (u32, u32) {
        match self {
            Self::TrueType { font, scale, .. } => match ink_bounds(font, *scale, text) {
                Some(ink) => (ink.width(), ink.height()),
                None => (0, 0),
            },
            Self::Builtin { scale } => {
                let cell = BUILTIN_GLYPH_SIZE * scale;
                (text.chars().count() as u32 * cell, cell)
            }
        }
    }

    /// Draws `text` with its top-left corner at `(x, y)`, clipped to the canvas.
    ///
    /// The top-left corner is that of the inked pixels, so the text fills
    /// the `measure` box placed at `(x, y)` without overhang.
    pub fn draw(&self, canvas: &mut RgbImage, color: Rgb<u8>, x: i32, y: i32, text: &str) {
        match self {
            Self::TrueType { font, scale, .. } => {
                let Some(ink) = ink_bounds(font, *scale, text) else {
                    return;
                };
                // draw_text_mut places the baseline one ascent below `y`
                let (x, y) = (x - ink.left(), y - ink.top());
                draw_text_mut(canvas, color, x, y, *scale, font, text)
            }
            Self::Builtin { scale } => draw_builtin_text(canvas, color, x, y, *scale, text),
        }
    }
}

/// Pixel bounds of the glyph outlines of `text`, relative to the origin
/// `draw_text_mut` is called with.
///
/// Glyphs are laid out the same way `imageproc` lays them out: the pen starts
/// at `(0, ascent)`, advances by the horizontal advance and picks up kerning
/// after each outlined glyph. `None` when nothing would be inked.
fn ink_bounds(font: &FontVec, scale: PxScale, text: &str) -> Option<Rect> {
    let scaled = font.as_scaled(scale);
    let mut pen = 0f32;
    let mut last: Option<GlyphId> = None;
    let mut bounds: Option<(f32, f32, f32, f32)> = None;

    for ch in text.chars() {
        let id = scaled.glyph_id(ch);
        let glyph = id.with_scale_and_position(scale, point(pen, scaled.ascent()));
        pen += scaled.h_advance(id);

        let Some(outlined) = scaled.outline_glyph(glyph) else {
            continue;
        };
        if let Some(last) = last {
            pen += scaled.kern(id, last);
        }
        last = Some(id);

        let px = outlined.px_bounds();
        bounds = Some(match bounds {
            None => (px.min.x, px.min.y, px.max.x, px.max.y),
            Some((x0, y0, x1, y1)) => (
                x0.min(px.min.x),
                y0.min(px.min.y),
                x1.max(px.max.x),
                y1.max(px.max.y),
            ),
        });
    }

    let (x0, y0, x1, y1) = bounds?;
    let (width, height) = ((x1 - x0) as u32, (y1 - y0) as u32);
    if width == 0 || height == 0 {
        return None;
    }
    Some(Rect::at(x0 as i32, y0 as i32).of_size(width, height))
}

fn font_candidates(name: &str, search_dirs: &[PathBuf]) -> Vec<PathBuf> {
    let mut candidates = vec![PathBuf::from(name)];
    if !Path::new(name).is_absolute() {
        candidates.extend(search_dirs.iter().map(|dir| dir.join(name)));
    }
    candidates
}

fn draw_builtin_text(
    canvas: &mut RgbImage,
    color: Rgb<u8>,
    x: i32,
    y: i32,
    scale: u32,
    text: &str,
) {
    let cell = (BUILTIN_GLYPH_SIZE * scale) as i32;
    let step = scale as i32;

    for (idx, ch) in text.chars().enumerate() {
        let code = if ch.is_ascii() { ch as usize } else { '?' as usize };
        let origin_x = x + idx as i32 * cell;

        for (row, bits) in BASIC_LEGACY[code].iter().enumerate() {
            for col in 0..BUILTIN_GLYPH_SIZE as i32 {
                // bit 0 is the leftmost pixel
                if bits & (1u8 << col) == 0 {
                    continue;
                }
                let block = Rect::at(origin_x + col * step, y + row as i32 * step)
                    .of_size(scale, scale);
                draw_filled_rect_mut(canvas, block, color);
            }
        }
    }
}
