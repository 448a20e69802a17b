use std::path::PathBuf;

use glam::Vec2;
use image::{DynamicImage, Pixel, Rgb, RgbImage};
use imageproc::{
    drawing::{draw_filled_rect_mut, draw_hollow_rect_mut},
    rect::Rect,
};
use serde::Serialize;
use tracing::*;

use crate::{
    analysis::{bbox::PixelRect, labels::Label},
    consts::*,
    render::font::CaptionFont,
};

#[derive(Debug, Clone)]
pub struct AnnotatorConfig {
    pub font_name: String,
    pub font_size: f32,
    pub font_dirs: Vec<PathBuf>,
}

impl Default for AnnotatorConfig {
    fn default() -> Self {
        let mut font_dirs: Vec<PathBuf> = std::env::var(FONT_DIR_ENV_NAME)
            .map(PathBuf::from)
            .into_iter()
            .collect();
        font_dirs.extend(FONT_SEARCH_DIRS.iter().map(PathBuf::from));

        Self {
            font_name: FONT_NAME.to_string(),
            font_size: FONT_SIZE,
            font_dirs,
        }
    }
}

/// Placement of one detected instance on the image.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Annotation {
    /// Outline of the instance.
    pub rect: PixelRect,
    pub caption: String,
    /// Caption background, sitting directly above `rect`.
    pub caption_rect: PixelRect,
}

/// Draws detected label instances onto images.
pub struct Annotator {
    font: CaptionFont,
}

impl Annotator {
    pub fn new(config: &AnnotatorConfig) -> Self {
        let font = CaptionFont::resolve(&config.font_name, config.font_size, &config.font_dirs);
        Self { font }
    }

    pub fn with_font(font: CaptionFont) -> Self {
        Self { font }
    }

    pub fn font(&self) -> &CaptionFont {
        &self.font
    }

    /// Draws one outline and one caption per instance of `labels`.
    ///
    /// Takes ownership of the decoded image, drops any alpha channel, draws in
    /// place and hands the buffer back ready to be encoded.
    pub fn annotate(&self, image: DynamicImage, labels: &[Label]) -> RgbImage {
        let mut canvas = normalize(image);
        self.draw(&mut canvas, labels);
        canvas
    }

    /// Computes outlines and caption placements for an image of `image_size`.
    ///
    /// Labels and their instances keep the order they were given in, which is
    /// the order they are drawn. Labels without instances yield nothing.
    pub fn layout(&self, image_size: Vec2, labels: &[Label]) -> Vec<Annotation> {
        labels
            .iter()
            .flat_map(|label| {
                label.instances.iter().map(move |instance| {
                    let rect = instance.bounding_box.to_pixel_rect(image_size);
                    let caption = label.caption(instance);
                    let (text_width, text_height) = self.font.measure(&caption);
                    let caption_rect =
                        rect.stacked_above(Vec2::new(text_width as f32, text_height as f32));

                    Annotation {
                        rect,
                        caption,
                        caption_rect,
                    }
                })
            })
            .collect()
    }

    /// Draws `labels` onto an already normalized canvas.
    pub fn draw(&self, canvas: &mut RgbImage, labels: &[Label]) {
        let (width, height) = canvas.dimensions();
        info!("image size: {width}x{height}");

        let image_size = Vec2::new(width as f32, height as f32);
        let caption_fill: Rgb<u8> = CAPTION_FILL.to_rgb();

        for annotation in self.layout(image_size, labels) {
            debug!(
                "drawing box: ({}, {}, {}, {})",
                annotation.rect.left(),
                annotation.rect.top(),
                annotation.rect.right(),
                annotation.rect.bottom()
            );
            draw_outline(canvas, &annotation.rect, BOX_COLOR, BOX_STROKE);

            fill_rect(canvas, &annotation.caption_rect, caption_fill);
            draw_outline(
                canvas,
                &annotation.caption_rect,
                CAPTION_BORDER_COLOR,
                CAPTION_BORDER_STROKE,
            );

            let (text_x, text_y, _, _) = annotation.caption_rect.to_pixel_corners();
            self.font
                .draw(canvas, CAPTION_TEXT_COLOR, text_x, text_y, &annotation.caption);
        }
    }
}

/// Converts any decoded image to opaque 8-bit RGB. Alpha is discarded, not
/// blended.
pub fn normalize(image: DynamicImage) -> RgbImage {
    if image.color().has_alpha() {
        debug!("dropping alpha channel of {:?} image", image.color());
    }
    image.into_rgb8()
}

/// Draws `stroke` nested one-pixel outlines, growing inward from the edge of
/// `rect`.
fn draw_outline(canvas: &mut RgbImage, rect: &PixelRect, color: Rgb<u8>, stroke: u32) {
    let (x0, y0, x1, y1) = rect.to_pixel_corners();

    for inset in 0..stroke as i32 {
        let (left, top, right, bottom) = (x0 + inset, y0 + inset, x1 - inset, y1 - inset);
        if right < left || bottom < top {
            break;
        }
        let ring =
            Rect::at(left, top).of_size((right - left + 1) as u32, (bottom - top + 1) as u32);
        draw_hollow_rect_mut(canvas, ring, color);
    }
}

fn fill_rect(canvas: &mut RgbImage, rect: &PixelRect, color: Rgb<u8>) {
    let (x0, y0, x1, y1) = rect.to_pixel_corners();
    if x1 < x0 || y1 < y0 {
        return;
    }
    let area = Rect::at(x0, y0).of_size((x1 - x0 + 1) as u32, (y1 - y0 + 1) as u32);
    draw_filled_rect_mut(canvas, area, color);
}
