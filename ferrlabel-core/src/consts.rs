use image::{Rgb, Rgba};

/// Bucket the images are read from when no other bucket is configured.
pub const DEFAULT_BUCKET: &str = "image-label-generator";

/// Minimum confidence, in percent, a label must reach to be returned by the
/// label service.
pub const DEFAULT_MIN_CONFIDENCE: f32 = 90.0;

/// Prefix of the local file an object is downloaded to.
///
/// The object `cat.jpg` lands in `downloaded_cat.jpg`, and the annotated
/// image later overwrites that same file.
pub const DOWNLOAD_PREFIX: &str = "downloaded_";

/// Bold truetype font used for captions.
pub const FONT_NAME: &str = "DejaVuSans-Bold.ttf";

/// Caption font size in pixels.
pub const FONT_SIZE: f32 = 16.0;

/// Environment variable naming an extra directory to search for [`FONT_NAME`].
pub const FONT_DIR_ENV_NAME: &str = "FERRLABEL_FONT_DIR";

/// Directories searched for the caption font after the working directory.
pub const FONT_SEARCH_DIRS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu",
    "/usr/share/fonts/dejavu",
    "/usr/share/fonts/TTF",
    "/usr/local/share/fonts",
    "/Library/Fonts",
    "C:\\Windows\\Fonts",
];

/// Cell size of the built-in bitmap font, in glyph pixels.
pub const BUILTIN_GLYPH_SIZE: u32 = 8;

/// Outline color of a detected instance.
pub const BOX_COLOR: Rgb<u8> = Rgb([255, 0, 0]);

/// Outline stroke of a detected instance, in pixels.
pub const BOX_STROKE: u32 = 5;

/// Caption background fill.
///
/// The alpha is dropped when drawing onto the RGB canvas, so the fill renders
/// opaque.
pub const CAPTION_FILL: Rgba<u8> = Rgba([255, 255, 255, 128]);

/// Caption background border color.
pub const CAPTION_BORDER_COLOR: Rgb<u8> = Rgb([0, 0, 0]);

/// Caption background border stroke, in pixels.
pub const CAPTION_BORDER_STROKE: u32 = 2;

/// Caption text color.
pub const CAPTION_TEXT_COLOR: Rgb<u8> = Rgb([255, 0, 0]);
