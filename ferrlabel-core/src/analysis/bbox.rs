use glam::Vec2;
use serde::Serialize;
use snafu::ensure;

use crate::error::{FerrlabelError, InvalidBoxSnafu};

/// A bounding box expressed as fractions of the image width and height.
///
/// The origin is the top-left corner of the image, so `left` and `top` locate
/// the top-left corner of the box and `width`/`height` its extent. Every
/// component lies in `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct NormalizedBox {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl NormalizedBox {
    /// Creates a normalized box, rejecting any component outside `[0, 1]`.
    ///
    /// # Example
    /// ```
    /// use ferrlabel_core::analysis::bbox::NormalizedBox;
    /// assert!(NormalizedBox::new(0.25, 0.2, 0.5, 0.3).is_ok());
    /// assert!(NormalizedBox::new(-0.1, 0.2, 0.5, 0.3).is_err());
    /// ```
    pub fn new(left: f32, top: f32, width: f32, height: f32) -> Result<Self, FerrlabelError> {
        for (component, value) in [
            ("left", left),
            ("top", top),
            ("width", width),
            ("height", height),
        ] {
            ensure!(
                (0.0..=1.0).contains(&value),
                InvalidBoxSnafu { component, value }
            );
        }

        Ok(Self {
            left,
            top,
            width,
            height,
        })
    }

    /// Scales this box to absolute pixel coordinates of an image of `image_size`.
    ///
    /// # Example
    /// ```
    /// use glam::Vec2;
    /// use ferrlabel_core::analysis::bbox::NormalizedBox;
    /// let normalized = NormalizedBox::new(0.25, 0.5, 0.5, 0.25).unwrap();
    /// let rect = normalized.to_pixel_rect(Vec2::new(200.0, 100.0));
    /// assert_eq!(rect.min, Vec2::new(50.0, 50.0));
    /// assert_eq!(rect.max, Vec2::new(150.0, 75.0));
    /// ```
    pub fn to_pixel_rect(&self, image_size: Vec2) -> PixelRect {
        let min = Vec2::new(self.left, self.top) * image_size;
        let size = Vec2::new(self.width, self.height) * image_size;

        PixelRect::new_from_min_size(min, size)
    }
}

/// An axis-aligned rectangle in absolute pixel coordinates.
///
/// `min` is the top-left corner and `max` the bottom-right corner, with Y
/// increasing downward as in image coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct PixelRect {
    /// The top-left corner.
    pub min: Vec2,
    /// The bottom-right corner.
    pub max: Vec2,
}

impl PixelRect {
    /// Creates a rectangle from its top-left and bottom-right corners.
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    /// Creates a rectangle from its top-left corner and a size vector.
    ///
    /// # Example
    /// ```
    /// use glam::Vec2;
    /// use ferrlabel_core::analysis::bbox::PixelRect;
    /// let rect = PixelRect::new_from_min_size(Vec2::new(1.0, 2.0), Vec2::new(5.0, 3.0));
    /// assert_eq!(rect.max, Vec2::new(6.0, 5.0));
    /// ```
    pub fn new_from_min_size(min: Vec2, size: Vec2) -> Self {
        Self {
            min,
            max: min + size,
        }
    }

    pub fn left(&self) -> f32 {
        self.min.x
    }

    pub fn top(&self) -> f32 {
        self.min.y
    }

    pub fn right(&self) -> f32 {
        self.max.x
    }

    pub fn bottom(&self) -> f32 {
        self.max.y
    }

    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }

    /// The rectangle of `size` whose bottom-left corner sits on this
    /// rectangle's top-left corner.
    ///
    /// Used to place a caption directly above a box. The result is not
    /// clamped, so it may extend past the top or right edge of the image.
    ///
    /// # Example
    /// ```
    /// use glam::Vec2;
    /// use ferrlabel_core::analysis::bbox::PixelRect;
    /// let rect = PixelRect::new(Vec2::new(50.0, 20.0), Vec2::new(150.0, 50.0));
    /// let above = rect.stacked_above(Vec2::new(40.0, 12.0));
    /// assert_eq!(above.min, Vec2::new(50.0, 8.0));
    /// assert_eq!(above.max, Vec2::new(90.0, 20.0));
    /// ```
    pub fn stacked_above(&self, size: Vec2) -> Self {
        Self {
            min: Vec2::new(self.min.x, self.min.y - size.y),
            max: Vec2::new(self.min.x + size.x, self.min.y),
        }
    }

    /// Snaps the corners to the pixel grid, truncating fractional pixels
    /// toward the top-left.
    ///
    /// Both corners are inclusive: a rectangle from `(50, 20)` to
    /// `(150, 50)` covers 101 columns and 31 rows.
    pub fn to_pixel_corners(&self) -> (i32, i32, i32, i32) {
        (
            self.min.x.floor() as i32,
            self.min.y.floor() as i32,
            self.max.x.floor() as i32,
            self.max.y.floor() as i32,
        )
    }
}
