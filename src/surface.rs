//! The drawing backend boundary.
//!
//! Everything the engine paints goes through [`Surface`]. A backend can be
//! a raster canvas, a vector recorder, or the in-crate [`TraceSurface`]
//! (crate::trace::TraceSurface) used by the tests.

use std::str::FromStr;

use crate::color::Color;
use crate::errors::TurtleError;
use crate::geometry::ScreenPoint;

/// An axis-aligned screen-space rectangle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Rect {
        Rect { x, y, w, h }
    }
}

/// Raster pixels captured from a surface region, restorable later.
///
/// Backends that cannot capture pixels return empty `data`; putting such a
/// region back is a no-op, which callers must tolerate.
#[derive(Clone, Debug, PartialEq)]
pub struct SavedRegion {
    pub rect: Rect,
    pub data: Vec<u8>,
}

/// Pen parameters for a stroked path.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Stroke {
    pub color: Color,
    pub width: f64,
}

/// Winding rule for filled paths.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum FillRule {
    #[default]
    EvenOdd,
    NonZero,
}

impl FromStr for FillRule {
    type Err = TurtleError;

    fn from_str(s: &str) -> Result<FillRule, TurtleError> {
        match s.to_ascii_lowercase().as_str() {
            "evenodd" => Ok(FillRule::EvenOdd),
            "nonzero" => Ok(FillRule::NonZero),
            _ => Err(TurtleError::InvalidFillRule {
                value: s.to_string(),
            }),
        }
    }
}

/// Text parameters for `write`.
#[derive(Clone, Debug, PartialEq)]
pub struct Font {
    pub family: String,
    pub size: f64,
    pub style: String,
}

impl Default for Font {
    fn default() -> Font {
        Font {
            family: "Arial".to_string(),
            size: 8.0,
            style: "normal".to_string(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

/// Opaque handle to an image loaded by the backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ImageId(pub u64);

/// A drawing backend.
pub trait Surface {
    /// Surface dimensions in pixels.
    fn size(&self) -> (u32, u32);

    fn set_size(&mut self, width: u32, height: u32);

    /// Stroke an open polyline.
    fn stroke_path(&mut self, points: &[ScreenPoint], stroke: Stroke);

    /// Fill a closed path under the given winding rule.
    fn fill_path(&mut self, points: &[ScreenPoint], color: Color, rule: FillRule);

    /// Fill and outline a polygon in one call (turtle glyphs, stamps).
    fn fill_polygon(&mut self, points: &[ScreenPoint], fill: Color, stroke: Stroke);

    /// Fill a circle (dots).
    fn fill_circle(&mut self, center: ScreenPoint, radius: f64, color: Color);

    fn clear_region(&mut self, rect: Rect);

    fn clear_all(&mut self);

    /// Capture pixels under `rect` for later restoration.
    fn get_region(&mut self, rect: Rect) -> SavedRegion;

    fn put_region(&mut self, region: &SavedRegion);

    fn set_background(&mut self, color: Option<Color>);

    /// Load an image resource by name or path.
    fn load_image(&mut self, source: &str) -> Result<ImageId, TurtleError>;

    fn set_background_image(&mut self, image: Option<ImageId>);

    /// Advance width of `text` in pixels.
    fn measure_text(&mut self, text: &str, font: &Font) -> f64;

    fn draw_text(
        &mut self,
        text: &str,
        pos: ScreenPoint,
        rotation_deg: f64,
        color: Color,
        font: &Font,
        align: TextAlign,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fill_rule_parsing() {
        assert_eq!("evenodd".parse::<FillRule>().unwrap(), FillRule::EvenOdd);
        assert_eq!("NonZero".parse::<FillRule>().unwrap(), FillRule::NonZero);
        assert!(matches!(
            "winding".parse::<FillRule>(),
            Err(TurtleError::InvalidFillRule { .. })
        ));
    }
}
