//! A recording [`Surface`] that logs every primitive as a normalized line
//! of text. The tests compare these logs to verify that incremental drawing
//! and full replays produce the same picture.

use std::cell::RefCell;
use std::rc::Rc;

use crate::color::Color;
use crate::errors::TurtleError;
use crate::geometry::ScreenPoint;
use crate::surface::{
    FillRule, Font, ImageId, Rect, SavedRegion, Stroke, Surface, TextAlign,
};

pub struct TraceSurface {
    width: u32,
    height: u32,
    ops: Vec<String>,
    next_image: u64,
}

impl TraceSurface {
    pub fn new(width: u32, height: u32) -> TraceSurface {
        TraceSurface {
            width,
            height,
            ops: Vec::new(),
            next_image: 1,
        }
    }

    /// Everything recorded so far.
    pub fn ops(&self) -> &[String] {
        &self.ops
    }

    /// Drain the log.
    pub fn take(&mut self) -> Vec<String> {
        std::mem::take(&mut self.ops)
    }

    /// Only the stroked segments, in order. Clears and region restores are
    /// skipped, so an incremental log and a replayed log of the same picture
    /// compare equal.
    pub fn lines(&self) -> Vec<String> {
        self.ops
            .iter()
            .filter(|op| op.starts_with("line "))
            .cloned()
            .collect()
    }

    pub fn fills(&self) -> Vec<String> {
        self.ops
            .iter()
            .filter(|op| op.starts_with("fill"))
            .cloned()
            .collect()
    }
}

/// Fixed-point formatting: three decimals, trailing zeros trimmed,
/// negative zero folded to zero.
fn fmt3(v: f64) -> String {
    let mut s = format!("{v:.3}");
    if s.contains('.') {
        while s.ends_with('0') {
            s.pop();
        }
        if s.ends_with('.') {
            s.pop();
        }
    }
    if s == "-0" {
        s = "0".to_string();
    }
    s
}

fn fmt_point(p: ScreenPoint) -> String {
    format!("({},{})", fmt3(p.x()), fmt3(p.y()))
}

fn fmt_points(points: &[ScreenPoint]) -> String {
    points.iter().map(|p| fmt_point(*p)).collect::<Vec<_>>().join(" ")
}

impl Surface for TraceSurface {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn set_size(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.ops.push(format!("resize {width}x{height}"));
    }

    fn stroke_path(&mut self, points: &[ScreenPoint], stroke: Stroke) {
        // one entry per segment so replays chunked differently still match
        for pair in points.windows(2) {
            self.ops.push(format!(
                "line {}->{} {} w{}",
                fmt_point(pair[0]),
                fmt_point(pair[1]),
                stroke.color,
                fmt3(stroke.width),
            ));
        }
    }

    fn fill_path(&mut self, points: &[ScreenPoint], color: Color, rule: FillRule) {
        let tag = match rule {
            FillRule::EvenOdd => "evenodd",
            FillRule::NonZero => "nonzero",
        };
        self.ops
            .push(format!("fill[{tag}] {color} ({})", fmt_points(points)));
    }

    fn fill_polygon(&mut self, points: &[ScreenPoint], fill: Color, stroke: Stroke) {
        self.ops.push(format!(
            "poly {fill}/{} w{} ({})",
            stroke.color,
            fmt3(stroke.width),
            fmt_points(points),
        ));
    }

    fn fill_circle(&mut self, center: ScreenPoint, radius: f64, color: Color) {
        self.ops.push(format!(
            "dot {} r={} {color}",
            fmt_point(center),
            fmt3(radius),
        ));
    }

    fn clear_region(&mut self, rect: Rect) {
        self.ops.push(format!(
            "clear {}x{}@{}",
            fmt3(rect.w),
            fmt3(rect.h),
            fmt_point(crate::geometry::spt(rect.x, rect.y)),
        ));
    }

    fn clear_all(&mut self) {
        self.ops.push("clear-all".to_string());
    }

    fn get_region(&mut self, rect: Rect) -> SavedRegion {
        // no raster to capture; an empty region restores as a no-op
        SavedRegion {
            rect,
            data: Vec::new(),
        }
    }

    fn put_region(&mut self, region: &SavedRegion) {
        if !region.data.is_empty() {
            self.ops.push(format!(
                "restore {}x{}@{}",
                fmt3(region.rect.w),
                fmt3(region.rect.h),
                fmt_point(crate::geometry::spt(region.rect.x, region.rect.y)),
            ));
        }
    }

    fn set_background(&mut self, color: Option<Color>) {
        match color {
            Some(c) => self.ops.push(format!("background {c}")),
            None => self.ops.push("background none".to_string()),
        }
    }

    fn load_image(&mut self, source: &str) -> Result<ImageId, TurtleError> {
        if source.is_empty() || source.contains("missing") {
            return Err(TurtleError::BackgroundImage {
                source_name: source.to_string(),
            });
        }
        let id = ImageId(self.next_image);
        self.next_image += 1;
        self.ops.push(format!("image {source} -> {}", id.0));
        Ok(id)
    }

    fn set_background_image(&mut self, image: Option<ImageId>) {
        match image {
            Some(id) => self.ops.push(format!("background-image {}", id.0)),
            None => self.ops.push("background-image none".to_string()),
        }
    }

    fn measure_text(&mut self, text: &str, font: &Font) -> f64 {
        // crude but stable: proportional to glyph count and size
        text.chars().count() as f64 * font.size * 0.6
    }

    fn draw_text(
        &mut self,
        text: &str,
        pos: ScreenPoint,
        rotation_deg: f64,
        color: Color,
        font: &Font,
        align: TextAlign,
    ) {
        let align = match align {
            TextAlign::Left => "left",
            TextAlign::Center => "center",
            TextAlign::Right => "right",
        };
        self.ops.push(format!(
            "text {:?} @{} rot={} {color} {}pt {align}",
            text,
            fmt_point(pos),
            fmt3(rotation_deg),
            fmt3(font.size),
        ));
    }
}

/// A [`TraceSurface`] behind shared ownership, so a test can keep a handle
/// to the log after handing the surface to a screen.
#[derive(Clone)]
pub struct SharedTraceSurface(Rc<RefCell<TraceSurface>>);

impl SharedTraceSurface {
    pub fn new(width: u32, height: u32) -> SharedTraceSurface {
        SharedTraceSurface(Rc::new(RefCell::new(TraceSurface::new(width, height))))
    }

    pub fn ops(&self) -> Vec<String> {
        self.0.borrow().ops().to_vec()
    }

    pub fn lines(&self) -> Vec<String> {
        self.0.borrow().lines()
    }

    pub fn fills(&self) -> Vec<String> {
        self.0.borrow().fills()
    }

    pub fn take(&self) -> Vec<String> {
        self.0.borrow_mut().take()
    }
}

impl Surface for SharedTraceSurface {
    fn size(&self) -> (u32, u32) {
        self.0.borrow().size()
    }

    fn set_size(&mut self, width: u32, height: u32) {
        self.0.borrow_mut().set_size(width, height)
    }

    fn stroke_path(&mut self, points: &[ScreenPoint], stroke: Stroke) {
        self.0.borrow_mut().stroke_path(points, stroke)
    }

    fn fill_path(&mut self, points: &[ScreenPoint], color: Color, rule: FillRule) {
        self.0.borrow_mut().fill_path(points, color, rule)
    }

    fn fill_polygon(&mut self, points: &[ScreenPoint], fill: Color, stroke: Stroke) {
        self.0.borrow_mut().fill_polygon(points, fill, stroke)
    }

    fn fill_circle(&mut self, center: ScreenPoint, radius: f64, color: Color) {
        self.0.borrow_mut().fill_circle(center, radius, color)
    }

    fn clear_region(&mut self, rect: Rect) {
        self.0.borrow_mut().clear_region(rect)
    }

    fn clear_all(&mut self) {
        self.0.borrow_mut().clear_all()
    }

    fn get_region(&mut self, rect: Rect) -> SavedRegion {
        self.0.borrow_mut().get_region(rect)
    }

    fn put_region(&mut self, region: &SavedRegion) {
        self.0.borrow_mut().put_region(region)
    }

    fn set_background(&mut self, color: Option<Color>) {
        self.0.borrow_mut().set_background(color)
    }

    fn load_image(&mut self, source: &str) -> Result<ImageId, TurtleError> {
        self.0.borrow_mut().load_image(source)
    }

    fn set_background_image(&mut self, image: Option<ImageId>) {
        self.0.borrow_mut().set_background_image(image)
    }

    fn measure_text(&mut self, text: &str, font: &Font) -> f64 {
        self.0.borrow_mut().measure_text(text, font)
    }

    fn draw_text(
        &mut self,
        text: &str,
        pos: ScreenPoint,
        rotation_deg: f64,
        color: Color,
        font: &Font,
        align: TextAlign,
    ) {
        self.0
            .borrow_mut()
            .draw_text(text, pos, rotation_deg, color, font, align)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::spt;

    #[test]
    fn segments_logged_individually() {
        let mut t = TraceSurface::new(100, 100);
        let stroke = Stroke {
            color: Color::BLACK,
            width: 1.0,
        };
        t.stroke_path(&[spt(0.0, 0.0), spt(10.0, 0.0), spt(10.0, 10.0)], stroke);
        assert_eq!(
            t.lines(),
            vec![
                "line (0,0)->(10,0) #000000 w1",
                "line (10,0)->(10,10) #000000 w1",
            ]
        );
    }

    #[test]
    fn number_formatting_trims() {
        assert_eq!(fmt3(1.5), "1.5");
        assert_eq!(fmt3(2.0), "2");
        assert_eq!(fmt3(0.12345), "0.123");
        assert_eq!(fmt3(-0.0001), "0");
    }

    #[test]
    fn chunked_strokes_match_single_stroke() {
        let stroke = Stroke {
            color: Color::BLACK,
            width: 1.0,
        };
        let mut a = TraceSurface::new(10, 10);
        a.stroke_path(&[spt(0.0, 0.0), spt(5.0, 0.0), spt(5.0, 5.0)], stroke);
        let mut b = TraceSurface::new(10, 10);
        b.stroke_path(&[spt(0.0, 0.0), spt(5.0, 0.0)], stroke);
        b.stroke_path(&[spt(5.0, 0.0), spt(5.0, 5.0)], stroke);
        assert_eq!(a.lines(), b.lines());
    }
}
