//! Cursor glyph shapes, the shape registry, and glyph placement.
//!
//! Shape points are defined in a local frame: y is "ahead" of the turtle
//! before rotation, x is to its right. [`place_glyph`] applies stretch,
//! heading rotation, and translation to produce screen points.

use std::collections::HashMap;

use glam::DVec2;

use crate::color::Color;
use crate::geometry::{spt, ScreenPoint, WorldPoint};

/// Per-axis glyph scaling plus outline width, set by `shape_size`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StretchFactors {
    pub width: f64,
    pub length: f64,
    pub outline: f64,
}

impl Default for StretchFactors {
    fn default() -> StretchFactors {
        StretchFactors {
            width: 1.0,
            length: 1.0,
            outline: 1.0,
        }
    }
}

/// A stamped glyph: a frozen copy of the cursor, replayed on redraw.
#[derive(Clone, Debug)]
pub struct Stamp {
    pub id: u64,
    pub pos: WorldPoint,
    pub heading: f64,
    pub shape: String,
    pub stretch: StretchFactors,
    pub color: Color,
    pub pen_size: f64,
}

/// Registry of named glyph shapes.
pub struct ShapeTable {
    shapes: HashMap<String, Vec<DVec2>>,
}

impl Default for ShapeTable {
    fn default() -> ShapeTable {
        let mut table = ShapeTable {
            shapes: HashMap::new(),
        };
        table.register("classic", CLASSIC.to_vec());
        table.register("arrow", ARROW.to_vec());
        table.register("turtle", TURTLE.to_vec());
        table.register("square", SQUARE.to_vec());
        table.register("triangle", TRIANGLE.to_vec());
        let circle: Vec<DVec2> = (0..36)
            .map(|i| {
                let a = (i as f64 * 10.0).to_radians();
                DVec2::new(a.sin() * 10.0, a.cos() * 10.0)
            })
            .collect();
        table.register("circle", circle);
        table
    }
}

impl ShapeTable {
    pub fn register(&mut self, name: &str, points: Vec<DVec2>) {
        self.shapes.insert(name.to_string(), points);
    }

    pub fn get(&self, name: &str) -> Option<&[DVec2]> {
        self.shapes.get(name).map(Vec::as_slice)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.shapes.contains_key(name)
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.shapes.keys().cloned().collect();
        names.sort();
        names
    }
}

/// Transform local shape points to screen points for a glyph drawn at `at`.
///
/// Stretch scales x by width and y by length. The local nose (+y) maps to
/// the screen heading direction and the local right (+x) to the turtle's
/// right, with screen y pointing down.
pub fn place_glyph(
    points: &[DVec2],
    stretch: StretchFactors,
    heading_deg: f64,
    at: ScreenPoint,
) -> Vec<ScreenPoint> {
    let (sin, cos) = heading_deg.to_radians().sin_cos();
    points
        .iter()
        .map(|p| {
            let scaled = DVec2::new(p.x * stretch.width, p.y * stretch.length);
            let rotated = DVec2::new(
                scaled.x * sin + scaled.y * cos,
                scaled.x * cos - scaled.y * sin,
            );
            spt(at.x() + rotated.x, at.y() + rotated.y)
        })
        .collect()
}

#[rustfmt::skip]
static CLASSIC: &[DVec2] = &[
    DVec2::new(0.0, 0.0), DVec2::new(-5.0, -9.0),
    DVec2::new(0.0, -7.0), DVec2::new(5.0, -9.0),
];

#[rustfmt::skip]
static ARROW: &[DVec2] = &[
    DVec2::new(0.0, 10.0), DVec2::new(-5.0, 0.0), DVec2::new(5.0, 0.0),
];

#[rustfmt::skip]
static SQUARE: &[DVec2] = &[
    DVec2::new(10.0, -10.0), DVec2::new(10.0, 10.0),
    DVec2::new(-10.0, 10.0), DVec2::new(-10.0, -10.0),
];

#[rustfmt::skip]
static TRIANGLE: &[DVec2] = &[
    DVec2::new(0.0, 10.0), DVec2::new(-10.0, -10.0), DVec2::new(10.0, -10.0),
];

#[rustfmt::skip]
static TURTLE: &[DVec2] = &[
    DVec2::new(0.0, 16.0), DVec2::new(-2.0, 14.0), DVec2::new(-1.0, 10.0),
    DVec2::new(-4.0, 7.0), DVec2::new(-7.0, 9.0), DVec2::new(-9.0, 8.0),
    DVec2::new(-6.0, 5.0), DVec2::new(-7.0, 1.0), DVec2::new(-5.0, -3.0),
    DVec2::new(-8.0, -6.0), DVec2::new(-6.0, -8.0), DVec2::new(-4.0, -5.0),
    DVec2::new(0.0, -7.0), DVec2::new(4.0, -5.0), DVec2::new(6.0, -8.0),
    DVec2::new(8.0, -6.0), DVec2::new(5.0, -3.0), DVec2::new(7.0, 1.0),
    DVec2::new(6.0, 5.0), DVec2::new(9.0, 8.0), DVec2::new(7.0, 9.0),
    DVec2::new(4.0, 7.0), DVec2::new(1.0, 10.0), DVec2::new(2.0, 14.0),
];
