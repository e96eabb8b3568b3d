//! Per-turtle state and the user-facing handle.
//!
//! [`TurtleState`] is everything the engine tracks for one cursor.
//! [`Turtle`] is a short-lived handle borrowed from the screen; every call
//! on it enqueues exactly one operation and returns the [`Pending`] that
//! resolves when the scheduler commits it.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::color::{Color, ColorSpec};
use crate::errors::TurtleError;
use crate::geometry::{wpt, WorldMap, WorldPoint};
use crate::history::{TurtleSnapshot, UndoLog};
use crate::ops::{self, TurtleOp};
use crate::queue::{Pending, Speed};
use crate::screen::{Screen, ScreenConfig};
use crate::shapes::{Stamp, StretchFactors};
use crate::surface::{FillRule, Font, SavedRegion, TextAlign};

/// Identifies one turtle on a screen.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TurtleId(pub(crate) usize);

/// How pen width reacts when the world mapping changes scale.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ResizeMode {
    /// Width stays constant in screen pixels.
    #[default]
    Noresize,
    /// Width follows the world scale automatically.
    Auto,
    /// Width follows the world scale, as set by the user.
    User,
}

impl fmt::Display for ResizeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ResizeMode::Noresize => "noresize",
            ResizeMode::Auto => "auto",
            ResizeMode::User => "user",
        };
        f.write_str(s)
    }
}

impl FromStr for ResizeMode {
    type Err = TurtleError;

    fn from_str(s: &str) -> Result<ResizeMode, TurtleError> {
        match s.to_ascii_lowercase().as_str() {
            "noresize" => Ok(ResizeMode::Noresize),
            "auto" => Ok(ResizeMode::Auto),
            "user" => Ok(ResizeMode::User),
            _ => Err(TurtleError::InvalidResizeMode {
                value: s.to_string(),
            }),
        }
    }
}

/// Everything tracked for one cursor.
pub struct TurtleState {
    pub pos: WorldPoint,
    /// Degrees counterclockwise from east, normalized to `[0, 360)` when
    /// at rest. Stored in degrees regardless of the angle-unit setting.
    pub heading: f64,
    pub pen_down: bool,
    pub pen_color: Color,
    pub pen_size: f64,
    pub fill_color: Color,
    pub filling: bool,
    /// Accumulated fill path while a fill is open.
    pub fill_points: Vec<WorldPoint>,
    pub visible: bool,
    pub shape: String,
    pub stretch: StretchFactors,
    /// Queryable glyph tilt; tracked but not applied to the drawn glyph.
    pub tilt: f64,
    pub speed: Speed,
    pub resize_mode: ResizeMode,
    /// Size of a full circle in the user's angle units.
    pub fullcircle: f64,
    /// Nominal glyph radius, used to size the saved region under it.
    pub turtle_size: f64,
    /// Pixels under the currently drawn glyph, put back before redrawing.
    pub saved_under: Option<SavedRegion>,
    pub stamps: BTreeMap<u64, Stamp>,
    pub next_stamp: u64,
    pub history: UndoLog,
    /// Vertices being recorded between `begin_poly` and `end_poly`.
    pub poly: Option<Vec<WorldPoint>>,
    pub last_poly: Option<Vec<WorldPoint>>,
}

impl TurtleState {
    pub(crate) fn new(config: &ScreenConfig) -> TurtleState {
        TurtleState {
            pos: wpt(0.0, 0.0),
            heading: 0.0,
            pen_down: true,
            pen_color: config.pen_color,
            pen_size: 1.0,
            fill_color: config.fill_color,
            filling: false,
            fill_points: Vec::new(),
            visible: true,
            shape: config.shape.clone(),
            stretch: StretchFactors::default(),
            tilt: 0.0,
            speed: config.speed,
            resize_mode: ResizeMode::default(),
            fullcircle: 360.0,
            turtle_size: 10.0,
            saved_under: None,
            stamps: BTreeMap::new(),
            next_stamp: 1,
            history: UndoLog::new(config.undo_capacity),
            poly: None,
            last_poly: None,
        }
    }

    /// Back to the initial pose and pen; shape, speed, and angle units
    /// survive.
    pub fn default_pose(&mut self) {
        self.pos = wpt(0.0, 0.0);
        self.heading = 0.0;
        self.pen_down = true;
        self.pen_color = Color::BLACK;
        self.pen_size = 1.0;
        self.fill_color = Color::BLACK;
        self.filling = false;
        self.fill_points.clear();
        self.visible = true;
        self.stretch = StretchFactors::default();
        self.tilt = 0.0;
        self.resize_mode = ResizeMode::default();
        self.poly = None;
    }

    pub fn snapshot(&self, bounds: WorldMap) -> TurtleSnapshot {
        TurtleSnapshot {
            pos: self.pos,
            heading: self.heading,
            pen_down: self.pen_down,
            pen_color: self.pen_color,
            pen_size: self.pen_size,
            visible: self.visible,
            fill_color: self.fill_color,
            filling: self.filling,
            bounds,
            resize_mode: self.resize_mode,
            stretch: self.stretch,
        }
    }

    pub fn restore(&mut self, snap: &TurtleSnapshot) {
        self.pos = snap.pos;
        self.heading = snap.heading;
        self.pen_down = snap.pen_down;
        self.pen_color = snap.pen_color;
        self.pen_size = snap.pen_size;
        self.visible = snap.visible;
        self.fill_color = snap.fill_color;
        self.filling = snap.filling;
        self.resize_mode = snap.resize_mode;
        self.stretch = snap.stretch;
    }
}

/// A borrowed handle to one turtle. Calls enqueue; the screen's frame
/// clock executes.
pub struct Turtle<'s> {
    pub(crate) screen: &'s mut Screen,
    pub(crate) idx: usize,
}

impl Turtle<'_> {
    fn enqueue(&mut self, op: impl Into<TurtleOp>) -> Pending {
        self.screen.enqueue(self.idx, op.into())
    }

    pub fn id(&self) -> TurtleId {
        TurtleId(self.idx)
    }

    // movement

    pub fn forward(&mut self, distance: f64) -> Pending {
        self.enqueue(ops::Forward::new(distance))
    }

    pub fn backward(&mut self, distance: f64) -> Pending {
        self.enqueue(ops::Forward::new(-distance))
    }

    pub fn right(&mut self, angle: f64) -> Pending {
        self.enqueue(ops::Turn::new(angle))
    }

    pub fn left(&mut self, angle: f64) -> Pending {
        self.enqueue(ops::Turn::new(-angle))
    }

    pub fn goto(&mut self, x: f64, y: f64) -> Pending {
        self.enqueue(ops::Goto::new(Some(x), Some(y)))
    }

    pub fn set_x(&mut self, x: f64) -> Pending {
        self.enqueue(ops::Goto::new(Some(x), None))
    }

    pub fn set_y(&mut self, y: f64) -> Pending {
        self.enqueue(ops::Goto::new(None, Some(y)))
    }

    pub fn set_heading(&mut self, angle: f64) -> Pending {
        self.enqueue(ops::SetHeading::new(angle))
    }

    pub fn home(&mut self) -> Pending {
        self.enqueue(ops::Home::new())
    }

    pub fn circle(&mut self, radius: f64, extent: Option<f64>, steps: Option<usize>) -> Pending {
        self.enqueue(ops::Circle::new(radius, extent, steps))
    }

    pub fn teleport(&mut self, x: f64, y: f64) -> Pending {
        self.enqueue(ops::Teleport {
            x,
            y,
            fill_gap: false,
        })
    }

    pub fn teleport_fill_gap(&mut self, x: f64, y: f64) -> Pending {
        self.enqueue(ops::Teleport {
            x,
            y,
            fill_gap: true,
        })
    }

    // pen

    pub fn pen_up(&mut self) -> Pending {
        self.enqueue(ops::PenUp)
    }

    pub fn pen_down(&mut self) -> Pending {
        self.enqueue(ops::PenDown)
    }

    pub fn set_pen_size(&mut self, size: f64) -> Pending {
        self.enqueue(ops::PenSize { size: Some(size) })
    }

    pub fn pen_size(&mut self) -> Pending {
        self.enqueue(ops::PenSize { size: None })
    }

    pub fn set_pen_color(&mut self, color: impl Into<ColorSpec>) -> Pending {
        self.enqueue(ops::PenColor {
            spec: Some(color.into()),
        })
    }

    pub fn pen_color(&mut self) -> Pending {
        self.enqueue(ops::PenColor { spec: None })
    }

    pub fn set_fill_color(&mut self, color: impl Into<ColorSpec>) -> Pending {
        self.enqueue(ops::FillColor {
            spec: Some(color.into()),
        })
    }

    pub fn fill_color(&mut self) -> Pending {
        self.enqueue(ops::FillColor { spec: None })
    }

    /// Set pen and fill color at once.
    pub fn set_color(&mut self, color: impl Into<ColorSpec>) -> Pending {
        let spec: ColorSpec = color.into();
        self.enqueue(ops::ColorBoth {
            pen: Some(spec.clone()),
            fill: Some(spec),
        })
    }

    pub fn color(&mut self) -> Pending {
        self.enqueue(ops::ColorBoth {
            pen: None,
            fill: None,
        })
    }

    pub fn dot(&mut self, size: Option<f64>, color: Option<ColorSpec>) -> Pending {
        self.enqueue(ops::Dot { size, color })
    }

    // fill

    pub fn begin_fill(&mut self) -> Pending {
        self.enqueue(ops::BeginFill)
    }

    pub fn end_fill(&mut self) -> Pending {
        self.enqueue(ops::EndFill {
            rule: FillRule::default(),
        })
    }

    pub fn end_fill_with(&mut self, rule: FillRule) -> Pending {
        self.enqueue(ops::EndFill { rule })
    }

    pub fn filling(&mut self) -> Pending {
        self.enqueue(ops::Filling)
    }

    // glyph

    pub fn show(&mut self) -> Pending {
        self.enqueue(ops::Show)
    }

    pub fn hide(&mut self) -> Pending {
        self.enqueue(ops::Hide)
    }

    pub fn is_visible(&mut self) -> Pending {
        self.enqueue(ops::IsVisible)
    }

    pub fn set_shape(&mut self, name: impl Into<String>) -> Pending {
        self.enqueue(ops::SetShape {
            name: Some(name.into()),
        })
    }

    pub fn shape(&mut self) -> Pending {
        self.enqueue(ops::SetShape { name: None })
    }

    pub fn set_shape_size(
        &mut self,
        width: Option<f64>,
        length: Option<f64>,
        outline: Option<f64>,
    ) -> Pending {
        self.enqueue(ops::ShapeSize {
            width,
            length,
            outline,
        })
    }

    pub fn shape_size(&mut self) -> Pending {
        self.enqueue(ops::ShapeSize {
            width: None,
            length: None,
            outline: None,
        })
    }

    pub fn tilt(&mut self, angle: f64) -> Pending {
        self.enqueue(ops::Tilt { delta: angle })
    }

    pub fn set_tilt_angle(&mut self, angle: f64) -> Pending {
        self.enqueue(ops::TiltAngle { angle: Some(angle) })
    }

    pub fn tilt_angle(&mut self) -> Pending {
        self.enqueue(ops::TiltAngle { angle: None })
    }

    pub fn set_resize_mode(&mut self, mode: ResizeMode) -> Pending {
        self.enqueue(ops::SetResizeMode { mode: Some(mode) })
    }

    pub fn resize_mode(&mut self) -> Pending {
        self.enqueue(ops::SetResizeMode { mode: None })
    }

    // stamps

    pub fn stamp(&mut self) -> Pending {
        self.enqueue(ops::PlaceStamp)
    }

    pub fn clear_stamp(&mut self, id: u64) -> Pending {
        self.enqueue(ops::ClearStamp { id })
    }

    /// `None` clears all stamps; positive `n` the oldest `n`, negative the
    /// newest `-n`.
    pub fn clear_stamps(&mut self, n: Option<i64>) -> Pending {
        self.enqueue(ops::ClearStamps { n })
    }

    // undo

    pub fn undo(&mut self) -> Pending {
        self.enqueue(ops::Undo)
    }

    pub fn set_undo_buffer(&mut self, size: Option<usize>) -> Pending {
        self.enqueue(ops::SetUndoBuffer { size })
    }

    pub fn undo_buffer_entries(&mut self) -> Pending {
        self.enqueue(ops::UndoEntries)
    }

    // polygon recording

    pub fn begin_poly(&mut self) -> Pending {
        self.enqueue(ops::BeginPoly)
    }

    pub fn end_poly(&mut self) -> Pending {
        self.enqueue(ops::EndPoly)
    }

    pub fn get_poly(&mut self) -> Pending {
        self.enqueue(ops::GetPoly)
    }

    // queries

    pub fn position(&mut self) -> Pending {
        self.enqueue(ops::Position)
    }

    pub fn heading(&mut self) -> Pending {
        self.enqueue(ops::Heading)
    }

    pub fn towards(&mut self, x: f64, y: f64) -> Pending {
        self.enqueue(ops::Towards { x, y })
    }

    pub fn distance(&mut self, x: f64, y: f64) -> Pending {
        self.enqueue(ops::DistanceTo { x, y })
    }

    pub fn xcor(&mut self) -> Pending {
        self.enqueue(ops::Xcor)
    }

    pub fn ycor(&mut self) -> Pending {
        self.enqueue(ops::Ycor)
    }

    pub fn is_down(&mut self) -> Pending {
        self.enqueue(ops::IsDown)
    }

    // misc

    pub fn set_speed(&mut self, speed: Speed) -> Pending {
        self.enqueue(ops::SetSpeed { speed: Some(speed) })
    }

    pub fn speed(&mut self) -> Pending {
        self.enqueue(ops::SetSpeed { speed: None })
    }

    /// Measure angles in degrees, or any other full-circle size.
    pub fn degrees(&mut self, fullcircle: Option<f64>) -> Pending {
        self.enqueue(ops::SetAngleUnits {
            fullcircle: fullcircle.unwrap_or(360.0),
        })
    }

    pub fn radians(&mut self) -> Pending {
        self.enqueue(ops::SetAngleUnits {
            fullcircle: std::f64::consts::TAU,
        })
    }

    pub fn write(&mut self, text: impl Into<String>) -> Pending {
        self.write_with(text, false, TextAlign::Left, Font::default())
    }

    pub fn write_with(
        &mut self,
        text: impl Into<String>,
        advance: bool,
        align: TextAlign,
        font: Font,
    ) -> Pending {
        self.enqueue(ops::WriteText {
            text: text.into(),
            advance,
            align,
            font,
        })
    }

    pub fn clear(&mut self) -> Pending {
        self.enqueue(ops::ClearDrawing)
    }

    pub fn reset(&mut self) -> Pending {
        self.enqueue(ops::Reset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resize_mode_round_trips_through_strings() {
        for mode in [ResizeMode::Noresize, ResizeMode::Auto, ResizeMode::User] {
            assert_eq!(mode.to_string().parse::<ResizeMode>().unwrap(), mode);
        }
        assert!(matches!(
            "stretch".parse::<ResizeMode>(),
            Err(TurtleError::InvalidResizeMode { .. })
        ));
    }
}
