//! The operation catalog.
//!
//! Each public call on a [`Turtle`](crate::Turtle) handle becomes one value
//! of [`TurtleOp`]. The scheduler drives it through `begin`, zero or more
//! `frame` calls, and `finish`. Instant operations complete inside `begin`;
//! animated ones report a duration and are interpolated by the frame clock.
//!
//! `frame(1.0)` is always delivered before `finish`, so `finish` only
//! records bookkeeping and produces the resolved value.

use enum_dispatch::enum_dispatch;
use glam::DVec2;

use crate::color::ColorSpec;
use crate::errors::TurtleError;
use crate::geometry::{heading_vec, wpt, WorldPoint};
use crate::history::TextRecord;
use crate::log::debug;
use crate::queue::{Speed, Value};
use crate::screen::Screen;
use crate::shapes::StretchFactors;
use crate::surface::{FillRule, Font, TextAlign};
use crate::turtle::ResizeMode;

/// What `begin` decided: finish now, or animate for a while.
pub enum Launch {
    Done(Value),
    Animate { duration_ms: f64 },
}

#[enum_dispatch]
pub trait Operation {
    fn begin(&mut self, screen: &mut Screen, ti: usize) -> Result<Launch, TurtleError>;

    /// Advance an animated operation; `progress` is in `[0, 1]`.
    fn frame(&mut self, _screen: &mut Screen, _ti: usize, _progress: f64) {}

    /// Commit and produce the resolved value.
    fn finish(&mut self, _screen: &mut Screen, _ti: usize) -> Result<Value, TurtleError> {
        Ok(Value::None)
    }
}

#[enum_dispatch(Operation)]
pub enum TurtleOp {
    Forward,
    Goto,
    Turn,
    SetHeading,
    Home,
    Circle,
    Teleport,
    Dot,
    PenUp,
    PenDown,
    PenSize,
    PenColor,
    FillColor,
    ColorBoth,
    BeginFill,
    EndFill,
    Show,
    Hide,
    SetShape,
    ShapeSize,
    Tilt,
    TiltAngle,
    SetResizeMode,
    PlaceStamp,
    ClearStamp,
    ClearStamps,
    Undo,
    SetUndoBuffer,
    UndoEntries,
    BeginPoly,
    EndPoly,
    GetPoly,
    Position,
    Heading,
    Towards,
    DistanceTo,
    Xcor,
    Ycor,
    IsDown,
    IsVisible,
    Filling,
    SetSpeed,
    SetAngleUnits,
    WriteText,
    ClearDrawing,
    Reset,
}

fn lerp(a: WorldPoint, b: WorldPoint, t: f64) -> WorldPoint {
    WorldPoint(a.0.lerp(b.0, t))
}

/// Straight move along the current heading. Negative distances move
/// backward and are recorded as such.
pub struct Forward {
    pub distance: f64,
    start: WorldPoint,
    end: WorldPoint,
    prev: WorldPoint,
}

impl Forward {
    pub fn new(distance: f64) -> Forward {
        Forward {
            distance,
            start: WorldPoint::default(),
            end: WorldPoint::default(),
            prev: WorldPoint::default(),
        }
    }
}

impl Operation for Forward {
    fn begin(&mut self, screen: &mut Screen, ti: usize) -> Result<Launch, TurtleError> {
        screen.clear_glyph(ti);
        screen.push_history(ti, "forward", vec![self.distance]);
        let (pos, heading, speed) = {
            let st = screen.state(ti);
            (st.pos, st.heading, st.speed)
        };
        self.start = pos;
        self.end = WorldPoint(pos.0 + heading_vec(heading) * self.distance);
        self.prev = pos;
        screen.add_path_point(ti, self.start);
        debug!(distance = self.distance, "forward");
        if speed.is_instant() {
            screen.stroke_world_segment(ti, self.start, self.end);
            screen.state_mut(ti).pos = self.end;
            screen.add_path_point(ti, self.end);
            screen.draw_glyph(ti);
            Ok(Launch::Done(Value::None))
        } else {
            Ok(Launch::Animate {
                duration_ms: speed.duration_ms(false),
            })
        }
    }

    fn frame(&mut self, screen: &mut Screen, ti: usize, progress: f64) {
        screen.clear_glyph(ti);
        let here = lerp(self.start, self.end, progress);
        screen.stroke_world_segment(ti, self.prev, here);
        self.prev = here;
        screen.state_mut(ti).pos = here;
        screen.draw_glyph(ti);
    }

    fn finish(&mut self, screen: &mut Screen, ti: usize) -> Result<Value, TurtleError> {
        screen.add_path_point(ti, self.end);
        Ok(Value::None)
    }
}

/// Absolute move; heading is unchanged. Either axis may be left alone,
/// which is how `set_x` and `set_y` ride this operation.
pub struct Goto {
    pub x: Option<f64>,
    pub y: Option<f64>,
    start: WorldPoint,
    end: WorldPoint,
    prev: WorldPoint,
}

impl Goto {
    pub fn new(x: Option<f64>, y: Option<f64>) -> Goto {
        Goto {
            x,
            y,
            start: WorldPoint::default(),
            end: WorldPoint::default(),
            prev: WorldPoint::default(),
        }
    }
}

impl Operation for Goto {
    fn begin(&mut self, screen: &mut Screen, ti: usize) -> Result<Launch, TurtleError> {
        screen.clear_glyph(ti);
        let (pos, speed) = {
            let st = screen.state(ti);
            (st.pos, st.speed)
        };
        self.start = pos;
        self.end = wpt(self.x.unwrap_or(pos.x()), self.y.unwrap_or(pos.y()));
        self.prev = pos;
        screen.push_history(ti, "goto", vec![self.end.x(), self.end.y()]);
        screen.add_path_point(ti, self.start);
        if speed.is_instant() {
            screen.stroke_world_segment(ti, self.start, self.end);
            screen.state_mut(ti).pos = self.end;
            screen.add_path_point(ti, self.end);
            screen.draw_glyph(ti);
            Ok(Launch::Done(Value::None))
        } else {
            Ok(Launch::Animate {
                duration_ms: speed.duration_ms(false),
            })
        }
    }

    fn frame(&mut self, screen: &mut Screen, ti: usize, progress: f64) {
        screen.clear_glyph(ti);
        let here = lerp(self.start, self.end, progress);
        screen.stroke_world_segment(ti, self.prev, here);
        self.prev = here;
        screen.state_mut(ti).pos = here;
        screen.draw_glyph(ti);
    }

    fn finish(&mut self, screen: &mut Screen, ti: usize) -> Result<Value, TurtleError> {
        screen.add_path_point(ti, self.end);
        Ok(Value::None)
    }
}

/// Rotate in place. A positive amount turns right; a left turn arrives
/// here negated, so the log records every rotation as "right".
pub struct Turn {
    pub clockwise: f64,
    start_heading: f64,
    degrees: f64,
}

impl Turn {
    pub fn new(clockwise: f64) -> Turn {
        Turn {
            clockwise,
            start_heading: 0.0,
            degrees: 0.0,
        }
    }
}

impl Operation for Turn {
    fn begin(&mut self, screen: &mut Screen, ti: usize) -> Result<Launch, TurtleError> {
        screen.clear_glyph(ti);
        screen.push_history(ti, "right", vec![self.clockwise]);
        let (heading, fullcircle, speed) = {
            let st = screen.state(ti);
            (st.heading, st.fullcircle, st.speed)
        };
        self.start_heading = heading;
        self.degrees = self.clockwise * 360.0 / fullcircle;
        if speed.is_instant() {
            let st = screen.state_mut(ti);
            st.heading = (self.start_heading - self.degrees).rem_euclid(360.0);
            screen.draw_glyph(ti);
            Ok(Launch::Done(Value::None))
        } else {
            Ok(Launch::Animate {
                duration_ms: speed.duration_ms(false),
            })
        }
    }

    fn frame(&mut self, screen: &mut Screen, ti: usize, progress: f64) {
        screen.clear_glyph(ti);
        screen.state_mut(ti).heading =
            (self.start_heading - self.degrees * progress).rem_euclid(360.0);
        screen.draw_glyph(ti);
    }
}

/// Rotate to an absolute heading by the shortest arc.
pub struct SetHeading {
    pub target: f64,
    start_heading: f64,
    delta: f64,
}

impl SetHeading {
    pub fn new(target: f64) -> SetHeading {
        SetHeading {
            target,
            start_heading: 0.0,
            delta: 0.0,
        }
    }
}

impl Operation for SetHeading {
    fn begin(&mut self, screen: &mut Screen, ti: usize) -> Result<Launch, TurtleError> {
        screen.clear_glyph(ti);
        screen.push_history(ti, "setheading", vec![self.target]);
        let (heading, fullcircle, speed) = {
            let st = screen.state(ti);
            (st.heading, st.fullcircle, st.speed)
        };
        self.start_heading = heading;
        let target_deg = self.target * 360.0 / fullcircle;
        // shortest arc, ties resolved counterclockwise
        let mut delta = (target_deg - heading).rem_euclid(360.0);
        if delta > 180.0 {
            delta -= 360.0;
        }
        self.delta = delta;
        if speed.is_instant() {
            screen.state_mut(ti).heading = target_deg.rem_euclid(360.0);
            screen.draw_glyph(ti);
            Ok(Launch::Done(Value::None))
        } else {
            Ok(Launch::Animate {
                duration_ms: speed.duration_ms(false),
            })
        }
    }

    fn frame(&mut self, screen: &mut Screen, ti: usize, progress: f64) {
        screen.clear_glyph(ti);
        screen.state_mut(ti).heading =
            (self.start_heading + self.delta * progress).rem_euclid(360.0);
        screen.draw_glyph(ti);
    }
}

/// Move to the origin and face east, drawing on the way if the pen is down.
pub struct Home {
    start: WorldPoint,
    prev: WorldPoint,
}

impl Home {
    pub fn new() -> Home {
        Home {
            start: WorldPoint::default(),
            prev: WorldPoint::default(),
        }
    }
}

impl Operation for Home {
    fn begin(&mut self, screen: &mut Screen, ti: usize) -> Result<Launch, TurtleError> {
        screen.clear_glyph(ti);
        screen.push_history(ti, "home", vec![]);
        let (pos, speed) = {
            let st = screen.state(ti);
            (st.pos, st.speed)
        };
        self.start = pos;
        self.prev = pos;
        screen.add_path_point(ti, self.start);
        if speed.is_instant() {
            screen.stroke_world_segment(ti, self.start, wpt(0.0, 0.0));
            let st = screen.state_mut(ti);
            st.pos = wpt(0.0, 0.0);
            st.heading = 0.0;
            screen.add_path_point(ti, wpt(0.0, 0.0));
            screen.draw_glyph(ti);
            Ok(Launch::Done(Value::None))
        } else {
            Ok(Launch::Animate {
                duration_ms: speed.duration_ms(false),
            })
        }
    }

    fn frame(&mut self, screen: &mut Screen, ti: usize, progress: f64) {
        screen.clear_glyph(ti);
        let here = lerp(self.start, wpt(0.0, 0.0), progress);
        screen.stroke_world_segment(ti, self.prev, here);
        self.prev = here;
        screen.state_mut(ti).pos = here;
        if progress >= 1.0 {
            screen.state_mut(ti).heading = 0.0;
        }
        screen.draw_glyph(ti);
    }

    fn finish(&mut self, screen: &mut Screen, ti: usize) -> Result<Value, TurtleError> {
        screen.add_path_point(ti, wpt(0.0, 0.0));
        Ok(Value::None)
    }
}

/// Arc of a circle tangent to the current heading.
///
/// Positive radius puts the center 90 degrees to the turtle's left and
/// sweeps counterclockwise; negative radius mirrors both. The arc is
/// approximated by an inscribed polyline.
pub struct Circle {
    pub radius: f64,
    pub extent: Option<f64>,
    pub steps: Option<usize>,
    verts: Vec<WorldPoint>,
    final_heading: f64,
    drawn: usize,
}

impl Circle {
    pub fn new(radius: f64, extent: Option<f64>, steps: Option<usize>) -> Circle {
        Circle {
            radius,
            extent,
            steps,
            verts: Vec::new(),
            final_heading: 0.0,
            drawn: 0,
        }
    }

    fn stroke_through(&mut self, screen: &mut Screen, ti: usize, upto: usize) {
        while self.drawn < upto {
            let a = self.verts[self.drawn];
            let b = self.verts[self.drawn + 1];
            screen.stroke_world_segment(ti, a, b);
            screen.state_mut(ti).pos = b;
            self.drawn += 1;
        }
    }
}

impl Operation for Circle {
    fn begin(&mut self, screen: &mut Screen, ti: usize) -> Result<Launch, TurtleError> {
        screen.clear_glyph(ti);
        let extent_arg = self.extent.unwrap_or(f64::NAN);
        screen.push_history(ti, "circle", vec![self.radius, extent_arg]);
        let (pos, heading, fullcircle, speed) = {
            let st = screen.state(ti);
            (st.pos, st.heading, st.fullcircle, st.speed)
        };
        let extent_deg = self
            .extent
            .map(|e| e * 360.0 / fullcircle)
            .unwrap_or(360.0);
        let sign = if self.radius >= 0.0 { 1.0 } else { -1.0 };
        let r = self.radius.abs();
        let center = WorldPoint(pos.0 + heading_vec(heading + sign * 90.0) * r);
        let start_angle = heading - sign * 90.0;
        let sweep = extent_deg * sign;
        let n = self
            .steps
            .map(|s| s.max(1))
            .unwrap_or_else(|| ((100.0 * extent_deg.abs() / 360.0).ceil() as usize).max(2));
        self.verts = (0..=n)
            .map(|i| {
                let a = start_angle + sweep * i as f64 / n as f64;
                WorldPoint(center.0 + heading_vec(a) * r)
            })
            .collect();
        self.final_heading = (heading + sweep).rem_euclid(360.0);
        screen.add_path_point(ti, pos);
        if speed.is_instant() {
            self.stroke_through(screen, ti, n);
            for v in self.verts[1..].to_vec() {
                screen.add_path_point(ti, v);
            }
            screen.state_mut(ti).heading = self.final_heading;
            screen.draw_glyph(ti);
            Ok(Launch::Done(Value::None))
        } else {
            Ok(Launch::Animate {
                duration_ms: speed.duration_ms(true),
            })
        }
    }

    fn frame(&mut self, screen: &mut Screen, ti: usize, progress: f64) {
        screen.clear_glyph(ti);
        let n = self.verts.len() - 1;
        let upto = ((progress * n as f64).floor() as usize).min(n);
        self.stroke_through(screen, ti, upto);
        if progress >= 1.0 {
            screen.state_mut(ti).heading = self.final_heading;
        }
        screen.draw_glyph(ti);
    }

    fn finish(&mut self, screen: &mut Screen, ti: usize) -> Result<Value, TurtleError> {
        for v in self.verts[1..].to_vec() {
            screen.add_path_point(ti, v);
        }
        Ok(Value::None)
    }
}

/// Jump without drawing; pen and heading are untouched. With `fill_gap`
/// an open fill path continues across the jump, otherwise it restarts at
/// the landing point.
pub struct Teleport {
    pub x: f64,
    pub y: f64,
    pub fill_gap: bool,
}

impl Operation for Teleport {
    fn begin(&mut self, screen: &mut Screen, ti: usize) -> Result<Launch, TurtleError> {
        screen.clear_glyph(ti);
        screen.push_history(ti, "teleport", vec![self.x, self.y]);
        let target = wpt(self.x, self.y);
        let st = screen.state_mut(ti);
        st.pos = target;
        if st.filling {
            if self.fill_gap {
                st.fill_points.push(target);
            } else {
                st.fill_points = vec![target];
            }
        }
        if let Some(poly) = st.poly.as_mut() {
            poly.push(target);
        }
        screen.draw_glyph(ti);
        Ok(Launch::Done(Value::None))
    }
}

/// Stamp a filled disc at the current position.
pub struct Dot {
    pub size: Option<f64>,
    pub color: Option<ColorSpec>,
}

impl Operation for Dot {
    fn begin(&mut self, screen: &mut Screen, ti: usize) -> Result<Launch, TurtleError> {
        let color = match &self.color {
            Some(spec) => screen.normalize_color(spec)?,
            None => screen.state(ti).pen_color,
        };
        screen.clear_glyph(ti);
        let (pos, pen_size) = {
            let st = screen.state(ti);
            (st.pos, st.pen_size)
        };
        let diameter = self
            .size
            .unwrap_or_else(|| (pen_size + 4.0).max(2.0 * pen_size));
        screen.push_history(ti, "dot", vec![diameter]);
        screen.draw_world_dot(pos, diameter, color);
        if let Some(entry) = screen.state_mut(ti).history.last_mut() {
            entry.dot = Some((pos, diameter, color));
        }
        screen.draw_glyph(ti);
        Ok(Launch::Done(Value::None))
    }
}

pub struct PenUp;

impl Operation for PenUp {
    fn begin(&mut self, screen: &mut Screen, ti: usize) -> Result<Launch, TurtleError> {
        screen.push_history(ti, "pen_up", vec![]);
        screen.state_mut(ti).pen_down = false;
        Ok(Launch::Done(Value::None))
    }
}

pub struct PenDown;

impl Operation for PenDown {
    fn begin(&mut self, screen: &mut Screen, ti: usize) -> Result<Launch, TurtleError> {
        screen.push_history(ti, "pen_down", vec![]);
        screen.state_mut(ti).pen_down = true;
        Ok(Launch::Done(Value::None))
    }
}

/// Set or query the pen width (world units).
pub struct PenSize {
    pub size: Option<f64>,
}

impl Operation for PenSize {
    fn begin(&mut self, screen: &mut Screen, ti: usize) -> Result<Launch, TurtleError> {
        match self.size {
            None => Ok(Launch::Done(Value::Num(screen.state(ti).pen_size))),
            Some(size) => {
                screen.push_history(ti, "pen_size", vec![size]);
                screen.state_mut(ti).pen_size = size.max(0.0);
                screen.clear_glyph(ti);
                screen.draw_glyph(ti);
                Ok(Launch::Done(Value::None))
            }
        }
    }
}

/// Set or query the pen color.
pub struct PenColor {
    pub spec: Option<ColorSpec>,
}

impl Operation for PenColor {
    fn begin(&mut self, screen: &mut Screen, ti: usize) -> Result<Launch, TurtleError> {
        match &self.spec {
            None => {
                let c = screen.state(ti).pen_color;
                Ok(Launch::Done(Value::Color(screen.user_color(c))))
            }
            Some(spec) => {
                let color = screen.normalize_color(spec)?;
                screen.push_history(ti, "pen_color", vec![]);
                screen.state_mut(ti).pen_color = color;
                screen.clear_glyph(ti);
                screen.draw_glyph(ti);
                Ok(Launch::Done(Value::None))
            }
        }
    }
}

/// Set or query the fill color.
pub struct FillColor {
    pub spec: Option<ColorSpec>,
}

impl Operation for FillColor {
    fn begin(&mut self, screen: &mut Screen, ti: usize) -> Result<Launch, TurtleError> {
        match &self.spec {
            None => {
                let c = screen.state(ti).fill_color;
                Ok(Launch::Done(Value::Color(screen.user_color(c))))
            }
            Some(spec) => {
                let color = screen.normalize_color(spec)?;
                screen.push_history(ti, "fill_color", vec![]);
                screen.state_mut(ti).fill_color = color;
                screen.clear_glyph(ti);
                screen.draw_glyph(ti);
                Ok(Launch::Done(Value::None))
            }
        }
    }
}

/// Set pen and fill color together, or query both.
pub struct ColorBoth {
    pub pen: Option<ColorSpec>,
    pub fill: Option<ColorSpec>,
}

impl Operation for ColorBoth {
    fn begin(&mut self, screen: &mut Screen, ti: usize) -> Result<Launch, TurtleError> {
        match (&self.pen, &self.fill) {
            (None, None) => {
                let (p, f) = {
                    let st = screen.state(ti);
                    (st.pen_color, st.fill_color)
                };
                Ok(Launch::Done(Value::ColorPair(
                    screen.user_color(p),
                    screen.user_color(f),
                )))
            }
            (pen, fill) => {
                let pen = pen.as_ref().map(|s| screen.normalize_color(s)).transpose()?;
                let fill = fill.as_ref().map(|s| screen.normalize_color(s)).transpose()?;
                screen.push_history(ti, "color", vec![]);
                let st = screen.state_mut(ti);
                if let Some(c) = pen {
                    st.pen_color = c;
                }
                if let Some(c) = fill {
                    st.fill_color = c;
                }
                screen.clear_glyph(ti);
                screen.draw_glyph(ti);
                Ok(Launch::Done(Value::None))
            }
        }
    }
}

/// Open a fill path anchored at the current position.
pub struct BeginFill;

impl Operation for BeginFill {
    fn begin(&mut self, screen: &mut Screen, ti: usize) -> Result<Launch, TurtleError> {
        screen.push_history(ti, "begin_fill", vec![]);
        let st = screen.state_mut(ti);
        st.filling = true;
        st.fill_points = vec![st.pos];
        let snapshot = st.fill_points.clone();
        if let Some(entry) = st.history.last_mut() {
            entry.fill_points = Some(snapshot);
        }
        Ok(Launch::Done(Value::None))
    }
}

/// Close and paint the open fill path. Fails if no fill is open; the
/// failed attempt leaves no trace in the undo log.
pub struct EndFill {
    pub rule: FillRule,
}

impl Operation for EndFill {
    fn begin(&mut self, screen: &mut Screen, ti: usize) -> Result<Launch, TurtleError> {
        if !screen.state(ti).filling {
            return Err(TurtleError::FillNotOpen);
        }
        screen.clear_glyph(ti);
        screen.push_history(ti, "end_fill", vec![]);
        let (points, fill_color) = {
            let st = screen.state_mut(ti);
            st.filling = false;
            (std::mem::take(&mut st.fill_points), st.fill_color)
        };
        screen.fill_world_path(&points, fill_color, self.rule);
        if let Some(entry) = screen.state_mut(ti).history.last_mut() {
            entry.filled = Some((points.clone(), self.rule));
            entry.fill_points = Some(points);
        }
        screen.draw_glyph(ti);
        Ok(Launch::Done(Value::None))
    }
}

pub struct Show;

impl Operation for Show {
    fn begin(&mut self, screen: &mut Screen, ti: usize) -> Result<Launch, TurtleError> {
        screen.push_history(ti, "show", vec![]);
        screen.state_mut(ti).visible = true;
        screen.draw_glyph(ti);
        Ok(Launch::Done(Value::None))
    }
}

pub struct Hide;

impl Operation for Hide {
    fn begin(&mut self, screen: &mut Screen, ti: usize) -> Result<Launch, TurtleError> {
        screen.push_history(ti, "hide", vec![]);
        screen.clear_glyph(ti);
        screen.state_mut(ti).visible = false;
        Ok(Launch::Done(Value::None))
    }
}

/// Set or query the cursor glyph. Unknown names fail at execution time,
/// after any earlier queued registration has run.
pub struct SetShape {
    pub name: Option<String>,
}

impl Operation for SetShape {
    fn begin(&mut self, screen: &mut Screen, ti: usize) -> Result<Launch, TurtleError> {
        match &self.name {
            None => Ok(Launch::Done(Value::Text(screen.state(ti).shape.clone()))),
            Some(name) => {
                if !screen.shapes().contains(name) {
                    return Err(TurtleError::UnknownShape { name: name.clone() });
                }
                screen.push_history(ti, "shape", vec![]);
                screen.clear_glyph(ti);
                screen.state_mut(ti).shape = name.clone();
                screen.draw_glyph(ti);
                Ok(Launch::Done(Value::None))
            }
        }
    }
}

/// Set or query glyph stretch factors.
pub struct ShapeSize {
    pub width: Option<f64>,
    pub length: Option<f64>,
    pub outline: Option<f64>,
}

impl Operation for ShapeSize {
    fn begin(&mut self, screen: &mut Screen, ti: usize) -> Result<Launch, TurtleError> {
        if self.width.is_none() && self.length.is_none() && self.outline.is_none() {
            let s = screen.state(ti).stretch;
            return Ok(Launch::Done(Value::Triple(s.width, s.length, s.outline)));
        }
        screen.push_history(ti, "shapesize", vec![]);
        screen.clear_glyph(ti);
        let st = screen.state_mut(ti);
        let old = st.stretch;
        st.stretch = StretchFactors {
            width: self.width.unwrap_or(old.width),
            length: self.length.unwrap_or(old.length),
            outline: self.outline.unwrap_or(old.outline),
        };
        screen.draw_glyph(ti);
        Ok(Launch::Done(Value::None))
    }
}

/// Rotate the glyph relative to the heading. The angle is tracked and
/// queryable but does not change the drawn glyph.
pub struct Tilt {
    pub delta: f64,
}

impl Operation for Tilt {
    fn begin(&mut self, screen: &mut Screen, ti: usize) -> Result<Launch, TurtleError> {
        let delta = {
            let st = screen.state(ti);
            self.delta * 360.0 / st.fullcircle
        };
        screen.push_history(ti, "tilt", vec![self.delta]);
        let st = screen.state_mut(ti);
        st.tilt = (st.tilt + delta).rem_euclid(360.0);
        Ok(Launch::Done(Value::None))
    }
}

/// Set or query the absolute tilt angle.
pub struct TiltAngle {
    pub angle: Option<f64>,
}

impl Operation for TiltAngle {
    fn begin(&mut self, screen: &mut Screen, ti: usize) -> Result<Launch, TurtleError> {
        let fullcircle = screen.state(ti).fullcircle;
        match self.angle {
            None => {
                let tilt = screen.state(ti).tilt;
                Ok(Launch::Done(Value::Num(tilt * fullcircle / 360.0)))
            }
            Some(angle) => {
                screen.push_history(ti, "tiltangle", vec![angle]);
                screen.state_mut(ti).tilt = (angle * 360.0 / fullcircle).rem_euclid(360.0);
                Ok(Launch::Done(Value::None))
            }
        }
    }
}

/// Set or query how pen width reacts to world remaps.
pub struct SetResizeMode {
    pub mode: Option<ResizeMode>,
}

impl Operation for SetResizeMode {
    fn begin(&mut self, screen: &mut Screen, ti: usize) -> Result<Launch, TurtleError> {
        match self.mode {
            None => Ok(Launch::Done(Value::Text(
                screen.state(ti).resize_mode.to_string(),
            ))),
            Some(mode) => {
                screen.push_history(ti, "resizemode", vec![]);
                screen.state_mut(ti).resize_mode = mode;
                Ok(Launch::Done(Value::None))
            }
        }
    }
}

/// Freeze a copy of the glyph onto the drawing, returning its id.
pub struct PlaceStamp;

impl Operation for PlaceStamp {
    fn begin(&mut self, screen: &mut Screen, ti: usize) -> Result<Launch, TurtleError> {
        let id = screen.place_stamp(ti);
        screen.push_history(ti, "stamp", vec![id as f64]);
        Ok(Launch::Done(Value::Id(id)))
    }
}

/// Remove one stamp by id. Unknown ids are ignored.
pub struct ClearStamp {
    pub id: u64,
}

impl Operation for ClearStamp {
    fn begin(&mut self, screen: &mut Screen, ti: usize) -> Result<Launch, TurtleError> {
        if screen.state_mut(ti).stamps.remove(&self.id).is_some() {
            screen.replay_all();
        }
        Ok(Launch::Done(Value::None))
    }
}

/// Remove stamps: all of them, the oldest `n`, or the newest `-n`.
pub struct ClearStamps {
    pub n: Option<i64>,
}

impl Operation for ClearStamps {
    fn begin(&mut self, screen: &mut Screen, ti: usize) -> Result<Launch, TurtleError> {
        let removed = {
            let st = screen.state_mut(ti);
            let ids: Vec<u64> = st.stamps.keys().copied().collect();
            let doomed: Vec<u64> = match self.n {
                None => ids,
                Some(n) if n >= 0 => ids.into_iter().take(n as usize).collect(),
                Some(n) => {
                    let keep = ids.len().saturating_sub((-n) as usize);
                    ids.into_iter().skip(keep).collect()
                }
            };
            for id in &doomed {
                st.stamps.remove(id);
            }
            !doomed.is_empty()
        };
        if removed {
            screen.replay_all();
        }
        Ok(Launch::Done(Value::None))
    }
}

/// Pop the newest undo entry and restore the state it recorded. A no-op
/// on an empty log.
pub struct Undo;

impl Operation for Undo {
    fn begin(&mut self, screen: &mut Screen, ti: usize) -> Result<Launch, TurtleError> {
        screen.undo_one(ti);
        Ok(Launch::Done(Value::None))
    }
}

/// Resize the undo log. `None` disables undo entirely.
pub struct SetUndoBuffer {
    pub size: Option<usize>,
}

impl Operation for SetUndoBuffer {
    fn begin(&mut self, screen: &mut Screen, ti: usize) -> Result<Launch, TurtleError> {
        screen
            .state_mut(ti)
            .history
            .set_capacity(self.size.unwrap_or(0));
        Ok(Launch::Done(Value::None))
    }
}

pub struct UndoEntries;

impl Operation for UndoEntries {
    fn begin(&mut self, screen: &mut Screen, ti: usize) -> Result<Launch, TurtleError> {
        Ok(Launch::Done(Value::Num(
            screen.state(ti).history.len() as f64
        )))
    }
}

/// Start recording vertices visited by subsequent moves.
pub struct BeginPoly;

impl Operation for BeginPoly {
    fn begin(&mut self, screen: &mut Screen, ti: usize) -> Result<Launch, TurtleError> {
        let st = screen.state_mut(ti);
        st.poly = Some(vec![st.pos]);
        Ok(Launch::Done(Value::None))
    }
}

/// Stop recording. Fails if no recording is open.
pub struct EndPoly;

impl Operation for EndPoly {
    fn begin(&mut self, screen: &mut Screen, ti: usize) -> Result<Launch, TurtleError> {
        let st = screen.state_mut(ti);
        match st.poly.take() {
            None => Err(TurtleError::PolyNotRecording),
            Some(mut poly) => {
                if poly.last() != Some(&st.pos) {
                    poly.push(st.pos);
                }
                st.last_poly = Some(poly);
                Ok(Launch::Done(Value::None))
            }
        }
    }
}

/// The vertices captured by the last completed recording.
pub struct GetPoly;

impl Operation for GetPoly {
    fn begin(&mut self, screen: &mut Screen, ti: usize) -> Result<Launch, TurtleError> {
        match &screen.state(ti).last_poly {
            None => Err(TurtleError::NoPolyRecorded),
            Some(poly) => Ok(Launch::Done(Value::Points(
                poly.iter().map(|p| (p.x(), p.y())).collect(),
            ))),
        }
    }
}

pub struct Position;

impl Operation for Position {
    fn begin(&mut self, screen: &mut Screen, ti: usize) -> Result<Launch, TurtleError> {
        let pos = screen.state(ti).pos;
        Ok(Launch::Done(Value::Pair(pos.x(), pos.y())))
    }
}

pub struct Heading;

impl Operation for Heading {
    fn begin(&mut self, screen: &mut Screen, ti: usize) -> Result<Launch, TurtleError> {
        let st = screen.state(ti);
        Ok(Launch::Done(Value::Num(
            st.heading.rem_euclid(360.0) * st.fullcircle / 360.0,
        )))
    }
}

/// Angle from the current position toward a target point.
pub struct Towards {
    pub x: f64,
    pub y: f64,
}

impl Operation for Towards {
    fn begin(&mut self, screen: &mut Screen, ti: usize) -> Result<Launch, TurtleError> {
        let st = screen.state(ti);
        let angle = (self.y - st.pos.y())
            .atan2(self.x - st.pos.x())
            .to_degrees()
            .rem_euclid(360.0);
        Ok(Launch::Done(Value::Num(angle * st.fullcircle / 360.0)))
    }
}

pub struct DistanceTo {
    pub x: f64,
    pub y: f64,
}

impl Operation for DistanceTo {
    fn begin(&mut self, screen: &mut Screen, ti: usize) -> Result<Launch, TurtleError> {
        let pos = screen.state(ti).pos;
        let d = pos.0.distance(DVec2::new(self.x, self.y));
        Ok(Launch::Done(Value::Num(d)))
    }
}

pub struct Xcor;

impl Operation for Xcor {
    fn begin(&mut self, screen: &mut Screen, ti: usize) -> Result<Launch, TurtleError> {
        Ok(Launch::Done(Value::Num(screen.state(ti).pos.x())))
    }
}

pub struct Ycor;

impl Operation for Ycor {
    fn begin(&mut self, screen: &mut Screen, ti: usize) -> Result<Launch, TurtleError> {
        Ok(Launch::Done(Value::Num(screen.state(ti).pos.y())))
    }
}

pub struct IsDown;

impl Operation for IsDown {
    fn begin(&mut self, screen: &mut Screen, ti: usize) -> Result<Launch, TurtleError> {
        Ok(Launch::Done(Value::Bool(screen.state(ti).pen_down)))
    }
}

pub struct IsVisible;

impl Operation for IsVisible {
    fn begin(&mut self, screen: &mut Screen, ti: usize) -> Result<Launch, TurtleError> {
        Ok(Launch::Done(Value::Bool(screen.state(ti).visible)))
    }
}

pub struct Filling;

impl Operation for Filling {
    fn begin(&mut self, screen: &mut Screen, ti: usize) -> Result<Launch, TurtleError> {
        Ok(Launch::Done(Value::Bool(screen.state(ti).filling)))
    }
}

/// Set or query the animation speed.
pub struct SetSpeed {
    pub speed: Option<Speed>,
}

impl Operation for SetSpeed {
    fn begin(&mut self, screen: &mut Screen, ti: usize) -> Result<Launch, TurtleError> {
        match self.speed {
            None => Ok(Launch::Done(Value::Num(
                screen.state(ti).speed.value() as f64
            ))),
            Some(speed) => {
                screen.state_mut(ti).speed = speed;
                Ok(Launch::Done(Value::None))
            }
        }
    }
}

/// Switch angle units by setting the size of a full circle: 360 for
/// degrees, two pi for radians, or anything else.
pub struct SetAngleUnits {
    pub fullcircle: f64,
}

impl Operation for SetAngleUnits {
    fn begin(&mut self, screen: &mut Screen, ti: usize) -> Result<Launch, TurtleError> {
        screen.state_mut(ti).fullcircle = self.fullcircle;
        Ok(Launch::Done(Value::None))
    }
}

/// Paint text at the current position.
pub struct WriteText {
    pub text: String,
    pub advance: bool,
    pub align: TextAlign,
    pub font: Font,
}

impl Operation for WriteText {
    fn begin(&mut self, screen: &mut Screen, ti: usize) -> Result<Launch, TurtleError> {
        screen.clear_glyph(ti);
        screen.push_history(ti, "write", vec![]);
        let (pos, color) = {
            let st = screen.state(ti);
            (st.pos, st.pen_color)
        };
        let width = screen.draw_world_text(&self.text, pos, color, &self.font, self.align);
        if let Some(entry) = screen.state_mut(ti).history.last_mut() {
            entry.text = Some(TextRecord {
                text: self.text.clone(),
                pos,
                color,
                font: self.font.clone(),
                align: self.align,
            });
        }
        if self.advance {
            let scale = screen.world().scale_x().abs().max(f64::MIN_POSITIVE);
            screen.state_mut(ti).pos = wpt(pos.x() + width / scale, pos.y());
        }
        screen.draw_glyph(ti);
        Ok(Launch::Done(Value::None))
    }
}

/// Erase this turtle's drawing and forget its undo history; pose, pen,
/// and stamps of other turtles are untouched.
pub struct ClearDrawing;

impl Operation for ClearDrawing {
    fn begin(&mut self, screen: &mut Screen, ti: usize) -> Result<Launch, TurtleError> {
        {
            let st = screen.state_mut(ti);
            st.history.clear();
            st.stamps.clear();
            st.fill_points.clear();
            st.filling = false;
        }
        screen.replay_all();
        Ok(Launch::Done(Value::None))
    }
}

/// Clear the drawing and return the turtle to its initial state.
pub struct Reset;

impl Operation for Reset {
    fn begin(&mut self, screen: &mut Screen, ti: usize) -> Result<Launch, TurtleError> {
        {
            let st = screen.state_mut(ti);
            st.history.clear();
            st.stamps.clear();
            st.default_pose();
        }
        screen.replay_all();
        Ok(Launch::Done(Value::None))
    }
}
