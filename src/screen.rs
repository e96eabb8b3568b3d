//! The screen: surface ownership, the per-turtle command queues, the frame
//! clock that drives them, and full-picture replay.
//!
//! Nothing here blocks. [`Screen::tick`] advances every turtle by one
//! frame; hosts call it from their own loop with a monotonic timestamp, or
//! use [`Screen::run_until_idle`] to drain all queues under a synthetic
//! clock.

use std::collections::{HashMap, VecDeque};

use glam::DVec2;

use crate::color::{self, Color, ColorMode, ColorSpec, UserColor};
use crate::errors::TurtleError;
use crate::events::{key_slot, Event, MouseButton};
use crate::geometry::{ScreenPoint, WorldMap, WorldPoint};
use crate::history::HistoryEntry;
use crate::log::{debug, warn};
use crate::ops::{Launch, Operation, TurtleOp};
use crate::queue::{Pending, Speed};
use crate::shapes::{place_glyph, ShapeTable, Stamp};
use crate::surface::{FillRule, Font, ImageId, Rect, Stroke, Surface, TextAlign};
use crate::turtle::{ResizeMode, Turtle, TurtleId, TurtleState};

/// Initial settings for a screen and the turtles it creates.
#[derive(Clone, Debug)]
pub struct ScreenConfig {
    pub width: u32,
    pub height: u32,
    pub colormode: ColorMode,
    /// Hand registered color names back from queries when the value has one.
    pub keep_color_names: bool,
    pub undo_capacity: usize,
    pub shape: String,
    pub pen_color: Color,
    pub fill_color: Color,
    pub speed: Speed,
    /// Clock step used by [`Screen::run_until_idle`].
    pub frame_step_ms: f64,
}

impl Default for ScreenConfig {
    fn default() -> ScreenConfig {
        ScreenConfig {
            width: 400,
            height: 300,
            colormode: ColorMode::Unit,
            keep_color_names: false,
            undo_capacity: 1000,
            shape: "classic".to_string(),
            pen_color: Color::BLACK,
            fill_color: Color::BLACK,
            speed: Speed::new(1),
            frame_step_ms: 16.0,
        }
    }
}

struct Queued {
    op: TurtleOp,
    pending: Pending,
}

struct Active {
    op: TurtleOp,
    pending: Pending,
    started_at: f64,
    duration_ms: f64,
}

struct TurtleSlot {
    state: TurtleState,
    queue: VecDeque<Queued>,
    active: Option<Active>,
}

type KeyHandler = Box<dyn FnMut()>;
type PointerHandler = Box<dyn FnMut(f64, f64)>;

pub struct Screen {
    surface: Box<dyn Surface>,
    world: WorldMap,
    /// Whether explicit world bounds are in effect (they survive resizes).
    custom_world: bool,
    shapes: ShapeTable,
    turtles: Vec<TurtleSlot>,
    colormode: ColorMode,
    keep_names: bool,
    config: ScreenConfig,
    background: Option<Color>,
    background_image: Option<(String, ImageId)>,
    key_up: HashMap<String, Vec<KeyHandler>>,
    key_down: HashMap<String, Vec<KeyHandler>>,
    click: Vec<(MouseButton, PointerHandler)>,
    drag: Vec<(MouseButton, PointerHandler)>,
    clock: f64,
}

impl Screen {
    pub fn new(surface: Box<dyn Surface>) -> Screen {
        Screen::with_config(surface, ScreenConfig::default())
    }

    pub fn with_config(mut surface: Box<dyn Surface>, config: ScreenConfig) -> Screen {
        if surface.size() != (config.width, config.height) {
            surface.set_size(config.width, config.height);
        }
        let world = WorldMap::centered(config.width as f64, config.height as f64);
        Screen {
            surface,
            world,
            custom_world: false,
            shapes: ShapeTable::default(),
            turtles: Vec::new(),
            colormode: config.colormode,
            keep_names: config.keep_color_names,
            config,
            background: None,
            background_image: None,
            key_up: HashMap::new(),
            key_down: HashMap::new(),
            click: Vec::new(),
            drag: Vec::new(),
            clock: 0.0,
        }
    }

    // turtles

    pub fn add_turtle(&mut self) -> TurtleId {
        let state = TurtleState::new(&self.config);
        self.turtles.push(TurtleSlot {
            state,
            queue: VecDeque::new(),
            active: None,
        });
        let id = TurtleId(self.turtles.len() - 1);
        self.draw_glyph(id.0);
        id
    }

    pub fn turtle(&mut self, id: TurtleId) -> Turtle<'_> {
        Turtle {
            screen: self,
            idx: id.0,
        }
    }

    pub fn turtle_count(&self) -> usize {
        self.turtles.len()
    }

    // scheduler

    pub(crate) fn enqueue(&mut self, ti: usize, op: TurtleOp) -> Pending {
        let pending = Pending::new();
        self.turtles[ti].queue.push_back(Queued {
            op,
            pending: pending.clone(),
        });
        pending
    }

    /// Advance every turtle one frame. `now_ms` must be monotonic.
    pub fn tick(&mut self, now_ms: f64) {
        self.clock = now_ms;
        for ti in 0..self.turtles.len() {
            if let Some(mut active) = self.turtles[ti].active.take() {
                let progress = if active.duration_ms <= 0.0 {
                    1.0
                } else {
                    ((now_ms - active.started_at) / active.duration_ms).clamp(0.0, 1.0)
                };
                active.op.frame(self, ti, progress);
                if progress < 1.0 {
                    self.turtles[ti].active = Some(active);
                    continue;
                }
                let result = active.op.finish(self, ti);
                active.pending.resolve(result);
            }
            while let Some(queued) = self.turtles[ti].queue.pop_front() {
                let mut op = queued.op;
                match op.begin(self, ti) {
                    Err(e) => {
                        warn!(error = %e, "operation failed");
                        queued.pending.resolve(Err(e));
                    }
                    Ok(Launch::Done(value)) => queued.pending.resolve(Ok(value)),
                    Ok(Launch::Animate { duration_ms }) => {
                        self.turtles[ti].active = Some(Active {
                            op,
                            pending: queued.pending,
                            started_at: now_ms,
                            duration_ms,
                        });
                        break;
                    }
                }
            }
        }
    }

    /// Whether every queue is drained and no animation is in flight.
    pub fn idle(&self) -> bool {
        self.turtles
            .iter()
            .all(|slot| slot.active.is_none() && slot.queue.is_empty())
    }

    /// Drive the clock in fixed steps until everything queued has run.
    pub fn run_until_idle(&mut self) {
        let step = self.config.frame_step_ms;
        while !self.idle() {
            let next = self.clock + step;
            self.tick(next);
        }
    }

    pub fn now_ms(&self) -> f64 {
        self.clock
    }

    // world mapping

    /// Remap world coordinates and replay the whole picture under the new
    /// mapping.
    pub fn set_world_coordinates(&mut self, left: f64, bottom: f64, right: f64, top: f64) {
        let (w, h) = self.surface.size();
        let map = WorldMap::new(left, bottom, right, top, w as f64, h as f64);
        if map.same_bounds(&self.world) {
            return;
        }
        debug!(left, bottom, right, top, "world remap");
        self.world = map;
        self.custom_world = true;
        self.replay_all();
    }

    pub fn world(&self) -> &WorldMap {
        &self.world
    }

    pub fn window_width(&self) -> f64 {
        self.world.width()
    }

    pub fn window_height(&self) -> f64 {
        self.world.height()
    }

    pub fn screen_size(&self) -> (u32, u32) {
        self.surface.size()
    }

    /// Resize the surface. Explicit world bounds are kept; the default
    /// centered mapping re-centers on the new size. The picture replays.
    pub fn set_screen_size(&mut self, width: u32, height: u32) {
        self.surface.set_size(width, height);
        self.world = if self.custom_world {
            WorldMap::new(
                self.world.left,
                self.world.bottom,
                self.world.right,
                self.world.top,
                width as f64,
                height as f64,
            )
        } else {
            WorldMap::centered(width as f64, height as f64)
        };
        self.replay_all();
    }

    // colors

    pub fn colormode(&self) -> ColorMode {
        self.colormode
    }

    pub fn set_colormode(&mut self, mode: ColorMode) {
        self.colormode = mode;
    }

    pub fn set_keep_color_names(&mut self, keep: bool) {
        self.keep_names = keep;
    }

    pub(crate) fn normalize_color(&self, spec: &ColorSpec) -> Result<Color, TurtleError> {
        color::normalize(spec, self.colormode)
    }

    pub(crate) fn user_color(&self, color: Color) -> UserColor {
        color::to_user(color, self.colormode, self.keep_names)
    }

    // background

    pub fn set_bg_color(&mut self, spec: impl Into<ColorSpec>) -> Result<(), TurtleError> {
        let color = self.normalize_color(&spec.into())?;
        self.background = Some(color);
        self.surface.set_background(Some(color));
        Ok(())
    }

    pub fn bg_color(&self) -> Option<UserColor> {
        self.background.map(|c| self.user_color(c))
    }

    /// Load and install a background picture. On failure nothing changes.
    pub fn set_bg_picture(&mut self, source: Option<&str>) -> Result<(), TurtleError> {
        match source {
            None => {
                self.background_image = None;
                self.surface.set_background_image(None);
                Ok(())
            }
            Some(name) => {
                let id = self.surface.load_image(name)?;
                self.background_image = Some((name.to_string(), id));
                self.surface.set_background_image(Some(id));
                Ok(())
            }
        }
    }

    pub fn bg_picture(&self) -> Option<&str> {
        self.background_image.as_ref().map(|(name, _)| name.as_str())
    }

    // shapes

    pub fn register_shape(&mut self, name: &str, points: Vec<DVec2>) {
        self.shapes.register(name, points);
    }

    pub fn shape_names(&self) -> Vec<String> {
        self.shapes.names()
    }

    pub(crate) fn shapes(&self) -> &ShapeTable {
        &self.shapes
    }

    // whole-screen operations

    /// Wipe every turtle's drawing and history; poses survive.
    pub fn clear_screen(&mut self) {
        for slot in &mut self.turtles {
            slot.state.history.clear();
            slot.state.stamps.clear();
            slot.state.fill_points.clear();
            slot.state.filling = false;
        }
        self.replay_all();
    }

    /// Reset every turtle and wipe the drawing.
    pub fn reset_screen(&mut self) {
        for slot in &mut self.turtles {
            slot.state.history.clear();
            slot.state.stamps.clear();
            slot.state.default_pose();
        }
        self.replay_all();
    }

    // events

    /// Bind a handler to a key release.
    pub fn on_key(&mut self, key: &str, handler: impl FnMut() + 'static) {
        self.key_up
            .entry(key_slot(key))
            .or_default()
            .push(Box::new(handler));
    }

    /// Bind a handler to a key press.
    pub fn on_key_press(&mut self, key: &str, handler: impl FnMut() + 'static) {
        self.key_down
            .entry(key_slot(key))
            .or_default()
            .push(Box::new(handler));
    }

    /// Bind a click handler; it receives world coordinates.
    pub fn on_click(&mut self, button: MouseButton, handler: impl FnMut(f64, f64) + 'static) {
        self.click.push((button, Box::new(handler)));
    }

    pub fn on_drag(&mut self, button: MouseButton, handler: impl FnMut(f64, f64) + 'static) {
        self.drag.push((button, Box::new(handler)));
    }

    /// Feed one input event to the matching handlers.
    pub fn dispatch(&mut self, event: Event) {
        match event {
            Event::Click { x, y, button } => {
                let p = self.world.to_world(crate::geometry::spt(x, y));
                for (btn, handler) in &mut self.click {
                    if *btn == button {
                        handler(p.x(), p.y());
                    }
                }
            }
            Event::Drag { x, y, button } => {
                let p = self.world.to_world(crate::geometry::spt(x, y));
                for (btn, handler) in &mut self.drag {
                    if *btn == button {
                        handler(p.x(), p.y());
                    }
                }
            }
            Event::KeyUp { key } => {
                if let Some(handlers) = self.key_up.get_mut(&key_slot(&key)) {
                    for handler in handlers {
                        handler();
                    }
                }
            }
            Event::KeyDown { key } => {
                if let Some(handlers) = self.key_down.get_mut(&key_slot(&key)) {
                    for handler in handlers {
                        handler();
                    }
                }
            }
        }
    }

    // state access for operations

    pub(crate) fn state(&self, ti: usize) -> &TurtleState {
        &self.turtles[ti].state
    }

    pub(crate) fn state_mut(&mut self, ti: usize) -> &mut TurtleState {
        &mut self.turtles[ti].state
    }

    // drawing helpers

    pub(crate) fn effective_pen_width(&self, ti: usize) -> f64 {
        let st = &self.turtles[ti].state;
        match st.resize_mode {
            // compensates for the world scale, shrinking as the map zooms in
            ResizeMode::Noresize => st.pen_size / self.world.mean_scale(),
            _ => st.pen_size,
        }
    }

    fn entry_pen_width(&self, entry: &HistoryEntry) -> f64 {
        match entry.snap.resize_mode {
            ResizeMode::Noresize => entry.snap.pen_size / self.world.mean_scale(),
            _ => entry.snap.pen_size,
        }
    }

    pub(crate) fn stroke_world_segment(&mut self, ti: usize, from: WorldPoint, to: WorldPoint) {
        let st = &self.turtles[ti].state;
        if !st.pen_down {
            return;
        }
        let stroke = Stroke {
            color: st.pen_color,
            width: self.effective_pen_width(ti),
        };
        let pts = [self.world.to_screen(from), self.world.to_screen(to)];
        self.surface.stroke_path(&pts, stroke);
    }

    pub(crate) fn fill_world_path(&mut self, points: &[WorldPoint], color: Color, rule: FillRule) {
        let pts: Vec<ScreenPoint> = points.iter().map(|p| self.world.to_screen(*p)).collect();
        self.surface.fill_path(&pts, color, rule);
    }

    pub(crate) fn draw_world_dot(&mut self, center: WorldPoint, diameter: f64, color: Color) {
        let radius = diameter * self.world.mean_scale() / 2.0;
        let at = self.world.to_screen(center);
        self.surface.fill_circle(at, radius, color);
    }

    pub(crate) fn draw_world_text(
        &mut self,
        text: &str,
        pos: WorldPoint,
        color: Color,
        font: &Font,
        align: TextAlign,
    ) -> f64 {
        let width = self.surface.measure_text(text, font);
        let at = self.world.to_screen(pos);
        self.surface.draw_text(text, at, 0.0, color, font, align);
        width
    }

    // glyph management

    /// Restore the pixels under the glyph, if it is currently drawn.
    pub(crate) fn clear_glyph(&mut self, ti: usize) {
        if let Some(region) = self.turtles[ti].state.saved_under.take() {
            self.surface.put_region(&region);
        }
    }

    /// Paint the cursor glyph, saving the pixels underneath first.
    pub(crate) fn draw_glyph(&mut self, ti: usize) {
        self.clear_glyph(ti);
        let st = &self.turtles[ti].state;
        if !st.visible {
            return;
        }
        let Some(points) = self.shapes.get(&st.shape) else {
            return;
        };
        let center = self.world.to_screen(st.pos);
        let reach = st.stretch.width.abs().max(st.stretch.length.abs());
        // generous: glyphs never paint outside this box
        let margin = (st.turtle_size * reach + st.pen_size) * self.world.max_scale() * 2.0;
        let rect = Rect::new(
            center.x() - margin,
            center.y() - margin,
            margin * 2.0,
            margin * 2.0,
        );
        let saved = self.surface.get_region(rect);
        let placed = place_glyph(points, st.stretch, st.heading, center);
        // the glyph is painted entirely in pen color, inside and outline
        let stroke = Stroke {
            color: st.pen_color,
            width: st.stretch.outline,
        };
        let fill = st.pen_color;
        self.surface.fill_polygon(&placed, fill, stroke);
        self.turtles[ti].state.saved_under = Some(saved);
    }

    // stamps

    pub(crate) fn place_stamp(&mut self, ti: usize) -> u64 {
        let (stamp, id) = {
            let st = &mut self.turtles[ti].state;
            let id = st.next_stamp;
            st.next_stamp += 1;
            let stamp = Stamp {
                id,
                pos: st.pos,
                heading: st.heading,
                shape: st.shape.clone(),
                stretch: st.stretch,
                color: st.pen_color,
                pen_size: st.pen_size,
            };
            st.stamps.insert(id, stamp.clone());
            (stamp, id)
        };
        // paint beneath the live glyph
        self.clear_glyph(ti);
        self.draw_stamp(&stamp);
        self.draw_glyph(ti);
        id
    }

    fn draw_stamp(&mut self, stamp: &Stamp) {
        let Some(points) = self.shapes.get(&stamp.shape) else {
            return;
        };
        let at = self.world.to_screen(stamp.pos);
        let placed = place_glyph(points, stamp.stretch, stamp.heading, at);
        self.surface.fill_polygon(
            &placed,
            stamp.color,
            Stroke {
                color: stamp.color,
                width: stamp.stretch.outline,
            },
        );
    }

    // history

    /// Record an operation before it mutates anything. Must run after
    /// [`Self::clear_glyph`] so an eviction snapshot never bakes in a cursor.
    pub(crate) fn push_history(&mut self, ti: usize, op: &'static str, args: Vec<f64>) {
        let world = self.world;
        let evicted = {
            let st = &mut self.turtles[ti].state;
            let mut entry = HistoryEntry::new(op, args, st.snapshot(world));
            if st.filling {
                entry.fill_points = Some(st.fill_points.clone());
            }
            st.history.push(entry)
        };
        let Some(evicted) = evicted else { return };
        if !evicted.has_geometry() || self.turtles[ti].state.history.base.is_some() {
            return;
        }
        // first overflow: freeze the drawing so far into a raster base
        let mut lifted = vec![false; self.turtles.len()];
        for (i, slot) in self.turtles.iter_mut().enumerate() {
            if let Some(region) = slot.state.saved_under.take() {
                self.surface.put_region(&region);
                lifted[i] = true;
            }
        }
        let (w, h) = self.surface.size();
        let base = self
            .surface
            .get_region(Rect::new(0.0, 0.0, w as f64, h as f64));
        self.turtles[ti].state.history.base = Some(base);
        // put back exactly the glyphs we lifted; a turtle whose op cleared
        // its own glyph repaints it when the op completes
        for i in 0..self.turtles.len() {
            if lifted[i] {
                self.draw_glyph(i);
            }
        }
    }

    /// Append a vertex to the open path records: the newest history entry
    /// when the pen is down, the fill path when one is open, and the
    /// polygon recorder when active. Consecutive duplicates collapse.
    pub(crate) fn add_path_point(&mut self, ti: usize, p: WorldPoint) {
        let st = &mut self.turtles[ti].state;
        if st.pen_down {
            if let Some(entry) = st.history.last_mut() {
                if entry.points.last() != Some(&p) {
                    entry.points.push(p);
                }
            }
        }
        if st.filling && st.fill_points.last() != Some(&p) {
            st.fill_points.push(p);
        }
        if let Some(poly) = st.poly.as_mut() {
            if poly.last() != Some(&p) {
                poly.push(p);
            }
        }
    }

    /// Pop the newest history entry, restore the recorded state, and
    /// repaint the picture without it. A no-op on an empty log.
    pub(crate) fn undo_one(&mut self, ti: usize) {
        let Some(entry) = self.turtles[ti].state.history.pop() else {
            return;
        };
        self.clear_glyph(ti);
        {
            let st = &mut self.turtles[ti].state;
            st.restore(&entry.snap);
            if entry.op == "stamp" {
                if let Some(id) = entry.args.first() {
                    st.stamps.remove(&(*id as u64));
                }
            }
            if st.filling {
                let pos = st.pos;
                st.fill_points = entry.fill_points.clone().unwrap_or_else(|| vec![pos]);
            } else {
                st.fill_points.clear();
            }
        }
        self.replay_all();
    }

    /// Rebuild the whole raster from recorded history: bases, then every
    /// entry's geometry under the current world mapping, then stamps, then
    /// cursor glyphs.
    pub(crate) fn replay_all(&mut self) {
        for slot in &mut self.turtles {
            slot.state.saved_under = None;
        }
        self.surface.clear_all();
        for ti in 0..self.turtles.len() {
            if let Some(base) = self.turtles[ti].state.history.base.clone() {
                self.surface.put_region(&base);
            }
        }
        for ti in 0..self.turtles.len() {
            let entries: Vec<HistoryEntry> =
                self.turtles[ti].state.history.iter().cloned().collect();
            for entry in &entries {
                if entry.points.len() > 1 {
                    let pts: Vec<ScreenPoint> = entry
                        .points
                        .iter()
                        .map(|p| self.world.to_screen(*p))
                        .collect();
                    let stroke = Stroke {
                        color: entry.snap.pen_color,
                        width: self.entry_pen_width(entry),
                    };
                    self.surface.stroke_path(&pts, stroke);
                }
                if let Some((points, rule)) = &entry.filled {
                    let pts: Vec<ScreenPoint> =
                        points.iter().map(|p| self.world.to_screen(*p)).collect();
                    self.surface.fill_path(&pts, entry.snap.fill_color, *rule);
                }
                if let Some((center, diameter, color)) = &entry.dot {
                    self.draw_world_dot(*center, *diameter, *color);
                }
                if let Some(record) = &entry.text {
                    let at = self.world.to_screen(record.pos);
                    self.surface
                        .draw_text(&record.text, at, 0.0, record.color, &record.font, record.align);
                }
            }
        }
        for ti in 0..self.turtles.len() {
            let stamps: Vec<Stamp> = self.turtles[ti].state.stamps.values().cloned().collect();
            for stamp in &stamps {
                self.draw_stamp(stamp);
            }
        }
        for ti in 0..self.turtles.len() {
            self.draw_glyph(ti);
        }
    }
}
