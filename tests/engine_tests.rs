//! End-to-end scenarios driving a screen over the recording surface.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use tortuga::{
    Event, FillRule, Font, MouseButton, ResizeMode, Screen, SharedTraceSurface, Speed, TextAlign,
    TurtleError, TurtleId, UserColor, Value,
};

fn setup() -> (Screen, TurtleId, SharedTraceSurface) {
    let shared = SharedTraceSurface::new(400, 300);
    let mut screen = Screen::new(Box::new(shared.clone()));
    let id = screen.add_turtle();
    (screen, id, shared)
}

fn assert_near(a: f64, b: f64) {
    assert!((a - b).abs() < 1e-9, "expected {b}, got {a}");
}

fn assert_near_pair(p: (f64, f64), x: f64, y: f64) {
    assert_near(p.0, x);
    assert_near(p.1, y);
}

#[test]
fn forward_and_turn_move_as_expected() {
    let (mut screen, id, _shared) = setup();
    let mut t = screen.turtle(id);
    t.set_speed(Speed::new(0));
    t.forward(100.0);
    t.left(90.0);
    t.forward(100.0);
    let pos = t.position();
    let heading = t.heading();
    screen.run_until_idle();
    assert_near_pair(pos.value().unwrap().as_pair().unwrap(), 100.0, 100.0);
    assert_near(heading.value().unwrap().as_num().unwrap(), 90.0);
}

#[test]
fn backward_inverts_forward() {
    let (mut screen, id, _shared) = setup();
    let mut t = screen.turtle(id);
    t.set_speed(Speed::new(0));
    t.left(37.0);
    t.forward(123.0);
    t.backward(123.0);
    let pos = t.position();
    screen.run_until_idle();
    assert_near_pair(pos.value().unwrap().as_pair().unwrap(), 0.0, 0.0);
}

#[test]
fn left_inverts_right_mod_full_circle() {
    let (mut screen, id, _shared) = setup();
    let mut t = screen.turtle(id);
    t.set_speed(Speed::new(0));
    t.right(400.0);
    t.left(400.0);
    let heading = t.heading();
    screen.run_until_idle();
    assert_near(heading.value().unwrap().as_num().unwrap(), 0.0);
}

#[test]
fn animated_op_blocks_the_queue() {
    let (mut screen, id, _shared) = setup();
    let mut t = screen.turtle(id);
    // default speed 1: a forward takes 500ms of frame time
    let moved = t.forward(100.0);
    let turned = t.right(90.0);
    screen.tick(16.0);
    screen.tick(32.0);
    assert!(!moved.is_done());
    assert!(!turned.is_done());
    screen.run_until_idle();
    assert!(moved.is_done());
    let mut t = screen.turtle(id);
    let heading = t.heading();
    screen.run_until_idle();
    assert_near(heading.value().unwrap().as_num().unwrap(), 270.0);
}

#[test]
fn square_path_strokes() {
    let (mut screen, id, shared) = setup();
    let mut t = screen.turtle(id);
    t.set_speed(Speed::new(0));
    t.hide();
    for _ in 0..4 {
        t.forward(100.0);
        t.left(90.0);
    }
    screen.run_until_idle();
    insta::assert_snapshot!(shared.lines().join("\n"), @r"
    line (200,150)->(300,150) #000000 w1
    line (300,150)->(300,50) #000000 w1
    line (300,50)->(200,50) #000000 w1
    line (200,50)->(200,150) #000000 w1
    ");
}

#[test]
fn world_remap_round_trip_replays_identically() {
    let (mut screen, id, shared) = setup();
    let mut t = screen.turtle(id);
    t.set_speed(Speed::new(0));
    t.hide();
    for _ in 0..4 {
        t.forward(100.0);
        t.left(90.0);
    }
    t.pen_up();
    t.forward(30.0);
    t.pen_down();
    t.circle(40.0, Some(180.0), Some(8));
    screen.run_until_idle();
    let original: Vec<String> = shared
        .take()
        .into_iter()
        .filter(|op| op.starts_with("line "))
        .collect();

    screen.set_world_coordinates(0.0, 0.0, 800.0, 600.0);
    let remapped: Vec<String> = shared
        .take()
        .into_iter()
        .filter(|op| op.starts_with("line "))
        .collect();
    assert_ne!(original, remapped);

    screen.set_world_coordinates(-200.0, -150.0, 200.0, 150.0);
    let restored: Vec<String> = shared
        .take()
        .into_iter()
        .filter(|op| op.starts_with("line "))
        .collect();
    assert_eq!(original, restored);
}

#[test]
fn pen_width_follows_resize_mode_under_world_scale() {
    let (mut screen, id, shared) = setup();
    // 400x300 pixels over a 200x150 world window: mean scale 2
    screen.set_world_coordinates(-100.0, -75.0, 100.0, 75.0);
    let mut t = screen.turtle(id);
    t.set_speed(Speed::new(0));
    t.hide();
    t.forward(10.0);
    screen.run_until_idle();
    // noresize compensates, keeping one world unit of ink
    assert_eq!(
        shared.lines().last().unwrap(),
        "line (200,150)->(220,150) #000000 w0.5"
    );

    let mut t = screen.turtle(id);
    t.set_resize_mode(ResizeMode::Auto);
    t.forward(10.0);
    screen.run_until_idle();
    assert_eq!(
        shared.lines().last().unwrap(),
        "line (220,150)->(240,150) #000000 w1"
    );
}

#[test]
fn undo_restores_pose_and_erases_strokes() {
    let (mut screen, id, shared) = setup();
    let mut t = screen.turtle(id);
    t.set_speed(Speed::new(0));
    t.hide();
    t.forward(100.0);
    t.undo();
    let pos = t.position();
    screen.run_until_idle();
    assert_near_pair(pos.value().unwrap().as_pair().unwrap(), 0.0, 0.0);
    // the replay after undo repaints nothing
    let ops = shared.take();
    let last_clear = ops.iter().rposition(|op| op == "clear-all").unwrap();
    assert!(!ops[last_clear..].iter().any(|op| op.starts_with("line ")));
}

#[test]
fn undo_on_empty_history_is_a_noop() {
    let (mut screen, id, _shared) = setup();
    let mut t = screen.turtle(id);
    t.set_speed(Speed::new(0));
    let done = t.undo();
    let pos = t.position();
    screen.run_until_idle();
    assert!(matches!(done.result(), Some(Ok(Value::None))));
    assert_near_pair(pos.value().unwrap().as_pair().unwrap(), 0.0, 0.0);
}

#[test]
fn undo_of_end_fill_reopens_the_fill() {
    let (mut screen, id, shared) = setup();
    let mut t = screen.turtle(id);
    t.set_speed(Speed::new(0));
    t.hide();
    t.begin_fill();
    for _ in 0..4 {
        t.forward(100.0);
        t.left(90.0);
    }
    let first = t.end_fill();
    screen.run_until_idle();
    assert!(matches!(first.result(), Some(Ok(Value::None))));
    assert_eq!(shared.fills().len(), 1);
    shared.take();

    let mut t = screen.turtle(id);
    t.undo();
    let filling = t.filling();
    let again = t.end_fill();
    screen.run_until_idle();
    assert_eq!(filling.value().unwrap().as_bool(), Some(true));
    assert!(matches!(again.result(), Some(Ok(Value::None))));
    // the reopened fill carries the accumulated square path
    let fills = shared.fills();
    let last = fills.last().unwrap();
    assert!(last.contains("(200,150)"), "unexpected fill: {last}");
    assert!(last.contains("(300,50)"), "unexpected fill: {last}");
}

#[test]
fn end_fill_without_begin_fails() {
    let (mut screen, id, _shared) = setup();
    let mut t = screen.turtle(id);
    let res = t.end_fill();
    screen.run_until_idle();
    assert!(matches!(res.result(), Some(Err(TurtleError::FillNotOpen))));
    assert!(TurtleError::FillNotOpen.is_usage());
}

#[test]
fn nonzero_fill_rule_is_recorded() {
    let (mut screen, id, shared) = setup();
    let mut t = screen.turtle(id);
    t.set_speed(Speed::new(0));
    t.hide();
    t.begin_fill();
    t.forward(50.0);
    t.left(120.0);
    t.forward(50.0);
    t.end_fill_with(FillRule::NonZero);
    screen.run_until_idle();
    let fills = shared.fills();
    assert!(fills[0].starts_with("fill[nonzero]"), "got: {}", fills[0]);
}

#[test]
fn bounded_undo_buffer_limits_rollback() {
    let (mut screen, id, _shared) = setup();
    let mut t = screen.turtle(id);
    t.set_speed(Speed::new(0));
    t.set_undo_buffer(Some(3));
    for _ in 0..5 {
        t.forward(10.0);
    }
    let entries = t.undo_buffer_entries();
    for _ in 0..4 {
        t.undo();
    }
    let pos = t.position();
    screen.run_until_idle();
    assert_near(entries.value().unwrap().as_num().unwrap(), 3.0);
    // only three of the five moves can roll back
    assert_near_pair(pos.value().unwrap().as_pair().unwrap(), 20.0, 0.0);
}

#[test]
fn history_overflow_keeps_the_cursor_visible() {
    let (mut screen, id, shared) = setup();
    let mut t = screen.turtle(id);
    t.set_speed(Speed::new(0));
    t.set_undo_buffer(Some(1));
    t.forward(10.0);
    // evicts the stroke entry, folding it into the raster base
    t.pen_up();
    screen.run_until_idle();
    let ops = shared.take();
    let polys: Vec<&String> = ops.iter().filter(|op| op.starts_with("poly ")).collect();
    // initial glyph, the glyph after forward, and the one put back after
    // the freeze, unmoved
    assert_eq!(polys.len(), 3, "glyphs drawn: {polys:?}");
    assert_eq!(polys[2], polys[1]);
    assert!(ops.last().unwrap().starts_with("poly "));
}

#[test]
fn glyph_and_stamp_are_painted_in_pen_color() {
    let (mut screen, id, shared) = setup();
    let mut t = screen.turtle(id);
    t.set_speed(Speed::new(0));
    t.set_pen_color("red");
    t.set_fill_color("blue");
    screen.run_until_idle();
    shared.take();

    let mut t = screen.turtle(id);
    t.stamp();
    screen.run_until_idle();
    let polys: Vec<String> = shared
        .take()
        .into_iter()
        .filter(|op| op.starts_with("poly "))
        .collect();
    assert!(!polys.is_empty());
    // fill color only affects fill paths; stamp and cursor are all pen
    for poly in &polys {
        assert!(poly.starts_with("poly #ff0000/#ff0000 "), "got: {poly}");
    }
}

#[test]
fn pen_color_round_trips_in_unit_mode() {
    let (mut screen, id, _shared) = setup();
    let mut t = screen.turtle(id);
    t.set_pen_color("red");
    let c = t.pen_color();
    screen.run_until_idle();
    assert_eq!(c.value().unwrap(), Value::Color(UserColor::Unit(1.0, 0.0, 0.0)));
}

#[test]
fn pen_color_round_trips_in_byte_mode() {
    let (mut screen, id, _shared) = setup();
    screen.set_colormode(tortuga::ColorMode::Byte);
    let mut t = screen.turtle(id);
    t.set_pen_color((255.0, 128.0, 0.0));
    let c = t.pen_color();
    screen.run_until_idle();
    assert_eq!(c.value().unwrap(), Value::Color(UserColor::Bytes(255, 128, 0)));
}

#[test]
fn kept_names_come_back_from_queries() {
    let (mut screen, id, _shared) = setup();
    screen.set_keep_color_names(true);
    let mut t = screen.turtle(id);
    t.set_pen_color("dodger blue");
    let c = t.pen_color();
    screen.run_until_idle();
    assert_eq!(
        c.value().unwrap(),
        Value::Color(UserColor::Name("dodger blue".to_string()))
    );
}

#[test]
fn invalid_color_resolves_with_error_and_queue_continues() {
    let (mut screen, id, _shared) = setup();
    let mut t = screen.turtle(id);
    t.set_speed(Speed::new(0));
    let bad = t.set_pen_color("no such color");
    t.forward(50.0);
    let pos = t.position();
    screen.run_until_idle();
    assert!(matches!(
        bad.result(),
        Some(Err(TurtleError::InvalidColor { .. }))
    ));
    assert_near_pair(pos.value().unwrap().as_pair().unwrap(), 50.0, 0.0);
}

#[test]
fn circle_arc_lands_tangent() {
    let (mut screen, id, _shared) = setup();
    let mut t = screen.turtle(id);
    t.set_speed(Speed::new(0));
    t.circle(50.0, Some(90.0), Some(1));
    let pos = t.position();
    let heading = t.heading();
    screen.run_until_idle();
    assert_near_pair(pos.value().unwrap().as_pair().unwrap(), 50.0, 50.0);
    assert_near(heading.value().unwrap().as_num().unwrap(), 90.0);
}

#[test]
fn full_circle_returns_home() {
    let (mut screen, id, _shared) = setup();
    let mut t = screen.turtle(id);
    t.set_speed(Speed::new(0));
    t.circle(60.0, None, None);
    let pos = t.position();
    let heading = t.heading();
    screen.run_until_idle();
    let (x, y) = pos.value().unwrap().as_pair().unwrap();
    assert!(x.abs() < 1e-6 && y.abs() < 1e-6, "ended at ({x}, {y})");
    assert!(heading.value().unwrap().as_num().unwrap() < 1e-6);
}

#[test]
fn teleport_does_not_draw() {
    let (mut screen, id, shared) = setup();
    let mut t = screen.turtle(id);
    t.hide();
    screen.run_until_idle();
    shared.take();
    let mut t = screen.turtle(id);
    t.teleport(30.0, 40.0);
    let pos = t.position();
    screen.run_until_idle();
    assert_near_pair(pos.value().unwrap().as_pair().unwrap(), 30.0, 40.0);
    assert!(!shared.take().iter().any(|op| op.starts_with("line ")));
}

#[test]
fn dot_uses_pen_size_default() {
    let (mut screen, id, shared) = setup();
    let mut t = screen.turtle(id);
    t.hide();
    t.dot(None, Some("red".into()));
    screen.run_until_idle();
    // pen size 1 -> diameter 5, radius 2.5, at the screen center
    let ops = shared.take();
    let dot = ops.iter().find(|op| op.starts_with("dot ")).unwrap();
    assert_eq!(dot, "dot (200,150) r=2.5 #ff0000");
}

#[test]
fn stamps_outlive_moves_and_clear_individually() {
    let (mut screen, id, shared) = setup();
    let mut t = screen.turtle(id);
    t.set_speed(Speed::new(0));
    t.hide();
    let stamp = t.stamp();
    t.forward(50.0);
    screen.run_until_idle();
    let id_num = stamp.value().unwrap().as_id().unwrap();
    assert_eq!(id_num, 1);
    assert!(shared.take().iter().any(|op| op.starts_with("poly ")));

    let mut t = screen.turtle(id);
    t.clear_stamp(id_num);
    screen.run_until_idle();
    // the replay repaints the stroke but not the stamp
    let ops = shared.take();
    assert!(ops.iter().any(|op| op.starts_with("line ")));
    assert!(!ops.iter().any(|op| op.starts_with("poly ")));
}

#[test]
fn undo_removes_a_stamp() {
    let (mut screen, id, shared) = setup();
    let mut t = screen.turtle(id);
    t.hide();
    t.stamp();
    t.undo();
    screen.run_until_idle();
    let ops = shared.take();
    let last_clear = ops.iter().rposition(|op| op == "clear-all").unwrap();
    assert!(!ops[last_clear..].iter().any(|op| op.starts_with("poly ")));
}

#[test]
fn unknown_shape_fails_at_run_time() {
    let (mut screen, id, _shared) = setup();
    let bad = screen.turtle(id).set_shape("hexagon");
    screen.run_until_idle();
    assert!(matches!(
        bad.result(),
        Some(Err(TurtleError::UnknownShape { .. }))
    ));
}

#[test]
fn shape_registered_before_execution_is_found() {
    let (mut screen, id, _shared) = setup();
    // enqueue first, register second: the check happens when the op runs
    let pending = screen.turtle(id).set_shape("wedge");
    screen.register_shape(
        "wedge",
        vec![
            glam::DVec2::new(0.0, 0.0),
            glam::DVec2::new(-4.0, -8.0),
            glam::DVec2::new(4.0, -8.0),
        ],
    );
    screen.run_until_idle();
    assert!(matches!(pending.result(), Some(Ok(Value::None))));
    let shape = screen.turtle(id).shape();
    screen.run_until_idle();
    assert_eq!(shape.value().unwrap(), Value::Text("wedge".to_string()));
}

#[test]
fn polygon_recording_captures_vertices() {
    let (mut screen, id, _shared) = setup();
    let mut t = screen.turtle(id);
    t.set_speed(Speed::new(0));
    t.begin_poly();
    t.forward(10.0);
    t.left(90.0);
    t.forward(10.0);
    t.end_poly();
    let poly = t.get_poly();
    screen.run_until_idle();
    let value = poly.value().unwrap();
    let points = value.as_points().unwrap();
    assert_eq!(points.len(), 3);
    assert_near_pair(points[0], 0.0, 0.0);
    assert_near_pair(points[1], 10.0, 0.0);
    assert_near_pair(points[2], 10.0, 10.0);
}

#[test]
fn poly_queries_fail_without_recording() {
    let (mut screen, id, _shared) = setup();
    let end = screen.turtle(id).end_poly();
    let get = screen.turtle(id).get_poly();
    screen.run_until_idle();
    assert!(matches!(
        end.result(),
        Some(Err(TurtleError::PolyNotRecording))
    ));
    assert!(matches!(get.result(), Some(Err(TurtleError::NoPolyRecorded))));
}

#[test]
fn radians_change_angle_units() {
    let (mut screen, id, _shared) = setup();
    let mut t = screen.turtle(id);
    t.set_speed(Speed::new(0));
    t.radians();
    t.left(std::f64::consts::FRAC_PI_2);
    let heading = t.heading();
    t.degrees(None);
    let in_degrees = t.heading();
    screen.run_until_idle();
    assert_near(
        heading.value().unwrap().as_num().unwrap(),
        std::f64::consts::FRAC_PI_2,
    );
    assert_near(in_degrees.value().unwrap().as_num().unwrap(), 90.0);
}

#[test]
fn towards_and_distance() {
    let (mut screen, id, _shared) = setup();
    let mut t = screen.turtle(id);
    let towards = t.towards(0.0, 10.0);
    let distance = t.distance(3.0, 4.0);
    screen.run_until_idle();
    assert_near(towards.value().unwrap().as_num().unwrap(), 90.0);
    assert_near(distance.value().unwrap().as_num().unwrap(), 5.0);
}

#[test]
fn write_paints_text_and_can_advance() {
    let (mut screen, id, shared) = setup();
    let mut t = screen.turtle(id);
    t.hide();
    t.write_with("hi", true, TextAlign::Left, Font::default());
    let pos = t.position();
    screen.run_until_idle();
    assert!(shared.take().iter().any(|op| op.starts_with("text ")));
    // advance by the measured width: 2 chars * 8pt * 0.6
    assert_near_pair(pos.value().unwrap().as_pair().unwrap(), 9.6, 0.0);
}

#[test]
fn clear_erases_drawing_but_keeps_pose() {
    let (mut screen, id, shared) = setup();
    let mut t = screen.turtle(id);
    t.set_speed(Speed::new(0));
    t.hide();
    t.forward(80.0);
    t.clear();
    let pos = t.position();
    screen.run_until_idle();
    assert_near_pair(pos.value().unwrap().as_pair().unwrap(), 80.0, 0.0);
    let ops = shared.take();
    let last_clear = ops.iter().rposition(|op| op == "clear-all").unwrap();
    assert!(!ops[last_clear..].iter().any(|op| op.starts_with("line ")));
}

#[test]
fn reset_restores_the_default_pose() {
    let (mut screen, id, _shared) = setup();
    let mut t = screen.turtle(id);
    t.set_speed(Speed::new(0));
    t.forward(80.0);
    t.left(45.0);
    t.reset();
    let pos = t.position();
    let heading = t.heading();
    screen.run_until_idle();
    assert_near_pair(pos.value().unwrap().as_pair().unwrap(), 0.0, 0.0);
    assert_near(heading.value().unwrap().as_num().unwrap(), 0.0);
}

#[test]
fn click_handlers_receive_world_coordinates() {
    let (mut screen, _id, _shared) = setup();
    let seen = Rc::new(RefCell::new(None));
    let sink = seen.clone();
    screen.on_click(MouseButton::Left, move |x, y| {
        *sink.borrow_mut() = Some((x, y));
    });
    screen.dispatch(Event::Click {
        x: 200.0,
        y: 150.0,
        button: MouseButton::Left,
    });
    let got = (*seen.borrow()).unwrap();
    assert_near_pair(got, 0.0, 0.0);
}

#[test]
fn key_bindings_normalize_names() {
    let (mut screen, _id, _shared) = setup();
    let count = Rc::new(Cell::new(0));
    let sink = count.clone();
    screen.on_key("space", move || sink.set(sink.get() + 1));
    screen.dispatch(Event::KeyUp {
        key: " ".to_string(),
    });
    screen.dispatch(Event::KeyUp {
        key: "Space".to_string(),
    });
    // presses do not fire release bindings
    screen.dispatch(Event::KeyDown {
        key: " ".to_string(),
    });
    assert_eq!(count.get(), 2);
}

#[test]
fn background_picture_failure_changes_nothing() {
    let (mut screen, _id, _shared) = setup();
    let err = screen.set_bg_picture(Some("missing.png")).unwrap_err();
    assert!(matches!(err, TurtleError::BackgroundImage { .. }));
    assert!(!err.is_usage());
    assert_eq!(screen.bg_picture(), None);

    screen.set_bg_picture(Some("meadow.png")).unwrap();
    assert_eq!(screen.bg_picture(), Some("meadow.png"));
    screen.set_bg_picture(None).unwrap();
    assert_eq!(screen.bg_picture(), None);
}

#[test]
fn background_color_round_trips() {
    let (mut screen, _id, _shared) = setup();
    screen.set_bg_color("white").unwrap();
    assert_eq!(screen.bg_color(), Some(UserColor::Unit(1.0, 1.0, 1.0)));
    assert!(screen.set_bg_color("nonsense").is_err());
    // the failed call left the old background in place
    assert_eq!(screen.bg_color(), Some(UserColor::Unit(1.0, 1.0, 1.0)));
}

#[test]
fn two_turtles_animate_independently() {
    let shared = SharedTraceSurface::new(400, 300);
    let mut screen = Screen::new(Box::new(shared.clone()));
    let a = screen.add_turtle();
    let b = screen.add_turtle();
    let pa = {
        let mut t = screen.turtle(a);
        t.forward(100.0)
    };
    let pb = {
        let mut t = screen.turtle(b);
        t.set_speed(Speed::new(0));
        let mut t = screen.turtle(b);
        t.forward(100.0)
    };
    screen.tick(16.0);
    // the instant turtle is already done; the animated one is not
    assert!(pb.is_done());
    assert!(!pa.is_done());
    screen.run_until_idle();
    assert!(pa.is_done());
    let (xa, xb) = {
        let mut t = screen.turtle(a);
        let xa = t.xcor();
        let mut t = screen.turtle(b);
        let xb = t.xcor();
        screen.run_until_idle();
        (xa, xb)
    };
    assert_near(xa.value().unwrap().as_num().unwrap(), 100.0);
    assert_near(xb.value().unwrap().as_num().unwrap(), 100.0);
}
