//! An animated 2D turtle-graphics engine.
//!
//! A [`Screen`] owns a drawing [`Surface`] and any number of turtles. Calls
//! on a [`Turtle`] handle never draw immediately: each one enqueues a
//! command and returns a [`Pending`] that resolves when the command
//! commits. The host drives execution with [`Screen::tick`] from its own
//! frame loop, or drains everything at once with
//! [`Screen::run_until_idle`].
//!
//! ```
//! use tortuga::{Screen, TraceSurface};
//!
//! let mut screen = Screen::new(Box::new(TraceSurface::new(400, 300)));
//! let id = screen.add_turtle();
//!
//! let mut t = screen.turtle(id);
//! t.forward(100.0);
//! t.left(90.0);
//! let pos = t.position();
//! let heading = t.heading();
//!
//! screen.run_until_idle();
//! assert_eq!(pos.value().unwrap().as_pair(), Some((100.0, 0.0)));
//! assert_eq!(heading.value().unwrap().as_num(), Some(90.0));
//! ```
//!
//! Everything drawn is also recorded: a bounded undo log per turtle allows
//! [`Turtle::undo`], and world-coordinate remapping via
//! [`Screen::set_world_coordinates`] replays the whole picture under the
//! new mapping.

pub mod color;
pub mod errors;
pub mod events;
pub mod geometry;
pub mod history;
pub mod log;
pub mod ops;
pub mod queue;
pub mod screen;
pub mod shapes;
pub mod surface;
pub mod trace;
pub mod turtle;

pub use color::{Color, ColorMode, ColorSpec, UserColor};
pub use errors::TurtleError;
pub use events::{normalize_key, Event, MouseButton};
pub use geometry::{heading_vec, spt, wpt, ScreenPoint, WorldMap, WorldPoint};
pub use queue::{Pending, Speed, Value};
pub use screen::{Screen, ScreenConfig};
pub use shapes::{place_glyph, ShapeTable, Stamp, StretchFactors};
pub use surface::{FillRule, Font, ImageId, Rect, SavedRegion, Stroke, Surface, TextAlign};
pub use trace::{SharedTraceSurface, TraceSurface};
pub use turtle::{ResizeMode, Turtle, TurtleId, TurtleState};
