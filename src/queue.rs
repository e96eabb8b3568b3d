//! Completion cells and the values operations resolve to.
//!
//! Every call on a [`Turtle`](crate::Turtle) handle enqueues one operation
//! and hands back a [`Pending`]. The scheduler resolves it when the
//! operation commits (or immediately, for instant operations and errors).

use std::cell::RefCell;
use std::rc::Rc;
use std::str::FromStr;

use crate::color::UserColor;
use crate::errors::TurtleError;

/// The result an operation resolves to.
#[derive(Clone, Debug, PartialEq, Default)]
pub enum Value {
    #[default]
    None,
    Num(f64),
    Pair(f64, f64),
    Triple(f64, f64, f64),
    Bool(bool),
    Id(u64),
    Color(UserColor),
    ColorPair(UserColor, UserColor),
    Points(Vec<(f64, f64)>),
    Text(String),
}

impl Value {
    pub fn as_num(&self) -> Option<f64> {
        match self {
            Value::Num(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_pair(&self) -> Option<(f64, f64)> {
        match self {
            Value::Pair(x, y) => Some((*x, *y)),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_id(&self) -> Option<u64> {
        match self {
            Value::Id(id) => Some(*id),
            _ => None,
        }
    }

    pub fn as_color(&self) -> Option<&UserColor> {
        match self {
            Value::Color(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_points(&self) -> Option<&[(f64, f64)]> {
        match self {
            Value::Points(pts) => Some(pts),
            _ => None,
        }
    }
}

/// A shared completion cell for one queued operation.
#[derive(Clone, Default)]
pub struct Pending(Rc<RefCell<Option<Result<Value, TurtleError>>>>);

impl Pending {
    pub fn new() -> Pending {
        Pending::default()
    }

    pub fn is_done(&self) -> bool {
        self.0.borrow().is_some()
    }

    /// The operation's result, once resolved.
    pub fn result(&self) -> Option<Result<Value, TurtleError>> {
        self.0.borrow().clone()
    }

    /// The resolved value, swallowing errors. Convenient for queries.
    pub fn value(&self) -> Option<Value> {
        self.0.borrow().as_ref().and_then(|r| r.as_ref().ok().cloned())
    }

    pub(crate) fn resolve(&self, result: Result<Value, TurtleError>) {
        *self.0.borrow_mut() = Some(result);
    }
}

/// Animation speed, `0..=10`. Zero and ten both mean instant; otherwise
/// lower is slower.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Speed(u8);

impl Speed {
    pub fn new(value: u8) -> Speed {
        Speed(value.min(10))
    }

    /// Numeric speeds clamp into range instead of erroring.
    pub fn from_value(value: f64) -> Speed {
        if !value.is_finite() || value < 0.0 {
            Speed(0)
        } else {
            Speed(value.min(10.0) as u8)
        }
    }

    pub fn value(&self) -> u8 {
        self.0
    }

    pub fn is_instant(&self) -> bool {
        self.0 == 0 || self.0 >= 10
    }

    /// Duration of one animated step at this speed. Arc steps run slower.
    pub fn duration_ms(&self, arc: bool) -> f64 {
        let unit = if arc { 200.0 } else { 50.0 };
        (11.0 - self.0 as f64) * unit
    }
}

impl Default for Speed {
    fn default() -> Speed {
        Speed(6)
    }
}

impl FromStr for Speed {
    type Err = TurtleError;

    fn from_str(s: &str) -> Result<Speed, TurtleError> {
        match s {
            "fastest" => Ok(Speed(0)),
            "fast" => Ok(Speed(10)),
            "normal" => Ok(Speed(6)),
            "slow" => Ok(Speed(3)),
            "slowest" => Ok(Speed(1)),
            _ => Err(TurtleError::InvalidSpeed {
                value: s.to_string(),
            }),
        }
    }
}
