//! Error types with diagnostic codes using miette
//!
//! Two families per the engine's contract: usage errors surface to the
//! caller of the offending operation and leave cursor state untouched;
//! resource errors reject the pending result and revert state.

use miette::Diagnostic;
use thiserror::Error;

/// Errors reported by turtle and screen operations.
#[derive(Error, Diagnostic, Debug, Clone, PartialEq)]
pub enum TurtleError {
    #[error("unknown shape: {name}")]
    #[diagnostic(
        code(tortuga::shape::unknown),
        help("register it with Screen::register_shape first")
    )]
    UnknownShape { name: String },

    #[error("invalid speed: {value}")]
    #[diagnostic(
        code(tortuga::speed::invalid),
        help("expected 'fastest', 'fast', 'normal', 'slow', 'slowest', or a number 0..=10")
    )]
    InvalidSpeed { value: String },

    #[error("invalid resize mode: {value}")]
    #[diagnostic(
        code(tortuga::resize_mode::invalid),
        help("expected 'noresize', 'auto', or 'user'")
    )]
    InvalidResizeMode { value: String },

    #[error("invalid fill rule: {value}")]
    #[diagnostic(
        code(tortuga::fill::invalid_rule),
        help("expected 'evenodd' or 'nonzero'")
    )]
    InvalidFillRule { value: String },

    #[error("end_fill() without matching begin_fill()")]
    #[diagnostic(code(tortuga::fill::not_open))]
    FillNotOpen,

    #[error("end_poly() without matching begin_poly()")]
    #[diagnostic(code(tortuga::poly::not_recording))]
    PolyNotRecording,

    #[error("no polygon has been recorded yet")]
    #[diagnostic(
        code(tortuga::poly::none_recorded),
        help("record one with begin_poly()/end_poly() first")
    )]
    NoPolyRecorded,

    #[error("invalid color: {value}")]
    #[diagnostic(
        code(tortuga::color::invalid),
        help("expected a registered name, '#rrggbb', 'rgb(r,g,b)', an RGB triple, or a packed integer")
    )]
    InvalidColor { value: String },

    #[error("background image failed to load: {source_name}")]
    #[diagnostic(
        code(tortuga::screen::background_image),
        help("the surface could not fetch or decode the image")
    )]
    BackgroundImage { source_name: String },
}

impl TurtleError {
    /// Whether this is a usage error (bad argument or mismatched call
    /// pairing) as opposed to a resource failure.
    pub fn is_usage(&self) -> bool {
        !matches!(self, TurtleError::BackgroundImage { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn taxonomy_split() {
        assert!(TurtleError::FillNotOpen.is_usage());
        assert!(
            TurtleError::UnknownShape {
                name: "wombat".into()
            }
            .is_usage()
        );
        assert!(
            !TurtleError::BackgroundImage {
                source_name: "bg.png".into()
            }
            .is_usage()
        );
    }

    #[test]
    fn display_messages() {
        let err = TurtleError::InvalidSpeed {
            value: "warp".into(),
        };
        assert_eq!(err.to_string(), "invalid speed: warp");
    }
}
