//! Input events and key-name normalization.

/// Mouse button for click and drag bindings.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Middle,
    Right,
}

/// An input event delivered to [`Screen::dispatch`](crate::Screen::dispatch).
///
/// Coordinates are screen pixels; the screen converts to world coordinates
/// before invoking handlers.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    Click { x: f64, y: f64, button: MouseButton },
    Drag { x: f64, y: f64, button: MouseButton },
    KeyDown { key: String },
    KeyUp { key: String },
}

/// Canonical form of a key name for binding and dispatch.
///
/// Single characters pass through lowercased; the classic aliases map to
/// their DOM key values (`space` to `" "`, `return` to `Enter`, arrows to
/// `ArrowUp` and friends). Matching is case-insensitive, so both binding
/// and dispatch normalize through here and compare lowercased.
pub fn normalize_key(key: &str) -> String {
    let lower = key.to_ascii_lowercase();
    match lower.as_str() {
        "space" => " ".to_string(),
        "return" | "enter" => "Enter".to_string(),
        "tab" => "Tab".to_string(),
        "backspace" => "Backspace".to_string(),
        "delete" => "Delete".to_string(),
        "escape" | "esc" => "Escape".to_string(),
        "up" => "ArrowUp".to_string(),
        "down" => "ArrowDown".to_string(),
        "left" => "ArrowLeft".to_string(),
        "right" => "ArrowRight".to_string(),
        _ => lower,
    }
}

/// Lowercased normalized form, the actual map key.
pub(crate) fn key_slot(key: &str) -> String {
    normalize_key(key).to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aliases_map_to_dom_names() {
        assert_eq!(normalize_key("space"), " ");
        assert_eq!(normalize_key("Return"), "Enter");
        assert_eq!(normalize_key("UP"), "ArrowUp");
        assert_eq!(normalize_key("escape"), "Escape");
    }

    #[test]
    fn plain_keys_lowercase() {
        assert_eq!(normalize_key("A"), "a");
        assert_eq!(normalize_key("x"), "x");
    }

    #[test]
    fn dispatch_matching_is_case_insensitive() {
        assert_eq!(key_slot("Up"), key_slot("ArrowUp"));
        assert_eq!(key_slot("RETURN"), key_slot("enter"));
    }
}
