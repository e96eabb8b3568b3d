//! Color normalization: named, hex, RGB triple, or packed-integer input,
//! canonical RGB storage, conversion back to the caller's representation.
//!
//! The name table follows the Tk/X11 palette (so `maroon` is `#b03060`,
//! not the CSS value). Reverse lookup for "keep names" mode prefers the
//! longest registered name for a given value, breaking remaining ties by
//! registration order.

use std::fmt;

use crate::errors::TurtleError;

/// How RGB triples passed by the caller are interpreted, and how colors
/// are handed back: unit interval `[0, 1]` or bytes `0..=255`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ColorMode {
    /// Components in `[0.0, 1.0]` (the classic turtle default, colormode 1.0).
    #[default]
    Unit,
    /// Components in `0..=255` (colormode 255).
    Byte,
}

/// A canonical color: three bytes, displayed as `#rrggbb`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Color {
        Color { r, g, b }
    }

    /// Canonical `#rrggbb` form.
    pub fn hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Parse a 6-digit hex string, with or without the leading `#`.
    pub fn from_hex(s: &str) -> Option<Color> {
        let digits = s.strip_prefix('#').unwrap_or(s);
        if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        let r = u8::from_str_radix(&digits[0..2], 16).ok()?;
        let g = u8::from_str_radix(&digits[2..4], 16).ok()?;
        let b = u8::from_str_radix(&digits[4..6], 16).ok()?;
        Some(Color::rgb(r, g, b))
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Any accepted color input.
#[derive(Clone, Debug, PartialEq)]
pub enum ColorSpec {
    /// A registered name, `#rrggbb`, or `rgb(r,g,b)` string.
    Name(String),
    /// An RGB triple, interpreted per the screen's [`ColorMode`].
    Rgb(f64, f64, f64),
    /// A packed integer, least-significant byte first: `r = n & 0xff`.
    Packed(u32),
}

impl From<&str> for ColorSpec {
    fn from(s: &str) -> Self {
        ColorSpec::Name(s.to_string())
    }
}

impl From<String> for ColorSpec {
    fn from(s: String) -> Self {
        ColorSpec::Name(s)
    }
}

impl From<(f64, f64, f64)> for ColorSpec {
    fn from((r, g, b): (f64, f64, f64)) -> Self {
        ColorSpec::Rgb(r, g, b)
    }
}

impl From<u32> for ColorSpec {
    fn from(n: u32) -> Self {
        ColorSpec::Packed(n)
    }
}

impl From<Color> for ColorSpec {
    fn from(c: Color) -> Self {
        ColorSpec::Name(c.hex())
    }
}

/// A color converted back to the caller's configured representation.
#[derive(Clone, Debug, PartialEq)]
pub enum UserColor {
    Name(String),
    /// Unit-interval triple, each channel `round(byte * 10000 / 255) / 10000`.
    Unit(f64, f64, f64),
    Bytes(u8, u8, u8),
}

/// Normalize any accepted input to a canonical [`Color`].
pub fn normalize(spec: &ColorSpec, mode: ColorMode) -> Result<Color, TurtleError> {
    match spec {
        ColorSpec::Name(raw) => {
            let trimmed = raw.trim();
            if let Some(color) = lookup_name(trimmed) {
                return Ok(color);
            }
            // Spaced names miss the table only when unregistered; collapse
            // the first space and retry before structural parses.
            let squeezed = trimmed.replacen(' ', "", 1);
            if let Some(color) = lookup_name(&squeezed) {
                return Ok(color);
            }
            if let Some(color) = Color::from_hex(&squeezed) {
                return Ok(color);
            }
            if let Some(body) = squeezed
                .strip_prefix("rgb(")
                .and_then(|rest| rest.strip_suffix(')'))
            {
                let parts: Vec<&str> = body.split(',').collect();
                if parts.len() == 3 {
                    let mut channels = [0u8; 3];
                    for (slot, part) in channels.iter_mut().zip(&parts) {
                        let n: i64 = part.trim().parse().map_err(|_| {
                            TurtleError::InvalidColor { value: raw.clone() }
                        })?;
                        *slot = n.clamp(0, 255) as u8;
                    }
                    return Ok(Color::rgb(channels[0], channels[1], channels[2]));
                }
            }
            Err(TurtleError::InvalidColor { value: raw.clone() })
        }
        ColorSpec::Rgb(r, g, b) => {
            let channel = |v: f64| -> Result<u8, TurtleError> {
                if !v.is_finite() {
                    return Err(TurtleError::InvalidColor {
                        value: format!("({r}, {g}, {b})"),
                    });
                }
                let scaled = match mode {
                    ColorMode::Unit => (v * 255.0).round(),
                    ColorMode::Byte => v.floor(),
                };
                Ok(scaled.clamp(0.0, 255.0) as u8)
            };
            Ok(Color::rgb(channel(*r)?, channel(*g)?, channel(*b)?))
        }
        ColorSpec::Packed(n) => Ok(Color::rgb(
            (n & 0xff) as u8,
            ((n >> 8) & 0xff) as u8,
            ((n >> 16) & 0xff) as u8,
        )),
    }
}

/// Convert a canonical color back to the caller's representation.
///
/// With `keep_names`, an exact match in the name table wins; otherwise the
/// numeric form for `mode` is produced. The unit-interval conversion rounds
/// to four decimal places in this direction only.
pub fn to_user(color: Color, mode: ColorMode, keep_names: bool) -> UserColor {
    if keep_names {
        if let Some(name) = name_for(color) {
            return UserColor::Name(name.to_string());
        }
    }
    match mode {
        ColorMode::Unit => {
            let unit = |c: u8| (c as f64 * 10000.0 / 255.0).round() / 10000.0;
            UserColor::Unit(unit(color.r), unit(color.g), unit(color.b))
        }
        ColorMode::Byte => UserColor::Bytes(color.r, color.g, color.b),
    }
}

/// Exact-name lookup in the registered table.
pub fn lookup_name(name: &str) -> Option<Color> {
    NAMED_COLORS
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, [r, g, b])| Color::rgb(*r, *g, *b))
}

/// Reverse lookup: the longest registered name for this exact value, ties
/// broken by registration order.
pub fn name_for(color: Color) -> Option<&'static str> {
    let target = [color.r, color.g, color.b];
    let mut best: Option<&'static str> = None;
    for (name, rgb) in NAMED_COLORS {
        if *rgb == target && best.is_none_or(|b| name.len() > b.len()) {
            best = Some(name);
        }
    }
    best
}

/// Tk/X11 color names. Multiword names are registered in both spaced and
/// CamelCase spellings, matching the classic Tk table.
#[rustfmt::skip]
static NAMED_COLORS: &[(&str, [u8; 3])] = &[
    ("alice blue", [240, 248, 255]),
    ("AliceBlue", [240, 248, 255]),
    ("antique white", [250, 235, 215]),
    ("AntiqueWhite", [250, 235, 215]),
    ("aquamarine", [127, 255, 212]),
    ("azure", [240, 255, 255]),
    ("beige", [245, 245, 220]),
    ("bisque", [255, 228, 196]),
    ("black", [0, 0, 0]),
    ("blanched almond", [255, 235, 205]),
    ("BlanchedAlmond", [255, 235, 205]),
    ("blue", [0, 0, 255]),
    ("blue violet", [138, 43, 226]),
    ("BlueViolet", [138, 43, 226]),
    ("brown", [165, 42, 42]),
    ("burlywood", [222, 184, 135]),
    ("cadet blue", [95, 158, 160]),
    ("CadetBlue", [95, 158, 160]),
    ("chartreuse", [127, 255, 0]),
    ("chocolate", [210, 105, 30]),
    ("coral", [255, 127, 80]),
    ("cornflower blue", [100, 149, 237]),
    ("CornflowerBlue", [100, 149, 237]),
    ("cornsilk", [255, 248, 220]),
    ("crimson", [220, 20, 60]),
    ("cyan", [0, 255, 255]),
    ("aqua", [0, 255, 255]),
    ("dark blue", [0, 0, 139]),
    ("DarkBlue", [0, 0, 139]),
    ("dark cyan", [0, 139, 139]),
    ("DarkCyan", [0, 139, 139]),
    ("dark goldenrod", [184, 134, 11]),
    ("DarkGoldenrod", [184, 134, 11]),
    ("dark gray", [169, 169, 169]),
    ("DarkGray", [169, 169, 169]),
    ("dark green", [0, 100, 0]),
    ("DarkGreen", [0, 100, 0]),
    ("dark grey", [169, 169, 169]),
    ("DarkGrey", [169, 169, 169]),
    ("dark khaki", [189, 183, 107]),
    ("DarkKhaki", [189, 183, 107]),
    ("dark magenta", [139, 0, 139]),
    ("DarkMagenta", [139, 0, 139]),
    ("dark olive green", [85, 107, 47]),
    ("DarkOliveGreen", [85, 107, 47]),
    ("dark orange", [255, 140, 0]),
    ("DarkOrange", [255, 140, 0]),
    ("dark orchid", [153, 50, 204]),
    ("DarkOrchid", [153, 50, 204]),
    ("dark red", [139, 0, 0]),
    ("DarkRed", [139, 0, 0]),
    ("dark salmon", [233, 150, 122]),
    ("DarkSalmon", [233, 150, 122]),
    ("dark sea green", [143, 188, 143]),
    ("DarkSeaGreen", [143, 188, 143]),
    ("dark slate blue", [72, 61, 139]),
    ("DarkSlateBlue", [72, 61, 139]),
    ("dark slate gray", [47, 79, 79]),
    ("DarkSlateGray", [47, 79, 79]),
    ("dark turquoise", [0, 206, 209]),
    ("DarkTurquoise", [0, 206, 209]),
    ("dark violet", [148, 0, 211]),
    ("DarkViolet", [148, 0, 211]),
    ("deep pink", [255, 20, 147]),
    ("DeepPink", [255, 20, 147]),
    ("deep sky blue", [0, 191, 255]),
    ("DeepSkyBlue", [0, 191, 255]),
    ("dim gray", [105, 105, 105]),
    ("DimGray", [105, 105, 105]),
    ("dodger blue", [30, 144, 255]),
    ("DodgerBlue", [30, 144, 255]),
    ("firebrick", [178, 34, 34]),
    ("floral white", [255, 250, 240]),
    ("FloralWhite", [255, 250, 240]),
    ("forest green", [34, 139, 34]),
    ("ForestGreen", [34, 139, 34]),
    ("gainsboro", [220, 220, 220]),
    ("ghost white", [248, 248, 255]),
    ("GhostWhite", [248, 248, 255]),
    ("gold", [255, 215, 0]),
    ("goldenrod", [218, 165, 32]),
    ("gray", [190, 190, 190]),
    ("green", [0, 255, 0]),
    ("green yellow", [173, 255, 47]),
    ("GreenYellow", [173, 255, 47]),
    ("grey", [190, 190, 190]),
    ("honeydew", [240, 255, 240]),
    ("hot pink", [255, 105, 180]),
    ("HotPink", [255, 105, 180]),
    ("indian red", [205, 92, 92]),
    ("IndianRed", [205, 92, 92]),
    ("indigo", [75, 0, 130]),
    ("ivory", [255, 255, 240]),
    ("khaki", [240, 230, 140]),
    ("lavender", [230, 230, 250]),
    ("lavender blush", [255, 240, 245]),
    ("LavenderBlush", [255, 240, 245]),
    ("lawn green", [124, 252, 0]),
    ("LawnGreen", [124, 252, 0]),
    ("lemon chiffon", [255, 250, 205]),
    ("LemonChiffon", [255, 250, 205]),
    ("light blue", [173, 216, 230]),
    ("LightBlue", [173, 216, 230]),
    ("light coral", [240, 128, 128]),
    ("LightCoral", [240, 128, 128]),
    ("light cyan", [224, 255, 255]),
    ("LightCyan", [224, 255, 255]),
    ("light goldenrod", [238, 221, 130]),
    ("LightGoldenrod", [238, 221, 130]),
    ("light gray", [211, 211, 211]),
    ("LightGray", [211, 211, 211]),
    ("light green", [144, 238, 144]),
    ("LightGreen", [144, 238, 144]),
    ("light pink", [255, 182, 193]),
    ("LightPink", [255, 182, 193]),
    ("light salmon", [255, 160, 122]),
    ("LightSalmon", [255, 160, 122]),
    ("light sea green", [32, 178, 170]),
    ("LightSeaGreen", [32, 178, 170]),
    ("light sky blue", [135, 206, 250]),
    ("LightSkyBlue", [135, 206, 250]),
    ("light slate gray", [119, 136, 153]),
    ("LightSlateGray", [119, 136, 153]),
    ("light steel blue", [176, 196, 222]),
    ("LightSteelBlue", [176, 196, 222]),
    ("light yellow", [255, 255, 224]),
    ("LightYellow", [255, 255, 224]),
    ("lime green", [50, 205, 50]),
    ("LimeGreen", [50, 205, 50]),
    ("linen", [250, 240, 230]),
    ("magenta", [255, 0, 255]),
    ("maroon", [176, 48, 96]),
    ("medium aquamarine", [102, 205, 170]),
    ("MediumAquamarine", [102, 205, 170]),
    ("medium blue", [0, 0, 205]),
    ("MediumBlue", [0, 0, 205]),
    ("medium orchid", [186, 85, 211]),
    ("MediumOrchid", [186, 85, 211]),
    ("medium purple", [147, 112, 219]),
    ("MediumPurple", [147, 112, 219]),
    ("medium sea green", [60, 179, 113]),
    ("MediumSeaGreen", [60, 179, 113]),
    ("medium slate blue", [123, 104, 238]),
    ("MediumSlateBlue", [123, 104, 238]),
    ("medium spring green", [0, 250, 154]),
    ("MediumSpringGreen", [0, 250, 154]),
    ("medium turquoise", [72, 209, 204]),
    ("MediumTurquoise", [72, 209, 204]),
    ("medium violet red", [199, 21, 133]),
    ("MediumVioletRed", [199, 21, 133]),
    ("midnight blue", [25, 25, 112]),
    ("MidnightBlue", [25, 25, 112]),
    ("mint cream", [245, 255, 250]),
    ("MintCream", [245, 255, 250]),
    ("misty rose", [255, 228, 225]),
    ("MistyRose", [255, 228, 225]),
    ("moccasin", [255, 228, 181]),
    ("navajo white", [255, 222, 173]),
    ("NavajoWhite", [255, 222, 173]),
    ("navy", [0, 0, 128]),
    ("navy blue", [0, 0, 128]),
    ("NavyBlue", [0, 0, 128]),
    ("old lace", [253, 245, 230]),
    ("OldLace", [253, 245, 230]),
    ("olive drab", [107, 142, 35]),
    ("OliveDrab", [107, 142, 35]),
    ("orange", [255, 165, 0]),
    ("orange red", [255, 69, 0]),
    ("OrangeRed", [255, 69, 0]),
    ("orchid", [218, 112, 214]),
    ("pale goldenrod", [238, 232, 170]),
    ("PaleGoldenrod", [238, 232, 170]),
    ("pale green", [152, 251, 152]),
    ("PaleGreen", [152, 251, 152]),
    ("pale turquoise", [175, 238, 238]),
    ("PaleTurquoise", [175, 238, 238]),
    ("pale violet red", [219, 112, 147]),
    ("PaleVioletRed", [219, 112, 147]),
    ("papaya whip", [255, 239, 213]),
    ("PapayaWhip", [255, 239, 213]),
    ("peach puff", [255, 218, 185]),
    ("PeachPuff", [255, 218, 185]),
    ("peru", [205, 133, 63]),
    ("pink", [255, 192, 203]),
    ("plum", [221, 160, 221]),
    ("powder blue", [176, 224, 230]),
    ("PowderBlue", [176, 224, 230]),
    ("purple", [160, 32, 240]),
    ("red", [255, 0, 0]),
    ("rosy brown", [188, 143, 143]),
    ("RosyBrown", [188, 143, 143]),
    ("royal blue", [65, 105, 225]),
    ("RoyalBlue", [65, 105, 225]),
    ("saddle brown", [139, 69, 19]),
    ("SaddleBrown", [139, 69, 19]),
    ("salmon", [250, 128, 114]),
    ("sandy brown", [244, 164, 96]),
    ("SandyBrown", [244, 164, 96]),
    ("sea green", [46, 139, 87]),
    ("SeaGreen", [46, 139, 87]),
    ("seashell", [255, 245, 238]),
    ("sienna", [160, 82, 45]),
    ("sky blue", [135, 206, 235]),
    ("SkyBlue", [135, 206, 235]),
    ("slate blue", [106, 90, 205]),
    ("SlateBlue", [106, 90, 205]),
    ("slate gray", [112, 128, 144]),
    ("SlateGray", [112, 128, 144]),
    ("snow", [255, 250, 250]),
    ("spring green", [0, 255, 127]),
    ("SpringGreen", [0, 255, 127]),
    ("steel blue", [70, 130, 180]),
    ("SteelBlue", [70, 130, 180]),
    ("tan", [210, 180, 140]),
    ("thistle", [216, 191, 216]),
    ("tomato", [255, 99, 71]),
    ("turquoise", [64, 224, 208]),
    ("violet", [238, 130, 238]),
    ("violet red", [208, 32, 144]),
    ("VioletRed", [208, 32, 144]),
    ("wheat", [245, 222, 179]),
    ("white", [255, 255, 255]),
    ("white smoke", [245, 245, 245]),
    ("WhiteSmoke", [245, 245, 245]),
    ("yellow", [255, 255, 0]),
    ("yellow green", [154, 205, 50]),
    ("YellowGreen", [154, 205, 50]),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_lookup() {
        let c = normalize(&"dodger blue".into(), ColorMode::Unit).unwrap();
        assert_eq!(c.hex(), "#1e90ff");
        // CamelCase spelling maps to the same value
        let c2 = normalize(&"DodgerBlue".into(), ColorMode::Unit).unwrap();
        assert_eq!(c, c2);
    }

    #[test]
    fn hex_passthrough() {
        let c = normalize(&"#a1b2c3".into(), ColorMode::Byte).unwrap();
        assert_eq!(c, Color::rgb(0xa1, 0xb2, 0xc3));
        assert!(normalize(&"#12345".into(), ColorMode::Byte).is_err());
        assert!(normalize(&"#gg0000".into(), ColorMode::Byte).is_err());
    }

    #[test]
    fn rgb_function_string() {
        let c = normalize(&"rgb(300, -4, 128)".into(), ColorMode::Byte).unwrap();
        assert_eq!(c, Color::rgb(255, 0, 128));
    }

    #[test]
    fn triples_unit_and_byte() {
        let unit = normalize(&ColorSpec::Rgb(1.0, 0.5, 0.0), ColorMode::Unit).unwrap();
        assert_eq!(unit, Color::rgb(255, 128, 0));
        let byte = normalize(&ColorSpec::Rgb(255.9, 64.2, 0.0), ColorMode::Byte).unwrap();
        assert_eq!(byte, Color::rgb(255, 64, 0));
    }

    #[test]
    fn packed_is_little_endian() {
        let c = normalize(&ColorSpec::Packed(0x00c83202), ColorMode::Unit).unwrap();
        assert_eq!(c, Color::rgb(0x02, 0x32, 0xc8));
    }

    #[test]
    fn unknown_name_rejected() {
        let err = normalize(&"not a color".into(), ColorMode::Unit).unwrap_err();
        assert_eq!(
            err,
            TurtleError::InvalidColor {
                value: "not a color".into()
            }
        );
    }

    #[test]
    fn byte_round_trip() {
        let c = normalize(&ColorSpec::Rgb(12.0, 34.0, 56.0), ColorMode::Byte).unwrap();
        assert_eq!(to_user(c, ColorMode::Byte, false), UserColor::Bytes(12, 34, 56));
    }

    #[test]
    fn unit_conversion_rounds_to_four_places() {
        // 128/255 = 0.50196..., rounded to 4 places
        assert_eq!(
            to_user(Color::rgb(128, 0, 255), ColorMode::Unit, false),
            UserColor::Unit(0.502, 0.0, 1.0)
        );
    }

    #[test]
    fn keep_names_prefers_longest() {
        // "alice blue" (10) beats "AliceBlue" (9)
        assert_eq!(name_for(Color::rgb(240, 248, 255)), Some("alice blue"));
        // tie on length falls back to registration order: cyan before aqua
        assert_eq!(name_for(Color::rgb(0, 255, 255)), Some("cyan"));
        assert_eq!(
            to_user(Color::rgb(255, 0, 0), ColorMode::Unit, true),
            UserColor::Name("red".into())
        );
    }

    #[test]
    fn unnamed_value_falls_back_to_mode() {
        assert_eq!(
            to_user(Color::rgb(1, 2, 3), ColorMode::Byte, true),
            UserColor::Bytes(1, 2, 3)
        );
    }
}
