//! sRGB colour with hex parsing for config files.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::FieldError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// CSS `rgba(...)` string with the given alpha in `[0, 1]`.
    pub fn css(&self, alpha: f32) -> String {
        format!(
            "rgba({}, {}, {}, {:.3})",
            self.r,
            self.g,
            self.b,
            alpha.clamp(0.0, 1.0)
        )
    }
}

impl FromStr for Color {
    type Err = FieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s.trim().trim_start_matches('#');
        let invalid = || FieldError::Invalid(format!("bad colour {s:?}"));
        // `from_str_radix` alone would let a sign through.
        if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(invalid());
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| invalid());
        match hex.len() {
            6 => Ok(Color::rgb(channel(0)?, channel(2)?, channel(4)?)),
            3 => {
                let short = |i: usize| {
                    u8::from_str_radix(&hex[i..i + 1], 16)
                        .map(|v| v * 17)
                        .map_err(|_| invalid())
                };
                Ok(Color::rgb(short(0)?, short(1)?, short(2)?))
            }
            _ => Err(invalid()),
        }
    }
}

impl TryFrom<String> for Color {
    type Error = FieldError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_string()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_long_and_short_hex() {
        assert_eq!("#ff69b4".parse::<Color>().unwrap(), Color::rgb(255, 105, 180));
        assert_eq!("f0f".parse::<Color>().unwrap(), Color::rgb(255, 0, 255));
        assert!("#12345".parse::<Color>().is_err());
        assert!("#gg0000".parse::<Color>().is_err());
    }

    #[test]
    fn rejects_signs_and_non_ascii() {
        for bad in ["#+1+2+3", "+f+f+f", "#-10000", "#+ff", "#é0000"] {
            assert!(bad.parse::<Color>().is_err(), "{bad} parsed");
        }
    }

    #[test]
    fn css_clamps_alpha() {
        assert_eq!(Color::WHITE.css(1.5), "rgba(255, 255, 255, 1.000)");
        assert_eq!(Color::rgb(1, 2, 3).css(0.25), "rgba(1, 2, 3, 0.250)");
    }

    #[test]
    fn serde_uses_hex_strings() {
        let c: Color = serde_json::from_str("\"#00ffff\"").unwrap();
        assert_eq!(c, Color::rgb(0, 255, 255));
        assert_eq!(serde_json::to_string(&c).unwrap(), "\"#00ffff\"");
    }
}
