//! Hex color parsing for composition color fields.

use thiserror::Error;

/// 8-bit RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const BLACK: Rgba = Rgba::opaque(0, 0, 0);
    pub const WHITE: Rgba = Rgba::opaque(255, 255, 255);

    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }
}

/// Failure to parse a hex color string.
#[derive(Debug, Error)]
#[error("invalid hex color {value:?}")]
pub struct ColorParseError {
    pub value: String,
}

/// Parse `#rgb`, `#rrggbb`, or `#rrggbbaa`.
pub fn parse_hex(s: &str) -> Result<Rgba, ColorParseError> {
    let err = || ColorParseError {
        value: s.to_string(),
    };
    let hex = s.strip_prefix('#').ok_or_else(err)?;

    let nibble = |c: char| c.to_digit(16).map(|d| d as u8);
    let chars: Vec<u8> = hex.chars().map(nibble).collect::<Option<_>>().ok_or_else(err)?;

    match chars.as_slice() {
        [r, g, b] => Ok(Rgba::opaque(r * 17, g * 17, b * 17)),
        [r1, r0, g1, g0, b1, b0] => Ok(Rgba::opaque(r1 * 16 + r0, g1 * 16 + g0, b1 * 16 + b0)),
        [r1, r0, g1, g0, b1, b0, a1, a0] => Ok(Rgba {
            r: r1 * 16 + r0,
            g: g1 * 16 + g0,
            b: b1 * 16 + b0,
            a: a1 * 16 + a0,
        }),
        _ => Err(err()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_common_forms() {
        assert_eq!(parse_hex("#000000").unwrap(), Rgba::BLACK);
        assert_eq!(parse_hex("#ffffff").unwrap(), Rgba::WHITE);
        assert_eq!(parse_hex("#f00").unwrap(), Rgba::opaque(255, 0, 0));
        assert_eq!(
            parse_hex("#10203040").unwrap(),
            Rgba {
                r: 0x10,
                g: 0x20,
                b: 0x30,
                a: 0x40
            }
        );
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_hex("red").is_err());
        assert!(parse_hex("#12345").is_err());
        assert!(parse_hex("#gggggg").is_err());
    }
}
