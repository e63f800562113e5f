//! Interpretation of declaration values: colors, lengths and keywords.
//!
//! The parser keeps declaration values as component values; the helpers in
//! this module are what the cascade uses to read them.

use std::collections::HashMap;
use std::fmt;

use lazy_static::lazy_static;

use crate::parser::ComponentValue;
use crate::token::TokenKind;

/// CSS length units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LengthUnit {
    Px,
    Em,
    Rem,
    Ex,
    Ch,
    Vw,
    Vh,
    Vmin,
    Vmax,
    Pt,
    Pc,
    In,
    Cm,
    Mm,
    Q,
}

impl LengthUnit {
    pub fn from_unit(unit: &str) -> Option<Self> {
        let unit = unit.to_ascii_lowercase();
        Some(match unit.as_str() {
            "px" => LengthUnit::Px,
            "em" => LengthUnit::Em,
            "rem" => LengthUnit::Rem,
            "ex" => LengthUnit::Ex,
            "ch" => LengthUnit::Ch,
            "vw" => LengthUnit::Vw,
            "vh" => LengthUnit::Vh,
            "vmin" => LengthUnit::Vmin,
            "vmax" => LengthUnit::Vmax,
            "pt" => LengthUnit::Pt,
            "pc" => LengthUnit::Pc,
            "in" => LengthUnit::In,
            "cm" => LengthUnit::Cm,
            "mm" => LengthUnit::Mm,
            "q" => LengthUnit::Q,
            _ => return None,
        })
    }

    /// Pixels per unit for absolute units (96px per inch).
    pub fn absolute_px(self) -> Option<f64> {
        match self {
            LengthUnit::Px => Some(1.0),
            LengthUnit::In => Some(96.0),
            LengthUnit::Pt => Some(96.0 / 72.0),
            LengthUnit::Pc => Some(16.0),
            LengthUnit::Cm => Some(96.0 / 2.54),
            LengthUnit::Mm => Some(96.0 / 25.4),
            LengthUnit::Q => Some(96.0 / 101.6),
            _ => None,
        }
    }

    pub fn is_font_relative(self) -> bool {
        matches!(self, LengthUnit::Em | LengthUnit::Rem | LengthUnit::Ex | LengthUnit::Ch)
    }

    pub fn is_viewport_relative(self) -> bool {
        matches!(self, LengthUnit::Vw | LengthUnit::Vh | LengthUnit::Vmin | LengthUnit::Vmax)
    }
}

/// An RGBA color value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CssColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl CssColor {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const TRANSPARENT: Self = Self::new(0, 0, 0, 0);
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    pub const WHITE: Self = Self::rgb(255, 255, 255);
}

impl fmt::Display for CssColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.a == 255 {
            write!(f, "rgb({}, {}, {})", self.r, self.g, self.b)
        } else {
            let alpha = (self.a as f64 / 255.0 * 1000.0).round() / 1000.0;
            write!(f, "rgba({}, {}, {}, {alpha})", self.r, self.g, self.b)
        }
    }
}

/// A single interpreted value.
#[derive(Debug, Clone, PartialEq)]
pub enum CssValue {
    /// A keyword, lowercased (e.g. `block`, `none`, `bold`).
    Keyword(String),
    Number(f64),
    Percentage(f64),
    Length(f64, LengthUnit),
    Color(CssColor),
    String(String),
    Url(String),
    /// A function this module does not interpret, e.g. `calc()` or `var()`.
    Function { name: String, args: Vec<ComponentValue> },
    /// Any other token, kept as CSS text.
    Other(String),
}

const NAMED_COLOR_TABLE: &[(&str, CssColor)] = &[
    ("aliceblue", CssColor::rgb(240, 248, 255)),
    ("antiquewhite", CssColor::rgb(250, 235, 215)),
    ("aqua", CssColor::rgb(0, 255, 255)),
    ("aquamarine", CssColor::rgb(127, 255, 212)),
    ("azure", CssColor::rgb(240, 255, 255)),
    ("beige", CssColor::rgb(245, 245, 220)),
    ("bisque", CssColor::rgb(255, 228, 196)),
    ("black", CssColor::rgb(0, 0, 0)),
    ("blanchedalmond", CssColor::rgb(255, 235, 205)),
    ("blue", CssColor::rgb(0, 0, 255)),
    ("blueviolet", CssColor::rgb(138, 43, 226)),
    ("brown", CssColor::rgb(165, 42, 42)),
    ("burlywood", CssColor::rgb(222, 184, 135)),
    ("cadetblue", CssColor::rgb(95, 158, 160)),
    ("chartreuse", CssColor::rgb(127, 255, 0)),
    ("chocolate", CssColor::rgb(210, 105, 30)),
    ("coral", CssColor::rgb(255, 127, 80)),
    ("cornflowerblue", CssColor::rgb(100, 149, 237)),
    ("cornsilk", CssColor::rgb(255, 248, 220)),
    ("crimson", CssColor::rgb(220, 20, 60)),
    ("cyan", CssColor::rgb(0, 255, 255)),
    ("darkblue", CssColor::rgb(0, 0, 139)),
    ("darkcyan", CssColor::rgb(0, 139, 139)),
    ("darkgoldenrod", CssColor::rgb(184, 134, 11)),
    ("darkgray", CssColor::rgb(169, 169, 169)),
    ("darkgreen", CssColor::rgb(0, 100, 0)),
    ("darkgrey", CssColor::rgb(169, 169, 169)),
    ("darkkhaki", CssColor::rgb(189, 183, 107)),
    ("darkmagenta", CssColor::rgb(139, 0, 139)),
    ("darkolivegreen", CssColor::rgb(85, 107, 47)),
    ("darkorange", CssColor::rgb(255, 140, 0)),
    ("darkorchid", CssColor::rgb(153, 50, 204)),
    ("darkred", CssColor::rgb(139, 0, 0)),
    ("darksalmon", CssColor::rgb(233, 150, 122)),
    ("darkseagreen", CssColor::rgb(143, 188, 143)),
    ("darkslateblue", CssColor::rgb(72, 61, 139)),
    ("darkslategray", CssColor::rgb(47, 79, 79)),
    ("darkslategrey", CssColor::rgb(47, 79, 79)),
    ("darkturquoise", CssColor::rgb(0, 206, 209)),
    ("darkviolet", CssColor::rgb(148, 0, 211)),
    ("deeppink", CssColor::rgb(255, 20, 147)),
    ("deepskyblue", CssColor::rgb(0, 191, 255)),
    ("dimgray", CssColor::rgb(105, 105, 105)),
    ("dimgrey", CssColor::rgb(105, 105, 105)),
    ("dodgerblue", CssColor::rgb(30, 144, 255)),
    ("firebrick", CssColor::rgb(178, 34, 34)),
    ("floralwhite", CssColor::rgb(255, 250, 240)),
    ("forestgreen", CssColor::rgb(34, 139, 34)),
    ("fuchsia", CssColor::rgb(255, 0, 255)),
    ("gainsboro", CssColor::rgb(220, 220, 220)),
    ("ghostwhite", CssColor::rgb(248, 248, 255)),
    ("gold", CssColor::rgb(255, 215, 0)),
    ("goldenrod", CssColor::rgb(218, 165, 32)),
    ("gray", CssColor::rgb(128, 128, 128)),
    ("green", CssColor::rgb(0, 128, 0)),
    ("greenyellow", CssColor::rgb(173, 255, 47)),
    ("grey", CssColor::rgb(128, 128, 128)),
    ("honeydew", CssColor::rgb(240, 255, 240)),
    ("hotpink", CssColor::rgb(255, 105, 180)),
    ("indianred", CssColor::rgb(205, 92, 92)),
    ("indigo", CssColor::rgb(75, 0, 130)),
    ("ivory", CssColor::rgb(255, 255, 240)),
    ("khaki", CssColor::rgb(240, 230, 140)),
    ("lavender", CssColor::rgb(230, 230, 250)),
    ("lavenderblush", CssColor::rgb(255, 240, 245)),
    ("lawngreen", CssColor::rgb(124, 252, 0)),
    ("lemonchiffon", CssColor::rgb(255, 250, 205)),
    ("lightblue", CssColor::rgb(173, 216, 230)),
    ("lightcoral", CssColor::rgb(240, 128, 128)),
    ("lightcyan", CssColor::rgb(224, 255, 255)),
    ("lightgoldenrodyellow", CssColor::rgb(250, 250, 210)),
    ("lightgray", CssColor::rgb(211, 211, 211)),
    ("lightgreen", CssColor::rgb(144, 238, 144)),
    ("lightgrey", CssColor::rgb(211, 211, 211)),
    ("lightpink", CssColor::rgb(255, 182, 193)),
    ("lightsalmon", CssColor::rgb(255, 160, 122)),
    ("lightseagreen", CssColor::rgb(32, 178, 170)),
    ("lightskyblue", CssColor::rgb(135, 206, 250)),
    ("lightslategray", CssColor::rgb(119, 136, 153)),
    ("lightslategrey", CssColor::rgb(119, 136, 153)),
    ("lightsteelblue", CssColor::rgb(176, 196, 222)),
    ("lightyellow", CssColor::rgb(255, 255, 224)),
    ("lime", CssColor::rgb(0, 255, 0)),
    ("limegreen", CssColor::rgb(50, 205, 50)),
    ("linen", CssColor::rgb(250, 240, 230)),
    ("magenta", CssColor::rgb(255, 0, 255)),
    ("maroon", CssColor::rgb(128, 0, 0)),
    ("mediumaquamarine", CssColor::rgb(102, 205, 170)),
    ("mediumblue", CssColor::rgb(0, 0, 205)),
    ("mediumorchid", CssColor::rgb(186, 85, 211)),
    ("mediumpurple", CssColor::rgb(147, 112, 219)),
    ("mediumseagreen", CssColor::rgb(60, 179, 113)),
    ("mediumslateblue", CssColor::rgb(123, 104, 238)),
    ("mediumspringgreen", CssColor::rgb(0, 250, 154)),
    ("mediumturquoise", CssColor::rgb(72, 209, 204)),
    ("mediumvioletred", CssColor::rgb(199, 21, 133)),
    ("midnightblue", CssColor::rgb(25, 25, 112)),
    ("mintcream", CssColor::rgb(245, 255, 250)),
    ("mistyrose", CssColor::rgb(255, 228, 225)),
    ("moccasin", CssColor::rgb(255, 228, 181)),
    ("navajowhite", CssColor::rgb(255, 222, 173)),
    ("navy", CssColor::rgb(0, 0, 128)),
    ("oldlace", CssColor::rgb(253, 245, 230)),
    ("olive", CssColor::rgb(128, 128, 0)),
    ("olivedrab", CssColor::rgb(107, 142, 35)),
    ("orange", CssColor::rgb(255, 165, 0)),
    ("orangered", CssColor::rgb(255, 69, 0)),
    ("orchid", CssColor::rgb(218, 112, 214)),
    ("palegoldenrod", CssColor::rgb(238, 232, 170)),
    ("palegreen", CssColor::rgb(152, 251, 152)),
    ("paleturquoise", CssColor::rgb(175, 238, 238)),
    ("palevioletred", CssColor::rgb(219, 112, 147)),
    ("papayawhip", CssColor::rgb(255, 239, 213)),
    ("peachpuff", CssColor::rgb(255, 218, 185)),
    ("peru", CssColor::rgb(205, 133, 63)),
    ("pink", CssColor::rgb(255, 192, 203)),
    ("plum", CssColor::rgb(221, 160, 221)),
    ("powderblue", CssColor::rgb(176, 224, 230)),
    ("purple", CssColor::rgb(128, 0, 128)),
    ("rebeccapurple", CssColor::rgb(102, 51, 153)),
    ("red", CssColor::rgb(255, 0, 0)),
    ("rosybrown", CssColor::rgb(188, 143, 143)),
    ("royalblue", CssColor::rgb(65, 105, 225)),
    ("saddlebrown", CssColor::rgb(139, 69, 19)),
    ("salmon", CssColor::rgb(250, 128, 114)),
    ("sandybrown", CssColor::rgb(244, 164, 96)),
    ("seagreen", CssColor::rgb(46, 139, 87)),
    ("seashell", CssColor::rgb(255, 245, 238)),
    ("sienna", CssColor::rgb(160, 82, 45)),
    ("silver", CssColor::rgb(192, 192, 192)),
    ("skyblue", CssColor::rgb(135, 206, 235)),
    ("slateblue", CssColor::rgb(106, 90, 205)),
    ("slategray", CssColor::rgb(112, 128, 144)),
    ("slategrey", CssColor::rgb(112, 128, 144)),
    ("snow", CssColor::rgb(255, 250, 250)),
    ("springgreen", CssColor::rgb(0, 255, 127)),
    ("steelblue", CssColor::rgb(70, 130, 180)),
    ("tan", CssColor::rgb(210, 180, 140)),
    ("teal", CssColor::rgb(0, 128, 128)),
    ("thistle", CssColor::rgb(216, 191, 216)),
    ("tomato", CssColor::rgb(255, 99, 71)),
    ("transparent", CssColor::TRANSPARENT),
    ("turquoise", CssColor::rgb(64, 224, 208)),
    ("violet", CssColor::rgb(238, 130, 238)),
    ("wheat", CssColor::rgb(245, 222, 179)),
    ("white", CssColor::rgb(255, 255, 255)),
    ("whitesmoke", CssColor::rgb(245, 245, 245)),
    ("yellow", CssColor::rgb(255, 255, 0)),
    ("yellowgreen", CssColor::rgb(154, 205, 50)),
];

lazy_static! {
    /// Named colors keyed by lowercase name.
    static ref NAMED_COLORS: HashMap<&'static str, CssColor> =
        NAMED_COLOR_TABLE.iter().copied().collect();
}

/// Look up one of the 148 named colors (plus `transparent`).
pub fn named_color(name: &str) -> Option<CssColor> {
    if name.bytes().any(|b| b.is_ascii_uppercase()) {
        NAMED_COLORS.get(name.to_ascii_lowercase().as_str()).copied()
    } else {
        NAMED_COLORS.get(name).copied()
    }
}

/// Parse the digits of a `#rgb`, `#rgba`, `#rrggbb` or `#rrggbbaa` color.
pub fn parse_hex_color(hex: &str) -> Option<CssColor> {
    let digits: Vec<u8> = hex
        .chars()
        .map(|c| c.to_digit(16).map(|d| d as u8))
        .collect::<Option<_>>()?;
    let short = |i: usize| digits[i] * 17;
    let long = |i: usize| digits[i] * 16 + digits[i + 1];
    match digits.len() {
        3 => Some(CssColor::rgb(short(0), short(1), short(2))),
        4 => Some(CssColor::new(short(0), short(1), short(2), short(3))),
        6 => Some(CssColor::rgb(long(0), long(2), long(4))),
        8 => Some(CssColor::new(long(0), long(2), long(4), long(6))),
        _ => None,
    }
}

/// Interpret a color value: a name, a hex hash, or an `rgb()`/`rgba()`/
/// `hsl()`/`hsla()` function. `currentcolor` is left to the caller.
pub fn parse_color(value: &ComponentValue) -> Option<CssColor> {
    match value {
        ComponentValue::Preserved(token) => match &token.kind {
            TokenKind::Ident(name) => named_color(name),
            TokenKind::Hash { value, .. } => parse_hex_color(value),
            _ => None,
        },
        ComponentValue::Function { name, values } => {
            let lower = name.to_ascii_lowercase();
            match lower.as_str() {
                "rgb" | "rgba" => parse_rgb_args(values),
                "hsl" | "hsla" => parse_hsl_args(values),
                _ => None,
            }
        }
        ComponentValue::Block { .. } => None,
    }
}

/// Numeric arguments of a color function; separators (`,`, `/`) dropped.
enum ColorArg {
    Number(f64),
    Percentage(f64),
}

fn color_args(values: &[ComponentValue]) -> Option<Vec<ColorArg>> {
    let mut args = Vec::new();
    for value in values {
        match value.token() {
            Some(TokenKind::Number { value, .. }) => args.push(ColorArg::Number(*value)),
            Some(TokenKind::Percentage(value)) => args.push(ColorArg::Percentage(*value)),
            Some(TokenKind::Dimension { value, unit, .. }) => {
                let degrees = match unit.to_ascii_lowercase().as_str() {
                    "deg" => *value,
                    "rad" => value.to_degrees(),
                    "grad" => value * 0.9,
                    "turn" => value * 360.0,
                    _ => return None,
                };
                args.push(ColorArg::Number(degrees));
            }
            Some(TokenKind::Whitespace | TokenKind::Comma | TokenKind::Delim('/')) => {}
            Some(TokenKind::Ident(none)) if none.eq_ignore_ascii_case("none") => {
                args.push(ColorArg::Number(0.0));
            }
            _ => return None,
        }
    }
    Some(args)
}

fn to_channel(v: f64) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}

fn alpha_channel(arg: Option<&ColorArg>) -> u8 {
    match arg {
        None => 255,
        Some(ColorArg::Number(a)) => to_channel(a.clamp(0.0, 1.0) * 255.0),
        Some(ColorArg::Percentage(p)) => to_channel(p.clamp(0.0, 100.0) / 100.0 * 255.0),
    }
}

fn parse_rgb_args(values: &[ComponentValue]) -> Option<CssColor> {
    let args = color_args(values)?;
    if !(3..=4).contains(&args.len()) {
        return None;
    }
    let channel = |arg: &ColorArg| match arg {
        ColorArg::Number(v) => to_channel(*v),
        ColorArg::Percentage(p) => to_channel(p / 100.0 * 255.0),
    };
    Some(CssColor::new(
        channel(&args[0]),
        channel(&args[1]),
        channel(&args[2]),
        alpha_channel(args.get(3)),
    ))
}

fn parse_hsl_args(values: &[ComponentValue]) -> Option<CssColor> {
    let args = color_args(values)?;
    if !(3..=4).contains(&args.len()) {
        return None;
    }
    let number = |arg: &ColorArg| match arg {
        ColorArg::Number(v) | ColorArg::Percentage(v) => *v,
    };
    let h = number(&args[0]).rem_euclid(360.0);
    let s = (number(&args[1]) / 100.0).clamp(0.0, 1.0);
    let l = (number(&args[2]) / 100.0).clamp(0.0, 1.0);
    let (r, g, b) = hsl_to_rgb(h, s, l);
    Some(CssColor::new(r, g, b, alpha_channel(args.get(3))))
}

fn hsl_to_rgb(h: f64, s: f64, l: f64) -> (u8, u8, u8) {
    let chroma = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let h_prime = h / 60.0;
    let x = chroma * (1.0 - (h_prime.rem_euclid(2.0) - 1.0).abs());
    let (r1, g1, b1) = match h_prime as u32 {
        0 => (chroma, x, 0.0),
        1 => (x, chroma, 0.0),
        2 => (0.0, chroma, x),
        3 => (0.0, x, chroma),
        4 => (x, 0.0, chroma),
        _ => (chroma, 0.0, x),
    };
    let m = l - chroma / 2.0;
    (
        to_channel((r1 + m) * 255.0),
        to_channel((g1 + m) * 255.0),
        to_channel((b1 + m) * 255.0),
    )
}

impl CssValue {
    /// Interpret a single component value.
    pub fn from_component(value: &ComponentValue) -> CssValue {
        if let Some(color) = parse_color(value) {
            // Named colors are also keywords; keep `transparent` etc. as colors.
            return CssValue::Color(color);
        }
        match value {
            ComponentValue::Preserved(token) => match &token.kind {
                TokenKind::Ident(s) => CssValue::Keyword(s.to_ascii_lowercase()),
                TokenKind::Number { value, .. } => CssValue::Number(*value),
                TokenKind::Percentage(value) => CssValue::Percentage(*value),
                TokenKind::Dimension { value, unit, .. } => match LengthUnit::from_unit(unit) {
                    Some(unit) => CssValue::Length(*value, unit),
                    None => CssValue::Other(token.to_css()),
                },
                TokenKind::String(s) => CssValue::String(s.clone()),
                TokenKind::Url(u) => CssValue::Url(u.clone()),
                _ => CssValue::Other(token.to_css()),
            },
            ComponentValue::Function { name, values } => {
                if name.eq_ignore_ascii_case("url") {
                    let url = values.iter().find_map(|v| match v.token() {
                        Some(TokenKind::String(s)) => Some(s.clone()),
                        _ => None,
                    });
                    if let Some(url) = url {
                        return CssValue::Url(url);
                    }
                }
                CssValue::Function {
                    name: name.to_ascii_lowercase(),
                    args: values.clone(),
                }
            }
            ComponentValue::Block { .. } => CssValue::Other(value.to_css()),
        }
    }

    pub fn as_keyword(&self) -> Option<&str> {
        match self {
            CssValue::Keyword(k) => Some(k),
            _ => None,
        }
    }
}

/// Interpret a whitespace-separated value; whitespace is dropped.
pub fn parse_value_list(values: &[ComponentValue]) -> Vec<CssValue> {
    values
        .iter()
        .filter(|v| !v.is_whitespace())
        .map(CssValue::from_component)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_component_values;

    fn color(text: &str) -> Option<CssColor> {
        let values = parse_component_values(text);
        values.first().and_then(parse_color)
    }

    #[test]
    fn test_named_colors() {
        // 148 named colors plus `transparent`.
        assert_eq!(NAMED_COLOR_TABLE.len(), 149);
        assert_eq!(named_color("red"), Some(CssColor::rgb(255, 0, 0)));
        assert_eq!(named_color("RebeccaPurple"), Some(CssColor::rgb(102, 51, 153)));
        assert_eq!(named_color("transparent"), Some(CssColor::TRANSPARENT));
        assert_eq!(named_color("notacolor"), None);
    }

    #[test]
    fn test_hex_colors() {
        assert_eq!(color("#fff"), Some(CssColor::WHITE));
        assert_eq!(color("#ff000080"), Some(CssColor::new(255, 0, 0, 128)));
        assert_eq!(color("#0f08"), Some(CssColor::new(0, 255, 0, 136)));
        assert_eq!(color("#12345"), None);
        assert_eq!(color("#ggg"), None);
    }

    #[test]
    fn test_rgb_functions() {
        assert_eq!(color("rgb(255, 0, 0)"), Some(CssColor::rgb(255, 0, 0)));
        assert_eq!(color("rgba(0, 0, 255, 0.5)"), Some(CssColor::new(0, 0, 255, 128)));
        assert_eq!(color("rgb(0 128 0 / 50%)"), Some(CssColor::new(0, 128, 0, 128)));
        assert_eq!(color("rgb(100%, 0%, 0%)"), Some(CssColor::rgb(255, 0, 0)));
        assert_eq!(color("rgb(1, 2)"), None);
    }

    #[test]
    fn test_hsl_functions() {
        assert_eq!(color("hsl(0, 100%, 50%)"), Some(CssColor::rgb(255, 0, 0)));
        assert_eq!(color("hsl(120deg 100% 25%)"), Some(CssColor::rgb(0, 128, 0)));
        assert_eq!(color("hsla(240, 100%, 50%, 0)"), Some(CssColor::new(0, 0, 255, 0)));
        assert_eq!(color("hsl(0, 0%, 100%)"), Some(CssColor::WHITE));
    }

    #[test]
    fn test_value_list() {
        let values = parse_component_values("10px 50% 2 auto \"s\" calc(1px + 2px) 3zz");
        let parsed = parse_value_list(&values);
        assert_eq!(parsed[0], CssValue::Length(10.0, LengthUnit::Px));
        assert_eq!(parsed[1], CssValue::Percentage(50.0));
        assert_eq!(parsed[2], CssValue::Number(2.0));
        assert_eq!(parsed[3], CssValue::Keyword("auto".into()));
        assert_eq!(parsed[4], CssValue::String("s".into()));
        assert!(matches!(&parsed[5], CssValue::Function { name, .. } if name == "calc"));
        assert_eq!(parsed[6], CssValue::Other("3zz".into()));
    }

    #[test]
    fn test_absolute_units() {
        assert_eq!(LengthUnit::In.absolute_px(), Some(96.0));
        assert_eq!(LengthUnit::Pt.absolute_px().map(|r| r * 72.0), Some(96.0));
        assert_eq!(LengthUnit::Em.absolute_px(), None);
        assert_eq!(LengthUnit::from_unit("PX"), Some(LengthUnit::Px));
    }

    #[test]
    fn test_color_display() {
        assert_eq!(CssColor::rgb(1, 2, 3).to_string(), "rgb(1, 2, 3)");
        assert_eq!(CssColor::new(0, 0, 0, 0).to_string(), "rgba(0, 0, 0, 0)");
    }
}
