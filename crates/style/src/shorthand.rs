//! Shorthand properties and their expansion into longhands.
//!
//! Values reaching [`expand`] have already had `var()` substituted. Parts a
//! shorthand leaves out are reset to the longhand's initial value.

use css::{ComponentValue, TokenKind, parse_color, parse_component_values};

use crate::properties::property_default;

/// Outcome of expanding one declaration.
#[derive(Debug, Clone, PartialEq)]
pub enum Expansion {
    NotShorthand,
    /// A shorthand whose value does not parse; the declaration is dropped.
    Invalid,
    Longhands(Vec<(&'static str, Vec<ComponentValue>)>),
}

const MARGIN: &[&str] = &["margin-top", "margin-right", "margin-bottom", "margin-left"];
const PADDING: &[&str] = &["padding-top", "padding-right", "padding-bottom", "padding-left"];
const INSET: &[&str] = &["top", "right", "bottom", "left"];
const BORDER_WIDTH: &[&str] = &["border-top-width", "border-right-width", "border-bottom-width", "border-left-width"];
const BORDER_STYLE: &[&str] = &["border-top-style", "border-right-style", "border-bottom-style", "border-left-style"];
const BORDER_COLOR: &[&str] = &["border-top-color", "border-right-color", "border-bottom-color", "border-left-color"];
const BORDER_RADIUS: &[&str] = &[
    "border-top-left-radius",
    "border-top-right-radius",
    "border-bottom-right-radius",
    "border-bottom-left-radius",
];
const BORDER: &[&str] = &[
    "border-top-width",
    "border-right-width",
    "border-bottom-width",
    "border-left-width",
    "border-top-style",
    "border-right-style",
    "border-bottom-style",
    "border-left-style",
    "border-top-color",
    "border-right-color",
    "border-bottom-color",
    "border-left-color",
];
const BORDER_TOP: &[&str] = &["border-top-width", "border-top-style", "border-top-color"];
const BORDER_RIGHT: &[&str] = &["border-right-width", "border-right-style", "border-right-color"];
const BORDER_BOTTOM: &[&str] = &["border-bottom-width", "border-bottom-style", "border-bottom-color"];
const BORDER_LEFT: &[&str] = &["border-left-width", "border-left-style", "border-left-color"];
const OUTLINE: &[&str] = &["outline-width", "outline-style", "outline-color"];
const BACKGROUND: &[&str] = &["background-color", "background-image"];
const FLEX: &[&str] = &["flex-grow", "flex-shrink", "flex-basis"];
const FLEX_FLOW: &[&str] = &["flex-direction", "flex-wrap"];
const GAP: &[&str] = &["row-gap", "column-gap"];
const OVERFLOW: &[&str] = &["overflow-x", "overflow-y"];
const LIST_STYLE: &[&str] = &["list-style-type", "list-style-position", "list-style-image"];
const TEXT_DECORATION: &[&str] = &["text-decoration-line", "text-decoration-style", "text-decoration-color"];
const FONT: &[&str] = &["font-style", "font-variant", "font-weight", "font-size", "line-height", "font-family"];

/// Longhands a shorthand sets, or `None` for anything else.
pub fn longhands(name: &str) -> Option<&'static [&'static str]> {
    Some(match name {
        "margin" => MARGIN,
        "padding" => PADDING,
        "inset" => INSET,
        "border" => BORDER,
        "border-top" => BORDER_TOP,
        "border-right" => BORDER_RIGHT,
        "border-bottom" => BORDER_BOTTOM,
        "border-left" => BORDER_LEFT,
        "border-width" => BORDER_WIDTH,
        "border-style" => BORDER_STYLE,
        "border-color" => BORDER_COLOR,
        "border-radius" => BORDER_RADIUS,
        "outline" => OUTLINE,
        "background" => BACKGROUND,
        "flex" => FLEX,
        "flex-flow" => FLEX_FLOW,
        "gap" => GAP,
        "overflow" => OVERFLOW,
        "list-style" => LIST_STYLE,
        "text-decoration" => TEXT_DECORATION,
        "font" => FONT,
        _ => return None,
    })
}

pub fn is_shorthand(name: &str) -> bool {
    longhands(name).is_some()
}

/// Expand `name: values` into longhand declarations.
pub fn expand(name: &str, values: &[ComponentValue]) -> Expansion {
    let Some(targets) = longhands(name) else {
        return Expansion::NotShorthand;
    };
    let words: Vec<&ComponentValue> = values.iter().filter(|v| !v.is_whitespace()).collect();
    if words.is_empty() {
        return Expansion::Invalid;
    }
    let result = match name {
        "margin" | "padding" | "inset" | "border-width" | "border-style" | "border-color" => {
            four_sides(targets, &words)
        }
        "border-radius" => border_radius(&words),
        "border" | "border-top" | "border-right" | "border-bottom" | "border-left" | "outline" => {
            border_like(targets, &words)
        }
        "background" => background(&words),
        "flex" => flex(&words),
        "flex-flow" => flex_flow(&words),
        "gap" | "overflow" => two_axis(targets, &words),
        "list-style" => list_style(&words),
        "text-decoration" => text_decoration(&words),
        "font" => font(values),
        _ => None,
    };
    match result {
        Some(longhands) => Expansion::Longhands(longhands),
        None => Expansion::Invalid,
    }
}

type Longhands = Vec<(&'static str, Vec<ComponentValue>)>;

fn one(value: &ComponentValue) -> Vec<ComponentValue> {
    vec![value.clone()]
}

fn initial(name: &str) -> Vec<ComponentValue> {
    property_default(name)
        .map(|p| parse_component_values(p.initial))
        .unwrap_or_default()
}

fn keyword(value: &ComponentValue) -> Option<String> {
    value.ident().map(|s| s.to_ascii_lowercase())
}

fn is_delim(value: &ComponentValue, c: char) -> bool {
    matches!(value.token(), Some(TokenKind::Delim(d)) if *d == c)
}

/// Lengths, percentages, unitless zero and `calc()`.
fn is_length_percentage(value: &ComponentValue) -> bool {
    match value {
        ComponentValue::Preserved(token) => match &token.kind {
            TokenKind::Dimension { unit, .. } => css::LengthUnit::from_unit(unit).is_some(),
            TokenKind::Percentage(_) => true,
            TokenKind::Number { value, .. } => *value == 0.0,
            _ => false,
        },
        ComponentValue::Function { name, .. } => name.eq_ignore_ascii_case("calc"),
        _ => false,
    }
}

fn number(value: &ComponentValue) -> Option<f64> {
    match value.token() {
        Some(TokenKind::Number { value, .. }) => Some(*value),
        _ => None,
    }
}

fn is_color(value: &ComponentValue) -> bool {
    parse_color(value).is_some() || keyword(value).is_some_and(|k| k == "currentcolor")
}

// ─────────────────────────────────────────────────────────────────────────────
// Box shorthands
// ─────────────────────────────────────────────────────────────────────────────

/// The 1-4 value top/right/bottom/left pattern.
fn four_sides(targets: &[&'static str], words: &[&ComponentValue]) -> Option<Longhands> {
    let [top, right, bottom, left] = match *words {
        [a] => [a, a, a, a],
        [a, b] => [a, b, a, b],
        [a, b, c] => [a, b, c, b],
        [a, b, c, d] => [a, b, c, d],
        _ => return None,
    };
    Some(
        targets
            .iter()
            .zip([top, right, bottom, left])
            .map(|(name, value)| (*name, one(value)))
            .collect(),
    )
}

fn border_radius(words: &[&ComponentValue]) -> Option<Longhands> {
    let split = words.iter().position(|v| is_delim(v, '/'));
    let (horizontal, vertical) = match split {
        Some(i) => (&words[..i], Some(&words[i + 1..])),
        None => (words, None),
    };
    let h = four_sides(BORDER_RADIUS, horizontal)?;
    let Some(vertical) = vertical else {
        return Some(h);
    };
    let v = four_sides(BORDER_RADIUS, vertical)?;
    let space = parse_component_values(" ");
    Some(
        h.into_iter()
            .zip(v)
            .map(|((name, mut hv), (_, vv))| {
                hv.extend(space.iter().cloned());
                hv.extend(vv);
                (name, hv)
            })
            .collect(),
    )
}

fn is_border_style(kw: &str) -> bool {
    matches!(
        kw,
        "none" | "hidden" | "dotted" | "dashed" | "solid" | "double" | "groove" | "ridge" | "inset" | "outset"
    )
}

/// `border`, its sides and `outline`: width, style and color in any order.
fn border_like(targets: &[&'static str], words: &[&ComponentValue]) -> Option<Longhands> {
    let mut width = None;
    let mut style = None;
    let mut color = None;
    for &value in words {
        let kw = keyword(value);
        let slot = if is_length_percentage(value) || kw.as_deref().is_some_and(|k| matches!(k, "thin" | "medium" | "thick")) {
            &mut width
        } else if kw.as_deref().is_some_and(is_border_style) || kw.as_deref() == Some("auto") {
            &mut style
        } else if is_color(value) {
            &mut color
        } else {
            return None;
        };
        if slot.replace(value).is_some() {
            return None;
        }
    }
    Some(
        targets
            .iter()
            .map(|name| {
                let part = if name.ends_with("-width") {
                    width
                } else if name.ends_with("-style") {
                    style
                } else {
                    color
                };
                (*name, part.map(one).unwrap_or_else(|| initial(name)))
            })
            .collect(),
    )
}

// ─────────────────────────────────────────────────────────────────────────────
// Other shorthands
// ─────────────────────────────────────────────────────────────────────────────

/// Only the color and image layers of `background` are kept.
fn background(words: &[&ComponentValue]) -> Option<Longhands> {
    let mut color = None;
    let mut image = None;
    for &value in words {
        match value {
            ComponentValue::Preserved(token) if matches!(token.kind, TokenKind::Url(_)) => image = Some(value),
            ComponentValue::Function { name, .. } if name.to_ascii_lowercase().contains("gradient") || name.eq_ignore_ascii_case("url") => {
                image = Some(value)
            }
            _ if is_color(value) => {
                if color.replace(value).is_some() {
                    return None;
                }
            }
            _ => {}
        }
    }
    Some(vec![
        ("background-color", color.map(one).unwrap_or_else(|| initial("background-color"))),
        ("background-image", image.map(one).unwrap_or_else(|| initial("background-image"))),
    ])
}

fn flex(words: &[&ComponentValue]) -> Option<Longhands> {
    let build = |grow: Vec<ComponentValue>, shrink: Vec<ComponentValue>, basis: Vec<ComponentValue>| {
        Some(vec![("flex-grow", grow), ("flex-shrink", shrink), ("flex-basis", basis)])
    };
    let text = |s: &str| parse_component_values(s);
    if let [only] = words {
        match keyword(only).as_deref() {
            Some("none") => return build(text("0"), text("0"), text("auto")),
            Some("auto") => return build(text("1"), text("1"), text("auto")),
            _ => {}
        }
    }
    let mut numbers = Vec::new();
    let mut basis = None;
    for &value in words {
        if number(value).is_some() && numbers.len() < 2 && basis.is_none() {
            numbers.push(value);
        } else if basis.is_none() && (is_length_percentage(value) || keyword(value).is_some_and(|k| k == "auto" || k == "content")) {
            basis = Some(value);
        } else {
            return None;
        }
    }
    if numbers.is_empty() && basis.is_none() {
        return None;
    }
    let grow = numbers.first().map(|v| one(v)).unwrap_or_else(|| text("1"));
    let shrink = numbers.get(1).map(|v| one(v)).unwrap_or_else(|| text("1"));
    let basis = basis.map(one).unwrap_or_else(|| text("0%"));
    build(grow, shrink, basis)
}

fn flex_flow(words: &[&ComponentValue]) -> Option<Longhands> {
    let mut direction = None;
    let mut wrap = None;
    for &value in words {
        let slot = match keyword(value)?.as_str() {
            "row" | "row-reverse" | "column" | "column-reverse" => &mut direction,
            "nowrap" | "wrap" | "wrap-reverse" => &mut wrap,
            _ => return None,
        };
        if slot.replace(value).is_some() {
            return None;
        }
    }
    Some(vec![
        ("flex-direction", direction.map(one).unwrap_or_else(|| initial("flex-direction"))),
        ("flex-wrap", wrap.map(one).unwrap_or_else(|| initial("flex-wrap"))),
    ])
}

/// One value for both axes or two values in order.
fn two_axis(targets: &[&'static str], words: &[&ComponentValue]) -> Option<Longhands> {
    let (first, second) = match *words {
        [a] => (a, a),
        [a, b] => (a, b),
        _ => return None,
    };
    Some(vec![(targets[0], one(first)), (targets[1], one(second))])
}

fn list_style(words: &[&ComponentValue]) -> Option<Longhands> {
    let mut kind = None;
    let mut position = None;
    let mut image = None;
    let mut nones = 0;
    for &value in words {
        match keyword(value).as_deref() {
            Some("none") => nones += 1,
            Some("inside" | "outside") if position.is_none() => position = Some(value),
            Some(_) if kind.is_none() => kind = Some(value),
            Some(_) => return None,
            None => match value {
                ComponentValue::Preserved(token) if matches!(token.kind, TokenKind::String(_)) && kind.is_none() => {
                    kind = Some(value)
                }
                ComponentValue::Preserved(token) if matches!(token.kind, TokenKind::Url(_)) && image.is_none() => {
                    image = Some(value)
                }
                ComponentValue::Function { .. } if image.is_none() => image = Some(value),
                _ => return None,
            },
        }
    }
    let none = parse_component_values("none");
    // A lone `none` clears both the marker type and the image.
    let (kind, image) = match (nones, kind, image) {
        (0, k, i) => (k.map(one), i.map(one)),
        (1, None, i) => (Some(none.clone()), i.map(one).or(Some(none.clone()))),
        (1, k, None) => (k.map(one), Some(none.clone())),
        (2, None, None) => (Some(none.clone()), Some(none)),
        _ => return None,
    };
    Some(vec![
        ("list-style-type", kind.unwrap_or_else(|| initial("list-style-type"))),
        ("list-style-position", position.map(one).unwrap_or_else(|| initial("list-style-position"))),
        ("list-style-image", image.unwrap_or_else(|| initial("list-style-image"))),
    ])
}

fn text_decoration(words: &[&ComponentValue]) -> Option<Longhands> {
    let mut lines: Vec<ComponentValue> = Vec::new();
    let mut style = None;
    let mut color = None;
    for &value in words {
        match keyword(value).as_deref() {
            Some("none") if lines.is_empty() => lines.push(value.clone()),
            Some("underline" | "overline" | "line-through" | "blink") => {
                if !lines.is_empty() {
                    lines.extend(parse_component_values(" "));
                }
                lines.push(value.clone());
            }
            Some("solid" | "double" | "dotted" | "dashed" | "wavy") if style.is_none() => style = Some(value),
            _ if is_color(value) && color.is_none() => color = Some(value),
            _ => return None,
        }
    }
    let line = if lines.is_empty() { initial("text-decoration-line") } else { lines };
    Some(vec![
        ("text-decoration-line", line),
        ("text-decoration-style", style.map(one).unwrap_or_else(|| initial("text-decoration-style"))),
        ("text-decoration-color", color.map(one).unwrap_or_else(|| initial("text-decoration-color"))),
    ])
}

fn is_font_size_keyword(kw: &str) -> bool {
    matches!(
        kw,
        "xx-small" | "x-small" | "small" | "medium" | "large" | "x-large" | "xx-large" | "xxx-large" | "smaller" | "larger"
    )
}

/// `[style || variant || weight]? size [/ line-height]? family`
fn font(values: &[ComponentValue]) -> Option<Longhands> {
    let mut style = None;
    let mut variant = None;
    let mut weight = None;
    let mut index = 0;
    let size = loop {
        let value = values.get(index)?;
        index += 1;
        if value.is_whitespace() {
            continue;
        }
        if is_length_percentage(value) && number(value).is_none() {
            break value;
        }
        let slot = match keyword(value).as_deref() {
            Some(kw) if is_font_size_keyword(kw) => break value,
            Some("normal") => {
                // `normal` fills the first part still unset.
                if style.is_none() {
                    &mut style
                } else if variant.is_none() {
                    &mut variant
                } else {
                    &mut weight
                }
            }
            Some("italic" | "oblique") => &mut style,
            Some("small-caps") => &mut variant,
            Some("bold" | "bolder" | "lighter") => &mut weight,
            None if number(value).is_some_and(|n| (1.0..=1000.0).contains(&n)) => &mut weight,
            _ => return None,
        };
        if slot.replace(value).is_some() {
            return None;
        }
    };

    let mut rest = &values[index..];
    let mut line_height = None;
    let first = rest.iter().position(|v| !v.is_whitespace())?;
    if is_delim(&rest[first], '/') {
        let after = &rest[first + 1..];
        let lh = after.iter().position(|v| !v.is_whitespace())?;
        line_height = Some(&after[lh]);
        rest = &after[lh + 1..];
    }
    let family: Vec<ComponentValue> = {
        let start = rest.iter().position(|v| !v.is_whitespace())?;
        let end = rest.iter().rposition(|v| !v.is_whitespace())?;
        rest[start..=end].to_vec()
    };

    let part = |value: Option<&ComponentValue>, name: &str| value.map(one).unwrap_or_else(|| initial(name));
    Some(vec![
        ("font-style", part(style, "font-style")),
        ("font-variant", part(variant, "font-variant")),
        ("font-weight", part(weight, "font-weight")),
        ("font-size", one(size)),
        ("line-height", part(line_height, "line-height")),
        ("font-family", family),
    ])
}
