//! Computed values and unit resolution.
//!
//! The cascade hands each winning declaration to [`compute_value`], which
//! turns lengths into pixels, colors into RGBA and keywords into lowercase
//! strings. Anything it does not understand is kept as raw component
//! values so layout can still read it.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::sync::Arc;

use css::parser::values_to_css;
use css::{ComponentValue, CssColor, LengthUnit, TokenKind, parse_color};

/// The CSS-wide keywords.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CssWideKeyword {
    Inherit,
    Initial,
    Unset,
    Revert,
}

impl CssWideKeyword {
    /// A value consisting of exactly one CSS-wide keyword.
    pub fn from_values(values: &[ComponentValue]) -> Option<Self> {
        let mut non_ws = values.iter().filter(|v| !v.is_whitespace());
        let ident = non_ws.next()?.ident()?;
        if non_ws.next().is_some() {
            return None;
        }
        match ident.to_ascii_lowercase().as_str() {
            "inherit" => Some(CssWideKeyword::Inherit),
            "initial" => Some(CssWideKeyword::Initial),
            "unset" => Some(CssWideKeyword::Unset),
            "revert" | "revert-layer" => Some(CssWideKeyword::Revert),
            _ => None,
        }
    }
}

/// One property's computed value.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ComputedValue {
    /// Declared value after `var()` substitution.
    pub raw: Vec<ComponentValue>,
    pub keyword: Option<String>,
    pub length_px: Option<f64>,
    /// Percentages left for layout to resolve.
    pub percentage: Option<f64>,
    pub number: Option<f64>,
    pub color: Option<CssColor>,
    /// Set when a CSS-wide keyword produced this value.
    pub wide_keyword: Option<CssWideKeyword>,
}

impl ComputedValue {
    pub fn keyword(keyword: &str) -> Self {
        Self {
            keyword: Some(keyword.to_string()),
            ..Self::default()
        }
    }

    pub fn length(px: f64) -> Self {
        Self {
            length_px: Some(px),
            ..Self::default()
        }
    }

    pub fn color(color: CssColor) -> Self {
        Self {
            color: Some(color),
            ..Self::default()
        }
    }

    /// Serialized computed value.
    pub fn text(&self) -> String {
        if let Some(px) = self.length_px {
            return format!("{}px", format_number(px));
        }
        if let Some(color) = self.color {
            return color.to_string();
        }
        if let Some(keyword) = &self.keyword {
            return keyword.clone();
        }
        if let Some(p) = self.percentage {
            return format!("{}%", format_number(p));
        }
        if let Some(n) = self.number {
            return format_number(n);
        }
        values_to_css(&self.raw).trim().to_string()
    }
}

/// Trim float noise: at most four decimals, no trailing zeros.
pub fn format_number(value: f64) -> String {
    let rounded = (value * 10_000.0).round() / 10_000.0;
    if rounded == rounded.trunc() {
        format!("{}", rounded as i64)
    } else {
        let mut out = String::new();
        let _ = write!(out, "{rounded}");
        out
    }
}

/// What layout reads for one property.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResolvedValue {
    /// The keyword, or the serialized value when it is not a keyword.
    pub keyword: String,
    /// Resolved length; 0 when the value is not a length.
    pub length_px: f64,
    pub color: Option<CssColor>,
}

/// Per-element property table. The parent link is shared and read-only.
#[derive(Debug, Clone, Default)]
pub struct ComputedStyle {
    values: BTreeMap<String, ComputedValue>,
    parent: Option<Arc<ComputedStyle>>,
}

impl PartialEq for ComputedStyle {
    fn eq(&self, other: &Self) -> bool {
        self.values == other.values
    }
}

impl ComputedStyle {
    pub fn new(parent: Option<Arc<ComputedStyle>>) -> Self {
        Self {
            values: BTreeMap::new(),
            parent,
        }
    }

    pub fn parent(&self) -> Option<&ComputedStyle> {
        self.parent.as_deref()
    }

    pub fn get(&self, name: &str) -> Option<&ComputedValue> {
        self.values.get(name)
    }

    pub(crate) fn set(&mut self, name: &str, value: ComputedValue) {
        self.values.insert(name.to_string(), value);
    }

    pub(crate) fn remove(&mut self, name: &str) {
        self.values.remove(name);
    }

    /// `{keyword, length, color}` for `name`; empty for unknown names.
    pub fn get_property_value(&self, name: &str) -> ResolvedValue {
        let Some(value) = self.values.get(name) else {
            return ResolvedValue::default();
        };
        ResolvedValue {
            keyword: value.keyword.clone().unwrap_or_else(|| value.text()),
            length_px: value.length_px.unwrap_or(0.0),
            color: value.color,
        }
    }

    /// Serialized computed value, or an empty string.
    pub fn css_text(&self, name: &str) -> String {
        self.values.get(name).map(ComputedValue::text).unwrap_or_default()
    }

    pub fn font_size(&self) -> f64 {
        self.values
            .get("font-size")
            .and_then(|v| v.length_px)
            .unwrap_or(16.0)
    }

    pub fn color(&self) -> CssColor {
        self.values.get("color").and_then(|v| v.color).unwrap_or(CssColor::BLACK)
    }

    /// Font size of the style at the top of the parent chain.
    pub fn root_font_size(&self) -> f64 {
        let mut style = self;
        while let Some(parent) = style.parent() {
            style = parent;
        }
        style.font_size()
    }

    pub fn custom_property(&self, name: &str) -> Option<&[ComponentValue]> {
        self.values
            .get(name)
            .filter(|_| name.starts_with("--"))
            .map(|v| v.raw.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ComputedValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Unit resolution
// ─────────────────────────────────────────────────────────────────────────────

/// Inputs for resolving relative units on one element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ComputeContext {
    /// The element's own computed font size.
    pub font_size: f64,
    pub parent_font_size: f64,
    pub root_font_size: f64,
    /// Size of `medium`.
    pub default_font_size: f64,
    pub viewport_width: f64,
    pub viewport_height: f64,
    /// Value `currentcolor` resolves to.
    pub current_color: CssColor,
}

/// Convert a length to px; `em_base` is the font size `em` refers to.
pub fn resolve_length(value: f64, unit: LengthUnit, em_base: f64, ctx: &ComputeContext) -> f64 {
    if let Some(ratio) = unit.absolute_px() {
        return value * ratio;
    }
    match unit {
        LengthUnit::Em => value * em_base,
        LengthUnit::Rem => value * ctx.root_font_size,
        LengthUnit::Ex | LengthUnit::Ch => value * em_base * 0.5,
        LengthUnit::Vw => value * ctx.viewport_width / 100.0,
        LengthUnit::Vh => value * ctx.viewport_height / 100.0,
        LengthUnit::Vmin => value * ctx.viewport_width.min(ctx.viewport_height) / 100.0,
        LengthUnit::Vmax => value * ctx.viewport_width.max(ctx.viewport_height) / 100.0,
        _ => value,
    }
}

fn significant(values: &[ComponentValue]) -> Vec<&ComponentValue> {
    values.iter().filter(|v| !v.is_whitespace()).collect()
}

fn is_calc(name: &str) -> bool {
    name.eq_ignore_ascii_case("calc") || name.eq_ignore_ascii_case("-webkit-calc")
}

/// Compute `font-size` against the parent's size. `None` when invalid.
pub fn compute_font_size(values: &[ComponentValue], ctx: &ComputeContext) -> Option<f64> {
    let [value] = significant(values)[..] else {
        return None;
    };
    let parent = ctx.parent_font_size;
    let scale = ctx.default_font_size / 16.0;
    let px = match value {
        ComponentValue::Preserved(token) => match &token.kind {
            TokenKind::Ident(kw) => match kw.to_ascii_lowercase().as_str() {
                "xx-small" => 9.0 * scale,
                "x-small" => 10.0 * scale,
                "small" => 13.0 * scale,
                "medium" => 16.0 * scale,
                "large" => 18.0 * scale,
                "x-large" => 24.0 * scale,
                "xx-large" => 32.0 * scale,
                "xxx-large" => 48.0 * scale,
                "smaller" => parent / 1.2,
                "larger" => parent * 1.2,
                _ => return None,
            },
            TokenKind::Dimension { value, unit, .. } => resolve_length(*value, LengthUnit::from_unit(unit)?, parent, ctx),
            TokenKind::Percentage(p) => parent * p / 100.0,
            TokenKind::Number { value, .. } if *value == 0.0 => 0.0,
            _ => return None,
        },
        ComponentValue::Function { name, values } if is_calc(name) => {
            match eval_calc(values, parent, Some(parent), ctx)? {
                CalcValue::Length(px) => px,
                CalcValue::Number(_) => return None,
            }
        }
        _ => return None,
    };
    (px >= 0.0).then_some(px)
}

fn system_color(name: &str) -> Option<CssColor> {
    Some(match name {
        "canvastext" | "buttontext" | "fieldtext" => CssColor::BLACK,
        "canvas" | "buttonface" | "field" => CssColor::WHITE,
        "linktext" => CssColor::rgb(0, 0, 238),
        "visitedtext" => CssColor::rgb(85, 26, 139),
        "graytext" => CssColor::rgb(128, 128, 128),
        "highlight" => CssColor::rgb(0, 120, 215),
        "highlighttext" => CssColor::WHITE,
        _ => return None,
    })
}

fn border_width_keyword(name: &str) -> Option<f64> {
    match name {
        "thin" => Some(1.0),
        "medium" => Some(3.0),
        "thick" => Some(5.0),
        _ => None,
    }
}

fn is_border_width(property: &str) -> bool {
    property == "outline-width" || (property.starts_with("border-") && property.ends_with("-width"))
}

/// Compute a single property from its declared (substituted) value.
/// `font-size` should go through [`compute_font_size`] first so that
/// `ctx.font_size` is final.
pub fn compute_value(property: &str, values: &[ComponentValue], ctx: &ComputeContext) -> ComputedValue {
    let mut computed = ComputedValue {
        raw: trimmed(values),
        ..ComputedValue::default()
    };
    let [value] = significant(values)[..] else {
        return computed;
    };

    if let Some(color) = parse_color(value) {
        computed.color = Some(color);
        return computed;
    }

    match value {
        ComponentValue::Preserved(token) => match &token.kind {
            TokenKind::Ident(ident) => {
                let keyword = ident.to_ascii_lowercase();
                if keyword == "currentcolor" {
                    computed.color = Some(ctx.current_color);
                } else if let Some(color) = system_color(&keyword) {
                    computed.color = Some(color);
                } else if let Some(px) = border_width_keyword(&keyword).filter(|_| is_border_width(property)) {
                    computed.length_px = Some(px);
                } else {
                    computed.keyword = Some(keyword);
                }
            }
            TokenKind::Dimension { value, unit, .. } => {
                if let Some(unit) = LengthUnit::from_unit(unit) {
                    computed.length_px = Some(resolve_length(*value, unit, ctx.font_size, ctx));
                }
            }
            TokenKind::Percentage(p) => {
                if property == "line-height" {
                    computed.length_px = Some(ctx.font_size * p / 100.0);
                } else {
                    computed.percentage = Some(*p);
                }
            }
            TokenKind::Number { value, .. } => {
                computed.number = Some(*value);
                if *value == 0.0 && property != "line-height" {
                    computed.length_px = Some(0.0);
                }
            }
            _ => {}
        },
        ComponentValue::Function { name, values } if is_calc(name) => {
            let percent_base = (property == "line-height").then_some(ctx.font_size);
            match eval_calc(values, ctx.font_size, percent_base, ctx) {
                Some(CalcValue::Length(px)) => computed.length_px = Some(px),
                Some(CalcValue::Number(n)) => computed.number = Some(n),
                None => {}
            }
        }
        _ => {}
    }
    computed
}

fn trimmed(values: &[ComponentValue]) -> Vec<ComponentValue> {
    let start = values.iter().take_while(|v| v.is_whitespace()).count();
    let end = values.len() - values[start..].iter().rev().take_while(|v| v.is_whitespace()).count();
    values[start..end].to_vec()
}

// ─────────────────────────────────────────────────────────────────────────────
// calc()
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CalcValue {
    Number(f64),
    Length(f64),
}

/// Evaluate the inside of `calc()`. Percentages need `percent_base`;
/// without it, or on a type mismatch, the result is `None`.
pub fn eval_calc(
    values: &[ComponentValue],
    em_base: f64,
    percent_base: Option<f64>,
    ctx: &ComputeContext,
) -> Option<CalcValue> {
    let items = significant(values);
    let mut parser = CalcParser {
        items: &items,
        pos: 0,
        em_base,
        percent_base,
        ctx,
    };
    let value = parser.sum()?;
    (parser.pos == items.len()).then_some(value)
}

struct CalcParser<'a, 'v> {
    items: &'a [&'v ComponentValue],
    pos: usize,
    em_base: f64,
    percent_base: Option<f64>,
    ctx: &'a ComputeContext,
}

impl CalcParser<'_, '_> {
    fn delim(&self) -> Option<char> {
        match self.items.get(self.pos)?.token()? {
            TokenKind::Delim(c) => Some(*c),
            _ => None,
        }
    }

    fn sum(&mut self) -> Option<CalcValue> {
        let mut acc = self.product()?;
        while let Some(op @ ('+' | '-')) = self.delim() {
            self.pos += 1;
            let rhs = self.product()?;
            acc = match (acc, rhs) {
                (CalcValue::Length(a), CalcValue::Length(b)) => CalcValue::Length(if op == '+' { a + b } else { a - b }),
                (CalcValue::Number(a), CalcValue::Number(b)) => CalcValue::Number(if op == '+' { a + b } else { a - b }),
                _ => return None,
            };
        }
        Some(acc)
    }

    fn product(&mut self) -> Option<CalcValue> {
        let mut acc = self.operand()?;
        while let Some(op @ ('*' | '/')) = self.delim() {
            self.pos += 1;
            let rhs = self.operand()?;
            acc = match (op, acc, rhs) {
                ('*', CalcValue::Length(a), CalcValue::Number(b)) | ('*', CalcValue::Number(b), CalcValue::Length(a)) => {
                    CalcValue::Length(a * b)
                }
                ('*', CalcValue::Number(a), CalcValue::Number(b)) => CalcValue::Number(a * b),
                ('/', _, CalcValue::Number(b)) if b == 0.0 => return None,
                ('/', CalcValue::Length(a), CalcValue::Number(b)) => CalcValue::Length(a / b),
                ('/', CalcValue::Number(a), CalcValue::Number(b)) => CalcValue::Number(a / b),
                _ => return None,
            };
        }
        Some(acc)
    }

    fn operand(&mut self) -> Option<CalcValue> {
        let item = *self.items.get(self.pos)?;
        self.pos += 1;
        match item {
            ComponentValue::Preserved(token) => match &token.kind {
                TokenKind::Number { value, .. } => Some(CalcValue::Number(*value)),
                TokenKind::Dimension { value, unit, .. } => {
                    let unit = LengthUnit::from_unit(unit)?;
                    Some(CalcValue::Length(resolve_length(*value, unit, self.em_base, self.ctx)))
                }
                TokenKind::Percentage(p) => self.percent_base.map(|base| CalcValue::Length(base * p / 100.0)),
                _ => None,
            },
            ComponentValue::Block { values, .. } => eval_calc(values, self.em_base, self.percent_base, self.ctx),
            ComponentValue::Function { name, values } if is_calc(name) => {
                eval_calc(values, self.em_base, self.percent_base, self.ctx)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use css::parse_component_values;

    fn ctx() -> ComputeContext {
        ComputeContext {
            font_size: 20.0,
            parent_font_size: 10.0,
            root_font_size: 16.0,
            default_font_size: 16.0,
            viewport_width: 1000.0,
            viewport_height: 500.0,
            current_color: CssColor::rgb(1, 2, 3),
        }
    }

    fn compute(property: &str, text: &str) -> ComputedValue {
        compute_value(property, &parse_component_values(text), &ctx())
    }

    fn font_size(text: &str) -> Option<f64> {
        compute_font_size(&parse_component_values(text), &ctx())
    }

    #[test]
    fn test_lengths() {
        assert_eq!(compute("width", "2em").length_px, Some(40.0));
        assert_eq!(compute("width", "2rem").length_px, Some(32.0));
        assert_eq!(compute("width", "1in").length_px, Some(96.0));
        assert_eq!(compute("width", "1pc").length_px, Some(16.0));
        assert_eq!(compute("width", "10vw").length_px, Some(100.0));
        assert_eq!(compute("width", "10vmin").length_px, Some(50.0));
        assert_eq!(compute("width", "2ex").length_px, Some(20.0));
        assert_eq!(compute("margin-top", "0").length_px, Some(0.0));
    }

    #[test]
    fn test_font_size_uses_parent() {
        assert_eq!(font_size("2em"), Some(20.0));
        assert_eq!(font_size("150%"), Some(15.0));
        assert_eq!(font_size("large"), Some(18.0));
        assert_eq!(font_size("larger"), Some(12.0));
        assert_eq!(font_size("1rem"), Some(16.0));
        assert_eq!(font_size("calc(1em + 2px)"), Some(12.0));
        assert_eq!(font_size("bogus"), None);
        assert_eq!(font_size("-1px"), None);
    }

    #[test]
    fn test_percentages() {
        let width = compute("width", "50%");
        assert_eq!(width.percentage, Some(50.0));
        assert_eq!(width.length_px, None);
        assert_eq!(compute("line-height", "150%").length_px, Some(30.0));
        assert_eq!(compute("line-height", "1.5").number, Some(1.5));
    }

    #[test]
    fn test_colors() {
        assert_eq!(compute("color", "red").color, Some(CssColor::rgb(255, 0, 0)));
        assert_eq!(compute("border-top-color", "currentcolor").color, Some(CssColor::rgb(1, 2, 3)));
        assert_eq!(compute("color", "CanvasText").color, Some(CssColor::BLACK));
        assert_eq!(compute("background-color", "#0000ff").text(), "rgb(0, 0, 255)");
    }

    #[test]
    fn test_keywords_and_border_widths() {
        assert_eq!(compute("display", "Block").keyword.as_deref(), Some("block"));
        assert_eq!(compute("border-left-width", "thick").length_px, Some(5.0));
        assert_eq!(compute("font-weight", "medium").keyword.as_deref(), Some("medium"));
    }

    #[test]
    fn test_calc() {
        assert_eq!(compute("width", "calc(10px + 2 * 5px)").length_px, Some(20.0));
        assert_eq!(compute("width", "calc((1in - 6px) / 2)").length_px, Some(45.0));
        assert_eq!(compute("width", "calc(1em + 1rem)").length_px, Some(36.0));
        assert_eq!(compute("opacity", "calc(1 / 4)").number, Some(0.25));
        assert_eq!(compute("width", "calc(50% - 10px)").length_px, None);
        assert_eq!(compute("width", "calc(10px + 2)").length_px, None);
        assert_eq!(compute("width", "calc(10px / 0)").length_px, None);
    }

    #[test]
    fn test_opaque_values() {
        let value = compute("grid-template-columns", "1fr  200px");
        assert_eq!(value.keyword, None);
        assert_eq!(value.text(), "1fr 200px");
    }

    #[test]
    fn test_wide_keywords() {
        let parse = |t: &str| CssWideKeyword::from_values(&parse_component_values(t));
        assert_eq!(parse(" inherit "), Some(CssWideKeyword::Inherit));
        assert_eq!(parse("UNSET"), Some(CssWideKeyword::Unset));
        assert_eq!(parse("revert"), Some(CssWideKeyword::Revert));
        assert_eq!(parse("initial red"), None);
    }

    #[test]
    fn test_resolved_value_and_root_font_size() {
        let mut root = ComputedStyle::new(None);
        root.set("font-size", ComputedValue::length(20.0));
        let root = Arc::new(root);
        let mut child = ComputedStyle::new(Some(root));
        child.set("font-size", ComputedValue::length(10.0));
        child.set("display", ComputedValue::keyword("block"));
        assert_eq!(child.root_font_size(), 20.0);
        assert_eq!(child.get_property_value("display").keyword, "block");
        assert_eq!(child.get_property_value("font-size").length_px, 10.0);
        assert_eq!(child.get_property_value("font-size").keyword, "10px");
        assert_eq!(child.get_property_value("nope"), ResolvedValue::default());
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(16.0), "16");
        assert_eq!(format_number(13.333333), "13.3333");
        assert_eq!(format_number(-0.5), "-0.5");
    }
}
