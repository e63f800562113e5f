//! Media queries for `@media` and `@import`.

use tracing::trace;

use crate::error::{SyntaxError, SyntaxErrorKind, SyntaxResult};
use crate::parser::{BlockKind, ComponentValue, consume_component_values, split_on_commas, trim_whitespace};
use crate::token::{Token, TokenKind, tokenize, tokens_to_css};
use crate::value::LengthUnit;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaType {
    All,
    Screen,
    Print,
    /// Any other media type name; never matches.
    Other(String),
}

impl MediaType {
    fn from_ident(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "all" => MediaType::All,
            "screen" => MediaType::Screen,
            "print" => MediaType::Print,
            other => MediaType::Other(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorScheme {
    #[default]
    Light,
    Dark,
}

/// The output device a media query is evaluated against.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaEnvironment {
    pub media_type: MediaType,
    pub width: f64,
    pub height: f64,
    pub color_scheme: ColorScheme,
    /// Initial font size, used for `em`/`rem` in feature values.
    pub font_size: f64,
}

impl Default for MediaEnvironment {
    fn default() -> Self {
        Self {
            media_type: MediaType::Screen,
            width: 1280.0,
            height: 800.0,
            color_scheme: ColorScheme::Light,
            font_size: 16.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Equal,
    /// `min-` prefix or `>=`.
    AtLeast,
    /// `max-` prefix or `<=`.
    AtMost,
    Greater,
    Less,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MediaValue {
    Length(f64, LengthUnit),
    Number(f64),
    Ratio(f64, f64),
    Ident(String),
}

/// One `(feature: value)` or `(feature)` test.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaFeature {
    /// Lowercased name with any `min-`/`max-` prefix removed.
    pub name: String,
    pub comparison: Comparison,
    /// `None` for boolean tests such as `(color)`.
    pub value: Option<MediaValue>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaQualifier {
    Not,
    Only,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MediaQuery {
    pub qualifier: Option<MediaQualifier>,
    /// `None` means the implicit `all`.
    pub media_type: Option<MediaType>,
    /// Conjunction of feature tests.
    pub features: Vec<MediaFeature>,
}

/// A comma-separated list of media queries. Matches when any query does;
/// an empty list matches everything.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MediaQueryList {
    pub queries: Vec<MediaQuery>,
    text: String,
}

impl MediaQueryList {
    /// Parse strictly: any malformed query is an error.
    pub fn parse(input: &str) -> SyntaxResult<Self> {
        let tokens = tokenize(input);
        let mut queries = Vec::new();
        for part in split_on_commas(&tokens) {
            let part = trim_whitespace(part);
            if part.is_empty() && queries.is_empty() && trim_whitespace(&tokens).is_empty() {
                break;
            }
            let query = parse_query(part)
                .ok_or_else(|| SyntaxError::at(SyntaxErrorKind::InvalidMediaQuery, part.first()))?;
            queries.push(query);
        }
        Ok(Self {
            queries,
            text: tokens_to_css(trim_whitespace(&tokens)),
        })
    }

    /// Parse leniently: a malformed query becomes `not all`.
    pub fn from_tokens(tokens: &[Token]) -> Self {
        let trimmed = trim_whitespace(tokens);
        let mut queries = Vec::new();
        if !trimmed.is_empty() {
            for part in split_on_commas(trimmed) {
                let part = trim_whitespace(part);
                match parse_query(part) {
                    Some(query) => queries.push(query),
                    None => {
                        trace!(query = %tokens_to_css(part), "invalid media query treated as `not all`");
                        queries.push(MediaQuery {
                            qualifier: Some(MediaQualifier::Not),
                            media_type: Some(MediaType::All),
                            features: Vec::new(),
                        });
                    }
                }
            }
        }
        Self {
            queries,
            text: tokens_to_css(trimmed),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.queries.is_empty()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn evaluate(&self, env: &MediaEnvironment) -> bool {
        self.queries.is_empty() || self.queries.iter().any(|q| q.evaluate(env))
    }
}

impl MediaQuery {
    pub fn evaluate(&self, env: &MediaEnvironment) -> bool {
        let type_matches = match &self.media_type {
            None | Some(MediaType::All) => true,
            Some(MediaType::Other(_)) => false,
            Some(t) => *t == env.media_type,
        };
        let matched = type_matches && self.features.iter().all(|f| f.evaluate(env));
        match self.qualifier {
            Some(MediaQualifier::Not) => !matched,
            _ => matched,
        }
    }
}

impl MediaFeature {
    pub fn evaluate(&self, env: &MediaEnvironment) -> bool {
        match self.name.as_str() {
            "width" => self.compare_length(env.width, env),
            "height" => self.compare_length(env.height, env),
            "aspect-ratio" => match &self.value {
                None => true,
                Some(MediaValue::Ratio(w, h)) if *h != 0.0 => {
                    compare(self.comparison, env.width / env.height.max(1.0), w / h)
                }
                Some(MediaValue::Number(n)) => compare(self.comparison, env.width / env.height.max(1.0), *n),
                _ => false,
            },
            "orientation" => {
                let actual = if env.height >= env.width { "portrait" } else { "landscape" };
                match &self.value {
                    None => true,
                    Some(MediaValue::Ident(v)) => v == actual,
                    _ => false,
                }
            }
            "prefers-color-scheme" => match &self.value {
                None => true,
                Some(MediaValue::Ident(v)) => match v.as_str() {
                    "dark" => env.color_scheme == ColorScheme::Dark,
                    "light" => env.color_scheme == ColorScheme::Light,
                    _ => false,
                },
                _ => false,
            },
            "color" => match &self.value {
                None => true,
                Some(MediaValue::Number(bits)) => compare(self.comparison, 8.0, *bits),
                _ => false,
            },
            "hover" | "any-hover" => match &self.value {
                None => env.media_type == MediaType::Screen,
                Some(MediaValue::Ident(v)) => (v == "hover") == (env.media_type == MediaType::Screen),
                _ => false,
            },
            _ => false,
        }
    }

    fn compare_length(&self, actual: f64, env: &MediaEnvironment) -> bool {
        match &self.value {
            None => actual > 0.0,
            Some(MediaValue::Length(v, unit)) => {
                let px = match unit.absolute_px() {
                    Some(ratio) => v * ratio,
                    None => match unit {
                        LengthUnit::Em | LengthUnit::Rem => v * env.font_size,
                        LengthUnit::Ex | LengthUnit::Ch => v * env.font_size * 0.5,
                        LengthUnit::Vw => v * env.width / 100.0,
                        LengthUnit::Vh => v * env.height / 100.0,
                        LengthUnit::Vmin => v * env.width.min(env.height) / 100.0,
                        LengthUnit::Vmax => v * env.width.max(env.height) / 100.0,
                        _ => *v,
                    },
                };
                compare(self.comparison, actual, px)
            }
            Some(MediaValue::Number(n)) if *n == 0.0 => compare(self.comparison, actual, 0.0),
            _ => false,
        }
    }
}

fn compare(comparison: Comparison, actual: f64, expected: f64) -> bool {
    match comparison {
        Comparison::Equal => (actual - expected).abs() < f64::EPSILON,
        Comparison::AtLeast => actual >= expected,
        Comparison::AtMost => actual <= expected,
        Comparison::Greater => actual > expected,
        Comparison::Less => actual < expected,
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Parsing
// ─────────────────────────────────────────────────────────────────────────────

fn parse_query(tokens: &[Token]) -> Option<MediaQuery> {
    let values: Vec<ComponentValue> = consume_component_values(tokens)
        .into_iter()
        .filter(|v| !v.is_whitespace())
        .collect();
    let mut pos = 0;
    let mut query = MediaQuery {
        qualifier: None,
        media_type: None,
        features: Vec::new(),
    };

    if let Some(word) = values.first().and_then(ComponentValue::ident) {
        match word.to_ascii_lowercase().as_str() {
            "not" => {
                query.qualifier = Some(MediaQualifier::Not);
                pos += 1;
            }
            "only" => {
                query.qualifier = Some(MediaQualifier::Only);
                pos += 1;
            }
            _ => {}
        }
    }

    let mut expect_feature = true;
    if let Some(name) = values.get(pos).and_then(ComponentValue::ident) {
        let lower = name.to_ascii_lowercase();
        if matches!(lower.as_str(), "and" | "or" | "not" | "only") {
            return None;
        }
        query.media_type = Some(MediaType::from_ident(&lower));
        pos += 1;
        expect_feature = false;
    } else if query.qualifier == Some(MediaQualifier::Only) {
        // `only` requires a media type.
        return None;
    }

    while pos < values.len() {
        if !expect_feature {
            let is_and = values[pos]
                .ident()
                .is_some_and(|w| w.eq_ignore_ascii_case("and"));
            if !is_and {
                return None;
            }
            pos += 1;
        }
        let Some(ComponentValue::Block { kind: BlockKind::Paren, values: inner }) = values.get(pos) else {
            return None;
        };
        query.features.push(parse_feature(inner)?);
        pos += 1;
        expect_feature = false;
    }

    if expect_feature && query.media_type.is_none() {
        // Nothing but a qualifier.
        return None;
    }
    Some(query)
}

fn parse_feature(inner: &[ComponentValue]) -> Option<MediaFeature> {
    let inner: Vec<&ComponentValue> = inner.iter().filter(|v| !v.is_whitespace()).collect();
    let raw_name = inner.first()?.ident()?.to_ascii_lowercase();

    if inner.len() == 1 {
        return Some(MediaFeature {
            name: raw_name,
            comparison: Comparison::Equal,
            value: None,
        });
    }

    // `(name: value)`
    if inner[1].token() == Some(&TokenKind::Colon) {
        let (name, comparison) = if let Some(n) = raw_name.strip_prefix("min-") {
            (n.to_string(), Comparison::AtLeast)
        } else if let Some(n) = raw_name.strip_prefix("max-") {
            (n.to_string(), Comparison::AtMost)
        } else {
            (raw_name, Comparison::Equal)
        };
        let value = parse_media_value(&inner[2..])?;
        return Some(MediaFeature {
            name,
            comparison,
            value: Some(value),
        });
    }

    // `(name >= value)` range form.
    let delim = |v: &ComponentValue| match v.token() {
        Some(TokenKind::Delim(c)) => Some(*c),
        _ => None,
    };
    let op = delim(inner[1])?;
    let or_equal = inner.get(2).and_then(|v| delim(v)) == Some('=');
    let comparison = match (op, or_equal) {
        ('>', true) => Comparison::AtLeast,
        ('<', true) => Comparison::AtMost,
        ('>', false) => Comparison::Greater,
        ('<', false) => Comparison::Less,
        ('=', false) => Comparison::Equal,
        _ => return None,
    };
    let start = if or_equal { 3 } else { 2 };
    let value = parse_media_value(inner.get(start..)?)?;
    Some(MediaFeature {
        name: raw_name,
        comparison,
        value: Some(value),
    })
}

fn parse_media_value(values: &[&ComponentValue]) -> Option<MediaValue> {
    match values {
        [single] => match single.token()? {
            TokenKind::Dimension { value, unit, .. } => {
                LengthUnit::from_unit(unit).map(|u| MediaValue::Length(*value, u))
            }
            TokenKind::Number { value, .. } => Some(MediaValue::Number(*value)),
            TokenKind::Ident(s) => Some(MediaValue::Ident(s.to_ascii_lowercase())),
            _ => None,
        },
        [w, slash, h] if slash.token() == Some(&TokenKind::Delim('/')) => {
            match (w.token()?, h.token()?) {
                (TokenKind::Number { value: w, .. }, TokenKind::Number { value: h, .. }) => {
                    Some(MediaValue::Ratio(*w, *h))
                }
                _ => None,
            }
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(width: f64, height: f64) -> MediaEnvironment {
        MediaEnvironment {
            width,
            height,
            ..MediaEnvironment::default()
        }
    }

    fn matches(query: &str, env: &MediaEnvironment) -> bool {
        match MediaQueryList::parse(query) {
            Ok(list) => list.evaluate(env),
            Err(err) => panic!("{query:?}: {err}"),
        }
    }

    #[test]
    fn test_media_types() {
        let screen = env(1000.0, 800.0);
        assert!(matches("screen", &screen));
        assert!(matches("all", &screen));
        assert!(!matches("print", &screen));
        assert!(matches("not print", &screen));
        assert!(matches("only screen", &screen));
        assert!(matches("print, screen", &screen));
        assert!(!matches("tv", &screen));
        assert!(matches("", &screen));
    }

    #[test]
    fn test_width_features() {
        let e = env(1000.0, 800.0);
        assert!(matches("(min-width: 600px)", &e));
        assert!(!matches("(max-width: 600px)", &e));
        assert!(matches("screen and (min-width: 600px) and (max-width: 1200px)", &e));
        assert!(matches("(width >= 1000px)", &e));
        assert!(!matches("(width < 1000px)", &e));
        assert!(matches("(min-width: 40em)", &e));
        assert!(matches("(max-height: 10in)", &e));
    }

    #[test]
    fn test_orientation_and_scheme() {
        let landscape = env(1000.0, 800.0);
        assert!(matches("(orientation: landscape)", &landscape));
        assert!(!matches("(orientation: portrait)", &landscape));
        assert!(matches("(prefers-color-scheme: light)", &landscape));
        let dark = MediaEnvironment {
            color_scheme: ColorScheme::Dark,
            ..landscape
        };
        assert!(matches("(prefers-color-scheme: dark)", &dark));
    }

    #[test]
    fn test_invalid_queries() {
        assert!(MediaQueryList::parse("screen and").is_err());
        assert!(MediaQueryList::parse("(min-width 600px)").is_err());
        assert!(MediaQueryList::parse("only").is_err());

        // Lenient parsing turns the bad query into `not all`.
        let tokens = tokenize("screen and, print");
        let list = MediaQueryList::from_tokens(&tokens);
        assert_eq!(list.queries.len(), 2);
        assert!(!list.evaluate(&env(100.0, 100.0)));
        assert_eq!(list.text(), "screen and, print");
    }
}
