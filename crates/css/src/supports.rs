//! `@supports` conditions.

use crate::parser::{BlockKind, ComponentValue, consume_component_values, values_to_css};
use crate::selector::parse_selector;
use crate::token::{Token, TokenKind};

#[derive(Debug, Clone, PartialEq)]
pub enum SupportsCondition {
    Not(Box<SupportsCondition>),
    And(Vec<SupportsCondition>),
    Or(Vec<SupportsCondition>),
    /// `(property: value)`
    Declaration { property: String, value: String },
    /// `selector(...)`
    Selector(String),
    /// Anything else in parentheses or an unknown function; evaluates false.
    GeneralEnclosed(String),
}

impl SupportsCondition {
    /// Parse an `@supports` prelude. `None` when the grammar is not met.
    pub fn parse(tokens: &[Token]) -> Option<Self> {
        let values: Vec<ComponentValue> = consume_component_values(tokens)
            .into_iter()
            .filter(|v| !v.is_whitespace())
            .collect();
        parse_condition(&values)
    }

    /// Evaluate with `supports_declaration(property, value)` deciding
    /// whether a single declaration is understood.
    pub fn evaluate(&self, supports_declaration: &dyn Fn(&str, &str) -> bool) -> bool {
        match self {
            SupportsCondition::Not(inner) => !inner.evaluate(supports_declaration),
            SupportsCondition::And(all) => all.iter().all(|c| c.evaluate(supports_declaration)),
            SupportsCondition::Or(any) => any.iter().any(|c| c.evaluate(supports_declaration)),
            SupportsCondition::Declaration { property, value } => supports_declaration(property, value),
            SupportsCondition::Selector(text) => parse_selector(text).is_ok(),
            SupportsCondition::GeneralEnclosed(_) => false,
        }
    }
}

fn keyword(value: &ComponentValue) -> Option<String> {
    value.ident().map(|s| s.to_ascii_lowercase())
}

fn parse_condition(values: &[ComponentValue]) -> Option<SupportsCondition> {
    let first = values.first()?;
    if keyword(first).as_deref() == Some("not") {
        if values.len() != 2 {
            return None;
        }
        return Some(SupportsCondition::Not(Box::new(parse_in_parens(&values[1])?)));
    }

    let mut terms = vec![parse_in_parens(first)?];
    let mut joiner: Option<String> = None;
    let mut rest = &values[1..];
    while !rest.is_empty() {
        let word = keyword(&rest[0])?;
        if word != "and" && word != "or" {
            return None;
        }
        // Mixing `and` and `or` without parentheses is invalid.
        if joiner.as_ref().is_some_and(|j| *j != word) {
            return None;
        }
        joiner = Some(word);
        terms.push(parse_in_parens(rest.get(1)?)?);
        rest = &rest[2..];
    }

    Some(match joiner.as_deref() {
        None => terms.remove(0),
        Some("and") => SupportsCondition::And(terms),
        _ => SupportsCondition::Or(terms),
    })
}

fn parse_in_parens(value: &ComponentValue) -> Option<SupportsCondition> {
    match value {
        ComponentValue::Block { kind: BlockKind::Paren, values } => {
            let inner: Vec<ComponentValue> = values.iter().filter(|v| !v.is_whitespace()).cloned().collect();
            if let Some(condition) = parse_condition(&inner) {
                return Some(condition);
            }
            if let Some(decl) = parse_declaration(values) {
                return Some(decl);
            }
            Some(SupportsCondition::GeneralEnclosed(values_to_css(values)))
        }
        ComponentValue::Function { name, values } => {
            if name.eq_ignore_ascii_case("selector") {
                Some(SupportsCondition::Selector(values_to_css(values).trim().to_string()))
            } else {
                Some(SupportsCondition::GeneralEnclosed(value.to_css()))
            }
        }
        _ => None,
    }
}

fn parse_declaration(values: &[ComponentValue]) -> Option<SupportsCondition> {
    let mut iter = values.iter().enumerate().filter(|(_, v)| !v.is_whitespace());
    let (_, name) = iter.next()?;
    let property = name.ident()?;
    let (colon_idx, colon) = iter.next()?;
    if colon.token() != Some(&TokenKind::Colon) {
        return None;
    }
    let value = values_to_css(&values[colon_idx + 1..]).trim().to_string();
    if value.is_empty() {
        return None;
    }
    let property = if property.starts_with("--") {
        property.to_string()
    } else {
        property.to_ascii_lowercase()
    };
    Some(SupportsCondition::Declaration { property, value })
}
