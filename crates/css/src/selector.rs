//! Selectors Level 4 AST, parser and specificity.
//!
//! A [`ComplexSelector`] stores its compounds left to right, each carrying
//! the combinator that *follows* it. Matching lives in the `style` crate.

use std::collections::HashMap;
use std::fmt;

use crate::error::{SyntaxError, SyntaxErrorKind, SyntaxResult};
use crate::nth::{Nth, parse_nth_tokens};
use crate::parser::{block_interior, split_on_commas, trim_whitespace};
use crate::token::{Token, TokenKind, tokenize, tokens_to_css};

/// Combinator between two compound selectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    /// Whitespace: ancestor descendant
    Descendant,
    /// `>`: parent > child
    Child,
    /// `+`: prev + next
    NextSibling,
    /// `~`: prev ~ subsequent
    SubsequentSibling,
    /// `||`: column || cell
    Column,
}

impl Combinator {
    fn as_str(self) -> &'static str {
        match self {
            Combinator::Descendant => " ",
            Combinator::Child => " > ",
            Combinator::NextSibling => " + ",
            Combinator::SubsequentSibling => " ~ ",
            Combinator::Column => " || ",
        }
    }
}

/// Namespace requirement of a type or attribute selector, resolved against
/// the stylesheet's `@namespace` declarations at parse time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NamespaceConstraint {
    /// `*|name`, or an unprefixed type selector without a default namespace.
    Any,
    /// `|name`, or an unprefixed attribute.
    NoNamespace,
    Uri(String),
}

/// Prefix to namespace URI map built from `@namespace` rules.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NamespaceMap {
    pub default: Option<String>,
    prefixes: HashMap<String, String>,
}

impl NamespaceMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, prefix: Option<&str>, uri: &str) {
        match prefix {
            Some(p) => {
                self.prefixes.insert(p.to_string(), uri.to_string());
            }
            None => self.default = Some(uri.to_string()),
        }
    }

    pub fn lookup(&self, prefix: &str) -> Option<&str> {
        self.prefixes.get(prefix).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.default.is_none() && self.prefixes.is_empty()
    }
}

/// Type selector; `name == "*"` is the universal selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeSelector {
    /// Name as written; non-HTML elements compare against this exactly.
    pub name: String,
    /// ASCII-lowercased name used for HTML elements.
    pub lower_name: String,
    pub namespace: NamespaceConstraint,
}

impl TypeSelector {
    pub fn new(name: impl Into<String>, namespace: NamespaceConstraint) -> Self {
        let name = name.into();
        let lower_name = name.to_ascii_lowercase();
        Self {
            name,
            lower_name,
            namespace,
        }
    }

    pub fn is_universal(&self) -> bool {
        self.name == "*"
    }
}

/// Attribute selector operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttrOperator {
    /// `[attr]`
    Exists,
    /// `[attr=val]`
    Equals,
    /// `[attr~=val]`
    Includes,
    /// `[attr|=val]`
    DashMatch,
    /// `[attr^=val]`
    Prefix,
    /// `[attr$=val]`
    Suffix,
    /// `[attr*=val]`
    Substring,
}

impl AttrOperator {
    fn as_str(self) -> &'static str {
        match self {
            AttrOperator::Exists => "",
            AttrOperator::Equals => "=",
            AttrOperator::Includes => "~=",
            AttrOperator::DashMatch => "|=",
            AttrOperator::Prefix => "^=",
            AttrOperator::Suffix => "$=",
            AttrOperator::Substring => "*=",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeMatcher {
    pub namespace: NamespaceConstraint,
    pub name: String,
    pub operator: AttrOperator,
    pub value: String,
    /// Set by a trailing `i` flag; governs value comparison only.
    pub case_insensitive: bool,
}

/// A pseudo-class, e.g. `:hover`, `:nth-child(2n of .a)`, `:not(p)`.
#[derive(Debug, Clone, PartialEq)]
pub struct PseudoClassSelector {
    /// Lowercased name without the colon.
    pub name: String,
    /// Raw argument text of a functional pseudo-class.
    pub argument: Option<String>,
    /// Nested selector for `:not`, `:is`, `:where`, `:has` and `of S`.
    pub selector: Option<SelectorList>,
    /// Parsed `An+B` for the `:nth-*` family.
    pub nth: Option<Nth>,
}

impl PseudoClassSelector {
    fn simple(name: &str) -> Self {
        Self {
            name: name.to_string(),
            argument: None,
            selector: None,
            nth: None,
        }
    }
}

/// A maximal run of simple selectors with no combinator in between.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CompoundSelector {
    pub type_selector: Option<TypeSelector>,
    pub ids: Vec<String>,
    pub classes: Vec<String>,
    pub attributes: Vec<AttributeMatcher>,
    pub pseudo_classes: Vec<PseudoClassSelector>,
    /// Lowercased pseudo-element name, e.g. `before`.
    pub pseudo_element: Option<String>,
    /// Combinator that follows this compound; `None` on the last one.
    pub combinator: Option<Combinator>,
}

impl CompoundSelector {
    pub fn is_empty(&self) -> bool {
        self.type_selector.is_none()
            && self.ids.is_empty()
            && self.classes.is_empty()
            && self.attributes.is_empty()
            && self.pseudo_classes.is_empty()
            && self.pseudo_element.is_none()
    }

    pub fn specificity(&self) -> Specificity {
        let mut spec = Specificity::zero();
        spec.a += self.ids.len() as u32;
        spec.b += (self.classes.len() + self.attributes.len()) as u32;
        if self.type_selector.as_ref().is_some_and(|t| !t.is_universal()) {
            spec.c += 1;
        }
        if self.pseudo_element.is_some() {
            spec.c += 1;
        }
        for pc in &self.pseudo_classes {
            spec = spec.add(pseudo_class_specificity(pc));
        }
        spec
    }
}

fn pseudo_class_specificity(pc: &PseudoClassSelector) -> Specificity {
    match pc.name.as_str() {
        "where" => Specificity::zero(),
        // Flat pseudo-class weight regardless of the argument.
        "not" => Specificity::new(0, 1, 0),
        "is" | "has" | "matches" | "-webkit-any" => pc
            .selector
            .as_ref()
            .map(SelectorList::specificity)
            .unwrap_or_default(),
        _ => {
            let of = pc
                .selector
                .as_ref()
                .map(SelectorList::specificity)
                .unwrap_or_default();
            Specificity::new(0, 1, 0).add(of)
        }
    }
}

/// One comma-separated alternative of a selector list.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ComplexSelector {
    pub compounds: Vec<CompoundSelector>,
    /// Leading combinator of a relative selector (inside `:has()`).
    pub leading_combinator: Option<Combinator>,
}

impl ComplexSelector {
    /// Sum of the compounds' specificities.
    pub fn specificity(&self) -> Specificity {
        self.compounds
            .iter()
            .fold(Specificity::zero(), |acc, c| acc.add(c.specificity()))
    }

    /// The rightmost compound.
    pub fn subject(&self) -> Option<&CompoundSelector> {
        self.compounds.last()
    }

    pub fn pseudo_element(&self) -> Option<&str> {
        self.subject().and_then(|c| c.pseudo_element.as_deref())
    }
}

/// A comma-separated selector list; matches if any alternative matches.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SelectorList {
    pub selectors: Vec<ComplexSelector>,
}

impl SelectorList {
    /// Maximum specificity over all alternatives.
    pub fn specificity(&self) -> Specificity {
        self.selectors
            .iter()
            .map(ComplexSelector::specificity)
            .max()
            .unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.selectors.is_empty()
    }

    /// Whether any alternative, at any depth, uses `:has()`.
    pub fn uses_has(&self) -> bool {
        self.selectors.iter().any(|complex| {
            complex.compounds.iter().any(|compound| {
                compound.pseudo_classes.iter().any(|pc| {
                    pc.name == "has" || pc.selector.as_ref().is_some_and(SelectorList::uses_has)
                })
            })
        })
    }
}

/// CSS specificity as a triple `(a, b, c)`:
///   - `a`: count of ID selectors
///   - `b`: count of class selectors, attribute selectors, and pseudo-classes
///   - `c`: count of type selectors and pseudo-elements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Specificity {
    pub a: u32,
    pub b: u32,
    pub c: u32,
}

impl Specificity {
    pub const fn new(a: u32, b: u32, c: u32) -> Self {
        Self { a, b, c }
    }

    pub const fn zero() -> Self {
        Self { a: 0, b: 0, c: 0 }
    }

    /// Add two specificities component-wise.
    pub fn add(self, other: Specificity) -> Specificity {
        Specificity {
            a: self.a + other.a,
            b: self.b + other.b,
            c: self.c + other.c,
        }
    }
}

impl PartialOrd for Specificity {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Specificity {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.a
            .cmp(&other.a)
            .then(self.b.cmp(&other.b))
            .then(self.c.cmp(&other.c))
    }
}

impl fmt::Display for Specificity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{},{})", self.a, self.b, self.c)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Serialization
// ─────────────────────────────────────────────────────────────────────────────

impl fmt::Display for SelectorList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, complex) in self.selectors.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{complex}")?;
        }
        Ok(())
    }
}

impl fmt::Display for ComplexSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(lead) = self.leading_combinator {
            f.write_str(lead.as_str().trim_start())?;
        }
        for compound in &self.compounds {
            write!(f, "{compound}")?;
            if let Some(comb) = compound.combinator {
                f.write_str(comb.as_str())?;
            }
        }
        Ok(())
    }
}

impl fmt::Display for CompoundSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ty) = &self.type_selector {
            match &ty.namespace {
                NamespaceConstraint::NoNamespace => f.write_str("|")?,
                NamespaceConstraint::Uri(uri) => write!(f, "{{{uri}}}|")?,
                NamespaceConstraint::Any => {}
            }
            f.write_str(&ty.name)?;
        }
        for id in &self.ids {
            write!(f, "#{id}")?;
        }
        for class in &self.classes {
            write!(f, ".{class}")?;
        }
        for attr in &self.attributes {
            f.write_str("[")?;
            f.write_str(&attr.name)?;
            if attr.operator != AttrOperator::Exists {
                let mut quoted = String::new();
                crate::token::serialize_string(&attr.value, &mut quoted);
                write!(f, "{}{quoted}", attr.operator.as_str())?;
                if attr.case_insensitive {
                    f.write_str(" i")?;
                }
            }
            f.write_str("]")?;
        }
        for pc in &self.pseudo_classes {
            write!(f, ":{}", pc.name)?;
            if let Some(arg) = &pc.argument {
                write!(f, "({arg})")?;
            }
        }
        if let Some(pe) = &self.pseudo_element {
            write!(f, "::{pe}")?;
        }
        if self.is_empty() {
            f.write_str("*")?;
        }
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Parsing
// ─────────────────────────────────────────────────────────────────────────────

/// Pseudo-elements that may be written with a single colon.
const LEGACY_PSEUDO_ELEMENTS: &[&str] = &["before", "after", "first-line", "first-letter"];

/// Parse a selector list such as `div > p, .note`.
pub fn parse_selector(input: &str) -> SyntaxResult<SelectorList> {
    let tokens = tokenize(input);
    parse_selector_tokens(&tokens, &NamespaceMap::default())
}

/// Parse a relative selector list such as `> img, + p` (the `:has()` form).
pub fn parse_relative_selector(input: &str) -> SyntaxResult<SelectorList> {
    let tokens = tokenize(input);
    SelectorParser::new(&NamespaceMap::default()).parse_list(&tokens, true)
}

/// Parse a selector list from tokens, resolving namespace prefixes.
pub fn parse_selector_tokens(tokens: &[Token], namespaces: &NamespaceMap) -> SyntaxResult<SelectorList> {
    SelectorParser::new(namespaces).parse_list(tokens, false)
}

struct SelectorParser<'n> {
    namespaces: &'n NamespaceMap,
}

impl<'n> SelectorParser<'n> {
    fn new(namespaces: &'n NamespaceMap) -> Self {
        Self { namespaces }
    }

    fn parse_list(&self, tokens: &[Token], relative: bool) -> SyntaxResult<SelectorList> {
        let mut selectors = Vec::new();
        for part in split_on_commas(tokens) {
            selectors.push(self.parse_complex(part, relative)?);
        }
        Ok(SelectorList { selectors })
    }

    /// Invalid alternatives are dropped instead of failing the list.
    fn parse_forgiving_list(&self, tokens: &[Token]) -> SelectorList {
        let selectors = split_on_commas(tokens)
            .into_iter()
            .filter(|part| !trim_whitespace(part).is_empty())
            .filter_map(|part| self.parse_complex(part, false).ok())
            .collect();
        SelectorList { selectors }
    }

    fn parse_complex(&self, tokens: &[Token], relative: bool) -> SyntaxResult<ComplexSelector> {
        let tokens = trim_whitespace(tokens);
        if tokens.is_empty() {
            return Err(SyntaxError::at(SyntaxErrorKind::EmptySelector, None));
        }

        let mut pos = 0;
        let mut complex = ComplexSelector::default();
        if relative {
            if let Some((comb, next)) = explicit_combinator(tokens, pos) {
                complex.leading_combinator = Some(comb);
                pos = skip_ws(tokens, next);
            } else {
                complex.leading_combinator = Some(Combinator::Descendant);
            }
        }

        loop {
            let (mut compound, next) = self.parse_compound(tokens, pos)?;
            if compound.is_empty() {
                let kind = if complex.compounds.is_empty() && complex.leading_combinator.is_none() {
                    match tokens.get(next) {
                        Some(t) => SyntaxErrorKind::UnexpectedToken(t.to_css()),
                        None => SyntaxErrorKind::EmptySelector,
                    }
                } else {
                    SyntaxErrorKind::DanglingCombinator
                };
                return Err(SyntaxError::at(kind, tokens.get(next).or(tokens.last())));
            }
            pos = next;

            let after_ws = skip_ws(tokens, pos);
            if after_ws >= tokens.len() {
                complex.compounds.push(compound);
                return Ok(complex);
            }

            let comb = if let Some((comb, next)) = explicit_combinator(tokens, after_ws) {
                pos = skip_ws(tokens, next);
                comb
            } else if after_ws > pos {
                pos = after_ws;
                Combinator::Descendant
            } else {
                let kind = if compound.pseudo_element.is_some() {
                    SyntaxErrorKind::AfterPseudoElement
                } else {
                    SyntaxErrorKind::UnexpectedToken(tokens[pos].to_css())
                };
                return Err(SyntaxError::at(kind, tokens.get(pos)));
            };

            compound.combinator = Some(comb);
            complex.compounds.push(compound);
        }
    }

    fn parse_compound(&self, tokens: &[Token], start: usize) -> SyntaxResult<(CompoundSelector, usize)> {
        let mut compound = CompoundSelector::default();
        let mut pos = start;

        if let Some((type_selector, next)) = self.parse_type_selector(tokens, pos)? {
            compound.type_selector = Some(type_selector);
            pos = next;
        }

        while pos < tokens.len() {
            if compound.pseudo_element.is_some() {
                // Nothing may follow a pseudo-element inside one compound.
                break;
            }
            match &tokens[pos].kind {
                TokenKind::Hash { value, is_id } => {
                    if !is_id {
                        return Err(SyntaxError::at(
                            SyntaxErrorKind::UnexpectedToken(tokens[pos].to_css()),
                            tokens.get(pos),
                        ));
                    }
                    compound.ids.push(value.clone());
                    pos += 1;
                }
                TokenKind::Delim('.') => match tokens.get(pos + 1).map(|t| &t.kind) {
                    Some(TokenKind::Ident(class)) => {
                        compound.classes.push(class.clone());
                        pos += 2;
                    }
                    _ => {
                        return Err(SyntaxError::at(
                            SyntaxErrorKind::UnexpectedToken(".".into()),
                            tokens.get(pos),
                        ));
                    }
                },
                TokenKind::LBracket => {
                    let (inner, next) = block_interior(tokens, pos);
                    let attr = self.parse_attribute(inner).map_err(|mut err| {
                        if err.line == 1 && err.column == 1 {
                            err.line = tokens[pos].line;
                            err.column = tokens[pos].column;
                        }
                        err
                    })?;
                    compound.attributes.push(attr);
                    pos = next;
                }
                TokenKind::Colon => {
                    pos = self.parse_pseudo(tokens, pos, &mut compound)?;
                }
                _ => break,
            }
        }

        Ok((compound, pos))
    }

    /// `name`, `*`, `ns|name`, `*|name`, `|name`.
    fn parse_type_selector(&self, tokens: &[Token], pos: usize) -> SyntaxResult<Option<(TypeSelector, usize)>> {
        let kind_at = |i: usize| tokens.get(i).map(|t| &t.kind);
        let name_at = |i: usize| match kind_at(i) {
            Some(TokenKind::Ident(n)) => Some(n.clone()),
            Some(TokenKind::Delim('*')) => Some("*".to_string()),
            _ => None,
        };
        let bar_then_name = |i: usize| kind_at(i) == Some(&TokenKind::Delim('|')) && name_at(i + 1).is_some();

        // `|name`
        if kind_at(pos) == Some(&TokenKind::Delim('|')) {
            if let Some(name) = name_at(pos + 1) {
                let ty = TypeSelector::new(name, NamespaceConstraint::NoNamespace);
                return Ok(Some((ty, pos + 2)));
            }
            return Ok(None);
        }

        let Some(first) = name_at(pos) else {
            return Ok(None);
        };

        if bar_then_name(pos + 1) {
            let name = name_at(pos + 2).unwrap_or_default();
            let namespace = if first == "*" {
                NamespaceConstraint::Any
            } else {
                let uri = self.namespaces.lookup(&first).ok_or_else(|| {
                    SyntaxError::at(
                        SyntaxErrorKind::UnknownNamespacePrefix(first.clone()),
                        tokens.get(pos),
                    )
                })?;
                NamespaceConstraint::Uri(uri.to_string())
            };
            let ty = TypeSelector::new(name, namespace);
            return Ok(Some((ty, pos + 3)));
        }

        let namespace = match &self.namespaces.default {
            Some(uri) => NamespaceConstraint::Uri(uri.clone()),
            None => NamespaceConstraint::Any,
        };
        let ty = TypeSelector::new(first, namespace);
        Ok(Some((ty, pos + 1)))
    }

    fn parse_attribute(&self, inner: &[Token]) -> SyntaxResult<AttributeMatcher> {
        let invalid = |at: Option<&Token>| SyntaxError::at(SyntaxErrorKind::InvalidAttributeSelector, at);
        let inner = trim_whitespace(inner);
        let kind_at = |i: usize| inner.get(i).map(|t| &t.kind);
        let mut pos = 0;

        // Optional namespace prefix.
        let mut namespace = NamespaceConstraint::NoNamespace;
        let prefixed = |i: usize| {
            kind_at(i) == Some(&TokenKind::Delim('|')) && matches!(kind_at(i + 1), Some(TokenKind::Ident(_)))
        };
        match kind_at(pos) {
            Some(TokenKind::Delim('*')) if prefixed(pos + 1) => {
                namespace = NamespaceConstraint::Any;
                pos += 2;
            }
            Some(TokenKind::Delim('|')) if prefixed(pos) => {
                pos += 1;
            }
            Some(TokenKind::Ident(prefix)) if prefixed(pos + 1) => {
                let uri = self.namespaces.lookup(prefix).ok_or_else(|| {
                    SyntaxError::at(
                        SyntaxErrorKind::UnknownNamespacePrefix(prefix.clone()),
                        inner.get(pos),
                    )
                })?;
                namespace = NamespaceConstraint::Uri(uri.to_string());
                pos += 2;
            }
            _ => {}
        }

        let Some(TokenKind::Ident(name)) = kind_at(pos) else {
            return Err(invalid(inner.get(pos)));
        };
        let name = name.clone();
        pos = skip_ws(inner, pos + 1);

        if pos >= inner.len() {
            return Ok(AttributeMatcher {
                namespace,
                name,
                operator: AttrOperator::Exists,
                value: String::new(),
                case_insensitive: false,
            });
        }

        let operator = match kind_at(pos) {
            Some(TokenKind::Delim('=')) => {
                pos += 1;
                AttrOperator::Equals
            }
            Some(TokenKind::Delim(c)) if kind_at(pos + 1) == Some(&TokenKind::Delim('=')) => {
                let op = match c {
                    '~' => AttrOperator::Includes,
                    '|' => AttrOperator::DashMatch,
                    '^' => AttrOperator::Prefix,
                    '$' => AttrOperator::Suffix,
                    '*' => AttrOperator::Substring,
                    _ => return Err(invalid(inner.get(pos))),
                };
                pos += 2;
                op
            }
            _ => return Err(invalid(inner.get(pos))),
        };

        pos = skip_ws(inner, pos);
        let value = match kind_at(pos) {
            Some(TokenKind::Ident(v)) | Some(TokenKind::String(v)) => v.clone(),
            _ => return Err(invalid(inner.get(pos))),
        };
        pos = skip_ws(inner, pos + 1);

        let mut case_insensitive = false;
        if let Some(TokenKind::Ident(flag)) = kind_at(pos) {
            match flag.to_ascii_lowercase().as_str() {
                "i" => case_insensitive = true,
                "s" => case_insensitive = false,
                _ => return Err(invalid(inner.get(pos))),
            }
            pos = skip_ws(inner, pos + 1);
        }
        if pos < inner.len() {
            return Err(invalid(inner.get(pos)));
        }

        Ok(AttributeMatcher {
            namespace,
            name,
            operator,
            value,
            case_insensitive,
        })
    }

    /// Parse `:name`, `:name(...)`, `::name` or `::name(...)` at `start`.
    fn parse_pseudo(&self, tokens: &[Token], start: usize, compound: &mut CompoundSelector) -> SyntaxResult<usize> {
        let double = tokens.get(start + 1).map(|t| &t.kind) == Some(&TokenKind::Colon);
        let pos = if double { start + 2 } else { start + 1 };
        let unexpected = |i: usize| {
            let text = tokens.get(i).map(Token::to_css).unwrap_or_default();
            SyntaxError::at(SyntaxErrorKind::UnexpectedToken(text), tokens.get(i).or(tokens.last()))
        };

        match tokens.get(pos).map(|t| &t.kind) {
            Some(TokenKind::Ident(name)) => {
                let name = name.to_ascii_lowercase();
                if double || LEGACY_PSEUDO_ELEMENTS.contains(&name.as_str()) {
                    compound.pseudo_element = Some(name);
                } else {
                    compound.pseudo_classes.push(PseudoClassSelector::simple(&name));
                }
                Ok(pos + 1)
            }
            Some(TokenKind::Function(name)) => {
                let name = name.to_ascii_lowercase();
                let (args, next) = block_interior(tokens, pos);
                if double {
                    compound.pseudo_element = Some(name);
                } else {
                    let pc = self.parse_functional_pseudo(&name, args, &tokens[pos])?;
                    compound.pseudo_classes.push(pc);
                }
                Ok(next)
            }
            _ => Err(unexpected(pos)),
        }
    }

    fn parse_functional_pseudo(&self, name: &str, args: &[Token], at: &Token) -> SyntaxResult<PseudoClassSelector> {
        let invalid = || SyntaxError::new(SyntaxErrorKind::InvalidPseudoArgument(name.to_string()), at.line, at.column);
        let argument = tokens_to_css(trim_whitespace(args));
        let mut pc = PseudoClassSelector {
            name: name.to_string(),
            argument: Some(argument),
            selector: None,
            nth: None,
        };

        match name {
            "not" => {
                pc.selector = Some(self.parse_list(args, false)?);
            }
            "is" | "where" | "matches" | "-webkit-any" => {
                pc.selector = Some(self.parse_forgiving_list(args));
            }
            "has" => {
                let list = self.parse_list(args, true)?;
                if list.uses_has() {
                    // `:has()` may not nest.
                    return Err(invalid());
                }
                pc.selector = Some(list);
            }
            "nth-child" | "nth-last-child" => {
                let of_pos = args
                    .iter()
                    .position(|t| matches!(&t.kind, TokenKind::Ident(s) if s.eq_ignore_ascii_case("of")));
                match of_pos {
                    Some(i) => {
                        pc.nth = Some(parse_nth_tokens(trim_whitespace(&args[..i])).map_err(|_| invalid())?);
                        pc.selector = Some(self.parse_list(&args[i + 1..], false)?);
                    }
                    None => {
                        pc.nth = Some(parse_nth_tokens(trim_whitespace(args)).map_err(|_| invalid())?);
                    }
                }
            }
            "nth-of-type" | "nth-last-of-type" => {
                pc.nth = Some(parse_nth_tokens(trim_whitespace(args)).map_err(|_| invalid())?);
            }
            _ => {
                if trim_whitespace(args).is_empty() {
                    return Err(invalid());
                }
            }
        }
        Ok(pc)
    }
}

fn skip_ws(tokens: &[Token], mut pos: usize) -> usize {
    while pos < tokens.len() && tokens[pos].is_whitespace() {
        pos += 1;
    }
    pos
}

/// `>`, `+`, `~` or `||` at `pos` (whitespace already skipped).
fn explicit_combinator(tokens: &[Token], pos: usize) -> Option<(Combinator, usize)> {
    match tokens.get(pos).map(|t| &t.kind)? {
        TokenKind::Delim('>') => Some((Combinator::Child, pos + 1)),
        TokenKind::Delim('+') => Some((Combinator::NextSibling, pos + 1)),
        TokenKind::Delim('~') => Some((Combinator::SubsequentSibling, pos + 1)),
        TokenKind::Delim('|') if tokens.get(pos + 1).map(|t| &t.kind) == Some(&TokenKind::Delim('|')) => {
            Some((Combinator::Column, pos + 2))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(input: &str) -> SelectorList {
        match parse_selector(input) {
            Ok(list) => list,
            Err(err) => panic!("failed to parse {input:?}: {err}"),
        }
    }

    fn specificity(input: &str) -> Specificity {
        parse(input).specificity()
    }

    #[test]
    fn test_combinator_chain() {
        let list = parse("div > p + span ~ a");
        assert_eq!(list.selectors.len(), 1);
        let complex = &list.selectors[0];
        assert_eq!(complex.compounds.len(), 4);
        let combinators: Vec<_> = complex.compounds.iter().map(|c| c.combinator).collect();
        assert_eq!(
            combinators,
            vec![
                Some(Combinator::Child),
                Some(Combinator::NextSibling),
                Some(Combinator::SubsequentSibling),
                None,
            ]
        );
    }

    #[test]
    fn test_next_sibling_without_spaces_after_u() {
        // `u+a` is a type selector, a `+` combinator and another type.
        for (input, second) in [("u+a", "a"), ("u+b", "b"), ("U+abbr", "abbr")] {
            let list = parse(input);
            let compounds = &list.selectors[0].compounds;
            assert_eq!(compounds.len(), 2, "{input}");
            assert_eq!(compounds[0].combinator, Some(Combinator::NextSibling));
            assert_eq!(compounds[1].type_selector.as_ref().map(|t| t.name.as_str()), Some(second));
        }
        assert_eq!(parse("u+a").to_string(), "u + a");
        assert_eq!(parse("ul>li, u+i.x").selectors.len(), 2);
    }

    #[test]
    fn test_descendant_and_column() {
        let list = parse("ul  li||td");
        let complex = &list.selectors[0];
        assert_eq!(complex.compounds[0].combinator, Some(Combinator::Descendant));
        assert_eq!(complex.compounds[1].combinator, Some(Combinator::Column));
    }

    #[test]
    fn test_compound_parts() {
        let list = parse("DIV#main.a.b[href^='http' i]:hover::before");
        let compound = &list.selectors[0].compounds[0];
        let ty = compound.type_selector.as_ref().map(|t| (t.name.as_str(), t.lower_name.as_str()));
        assert_eq!(ty, Some(("DIV", "div")));
        assert_eq!(compound.ids, vec!["main"]);
        assert_eq!(compound.classes, vec!["a", "b"]);
        assert_eq!(compound.attributes[0].operator, AttrOperator::Prefix);
        assert_eq!(compound.attributes[0].value, "http");
        assert!(compound.attributes[0].case_insensitive);
        assert_eq!(compound.pseudo_classes[0].name, "hover");
        assert_eq!(compound.pseudo_element.as_deref(), Some("before"));
    }

    #[test]
    fn test_legacy_pseudo_element() {
        let list = parse("p:first-line");
        assert_eq!(list.selectors[0].pseudo_element(), Some("first-line"));
        assert!(list.selectors[0].compounds[0].pseudo_classes.is_empty());
    }

    #[test]
    fn test_attribute_operators() {
        let ops = [
            ("[a]", AttrOperator::Exists),
            ("[a=b]", AttrOperator::Equals),
            ("[a~=b]", AttrOperator::Includes),
            ("[a|=b]", AttrOperator::DashMatch),
            ("[a^=b]", AttrOperator::Prefix),
            ("[a$=b]", AttrOperator::Suffix),
            ("[a*=\"b\"]", AttrOperator::Substring),
        ];
        for (text, op) in ops {
            let list = parse(text);
            assert_eq!(list.selectors[0].compounds[0].attributes[0].operator, op, "{text}");
        }
    }

    #[test]
    fn test_errors() {
        assert!(parse_selector("").is_err());
        assert!(parse_selector("div >").is_err());
        assert!(parse_selector("> div").is_err());
        assert!(parse_selector("div,").is_err());
        assert!(parse_selector("a::before.b").is_err());
        assert!(parse_selector("#123").is_err());
        assert!(parse_selector("[a=]").is_err());
        assert!(parse_selector("ns|a").is_err());
        assert!(parse_selector(":nth-child(x)").is_err());

        let err = parse_selector("div >").err();
        assert_eq!(err.map(|e| e.kind), Some(SyntaxErrorKind::DanglingCombinator));
    }

    #[test]
    fn test_specificity_values() {
        assert_eq!(specificity("*"), Specificity::new(0, 0, 0));
        assert_eq!(specificity("li"), Specificity::new(0, 0, 1));
        assert_eq!(specificity("ul li"), Specificity::new(0, 0, 2));
        assert_eq!(specificity("li.red"), Specificity::new(0, 1, 1));
        assert_eq!(specificity("#x"), Specificity::new(1, 0, 0));
        assert_eq!(specificity("a[href]:hover::after"), Specificity::new(0, 2, 2));
        assert_eq!(specificity(":not(#a.b)"), Specificity::new(0, 1, 0));
        assert_eq!(specificity(":is(#a, .b)"), Specificity::new(1, 0, 0));
        assert_eq!(specificity(":where(#a, .b) p"), Specificity::new(0, 0, 1));
        assert_eq!(specificity("div:has(> .x)"), Specificity::new(0, 1, 1));
        assert_eq!(specificity(":nth-child(2n of .a)"), Specificity::new(0, 2, 0));
        assert_eq!(specificity("p, #q"), Specificity::new(1, 0, 0));
    }

    #[test]
    fn test_specificity_ordering() {
        assert!(specificity("#id") > specificity("p p p p p p p p p p p"));
        assert!(Specificity::new(0, 1, 0) > Specificity::new(0, 0, 11));
        assert!(Specificity::new(0, 1, 2) > Specificity::new(0, 1, 1));
        assert_eq!(Specificity::new(0, 1, 0).cmp(&Specificity::new(0, 1, 0)), std::cmp::Ordering::Equal);
    }

    #[test]
    fn test_forgiving_is() {
        let list = parse(":is(p, 12px, .ok)");
        let pc = &list.selectors[0].compounds[0].pseudo_classes[0];
        let inner = pc.selector.as_ref().map(|s| s.selectors.len());
        assert_eq!(inner, Some(2));
        assert!(parse_selector(":not(p, >)").is_err());
    }

    #[test]
    fn test_relative_selector() {
        let list = parse_relative_selector("> img, p").ok().unwrap_or_default();
        assert_eq!(list.selectors[0].leading_combinator, Some(Combinator::Child));
        assert_eq!(list.selectors[1].leading_combinator, Some(Combinator::Descendant));

        let has = parse("a:has(+ b c)");
        let pc = &has.selectors[0].compounds[0].pseudo_classes[0];
        let arg = &pc.selector.as_ref().map(|s| s.selectors[0].clone()).unwrap_or_default();
        assert_eq!(arg.leading_combinator, Some(Combinator::NextSibling));
        assert_eq!(arg.compounds.len(), 2);
        assert!(has.uses_has());
        assert!(parse_selector("a:has(b:has(c))").is_err());
    }

    #[test]
    fn test_nth_arguments() {
        let list = parse("li:nth-child(2n+1 of .x):nth-last-of-type(3)");
        let pcs = &list.selectors[0].compounds[0].pseudo_classes;
        assert_eq!(pcs[0].nth, Some(Nth::new(2, 1)));
        assert!(pcs[0].selector.is_some());
        assert_eq!(pcs[1].nth, Some(Nth::new(0, 3)));
    }

    #[test]
    fn test_namespaces() {
        let mut ns = NamespaceMap::new();
        ns.insert(Some("svg"), "http://www.w3.org/2000/svg");
        ns.insert(None, "http://www.w3.org/1999/xhtml");
        let tokens = tokenize("svg|rect, *|a, |b, c, [svg|href]");
        let list = parse_selector_tokens(&tokens, &ns).unwrap_or_default();
        let ns_of = |i: usize| {
            list.selectors[i].compounds[0]
                .type_selector
                .as_ref()
                .map(|t| t.namespace.clone())
        };
        assert_eq!(ns_of(0), Some(NamespaceConstraint::Uri("http://www.w3.org/2000/svg".into())));
        assert_eq!(ns_of(1), Some(NamespaceConstraint::Any));
        assert_eq!(ns_of(2), Some(NamespaceConstraint::NoNamespace));
        assert_eq!(ns_of(3), Some(NamespaceConstraint::Uri("http://www.w3.org/1999/xhtml".into())));
        assert_eq!(
            list.selectors[4].compounds[0].attributes[0].namespace,
            NamespaceConstraint::Uri("http://www.w3.org/2000/svg".into())
        );
    }

    #[test]
    fn test_display_round_trip() {
        let list = parse("div > p.a, #b[c=\"d\"]:hover");
        assert_eq!(list.to_string(), "div > p.a, #b[c=\"d\"]:hover");
    }
}
