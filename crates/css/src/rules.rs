//! The stylesheet object model: typed rules stored in an arena.
//!
//! Rules reference their parent and children by [`RuleId`], so the parent
//! links are plain indices and never own anything.

use std::fmt::Write as _;

use indexmap::IndexMap;
use tracing::debug;

use crate::media::MediaQueryList;
use crate::parser::{
    AtRule, ComponentValue, Declaration, QualifiedRule, RawRule, consume_declaration_list,
    consume_rule_list, parse_component_values, parse_declaration_list, trim_whitespace, values_to_css,
};
use crate::selector::{NamespaceMap, SelectorList, parse_selector_tokens};
use crate::supports::SupportsCondition;
use crate::token::{Token, TokenKind, serialize_string, tokenize, tokens_to_css};

/// Index of a rule inside its [`Stylesheet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RuleId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleKind {
    Style,
    Media,
    Import,
    FontFace,
    Keyframes,
    Keyframe,
    Namespace,
    Supports,
    GenericAt,
}

/// Behavior shared by every rule variant.
///
/// Rules are plain values in their [`Stylesheet`]'s arena. They hold
/// [`RuleId`]s for their parent and children but no reference back to the
/// sheet, so anything that walks the tree takes the sheet as an argument.
/// [`Stylesheet::rule_css_text`] serializes a rule by id.
pub trait CssRuleInterface {
    fn kind(&self) -> RuleKind;
    fn parent_rule(&self) -> Option<RuleId>;
    /// Serialize the rule. `sheet` must be the sheet that owns it, since
    /// group rules resolve their children through it.
    fn css_text(&self, sheet: &Stylesheet) -> String;
}

// ─────────────────────────────────────────────────────────────────────────────
// StyleDeclaration
// ─────────────────────────────────────────────────────────────────────────────

/// A declared value and its priority.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyDeclaration {
    pub value: Vec<ComponentValue>,
    pub important: bool,
}

impl PropertyDeclaration {
    pub fn value_text(&self) -> String {
        values_to_css(&self.value)
    }
}

/// An ordered property map; insertion order is kept for serialization.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StyleDeclaration {
    entries: IndexMap<String, PropertyDeclaration>,
}

impl StyleDeclaration {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse declaration-list text such as a `style` attribute.
    pub fn parse(text: &str) -> Self {
        Self::from_declarations(parse_declaration_list(text))
    }

    pub fn from_declarations(declarations: Vec<Declaration>) -> Self {
        let mut block = Self::new();
        for decl in declarations {
            block.push(decl);
        }
        block
    }

    /// Add a parsed declaration. A normal declaration never replaces an
    /// earlier `!important` one for the same property.
    pub fn push(&mut self, decl: Declaration) {
        if let Some(existing) = self.entries.get(&decl.name) {
            if existing.important && !decl.important {
                return;
            }
            // Re-declaring moves the property to the end.
            self.entries.shift_remove(&decl.name);
        }
        self.entries.insert(
            decl.name,
            PropertyDeclaration {
                value: decl.value,
                important: decl.important,
            },
        );
    }

    /// Set `name` to `value`; an empty value removes the property.
    /// `priority` is `"important"` or empty.
    pub fn set_property(&mut self, name: &str, value: &str, priority: &str) {
        let name = normalize_property_name(name);
        let mut value = parse_component_values(value);
        while value.last().is_some_and(ComponentValue::is_whitespace) {
            value.pop();
        }
        let leading = value.iter().take_while(|v| v.is_whitespace()).count();
        value.drain(..leading);
        if value.is_empty() {
            self.entries.shift_remove(&name);
            return;
        }
        let important = priority.eq_ignore_ascii_case("important");
        match self.entries.get_mut(&name) {
            Some(existing) => {
                existing.value = value;
                existing.important = important;
            }
            None => {
                self.entries.insert(name, PropertyDeclaration { value, important });
            }
        }
    }

    /// Serialized value, or an empty string when the property is absent.
    pub fn get_property_value(&self, name: &str) -> String {
        self.entries
            .get(&normalize_property_name(name))
            .map(PropertyDeclaration::value_text)
            .unwrap_or_default()
    }

    /// `"important"` or an empty string.
    pub fn get_property_priority(&self, name: &str) -> &'static str {
        match self.entries.get(&normalize_property_name(name)) {
            Some(decl) if decl.important => "important",
            _ => "",
        }
    }

    /// Remove a property, returning its old serialized value.
    pub fn remove_property(&mut self, name: &str) -> String {
        self.entries
            .shift_remove(&normalize_property_name(name))
            .map(|d| d.value_text())
            .unwrap_or_default()
    }

    pub fn get(&self, name: &str) -> Option<&PropertyDeclaration> {
        self.entries.get(name)
    }

    /// Property name at `index` in declaration order.
    pub fn item(&self, index: usize) -> Option<&str> {
        self.entries.get_index(index).map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropertyDeclaration)> {
        self.entries.iter().map(|(name, decl)| (name.as_str(), decl))
    }

    pub fn css_text(&self) -> String {
        let mut out = String::new();
        for (name, decl) in &self.entries {
            if !out.is_empty() {
                out.push(' ');
            }
            let _ = write!(out, "{name}: {}", decl.value_text());
            if decl.important {
                out.push_str(" !important");
            }
            out.push(';');
        }
        out
    }
}

fn normalize_property_name(name: &str) -> String {
    let name = name.trim();
    if name.starts_with("--") {
        name.to_string()
    } else {
        name.to_ascii_lowercase()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Rule variants
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct StyleRule {
    pub selector_text: String,
    pub selectors: SelectorList,
    pub declarations: StyleDeclaration,
    pub parent: Option<RuleId>,
}

#[derive(Debug, Clone)]
pub struct MediaRule {
    pub media: MediaQueryList,
    pub children: Vec<RuleId>,
    pub parent: Option<RuleId>,
}

/// `@import`; recorded only, never fetched.
#[derive(Debug, Clone)]
pub struct ImportRule {
    pub href: String,
    pub media: MediaQueryList,
    pub parent: Option<RuleId>,
}

#[derive(Debug, Clone)]
pub struct FontFaceRule {
    pub declarations: StyleDeclaration,
    pub parent: Option<RuleId>,
}

#[derive(Debug, Clone)]
pub struct KeyframesRule {
    pub name: String,
    pub children: Vec<RuleId>,
    pub parent: Option<RuleId>,
}

#[derive(Debug, Clone)]
pub struct KeyframeRule {
    pub key_text: String,
    /// Offsets in percent; `from` is 0 and `to` is 100.
    pub keys: Vec<f64>,
    pub declarations: StyleDeclaration,
    pub parent: Option<RuleId>,
}

#[derive(Debug, Clone)]
pub struct NamespaceRule {
    pub prefix: Option<String>,
    pub uri: String,
    pub parent: Option<RuleId>,
}

#[derive(Debug, Clone)]
pub struct SupportsRule {
    pub condition_text: String,
    pub condition: SupportsCondition,
    pub children: Vec<RuleId>,
    pub parent: Option<RuleId>,
}

/// Any other at-rule. `@layer` and `@container` blocks keep their child
/// rules; other blocks are kept as raw text.
#[derive(Debug, Clone)]
pub struct GenericAtRule {
    pub name: String,
    pub prelude: String,
    pub children: Vec<RuleId>,
    pub block: Option<String>,
    pub parent: Option<RuleId>,
}

#[derive(Debug, Clone)]
pub enum CssRule {
    Style(StyleRule),
    Media(MediaRule),
    Import(ImportRule),
    FontFace(FontFaceRule),
    Keyframes(KeyframesRule),
    Keyframe(KeyframeRule),
    Namespace(NamespaceRule),
    Supports(SupportsRule),
    GenericAt(GenericAtRule),
}

impl CssRule {
    /// Child rule ids of a grouping rule; empty for leaf rules.
    pub fn children(&self) -> &[RuleId] {
        match self {
            CssRule::Media(r) => &r.children,
            CssRule::Keyframes(r) => &r.children,
            CssRule::Supports(r) => &r.children,
            CssRule::GenericAt(r) => &r.children,
            _ => &[],
        }
    }

    fn set_children(&mut self, ids: Vec<RuleId>) {
        match self {
            CssRule::Media(r) => r.children = ids,
            CssRule::Keyframes(r) => r.children = ids,
            CssRule::Supports(r) => r.children = ids,
            CssRule::GenericAt(r) => r.children = ids,
            _ => {}
        }
    }

    pub fn as_style(&self) -> Option<&StyleRule> {
        match self {
            CssRule::Style(r) => Some(r),
            _ => None,
        }
    }
}

fn children_css(sheet: &Stylesheet, children: &[RuleId]) -> String {
    let mut out = String::new();
    for id in children {
        if let Some(rule) = sheet.rule(*id) {
            out.push(' ');
            out.push_str(&rule.css_text(sheet));
        }
    }
    out
}

fn block_css(declarations: &StyleDeclaration) -> String {
    if declarations.is_empty() {
        "{ }".to_string()
    } else {
        format!("{{ {} }}", declarations.css_text())
    }
}

impl CssRuleInterface for StyleRule {
    fn kind(&self) -> RuleKind {
        RuleKind::Style
    }
    fn parent_rule(&self) -> Option<RuleId> {
        self.parent
    }
    fn css_text(&self, _sheet: &Stylesheet) -> String {
        format!("{} {}", self.selector_text, block_css(&self.declarations))
    }
}

impl CssRuleInterface for MediaRule {
    fn kind(&self) -> RuleKind {
        RuleKind::Media
    }
    fn parent_rule(&self) -> Option<RuleId> {
        self.parent
    }
    fn css_text(&self, sheet: &Stylesheet) -> String {
        format!("@media {} {{{} }}", self.media.text(), children_css(sheet, &self.children))
    }
}

impl CssRuleInterface for ImportRule {
    fn kind(&self) -> RuleKind {
        RuleKind::Import
    }
    fn parent_rule(&self) -> Option<RuleId> {
        self.parent
    }
    fn css_text(&self, _sheet: &Stylesheet) -> String {
        let mut href = String::new();
        serialize_string(&self.href, &mut href);
        if self.media.is_empty() {
            format!("@import url({href});")
        } else {
            format!("@import url({href}) {};", self.media.text())
        }
    }
}

impl CssRuleInterface for FontFaceRule {
    fn kind(&self) -> RuleKind {
        RuleKind::FontFace
    }
    fn parent_rule(&self) -> Option<RuleId> {
        self.parent
    }
    fn css_text(&self, _sheet: &Stylesheet) -> String {
        format!("@font-face {}", block_css(&self.declarations))
    }
}

impl CssRuleInterface for KeyframesRule {
    fn kind(&self) -> RuleKind {
        RuleKind::Keyframes
    }
    fn parent_rule(&self) -> Option<RuleId> {
        self.parent
    }
    fn css_text(&self, sheet: &Stylesheet) -> String {
        format!("@keyframes {} {{{} }}", self.name, children_css(sheet, &self.children))
    }
}

impl CssRuleInterface for KeyframeRule {
    fn kind(&self) -> RuleKind {
        RuleKind::Keyframe
    }
    fn parent_rule(&self) -> Option<RuleId> {
        self.parent
    }
    fn css_text(&self, _sheet: &Stylesheet) -> String {
        format!("{} {}", self.key_text, block_css(&self.declarations))
    }
}

impl CssRuleInterface for NamespaceRule {
    fn kind(&self) -> RuleKind {
        RuleKind::Namespace
    }
    fn parent_rule(&self) -> Option<RuleId> {
        self.parent
    }
    fn css_text(&self, _sheet: &Stylesheet) -> String {
        let mut uri = String::new();
        serialize_string(&self.uri, &mut uri);
        match &self.prefix {
            Some(prefix) => format!("@namespace {prefix} url({uri});"),
            None => format!("@namespace url({uri});"),
        }
    }
}

impl CssRuleInterface for SupportsRule {
    fn kind(&self) -> RuleKind {
        RuleKind::Supports
    }
    fn parent_rule(&self) -> Option<RuleId> {
        self.parent
    }
    fn css_text(&self, sheet: &Stylesheet) -> String {
        format!("@supports {} {{{} }}", self.condition_text, children_css(sheet, &self.children))
    }
}

impl CssRuleInterface for GenericAtRule {
    fn kind(&self) -> RuleKind {
        RuleKind::GenericAt
    }
    fn parent_rule(&self) -> Option<RuleId> {
        self.parent
    }
    fn css_text(&self, sheet: &Stylesheet) -> String {
        let mut out = format!("@{}", self.name);
        if !self.prelude.is_empty() {
            out.push(' ');
            out.push_str(&self.prelude);
        }
        match &self.block {
            Some(_) if !self.children.is_empty() => {
                let _ = write!(out, " {{{} }}", children_css(sheet, &self.children));
            }
            Some(raw) => {
                let _ = write!(out, " {{{raw}}}");
            }
            None => out.push(';'),
        }
        out
    }
}

impl CssRuleInterface for CssRule {
    fn kind(&self) -> RuleKind {
        self.inner().kind()
    }
    fn parent_rule(&self) -> Option<RuleId> {
        self.inner().parent_rule()
    }
    fn css_text(&self, sheet: &Stylesheet) -> String {
        self.inner().css_text(sheet)
    }
}

impl CssRule {
    fn inner(&self) -> &dyn CssRuleInterface {
        match self {
            CssRule::Style(r) => r,
            CssRule::Media(r) => r,
            CssRule::Import(r) => r,
            CssRule::FontFace(r) => r,
            CssRule::Keyframes(r) => r,
            CssRule::Keyframe(r) => r,
            CssRule::Namespace(r) => r,
            CssRule::Supports(r) => r,
            CssRule::GenericAt(r) => r,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Stylesheet
// ─────────────────────────────────────────────────────────────────────────────

/// A parsed stylesheet. All rules, nested ones included, live in one arena
/// in source order; `top_level` lists the outermost ones.
#[derive(Debug, Clone, Default)]
pub struct Stylesheet {
    rules: Vec<CssRule>,
    top_level: Vec<RuleId>,
    namespaces: NamespaceMap,
    uses_has: bool,
}

impl Stylesheet {
    /// Parse a complete stylesheet. Invalid rules are dropped.
    pub fn parse(input: &str) -> Self {
        let tokens = tokenize(input);
        let mut sheet = Stylesheet::default();
        let raw = consume_rule_list(&tokens, true);
        sheet.top_level = sheet.build_rule_list(raw, None);
        debug!(rules = sheet.rules.len(), "parsed stylesheet");
        sheet
    }

    pub fn rule(&self, id: RuleId) -> Option<&CssRule> {
        self.rules.get(id.0)
    }

    pub fn parent_rule(&self, id: RuleId) -> Option<&CssRule> {
        self.rule(id)?.parent_rule().and_then(|p| self.rule(p))
    }

    /// Serialized text of the rule `id`, or `None` if it is not in this sheet.
    pub fn rule_css_text(&self, id: RuleId) -> Option<String> {
        self.rule(id).map(|rule| rule.css_text(self))
    }

    pub fn top_level(&self) -> &[RuleId] {
        &self.top_level
    }

    /// Every rule with its id, in source order.
    pub fn iter(&self) -> impl Iterator<Item = (RuleId, &CssRule)> {
        self.rules.iter().enumerate().map(|(i, r)| (RuleId(i), r))
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn namespaces(&self) -> &NamespaceMap {
        &self.namespaces
    }

    /// Whether any style rule uses `:has()`.
    pub fn uses_has(&self) -> bool {
        self.uses_has
    }

    pub fn css_text(&self) -> String {
        self.top_level
            .iter()
            .filter_map(|id| self.rule(*id))
            .map(|r| r.css_text(self))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn push(&mut self, rule: CssRule) -> RuleId {
        let id = RuleId(self.rules.len());
        self.rules.push(rule);
        id
    }

    fn build_rule_list(&mut self, raw: Vec<RawRule<'_>>, parent: Option<RuleId>) -> Vec<RuleId> {
        let mut ids = Vec::new();
        for rule in raw {
            let id = match rule {
                RawRule::Qualified(q) => self.build_style_rule(&q, parent),
                RawRule::At(at) => self.build_at_rule(&at, parent),
            };
            ids.extend(id);
        }
        ids
    }

    fn build_style_rule(&mut self, rule: &QualifiedRule<'_>, parent: Option<RuleId>) -> Option<RuleId> {
        let selectors = match parse_selector_tokens(rule.prelude, &self.namespaces) {
            Ok(list) => list,
            Err(err) => {
                debug!(
                    selector = %tokens_to_css(trim_whitespace(rule.prelude)),
                    %err,
                    "dropping rule with invalid selector"
                );
                return None;
            }
        };
        self.uses_has |= selectors.uses_has();
        let declarations = StyleDeclaration::from_declarations(consume_declaration_list(rule.block));
        Some(self.push(CssRule::Style(StyleRule {
            selector_text: selectors.to_string(),
            selectors,
            declarations,
            parent,
        })))
    }

    fn build_at_rule(&mut self, at: &AtRule<'_>, parent: Option<RuleId>) -> Option<RuleId> {
        let name = at.name.to_ascii_lowercase();
        let prelude_text = tokens_to_css(trim_whitespace(at.prelude));

        let rule = match name.as_str() {
            "charset" => return None,
            "media" => {
                let block = at.block?;
                let media = MediaQueryList::from_tokens(at.prelude);
                let id = self.push(CssRule::Media(MediaRule {
                    media,
                    children: Vec::new(),
                    parent,
                }));
                return Some(self.attach_children(id, block));
            }
            "supports" => {
                let block = at.block?;
                let Some(condition) = SupportsCondition::parse(at.prelude) else {
                    debug!(condition = %prelude_text, "dropping @supports with invalid condition");
                    return None;
                };
                let id = self.push(CssRule::Supports(SupportsRule {
                    condition_text: prelude_text,
                    condition,
                    children: Vec::new(),
                    parent,
                }));
                return Some(self.attach_children(id, block));
            }
            "layer" | "container" => {
                let id = self.push(CssRule::GenericAt(GenericAtRule {
                    name,
                    prelude: prelude_text,
                    children: Vec::new(),
                    block: at.block.map(tokens_to_css),
                    parent,
                }));
                return Some(match at.block {
                    Some(block) => self.attach_children(id, block),
                    None => id,
                });
            }
            "keyframes" | "-webkit-keyframes" => {
                let block = at.block?;
                let id = self.push(CssRule::Keyframes(KeyframesRule {
                    name: prelude_text,
                    children: Vec::new(),
                    parent,
                }));
                let children = self.build_keyframes(block, id);
                if let Some(rule) = self.rules.get_mut(id.0) {
                    rule.set_children(children);
                }
                return Some(id);
            }
            "import" => {
                let (href, rest) = import_href(at.prelude)?;
                CssRule::Import(ImportRule {
                    href,
                    media: MediaQueryList::from_tokens(rest),
                    parent,
                })
            }
            "namespace" => {
                let (prefix, uri) = namespace_prelude(at.prelude)?;
                self.namespaces.insert(prefix.as_deref(), &uri);
                CssRule::Namespace(NamespaceRule { prefix, uri, parent })
            }
            "font-face" => {
                let block = at.block?;
                CssRule::FontFace(FontFaceRule {
                    declarations: StyleDeclaration::from_declarations(consume_declaration_list(block)),
                    parent,
                })
            }
            _ => {
                debug!(at_rule = %name, line = at.line, "keeping unknown at-rule as generic");
                CssRule::GenericAt(GenericAtRule {
                    name,
                    prelude: prelude_text,
                    children: Vec::new(),
                    block: at.block.map(tokens_to_css),
                    parent,
                })
            }
        };
        Some(self.push(rule))
    }

    fn attach_children(&mut self, id: RuleId, block: &[Token]) -> RuleId {
        let raw = consume_rule_list(block, false);
        let children = self.build_rule_list(raw, Some(id));
        if let Some(rule) = self.rules.get_mut(id.0) {
            rule.set_children(children);
        }
        id
    }

    fn build_keyframes(&mut self, block: &[Token], parent: RuleId) -> Vec<RuleId> {
        let mut ids = Vec::new();
        for raw in consume_rule_list(block, false) {
            let RawRule::Qualified(q) = raw else {
                continue;
            };
            let Some(keys) = keyframe_keys(q.prelude) else {
                debug!(keys = %tokens_to_css(trim_whitespace(q.prelude)), "dropping keyframe with invalid selector");
                continue;
            };
            let id = self.push(CssRule::Keyframe(KeyframeRule {
                key_text: tokens_to_css(trim_whitespace(q.prelude)),
                keys,
                declarations: StyleDeclaration::from_declarations(consume_declaration_list(q.block)),
                parent: Some(parent),
            }));
            ids.push(id);
        }
        ids
    }
}

fn keyframe_keys(prelude: &[Token]) -> Option<Vec<f64>> {
    let mut keys = Vec::new();
    for part in crate::parser::split_on_commas(prelude) {
        let part = trim_whitespace(part);
        let [token] = part else {
            return None;
        };
        let key = match &token.kind {
            TokenKind::Ident(s) if s.eq_ignore_ascii_case("from") => 0.0,
            TokenKind::Ident(s) if s.eq_ignore_ascii_case("to") => 100.0,
            TokenKind::Percentage(p) if (0.0..=100.0).contains(p) => *p,
            _ => return None,
        };
        keys.push(key);
    }
    Some(keys)
}

/// `url(x)`, `url("x")` or `"x"`, followed by an optional media list.
fn import_href(prelude: &[Token]) -> Option<(String, &[Token])> {
    let prelude = trim_whitespace(prelude);
    let first = prelude.first()?;
    match &first.kind {
        TokenKind::Url(href) | TokenKind::String(href) => Some((href.clone(), &prelude[1..])),
        TokenKind::Function(name) if name.eq_ignore_ascii_case("url") => {
            let (inner, next) = crate::parser::block_interior(prelude, 0);
            let href = trim_whitespace(inner).iter().find_map(|t| match &t.kind {
                TokenKind::String(s) => Some(s.clone()),
                _ => None,
            })?;
            Some((href, &prelude[next.min(prelude.len())..]))
        }
        _ => None,
    }
}

/// `[prefix] (url(x) | "x")`
fn namespace_prelude(prelude: &[Token]) -> Option<(Option<String>, String)> {
    let parts: Vec<&Token> = prelude.iter().filter(|t| !t.is_whitespace() && !t.is_eof()).collect();
    let uri_of = |t: &Token| match &t.kind {
        TokenKind::Url(u) | TokenKind::String(u) => Some(u.clone()),
        _ => None,
    };
    match parts.as_slice() {
        [uri] => Some((None, uri_of(uri)?)),
        [prefix, uri] => match &prefix.kind {
            TokenKind::Ident(p) => Some((Some(p.clone()), uri_of(uri)?)),
            _ => None,
        },
        _ => {
            // `url("x")` with a quoted string arrives as a function.
            let (prefix, rest) = match parts.first().map(|t| &t.kind) {
                Some(TokenKind::Ident(p)) => (Some(p.clone()), &parts[1..]),
                _ => (None, &parts[..]),
            };
            match rest {
                [func, s, close]
                    if matches!(&func.kind, TokenKind::Function(n) if n.eq_ignore_ascii_case("url"))
                        && close.kind == TokenKind::RParen =>
                {
                    uri_of(s).map(|u| (prefix, u))
                }
                _ => None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn style_rules(sheet: &Stylesheet) -> Vec<&StyleRule> {
        sheet.iter().filter_map(|(_, r)| r.as_style()).collect()
    }

    #[test]
    fn test_parse_simple_rules() {
        let sheet = Stylesheet::parse("p { color: red; font-size: 12px } .a, #b { margin: 0 }");
        let rules = style_rules(&sheet);
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].declarations.get_property_value("color"), "red");
        assert_eq!(rules[0].declarations.len(), 2);
        assert_eq!(rules[1].selectors.selectors.len(), 2);
        assert_eq!(sheet.top_level().len(), 2);
    }

    #[test]
    fn test_bad_selector_drops_only_that_rule() {
        let sheet = Stylesheet::parse("p { color: red } a > { color: blue } div { color: green }");
        let rules = style_rules(&sheet);
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[1].selector_text, "div");
    }

    #[test]
    fn test_media_rule_children_and_parent() {
        let sheet = Stylesheet::parse("@media screen and (min-width: 100px) { a { color: red } b { color: blue } }");
        let top = sheet.top_level()[0];
        let media = sheet.rule(top);
        assert_eq!(media.map(|r| r.kind()), Some(RuleKind::Media));
        let children = media.map(|r| r.children().to_vec()).unwrap_or_default();
        assert_eq!(children.len(), 2);
        assert_eq!(sheet.rule(children[0]).and_then(|r| r.parent_rule()), Some(top));
        assert_eq!(sheet.parent_rule(children[1]).map(|r| r.kind()), Some(RuleKind::Media));
        assert_eq!(
            media.map(|r| r.css_text(&sheet)).unwrap_or_default(),
            "@media screen and (min-width: 100px) { a { color: red; } b { color: blue; } }"
        );
        assert_eq!(sheet.rule_css_text(children[1]).as_deref(), Some("b { color: blue; }"));
        assert_eq!(sheet.rule_css_text(RuleId(99)), None);
    }

    #[test]
    fn test_u_plus_selector_is_not_a_unicode_range() {
        let sheet = Stylesheet::parse("u+a { color: red } @font-face { unicode-range: U+0-7F, U+4?? }");
        let rules = style_rules(&sheet);
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].selectors.selectors[0].compounds.len(), 2);
        assert!(sheet.css_text().contains("U+0-7F, U+400-4FF"));
    }

    #[test]
    fn test_at_rule_variants() {
        let css = r#"
            @charset "utf-8";
            @import url("base.css") print;
            @namespace svg url(http://www.w3.org/2000/svg);
            @font-face { font-family: X; src: url(x.woff) }
            @keyframes spin { from { opacity: 0 } 50%, to { opacity: 1 } }
            @supports (display: grid) { a { display: grid } }
            @layer base { p { color: red } }
            @page { margin: 1in }
        "#;
        let sheet = Stylesheet::parse(css);
        let kinds: Vec<RuleKind> = sheet
            .top_level()
            .iter()
            .filter_map(|id| sheet.rule(*id))
            .map(|r| r.kind())
            .collect();
        assert_eq!(
            kinds,
            vec![
                RuleKind::Import,
                RuleKind::Namespace,
                RuleKind::FontFace,
                RuleKind::Keyframes,
                RuleKind::Supports,
                RuleKind::GenericAt,
                RuleKind::GenericAt,
            ]
        );
        assert_eq!(sheet.namespaces().lookup("svg"), Some("http://www.w3.org/2000/svg"));

        let import = sheet.iter().find_map(|(_, r)| match r {
            CssRule::Import(i) => Some(i),
            _ => None,
        });
        assert_eq!(import.map(|i| i.href.as_str()), Some("base.css"));
        assert_eq!(import.map(|i| i.media.text()), Some("print"));

        let frames: Vec<Vec<f64>> = sheet
            .iter()
            .filter_map(|(_, r)| match r {
                CssRule::Keyframe(k) => Some(k.keys.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(frames, vec![vec![0.0], vec![50.0, 100.0]]);
        assert_eq!(style_rules(&sheet).len(), 2);
    }

    #[test]
    fn test_important_not_replaced_by_later_normal() {
        let block = StyleDeclaration::parse("color: red !important; color: blue; margin: 1px; margin: 2px");
        assert_eq!(block.get_property_value("color"), "red");
        assert_eq!(block.get_property_priority("color"), "important");
        assert_eq!(block.get_property_value("margin"), "2px");
        assert_eq!(block.len(), 2);
    }

    #[test]
    fn test_style_declaration_api() {
        let mut block = StyleDeclaration::parse("color: red; width: 10px");
        assert_eq!(block.item(0), Some("color"));
        assert_eq!(block.item(1), Some("width"));
        assert_eq!(block.item(2), None);

        block.set_property("HEIGHT", " 5px ", "important");
        assert_eq!(block.get_property_value("height"), "5px");
        assert_eq!(block.css_text(), "color: red; width: 10px; height: 5px !important;");

        assert_eq!(block.remove_property("color"), "red");
        assert_eq!(block.remove_property("color"), "");
        block.set_property("width", "", "");
        assert_eq!(block.len(), 1);
    }

    #[test]
    fn test_uses_has_flag() {
        assert!(Stylesheet::parse("a:has(b) {}").uses_has());
        assert!(!Stylesheet::parse("a b {}").uses_has());
    }

    #[test]
    fn test_namespaced_selectors() {
        let sheet = Stylesheet::parse("@namespace s url(urn:s); s|rect { fill: red } q|x { }");
        assert_eq!(style_rules(&sheet).len(), 1);
    }
}
