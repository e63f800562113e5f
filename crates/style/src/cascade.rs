//! Cascade resolution: collect matching rules, sort, and compute values.
//!
//! Declarations are ordered by cascade layer, then specificity, then source
//! order, and applied so the last write wins. Layers put normal
//! declarations as UA < User < Author and reverse the origins for
//! `!important` ones.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use css::{
    ComponentValue, CssColor, CssRule, PropertyDeclaration, RuleId, Specificity, StyleDeclaration, Stylesheet,
    parse_component_values,
};
use tracing::{debug, trace};

use crate::computed::{
    ComputeContext, ComputedStyle, ComputedValue, CssWideKeyword, compute_font_size, compute_value,
};
use crate::context::StyleConfig;
use crate::element::TElement;
use crate::matching::{MatchingContext, matching_specificity};
use crate::properties::{PROPERTY_TABLE, is_inherited, is_known_property, property_default};
use crate::shorthand::{Expansion, expand, is_shorthand, longhands};

// ─────────────────────────────────────────────────────────────────────────────
// Origin
// ─────────────────────────────────────────────────────────────────────────────

/// Where a stylesheet came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StyleOrigin {
    UserAgent,
    User,
    Author,
}

/// Cascade layer of a declaration: 0..=2 for normal declarations in origin
/// order, 3..=5 for important ones with the origins reversed.
pub fn cascade_layer(origin: StyleOrigin, important: bool) -> u8 {
    match (important, origin) {
        (false, StyleOrigin::UserAgent) => 0,
        (false, StyleOrigin::User) => 1,
        (false, StyleOrigin::Author) => 2,
        (true, StyleOrigin::Author) => 3,
        (true, StyleOrigin::User) => 4,
        (true, StyleOrigin::UserAgent) => 5,
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// MatchedRule
// ─────────────────────────────────────────────────────────────────────────────

/// A rule that matched an element, annotated with cascade metadata.
#[derive(Debug, Clone)]
pub struct MatchedRule<'a> {
    pub specificity: Specificity,
    pub origin: StyleOrigin,
    /// Increases across every rule of every sheet in load order.
    pub source_order: usize,
    pub declarations: &'a StyleDeclaration,
}

/// One declaration placed in the cascade.
#[derive(Debug, Clone, Copy)]
pub struct CascadedDeclaration<'a> {
    pub name: &'a str,
    pub declaration: &'a PropertyDeclaration,
    pub layer: u8,
    pub specificity: Specificity,
    pub source_order: usize,
}

/// Flatten matched rules into declarations sorted from lowest to highest
/// precedence.
pub fn sort_declarations<'a>(matched: &[MatchedRule<'a>]) -> Vec<CascadedDeclaration<'a>> {
    let mut out: Vec<CascadedDeclaration<'a>> = matched
        .iter()
        .flat_map(|rule| {
            rule.declarations.iter().map(move |(name, declaration)| CascadedDeclaration {
                name,
                declaration,
                layer: cascade_layer(rule.origin, declaration.important),
                specificity: rule.specificity,
                source_order: rule.source_order,
            })
        })
        .collect();
    out.sort_by(|a, b| {
        a.layer
            .cmp(&b.layer)
            .then(a.specificity.cmp(&b.specificity))
            .then(a.source_order.cmp(&b.source_order))
    });
    out
}

// ─────────────────────────────────────────────────────────────────────────────
// Default user-agent sheet
// ─────────────────────────────────────────────────────────────────────────────

/// A minimal HTML user-agent stylesheet.
pub const DEFAULT_UA_CSS: &str = "
    html, body, div, p, h1, h2, h3, h4, h5, h6, ul, ol, dl, dd, dt, section, article,
    nav, header, footer, main, aside, figure, figcaption, blockquote, pre, hr, form,
    fieldset, legend, address, details, dialog, search, hgroup { display: block; }
    head, title, meta, link, style, script, template, [hidden] { display: none; }
    li, summary { display: list-item; }
    table { display: table; border-collapse: separate; border-spacing: 2px; }
    thead { display: table-header-group; }
    tbody { display: table-row-group; }
    tfoot { display: table-footer-group; }
    tr { display: table-row; }
    td, th { display: table-cell; padding: 1px; }
    caption { display: table-caption; text-align: center; }
    colgroup, col { display: none; }
    button, input, select, textarea, img, video, canvas, iframe { display: inline-block; }
    body { margin: 8px; }
    p, blockquote, figure, dl, ul, ol { margin-top: 1em; margin-bottom: 1em; }
    h1 { font-size: 2em; margin: 0.67em 0; font-weight: bold; }
    h2 { font-size: 1.5em; margin: 0.83em 0; font-weight: bold; }
    h3 { font-size: 1.17em; margin: 1em 0; font-weight: bold; }
    h4 { margin: 1.33em 0; font-weight: bold; }
    h5 { font-size: 0.83em; margin: 1.67em 0; font-weight: bold; }
    h6 { font-size: 0.67em; margin: 2.33em 0; font-weight: bold; }
    ul, ol { padding-left: 40px; }
    ol { list-style-type: decimal; }
    dd { margin-left: 40px; }
    blockquote, figure { margin-left: 40px; margin-right: 40px; }
    b, strong, th, dt { font-weight: bold; }
    i, em, cite, dfn, var, address { font-style: italic; }
    pre, code, kbd, samp, tt { font-family: monospace; }
    pre { white-space: pre; }
    small { font-size: smaller; }
    big { font-size: larger; }
    sub { vertical-align: sub; font-size: smaller; }
    sup { vertical-align: super; font-size: smaller; }
    u, ins, abbr[title] { text-decoration: underline; }
    s, strike, del { text-decoration: line-through; }
    a:any-link { color: linktext; text-decoration: underline; cursor: pointer; }
    a:visited { color: visitedtext; }
    mark { background-color: yellow; color: black; }
    hr { border: 1px inset; margin: 0.5em auto; }
    center { text-align: center; }
";

// ─────────────────────────────────────────────────────────────────────────────
// Resolver
// ─────────────────────────────────────────────────────────────────────────────

/// Owns the stylesheets and configuration and computes element styles.
#[derive(Debug, Clone, Default)]
pub struct StyleResolver {
    config: StyleConfig,
    sheets: Vec<(Stylesheet, StyleOrigin)>,
}

impl StyleResolver {
    pub fn new(config: StyleConfig) -> Self {
        Self {
            config,
            sheets: Vec::new(),
        }
    }

    /// A resolver preloaded with [`DEFAULT_UA_CSS`].
    pub fn with_default_user_agent_sheet(config: StyleConfig) -> Self {
        let mut resolver = Self::new(config);
        resolver.add_stylesheet(Stylesheet::parse(DEFAULT_UA_CSS), StyleOrigin::UserAgent);
        resolver
    }

    /// Sheets are consulted in the order they were added.
    pub fn add_stylesheet(&mut self, sheet: Stylesheet, origin: StyleOrigin) {
        debug!(?origin, rules = sheet.len(), "stylesheet added");
        self.sheets.push((sheet, origin));
    }

    pub fn stylesheets(&self) -> &[(Stylesheet, StyleOrigin)] {
        &self.sheets
    }

    pub fn config(&self) -> &StyleConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: StyleConfig) {
        self.config = config;
    }

    /// Whether any sheet contains a `:has()` selector.
    pub fn uses_has(&self) -> bool {
        self.sheets.iter().any(|(sheet, _)| sheet.uses_has())
    }

    fn matching_context<E: TElement>(&self) -> MatchingContext<E> {
        MatchingContext {
            quirks_mode: self.config.quirks_mode,
            ..MatchingContext::default()
        }
    }

    /// Compute the style of `element` given its parent's computed style.
    pub fn resolve<E: TElement>(&self, element: E, parent: Option<&Arc<ComputedStyle>>) -> ComputedStyle {
        let ctx = self.matching_context();
        let inline = element.attr("style").map(StyleDeclaration::parse);
        let mut matched = self.collect_matching_rules(element, &ctx);
        if let Some(inline) = &inline {
            // Inline declarations sort after every author rule of equal importance.
            matched.push(MatchedRule {
                specificity: Specificity::new(u32::MAX, 0, 0),
                origin: StyleOrigin::Author,
                source_order: usize::MAX,
                declarations: inline,
            });
        }
        trace!(?element, rules = matched.len(), "matched rules");
        self.cascade(&matched, parent)
    }

    /// Style of `element::name`, or `None` when no rule targets it.
    /// `originating` is the element's own computed style.
    pub fn resolve_pseudo_element<E: TElement>(
        &self,
        element: E,
        name: &str,
        originating: &Arc<ComputedStyle>,
    ) -> Option<ComputedStyle> {
        let ctx = MatchingContext {
            quirks_mode: self.config.quirks_mode,
            ..MatchingContext::for_pseudo_element(name)
        };
        let matched = self.collect_matching_rules(element, &ctx);
        if matched.is_empty() {
            return None;
        }
        Some(self.cascade(&matched, Some(originating)))
    }

    /// Every rule matching `element`, in load order.
    pub fn collect_matching_rules<'a, E: TElement>(
        &'a self,
        element: E,
        ctx: &MatchingContext<E>,
    ) -> Vec<MatchedRule<'a>> {
        let mut matched = Vec::new();
        let mut source_order = 0usize;
        for (sheet, origin) in &self.sheets {
            self.collect_from(sheet, sheet.top_level(), *origin, element, ctx, &mut source_order, &mut matched);
        }
        matched
    }

    #[allow(clippy::too_many_arguments)]
    fn collect_from<'a, E: TElement>(
        &self,
        sheet: &'a Stylesheet,
        ids: &[RuleId],
        origin: StyleOrigin,
        element: E,
        ctx: &MatchingContext<E>,
        source_order: &mut usize,
        out: &mut Vec<MatchedRule<'a>>,
    ) {
        for &id in ids {
            let Some(rule) = sheet.rule(id) else { continue };
            match rule {
                CssRule::Style(style) => {
                    *source_order += 1;
                    if let Some(specificity) = matching_specificity(&style.selectors, element, ctx) {
                        out.push(MatchedRule {
                            specificity,
                            origin,
                            source_order: *source_order,
                            declarations: &style.declarations,
                        });
                    }
                }
                CssRule::Media(media) => {
                    if media.media.evaluate(&self.config.media_environment()) {
                        self.collect_from(sheet, &media.children, origin, element, ctx, source_order, out);
                    } else {
                        trace!(media = media.media.text(), "media query not satisfied");
                    }
                }
                CssRule::Supports(supports) => {
                    if supports.condition.evaluate(&supports_declaration) {
                        self.collect_from(sheet, &supports.children, origin, element, ctx, source_order, out);
                    }
                }
                // @layer and @container contents apply unconditionally.
                CssRule::GenericAt(generic) => {
                    self.collect_from(sheet, &generic.children, origin, element, ctx, source_order, out);
                }
                _ => {}
            }
        }
    }

    /// Run the cascade over `matched` and compute every property.
    pub fn cascade(&self, matched: &[MatchedRule<'_>], parent: Option<&Arc<ComputedStyle>>) -> ComputedStyle {
        let sorted = sort_declarations(matched);
        let parent_style = parent.map(|p| p.as_ref());

        let mut customs = CustomProperties::new(parent_style);
        for decl in sorted.iter().filter(|d| d.name.starts_with("--")) {
            customs.declare(decl.name, &decl.declaration.value);
        }

        let mut declared: HashMap<String, Declared> = HashMap::new();
        for decl in sorted.iter().filter(|d| !d.name.starts_with("--")) {
            let name = canonical_name(decl.name);
            apply_declared(&mut declared, &name, &decl.declaration.value, &mut customs);
        }

        let mut style = ComputedStyle::new(parent.cloned());
        self.compute_all(&mut style, parent_style, &declared, &mut customs);
        style
    }

    fn compute_all(
        &self,
        style: &mut ComputedStyle,
        parent: Option<&ComputedStyle>,
        declared: &HashMap<String, Declared>,
        customs: &mut CustomProperties<'_>,
    ) {
        let default_size = self.config.default_font_size;
        let parent_font_size = parent.map_or(default_size, ComputedStyle::font_size);
        let mut ctx = ComputeContext {
            font_size: parent_font_size,
            parent_font_size,
            root_font_size: parent.map_or(default_size, ComputedStyle::root_font_size),
            default_font_size: default_size,
            viewport_width: self.config.viewport_width,
            viewport_height: self.config.viewport_height,
            current_color: parent.map_or(CssColor::BLACK, ComputedStyle::color),
        };

        if let Some(parent) = parent {
            for (name, value) in parent.iter().filter(|(name, _)| name.starts_with("--")) {
                style.set(name, value.clone());
            }
        }
        for (name, value) in customs.resolved_all() {
            match value {
                Some(values) => style.set(&name, ComputedValue { raw: values, ..ComputedValue::default() }),
                None => style.remove(&name),
            }
        }

        // font-size feeds `em`, color feeds `currentcolor`.
        let font_size = match specified("font-size", declared, parent) {
            Specified::Declared(values) => compute_font_size(values, &ctx).or_else(|| parent.map(ComputedStyle::font_size)),
            Specified::Inherit => parent.map(ComputedStyle::font_size),
            Specified::Initial => None,
        }
        .unwrap_or(default_size);
        ctx.font_size = font_size;
        if parent.is_none() {
            ctx.root_font_size = font_size;
        }
        style.set("font-size", with_wide(ComputedValue::length(font_size), declared.get("font-size")));

        let color = self.compute_property("color", declared, parent, &ctx);
        let color = if color.color.is_some() {
            color
        } else {
            parent
                .and_then(|p| p.get("color").cloned())
                .unwrap_or_else(|| ComputedValue::color(CssColor::BLACK))
        };
        ctx.current_color = color.color.unwrap_or(CssColor::BLACK);
        style.set("color", with_wide(color, declared.get("color")));

        let mut names: Vec<&str> = PROPERTY_TABLE.iter().map(|p| p.name).collect();
        names.extend(declared.keys().map(String::as_str).filter(|n| !is_known_property(n)));
        for name in names {
            if name == "font-size" || name == "color" {
                continue;
            }
            let value = self.compute_property(name, declared, parent, &ctx);
            if value == ComputedValue::default() {
                style.remove(name);
            } else {
                style.set(name, with_wide(value, declared.get(name)));
            }
        }

        zero_hidden_border_widths(style);
    }

    fn compute_property(
        &self,
        name: &str,
        declared: &HashMap<String, Declared>,
        parent: Option<&ComputedStyle>,
        ctx: &ComputeContext,
    ) -> ComputedValue {
        let initial = || {
            property_default(name)
                .map(|p| compute_value(name, &parse_component_values(p.initial), ctx))
                .unwrap_or_default()
        };
        match specified(name, declared, parent) {
            Specified::Declared(values) => compute_value(name, values, ctx),
            Specified::Inherit => parent.and_then(|p| p.get(name).cloned()).unwrap_or_else(initial),
            Specified::Initial => initial(),
        }
    }
}

/// What the cascade produced for one longhand.
#[derive(Debug, Clone, PartialEq)]
enum Declared {
    Values(Vec<ComponentValue>),
    Wide(CssWideKeyword),
}

enum Specified<'a> {
    Declared(&'a [ComponentValue]),
    Inherit,
    Initial,
}

fn specified<'a>(name: &str, declared: &'a HashMap<String, Declared>, parent: Option<&ComputedStyle>) -> Specified<'a> {
    let inherit = if parent.is_some() { Specified::Inherit } else { Specified::Initial };
    match declared.get(name) {
        Some(Declared::Values(values)) => Specified::Declared(values),
        Some(Declared::Wide(CssWideKeyword::Inherit)) => inherit,
        Some(Declared::Wide(CssWideKeyword::Initial | CssWideKeyword::Revert)) => Specified::Initial,
        Some(Declared::Wide(CssWideKeyword::Unset)) | None => {
            if is_inherited(name) {
                inherit
            } else {
                Specified::Initial
            }
        }
    }
}

fn with_wide(mut value: ComputedValue, declared: Option<&Declared>) -> ComputedValue {
    if let Some(Declared::Wide(keyword)) = declared {
        value.wide_keyword = Some(*keyword);
    }
    value
}

/// Map `-webkit-foo` to `foo` when only the unprefixed name is known.
fn canonical_name(name: &str) -> String {
    if is_known_property(name) || is_shorthand(name) {
        return name.to_string();
    }
    for prefix in ["-webkit-", "-moz-", "-ms-", "-o-"] {
        if let Some(stripped) = name.strip_prefix(prefix) {
            if is_known_property(stripped) || is_shorthand(stripped) {
                return stripped.to_string();
            }
        }
    }
    name.to_string()
}

/// Record one declaration, expanding shorthands after `var()` substitution.
fn apply_declared(
    declared: &mut HashMap<String, Declared>,
    name: &str,
    value: &[ComponentValue],
    customs: &mut CustomProperties<'_>,
) {
    let targets: Vec<String> = match longhands(name) {
        Some(list) => list.iter().map(|s| s.to_string()).collect(),
        None => vec![name.to_string()],
    };
    if let Some(keyword) = CssWideKeyword::from_values(value) {
        for target in targets {
            declared.insert(target, Declared::Wide(keyword));
        }
        return;
    }
    let has_var = contains_var(value);
    let Some(substituted) = customs.substitute(value) else {
        trace!(property = name, "var() substitution failed; treating as unset");
        for target in targets {
            declared.insert(target, Declared::Wide(CssWideKeyword::Unset));
        }
        return;
    };
    if let Some(keyword) = CssWideKeyword::from_values(&substituted) {
        for target in targets {
            declared.insert(target, Declared::Wide(keyword));
        }
        return;
    }
    match expand(name, &substituted) {
        Expansion::NotShorthand => {
            declared.insert(name.to_string(), Declared::Values(substituted));
        }
        Expansion::Longhands(list) => {
            for (longhand, values) in list {
                declared.insert(longhand.to_string(), Declared::Values(values));
            }
        }
        Expansion::Invalid if has_var => {
            for target in targets {
                declared.insert(target, Declared::Wide(CssWideKeyword::Unset));
            }
        }
        Expansion::Invalid => debug!(property = name, "dropping invalid shorthand value"),
    }
}

/// Computed border and outline widths are 0 when the style is none or hidden.
fn zero_hidden_border_widths(style: &mut ComputedStyle) {
    for (width, border_style) in [
        ("border-top-width", "border-top-style"),
        ("border-right-width", "border-right-style"),
        ("border-bottom-width", "border-bottom-style"),
        ("border-left-width", "border-left-style"),
        ("outline-width", "outline-style"),
    ] {
        let hidden = style
            .get(border_style)
            .and_then(|v| v.keyword.as_deref())
            .is_some_and(|k| k == "none" || k == "hidden");
        if hidden {
            let wide = style.get(width).and_then(|v| v.wide_keyword);
            style.set(width, ComputedValue { wide_keyword: wide, ..ComputedValue::length(0.0) });
        }
    }
}

/// `@supports (property: value)`: known longhands, shorthands and custom
/// properties with a non-empty value.
pub fn supports_declaration(property: &str, value: &str) -> bool {
    let property = property.trim().to_ascii_lowercase();
    let known = property.starts_with("--") || is_known_property(&property) || is_shorthand(&property);
    if !known || value.trim().is_empty() {
        return false;
    }
    match expand(&property, &parse_component_values(value)) {
        Expansion::Invalid => false,
        _ => true,
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Custom properties and var()
// ─────────────────────────────────────────────────────────────────────────────

fn is_var(name: &str) -> bool {
    name.eq_ignore_ascii_case("var")
}

fn contains_var(values: &[ComponentValue]) -> bool {
    values.iter().any(|v| match v {
        ComponentValue::Function { name, values } => is_var(name) || contains_var(values),
        ComponentValue::Block { values, .. } => contains_var(values),
        ComponentValue::Preserved(_) => false,
    })
}

/// Custom properties of one element. Declared values are substituted
/// lazily; a property that reaches itself through `var()` is invalid.
struct CustomProperties<'a> {
    parent: Option<&'a ComputedStyle>,
    /// Cascade winners. `None` marks an explicit `initial`.
    declared: HashMap<String, Option<Vec<ComponentValue>>>,
    resolved: HashMap<String, Option<Vec<ComponentValue>>>,
    in_progress: HashSet<String>,
}

impl<'a> CustomProperties<'a> {
    fn new(parent: Option<&'a ComputedStyle>) -> Self {
        Self {
            parent,
            declared: HashMap::new(),
            resolved: HashMap::new(),
            in_progress: HashSet::new(),
        }
    }

    fn declare(&mut self, name: &str, value: &[ComponentValue]) {
        match CssWideKeyword::from_values(value) {
            Some(CssWideKeyword::Inherit | CssWideKeyword::Unset) => {
                self.declared.remove(name);
            }
            Some(CssWideKeyword::Initial | CssWideKeyword::Revert) => {
                self.declared.insert(name.to_string(), None);
            }
            None => {
                self.declared.insert(name.to_string(), Some(trim(value)));
            }
        }
    }

    fn lookup(&mut self, name: &str) -> Option<Vec<ComponentValue>> {
        if let Some(done) = self.resolved.get(name) {
            return done.clone();
        }
        let Some(declared) = self.declared.get(name).cloned() else {
            return self.parent.and_then(|p| p.custom_property(name)).map(<[_]>::to_vec);
        };
        let Some(raw) = declared else {
            return None;
        };
        if !self.in_progress.insert(name.to_string()) {
            debug!(property = name, "custom property cycle");
            return None;
        }
        let value = self.substitute(&raw);
        self.in_progress.remove(name);
        self.resolved.insert(name.to_string(), value.clone());
        value
    }

    /// Replace every `var()` in `values`. `None` when a reference has
    /// neither a value nor a fallback.
    fn substitute(&mut self, values: &[ComponentValue]) -> Option<Vec<ComponentValue>> {
        let mut out = Vec::with_capacity(values.len());
        for value in values {
            match value {
                ComponentValue::Function { name, values: args } if is_var(name) => {
                    out.extend(self.substitute_var(args)?);
                }
                ComponentValue::Function { name, values: args } => out.push(ComponentValue::Function {
                    name: name.clone(),
                    values: self.substitute(args)?,
                }),
                ComponentValue::Block { kind, values: inner } => out.push(ComponentValue::Block {
                    kind: *kind,
                    values: self.substitute(inner)?,
                }),
                ComponentValue::Preserved(_) => out.push(value.clone()),
            }
        }
        Some(out)
    }

    fn substitute_var(&mut self, args: &[ComponentValue]) -> Option<Vec<ComponentValue>> {
        let mut parts = args.splitn(2, |v| matches!(v.token(), Some(css::TokenKind::Comma)));
        let name_part = parts.next()?;
        let fallback = parts.next();
        let name = name_part
            .iter()
            .find(|v| !v.is_whitespace())
            .and_then(ComponentValue::ident)
            .filter(|n| n.starts_with("--"))?
            .to_string();
        if let Some(value) = self.lookup(&name) {
            return Some(value);
        }
        let fallback = self.substitute(fallback?)?;
        Some(trim(&fallback))
    }

    /// Every custom property this element ends up with, by name.
    fn resolved_all(&mut self) -> Vec<(String, Option<Vec<ComponentValue>>)> {
        let mut names: Vec<String> = self.declared.keys().cloned().collect();
        names.sort();
        names.into_iter().map(|name| {
            let value = self.lookup(&name);
            (name, value)
        }).collect()
    }
}

fn trim(values: &[ComponentValue]) -> Vec<ComponentValue> {
    let start = values.iter().take_while(|v| v.is_whitespace()).count();
    let rest = &values[start..];
    let end = rest.len() - rest.iter().rev().take_while(|v| v.is_whitespace()).count();
    rest[..end].to_vec()
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::DomElement;
    use css::MediaType;
    use dom::{Attr, Dom, HTML_NAMESPACE, NodeId, QuirksMode};

    /// document > html > body > div#main.test > span
    struct Fixture {
        dom: Dom,
        html: NodeId,
        body: NodeId,
        div: NodeId,
        span: NodeId,
    }

    fn fixture() -> Fixture {
        let mut dom = Dom::new();
        let doc = dom.create_document(QuirksMode::NoQuirks);
        let html = dom.create_html_element("html");
        let body = dom.create_html_element("body");
        let div = dom.create_element(
            "div",
            HTML_NAMESPACE,
            vec![Attr::new("id", "main"), Attr::new("class", "test")],
        );
        let span = dom.create_html_element("span");
        dom.append_child(doc, html);
        dom.append_child(html, body);
        dom.append_child(body, div);
        dom.append_child(div, span);
        Fixture { dom, html, body, div, span }
    }

    fn author(css: &str) -> StyleResolver {
        let mut resolver = StyleResolver::new(StyleConfig::default());
        resolver.add_stylesheet(Stylesheet::parse(css), StyleOrigin::Author);
        resolver
    }

    /// Resolve the chain html > body > div > span and return every style.
    fn styles(resolver: &StyleResolver, f: &Fixture) -> Vec<Arc<ComputedStyle>> {
        let mut parent: Option<Arc<ComputedStyle>> = None;
        let mut out = Vec::new();
        for id in [f.html, f.body, f.div, f.span] {
            let el = DomElement::new(&f.dom, id).unwrap();
            let style = Arc::new(resolver.resolve(el, parent.as_ref()));
            out.push(style.clone());
            parent = Some(style);
        }
        out
    }

    fn keyword(style: &ComputedStyle, name: &str) -> String {
        style.get_property_value(name).keyword
    }

    #[test]
    fn test_layers() {
        assert!(cascade_layer(StyleOrigin::Author, false) > cascade_layer(StyleOrigin::User, false));
        assert!(cascade_layer(StyleOrigin::Author, true) > cascade_layer(StyleOrigin::Author, false));
        assert!(cascade_layer(StyleOrigin::UserAgent, true) > cascade_layer(StyleOrigin::User, true));
    }

    #[test]
    fn test_id_beats_class_beats_type() {
        let f = fixture();
        let r = author("#main { color: green } .test { color: blue } div { color: red }");
        let s = styles(&r, &f);
        assert_eq!(s[2].color(), CssColor::rgb(0, 128, 0));
    }

    #[test]
    fn test_selector_list_sorts_with_its_highest_alternative() {
        let f = fixture();
        // `div` alone matches, but the rule carries the (1,0,0) of `#nomatch`.
        let r = author("#nomatch, div { color: red } .test { color: blue }");
        assert_eq!(styles(&r, &f)[2].color(), CssColor::rgb(255, 0, 0));
        let r = author(".test { color: blue } #nomatch, div { color: red }");
        assert_eq!(styles(&r, &f)[2].color(), CssColor::rgb(255, 0, 0));
        let matched = r.collect_matching_rules(DomElement::new(&f.dom, f.div).unwrap(), &MatchingContext::new());
        assert_eq!(matched.last().map(|m| m.specificity), Some(Specificity::new(1, 0, 0)));
    }

    #[test]
    fn test_extreme_nth_offset_does_not_abort_resolution() {
        let f = fixture();
        let r = author(":nth-child(n-2147483647) { color: red } :nth-child(-n-2147483647) { width: 5px }");
        let s = styles(&r, &f);
        assert_eq!(s[3].color(), CssColor::rgb(255, 0, 0));
        assert_eq!(keyword(&s[3], "width"), "auto");
    }

    #[test]
    fn test_important_beats_specificity() {
        let f = fixture();
        let r = author(".test { color: blue !important } #main { color: red }");
        assert_eq!(styles(&r, &f)[2].color(), CssColor::rgb(0, 0, 255));
    }

    #[test]
    fn test_source_order_tiebreak() {
        let f = fixture();
        let r = author("div { width: 10px } div { width: 20px }");
        assert_eq!(styles(&r, &f)[2].get_property_value("width").length_px, 20.0);
    }

    #[test]
    fn test_origin_ordering() {
        let f = fixture();
        let mut r = StyleResolver::new(StyleConfig::default());
        r.add_stylesheet(Stylesheet::parse("#main { display: flex } div { float: left !important }"), StyleOrigin::UserAgent);
        r.add_stylesheet(Stylesheet::parse("div { display: grid; float: right !important }"), StyleOrigin::Author);
        let s = styles(&r, &f);
        assert_eq!(keyword(&s[2], "display"), "grid");
        assert_eq!(keyword(&s[2], "float"), "left");
    }

    #[test]
    fn test_inheritance_and_initial() {
        let f = fixture();
        let r = author("div { color: red; display: block; margin-top: 5px } span { display: initial }");
        let s = styles(&r, &f);
        assert_eq!(s[3].color(), CssColor::rgb(255, 0, 0));
        assert_eq!(keyword(&s[3], "display"), "inline");
        assert_eq!(s[3].get_property_value("margin-top").length_px, 0.0);
        assert_eq!(s[3].get("display").and_then(|v| v.wide_keyword), Some(CssWideKeyword::Initial));
    }

    #[test]
    fn test_inherit_unset_revert() {
        let f = fixture();
        let r = author(
            "div { border-top-style: solid; width: 50px; color: blue }
             span { width: inherit; color: unset; border-top-style: unset; float: revert }",
        );
        let s = styles(&r, &f);
        assert_eq!(s[3].get_property_value("width").length_px, 50.0);
        assert_eq!(s[3].color(), CssColor::rgb(0, 0, 255));
        assert_eq!(keyword(&s[3], "border-top-style"), "none");
        assert_eq!(keyword(&s[3], "float"), "none");
    }

    #[test]
    fn test_defaults_without_rules() {
        let f = fixture();
        let s = styles(&author(""), &f);
        assert_eq!(keyword(&s[0], "display"), "inline");
        assert_eq!(s[0].font_size(), 16.0);
        assert_eq!(s[0].color(), CssColor::BLACK);
        assert_eq!(s[0].get_property_value("border-top-color").color, Some(CssColor::BLACK));
        // medium border widths collapse to 0 under border-style: none.
        assert_eq!(s[0].get_property_value("border-left-width").length_px, 0.0);
        assert_eq!(s[0].get_property_value("background-color").color, Some(CssColor::TRANSPARENT));
    }

    #[test]
    fn test_inline_style() {
        let mut f = fixture();
        f.dom.set_attribute(f.div, "style", "color: purple; width: 7px");
        let r = author("#main { color: red } div { width: 3px !important }");
        let s = styles(&r, &f);
        assert_eq!(s[2].color(), CssColor::rgb(128, 0, 128));
        assert_eq!(s[2].get_property_value("width").length_px, 3.0);
    }

    #[test]
    fn test_relative_units() {
        let f = fixture();
        let r = author(
            "html { font-size: 20px } body { font-size: 0.5em } div { font-size: 150%; width: 2rem; height: 2em }
             span { line-height: 150%; margin-left: 10vw }",
        );
        let s = styles(&r, &f);
        assert_eq!(s[1].font_size(), 10.0);
        assert_eq!(s[2].font_size(), 15.0);
        assert_eq!(s[2].get_property_value("width").length_px, 40.0);
        assert_eq!(s[2].get_property_value("height").length_px, 30.0);
        assert_eq!(s[3].get_property_value("line-height").length_px, 22.5);
        assert_eq!(s[3].get_property_value("margin-left").length_px, 128.0);
    }

    #[test]
    fn test_shorthands_in_cascade() {
        let f = fixture();
        let r = author("div { margin: 1px 2px; border: 3px solid red; margin-left: 9px; font: bold 20px serif }");
        let s = &styles(&r, &f)[2];
        assert_eq!(s.get_property_value("margin-top").length_px, 1.0);
        assert_eq!(s.get_property_value("margin-right").length_px, 2.0);
        assert_eq!(s.get_property_value("margin-left").length_px, 9.0);
        assert_eq!(s.get_property_value("border-bottom-width").length_px, 3.0);
        assert_eq!(s.get_property_value("border-left-color").color, Some(CssColor::rgb(255, 0, 0)));
        assert_eq!(s.font_size(), 20.0);
        assert_eq!(keyword(s, "font-weight"), "bold");
    }

    #[test]
    fn test_currentcolor() {
        let f = fixture();
        let r = author("div { color: blue; border-top-color: currentcolor; outline-color: currentColor }");
        let s = &styles(&r, &f)[2];
        assert_eq!(s.get_property_value("border-top-color").color, Some(CssColor::rgb(0, 0, 255)));
        assert_eq!(s.get_property_value("outline-color").color, Some(CssColor::rgb(0, 0, 255)));
    }

    #[test]
    fn test_custom_properties() {
        let f = fixture();
        let r = author(
            "html { --gap: 4px; --brand: red }
             div { --gap: 6px; margin: var(--gap) var(--missing, 1px); color: var(--brand) }
             span { width: var(--nope); padding-top: var(--gap) }",
        );
        let s = styles(&r, &f);
        assert_eq!(s[2].get_property_value("margin-top").length_px, 6.0);
        assert_eq!(s[2].get_property_value("margin-right").length_px, 1.0);
        assert_eq!(s[2].color(), CssColor::rgb(255, 0, 0));
        assert_eq!(s[3].get_property_value("padding-top").length_px, 6.0);
        // Invalid at computed-value time: width falls back to its initial value.
        assert_eq!(keyword(&s[3], "width"), "auto");
        assert_eq!(s[1].css_text("--brand"), "red");
    }

    #[test]
    fn test_custom_property_cycle() {
        let f = fixture();
        let r = author("div { --a: var(--b); --b: var(--a); width: var(--a, 5px); height: var(--c, 3px) }");
        let s = &styles(&r, &f)[2];
        assert!(s.get("--a").is_none());
        assert_eq!(s.get_property_value("width").length_px, 5.0);
        assert_eq!(s.get_property_value("height").length_px, 3.0);
    }

    #[test]
    fn test_media_and_supports() {
        let f = fixture();
        let css = "@media (min-width: 1000px) { div { width: 1px } }
                   @media print { div { height: 1px } }
                   @supports (display: grid) { div { display: grid } }
                   @supports (no-such: thing) { div { float: left } }
                   @layer base { div { opacity: 0.5 } }";
        let s = &styles(&author(css), &f)[2];
        assert_eq!(s.get_property_value("width").length_px, 1.0);
        assert_eq!(keyword(s, "height"), "auto");
        assert_eq!(keyword(s, "display"), "grid");
        assert_eq!(keyword(s, "float"), "none");
        assert_eq!(s.get("opacity").and_then(|v| v.number), Some(0.5));

        let mut print = StyleResolver::new(StyleConfig::default().with_media_type(MediaType::Print).with_viewport(500.0, 500.0));
        print.add_stylesheet(Stylesheet::parse(css), StyleOrigin::Author);
        let s = &styles(&print, &f)[2];
        assert_eq!(keyword(s, "width"), "auto");
        assert_eq!(s.get_property_value("height").length_px, 1.0);
    }

    #[test]
    fn test_vendor_prefix_and_unknown_properties() {
        let f = fixture();
        let r = author("div { -webkit-flex-direction: column; frobnicate: 12px wide }");
        let s = &styles(&r, &f)[2];
        assert_eq!(keyword(s, "flex-direction"), "column");
        assert_eq!(s.css_text("frobnicate"), "12px wide");
        assert_eq!(s.get_property_value("frobnicate").length_px, 0.0);
    }

    #[test]
    fn test_pseudo_elements() {
        let f = fixture();
        let r = author("div::before { content: \"x\"; color: red } div { color: blue }");
        let s = styles(&r, &f);
        let div = DomElement::new(&f.dom, f.div).unwrap();
        let before = r.resolve_pseudo_element(div, "before", &s[2]).unwrap();
        assert_eq!(before.color(), CssColor::rgb(255, 0, 0));
        assert_eq!(s[2].color(), CssColor::rgb(0, 0, 255));
        assert!(r.resolve_pseudo_element(div, "::after", &s[2]).is_none());
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let f = fixture();
        let r = author("div { color: red; margin: 1em; --x: 2px } span { width: var(--x) }");
        let a = styles(&r, &f);
        let b = styles(&r, &f);
        assert_eq!(a, b);
    }

    #[test]
    fn test_default_user_agent_sheet() {
        let f = fixture();
        let r = StyleResolver::with_default_user_agent_sheet(StyleConfig::default());
        let s = styles(&r, &f);
        assert_eq!(keyword(&s[1], "display"), "block");
        assert_eq!(s[1].get_property_value("margin-top").length_px, 8.0);
        assert_eq!(keyword(&s[3], "display"), "inline");
    }

    #[test]
    fn test_supports_declaration() {
        assert!(supports_declaration("display", "flex"));
        assert!(supports_declaration("margin", "1px"));
        assert!(supports_declaration("--anything", "x"));
        assert!(!supports_declaration("display", ""));
        assert!(!supports_declaration("nope", "1"));
        assert!(!supports_declaration("margin", "1px 2px 3px 4px 5px"));
    }
}
