//! Selector matching against [`TElement`]s.
//!
//! Complex selectors are matched right to left: the subject compound must
//! match the element, then each combinator picks the next element to test.
//! Descendant and subsequent-sibling steps commit to the nearest match and
//! never revisit other candidates. `:has()` runs the other way, searching
//! forward from the anchor through its descendants or following siblings.

use css::{
    AttrOperator, AttributeMatcher, Combinator, ComplexSelector, CompoundSelector, NamespaceConstraint,
    PseudoClassSelector, SelectorList, Specificity, TypeSelector,
};
use dom::{ElementState, QuirksMode};
use tracing::trace;

use crate::element::TElement;

/// Per-call matching state.
#[derive(Debug, Clone)]
pub struct MatchingContext<E> {
    /// Element `:scope` refers to; the root element when absent.
    pub scope: Option<E>,
    /// Lowercased pseudo-element being styled. Selectors only match when
    /// their pseudo-element equals this.
    pub pseudo_element: Option<String>,
    /// Match classes and IDs case-insensitively even in a no-quirks document.
    pub quirks_mode: bool,
}

impl<E> Default for MatchingContext<E> {
    fn default() -> Self {
        Self {
            scope: None,
            pseudo_element: None,
            quirks_mode: false,
        }
    }
}

impl<E: TElement> MatchingContext<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_scope(scope: E) -> Self {
        Self {
            scope: Some(scope),
            ..Self::default()
        }
    }

    pub fn for_pseudo_element(name: &str) -> Self {
        Self {
            pseudo_element: Some(name.trim_start_matches(':').to_ascii_lowercase()),
            ..Self::default()
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Public API
// ─────────────────────────────────────────────────────────────────────────────

/// Whether any alternative of `list` matches `element`.
pub fn matches_selector_list<E: TElement>(list: &SelectorList, element: E, ctx: &MatchingContext<E>) -> bool {
    list.selectors.iter().any(|s| matches_complex(s, element, ctx))
}

/// Specificity a matching rule sorts with: the highest over the whole
/// list once any alternative matches, or `None` when none does.
pub fn matching_specificity<E: TElement>(
    list: &SelectorList,
    element: E,
    ctx: &MatchingContext<E>,
) -> Option<Specificity> {
    matches_selector_list(list, element, ctx).then(|| list.specificity())
}

/// Match one complex selector, honoring the context's pseudo-element.
pub fn matches_complex<E: TElement>(selector: &ComplexSelector, element: E, ctx: &MatchingContext<E>) -> bool {
    if selector.pseudo_element() != ctx.pseudo_element.as_deref() {
        return false;
    }
    let Some((_, ancestors)) = selector.compounds.split_last() else {
        return false;
    };
    if ancestors.iter().any(|c| c.pseudo_element.is_some()) {
        return false;
    }
    matches_chain(selector, element, ctx)
}

/// Match every simple selector of `compound` except its pseudo-element.
pub fn matches_compound<E: TElement>(compound: &CompoundSelector, element: E, ctx: &MatchingContext<E>) -> bool {
    if let Some(ty) = &compound.type_selector {
        if !matches_type(ty, element) {
            return false;
        }
    }

    if !compound.ids.is_empty() || !compound.classes.is_empty() {
        let quirks = ctx.quirks_mode || element.quirks_mode() == QuirksMode::Quirks;
        let id_ok = compound
            .ids
            .iter()
            .all(|id| element.id().is_some_and(|own| eq_case(own, id, quirks)));
        if !id_ok || !compound.classes.iter().all(|c| element.has_class(c, quirks)) {
            return false;
        }
    }

    compound.attributes.iter().all(|a| matches_attribute(a, element))
        && compound
            .pseudo_classes
            .iter()
            .all(|pc| matches_pseudo_class(pc, element, ctx))
}

// ─────────────────────────────────────────────────────────────────────────────
// Combinators
// ─────────────────────────────────────────────────────────────────────────────

fn matches_chain<E: TElement>(selector: &ComplexSelector, element: E, ctx: &MatchingContext<E>) -> bool {
    let Some((subject, rest)) = selector.compounds.split_last() else {
        return false;
    };
    if !matches_compound(subject, element, ctx) {
        return false;
    }

    let mut current = element;
    for compound in rest.iter().rev() {
        let Some(combinator) = compound.combinator else {
            return false;
        };
        let next = match combinator {
            Combinator::Descendant => {
                let mut cursor = current.parent_element();
                while let Some(ancestor) = cursor {
                    if matches_compound(compound, ancestor, ctx) {
                        break;
                    }
                    cursor = ancestor.parent_element();
                }
                cursor
            }
            Combinator::Child => current.parent_element().filter(|p| matches_compound(compound, *p, ctx)),
            Combinator::NextSibling => current
                .prev_sibling_element()
                .filter(|s| matches_compound(compound, *s, ctx)),
            Combinator::SubsequentSibling => {
                let mut cursor = current.prev_sibling_element();
                while let Some(sibling) = cursor {
                    if matches_compound(compound, sibling, ctx) {
                        break;
                    }
                    cursor = sibling.prev_sibling_element();
                }
                cursor
            }
            // Table columns are not modeled.
            Combinator::Column => None,
        };
        match next {
            Some(el) => current = el,
            None => return false,
        }
    }
    true
}

/// Alternatives nested in a pseudo-class ignore pseudo-element filtering.
fn matches_nested<E: TElement>(list: &SelectorList, element: E, ctx: &MatchingContext<E>) -> bool {
    list.selectors.iter().any(|s| matches_chain(s, element, ctx))
}

fn matches_has<E: TElement>(list: &SelectorList, anchor: E, ctx: &MatchingContext<E>) -> bool {
    list.selectors.iter().any(|relative| {
        let leading = relative.leading_combinator.unwrap_or(Combinator::Descendant);
        matches_forward(relative, 0, leading, anchor, ctx)
    })
}

/// Try to match `compounds[index..]` starting from the elements reached
/// from `from` through `combinator`.
fn matches_forward<E: TElement>(
    relative: &ComplexSelector,
    index: usize,
    combinator: Combinator,
    from: E,
    ctx: &MatchingContext<E>,
) -> bool {
    let Some(compound) = relative.compounds.get(index) else {
        return true;
    };
    forward_candidates(from, combinator).into_iter().any(|candidate| {
        if !matches_compound(compound, candidate, ctx) {
            return false;
        }
        match compound.combinator {
            Some(next) => matches_forward(relative, index + 1, next, candidate, ctx),
            None => true,
        }
    })
}

fn forward_candidates<E: TElement>(from: E, combinator: Combinator) -> Vec<E> {
    let mut out = Vec::new();
    match combinator {
        Combinator::Descendant => {
            let mut stack: Vec<E> = children(from).into_iter().rev().collect();
            while let Some(el) = stack.pop() {
                out.push(el);
                stack.extend(children(el).into_iter().rev());
            }
        }
        Combinator::Child => out = children(from),
        Combinator::NextSibling => out.extend(from.next_sibling_element()),
        Combinator::SubsequentSibling => {
            let mut cursor = from.next_sibling_element();
            while let Some(el) = cursor {
                out.push(el);
                cursor = el.next_sibling_element();
            }
        }
        Combinator::Column => {}
    }
    out
}

fn children<E: TElement>(parent: E) -> Vec<E> {
    let mut out = Vec::new();
    let mut cursor = parent.first_element_child();
    while let Some(el) = cursor {
        out.push(el);
        cursor = el.next_sibling_element();
    }
    out
}

// ─────────────────────────────────────────────────────────────────────────────
// Simple selectors
// ─────────────────────────────────────────────────────────────────────────────

fn eq_case(a: &str, b: &str, case_insensitive: bool) -> bool {
    if case_insensitive {
        a.eq_ignore_ascii_case(b)
    } else {
        a == b
    }
}

fn matches_namespace(constraint: &NamespaceConstraint, namespace: Option<&str>) -> bool {
    match constraint {
        NamespaceConstraint::Any => true,
        NamespaceConstraint::NoNamespace => namespace.is_none_or(str::is_empty),
        NamespaceConstraint::Uri(uri) => namespace == Some(uri.as_str()),
    }
}

/// HTML elements compare the lowercased name; other namespaces are
/// case-sensitive.
fn matches_type<E: TElement>(ty: &TypeSelector, element: E) -> bool {
    if !matches_namespace(&ty.namespace, Some(element.namespace())) {
        return false;
    }
    if ty.is_universal() {
        return true;
    }
    if element.is_html_element() {
        element.local_name().eq_ignore_ascii_case(&ty.lower_name)
    } else {
        element.local_name() == ty.name
    }
}

fn matches_attribute<E: TElement>(matcher: &AttributeMatcher, element: E) -> bool {
    let html = element.is_html_element();
    element.attributes().iter().any(|attr| {
        matches_namespace(&matcher.namespace, attr.namespace)
            && eq_case(attr.local_name, &matcher.name, html)
            && attr_value_matches(matcher.operator, attr.value, &matcher.value, matcher.case_insensitive)
    })
}

fn attr_value_matches(op: AttrOperator, actual: &str, expected: &str, ci: bool) -> bool {
    let fold = |s: &str| if ci { s.to_ascii_lowercase() } else { s.to_string() };
    match op {
        AttrOperator::Exists => true,
        AttrOperator::Equals => eq_case(actual, expected, ci),
        AttrOperator::Includes => {
            !expected.is_empty()
                && !expected.contains(|c: char| c.is_ascii_whitespace())
                && actual.split_ascii_whitespace().any(|word| eq_case(word, expected, ci))
        }
        AttrOperator::DashMatch => {
            eq_case(actual, expected, ci)
                || (actual.len() > expected.len()
                    && actual.as_bytes()[expected.len()] == b'-'
                    && actual.get(..expected.len()).is_some_and(|p| eq_case(p, expected, ci)))
        }
        AttrOperator::Prefix => !expected.is_empty() && fold(actual).starts_with(&fold(expected)),
        AttrOperator::Suffix => !expected.is_empty() && fold(actual).ends_with(&fold(expected)),
        AttrOperator::Substring => !expected.is_empty() && fold(actual).contains(&fold(expected)),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Pseudo-classes
// ─────────────────────────────────────────────────────────────────────────────

fn matches_pseudo_class<E: TElement>(pc: &PseudoClassSelector, element: E, ctx: &MatchingContext<E>) -> bool {
    let state = element.state();
    match pc.name.as_str() {
        "not" => pc.selector.as_ref().is_some_and(|s| !matches_nested(s, element, ctx)),
        "is" | "where" | "matches" | "-webkit-any" => {
            pc.selector.as_ref().is_some_and(|s| matches_nested(s, element, ctx))
        }
        "has" => pc.selector.as_ref().is_some_and(|s| matches_has(s, element, ctx)),

        "root" => element.is_root(),
        "scope" => match ctx.scope {
            Some(scope) => scope == element,
            None => element.is_root(),
        },

        "first-child" => element.prev_sibling_element().is_none(),
        "last-child" => element.next_sibling_element().is_none(),
        "only-child" => element.prev_sibling_element().is_none() && element.next_sibling_element().is_none(),
        "first-of-type" => sibling_position(element, false, Some(element), None, ctx) == 1,
        "last-of-type" => sibling_position(element, true, Some(element), None, ctx) == 1,
        "only-of-type" => {
            sibling_position(element, false, Some(element), None, ctx) == 1
                && sibling_position(element, true, Some(element), None, ctx) == 1
        }
        "nth-child" | "nth-last-child" | "nth-of-type" | "nth-last-of-type" => matches_nth(pc, element, ctx),
        "empty" => element.is_empty(),

        "link" => is_link(element) && !state.contains(ElementState::VISITED),
        "visited" => is_link(element) && state.contains(ElementState::VISITED),
        "any-link" => is_link(element),
        "hover" => state.contains(ElementState::HOVER),
        "active" => state.contains(ElementState::ACTIVE),
        "focus" => state.contains(ElementState::FOCUS),
        "focus-visible" => state.contains(ElementState::FOCUS_VISIBLE),
        "focus-within" => state.intersects(ElementState::FOCUS | ElementState::FOCUS_WITHIN),

        "checked" => is_checked(element),
        "indeterminate" => state.contains(ElementState::INDETERMINATE),
        "disabled" => is_form_control(element) && is_disabled(element),
        "enabled" => is_form_control(element) && !is_disabled(element),
        "required" => is_required_capable(element) && element.has_attr("required"),
        "optional" => is_required_capable(element) && !element.has_attr("required"),
        "read-write" => is_read_write(element),
        "read-only" => !is_read_write(element),
        "placeholder-shown" => is_placeholder_shown(element),
        "lang" => pc.argument.as_deref().is_some_and(|arg| matches_lang(element, arg)),
        "defined" => {
            !element.is_html_element()
                || !element.local_name().contains('-')
                || state.contains(ElementState::DEFINED)
        }
        other => {
            trace!(pseudo_class = other, "unsupported pseudo-class never matches");
            false
        }
    }
}

fn matches_nth<E: TElement>(pc: &PseudoClassSelector, element: E, ctx: &MatchingContext<E>) -> bool {
    let Some(nth) = pc.nth else {
        return false;
    };
    let from_end = pc.name.starts_with("nth-last");
    let of_type = pc.name.ends_with("of-type");
    let filter = pc.selector.as_ref();
    if let Some(list) = filter {
        if !matches_nested(list, element, ctx) {
            return false;
        }
    }
    let same_type = of_type.then_some(element);
    nth.matches(sibling_position(element, from_end, same_type, filter, ctx))
}

/// 1-based position of `element` among its sibling elements, counting from
/// the end when `from_end`. Only siblings of the same type as `same_type`,
/// or matching `filter`, are counted when those are given.
fn sibling_position<E: TElement>(
    element: E,
    from_end: bool,
    same_type: Option<E>,
    filter: Option<&SelectorList>,
    ctx: &MatchingContext<E>,
) -> i32 {
    let step = |el: E| {
        if from_end {
            el.next_sibling_element()
        } else {
            el.prev_sibling_element()
        }
    };
    let mut position = 1;
    let mut cursor = step(element);
    while let Some(sibling) = cursor {
        let counted = match (same_type, filter) {
            (Some(ty), _) => sibling.local_name() == ty.local_name() && sibling.namespace() == ty.namespace(),
            (None, Some(list)) => matches_nested(list, sibling, ctx),
            (None, None) => true,
        };
        if counted {
            position += 1;
        }
        cursor = step(sibling);
    }
    position
}

fn html_named<E: TElement>(element: E, names: &[&str]) -> bool {
    element.is_html_element() && names.contains(&element.local_name())
}

fn is_link<E: TElement>(element: E) -> bool {
    html_named(element, &["a", "area", "link"]) && element.has_attr("href")
}

fn is_form_control<E: TElement>(element: E) -> bool {
    html_named(element, &["button", "input", "select", "textarea", "optgroup", "option", "fieldset"])
}

fn is_disabled<E: TElement>(element: E) -> bool {
    if element.has_attr("disabled") {
        return true;
    }
    html_named(element, &["option"])
        && element
            .parent_element()
            .is_some_and(|p| html_named(p, &["optgroup"]) && p.has_attr("disabled"))
}

fn input_type<E: TElement>(element: E) -> String {
    element.attr("type").unwrap_or("text").to_ascii_lowercase()
}

fn is_checked<E: TElement>(element: E) -> bool {
    if element.state().contains(ElementState::CHECKED) {
        return true;
    }
    if html_named(element, &["input"]) {
        return matches!(input_type(element).as_str(), "checkbox" | "radio") && element.has_attr("checked");
    }
    html_named(element, &["option"]) && element.has_attr("selected")
}

fn is_required_capable<E: TElement>(element: E) -> bool {
    html_named(element, &["input", "select", "textarea"])
}

fn is_read_write<E: TElement>(element: E) -> bool {
    if html_named(element, &["textarea"]) {
        return !element.has_attr("readonly") && !element.has_attr("disabled");
    }
    if html_named(element, &["input"]) {
        let text_like = !matches!(
            input_type(element).as_str(),
            "checkbox" | "radio" | "button" | "submit" | "reset" | "hidden" | "image" | "file" | "range" | "color"
        );
        return text_like && !element.has_attr("readonly") && !element.has_attr("disabled");
    }
    element.is_html_element()
        && element
            .attr("contenteditable")
            .is_some_and(|v| v.is_empty() || v.eq_ignore_ascii_case("true") || v.eq_ignore_ascii_case("plaintext-only"))
}

fn is_placeholder_shown<E: TElement>(element: E) -> bool {
    if !element.has_attr("placeholder") {
        return false;
    }
    if html_named(element, &["input"]) {
        return element.attr("value").is_none_or(str::is_empty);
    }
    html_named(element, &["textarea"]) && element.is_empty()
}

/// `:lang(a, "b")`: the nearest `lang` attribute equals a range or starts
/// with it followed by `-`. `*` matches any language.
fn matches_lang<E: TElement>(element: E, argument: &str) -> bool {
    let mut cursor = Some(element);
    let mut lang = None;
    while let Some(el) = cursor {
        let own = el
            .attributes()
            .iter()
            .find(|a| {
                (a.namespace.is_none() && a.local_name.eq_ignore_ascii_case("lang"))
                    || (a.namespace == Some("http://www.w3.org/XML/1998/namespace") && a.local_name == "lang")
            })
            .map(|a| a.value.to_string());
        if own.is_some() {
            lang = own;
            break;
        }
        cursor = el.parent_element();
    }
    let Some(lang) = lang else {
        return false;
    };

    argument.split(',').any(|range| {
        let range = range.trim().trim_matches(|c| c == '"' || c == '\'');
        if range == "*" {
            return !lang.is_empty();
        }
        !range.is_empty() && attr_value_matches(AttrOperator::DashMatch, &lang, range, true)
    })
}
