//! The narrow element interface the engine needs from a document.
//!
//! Matching and the cascade only see elements through [`TElement`]; the
//! reference implementation is [`DomElement`] over the `dom` crate.

use std::fmt;
use std::hash::{Hash, Hasher};

use dom::{Dom, ElementData, ElementState, HTML_NAMESPACE, NodeData, NodeId, QuirksMode};

/// A borrowed view of one attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttrRef<'a> {
    pub namespace: Option<&'a str>,
    pub local_name: &'a str,
    pub value: &'a str,
}

/// Read-only element queries. Implementors are cheap handles; equality
/// and hashing follow element identity.
pub trait TElement: Copy + Eq + Hash + fmt::Debug {
    fn local_name(&self) -> &str;
    /// Namespace URI; empty for no namespace.
    fn namespace(&self) -> &str;
    fn id(&self) -> Option<&str>;
    fn has_class(&self, name: &str, case_insensitive: bool) -> bool;
    fn attributes(&self) -> Vec<AttrRef<'_>>;

    fn parent_element(&self) -> Option<Self>;
    fn prev_sibling_element(&self) -> Option<Self>;
    fn next_sibling_element(&self) -> Option<Self>;
    fn first_element_child(&self) -> Option<Self>;
    fn last_element_child(&self) -> Option<Self>;

    /// Whether the parent is the document node.
    fn is_root(&self) -> bool;
    /// No element children and no non-empty text.
    fn is_empty(&self) -> bool;
    fn state(&self) -> ElementState;
    fn quirks_mode(&self) -> QuirksMode;

    fn is_html_element(&self) -> bool {
        self.namespace() == HTML_NAMESPACE
    }

    /// Value of the un-namespaced attribute `name`. HTML elements compare
    /// names ASCII case-insensitively.
    fn attr(&self, name: &str) -> Option<&str> {
        let html = self.is_html_element();
        self.attributes()
            .into_iter()
            .find(|a| {
                a.namespace.is_none()
                    && if html {
                        a.local_name.eq_ignore_ascii_case(name)
                    } else {
                        a.local_name == name
                    }
            })
            .map(|a| a.value)
    }

    fn has_attr(&self, name: &str) -> bool {
        self.attr(name).is_some()
    }
}

/// An element of a [`Dom`].
#[derive(Clone, Copy)]
pub struct DomElement<'a> {
    dom: &'a Dom,
    id: NodeId,
    data: &'a ElementData,
}

impl<'a> DomElement<'a> {
    /// `None` unless `id` names an element.
    pub fn new(dom: &'a Dom, id: NodeId) -> Option<Self> {
        dom.element(id).map(|data| Self { dom, id, data })
    }

    pub fn node_id(&self) -> NodeId {
        self.id
    }

    pub fn dom(&self) -> &'a Dom {
        self.dom
    }

    fn data(&self) -> &'a ElementData {
        self.data
    }

    fn wrap(&self, id: Option<NodeId>) -> Option<Self> {
        id.and_then(|id| Self::new(self.dom, id))
    }
}

impl PartialEq for DomElement<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.dom, other.dom) && self.id == other.id
    }
}

impl Eq for DomElement<'_> {}

impl Hash for DomElement<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for DomElement<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let data = self.data();
        write!(f, "<{}", data.local_name)?;
        if let Some(id) = &data.id {
            write!(f, " id={id:?}")?;
        }
        write!(f, "> #{}", self.id.0)
    }
}

impl TElement for DomElement<'_> {
    fn local_name(&self) -> &str {
        &self.data().local_name
    }

    fn namespace(&self) -> &str {
        &self.data().namespace
    }

    fn id(&self) -> Option<&str> {
        self.data().id.as_deref()
    }

    fn has_class(&self, name: &str, case_insensitive: bool) -> bool {
        self.data().classes.iter().any(|c| {
            if case_insensitive {
                c.eq_ignore_ascii_case(name)
            } else {
                c == name
            }
        })
    }

    fn attributes(&self) -> Vec<AttrRef<'_>> {
        self.data()
            .attrs
            .iter()
            .map(|a| AttrRef {
                namespace: a.namespace.as_deref(),
                local_name: &a.name,
                value: &a.value,
            })
            .collect()
    }

    fn parent_element(&self) -> Option<Self> {
        self.wrap(self.dom.parent_element(self.id))
    }

    fn prev_sibling_element(&self) -> Option<Self> {
        self.wrap(self.dom.prev_element_sibling(self.id))
    }

    fn next_sibling_element(&self) -> Option<Self> {
        self.wrap(self.dom.next_element_sibling(self.id))
    }

    fn first_element_child(&self) -> Option<Self> {
        self.wrap(self.dom.first_element_child(self.id))
    }

    fn last_element_child(&self) -> Option<Self> {
        self.wrap(self.dom.last_element_child(self.id))
    }

    fn is_root(&self) -> bool {
        let parent = self.dom.parent(self.id).and_then(|p| self.dom.get(p));
        matches!(parent.map(|n| &n.data), Some(NodeData::Document { .. }))
    }

    fn is_empty(&self) -> bool {
        !self.dom.has_content_children(self.id)
    }

    fn state(&self) -> ElementState {
        self.data().state
    }

    fn quirks_mode(&self) -> QuirksMode {
        self.dom.quirks_mode(self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dom::{Attr, SVG_NAMESPACE};

    #[test]
    fn wraps_only_elements() {
        let mut dom = Dom::new();
        let doc = dom.create_document(QuirksMode::NoQuirks);
        let html = dom.create_html_element("html");
        let text = dom.create_text("x");
        dom.append_child(doc, html);
        dom.append_child(html, text);

        assert!(DomElement::new(&dom, doc).is_none());
        assert!(DomElement::new(&dom, text).is_none());
        let el = DomElement::new(&dom, html).unwrap();
        assert!(el.is_root());
        assert!(el.parent_element().is_none());
        assert!(!el.is_empty());
    }

    #[test]
    fn attribute_names_fold_case_on_html() {
        let mut dom = Dom::new();
        let div = dom.create_element("div", HTML_NAMESPACE, vec![Attr::new("data-x", "1")]);
        let rect = dom.create_element("rect", SVG_NAMESPACE, vec![Attr::new("viewBox", "0 0 1 1")]);
        let div = DomElement::new(&dom, div).unwrap();
        let rect = DomElement::new(&dom, rect).unwrap();
        assert_eq!(div.attr("DATA-X"), Some("1"));
        assert_eq!(rect.attr("viewBox"), Some("0 0 1 1"));
        assert_eq!(rect.attr("viewbox"), None);
    }

    #[test]
    fn identity_equality() {
        let mut dom = Dom::new();
        let a = dom.create_html_element("p");
        let b = dom.create_html_element("p");
        assert_eq!(DomElement::new(&dom, a), DomElement::new(&dom, a));
        assert_ne!(DomElement::new(&dom, a), DomElement::new(&dom, b));
    }
}
