//! Styled tree with per-element caching and invalidation.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use dom::{Dom, NodeData, NodeId};
use tracing::debug;

use crate::cascade::StyleResolver;
use crate::computed::ComputedStyle;
use crate::element::DomElement;

/// One node of the styled tree. Text nodes carry their parent's style.
#[derive(Debug, Clone)]
pub struct StyledNode {
    pub node: NodeId,
    pub style: Arc<ComputedStyle>,
    pub children: Vec<StyledNode>,
}

impl StyledNode {
    /// Pre-order search by node id.
    pub fn find(&self, node: NodeId) -> Option<&StyledNode> {
        if self.node == node {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(node))
    }
}

/// Computed styles for a document, cached by element.
///
/// Mutate the DOM, call [`StyleTree::invalidate_element`] for the touched
/// elements and [`StyleTree::update`] restyles only what became dirty.
#[derive(Debug, Default)]
pub struct StyleTree {
    resolver: StyleResolver,
    cache: HashMap<NodeId, Arc<ComputedStyle>>,
    dirty: HashSet<NodeId>,
    all_dirty: bool,
}

impl StyleTree {
    pub fn new(resolver: StyleResolver) -> Self {
        Self {
            resolver,
            cache: HashMap::new(),
            dirty: HashSet::new(),
            all_dirty: true,
        }
    }

    pub fn resolver(&self) -> &StyleResolver {
        &self.resolver
    }

    /// Mutable access to the resolver; every cached style becomes stale.
    pub fn resolver_mut(&mut self) -> &mut StyleResolver {
        self.invalidate_all();
        &mut self.resolver
    }

    /// Cached style of `node`, if it has been styled.
    pub fn style(&self, node: NodeId) -> Option<&Arc<ComputedStyle>> {
        self.cache.get(&node)
    }

    pub fn is_dirty(&self, node: NodeId) -> bool {
        self.all_dirty || self.dirty.contains(&node) || !self.cache.contains_key(&node)
    }

    /// Mark `element`, its subtree and its following siblings for restyle.
    /// With `:has()` in any sheet, an element can affect its ancestors, so
    /// everything is marked.
    pub fn invalidate_element(&mut self, dom: &Dom, element: NodeId) {
        if self.resolver.uses_has() {
            debug!(node = element.0, "invalidating everything, :has() in use");
            self.invalidate_all();
            return;
        }
        self.dirty.insert(element);
        let mut sibling = dom.next_element_sibling(element);
        while let Some(id) = sibling {
            self.dirty.insert(id);
            sibling = dom.next_element_sibling(id);
        }
        debug!(node = element.0, dirty = self.dirty.len(), "invalidated element");
    }

    pub fn invalidate_all(&mut self) {
        self.all_dirty = true;
        self.dirty.clear();
    }

    /// Restyle dirty elements and their subtrees. Returns how many
    /// elements were resolved.
    pub fn update(&mut self, dom: &Dom, document: NodeId) -> usize {
        let mut visited = HashSet::new();
        let mut restyled = 0;
        for child in dom.element_children(document) {
            self.update_element(dom, child, None, false, &mut visited, &mut restyled);
        }
        self.cache.retain(|id, _| visited.contains(id));
        self.dirty.clear();
        self.all_dirty = false;
        debug!(restyled, cached = self.cache.len(), "style tree updated");
        restyled
    }

    fn update_element(
        &mut self,
        dom: &Dom,
        node: NodeId,
        parent: Option<&Arc<ComputedStyle>>,
        parent_restyled: bool,
        visited: &mut HashSet<NodeId>,
        restyled: &mut usize,
    ) {
        let Some(element) = DomElement::new(dom, node) else {
            return;
        };
        visited.insert(node);
        let needs_restyle = parent_restyled || self.is_dirty(node);
        let style = match self.cache.get(&node) {
            Some(style) if !needs_restyle => style.clone(),
            _ => {
                let style = Arc::new(self.resolver.resolve(element, parent));
                self.cache.insert(node, style.clone());
                *restyled += 1;
                style
            }
        };
        for child in dom.element_children(node) {
            self.update_element(dom, child, Some(&style), needs_restyle, visited, restyled);
        }
    }

    /// Bring the cache up to date and build the styled tree rooted at the
    /// document element.
    pub fn build(&mut self, dom: &Dom, document: NodeId) -> Option<StyledNode> {
        self.update(dom, document);
        let root = dom.document_element(document)?;
        self.styled_node(dom, root)
    }

    fn styled_node(&self, dom: &Dom, node: NodeId) -> Option<StyledNode> {
        let style = self.cache.get(&node)?.clone();
        let children = dom
            .children(node)
            .into_iter()
            .filter_map(|child| match dom.get(child).map(|n| &n.data) {
                Some(NodeData::Element(_)) => self.styled_node(dom, child),
                Some(NodeData::Text { .. }) => Some(StyledNode {
                    node: child,
                    style: style.clone(),
                    children: Vec::new(),
                }),
                _ => None,
            })
            .collect();
        Some(StyledNode { node, style, children })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cascade::StyleOrigin;
    use crate::context::StyleConfig;
    use css::{CssColor, Stylesheet};
    use dom::{Attr, HTML_NAMESPACE, QuirksMode};

    struct Fixture {
        dom: Dom,
        doc: NodeId,
        body: NodeId,
        a: NodeId,
        b: NodeId,
        c: NodeId,
    }

    /// document > html > body > (p#a > "text", p#b, p#c)
    fn fixture() -> Fixture {
        let mut dom = Dom::new();
        let doc = dom.create_document(QuirksMode::NoQuirks);
        let html = dom.create_html_element("html");
        let body = dom.create_html_element("body");
        let p = |dom: &mut Dom, id: &str| dom.create_element("p", HTML_NAMESPACE, vec![Attr::new("id", id)]);
        let a = p(&mut dom, "a");
        let b = p(&mut dom, "b");
        let c = p(&mut dom, "c");
        let text = dom.create_text("hello");
        dom.append_child(doc, html);
        dom.append_child(html, body);
        for id in [a, b, c] {
            dom.append_child(body, id);
        }
        dom.append_child(a, text);
        Fixture { dom, doc, body, a, b, c }
    }

    fn tree(css: &str) -> StyleTree {
        let mut resolver = StyleResolver::new(StyleConfig::default());
        resolver.add_stylesheet(Stylesheet::parse(css), StyleOrigin::Author);
        StyleTree::new(resolver)
    }

    #[test]
    fn builds_styled_tree() {
        let f = fixture();
        let mut t = tree("body { color: red } p { display: block }");
        let root = t.build(&f.dom, f.doc).unwrap();
        assert_eq!(root.children.len(), 1);
        let a = root.find(f.a).unwrap();
        assert_eq!(a.style.color(), CssColor::rgb(255, 0, 0));
        assert_eq!(a.style.get_property_value("display").keyword, "block");
        // The text child shares its parent's style.
        assert_eq!(a.children.len(), 1);
        assert!(Arc::ptr_eq(&a.children[0].style, &a.style));
    }

    #[test]
    fn update_restyles_only_dirty_elements() {
        let mut f = fixture();
        let mut t = tree("#b { width: 1px } .wide { width: 9px } #b + p { height: 2px }");
        assert_eq!(t.update(&f.dom, f.doc), 5);
        assert_eq!(t.update(&f.dom, f.doc), 0);

        let before_a = t.style(f.a).unwrap().clone();
        f.dom.set_attribute(f.b, "class", "wide");
        t.invalidate_element(&f.dom, f.b);
        assert!(!t.is_dirty(f.a));
        assert!(t.is_dirty(f.c));
        assert_eq!(t.update(&f.dom, f.doc), 2);
        assert!(Arc::ptr_eq(t.style(f.a).unwrap(), &before_a));
        assert_eq!(t.style(f.b).unwrap().get_property_value("width").length_px, 9.0);
        assert_eq!(t.style(f.c).unwrap().get_property_value("height").length_px, 2.0);
    }

    #[test]
    fn invalidating_a_parent_restyles_its_subtree() {
        let mut f = fixture();
        let mut t = tree("body.dark p { color: white }");
        t.update(&f.dom, f.doc);
        f.dom.set_attribute(f.body, "class", "dark");
        t.invalidate_element(&f.dom, f.body);
        assert_eq!(t.update(&f.dom, f.doc), 4);
        assert_eq!(t.style(f.c).unwrap().color(), CssColor::WHITE);
    }

    #[test]
    fn has_selectors_invalidate_everything() {
        let mut f = fixture();
        let mut t = tree("body:has(.hit) { color: green }");
        t.update(&f.dom, f.doc);
        f.dom.set_attribute(f.c, "class", "hit");
        t.invalidate_element(&f.dom, f.c);
        assert!(t.is_dirty(f.body));
        assert_eq!(t.update(&f.dom, f.doc), 5);
        assert_eq!(t.style(f.body).unwrap().color(), CssColor::rgb(0, 128, 0));
    }

    #[test]
    fn removed_nodes_leave_the_cache() {
        let mut f = fixture();
        let mut t = tree("");
        t.update(&f.dom, f.doc);
        f.dom.remove_child(f.body, f.c);
        t.invalidate_all();
        t.update(&f.dom, f.doc);
        assert!(t.style(f.c).is_none());
        assert!(t.style(f.b).is_some());
    }
}
