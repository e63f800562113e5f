//! Tree construction and navigation.
//!
//! [`Dom`] owns every node and keeps the parent/child/sibling links
//! consistent across insertions and removals.

use crate::node::{Attr, ElementData, ElementState, HTML_NAMESPACE, Node, NodeData, NodeId, QuirksMode};

#[derive(Clone, Debug, Default)]
pub struct Dom {
    nodes: Vec<Node>,
}

impl Dom {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn allocate(&mut self, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node::new(data));
        id
    }

    // =======================================================================
    // Creation
    // =======================================================================

    pub fn create_document(&mut self, quirks_mode: QuirksMode) -> NodeId {
        self.allocate(NodeData::Document { quirks_mode })
    }

    /// Create an element in `namespace`; `id`/`class` caches come from `attrs`.
    pub fn create_element(&mut self, local_name: &str, namespace: &str, attrs: Vec<Attr>) -> NodeId {
        self.allocate(NodeData::Element(ElementData::new(namespace, local_name, attrs)))
    }

    pub fn create_html_element(&mut self, local_name: &str) -> NodeId {
        self.create_element(local_name, HTML_NAMESPACE, Vec::new())
    }

    pub fn create_text(&mut self, data: &str) -> NodeId {
        self.allocate(NodeData::Text { data: data.to_string() })
    }

    pub fn create_comment(&mut self, data: &str) -> NodeId {
        self.allocate(NodeData::Comment { data: data.to_string() })
    }

    // =======================================================================
    // Mutation
    // =======================================================================

    /// Append `child` as the last child of `parent`, moving it if attached.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        let old_last = self.get(parent).and_then(|n| n.last_child);

        if let Some(last) = old_last.and_then(|id| self.get_mut(id)) {
            last.next_sibling = Some(child);
        }
        if let Some(node) = self.get_mut(child) {
            node.parent = Some(parent);
            node.prev_sibling = old_last;
            node.next_sibling = None;
        }
        if let Some(p) = self.get_mut(parent) {
            if p.first_child.is_none() {
                p.first_child = Some(child);
            }
            p.last_child = Some(child);
        }
    }

    /// Insert `child` before `reference`, or append when `reference` is `None`.
    pub fn insert_before(&mut self, parent: NodeId, child: NodeId, reference: Option<NodeId>) {
        let Some(reference) = reference else {
            self.append_child(parent, child);
            return;
        };
        self.detach(child);
        let prev = self.get(reference).and_then(|n| n.prev_sibling);

        if let Some(node) = self.get_mut(child) {
            node.parent = Some(parent);
            node.prev_sibling = prev;
            node.next_sibling = Some(reference);
        }
        if let Some(r) = self.get_mut(reference) {
            r.prev_sibling = Some(child);
        }
        match prev {
            Some(prev) => {
                if let Some(p) = self.get_mut(prev) {
                    p.next_sibling = Some(child);
                }
            }
            None => {
                if let Some(p) = self.get_mut(parent) {
                    p.first_child = Some(child);
                }
            }
        }
    }

    /// Remove `child` from `parent`. No-op when `child` is not its child.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) {
        if self.parent(child) == Some(parent) {
            self.detach(child);
        }
    }

    fn detach(&mut self, id: NodeId) {
        let Some((parent, prev, next)) = self.get(id).map(|n| (n.parent, n.prev_sibling, n.next_sibling)) else {
            return;
        };
        if let Some(p) = prev.and_then(|p| self.get_mut(p)) {
            p.next_sibling = next;
        }
        if let Some(n) = next.and_then(|n| self.get_mut(n)) {
            n.prev_sibling = prev;
        }
        if let Some(p) = parent.and_then(|p| self.get_mut(p)) {
            if p.first_child == Some(id) {
                p.first_child = next;
            }
            if p.last_child == Some(id) {
                p.last_child = prev;
            }
        }
        if let Some(node) = self.get_mut(id) {
            node.parent = None;
            node.prev_sibling = None;
            node.next_sibling = None;
        }
    }

    /// Set an un-namespaced attribute, refreshing the id/class caches.
    pub fn set_attribute(&mut self, element: NodeId, name: &str, value: &str) {
        let Some(data) = self.get_mut(element).and_then(Node::as_element_mut) else {
            return;
        };
        match data.attrs.iter_mut().find(|a| a.namespace.is_none() && a.name == name) {
            Some(attr) => attr.value = value.to_string(),
            None => data.attrs.push(Attr::new(name, value)),
        }
        data.refresh_caches();
    }

    pub fn remove_attribute(&mut self, element: NodeId, name: &str) {
        if let Some(data) = self.get_mut(element).and_then(Node::as_element_mut) {
            data.attrs.retain(|a| !(a.namespace.is_none() && a.name == name));
            data.refresh_caches();
        }
    }

    /// Turn state flags on or off.
    pub fn set_state(&mut self, element: NodeId, flags: ElementState, on: bool) {
        if let Some(data) = self.get_mut(element).and_then(Node::as_element_mut) {
            data.state.set(flags, on);
        }
    }

    pub fn set_text(&mut self, text: NodeId, value: &str) {
        if let Some(Node {
            data: NodeData::Text { data },
            ..
        }) = self.get_mut(text)
        {
            *data = value.to_string();
        }
    }

    // =======================================================================
    // Navigation
    // =======================================================================

    pub fn element(&self, id: NodeId) -> Option<&ElementData> {
        self.get(id).and_then(Node::as_element)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.parent)
    }

    /// Parent only when it is an element.
    pub fn parent_element(&self, id: NodeId) -> Option<NodeId> {
        self.parent(id).filter(|p| self.element(*p).is_some())
    }

    pub fn children(&self, parent: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut cursor = self.get(parent).and_then(|n| n.first_child);
        while let Some(id) = cursor {
            out.push(id);
            cursor = self.get(id).and_then(|n| n.next_sibling);
        }
        out
    }

    pub fn element_children(&self, parent: NodeId) -> Vec<NodeId> {
        self.children(parent)
            .into_iter()
            .filter(|id| self.element(*id).is_some())
            .collect()
    }

    pub fn prev_element_sibling(&self, id: NodeId) -> Option<NodeId> {
        let mut cursor = self.get(id).and_then(|n| n.prev_sibling);
        while let Some(sib) = cursor {
            if self.element(sib).is_some() {
                return Some(sib);
            }
            cursor = self.get(sib).and_then(|n| n.prev_sibling);
        }
        None
    }

    pub fn next_element_sibling(&self, id: NodeId) -> Option<NodeId> {
        let mut cursor = self.get(id).and_then(|n| n.next_sibling);
        while let Some(sib) = cursor {
            if self.element(sib).is_some() {
                return Some(sib);
            }
            cursor = self.get(sib).and_then(|n| n.next_sibling);
        }
        None
    }

    pub fn first_element_child(&self, id: NodeId) -> Option<NodeId> {
        let first = self.get(id).and_then(|n| n.first_child)?;
        if self.element(first).is_some() {
            Some(first)
        } else {
            self.next_element_sibling(first)
        }
    }

    pub fn last_element_child(&self, id: NodeId) -> Option<NodeId> {
        let last = self.get(id).and_then(|n| n.last_child)?;
        if self.element(last).is_some() {
            Some(last)
        } else {
            self.prev_element_sibling(last)
        }
    }

    /// Ancestors from the parent up to the root.
    pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut cursor = self.parent(id);
        while let Some(p) = cursor {
            out.push(p);
            cursor = self.parent(p);
        }
        out
    }

    /// Descendants in pre-order, excluding `id` itself.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).into_iter().rev().collect();
        while let Some(node) = stack.pop() {
            out.push(node);
            stack.extend(self.children(node).into_iter().rev());
        }
        out
    }

    /// Outermost node reachable through parent links.
    pub fn root(&self, id: NodeId) -> NodeId {
        self.ancestors(id).last().copied().unwrap_or(id)
    }

    /// The first element child of a document node.
    pub fn document_element(&self, document: NodeId) -> Option<NodeId> {
        self.first_element_child(document)
    }

    pub fn quirks_mode(&self, id: NodeId) -> QuirksMode {
        match self.get(self.root(id)).map(|n| &n.data) {
            Some(NodeData::Document { quirks_mode }) => *quirks_mode,
            _ => QuirksMode::NoQuirks,
        }
    }

    /// Whether `id` has any element child or any non-empty text child.
    pub fn has_content_children(&self, id: NodeId) -> bool {
        self.children(id).into_iter().any(|child| match self.get(child).map(|n| &n.data) {
            Some(NodeData::Element(_)) => true,
            Some(NodeData::Text { data }) => !data.is_empty(),
            _ => false,
        })
    }

    /// Concatenated text of all descendant text nodes.
    pub fn text_content(&self, id: NodeId) -> String {
        self.descendants(id)
            .into_iter()
            .filter_map(|d| match self.get(d).map(|n| &n.data) {
                Some(NodeData::Text { data }) => Some(data.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn get_element_by_id(&self, root: NodeId, id: &str) -> Option<NodeId> {
        std::iter::once(root)
            .chain(self.descendants(root))
            .find(|n| self.element(*n).and_then(|e| e.id.as_deref()) == Some(id))
    }

    pub fn get_elements_by_local_name(&self, root: NodeId, name: &str) -> Vec<NodeId> {
        std::iter::once(root)
            .chain(self.descendants(root))
            .filter(|n| self.element(*n).is_some_and(|e| e.local_name == name))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::SVG_NAMESPACE;

    /// ```text
    /// #document
    /// └── html
    ///     └── body
    ///         ├── section#intro.lead.wide
    ///         │   ├── "hello"
    ///         │   ├── em
    ///         │   └── <!-- note -->
    ///         └── svg:rect
    /// ```
    struct Fixture {
        dom: Dom,
        doc: NodeId,
        html: NodeId,
        body: NodeId,
        section: NodeId,
        em: NodeId,
        rect: NodeId,
    }

    fn fixture() -> Fixture {
        let mut dom = Dom::new();
        let doc = dom.create_document(QuirksMode::NoQuirks);
        let html = dom.create_html_element("html");
        let body = dom.create_html_element("body");
        let section = dom.create_element(
            "section",
            HTML_NAMESPACE,
            vec![Attr::new("id", "intro"), Attr::new("class", "lead  wide")],
        );
        let text = dom.create_text("hello");
        let em = dom.create_html_element("em");
        let comment = dom.create_comment("note");
        let rect = dom.create_element("rect", SVG_NAMESPACE, Vec::new());

        dom.append_child(doc, html);
        dom.append_child(html, body);
        dom.append_child(body, section);
        dom.append_child(section, text);
        dom.append_child(section, em);
        dom.append_child(section, comment);
        dom.append_child(body, rect);

        Fixture { dom, doc, html, body, section, em, rect }
    }

    #[test]
    fn caches_id_and_classes() {
        let f = fixture();
        let section = f.dom.element(f.section).unwrap();
        assert_eq!(section.id.as_deref(), Some("intro"));
        assert_eq!(section.classes, vec!["lead", "wide"]);
        assert!(section.is_html());
        assert!(!f.dom.element(f.rect).unwrap().is_html());
    }

    #[test]
    fn set_and_remove_attribute_refresh_caches() {
        let mut f = fixture();
        f.dom.set_attribute(f.em, "class", "x y");
        assert_eq!(f.dom.element(f.em).unwrap().classes, vec!["x", "y"]);
        f.dom.set_attribute(f.em, "class", "z");
        assert_eq!(f.dom.element(f.em).unwrap().classes, vec!["z"]);
        f.dom.remove_attribute(f.em, "class");
        assert!(f.dom.element(f.em).unwrap().classes.is_empty());
        assert_eq!(f.dom.element(f.em).unwrap().attrs.len(), 0);
    }

    #[test]
    fn element_navigation_skips_text_and_comments() {
        let f = fixture();
        assert_eq!(f.dom.first_element_child(f.section), Some(f.em));
        assert_eq!(f.dom.last_element_child(f.section), Some(f.em));
        assert_eq!(f.dom.next_element_sibling(f.section), Some(f.rect));
        assert_eq!(f.dom.prev_element_sibling(f.rect), Some(f.section));
        assert_eq!(f.dom.prev_element_sibling(f.em), None);
        assert_eq!(f.dom.element_children(f.body), vec![f.section, f.rect]);
    }

    #[test]
    fn parent_element_stops_at_document() {
        let f = fixture();
        assert_eq!(f.dom.parent_element(f.body), Some(f.html));
        assert_eq!(f.dom.parent(f.html), Some(f.doc));
        assert_eq!(f.dom.parent_element(f.html), None);
        assert_eq!(f.dom.document_element(f.doc), Some(f.html));
        assert_eq!(f.dom.root(f.em), f.doc);
    }

    #[test]
    fn ancestors_and_descendants() {
        let f = fixture();
        assert_eq!(f.dom.ancestors(f.em), vec![f.section, f.body, f.html, f.doc]);
        let desc = f.dom.descendants(f.body);
        assert_eq!(desc.len(), 5);
        assert_eq!(desc[0], f.section);
        assert_eq!(desc[4], f.rect);
    }

    #[test]
    fn content_checks() {
        let mut f = fixture();
        assert!(f.dom.has_content_children(f.section));
        assert!(!f.dom.has_content_children(f.em));
        let comment_only = f.dom.create_html_element("p");
        let c = f.dom.create_comment("x");
        f.dom.append_child(comment_only, c);
        assert!(!f.dom.has_content_children(comment_only));
        assert_eq!(f.dom.text_content(f.body), "hello");
    }

    #[test]
    fn append_moves_and_insert_before_orders() {
        let mut dom = Dom::new();
        let list = dom.create_html_element("ol");
        let other = dom.create_html_element("ul");
        let a = dom.create_html_element("li");
        let b = dom.create_html_element("li");
        let c = dom.create_html_element("li");

        dom.append_child(other, a);
        dom.append_child(list, a);
        assert!(dom.children(other).is_empty());

        dom.append_child(list, c);
        dom.insert_before(list, b, Some(c));
        assert_eq!(dom.children(list), vec![a, b, c]);

        dom.remove_child(list, a);
        assert_eq!(dom.get(list).unwrap().first_child, Some(b));
        dom.remove_child(list, c);
        assert_eq!(dom.get(list).unwrap().last_child, Some(b));
        assert_eq!(dom.get(b).unwrap().next_sibling, None);

        dom.remove_child(other, b);
        assert_eq!(dom.children(list), vec![b]);
    }

    #[test]
    fn state_flags_and_quirks() {
        let mut dom = Dom::new();
        let doc = dom.create_document(QuirksMode::Quirks);
        let el = dom.create_html_element("input");
        dom.append_child(doc, el);
        dom.set_state(el, ElementState::HOVER | ElementState::CHECKED, true);
        dom.set_state(el, ElementState::HOVER, false);
        assert_eq!(dom.element(el).unwrap().state, ElementState::CHECKED);
        assert_eq!(dom.quirks_mode(el), QuirksMode::Quirks);
    }

    #[test]
    fn lookups() {
        let f = fixture();
        assert_eq!(f.dom.get_element_by_id(f.doc, "intro"), Some(f.section));
        assert_eq!(f.dom.get_element_by_id(f.doc, "missing"), None);
        assert_eq!(f.dom.get_elements_by_local_name(f.doc, "rect"), vec![f.rect]);
    }
}
