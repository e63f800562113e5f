//! DOM node model.
//!
//! Nodes live in a `Vec<Node>` owned by [`crate::Dom`] and are referenced by
//! [`NodeId`]. Tree structure is encoded with parent/child/sibling links
//! stored on each node.

use bitflags::bitflags;

/// Index of a node in its [`crate::Dom`]. Stable for the life of the tree,
/// so it doubles as a cache key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

pub const HTML_NAMESPACE: &str = "http://www.w3.org/1999/xhtml";
pub const SVG_NAMESPACE: &str = "http://www.w3.org/2000/svg";
pub const MATHML_NAMESPACE: &str = "http://www.w3.org/1998/Math/MathML";

/// Document compatibility mode. Quirks mode makes class and ID selectors
/// match ASCII case-insensitively.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum QuirksMode {
    #[default]
    NoQuirks,
    Quirks,
    LimitedQuirks,
}

bitflags! {
    /// Dynamic element state consulted by user-action and form pseudo-classes.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ElementState: u32 {
        const HOVER = 1 << 0;
        const ACTIVE = 1 << 1;
        const FOCUS = 1 << 2;
        const FOCUS_WITHIN = 1 << 3;
        const FOCUS_VISIBLE = 1 << 4;
        const VISITED = 1 << 5;
        const CHECKED = 1 << 6;
        const INDETERMINATE = 1 << 7;
        /// Set on custom elements once they have been upgraded.
        const DEFINED = 1 << 8;
    }
}

/// An attribute. `namespace` is `None` for ordinary HTML attributes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Attr {
    pub namespace: Option<String>,
    pub name: String,
    pub value: String,
}

impl Attr {
    pub fn new(name: &str, value: &str) -> Self {
        Self {
            namespace: None,
            name: name.to_string(),
            value: value.to_string(),
        }
    }

    pub fn with_namespace(namespace: &str, name: &str, value: &str) -> Self {
        Self {
            namespace: Some(namespace.to_string()),
            name: name.to_string(),
            value: value.to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ElementData {
    pub namespace: String,
    pub local_name: String,
    pub attrs: Vec<Attr>,
    pub state: ElementState,
    /// Cached `id` attribute.
    pub id: Option<String>,
    /// Cached `class` attribute, split on whitespace.
    pub classes: Vec<String>,
}

impl ElementData {
    pub fn new(namespace: &str, local_name: &str, attrs: Vec<Attr>) -> Self {
        let mut data = Self {
            namespace: namespace.to_string(),
            local_name: local_name.to_string(),
            attrs,
            state: ElementState::empty(),
            id: None,
            classes: Vec::new(),
        };
        data.refresh_caches();
        data
    }

    pub fn is_html(&self) -> bool {
        self.namespace == HTML_NAMESPACE
    }

    /// Value of the un-namespaced attribute `name`.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|a| a.namespace.is_none() && a.name == name)
            .map(|a| a.value.as_str())
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attr(name).is_some()
    }

    pub(crate) fn refresh_caches(&mut self) {
        self.id = self.attr("id").map(str::to_string);
        self.classes = self
            .attr("class")
            .map(|v| v.split_ascii_whitespace().map(String::from).collect())
            .unwrap_or_default();
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeData {
    Document { quirks_mode: QuirksMode },
    Element(ElementData),
    Text { data: String },
    Comment { data: String },
}

/// A single node. Links form an intrusive doubly-linked child list.
#[derive(Clone, Debug)]
pub struct Node {
    pub data: NodeData,
    pub parent: Option<NodeId>,
    pub first_child: Option<NodeId>,
    pub last_child: Option<NodeId>,
    pub prev_sibling: Option<NodeId>,
    pub next_sibling: Option<NodeId>,
}

impl Node {
    pub fn new(data: NodeData) -> Self {
        Self {
            data,
            parent: None,
            first_child: None,
            last_child: None,
            prev_sibling: None,
            next_sibling: None,
        }
    }

    pub fn is_element(&self) -> bool {
        matches!(self.data, NodeData::Element(_))
    }

    pub fn is_text(&self) -> bool {
        matches!(self.data, NodeData::Text { .. })
    }

    pub fn as_element(&self) -> Option<&ElementData> {
        match &self.data {
            NodeData::Element(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_element_mut(&mut self) -> Option<&mut ElementData> {
        match &mut self.data {
            NodeData::Element(e) => Some(e),
            _ => None,
        }
    }
}
