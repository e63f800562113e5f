//! A small arena DOM: elements, attributes and text with intrusive sibling
//! links. The style engine reads it through `style::TElement`.

pub mod node;
pub mod tree;

pub use node::*;
pub use tree::Dom;
