//! # Style
//!
//! Selector matching, the cascade and computed values over any document
//! that implements [`TElement`].

pub mod cascade;
pub mod computed;
pub mod context;
pub mod element;
pub mod matching;
pub mod properties;
pub mod shorthand;
pub mod style_tree;

pub use cascade::{DEFAULT_UA_CSS, MatchedRule, StyleOrigin, StyleResolver, cascade_layer, supports_declaration};
pub use computed::{ComputeContext, ComputedStyle, ComputedValue, CssWideKeyword, ResolvedValue};
pub use context::StyleConfig;
pub use element::{AttrRef, DomElement, TElement};
pub use matching::{MatchingContext, matches_complex, matches_compound, matches_selector_list, matching_specificity};
pub use properties::{PropertyDefault, is_inherited, is_known_property, property_default};
pub use shorthand::{Expansion, expand, is_shorthand};
pub use style_tree::{StyleTree, StyledNode};
