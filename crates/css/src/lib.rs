pub mod error;
pub mod media;
pub mod nth;
pub mod parser;
pub mod rules;
pub mod selector;
pub mod supports;
pub mod token;
pub mod value;

pub use error::{SyntaxError, SyntaxErrorKind, SyntaxResult};
pub use media::{ColorScheme, MediaEnvironment, MediaQueryList, MediaType};
pub use nth::{Nth, parse_nth};
pub use parser::{BlockKind, ComponentValue, Declaration, parse_component_values, parse_declaration_list};
pub use rules::{
    CssRule, CssRuleInterface, PropertyDeclaration, RuleId, RuleKind, StyleDeclaration, StyleRule, Stylesheet,
};
pub use selector::{
    AttrOperator, AttributeMatcher, Combinator, ComplexSelector, CompoundSelector, NamespaceConstraint,
    NamespaceMap, PseudoClassSelector, SelectorList, Specificity, TypeSelector, parse_relative_selector,
    parse_selector, parse_selector_tokens,
};
pub use supports::SupportsCondition;
pub use token::{Token, TokenKind, Tokenizer, tokenize};
pub use value::{CssColor, CssValue, LengthUnit, parse_color};
