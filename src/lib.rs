//! CSS styling engine: tokenizer and parser ([`css`]), a reference DOM
//! ([`dom`]) and selector matching plus the cascade ([`style`]).

pub use css;
pub use dom;
pub use style;
