use thiserror::Error;

use crate::token::Token;

/// What went wrong while parsing selector, An+B or media query text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyntaxErrorKind {
    #[error("empty selector")]
    EmptySelector,
    #[error("expected a compound selector after combinator")]
    DanglingCombinator,
    #[error("unexpected token `{0}`")]
    UnexpectedToken(String),
    #[error("unexpected end of input")]
    UnexpectedEof,
    #[error("malformed attribute selector")]
    InvalidAttributeSelector,
    #[error("malformed pseudo-class argument for `:{0}`")]
    InvalidPseudoArgument(String),
    #[error("simple selector after pseudo-element")]
    AfterPseudoElement,
    #[error("unknown namespace prefix `{0}`")]
    UnknownNamespacePrefix(String),
    #[error("malformed An+B expression")]
    InvalidNth,
    #[error("malformed media query")]
    InvalidMediaQuery,
}

/// A typed parse failure with the position of the offending token.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} at line {line}, column {column}")]
pub struct SyntaxError {
    pub kind: SyntaxErrorKind,
    pub line: u32,
    pub column: u32,
}

impl SyntaxError {
    pub fn new(kind: SyntaxErrorKind, line: u32, column: u32) -> Self {
        Self { kind, line, column }
    }

    /// Build an error located at `token`, or at 1:1 when there is none.
    pub fn at(kind: SyntaxErrorKind, token: Option<&Token>) -> Self {
        match token {
            Some(t) => Self::new(kind, t.line, t.column),
            None => Self::new(kind, 1, 1),
        }
    }
}

pub type SyntaxResult<T> = Result<T, SyntaxError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::tokenize;

    #[test]
    fn test_error_display_includes_position() {
        let tokens = tokenize("a\n  }");
        let err = SyntaxError::at(
            SyntaxErrorKind::UnexpectedToken("}".into()),
            tokens.iter().find(|t| t.kind == crate::token::TokenKind::RBrace),
        );
        assert_eq!(err.line, 2);
        assert_eq!(err.column, 3);
        assert_eq!(err.to_string(), "unexpected token `}` at line 2, column 3");
    }
}
