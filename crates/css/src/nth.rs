//! The `An+B` microsyntax used by `:nth-*()` pseudo-classes.

use std::fmt;

use crate::error::{SyntaxError, SyntaxErrorKind, SyntaxResult};
use crate::token::{Token, TokenKind};

/// Coefficients of `An+B`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Nth {
    pub a: i32,
    pub b: i32,
}

impl Nth {
    pub const fn new(a: i32, b: i32) -> Self {
        Self { a, b }
    }

    pub const ODD: Nth = Nth::new(2, 1);
    pub const EVEN: Nth = Nth::new(2, 0);

    /// Whether the 1-based `position` equals `A*n + B` for some `n >= 0`.
    pub fn matches(&self, position: i32) -> bool {
        if self.a == 0 {
            return position == self.b;
        }
        // Widened so extreme coefficients cannot overflow.
        let (a, diff) = (i64::from(self.a), i64::from(position) - i64::from(self.b));
        if diff % a != 0 {
            return false;
        }
        // A > 0 needs a non-negative quotient; A < 0 a non-positive diff.
        diff / a >= 0
    }
}

impl fmt::Display for Nth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.a, self.b) {
            (0, b) => write!(f, "{b}"),
            (a, 0) => write!(f, "{a}n"),
            (a, b) if b > 0 => write!(f, "{a}n+{b}"),
            (a, b) => write!(f, "{a}n{b}"),
        }
    }
}

/// Parse `An+B`, `odd`, `even` or a bare integer.
pub fn parse_nth(text: &str) -> SyntaxResult<Nth> {
    parse_nth_text(text.trim()).ok_or_else(|| SyntaxError::new(SyntaxErrorKind::InvalidNth, 1, 1))
}

/// Parse `An+B` from a token span (usually a pseudo-class argument).
pub fn parse_nth_tokens(tokens: &[Token]) -> SyntaxResult<Nth> {
    let text = nth_text(tokens);
    parse_nth_text(text.trim())
        .ok_or_else(|| SyntaxError::at(SyntaxErrorKind::InvalidNth, tokens.first()))
}

/// Number tokens drop their sign, so `n+1` is rebuilt with the `+` restored
/// when no explicit sign precedes the B term.
fn nth_text(tokens: &[Token]) -> String {
    let mut out = String::new();
    for token in tokens {
        if let TokenKind::Number { value, .. } = token.kind {
            let signed = out.trim_end().ends_with(['+', '-']);
            if value >= 0.0 && !signed && !out.trim().is_empty() {
                out.push('+');
            }
        }
        token.kind.write_css(&mut out);
    }
    out
}

fn parse_nth_text(text: &str) -> Option<Nth> {
    let lower = text.to_ascii_lowercase();
    match lower.as_str() {
        "odd" => return Some(Nth::ODD),
        "even" => return Some(Nth::EVEN),
        "" => return None,
        _ => {}
    }

    let Some(n_idx) = lower.find('n') else {
        return parse_signed_int(&lower).map(|b| Nth::new(0, b));
    };

    let a_part = &lower[..n_idx];
    let a = match a_part {
        "" | "+" => 1,
        "-" => -1,
        _ => parse_signed_int(a_part)?,
    };

    let rest = lower[n_idx + 1..].trim_start();
    if rest.is_empty() {
        return Some(Nth::new(a, 0));
    }
    let (sign, digits) = match rest.as_bytes()[0] {
        b'+' => (1, rest[1..].trim_start()),
        b'-' => (-1, rest[1..].trim_start()),
        _ => return None,
    };
    if digits.is_empty() || !digits.bytes().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let b: i32 = digits.parse().ok()?;
    Some(Nth::new(a, sign * b))
}

fn parse_signed_int(text: &str) -> Option<i32> {
    let digits = text.strip_prefix(['+', '-']).unwrap_or(text);
    if digits.is_empty() || !digits.bytes().all(|c| c.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_forms() {
        assert_eq!(parse_nth("odd"), Ok(Nth::new(2, 1)));
        assert_eq!(parse_nth("EVEN"), Ok(Nth::new(2, 0)));
        assert_eq!(parse_nth("3"), Ok(Nth::new(0, 3)));
        assert_eq!(parse_nth("-2"), Ok(Nth::new(0, -2)));
        assert_eq!(parse_nth("2n+1"), Ok(Nth::new(2, 1)));
        assert_eq!(parse_nth("2n + 1"), Ok(Nth::new(2, 1)));
        assert_eq!(parse_nth("-n+3"), Ok(Nth::new(-1, 3)));
        assert_eq!(parse_nth("n"), Ok(Nth::new(1, 0)));
        assert_eq!(parse_nth("+n-2"), Ok(Nth::new(1, -2)));
        assert_eq!(parse_nth("3n- 4"), Ok(Nth::new(3, -4)));
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse_nth("").is_err());
        assert!(parse_nth("2n 1").is_err());
        assert!(parse_nth("2x+1").is_err());
        assert!(parse_nth("n+-1").is_err());
        assert!(parse_nth("1.5n").is_err());
    }

    #[test]
    fn test_from_tokens() {
        let tokens = crate::token::tokenize("2n+1");
        assert_eq!(parse_nth_tokens(&tokens), Ok(Nth::new(2, 1)));
        let tokens = crate::token::tokenize("-n- 1");
        assert_eq!(parse_nth_tokens(&tokens), Ok(Nth::new(-1, -1)));
    }

    #[test]
    fn test_matches() {
        let odd = Nth::new(2, 1);
        let hits: Vec<i32> = (1..=5).filter(|&p| odd.matches(p)).collect();
        assert_eq!(hits, vec![1, 3, 5]);

        let first_three = Nth::new(-1, 3);
        let hits: Vec<i32> = (1..=5).filter(|&p| first_three.matches(p)).collect();
        assert_eq!(hits, vec![1, 2, 3]);

        assert!(Nth::new(0, 4).matches(4));
        assert!(!Nth::new(0, 4).matches(3));
        assert!(!Nth::new(3, 10).matches(4));
    }

    #[test]
    fn test_matches_extreme_coefficients() {
        assert_eq!(parse_nth("n-2147483647"), Ok(Nth::new(1, -2147483647)));
        assert!(Nth::new(1, -2147483647).matches(1));
        assert!(Nth::new(1, i32::MIN).matches(1));
        assert!(Nth::new(1, i32::MIN).matches(i32::MAX));
        assert!(!Nth::new(-1, i32::MIN).matches(1));
        assert!(Nth::new(-1, i32::MAX).matches(1));
        assert!(Nth::new(i32::MIN, 1).matches(1));
        assert!(!Nth::new(i32::MIN, 1).matches(2));
        assert!(!Nth::new(0, i32::MIN).matches(1));
        assert!(Nth::new(-1, 0).matches(0));
        assert!(!Nth::new(i32::MAX, i32::MIN).matches(i32::MAX));
    }

    #[test]
    fn test_display() {
        assert_eq!(Nth::new(2, 1).to_string(), "2n+1");
        assert_eq!(Nth::new(-1, -3).to_string(), "-1n-3");
        assert_eq!(Nth::new(0, 5).to_string(), "5");
    }
}
