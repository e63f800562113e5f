//! Component-value, rule-list and declaration-list consumption.
//!
//! Everything here works on token slices. Nested content (a block's
//! interior, a function's arguments) is handed out as a sub-slice of the
//! original token buffer so callers can re-parse it without copying.

use tracing::{debug, trace};

use crate::token::{Token, TokenKind, tokenize};

/// The delimiter that opened a simple block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    /// `{ ... }`
    Brace,
    /// `[ ... ]`
    Bracket,
    /// `( ... )`
    Paren,
}

impl BlockKind {
    fn from_opener(kind: &TokenKind) -> Option<Self> {
        match kind {
            TokenKind::LBrace => Some(BlockKind::Brace),
            TokenKind::LBracket => Some(BlockKind::Bracket),
            TokenKind::LParen => Some(BlockKind::Paren),
            _ => None,
        }
    }

    fn closer(self) -> TokenKind {
        match self {
            BlockKind::Brace => TokenKind::RBrace,
            BlockKind::Bracket => TokenKind::RBracket,
            BlockKind::Paren => TokenKind::RParen,
        }
    }

    fn chars(self) -> (char, char) {
        match self {
            BlockKind::Brace => ('{', '}'),
            BlockKind::Bracket => ('[', ']'),
            BlockKind::Paren => ('(', ')'),
        }
    }
}

/// A preserved token, a function, or a simple block.
#[derive(Debug, Clone, PartialEq)]
pub enum ComponentValue {
    Preserved(Token),
    Function {
        name: String,
        values: Vec<ComponentValue>,
    },
    Block {
        kind: BlockKind,
        values: Vec<ComponentValue>,
    },
}

impl ComponentValue {
    pub fn is_whitespace(&self) -> bool {
        matches!(self, ComponentValue::Preserved(t) if t.is_whitespace())
    }

    /// The token kind if this is a preserved token.
    pub fn token(&self) -> Option<&TokenKind> {
        match self {
            ComponentValue::Preserved(t) => Some(&t.kind),
            _ => None,
        }
    }

    /// The identifier text if this is an ident token.
    pub fn ident(&self) -> Option<&str> {
        match self.token() {
            Some(TokenKind::Ident(s)) => Some(s),
            _ => None,
        }
    }

    pub fn write_css(&self, out: &mut String) {
        match self {
            ComponentValue::Preserved(t) => t.kind.write_css(out),
            ComponentValue::Function { name, values } => {
                crate::token::serialize_identifier(name, out);
                out.push('(');
                for v in values {
                    v.write_css(out);
                }
                out.push(')');
            }
            ComponentValue::Block { kind, values } => {
                let (open, close) = kind.chars();
                out.push(open);
                for v in values {
                    v.write_css(out);
                }
                out.push(close);
            }
        }
    }

    pub fn to_css(&self) -> String {
        let mut out = String::new();
        self.write_css(&mut out);
        out
    }
}

/// Serialize a run of component values back to CSS text.
pub fn values_to_css(values: &[ComponentValue]) -> String {
    let mut out = String::new();
    for v in values {
        v.write_css(&mut out);
    }
    out
}

/// A declaration as produced by the parser. The value is kept as component
/// values; property grammars are applied later by the cascade.
#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    /// Property name; lowercased unless it is a custom property.
    pub name: String,
    pub value: Vec<ComponentValue>,
    pub important: bool,
}

impl Declaration {
    pub fn value_text(&self) -> String {
        values_to_css(&self.value)
    }
}

/// `prelude { block }`, borrowing the token buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct QualifiedRule<'a> {
    pub prelude: &'a [Token],
    /// Interior of the `{}` block, braces excluded.
    pub block: &'a [Token],
}

/// `@name prelude ;` or `@name prelude { block }`.
#[derive(Debug, Clone, PartialEq)]
pub struct AtRule<'a> {
    pub name: String,
    pub prelude: &'a [Token],
    pub block: Option<&'a [Token]>,
    pub line: u32,
    pub column: u32,
}

/// One entry of a rule list.
#[derive(Debug, Clone, PartialEq)]
pub enum RawRule<'a> {
    Qualified(QualifiedRule<'a>),
    At(AtRule<'a>),
}

impl QualifiedRule<'_> {
    pub fn prelude_values(&self) -> Vec<ComponentValue> {
        consume_component_values(self.prelude)
    }

    pub fn block_values(&self) -> Vec<ComponentValue> {
        consume_component_values(self.block)
    }
}

impl AtRule<'_> {
    pub fn prelude_values(&self) -> Vec<ComponentValue> {
        consume_component_values(self.prelude)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Component values
// ─────────────────────────────────────────────────────────────────────────────

fn at_end(tokens: &[Token], pos: usize) -> bool {
    pos >= tokens.len() || tokens[pos].is_eof()
}

/// Parse text into a flat list of component values (EOF excluded).
pub fn parse_component_values(input: &str) -> Vec<ComponentValue> {
    let tokens = tokenize(input);
    consume_component_values(&tokens)
}

/// Consume every component value in `tokens`.
pub fn consume_component_values(tokens: &[Token]) -> Vec<ComponentValue> {
    let mut values = Vec::new();
    let mut pos = 0;
    while !at_end(tokens, pos) {
        let (value, next) = consume_component_value(tokens, pos);
        values.push(value);
        pos = next;
    }
    values
}

/// Consume one component value starting at `pos`; returns it with the
/// index just past it. Blocks and functions run to their closer or EOF.
pub fn consume_component_value(tokens: &[Token], pos: usize) -> (ComponentValue, usize) {
    let token = &tokens[pos];
    if let Some(kind) = BlockKind::from_opener(&token.kind) {
        let (inner, end) = block_interior(tokens, pos);
        let values = consume_component_values(inner);
        return (ComponentValue::Block { kind, values }, end);
    }
    if let TokenKind::Function(name) = &token.kind {
        let (inner, end) = block_interior(tokens, pos);
        let values = consume_component_values(inner);
        return (
            ComponentValue::Function {
                name: name.clone(),
                values,
            },
            end,
        );
    }
    (ComponentValue::Preserved(token.clone()), pos + 1)
}

/// Scan the block opened at `start`. Returns the end of its interior and
/// the index just past the closer (equal when the block runs to EOF).
fn scan_block(tokens: &[Token], start: usize, kind: BlockKind) -> (usize, usize) {
    let closer = kind.closer();
    let mut pos = start + 1;
    while !at_end(tokens, pos) {
        if tokens[pos].kind == closer {
            return (pos, pos + 1);
        }
        pos = skip_component_value(tokens, pos);
    }
    (pos, pos)
}

/// Index just past the block (or function) opened at `start`.
pub fn skip_block(tokens: &[Token], start: usize, kind: BlockKind) -> usize {
    scan_block(tokens, start, kind).1
}

/// Index just past the component value at `pos`.
pub fn skip_component_value(tokens: &[Token], pos: usize) -> usize {
    match &tokens[pos].kind {
        TokenKind::Function(_) => skip_block(tokens, pos, BlockKind::Paren),
        kind => match BlockKind::from_opener(kind) {
            Some(block) => skip_block(tokens, pos, block),
            None => pos + 1,
        },
    }
}

/// Interior of the function or block starting at `start`, plus the index
/// just past it.
pub fn block_interior(tokens: &[Token], start: usize) -> (&[Token], usize) {
    let kind = match &tokens[start].kind {
        TokenKind::Function(_) => BlockKind::Paren,
        other => BlockKind::from_opener(other).unwrap_or(BlockKind::Paren),
    };
    let (inner_end, next) = scan_block(tokens, start, kind);
    (&tokens[start + 1..inner_end], next)
}

/// Strip leading and trailing whitespace tokens from a slice.
pub fn trim_whitespace(tokens: &[Token]) -> &[Token] {
    let mut start = 0;
    let mut end = tokens.len();
    while start < end && (tokens[start].is_whitespace() || tokens[start].is_eof()) {
        start += 1;
    }
    while end > start && (tokens[end - 1].is_whitespace() || tokens[end - 1].is_eof()) {
        end -= 1;
    }
    &tokens[start..end]
}

/// Split at top-level commas; commas inside blocks and functions stay put.
pub fn split_on_commas(tokens: &[Token]) -> Vec<&[Token]> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut pos = 0;
    while !at_end(tokens, pos) {
        if tokens[pos].kind == TokenKind::Comma {
            parts.push(&tokens[start..pos]);
            start = pos + 1;
            pos += 1;
            continue;
        }
        pos = skip_component_value(tokens, pos);
    }
    parts.push(&tokens[start..pos.min(tokens.len())]);
    parts
}

// ─────────────────────────────────────────────────────────────────────────────
// Rules
// ─────────────────────────────────────────────────────────────────────────────

/// Consume a list of rules. CDO/CDC are skipped only at top level.
pub fn consume_rule_list(tokens: &[Token], top_level: bool) -> Vec<RawRule<'_>> {
    let mut rules = Vec::new();
    let mut pos = 0;

    loop {
        while !at_end(tokens, pos) && tokens[pos].is_whitespace() {
            pos += 1;
        }
        if at_end(tokens, pos) {
            break;
        }

        match &tokens[pos].kind {
            TokenKind::AtKeyword(_) => {
                let (rule, next) = consume_at_rule(tokens, pos);
                rules.push(RawRule::At(rule));
                pos = next;
            }
            TokenKind::CDO | TokenKind::CDC if top_level => {
                pos += 1;
            }
            _ => {
                let (rule, next) = consume_qualified_rule(tokens, pos);
                if let Some(rule) = rule {
                    rules.push(RawRule::Qualified(rule));
                }
                pos = next;
            }
        }
    }

    rules
}

/// Consume an at-rule whose at-keyword is at `start`.
pub fn consume_at_rule(tokens: &[Token], start: usize) -> (AtRule<'_>, usize) {
    let head = &tokens[start];
    let name = match &head.kind {
        TokenKind::AtKeyword(name) => name.clone(),
        _ => String::new(),
    };
    let prelude_start = start + 1;
    let mut pos = prelude_start;

    loop {
        if at_end(tokens, pos) {
            let rule = AtRule {
                name,
                prelude: &tokens[prelude_start..pos],
                block: None,
                line: head.line,
                column: head.column,
            };
            return (rule, pos);
        }
        match tokens[pos].kind {
            TokenKind::Semicolon => {
                let rule = AtRule {
                    name,
                    prelude: &tokens[prelude_start..pos],
                    block: None,
                    line: head.line,
                    column: head.column,
                };
                return (rule, pos + 1);
            }
            TokenKind::LBrace => {
                let (block, end) = block_interior(tokens, pos);
                let rule = AtRule {
                    name,
                    prelude: &tokens[prelude_start..pos],
                    block: Some(block),
                    line: head.line,
                    column: head.column,
                };
                return (rule, end);
            }
            _ => pos = skip_component_value(tokens, pos),
        }
    }
}

/// Consume a qualified rule. Returns `None` (and the resume index) when EOF
/// is reached before a `{}` block.
pub fn consume_qualified_rule(tokens: &[Token], start: usize) -> (Option<QualifiedRule<'_>>, usize) {
    let mut pos = start;
    loop {
        if at_end(tokens, pos) {
            let at = &tokens[start];
            debug!(line = at.line, column = at.column, "dropping qualified rule without a block");
            return (None, pos);
        }
        if tokens[pos].kind == TokenKind::LBrace {
            let (block, end) = block_interior(tokens, pos);
            let rule = QualifiedRule {
                prelude: &tokens[start..pos],
                block,
            };
            return (Some(rule), end);
        }
        pos = skip_component_value(tokens, pos);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Declarations
// ─────────────────────────────────────────────────────────────────────────────

/// Parse a declaration list such as the contents of a `style` attribute.
pub fn parse_declaration_list(input: &str) -> Vec<Declaration> {
    let tokens = tokenize(input);
    consume_declaration_list(&tokens)
}

/// Consume a declaration list. Invalid declarations are skipped up to the
/// next top-level semicolon; at-rules are consumed and dropped.
pub fn consume_declaration_list(tokens: &[Token]) -> Vec<Declaration> {
    let mut declarations = Vec::new();
    let mut pos = 0;

    loop {
        while !at_end(tokens, pos)
            && (tokens[pos].is_whitespace() || tokens[pos].kind == TokenKind::Semicolon)
        {
            pos += 1;
        }
        if at_end(tokens, pos) {
            break;
        }

        if let TokenKind::AtKeyword(name) = &tokens[pos].kind {
            trace!(at_rule = %name, "dropping at-rule inside declaration list");
            let (_, next) = consume_at_rule(tokens, pos);
            pos = next;
            continue;
        }

        let start = pos;
        while !at_end(tokens, pos) && tokens[pos].kind != TokenKind::Semicolon {
            pos = skip_component_value(tokens, pos);
        }
        let span = &tokens[start..pos];
        match consume_declaration(span) {
            Some(decl) => declarations.push(decl),
            None => {
                let at = &tokens[start];
                debug!(line = at.line, column = at.column, "dropping invalid declaration");
            }
        }
    }

    declarations
}

/// Parse one `name: value [!important]` span.
pub fn consume_declaration(span: &[Token]) -> Option<Declaration> {
    let span = trim_whitespace(span);
    let TokenKind::Ident(raw_name) = &span.first()?.kind else {
        return None;
    };
    let mut pos = 1;
    while pos < span.len() && span[pos].is_whitespace() {
        pos += 1;
    }
    if span.get(pos)?.kind != TokenKind::Colon {
        return None;
    }
    pos += 1;

    let mut value = consume_component_values(&span[pos..]);
    let important = check_important(&mut value);
    trim_value(&mut value);

    let name = if raw_name.starts_with("--") {
        raw_name.clone()
    } else {
        raw_name.to_ascii_lowercase()
    };

    Some(Declaration {
        name,
        value,
        important,
    })
}

/// Detect a trailing `! important` and strip it from `value`.
fn check_important(value: &mut Vec<ComponentValue>) -> bool {
    trim_value(value);
    let len = value.len();
    if len < 2 {
        return false;
    }
    let is_important_ident = value[len - 1]
        .ident()
        .is_some_and(|s| s.eq_ignore_ascii_case("important"));
    if !is_important_ident {
        return false;
    }
    let mut bang = len - 2;
    while bang > 0 && value[bang].is_whitespace() {
        bang -= 1;
    }
    if value[bang].token() != Some(&TokenKind::Delim('!')) {
        return false;
    }
    value.truncate(bang);
    true
}

fn trim_value(value: &mut Vec<ComponentValue>) {
    while value.last().is_some_and(ComponentValue::is_whitespace) {
        value.pop();
    }
    let leading = value.iter().take_while(|v| v.is_whitespace()).count();
    value.drain(..leading);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_component_values_nest() {
        let values = parse_component_values("a(b [c] {d}) (e");
        assert_eq!(values.len(), 3);
        match &values[0] {
            ComponentValue::Function { name, values } => {
                assert_eq!(name, "a");
                assert!(matches!(values[2], ComponentValue::Block { kind: BlockKind::Bracket, .. }));
                assert!(matches!(values[4], ComponentValue::Block { kind: BlockKind::Brace, .. }));
            }
            other => panic!("expected function, got {other:?}"),
        }
        // Unclosed block runs to EOF.
        match &values[2] {
            ComponentValue::Block { kind, values } => {
                assert_eq!(*kind, BlockKind::Paren);
                assert_eq!(values.len(), 1);
            }
            other => panic!("expected block, got {other:?}"),
        }
    }

    #[test]
    fn test_rule_list() {
        let tokens = tokenize("<!-- a { color: red } @media screen { b {} } @import 'x.css'; -->");
        let rules = consume_rule_list(&tokens, true);
        assert_eq!(rules.len(), 3);
        match &rules[0] {
            RawRule::Qualified(q) => {
                assert_eq!(crate::token::tokens_to_css(trim_whitespace(q.prelude)), "a");
                assert_eq!(q.block_values().len(), 6);
            }
            other => panic!("unexpected {other:?}"),
        }
        match &rules[1] {
            RawRule::At(at) => {
                assert_eq!(at.name, "media");
                let inner = consume_rule_list(at.block.unwrap_or(&[]), false);
                assert_eq!(inner.len(), 1);
            }
            other => panic!("unexpected {other:?}"),
        }
        match &rules[2] {
            RawRule::At(at) => {
                assert_eq!(at.name, "import");
                assert!(at.block.is_none());
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_qualified_rule_without_block_is_dropped() {
        let tokens = tokenize("a { x: y } b");
        let rules = consume_rule_list(&tokens, true);
        assert_eq!(rules.len(), 1);
    }

    #[test]
    fn test_declarations_partial_failure() {
        let decls = parse_declaration_list("color: red; 12px; margin 0; @foo bar; padding: 1px 2px");
        assert_eq!(decls.len(), 2);
        assert_eq!(decls[0].name, "color");
        assert_eq!(decls[0].value_text(), "red");
        assert_eq!(decls[1].name, "padding");
        assert_eq!(decls[1].value_text(), "1px 2px");
    }

    #[test]
    fn test_important_detection() {
        let decls = parse_declaration_list("color: red !important; width: 1px ! IMPORTANT; x: !important");
        assert!(decls[0].important);
        assert_eq!(decls[0].value_text(), "red");
        assert!(decls[1].important);
        assert_eq!(decls[1].value_text(), "1px");
        assert!(decls[2].important);
        assert!(decls[2].value.is_empty());

        let decls = parse_declaration_list("content: important");
        assert!(!decls[0].important);
    }

    #[test]
    fn test_name_case() {
        let decls = parse_declaration_list("COLOR: red; --Main-Color: blue");
        assert_eq!(decls[0].name, "color");
        assert_eq!(decls[1].name, "--Main-Color");
    }

    #[test]
    fn test_semicolon_inside_block_does_not_split() {
        let decls = parse_declaration_list("--x: { a; b }; color: red");
        assert_eq!(decls.len(), 2);
        assert_eq!(decls[0].value_text(), "{ a; b }");
    }

    #[test]
    fn test_split_on_commas() {
        let tokens = tokenize("a, b(c, d), e");
        let parts = split_on_commas(&tokens);
        assert_eq!(parts.len(), 3);
        assert_eq!(crate::token::tokens_to_css(trim_whitespace(parts[1])), "b(c, d)");
    }
}
