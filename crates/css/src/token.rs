//! CSS tokenizer per CSS Syntax Level 3.
//!
//! The tokenizer never fails: malformed input is reported inline as
//! [`TokenKind::BadString`] / [`TokenKind::BadUrl`] and tokenizing continues.
//! The produced stream always ends with a [`TokenKind::EOF`] token.

use std::fmt::Write as _;

/// Token kinds per CSS Syntax Level 3.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Ident(String),
    Function(String),
    AtKeyword(String),
    /// `is_id` is set when the hash value would itself start an identifier.
    Hash { value: String, is_id: bool },
    String(String),
    BadString,
    Url(String),
    BadUrl,
    Delim(char),
    Number { value: f64, is_integer: bool },
    Percentage(f64),
    Dimension { value: f64, is_integer: bool, unit: String },
    UnicodeRange { start: u32, end: u32 },
    Whitespace,
    /// `<!--`
    CDO,
    /// `-->`
    CDC,
    Colon,
    Semicolon,
    Comma,
    LBracket,
    RBracket,
    LParen,
    RParen,
    LBrace,
    RBrace,
    /// Only produced when comment preservation is enabled.
    Comment(String),
    EOF,
}

/// A token plus the 1-based source position of its first code point.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub line: u32,
    pub column: u32,
}

impl Token {
    pub fn new(kind: TokenKind, line: u32, column: u32) -> Self {
        Self { kind, line, column }
    }

    pub fn is_whitespace(&self) -> bool {
        self.kind == TokenKind::Whitespace
    }

    pub fn is_eof(&self) -> bool {
        self.kind == TokenKind::EOF
    }

    /// Serialize the token back to CSS text.
    pub fn to_css(&self) -> String {
        let mut out = String::new();
        self.kind.write_css(&mut out);
        out
    }
}

impl TokenKind {
    /// Append the CSS text for this token to `out`.
    pub fn write_css(&self, out: &mut String) {
        match self {
            TokenKind::Ident(name) => serialize_identifier(name, out),
            TokenKind::Function(name) => {
                serialize_identifier(name, out);
                out.push('(');
            }
            TokenKind::AtKeyword(name) => {
                out.push('@');
                serialize_identifier(name, out);
            }
            TokenKind::Hash { value, .. } => {
                out.push('#');
                serialize_name(value, out);
            }
            TokenKind::String(s) => serialize_string(s, out),
            TokenKind::BadString => out.push('"'),
            TokenKind::Url(url) => {
                out.push_str("url(");
                serialize_string(url, out);
                out.push(')');
            }
            TokenKind::BadUrl => out.push_str("url()"),
            TokenKind::Delim(c) => out.push(*c),
            TokenKind::Number { value, .. } => write_number(*value, out),
            TokenKind::Percentage(value) => {
                write_number(*value, out);
                out.push('%');
            }
            TokenKind::Dimension { value, unit, .. } => {
                write_number(*value, out);
                // A unit like `e3` would read back as an exponent.
                let mut unit_chars = unit.chars();
                let exponent_like = matches!(unit_chars.next(), Some('e' | 'E'))
                    && unit_chars
                        .next()
                        .is_some_and(|c| c.is_ascii_digit() || c == '-' || c == '+');
                if exponent_like {
                    out.push_str("\\65 ");
                    serialize_name(&unit[1..], out);
                } else {
                    serialize_name(unit, out);
                }
            }
            TokenKind::UnicodeRange { start, end } => {
                if start == end {
                    let _ = write!(out, "U+{start:X}");
                } else {
                    let _ = write!(out, "U+{start:X}-{end:X}");
                }
            }
            TokenKind::Whitespace => out.push(' '),
            TokenKind::CDO => out.push_str("<!--"),
            TokenKind::CDC => out.push_str("-->"),
            TokenKind::Colon => out.push(':'),
            TokenKind::Semicolon => out.push(';'),
            TokenKind::Comma => out.push(','),
            TokenKind::LBracket => out.push('['),
            TokenKind::RBracket => out.push(']'),
            TokenKind::LParen => out.push('('),
            TokenKind::RParen => out.push(')'),
            TokenKind::LBrace => out.push('{'),
            TokenKind::RBrace => out.push('}'),
            TokenKind::Comment(text) => {
                out.push_str("/*");
                out.push_str(text);
                out.push_str("*/");
            }
            TokenKind::EOF => {}
        }
    }
}

/// Serialize a slice of tokens (EOF excluded) back to CSS text.
pub fn tokens_to_css(tokens: &[Token]) -> String {
    let mut out = String::new();
    for token in tokens {
        token.kind.write_css(&mut out);
    }
    out
}

/// Tokenize `input` into a token stream terminated by an EOF token.
pub fn tokenize(input: &str) -> Vec<Token> {
    Tokenizer::new(input).tokenize_all()
}

/// Replace CR, CRLF and form feed with LF, and NUL with U+FFFD.
pub fn preprocess(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                out.push('\n');
            }
            '\x0C' => out.push('\n'),
            '\0' => out.push('\u{FFFD}'),
            _ => out.push(ch),
        }
    }
    out
}

/// A CSS tokenizer that processes an input string into a stream of [`Token`]s.
pub struct Tokenizer {
    input: Vec<char>,
    pos: usize,
    /// Char offsets at which each line starts.
    line_starts: Vec<usize>,
    preserve_comments: bool,
    /// Produce unicode-range tokens everywhere, not only in the value of a
    /// `unicode-range` descriptor.
    unicode_ranges: bool,
    /// Descriptor context: braces opened, and whether the last significant
    /// token was a `unicode-range` ident or we are inside its value.
    block_depth: usize,
    after_range_name: bool,
    in_range_value: bool,
}

impl Tokenizer {
    /// Create a new tokenizer; the input is preprocessed first.
    pub fn new(input: &str) -> Self {
        let input: Vec<char> = preprocess(input).chars().collect();
        let mut line_starts = vec![0];
        for (i, &c) in input.iter().enumerate() {
            if c == '\n' {
                line_starts.push(i + 1);
            }
        }
        Self {
            input,
            pos: 0,
            line_starts,
            preserve_comments: false,
            unicode_ranges: false,
            block_depth: 0,
            after_range_name: false,
            in_range_value: false,
        }
    }

    /// Emit [`TokenKind::Comment`] tokens instead of discarding comments.
    pub fn preserve_comments(mut self, preserve: bool) -> Self {
        self.preserve_comments = preserve;
        self
    }

    /// Read `u+…` as [`TokenKind::UnicodeRange`] anywhere. By default that
    /// only happens inside a `unicode-range` descriptor value, so selectors
    /// such as `u+a` keep their `u`, `+`, `a` tokens.
    pub fn unicode_ranges(mut self, enabled: bool) -> Self {
        self.unicode_ranges = enabled;
        self
    }

    /// Tokenize the entire input. The last token is always EOF.
    pub fn tokenize_all(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            let tok = self.next_token();
            let done = tok.is_eof();
            tokens.push(tok);
            if done {
                break;
            }
        }
        tokens
    }

    /// Consume and return the next token.
    pub fn next_token(&mut self) -> Token {
        if !self.preserve_comments {
            self.skip_comments();
        }
        let (line, column) = self.location(self.pos);
        let kind = self.next_kind();
        self.track_descriptor(&kind);
        Token::new(kind, line, column)
    }

    fn track_descriptor(&mut self, kind: &TokenKind) {
        match kind {
            TokenKind::Whitespace | TokenKind::Comment(_) => {}
            TokenKind::Ident(name) => {
                self.after_range_name = self.block_depth > 0 && name.eq_ignore_ascii_case("unicode-range");
            }
            TokenKind::Colon => {
                self.in_range_value = self.after_range_name;
                self.after_range_name = false;
            }
            TokenKind::LBrace | TokenKind::RBrace | TokenKind::Semicolon | TokenKind::EOF => {
                if *kind == TokenKind::LBrace {
                    self.block_depth += 1;
                } else if *kind == TokenKind::RBrace {
                    self.block_depth = self.block_depth.saturating_sub(1);
                }
                self.after_range_name = false;
                self.in_range_value = false;
            }
            _ => self.after_range_name = false,
        }
    }

    fn location(&self, pos: usize) -> (u32, u32) {
        let line_idx = match self.line_starts.binary_search(&pos) {
            Ok(i) => i,
            Err(i) => i - 1,
        };
        let column = pos - self.line_starts[line_idx];
        (line_idx as u32 + 1, column as u32 + 1)
    }

    fn next_kind(&mut self) -> TokenKind {
        if self.pos >= self.input.len() {
            return TokenKind::EOF;
        }

        let ch = self.peek();

        if self.preserve_comments && ch == '/' && self.peek_at(1) == Some('*') {
            return self.consume_comment();
        }

        if is_whitespace(ch) {
            self.consume_whitespace();
            return TokenKind::Whitespace;
        }

        if ch == '"' || ch == '\'' {
            return self.consume_string(ch);
        }

        if ch == '#' {
            self.advance();
            if self.pos < self.input.len()
                && (is_name_char(self.peek()) || self.starts_valid_escape_at(self.pos))
            {
                let is_id = self.would_start_ident_at(self.pos);
                let value = self.consume_name();
                return TokenKind::Hash { value, is_id };
            }
            return TokenKind::Delim('#');
        }

        if ch == '+' {
            if self.starts_number_at(self.pos) {
                return self.consume_numeric();
            }
            self.advance();
            return TokenKind::Delim('+');
        }

        if ch == '-' {
            if self.starts_number_at(self.pos) {
                return self.consume_numeric();
            }
            if self.matches_ahead("-->") {
                self.pos += 3;
                return TokenKind::CDC;
            }
            if self.would_start_ident_at(self.pos) {
                return self.consume_ident_like();
            }
            self.advance();
            return TokenKind::Delim('-');
        }

        if ch == '.' {
            if self.starts_number_at(self.pos) {
                return self.consume_numeric();
            }
            self.advance();
            return TokenKind::Delim('.');
        }

        if ch.is_ascii_digit() {
            return self.consume_numeric();
        }

        if ch == '@' {
            self.advance();
            if self.would_start_ident_at(self.pos) {
                let name = self.consume_name();
                return TokenKind::AtKeyword(name);
            }
            return TokenKind::Delim('@');
        }

        if ch == '<' && self.matches_ahead("<!--") {
            self.pos += 4;
            return TokenKind::CDO;
        }

        if ch == '\\' {
            if self.starts_valid_escape_at(self.pos) {
                return self.consume_ident_like();
            }
            // Parse error: lone backslash or backslash-newline.
            self.advance();
            return TokenKind::Delim('\\');
        }

        if (ch == 'u' || ch == 'U')
            && (self.unicode_ranges || self.in_range_value)
            && self.starts_unicode_range()
        {
            self.advance(); // 'u'
            self.advance(); // '+'
            return self.consume_unicode_range();
        }

        match ch {
            ':' => { self.advance(); TokenKind::Colon }
            ';' => { self.advance(); TokenKind::Semicolon }
            ',' => { self.advance(); TokenKind::Comma }
            '[' => { self.advance(); TokenKind::LBracket }
            ']' => { self.advance(); TokenKind::RBracket }
            '(' => { self.advance(); TokenKind::LParen }
            ')' => { self.advance(); TokenKind::RParen }
            '{' => { self.advance(); TokenKind::LBrace }
            '}' => { self.advance(); TokenKind::RBrace }
            _ => {
                if is_name_start_char(ch) {
                    return self.consume_ident_like();
                }
                self.advance();
                TokenKind::Delim(ch)
            }
        }
    }

    // --- Helper methods ---

    fn peek(&self) -> char {
        self.input[self.pos]
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.input.get(self.pos + offset).copied()
    }

    fn advance(&mut self) -> char {
        let ch = self.input[self.pos];
        self.pos += 1;
        ch
    }

    fn matches_ahead(&self, s: &str) -> bool {
        s.chars()
            .enumerate()
            .all(|(i, c)| self.peek_at(i) == Some(c))
    }

    /// Comments are not nested: the first `*/` ends the comment.
    fn skip_comments(&mut self) {
        while self.peek_at(0) == Some('/') && self.peek_at(1) == Some('*') {
            self.pos += 2;
            loop {
                if self.pos + 1 >= self.input.len() {
                    self.pos = self.input.len();
                    return;
                }
                if self.input[self.pos] == '*' && self.input[self.pos + 1] == '/' {
                    self.pos += 2;
                    break;
                }
                self.pos += 1;
            }
        }
    }

    fn consume_comment(&mut self) -> TokenKind {
        self.pos += 2;
        let mut text = String::new();
        while self.pos < self.input.len() {
            if self.input[self.pos] == '*' && self.peek_at(1) == Some('/') {
                self.pos += 2;
                return TokenKind::Comment(text);
            }
            text.push(self.advance());
        }
        TokenKind::Comment(text)
    }

    fn consume_whitespace(&mut self) {
        while self.pos < self.input.len() && is_whitespace(self.input[self.pos]) {
            self.pos += 1;
        }
    }

    fn consume_string(&mut self, quote: char) -> TokenKind {
        self.advance(); // opening quote
        let mut value = String::new();
        loop {
            if self.pos >= self.input.len() {
                // EOF in string: parse error, but the string is still returned.
                return TokenKind::String(value);
            }
            let ch = self.peek();
            if ch == quote {
                self.advance();
                return TokenKind::String(value);
            }
            match ch {
                '\n' => {
                    // The newline is left for the next token.
                    return TokenKind::BadString;
                }
                '\\' => {
                    self.advance();
                    match self.peek_at(0) {
                        None => {}
                        Some('\n') => {
                            // Escaped newline is a line continuation.
                            self.advance();
                        }
                        Some(_) => value.push(self.consume_escape()),
                    }
                }
                _ => {
                    value.push(ch);
                    self.advance();
                }
            }
        }
    }

    /// Consume an escaped code point; the backslash is already consumed.
    fn consume_escape(&mut self) -> char {
        if self.pos >= self.input.len() {
            return '\u{FFFD}';
        }
        let ch = self.advance();
        if !ch.is_ascii_hexdigit() {
            return ch;
        }
        let mut cp = ch.to_digit(16).unwrap_or(0);
        let mut digits = 1;
        while digits < 6 {
            match self.peek_at(0).and_then(|c| c.to_digit(16)) {
                Some(d) => {
                    cp = cp * 16 + d;
                    self.pos += 1;
                    digits += 1;
                }
                None => break,
            }
        }
        if self.pos < self.input.len() && is_whitespace(self.input[self.pos]) {
            self.pos += 1;
        }
        if cp == 0 || (0xD800..=0xDFFF).contains(&cp) || cp > 0x10FFFF {
            return '\u{FFFD}';
        }
        char::from_u32(cp).unwrap_or('\u{FFFD}')
    }

    fn starts_valid_escape_at(&self, idx: usize) -> bool {
        match (self.input.get(idx), self.input.get(idx + 1)) {
            (Some('\\'), Some(next)) => *next != '\n',
            _ => false,
        }
    }

    fn would_start_ident_at(&self, start: usize) -> bool {
        let Some(&ch) = self.input.get(start) else {
            return false;
        };
        if is_name_start_char(ch) {
            return true;
        }
        match ch {
            '-' => match self.input.get(start + 1) {
                Some(&next) if is_name_start_char(next) || next == '-' => true,
                Some('\\') => self.starts_valid_escape_at(start + 1),
                _ => false,
            },
            '\\' => self.starts_valid_escape_at(start),
            _ => false,
        }
    }

    fn starts_number_at(&self, start: usize) -> bool {
        let Some(&ch) = self.input.get(start) else {
            return false;
        };
        let digit_at = |i: usize| self.input.get(i).is_some_and(|c| c.is_ascii_digit());
        match ch {
            '0'..='9' => true,
            '+' | '-' => {
                digit_at(start + 1)
                    || (self.input.get(start + 1) == Some(&'.') && digit_at(start + 2))
            }
            '.' => digit_at(start + 1),
            _ => false,
        }
    }

    fn starts_unicode_range(&self) -> bool {
        self.peek_at(1) == Some('+')
            && self
                .peek_at(2)
                .is_some_and(|c| c == '?' || c.is_ascii_hexdigit())
    }

    fn consume_unicode_range(&mut self) -> TokenKind {
        let mut digits = String::new();
        while digits.len() < 6 {
            match self.peek_at(0) {
                Some(c) if c.is_ascii_hexdigit() => {
                    digits.push(c);
                    self.pos += 1;
                }
                _ => break,
            }
        }
        let mut wildcards = 0;
        while digits.len() + wildcards < 6 && self.peek_at(0) == Some('?') {
            wildcards += 1;
            self.pos += 1;
        }

        if wildcards > 0 {
            let start_text = format!("{digits}{}", "0".repeat(wildcards));
            let end_text = format!("{digits}{}", "F".repeat(wildcards));
            let start = u32::from_str_radix(&start_text, 16).unwrap_or(0);
            let end = u32::from_str_radix(&end_text, 16).unwrap_or(0);
            return TokenKind::UnicodeRange { start, end };
        }

        let start = u32::from_str_radix(&digits, 16).unwrap_or(0);
        if self.peek_at(0) == Some('-') && self.peek_at(1).is_some_and(|c| c.is_ascii_hexdigit()) {
            self.pos += 1;
            let mut end_digits = String::new();
            while end_digits.len() < 6 {
                match self.peek_at(0) {
                    Some(c) if c.is_ascii_hexdigit() => {
                        end_digits.push(c);
                        self.pos += 1;
                    }
                    _ => break,
                }
            }
            let end = u32::from_str_radix(&end_digits, 16).unwrap_or(0);
            return TokenKind::UnicodeRange { start, end };
        }
        TokenKind::UnicodeRange { start, end: start }
    }

    fn consume_name(&mut self) -> String {
        let mut name = String::new();
        while self.pos < self.input.len() {
            let ch = self.input[self.pos];
            if is_name_char(ch) {
                name.push(ch);
                self.pos += 1;
            } else if self.starts_valid_escape_at(self.pos) {
                self.pos += 1; // backslash
                name.push(self.consume_escape());
            } else {
                break;
            }
        }
        name
    }

    fn consume_numeric(&mut self) -> TokenKind {
        let (value, is_integer) = self.consume_number();

        if self.would_start_ident_at(self.pos) {
            let unit = self.consume_name();
            return TokenKind::Dimension { value, is_integer, unit };
        }

        if self.peek_at(0) == Some('%') {
            self.pos += 1;
            return TokenKind::Percentage(value);
        }

        TokenKind::Number { value, is_integer }
    }

    fn consume_number(&mut self) -> (f64, bool) {
        let mut repr = String::new();
        let mut is_integer = true;

        if matches!(self.peek_at(0), Some('+') | Some('-')) {
            repr.push(self.advance());
        }

        while self.peek_at(0).is_some_and(|c| c.is_ascii_digit()) {
            repr.push(self.advance());
        }

        if self.peek_at(0) == Some('.') && self.peek_at(1).is_some_and(|c| c.is_ascii_digit()) {
            is_integer = false;
            repr.push(self.advance());
            while self.peek_at(0).is_some_and(|c| c.is_ascii_digit()) {
                repr.push(self.advance());
            }
        }

        if matches!(self.peek_at(0), Some('e') | Some('E')) {
            let has_exp = match self.peek_at(1) {
                Some(c) if c.is_ascii_digit() => true,
                Some('+') | Some('-') => self.peek_at(2).is_some_and(|c| c.is_ascii_digit()),
                _ => false,
            };
            if has_exp {
                is_integer = false;
                repr.push(self.advance());
                if matches!(self.peek_at(0), Some('+') | Some('-')) {
                    repr.push(self.advance());
                }
                while self.peek_at(0).is_some_and(|c| c.is_ascii_digit()) {
                    repr.push(self.advance());
                }
            }
        }

        let value = repr.parse::<f64>().unwrap_or(0.0);
        (value, is_integer)
    }

    fn consume_ident_like(&mut self) -> TokenKind {
        let name = self.consume_name();

        if self.peek_at(0) != Some('(') {
            return TokenKind::Ident(name);
        }
        self.advance(); // '('

        if !name.eq_ignore_ascii_case("url") {
            return TokenKind::Function(name);
        }

        // Leave a single whitespace in front of a quote for the normal tokenizer.
        while self.peek_at(0).is_some_and(is_whitespace) && self.peek_at(1).is_some_and(is_whitespace) {
            self.pos += 1;
        }
        let quote_next = |c: Option<char>| matches!(c, Some('"') | Some('\''));
        if quote_next(self.peek_at(0))
            || (self.peek_at(0).is_some_and(is_whitespace) && quote_next(self.peek_at(1)))
        {
            return TokenKind::Function(name);
        }
        self.consume_url()
    }

    fn consume_url(&mut self) -> TokenKind {
        self.consume_whitespace();
        let mut url = String::new();
        loop {
            let Some(ch) = self.peek_at(0) else {
                // EOF: parse error, return what we have.
                return TokenKind::Url(url);
            };
            match ch {
                ')' => {
                    self.advance();
                    return TokenKind::Url(url);
                }
                c if is_whitespace(c) => {
                    self.consume_whitespace();
                    match self.peek_at(0) {
                        None => return TokenKind::Url(url),
                        Some(')') => {
                            self.advance();
                            return TokenKind::Url(url);
                        }
                        Some(_) => {
                            self.consume_bad_url_remnants();
                            return TokenKind::BadUrl;
                        }
                    }
                }
                '"' | '\'' | '(' => {
                    self.consume_bad_url_remnants();
                    return TokenKind::BadUrl;
                }
                c if is_non_printable(c) => {
                    self.consume_bad_url_remnants();
                    return TokenKind::BadUrl;
                }
                '\\' => {
                    if self.starts_valid_escape_at(self.pos) {
                        self.advance();
                        url.push(self.consume_escape());
                    } else {
                        self.consume_bad_url_remnants();
                        return TokenKind::BadUrl;
                    }
                }
                _ => {
                    url.push(ch);
                    self.advance();
                }
            }
        }
    }

    /// Resynchronize after a bad url: skip to the next unescaped `)` or EOF.
    fn consume_bad_url_remnants(&mut self) {
        while self.pos < self.input.len() {
            if self.starts_valid_escape_at(self.pos) {
                self.advance();
                self.consume_escape();
                continue;
            }
            if self.advance() == ')' {
                return;
            }
        }
    }
}

fn is_whitespace(ch: char) -> bool {
    matches!(ch, ' ' | '\t' | '\n')
}

fn is_name_start_char(ch: char) -> bool {
    ch.is_ascii_alphabetic() || ch == '_' || !ch.is_ascii()
}

fn is_name_char(ch: char) -> bool {
    is_name_start_char(ch) || ch.is_ascii_digit() || ch == '-'
}

fn is_non_printable(ch: char) -> bool {
    matches!(ch, '\0'..='\x08' | '\x0B' | '\x0E'..='\x1F' | '\x7F')
}

fn write_number(value: f64, out: &mut String) {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        let _ = write!(out, "{}", value as i64);
    } else {
        let _ = write!(out, "{value}");
    }
}

/// Serialize an identifier, escaping characters that cannot appear raw.
pub fn serialize_identifier(name: &str, out: &mut String) {
    let mut chars = name.chars().peekable();
    if name == "-" {
        out.push_str("\\-");
        return;
    }
    if name.starts_with('-') {
        out.push('-');
        chars.next();
    }
    if let Some(&first) = chars.peek() {
        if first.is_ascii_digit() {
            let _ = write!(out, "\\{:x} ", first as u32);
            chars.next();
        }
    }
    for c in chars {
        write_name_char(c, out);
    }
}

fn serialize_name(name: &str, out: &mut String) {
    for c in name.chars() {
        write_name_char(c, out);
    }
}

fn write_name_char(c: char, out: &mut String) {
    if is_name_char(c) {
        out.push(c);
    } else if c.is_control() {
        let _ = write!(out, "\\{:x} ", c as u32);
    } else {
        out.push('\\');
        out.push(c);
    }
}

/// Serialize a string as a double-quoted CSS string.
pub fn serialize_string(value: &str, out: &mut String) {
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\a "),
            c if c.is_control() => {
                let _ = write!(out, "\\{:x} ", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push('"');
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<TokenKind> {
        tokenize(input).into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_basic_tokens() {
        let tokens = kinds("body { color: red; }");
        assert_eq!(tokens[0], TokenKind::Ident("body".into()));
        assert_eq!(tokens[1], TokenKind::Whitespace);
        assert_eq!(tokens[2], TokenKind::LBrace);
        assert_eq!(tokens[4], TokenKind::Ident("color".into()));
        assert_eq!(tokens[5], TokenKind::Colon);
        assert_eq!(tokens[7], TokenKind::Ident("red".into()));
        assert_eq!(tokens[8], TokenKind::Semicolon);
        assert_eq!(tokens[10], TokenKind::RBrace);
        assert_eq!(tokens[11], TokenKind::EOF);
        assert_eq!(tokens.len(), 12);
    }

    #[test]
    fn test_dimension_and_percentage() {
        assert_eq!(
            kinds("10px"),
            vec![
                TokenKind::Dimension { value: 10.0, is_integer: true, unit: "px".into() },
                TokenKind::EOF,
            ]
        );
        assert_eq!(kinds("50%"), vec![TokenKind::Percentage(50.0), TokenKind::EOF]);
    }

    #[test]
    fn test_numbers() {
        let tokens = kinds("2.5em 100 +5 -.5 1e2 3.14E+1");
        assert_eq!(
            tokens[0],
            TokenKind::Dimension { value: 2.5, is_integer: false, unit: "em".into() }
        );
        assert_eq!(tokens[2], TokenKind::Number { value: 100.0, is_integer: true });
        assert_eq!(tokens[4], TokenKind::Number { value: 5.0, is_integer: true });
        assert_eq!(tokens[6], TokenKind::Number { value: -0.5, is_integer: false });
        assert_eq!(tokens[8], TokenKind::Number { value: 100.0, is_integer: false });
        assert_eq!(tokens[10], TokenKind::Number { value: 31.4, is_integer: false });
    }

    #[test]
    fn test_plus_minus_delims() {
        let tokens = kinds("a + b - c");
        assert_eq!(tokens[2], TokenKind::Delim('+'));
        assert_eq!(tokens[6], TokenKind::Delim('-'));
        assert_eq!(kinds("-foo")[0], TokenKind::Ident("-foo".into()));
        assert_eq!(kinds("--var")[0], TokenKind::Ident("--var".into()));
    }

    #[test]
    fn test_exponent_needs_digit() {
        // `1em` is a dimension, not an exponent.
        assert_eq!(
            kinds("1em")[0],
            TokenKind::Dimension { value: 1.0, is_integer: true, unit: "em".into() }
        );
    }

    #[test]
    fn test_strings_and_bad_string() {
        let tokens = kinds(r#""hello" 'world'"#);
        assert_eq!(tokens[0], TokenKind::String("hello".into()));
        assert_eq!(tokens[2], TokenKind::String("world".into()));

        let tokens = kinds("\"abc\ndef");
        assert_eq!(tokens[0], TokenKind::BadString);
        assert_eq!(tokens[1], TokenKind::Whitespace);
        assert_eq!(tokens[2], TokenKind::Ident("def".into()));
    }

    #[test]
    fn test_string_line_continuation() {
        assert_eq!(kinds("\"ab\\\ncd\"")[0], TokenKind::String("abcd".into()));
    }

    #[test]
    fn test_escapes() {
        assert_eq!(kinds("\\41 B")[0], TokenKind::Ident("AB".into()));
        assert_eq!(kinds("\\0")[0], TokenKind::Ident("\u{FFFD}".into()));
        assert_eq!(kinds("\\D800")[0], TokenKind::Ident("\u{FFFD}".into()));
        assert_eq!(kinds("\\110000")[0], TokenKind::Ident("\u{FFFD}".into()));
        assert_eq!(kinds("a\\.b")[0], TokenKind::Ident("a.b".into()));
    }

    #[test]
    fn test_hash_token() {
        let tokens = kinds("#main #123 #-x");
        assert_eq!(tokens[0], TokenKind::Hash { value: "main".into(), is_id: true });
        assert_eq!(tokens[2], TokenKind::Hash { value: "123".into(), is_id: false });
        assert_eq!(tokens[4], TokenKind::Hash { value: "-x".into(), is_id: true });
        assert_eq!(kinds("# ")[0], TokenKind::Delim('#'));
    }

    #[test]
    fn test_at_keyword_and_function() {
        let tokens = kinds("@media rgb(255, 0, 0)");
        assert_eq!(tokens[0], TokenKind::AtKeyword("media".into()));
        assert_eq!(tokens[2], TokenKind::Function("rgb".into()));
        assert_eq!(tokens[3], TokenKind::Number { value: 255.0, is_integer: true });
    }

    #[test]
    fn test_url_tokens() {
        assert_eq!(
            kinds("url(https://example.com/img.png)")[0],
            TokenKind::Url("https://example.com/img.png".into())
        );
        assert_eq!(kinds("url(  a.png  )")[0], TokenKind::Url("a.png".into()));
        let quoted = kinds("url(\"a.png\")");
        assert_eq!(quoted[0], TokenKind::Function("url".into()));
        assert_eq!(quoted[1], TokenKind::String("a.png".into()));
        assert_eq!(quoted[2], TokenKind::RParen);
    }

    #[test]
    fn test_bad_url_resynchronizes() {
        let tokens = kinds("url(a b) x");
        assert_eq!(tokens[0], TokenKind::BadUrl);
        assert_eq!(tokens[1], TokenKind::Whitespace);
        assert_eq!(tokens[2], TokenKind::Ident("x".into()));

        let tokens = kinds("url(a\"b\\)c) y");
        assert_eq!(tokens[0], TokenKind::BadUrl);
        assert_eq!(tokens[2], TokenKind::Ident("y".into()));
    }

    #[test]
    fn test_unicode_range() {
        let ranges = |input: &str| -> Vec<TokenKind> {
            Tokenizer::new(input).unicode_ranges(true).tokenize_all().into_iter().map(|t| t.kind).collect()
        };
        assert_eq!(ranges("U+26")[0], TokenKind::UnicodeRange { start: 0x26, end: 0x26 });
        assert_eq!(ranges("u+0-7F")[0], TokenKind::UnicodeRange { start: 0, end: 0x7F });
        assert_eq!(ranges("U+4??")[0], TokenKind::UnicodeRange { start: 0x400, end: 0x4FF });
    }

    #[test]
    fn test_unicode_range_only_in_descriptor_value() {
        assert_eq!(
            kinds("u+a"),
            vec![
                TokenKind::Ident("u".into()),
                TokenKind::Delim('+'),
                TokenKind::Ident("a".into()),
                TokenKind::EOF,
            ]
        );
        assert_eq!(kinds("u+abbr")[2], TokenKind::Ident("abbr".into()));

        let tokens = kinds("@font-face { unicode-range: U+0-7F, u+4?? ; src: x } u+b {}");
        let ranges: Vec<&TokenKind> = tokens
            .iter()
            .filter(|k| matches!(k, TokenKind::UnicodeRange { .. }))
            .collect();
        assert_eq!(
            ranges,
            vec![
                &TokenKind::UnicodeRange { start: 0, end: 0x7F },
                &TokenKind::UnicodeRange { start: 0x400, end: 0x4FF },
            ]
        );
        assert!(tokens.contains(&TokenKind::Ident("b".into())));

        // The descriptor name alone at top level is not a declaration.
        assert_eq!(kinds("unicode-range:u+a")[2], TokenKind::Ident("u".into()));
    }

    #[test]
    fn test_comments_skipped() {
        let tokens = kinds("a /* comment */ b");
        assert_eq!(tokens[0], TokenKind::Ident("a".into()));
        assert_eq!(tokens[1], TokenKind::Whitespace);
        assert_eq!(tokens[2], TokenKind::Whitespace);
        assert_eq!(tokens[3], TokenKind::Ident("b".into()));
        // Comments do not nest.
        assert_eq!(kinds("/* /* */x")[0], TokenKind::Ident("x".into()));
    }

    #[test]
    fn test_comments_preserved() {
        let tokens = Tokenizer::new("a/*c*/").preserve_comments(true).tokenize_all();
        assert_eq!(tokens[1].kind, TokenKind::Comment("c".into()));
    }

    #[test]
    fn test_cdo_cdc() {
        let tokens = kinds("<!-- -->");
        assert_eq!(tokens[0], TokenKind::CDO);
        assert_eq!(tokens[2], TokenKind::CDC);
    }

    #[test]
    fn test_preprocessing_and_locations() {
        let tokens = tokenize("a\r\nb\rc\x0Cd\0");
        let idents: Vec<_> = tokens
            .iter()
            .filter(|t| matches!(t.kind, TokenKind::Ident(_)))
            .map(|t| (t.line, t.column))
            .collect();
        assert_eq!(idents, vec![(1, 1), (2, 1), (3, 1), (4, 1)]);
        assert_eq!(tokens[6].kind, TokenKind::Ident("d\u{FFFD}".into()));
    }

    #[test]
    fn test_serialization() {
        let tokens = tokenize("10px \"a\\\"b\" #x .5em");
        assert_eq!(tokens_to_css(&tokens), "10px \"a\\\"b\" #x 0.5em");
    }
}
