// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! The lexer implementation using logos.

use hew_ast::token::{FStringPart, Keyword, Token, TokenKind};
use hew_ast::Span;
use logos::Logos;

/// Raw token type for logos - values and keywords are resolved in a second pass.
#[derive(Logos, Debug, Clone, PartialEq)]
enum RawToken {
    // === Trivia ===
    #[regex(r"[ \t\r\n\f]+")]
    Whitespace,

    #[regex(r"//[^\n]*")]
    LineComment,

    /// Field is false when the comment runs to end of input.
    #[token("/*", block_comment)]
    BlockComment(bool),

    // === Operators (longest match wins) ===
    #[token("..=")]
    DotDotEq,
    #[token("...")]
    DotDotDot,

    #[token("==")]
    EqEq,
    #[token("!=")]
    BangEq,
    #[token("<=")]
    LtEq,
    #[token(">=")]
    GtEq,
    #[token("&&")]
    AmpAmp,
    #[token("||")]
    PipePipe,
    #[token("..")]
    DotDot,
    #[token("->")]
    Arrow,
    #[token("=>")]
    FatArrow,
    #[token("<-")]
    LArrow,
    #[token("::")]
    ColonColon,
    #[token("+=")]
    PlusEq,
    #[token("-=")]
    MinusEq,
    #[token("*=")]
    StarEq,
    #[token("/=")]
    SlashEq,
    #[token("%=")]
    PercentEq,

    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[token("=")]
    Eq,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,
    #[token("!")]
    Bang,
    #[token("?")]
    Question,
    #[token("@")]
    At,
    #[token(".")]
    Dot,
    #[token("|")]
    Pipe,

    // === Delimiters ===
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token(":")]
    Colon,
    #[token(";")]
    Semi,
    #[token(",")]
    Comma,

    // === Literals ===
    // Empty or non-binary bodies are accepted here and rejected in convert
    #[regex(r"0[xX][0-9a-fA-F_]*")]
    HexInt,

    #[regex(r"0[bB][0-9_]*")]
    BinInt,

    #[regex(r"[0-9][0-9_]*\.[0-9][0-9_]*([eE][+-]?[0-9]+)?")]
    Float,

    #[regex(r"[0-9][0-9_]*")]
    DecInt,

    /// Field is false for an unterminated string.
    #[token("\"", |lex| string_body(lex, false))]
    String(bool),

    #[token("f\"", |lex| string_body(lex, true))]
    FString(bool),

    #[regex(r"'[A-Za-z_][A-Za-z0-9_]*")]
    Label,

    // === Identifier (keywords are matched against the text later) ===
    #[regex(r"[A-Za-z_][A-Za-z0-9_]*")]
    Ident,
}

/// Consume a block comment. Block comments do not nest.
fn block_comment(lex: &mut logos::Lexer<RawToken>) -> bool {
    let rest = lex.remainder();
    match rest.find("*/") {
        Some(end) => {
            lex.bump(end + 2);
            true
        }
        None => {
            lex.bump(rest.len());
            false
        }
    }
}

/// Consume the body of a string after its opening quote.
///
/// An unterminated string stops at the end of its line so that lexing
/// resumes on the next one. Interpolation splices may contain nested
/// strings and braces but not newlines.
fn string_body(lex: &mut logos::Lexer<RawToken>, interpolated: bool) -> bool {
    let bytes = lex.remainder().as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'"' => {
                lex.bump(i + 1);
                return true;
            }
            b'\\' if bytes.get(i + 1).is_some_and(|&b| b != b'\n') => i += 2,
            b'\n' => {
                lex.bump(i);
                return false;
            }
            b'{' if interpolated => match splice_end(&bytes[i + 1..]) {
                Ok(close) => i += close + 2,
                Err(stop) => {
                    lex.bump(i + 1 + stop);
                    return false;
                }
            },
            _ => i += 1,
        }
    }
    lex.bump(bytes.len());
    false
}

/// Find the `}` closing a splice whose `{` has already been consumed.
///
/// Returns `Ok(index of the '}')`, or `Err(stop)` where `stop` is the
/// newline or end of input at which the search gave up.
fn splice_end(bytes: &[u8]) -> Result<usize, usize> {
    let mut depth = 1usize;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\n' => return Err(i),
            b'"' => {
                i += 1;
                while i < bytes.len() && bytes[i] != b'"' && bytes[i] != b'\n' {
                    if bytes[i] == b'\\' {
                        i += 1;
                    }
                    i += 1;
                }
                if i >= bytes.len() {
                    return Err(bytes.len());
                }
                if bytes[i] == b'\n' {
                    return Err(i);
                }
            }
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Ok(i);
                }
            }
            _ => {}
        }
        i += 1;
    }
    Err(bytes.len())
}

/// The lexer for Hew source code.
///
/// Produces every byte of the input as some token, trivia included, so the
/// concatenated token text reproduces the source. Iteration is lazy; errors
/// accumulate as tokens are pulled and can be taken at any point.
pub struct Lexer<'src> {
    raw: logos::Lexer<'src, RawToken>,
    /// Absolute offset of `source[0]`; non-zero for interpolation splices.
    base: usize,
    errors: Vec<LexError>,
}

impl<'src> Lexer<'src> {
    /// Create a new lexer for the given source code.
    pub fn new(source: &'src str) -> Self {
        Self::with_offset(source, 0)
    }

    /// Create a lexer whose spans start at `base` instead of 0.
    pub fn with_offset(source: &'src str, base: usize) -> Self {
        Self {
            raw: RawToken::lexer(source),
            base,
            errors: Vec::new(),
        }
    }

    /// Errors found so far.
    pub fn errors(&self) -> &[LexError] {
        &self.errors
    }

    pub fn take_errors(&mut self) -> Vec<LexError> {
        std::mem::take(&mut self.errors)
    }

    /// Drain the remaining input. The returned tokens end with `Eof`.
    pub fn tokenize(mut self) -> LexResult {
        let mut tokens: Vec<Token> = self.by_ref().collect();
        let end = self.base + self.raw.source().len();
        tokens.push(Token::new(TokenKind::Eof, "", Span::empty(end)));
        LexResult {
            tokens,
            errors: self.errors,
        }
    }

    fn span_of(&self, range: std::ops::Range<usize>) -> Span {
        Span::new(self.base + range.start, self.base + range.end)
    }

    /// Convert a raw logos token to our TokenKind, parsing literals.
    fn convert(&mut self, raw: RawToken, text: &str, span: Span) -> TokenKind {
        match raw {
            RawToken::Whitespace => TokenKind::Whitespace,
            RawToken::LineComment => TokenKind::LineComment,
            RawToken::BlockComment(terminated) => {
                if !terminated {
                    self.errors.push(LexError::new(LexErrorKind::UnterminatedBlockComment, span));
                }
                TokenKind::BlockComment
            }

            RawToken::DotDotEq => TokenKind::DotDotEq,
            RawToken::DotDotDot => TokenKind::DotDotDot,
            RawToken::EqEq => TokenKind::EqEq,
            RawToken::BangEq => TokenKind::BangEq,
            RawToken::LtEq => TokenKind::LtEq,
            RawToken::GtEq => TokenKind::GtEq,
            RawToken::AmpAmp => TokenKind::AmpAmp,
            RawToken::PipePipe => TokenKind::PipePipe,
            RawToken::DotDot => TokenKind::DotDot,
            RawToken::Arrow => TokenKind::Arrow,
            RawToken::FatArrow => TokenKind::FatArrow,
            RawToken::LArrow => TokenKind::LArrow,
            RawToken::ColonColon => TokenKind::ColonColon,
            RawToken::PlusEq => TokenKind::PlusEq,
            RawToken::MinusEq => TokenKind::MinusEq,
            RawToken::StarEq => TokenKind::StarEq,
            RawToken::SlashEq => TokenKind::SlashEq,
            RawToken::PercentEq => TokenKind::PercentEq,
            RawToken::Plus => TokenKind::Plus,
            RawToken::Minus => TokenKind::Minus,
            RawToken::Star => TokenKind::Star,
            RawToken::Slash => TokenKind::Slash,
            RawToken::Percent => TokenKind::Percent,
            RawToken::Eq => TokenKind::Eq,
            RawToken::Lt => TokenKind::Lt,
            RawToken::Gt => TokenKind::Gt,
            RawToken::Bang => TokenKind::Bang,
            RawToken::Question => TokenKind::Question,
            RawToken::At => TokenKind::At,
            RawToken::Dot => TokenKind::Dot,
            RawToken::Pipe => TokenKind::Pipe,

            RawToken::LBrace => TokenKind::LBrace,
            RawToken::RBrace => TokenKind::RBrace,
            RawToken::LParen => TokenKind::LParen,
            RawToken::RParen => TokenKind::RParen,
            RawToken::LBracket => TokenKind::LBracket,
            RawToken::RBracket => TokenKind::RBracket,
            RawToken::Colon => TokenKind::Colon,
            RawToken::Semi => TokenKind::Semi,
            RawToken::Comma => TokenKind::Comma,

            RawToken::DecInt => TokenKind::Int(self.parse_int(text, 10, span)),
            RawToken::HexInt => TokenKind::Int(self.parse_int(&text[2..], 16, span)),
            RawToken::BinInt => TokenKind::Int(self.parse_int(&text[2..], 2, span)),
            RawToken::Float => {
                let cleaned: String = text.chars().filter(|c| *c != '_').collect();
                match cleaned.parse::<f64>() {
                    Ok(value) => TokenKind::Float(value),
                    Err(_) => {
                        self.errors.push(LexError::new(LexErrorKind::InvalidNumber, span));
                        TokenKind::Float(0.0)
                    }
                }
            }

            RawToken::String(terminated) => {
                let body = string_contents(text, 1, terminated);
                if !terminated {
                    self.errors.push(LexError::new(LexErrorKind::UnterminatedString, span));
                }
                TokenKind::Str(self.decode(body, span.start + 1, false))
            }
            RawToken::FString(terminated) => {
                let body = string_contents(text, 2, terminated);
                let errors_before = self.errors.len();
                let parts = self.interpolation_parts(body, span.start + 2);
                let splice_failed = self.errors[errors_before..]
                    .iter()
                    .any(|e| e.kind == LexErrorKind::UnterminatedInterpolation);
                if !terminated && !splice_failed {
                    self.errors.push(LexError::new(LexErrorKind::UnterminatedString, span));
                }
                TokenKind::FString(parts)
            }

            RawToken::Label => TokenKind::Label(text[1..].to_string()),
            RawToken::Ident => match text {
                "true" => TokenKind::Bool(true),
                "false" => TokenKind::Bool(false),
                _ => match Keyword::from_ident(text) {
                    Some(kw) => TokenKind::Kw(kw),
                    None => TokenKind::Ident(text.to_string()),
                },
            },
        }
    }

    /// Parse integer digits in `radix`. Bad literals still yield a token (value 0).
    fn parse_int(&mut self, digits: &str, radix: u32, span: Span) -> u64 {
        let cleaned: String = digits.chars().filter(|c| *c != '_').collect();
        let value = if digits.starts_with('_') || cleaned.is_empty() {
            None
        } else {
            u64::from_str_radix(&cleaned, radix).ok()
        };
        value.unwrap_or_else(|| {
            self.errors.push(LexError::new(LexErrorKind::InvalidNumber, span));
            0
        })
    }

    /// Decode escape sequences in literal string text starting at absolute `start`.
    fn decode(&mut self, text: &str, start: usize, interpolated: bool) -> String {
        let mut out = String::with_capacity(text.len());
        let mut chars = text.char_indices().peekable();
        while let Some((i, c)) = chars.next() {
            if c != '\\' {
                out.push(c);
                continue;
            }
            let decoded = match chars.next() {
                Some((_, 'n')) => Some('\n'),
                Some((_, 'r')) => Some('\r'),
                Some((_, 't')) => Some('\t'),
                Some((_, '\\')) => Some('\\'),
                Some((_, '"')) => Some('"'),
                Some((_, '0')) => Some('\0'),
                Some((_, c @ ('{' | '}'))) if interpolated => Some(c),
                Some((j, 'x')) => {
                    let hex = text.get(j + 1..j + 3).filter(|h| h.bytes().all(|b| b.is_ascii_hexdigit()));
                    match hex.and_then(|h| u8::from_str_radix(h, 16).ok()) {
                        Some(byte) => {
                            chars.next();
                            chars.next();
                            Some(char::from(byte))
                        }
                        None => None,
                    }
                }
                _ => None,
            };
            match decoded {
                Some(ch) => out.push(ch),
                None => {
                    let end = chars.peek().map(|&(j, _)| j).unwrap_or(text.len());
                    let seq = &text[i..end];
                    self.errors.push(LexError::new(
                        LexErrorKind::InvalidEscape(seq.to_string()),
                        Span::new(start + i, start + end),
                    ));
                    out.push_str(seq);
                }
            }
        }
        out
    }

    /// Split the body of an `f"..."` string into text and splice parts.
    fn interpolation_parts(&mut self, body: &str, start: usize) -> Vec<FStringPart> {
        let mut parts = Vec::new();
        let mut text_start = 0;
        let mut i = 0;
        let bytes = body.as_bytes();
        while i < bytes.len() {
            match bytes[i] {
                b'\\' => i += 2,
                b'{' => {
                    self.push_text(&mut parts, &body[text_start..i], start + text_start);
                    let inner_start = i + 1;
                    let inner_end = match splice_end(&bytes[inner_start..]) {
                        Ok(close) => inner_start + close,
                        Err(stop) => {
                            self.errors.push(LexError::new(
                                LexErrorKind::UnterminatedInterpolation,
                                Span::new(start + i, start + inner_start + stop),
                            ));
                            inner_start + stop
                        }
                    };
                    let inner = &body[inner_start..inner_end];
                    let mut nested = Lexer::with_offset(inner, start + inner_start);
                    let tokens: Vec<Token> = nested.by_ref().collect();
                    self.errors.append(&mut nested.errors);
                    parts.push(FStringPart::Splice {
                        tokens,
                        span: Span::new(start + inner_start, start + inner_end),
                    });
                    i = inner_end + 1;
                    text_start = i.min(bytes.len());
                }
                _ => i += 1,
            }
        }
        if text_start < bytes.len() {
            self.push_text(&mut parts, &body[text_start..], start + text_start);
        }
        parts
    }

    fn push_text(&mut self, parts: &mut Vec<FStringPart>, raw: &str, start: usize) {
        if raw.is_empty() {
            return;
        }
        let value = self.decode(raw, start, true);
        parts.push(FStringPart::Text {
            value,
            span: Span::new(start, start + raw.len()),
        });
    }
}

impl Iterator for Lexer<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        let result = self.raw.next()?;
        let text = self.raw.slice();
        let span = self.span_of(self.raw.span());
        let kind = match result {
            Ok(raw) => self.convert(raw, text, span),
            Err(()) => {
                let ch = text.chars().next().unwrap_or(char::REPLACEMENT_CHARACTER);
                self.errors.push(LexError::new(LexErrorKind::UnexpectedChar(ch), span));
                TokenKind::Unknown
            }
        };
        Some(Token::new(kind, text, span))
    }
}

/// Strip the opening delimiter (`prefix` bytes) and, when present, the closing quote.
fn string_contents(text: &str, prefix: usize, terminated: bool) -> &str {
    let end = if terminated { text.len() - 1 } else { text.len() };
    &text[prefix..end.max(prefix)]
}

/// Lex a whole source unit.
pub fn tokenize(source: &str) -> LexResult {
    Lexer::new(source).tokenize()
}

/// Result of lexing: tokens plus any errors found.
#[derive(Debug)]
pub struct LexResult {
    pub tokens: Vec<Token>,
    pub errors: Vec<LexError>,
}

impl LexResult {
    /// Returns true if lexing completed without errors.
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// What went wrong while lexing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LexErrorKind {
    #[error("Unexpected character '{0}'")]
    UnexpectedChar(char),
    #[error("Unterminated string")]
    UnterminatedString,
    #[error("Unterminated block comment")]
    UnterminatedBlockComment,
    #[error("Unterminated interpolation in string")]
    UnterminatedInterpolation,
    #[error("Invalid escape sequence '{0}'")]
    InvalidEscape(String),
    #[error("Invalid number")]
    InvalidNumber,
}

/// A lexer error with location and friendly message.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{kind}")]
pub struct LexError {
    pub kind: LexErrorKind,
    pub span: Span,
    pub hint: Option<String>,
}

impl LexError {
    pub fn new(kind: LexErrorKind, span: Span) -> Self {
        let hint = match &kind {
            LexErrorKind::UnterminatedString => Some("Add a closing '\"'".to_string()),
            LexErrorKind::UnterminatedBlockComment => Some("Add '*/' to close the comment".to_string()),
            LexErrorKind::UnterminatedInterpolation => Some("Close the interpolation with '}'".to_string()),
            LexErrorKind::InvalidEscape(_) => {
                Some("Valid: \\n \\r \\t \\\\ \\\" \\0 \\xHH".to_string())
            }
            LexErrorKind::InvalidNumber => {
                Some("Integers must fit in 64 bits; hex and binary need at least one digit".to_string())
            }
            LexErrorKind::UnexpectedChar(_) => None,
        };
        Self { kind, span, hint }
    }

    pub fn message(&self) -> String {
        self.kind.to_string()
    }
}
