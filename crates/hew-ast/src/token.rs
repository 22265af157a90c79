// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Token definitions shared by the lexer and parser.

use crate::Span;

/// A token produced by the lexer.
///
/// Trivia (whitespace, comments, unlexable bytes) are tokens too, so the
/// concatenated `text` of a full token stream is the original source.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, span: Span) -> Self {
        Self { kind, text: text.into(), span }
    }

    pub fn is_trivia(&self) -> bool {
        self.kind.is_trivia()
    }

    /// Keyword carried by this token, if any.
    pub fn keyword(&self) -> Option<Keyword> {
        match self.kind {
            TokenKind::Kw(kw) => Some(kw),
            _ => None,
        }
    }
}

/// One piece of an interpolated (`f"..."`) string.
#[derive(Debug, Clone, PartialEq)]
pub enum FStringPart {
    /// Literal text with escapes already decoded.
    Text { value: String, span: Span },
    /// The tokens of a `{ expr }` splice, braces excluded. Spans are absolute.
    Splice { tokens: Vec<Token>, span: Span },
}

/// The kind of token.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // Literals
    Int(u64),
    Float(f64),
    Str(String),
    FString(Vec<FStringPart>),
    Bool(bool),

    // Names
    Ident(String),
    /// `'outer`
    Label(String),
    Kw(Keyword),

    // Operators
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Eq,
    EqEq,
    BangEq,
    Lt,
    Gt,
    LtEq,
    GtEq,
    AmpAmp,
    PipePipe,
    Bang,
    Question,
    DotDot,
    DotDotEq,
    DotDotDot,
    Arrow,      // ->
    FatArrow,   // =>
    LArrow,     // <-
    At,
    Dot,
    Pipe,
    ColonColon,
    PlusEq,
    MinusEq,
    StarEq,
    SlashEq,
    PercentEq,

    // Delimiters
    LBrace,
    RBrace,
    LParen,
    RParen,
    LBracket,
    RBracket,
    Colon,
    Semi,
    Comma,

    // Trivia
    Whitespace,
    LineComment,
    BlockComment,
    /// Bytes the lexer could not classify; always paired with a lex error.
    Unknown,

    Eof,
}

impl TokenKind {
    pub fn is_trivia(&self) -> bool {
        matches!(
            self,
            TokenKind::Whitespace | TokenKind::LineComment | TokenKind::BlockComment | TokenKind::Unknown
        )
    }

    /// Returns a human-readable name for this token kind.
    pub fn display_name(&self) -> &'static str {
        match self {
            TokenKind::Int(_) | TokenKind::Float(_) => "a number",
            TokenKind::Str(_) => "a string",
            TokenKind::FString(_) => "an interpolated string",
            TokenKind::Bool(_) => "'true' or 'false'",
            TokenKind::Ident(_) => "a name",
            TokenKind::Label(_) => "a label",
            TokenKind::Kw(kw) => kw.display_name(),

            TokenKind::Plus => "'+'",
            TokenKind::Minus => "'-'",
            TokenKind::Star => "'*'",
            TokenKind::Slash => "'/'",
            TokenKind::Percent => "'%'",
            TokenKind::Eq => "'='",
            TokenKind::EqEq => "'=='",
            TokenKind::BangEq => "'!='",
            TokenKind::Lt => "'<'",
            TokenKind::Gt => "'>'",
            TokenKind::LtEq => "'<='",
            TokenKind::GtEq => "'>='",
            TokenKind::AmpAmp => "'&&'",
            TokenKind::PipePipe => "'||'",
            TokenKind::Bang => "'!'",
            TokenKind::Question => "'?'",
            TokenKind::DotDot => "'..'",
            TokenKind::DotDotEq => "'..='",
            TokenKind::DotDotDot => "'...'",
            TokenKind::Arrow => "'->'",
            TokenKind::FatArrow => "'=>'",
            TokenKind::LArrow => "'<-'",
            TokenKind::At => "'@'",
            TokenKind::Dot => "'.'",
            TokenKind::Pipe => "'|'",
            TokenKind::ColonColon => "'::'",
            TokenKind::PlusEq => "'+='",
            TokenKind::MinusEq => "'-='",
            TokenKind::StarEq => "'*='",
            TokenKind::SlashEq => "'/='",
            TokenKind::PercentEq => "'%='",

            TokenKind::LBrace => "'{'",
            TokenKind::RBrace => "'}'",
            TokenKind::LParen => "'('",
            TokenKind::RParen => "')'",
            TokenKind::LBracket => "'['",
            TokenKind::RBracket => "']'",
            TokenKind::Colon => "':'",
            TokenKind::Semi => "';'",
            TokenKind::Comma => "','",

            TokenKind::Whitespace => "whitespace",
            TokenKind::LineComment | TokenKind::BlockComment => "a comment",
            TokenKind::Unknown => "an unknown character",
            TokenKind::Eof => "end of file",
        }
    }
}

macro_rules! keywords {
    ($($variant:ident => $text:literal),* $(,)?) => {
        /// Reserved words. Identifier text is matched against this table after
        /// lexing; context-only words (`init`, `overflow`, ...) stay identifiers.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum Keyword {
            $($variant),*
        }

        impl Keyword {
            pub const ALL: &'static [Keyword] = &[$(Keyword::$variant),*];

            pub fn from_ident(text: &str) -> Option<Keyword> {
                match text {
                    $($text => Some(Keyword::$variant),)*
                    _ => None,
                }
            }

            pub fn as_str(self) -> &'static str {
                match self {
                    $(Keyword::$variant => $text),*
                }
            }

            pub fn display_name(self) -> &'static str {
                match self {
                    $(Keyword::$variant => concat!("'", $text, "'")),*
                }
            }
        }
    };
}

keywords! {
    Fn => "fn",
    Let => "let",
    Var => "var",
    Const => "const",
    Struct => "struct",
    Enum => "enum",
    Type => "type",
    Trait => "trait",
    Impl => "impl",
    For => "for",
    In => "in",
    While => "while",
    Loop => "loop",
    Break => "break",
    Continue => "continue",
    Return => "return",
    If => "if",
    Else => "else",
    Match => "match",
    Import => "import",
    Pub => "pub",
    Wire => "wire",
    Actor => "actor",
    Supervisor => "supervisor",
    Extern => "extern",
    Spawn => "spawn",
    Select => "select",
    Race => "race",
    Join => "join",
    Scope => "scope",
    Unsafe => "unsafe",
    Yield => "yield",
    Await => "await",
    Gen => "gen",
    Async => "async",
    Try => "try",
    Catch => "catch",
    Where => "where",
    Dyn => "dyn",
    Move => "move",
    Cooperate => "cooperate",
    And => "and",
    Or => "or",
    SelfValue => "self",
    None => "None",
    Mailbox => "mailbox",
}

impl Keyword {
    /// Keywords that begin a top-level item (used for recovery and hints).
    pub fn starts_item(self) -> bool {
        matches!(
            self,
            Keyword::Import
                | Keyword::Const
                | Keyword::Type
                | Keyword::Struct
                | Keyword::Enum
                | Keyword::Wire
                | Keyword::Trait
                | Keyword::Impl
                | Keyword::Fn
                | Keyword::Gen
                | Keyword::Async
                | Keyword::Extern
                | Keyword::Actor
                | Keyword::Supervisor
                | Keyword::Pub
        )
    }

    /// Keywords that begin a statement inside a block.
    pub fn starts_statement(self) -> bool {
        matches!(
            self,
            Keyword::Let
                | Keyword::Var
                | Keyword::For
                | Keyword::While
                | Keyword::Loop
                | Keyword::Break
                | Keyword::Continue
                | Keyword::Return
                | Keyword::If
                | Keyword::Match
        )
    }

    /// Keywords that begin a member of a trait, impl, actor or extern body.
    pub fn starts_member(self) -> bool {
        matches!(
            self,
            Keyword::Fn | Keyword::Gen | Keyword::Async | Keyword::Let | Keyword::Var | Keyword::Type | Keyword::Mailbox
        )
    }
}
