//! Token types for the SQL lexer.

use super::Span;

/// SQL keywords recognized by this dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    Select,
    From,
    Where,
    Order,
    By,
    Group,
    Limit,
    Offset,
    Join,
    Inner,
    Left,
    Right,
    Full,
    Outer,
    On,
    Insert,
    Into,
    Values,
    Update,
    Set,
    Delete,
    Upsert,
    And,
    Or,
    Not,
    In,
    Between,
    Like,
    Is,
    Null,
    True,
    False,
    As,
    Asc,
    Desc,
}

impl Keyword {
    /// Attempts to parse a keyword from a string (case-insensitive).
    #[must_use]
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "SELECT" => Some(Self::Select),
            "FROM" => Some(Self::From),
            "WHERE" => Some(Self::Where),
            "ORDER" => Some(Self::Order),
            "BY" => Some(Self::By),
            "GROUP" => Some(Self::Group),
            "LIMIT" => Some(Self::Limit),
            "OFFSET" => Some(Self::Offset),
            "JOIN" => Some(Self::Join),
            "INNER" => Some(Self::Inner),
            "LEFT" => Some(Self::Left),
            "RIGHT" => Some(Self::Right),
            "FULL" => Some(Self::Full),
            "OUTER" => Some(Self::Outer),
            "ON" => Some(Self::On),
            "INSERT" => Some(Self::Insert),
            "INTO" => Some(Self::Into),
            "VALUES" => Some(Self::Values),
            "UPDATE" => Some(Self::Update),
            "SET" => Some(Self::Set),
            "DELETE" => Some(Self::Delete),
            "UPSERT" => Some(Self::Upsert),
            "AND" => Some(Self::And),
            "OR" => Some(Self::Or),
            "NOT" => Some(Self::Not),
            "IN" => Some(Self::In),
            "BETWEEN" => Some(Self::Between),
            "LIKE" => Some(Self::Like),
            "IS" => Some(Self::Is),
            "NULL" => Some(Self::Null),
            "TRUE" => Some(Self::True),
            "FALSE" => Some(Self::False),
            "AS" => Some(Self::As),
            "ASC" => Some(Self::Asc),
            "DESC" => Some(Self::Desc),
            _ => None,
        }
    }

    /// Returns the keyword as its canonical uppercase spelling.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Select => "SELECT",
            Self::From => "FROM",
            Self::Where => "WHERE",
            Self::Order => "ORDER",
            Self::By => "BY",
            Self::Group => "GROUP",
            Self::Limit => "LIMIT",
            Self::Offset => "OFFSET",
            Self::Join => "JOIN",
            Self::Inner => "INNER",
            Self::Left => "LEFT",
            Self::Right => "RIGHT",
            Self::Full => "FULL",
            Self::Outer => "OUTER",
            Self::On => "ON",
            Self::Insert => "INSERT",
            Self::Into => "INTO",
            Self::Values => "VALUES",
            Self::Update => "UPDATE",
            Self::Set => "SET",
            Self::Delete => "DELETE",
            Self::Upsert => "UPSERT",
            Self::And => "AND",
            Self::Or => "OR",
            Self::Not => "NOT",
            Self::In => "IN",
            Self::Between => "BETWEEN",
            Self::Like => "LIKE",
            Self::Is => "IS",
            Self::Null => "NULL",
            Self::True => "TRUE",
            Self::False => "FALSE",
            Self::As => "AS",
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// The kind of token.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    /// Integer literal (e.g., 42).
    Integer(i64),
    /// Float literal (e.g., 3.14).
    Float(f64),
    /// String literal (e.g., 'hello'); whitespace inside the quotes is preserved verbatim.
    String(String),
    /// Identifier (e.g., column_name).
    Identifier(String),
    /// SQL keyword.
    Keyword(Keyword),

    /// +
    Plus,
    /// -
    Minus,
    /// *
    Star,
    /// /
    Slash,
    /// %
    Percent,
    /// = or ==
    Eq,
    /// != or <>
    NotEq,
    /// <
    Lt,
    /// <=
    LtEq,
    /// >
    Gt,
    /// >=
    GtEq,

    /// (
    LeftParen,
    /// )
    RightParen,
    /// ,
    Comma,
    /// ;
    Semicolon,
    /// .
    Dot,

    /// End of input.
    Eof,
}

/// A token with its span in the source text.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// The kind of token.
    pub kind: TokenKind,
    /// The location in the source code.
    pub span: Span,
}

impl Token {
    /// Creates a new token.
    #[must_use]
    pub const fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// Returns true if this is an EOF token.
    #[must_use]
    pub const fn is_eof(&self) -> bool {
        matches!(self.kind, TokenKind::Eof)
    }

    /// Returns the keyword if this is a keyword token.
    #[must_use]
    pub const fn as_keyword(&self) -> Option<Keyword> {
        match &self.kind {
            TokenKind::Keyword(kw) => Some(*kw),
            _ => None,
        }
    }
}
