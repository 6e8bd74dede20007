use super::cursor::Pos;
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::fmt::Display;
use strum_macros::EnumIter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter)]
pub enum TokenKind {
    Const,
    Void,
    Int,
    Char,
    Double,
    Struct,
    If,
    Else,
    Switch,
    Case,
    Default,
    While,
    For,
    Do,
    Return,
    Break,
    Continue,
    Print,
    Scan,

    Identifier,
    IntegerLiteral,
    FloatLiteral,
    CharLiteral,
    StringLiteral,

    Plus,
    Minus,
    Star,
    Slash,
    Assign,
    Equal,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    LeftParen,
    RightParen,
    LeftBrace,
    RightBrace,
    Comma,
    Semicolon,
}

static KEYWORDS: Lazy<HashMap<&'static str, TokenKind>> = Lazy::new(|| {
    [
        ("const", TokenKind::Const),
        ("void", TokenKind::Void),
        ("int", TokenKind::Int),
        ("char", TokenKind::Char),
        ("double", TokenKind::Double),
        ("struct", TokenKind::Struct),
        ("if", TokenKind::If),
        ("else", TokenKind::Else),
        ("switch", TokenKind::Switch),
        ("case", TokenKind::Case),
        ("default", TokenKind::Default),
        ("while", TokenKind::While),
        ("for", TokenKind::For),
        ("do", TokenKind::Do),
        ("return", TokenKind::Return),
        ("break", TokenKind::Break),
        ("continue", TokenKind::Continue),
        ("print", TokenKind::Print),
        ("scan", TokenKind::Scan),
    ]
    .iter()
    .copied()
    .collect()
});

impl TokenKind {
    /// Keywords are matched case-sensitively; anything else is an identifier.
    pub fn classify_word(word: &str) -> TokenKind {
        KEYWORDS
            .get(word)
            .copied()
            .unwrap_or(TokenKind::Identifier)
    }

    pub fn is_keyword(self) -> bool {
        KEYWORDS.values().any(|kw| *kw == self)
    }

    pub fn is_type_specifier(self) -> bool {
        matches!(
            self,
            TokenKind::Void | TokenKind::Int | TokenKind::Char | TokenKind::Double
        )
    }

    pub fn is_relational(self) -> bool {
        matches!(
            self,
            TokenKind::Equal
                | TokenKind::NotEqual
                | TokenKind::Less
                | TokenKind::LessEqual
                | TokenKind::Greater
                | TokenKind::GreaterEqual
        )
    }

    /// The fixed spelling of keywords and punctuation.
    pub fn spelling(self) -> Option<&'static str> {
        let s = match self {
            TokenKind::Identifier
            | TokenKind::IntegerLiteral
            | TokenKind::FloatLiteral
            | TokenKind::CharLiteral
            | TokenKind::StringLiteral => return None,

            TokenKind::Plus => "+",
            TokenKind::Minus => "-",
            TokenKind::Star => "*",
            TokenKind::Slash => "/",
            TokenKind::Assign => "=",
            TokenKind::Equal => "==",
            TokenKind::NotEqual => "!=",
            TokenKind::Less => "<",
            TokenKind::LessEqual => "<=",
            TokenKind::Greater => ">",
            TokenKind::GreaterEqual => ">=",
            TokenKind::LeftParen => "(",
            TokenKind::RightParen => ")",
            TokenKind::LeftBrace => "{",
            TokenKind::RightBrace => "}",
            TokenKind::Comma => ",",
            TokenKind::Semicolon => ";",

            kw => return KEYWORDS.iter().find(|(_, k)| **k == kw).map(|(s, _)| *s),
        };
        Some(s)
    }
}

impl Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.spelling() {
            Some(s) => write!(f, "'{}'", s),
            None => match self {
                TokenKind::Identifier => write!(f, "identifier"),
                TokenKind::IntegerLiteral => write!(f, "integer literal"),
                TokenKind::FloatLiteral => write!(f, "floating literal"),
                TokenKind::CharLiteral => write!(f, "char literal"),
                _ => write!(f, "string literal"),
            },
        }
    }
}

/// Payload of a token. Floating literals keep their exact source text;
/// consumers parse it when they need the number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenValue {
    Integer(i32),
    Float(String),
    Text(String),
}

impl Display for TokenValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenValue::Integer(v) => write!(f, "{}", v),
            TokenValue::Float(text) => write!(f, "{}", text),
            TokenValue::Text(text) => write!(f, "{:?}", text),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub value: TokenValue,
    pub start: Pos,
    pub end: Pos,
}

impl Token {
    pub fn new(kind: TokenKind, value: TokenValue, start: Pos, end: Pos) -> Self {
        Token {
            kind,
            value,
            start,
            end,
        }
    }

    pub fn text(&self) -> Option<&str> {
        match &self.value {
            TokenValue::Text(s) | TokenValue::Float(s) => Some(s),
            TokenValue::Integer(_) => None,
        }
    }

    pub fn integer(&self) -> Option<i32> {
        match self.value {
            TokenValue::Integer(v) => Some(v),
            _ => None,
        }
    }
}

impl Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:?} {} {} {}",
            self.kind, self.value, self.start, self.end
        )
    }
}
