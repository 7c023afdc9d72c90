//! FILENAME: core/parser/src/token.rs
//! PURPOSE: Token definitions for the formula lexer.
//! CONTEXT: Tokens are the atomic units produced by the lexer and consumed by the parser.

/// Tokens recognized by the formula lexer.
#[derive(Debug, PartialEq, Clone)]
pub enum Token {
    // Literals
    Number(f64),
    /// Letters followed by digits, uppercased (e.g., "A1", "ZZ10").
    /// Anything else alphanumeric is still lexed here and rejected by the parser.
    Identifier(String),

    // Operators
    Plus,
    Minus,
    Asterisk,
    Slash,

    // Delimiters
    LParen,
    RParen,

    // Special
    EOF,
    Illegal(char),
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::Number(n) => write!(f, "{}", n),
            Token::Identifier(s) => write!(f, "{}", s),
            Token::Plus => write!(f, "+"),
            Token::Minus => write!(f, "-"),
            Token::Asterisk => write!(f, "*"),
            Token::Slash => write!(f, "/"),
            Token::LParen => write!(f, "("),
            Token::RParen => write!(f, ")"),
            Token::EOF => write!(f, "EOF"),
            Token::Illegal(c) => write!(f, "ILLEGAL({})", c),
        }
    }
}
