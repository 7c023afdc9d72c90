//! FILENAME: core/parser/src/lexer.rs
//! PURPOSE: Scans a raw formula string and produces a stream of Tokens.
//! CONTEXT: This is the first stage of the parsing pipeline. It handles
//! whitespace skipping, number parsing (including exponents) and
//! cell-reference identifiers.
//!
//! SUPPORTED OPERATORS:
//! - Single char: + - * / ( )

use crate::token::Token;
use std::iter::Peekable;
use std::str::Chars;

pub struct Lexer<'a> {
    input: Peekable<Chars<'a>>,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Lexer {
            input: input.chars().peekable(),
        }
    }

    /// Advances the lexer and returns the next token.
    pub fn next_token(&mut self) -> Token {
        self.skip_whitespace();

        match self.input.next() {
            Some('+') => Token::Plus,
            Some('-') => Token::Minus,
            Some('*') => Token::Asterisk,
            Some('/') => Token::Slash,
            Some('(') => Token::LParen,
            Some(')') => Token::RParen,

            // Handle Numbers (starts with digit or dot)
            Some(ch) if ch.is_ascii_digit() || ch == '.' => self.read_number(ch),

            // Handle Identifiers (starts with letter)
            Some(ch) if ch.is_ascii_alphabetic() => self.read_identifier(ch),

            // End of input
            None => Token::EOF,

            // Unknown character
            Some(ch) => Token::Illegal(ch),
        }
    }

    fn skip_whitespace(&mut self) {
        while let Some(&ch) = self.input.peek() {
            if !ch.is_whitespace() {
                break;
            }
            self.input.next();
        }
    }

    fn read_number(&mut self, first_char: char) -> Token {
        let mut number_str = String::from(first_char);
        let mut has_dot = first_char == '.';

        while let Some(&ch) = self.input.peek() {
            if ch.is_ascii_digit() {
                number_str.push(ch);
                self.input.next();
            } else if ch == '.' && !has_dot {
                has_dot = true;
                number_str.push(ch);
                self.input.next();
            } else {
                break;
            }
        }

        if let Some(&exp @ ('e' | 'E')) = self.input.peek() {
            self.input.next();
            number_str.push(exp);

            if let Some(&sign @ ('+' | '-')) = self.input.peek() {
                self.input.next();
                number_str.push(sign);
            }

            let mut has_exponent_digits = false;
            while let Some(&ch) = self.input.peek() {
                if !ch.is_ascii_digit() {
                    break;
                }
                has_exponent_digits = true;
                number_str.push(ch);
                self.input.next();
            }

            if !has_exponent_digits {
                return Token::Illegal(exp);
            }
        }

        if let Ok(n) = number_str.parse::<f64>() {
            Token::Number(n)
        } else {
            // Fallback if parsing fails (e.g. just ".")
            Token::Illegal(first_char)
        }
    }

    fn read_identifier(&mut self, first_char: char) -> Token {
        let mut ident = String::from(first_char);

        while let Some(&ch) = self.input.peek() {
            if ch.is_ascii_alphanumeric() {
                ident.push(ch);
                self.input.next();
            } else {
                break;
            }
        }

        Token::Identifier(ident.to_ascii_uppercase())
    }
}
