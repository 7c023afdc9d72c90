//! FILENAME: core/parser/src/parser.rs
//! PURPOSE: Recursive descent parser that converts a stream of Tokens into an AST.
//! CONTEXT: This is the second stage of the parsing pipeline. It takes tokens
//! from the Lexer and builds an Expression tree that can be evaluated.
//! The caller strips the leading formula marker ('=') before parsing.
//!
//! GRAMMAR:
//!   expression     --> additive
//!   additive       --> multiplicative ( ("+" | "-") multiplicative )*
//!   multiplicative --> unary ( ("*" | "/") unary )*
//!   unary          --> ("+" | "-") unary | primary
//!   primary        --> NUMBER | CELL | "(" expression ")"

use crate::ast::{BinaryOperator, CellRef, Expression, UnaryOperator};
use crate::lexer::Lexer;
use crate::position::Position;
use crate::token::Token;

/// Parser errors with descriptive messages.
#[derive(Debug, PartialEq, Clone)]
pub struct ParseError {
    pub message: String,
}

impl ParseError {
    pub fn new(message: impl Into<String>) -> Self {
        ParseError {
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Parse error: {}", self.message)
    }
}

impl std::error::Error for ParseError {}

pub type ParseResult<T> = Result<T, ParseError>;

/// Deepest expression tree the parser builds, and the deepest nesting of
/// signs and parentheses it descends into. Rendering and evaluation recurse
/// over the tree, so this also bounds their stack use.
pub const MAX_DEPTH: usize = 256;

/// A parsed subtree with its height (a leaf has height 1).
type Parsed = (Expression, usize);

fn too_deep() -> ParseError {
    ParseError::new(format!("Expression nested deeper than {} levels", MAX_DEPTH))
}

/// Checks a freshly built node against the height limit.
fn node(expression: Expression, height: usize) -> ParseResult<Parsed> {
    if height > MAX_DEPTH {
        return Err(too_deep());
    }
    Ok((expression, height))
}

/// The Parser struct holds the lexer and current token state.
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    current_token: Token,
    /// Current recursion depth through signs and parentheses.
    depth: usize,
}

impl<'a> Parser<'a> {
    /// Creates a new parser from an input string.
    /// Automatically advances to the first token.
    pub fn new(input: &'a str) -> Self {
        let mut lexer = Lexer::new(input);
        let current_token = lexer.next_token();
        Parser {
            lexer,
            current_token,
            depth: 0,
        }
    }

    /// Parses the entire input and returns the AST.
    pub fn parse(&mut self) -> ParseResult<Expression> {
        if self.current_token == Token::EOF {
            return Err(ParseError::new("Empty expression"));
        }

        let (expr, _) = self.parse_expression()?;

        // Ensure we consumed all tokens
        if self.current_token != Token::EOF {
            return Err(ParseError::new(format!(
                "Unexpected token after expression: {:?}",
                self.current_token
            )));
        }

        Ok(expr)
    }

    /// Advances to the next token.
    fn advance(&mut self) {
        self.current_token = self.lexer.next_token();
    }

    /// Checks if the current token matches the expected token.
    /// If it matches, advances and returns Ok. Otherwise returns an error.
    fn expect(&mut self, expected: Token) -> ParseResult<()> {
        if self.current_token == expected {
            self.advance();
            Ok(())
        } else {
            Err(ParseError::new(format!(
                "Expected {:?}, found {:?}",
                expected, self.current_token
            )))
        }
    }

    fn enter(&mut self) -> ParseResult<()> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(too_deep());
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    /// Entry point for expression parsing.
    fn parse_expression(&mut self) -> ParseResult<Parsed> {
        self.parse_additive()
    }

    /// Parses additive expressions (+ and -).
    fn parse_additive(&mut self) -> ParseResult<Parsed> {
        let mut left = self.parse_multiplicative()?;

        loop {
            let op = match &self.current_token {
                Token::Plus => BinaryOperator::Add,
                Token::Minus => BinaryOperator::Subtract,
                _ => break,
            };

            self.advance();
            let right = self.parse_multiplicative()?;

            let height = left.1.max(right.1) + 1;
            left = node(
                Expression::BinaryOp {
                    left: Box::new(left.0),
                    op,
                    right: Box::new(right.0),
                },
                height,
            )?;
        }

        Ok(left)
    }

    /// Parses multiplicative expressions (* and /).
    fn parse_multiplicative(&mut self) -> ParseResult<Parsed> {
        let mut left = self.parse_unary()?;

        loop {
            let op = match &self.current_token {
                Token::Asterisk => BinaryOperator::Multiply,
                Token::Slash => BinaryOperator::Divide,
                _ => break,
            };

            self.advance();
            let right = self.parse_unary()?;

            let height = left.1.max(right.1) + 1;
            left = node(
                Expression::BinaryOp {
                    left: Box::new(left.0),
                    op,
                    right: Box::new(right.0),
                },
                height,
            )?;
        }

        Ok(left)
    }

    /// Parses sign prefixes.
    fn parse_unary(&mut self) -> ParseResult<Parsed> {
        let op = match &self.current_token {
            Token::Plus => UnaryOperator::Plus,
            Token::Minus => UnaryOperator::Negate,
            _ => return self.parse_primary(),
        };

        self.advance();
        self.enter()?;
        let (operand, height) = self.parse_unary()?;
        self.leave();
        node(
            Expression::UnaryOp {
                op,
                operand: Box::new(operand),
            },
            height + 1,
        )
    }

    /// Parses primary expressions (literals, cell refs, parentheses).
    fn parse_primary(&mut self) -> ParseResult<Parsed> {
        match self.current_token.clone() {
            Token::Number(n) => {
                if !n.is_finite() {
                    return Err(ParseError::new(format!(
                        "Number literal out of range: {}",
                        n
                    )));
                }
                self.advance();
                Ok((Expression::Literal(n), 1))
            }

            Token::Identifier(name) => {
                self.advance();
                Ok((self.parse_cell_ref(name)?, 1))
            }

            // Parenthesized expression
            Token::LParen => {
                self.advance();
                self.enter()?;
                let inner = self.parse_expression()?;
                self.leave();
                self.expect(Token::RParen)?;
                Ok(inner)
            }

            // Error cases
            Token::EOF => Err(ParseError::new("Unexpected end of expression")),

            Token::Illegal(ch) => Err(ParseError::new(format!("Illegal character: {}", ch))),

            token => Err(ParseError::new(format!("Unexpected token: {:?}", token))),
        }
    }

    /// Parses a cell reference from an identifier string like "A1" or "AA100".
    /// Well-formed references outside the sheet are kept with no position.
    fn parse_cell_ref(&self, identifier: String) -> ParseResult<Expression> {
        self.check_cell_reference_shape(&identifier)?;
        let position = Position::parse(&identifier);
        Ok(Expression::CellRef(CellRef {
            name: identifier,
            position,
        }))
    }

    /// Checks that an identifier is letters followed by digits.
    fn check_cell_reference_shape(&self, identifier: &str) -> ParseResult<()> {
        let mut has_col = false;
        let mut has_row = false;

        for ch in identifier.chars() {
            if ch.is_ascii_alphabetic() {
                if has_row {
                    return Err(ParseError::new(format!(
                        "Invalid cell reference: {}",
                        identifier
                    )));
                }
                has_col = true;
            } else if ch.is_ascii_digit() {
                has_row = true;
            } else {
                return Err(ParseError::new(format!(
                    "Invalid character in cell reference: {}",
                    ch
                )));
            }
        }

        if !has_col {
            return Err(ParseError::new(format!(
                "Cell reference missing column: {}",
                identifier
            )));
        }

        if !has_row {
            return Err(ParseError::new(format!(
                "Cell reference missing row: {}",
                identifier
            )));
        }

        Ok(())
    }
}

/// Convenience function to parse a formula string directly.
pub fn parse(input: &str) -> ParseResult<Expression> {
    let mut parser = Parser::new(input);
    parser.parse()
}
