//! FILENAME: core/parser/src/position.rs
//! PURPOSE: Cell addressing types shared by the parser and the engine.
//! CONTEXT: A `Position` is a 0-based (row, col) pair that doubles as the
//! sheet's primary key. Formulas name cells in A1 notation ("A1", "AB12"),
//! so this module also converts between the two forms.
//! Column "A" = 0, "B" = 1, ..., "Z" = 25, "AA" = 26, etc.
//! Row 1 in A1 notation = row 0 internally.

use std::fmt;
use std::str::FromStr;

/// A cell address with 0-based indices. Ordered row-major.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    pub row: u32,
    pub col: u32,
}

impl Position {
    pub const MAX_ROWS: u32 = 16384;
    pub const MAX_COLS: u32 = 16384;

    pub const fn new(row: u32, col: u32) -> Self {
        Position { row, col }
    }

    /// True when the position lies inside the sheet bounds.
    pub fn is_valid(&self) -> bool {
        self.row < Self::MAX_ROWS && self.col < Self::MAX_COLS
    }

    /// Parses an A1-style reference such as "A1" or "ab12".
    ///
    /// Returns `None` when the text is not letters followed by digits, or when
    /// the resulting position falls outside the sheet bounds.
    pub fn parse(text: &str) -> Option<Position> {
        let split = text.find(|c: char| !c.is_ascii_alphabetic())?;
        let (letters, digits) = text.split_at(split);

        // 3 letters already exceed MAX_COLS; more would overflow below.
        if letters.is_empty() || letters.len() > 3 {
            return None;
        }
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }

        let row_num: u32 = digits.parse().ok()?;
        if row_num == 0 {
            return None;
        }

        let pos = Position::new(row_num - 1, col_to_index(letters));
        pos.is_valid().then_some(pos)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", index_to_col(self.col), self.row + 1)
    }
}

/// Error returned when a string is not a valid in-bounds A1 reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionParseError {
    pub input: String,
}

impl fmt::Display for PositionParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid cell position: {}", self.input)
    }
}

impl std::error::Error for PositionParseError {}

impl FromStr for Position {
    type Err = PositionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Position::parse(s).ok_or_else(|| PositionParseError {
            input: s.to_string(),
        })
    }
}

/// The extent of a rectangle anchored at A1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Size {
    pub rows: u32,
    pub cols: u32,
}

impl Size {
    pub const fn new(rows: u32, cols: u32) -> Self {
        Size { rows, cols }
    }
}

/// Converts a column string (e.g., "A", "AA", "ABC") to a 0-based column index.
/// "A" -> 0, "B" -> 1, ..., "Z" -> 25, "AA" -> 26, "AB" -> 27, etc.
///
/// The input must be non-empty and purely alphabetic; lowercase is accepted.
pub fn col_to_index(col_str: &str) -> u32 {
    let mut result: u32 = 0;
    for c in col_str.chars() {
        let digit = (c.to_ascii_uppercase() as u32) - ('A' as u32) + 1;
        result = result * 26 + digit;
    }
    result - 1
}

/// Converts a 0-based column index to a column string.
/// 0 -> "A", 1 -> "B", ..., 25 -> "Z", 26 -> "AA", 27 -> "AB", etc.
pub fn index_to_col(mut col_index: u32) -> String {
    let mut result = String::new();
    loop {
        let remainder = col_index % 26;
        result.insert(0, (b'A' + remainder as u8) as char);
        if col_index < 26 {
            break;
        }
        col_index = col_index / 26 - 1;
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_col_to_index() {
        assert_eq!(col_to_index("A"), 0);
        assert_eq!(col_to_index("Z"), 25);
        assert_eq!(col_to_index("AA"), 26);
        assert_eq!(col_to_index("az"), 51);
        assert_eq!(col_to_index("ZZ"), 701);
        assert_eq!(col_to_index("AAA"), 702);
    }

    #[test]
    fn test_index_to_col_roundtrip() {
        for i in 0..1000 {
            let col_str = index_to_col(i);
            assert_eq!(col_to_index(&col_str), i, "Roundtrip failed for index {}", i);
        }
    }

    #[test]
    fn test_parse_and_display() {
        assert_eq!(Position::parse("A1"), Some(Position::new(0, 0)));
        assert_eq!(Position::parse("b2"), Some(Position::new(1, 1)));
        assert_eq!(Position::parse("AA100"), Some(Position::new(99, 26)));
        assert_eq!(Position::new(99, 26).to_string(), "AA100");
        assert_eq!("C3".parse::<Position>(), Ok(Position::new(2, 2)));
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for bad in ["", "A", "1", "A0", "1A", "A1B", "$A$1", "A-1", "ABCD1"] {
            assert_eq!(Position::parse(bad), None, "accepted {:?}", bad);
        }
        assert!("A0".parse::<Position>().is_err());
    }

    #[test]
    fn test_bounds() {
        // XFD is column 16383, the last valid one.
        assert_eq!(Position::parse("XFD16384"), Some(Position::new(16383, 16383)));
        assert_eq!(Position::parse("XFE1"), None);
        assert_eq!(Position::parse("A16385"), None);
        assert!(!Position::new(Position::MAX_ROWS, 0).is_valid());
        assert!(Position::new(0, Position::MAX_COLS - 1).is_valid());
    }
}
