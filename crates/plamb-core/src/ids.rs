//! Compact textual identifiers for platforms, sub-grid slots and connections.
//!
//! All three identifiers share one positional grammar built from decimal
//! digit runs and single column letters:
//!
//! - platform id: `<level digits><column letter><row digits>`, e.g. `3C12`
//! - sub-grid id: `<column letter><row digits>`, e.g. `B5`
//! - connection id: `<level digits><slot digit><platform column><platform row>
//!   <sub column><sub row>`, e.g. `31C12B5`

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Column letters, indexed by column number.
pub const COLUMN_ALPHABET: [char; 26] = [
    'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'I', 'J', 'K', 'L', 'M', 'N', 'O', 'P', 'Q', 'R', 'S',
    'T', 'U', 'V', 'W', 'X', 'Y', 'Z',
];

/// Highest slot number a connection id can carry (the slot is a single digit).
pub const MAX_CONNECTION_SLOT: u8 = 9;

/// Errors produced while parsing or constructing identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("Malformed {kind} id: {input:?}")]
    Malformed { kind: IdKind, input: String },
    #[error("Column {0} has no letter in the column alphabet")]
    ColumnOutOfRange(u32),
    #[error("Connection slot {0} does not fit in a single digit")]
    SlotOutOfRange(u32),
}

/// Which identifier grammar was being parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdKind {
    Platform,
    Subgrid,
    Connection,
}

impl fmt::Display for IdKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            IdKind::Platform => "platform",
            IdKind::Subgrid => "subgrid",
            IdKind::Connection => "connection",
        })
    }
}

/// Map a column number to its letter.
pub fn column_letter(column: u8) -> Option<char> {
    COLUMN_ALPHABET.get(column as usize).copied()
}

/// Map a column letter back to its number.
pub fn column_index(letter: char) -> Option<u8> {
    COLUMN_ALPHABET
        .iter()
        .position(|&c| c == letter)
        .map(|i| i as u8)
}

fn checked_column(column: u32) -> Result<u8, ParseError> {
    if (column as usize) < COLUMN_ALPHABET.len() {
        Ok(column as u8)
    } else {
        Err(ParseError::ColumnOutOfRange(column))
    }
}

/// Position of a platform: layer plus coarse grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PlatformId {
    level: u32,
    column: u8,
    row: u32,
}

impl PlatformId {
    /// Create a platform id. Fails if the column has no letter.
    pub fn new(level: u32, column: u32, row: u32) -> Result<Self, ParseError> {
        Ok(Self {
            level,
            column: checked_column(column)?,
            row,
        })
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn column(&self) -> u8 {
        self.column
    }

    pub fn column_letter(&self) -> char {
        COLUMN_ALPHABET[self.column as usize]
    }

    pub fn row(&self) -> u32 {
        self.row
    }

    /// Parse the compact string form, e.g. `"3C12"`.
    pub fn parse(input: &str) -> Result<Self, ParseError> {
        let malformed = || ParseError::Malformed {
            kind: IdKind::Platform,
            input: input.to_string(),
        };
        let mut scanner = Scanner::new(input);
        let level = scanner.number().ok_or_else(malformed)?;
        let column = scanner.letter().ok_or_else(malformed)?;
        let row = scanner.number().ok_or_else(malformed)?;
        if !scanner.is_done() {
            return Err(malformed());
        }
        Ok(Self { level, column, row })
    }
}

impl fmt::Display for PlatformId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.level, self.column_letter(), self.row)
    }
}

/// Position of a prop inside its platform's sub-grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SubgridId {
    column: u8,
    row: u32,
}

impl SubgridId {
    /// Create a sub-grid id. Fails if the column has no letter.
    pub fn new(column: u32, row: u32) -> Result<Self, ParseError> {
        Ok(Self {
            column: checked_column(column)?,
            row,
        })
    }

    pub fn column(&self) -> u8 {
        self.column
    }

    pub fn column_letter(&self) -> char {
        COLUMN_ALPHABET[self.column as usize]
    }

    pub fn row(&self) -> u32 {
        self.row
    }

    /// Parse the compact string form, e.g. `"B5"`.
    pub fn parse(input: &str) -> Result<Self, ParseError> {
        let malformed = || ParseError::Malformed {
            kind: IdKind::Subgrid,
            input: input.to_string(),
        };
        let mut scanner = Scanner::new(input);
        let column = scanner.letter().ok_or_else(malformed)?;
        let row = scanner.number().ok_or_else(malformed)?;
        if !scanner.is_done() {
            return Err(malformed());
        }
        Ok(Self { column, row })
    }
}

impl fmt::Display for SubgridId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.column_letter(), self.row)
    }
}

/// Address of one attachment slot on a placed prop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ConnectionId {
    slot: u8,
    platform_id: PlatformId,
    subgrid_id: SubgridId,
}

impl ConnectionId {
    /// Create a connection id. Fails if the slot needs more than one digit.
    pub fn new(slot: u32, platform_id: PlatformId, subgrid_id: SubgridId) -> Result<Self, ParseError> {
        if slot > MAX_CONNECTION_SLOT as u32 {
            return Err(ParseError::SlotOutOfRange(slot));
        }
        Ok(Self {
            slot: slot as u8,
            platform_id,
            subgrid_id,
        })
    }

    pub fn slot(&self) -> u8 {
        self.slot
    }

    pub fn platform_id(&self) -> PlatformId {
        self.platform_id
    }

    pub fn subgrid_id(&self) -> SubgridId {
        self.subgrid_id
    }

    /// Parse the compact string form, e.g. `"31C12B5"`.
    ///
    /// The level and slot share one digit run: the last digit before the
    /// first letter is the slot, everything before it is the level.
    pub fn parse(input: &str) -> Result<Self, ParseError> {
        let malformed = || ParseError::Malformed {
            kind: IdKind::Connection,
            input: input.to_string(),
        };
        let mut scanner = Scanner::new(input);
        let digits = scanner.digits().ok_or_else(malformed)?;
        if digits.len() < 2 {
            return Err(malformed());
        }
        let (level_digits, slot_digit) = digits.split_at(digits.len() - 1);
        let level = parse_number(level_digits).ok_or_else(malformed)?;
        let slot = parse_number(slot_digit).ok_or_else(malformed)? as u8;

        let column = scanner.letter().ok_or_else(malformed)?;
        let row = scanner.number().ok_or_else(malformed)?;
        let sub_column = scanner.letter().ok_or_else(malformed)?;
        let sub_row = scanner.number().ok_or_else(malformed)?;
        if !scanner.is_done() {
            return Err(malformed());
        }

        Ok(Self {
            slot,
            platform_id: PlatformId { level, column, row },
            subgrid_id: SubgridId {
                column: sub_column,
                row: sub_row,
            },
        })
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}{}{}{}{}",
            self.platform_id.level,
            self.slot,
            self.platform_id.column_letter(),
            self.platform_id.row,
            self.subgrid_id.column_letter(),
            self.subgrid_id.row
        )
    }
}

macro_rules! string_conversions {
    ($($ty:ty),*) => {$(
        impl FromStr for $ty {
            type Err = ParseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }

        impl TryFrom<String> for $ty {
            type Error = ParseError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::parse(&value)
            }
        }

        impl From<$ty> for String {
            fn from(id: $ty) -> Self {
                id.to_string()
            }
        }
    )*};
}

string_conversions!(PlatformId, SubgridId, ConnectionId);

/// Cursor over an identifier string, one character class at a time.
struct Scanner<'a> {
    rest: &'a str,
}

impl<'a> Scanner<'a> {
    fn new(input: &'a str) -> Self {
        Self { rest: input }
    }

    /// Take a non-empty run of ASCII digits.
    fn digits(&mut self) -> Option<&'a str> {
        let end = self
            .rest
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(self.rest.len());
        if end == 0 {
            return None;
        }
        let (run, rest) = self.rest.split_at(end);
        self.rest = rest;
        Some(run)
    }

    fn number(&mut self) -> Option<u32> {
        self.digits().and_then(parse_number)
    }

    /// Take one column letter.
    fn letter(&mut self) -> Option<u8> {
        let c = self.rest.chars().next()?;
        let column = column_index(c)?;
        self.rest = &self.rest[c.len_utf8()..];
        Some(column)
    }

    fn is_done(&self) -> bool {
        self.rest.is_empty()
    }
}

/// Decimal run in canonical form: no leading zeros except a lone `0`.
fn parse_number(digits: &str) -> Option<u32> {
    if digits.len() > 1 && digits.starts_with('0') {
        return None;
    }
    digits.parse().ok()
}
