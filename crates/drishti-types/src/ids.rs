//! Grid-cell identifiers.
//!
//! A zone is addressed by its row letter followed by its 1-based column
//! number (`A1`, `C6`, `H8`). Identifiers are normalised to upper case on
//! parse so `b3`, `B3` and `B03` all name the same zone. Ordering is
//! lexicographic on the normalised string, which is the order zones are
//! listed in every snapshot.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Highest number of rows a grid can have (one per ASCII letter).
pub const MAX_GRID_ROWS: u8 = 26;

/// Errors produced when a string is not a valid zone identifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ZoneIdError {
    /// The input was empty or only whitespace.
    #[error("zone id is empty")]
    Empty,

    /// The first character is not an ASCII letter.
    #[error("invalid zone row: {0:?}")]
    InvalidRow(char),

    /// The column part is missing, not a number, or zero.
    #[error("invalid zone column: {0:?}")]
    InvalidColumn(String),
}

/// Identifier of a single grid cell.
///
/// Deserialization goes through [`ZoneId::parse`], so `"b3"` on the wire
/// is the same id as `"B3"`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(try_from = "String")]
#[ts(export, export_to = "bindings/")]
pub struct ZoneId(String);

impl ZoneId {
    /// Parse and normalise a zone identifier.
    pub fn parse(raw: &str) -> Result<Self, ZoneIdError> {
        let trimmed = raw.trim();
        let mut chars = trimmed.chars();
        let row = chars.next().ok_or(ZoneIdError::Empty)?;
        if !row.is_ascii_alphabetic() {
            return Err(ZoneIdError::InvalidRow(row));
        }

        let column_text = chars.as_str();
        if column_text.is_empty() || !column_text.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ZoneIdError::InvalidColumn(column_text.to_owned()));
        }
        let column: u32 = column_text
            .parse()
            .map_err(|_parse| ZoneIdError::InvalidColumn(column_text.to_owned()))?;
        if column == 0 {
            return Err(ZoneIdError::InvalidColumn(column_text.to_owned()));
        }

        Ok(Self(format!("{}{column}", row.to_ascii_uppercase())))
    }

    /// Build the identifier for a 0-based row index and 1-based column.
    ///
    /// Returns `None` when the row index is past `Z` or the column is zero.
    pub fn from_grid(row_index: u8, column: u32) -> Option<Self> {
        if row_index >= MAX_GRID_ROWS || column == 0 {
            return None;
        }
        let row = char::from(b'A'.checked_add(row_index)?);
        Some(Self(format!("{row}{column}")))
    }

    /// The normalised identifier text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Row letter (always upper case).
    pub fn row(&self) -> char {
        self.0.chars().next().unwrap_or('A')
    }

    /// 1-based column number.
    pub fn column(&self) -> u32 {
        self.0.get(1..).and_then(|c| c.parse().ok()).unwrap_or(0)
    }
}

impl fmt::Display for ZoneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ZoneId {
    type Err = ZoneIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ZoneId {
    type Error = ZoneIdError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        Self::parse(&raw)
    }
}

impl AsRef<str> for ZoneId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn parse_normalises_case_and_leading_zeros() {
        assert_eq!(ZoneId::parse("b3").unwrap().as_str(), "B3");
        assert_eq!(ZoneId::parse(" C06 ").unwrap().as_str(), "C6");
        assert_eq!(ZoneId::parse("H8").unwrap(), ZoneId::parse("h8").unwrap());
    }

    #[test]
    fn parse_rejects_malformed_ids() {
        assert_eq!(ZoneId::parse(""), Err(ZoneIdError::Empty));
        assert_eq!(ZoneId::parse("9Z"), Err(ZoneIdError::InvalidRow('9')));
        assert!(matches!(ZoneId::parse("A"), Err(ZoneIdError::InvalidColumn(_))));
        assert!(matches!(ZoneId::parse("A0"), Err(ZoneIdError::InvalidColumn(_))));
        assert!(matches!(ZoneId::parse("A1x"), Err(ZoneIdError::InvalidColumn(_))));
    }

    #[test]
    fn out_of_grid_ids_still_parse() {
        // Z9 is well formed; whether it exists is the store's business.
        let id = ZoneId::parse("Z9").unwrap();
        assert_eq!(id.row(), 'Z');
        assert_eq!(id.column(), 9);
    }

    #[test]
    fn from_grid_builds_expected_ids() {
        assert_eq!(ZoneId::from_grid(0, 1).unwrap().as_str(), "A1");
        assert_eq!(ZoneId::from_grid(7, 8).unwrap().as_str(), "H8");
        assert!(ZoneId::from_grid(26, 1).is_none());
        assert!(ZoneId::from_grid(0, 0).is_none());
    }

    #[test]
    fn ordering_is_lexicographic() {
        let mut ids = vec![
            ZoneId::parse("B1").unwrap(),
            ZoneId::parse("A2").unwrap(),
            ZoneId::parse("A1").unwrap(),
        ];
        ids.sort();
        let names: Vec<&str> = ids.iter().map(ZoneId::as_str).collect();
        assert_eq!(names, ["A1", "A2", "B1"]);
    }

    #[test]
    fn serializes_as_plain_string() {
        let id = ZoneId::parse("d4").unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"D4\"");
    }

    #[test]
    fn deserializes_through_parse() {
        let lower: ZoneId = serde_json::from_str("\"b3\"").unwrap();
        let padded: ZoneId = serde_json::from_str("\"B03\"").unwrap();
        assert_eq!(lower, ZoneId::parse("B3").unwrap());
        assert_eq!(padded, lower);

        assert!(serde_json::from_str::<ZoneId>("\"9Z\"").is_err());
        assert!(serde_json::from_str::<ZoneId>("\"\"").is_err());

        let keyed: std::collections::BTreeMap<ZoneId, u32> =
            serde_json::from_str(r#"{"a1": 4}"#).unwrap();
        assert_eq!(keyed.get(&ZoneId::parse("A1").unwrap()), Some(&4));
    }
}
