//! Database-assigned record identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A row identifier assigned by the relational store.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(transparent)]
#[sqlx(transparent)]
pub struct RecordId(i64);

impl RecordId {
    /// Wrap a raw row id.
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Get the raw row id.
    pub fn get(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RecordId({})", self.0)
    }
}

impl From<i64> for RecordId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl FromStr for RecordId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<i64>().map(Self)
    }
}

/// Type alias for user IDs
pub type UserId = RecordId;

/// Type alias for team IDs
pub type TeamId = RecordId;

/// Type alias for player IDs
pub type PlayerId = RecordId;

/// Type alias for game IDs
pub type GameId = RecordId;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_id_display() {
        let id = RecordId::new(42);
        assert_eq!(format!("{}", id), "42");
    }

    #[test]
    fn test_record_id_debug() {
        let id = RecordId::new(7);
        assert!(format!("{:?}", id).contains('7'));
    }

    #[test]
    fn test_record_id_serializes_as_number() {
        let json = serde_json::to_string(&RecordId::new(12)).unwrap();
        assert_eq!(json, "12");

        let parsed: RecordId = serde_json::from_str("12").unwrap();
        assert_eq!(parsed, RecordId::new(12));
    }

    #[test]
    fn test_record_id_from_str() {
        assert_eq!(" 9 ".parse::<RecordId>().unwrap(), RecordId::new(9));
        assert!("nine".parse::<RecordId>().is_err());
    }

    #[test]
    fn test_record_id_ordering() {
        assert!(RecordId::new(1) < RecordId::new(2));
        assert_eq!(RecordId::from(3), RecordId::new(3));
    }
}
