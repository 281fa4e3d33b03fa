//! Content-derived entry identifiers.
//!
//! An [`EntryId`] is the join key between independently run enrichment
//! passes (source scraping, translation, rendering). It depends only on the
//! record's natural key, never on its row position, and must stay stable
//! across releases: changing [`identify`] orphans every persisted entry.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::TimelineError;

/// Number of hex characters kept from the digest.
pub const ENTRY_ID_LEN: usize = 8;

/// Separator between date and description in the hashed key.
const KEY_SEPARATOR: char = '|';

/// An 8-character lowercase hexadecimal fingerprint of `(date, description)`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EntryId(String);

/// Derive the identifier for a record from its exact, untrimmed natural key.
pub fn identify(date: &str, description: &str) -> EntryId {
    let mut hasher = Sha256::new();
    hasher.update(date.as_bytes());
    hasher.update(KEY_SEPARATOR.to_string().as_bytes());
    hasher.update(description.as_bytes());
    let digest = format!("{:x}", hasher.finalize());
    EntryId(digest[..ENTRY_ID_LEN].to_string())
}

impl EntryId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for EntryId {
    type Err = TimelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let valid = s.len() == ENTRY_ID_LEN
            && s.bytes().all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b));
        if !valid {
            return Err(TimelineError::parse(format!(
                "invalid entry id '{s}': expected {ENTRY_ID_LEN} lowercase hex characters"
            )));
        }
        Ok(Self(s.to_string()))
    }
}

impl TryFrom<String> for EntryId {
    type Error = TimelineError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<EntryId> for String {
    fn from(id: EntryId) -> Self {
        id.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_scenario() {
        let id = identify("01/01/2020", "Event A");
        assert_eq!(id.as_str(), "3b395592");
    }

    #[test]
    fn deterministic() {
        assert_eq!(identify("12/05/2022", "x"), identify("12/05/2022", "x"));
    }

    #[test]
    fn different_keys_differ() {
        assert_eq!(identify("01/01/2020", "Event B").as_str(), "3166d990");
        assert_ne!(identify("01/01/2020", "Event A"), identify("01/01/2020", "Event B"));
    }

    #[test]
    fn whitespace_is_significant() {
        assert_eq!(identify("01/01/2020 ", "Event A").as_str(), "3c8d7f1b");
    }

    #[test]
    fn empty_inputs_are_valid() {
        let id = identify("", "");
        assert_eq!(id.as_str(), "cbe5cfdf");
        assert_eq!(id.as_str().len(), ENTRY_ID_LEN);
    }

    #[test]
    fn hashes_utf8_bytes() {
        assert_eq!(identify("15/03/2021", "Κυβέρνηση").as_str(), "99981354");
    }

    #[test]
    fn parse_rejects_malformed() {
        assert!("3b395592".parse::<EntryId>().is_ok());
        assert!("3B395592".parse::<EntryId>().is_err());
        assert!("3b39559".parse::<EntryId>().is_err());
        assert!(matches!(
            "3b39559z".parse::<EntryId>(),
            Err(TimelineError::Parse { .. })
        ));
    }

    #[test]
    fn serde_is_a_plain_string() {
        let id = identify("01/01/2020", "Event A");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, r#""3b395592""#);
        let back: EntryId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
        assert!(serde_json::from_str::<EntryId>(r#""nothex!!""#).is_err());
    }
}
