use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// MAC address, normalized to lowercase colon-separated format
/// (`aa:bb:cc:dd:ee:ff`). Stored as TEXT; equality on the wrapped
/// string is the identity comparison everywhere in the tracker.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(transparent)]
pub struct MacAddress(String);

impl MacAddress {
    /// Create a normalized MAC address from any common format.
    /// Accepts colon-, dash-, or dot-separated input and bare hex.
    pub fn new(raw: impl AsRef<str>) -> Self {
        Self(roamwatch_api::normalize_mac(raw.as_ref()))
    }

    /// Whether the normalized form is a well-formed MAC
    /// (six lowercase hex octets).
    pub fn is_valid(&self) -> bool {
        let octets: Vec<&str> = self.0.split(':').collect();
        octets.len() == 6
            && octets
                .iter()
                .all(|o| o.len() == 2 && o.chars().all(|c| c.is_ascii_hexdigit()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for MacAddress {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_case_and_separators() {
        assert_eq!(MacAddress::new("AA:BB:CC:DD:EE:FF").as_str(), "aa:bb:cc:dd:ee:ff");
        assert_eq!(MacAddress::new("AA-BB-CC-DD-EE-FF").as_str(), "aa:bb:cc:dd:ee:ff");
        assert_eq!(MacAddress::new("aabbccddeeff").as_str(), "aa:bb:cc:dd:ee:ff");
    }

    #[test]
    fn validity() {
        assert!(MacAddress::new("AA:BB:CC:DD:EE:FF").is_valid());
        assert!(!MacAddress::new("not a mac").is_valid());
        assert!(!MacAddress::new("aa:bb:cc:dd:ee").is_valid());
    }

    #[test]
    fn from_str_round_trip() {
        let mac: MacAddress = "AA-BB-CC-DD-EE-FF".parse().unwrap();
        assert_eq!(mac.to_string(), "aa:bb:cc:dd:ee:ff");
    }
}
