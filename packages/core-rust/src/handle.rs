//! Opaque job handles returned to callers when work is accepted.

use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Identifier of one accepted work item.
///
/// Handles are totally ordered and issued in strictly increasing order
/// starting at 1. They render as plain decimal numbers so that they can be
/// returned in a response body and echoed back in a URL path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Handle(pub u64);

impl Handle {
    /// The first handle an issuer hands out.
    pub const FIRST: Handle = Handle(1);

    /// Returns the raw numeric value.
    #[must_use]
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for Handle {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

/// Error returned when a string is not a valid decimal handle.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid handle {input:?}: {source}")]
pub struct ParseHandleError {
    input: String,
    #[source]
    source: ParseIntError,
}

impl FromStr for Handle {
    type Err = ParseHandleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<u64>().map(Handle).map_err(|source| ParseHandleError {
            input: s.to_string(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn displays_as_decimal() {
        assert_eq!(Handle(42).to_string(), "42");
        assert_eq!(Handle::FIRST.to_string(), "1");
    }

    #[test]
    fn parses_decimal() {
        assert_eq!("7".parse::<Handle>().unwrap(), Handle(7));
    }

    #[test]
    fn rejects_non_numeric() {
        assert!("abc".parse::<Handle>().is_err());
        assert!("".parse::<Handle>().is_err());
        assert!("-1".parse::<Handle>().is_err());
        assert!("1.5".parse::<Handle>().is_err());
    }

    #[test]
    fn ordering_follows_numeric_value() {
        assert!(Handle(2) < Handle(10));
        assert!(Handle::FIRST < Handle(2));
    }

    #[test]
    fn serializes_as_bare_number() {
        let json = serde_json::to_string(&Handle(9)).unwrap();
        assert_eq!(json, "9");
    }

    proptest! {
        #[test]
        fn display_then_parse_is_identity(raw in any::<u64>()) {
            let handle = Handle(raw);
            prop_assert_eq!(handle.to_string().parse::<Handle>().unwrap(), handle);
        }
    }
}
