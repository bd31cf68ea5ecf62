//! Validation for library name identifiers.
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use crate::Error;

/// Maximum length of a library name, in bytes.
pub const MAX_LENGTH: usize = 214;

const SEPARATORS: &[char] = &['-', '_', '.'];

/// Validate a library name against the identifier rules: lowercase
/// alphanumerics with internal `-`, `_`, `.` separators, no leading or
/// trailing separator, at most [`MAX_LENGTH`] bytes.
pub fn validate(s: &str) -> bool {
    if s.is_empty() || s.len() > MAX_LENGTH {
        return false;
    }

    if s.starts_with(SEPARATORS) || s.ends_with(SEPARATORS) {
        return false;
    }

    s.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || SEPARATORS.contains(&c))
}

/// Name of a library in the registry.
///
/// Validated once on construction; every subsequent use is a plain
/// string comparison.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LibraryName(String);

impl LibraryName {
    /// Create a library name without checking the source is valid.
    ///
    /// Intended for trusted sources (records already accepted on
    /// chain); prefer [`FromStr`] for user input.
    pub fn new_unchecked(source: impl Into<String>) -> Self {
        Self(source.into())
    }

    /// Borrow the underlying string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LibraryName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for LibraryName {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        if validate(s) {
            Ok(Self(s.to_owned()))
        } else {
            Err(Error::InvalidLibraryName(s.to_owned()))
        }
    }
}

impl TryFrom<String> for LibraryName {
    type Error = Error;
    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<LibraryName> for String {
    fn from(value: LibraryName) -> Self {
        value.0
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn accepts_valid_names() {
        assert!(validate("foo"));
        assert!(validate("foo-bar"));
        assert!(validate("foo_bar.baz"));
        assert!(validate("a1"));
        assert!(validate(&"a".repeat(MAX_LENGTH)));
    }

    #[test]
    fn rejects_invalid_names() {
        assert!(!validate(""));
        assert!(!validate(&"a".repeat(MAX_LENGTH + 1)));
        assert!(!validate("-foo"));
        assert!(!validate("foo-"));
        assert!(!validate(".foo"));
        assert!(!validate("Foo"));
        assert!(!validate("foo bar"));
        assert!(!validate("foo/bar"));
        assert!(!validate("foo!"));
    }

    #[test]
    fn parses_via_fromstr() {
        let name: LibraryName = "left-pad".parse().unwrap();
        assert_eq!("left-pad", name.as_str());
        assert!("Left-Pad".parse::<LibraryName>().is_err());
    }

    #[test]
    fn serde_roundtrip() {
        let name = LibraryName::new_unchecked("left-pad");
        let json = serde_json::to_string(&name).unwrap();
        assert_eq!("\"left-pad\"", json);
        let back: LibraryName = serde_json::from_str(&json).unwrap();
        assert_eq!(name, back);
    }
}
