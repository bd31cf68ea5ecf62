//! Revert / RPC error translation (`§4.10`): a pure data table mapping
//! known substrings and RPC codes to a [`Kind`], unit-testable without
//! any network (Design Notes `§9`).
use crate::error::{Error, Kind};

/// `(substring, Kind)`. Matched case-insensitively against the cleaned
/// message. Order matters: the first match wins, so more specific
/// strings are listed before their more general neighbours.
const TABLE: &[(&str, Kind)] = &[
    ("library does not exist", Kind::NotFound),
    ("version does not exist", Kind::NotFound),
    ("caller is not the owner", Kind::Permission),
    ("caller is not authorized", Kind::Permission),
    ("cannot authorize owner", Kind::Permission),
    ("cannot revoke owner", Kind::Permission),
    ("library is not private", Kind::Policy),
    ("library is private", Kind::Policy),
    ("license is not required", Kind::Policy),
    ("cannot delete library with published versions", Kind::Policy),
    ("name already taken", Kind::Conflict),
    ("version already exists", Kind::Conflict),
    ("license already owned", Kind::Conflict),
    ("insufficient ether sent", Kind::Funds),
    ("insufficient funds", Kind::Funds),
    ("nonce too low", Kind::Tx),
    ("nonce has already been used", Kind::Tx),
    ("replacement transaction underpriced", Kind::Tx),
    ("replacement-underpriced", Kind::Tx),
    ("user rejected", Kind::Tx),
    ("user denied", Kind::Tx),
    ("unpredictable gas limit", Kind::Tx),
    ("call exception", Kind::Unknown),
    ("-32000", Kind::Tx),
    ("-32003", Kind::Tx),
];

const STRIP_PREFIXES: &[&str] = &["execution reverted: ", "Error: ", "RPC Error: "];

/// Extraction order (`§4.10`): this function assumes the caller has
/// already walked (1) revert reason, (2) ABI-decoded custom error name,
/// (3) nested provider message, (4) top-level message, in that order,
/// and hands it the first non-empty string found. Translation itself
/// is then pure classification.
pub fn classify(raw: &str) -> Error {
    let cleaned = clean(raw);
    let lower = cleaned.to_ascii_lowercase();
    for (needle, kind) in TABLE {
        if lower.contains(&needle.to_ascii_lowercase()) {
            return Error::classified(*kind, cleaned);
        }
    }
    Error::classified(Kind::Unknown, cleaned)
}

fn clean(raw: &str) -> String {
    let mut s = raw.trim();
    loop {
        let mut stripped = false;
        for prefix in STRIP_PREFIXES {
            if let Some(rest) = s.strip_prefix(prefix) {
                s = rest.trim();
                stripped = true;
            }
        }
        if !stripped {
            break;
        }
    }
    s.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_known_revert_strings() {
        assert_eq!(classify("library does not exist").kind(), Kind::NotFound);
        assert_eq!(classify("execution reverted: caller is not the owner").kind(), Kind::Permission);
        assert_eq!(classify("version already exists").kind(), Kind::Conflict);
        assert_eq!(classify("insufficient ether sent").kind(), Kind::Funds);
        assert_eq!(classify("nonce too low").kind(), Kind::Tx);
        assert_eq!(
            classify("cannot delete library with published versions").kind(),
            Kind::Policy
        );
    }

    #[test]
    fn classifies_rpc_codes() {
        assert_eq!(classify("Error: -32000 insufficient funds for gas").kind(), Kind::Tx);
    }

    #[test]
    fn unmapped_errors_default_to_unknown_with_cleaned_message() {
        let err = classify("Error: RPC Error: something bizarre happened");
        assert_eq!(err.kind(), Kind::Unknown);
        assert_eq!(err.to_string(), "something bizarre happened");
    }

    #[test]
    fn matching_is_case_insensitive() {
        assert_eq!(classify("LIBRARY DOES NOT EXIST").kind(), Kind::NotFound);
    }
}
