//! Semantic version and constraint helpers shared by the resolver and
//! the publisher.
use semver::{Version, VersionReq};

/// A SemVer range expression attached to a dependency (e.g. `^1.2.0`).
pub type VersionConstraint = VersionReq;

/// Choose the highest version in `available` that satisfies
/// `constraint`, per strict SemVer precedence.
///
/// Pre-release versions are only considered when `constraint` itself
/// names a pre-release (matching `semver`'s own matching rules); see
/// [`latest_stable`] for the "no specifier given" case which excludes
/// them outright.
pub fn max_satisfying<'a>(
    available: &'a [Version],
    constraint: &VersionConstraint,
) -> Option<&'a Version> {
    available
        .iter()
        .filter(|v| constraint.matches(v))
        .max()
}

/// Choose the highest non-prerelease version in `available`.
///
/// Used when the top-level install specifier is omitted ("latest
/// stable"); pre-release versions are dropped unconditionally.
pub fn latest_stable(available: &[Version]) -> Option<&Version> {
    available
        .iter()
        .filter(|v| v.pre.is_empty())
        .max()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> Version {
        Version::parse(s).unwrap()
    }

    #[test]
    fn latest_stable_excludes_prerelease() {
        let available = vec![v("1.0.0"), v("1.1.0"), v("2.0.0-beta.1")];
        assert_eq!(Some(&v("1.1.0")), latest_stable(&available));
    }

    #[test]
    fn max_satisfying_picks_highest_match() {
        let available = vec![v("1.2.0"), v("1.2.3"), v("2.0.0")];
        let constraint = VersionReq::parse("^1.2.0").unwrap();
        assert_eq!(Some(&v("1.2.3")), max_satisfying(&available, &constraint));
    }

    #[test]
    fn max_satisfying_returns_none_when_unsatisfiable() {
        let available = vec![v("1.0.0")];
        let constraint = VersionReq::parse("^2.0.0").unwrap();
        assert_eq!(None, max_satisfying(&available, &constraint));
    }

    #[test]
    fn latest_stable_requires_non_empty() {
        let available: Vec<Version> = vec![];
        assert_eq!(None, latest_stable(&available));
    }
}
