//! Candidate versions offered at the version and build number steps.

use std::collections::BTreeSet;

use semver::{BuildMetadata, Prerelease, Version};

use super::models::{BuildVersions, Versions};

/// Which component of a semantic version to bump
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bump {
    Patch,
    Minor,
    Major,
}

/// Bump `current` the way `npm version` does.
///
/// A pre-release is promoted to its release when the components below the
/// bumped one are already zero (`1.2.3-rc.1` patch -> `1.2.3`). Otherwise the
/// component is incremented and the lower ones reset. Pre-release and build
/// metadata are always dropped. Returns `None` when `current` does not parse
/// or the component would overflow.
pub fn bump(current: &str, bump: Bump) -> Option<String> {
    let v = Version::parse(current).ok()?;
    let pre = !v.pre.is_empty();

    let (major, minor, patch) = match bump {
        Bump::Patch if pre => (v.major, v.minor, v.patch),
        Bump::Patch => (v.major, v.minor, v.patch.checked_add(1)?),
        Bump::Minor if pre && v.patch == 0 => (v.major, v.minor, 0),
        Bump::Minor => (v.major, v.minor.checked_add(1)?, 0),
        Bump::Major if pre && v.minor == 0 && v.patch == 0 => (v.major, 0, 0),
        Bump::Major => (v.major.checked_add(1)?, 0, 0),
    };

    let next = Version {
        major,
        minor,
        patch,
        pre: Prerelease::EMPTY,
        build: BuildMetadata::EMPTY,
    };
    Some(next.to_string())
}

/// Patch, minor and major bumps of `current`, in that order.
///
/// Bumps that fail are left out, so an unparsable version yields no
/// candidates. Duplicates are kept as computed.
pub fn version_candidates(current: &str) -> Versions {
    let updated_versions = [Bump::Patch, Bump::Minor, Bump::Major]
        .into_iter()
        .filter_map(|b| bump(current, b))
        .collect();

    Versions {
        current: current.to_string(),
        updated_versions,
    }
}

/// Build number choices around `current`.
///
/// `next` (current + 1) is the highlighted choice. The others are the current
/// number itself, `1` when current is above 1, and current + 2 through
/// current + 5.
pub fn build_version_candidates(current: u64) -> BuildVersions {
    let mut candidates = BTreeSet::new();
    candidates.insert(current);
    if current > 1 {
        candidates.insert(1);
    }
    candidates.extend((2..=5).filter_map(|n| current.checked_add(n)));

    // at u64::MAX next saturates onto current
    let next = current.saturating_add(1);
    candidates.remove(&next);

    BuildVersions {
        current,
        next,
        updated_versions: candidates.into_iter().collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_candidates_release() {
        let versions = version_candidates("1.2.3");
        assert_eq!(versions.current, "1.2.3");
        assert_eq!(versions.updated_versions, vec!["1.2.4", "1.3.0", "2.0.0"]);
    }

    #[test]
    fn test_version_candidates_unparsable() {
        let versions = version_candidates("not-a-version");
        assert_eq!(versions.current, "not-a-version");
        assert!(versions.updated_versions.is_empty());

        assert!(version_candidates("v1.2.3").updated_versions.is_empty());
        assert!(version_candidates("").updated_versions.is_empty());
    }

    #[test]
    fn test_bump_strips_build_metadata() {
        assert_eq!(bump("1.2.3+build.9", Bump::Patch).as_deref(), Some("1.2.4"));
        assert_eq!(bump("1.2.3+build.9", Bump::Minor).as_deref(), Some("1.3.0"));
    }

    #[test]
    fn test_bump_prerelease_promotes() {
        let versions = version_candidates("1.2.3-beta.2");
        assert_eq!(versions.updated_versions, vec!["1.2.3", "1.3.0", "2.0.0"]);
    }

    #[test]
    fn test_bump_prerelease_keeps_duplicates() {
        let versions = version_candidates("2.0.0-rc.1");
        assert_eq!(versions.updated_versions, vec!["2.0.0", "2.0.0", "2.0.0"]);
    }

    #[test]
    fn test_bump_overflow_is_dropped() {
        let current = format!("{}.0.0", u64::MAX);
        let versions = version_candidates(&current);
        assert_eq!(versions.updated_versions.len(), 2);
    }

    #[test]
    fn test_build_candidates_from_one() {
        let builds = build_version_candidates(1);
        assert_eq!(builds.current, 1);
        assert_eq!(builds.next, 2);
        assert_eq!(builds.updated_versions, vec![1, 3, 4, 5, 6]);
    }

    #[test]
    fn test_build_candidates_from_seven() {
        let builds = build_version_candidates(7);
        assert_eq!(builds.next, 8);
        assert_eq!(builds.updated_versions, vec![1, 7, 9, 10, 11, 12]);
    }

    #[test]
    fn test_build_candidates_at_upper_bound() {
        let builds = build_version_candidates(u64::MAX);
        assert_eq!(builds.next, u64::MAX);
        assert_eq!(builds.updated_versions, vec![1]);
        assert!(!builds.updated_versions.contains(&builds.next));
    }

    #[test]
    fn test_build_candidates_never_offer_next_twice() {
        for current in 0..20 {
            let builds = build_version_candidates(current);
            assert!(!builds.updated_versions.contains(&builds.next));
            assert!(builds.updated_versions.windows(2).all(|w| w[0] < w[1]));
        }
    }
}
