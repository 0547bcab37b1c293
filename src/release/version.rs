//! Release tag normalization and version ordering

use std::cmp::Ordering;
use std::fmt;

use log::warn;
use semver::Prerelease;

/// Strip a single leading `v`/`V` from a release tag.
pub fn normalize_tag(tag: &str) -> String {
    tag.strip_prefix(['v', 'V']).unwrap_or(tag).to_string()
}

/// A dotted-numeric release version with an optional pre-release suffix.
///
/// Every numeric part takes part in ordering, and missing parts count as zero,
/// so `1.6` equals `1.6.0` and `1.6.2.1` orders after `1.6.2`. Pre-release
/// suffixes follow semver precedence and order before the plain release.
/// Build metadata (`+...`) is ignored.
#[derive(Debug, Clone)]
pub struct ReleaseVersion {
    parts: Vec<u64>,
    pre: Prerelease,
}

impl ReleaseVersion {
    pub fn parts(&self) -> &[u64] {
        &self.parts
    }

    pub fn pre(&self) -> &str {
        self.pre.as_str()
    }

    fn part(&self, idx: usize) -> u64 {
        self.parts.get(idx).copied().unwrap_or(0)
    }
}

impl Ord for ReleaseVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.parts.len().max(other.parts.len());
        (0..len)
            .map(|i| self.part(i).cmp(&other.part(i)))
            .find(|o| o.is_ne())
            .unwrap_or(Ordering::Equal)
            .then_with(|| match (self.pre.is_empty(), other.pre.is_empty()) {
                (true, true) => Ordering::Equal,
                (true, false) => Ordering::Greater,
                (false, true) => Ordering::Less,
                (false, false) => self.pre.cmp(&other.pre),
            })
    }
}

impl PartialOrd for ReleaseVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for ReleaseVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other).is_eq()
    }
}

impl Eq for ReleaseVersion {}

impl fmt::Display for ReleaseVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let core: Vec<String> = self.parts.iter().map(u64::to_string).collect();
        write!(f, "{}", core.join("."))?;
        if !self.pre.is_empty() {
            write!(f, "-{}", self.pre)?;
        }
        Ok(())
    }
}

/// Parse a dotted-numeric version leniently.
///
/// Any number of numeric parts is accepted (`"2"`, `"1.6"`, `"1.6.2.1"`). A
/// `-suffix` must be a valid semver pre-release.
pub fn parse_version(raw: &str) -> Option<ReleaseVersion> {
    let raw = raw.trim();
    let raw = raw.split_once('+').map_or(raw, |(version, _build)| version);
    if raw.is_empty() {
        return None;
    }

    let (core, pre) = match raw.split_once('-') {
        Some((_, "")) => return None,
        Some((core, pre)) => (core, Prerelease::new(pre).ok()?),
        None => (raw, Prerelease::EMPTY),
    };

    let parts = core
        .split('.')
        .map(|p| {
            if p.is_empty() || !p.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            p.parse::<u64>().ok()
        })
        .collect::<Option<Vec<_>>>()?;

    Some(ReleaseVersion { parts, pre })
}

/// True only when `candidate` orders strictly after `current`.
pub fn is_newer(candidate: &str, current: &str) -> bool {
    let Some(candidate_version) = parse_version(candidate) else {
        warn!("Ignoring release with unparseable version '{}'", candidate);
        return false;
    };
    let Some(current_version) = parse_version(current) else {
        warn!("Installed version '{}' is unparseable, not offering updates", current);
        return false;
    };

    candidate_version > current_version
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_tag() {
        assert_eq!(normalize_tag("v1.2.3"), "1.2.3");
        assert_eq!(normalize_tag("V1.2.3"), "1.2.3");
        assert_eq!(normalize_tag("1.2.3"), "1.2.3");
        assert_eq!(normalize_tag(""), "");
        assert_eq!(normalize_tag("v"), "");
        assert_eq!(normalize_tag("vv1.0"), "v1.0");
    }

    #[test]
    fn test_parse_version_lenient() {
        assert_eq!(parse_version("1.6").unwrap().parts(), &[1, 6]);
        assert_eq!(parse_version("2").unwrap().parts(), &[2]);
        assert_eq!(parse_version(" 1.6.2 ").unwrap().parts(), &[1, 6, 2]);
        assert_eq!(parse_version("1.6.2.1").unwrap().parts(), &[1, 6, 2, 1]);
        assert_eq!(parse_version("1.6.2+build.7").unwrap().parts(), &[1, 6, 2]);

        let pre = parse_version("2.0-beta.1").unwrap();
        assert_eq!(pre.parts(), &[2, 0]);
        assert_eq!(pre.pre(), "beta.1");
        assert_eq!(pre.to_string(), "2.0-beta.1");

        assert!(parse_version("").is_none());
        assert!(parse_version("latest").is_none());
        assert!(parse_version("1..2").is_none());
        assert!(parse_version("v1.2.3").is_none());
        assert!(parse_version("1.2.3-").is_none());
    }

    #[test]
    fn test_version_comparison() {
        assert!(is_newer("1.6.2", "1.6.0"));
        assert!(is_newer("1.10.0", "1.9.9"));
        assert!(is_newer("2.0", "1.99.99"));
        assert!(is_newer("2.0.0", "2.0.0-rc.1"));
        assert!(is_newer("2.0.0-rc.2", "2.0.0-rc.1"));

        assert!(!is_newer("1.6.0", "1.6.0"));
        assert!(!is_newer("1.6", "1.6.0"));
        assert!(!is_newer("1.5.9", "1.6.0"));
        assert!(!is_newer("2.0.0-rc.1", "2.0.0"));
    }

    #[test]
    fn test_four_part_versions_order_on_every_part() {
        assert!(is_newer("1.6.2.1", "1.6.2"));
        assert!(is_newer("1.6.2.2", "1.6.2.1"));
        assert!(is_newer("1.6.3", "1.6.2.9"));

        assert!(!is_newer("1.6.2", "1.6.2.1"));
        assert!(!is_newer("1.6.2.0", "1.6.2"));
        assert!(!is_newer("1.6.2", "1.6.2.0"));
    }

    #[test]
    fn test_unparseable_versions_never_update() {
        assert!(!is_newer("nightly", "1.0.0"));
        assert!(!is_newer("9.9.9", "unknown"));
    }
}
