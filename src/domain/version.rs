use std::cmp::Ordering;
use std::fmt;
use std::sync::OnceLock;

use regex::Regex;

/// Parsed form of a `vMAJOR.MINOR.PATCH` tag
///
/// Field order gives the derived `Ord` numeric component-wise ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VersionTriple {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

impl VersionTriple {
    /// Create a new version triple
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        VersionTriple {
            major,
            minor,
            patch,
        }
    }

    /// Parse a semver tag name (e.g., "v1.2.3" -> VersionTriple(1,2,3))
    ///
    /// The grammar is strict: a lowercase `v` followed by exactly three
    /// dot-separated non-negative integers without leading zeros. Pre-release
    /// and build suffixes are rejected. Malformed input yields `None`.
    pub fn parse(tag: &str) -> Option<Self> {
        let core = tag.strip_prefix('v')?;
        let version = semver::Version::parse(core).ok()?;
        if !version.pre.is_empty() || !version.build.is_empty() {
            return None;
        }
        Some(VersionTriple::new(version.major, version.minor, version.patch))
    }

    /// Next patch release within the same minor line
    pub fn bump_patch(self) -> Self {
        VersionTriple {
            patch: self.patch.saturating_add(1),
            ..self
        }
    }

    /// Full tag name, e.g. `v1.2.3`
    pub fn tag_name(&self) -> String {
        format!("v{}", self)
    }

    /// Major alias tag name, e.g. `v1`
    pub fn major_tag(&self) -> String {
        format!("v{}", self.major)
    }
}

impl fmt::Display for VersionTriple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

fn major_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^v(0|[1-9][0-9]*)$").expect("major tag pattern is valid"))
}

/// Parse a semver tag name; see [VersionTriple::parse]
pub fn parse(tag: &str) -> Option<VersionTriple> {
    VersionTriple::parse(tag)
}

/// Parse a major tag name (e.g., "v2" -> 2)
pub fn parse_major(tag: &str) -> Option<u64> {
    let captures = major_pattern().captures(tag)?;
    captures[1].parse::<u64>().ok()
}

pub fn is_semver_tag(tag: &str) -> bool {
    parse(tag).is_some()
}

pub fn is_major_tag(tag: &str) -> bool {
    parse_major(tag).is_some()
}

/// Orders two tag names newest first.
///
/// Well-formed semver tags compare numerically (major, then minor, then
/// patch), so `v1.10.0` sorts before `v1.9.9`. Malformed names sort after
/// every well-formed one, by name.
pub fn compare_descending(a: &str, b: &str) -> Ordering {
    match (parse(a), parse(b)) {
        (Some(va), Some(vb)) => vb.cmp(&va),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.cmp(b),
    }
}

/// Sort tag names newest first using [compare_descending]
pub fn sort_descending<S: AsRef<str>>(tags: &mut [S]) {
    tags.sort_by(|a, b| compare_descending(a.as_ref(), b.as_ref()));
}

/// Project a semver tag onto its major alias (`v1.2.3` -> `v1`)
pub fn major_of(semver_tag: &str) -> Option<String> {
    parse(semver_tag).map(|version| version.major_tag())
}
