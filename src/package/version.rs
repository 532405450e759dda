//! Version matching for installed packages.
//!
//! Package managers print versions loosely: with or without a `v` prefix,
//! padded with trailing `.0` segments, or prefixed by `<`/`>` when the
//! installed version could only be bounded. These helpers compare such
//! strings the way a user would.

use std::cmp::Ordering::{self, Greater, Less};

/// Version matcher - pure functions over version strings.
pub struct VersionMatcher;

impl VersionMatcher {
    /// Strip decorations that do not change the version's identity.
    ///
    /// `"v3.0.20"`, `"< 3.0.20"` and `" 3.0.20 "` all normalize to `"3.0.20"`.
    pub fn normalize(version: &str) -> &str {
        let v = version.trim();
        let v = v
            .strip_prefix('<')
            .or_else(|| v.strip_prefix('>'))
            .unwrap_or(v)
            .trim_start();
        v.strip_prefix('v')
            .or_else(|| v.strip_prefix('V'))
            .unwrap_or(v)
    }

    /// Whether winget could only bound the version, printing `< X` or `> X`.
    pub fn is_bounded(version: &str) -> bool {
        Self::bound(version).is_some()
    }

    fn bound(version: &str) -> Option<Ordering> {
        match version.trim_start().chars().next() {
            Some('<') => Some(Less),
            Some('>') => Some(Greater),
            _ => None,
        }
    }

    /// Check if two version strings name the same version.
    ///
    /// Handles the `v` prefix flexibly and ignores trailing zero segments for
    /// dotted numeric versions (`3.0.20` matches `3.0.20.0`).
    ///
    /// A bounded version (`< X`, `> X`) only says the real version is below
    /// or above X, so it never matches anything.
    pub fn versions_match(v1: &str, v2: &str) -> bool {
        if Self::is_bounded(v1) || Self::is_bounded(v2) {
            return false;
        }
        let n1 = Self::normalize(v1);
        let n2 = Self::normalize(v2);
        if n1.eq_ignore_ascii_case(n2) {
            return true;
        }
        match (Self::numeric_segments(n1), Self::numeric_segments(n2)) {
            (Some(a), Some(b)) => Self::trim_zeros(&a) == Self::trim_zeros(&b),
            _ => false,
        }
    }

    /// Returns true if `candidate` is strictly newer than `current`.
    ///
    /// Dotted numeric versions are compared segment by segment. Anything else
    /// falls back to "differs means newer", since the package manager only
    /// advertises versions it considers upgrades.
    pub fn is_newer(candidate: &str, current: &str) -> bool {
        let c = Self::normalize(candidate);
        if c.is_empty() {
            return false;
        }
        match Self::compare(candidate, current) {
            Some(ordering) => ordering == Ordering::Greater,
            None => !Self::versions_match(candidate, current),
        }
    }

    /// Compare two dotted numeric versions.
    ///
    /// `< X` orders below X and `> X` above it. `None` if either side is not
    /// numeric, or a bound leaves the order open (`< 3.0` against `2.0`).
    pub fn compare(v1: &str, v2: &str) -> Option<Ordering> {
        let a = Self::numeric_segments(Self::normalize(v1))?;
        let b = Self::numeric_segments(Self::normalize(v2))?;
        let plain = Self::compare_segments(&a, &b);
        match (Self::bound(v1), Self::bound(v2)) {
            (None, None) => Some(plain),
            (Some(Less), None) => (plain != Greater).then_some(Less),
            (Some(Greater), None) => (plain != Less).then_some(Greater),
            (None, Some(Less)) => (plain != Less).then_some(Greater),
            (None, Some(Greater)) => (plain != Greater).then_some(Less),
            _ => None,
        }
    }

    fn compare_segments(a: &[u64], b: &[u64]) -> Ordering {
        let len = a.len().max(b.len());
        for i in 0..len {
            let x = a.get(i).copied().unwrap_or(0);
            let y = b.get(i).copied().unwrap_or(0);
            match x.cmp(&y) {
                Ordering::Equal => continue,
                other => return other,
            }
        }
        Ordering::Equal
    }

    fn numeric_segments(version: &str) -> Option<Vec<u64>> {
        if version.is_empty() {
            return None;
        }
        version.split('.').map(|s| s.parse::<u64>().ok()).collect()
    }

    fn trim_zeros(segments: &[u64]) -> &[u64] {
        let end = segments
            .iter()
            .rposition(|&s| s != 0)
            .map_or(0, |pos| pos + 1);
        &segments[..end]
    }
}
