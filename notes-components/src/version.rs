//! Lenient semantic-version ordering for re-download decisions.
//!
//! Versions are compared on `major.minor.patch`. A leading `v` is ignored,
//! anything after `-` or `+` is ignored, and segments that are missing or not
//! numeric count as `0`. This never fails, which is what the re-download
//! decision needs: a garbled installed version just looks old.

use std::cmp::Ordering;

fn segments(version: &str) -> [u64; 3] {
    let trimmed = version.trim();
    let trimmed = trimmed
        .strip_prefix('v')
        .or_else(|| trimmed.strip_prefix('V'))
        .unwrap_or(trimmed);
    let core = trimmed.split(['-', '+']).next().unwrap_or_default();

    let mut out = [0u64; 3];
    for (slot, part) in out.iter_mut().zip(core.split('.')) {
        *slot = part.trim().parse().unwrap_or(0);
    }
    out
}

/// Order two version strings.
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    segments(a).cmp(&segments(b))
}

/// True when `latest` is strictly newer than `installed`.
pub fn is_newer(latest: &str, installed: &str) -> bool {
    compare_versions(latest, installed) == Ordering::Greater
}
