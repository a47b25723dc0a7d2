// src/version.rs

//! Latest-version selection
//!
//! Candidates are ordered by plain string comparison of `(version, release)`.
//! This is not RPM or semver ordering: `"9"` sorts after `"10"`. Pinned
//! outputs downstream were produced with this ordering, so keep it.

use crate::error::{Error, Result};
use crate::listing::PackageCandidate;

/// Pick the lexicographically greatest candidate
///
/// Callers check for an empty set first; an empty input is an error rather
/// than a silent default.
pub fn select_latest<'a, I>(candidates: I) -> Result<&'a PackageCandidate>
where
    I: IntoIterator<Item = &'a PackageCandidate>,
{
    candidates.into_iter().max().ok_or(Error::EmptyCandidates)
}
