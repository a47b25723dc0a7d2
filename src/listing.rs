// src/listing.rs

//! Directory listing parser
//!
//! Mirrors expose their package directories as server-generated HTML
//! listings. This module pulls `(version, release)` pairs for one package out
//! of such a page, either by scanning the raw text or by walking the HTML
//! tree and only looking at anchors in known positions.

use crate::error::{Error, Result};
use regex::Regex;
use scraper::{Html, Selector};
use std::collections::BTreeSet;
use tracing::debug;

/// Extension every artifact filename must end with
pub const ARTIFACT_EXTENSION: &str = ".rpm";

/// Anchor positions holding filenames in the listings we scrape
///
/// `pre a` covers nginx/plain autoindex pages, `td.indexcolname a` covers
/// Apache fancy-indexing tables.
const FILENAME_SELECTORS: &[&str] = &["pre a", "td.indexcolname a"];

// One path component of a version or release: no hyphen, and nothing that
// could let a match run across markup.
const FIELD: &str = r#"[^-\s"'<>/]+"#;

// Characters that continue a filename token. A free-text match must not be
// preceded or followed by one of these.
fn is_token_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '+' | '~' | '-')
}

/// A (version, release) pair pulled from a filename
///
/// Field order matters: the derived `Ord` compares version first, then
/// release, which is the selection order used by [`crate::version`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PackageCandidate {
    pub version: String,
    pub release: String,
}

impl PackageCandidate {
    pub fn new(version: impl Into<String>, release: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            release: release.into(),
        }
    }
}

/// Compiled filename shape for one package/release/arch
///
/// `<name>-<version>-<release>.<tag><release_id>.<arch>.rpm`
#[derive(Debug, Clone)]
pub struct FilenamePattern {
    package: String,
    tag: String,
    release_id: String,
    arch: String,
    /// Whole-filename match
    anchored: Regex,
    /// Free-text match, name must not continue a longer token
    embedded: Regex,
}

impl FilenamePattern {
    pub fn new(package: &str, tag: &str, release_id: &str, arch: &str) -> Result<Self> {
        let body = format!(
            r"{}-({field})-({field})\.{}{}\.{}{}",
            regex::escape(package),
            regex::escape(tag),
            regex::escape(release_id),
            regex::escape(arch),
            regex::escape(ARTIFACT_EXTENSION),
            field = FIELD,
        );

        let anchored = Regex::new(&format!("^{}$", body))?;
        let embedded = Regex::new(&format!(r"(?:^|[^A-Za-z0-9._+~-]){}", body))?;

        Ok(Self {
            package: package.to_string(),
            tag: tag.to_string(),
            release_id: release_id.to_string(),
            arch: arch.to_string(),
            anchored,
            embedded,
        })
    }

    pub fn package(&self) -> &str {
        &self.package
    }

    /// Match a single filename
    pub fn match_filename(&self, filename: &str) -> Option<PackageCandidate> {
        if !filename.ends_with(ARTIFACT_EXTENSION) {
            return None;
        }
        self.anchored
            .captures(filename)
            .map(|caps| PackageCandidate::new(&caps[1], &caps[2]))
    }

    /// Every non-overlapping match in a block of free text
    ///
    /// A match must end the token it sits in, so `.rpm.sig` and `.rpmnew`
    /// neighbours are skipped.
    pub fn scan<'a>(&'a self, text: &'a str) -> impl Iterator<Item = PackageCandidate> + 'a {
        self.embedded
            .captures_iter(text)
            .filter(move |caps| {
                caps.get(0)
                    .is_some_and(|m| !text[m.end()..].starts_with(is_token_char))
            })
            .map(|caps| PackageCandidate::new(&caps[1], &caps[2]))
    }

    /// Version string as pinned: `<version>-<release>.<tag><release_id>`
    pub fn full_version(&self, candidate: &PackageCandidate) -> String {
        format!(
            "{}-{}.{}{}",
            candidate.version, candidate.release, self.tag, self.release_id
        )
    }

    /// Filename of the artifact for a candidate
    pub fn filename(&self, candidate: &PackageCandidate) -> String {
        format!(
            "{}-{}.{}{}",
            self.package,
            self.full_version(candidate),
            self.arch,
            ARTIFACT_EXTENSION
        )
    }
}

/// How filenames are located in a listing page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingStrategy {
    /// Scan the raw content as text
    DirectPattern,
    /// Parse HTML and only consider anchors in known positions
    Structured,
}

impl ListingStrategy {
    /// Extract every candidate for `pattern` from `content`
    ///
    /// An empty set is a normal outcome; callers decide whether to fall back.
    pub fn extract(
        &self,
        content: &str,
        pattern: &FilenamePattern,
    ) -> Result<BTreeSet<PackageCandidate>> {
        let candidates = match self {
            Self::DirectPattern => extract_direct(content, pattern),
            Self::Structured => extract_structured(content, pattern)?,
        };

        debug!(
            "{:?} listing scan for {} found {} candidate(s)",
            self,
            pattern.package(),
            candidates.len()
        );
        Ok(candidates)
    }
}

fn extract_direct(content: &str, pattern: &FilenamePattern) -> BTreeSet<PackageCandidate> {
    content
        .lines()
        .filter(|line| line.contains(ARTIFACT_EXTENSION))
        .flat_map(|line| pattern.scan(line))
        .collect()
}

fn extract_structured(
    content: &str,
    pattern: &FilenamePattern,
) -> Result<BTreeSet<PackageCandidate>> {
    let mut candidates = BTreeSet::new();

    for filename in listed_filenames(content)? {
        if let Some(candidate) = pattern.match_filename(&filename) {
            candidates.insert(candidate);
        }
    }

    Ok(candidates)
}

/// Filenames exposed by anchors in the known listing positions
///
/// Both the link text and the decoded last `href` segment are returned,
/// since some servers truncate long names in the visible text.
pub fn listed_filenames(content: &str) -> Result<Vec<String>> {
    let document = Html::parse_document(content);
    let mut filenames = Vec::new();

    for raw in FILENAME_SELECTORS {
        let selector = Selector::parse(raw)
            .map_err(|e| Error::ParseError(format!("Invalid selector '{}': {:?}", raw, e)))?;

        for anchor in document.select(&selector) {
            let text = anchor.text().collect::<String>();
            let text = text.trim();
            if text.ends_with(ARTIFACT_EXTENSION) {
                filenames.push(text.to_string());
            }

            let href = anchor
                .value()
                .attr("href")
                .and_then(|href| href.rsplit('/').next())
                .filter(|segment| segment.ends_with(ARTIFACT_EXTENSION));
            if let Some(segment) = href {
                let decoded = urlencoding::decode(segment)
                    .map(|d| d.into_owned())
                    .unwrap_or_else(|_| segment.to_string());
                if decoded != text {
                    filenames.push(decoded);
                }
            }
        }
    }

    Ok(filenames)
}

#[cfg(test)]
mod tests {
    use super::*;

    const FEDORA_LISTING: &str = r#"<html>
<head><title>Index of /pub/fedora/linux/releases/42/Everything/x86_64/os/Packages/g</title></head>
<body>
<h1>Index of /pub/fedora/linux/releases/42/Everything/x86_64/os/Packages/g</h1><pre><img src="/icons/blank.gif" alt="Icon "> <a href="?C=N;O=D">Name</a>
<a href="gcc-15.0.1-0.11.fc42.x86_64.rpm">gcc-15.0.1-0.11.fc42.x86_64.rpm</a>   2025-03-25 18:02   40M
<a href="gcc-c++-15.0.1-0.11.fc42.x86_64.rpm">gcc-c++-15.0.1-0.11.fc42.x86_64.rpm</a>   2025-03-25 18:02   15M
<a href="gcc-gdb-plugin-15.0.1-0.11.fc42.x86_64.rpm">gcc-gdb-plugin-15.0.1-0.11.fc42.x86_64.rpm</a>
<a href="gmp-6.3.0-4.fc42.x86_64.rpm">gmp-6.3.0-4.fc42.x86_64.rpm</a>
</pre></body></html>
"#;

    const APACHE_TABLE: &str = r#"<html><body><table id="indexlist">
<tr class="indexhead"><th class="indexcolname"><a href="?C=N;O=A">Name</a></th></tr>
<tr class="odd"><td class="indexcolicon"><a href="binutils-2.41-3.el10.x86_64.rpm"><img src="/icons/rpm.png" alt="[   ]"></a></td><td class="indexcolname"><a href="binutils-2.41-3.el10.x86_64.rpm">binutils-2.41-3.el10.x86_64.rpm</a></td></tr>
<tr class="even"><td class="indexcolname"><a href="binutils-2.41-4.el10.x86_64.rpm">binutils-2.41-4.el10.x86_64.rpm</a></td></tr>
<tr class="odd"><td class="indexcolname"><a href="binutils-gold-2.41-4.el10.x86_64.rpm">binutils-gold-2.41-4.el10.x86_64.rpm</a></td></tr>
<tr class="even"><td class="indexcolname"><a href="binutils-2.41-4.el10.src.rpm.sig">binutils-2.41-4.el10.src.rpm.sig</a></td></tr>
</table>
<p>binutils-9.99-9.el10.x86_64.rpm appears in prose only</p>
</body></html>
"#;

    fn pattern(package: &str, tag: &str, release: &str) -> FilenamePattern {
        FilenamePattern::new(package, tag, release, "x86_64").unwrap()
    }

    #[test]
    fn test_match_filename() {
        let p = pattern("binutils", "fc", "42");
        assert_eq!(
            p.match_filename("binutils-2.42-1.fc42.x86_64.rpm"),
            Some(PackageCandidate::new("2.42", "1"))
        );
        assert_eq!(p.match_filename("binutils-2.42-1.fc42.aarch64.rpm"), None);
        assert_eq!(p.match_filename("binutils-2.42-1.fc41.x86_64.rpm"), None);
        assert_eq!(p.match_filename("binutils-2.42-1.fc42.x86_64.rpm.sig"), None);
        assert_eq!(p.match_filename("Binutils-2.42-1.fc42.x86_64.rpm"), None);
    }

    #[test]
    fn test_prefix_package_name_is_not_matched() {
        let listing = r#"<pre><a href="gcc-c++-12.1-1.fc42.x86_64.rpm">gcc-c++-12.1-1.fc42.x86_64.rpm</a></pre>"#;
        let p = pattern("gcc", "fc", "42");

        for strategy in [ListingStrategy::DirectPattern, ListingStrategy::Structured] {
            assert!(strategy.extract(listing, &p).unwrap().is_empty(), "{:?}", strategy);
        }
    }

    #[test]
    fn test_suffix_package_name_is_not_matched() {
        let listing = r#"<pre><a href="libgcc-14.2.1-1.fc42.x86_64.rpm">libgcc-14.2.1-1.fc42.x86_64.rpm</a></pre>"#;
        let p = pattern("gcc", "fc", "42");

        assert!(ListingStrategy::DirectPattern.extract(listing, &p).unwrap().is_empty());
        assert!(ListingStrategy::Structured.extract(listing, &p).unwrap().is_empty());
    }

    #[test]
    fn test_trailing_extension_suffix_is_not_matched() {
        let listing = r#"<pre><a href="gcc-99-1.fc42.x86_64.rpm.sig">gcc-99-1.fc42.x86_64.rpm.sig</a>
<a href="gcc-98-1.fc42.x86_64.rpmnew">gcc-98-1.fc42.x86_64.rpmnew</a>
<a href="gcc-15-1.fc42.x86_64.rpm">gcc-15-1.fc42.x86_64.rpm</a>
gcc-97-1.fc42.x86_64.rpm.old gcc-15-2.fc42.x86_64.rpm</pre>"#;
        let p = pattern("gcc", "fc", "42");

        let direct = ListingStrategy::DirectPattern.extract(listing, &p).unwrap();
        let expected: BTreeSet<_> = [
            PackageCandidate::new("15", "1"),
            PackageCandidate::new("15", "2"),
        ]
        .into_iter()
        .collect();
        assert_eq!(direct, expected);

        let structured = ListingStrategy::Structured.extract(listing, &p).unwrap();
        assert_eq!(structured.len(), 1);
        assert!(structured.is_subset(&direct));
    }

    #[test]
    fn test_strategies_agree_with_signature_neighbour() {
        let listing = r#"<pre><a href="gcc-99-1.fc42.x86_64.rpm.sig">gcc-99-1.fc42.x86_64.rpm.sig</a>
<a href="gcc-15-1.fc42.x86_64.rpm">gcc-15-1.fc42.x86_64.rpm</a></pre>"#;
        let p = pattern("gcc", "fc", "42");

        let direct = ListingStrategy::DirectPattern.extract(listing, &p).unwrap();
        let structured = ListingStrategy::Structured.extract(listing, &p).unwrap();
        assert_eq!(direct, structured);
        assert_eq!(
            crate::version::select_latest(&direct).unwrap(),
            &PackageCandidate::new("15", "1")
        );
    }

    #[test]
    fn test_direct_pattern_dedupes_href_and_text() {
        let found = ListingStrategy::DirectPattern
            .extract(FEDORA_LISTING, &pattern("gcc", "fc", "42"))
            .unwrap();
        assert_eq!(found.len(), 1);
        assert!(found.contains(&PackageCandidate::new("15.0.1", "0.11")));
    }

    #[test]
    fn test_strategies_agree_on_pre_listing() {
        let p = pattern("gcc-c++", "fc", "42");
        let direct = ListingStrategy::DirectPattern.extract(FEDORA_LISTING, &p).unwrap();
        let structured = ListingStrategy::Structured.extract(FEDORA_LISTING, &p).unwrap();
        assert_eq!(direct, structured);
        assert_eq!(direct.len(), 1);
    }

    #[test]
    fn test_structured_reads_name_column_only() {
        let p = pattern("binutils", "el", "10");
        let structured = ListingStrategy::Structured.extract(APACHE_TABLE, &p).unwrap();
        let expected: BTreeSet<_> = [
            PackageCandidate::new("2.41", "3"),
            PackageCandidate::new("2.41", "4"),
        ]
        .into_iter()
        .collect();
        assert_eq!(structured, expected);

        // Free-text scanning also picks up the filename in prose
        let direct = ListingStrategy::DirectPattern.extract(APACHE_TABLE, &p).unwrap();
        assert!(direct.contains(&PackageCandidate::new("9.99", "9")));
    }

    #[test]
    fn test_listed_filenames_decodes_href() {
        let listing = r#"<pre><a href="gcc-c%2B%2B-14.2-1.el9.x86_64.rpm">gcc-c++-14.2-1.el9.x86_64..&gt;</a></pre>"#;
        let names = listed_filenames(listing).unwrap();
        assert_eq!(names, vec!["gcc-c++-14.2-1.el9.x86_64.rpm".to_string()]);

        let found = ListingStrategy::Structured
            .extract(listing, &pattern("gcc-c++", "el", "9"))
            .unwrap();
        assert!(found.contains(&PackageCandidate::new("14.2", "1")));
    }

    #[test]
    fn test_empty_listing_is_not_an_error() {
        let p = pattern("gcc", "el", "9");
        assert!(ListingStrategy::Structured.extract("", &p).unwrap().is_empty());
        assert!(ListingStrategy::DirectPattern.extract("no packages here", &p).unwrap().is_empty());
    }

    #[test]
    fn test_filename_and_full_version() {
        let p = pattern("binutils", "fc", "42");
        let candidate = PackageCandidate::new("2.42", "1");
        assert_eq!(p.full_version(&candidate), "2.42-1.fc42");
        assert_eq!(p.filename(&candidate), "binutils-2.42-1.fc42.x86_64.rpm");
    }
}
