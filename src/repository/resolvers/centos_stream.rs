// src/repository/resolvers/centos_stream.rs

//! CentOS Stream repositories
//!
//! Packages are split between the BaseOS and AppStream sub-repositories,
//! each with its own flat `Packages/` listing. Toolchain packages are mapped
//! to the sub-repository they normally ship in; when that guess misses, the
//! other one is tried once.

use super::RepositoryResolver;
use crate::config::DistroFamily;
use crate::error::{Error, Result};
use crate::listing::ListingStrategy;
use crate::repository::{IndexLocation, PackageQuery, RepoMetadata};
use std::fmt;

/// Default CentOS Stream mirror
pub const DEFAULT_MIRROR: &str = "https://mirror.stream.centos.org";

/// CentOS Stream sub-repository
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubRepository {
    BaseOs,
    AppStream,
}

impl SubRepository {
    /// Directory name as it appears in mirror paths
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BaseOs => "BaseOS",
            Self::AppStream => "AppStream",
        }
    }

    pub fn other(&self) -> Self {
        match self {
            Self::BaseOs => Self::AppStream,
            Self::AppStream => Self::BaseOs,
        }
    }
}

impl fmt::Display for SubRepository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Primary sub-repository of each known toolchain package
const PACKAGE_DIRS: &[(&str, SubRepository)] = &[
    ("binutils", SubRepository::BaseOs),
    ("glibc", SubRepository::BaseOs),
    ("glibc-common", SubRepository::BaseOs),
    ("libgcc", SubRepository::BaseOs),
    ("libstdc++", SubRepository::BaseOs),
    ("gmp", SubRepository::BaseOs),
    ("mpfr", SubRepository::BaseOs),
    ("gcc", SubRepository::AppStream),
    ("gcc-c++", SubRepository::AppStream),
    ("cpp", SubRepository::AppStream),
    ("glibc-devel", SubRepository::AppStream),
    ("glibc-headers", SubRepository::AppStream),
    ("libstdc++-devel", SubRepository::AppStream),
    ("kernel-headers", SubRepository::AppStream),
    ("libmpc", SubRepository::AppStream),
    ("libxcrypt-devel", SubRepository::AppStream),
];

/// Primary sub-repository for a package, if it is categorized
pub fn package_dir(package: &str) -> Option<SubRepository> {
    PACKAGE_DIRS
        .iter()
        .find(|(name, _)| *name == package)
        .map(|(_, dir)| *dir)
}

/// CentOS Stream resolver
pub struct CentosStreamResolver {
    mirror: String,
}

impl CentosStreamResolver {
    pub fn new(mirror: Option<&str>) -> Self {
        Self {
            mirror: mirror.unwrap_or(DEFAULT_MIRROR).trim_end_matches('/').to_string(),
        }
    }

    fn location(&self, query: &PackageQuery, dir: SubRepository) -> IndexLocation {
        let base = format!(
            "{}/{}-stream/{}/{}/os/Packages",
            self.mirror, query.release, dir, query.arch
        );

        IndexLocation {
            listing_url: format!("{}/", base),
            download_base: base,
            metadata: RepoMetadata::PackageDir(dir),
        }
    }
}

impl RepositoryResolver for CentosStreamResolver {
    fn family(&self) -> DistroFamily {
        DistroFamily::CentosStream
    }

    fn filename_tag(&self) -> &'static str {
        "el"
    }

    fn strategy(&self) -> ListingStrategy {
        ListingStrategy::Structured
    }

    fn index_locations(&self, query: &PackageQuery) -> Result<Vec<IndexLocation>> {
        let primary = package_dir(&query.package)
            .ok_or_else(|| Error::UnmappedPackage(query.package.clone()))?;

        Ok(vec![
            self.location(query, primary),
            self.location(query, primary.other()),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Architecture;
    use crate::repository::fixtures::FixtureFetcher;
    use crate::repository::resolve_package;

    const BASEOS: &str = "https://mirror.stream.centos.org/10-stream/BaseOS/x86_64/os/Packages";
    const APPSTREAM: &str = "https://mirror.stream.centos.org/10-stream/AppStream/x86_64/os/Packages";

    fn table(filenames: &[&str]) -> String {
        let rows: String = filenames
            .iter()
            .map(|f| format!(r#"<tr><td class="indexcolname"><a href="{0}">{0}</a></td></tr>"#, f))
            .collect();
        format!("<html><body><table>{}</table></body></html>", rows)
    }

    #[test]
    fn test_primary_then_fallback() {
        let resolver = CentosStreamResolver::new(None);
        let query =
            PackageQuery::new(DistroFamily::CentosStream, "10", Architecture::X86_64, "gcc");

        let locations = resolver.index_locations(&query).unwrap();
        assert_eq!(locations.len(), 2);
        assert_eq!(locations[0].listing_url, format!("{}/", APPSTREAM));
        assert_eq!(locations[1].listing_url, format!("{}/", BASEOS));
        assert_eq!(
            locations[1].metadata,
            RepoMetadata::PackageDir(SubRepository::BaseOs)
        );
    }

    #[test]
    fn test_unmapped_package() {
        let resolver = CentosStreamResolver::new(None);
        let query =
            PackageQuery::new(DistroFamily::CentosStream, "10", Architecture::X86_64, "clang");

        assert!(matches!(
            resolver.index_locations(&query),
            Err(Error::UnmappedPackage(name)) if name == "clang"
        ));
    }

    #[test]
    fn test_falls_back_to_baseos_on_no_match() {
        let fetcher = FixtureFetcher::default()
            .with(&format!("{}/", APPSTREAM), table(&["gcc-c++-14.2.1-7.el10.x86_64.rpm"]))
            .with(&format!("{}/", BASEOS), table(&["gcc-14.2.1-7.el10.x86_64.rpm"]));
        let query =
            PackageQuery::new(DistroFamily::CentosStream, "10", Architecture::X86_64, "gcc");

        let resolved = resolve_package(&CentosStreamResolver::new(None), &fetcher, &query).unwrap();
        assert_eq!(resolved.metadata, RepoMetadata::PackageDir(SubRepository::BaseOs));
        assert_eq!(resolved.version, "14.2.1-7.el10");
        assert_eq!(resolved.url, format!("{}/gcc-14.2.1-7.el10.x86_64.rpm", BASEOS));
    }

    #[test]
    fn test_falls_back_on_fetch_error() {
        let fetcher = FixtureFetcher::default()
            .with(&format!("{}/", APPSTREAM), table(&["glibc-2.39-17.el10.x86_64.rpm"]));
        let query =
            PackageQuery::new(DistroFamily::CentosStream, "10", Architecture::X86_64, "glibc");

        let resolved = resolve_package(&CentosStreamResolver::new(None), &fetcher, &query).unwrap();
        assert_eq!(resolved.metadata, RepoMetadata::PackageDir(SubRepository::AppStream));
    }

    #[test]
    fn test_both_sub_repositories_missing() {
        let fetcher = FixtureFetcher::default()
            .with(&format!("{}/", APPSTREAM), table(&[]))
            .with(&format!("{}/", BASEOS), table(&[]));
        let query =
            PackageQuery::new(DistroFamily::CentosStream, "10", Architecture::X86_64, "cpp");

        let result = resolve_package(&CentosStreamResolver::new(None), &fetcher, &query);
        assert!(matches!(result, Err(Error::NoMatch { url, .. }) if url.contains("/BaseOS/")));
    }
}
