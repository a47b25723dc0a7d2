// src/repository/resolvers/fedora.rs

//! Fedora release repositories
//!
//! `Everything/<arch>/os/Packages/` is bucketed by the lowercased first
//! character of the package name, so `gcc` lives under `Packages/g/`.

use super::RepositoryResolver;
use crate::config::DistroFamily;
use crate::error::{Error, Result};
use crate::listing::ListingStrategy;
use crate::repository::{IndexLocation, PackageQuery, RepoMetadata};

/// Default Fedora download host (redirects to a nearby mirror)
pub const DEFAULT_MIRROR: &str = "https://download.fedoraproject.org";

/// Fedora resolver
pub struct FedoraResolver {
    mirror: String,
}

impl FedoraResolver {
    pub fn new(mirror: Option<&str>) -> Self {
        Self {
            mirror: mirror.unwrap_or(DEFAULT_MIRROR).trim_end_matches('/').to_string(),
        }
    }

    fn packages_url(&self, query: &PackageQuery) -> String {
        format!(
            "{}/pub/fedora/linux/releases/{}/Everything/{}/os/Packages",
            self.mirror, query.release, query.arch
        )
    }
}

/// Letter bucket for a package name
pub fn subpath(package: &str) -> Option<String> {
    package.chars().next().map(|c| c.to_lowercase().collect())
}

impl RepositoryResolver for FedoraResolver {
    fn family(&self) -> DistroFamily {
        DistroFamily::Fedora
    }

    fn filename_tag(&self) -> &'static str {
        "fc"
    }

    fn strategy(&self) -> ListingStrategy {
        // Fedora's mirrors vary in markup; scan the raw page
        ListingStrategy::DirectPattern
    }

    fn index_locations(&self, query: &PackageQuery) -> Result<Vec<IndexLocation>> {
        let subpath = subpath(&query.package)
            .ok_or_else(|| Error::ConfigError("Empty package name".to_string()))?;
        let base = self.packages_url(query);

        Ok(vec![IndexLocation {
            listing_url: format!("{}/{}/", base, subpath),
            download_base: format!("{}/{}", base, subpath),
            metadata: RepoMetadata::Subpath(subpath),
        }])
    }
}
