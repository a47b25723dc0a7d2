// src/repository/resolvers/autosd.rs

//! AutoSD nightly compose
//!
//! One flat `Packages/` directory per release and architecture. The listing
//! is browsed on the SIG host while artifacts are served from the download
//! host under the same path.

use super::RepositoryResolver;
use crate::config::DistroFamily;
use crate::error::Result;
use crate::listing::ListingStrategy;
use crate::repository::{IndexLocation, PackageQuery, RepoMetadata};

/// Host serving the browsable listing
pub const DEFAULT_LISTING_MIRROR: &str = "https://autosd.sig.centos.org";

/// Host serving the artifacts
pub const DEFAULT_DOWNLOAD_MIRROR: &str = "https://download.autosd.sig.centos.org";

/// AutoSD resolver
pub struct AutosdResolver {
    listing_mirror: String,
    download_mirror: String,
}

impl AutosdResolver {
    /// A custom mirror serves both the listing and the artifacts
    pub fn new(mirror: Option<&str>) -> Self {
        let (listing, download) = match mirror {
            Some(m) => (m, m),
            None => (DEFAULT_LISTING_MIRROR, DEFAULT_DOWNLOAD_MIRROR),
        };

        Self {
            listing_mirror: listing.trim_end_matches('/').to_string(),
            download_mirror: download.trim_end_matches('/').to_string(),
        }
    }

    fn compose_path(query: &PackageQuery) -> String {
        format!(
            "AutoSD-{}/nightly/repos/AutoSD/compose/AutoSD/{}/os/Packages",
            query.release, query.arch
        )
    }
}

impl RepositoryResolver for AutosdResolver {
    fn family(&self) -> DistroFamily {
        DistroFamily::Autosd
    }

    fn filename_tag(&self) -> &'static str {
        "el"
    }

    fn strategy(&self) -> ListingStrategy {
        ListingStrategy::Structured
    }

    fn index_locations(&self, query: &PackageQuery) -> Result<Vec<IndexLocation>> {
        let path = Self::compose_path(query);

        Ok(vec![IndexLocation {
            listing_url: format!("{}/{}/", self.listing_mirror, path),
            download_base: format!("{}/{}", self.download_mirror, path),
            metadata: RepoMetadata::Flat,
        }])
    }
}
