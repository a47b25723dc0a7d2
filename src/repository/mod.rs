// src/repository/mod.rs

//! Repository access and package resolution
//!
//! This module provides:
//! - The `Fetcher` seam over HTTP (listings as text, artifacts as streams)
//! - `RepositoryClient`, the reqwest-backed fetcher
//! - Resolution of a package query to a concrete download URL

pub mod resolvers;

use crate::config::{Architecture, DistroFamily, HttpConfig};
use crate::error::{Error, Result};
use crate::listing::{FilenamePattern, ListingStrategy};
use crate::version::select_latest;
use reqwest::blocking::{Client, Response};
use std::fmt;
use std::io::Read;
use tracing::{debug, info};

pub use resolvers::{resolver_for, RepositoryResolver, SubRepository};

/// Source of listing pages and artifact bytes
pub trait Fetcher {
    /// Fetch a directory listing as text
    fn fetch_index(&self, url: &str) -> Result<String>;

    /// Open an artifact for streaming
    fn open_artifact(&self, url: &str) -> Result<Box<dyn Read + '_>>;
}

/// HTTP fetcher used against real mirrors
pub struct RepositoryClient {
    client: Client,
}

impl RepositoryClient {
    /// Create a new repository client
    pub fn new(config: &HttpConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::InitError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }

    fn get(&self, url: &str) -> std::result::Result<Response, String> {
        let response = self.client.get(url).send().map_err(|e| e.to_string())?;

        if !response.status().is_success() {
            return Err(format!("HTTP {}", response.status()));
        }

        Ok(response)
    }
}

impl Fetcher for RepositoryClient {
    fn fetch_index(&self, url: &str) -> Result<String> {
        debug!("Fetching index {}", url);

        let index_error = |reason: String| Error::IndexFetch {
            url: url.to_string(),
            reason,
        };

        self.get(url)
            .map_err(index_error)?
            .text()
            .map_err(|e| index_error(e.to_string()))
    }

    fn open_artifact(&self, url: &str) -> Result<Box<dyn Read + '_>> {
        debug!("Opening artifact {}", url);

        let response = self.get(url).map_err(|reason| Error::ArtifactFetch {
            url: url.to_string(),
            reason,
        })?;

        Ok(Box::new(response))
    }
}

/// One package lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageQuery {
    pub family: DistroFamily,
    pub release: String,
    pub arch: Architecture,
    pub package: String,
}

impl PackageQuery {
    pub fn new(
        family: DistroFamily,
        release: impl Into<String>,
        arch: Architecture,
        package: impl Into<String>,
    ) -> Self {
        Self {
            family,
            release: release.into(),
            arch,
            package: package.into(),
        }
    }
}

/// Repository-specific detail carried into the pinned record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepoMetadata {
    /// Fedora letter bucket (`g` for `gcc`)
    Subpath(String),
    /// CentOS Stream sub-repository
    PackageDir(SubRepository),
    /// Single flat repository, nothing to record
    Flat,
}

impl fmt::Display for RepoMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Subpath(subpath) => write!(f, "subpath={}", subpath),
            Self::PackageDir(dir) => write!(f, "package_dir={}", dir),
            Self::Flat => f.write_str("-"),
        }
    }
}

/// Index page to query, and where its artifacts are downloaded from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexLocation {
    pub listing_url: String,
    /// Directory URL without trailing slash
    pub download_base: String,
    pub metadata: RepoMetadata,
}

/// A package pinned to one artifact
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPackage {
    pub name: String,
    /// `<version>-<release>.<tag><release_id>`
    pub version: String,
    pub url: String,
    pub filename: String,
    pub metadata: RepoMetadata,
}

/// Resolve the latest artifact for a query
///
/// Index locations are tried in the resolver's priority order. A failed
/// fetch or an index without a match moves on to the next location; when
/// none remain, the last failure is returned.
pub fn resolve_package(
    resolver: &dyn RepositoryResolver,
    fetcher: &dyn Fetcher,
    query: &PackageQuery,
) -> Result<ResolvedPackage> {
    if query.family != resolver.family() {
        return Err(Error::ConfigError(format!(
            "{} query routed to {} resolver",
            query.family,
            resolver.family()
        )));
    }

    let pattern = FilenamePattern::new(
        &query.package,
        resolver.filename_tag(),
        &query.release,
        query.arch.as_str(),
    )?;

    let mut last_error = None;
    for location in resolver.index_locations(query)? {
        match resolve_at(resolver.strategy(), fetcher, &pattern, &location) {
            Ok(resolved) => {
                info!(
                    "Resolved {} {} from {}",
                    resolved.name, resolved.version, location.listing_url
                );
                return Ok(resolved);
            }
            Err(e @ (Error::IndexFetch { .. } | Error::NoMatch { .. })) => {
                debug!("{}", e);
                last_error = Some(e);
            }
            Err(e) => return Err(e),
        }
    }

    Err(last_error.unwrap_or_else(|| Error::UnmappedPackage(query.package.clone())))
}

fn resolve_at(
    strategy: ListingStrategy,
    fetcher: &dyn Fetcher,
    pattern: &FilenamePattern,
    location: &IndexLocation,
) -> Result<ResolvedPackage> {
    let content = fetcher.fetch_index(&location.listing_url)?;
    let candidates = strategy.extract(&content, pattern)?;
    if candidates.is_empty() {
        return Err(Error::NoMatch {
            package: pattern.package().to_string(),
            url: location.listing_url.clone(),
        });
    }

    let latest = select_latest(&candidates)?;
    let filename = pattern.filename(latest);

    Ok(ResolvedPackage {
        name: pattern.package().to_string(),
        version: pattern.full_version(latest),
        url: format!("{}/{}", location.download_base, filename),
        filename,
        metadata: location.metadata.clone(),
    })
}
