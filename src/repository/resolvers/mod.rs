// src/repository/resolvers/mod.rs

//! Per-family repository layouts
//!
//! Each distribution family lays out its package directories differently:
//! - Fedora: one listing per first letter of the package name
//! - CentOS Stream: flat listings split into BaseOS and AppStream
//! - AutoSD: one flat compose listing, served from a separate download host

pub mod autosd;
pub mod centos_stream;
pub mod fedora;

use super::{IndexLocation, PackageQuery};
use crate::config::DistroFamily;
use crate::error::Result;
use crate::listing::ListingStrategy;

pub use autosd::AutosdResolver;
pub use centos_stream::{CentosStreamResolver, SubRepository};
pub use fedora::FedoraResolver;

/// Maps a package query to the listing pages that may hold it
pub trait RepositoryResolver {
    /// Family this resolver handles
    fn family(&self) -> DistroFamily;

    /// Distribution token preceding the release in filenames (`fc`, `el`)
    fn filename_tag(&self) -> &'static str;

    /// How filenames are located in this family's listings
    fn strategy(&self) -> ListingStrategy;

    /// Listing pages to query, highest priority first
    fn index_locations(&self, query: &PackageQuery) -> Result<Vec<IndexLocation>>;
}

/// Build the resolver for a family, optionally against a custom mirror root
pub fn resolver_for(family: DistroFamily, mirror: Option<&str>) -> Box<dyn RepositoryResolver> {
    match family {
        DistroFamily::Fedora => Box::new(FedoraResolver::new(mirror)),
        DistroFamily::CentosStream => Box::new(CentosStreamResolver::new(mirror)),
        DistroFamily::Autosd => Box::new(AutosdResolver::new(mirror)),
    }
}
