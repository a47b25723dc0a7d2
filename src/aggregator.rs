// src/aggregator.rs

//! Matrix driver
//!
//! Walks every variant, architecture and package in order, resolving and
//! hashing one package at a time. A package that fails at any stage is left
//! out of the result and reported; it never stops the run.

use crate::config::{Architecture, MatrixEntry};
use crate::error::{Error, Result};
use crate::hasher::ArtifactHasher;
use crate::repository::{
    resolve_package, resolver_for, Fetcher, PackageQuery, RepoMetadata, RepositoryResolver,
};
use indexmap::IndexMap;
use serde::ser::{Serialize, SerializeMap, Serializer};
use tracing::{info, warn};

/// Pinned package as written to the report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageRecord {
    pub version: String,
    /// Lowercase hex SHA-256 of the artifact
    pub sha256: String,
    pub metadata: RepoMetadata,
}

impl Serialize for PackageRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let len = if self.metadata == RepoMetadata::Flat { 2 } else { 3 };
        let mut map = serializer.serialize_map(Some(len))?;
        map.serialize_entry("version", &self.version)?;
        map.serialize_entry("sha256", &self.sha256)?;
        match &self.metadata {
            RepoMetadata::Subpath(subpath) => map.serialize_entry("subpath", subpath)?,
            RepoMetadata::PackageDir(dir) => map.serialize_entry("package_dir", dir.as_str())?,
            RepoMetadata::Flat => {}
        }
        map.end()
    }
}

/// Packages of one (variant, arch) pair, keyed by package name
pub type ArchPackages = IndexMap<String, PackageRecord>;

/// variant → arch → package → record, in insertion order
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
#[serde(transparent)]
pub struct ResultSet {
    variants: IndexMap<String, IndexMap<String, ArchPackages>>,
}

impl ResultSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a variant so it appears even if nothing resolves
    pub fn add_variant(&mut self, variant: &str) {
        self.variants.entry(variant.to_string()).or_default();
    }

    /// Store the packages of one architecture; empty maps are dropped
    pub fn insert_arch(&mut self, variant: &str, arch: Architecture, packages: ArchPackages) {
        if packages.is_empty() {
            return;
        }
        self.variants
            .entry(variant.to_string())
            .or_default()
            .insert(arch.to_string(), packages);
    }

    pub fn get(&self, variant: &str, arch: Architecture, package: &str) -> Option<&PackageRecord> {
        self.variants.get(variant)?.get(arch.as_str())?.get(package)
    }

    pub fn arch_packages(&self, variant: &str, arch: Architecture) -> Option<&ArchPackages> {
        self.variants.get(variant)?.get(arch.as_str())
    }

    pub fn variants(&self) -> impl Iterator<Item = (&str, &IndexMap<String, ArchPackages>)> {
        self.variants.iter().map(|(name, arches)| (name.as_str(), arches))
    }

    /// Total number of pinned packages
    pub fn package_count(&self) -> usize {
        self.variants
            .values()
            .flat_map(|arches| arches.values())
            .map(|packages| packages.len())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.package_count() == 0
    }
}

/// Stage at which a package was dropped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureStage {
    Resolve,
    Hash,
}

impl FailureStage {
    fn of(error: &Error) -> Self {
        match error {
            Error::ArtifactFetch { .. } | Error::HashCompute { .. } => Self::Hash,
            _ => Self::Resolve,
        }
    }
}

/// A package omitted from the result, with its cause
#[derive(Debug)]
pub struct PackageFailure {
    pub variant: String,
    pub arch: Architecture,
    pub package: String,
    pub stage: FailureStage,
    pub error: Error,
}

/// Outcome of a full run
#[derive(Debug, Default)]
pub struct Aggregation {
    pub results: ResultSet,
    pub failures: Vec<PackageFailure>,
}

/// Runs a matrix against a fetcher
pub struct Aggregator<'a> {
    fetcher: &'a dyn Fetcher,
}

impl<'a> Aggregator<'a> {
    pub fn new(fetcher: &'a dyn Fetcher) -> Self {
        Self { fetcher }
    }

    /// Resolve and hash every configured package
    pub fn run(&self, matrix: &[MatrixEntry]) -> Aggregation {
        let mut aggregation = Aggregation::default();

        for entry in matrix {
            let resolver = resolver_for(entry.family, entry.mirror.as_deref());
            aggregation.results.add_variant(&entry.variant);

            for &arch in &entry.arches {
                info!(
                    variant = %entry.variant,
                    arch = %arch,
                    "Fetching {} {} ({})",
                    entry.variant,
                    entry.release,
                    arch
                );

                let packages =
                    self.run_arch(entry, arch, resolver.as_ref(), &mut aggregation.failures);

                if packages.is_empty() {
                    warn!(
                        variant = %entry.variant,
                        arch = %arch,
                        "No packages were successfully processed"
                    );
                } else {
                    info!(
                        variant = %entry.variant,
                        arch = %arch,
                        "Successfully processed {} packages",
                        packages.len()
                    );
                    aggregation.results.insert_arch(&entry.variant, arch, packages);
                }
            }
        }

        aggregation
    }

    fn run_arch(
        &self,
        entry: &MatrixEntry,
        arch: Architecture,
        resolver: &dyn RepositoryResolver,
        failures: &mut Vec<PackageFailure>,
    ) -> ArchPackages {
        let mut packages = ArchPackages::new();

        for package in &entry.packages {
            let query =
                PackageQuery::new(entry.family, entry.release.as_str(), arch, package.as_str());

            match self.process_package(resolver, &query) {
                Ok(record) => {
                    info!(
                        variant = %entry.variant,
                        arch = %arch,
                        package = %package,
                        "{}: {} (SHA256: {}...)",
                        package,
                        record.version,
                        &record.sha256[..16]
                    );
                    packages.insert(package.clone(), record);
                }
                Err(error) => {
                    let stage = FailureStage::of(&error);
                    warn!(
                        variant = %entry.variant,
                        arch = %arch,
                        package = %package,
                        stage = ?stage,
                        "Omitting {}: {}",
                        package,
                        error
                    );
                    failures.push(PackageFailure {
                        variant: entry.variant.clone(),
                        arch,
                        package: package.clone(),
                        stage,
                        error,
                    });
                }
            }
        }

        packages
    }

    /// Resolve and hash a single package
    pub fn process_package(
        &self,
        resolver: &dyn RepositoryResolver,
        query: &PackageQuery,
    ) -> Result<PackageRecord> {
        let resolved = resolve_package(resolver, self.fetcher, query)?;
        let sha256 = ArtifactHasher::new(self.fetcher).hash_url(&resolved.url)?;

        Ok(PackageRecord {
            version: resolved.version,
            sha256,
            metadata: resolved.metadata,
        })
    }
}
