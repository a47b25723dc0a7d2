// src/lib.rs

//! rpmpin
//!
//! Discovers the latest toolchain RPMs (compiler, linker, C library, headers)
//! published by Fedora, CentOS Stream and AutoSD mirrors and pins each one
//! by version and SHA-256 for a downstream build system.
//!
//! # Architecture
//!
//! - Resolvers: one per distribution family, mapping a query to index URLs
//! - Listings: directory pages scraped for `<name>-<ver>-<rel>.<tag><release>.<arch>.rpm`
//! - Selection: plain lexicographic maximum over (version, release)
//! - Hashing: streamed SHA-256 over the downloaded artifact
//! - Aggregation: per-package failures are logged and skipped, never fatal

pub mod aggregator;
pub mod config;
mod error;
pub mod hasher;
pub mod listing;
pub mod report;
pub mod repository;
pub mod version;

pub use error::{Error, Result};
