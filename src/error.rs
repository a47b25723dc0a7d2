// src/error.rs

use thiserror::Error;

/// Core error types for rpmpin
#[derive(Error, Debug)]
pub enum Error {
    /// Directory listing could not be retrieved
    #[error("Failed to fetch index {url}: {reason}")]
    IndexFetch { url: String, reason: String },

    /// Listing was fetched but no filename matched the package pattern
    #[error("No matching {package} package found in {url}")]
    NoMatch { package: String, url: String },

    /// Package has no known sub-repository mapping
    #[error("Package not categorized: {0}")]
    UnmappedPackage(String),

    /// Artifact download could not be started
    #[error("Failed to fetch artifact {url}: {reason}")]
    ArtifactFetch { url: String, reason: String },

    /// Artifact stream broke while hashing
    #[error("Failed to compute SHA-256 for {url}: {reason}")]
    HashCompute { url: String, reason: String },

    /// Version selection was asked to pick from nothing
    #[error("Cannot select latest version from an empty candidate set")]
    EmptyCandidates,

    /// Unknown distribution family name
    #[error("Unknown distribution: {0}")]
    InvalidDistribution(String),

    /// Architecture outside the supported set
    #[error("Unsupported architecture: {0} (expected x86_64 or aarch64)")]
    InvalidArchitecture(String),

    /// Release identifier has the wrong shape for its family
    #[error("Invalid release '{release}' for {distro}")]
    InvalidRelease { distro: String, release: String },

    /// Matrix configuration is unusable
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// HTTP client initialization error
    #[error("Initialization error: {0}")]
    InitError(String),

    /// Listing content could not be parsed
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Filename pattern failed to compile
    #[error("Invalid filename pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias using rpmpin's Error type
pub type Result<T> = std::result::Result<T, Error>;
