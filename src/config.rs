// src/config.rs

//! Run configuration
//!
//! Describes which distribution variants, releases, architectures and
//! packages a run covers. Everything here is validated before the first
//! network request so a bad matrix fails fast instead of half-way through.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use tracing::debug;

/// User-Agent attached to every index and artifact request
pub const USER_AGENT: &str = "Multi-GCC-Toolchain-Updater/1.0";

/// Toolchain packages pinned for every distribution
pub const BASE_PACKAGES: &[&str] = &[
    "gcc",
    "gcc-c++",
    "cpp",
    "binutils",
    "glibc-devel",
    "libstdc++-devel",
    "libstdc++",
    "kernel-headers",
    "glibc",
    "libgcc",
    "libmpc",
    "gmp",
    "mpfr",
];

/// Distribution family, selecting repository layout and filename tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DistroFamily {
    /// Fedora: per-letter package buckets
    Fedora,
    /// CentOS Stream: BaseOS/AppStream split
    CentosStream,
    /// AutoSD: single flat compose repository
    Autosd,
}

impl DistroFamily {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fedora => "fedora",
            Self::CentosStream => "centos-stream",
            Self::Autosd => "autosd",
        }
    }

    /// Variant label used when the configuration does not name one
    pub fn default_variant(&self, release: &str) -> String {
        match self {
            Self::Fedora => "fedora".to_string(),
            Self::CentosStream => format!("centos_stream_{}", release),
            Self::Autosd => format!("autosd_{}", release),
        }
    }

    /// Validate a release identifier and return its canonical form
    ///
    /// Fedora and AutoSD releases are plain numbers. CentOS Stream also
    /// accepts the `N-stream` spelling used in mirror paths.
    pub fn normalize_release(&self, release: &str) -> Result<String> {
        let release = release.trim();
        let candidate = match self {
            Self::CentosStream => release.strip_suffix("-stream").unwrap_or(release),
            Self::Fedora | Self::Autosd => release,
        };

        if candidate.is_empty() || !candidate.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Error::InvalidRelease {
                distro: self.as_str().to_string(),
                release: release.to_string(),
            });
        }

        Ok(candidate.to_string())
    }
}

impl fmt::Display for DistroFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DistroFamily {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fedora" => Ok(Self::Fedora),
            "centos-stream" | "centos_stream" | "stream" => Ok(Self::CentosStream),
            // "centos" historically meant the AutoSD compose
            "autosd" | "centos" => Ok(Self::Autosd),
            _ => Err(Error::InvalidDistribution(s.to_string())),
        }
    }
}

/// Target CPU architecture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Architecture {
    X86_64,
    Aarch64,
}

impl Architecture {
    pub const ALL: [Architecture; 2] = [Architecture::X86_64, Architecture::Aarch64];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::X86_64 => "x86_64",
            Self::Aarch64 => "aarch64",
        }
    }
}

impl fmt::Display for Architecture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Architecture {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "x86_64" => Ok(Self::X86_64),
            "aarch64" => Ok(Self::Aarch64),
            _ => Err(Error::InvalidArchitecture(s.to_string())),
        }
    }
}

/// Release identifier as written in a config file (`"42"` or `42`)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ReleaseId {
    Text(String),
    Number(u64),
}

impl fmt::Display for ReleaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Number(n) => write!(f, "{}", n),
        }
    }
}

/// Unvalidated matrix entry, as read from JSON or assembled by the CLI
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawMatrixEntry {
    pub distro: String,
    #[serde(default)]
    pub name: Option<String>,
    pub release: ReleaseId,
    #[serde(default)]
    pub arches: Vec<String>,
    #[serde(default)]
    pub packages: Vec<String>,
    #[serde(default)]
    pub mirror: Option<String>,
}

/// Validated matrix entry consumed by the aggregator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatrixEntry {
    pub family: DistroFamily,
    /// Top-level key in the report (e.g. "fedora", "autosd_9")
    pub variant: String,
    pub release: String,
    pub arches: Vec<Architecture>,
    pub packages: Vec<String>,
    /// Mirror root overriding the family default
    pub mirror: Option<String>,
}

impl MatrixEntry {
    /// Validate a raw entry
    ///
    /// Empty `arches` means every supported architecture, empty `packages`
    /// means [`BASE_PACKAGES`].
    pub fn from_raw(raw: RawMatrixEntry) -> Result<Self> {
        let family: DistroFamily = raw.distro.parse()?;
        let release = family.normalize_release(&raw.release.to_string())?;

        let mut arches = Vec::new();
        for arch in &raw.arches {
            let arch: Architecture = arch.parse()?;
            if !arches.contains(&arch) {
                arches.push(arch);
            }
        }
        if arches.is_empty() {
            arches = Architecture::ALL.to_vec();
        }

        let packages = if raw.packages.is_empty() {
            BASE_PACKAGES.iter().map(|p| p.to_string()).collect()
        } else {
            raw.packages
        };
        if let Some(bad) = packages.iter().find(|p| p.trim().is_empty() || p.contains('/')) {
            return Err(Error::ConfigError(format!("Invalid package name '{}'", bad)));
        }

        let variant = match raw.name {
            Some(name) if !name.trim().is_empty() => name,
            Some(_) => return Err(Error::ConfigError("Variant name must not be empty".to_string())),
            None => family.default_variant(&release),
        };

        Ok(Self {
            family,
            variant,
            release,
            arches,
            packages,
            mirror: raw.mirror.map(|m| m.trim_end_matches('/').to_string()),
        })
    }
}

/// Matrix used when no configuration is given
pub fn default_matrix() -> Vec<MatrixEntry> {
    let base: Vec<String> = BASE_PACKAGES.iter().map(|p| p.to_string()).collect();
    let mut el9 = base.clone();
    el9.push("glibc-headers".to_string());

    let entry = |family: DistroFamily, release: &str, packages: Vec<String>| MatrixEntry {
        family,
        variant: family.default_variant(release),
        release: release.to_string(),
        arches: Architecture::ALL.to_vec(),
        packages,
        mirror: None,
    };

    vec![
        entry(DistroFamily::Fedora, "42", base.clone()),
        entry(DistroFamily::CentosStream, "10", base.clone()),
        entry(DistroFamily::Autosd, "10", base),
        entry(DistroFamily::Autosd, "9", el9),
    ]
}

/// Validate a list of raw entries as one matrix
pub fn build_matrix(entries: Vec<RawMatrixEntry>) -> Result<Vec<MatrixEntry>> {
    if entries.is_empty() {
        return Err(Error::ConfigError("Matrix has no entries".to_string()));
    }

    let entries = entries
        .into_iter()
        .map(MatrixEntry::from_raw)
        .collect::<Result<Vec<_>>>()?;

    let mut seen = HashSet::new();
    for entry in &entries {
        if !seen.insert(entry.variant.clone()) {
            return Err(Error::ConfigError(format!(
                "Duplicate variant name '{}'",
                entry.variant
            )));
        }
    }

    Ok(entries)
}

/// Load a matrix from a JSON array of entries
pub fn load_matrix(path: &Path) -> Result<Vec<MatrixEntry>> {
    debug!("Loading matrix from {}", path.display());

    let content = fs::read_to_string(path).map_err(|e| {
        Error::ConfigError(format!("Failed to read {}: {}", path.display(), e))
    })?;
    let raw: Vec<RawMatrixEntry> = serde_json::from_str(&content)?;

    build_matrix(raw)
}

/// HTTP client settings
#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub user_agent: String,
    /// Whole-request timeout; `None` leaves large downloads unbounded
    pub timeout: Option<Duration>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: USER_AGENT.to_string(),
            timeout: None,
        }
    }
}
