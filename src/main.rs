// src/main.rs

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use rpmpin::aggregator::Aggregator;
use rpmpin::config::{
    self, Architecture, DistroFamily, HttpConfig, MatrixEntry, RawMatrixEntry, ReleaseId,
};
use rpmpin::hasher::ArtifactHasher;
use rpmpin::report::{self, OutputFormat};
use rpmpin::repository::{resolve_package, resolver_for, PackageQuery, RepositoryClient};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "rpmpin")]
#[command(author, version, about = "Pin toolchain RPMs to exact versions and SHA-256 digests", long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve and hash every package in the matrix and write the report
    Update {
        /// JSON matrix file (default: built-in Fedora/CentOS Stream/AutoSD matrix)
        #[arg(short, long, conflicts_with = "distro")]
        config: Option<PathBuf>,
        /// Run a single distribution instead (fedora, centos-stream, autosd)
        #[arg(long)]
        distro: Option<String>,
        /// Release for --distro (e.g. 42, 10, 9)
        #[arg(long, requires = "distro")]
        release: Option<String>,
        /// Variant label for --distro
        #[arg(long, requires = "distro")]
        name: Option<String>,
        /// Architecture for --distro (repeatable; default: all)
        #[arg(long = "arch", requires = "distro")]
        arches: Vec<String>,
        /// Package for --distro (repeatable; default: toolchain set)
        #[arg(long = "package", requires = "distro")]
        packages: Vec<String>,
        /// Mirror root for --distro
        #[arg(long, requires = "distro")]
        mirror: Option<String>,
        /// Output format (json, text)
        #[arg(short, long, default_value = "json")]
        format: String,
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Request timeout in seconds (default: none)
        #[arg(long)]
        timeout: Option<u64>,
    },
    /// Resolve the latest version of one package without downloading it
    Resolve {
        /// Package name
        package: String,
        /// Distribution (fedora, centos-stream, autosd)
        #[arg(long)]
        distro: String,
        /// Release (e.g. 42, 10, 9)
        #[arg(long)]
        release: String,
        /// Architecture (x86_64, aarch64)
        #[arg(long, default_value = "x86_64")]
        arch: String,
        /// Mirror root
        #[arg(long)]
        mirror: Option<String>,
        /// Request timeout in seconds (default: none)
        #[arg(long)]
        timeout: Option<u64>,
    },
    /// Download one artifact and print its SHA-256
    Hash {
        /// Artifact URL
        url: String,
        /// Request timeout in seconds (default: none)
        #[arg(long)]
        timeout: Option<u64>,
    },
    /// Print shell completions
    Completions {
        /// Target shell
        shell: Shell,
    },
}

fn http_config(timeout: Option<u64>) -> HttpConfig {
    HttpConfig {
        timeout: timeout.map(Duration::from_secs),
        ..HttpConfig::default()
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so stdout carries only the report
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .init();

    match cli.command {
        Some(Commands::Update {
            config,
            distro,
            release,
            name,
            arches,
            packages,
            mirror,
            format,
            output,
            timeout,
        }) => {
            // Validate everything before touching the network
            let format: OutputFormat = format.parse()?;
            let matrix: Vec<MatrixEntry> = match (config, distro) {
                (Some(path), _) => config::load_matrix(&path)?,
                (None, Some(distro)) => {
                    let release = release
                        .ok_or_else(|| anyhow::anyhow!("--release is required with --distro"))?;
                    config::build_matrix(vec![RawMatrixEntry {
                        distro,
                        name,
                        release: ReleaseId::Text(release),
                        arches,
                        packages,
                        mirror,
                    }])?
                }
                (None, None) => config::default_matrix(),
            };

            let client = RepositoryClient::new(&http_config(timeout))?;
            let aggregation = Aggregator::new(&client).run(&matrix);

            info!("Summary:");
            for (variant, arches) in aggregation.results.variants() {
                for (arch, packages) in arches {
                    info!("  {} {}: {} packages", variant, arch, packages.len());
                }
            }
            if !aggregation.failures.is_empty() {
                warn!("{} package(s) could not be pinned", aggregation.failures.len());
            }

            if aggregation.results.is_empty() {
                return Err(anyhow::anyhow!("No packages were successfully processed"));
            }

            let rendered = report::render(&aggregation.results, format)?;
            report::write_report(&rendered, output.as_deref())?;
            if let Some(path) = output {
                info!("Package information written to {}", path.display());
            }

            Ok(())
        }
        Some(Commands::Resolve {
            package,
            distro,
            release,
            arch,
            mirror,
            timeout,
        }) => {
            let family: DistroFamily = distro.parse()?;
            let release = family.normalize_release(&release)?;
            let arch: Architecture = arch.parse()?;

            let client = RepositoryClient::new(&http_config(timeout))?;
            let resolver = resolver_for(family, mirror.as_deref());
            let query = PackageQuery::new(family, release, arch, package);
            let resolved = resolve_package(resolver.as_ref(), &client, &query)?;

            println!("{} {}", resolved.name, resolved.version);
            println!("  Filename: {}", resolved.filename);
            println!("  URL: {}", resolved.url);
            println!("  Metadata: {}", resolved.metadata);

            Ok(())
        }
        Some(Commands::Hash { url, timeout }) => {
            let client = RepositoryClient::new(&http_config(timeout))?;
            let sha256 = ArtifactHasher::new(&client).hash_url(&url)?;
            println!("{}  {}", sha256, url);
            Ok(())
        }
        Some(Commands::Completions { shell }) => {
            clap_complete::generate(shell, &mut Cli::command(), "rpmpin", &mut std::io::stdout());
            Ok(())
        }
        None => {
            // No command provided, show help
            println!("rpmpin v{}", env!("CARGO_PKG_VERSION"));
            println!("Run 'rpmpin --help' for usage information");
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_update_single_distro_args() {
        let cli = Cli::try_parse_from([
            "rpmpin", "update", "--distro", "fedora", "--release", "42", "--arch", "aarch64",
            "--package", "gcc", "--package", "binutils", "--format", "text",
        ])
        .unwrap();

        match cli.command {
            Some(Commands::Update { distro, arches, packages, format, .. }) => {
                assert_eq!(distro.as_deref(), Some("fedora"));
                assert_eq!(arches, vec!["aarch64".to_string()]);
                assert_eq!(packages.len(), 2);
                assert_eq!(format, "text");
            }
            _ => panic!("expected update"),
        }
    }

    #[test]
    fn test_config_conflicts_with_distro() {
        let result = Cli::try_parse_from([
            "rpmpin", "update", "--config", "matrix.json", "--distro", "fedora",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_arch_requires_distro() {
        assert!(Cli::try_parse_from(["rpmpin", "update", "--arch", "x86_64"]).is_err());
    }

    #[test]
    fn test_http_config_timeout() {
        assert_eq!(http_config(None).timeout, None);
        assert_eq!(http_config(Some(30)).timeout, Some(Duration::from_secs(30)));
        assert_eq!(http_config(None).user_agent, config::USER_AGENT);
    }
}
