// src/report.rs

//! Report rendering
//!
//! JSON for machines, and a text block of Starlark dict entries that can be
//! pasted into a `extensions.bzl` package table.

use crate::aggregator::{PackageRecord, ResultSet};
use crate::error::{Error, Result};
use crate::repository::RepoMetadata;
use chrono::{DateTime, Utc};
use std::fmt::Write as _;
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::str::FromStr;

/// Report format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Json,
    Text,
}

impl FromStr for OutputFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "json" => Ok(Self::Json),
            "text" => Ok(Self::Text),
            _ => Err(Error::ConfigError(format!("Unknown output format: {}", s))),
        }
    }
}

/// Pretty JSON with 2-space indentation, keys in insertion order
pub fn render_json(results: &ResultSet) -> Result<String> {
    let mut json = serde_json::to_string_pretty(results)?;
    json.push('\n');
    Ok(json)
}

/// Human-readable block for copy-paste into build files
pub fn render_text(results: &ResultSet, generated_at: DateTime<Utc>) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "# Generated by rpmpin on {}",
        generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    );

    for (variant, arches) in results.variants() {
        for (arch, packages) in arches {
            let _ = writeln!(out);
            let _ = writeln!(out, "# {} {} ({} packages)", variant, arch, packages.len());
            for (name, record) in packages {
                let _ = writeln!(out, "{}", text_entry(name, record));
            }
        }
    }

    out
}

fn text_entry(name: &str, record: &PackageRecord) -> String {
    let extra = match &record.metadata {
        RepoMetadata::Subpath(subpath) => format!(", \"subpath\": {}", quote(subpath)),
        RepoMetadata::PackageDir(dir) => format!(", \"package_dir\": {}", quote(dir.as_str())),
        RepoMetadata::Flat => String::new(),
    };

    format!(
        "{}: {{\"version\": {}, \"sha256\": {}{}}},",
        quote(name),
        quote(&record.version),
        quote(&record.sha256),
        extra
    )
}

/// Starlark string literal
fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' | '\\' => {
                out.push('\\');
                out.push(c);
            }
            '\n' => out.push_str("\\n"),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Render in `format`
pub fn render(results: &ResultSet, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => render_json(results),
        OutputFormat::Text => Ok(render_text(results, Utc::now())),
    }
}

/// Write a rendered report to `path`, or stdout when `None`
pub fn write_report(rendered: &str, path: Option<&Path>) -> Result<()> {
    match path {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, rendered)?;
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(rendered.as_bytes())?;
            stdout.flush()?;
        }
    }
    Ok(())
}
