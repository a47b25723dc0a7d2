// build.rs

use clap::{Arg, ArgAction, Command};
use clap_mangen::Man;
use std::env;
use std::fs;
use std::path::PathBuf;

fn timeout_arg() -> Arg {
    Arg::new("timeout")
        .long("timeout")
        .value_name("SECS")
        .help("Request timeout in seconds (default: none)")
}

fn build_cli() -> Command {
    Command::new("rpmpin")
        .version(env!("CARGO_PKG_VERSION"))
        .author("rpmpin Contributors")
        .about("Pin toolchain RPMs to exact versions and SHA-256 digests")
        .subcommand_required(false)
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::SetTrue)
                .global(true)
                .help("Enable debug logging"),
        )
        .subcommand(
            Command::new("update")
                .about("Resolve and hash every package in the matrix and write the report")
                .arg(
                    Arg::new("config")
                        .short('c')
                        .long("config")
                        .value_name("FILE")
                        .help("JSON matrix file"),
                )
                .arg(Arg::new("distro").long("distro").help("Run a single distribution instead"))
                .arg(Arg::new("release").long("release").help("Release for --distro"))
                .arg(Arg::new("name").long("name").help("Variant label for --distro"))
                .arg(
                    Arg::new("arches")
                        .long("arch")
                        .action(ArgAction::Append)
                        .help("Architecture for --distro (repeatable)"),
                )
                .arg(
                    Arg::new("packages")
                        .long("package")
                        .action(ArgAction::Append)
                        .help("Package for --distro (repeatable)"),
                )
                .arg(Arg::new("mirror").long("mirror").help("Mirror root for --distro"))
                .arg(
                    Arg::new("format")
                        .short('f')
                        .long("format")
                        .default_value("json")
                        .help("Output format (json, text)"),
                )
                .arg(
                    Arg::new("output")
                        .short('o')
                        .long("output")
                        .value_name("FILE")
                        .help("Output file (default: stdout)"),
                )
                .arg(timeout_arg()),
        )
        .subcommand(
            Command::new("resolve")
                .about("Resolve the latest version of one package without downloading it")
                .arg(Arg::new("package").required(true).help("Package name"))
                .arg(Arg::new("distro").long("distro").required(true).help("Distribution"))
                .arg(Arg::new("release").long("release").required(true).help("Release"))
                .arg(Arg::new("arch").long("arch").default_value("x86_64").help("Architecture"))
                .arg(Arg::new("mirror").long("mirror").help("Mirror root"))
                .arg(timeout_arg()),
        )
        .subcommand(
            Command::new("hash")
                .about("Download one artifact and print its SHA-256")
                .arg(Arg::new("url").required(true).help("Artifact URL"))
                .arg(timeout_arg()),
        )
        .subcommand(
            Command::new("completions")
                .about("Print shell completions")
                .arg(Arg::new("shell").required(true).help("Target shell")),
        )
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    // Create man directory
    let out_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR").unwrap());
    let man_dir = out_dir.join("man");
    fs::create_dir_all(&man_dir).expect("Failed to create man directory");

    // Generate main man page
    let cmd = build_cli();
    let man = Man::new(cmd);
    let mut buffer = Vec::new();
    man.render(&mut buffer).expect("Failed to render man page");

    let man_path = man_dir.join("rpmpin.1");
    fs::write(&man_path, buffer).expect("Failed to write man page");
}
