use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use xshell::{cmd, Shell};

#[derive(Parser)]
#[command(name = "cargo-xtask", version, about = "Project automation tasks")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Format Rust sources
    Fmt,
    /// Run formatting and lint checks on the core and the Tauri shell
    Check,
    /// Run the core test suite
    Test,
    /// Build the Android bundle
    Package {
        /// Build a debug bundle instead of a release one
        #[arg(long)]
        debug: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let shell = Shell::new()?;
    shell.change_dir(project_root()?);

    match cli.command {
        Command::Fmt => run_fmt(&shell),
        Command::Check => run_check(&shell),
        Command::Test => run_test(&shell),
        Command::Package { debug } => run_package(&shell, debug),
    }
}

fn run_fmt(shell: &Shell) -> Result<()> {
    cmd!(shell, "cargo fmt --all")
        .run()
        .context("failed to run cargo fmt")
}

fn run_check(shell: &Shell) -> Result<()> {
    cmd!(shell, "cargo fmt --all -- --check")
        .run()
        .context("cargo fmt --check failed")?;
    cmd!(
        shell,
        "cargo clippy -p quick-open --all-targets -- -D warnings"
    )
    .run()
    .context("cargo clippy (core) failed")?;
    cmd!(
        shell,
        "cargo clippy -p quick-open --all-targets --features app -- -D warnings"
    )
    .run()
    .context("cargo clippy (app) failed")?;
    Ok(())
}

fn run_test(shell: &Shell) -> Result<()> {
    cmd!(shell, "cargo test -p quick-open")
        .run()
        .context("cargo test failed")
}

fn run_package(shell: &Shell, debug: bool) -> Result<()> {
    let profile: &[&str] = if debug { &["--debug"] } else { &[] };
    let _dir = shell.push_dir("src-tauri");
    cmd!(shell, "cargo tauri android build {profile...} --features app")
        .run()
        .context("tauri android build failed")
}

fn project_root() -> Result<PathBuf> {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .map(|path| path.to_path_buf())
        .context("xtask must live one level below the workspace root")
}
