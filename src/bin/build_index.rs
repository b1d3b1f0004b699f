//! Rebuild `index.json` from the definitions tree.
//!
//! With no flags this indexes `./defs` into `./index.json`. Rejected
//! definitions are reported on stderr and do not change the exit code; only
//! I/O failures do.

use anyhow::Result;
use chrono::Utc;
use clap::Parser;
use defindex::{
    BuildConfig, DEFAULT_DEFS_DIR, DEFAULT_INDEX_FILE, build_index, init_logging, resolve_root,
};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "build-index")]
#[command(about = "Scan per-app definition files and write a consolidated index")]
struct Cli {
    /// Index root; paths in the index are relative to it. Defaults to the current directory.
    #[arg(long)]
    root: Option<PathBuf>,
    /// Definitions directory, relative to the root.
    #[arg(long, default_value = DEFAULT_DEFS_DIR)]
    defs: PathBuf,
    /// Index destination, relative to the root.
    #[arg(long, default_value = DEFAULT_INDEX_FILE)]
    output: PathBuf,
}

fn main() {
    init_logging();
    if let Err(err) = run() {
        eprintln!("{err:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let root = resolve_root(cli.root.as_deref())?;
    let config = BuildConfig::from_root(root)
        .with_defs_dir(cli.defs)
        .with_output(cli.output);

    let report = build_index(&config, Utc::now)?;
    for rejected in &report.rejected {
        eprintln!("{rejected}");
    }
    if !report.rejected.is_empty() {
        log::info!("{} definition(s) skipped", report.rejected.len());
    }
    println!(
        "Wrote {} with {} item(s).",
        report.index_path.display(),
        report.item_count()
    );
    Ok(())
}
