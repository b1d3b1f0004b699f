//! Check an index against the schema and the files it lists.
//!
//! Every problem is printed on stderr; the exit code is 1 when there was at
//! least one.

use anyhow::{Context, Result, bail};
use clap::Parser;
use defindex::{
    DEFAULT_INDEX_FILE, IndexDocument, IndexSchema, init_logging, resolve_root, verify_index,
};
use serde_json::Value;
use std::fs;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "index-verify")]
#[command(about = "Verify index.json against its schema and the definition files on disk")]
struct Cli {
    /// Index root; item paths resolve against it. Defaults to the current directory.
    #[arg(long)]
    root: Option<PathBuf>,
    /// Index file, relative to the root.
    #[arg(long, default_value = DEFAULT_INDEX_FILE)]
    index: PathBuf,
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
    let index_path = root.join(&cli.index);

    let data = fs::read_to_string(&index_path)
        .with_context(|| format!("reading index {}", index_path.display()))?;
    let value: Value = serde_json::from_str(&data)
        .with_context(|| format!("parsing index {}", index_path.display()))?;

    IndexSchema::bundled()?
        .validate(&value)
        .with_context(|| format!("validating {}", index_path.display()))?;
    let document: IndexDocument = serde_json::from_value(value)
        .with_context(|| format!("decoding index {}", index_path.display()))?;

    let report = verify_index(&root, &document);
    for problem in &report.problems {
        eprintln!("{problem}");
    }
    println!(
        "Verified {} item(s), {} problem(s).",
        report.checked,
        report.problems.len()
    );
    if !report.is_clean() {
        bail!("{} is out of date with its definitions", index_path.display());
    }
    Ok(())
}
