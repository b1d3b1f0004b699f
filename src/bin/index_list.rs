//! Print one line per entry of an existing index.

use anyhow::Result;
use clap::Parser;
use defindex::{DEFAULT_INDEX_FILE, init_logging, load_index, resolve_root};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "index-list")]
#[command(about = "List the definitions recorded in an index")]
struct Cli {
    /// Index root. Defaults to the current directory.
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
    let index = load_index(&root.join(&cli.index))?;
    for item in &index.items {
        println!(
            "{} - {} (version: {}, updated: {})",
            item.id, item.name, item.version, item.updated_at
        );
    }
    Ok(())
}
