//! Scaffold a definition file for an app.
//!
//! Usage:
//!   new-definition --name "Google Chrome" --app "Google Chrome" --bundle-id com.google.Chrome
//!   new-definition --name slack --app Slack --bundle-id com.tinyspeck.slackmacgap \
//!       --alternative-names "Slack Helper,Slack Helper (GPU)" --forget-pkg --dir /tmp

use anyhow::Result;
use chrono::Utc;
use clap::Parser;
use defindex::scaffold::default_definition_dir;
use defindex::{
    BuildConfig, DEFAULT_DEFS_DIR, DefinitionDraft, MatchMode, init_logging, resolve_root,
    write_definition,
};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "new-definition")]
#[command(about = "Create a new uninstall definition file")]
struct Cli {
    /// Name of the definition; lowercased with spaces removed for the file name.
    #[arg(long)]
    name: String,
    /// App name the definition uninstalls.
    #[arg(long = "app")]
    app_name: String,
    /// Bundle id of the app.
    #[arg(long)]
    bundle_id: String,
    /// Definition version. Default: 1.
    #[arg(long)]
    version: Option<String>,
    /// Alternative app names, comma separated.
    #[arg(long, value_delimiter = ',')]
    alternative_names: Vec<String>,
    /// Search paths replacing the uninstaller defaults, comma separated.
    #[arg(long, value_delimiter = ',')]
    search_file_paths: Vec<String>,
    /// Extra paths to remove, comma separated.
    #[arg(long, value_delimiter = ',')]
    additional_paths: Vec<String>,
    /// Forget package receipts during uninstall.
    #[arg(long)]
    forget_pkg: bool,
    /// Unload launch daemons during uninstall.
    #[arg(long)]
    unload_launch_daemons: bool,
    /// File matching strategy: exact, prefix, substring or all.
    #[arg(long)]
    match_mode: Option<MatchMode>,
    /// Homebrew cask or formula name.
    #[arg(long)]
    brew_name: Option<String>,
    /// Output directory. Defaults to <root>/<defs>/<name>/.
    #[arg(long)]
    dir: Option<PathBuf>,
    /// Index root. Defaults to the current directory.
    #[arg(long)]
    root: Option<PathBuf>,
    /// Definitions directory, relative to the root.
    #[arg(long, default_value = DEFAULT_DEFS_DIR)]
    defs: PathBuf,
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
    let config = BuildConfig::from_root(root).with_defs_dir(cli.defs);

    let draft = DefinitionDraft {
        name: cli.name,
        app_name: cli.app_name,
        bundle_id: cli.bundle_id,
        version: cli.version,
        alternative_names: cli.alternative_names,
        search_file_paths: cli.search_file_paths,
        additional_paths: cli.additional_paths,
        forget_pkg: cli.forget_pkg,
        unload_launch_daemons: cli.unload_launch_daemons,
        match_mode: cli.match_mode,
        brew_name: cli.brew_name,
    };
    let dir = match cli.dir {
        Some(dir) => dir,
        None => default_definition_dir(&config, &draft.stem()),
    };
    let definition = draft.into_definition(Utc::now())?;
    let path = write_definition(&dir, &definition)?;
    println!("Wrote {}", path.display());
    Ok(())
}
