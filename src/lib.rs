//! Definition index builder.
//!
//! Scans `<root>/defs/<app>/<file>.json`, summarizes every valid uninstall
//! definition and writes them, hashed and in traversal order, to
//! `<root>/index.json`. The binaries under `src/bin/` are thin wrappers over
//! this library: `build-index` rebuilds the index, `index-list` and
//! `index-verify` read one back, `new-definition` scaffolds a definition file.

pub mod builder;
pub mod collect;
pub mod config;
pub mod definition;
pub mod digest;
pub mod index;
pub mod scaffold;
pub mod schema;
pub mod verify;

pub use builder::{BuildOutcome, BuildReport, RejectedDefinition, build_index, collect_summaries};
pub use collect::DefinitionWalker;
pub use config::{BuildConfig, DEFAULT_DEFS_DIR, DEFAULT_INDEX_FILE};
pub use definition::{
    Definition, RawDefinition, RawUninstall, Rejection, RequiredField, UninstallData,
    index_relative_path, summarize,
};
pub use digest::{fallback_version, sha256_hex};
pub use index::{IndexDocument, SCHEMA_VERSION, SummaryRecord, load_index, write_atomic};
pub use scaffold::{DefinitionDraft, MatchMode, write_definition};
pub use schema::IndexSchema;
pub use verify::{Problem, VerifyReport, verify_index};

use anyhow::{Context, Result};
use std::env;
use std::path::{Path, PathBuf};

/// Initialize stderr logging for a binary. `RUST_LOG` overrides the default
/// `info` level.
pub fn init_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .format_target(false)
        .init();
}

/// Index root for a CLI invocation: `--root` when given, else the working
/// directory.
pub fn resolve_root(cli_root: Option<&Path>) -> Result<PathBuf> {
    match cli_root {
        Some(root) => Ok(root.to_path_buf()),
        None => env::current_dir().context("resolving current directory"),
    }
}
