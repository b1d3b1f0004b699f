//! Full index rebuild: collect, summarize, write.
//!
//! Per-file problems never stop a run. Each rejected definition is kept in the
//! outcome for the caller to report; only I/O failures (an unreadable tree or
//! an unwritable destination) abort.

use crate::collect::DefinitionWalker;
use crate::config::BuildConfig;
use crate::definition::{Rejection, index_relative_path, summarize};
use crate::index::{IndexDocument, SummaryRecord};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::PathBuf;

/// A definition file that was skipped, with the reason.
#[derive(Debug)]
pub struct RejectedDefinition {
    /// Index-relative path of the skipped file.
    pub path: String,
    pub reason: Rejection,
}

impl fmt::Display for RejectedDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.reason {
            Rejection::InvalidJson(err) => {
                write!(f, "Skipping invalid JSON: {} ({err})", self.path)
            }
            Rejection::InvalidShape(reason) => {
                write!(f, "Skipping malformed definition: {} ({reason})", self.path)
            }
            Rejection::MissingFields(fields) => {
                let names: Vec<&str> = fields.iter().map(|field| field.as_str()).collect();
                write!(f, "Missing fields in {}: {}", self.path, names.join(", "))
            }
        }
    }
}

/// Records and rejections from one pass over the definitions tree.
#[derive(Debug, Default)]
pub struct BuildOutcome {
    pub items: Vec<SummaryRecord>,
    pub rejected: Vec<RejectedDefinition>,
}

/// What a completed build wrote.
#[derive(Debug)]
pub struct BuildReport {
    pub index_path: PathBuf,
    pub document: IndexDocument,
    pub rejected: Vec<RejectedDefinition>,
}

impl BuildReport {
    pub fn item_count(&self) -> usize {
        self.document.items.len()
    }
}

/// Summarize every definition under the configured tree, in traversal order.
pub fn collect_summaries(config: &BuildConfig) -> Result<BuildOutcome> {
    let mut outcome = BuildOutcome::default();
    let mut first_seen: BTreeMap<String, String> = BTreeMap::new();

    for path in DefinitionWalker::new(&config.defs_root())? {
        let path = path?;
        let bytes = fs::read(&path).with_context(|| format!("reading {}", path.display()))?;
        let rel = index_relative_path(&config.root, &path);

        match summarize(rel.clone(), &bytes) {
            Ok(record) => {
                if let Some(first) = first_seen.get(&record.id) {
                    log::warn!(
                        "Duplicate bundle id {} in {} (first seen in {}); keeping both",
                        record.id,
                        record.path,
                        first
                    );
                } else {
                    first_seen.insert(record.id.clone(), record.path.clone());
                }
                log::debug!("indexed {} as {}@{}", record.path, record.id, record.version);
                outcome.items.push(record);
            }
            Err(reason) => {
                let rejected = RejectedDefinition { path: rel, reason };
                log::debug!("rejected {}", rejected.path);
                outcome.rejected.push(rejected);
            }
        }
    }

    Ok(outcome)
}

/// Rebuild the index from scratch and atomically replace the destination.
///
/// `clock` is read once, after the walk, for `generated_at`.
pub fn build_index<C>(config: &BuildConfig, clock: C) -> Result<BuildReport>
where
    C: FnOnce() -> DateTime<Utc>,
{
    let outcome = collect_summaries(config)?;
    let document = IndexDocument::new(outcome.items, clock());
    let index_path = config.index_path();
    document.write_to(&index_path)?;
    Ok(BuildReport {
        index_path,
        document,
        rejected: outcome.rejected,
    })
}
