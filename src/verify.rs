//! Cross-check an index against the definition files it lists.

use crate::digest::sha256_hex;
use crate::index::{IndexDocument, SummaryRecord};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// A single mismatch between an index item and the tree it describes.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum Problem {
    #[error("{id}: path '{path}' is not a relative forward-slash path under the root")]
    UnsafePath { id: String, path: String },

    #[error("{id}: {path} does not exist")]
    Missing { id: String, path: String },

    #[error("{id}: cannot read {path}: {reason}")]
    Unreadable {
        id: String,
        path: String,
        reason: String,
    },

    #[error("{id}: sha256 mismatch for {path}: index has {expected}, file has {actual}")]
    DigestMismatch {
        id: String,
        path: String,
        expected: String,
        actual: String,
    },
}

#[derive(Debug, Default)]
pub struct VerifyReport {
    pub checked: usize,
    pub problems: Vec<Problem>,
}

impl VerifyReport {
    pub fn is_clean(&self) -> bool {
        self.problems.is_empty()
    }
}

/// Re-hash every file named by `doc`, resolving paths against `root`.
pub fn verify_index(root: &Path, doc: &IndexDocument) -> VerifyReport {
    let mut report = VerifyReport::default();
    for item in &doc.items {
        report.checked += 1;
        if let Some(problem) = verify_item(root, item) {
            report.problems.push(problem);
        }
    }
    report
}

fn verify_item(root: &Path, item: &SummaryRecord) -> Option<Problem> {
    let Some(path) = resolve_item_path(root, &item.path) else {
        return Some(Problem::UnsafePath {
            id: item.id.clone(),
            path: item.path.clone(),
        });
    };

    let bytes = match fs::read(&path) {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            return Some(Problem::Missing {
                id: item.id.clone(),
                path: item.path.clone(),
            });
        }
        Err(err) => {
            return Some(Problem::Unreadable {
                id: item.id.clone(),
                path: item.path.clone(),
                reason: err.to_string(),
            });
        }
    };

    let actual = sha256_hex(&bytes);
    if actual != item.sha256 {
        return Some(Problem::DigestMismatch {
            id: item.id.clone(),
            path: item.path.clone(),
            expected: item.sha256.clone(),
            actual,
        });
    }
    log::debug!("{} verified ({})", item.path, item.id);
    None
}

/// Join an index `path` onto `root`, refusing anything that could escape it.
pub fn resolve_item_path(root: &Path, index_path: &str) -> Option<PathBuf> {
    if index_path.is_empty() || index_path.starts_with('/') || index_path.contains('\\') {
        return None;
    }
    let mut resolved = root.to_path_buf();
    for segment in index_path.split('/') {
        if matches!(segment, "" | "." | "..") || segment.contains(':') {
            return None;
        }
        resolved.push(segment);
    }
    Some(resolved)
}
