//! JSON Schema for `index.json`, bundled into the binary.
//!
//! The builder's own output always conforms; the schema exists for consumers
//! and for `index-verify`, which checks indexes that may have been edited or
//! produced elsewhere.

use anyhow::{Context, Result, anyhow, bail};
use jsonschema::JSONSchema;
use serde_json::Value;

/// Raw text of `schema/index.schema.json`.
pub const INDEX_SCHEMA: &str = include_str!("../schema/index.schema.json");

pub struct IndexSchema {
    compiled: JSONSchema,
}

impl IndexSchema {
    /// Compile the bundled schema.
    pub fn bundled() -> Result<Self> {
        let raw: Value =
            serde_json::from_str(INDEX_SCHEMA).context("parsing bundled index schema")?;
        let compiled = JSONSchema::compile(&raw)
            .map_err(|err| anyhow!("compiling bundled index schema: {err}"))?;
        Ok(Self { compiled })
    }

    /// Every schema violation in `instance`, one line each.
    pub fn violations(&self, instance: &Value) -> Vec<String> {
        match self.compiled.validate(instance) {
            Ok(()) => Vec::new(),
            Err(errors) => errors
                .map(|err| {
                    let location = err.instance_path.to_string();
                    if location.is_empty() {
                        err.to_string()
                    } else {
                        format!("{location}: {err}")
                    }
                })
                .collect(),
        }
    }

    pub fn validate(&self, instance: &Value) -> Result<()> {
        let violations = self.violations(instance);
        if !violations.is_empty() {
            bail!("index failed schema validation:\n{}", violations.join("\n"));
        }
        Ok(())
    }
}
