//! Validator registry and run orchestration.
//!
//! The registry is built explicitly at startup: every validator contributes
//! an immutable descriptor (identifier, display name, scope, accepted input
//! kinds) and lookups go by scope or input kind. There is no runtime
//! discovery. The runner tracks which checks have failed during a run and
//! short-circuits any later check that depends on one of them, producing a
//! `todo` outcome instead of evaluating against unusable input.

use std::collections::HashSet;

use indexmap::IndexMap;
use serde::Serialize;

use crate::error::{Result, SiftError};
use crate::outcome::Outcome;

/// Granularity at which a validator operates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    /// The whole file: existence, type, loadability.
    File,
    /// One raw line of the file.
    FileRow,
    /// The split header row.
    Headers,
    /// Submitted form metadata (genus, project).
    Metadata,
}

impl Scope {
    /// Get a human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Scope::File => "FILE",
            Scope::FileRow => "FILE ROW",
            Scope::Headers => "HEADERS",
            Scope::Metadata => "METADATA",
        }
    }
}

/// Kind of input a validator entry point accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum InputKind {
    File,
    RawRow,
    HeaderRow,
    DataRow,
    Metadata,
}

/// Immutable description of one registered validator.
#[derive(Debug, Clone, Serialize)]
pub struct Descriptor {
    /// Unique identifier, stable across runs.
    pub id: &'static str,
    /// Human-readable display name.
    pub name: &'static str,
    /// Applicable scope.
    pub scope: Scope,
    /// Input kinds the validator accepts.
    pub inputs: &'static [InputKind],
}

impl Descriptor {
    pub const fn new(
        id: &'static str,
        name: &'static str,
        scope: Scope,
        inputs: &'static [InputKind],
    ) -> Self {
        Self {
            id,
            name,
            scope,
            inputs,
        }
    }
}

/// Registry of validator descriptors, iterated in registration order.
#[derive(Debug, Default)]
pub struct Registry {
    entries: IndexMap<&'static str, Descriptor>,
}

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            entries: IndexMap::new(),
        }
    }

    /// Register a descriptor. A duplicate identifier is a wiring defect.
    pub fn register(&mut self, descriptor: Descriptor) -> Result<()> {
        if self.entries.contains_key(descriptor.id) {
            return Err(SiftError::Config(format!(
                "validator '{}' is already registered",
                descriptor.id
            )));
        }
        self.entries.insert(descriptor.id, descriptor);
        Ok(())
    }

    /// Look up one descriptor by identifier.
    pub fn by_id(&self, id: &str) -> Option<&Descriptor> {
        self.entries.get(id)
    }

    /// All descriptors for a scope, in registration order.
    pub fn for_scope(&self, scope: Scope) -> Vec<&Descriptor> {
        self.entries
            .values()
            .filter(|d| d.scope == scope)
            .collect()
    }

    /// All descriptors accepting an input kind, in registration order.
    pub fn for_input(&self, kind: InputKind) -> Vec<&Descriptor> {
        self.entries
            .values()
            .filter(|d| d.inputs.contains(&kind))
            .collect()
    }

    /// Iterate descriptors in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Descriptor> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Orchestrates sequential validator invocation within one run.
///
/// A check runs through [`Runner::run`] with the identifiers of the checks
/// it depends on. Once any dependency has failed, the check is not
/// evaluated; a `todo` outcome is returned for it instead. Skip state is
/// per run and only grows.
#[derive(Debug)]
pub struct Runner {
    registry: Registry,
    failed: HashSet<String>,
}

impl Runner {
    pub fn new(registry: Registry) -> Self {
        Self {
            registry,
            failed: HashSet::new(),
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Record that a check failed, so dependents are skipped from now on.
    pub fn mark_failed(&mut self, id: &str) {
        self.failed.insert(id.to_string());
    }

    /// Whether a check with the given dependencies must be skipped.
    pub fn should_skip(&self, dependencies: &[&str]) -> bool {
        dependencies.iter().any(|id| self.failed.contains(*id))
    }

    /// Run one check unless a dependency already failed.
    ///
    /// On skip, returns `Outcome::todo(case)` without invoking the check.
    /// A failing outcome marks `id` as failed for later dependents.
    pub fn run<F>(&mut self, id: &str, dependencies: &[&str], case: &str, check: F) -> Result<Outcome>
    where
        F: FnOnce() -> Result<Outcome>,
    {
        if self.should_skip(dependencies) {
            return Ok(Outcome::todo(case));
        }
        let outcome = check()?;
        if outcome.is_fail() {
            self.mark_failed(id);
        }
        Ok(outcome)
    }
}
