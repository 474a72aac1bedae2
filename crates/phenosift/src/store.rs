//! Backing store collaborator interfaces.
//!
//! Validators that need previously committed traits, genera or projects get
//! a narrow repository handle injected at construction. The store's
//! lifecycle is external and persists across runs; nothing here writes.

use std::collections::HashSet;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// A project supplied either as a numeric identifier or a name; the store
/// resolves one to the other.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectRef {
    Id(u64),
    Name(String),
}

impl ProjectRef {
    /// Parse a submitted form value: all-digit input is an identifier.
    pub fn parse(value: &str) -> Self {
        let trimmed = value.trim();
        match trimmed.parse::<u64>() {
            Ok(id) => ProjectRef::Id(id),
            Err(_) => ProjectRef::Name(trimmed.to_string()),
        }
    }
}

/// A known genus and whether it has been configured for trait imports
/// (trait/method/unit vocabularies, database and crop ontology settings).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenusRecord {
    pub name: String,
    pub configured: bool,
}

/// A resolved project record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectRecord {
    pub id: u64,
    pub name: String,
}

/// Lookup interface over the external persistence layer.
pub trait BackingStore: Send + Sync {
    /// Whether a (trait, method, unit) combination is already committed.
    /// Inputs are lower-cased by the caller.
    fn trait_combination_exists(&self, trait_name: &str, method: &str, unit: &str)
        -> Result<bool>;

    /// Look up a genus among known organisms.
    fn find_genus(&self, name: &str) -> Result<Option<GenusRecord>>;

    /// Resolve a project from an identifier or a name to the full record.
    fn resolve_project(&self, project: &ProjectRef) -> Result<Option<ProjectRecord>>;

    /// The genus recorded for a project, if any. A project has at most one
    /// genus; implementations return the first matching record.
    fn genus_of_project(&self, project_id: u64) -> Result<Option<String>>;
}

/// In-memory store for tests and standalone runs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    combinations: HashSet<(String, String, String)>,
    genera: Vec<GenusRecord>,
    projects: Vec<ProjectRecord>,
    project_genus: IndexMap<u64, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a committed trait combination; stored lower-cased.
    pub fn insert_combination(
        &mut self,
        trait_name: &str,
        method: &str,
        unit: &str,
    ) {
        self.combinations.insert((
            trait_name.to_lowercase(),
            method.to_lowercase(),
            unit.to_lowercase(),
        ));
    }

    pub fn insert_genus(&mut self, name: impl Into<String>, configured: bool) {
        self.genera.push(GenusRecord {
            name: name.into(),
            configured,
        });
    }

    pub fn insert_project(&mut self, id: u64, name: impl Into<String>) {
        self.projects.push(ProjectRecord {
            id,
            name: name.into(),
        });
    }

    pub fn set_project_genus(&mut self, project_id: u64, genus: impl Into<String>) {
        self.project_genus.insert(project_id, genus.into());
    }
}

impl BackingStore for MemoryStore {
    fn trait_combination_exists(
        &self,
        trait_name: &str,
        method: &str,
        unit: &str,
    ) -> Result<bool> {
        Ok(self.combinations.contains(&(
            trait_name.to_string(),
            method.to_string(),
            unit.to_string(),
        )))
    }

    fn find_genus(&self, name: &str) -> Result<Option<GenusRecord>> {
        Ok(self.genera.iter().find(|g| g.name == name).cloned())
    }

    fn resolve_project(&self, project: &ProjectRef) -> Result<Option<ProjectRecord>> {
        let found = match project {
            ProjectRef::Id(id) => self.projects.iter().find(|p| p.id == *id),
            ProjectRef::Name(name) => self.projects.iter().find(|p| &p.name == name),
        };
        Ok(found.cloned())
    }

    fn genus_of_project(&self, project_id: u64) -> Result<Option<String>> {
        Ok(self.project_genus.get(&project_id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_ref_parse() {
        assert_eq!(ProjectRef::parse("42"), ProjectRef::Id(42));
        assert_eq!(
            ProjectRef::parse("Drought Trial 2024"),
            ProjectRef::Name("Drought Trial 2024".to_string())
        );
        assert_eq!(
            ProjectRef::parse(" 17 "),
            ProjectRef::Id(17),
        );
    }

    #[test]
    fn test_combination_lookup_is_case_normalized_at_insert() {
        let mut store = MemoryStore::new();
        store.insert_combination("Plant Height", "PH-Avg", "CM");

        // Callers pass lower-cased keys.
        assert!(store
            .trait_combination_exists("plant height", "ph-avg", "cm")
            .unwrap());
        assert!(!store
            .trait_combination_exists("plant height", "ph-avg", "mm")
            .unwrap());
    }

    #[test]
    fn test_project_resolution_both_ways() {
        let mut store = MemoryStore::new();
        store.insert_project(7, "Drought Trial");

        let by_id = store.resolve_project(&ProjectRef::Id(7)).unwrap().unwrap();
        assert_eq!(by_id.name, "Drought Trial");

        let by_name = store
            .resolve_project(&ProjectRef::Name("Drought Trial".to_string()))
            .unwrap()
            .unwrap();
        assert_eq!(by_name.id, 7);

        assert!(store.resolve_project(&ProjectRef::Id(8)).unwrap().is_none());
    }

    #[test]
    fn test_genus_of_project() {
        let mut store = MemoryStore::new();
        store.insert_project(7, "Drought Trial");
        store.set_project_genus(7, "Triticum");

        assert_eq!(
            store.genus_of_project(7).unwrap(),
            Some("Triticum".to_string())
        );
        assert_eq!(store.genus_of_project(9).unwrap(), None);
    }
}
