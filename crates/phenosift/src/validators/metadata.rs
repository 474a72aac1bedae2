//! Metadata validators: genus and project existence, configuration, and
//! their required association.

use std::sync::Arc;

use indexmap::IndexMap;

use crate::error::{Result, SiftError};
use crate::outcome::{FailedItem, Outcome};
use crate::registry::{Descriptor, InputKind, Scope};
use crate::store::{BackingStore, ProjectRef};

use super::{wrong_input, Input, Validate};

pub(crate) const GENUS_DESCRIPTOR: Descriptor = Descriptor::new(
    "genus_exists",
    "Genus exists and is configured",
    Scope::Metadata,
    &[InputKind::Metadata],
);

pub(crate) const PROJECT_DESCRIPTOR: Descriptor = Descriptor::new(
    "project_exists",
    "Project exists",
    Scope::Metadata,
    &[InputKind::Metadata],
);

pub(crate) const PROJECT_GENUS_DESCRIPTOR: Descriptor = Descriptor::new(
    "project_genus_match",
    "Project genus matches the supplied genus",
    Scope::Metadata,
    &[InputKind::Metadata],
);

/// Read a required key from submitted metadata. A missing key is a wiring
/// defect in the form layer, not bad user data.
fn required_field<'a>(
    values: &'a IndexMap<String, String>,
    key: &str,
) -> Result<&'a str> {
    values
        .get(key)
        .map(|v| v.as_str())
        .ok_or_else(|| {
            SiftError::Config(format!("metadata input is missing the '{key}' key"))
        })
}

/// Checks that the submitted genus exists among known organisms and has
/// been configured for trait imports.
pub struct GenusValidator {
    store: Arc<dyn BackingStore>,
}

impl GenusValidator {
    pub const CASE_VALID: &'static str = "genus exists and is configured";
    pub const CASE_UNKNOWN: &'static str = "genus does not exist";
    pub const CASE_UNCONFIGURED: &'static str = "genus exists but is not configured";

    pub fn new(store: Arc<dyn BackingStore>) -> Self {
        Self { store }
    }

    /// Validate the submitted metadata mapping.
    pub fn validate_metadata(&self, values: &IndexMap<String, String>) -> Result<Outcome> {
        let genus = required_field(values, "genus")?;

        let record = match self.store.find_genus(genus)? {
            Some(record) => record,
            None => {
                return Ok(Outcome::fail(Self::CASE_UNKNOWN).with_item(
                    FailedItem::new("genus is not a known organism").with_value(genus),
                ));
            }
        };

        if !record.configured {
            return Ok(Outcome::fail(Self::CASE_UNCONFIGURED).with_item(
                FailedItem::new(
                    "genus has no trait, method, unit, database or crop ontology settings",
                )
                .with_value(genus),
            ));
        }

        Ok(Outcome::pass(Self::CASE_VALID))
    }
}

impl Validate for GenusValidator {
    fn descriptor(&self) -> &'static Descriptor {
        &GENUS_DESCRIPTOR
    }

    fn validate(&mut self, input: &Input<'_>) -> Result<Outcome> {
        match input {
            Input::Metadata(values) => self.validate_metadata(values),
            other => Err(wrong_input(self.descriptor(), other)),
        }
    }
}

/// Checks that the submitted project resolves to a known record, whether it
/// was supplied as a numeric identifier or a name.
pub struct ProjectValidator {
    store: Arc<dyn BackingStore>,
}

impl ProjectValidator {
    pub const CASE_VALID: &'static str = "project exists";
    pub const CASE_UNKNOWN: &'static str = "project does not exist";

    pub fn new(store: Arc<dyn BackingStore>) -> Self {
        Self { store }
    }

    /// Validate the submitted metadata mapping.
    pub fn validate_metadata(&self, values: &IndexMap<String, String>) -> Result<Outcome> {
        let submitted = required_field(values, "project")?;
        let project = ProjectRef::parse(submitted);

        match self.store.resolve_project(&project)? {
            Some(_) => Ok(Outcome::pass(Self::CASE_VALID)),
            None => Ok(Outcome::fail(Self::CASE_UNKNOWN).with_item(
                FailedItem::new("project cannot be resolved by identifier or name")
                    .with_value(submitted),
            )),
        }
    }
}

impl Validate for ProjectValidator {
    fn descriptor(&self) -> &'static Descriptor {
        &PROJECT_DESCRIPTOR
    }

    fn validate(&mut self, input: &Input<'_>) -> Result<Outcome> {
        match input {
            Input::Metadata(values) => self.validate_metadata(values),
            other => Err(wrong_input(self.descriptor(), other)),
        }
    }
}

/// Checks that the genus recorded for the submitted project equals the
/// submitted genus.
pub struct ProjectGenusValidator {
    store: Arc<dyn BackingStore>,
}

impl ProjectGenusValidator {
    pub const CASE_MATCH: &'static str = "project genus matches the supplied genus";
    pub const CASE_UNKNOWN_PROJECT: &'static str = "project does not exist";
    pub const CASE_NO_GENUS: &'static str = "project has no genus recorded";
    pub const CASE_MISMATCH: &'static str = "project genus differs from the supplied genus";

    pub fn new(store: Arc<dyn BackingStore>) -> Self {
        Self { store }
    }

    /// Validate the submitted metadata mapping; requires both `project`
    /// and `genus` keys.
    pub fn validate_metadata(&self, values: &IndexMap<String, String>) -> Result<Outcome> {
        let submitted_project = required_field(values, "project")?;
        let submitted_genus = required_field(values, "genus")?;

        let project = match self
            .store
            .resolve_project(&ProjectRef::parse(submitted_project))?
        {
            Some(project) => project,
            None => {
                return Ok(Outcome::fail(Self::CASE_UNKNOWN_PROJECT).with_item(
                    FailedItem::new("project cannot be resolved")
                        .with_value(submitted_project),
                ));
            }
        };

        match self.store.genus_of_project(project.id)? {
            None => Ok(Outcome::fail(Self::CASE_NO_GENUS).with_item(
                FailedItem::new(format!(
                    "project '{}' has no genus recorded",
                    project.name
                )),
            )),
            Some(recorded) if recorded != submitted_genus => {
                Ok(Outcome::fail(Self::CASE_MISMATCH).with_item(
                    FailedItem::new(format!(
                        "project '{}' is bound to genus '{recorded}'",
                        project.name
                    ))
                    .with_value(submitted_genus),
                ))
            }
            Some(_) => Ok(Outcome::pass(Self::CASE_MATCH)),
        }
    }
}

impl Validate for ProjectGenusValidator {
    fn descriptor(&self) -> &'static Descriptor {
        &PROJECT_GENUS_DESCRIPTOR
    }

    fn validate(&mut self, input: &Input<'_>) -> Result<Outcome> {
        match input {
            Input::Metadata(values) => self.validate_metadata(values),
            other => Err(wrong_input(self.descriptor(), other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn store() -> MemoryStore {
        let mut store = MemoryStore::new();
        store.insert_genus("Triticum", true);
        store.insert_genus("Lens", false);
        store.insert_project(7, "Drought Trial");
        store.set_project_genus(7, "Triticum");
        store.insert_project(8, "Unbound Trial");
        store
    }

    fn metadata(pairs: &[(&str, &str)]) -> IndexMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_genus_configured_passes() {
        let validator = GenusValidator::new(Arc::new(store()));
        let outcome = validator
            .validate_metadata(&metadata(&[("genus", "Triticum")]))
            .unwrap();
        assert!(outcome.is_pass());
    }

    #[test]
    fn test_genus_unknown_fails() {
        let validator = GenusValidator::new(Arc::new(store()));
        let outcome = validator
            .validate_metadata(&metadata(&[("genus", "Zea")]))
            .unwrap();
        assert_eq!(outcome.case, GenusValidator::CASE_UNKNOWN);
    }

    #[test]
    fn test_genus_unconfigured_is_distinct_failure() {
        let validator = GenusValidator::new(Arc::new(store()));
        let outcome = validator
            .validate_metadata(&metadata(&[("genus", "Lens")]))
            .unwrap();
        assert_eq!(outcome.case, GenusValidator::CASE_UNCONFIGURED);
    }

    #[test]
    fn test_missing_genus_key_is_config_error() {
        let validator = GenusValidator::new(Arc::new(store()));
        let err = validator
            .validate_metadata(&metadata(&[("project", "7")]))
            .unwrap_err();
        assert!(matches!(err, SiftError::Config(_)));
    }

    #[test]
    fn test_project_resolves_by_id_and_name() {
        let validator = ProjectValidator::new(Arc::new(store()));

        let by_id = validator
            .validate_metadata(&metadata(&[("project", "7")]))
            .unwrap();
        assert!(by_id.is_pass());

        let by_name = validator
            .validate_metadata(&metadata(&[("project", "Drought Trial")]))
            .unwrap();
        assert!(by_name.is_pass());

        let unknown = validator
            .validate_metadata(&metadata(&[("project", "No Such Trial")]))
            .unwrap();
        assert_eq!(unknown.case, ProjectValidator::CASE_UNKNOWN);
    }

    #[test]
    fn test_project_genus_match_passes() {
        let validator = ProjectGenusValidator::new(Arc::new(store()));
        let outcome = validator
            .validate_metadata(&metadata(&[("project", "7"), ("genus", "Triticum")]))
            .unwrap();
        assert!(outcome.is_pass());
    }

    #[test]
    fn test_project_without_genus_is_distinct_from_mismatch() {
        let validator = ProjectGenusValidator::new(Arc::new(store()));

        let no_genus = validator
            .validate_metadata(&metadata(&[("project", "8"), ("genus", "Triticum")]))
            .unwrap();
        assert_eq!(no_genus.case, ProjectGenusValidator::CASE_NO_GENUS);

        let mismatch = validator
            .validate_metadata(&metadata(&[("project", "7"), ("genus", "Lens")]))
            .unwrap();
        assert_eq!(mismatch.case, ProjectGenusValidator::CASE_MISMATCH);
        assert!(mismatch.failed[0].detail.contains("Triticum"));
    }
}
