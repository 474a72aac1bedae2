//! Per-run validator configuration: capability setter/getter pairs.
//!
//! Each configuration capability is a small independent trait that a
//! validator implements selectively. A validator declares which capabilities
//! it satisfies rather than inheriting a monolithic base. Every capability
//! follows the same contract: the setter validates its input once per run,
//! and the getter fails with a configuration error naming the missing setter
//! when called first.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SiftError};
use crate::split;
use crate::store::ProjectRef;

/// A named configuration slot, set once per run and read via its getter.
#[derive(Debug, Clone)]
pub struct Setting<T> {
    name: &'static str,
    value: Option<T>,
}

impl<T> Setting<T> {
    /// Create an unset slot. `name` is the setter named in the error when
    /// the slot is read before being configured.
    pub const fn unset(name: &'static str) -> Self {
        Self { name, value: None }
    }

    /// Store a value. Capability setters validate before calling this.
    pub fn set(&mut self, value: T) {
        self.value = Some(value);
    }

    /// Read the value, or fail with a configuration error naming the setter.
    pub fn get(&self) -> Result<&T> {
        self.value.as_ref().ok_or_else(|| {
            SiftError::Config(format!(
                "value read before it was configured; call {}() first",
                self.name
            ))
        })
    }

    /// Whether the slot has been configured.
    pub fn is_set(&self) -> bool {
        self.value.is_some()
    }
}

/// Requirement type of a header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Requirement {
    Required,
    Optional,
}

impl Requirement {
    /// Get a human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Requirement::Required => "required",
            Requirement::Optional => "optional",
        }
    }
}

/// One expected header: name, requirement type, and its index in the
/// originally supplied ordered list. The position survives filtering by
/// requirement type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderDefinition {
    pub name: String,
    pub requirement: Requirement,
    pub position: usize,
}

impl HeaderDefinition {
    pub fn new(name: impl Into<String>, requirement: Requirement, position: usize) -> Self {
        Self {
            name: name.into(),
            requirement,
            position,
        }
    }
}

/// Expected column count: exact when strict, "at least" otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpectedColumns {
    pub count: usize,
    pub strict: bool,
}

impl ExpectedColumns {
    pub fn new(count: usize, strict: bool) -> Self {
        Self { count, strict }
    }

    /// Whether an observed column count satisfies the expectation.
    pub fn matches(&self, observed: usize) -> bool {
        if self.strict {
            observed == self.count
        } else {
            observed >= self.count
        }
    }
}

/// Capability: the set of column positions a validator inspects.
///
/// The setter only rejects an empty set; bounds checking against the row
/// length is deferred to the consuming validator, which knows the row.
pub trait ColumnIndices {
    fn indices_slot(&self) -> &Setting<Vec<usize>>;
    fn indices_slot_mut(&mut self) -> &mut Setting<Vec<usize>>;

    fn set_indices(&mut self, indices: Vec<usize>) -> Result<()> {
        if indices.is_empty() {
            return Err(SiftError::Config(
                "set_indices() requires a non-empty set of column positions".to_string(),
            ));
        }
        self.indices_slot_mut().set(indices);
        Ok(())
    }

    fn indices(&self) -> Result<&[usize]> {
        Ok(self.indices_slot().get()?.as_slice())
    }
}

/// Capability: the ordered expected header list.
pub trait HeaderList {
    fn headers_slot(&self) -> &Setting<Vec<HeaderDefinition>>;
    fn headers_slot_mut(&mut self) -> &mut Setting<Vec<HeaderDefinition>>;

    /// Validate and store the header list. Each entry must carry a
    /// non-empty, non-numeric name. Entries are de-duplicated by
    /// (name, requirement type) while preserving original column order.
    fn set_headers(&mut self, headers: Vec<HeaderDefinition>) -> Result<()> {
        if headers.is_empty() {
            return Err(SiftError::Config(
                "set_headers() requires at least one header definition".to_string(),
            ));
        }

        let mut deduped: Vec<HeaderDefinition> = Vec::with_capacity(headers.len());
        for header in headers {
            if header.name.trim().is_empty() {
                return Err(SiftError::Config(
                    "set_headers() received a header with an empty name".to_string(),
                ));
            }
            if header.name.trim().parse::<f64>().is_ok() {
                return Err(SiftError::Config(format!(
                    "set_headers() received a numeric header name '{}'",
                    header.name
                )));
            }
            let already_present = deduped
                .iter()
                .any(|h| h.name == header.name && h.requirement == header.requirement);
            if !already_present {
                deduped.push(header);
            }
        }

        self.headers_slot_mut().set(deduped);
        Ok(())
    }

    fn headers(&self) -> Result<&[HeaderDefinition]> {
        Ok(self.headers_slot().get()?.as_slice())
    }

    /// Headers of one requirement type, original positions preserved.
    fn headers_of(&self, requirement: Requirement) -> Result<Vec<&HeaderDefinition>> {
        Ok(self
            .headers()?
            .iter()
            .filter(|h| h.requirement == requirement)
            .collect())
    }
}

/// Capability: the flat list of allowed cell values.
pub trait ValidValues {
    fn valid_values_slot(&self) -> &Setting<Vec<String>>;
    fn valid_values_slot_mut(&mut self) -> &mut Setting<Vec<String>>;

    fn set_valid_values(&mut self, values: Vec<String>) -> Result<()> {
        if values.is_empty() {
            return Err(SiftError::Config(
                "set_valid_values() requires a non-empty list".to_string(),
            ));
        }
        self.valid_values_slot_mut().set(values);
        Ok(())
    }

    fn valid_values(&self) -> Result<&[String]> {
        Ok(self.valid_values_slot().get()?.as_slice())
    }
}

/// Capability: the file's declared MIME type and the importer's supported set.
pub trait FileType {
    fn file_mime_type_slot(&self) -> &Setting<String>;
    fn file_mime_type_slot_mut(&mut self) -> &mut Setting<String>;
    fn supported_mime_types_slot(&self) -> &Setting<Vec<String>>;
    fn supported_mime_types_slot_mut(&mut self) -> &mut Setting<Vec<String>>;

    /// Set the declared MIME type of the file under validation. The type
    /// must have a delimiter mapping.
    fn set_file_mime_type(&mut self, mime_type: impl Into<String>) -> Result<()> {
        let mime_type = mime_type.into();
        if !split::is_supported_mime_type(&mime_type) {
            return Err(SiftError::Config(format!(
                "set_file_mime_type() received '{mime_type}', which has no delimiter mapping"
            )));
        }
        self.file_mime_type_slot_mut().set(mime_type);
        Ok(())
    }

    fn file_mime_type(&self) -> Result<&str> {
        Ok(self.file_mime_type_slot().get()?.as_str())
    }

    fn set_supported_mime_types(&mut self, mime_types: Vec<String>) -> Result<()> {
        if mime_types.is_empty() {
            return Err(SiftError::Config(
                "set_supported_mime_types() requires a non-empty list".to_string(),
            ));
        }
        self.supported_mime_types_slot_mut().set(mime_types);
        Ok(())
    }

    fn supported_mime_types(&self) -> Result<&[String]> {
        Ok(self.supported_mime_types_slot().get()?.as_slice())
    }

    /// Candidate delimiters derived from the configured file MIME type.
    fn file_delimiters(&self) -> Result<&'static [char]> {
        split::delimiters_for(self.file_mime_type()?)
    }
}

/// Capability: the expected column count.
pub trait ColumnCount {
    fn expected_columns_slot(&self) -> &Setting<ExpectedColumns>;
    fn expected_columns_slot_mut(&mut self) -> &mut Setting<ExpectedColumns>;

    fn set_expected_columns(&mut self, count: usize, strict: bool) -> Result<()> {
        if count == 0 {
            return Err(SiftError::Config(
                "set_expected_columns() requires a count greater than zero".to_string(),
            ));
        }
        self.expected_columns_slot_mut()
            .set(ExpectedColumns::new(count, strict));
        Ok(())
    }

    fn expected_columns(&self) -> Result<&ExpectedColumns> {
        self.expected_columns_slot().get()
    }
}

/// Capability: the genus the import run is bound to.
pub trait GenusInput {
    fn genus_slot(&self) -> &Setting<String>;
    fn genus_slot_mut(&mut self) -> &mut Setting<String>;

    fn set_genus(&mut self, genus: impl Into<String>) -> Result<()> {
        let genus = genus.into();
        if genus.trim().is_empty() {
            return Err(SiftError::Config(
                "set_genus() requires a non-empty genus name".to_string(),
            ));
        }
        self.genus_slot_mut().set(genus);
        Ok(())
    }

    fn genus(&self) -> Result<&str> {
        Ok(self.genus_slot().get()?.as_str())
    }
}

/// Capability: the project the import run is bound to.
pub trait ProjectInput {
    fn project_slot(&self) -> &Setting<ProjectRef>;
    fn project_slot_mut(&mut self) -> &mut Setting<ProjectRef>;

    fn set_project(&mut self, project: ProjectRef) -> Result<()> {
        if let ProjectRef::Name(name) = &project {
            if name.trim().is_empty() {
                return Err(SiftError::Config(
                    "set_project() requires a non-empty project name".to_string(),
                ));
            }
        }
        self.project_slot_mut().set(project);
        Ok(())
    }

    fn project(&self) -> Result<&ProjectRef> {
        self.project_slot().get()
    }
}

/// Bounds-check inspected indices against the row length.
///
/// Supplying more indices than the row has cells, or any out-of-range index,
/// is a caller defect rather than bad data.
pub(crate) fn check_bounds(indices: &[usize], row_len: usize) -> Result<()> {
    if indices.len() > row_len {
        return Err(SiftError::Config(format!(
            "{} indices were configured but the row has only {} cells",
            indices.len(),
            row_len
        )));
    }
    if let Some(&bad) = indices.iter().find(|&&i| i >= row_len) {
        return Err(SiftError::Config(format!(
            "index {bad} is out of range for a row of {row_len} cells"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    struct IndicesOnly {
        indices: Setting<Vec<usize>>,
    }

    impl IndicesOnly {
        fn new() -> Self {
            Self {
                indices: Setting::unset("set_indices"),
            }
        }
    }

    impl ColumnIndices for IndicesOnly {
        fn indices_slot(&self) -> &Setting<Vec<usize>> {
            &self.indices
        }
        fn indices_slot_mut(&mut self) -> &mut Setting<Vec<usize>> {
            &mut self.indices
        }
    }

    struct HeadersOnly {
        headers: Setting<Vec<HeaderDefinition>>,
    }

    impl HeadersOnly {
        fn new() -> Self {
            Self {
                headers: Setting::unset("set_headers"),
            }
        }
    }

    impl HeaderList for HeadersOnly {
        fn headers_slot(&self) -> &Setting<Vec<HeaderDefinition>> {
            &self.headers
        }
        fn headers_slot_mut(&mut self) -> &mut Setting<Vec<HeaderDefinition>> {
            &mut self.headers
        }
    }

    #[test]
    fn test_getter_before_setter_is_config_error() {
        let validator = IndicesOnly::new();
        let err = validator.indices().unwrap_err();
        assert!(matches!(err, SiftError::Config(_)));
        assert!(err.to_string().contains("set_indices"));
    }

    #[test]
    fn test_setter_then_getter() {
        let mut validator = IndicesOnly::new();
        validator.set_indices(vec![0, 2, 4]).unwrap();
        assert_eq!(validator.indices().unwrap(), &[0, 2, 4]);
    }

    #[test]
    fn test_empty_indices_rejected() {
        let mut validator = IndicesOnly::new();
        let err = validator.set_indices(Vec::new()).unwrap_err();
        assert!(matches!(err, SiftError::Config(_)));
    }

    #[test]
    fn test_headers_deduplicated_by_requirement() {
        let mut validator = HeadersOnly::new();
        validator
            .set_headers(vec![
                HeaderDefinition::new("Trait Name", Requirement::Required, 0),
                HeaderDefinition::new("Trait Name", Requirement::Required, 1),
                HeaderDefinition::new("Trait Name", Requirement::Optional, 2),
                HeaderDefinition::new("Unit", Requirement::Required, 3),
            ])
            .unwrap();

        let headers = validator.headers().unwrap();
        assert_eq!(headers.len(), 3);
        // First occurrence wins and keeps its original position.
        assert_eq!(headers[0].position, 0);
        assert_eq!(headers[1].requirement, Requirement::Optional);
        assert_eq!(headers[2].name, "Unit");
    }

    #[test]
    fn test_numeric_header_name_rejected() {
        let mut validator = HeadersOnly::new();
        let err = validator
            .set_headers(vec![HeaderDefinition::new("42", Requirement::Required, 0)])
            .unwrap_err();
        assert!(matches!(err, SiftError::Config(_)));
    }

    #[test]
    fn test_headers_filtered_by_type_keep_positions() {
        let mut validator = HeadersOnly::new();
        validator
            .set_headers(vec![
                HeaderDefinition::new("Trait Name", Requirement::Required, 0),
                HeaderDefinition::new("Collected By", Requirement::Optional, 1),
                HeaderDefinition::new("Unit", Requirement::Required, 2),
            ])
            .unwrap();

        let required = validator.headers_of(Requirement::Required).unwrap();
        assert_eq!(required.len(), 2);
        assert_eq!(required[0].position, 0);
        assert_eq!(required[1].position, 2);
    }

    #[test]
    fn test_expected_columns_matching() {
        let exact = ExpectedColumns::new(3, true);
        assert!(exact.matches(3));
        assert!(!exact.matches(4));

        let at_least = ExpectedColumns::new(3, false);
        assert!(at_least.matches(3));
        assert!(at_least.matches(5));
        assert!(!at_least.matches(2));
    }

    #[test]
    fn test_check_bounds() {
        assert!(check_bounds(&[0, 2], 3).is_ok());
        assert!(check_bounds(&[0, 1, 2, 3], 3).is_err());
        assert!(check_bounds(&[5], 3).is_err());
    }
}
