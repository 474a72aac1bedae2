//! The validators and their shared entry-point contract.

mod file;
mod metadata;
mod row;

pub use file::{FileLoadValidator, RawRowValidator};
pub use metadata::{GenusValidator, ProjectGenusValidator, ProjectValidator};
pub use row::{
    DuplicateTraitValidator, EmptyCellValidator, HeaderRowValidator, ValueListValidator,
};

use indexmap::IndexMap;

use crate::error::{Result, SiftError};
use crate::files::FileRef;
use crate::outcome::Outcome;
use crate::registry::{Descriptor, Registry};

/// Input handed to a validator through the generic entry point.
#[derive(Debug)]
pub enum Input<'a> {
    File(&'a FileRef),
    RawRow(&'a str),
    HeaderRow(&'a [String]),
    DataRow { cells: &'a [String], line: usize },
    Metadata(&'a IndexMap<String, String>),
}

impl Input<'_> {
    /// Short name used in wrong-shape configuration errors.
    fn kind_name(&self) -> &'static str {
        match self {
            Input::File(_) => "file",
            Input::RawRow(_) => "raw row",
            Input::HeaderRow(_) => "header row",
            Input::DataRow { .. } => "data row",
            Input::Metadata(_) => "metadata",
        }
    }
}

/// Generic entry point every validator implements alongside its typed one.
///
/// Handing a validator an input shape it does not accept is a caller
/// defect and yields a configuration error, never a validation failure.
pub trait Validate {
    /// The immutable descriptor this validator registers under.
    fn descriptor(&self) -> &'static Descriptor;

    /// Run the check against one input.
    fn validate(&mut self, input: &Input<'_>) -> Result<Outcome>;
}

/// Configuration error for an input shape a validator does not accept.
pub(crate) fn wrong_input(descriptor: &Descriptor, input: &Input<'_>) -> SiftError {
    SiftError::Config(format!(
        "validator '{}' does not accept {} input",
        descriptor.id,
        input.kind_name()
    ))
}

/// Build the registry of all built-in validators, in invocation order.
pub fn standard_registry() -> Result<Registry> {
    let mut registry = Registry::new();
    registry.register(metadata::GENUS_DESCRIPTOR)?;
    registry.register(metadata::PROJECT_DESCRIPTOR)?;
    registry.register(metadata::PROJECT_GENUS_DESCRIPTOR)?;
    registry.register(file::FILE_LOAD_DESCRIPTOR)?;
    registry.register(file::RAW_ROW_DESCRIPTOR)?;
    registry.register(row::HEADER_ROW_DESCRIPTOR)?;
    registry.register(row::EMPTY_CELL_DESCRIPTOR)?;
    registry.register(row::VALUE_LIST_DESCRIPTOR)?;
    registry.register(row::DUPLICATE_TRAIT_DESCRIPTOR)?;
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{InputKind, Scope};

    #[test]
    fn test_standard_registry_holds_all_validators() {
        let registry = standard_registry().unwrap();
        assert_eq!(registry.len(), 9);

        assert!(registry.by_id("file_load").is_some());
        assert!(registry.by_id("duplicate_trait").is_some());
        assert_eq!(registry.for_scope(Scope::Metadata).len(), 3);
        assert_eq!(registry.for_scope(Scope::File).len(), 1);
        assert_eq!(registry.for_input(InputKind::DataRow).len(), 3);
    }

    #[test]
    fn test_registration_order_is_invocation_order() {
        let registry = standard_registry().unwrap();
        let ids: Vec<&str> = registry.iter().map(|d| d.id).collect();
        let file_load = ids.iter().position(|&id| id == "file_load").unwrap();
        let header_row = ids.iter().position(|&id| id == "header_row").unwrap();
        let duplicate = ids.iter().position(|&id| id == "duplicate_trait").unwrap();
        assert!(file_load < header_row);
        assert!(header_row < duplicate);
    }
}
