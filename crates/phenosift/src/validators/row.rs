//! Row-level validators: header matching, empty cells, allowed values, and
//! duplicate trait detection.

use std::collections::HashSet;
use std::sync::Arc;

use crate::context::{
    check_bounds, ColumnIndices, HeaderDefinition, HeaderList, Requirement, Setting, ValidValues,
};
use crate::error::{Result, SiftError};
use crate::outcome::{FailedItem, Outcome};
use crate::registry::{Descriptor, InputKind, Scope};
use crate::store::BackingStore;

use super::{wrong_input, Input, Validate};

pub(crate) const HEADER_ROW_DESCRIPTOR: Descriptor = Descriptor::new(
    "header_row",
    "Header row matches expected headers",
    Scope::Headers,
    &[InputKind::HeaderRow],
);

pub(crate) const EMPTY_CELL_DESCRIPTOR: Descriptor = Descriptor::new(
    "empty_cell",
    "Required cells are not empty",
    Scope::FileRow,
    &[InputKind::DataRow],
);

pub(crate) const VALUE_LIST_DESCRIPTOR: Descriptor = Descriptor::new(
    "value_in_list",
    "Values are in the allowed list",
    Scope::FileRow,
    &[InputKind::DataRow],
);

pub(crate) const DUPLICATE_TRAIT_DESCRIPTOR: Descriptor = Descriptor::new(
    "duplicate_trait",
    "Trait combination is unique",
    Scope::FileRow,
    &[InputKind::DataRow],
);

/// Compares a split header row to the configured ordered header list.
///
/// Every required header must be present, and all expected headers that are
/// present must appear in the same relative order as declared. A header
/// that is present but out of sequence is reported distinctly from one that
/// is missing entirely.
pub struct HeaderRowValidator {
    headers: Setting<Vec<HeaderDefinition>>,
}

impl HeaderRowValidator {
    pub const CASE_MATCH: &'static str = "header row matches expected headers";
    pub const CASE_EMPTY: &'static str = "header row is empty";
    pub const CASE_MISMATCH: &'static str = "header row does not match expected headers";

    pub fn new() -> Self {
        Self {
            headers: Setting::unset("set_headers"),
        }
    }

    /// Validate a header row that has already been split into cells.
    pub fn validate_header_row(&self, cells: &[String]) -> Result<Outcome> {
        let expected = self.headers()?;

        if cells.is_empty() || cells.iter().all(|c| c.trim().is_empty()) {
            return Ok(Outcome::fail(Self::CASE_EMPTY));
        }

        let mut items = Vec::new();
        let mut last_position: Option<usize> = None;

        for definition in expected {
            let found = cells.iter().position(|c| c.trim() == definition.name);

            match found {
                None => {
                    if definition.requirement == Requirement::Required {
                        items.push(FailedItem::new(format!(
                            "expected header '{}' is missing",
                            definition.name
                        )));
                    }
                    // An absent optional header is not a failure.
                }
                Some(position) => {
                    if last_position.is_some_and(|last| position <= last) {
                        items.push(
                            FailedItem::new(format!(
                                "header '{}' is present but out of sequence",
                                definition.name
                            ))
                            .with_index(position)
                            .with_value(definition.name.clone()),
                        );
                    } else {
                        last_position = Some(position);
                    }
                }
            }
        }

        if items.is_empty() {
            Ok(Outcome::pass(Self::CASE_MATCH))
        } else {
            Ok(Outcome::fail(Self::CASE_MISMATCH).with_items(items))
        }
    }
}

impl Default for HeaderRowValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl HeaderList for HeaderRowValidator {
    fn headers_slot(&self) -> &Setting<Vec<HeaderDefinition>> {
        &self.headers
    }
    fn headers_slot_mut(&mut self) -> &mut Setting<Vec<HeaderDefinition>> {
        &mut self.headers
    }
}

impl Validate for HeaderRowValidator {
    fn descriptor(&self) -> &'static Descriptor {
        &HEADER_ROW_DESCRIPTOR
    }

    fn validate(&mut self, input: &Input<'_>) -> Result<Outcome> {
        match input {
            Input::HeaderRow(cells) => self.validate_header_row(cells),
            other => Err(wrong_input(self.descriptor(), other)),
        }
    }
}

/// Fails when any inspected cell is empty after trimming; all empty indices
/// are reported together.
pub struct EmptyCellValidator {
    indices: Setting<Vec<usize>>,
}

impl EmptyCellValidator {
    pub const CASE_FILLED: &'static str = "required cells are not empty";
    pub const CASE_EMPTY: &'static str = "empty value in required column";

    pub fn new() -> Self {
        Self {
            indices: Setting::unset("set_indices"),
        }
    }

    /// Validate one data row at the configured indices.
    pub fn validate_row(&self, cells: &[String]) -> Result<Outcome> {
        let indices = self.indices()?;
        check_bounds(indices, cells.len())?;

        let empty: Vec<usize> = indices
            .iter()
            .copied()
            .filter(|&i| cells[i].trim().is_empty())
            .collect();

        if empty.is_empty() {
            return Ok(Outcome::pass(Self::CASE_FILLED));
        }

        Ok(Outcome::fail(Self::CASE_EMPTY).with_items(empty.into_iter().map(|index| {
            FailedItem::new(format!("column {index} is empty")).with_index(index)
        })))
    }
}

impl Default for EmptyCellValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl ColumnIndices for EmptyCellValidator {
    fn indices_slot(&self) -> &Setting<Vec<usize>> {
        &self.indices
    }
    fn indices_slot_mut(&mut self) -> &mut Setting<Vec<usize>> {
        &mut self.indices
    }
}

impl Validate for EmptyCellValidator {
    fn descriptor(&self) -> &'static Descriptor {
        &EMPTY_CELL_DESCRIPTOR
    }

    fn validate(&mut self, input: &Input<'_>) -> Result<Outcome> {
        match input {
            Input::DataRow { cells, .. } => self.validate_row(cells),
            other => Err(wrong_input(self.descriptor(), other)),
        }
    }
}

/// Checks inspected cells for exact, case-sensitive membership in the
/// configured valid-value list. A value that matches only when case is
/// ignored still fails, with a diagnostic naming the accepted spelling.
pub struct ValueListValidator {
    indices: Setting<Vec<usize>>,
    valid_values: Setting<Vec<String>>,
}

impl ValueListValidator {
    pub const CASE_IN_LIST: &'static str = "values are in the allowed list";
    pub const CASE_NOT_IN_LIST: &'static str = "value not in the allowed list";

    pub fn new() -> Self {
        Self {
            indices: Setting::unset("set_indices"),
            valid_values: Setting::unset("set_valid_values"),
        }
    }

    /// Validate one data row at the configured indices.
    pub fn validate_row(&self, cells: &[String]) -> Result<Outcome> {
        let indices = self.indices()?;
        let valid_values = self.valid_values()?;
        check_bounds(indices, cells.len())?;

        let mut items = Vec::new();
        for &index in indices {
            let value = cells[index].trim();
            if valid_values.iter().any(|v| v == value) {
                continue;
            }

            let case_insensitive_hit = valid_values
                .iter()
                .find(|v| v.eq_ignore_ascii_case(value));

            let item = match case_insensitive_hit {
                Some(accepted) => FailedItem::new(format!(
                    "value matches allowed value '{accepted}' but differs in case"
                )),
                None => FailedItem::new("value is not in the list of allowed values"),
            };
            items.push(item.with_index(index).with_value(value));
        }

        if items.is_empty() {
            Ok(Outcome::pass(Self::CASE_IN_LIST))
        } else {
            Ok(Outcome::fail(Self::CASE_NOT_IN_LIST).with_items(items))
        }
    }
}

impl Default for ValueListValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl ColumnIndices for ValueListValidator {
    fn indices_slot(&self) -> &Setting<Vec<usize>> {
        &self.indices
    }
    fn indices_slot_mut(&mut self) -> &mut Setting<Vec<usize>> {
        &mut self.indices
    }
}

impl ValidValues for ValueListValidator {
    fn valid_values_slot(&self) -> &Setting<Vec<String>> {
        &self.valid_values
    }
    fn valid_values_slot_mut(&mut self) -> &mut Setting<Vec<String>> {
        &mut self.valid_values
    }
}

impl Validate for ValueListValidator {
    fn descriptor(&self) -> &'static Descriptor {
        &VALUE_LIST_DESCRIPTOR
    }

    fn validate(&mut self, input: &Input<'_>) -> Result<Outcome> {
        match input {
            Input::DataRow { cells, .. } => self.validate_row(cells),
            other => Err(wrong_input(self.descriptor(), other)),
        }
    }
}

/// The lower-cased (trait, method, unit) triple used for duplicate checks.
pub type CombinationKey = (String, String, String);

/// Detects duplicate (trait, method, unit) combinations within the current
/// file and against the backing store.
///
/// The configured indices name, in order, the trait name, method short name
/// and unit columns. The seen-set is created empty at construction, grows
/// for the life of the instance (one instance per import run), and is never
/// cleared.
pub struct DuplicateTraitValidator {
    store: Arc<dyn BackingStore>,
    indices: Setting<Vec<usize>>,
    seen: HashSet<CombinationKey>,
}

impl DuplicateTraitValidator {
    pub const CASE_UNIQUE: &'static str = "trait combination is unique";
    pub const CASE_FILE_DUPLICATE: &'static str =
        "trait combination already appeared in this file";
    pub const CASE_STORE_DUPLICATE: &'static str =
        "trait combination already exists in the backing store";
    pub const CASE_FILE_AND_STORE_DUPLICATE: &'static str =
        "trait combination duplicates both this file and the backing store";

    pub fn new(store: Arc<dyn BackingStore>) -> Self {
        Self {
            store,
            indices: Setting::unset("set_indices"),
            seen: HashSet::new(),
        }
    }

    /// The combination keys recorded so far in this run.
    pub fn seen(&self) -> &HashSet<CombinationKey> {
        &self.seen
    }

    /// Validate one data row. `line` is the one-based file line number used
    /// in failure detail.
    pub fn validate_row(&mut self, cells: &[String], line: usize) -> Result<Outcome> {
        let indices = self.indices()?;
        if indices.len() != 3 {
            return Err(SiftError::Config(format!(
                "duplicate trait detection needs exactly 3 indices (trait, method, unit), got {}",
                indices.len()
            )));
        }
        check_bounds(indices, cells.len())?;

        let key: CombinationKey = (
            cells[indices[0]].trim().to_lowercase(),
            cells[indices[1]].trim().to_lowercase(),
            cells[indices[2]].trim().to_lowercase(),
        );

        let in_file = self.seen.contains(&key);
        let in_store = self
            .store
            .trait_combination_exists(&key.0, &key.1, &key.2)?;

        let case = match (in_file, in_store) {
            (false, false) => {
                self.seen.insert(key);
                return Ok(Outcome::pass(Self::CASE_UNIQUE));
            }
            (true, true) => Self::CASE_FILE_AND_STORE_DUPLICATE,
            (true, false) => Self::CASE_FILE_DUPLICATE,
            (false, true) => {
                // Recorded so a repeat is reported as a combined duplicate.
                self.seen.insert(key.clone());
                Self::CASE_STORE_DUPLICATE
            }
        };

        Ok(Outcome::fail(case).with_item(
            FailedItem::new(format!(
                "combination ({}, {}, {}) is not unique",
                key.0, key.1, key.2
            ))
            .with_line(line),
        ))
    }
}

impl ColumnIndices for DuplicateTraitValidator {
    fn indices_slot(&self) -> &Setting<Vec<usize>> {
        &self.indices
    }
    fn indices_slot_mut(&mut self) -> &mut Setting<Vec<usize>> {
        &mut self.indices
    }
}

impl Validate for DuplicateTraitValidator {
    fn descriptor(&self) -> &'static Descriptor {
        &DUPLICATE_TRAIT_DESCRIPTOR
    }

    fn validate(&mut self, input: &Input<'_>) -> Result<Outcome> {
        match input {
            Input::DataRow { cells, line } => self.validate_row(cells, *line),
            other => Err(wrong_input(self.descriptor(), other)),
        }
    }
}
