//! File-level validators: can the file be used at all, and does each raw
//! line conform to the declared delimiter and column count.

use std::io::Read;
use std::sync::Arc;

use crate::context::{ColumnCount, ExpectedColumns, FileType, Setting};
use crate::error::Result;
use crate::files::{binary_signature, mime_types_for_extension, FileAccess, FileRef};
use crate::outcome::{FailedItem, Outcome};
use crate::registry::{Descriptor, InputKind, Scope};
use crate::split;

use super::{wrong_input, Input, Validate};

pub(crate) const FILE_LOAD_DESCRIPTOR: Descriptor = Descriptor::new(
    "file_load",
    "File exists and can be opened",
    Scope::File,
    &[InputKind::File],
);

pub(crate) const RAW_ROW_DESCRIPTOR: Descriptor = Descriptor::new(
    "raw_row",
    "Raw row is delimited",
    Scope::FileRow,
    &[InputKind::RawRow],
);

/// Checks existence, size, declared type, and readability of the submitted
/// file, and sniffs the leading bytes for binary content masquerading as a
/// tabular text type.
pub struct FileLoadValidator {
    files: Arc<dyn FileAccess>,
    file_mime_type: Setting<String>,
    supported_mime_types: Setting<Vec<String>>,
}

impl FileLoadValidator {
    pub const CASE_VALID: &'static str = "file is valid and readable";
    pub const CASE_NOT_PROVIDED: &'static str = "no file was provided";
    pub const CASE_UNRESOLVED: &'static str = "file cannot be resolved";
    pub const CASE_EMPTY: &'static str = "file is empty";
    pub const CASE_MIME_UNSUPPORTED: &'static str =
        "file MIME type is not supported though its extension is";
    pub const CASE_EXTENSION_UNSUPPORTED: &'static str = "file extension is not supported";
    pub const CASE_TYPE_UNSUPPORTED: &'static str =
        "file MIME type and extension are not supported";
    pub const CASE_UNREADABLE: &'static str = "file could not be opened for reading";
    pub const CASE_MASQUERADE: &'static str =
        "file content does not match its declared MIME type";

    pub fn new(files: Arc<dyn FileAccess>) -> Self {
        Self {
            files,
            file_mime_type: Setting::unset("set_file_mime_type"),
            supported_mime_types: Setting::unset("set_supported_mime_types"),
        }
    }

    /// Validate one submitted file reference.
    pub fn validate_file(&self, file: &FileRef) -> Result<Outcome> {
        if matches!(file, FileRef::Unset) {
            return Ok(Outcome::fail(Self::CASE_NOT_PROVIDED));
        }

        let info = match self.files.resolve(file)? {
            Some(info) => info,
            None => {
                return Ok(Outcome::fail(Self::CASE_UNRESOLVED).with_item(FailedItem::new(
                    "the reference does not point at an existing file",
                )));
            }
        };

        if info.size_bytes == 0 {
            return Ok(Outcome::fail(Self::CASE_EMPTY)
                .with_item(FailedItem::new("file has a size of zero bytes")));
        }

        let supported = self.supported_mime_types()?;
        // A declared MIME type, when configured, overrides the resolver's
        // extension-derived one.
        let mime_type = if self.file_mime_type.is_set() {
            self.file_mime_type()?
        } else {
            info.mime_type.as_str()
        };
        let mime_supported = supported.iter().any(|m| m == mime_type);
        let extension_supported = mime_types_for_extension(&info.extension)
            .map(|types| types.iter().any(|t| supported.iter().any(|m| m == t)))
            .unwrap_or(false);

        match (mime_supported, extension_supported) {
            (true, true) => {}
            (false, true) => {
                return Ok(Outcome::fail(Self::CASE_MIME_UNSUPPORTED).with_item(
                    FailedItem::new(format!(
                        "extension '{}' is accepted but MIME type is not",
                        info.extension
                    ))
                    .with_value(mime_type.to_string()),
                ));
            }
            (true, false) => {
                return Ok(Outcome::fail(Self::CASE_EXTENSION_UNSUPPORTED).with_item(
                    FailedItem::new("MIME type is accepted but extension is not")
                        .with_value(info.extension.clone()),
                ));
            }
            (false, false) => {
                return Ok(Outcome::fail(Self::CASE_TYPE_UNSUPPORTED).with_item(
                    FailedItem::new(format!(
                        "neither MIME type '{}' nor extension '{}' is accepted",
                        mime_type, info.extension
                    )),
                ));
            }
        }

        // Reader is scoped to this call; the handle closes on every path out.
        let mut reader = match self.files.open(&info) {
            Ok(reader) => reader,
            Err(_) => return Ok(Outcome::fail(Self::CASE_UNREADABLE)),
        };

        let mut prefix = [0u8; 8];
        let read = match reader.read(&mut prefix) {
            Ok(n) => n,
            Err(_) => return Ok(Outcome::fail(Self::CASE_UNREADABLE)),
        };

        if let Some(signature) = binary_signature(&prefix[..read]) {
            return Ok(Outcome::fail(Self::CASE_MASQUERADE).with_item(
                FailedItem::new(format!(
                    "content starts with a {signature} signature but the declared type is tabular text"
                ))
                .with_value(mime_type.to_string()),
            ));
        }

        Ok(Outcome::pass(Self::CASE_VALID))
    }
}

impl FileType for FileLoadValidator {
    fn file_mime_type_slot(&self) -> &Setting<String> {
        &self.file_mime_type
    }
    fn file_mime_type_slot_mut(&mut self) -> &mut Setting<String> {
        &mut self.file_mime_type
    }
    fn supported_mime_types_slot(&self) -> &Setting<Vec<String>> {
        &self.supported_mime_types
    }
    fn supported_mime_types_slot_mut(&mut self) -> &mut Setting<Vec<String>> {
        &mut self.supported_mime_types
    }
}

impl Validate for FileLoadValidator {
    fn descriptor(&self) -> &'static Descriptor {
        &FILE_LOAD_DESCRIPTOR
    }

    fn validate(&mut self, input: &Input<'_>) -> Result<Outcome> {
        match input {
            Input::File(file) => self.validate_file(file),
            other => Err(wrong_input(self.descriptor(), other)),
        }
    }
}

/// Checks that one raw line is delimited by a candidate delimiter of the
/// file's MIME type and splits to the expected column count.
pub struct RawRowValidator {
    file_mime_type: Setting<String>,
    supported_mime_types: Setting<Vec<String>>,
    expected_columns: Setting<ExpectedColumns>,
}

impl RawRowValidator {
    pub const CASE_DELIMITED: &'static str = "raw row is delimited";
    pub const CASE_NOT_DELIMITED: &'static str = "raw row is not delimited";

    pub fn new() -> Self {
        Self {
            file_mime_type: Setting::unset("set_file_mime_type"),
            supported_mime_types: Setting::unset("set_supported_mime_types"),
            expected_columns: Setting::unset("set_expected_columns"),
        }
    }

    /// Validate one raw line against the configured MIME type and column
    /// count. The row is valid when at least one candidate delimiter that
    /// occurs in the line yields a satisfying column count.
    pub fn validate_raw_row(&self, line: &str) -> Result<Outcome> {
        let expected = *self.expected_columns()?;
        let candidates = self.file_delimiters()?;

        let occurring: Vec<char> = candidates
            .iter()
            .copied()
            .filter(|&d| line.contains(d))
            .collect();

        if occurring.is_empty() {
            if expected.count == 1 {
                // A single expected column never needs a delimiter.
                return Ok(Outcome::pass(Self::CASE_DELIMITED));
            }
            return Ok(Outcome::fail(Self::CASE_NOT_DELIMITED).with_item(FailedItem::new(
                format!(
                    "none of the candidate delimiters {:?} occur in the row",
                    candidates
                ),
            )));
        }

        let mut items = Vec::new();
        for delimiter in occurring {
            let cells = split::split_with(line, delimiter);
            if expected.matches(cells.len()) {
                return Ok(Outcome::pass(Self::CASE_DELIMITED));
            }
            items.push(
                FailedItem::new(format!(
                    "splitting on {:?} yields {} columns where {}{} are expected",
                    delimiter,
                    cells.len(),
                    if expected.strict { "exactly " } else { "at least " },
                    expected.count
                ))
                .with_value(delimiter.to_string()),
            );
        }

        Ok(Outcome::fail(Self::CASE_NOT_DELIMITED).with_items(items))
    }
}

impl Default for RawRowValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl FileType for RawRowValidator {
    fn file_mime_type_slot(&self) -> &Setting<String> {
        &self.file_mime_type
    }
    fn file_mime_type_slot_mut(&mut self) -> &mut Setting<String> {
        &mut self.file_mime_type
    }
    fn supported_mime_types_slot(&self) -> &Setting<Vec<String>> {
        &self.supported_mime_types
    }
    fn supported_mime_types_slot_mut(&mut self) -> &mut Setting<Vec<String>> {
        &mut self.supported_mime_types
    }
}

impl ColumnCount for RawRowValidator {
    fn expected_columns_slot(&self) -> &Setting<ExpectedColumns> {
        &self.expected_columns
    }
    fn expected_columns_slot_mut(&mut self) -> &mut Setting<ExpectedColumns> {
        &mut self.expected_columns
    }
}

impl Validate for RawRowValidator {
    fn descriptor(&self) -> &'static Descriptor {
        &RAW_ROW_DESCRIPTOR
    }

    fn validate(&mut self, input: &Input<'_>) -> Result<Outcome> {
        match input {
            Input::RawRow(line) => self.validate_raw_row(line),
            other => Err(wrong_input(self.descriptor(), other)),
        }
    }
}
