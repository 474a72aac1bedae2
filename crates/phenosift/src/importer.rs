//! End-to-end import check: metadata gates, file gate, then a single
//! sequential pass over the file's rows.

use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::context::{
    ColumnCount, ColumnIndices, ExpectedColumns, FileType, HeaderDefinition, HeaderList,
    ValidValues,
};
use crate::error::{Result, SiftError};
use crate::files::{FileAccess, FileRef};
use crate::outcome::Outcome;
use crate::registry::Runner;
use crate::split::{self, SplitOutcome};
use crate::store::BackingStore;
use crate::validators::{
    standard_registry, DuplicateTraitValidator, EmptyCellValidator, FileLoadValidator,
    GenusValidator, HeaderRowValidator, ProjectGenusValidator, ProjectValidator,
    RawRowValidator, ValueListValidator,
};

/// Configuration for one import check run.
///
/// Deserializes from JSON with every field optional; the defaults describe a
/// plain tab-separated import with no checks configured beyond the file
/// gates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    /// MIME types the import flow accepts.
    pub supported_mime_types: Vec<String>,
    /// Declared MIME type of the submitted file; must resolve to a single
    /// delimiter.
    pub file_mime_type: String,
    /// Ordered expected header list.
    pub headers: Vec<HeaderDefinition>,
    /// Expected column count for every row.
    pub expected_columns: ExpectedColumns,
    /// Column positions that must not be empty. Empty = check disabled.
    pub required_indices: Vec<usize>,
    /// Column positions checked against `valid_values`. Empty = disabled.
    pub value_list_indices: Vec<usize>,
    /// Allowed values for the columns named by `value_list_indices`.
    pub valid_values: Vec<String>,
    /// Trait name, method short name and unit column positions, in that
    /// order. Empty = duplicate detection disabled.
    pub trait_indices: Vec<usize>,
    /// Genus the import is bound to, when the form supplied one.
    pub genus: Option<String>,
    /// Project the import is bound to, as submitted (identifier or name).
    pub project: Option<String>,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            supported_mime_types: vec!["text/tab-separated-values".to_string()],
            file_mime_type: "text/tab-separated-values".to_string(),
            headers: Vec::new(),
            expected_columns: ExpectedColumns::new(1, false),
            required_indices: Vec::new(),
            value_list_indices: Vec::new(),
            valid_values: Vec::new(),
            trait_indices: Vec::new(),
            genus: None,
            project: None,
        }
    }
}

/// One validator invocation and its outcome, in invocation order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordedOutcome {
    /// Identifier of the validator that ran.
    pub validator: String,
    /// One-based file line the check applied to, where relevant.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    pub outcome: Outcome,
}

impl RecordedOutcome {
    fn new(validator: &str, line: Option<usize>, outcome: Outcome) -> Self {
        Self {
            validator: validator.to_string(),
            line,
            outcome,
        }
    }
}

/// Properties of the checked file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceInfo {
    /// File name without path.
    pub file: String,
    /// Full path to the file.
    pub path: PathBuf,
    /// SHA-256 hash of the file contents.
    pub hash: String,
    /// File size in bytes.
    pub size_bytes: u64,
    /// Declared MIME type used for splitting.
    pub mime_type: String,
    /// When the check started.
    pub checked_at: DateTime<Utc>,
}

/// Counts over all recorded outcomes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunSummary {
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    /// True when no check failed.
    pub ok: bool,
}

/// Full report of one import check run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    /// Source properties; absent when the file gate failed before the
    /// file could be read.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<SourceInfo>,
    pub outcomes: Vec<RecordedOutcome>,
    pub summary: RunSummary,
}

impl RunReport {
    fn summarize(source: Option<SourceInfo>, outcomes: Vec<RecordedOutcome>) -> Self {
        let mut summary = RunSummary::default();
        for recorded in &outcomes {
            match recorded.outcome.status {
                crate::outcome::Status::Pass => summary.passed += 1,
                crate::outcome::Status::Fail => summary.failed += 1,
                crate::outcome::Status::Todo => summary.skipped += 1,
            }
        }
        summary.ok = summary.failed == 0;
        Self {
            source,
            outcomes,
            summary,
        }
    }

    /// Outcomes recorded for one validator.
    pub fn outcomes_for(&self, validator: &str) -> Vec<&RecordedOutcome> {
        self.outcomes
            .iter()
            .filter(|o| o.validator == validator)
            .collect()
    }
}

/// Runs the whole validator pipeline over one submitted file.
///
/// Validator instances are constructed fresh per run; an `ImportCheck` can
/// be reused, but state such as the duplicate seen-set never leaks between
/// runs.
pub struct ImportCheck {
    files: Arc<dyn FileAccess>,
    store: Arc<dyn BackingStore>,
    config: ImportConfig,
}

impl ImportCheck {
    pub fn new(
        files: Arc<dyn FileAccess>,
        store: Arc<dyn BackingStore>,
        config: ImportConfig,
    ) -> Self {
        Self {
            files,
            store,
            config,
        }
    }

    pub fn config(&self) -> &ImportConfig {
        &self.config
    }

    /// Run every configured check against one submitted file, in gate
    /// order, reading the file in a single line-ordered pass.
    pub fn run(&self, file: &FileRef) -> Result<RunReport> {
        let started_at = Utc::now();
        let config = &self.config;

        // Splitting data rows needs one unambiguous delimiter; refuse a
        // MIME type such as text/plain up front.
        let delimiter = split::delimiter_for(&config.file_mime_type)?;

        if !config.trait_indices.is_empty() && config.trait_indices.len() != 3 {
            return Err(SiftError::Config(format!(
                "trait_indices must name trait, method and unit columns, got {}",
                config.trait_indices.len()
            )));
        }

        let mut runner = Runner::new(standard_registry()?);
        let mut outcomes: Vec<RecordedOutcome> = Vec::new();

        self.run_metadata_gates(&mut runner, &mut outcomes)?;

        // File gate; a hard failure here leaves every row-scope check
        // unevaluated.
        let mut file_load = FileLoadValidator::new(self.files.clone());
        file_load.set_file_mime_type(config.file_mime_type.clone())?;
        file_load.set_supported_mime_types(config.supported_mime_types.clone())?;
        let file_outcome = runner.run("file_load", &[], FileLoadValidator::CASE_VALID, || {
            file_load.validate_file(file)
        })?;
        let file_ok = file_outcome.is_pass();
        outcomes.push(RecordedOutcome::new("file_load", None, file_outcome));

        if !file_ok {
            self.record_skipped_row_checks(&mut outcomes, None, true);
            return Ok(RunReport::summarize(None, outcomes));
        }

        let info = self.files.resolve(file)?.ok_or_else(|| {
            SiftError::Config("file could not be resolved after passing the file gate".to_string())
        })?;

        let mut bytes = Vec::new();
        {
            let mut reader = self.files.open(&info)?;
            reader.read_to_end(&mut bytes).map_err(|e| SiftError::Io {
                path: info.path.clone(),
                source: e,
            })?;
        }

        let mut hasher = Sha256::new();
        hasher.update(&bytes);
        let source = SourceInfo {
            file: info
                .path
                .file_name()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default(),
            path: info.path.clone(),
            hash: format!("sha256:{:x}", hasher.finalize()),
            size_bytes: info.size_bytes,
            mime_type: config.file_mime_type.clone(),
            checked_at: started_at,
        };

        let mut raw_row = RawRowValidator::new();
        raw_row.set_file_mime_type(config.file_mime_type.clone())?;
        raw_row.set_expected_columns(
            config.expected_columns.count,
            config.expected_columns.strict,
        )?;

        // An empty header list disables header matching; the first line is
        // still treated as the header and never validated as data.
        let header_row = if config.headers.is_empty() {
            None
        } else {
            let mut validator = HeaderRowValidator::new();
            validator.set_headers(config.headers.clone())?;
            Some(validator)
        };

        let empty_cell = if config.required_indices.is_empty() {
            None
        } else {
            let mut validator = EmptyCellValidator::new();
            validator.set_indices(config.required_indices.clone())?;
            Some(validator)
        };

        let value_list = if config.value_list_indices.is_empty() {
            None
        } else {
            let mut validator = ValueListValidator::new();
            validator.set_indices(config.value_list_indices.clone())?;
            validator.set_valid_values(config.valid_values.clone())?;
            Some(validator)
        };

        let mut duplicate = if config.trait_indices.is_empty() {
            None
        } else {
            let mut validator = DuplicateTraitValidator::new(self.store.clone());
            validator.set_indices(config.trait_indices.clone())?;
            Some(validator)
        };

        let text = String::from_utf8_lossy(&bytes);
        let mut lines = text.lines();

        // Header line.
        let header_line = lines.next().unwrap_or("");
        let raw_outcome = runner.run("raw_row", &["file_load"], RawRowValidator::CASE_DELIMITED, || {
            raw_row.validate_raw_row(header_line)
        })?;
        outcomes.push(RecordedOutcome::new("raw_row", Some(1), raw_outcome));

        if let Some(header_row) = &header_row {
            // Runs right after the header's raw-row check, so a raw_row
            // failure recorded so far can only be the header line's.
            let header_outcome = runner.run(
                "header_row",
                &["file_load", "raw_row"],
                HeaderRowValidator::CASE_MATCH,
                || {
                    match split::split_row(
                        header_line,
                        &config.file_mime_type,
                        config.expected_columns.count,
                    )? {
                        SplitOutcome::Cells(cells) => header_row.validate_header_row(&cells),
                        SplitOutcome::NotDelimited => {
                            Ok(Outcome::fail(HeaderRowValidator::CASE_MISMATCH))
                        }
                    }
                },
            )?;
            let header_ok = header_outcome.is_pass();
            outcomes.push(RecordedOutcome::new("header_row", Some(1), header_outcome));

            if !header_ok {
                // Column positions cannot be trusted; cell-level checks stay
                // unevaluated.
                self.record_skipped_row_checks(&mut outcomes, None, false);
                return Ok(RunReport::summarize(Some(source), outcomes));
            }
        }

        // Data rows, in file order, counting from the line after the header.
        for (offset, line) in lines.enumerate() {
            let line_no = offset + 2;
            if line.trim().is_empty() {
                continue;
            }

            let raw_outcome =
                runner.run("raw_row", &["file_load"], RawRowValidator::CASE_DELIMITED, || {
                    raw_row.validate_raw_row(line)
                })?;
            let row_ok = raw_outcome.is_pass();
            outcomes.push(RecordedOutcome::new("raw_row", Some(line_no), raw_outcome));

            if !row_ok {
                self.record_skipped_row_checks(&mut outcomes, Some(line_no), false);
                continue;
            }

            let cells = split::split_with(line, delimiter);

            if let Some(validator) = &empty_cell {
                let outcome = runner.run(
                    "empty_cell",
                    &["file_load", "header_row"],
                    EmptyCellValidator::CASE_FILLED,
                    || validator.validate_row(&cells),
                )?;
                outcomes.push(RecordedOutcome::new("empty_cell", Some(line_no), outcome));
            }

            if let Some(validator) = &value_list {
                let outcome = runner.run(
                    "value_in_list",
                    &["file_load", "header_row"],
                    ValueListValidator::CASE_IN_LIST,
                    || validator.validate_row(&cells),
                )?;
                outcomes.push(RecordedOutcome::new("value_in_list", Some(line_no), outcome));
            }

            if let Some(validator) = &mut duplicate {
                let outcome = runner.run(
                    "duplicate_trait",
                    &["file_load", "header_row"],
                    DuplicateTraitValidator::CASE_UNIQUE,
                    || validator.validate_row(&cells, line_no),
                )?;
                outcomes.push(RecordedOutcome::new(
                    "duplicate_trait",
                    Some(line_no),
                    outcome,
                ));
            }
        }

        Ok(RunReport::summarize(Some(source), outcomes))
    }

    fn run_metadata_gates(
        &self,
        runner: &mut Runner,
        outcomes: &mut Vec<RecordedOutcome>,
    ) -> Result<()> {
        let config = &self.config;
        let mut metadata: IndexMap<String, String> = IndexMap::new();
        if let Some(genus) = &config.genus {
            metadata.insert("genus".to_string(), genus.clone());
        }
        if let Some(project) = &config.project {
            metadata.insert("project".to_string(), project.clone());
        }

        if config.genus.is_some() {
            let validator = GenusValidator::new(self.store.clone());
            let outcome = runner.run("genus_exists", &[], GenusValidator::CASE_VALID, || {
                validator.validate_metadata(&metadata)
            })?;
            outcomes.push(RecordedOutcome::new("genus_exists", None, outcome));
        }

        if config.project.is_some() {
            let validator = ProjectValidator::new(self.store.clone());
            let outcome = runner.run("project_exists", &[], ProjectValidator::CASE_VALID, || {
                validator.validate_metadata(&metadata)
            })?;
            outcomes.push(RecordedOutcome::new("project_exists", None, outcome));
        }

        if config.genus.is_some() && config.project.is_some() {
            let validator = ProjectGenusValidator::new(self.store.clone());
            let outcome = runner.run(
                "project_genus_match",
                &["genus_exists", "project_exists"],
                ProjectGenusValidator::CASE_MATCH,
                || validator.validate_metadata(&metadata),
            )?;
            outcomes.push(RecordedOutcome::new("project_genus_match", None, outcome));
        }

        Ok(())
    }

    /// Record a `todo` outcome for each enabled row-scope check.
    fn record_skipped_row_checks(
        &self,
        outcomes: &mut Vec<RecordedOutcome>,
        line: Option<usize>,
        include_header_checks: bool,
    ) {
        let config = &self.config;
        if include_header_checks {
            outcomes.push(RecordedOutcome::new(
                "raw_row",
                line,
                Outcome::todo(RawRowValidator::CASE_DELIMITED),
            ));
            if !config.headers.is_empty() {
                outcomes.push(RecordedOutcome::new(
                    "header_row",
                    line,
                    Outcome::todo(HeaderRowValidator::CASE_MATCH),
                ));
            }
        }
        if !config.required_indices.is_empty() {
            outcomes.push(RecordedOutcome::new(
                "empty_cell",
                line,
                Outcome::todo(EmptyCellValidator::CASE_FILLED),
            ));
        }
        if !config.value_list_indices.is_empty() {
            outcomes.push(RecordedOutcome::new(
                "value_in_list",
                line,
                Outcome::todo(ValueListValidator::CASE_IN_LIST),
            ));
        }
        if !config.trait_indices.is_empty() {
            outcomes.push(RecordedOutcome::new(
                "duplicate_trait",
                line,
                Outcome::todo(DuplicateTraitValidator::CASE_UNIQUE),
            ));
        }
    }
}
