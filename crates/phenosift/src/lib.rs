//! Phenosift: pre-import validation for tabular trait data files.
//!
//! Phenosift checks a delimited trait-definition file against the records of
//! a backing store before anything is imported. Every check answers with a
//! pass, fail, or todo outcome rather than an error; errors are reserved for
//! wiring defects such as a validator being asked to run before it was
//! configured.
//!
//! # Core Principles
//!
//! - **Declared, never sniffed**: the delimiter comes from the declared MIME
//!   type, and an ambiguous type is refused rather than guessed at
//! - **Outcomes, not exceptions**: bad data always produces a reportable
//!   outcome; only misconfiguration is an error
//! - **One pass, in order**: rows are validated in file order with stable
//!   line numbers, and a failed gate turns dependent checks into todos
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use phenosift::{
//!     ExpectedColumns, FileRef, HeaderDefinition, ImportCheck, ImportConfig,
//!     LocalFiles, MemoryStore, Requirement,
//! };
//!
//! let config = ImportConfig {
//!     supported_mime_types: vec!["text/tab-separated-values".to_string()],
//!     file_mime_type: "text/tab-separated-values".to_string(),
//!     headers: vec![
//!         HeaderDefinition::new("Trait Name", Requirement::Required, 0),
//!         HeaderDefinition::new("Method Short Name", Requirement::Required, 1),
//!         HeaderDefinition::new("Unit", Requirement::Required, 2),
//!     ],
//!     expected_columns: ExpectedColumns::new(3, true),
//!     required_indices: vec![0, 1, 2],
//!     value_list_indices: vec![],
//!     valid_values: vec![],
//!     trait_indices: vec![0, 1, 2],
//!     genus: None,
//!     project: None,
//! };
//!
//! let check = ImportCheck::new(
//!     Arc::new(LocalFiles::new()),
//!     Arc::new(MemoryStore::new()),
//!     config,
//! );
//! let report = check.run(&FileRef::Path("traits.tsv".into())).unwrap();
//!
//! println!("passed: {}", report.summary.passed);
//! println!("failed: {}", report.summary.failed);
//! ```

pub mod context;
pub mod error;
pub mod files;
pub mod importer;
pub mod outcome;
pub mod registry;
pub mod split;
pub mod store;
pub mod validators;

pub use context::{ExpectedColumns, HeaderDefinition, Requirement};
pub use error::{Result, SiftError};
pub use files::{FileAccess, FileInfo, FileRef, LocalFiles};
pub use importer::{ImportCheck, ImportConfig, RecordedOutcome, RunReport, RunSummary, SourceInfo};
pub use outcome::{FailedItem, Outcome, Status};
pub use registry::{Descriptor, InputKind, Registry, Runner, Scope};
pub use store::{BackingStore, GenusRecord, MemoryStore, ProjectRecord, ProjectRef};
pub use validators::{standard_registry, Input, Validate};
