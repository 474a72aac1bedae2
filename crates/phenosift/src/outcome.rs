//! Validation outcomes returned by every validator entry point.

use serde::{Deserialize, Serialize};

/// Terminal status of one validation check within one run.
///
/// `pending` is the state before a check runs and has no representation
/// here; a returned outcome is always one of these three.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// The check evaluated its input and found no problem.
    Pass,
    /// The check evaluated its input and found bad data.
    Fail,
    /// The check was skipped because a prerequisite check already failed.
    Todo,
}

impl Status {
    /// Get a human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Status::Pass => "Pass",
            Status::Fail => "Fail",
            Status::Todo => "Todo",
        }
    }
}

/// Structured detail identifying one offending index, value or row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedItem {
    /// Zero-based column index, where the failure concerns one cell.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
    /// One-based file line number, where the failure concerns one row.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    /// The offending value as it appeared in the input.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    /// Human-readable description of this item.
    pub detail: String,
}

impl FailedItem {
    /// Create an item with just a detail message.
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            index: None,
            line: None,
            value: None,
            detail: detail.into(),
        }
    }

    /// Set the column index.
    pub fn with_index(mut self, index: usize) -> Self {
        self.index = Some(index);
        self
    }

    /// Set the line number.
    pub fn with_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }

    /// Set the offending value.
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }
}

/// Result of one validator call. Fresh per call, never mutated after return.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    /// Human string describing which check ran or which failure case fired.
    pub case: String,
    /// Tri-state status.
    pub status: Status,
    /// Structured failure detail; empty on pass and todo.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub failed: Vec<FailedItem>,
}

impl Outcome {
    /// A passing outcome.
    pub fn pass(case: impl Into<String>) -> Self {
        Self {
            case: case.into(),
            status: Status::Pass,
            failed: Vec::new(),
        }
    }

    /// A failing outcome; attach items with [`Outcome::with_item`].
    pub fn fail(case: impl Into<String>) -> Self {
        Self {
            case: case.into(),
            status: Status::Fail,
            failed: Vec::new(),
        }
    }

    /// A skipped outcome for a check whose prerequisite already failed.
    pub fn todo(case: impl Into<String>) -> Self {
        Self {
            case: case.into(),
            status: Status::Todo,
            failed: Vec::new(),
        }
    }

    /// Attach one failed item.
    pub fn with_item(mut self, item: FailedItem) -> Self {
        self.failed.push(item);
        self
    }

    /// Attach several failed items.
    pub fn with_items(mut self, items: impl IntoIterator<Item = FailedItem>) -> Self {
        self.failed.extend(items);
        self
    }

    pub fn is_pass(&self) -> bool {
        self.status == Status::Pass
    }

    pub fn is_fail(&self) -> bool {
        self.status == Status::Fail
    }

    pub fn is_todo(&self) -> bool {
        self.status == Status::Todo
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pass_has_no_items() {
        let outcome = Outcome::pass("values are in the allowed list");
        assert!(outcome.is_pass());
        assert!(outcome.failed.is_empty());
    }

    #[test]
    fn test_fail_collects_items() {
        let outcome = Outcome::fail("empty value in required column")
            .with_item(FailedItem::new("column 1 is empty").with_index(1))
            .with_item(FailedItem::new("column 3 is empty").with_index(3));

        assert!(outcome.is_fail());
        assert_eq!(outcome.failed.len(), 2);
        assert_eq!(outcome.failed[0].index, Some(1));
    }

    #[test]
    fn test_todo_is_distinct_from_fail() {
        let outcome = Outcome::todo("header row matches expected headers");
        assert!(outcome.is_todo());
        assert!(!outcome.is_fail());
        assert!(!outcome.is_pass());
    }

    #[test]
    fn test_serializes_without_empty_fields() {
        let outcome = Outcome::pass("raw row is delimited");
        let json = serde_json::to_string(&outcome).unwrap();
        assert!(!json.contains("failed"));

        let item = FailedItem::new("detail").with_line(7);
        let json = serde_json::to_string(&item).unwrap();
        assert!(json.contains("\"line\":7"));
        assert!(!json.contains("index"));
    }
}
