//! Field-level validation of task drafts.
//!
//! Every rule is checked independently, so a draft with several problems reports
//! all of them at once. An empty [`ValidationErrors`] means the draft may be committed.

use std::collections::BTreeMap;
use std::fmt;

use crate::models::{Priority, TaskDraft};
use crate::utils::is_valid_date;

pub const TITLE_MAX_CHARS: usize = 100;
pub const DESCRIPTION_MAX_CHARS: usize = 1000;

pub const TITLE_REQUIRED: &str = "Title is required";
pub const TITLE_TOO_LONG: &str = "Max 100 characters";
pub const DESCRIPTION_TOO_LONG: &str = "Max 1000 characters";
pub const PRIORITY_INVALID: &str = "Priority must be one of Low, Medium, High";
pub const DUE_DATE_INVALID: &str = "Due date invalid";

/// A draft field that can carry a validation error
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    Title,
    Description,
    Priority,
    DueDate,
}

impl Field {
    /// Name used in persisted data and CLI output
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Title => "title",
            Field::Description => "description",
            Field::Priority => "priority",
            Field::DueDate => "dueDate",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Mapping from field to error message, iterated in field order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: BTreeMap<Field, String>,
}

impl ValidationErrors {
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn get(&self, field: Field) -> Option<&str> {
        self.errors.get(&field).map(String::as_str)
    }

    pub fn contains(&self, field: Field) -> bool {
        self.errors.contains_key(&field)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> {
        self.errors.iter().map(|(field, msg)| (*field, msg.as_str()))
    }

    fn insert(&mut self, field: Field, message: &str) {
        self.errors.insert(field, message.to_string());
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .iter()
            .map(|(field, msg)| format!("{}: {}", field, msg))
            .collect();
        f.write_str(&parts.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

/// Validate a draft. Pure; the draft's id and timestamps are never looked at.
pub fn validate(draft: &TaskDraft) -> ValidationErrors {
    let mut errors = ValidationErrors::default();

    let title = draft.title.as_deref().unwrap_or("").trim();
    if title.is_empty() {
        errors.insert(Field::Title, TITLE_REQUIRED);
    } else if title.chars().count() > TITLE_MAX_CHARS {
        errors.insert(Field::Title, TITLE_TOO_LONG);
    }

    // Description length is measured untrimmed
    if let Some(description) = draft.description.as_deref() {
        if description.chars().count() > DESCRIPTION_MAX_CHARS {
            errors.insert(Field::Description, DESCRIPTION_TOO_LONG);
        }
    }

    let priority_ok = draft
        .priority
        .as_deref()
        .is_some_and(|p| p.parse::<Priority>().is_ok());
    if !priority_ok {
        errors.insert(Field::Priority, PRIORITY_INVALID);
    }

    if let Some(due_date) = draft.due_date.as_deref() {
        if !due_date.is_empty() && !is_valid_date(due_date) {
            errors.insert(Field::DueDate, DUE_DATE_INVALID);
        }
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(title: &str) -> TaskDraft {
        TaskDraft {
            title: Some(title.to_string()),
            priority: Some("Low".to_string()),
            ..TaskDraft::default()
        }
    }

    #[test]
    fn valid_draft_has_no_errors() {
        let d = draft("Write report")
            .with_description("Quarterly numbers")
            .with_due_date("2025-11-20");
        assert!(validate(&d).is_empty());
    }

    #[test]
    fn missing_or_blank_title_is_required() {
        for title in [None, Some(""), Some("   "), Some("\t\n")] {
            let d = TaskDraft {
                title: title.map(str::to_string),
                priority: Some("Medium".to_string()),
                ..TaskDraft::default()
            };
            let errors = validate(&d);
            assert_eq!(errors.get(Field::Title), Some(TITLE_REQUIRED));
            assert_eq!(errors.len(), 1);
        }
    }

    #[test]
    fn title_length_boundary() {
        let ok = "a".repeat(100);
        assert!(!validate(&draft(&ok)).contains(Field::Title));

        let too_long = "a".repeat(101);
        assert_eq!(validate(&draft(&too_long)).get(Field::Title), Some(TITLE_TOO_LONG));

        // Surrounding whitespace does not count against the limit
        let padded = format!("  {}  ", ok);
        assert!(!validate(&draft(&padded)).contains(Field::Title));
    }

    #[test]
    fn title_length_counts_characters_not_bytes() {
        let title = "é".repeat(100);
        assert!(validate(&draft(&title)).is_empty());
    }

    #[test]
    fn description_limit_is_untrimmed() {
        let exact = "x".repeat(1000);
        assert!(validate(&draft("t").with_description(exact)).is_empty());

        let padded = format!("{} ", "x".repeat(1000));
        let errors = validate(&draft("t").with_description(padded));
        assert_eq!(errors.get(Field::Description), Some(DESCRIPTION_TOO_LONG));
    }

    #[test]
    fn priority_must_be_an_exact_literal() {
        for bad in [None, Some(""), Some("low"), Some("Urgent"), Some("High ")] {
            let d = TaskDraft {
                title: Some("t".to_string()),
                priority: bad.map(str::to_string),
                ..TaskDraft::default()
            };
            assert_eq!(validate(&d).get(Field::Priority), Some(PRIORITY_INVALID));
        }
    }

    #[test]
    fn due_date_rules() {
        assert!(validate(&draft("t").with_due_date("")).is_empty());
        assert!(validate(&draft("t").with_due_date("2025-11-20T10:00:00Z")).is_empty());
        assert!(validate(&draft("t").with_due_date("2025-11-20T10:00Z")).is_empty());
        assert!(validate(&draft("t").with_due_date("2025-11-20T10:00+02:00")).is_empty());
        assert_eq!(
            validate(&draft("t").with_due_date("not-a-date")).get(Field::DueDate),
            Some(DUE_DATE_INVALID)
        );
    }

    #[test]
    fn all_errors_are_reported_together() {
        let d = TaskDraft {
            title: Some(" ".to_string()),
            description: Some("y".repeat(1001)),
            priority: Some("None".to_string()),
            due_date: Some("31/12/2025".to_string()),
            completed: None,
        };
        let fields: Vec<Field> = validate(&d).iter().map(|(f, _)| f).collect();
        assert_eq!(
            fields,
            vec![Field::Title, Field::Description, Field::Priority, Field::DueDate]
        );
    }
}
