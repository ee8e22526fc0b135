use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Task priority. Serialized as the literals `Low`, `Medium`, `High`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::Low, Priority::Medium, Priority::High];

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "Low",
            Priority::Medium => "Medium",
            Priority::High => "High",
        }
    }

    /// Next priority in Low -> Medium -> High order, wrapping around
    pub fn next(self) -> Self {
        match self {
            Priority::Low => Priority::Medium,
            Priority::Medium => Priority::High,
            Priority::High => Priority::Low,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            Priority::Low => Priority::High,
            Priority::Medium => Priority::Low,
            Priority::High => Priority::Medium,
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parsing is exact: only the three literals are accepted.
impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Low" => Ok(Priority::Low),
            "Medium" => Ok(Priority::Medium),
            "High" => Ok(Priority::High),
            other => Err(format!("Unknown priority: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub priority: Priority,
    #[serde(default, with = "empty_as_none")]
    pub due_date: Option<String>, // ISO 8601, usually YYYY-MM-DD
    #[serde(default)]
    pub completed: bool,
    pub created_at: String, // RFC 3339, UTC
    pub updated_at: String,
}

impl Task {
    pub fn is_pending(&self) -> bool {
        !self.completed
    }
}

/// An unvalidated candidate task, as typed into a form or passed on the command line.
/// Priority is kept as raw text so that out-of-range values reach validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskDraft {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<String>,
    pub due_date: Option<String>,
    pub completed: Option<bool>,
}

impl TaskDraft {
    pub fn new(title: impl Into<String>, priority: Priority) -> Self {
        Self {
            title: Some(title.into()),
            priority: Some(priority.as_str().to_string()),
            ..Self::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_due_date(mut self, due_date: impl Into<String>) -> Self {
        self.due_date = Some(due_date.into());
        self
    }

    pub fn with_completed(mut self, completed: bool) -> Self {
        self.completed = Some(completed);
        self
    }

    /// Draft pre-filled with every editable field of an existing task
    pub fn from_task(task: &Task) -> Self {
        Self {
            title: Some(task.title.clone()),
            description: Some(task.description.clone()),
            priority: Some(task.priority.as_str().to_string()),
            due_date: task.due_date.clone(),
            completed: Some(task.completed),
        }
    }
}

/// Light/dark display preference, persisted separately from tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    Light,
    Dark,
}

impl ThemeMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ThemeMode::Light => "light",
            ThemeMode::Dark => "dark",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            ThemeMode::Light => ThemeMode::Dark,
            ThemeMode::Dark => ThemeMode::Light,
        }
    }
}

impl fmt::Display for ThemeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ThemeMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "light" => Ok(ThemeMode::Light),
            "dark" => Ok(ThemeMode::Dark),
            other => Err(format!("Unknown theme: {}", other)),
        }
    }
}

/// Stored due dates use `""` for "no due date"
mod empty_as_none {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Option<String>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(value.as_deref().unwrap_or(""))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        Ok(raw.filter(|s| !s.trim().is_empty()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn priority_parsing_is_exact() {
        assert_eq!("High".parse::<Priority>(), Ok(Priority::High));
        assert!("high".parse::<Priority>().is_err());
        assert!(" Low".parse::<Priority>().is_err());
    }

    #[test]
    fn task_json_uses_stored_field_names() {
        let task = Task {
            id: "1-001".to_string(),
            title: "Buy groceries".to_string(),
            description: String::new(),
            priority: Priority::Low,
            due_date: None,
            completed: true,
            created_at: "2025-11-10T08:00:00.000Z".to_string(),
            updated_at: "2025-11-10T09:00:00.000Z".to_string(),
        };
        let json = serde_json::to_value(&task).unwrap();
        assert_eq!(json["dueDate"], "");
        assert_eq!(json["createdAt"], "2025-11-10T08:00:00.000Z");
        assert_eq!(json["priority"], "Low");

        let back: Task = serde_json::from_value(json).unwrap();
        assert_eq!(back.due_date, None);
    }

    #[test]
    fn missing_optional_fields_get_defaults() {
        let task: Task = serde_json::from_str(
            r#"{"id":"a","title":"T","priority":"High","createdAt":"x","updatedAt":"x"}"#,
        )
        .unwrap();
        assert_eq!(task.description, "");
        assert_eq!(task.due_date, None);
        assert!(!task.completed);
    }
}
