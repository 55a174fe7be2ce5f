use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct TaskId(pub String);

impl Default for TaskId {
    fn default() -> Self { Self(Uuid::new_v4().simple().to_string()) }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

impl From<&str> for TaskId {
    fn from(s: &str) -> Self { Self(s.to_string()) }
}

/// Task priority. Values outside low/medium/high survive a load/save cycle
/// untouched and rank below every known priority.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Other(String),
}

impl Priority {
    /// Strict, case-insensitive parse used for user input.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Other(s) => s,
        }
    }

    /// Higher ranks are shown first when sorting by priority.
    pub fn rank(&self) -> u8 {
        match self {
            Self::High => 3,
            Self::Medium => 2,
            Self::Low => 1,
            Self::Other(_) => 0,
        }
    }

    pub fn label(&self) -> String {
        let s = self.as_str();
        let mut chars = s.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }
}

impl From<String> for Priority {
    fn from(s: String) -> Self {
        match s.as_str() {
            "low" => Self::Low,
            "medium" => Self::Medium,
            "high" => Self::High,
            _ => Self::Other(s),
        }
    }
}

impl From<Priority> for String {
    fn from(p: Priority) -> Self {
        match p {
            Priority::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub description: String,
    #[serde(default)]
    pub due_date: Option<String>,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub completed: bool,
    /// Milliseconds since the Unix epoch.
    pub created_at: i64,
}

impl Task {
    pub fn new(title: String, description: String, due_date: Option<String>, priority: Priority) -> Self {
        Self {
            id: TaskId::default(),
            title,
            description,
            due_date,
            priority,
            completed: false,
            created_at: Utc::now().timestamp_millis(),
        }
    }

    pub fn due_date(&self) -> Option<NaiveDate> { self.due_date.as_deref().and_then(parse_due_date) }

    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        !self.completed && self.due_date().is_some_and(|due| due < today)
    }

    pub fn status_label(&self) -> &'static str { if self.completed { "Completed" } else { "Pending" } }
}

fn null_as_empty<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(d)?.unwrap_or_default())
}

fn parse_due_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|d| d.date_naive()))
}

pub fn format_due_date(due: Option<&str>) -> String {
    match due.filter(|s| !s.is_empty()) {
        None => "No due date".to_string(),
        Some(s) => match parse_due_date(s) {
            Some(d) => d.format("%d %b %Y").to_string(),
            None => "Invalid date".to_string(),
        },
    }
}

#[derive(Debug, Clone)]
pub struct CreateTask {
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<String>,
    pub priority: Option<String>,
}

/// Replacement values for an existing task. A missing or blank title aborts
/// the whole edit; for the other fields `None` keeps the current value.
#[derive(Debug, Clone, Default)]
pub struct EditTask {
    pub title: Option<String>,
    pub description: Option<String>,
    pub due_date: Option<String>,
    pub priority: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation { Accepted, Declined }

impl From<bool> for Confirmation {
    fn from(accepted: bool) -> Self { if accepted { Self::Accepted } else { Self::Declined } }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub fn as_str(self) -> &'static str { match self { Self::Dark => "dark", Self::Light => "light" } }
    pub fn label(self) -> &'static str { match self { Self::Dark => "Dark", Self::Light => "Light" } }
    pub fn toggled(self) -> Self { match self { Self::Dark => Self::Light, Self::Light => Self::Dark } }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_priority_survives_round_trip() {
        let json = r#"{"id":"a1","title":"T","description":null,"dueDate":null,"priority":"urgent","completed":false,"createdAt":5}"#;
        let task: Task = serde_json::from_str(json).unwrap();
        assert_eq!(task.priority, Priority::Other("urgent".into()));
        assert_eq!(task.description, "");
        let back = serde_json::to_value(&task).unwrap();
        assert_eq!(back["priority"], "urgent");
        assert_eq!(back["dueDate"], serde_json::Value::Null);
        assert_eq!(back["createdAt"], 5);
    }

    #[test]
    fn due_date_labels() {
        assert_eq!(format_due_date(None), "No due date");
        assert_eq!(format_due_date(Some("")), "No due date");
        assert_eq!(format_due_date(Some("soon")), "Invalid date");
        assert_eq!(format_due_date(Some("2024-05-01")), "01 May 2024");
    }

    #[test]
    fn overdue_only_when_pending_and_past() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let mut t = Task::new("x".into(), String::new(), Some("2024-05-31".into()), Priority::Low);
        assert!(t.is_overdue(today));
        t.completed = true;
        assert!(!t.is_overdue(today));
        t.completed = false;
        t.due_date = Some("2024-06-01".into());
        assert!(!t.is_overdue(today));
    }

    #[test]
    fn priority_parse_and_label() {
        assert_eq!(Priority::parse(" HIGH "), Some(Priority::High));
        assert_eq!(Priority::parse("urgent"), None);
        assert_eq!(Priority::High.label(), "High");
        assert_eq!(Priority::Other("urgent".into()).label(), "Urgent");
    }
}
