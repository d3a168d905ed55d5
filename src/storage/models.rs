use chrono::{DateTime, NaiveDate, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::collections::BTreeMap;

/// A case record that lives in one namespace and belongs to one applicant.
pub trait Record: Serialize + DeserializeOwned {
    const NAMESPACE: &'static str;

    fn id(&self) -> &str;
    fn owner_id(&self) -> &str;
}

/// Known annotation kinds attached to tasks and interactions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Annotation {
    Priority { level: Priority },
    Tag { label: String },
    Reminder { on: NaiveDate },
    Link { label: String, url: String },
    Assignee { name: String },
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Normal,
    High,
    Urgent,
}

/// Value allowed in the open `extensions` map: JSON without surprises.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum ExtensionValue {
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
    List(Vec<ExtensionValue>),
    Map(BTreeMap<String, ExtensionValue>),
}

pub type Extensions = BTreeMap<String, ExtensionValue>;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Todo,
    InProgress,
    Done,
}

/// Entry of an applicant's journal: something the office has to do.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct JournalTask {
    pub id: String,
    pub owner_id: String,
    pub title: String,
    pub status: TaskStatus,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub annotations: Vec<Annotation>,
    #[serde(default)]
    pub extensions: Extensions,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum InteractionKind {
    Appel,
    Email,
    Entretien,
    Visite,
    Courrier,
    Note,
}

/// Something that happened with an applicant: a call, a visit, a note.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Interaction {
    pub id: String,
    pub owner_id: String,
    pub kind: InteractionKind,
    pub summary: String,
    pub occurred_at: DateTime<Utc>,
    #[serde(default)]
    pub annotations: Vec<Annotation>,
    #[serde(default)]
    pub extensions: Extensions,
}

impl JournalTask {
    pub fn new(id: &str, owner_id: &str, title: &str) -> Self {
        let now = Utc::now();
        Self {
            id: id.to_string(),
            owner_id: owner_id.to_string(),
            title: title.to_string(),
            status: TaskStatus::Todo,
            due_date: None,
            created_at: now,
            updated_at: now,
            annotations: Vec::new(),
            extensions: Extensions::new(),
        }
    }

    pub fn set_status(&mut self, status: TaskStatus) {
        self.status = status;
        self.updated_at = Utc::now();
    }

    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.status != TaskStatus::Done && self.due_date.map(|due| due < today).unwrap_or(false)
    }

    pub fn priority(&self) -> Option<Priority> {
        self.annotations.iter().find_map(|a| match a {
            Annotation::Priority { level } => Some(*level),
            _ => None,
        })
    }
}

impl Interaction {
    pub fn new(id: &str, owner_id: &str, kind: InteractionKind, summary: &str) -> Self {
        Self {
            id: id.to_string(),
            owner_id: owner_id.to_string(),
            kind,
            summary: summary.to_string(),
            occurred_at: Utc::now(),
            annotations: Vec::new(),
            extensions: Extensions::new(),
        }
    }
}

impl Record for JournalTask {
    const NAMESPACE: &'static str = "journal";

    fn id(&self) -> &str {
        &self.id
    }

    fn owner_id(&self) -> &str {
        &self.owner_id
    }
}

impl Record for Interaction {
    const NAMESPACE: &'static str = "interactions";

    fn id(&self) -> &str {
        &self.id
    }

    fn owner_id(&self) -> &str {
        &self.owner_id
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskStatus::Todo => write!(f, "Todo"),
            TaskStatus::InProgress => write!(f, "InProgress"),
            TaskStatus::Done => write!(f, "Done"),
        }
    }
}

impl std::str::FromStr for InteractionKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match crate::roles::normalize(Some(s)).as_str() {
            "appel" | "call" => Ok(InteractionKind::Appel),
            "email" | "e mail" | "mail" => Ok(InteractionKind::Email),
            "entretien" | "meeting" => Ok(InteractionKind::Entretien),
            "visite" | "visit" => Ok(InteractionKind::Visite),
            "courrier" | "letter" => Ok(InteractionKind::Courrier),
            "note" => Ok(InteractionKind::Note),
            other => Err(format!("unknown interaction kind: {}", other)),
        }
    }
}

impl std::str::FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "normal" => Ok(Priority::Normal),
            "high" => Ok(Priority::High),
            "urgent" => Ok(Priority::Urgent),
            other => Err(format!("unknown priority: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_annotation_wire_format() {
        let json = serde_json::to_value(Annotation::Priority { level: Priority::High }).unwrap();
        assert_eq!(json, serde_json::json!({ "kind": "priority", "level": "high" }));

        let parsed: Annotation =
            serde_json::from_str(r#"{ "kind": "reminder", "on": "2025-03-01" }"#).unwrap();
        assert_eq!(parsed, Annotation::Reminder { on: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap() });
    }

    #[test]
    fn test_unknown_annotation_kind_is_rejected() {
        let parsed = serde_json::from_str::<Annotation>(r#"{ "kind": "color", "value": "red" }"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_extension_values() {
        let extensions: Extensions = serde_json::from_str(
            r#"{ "dossier": "LLM-2024-118", "pieces": 3, "urgent": true, "contacts": ["AS", null],
                 "meta": { "source": "guichet" } }"#,
        )
        .unwrap();

        assert_eq!(extensions["dossier"], ExtensionValue::Text("LLM-2024-118".to_string()));
        assert_eq!(extensions["pieces"], ExtensionValue::Number(3.0));
        assert_eq!(extensions["urgent"], ExtensionValue::Bool(true));
        assert_eq!(
            extensions["contacts"],
            ExtensionValue::List(vec![ExtensionValue::Text("AS".to_string()), ExtensionValue::Null])
        );
        assert!(matches!(extensions["meta"], ExtensionValue::Map(_)));
    }

    #[test]
    fn test_task_lifecycle() {
        let mut task = JournalTask::new("t-1", "U-1", "Relancer la gérance");
        task.due_date = NaiveDate::from_ymd_opt(2025, 1, 10);
        let today = NaiveDate::from_ymd_opt(2025, 1, 11).unwrap();

        assert!(task.is_overdue(today));
        task.set_status(TaskStatus::Done);
        assert_eq!(task.status, TaskStatus::Done);
        assert!(!task.is_overdue(today));
        assert!(task.updated_at >= task.created_at);
    }

    #[test]
    fn test_task_priority() {
        let mut task = JournalTask::new("t-2", "U-1", "Recours");
        assert_eq!(task.priority(), None);
        task.annotations.push(Annotation::Tag { label: "recours".to_string() });
        task.annotations.push(Annotation::Priority { level: Priority::Urgent });
        assert_eq!(task.priority(), Some(Priority::Urgent));
    }

    #[test]
    fn test_parse_interaction_kind() {
        assert_eq!("Appel".parse::<InteractionKind>(), Ok(InteractionKind::Appel));
        assert_eq!("e-mail".parse::<InteractionKind>(), Ok(InteractionKind::Email));
        assert!("pigeon".parse::<InteractionKind>().is_err());
    }
}
