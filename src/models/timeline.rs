use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// An entry of the student's activity feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineElement {
    pub date: NaiveDate,
    pub kind: TimelineKind,
    /// Id of the grade, message, absence... this entry points to.
    pub element_id: i64,
    pub title: String,
    pub subtitle: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimelineKind {
    Grade,
    Message,
    Absence,
    Punishment,
    SchoolLife,
    Document,
    Other(String),
}

impl TimelineKind {
    /// Map the vendor's `typeElement`.
    pub fn from_vendor(kind: &str) -> Self {
        match kind {
            "Note" => Self::Grade,
            "Messagerie" => Self::Message,
            "Absence" => Self::Absence,
            "Punition" => Self::Punishment,
            "VieScolaire" => Self::SchoolLife,
            "Document" => Self::Document,
            other => Self::Other(other.to_string()),
        }
    }
}
