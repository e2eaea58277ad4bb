use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::content::{Document, ExpandedBase64};

/// One subject entry of the textbook for a given day.
///
/// An assignment without a [`Job`] only carries what was done in class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    pub id: i64,
    /// The day the entry is due (for homework) or took place (for session content).
    pub date: NaiveDate,
    pub subject: Subject,
    pub teacher: String,
    /// The entry announces a test.
    pub test: bool,
    pub job: Option<Job>,
    pub session_content: Option<SessionContent>,
}

impl Assignment {
    pub fn has_work(&self) -> bool {
        self.job.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    pub code: String,
    pub name: String,
}

/// Homework to hand in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: i64,
    pub content: ExpandedBase64,
    pub given_on: Option<NaiveDate>,
    pub done: bool,
    /// Must be handed in through the website.
    pub to_upload: bool,
    pub documents: Vec<Document>,
}

/// What was covered during the lesson.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionContent {
    pub content: ExpandedBase64,
    pub documents: Vec<Document>,
}
