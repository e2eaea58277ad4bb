use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::content::{Document, ExpandedBase64};

/// Which mailbox list a message came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    Received,
    Sent,
}

impl MessageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Received => "received",
            Self::Sent => "sent",
        }
    }

    /// Value of the `mode` parameter when reading one message.
    pub(crate) fn read_mode(&self) -> &'static str {
        match self {
            Self::Received => "destinataire",
            Self::Sent => "expediteur",
        }
    }
}

/// A mailbox entry, without its body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: i64,
    pub kind: MessageKind,
    pub subject: String,
    pub date: Option<NaiveDateTime>,
    pub read: bool,
    pub answered: bool,
    pub transferred: bool,
    pub folder_id: i64,
    pub from: Option<Correspondent>,
    pub to: Vec<Correspondent>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Correspondent {
    pub id: i64,
    pub name: String,
    /// Vendor role code (`P` teacher, `A` staff, `E` student, ...).
    pub role: String,
}

/// A message with its decoded body and attachments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageDetail {
    pub message: Message,
    pub content: ExpandedBase64,
    pub files: Vec<Document>,
}
