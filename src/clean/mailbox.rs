use serde::Deserialize;

use super::{clean_documents, expand_base64, lenient, parse_vendor_datetime, RawDocument};
use crate::models::{Correspondent, Message, MessageDetail, MessageKind};

/// `data` of a mailbox listing. Only the list that was asked for is filled.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawMessages {
    #[serde(deserialize_with = "lenient")]
    pub messages: RawMailbox,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawMailbox {
    #[serde(deserialize_with = "lenient")]
    pub received: Vec<RawMessage>,
    #[serde(deserialize_with = "lenient")]
    pub sent: Vec<RawMessage>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawMessage {
    pub id: i64,
    pub mtype: String,
    pub read: bool,
    pub id_dossier: i64,
    pub answered: bool,
    pub transferred: bool,
    pub subject: String,
    #[serde(deserialize_with = "lenient")]
    pub content: String,
    pub date: String,
    #[serde(deserialize_with = "lenient")]
    pub from: Option<RawCorrespondent>,
    #[serde(deserialize_with = "lenient")]
    pub to: Vec<RawCorrespondent>,
    #[serde(deserialize_with = "lenient")]
    pub files: Vec<RawDocument>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawCorrespondent {
    pub id: i64,
    pub name: String,
    pub civilite: String,
    pub prenom: String,
    pub particule: String,
    pub nom: String,
    pub role: String,
}

/// Stitch the received and sent lists into one, ascending by id.
pub fn clean_messages(received: Vec<RawMessage>, sent: Vec<RawMessage>) -> Vec<Message> {
    let received = received
        .into_iter()
        .map(|raw| clean_message(raw, MessageKind::Received));
    let sent = sent.into_iter().map(|raw| clean_message(raw, MessageKind::Sent));

    let mut messages: Vec<Message> = received.chain(sent).collect();
    messages.sort_by_key(|message| message.id);
    messages
}

pub fn clean_message(raw: RawMessage, kind: MessageKind) -> Message {
    Message {
        id: raw.id,
        kind,
        subject: raw.subject.trim().to_string(),
        date: parse_vendor_datetime(&raw.date),
        read: raw.read,
        answered: raw.answered,
        transferred: raw.transferred,
        folder_id: raw.id_dossier,
        from: raw.from.map(clean_correspondent),
        to: raw.to.into_iter().map(clean_correspondent).collect(),
    }
}

/// A single message as returned when it is opened: base64 body and attachments.
pub fn clean_message_detail(mut raw: RawMessage, kind: MessageKind) -> MessageDetail {
    let content = expand_base64(&raw.content);
    let files = clean_documents(std::mem::take(&mut raw.files));
    MessageDetail {
        message: clean_message(raw, kind),
        content,
        files,
    }
}

fn clean_correspondent(raw: RawCorrespondent) -> Correspondent {
    let name = if raw.name.trim().is_empty() {
        [&raw.civilite, &raw.prenom, &raw.particule, &raw.nom]
            .iter()
            .map(|part| part.trim())
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    } else {
        raw.name.trim().to_string()
    };
    Correspondent {
        id: raw.id,
        name,
        role: raw.role,
    }
}
