use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::Value;

use super::{expand_base64, format_bytes, lenient, parse_vendor_date};
use crate::models::{Assignment, Document, Job, SessionContent, Subject};

/// `data` of one textbook day.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawTextbookPage {
    pub date: String,
    #[serde(deserialize_with = "lenient")]
    pub matieres: Vec<RawTextbookEntry>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawTextbookEntry {
    pub id: i64,
    pub matiere: String,
    pub code_matiere: String,
    pub nom_prof: String,
    pub interrogation: bool,
    #[serde(deserialize_with = "lenient")]
    pub a_faire: Option<RawJob>,
    #[serde(deserialize_with = "lenient")]
    pub contenu_de_seance: Option<RawSessionContent>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawJob {
    pub id_devoir: i64,
    pub contenu: String,
    pub donne_le: String,
    pub effectue: bool,
    pub rendre_en_ligne: bool,
    #[serde(deserialize_with = "lenient")]
    pub documents: Vec<RawDocument>,
    #[serde(deserialize_with = "lenient")]
    pub contenu_de_seance: Option<RawSessionContent>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawSessionContent {
    pub contenu: String,
    #[serde(deserialize_with = "lenient")]
    pub documents: Vec<RawDocument>,
}

/// An attachment, as used by the textbook and the mailbox.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawDocument {
    pub id: i64,
    pub libelle: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub taille: u64,
}

/// Days with textbook entries, from the upcoming-homework overview.
///
/// The overview is an object keyed by `YYYY-MM-DD`; keys that are not dates are skipped.
pub fn upcoming_dates(data: &Value) -> Vec<NaiveDate> {
    let Some(days) = data.as_object() else {
        return Vec::new();
    };
    days.keys()
        .filter_map(|key| {
            let date = parse_vendor_date(key);
            if date.is_none() {
                tracing::warn!(key = %key, "Skipping textbook day with unreadable date");
            }
            date
        })
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// One assignment per subject entry of the page.
///
/// `requested` is used when the page does not state its own date.
pub fn clean_assignments(page: RawTextbookPage, requested: NaiveDate) -> Vec<Assignment> {
    let date = parse_vendor_date(&page.date).unwrap_or(requested);
    page.matieres
        .into_iter()
        .map(|entry| clean_entry(entry, date))
        .collect()
}

fn clean_entry(entry: RawTextbookEntry, date: NaiveDate) -> Assignment {
    let mut session = entry.contenu_de_seance;
    let job = entry.a_faire.map(|mut raw| {
        // Session content sits inside `aFaire` when there is homework.
        if session.is_none() {
            session = raw.contenu_de_seance.take();
        }
        clean_job(raw)
    });

    Assignment {
        id: job.as_ref().map_or(entry.id, |job| job.id),
        date,
        subject: Subject {
            code: entry.code_matiere,
            name: entry.matiere,
        },
        teacher: entry.nom_prof.trim().to_string(),
        test: entry.interrogation,
        job,
        session_content: session.and_then(clean_session_content),
    }
}

fn clean_job(raw: RawJob) -> Job {
    Job {
        id: raw.id_devoir,
        content: expand_base64(&raw.contenu),
        given_on: parse_vendor_date(&raw.donne_le),
        done: raw.effectue,
        to_upload: raw.rendre_en_ligne,
        documents: clean_documents(raw.documents),
    }
}

/// `None` when the lesson has neither text nor attachments.
fn clean_session_content(raw: RawSessionContent) -> Option<SessionContent> {
    let content = expand_base64(&raw.contenu);
    if content.is_empty() && raw.documents.is_empty() {
        return None;
    }
    Some(SessionContent {
        content,
        documents: clean_documents(raw.documents),
    })
}

pub fn clean_documents(documents: Vec<RawDocument>) -> Vec<Document> {
    documents
        .into_iter()
        .map(|raw| Document {
            id: raw.id,
            name: raw.libelle,
            kind: raw.kind,
            size: raw.taille,
            size_label: format_bytes(raw.taille),
        })
        .collect()
}
