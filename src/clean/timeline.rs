use serde::Deserialize;

use super::parse_vendor_date;
use crate::models::{TimelineElement, TimelineKind};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawTimelineElement {
    pub date: String,
    pub type_element: String,
    pub id_element: i64,
    pub titre: String,
    pub soustitre: String,
    pub contenu: String,
}

/// Keeps vendor order (most recent first). Entries without a readable date are dropped.
pub fn clean_timeline(elements: Vec<RawTimelineElement>) -> Vec<TimelineElement> {
    elements
        .into_iter()
        .filter_map(|raw| {
            let Some(date) = parse_vendor_date(&raw.date) else {
                tracing::warn!(id = raw.id_element, date = %raw.date, "Skipping timeline entry with unreadable date");
                return None;
            };
            Some(TimelineElement {
                date,
                kind: TimelineKind::from_vendor(&raw.type_element),
                element_id: raw.id_element,
                title: raw.titre,
                subtitle: raw.soustitre,
                content: raw.contenu,
            })
        })
        .collect()
}
