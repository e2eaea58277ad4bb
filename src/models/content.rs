use serde::{Deserialize, Serialize};

/// A base64-encoded HTML field, decoded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpandedBase64 {
    /// As received.
    pub original: String,
    pub html: String,
    /// `html` rendered to plain text without word wrapping.
    pub text: String,
}

impl ExpandedBase64 {
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// A file attached to homework, session content or a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: i64,
    pub name: String,
    /// Vendor file category (`FICHIER_CDT`, `PIECE_JOINTE`, ...).
    pub kind: String,
    pub size: u64,
    /// `size` in human-readable form, e.g. `1.50 MB`.
    pub size_label: String,
}
