use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A single mark.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grade {
    pub id: i64,
    /// Name of the test.
    pub name: String,
    /// Code of the [`Period`](super::Period) the mark counts for.
    pub period_code: String,
    pub subject_code: String,
    pub subject_name: String,
    pub sub_subject_code: Option<String>,
    /// Vendor test category (`Devoir sur table`, `Interrogation orale`, ...).
    pub kind: String,
    pub value: GradeValue,
    pub out_of: Option<f64>,
    pub coefficient: Option<f64>,
    /// False when the mark does not count towards averages.
    pub significant: bool,
    pub date: Option<NaiveDate>,
    pub entered_on: Option<NaiveDate>,
    pub class_average: Option<f64>,
    pub class_min: Option<f64>,
    pub class_max: Option<f64>,
    pub comment: Option<String>,
    pub skills: Vec<Skill>,
}

/// A mark is usually numeric, but the vendor also uses letters and codes such as `Abs`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum GradeValue {
    Number(f64),
    Text(String),
}

impl GradeValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(_) => None,
        }
    }
}

/// A curriculum skill evaluated alongside the mark.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Skill {
    pub id: i64,
    pub name: String,
    pub description: String,
    /// Acquisition level, `1` (not acquired) to `4` (exceeded); `None` when not assessed.
    pub level: Option<u8>,
}
