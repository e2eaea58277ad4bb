use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// A grading period (term, semester, or the whole year) with its subjects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Period {
    pub id: String,
    pub code: String,
    pub name: String,
    /// Covers the whole school year.
    pub yearly: bool,
    pub mock_exam: bool,
    pub closed: bool,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub council: Option<NaiveDateTime>,
    pub averages: Averages,
    pub computed_at: Option<NaiveDateTime>,
    pub head_teacher: Option<String>,
    pub head_teacher_comment: Option<String>,
    /// Subjects, subject groups and sub-subjects, flattened in vendor order.
    pub subjects: Vec<PeriodSubject>,
}

impl Period {
    /// Top-level subjects, excluding groups and sub-subjects.
    pub fn main_subjects(&self) -> impl Iterator<Item = &PeriodSubject> {
        self.subjects
            .iter()
            .filter(|s| !s.is_group && s.sub_subject_code.is_none())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Averages {
    pub student: Option<f64>,
    pub class: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

/// One row of a period's subject table.
///
/// The vendor nests subjects under groups and sub-subjects under subjects by
/// reference; here each row records its own position instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodSubject {
    pub id: i64,
    pub code: String,
    pub name: String,
    /// Set on sub-subject rows; `code` then names the parent subject.
    pub sub_subject_code: Option<String>,
    /// A heading row grouping several subjects.
    pub is_group: bool,
    /// The group this row belongs to (`0` when none).
    pub group_id: i64,
    pub optional: bool,
    pub coefficient: Option<f64>,
    pub averages: Averages,
    pub rank: Option<u32>,
    pub headcount: Option<u32>,
    pub teachers: Vec<String>,
    pub comments: Vec<String>,
}
