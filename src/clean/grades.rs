use serde::Deserialize;
use serde_json::Value;

use super::{lenient, non_empty, number, parse_vendor_date, parse_vendor_datetime, truthy};
use crate::models::{Averages, Grade, GradeValue, Period, PeriodSubject, Skill};

/// `data` of the grades endpoint: marks and the period/subject table.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawGrades {
    #[serde(deserialize_with = "lenient")]
    pub periodes: Vec<RawPeriod>,
    #[serde(deserialize_with = "lenient")]
    pub notes: Vec<RawGrade>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawGrade {
    pub id: i64,
    pub devoir: String,
    pub code_periode: String,
    pub code_matiere: String,
    pub libelle_matiere: String,
    pub code_sous_matiere: String,
    pub type_devoir: String,
    pub en_lettre: bool,
    #[serde(deserialize_with = "lenient")]
    pub commentaire: String,
    pub coef: Value,
    pub note_sur: Value,
    pub valeur: Value,
    pub non_significatif: bool,
    pub date: String,
    pub date_saisie: String,
    pub moyenne_classe: Value,
    pub min_classe: Value,
    pub max_classe: Value,
    #[serde(deserialize_with = "lenient")]
    pub elements_programme: Vec<RawSkill>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawSkill {
    pub id_elem_prog: i64,
    pub libelle_competence: String,
    pub descriptif: String,
    pub valeur: Value,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawPeriod {
    pub id_periode: String,
    pub code_periode: String,
    pub periode: String,
    pub annuel: bool,
    pub examen_blanc: bool,
    pub cloture: bool,
    pub date_debut: String,
    pub date_fin: String,
    pub date_conseil: String,
    pub heure_conseil: String,
    #[serde(deserialize_with = "lenient")]
    pub ensemble_matieres: RawSubjectTable,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawSubjectTable {
    pub date_calcul: String,
    pub moyenne_generale: Value,
    pub moyenne_classe: Value,
    pub moyenne_min: Value,
    pub moyenne_max: Value,
    #[serde(rename = "nomPP")]
    pub nom_pp: String,
    #[serde(rename = "appreciationPP", deserialize_with = "lenient")]
    pub appreciation_pp: String,
    #[serde(deserialize_with = "lenient")]
    pub disciplines: Vec<RawDiscipline>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawDiscipline {
    pub id: i64,
    pub code_matiere: String,
    pub code_sous_matiere: String,
    pub discipline: String,
    pub moyenne: Value,
    pub moyenne_classe: Value,
    pub moyenne_min: Value,
    pub moyenne_max: Value,
    pub coef: Value,
    pub effectif: Value,
    pub rang: Value,
    pub groupe_matiere: bool,
    pub id_groupe_matiere: i64,
    pub option: Value,
    pub sous_matiere: bool,
    #[serde(deserialize_with = "lenient")]
    pub professeurs: Vec<RawTeacher>,
    #[serde(deserialize_with = "lenient")]
    pub appreciations: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawTeacher {
    pub nom: String,
}

pub fn clean_grades(grades: Vec<RawGrade>) -> Vec<Grade> {
    grades.into_iter().map(clean_grade).collect()
}

fn clean_grade(raw: RawGrade) -> Grade {
    Grade {
        id: raw.id,
        name: raw.devoir.trim().to_string(),
        period_code: raw.code_periode,
        subject_code: raw.code_matiere,
        subject_name: raw.libelle_matiere,
        sub_subject_code: non_empty(raw.code_sous_matiere),
        kind: raw.type_devoir,
        value: grade_value(&raw.valeur, raw.en_lettre),
        out_of: number(&raw.note_sur),
        coefficient: number(&raw.coef),
        significant: !raw.non_significatif,
        date: parse_vendor_date(&raw.date),
        entered_on: parse_vendor_date(&raw.date_saisie),
        class_average: number(&raw.moyenne_classe),
        class_min: number(&raw.min_classe),
        class_max: number(&raw.max_classe),
        comment: non_empty(raw.commentaire),
        skills: raw.elements_programme.into_iter().map(clean_skill).collect(),
    }
}

/// Letter marks stay text even when they look numeric.
fn grade_value(value: &Value, letter: bool) -> GradeValue {
    match number(value) {
        Some(n) if !letter => GradeValue::Number(n),
        _ => GradeValue::Text(match value {
            Value::String(s) => s.trim().to_string(),
            Value::Null => String::new(),
            other => other.to_string(),
        }),
    }
}

fn clean_skill(raw: RawSkill) -> Skill {
    Skill {
        id: raw.id_elem_prog,
        name: raw.libelle_competence,
        description: raw.descriptif,
        level: number(&raw.valeur)
            .filter(|level| (1.0..=4.0).contains(level))
            .map(|level| level as u8),
    }
}

pub fn clean_periods(periods: Vec<RawPeriod>) -> Vec<Period> {
    periods.into_iter().map(clean_period).collect()
}

fn clean_period(raw: RawPeriod) -> Period {
    let table = raw.ensemble_matieres;
    let council = parse_vendor_datetime(&format!("{} {}", raw.date_conseil, raw.heure_conseil))
        .or_else(|| parse_vendor_datetime(&raw.date_conseil));

    Period {
        id: raw.id_periode,
        code: raw.code_periode,
        name: raw.periode,
        yearly: raw.annuel,
        mock_exam: raw.examen_blanc,
        closed: raw.cloture,
        start: parse_vendor_date(&raw.date_debut),
        end: parse_vendor_date(&raw.date_fin),
        council,
        averages: Averages {
            student: number(&table.moyenne_generale),
            class: number(&table.moyenne_classe),
            min: number(&table.moyenne_min),
            max: number(&table.moyenne_max),
        },
        computed_at: parse_vendor_datetime(&table.date_calcul),
        head_teacher: non_empty(table.nom_pp),
        head_teacher_comment: non_empty(table.appreciation_pp),
        subjects: table.disciplines.into_iter().map(clean_discipline).collect(),
    }
}

fn clean_discipline(raw: RawDiscipline) -> PeriodSubject {
    let sub_subject_code = if raw.sous_matiere {
        non_empty(raw.code_sous_matiere)
    } else {
        None
    };
    PeriodSubject {
        id: raw.id,
        code: raw.code_matiere,
        name: raw.discipline,
        sub_subject_code,
        is_group: raw.groupe_matiere,
        group_id: raw.id_groupe_matiere,
        optional: truthy(&raw.option),
        coefficient: number(&raw.coef),
        averages: Averages {
            student: number(&raw.moyenne),
            class: number(&raw.moyenne_classe),
            min: number(&raw.moyenne_min),
            max: number(&raw.moyenne_max),
        },
        rank: number(&raw.rang).map(|rank| rank as u32),
        headcount: number(&raw.effectif).map(|count| count as u32),
        teachers: raw
            .professeurs
            .into_iter()
            .map(|teacher| teacher.nom.trim().to_string())
            .filter(|name| !name.is_empty())
            .collect(),
        comments: raw
            .appreciations
            .into_iter()
            .filter_map(non_empty)
            .collect(),
    }
}
