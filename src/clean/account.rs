use serde::Deserialize;

use super::{lenient, non_empty};
use crate::models::{AccountInfo, AccountKind, ChildProfile, ClassInfo};

/// `data` of the login response.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawLogin {
    #[serde(deserialize_with = "lenient")]
    pub accounts: Vec<RawAccount>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawAccount {
    pub id: i64,
    pub type_compte: String,
    pub identifiant: String,
    pub prenom: String,
    pub nom: String,
    pub email: String,
    pub nom_etablissement: String,
    pub annee_scolaire_courante: String,
    pub main: bool,
    #[serde(deserialize_with = "lenient")]
    pub profile: RawProfile,
    #[serde(deserialize_with = "lenient")]
    pub modules: Vec<RawModule>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawProfile {
    #[serde(deserialize_with = "lenient")]
    pub classe: Option<RawClass>,
    pub photo: String,
    #[serde(deserialize_with = "lenient")]
    pub eleves: Vec<RawChild>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawClass {
    pub id: i64,
    pub code: String,
    pub libelle: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawChild {
    pub id: i64,
    pub prenom: String,
    pub nom: String,
    #[serde(deserialize_with = "lenient")]
    pub classe: Option<RawClass>,
    pub photo: String,
    #[serde(deserialize_with = "lenient")]
    pub modules: Vec<RawModule>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawModule {
    pub code: String,
    pub enable: bool,
}

pub fn clean_accounts(accounts: Vec<RawAccount>) -> Vec<AccountInfo> {
    accounts.into_iter().map(clean_account).collect()
}

pub fn clean_account(raw: RawAccount) -> AccountInfo {
    AccountInfo {
        id: raw.id,
        kind: AccountKind::from_code(&raw.type_compte),
        login: raw.identifiant,
        first_name: raw.prenom,
        last_name: raw.nom,
        email: non_empty(raw.email),
        school_name: non_empty(raw.nom_etablissement),
        school_year: non_empty(raw.annee_scolaire_courante),
        is_main: raw.main,
        class: raw.profile.classe.map(clean_class),
        photo_url: non_empty(raw.profile.photo),
        children: raw.profile.eleves.into_iter().map(clean_child).collect(),
        modules: enabled_modules(raw.modules),
    }
}

/// The account flagged `main`, else the first one.
pub fn main_account(accounts: &[AccountInfo]) -> Option<&AccountInfo> {
    accounts
        .iter()
        .find(|account| account.is_main)
        .or_else(|| accounts.first())
}

fn clean_child(raw: RawChild) -> ChildProfile {
    ChildProfile {
        id: raw.id,
        first_name: raw.prenom,
        last_name: raw.nom,
        class: raw.classe.map(clean_class),
        photo_url: non_empty(raw.photo),
        modules: enabled_modules(raw.modules),
    }
}

fn clean_class(raw: RawClass) -> ClassInfo {
    ClassInfo {
        id: raw.id,
        code: raw.code,
        name: raw.libelle,
    }
}

fn enabled_modules(modules: Vec<RawModule>) -> Vec<String> {
    modules
        .into_iter()
        .filter(|module| module.enable)
        .map(|module| module.code)
        .collect()
}
