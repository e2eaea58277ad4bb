use serde::{Deserialize, Serialize};

/// The kind of login, from the vendor's `typeCompte` code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountKind {
    Student,
    Family,
    Teacher,
    Staff,
    /// Unknown code, kept verbatim.
    Other(String),
}

impl AccountKind {
    pub fn from_code(code: &str) -> Self {
        match code {
            "E" => Self::Student,
            "1" => Self::Family,
            "P" => Self::Teacher,
            "A" => Self::Staff,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Student => "student",
            Self::Family => "family",
            Self::Teacher => "teacher",
            Self::Staff => "staff",
            Self::Other(code) => code,
        }
    }
}

/// One identity returned by the login call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountInfo {
    pub id: i64,
    pub kind: AccountKind,
    pub login: String,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub school_name: Option<String>,
    /// e.g. `2020-2021`
    pub school_year: Option<String>,
    /// The account the session acts as by default.
    pub is_main: bool,
    pub class: Option<ClassInfo>,
    pub photo_url: Option<String>,
    /// Only populated for family accounts.
    pub children: Vec<ChildProfile>,
    /// Vendor features enabled for this account (`NOTES`, `CAHIER_DE_TEXTES`, ...).
    pub modules: Vec<String>,
}

impl AccountInfo {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn has_module(&self, code: &str) -> bool {
        self.modules.iter().any(|m| m == code)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassInfo {
    pub id: i64,
    pub code: String,
    pub name: String,
}

/// A student listed under a family account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChildProfile {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub class: Option<ClassInfo>,
    pub photo_url: Option<String>,
    pub modules: Vec<String>,
}
