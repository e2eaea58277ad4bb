use super::{Session, Student};
use crate::client::{ApiClient, ClientError, SessionToken};
use crate::models::{AccountInfo, AccountKind, ChildProfile};

/// A parent account. Data is fetched through the [`Student`] handle of each child.
#[derive(Debug, Clone)]
pub struct Family {
    client: ApiClient,
    token: SessionToken,
    account: AccountInfo,
}

impl Family {
    /// Act as the session's main account, which must be a family account.
    pub fn new(session: &Session) -> Result<Self, ClientError> {
        let account = session.main_account_of(&AccountKind::Family)?;
        Ok(Self {
            client: session.client().clone(),
            token: session.token().clone(),
            account: account.clone(),
        })
    }

    pub fn account(&self) -> &AccountInfo {
        &self.account
    }

    pub fn children(&self) -> &[ChildProfile] {
        &self.account.children
    }

    /// Handle for one child. The handle shares this account's token.
    pub fn student(&self, id: i64) -> Result<Student, ClientError> {
        self.children()
            .iter()
            .find(|child| child.id == id)
            .map(|child| self.child_handle(child))
            .ok_or_else(|| ClientError::Account(format!("no child with id {}", id)))
    }

    pub fn students(&self) -> Vec<Student> {
        self.children()
            .iter()
            .map(|child| self.child_handle(child))
            .collect()
    }

    fn child_handle(&self, child: &ChildProfile) -> Student {
        Student::for_child(self.client.clone(), self.token.clone(), &self.account, child)
    }
}
