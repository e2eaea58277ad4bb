use serde_json::json;

use crate::clean::{clean_accounts, main_account, Lenient, RawLogin};
use crate::client::{ApiClient, ApiRequest, ClientError, SessionToken};
use crate::models::{AccountInfo, AccountKind};

const LOGIN_PATH: &str = "/v3/login.awp";

/// An authenticated connection: the client, the rotating token and the accounts
/// the credentials give access to.
#[derive(Debug, Clone)]
pub struct Session {
    client: ApiClient,
    token: SessionToken,
    accounts: Vec<AccountInfo>,
}

impl Session {
    /// Authenticate with the vendor.
    ///
    /// Bad credentials surface as [`ClientError::Api`] with the vendor's code and message.
    pub async fn login(
        client: ApiClient,
        username: &str,
        password: &str,
    ) -> Result<Self, ClientError> {
        let token = SessionToken::default();
        let req = ApiRequest::post(
            LOGIN_PATH,
            json!({
                "identifiant": username,
                "motdepasse": password,
                "isRelogin": false,
                "uuid": "",
            }),
        )
        .guarded()
        .with_context(json!({ "action": "login", "username": username }));

        let Lenient(login): Lenient<RawLogin> = client.request_data(req, Some(&token)).await?;
        if token.is_empty() {
            return Err(ClientError::Account(
                "login succeeded without a session token".to_string(),
            ));
        }

        let accounts = clean_accounts(login.accounts);
        tracing::info!(accounts = accounts.len(), "Logged in as {}", username);

        Ok(Self {
            client,
            token,
            accounts,
        })
    }

    /// Resume from a token and account list obtained earlier.
    pub fn from_parts(client: ApiClient, token: SessionToken, accounts: Vec<AccountInfo>) -> Self {
        Self {
            client,
            token,
            accounts,
        }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub fn token(&self) -> &SessionToken {
        &self.token
    }

    pub fn accounts(&self) -> &[AccountInfo] {
        &self.accounts
    }

    pub fn main_account(&self) -> Option<&AccountInfo> {
        main_account(&self.accounts)
    }

    /// The main account, which must be of `kind`, with a usable token.
    pub(crate) fn main_account_of(
        &self,
        kind: &AccountKind,
    ) -> Result<&AccountInfo, ClientError> {
        let account = self
            .main_account()
            .ok_or_else(|| ClientError::Account("session has no account".to_string()))?;
        if &account.kind != kind {
            return Err(ClientError::Account(format!(
                "main account is a {} account, expected {}",
                account.kind.as_str(),
                kind.as_str()
            )));
        }
        if self.token.is_empty() {
            return Err(ClientError::Account("session has no token".to_string()));
        }
        Ok(account)
    }
}
