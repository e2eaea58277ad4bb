use chrono::NaiveDate;
use futures::future::try_join_all;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use super::Session;
use crate::clean::{
    clean_assignments, clean_grades, clean_message_detail, clean_messages, clean_periods,
    clean_timeline, upcoming_dates, DateInput, Lenient, RawGrades, RawMessage, RawMessages,
    RawTextbookPage, RawTimelineElement,
};
use crate::client::{ApiClient, ApiRequest, ClientError, SessionToken};
use crate::models::{
    AccountInfo, AccountKind, Assignment, ChildProfile, Grade, Message, MessageDetail,
    MessageKind, Period, TimelineElement,
};

/// Which textbook days to fetch.
#[derive(Debug, Clone, Default)]
pub struct HomeworkQuery {
    /// `None` fetches every day that has upcoming homework.
    pub dates: Option<Vec<DateInput>>,
    /// Drop entries that only carry session content.
    pub only_with_work: bool,
}

impl HomeworkQuery {
    pub fn upcoming() -> Self {
        Self::default()
    }

    pub fn on(date: impl Into<DateInput>) -> Self {
        Self {
            dates: Some(vec![date.into()]),
            only_with_work: false,
        }
    }

    pub fn for_dates<I, D>(dates: I) -> Self
    where
        I: IntoIterator<Item = D>,
        D: Into<DateInput>,
    {
        Self {
            dates: Some(dates.into_iter().map(Into::into).collect()),
            only_with_work: false,
        }
    }

    pub fn only_with_work(mut self) -> Self {
        self.only_with_work = true;
        self
    }
}

/// A student account and its typed getters.
#[derive(Debug, Clone)]
pub struct Student {
    client: ApiClient,
    token: SessionToken,
    account: AccountInfo,
}

impl Student {
    /// Act as the session's main account, which must be a student.
    pub fn new(session: &Session) -> Result<Self, ClientError> {
        let account = session.main_account_of(&AccountKind::Student)?;
        Ok(Self {
            client: session.client().clone(),
            token: session.token().clone(),
            account: account.clone(),
        })
    }

    /// A child of a family account, sharing the family's token.
    pub(crate) fn for_child(
        client: ApiClient,
        token: SessionToken,
        parent: &AccountInfo,
        child: &ChildProfile,
    ) -> Self {
        let account = AccountInfo {
            id: child.id,
            kind: AccountKind::Student,
            login: parent.login.clone(),
            first_name: child.first_name.clone(),
            last_name: child.last_name.clone(),
            email: None,
            school_name: parent.school_name.clone(),
            school_year: parent.school_year.clone(),
            is_main: false,
            class: child.class.clone(),
            photo_url: child.photo_url.clone(),
            children: Vec::new(),
            modules: child.modules.clone(),
        };
        Self {
            client,
            token,
            account,
        }
    }

    pub fn id(&self) -> i64 {
        self.account.id
    }

    pub fn account(&self) -> &AccountInfo {
        &self.account
    }

    pub fn token(&self) -> &SessionToken {
        &self.token
    }

    /// One guarded POST for this account, decoding `data` as `T`.
    async fn fetch<T>(&self, path: String, action: &str) -> Result<T, ClientError>
    where
        T: DeserializeOwned + Default,
    {
        let req = ApiRequest::post(path, json!({}))
            .guarded()
            .with_context(json!({ "account_id": self.account.id, "action": action }));
        let Lenient(data) = self.client.request_data(req, Some(&self.token)).await?;
        Ok(data)
    }

    // ============================================================
    // Textbook
    // ============================================================

    /// Homework and session content, ascending by date.
    ///
    /// Dates are validated before any request is sent. Pages are fetched in parallel.
    pub async fn get_homework(&self, query: HomeworkQuery) -> Result<Vec<Assignment>, ClientError> {
        let dates = match query.dates {
            Some(dates) => dates
                .iter()
                .map(DateInput::to_date)
                .collect::<Result<Vec<_>, _>>()?,
            None => self.upcoming_homework_dates().await?,
        };

        let pages = try_join_all(dates.into_iter().map(|date| self.textbook_page(date))).await?;

        let mut assignments: Vec<Assignment> = pages
            .into_iter()
            .flatten()
            .filter(|assignment| !query.only_with_work || assignment.has_work())
            .collect();
        assignments.sort_by_key(|assignment| assignment.date);
        Ok(assignments)
    }

    /// Days that have homework coming up.
    pub async fn upcoming_homework_dates(&self) -> Result<Vec<NaiveDate>, ClientError> {
        let path = format!("/v3/Eleves/{}/cahierdetexte.awp?verbe=get", self.account.id);
        let overview: Value = self.fetch(path, "textbook_overview").await?;
        Ok(upcoming_dates(&overview))
    }

    async fn textbook_page(&self, date: NaiveDate) -> Result<Vec<Assignment>, ClientError> {
        let path = format!(
            "/v3/Eleves/{}/cahierdetexte/{}.awp?verbe=get",
            self.account.id,
            date.format("%Y-%m-%d")
        );
        let page: RawTextbookPage = self.fetch(path, "textbook_page").await?;
        Ok(clean_assignments(page, date))
    }

    // ============================================================
    // Mailbox
    // ============================================================

    /// Every received and sent message, ascending by id.
    pub async fn get_messages(&self) -> Result<Vec<Message>, ClientError> {
        // Sequential: the sent listing needs the token rotated by the received one.
        let received: RawMessages = self
            .fetch(self.mailbox_path(MessageKind::Received), "messages_received")
            .await?;
        let sent: RawMessages = self
            .fetch(self.mailbox_path(MessageKind::Sent), "messages_sent")
            .await?;
        Ok(clean_messages(received.messages.received, sent.messages.sent))
    }

    /// Open one message, decoding its body.
    pub async fn get_message(&self, id: i64, kind: MessageKind) -> Result<MessageDetail, ClientError> {
        let path = format!(
            "/v3/eleves/{}/messages/{}.awp?verbe=get&mode={}",
            self.account.id,
            id,
            kind.read_mode()
        );
        let raw: RawMessage = self.fetch(path, "message").await?;
        Ok(clean_message_detail(raw, kind))
    }

    fn mailbox_path(&self, kind: MessageKind) -> String {
        format!(
            "/v3/eleves/{}/messages.awp?verbe=getall&typeRecuperation={}&orderBy=date&order=desc",
            self.account.id,
            kind.as_str()
        )
    }

    // ============================================================
    // Grades
    // ============================================================

    pub async fn get_grades(&self) -> Result<Vec<Grade>, ClientError> {
        let grades = self.fetch_grades().await?;
        Ok(clean_grades(grades.notes))
    }

    /// Periods with their subjects. Useful to put grades in context; rarely changes.
    pub async fn get_periods(&self) -> Result<Vec<Period>, ClientError> {
        let grades = self.fetch_grades().await?;
        Ok(clean_periods(grades.periodes))
    }

    async fn fetch_grades(&self) -> Result<RawGrades, ClientError> {
        let path = format!("/v3/eleves/{}/notes.awp?verbe=get", self.account.id);
        self.fetch(path, "grades").await
    }

    // ============================================================
    // Timeline & photo
    // ============================================================

    pub async fn timeline(&self) -> Result<Vec<TimelineElement>, ClientError> {
        let path = format!("/v3/eleves/{}/timeline.awp?verbe=get", self.account.id);
        let elements: Vec<RawTimelineElement> = self.fetch(path, "timeline").await?;
        Ok(clean_timeline(elements))
    }

    /// The profile photo, `None` when the account has none or it cannot be downloaded.
    pub async fn get_photo(&self) -> Result<Option<Vec<u8>>, ClientError> {
        match self.account.photo_url.as_deref() {
            Some(url) => self.client.fetch_bytes(url).await,
            None => Ok(None),
        }
    }
}
