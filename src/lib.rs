//! Client library for the EcoleDirecte school-management API.
//!
//! The crate has three layers:
//!
//! - [`client`]: the shared request helper. Every call goes through
//!   [`ApiClient::request`], which injects the vendor headers, form-encodes the
//!   payload, detects the `{code, message}` failure envelope, rotates the
//!   session token and emits [`ApiEvent`]s for listeners.
//! - [`clean`]: pure functions that reshape raw vendor JSON into the typed
//!   records of [`models`].
//! - [`accounts`]: [`Session`] (login) and the account handles ([`Student`],
//!   [`Family`]) exposing typed getters.
//!
//! ```no_run
//! use ecoledirecte::{ApiClient, ClientConfig, HomeworkQuery, Session, Student};
//!
//! # async fn run() -> Result<(), ecoledirecte::ClientError> {
//! let client = ApiClient::new(ClientConfig::from_env());
//! let session = Session::login(client, "username", "password").await?;
//! let student = Student::new(&session)?;
//!
//! let grades = student.get_grades().await?;
//! let homework = student.get_homework(HomeworkQuery::upcoming()).await?;
//! println!("{} grades, {} assignments", grades.len(), homework.len());
//! # Ok(())
//! # }
//! ```

pub mod accounts;
pub mod clean;
pub mod client;
pub mod models;

pub use accounts::{Family, HomeworkQuery, Session, Student};
pub use client::events::{ApiEvent, RequestEvent, ResponseEvent};
pub use client::{ApiClient, ApiFailure, ApiRequest, ClientConfig, ClientError, SessionToken};
