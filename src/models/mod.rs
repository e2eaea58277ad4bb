//! Domain records produced by the cleaners.
//!
//! # Core Concepts
//!
//! ## Accounts
//!
//! - [`AccountInfo`]: One login identity (student, family, teacher, staff) with its
//!   [`AccountKind`] fixed at login.
//! - [`ChildProfile`]: A student reachable through a family account.
//!
//! ## Records
//!
//! Plain values with no lifecycle once returned:
//!
//! - [`Assignment`]: One subject entry of the textbook for a day, with optional
//!   homework ([`Job`]) and session content.
//! - [`Grade`] and [`Period`]: Marks, and the period/subject hierarchy they belong to,
//!   flattened.
//! - [`Message`]: Received and sent mail, stitched into one list.
//! - [`TimelineElement`]: Entries of the student's activity feed.
//!
//! Rich text fields arrive base64-encoded HTML and are exposed as
//! [`ExpandedBase64`] (original, decoded HTML, plain text).

mod account;
mod content;
mod grade;
mod homework;
mod message;
mod period;
mod timeline;

pub use account::*;
pub use content::*;
pub use grade::*;
pub use homework::*;
pub use message::*;
pub use period::*;
pub use timeline::*;
