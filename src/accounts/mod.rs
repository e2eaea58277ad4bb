//! Logged-in session and the account handles built from it.
//!
//! A [`Session`] owns the [`SessionToken`](crate::SessionToken) returned at login.
//! [`Student`] and [`Family`] handles clone it, so every getter on any handle sends the
//! freshest token and stores the rotated one back for the others.

mod family;
mod session;
mod student;

pub use family::Family;
pub use session::Session;
pub use student::{HomeworkQuery, Student};
