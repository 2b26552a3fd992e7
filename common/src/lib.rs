//! Types and logic shared by the MailsFlow backend and the browser front end.
//!
//! The most important piece is [`mapping`], the field mapping analyzer that
//! decides whether a template's `{VARIABLE}` placeholders can all be filled
//! from the columns of an uploaded contact file. Both the frontend (to gate the
//! "send campaign" button) and the backend (to refuse a campaign start) call
//! into the same functions, so the two sides always agree.

pub mod jobs;
pub mod mapping;
pub mod model;
pub mod requests;
pub mod session;
