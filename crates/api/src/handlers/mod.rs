//! Request handlers, one module per functional area.

pub mod admin;
pub mod ai;
pub mod attendance;
pub mod auth;
pub mod grades;
pub mod messaging;
pub mod parent;
pub mod report_card;
pub mod schedule;
pub mod submission;
pub mod teacher;
