//! Row structs and DTOs.
//!
//! Each submodule holds the `FromRow` + `Serialize` entity matching a table
//! row and, where the table is written to, the input struct for that write.

pub mod analytics_event;
pub mod attendance;
pub mod audit;
pub mod grade;
pub mod library;
pub mod message;
pub mod profile;
pub mod qcm;
pub mod role;
pub mod schedule;
pub mod school;
pub mod submission;
