//! Domain logic for the Educ-CI backend.
//!
//! This crate has no I/O: it holds the shared types, the role model and
//! authorization policy, and the pure computations (averages, attendance
//! rates, calendar export, QCM and RAG helpers) used by the API layer.

pub mod access;
pub mod attendance;
pub mod audit;
pub mod batch;
pub mod calendar;
pub mod error;
pub mod grading;
pub mod qcm;
pub mod rag;
pub mod roles;
pub mod types;
