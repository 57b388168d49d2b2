//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument. Establishment scoping is passed
//! in explicitly; `None` means unscoped (system administrators only).

pub mod analytics_event_repo;
pub mod attendance_repo;
pub mod audit_repo;
pub mod class_repo;
pub mod dashboard_repo;
pub mod grade_repo;
pub mod library_repo;
pub mod message_repo;
pub mod profile_repo;
pub mod qcm_repo;
pub mod relationship_repo;
pub mod report_card_repo;
pub mod role_repo;
pub mod schedule_repo;
pub mod student_repo;
pub mod submission_repo;

pub use analytics_event_repo::AnalyticsEventRepo;
pub use attendance_repo::AttendanceRepo;
pub use audit_repo::AuditLogRepo;
pub use class_repo::{ClassRepo, MatiereRepo};
pub use dashboard_repo::DashboardRepo;
pub use grade_repo::{GradeRepo, GradeUpsertOutcome, PeriodLockOutcome};
pub use library_repo::LibraryRepo;
pub use message_repo::MessageRepo;
pub use profile_repo::ProfileRepo;
pub use qcm_repo::QcmRepo;
pub use relationship_repo::RelationshipRepo;
pub use report_card_repo::ReportCardRepo;
pub use role_repo::RoleRepo;
pub use schedule_repo::ScheduleRepo;
pub use student_repo::StudentRepo;
pub use submission_repo::SubmissionRepo;
