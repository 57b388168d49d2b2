//! End-to-end flows against a real PostgreSQL database (with pgvector).
//!
//! Run with `DATABASE_URL` set and `cargo test -- --ignored`.

mod common;

use axum::http::StatusCode;
use common::{
    assert_error, body_json, body_text, build_test_app, build_test_app_with_storage, get,
    get_auth, post_json, post_json_auth, post_multipart, token_for, MultipartForm,
};
use educ_api::auth::password::hash_password;
use educ_core::audit::ENTITY_ATTENDANCE;
use educ_core::roles::Role;
use educ_core::types::DbId;
use educ_db::repositories::{AuditLogRepo, GradeRepo, RoleRepo};
use serde_json::json;
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

async fn etablissement(pool: &PgPool, code: &str) -> DbId {
    sqlx::query_scalar("INSERT INTO etablissements (name, code) VALUES ($1, $1) RETURNING id")
        .bind(code)
        .fetch_one(pool)
        .await
        .unwrap()
}

async fn profile(pool: &PgPool, email: &str) -> DbId {
    sqlx::query_scalar(
        "INSERT INTO profiles (email, password_hash, full_name) VALUES ($1, 'x', $1) RETURNING id",
    )
    .bind(email)
    .fetch_one(pool)
    .await
    .unwrap()
}

async fn grant(pool: &PgPool, user_id: DbId, role: Role, etab: Option<DbId>) {
    RoleRepo::assign(pool, user_id, role, etab).await.unwrap();
}

async fn class(pool: &PgPool, etab: DbId, name: &str) -> DbId {
    sqlx::query_scalar("INSERT INTO classes (etablissement_id, name) VALUES ($1, $2) RETURNING id")
        .bind(etab)
        .bind(name)
        .fetch_one(pool)
        .await
        .unwrap()
}

async fn subject(pool: &PgPool, etab: DbId, name: &str) -> DbId {
    sqlx::query_scalar(
        "INSERT INTO matieres (etablissement_id, name, coefficient) VALUES ($1, $2, 2) RETURNING id",
    )
    .bind(etab)
    .bind(name)
    .fetch_one(pool)
    .await
    .unwrap()
}

async fn student(pool: &PgPool, etab: DbId, classe_id: DbId, email: &str) -> DbId {
    let profile_id = profile(pool, email).await;
    grant(pool, profile_id, Role::Student, Some(etab)).await;
    sqlx::query_scalar(
        "INSERT INTO students (profile_id, etablissement_id, classe_id) VALUES ($1, $2, $3) RETURNING id",
    )
    .bind(profile_id)
    .bind(etab)
    .bind(classe_id)
    .fetch_one(pool)
    .await
    .unwrap()
}

async fn assign_teacher(
    pool: &PgPool,
    teacher: DbId,
    classe_id: DbId,
    matiere_id: DbId,
    etab: DbId,
) {
    sqlx::query(
        "INSERT INTO teacher_assignments (teacher_id, classe_id, matiere_id, etablissement_id) \
         VALUES ($1, $2, $3, $4)",
    )
    .bind(teacher)
    .bind(classe_id)
    .bind(matiere_id)
    .bind(etab)
    .execute(pool)
    .await
    .unwrap();
}

/// One establishment with a class, a subject, two students, an assigned
/// teacher and a school administrator.
struct School {
    etab: DbId,
    classe_id: DbId,
    matiere_id: DbId,
    students: [DbId; 2],
    teacher: DbId,
    admin: DbId,
}

async fn school(pool: &PgPool, code: &str) -> School {
    let etab = etablissement(pool, code).await;
    let classe_id = class(pool, etab, "3e A").await;
    let matiere_id = subject(pool, etab, "Mathematiques").await;
    let students = [
        student(pool, etab, classe_id, &format!("eleve1@{code}.ci")).await,
        student(pool, etab, classe_id, &format!("eleve2@{code}.ci")).await,
    ];

    let teacher = profile(pool, &format!("prof@{code}.ci")).await;
    grant(pool, teacher, Role::Teacher, Some(etab)).await;
    assign_teacher(pool, teacher, classe_id, matiere_id, etab).await;

    let admin = profile(pool, &format!("admin@{code}.ci")).await;
    grant(pool, admin, Role::SchoolAdmin, Some(etab)).await;

    School {
        etab,
        classe_id,
        matiere_id,
        students,
        teacher,
        admin,
    }
}

// ---------------------------------------------------------------------------
// Authentication
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires a PostgreSQL DATABASE_URL"]
async fn login_returns_token_and_roles(pool: PgPool) {
    let s = school(&pool, "lyc-login").await;
    let hash = hash_password("motdepasse").unwrap();
    sqlx::query("UPDATE profiles SET password_hash = $1 WHERE id = $2")
        .bind(&hash)
        .bind(s.teacher)
        .execute(&pool)
        .await
        .unwrap();
    let app = build_test_app(pool);

    let body = json!({ "email": "prof@lyc-login.ci", "password": "motdepasse" });
    let response = post_json(app.clone(), "/api/v1/auth/login", body).await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["token_type"], "Bearer");
    assert_eq!(json["user"]["id"], s.teacher);
    assert_eq!(json["user"]["roles"], json!(["TEACHER"]));

    let wrong = json!({ "email": "prof@lyc-login.ci", "password": "autre" });
    let response = post_json(app, "/api/v1/auth/login", wrong).await;
    assert_error(response, StatusCode::UNAUTHORIZED, "UNAUTHORIZED").await;
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires a PostgreSQL DATABASE_URL"]
async fn deactivated_account_is_rejected(pool: PgPool) {
    let s = school(&pool, "lyc-off").await;
    sqlx::query("UPDATE profiles SET is_active = false WHERE id = $1")
        .bind(s.teacher)
        .execute(&pool)
        .await
        .unwrap();
    let app = build_test_app(pool);

    let response = get_auth(app, "/api/v1/auth/me", &token_for(s.teacher)).await;

    assert_error(response, StatusCode::UNAUTHORIZED, "UNAUTHORIZED").await;
}

// ---------------------------------------------------------------------------
// Administration
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires a PostgreSQL DATABASE_URL"]
async fn admin_dashboard_is_scoped_to_own_establishment(pool: PgPool) {
    let a = school(&pool, "lyc-a").await;
    let b = school(&pool, "lyc-b").await;
    let app = build_test_app(pool);
    let token = token_for(a.admin);

    let own = get_auth(
        app.clone(),
        &format!("/api/v1/admin-dashboard?etablissement_id={}", a.etab),
        &token,
    )
    .await;
    assert_eq!(own.status(), StatusCode::OK);
    let json = body_json(own).await;
    assert_eq!(json["studentsCount"], 2);
    assert_eq!(json["attendanceRate"], 100.0);

    let other = get_auth(
        app,
        &format!("/api/v1/admin-dashboard?etablissement_id={}", b.etab),
        &token,
    )
    .await;
    assert_error(other, StatusCode::FORBIDDEN, "FORBIDDEN").await;
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires a PostgreSQL DATABASE_URL"]
async fn teacher_cannot_open_admin_dashboard(pool: PgPool) {
    let s = school(&pool, "lyc-rbac").await;
    let app = build_test_app(pool);

    let response = get_auth(app, "/api/v1/admin-dashboard", &token_for(s.teacher)).await;

    assert_error(response, StatusCode::FORBIDDEN, "FORBIDDEN").await;
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires a PostgreSQL DATABASE_URL"]
async fn invalid_decision_leaves_record_untouched(pool: PgPool) {
    let s = school(&pool, "lyc-dec").await;
    let attendance_id: DbId = sqlx::query_scalar(
        "INSERT INTO attendance (student_id, etablissement_id, date, status, reason) \
         VALUES ($1, $2, CURRENT_DATE, 'ABSENT', 'malade') RETURNING id",
    )
    .bind(s.students[0])
    .bind(s.etab)
    .fetch_one(&pool)
    .await
    .unwrap();
    let app = build_test_app(pool.clone());
    let token = token_for(s.admin);

    let bad = json!({ "attendance_id": attendance_id, "decision": "MAYBE" });
    let response =
        post_json_auth(app.clone(), "/api/v1/admin-attendance-decide", bad, &token).await;
    assert_error(response, StatusCode::BAD_REQUEST, "VALIDATION_ERROR").await;

    let decision: String = sqlx::query_scalar("SELECT decision FROM attendance WHERE id = $1")
        .bind(attendance_id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(decision, "PENDING");

    let good = json!({ "attendance_id": attendance_id, "decision": "VALIDE" });
    let response = post_json_auth(app, "/api/v1/admin-attendance-decide", good, &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["attendance"]["decision"], "APPROVED");

    let entries = AuditLogRepo::list_for_entity(&pool, ENTITY_ATTENDANCE, attendance_id)
        .await
        .unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].actor_id, Some(s.admin));
    assert_eq!(entries[0].before_json.as_ref().unwrap()["decision"], "PENDING");
}

// ---------------------------------------------------------------------------
// Grades
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires a PostgreSQL DATABASE_URL"]
async fn duplicate_rows_keep_the_last_score(pool: PgPool) {
    let s = school(&pool, "lyc-dup").await;
    let app = build_test_app(pool.clone());

    let body = json!({
        "matiere_id": s.matiere_id,
        "classe_id": s.classe_id,
        "period": "T1",
        "rows": [
            { "student_id": s.students[0], "score": 8 },
            { "student_id": s.students[1], "score": 14 },
            { "student_id": s.students[0], "score": 12.5 },
        ],
    });
    let response =
        post_json_auth(app, "/api/v1/grades-bulk-upsert", body, &token_for(s.teacher)).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["count"], 2);

    let score: f64 = sqlx::query_scalar(
        "SELECT score FROM grades WHERE student_id = $1 AND matiere_id = $2 AND period = 'T1'",
    )
    .bind(s.students[0])
    .bind(s.matiere_id)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(score, 12.5);
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires a PostgreSQL DATABASE_URL"]
async fn locked_period_rejects_grade_entry(pool: PgPool) {
    let s = school(&pool, "lyc-lock").await;
    let app = build_test_app(pool.clone());

    let lock = json!({ "etablissement_id": s.etab, "period": "T2" });
    let response = post_json_auth(
        app.clone(),
        "/api/v1/admin-grades-lock-period",
        lock,
        &token_for(s.admin),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let period = GradeRepo::find_period(&pool, s.etab, "T2").await.unwrap().unwrap();
    assert!(period.locked);
    assert_eq!(period.locked_by, Some(s.admin));

    let body = json!({
        "matiere_id": s.matiere_id,
        "classe_id": s.classe_id,
        "period": "T2",
        "rows": [{ "student_id": s.students[0], "score": 15 }],
    });
    let response =
        post_json_auth(app, "/api/v1/grades-bulk-upsert", body, &token_for(s.teacher)).await;

    assert_error(response, StatusCode::CONFLICT, "CONFLICT").await;
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires a PostgreSQL DATABASE_URL"]
async fn teacher_cannot_grade_another_class(pool: PgPool) {
    let s = school(&pool, "lyc-cls").await;
    let other_class = class(&pool, s.etab, "4e B").await;
    let app = build_test_app(pool);

    let body = json!({
        "matiere_id": s.matiere_id,
        "classe_id": other_class,
        "period": "T1",
        "rows": [{ "student_id": s.students[0], "score": 10 }],
    });
    let response =
        post_json_auth(app, "/api/v1/grades-bulk-upsert", body, &token_for(s.teacher)).await;

    assert_error(response, StatusCode::FORBIDDEN, "FORBIDDEN").await;
}

// ---------------------------------------------------------------------------
// Parents and timetable
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires a PostgreSQL DATABASE_URL"]
async fn parent_dashboard_requires_relationship(pool: PgPool) {
    let s = school(&pool, "lyc-par").await;
    let parent = profile(&pool, "parent@lyc-par.ci").await;
    grant(&pool, parent, Role::Parent, Some(s.etab)).await;
    sqlx::query("INSERT INTO parent_students (parent_id, student_id) VALUES ($1, $2)")
        .bind(parent)
        .bind(s.students[0])
        .execute(&pool)
        .await
        .unwrap();
    let app = build_test_app(pool);
    let token = token_for(parent);

    let own = post_json_auth(
        app.clone(),
        "/api/v1/parent-dashboard",
        json!({ "child_id": s.students[0] }),
        &token,
    )
    .await;
    assert_eq!(own.status(), StatusCode::OK);
    let json = body_json(own).await;
    assert_eq!(json["attendanceRate"], 100.0);
    assert_eq!(json["pendingJustifications"], 0);

    let other = post_json_auth(
        app,
        "/api/v1/parent-dashboard",
        json!({ "child_id": s.students[1] }),
        &token,
    )
    .await;
    assert_error(other, StatusCode::FORBIDDEN, "FORBIDDEN").await;
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires a PostgreSQL DATABASE_URL"]
async fn schedule_export_without_slots_is_an_empty_calendar(pool: PgPool) {
    let s = school(&pool, "lyc-ics").await;
    let app = build_test_app(pool);

    let response = get_auth(app, "/api/v1/export-schedule-ics", &token_for(s.teacher)).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()["content-type"],
        "text/calendar; charset=utf-8"
    );
    let body = body_text(response).await;
    assert!(body.starts_with("BEGIN:VCALENDAR"));
    assert!(!body.contains("BEGIN:VEVENT"));
}

// ---------------------------------------------------------------------------
// Justifications
// ---------------------------------------------------------------------------

async fn record(
    pool: &PgPool,
    s: &School,
    student_id: DbId,
    status: &str,
    days_ago: i32,
) -> DbId {
    sqlx::query_scalar(
        "INSERT INTO attendance (student_id, etablissement_id, date, status) \
         VALUES ($1, $2, CURRENT_DATE - $3::int, $4) RETURNING id",
    )
    .bind(student_id)
    .bind(s.etab)
    .bind(days_ago)
    .bind(status)
    .fetch_one(pool)
    .await
    .unwrap()
}

async fn profile_of(pool: &PgPool, student_id: DbId) -> DbId {
    sqlx::query_scalar("SELECT profile_id FROM students WHERE id = $1")
        .bind(student_id)
        .fetch_one(pool)
        .await
        .unwrap()
}

/// Every file under `dir`, recursively.
fn stored_files(dir: &std::path::Path) -> Vec<std::path::PathBuf> {
    let mut files = Vec::new();
    let Ok(entries) = std::fs::read_dir(dir) else {
        return files;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            files.extend(stored_files(&path));
        } else {
            files.push(path);
        }
    }
    files
}

const JUSTIFY: &str = "/api/v1/attendance-justify";

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires a PostgreSQL DATABASE_URL"]
async fn attachment_is_only_readable_by_related_users(pool: PgPool) {
    let s = school(&pool, "lyc-pj").await;
    let absence = record(&pool, &s, s.students[0], "ABSENT", 1).await;
    let owner = profile_of(&pool, s.students[0]).await;
    let classmate = profile_of(&pool, s.students[1]).await;
    let other_etab = etablissement(&pool, "lyc-pj-autre").await;
    let other_admin = profile(&pool, "admin@lyc-pj-autre.ci").await;
    grant(&pool, other_admin, Role::SchoolAdmin, Some(other_etab)).await;

    let storage = tempfile::tempdir().unwrap();
    let app = build_test_app_with_storage(pool.clone(), storage.path().to_str().unwrap());

    let form = MultipartForm::default()
        .text("attendance_id", &absence.to_string())
        .text("reason", "Consultation")
        .file("certificat.pdf", b"medical secret");
    let response = post_multipart(app.clone(), JUSTIFY, form, Some(&token_for(owner))).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let key = json["data"]["justification_url"].as_str().unwrap().to_string();
    assert!(key.starts_with(&format!("justifications/{absence}-")));
    assert_eq!(std::fs::read(storage.path().join(&key)).unwrap(), b"medical secret");

    let uri = format!("/api/v1/justifications/{absence}/file");

    let anonymous = get(app.clone(), &uri).await;
    assert_error(anonymous, StatusCode::UNAUTHORIZED, "UNAUTHORIZED").await;

    let foreign = get_auth(app.clone(), &uri, &token_for(other_admin)).await;
    assert_error(foreign, StatusCode::FORBIDDEN, "FORBIDDEN").await;

    let peer = get_auth(app.clone(), &uri, &token_for(classmate)).await;
    assert_error(peer, StatusCode::FORBIDDEN, "FORBIDDEN").await;

    for reader in [owner, s.teacher, s.admin] {
        let response = get_auth(app.clone(), &uri, &token_for(reader)).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["content-type"], "application/pdf");
        assert_eq!(body_text(response).await, "medical secret");
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires a PostgreSQL DATABASE_URL"]
async fn download_without_attachment_returns_404(pool: PgPool) {
    let s = school(&pool, "lyc-pj0").await;
    let absence = record(&pool, &s, s.students[0], "ABSENT", 1).await;
    let app = build_test_app(pool);

    let uri = format!("/api/v1/justifications/{absence}/file");
    let response = get_auth(app.clone(), &uri, &token_for(s.admin)).await;
    assert_error(response, StatusCode::NOT_FOUND, "NOT_FOUND").await;

    let response =
        get_auth(app, "/api/v1/justifications/999999/file", &token_for(s.admin)).await;
    assert_error(response, StatusCode::NOT_FOUND, "NOT_FOUND").await;
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires a PostgreSQL DATABASE_URL"]
async fn justifying_someone_else_is_forbidden_and_stores_nothing(pool: PgPool) {
    let s = school(&pool, "lyc-pj1").await;
    let absence = record(&pool, &s, s.students[0], "ABSENT", 1).await;
    let classmate = profile_of(&pool, s.students[1]).await;
    let storage = tempfile::tempdir().unwrap();
    let app = build_test_app_with_storage(pool.clone(), storage.path().to_str().unwrap());

    let form = MultipartForm::default()
        .text("attendance_id", &absence.to_string())
        .file("faux.pdf", b"forged");
    let response = post_multipart(app.clone(), JUSTIFY, form, Some(&token_for(classmate))).await;
    assert_error(response, StatusCode::FORBIDDEN, "FORBIDDEN").await;

    // Staff cannot use the family endpoint either.
    let form = MultipartForm::default()
        .text("attendance_id", &absence.to_string())
        .text("reason", "Excuse");
    let response = post_multipart(app, JUSTIFY, form, Some(&token_for(s.teacher))).await;
    assert_error(response, StatusCode::FORBIDDEN, "FORBIDDEN").await;

    assert!(stored_files(storage.path()).is_empty());
    let (reason, url): (Option<String>, Option<String>) =
        sqlx::query_as("SELECT reason, justification_url FROM attendance WHERE id = $1")
            .bind(absence)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!((reason, url), (None, None));
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires a PostgreSQL DATABASE_URL"]
async fn justification_needs_reason_or_attachment(pool: PgPool) {
    let s = school(&pool, "lyc-pj2").await;
    let absence = record(&pool, &s, s.students[0], "LATE", 1).await;
    let owner = profile_of(&pool, s.students[0]).await;
    let app = build_test_app(pool);

    let form = MultipartForm::default()
        .text("attendance_id", &absence.to_string())
        .text("reason", "   ");
    let response = post_multipart(app.clone(), JUSTIFY, form, Some(&token_for(owner))).await;
    assert_error(response, StatusCode::BAD_REQUEST, "VALIDATION_ERROR").await;

    let form = MultipartForm::default()
        .text("attendance_id", &absence.to_string())
        .text("reason", "Bus en retard");
    let response = post_multipart(app, JUSTIFY, form, Some(&token_for(owner))).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["reason"], "Bus en retard");
    assert!(json["data"]["justification_url"].is_null());
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires a PostgreSQL DATABASE_URL"]
async fn invalid_justification_forms_store_nothing(pool: PgPool) {
    let s = school(&pool, "lyc-pj3").await;
    let absence = record(&pool, &s, s.students[0], "ABSENT", 1).await;
    let present = record(&pool, &s, s.students[0], "PRESENT", 2).await;
    let token = token_for(profile_of(&pool, s.students[0]).await);
    let storage = tempfile::tempdir().unwrap();
    let app = build_test_app_with_storage(pool.clone(), storage.path().to_str().unwrap());
    let id = absence.to_string();

    let oversized = vec![0u8; 5 * 1024 * 1024 + 1];
    let forms = [
        MultipartForm::default()
            .text("attendance_id", &id)
            .file("scan.pdf", &oversized),
        MultipartForm::default()
            .text("attendance_id", &id)
            .file("scan.exe", b"MZ"),
        MultipartForm::default()
            .text("attendance_id", &id)
            .text("reason", &"x".repeat(1001)),
        MultipartForm::default()
            .text("attendance_id", &present.to_string())
            .file("scan.pdf", b"%PDF"),
        MultipartForm::default().text("reason", "Sans identifiant"),
    ];
    for form in forms {
        let response = post_multipart(app.clone(), JUSTIFY, form, Some(&token)).await;
        assert_error(response, StatusCode::BAD_REQUEST, "VALIDATION_ERROR").await;
    }

    assert!(stored_files(storage.path()).is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires a PostgreSQL DATABASE_URL"]
async fn failed_update_removes_the_new_attachment(pool: PgPool) {
    let s = school(&pool, "lyc-pj4").await;
    let absence = record(&pool, &s, s.students[0], "ABSENT", 1).await;
    let token = token_for(profile_of(&pool, s.students[0]).await);
    sqlx::query(
        "CREATE FUNCTION refuse_attendance_update() RETURNS trigger AS $$ \
         BEGIN RAISE EXCEPTION 'attendance is read-only'; END $$ LANGUAGE plpgsql",
    )
    .execute(&pool)
    .await
    .unwrap();
    sqlx::query(
        "CREATE TRIGGER attendance_read_only BEFORE UPDATE ON attendance \
         FOR EACH ROW EXECUTE FUNCTION refuse_attendance_update()",
    )
    .execute(&pool)
    .await
    .unwrap();
    let storage = tempfile::tempdir().unwrap();
    let app = build_test_app_with_storage(pool, storage.path().to_str().unwrap());

    let form = MultipartForm::default()
        .text("attendance_id", &absence.to_string())
        .file("certificat.png", b"png-bytes");
    let response = post_multipart(app, JUSTIFY, form, Some(&token)).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(stored_files(storage.path()).is_empty());
}
