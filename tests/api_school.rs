//! Integration tests per la vita scolastica
//!
//! Test per:
//! - /api/sessions e registrazione presenze in blocco
//! - /api/attendance
//! - /api/grades e /api/students/{id}/grades

mod common;

#[cfg(test)]
mod school_tests {
    use super::common::*;
    use axum_test::http::StatusCode;
    use serde_json::json;
    use sqlx::SqlitePool;

    // ============================================================
    // /api/sessions
    // ============================================================

    #[sqlx::test(fixtures(path = "../fixtures", scripts("accounts", "classes", "school")))]
    async fn test_list_sessions_filters(pool: SqlitePool) -> sqlx::Result<()> {
        let state = create_test_state(pool);
        let server = create_test_server(state.clone());

        let page: serde_json::Value = server
            .get("/api/sessions?classe_id=1")
            .add_header(authorization(), bearer(STUDENT))
            .await
            .json();
        assert_eq!(page["total"], 1);
        assert_eq!(page["data"][0]["kind"], "lecture");

        let page: serde_json::Value = server
            .get("/api/sessions?kind=exam")
            .add_header(authorization(), bearer(STUDENT))
            .await
            .json();
        assert_eq!(page["total"], 1);
        assert_eq!(page["data"][0]["session_id"], 2);

        let page: serde_json::Value = server
            .get("/api/sessions?from=2024-09-03T00:00:00Z")
            .add_header(authorization(), bearer(STUDENT))
            .await
            .json();
        assert_eq!(page["total"], 1);

        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("accounts", "classes")))]
    async fn test_teacher_creates_own_session(pool: SqlitePool) -> sqlx::Result<()> {
        let state = create_test_state(pool);
        let server = create_test_server(state.clone());

        let response = server
            .post("/api/sessions")
            .add_header(authorization(), bearer(TEACHER))
            .json(&json!({
                "classe_id": 2,
                "subject": "Physique",
                "kind": "lecture",
                "starts_at": "2024-09-05T08:00:00Z",
                "ends_at": "2024-09-05T09:00:00Z"
            }))
            .await;

        response.assert_status(StatusCode::CREATED);
        let session: serde_json::Value = response.json();
        assert_eq!(session["teacher_id"], 1);

        // non a nome di un collega
        server
            .post("/api/sessions")
            .add_header(authorization(), bearer(TEACHER))
            .json(&json!({
                "classe_id": 2,
                "teacher_id": 2,
                "subject": "Histoire",
                "kind": "lecture",
                "starts_at": "2024-09-05T10:00:00Z",
                "ends_at": "2024-09-05T11:00:00Z"
            }))
            .await
            .assert_status_forbidden();

        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("accounts", "classes")))]
    async fn test_create_session_invalid_window(pool: SqlitePool) -> sqlx::Result<()> {
        let state = create_test_state(pool);
        let server = create_test_server(state.clone());

        server
            .post("/api/sessions")
            .add_header(authorization(), bearer(ADMIN))
            .json(&json!({
                "classe_id": 1,
                "subject": "Maths",
                "kind": "exam",
                "starts_at": "2024-09-05T10:00:00Z",
                "ends_at": "2024-09-05T09:00:00Z"
            }))
            .await
            .assert_status_bad_request();

        server
            .post("/api/sessions")
            .add_header(authorization(), bearer(ADMIN))
            .json(&json!({
                "classe_id": 99,
                "subject": "Maths",
                "kind": "exam",
                "starts_at": "2024-09-05T08:00:00Z",
                "ends_at": "2024-09-05T09:00:00Z"
            }))
            .await
            .assert_status_not_found();

        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("accounts", "classes", "school")))]
    async fn test_update_and_delete_session_ownership(pool: SqlitePool) -> sqlx::Result<()> {
        let state = create_test_state(pool);
        let server = create_test_server(state.clone());

        server
            .patch("/api/sessions/2")
            .add_header(authorization(), bearer(TEACHER))
            .json(&json!({ "room": "C01" }))
            .await
            .assert_status_forbidden();

        let session: serde_json::Value = server
            .patch("/api/sessions/1")
            .add_header(authorization(), bearer(TEACHER))
            .json(&json!({ "room": "C01" }))
            .await
            .json();
        assert_eq!(session["room"], "C01");
        assert_eq!(session["subject"], "Physique");

        server
            .delete("/api/sessions/2")
            .add_header(authorization(), bearer(ADMIN))
            .await
            .assert_status(StatusCode::NO_CONTENT);

        server
            .get("/api/sessions/2")
            .add_header(authorization(), bearer(ADMIN))
            .await
            .assert_status_not_found();

        Ok(())
    }

    // ============================================================
    // POST /api/sessions/{id}/attendance - record_attendance
    // ============================================================

    #[sqlx::test(fixtures(path = "../fixtures", scripts("accounts", "classes", "school")))]
    async fn test_record_attendance_partial_success(pool: SqlitePool) -> sqlx::Result<()> {
        let state = create_test_state(pool);
        let server = create_test_server(state.clone());

        let response = server
            .post("/api/sessions/1/attendance")
            .add_header(authorization(), bearer(TEACHER))
            .json(&json!([
                { "student_id": 1, "status": "late", "comment": "Bus en retard" },
                { "student_id": 2, "status": "present" },
                { "student_id": 99, "status": "present" }
            ]))
            .await;

        response.assert_status_ok();
        let result: serde_json::Value = response.json();
        let recorded = result["recorded"].as_array().unwrap();
        let errors = result["errors"].as_array().unwrap();
        assert_eq!(recorded.len(), 1);
        assert_eq!(recorded[0]["status"], "late");
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0]["student_id"], 2);
        assert_eq!(errors[0]["error"], "Student is not enrolled in the session's class");
        assert_eq!(errors[1]["error"], "Unknown student");

        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("accounts", "classes", "school")))]
    async fn test_record_attendance_upserts(pool: SqlitePool) -> sqlx::Result<()> {
        let state = create_test_state(pool.clone());
        let server = create_test_server(state.clone());

        // lo studente 3 era assente: la riga viene aggiornata, non duplicata
        server
            .post("/api/sessions/1/attendance")
            .add_header(authorization(), bearer(TEACHER))
            .json(&json!([{ "student_id": 3, "status": "excused" }]))
            .await
            .assert_status_ok();

        let rows: serde_json::Value = server
            .get("/api/sessions/1/attendance")
            .add_header(authorization(), bearer(TEACHER))
            .await
            .json();
        let rows = rows.as_array().unwrap();
        assert_eq!(rows.len(), 2);
        let hugo = rows.iter().find(|r| r["student_id"] == 3).unwrap();
        assert_eq!(hugo["status"], "excused");

        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("accounts", "classes", "school")))]
    async fn test_absence_notifies_parent(pool: SqlitePool) -> sqlx::Result<()> {
        let state = create_test_state(pool);
        let server = create_test_server(state.clone());

        server
            .post("/api/sessions/1/attendance")
            .add_header(authorization(), bearer(ADMIN))
            .json(&json!([
                { "student_id": 1, "status": "absent" },
                { "student_id": 3, "status": "present" }
            ]))
            .await
            .assert_status_ok();

        let page: serde_json::Value = server
            .get("/api/notifications")
            .add_header(authorization(), bearer(PARENT))
            .await
            .json();
        assert_eq!(page["total"], 1);
        assert_eq!(page["data"][0]["kind"], "attendance");
        assert_eq!(page["data"][0]["recipient"], json!({ "type": "parent", "id": 1 }));

        // il genitore di uno studente presente non riceve nulla
        let page: serde_json::Value = server
            .get("/api/notifications")
            .add_header(authorization(), bearer(OTHER_PARENT))
            .await
            .json();
        assert_eq!(page["total"], 0);

        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("accounts", "classes", "school")))]
    async fn test_record_attendance_storage_failure_keeps_batch(pool: SqlitePool) -> sqlx::Result<()> {
        // le scritture sullo studente 3 falliscono a livello di database
        for event in ["INSERT", "UPDATE"] {
            sqlx::query(&format!(
                "CREATE TRIGGER lock_student_3_{event} BEFORE {event} ON attendances \
                 WHEN NEW.student_id = 3 BEGIN SELECT RAISE(ABORT, 'locked'); END"
            ))
            .execute(&pool)
            .await?;
        }
        let state = create_test_state(pool.clone());
        let server = create_test_server(state.clone());

        let response = server
            .post("/api/sessions/1/attendance")
            .add_header(authorization(), bearer(TEACHER))
            .json(&json!([
                { "student_id": 3, "status": "absent" },
                { "student_id": 1, "status": "present" }
            ]))
            .await;

        response.assert_status_ok();
        let result: serde_json::Value = response.json();
        let recorded = result["recorded"].as_array().unwrap();
        let errors = result["errors"].as_array().unwrap();
        assert_eq!(recorded.len(), 1);
        assert_eq!(recorded[0]["student_id"], 1);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0]["student_id"], 3);
        assert_eq!(errors[0]["error"], "Could not record attendance");

        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("accounts", "classes", "school")))]
    async fn test_attendance_kept_when_parent_notification_fails(
        pool: SqlitePool,
    ) -> sqlx::Result<()> {
        sqlx::query(
            "CREATE TRIGGER reject_notifications BEFORE INSERT ON notifications \
             BEGIN SELECT RAISE(ABORT, 'unavailable'); END",
        )
        .execute(&pool)
        .await?;
        let state = create_test_state(pool.clone());
        let server = create_test_server(state.clone());

        let response = server
            .post("/api/sessions/1/attendance")
            .add_header(authorization(), bearer(TEACHER))
            .json(&json!([{ "student_id": 1, "status": "absent" }]))
            .await;

        response.assert_status_ok();
        let result: serde_json::Value = response.json();
        assert_eq!(result["recorded"].as_array().unwrap().len(), 1);
        assert_eq!(result["errors"].as_array().unwrap().len(), 0);

        let status: String = sqlx::query_scalar(
            "SELECT status FROM attendances WHERE session_id = 1 AND student_id = 1",
        )
        .fetch_one(&pool)
        .await?;
        assert_eq!(status, "absent");

        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("accounts", "classes", "school")))]
    async fn test_record_attendance_other_teacher(pool: SqlitePool) -> sqlx::Result<()> {
        let state = create_test_state(pool);
        let server = create_test_server(state.clone());

        server
            .post("/api/sessions/1/attendance")
            .add_header(authorization(), bearer(OTHER_TEACHER))
            .json(&json!([{ "student_id": 1, "status": "present" }]))
            .await
            .assert_status_forbidden();

        Ok(())
    }

    // ============================================================
    // GET /api/attendance
    // ============================================================

    #[sqlx::test(fixtures(path = "../fixtures", scripts("accounts", "classes", "school")))]
    async fn test_attendance_visibility(pool: SqlitePool) -> sqlx::Result<()> {
        let state = create_test_state(pool);
        let server = create_test_server(state.clone());

        let page: serde_json::Value = server
            .get("/api/attendance")
            .add_header(authorization(), bearer(TEACHER))
            .await
            .json();
        assert_eq!(page["total"], 2);

        let page: serde_json::Value = server
            .get("/api/attendance?status=absent")
            .add_header(authorization(), bearer(ADMIN))
            .await
            .json();
        assert_eq!(page["total"], 1);
        assert_eq!(page["data"][0]["student_id"], 3);

        // il genitore 1 vede solo i propri figli (1 e 2)
        let page: serde_json::Value = server
            .get("/api/attendance")
            .add_header(authorization(), bearer(PARENT))
            .await
            .json();
        assert_eq!(page["total"], 1);
        assert_eq!(page["data"][0]["student_id"], 1);

        // chiedere lo studente di un altro non allarga la visibilità
        let page: serde_json::Value = server
            .get("/api/attendance?student_id=3")
            .add_header(authorization(), bearer(STUDENT))
            .await
            .json();
        assert_eq!(page["total"], 0);
        assert_eq!(page["pages"], 0);

        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("accounts", "classes", "school")))]
    async fn test_student_attendance_endpoint(pool: SqlitePool) -> sqlx::Result<()> {
        let state = create_test_state(pool);
        let server = create_test_server(state.clone());

        let page: serde_json::Value = server
            .get("/api/students/3/attendance")
            .add_header(authorization(), bearer(OTHER_PARENT))
            .await
            .json();
        assert_eq!(page["total"], 1);
        assert_eq!(page["data"][0]["status"], "absent");

        server
            .get("/api/students/3/attendance")
            .add_header(authorization(), bearer(PARENT))
            .await
            .assert_status_forbidden();

        Ok(())
    }

    // ============================================================
    // /api/grades
    // ============================================================

    #[sqlx::test(fixtures(path = "../fixtures", scripts("accounts", "classes", "school")))]
    async fn test_grades_visibility(pool: SqlitePool) -> sqlx::Result<()> {
        let state = create_test_state(pool);
        let server = create_test_server(state.clone());

        let page: serde_json::Value = server
            .get("/api/grades")
            .add_header(authorization(), bearer(TEACHER))
            .await
            .json();
        assert_eq!(page["total"], 4);

        let page: serde_json::Value = server
            .get("/api/grades")
            .add_header(authorization(), bearer(PARENT))
            .await
            .json();
        assert_eq!(page["total"], 3);

        let page: serde_json::Value = server
            .get("/api/grades")
            .add_header(authorization(), bearer(STUDENT))
            .await
            .json();
        assert_eq!(page["total"], 2);

        let page: serde_json::Value = server
            .get("/api/grades?classe_id=1&subject=Physique")
            .add_header(authorization(), bearer(ADMIN))
            .await
            .json();
        assert_eq!(page["total"], 2);

        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("accounts", "classes", "school")))]
    async fn test_student_grades_weighted_average(pool: SqlitePool) -> sqlx::Result<()> {
        let state = create_test_state(pool);
        let server = create_test_server(state.clone());

        let response = server
            .get("/api/students/1/grades")
            .add_header(authorization(), bearer(PARENT))
            .await;

        response.assert_status_ok();
        let report: serde_json::Value = response.json();
        assert_eq!(report["student_id"], 1);
        assert_eq!(report["grades"].as_array().unwrap().len(), 2);
        // (15/20 * 1 + 8/10 * 20 * 2) / 3
        assert_eq!(report["average"], 15.67);

        let report: serde_json::Value = server
            .get("/api/students/3/grades")
            .add_header(authorization(), bearer(ADMIN))
            .await
            .json();
        assert_eq!(report["average"], 12.0);

        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("accounts", "classes")))]
    async fn test_student_without_grades_has_no_average(pool: SqlitePool) -> sqlx::Result<()> {
        let state = create_test_state(pool);
        let server = create_test_server(state.clone());

        let report: serde_json::Value = server
            .get("/api/students/2/grades")
            .add_header(authorization(), bearer(PARENT))
            .await
            .json();
        assert_eq!(report["grades"], json!([]));
        assert!(report["average"].is_null());

        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("accounts", "classes")))]
    async fn test_create_grade_notifies_student(pool: SqlitePool) -> sqlx::Result<()> {
        let state = create_test_state(pool);
        let server = create_test_server(state.clone());

        let response = server
            .post("/api/grades")
            .add_header(authorization(), bearer(TEACHER))
            .json(&json!({
                "student_id": 1,
                "subject": "Physique",
                "value": 17.5,
                "teacher_id": 2
            }))
            .await;

        response.assert_status(StatusCode::CREATED);
        let grade: serde_json::Value = response.json();
        assert_eq!(grade["teacher_id"], 1);
        assert_eq!(grade["max_value"], 20.0);
        assert_eq!(grade["coefficient"], 1.0);

        let unread: serde_json::Value = server
            .get("/api/notifications/unread-count")
            .add_header(authorization(), bearer(STUDENT))
            .await
            .json();
        assert_eq!(unread["unread"], 1);

        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("accounts", "classes")))]
    async fn test_create_grade_rejects_invalid(pool: SqlitePool) -> sqlx::Result<()> {
        let state = create_test_state(pool);
        let server = create_test_server(state.clone());

        server
            .post("/api/grades")
            .add_header(authorization(), bearer(TEACHER))
            .json(&json!({ "student_id": 1, "subject": "Physique", "value": 12, "max_value": 10 }))
            .await
            .assert_status_bad_request();

        server
            .post("/api/grades")
            .add_header(authorization(), bearer(TEACHER))
            .json(&json!({ "student_id": 99, "subject": "Physique", "value": 12 }))
            .await
            .assert_status_not_found();

        server
            .post("/api/grades")
            .add_header(authorization(), bearer(PARENT))
            .json(&json!({ "student_id": 1, "subject": "Physique", "value": 12 }))
            .await
            .assert_status_forbidden();

        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("accounts", "classes", "school")))]
    async fn test_update_grade_only_by_author(pool: SqlitePool) -> sqlx::Result<()> {
        let state = create_test_state(pool);
        let server = create_test_server(state.clone());

        server
            .patch("/api/grades/2")
            .add_header(authorization(), bearer(TEACHER))
            .json(&json!({ "value": 9 }))
            .await
            .assert_status_forbidden();

        let grade: serde_json::Value = server
            .patch("/api/grades/1")
            .add_header(authorization(), bearer(TEACHER))
            .json(&json!({ "value": 16, "comment": "Corrigé" }))
            .await
            .json();
        assert_eq!(grade["value"], 16.0);
        assert_eq!(grade["comment"], "Corrigé");

        // 25 supera il massimo di 20 già salvato
        server
            .patch("/api/grades/1")
            .add_header(authorization(), bearer(TEACHER))
            .json(&json!({ "value": 25 }))
            .await
            .assert_status_bad_request();

        server
            .delete("/api/grades/1")
            .add_header(authorization(), bearer(TEACHER))
            .await
            .assert_status(StatusCode::NO_CONTENT);

        Ok(())
    }
}
