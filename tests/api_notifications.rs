//! Integration tests per notifiche e avvisi
//!
//! Test per:
//! - /api/notifications
//! - /api/alerts

mod common;

#[cfg(test)]
mod notification_tests {
    use super::common::*;
    use axum_test::http::StatusCode;
    use serde_json::json;
    use sqlx::SqlitePool;

    // ============================================================
    // /api/notifications
    // ============================================================

    #[sqlx::test(fixtures(path = "../fixtures", scripts("accounts", "messaging")))]
    async fn test_list_notifications_of_recipient(pool: SqlitePool) -> sqlx::Result<()> {
        let state = create_test_state(pool);
        let server = create_test_server(state.clone());

        let page: serde_json::Value = server
            .get("/api/notifications")
            .add_header(authorization(), bearer(PARENT))
            .await
            .json();
        assert_eq!(page["total"], 2);
        assert_eq!(page["data"][0]["notification_id"], 1);
        for notification in page["data"].as_array().unwrap() {
            assert_eq!(notification["recipient"], json!({ "type": "parent", "id": 1 }));
        }

        let page: serde_json::Value = server
            .get("/api/notifications?unread=true")
            .add_header(authorization(), bearer(PARENT))
            .await
            .json();
        assert_eq!(page["total"], 1);
        assert_eq!(page["data"][0]["is_read"], false);

        // stesso id, tipo diverso
        let page: serde_json::Value = server
            .get("/api/notifications")
            .add_header(authorization(), bearer(TEACHER))
            .await
            .json();
        assert_eq!(page["total"], 1);
        assert_eq!(page["data"][0]["notification_id"], 3);

        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("accounts")))]
    async fn test_no_notifications_is_empty_page(pool: SqlitePool) -> sqlx::Result<()> {
        let state = create_test_state(pool);
        let server = create_test_server(state.clone());

        let page: serde_json::Value = server
            .get("/api/notifications")
            .add_header(authorization(), bearer(ADMIN))
            .await
            .json();
        assert_eq!(page["total"], 0);
        assert_eq!(page["pages"], 0);
        assert_eq!(page["data"], json!([]));

        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("accounts", "messaging")))]
    async fn test_mark_read(pool: SqlitePool) -> sqlx::Result<()> {
        let state = create_test_state(pool);
        let server = create_test_server(state.clone());

        let response = server
            .patch("/api/notifications/1/read")
            .add_header(authorization(), bearer(PARENT))
            .await;
        response.assert_status_ok();
        let notification: serde_json::Value = response.json();
        assert_eq!(notification["is_read"], true);

        let unread: serde_json::Value = server
            .get("/api/notifications/unread-count")
            .add_header(authorization(), bearer(PARENT))
            .await
            .json();
        assert_eq!(unread["unread"], 0);

        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("accounts", "messaging")))]
    async fn test_notifications_of_others_are_not_found(pool: SqlitePool) -> sqlx::Result<()> {
        let state = create_test_state(pool);
        let server = create_test_server(state.clone());

        // la notifica 3 appartiene all'insegnante 1, non al genitore 1
        server
            .patch("/api/notifications/3/read")
            .add_header(authorization(), bearer(PARENT))
            .await
            .assert_status_not_found();

        server
            .delete("/api/notifications/3")
            .add_header(authorization(), bearer(PARENT))
            .await
            .assert_status_not_found();

        server
            .delete("/api/notifications/3")
            .add_header(authorization(), bearer(TEACHER))
            .await
            .assert_status(StatusCode::NO_CONTENT);

        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("accounts", "messaging")))]
    async fn test_mark_all_read(pool: SqlitePool) -> sqlx::Result<()> {
        let state = create_test_state(pool);
        let server = create_test_server(state.clone());

        let result: serde_json::Value = server
            .post("/api/notifications/read-all")
            .add_header(authorization(), bearer(PARENT))
            .await
            .json();
        assert_eq!(result["updated"], 1);

        // quelle dell'insegnante 1 restano non lette
        let unread: serde_json::Value = server
            .get("/api/notifications/unread-count")
            .add_header(authorization(), bearer(TEACHER))
            .await
            .json();
        assert_eq!(unread["unread"], 1);

        Ok(())
    }

    // ============================================================
    // /api/alerts
    // ============================================================

    #[sqlx::test(fixtures(path = "../fixtures", scripts("accounts", "classes")))]
    async fn test_alert_to_everyone(pool: SqlitePool) -> sqlx::Result<()> {
        let state = create_test_state(pool);
        let server = create_test_server(state.clone());

        let response = server
            .post("/api/alerts")
            .add_header(authorization(), bearer(ADMIN))
            .json(&json!({
                "title": "Fermeture exceptionnelle",
                "content": "L'école sera fermée lundi.",
                "level": "urgent",
                "audience": { "scope": "everyone" }
            }))
            .await;

        response.assert_status(StatusCode::CREATED);
        let dispatch: serde_json::Value = response.json();
        assert_eq!(dispatch["delivered"], 8);
        assert_eq!(dispatch["skipped"], 0);
        assert_eq!(dispatch["alert"]["recipients"], 8);
        assert_eq!(dispatch["alert"]["audience"], "everyone");
        assert_eq!(dispatch["alert"]["sender"], json!({ "type": "administrator", "id": 1 }));

        let page: serde_json::Value = server
            .get("/api/notifications")
            .add_header(authorization(), bearer(STUDENT))
            .await
            .json();
        assert_eq!(page["total"], 1);
        assert_eq!(page["data"][0]["kind"], "alert");
        assert_eq!(page["data"][0]["title"], "Fermeture exceptionnelle");

        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("accounts", "classes")))]
    async fn test_alert_to_role(pool: SqlitePool) -> sqlx::Result<()> {
        let state = create_test_state(pool);
        let server = create_test_server(state.clone());

        let dispatch: serde_json::Value = server
            .post("/api/alerts")
            .add_header(authorization(), bearer(TEACHER))
            .json(&json!({
                "title": "Réunion",
                "content": "Réunion des parents jeudi à 18h.",
                "level": "info",
                "audience": { "scope": "role", "role": "parent" }
            }))
            .await
            .json();
        assert_eq!(dispatch["delivered"], 2);

        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("accounts", "classes")))]
    async fn test_alert_to_classe_with_parents(pool: SqlitePool) -> sqlx::Result<()> {
        let state = create_test_state(pool);
        let server = create_test_server(state.clone());

        // 6A: studenti 1 e 3, genitori 1 e 2
        let dispatch: serde_json::Value = server
            .post("/api/alerts")
            .add_header(authorization(), bearer(TEACHER))
            .json(&json!({
                "title": "Sortie",
                "content": "Autorisation à signer.",
                "level": "warning",
                "audience": { "scope": "classe", "classe_id": 1, "include_parents": true }
            }))
            .await
            .json();
        assert_eq!(dispatch["delivered"], 4);
        assert_eq!(dispatch["alert"]["audience"], "classe:1+parents");

        // 5B: una sola studentessa, senza genitori
        let dispatch: serde_json::Value = server
            .post("/api/alerts")
            .add_header(authorization(), bearer(TEACHER))
            .json(&json!({
                "title": "Sortie",
                "content": "Autorisation à signer.",
                "level": "warning",
                "audience": { "scope": "classe", "classe_id": 2 }
            }))
            .await
            .json();
        assert_eq!(dispatch["delivered"], 1);

        server
            .post("/api/alerts")
            .add_header(authorization(), bearer(TEACHER))
            .json(&json!({
                "title": "Sortie",
                "content": "Autorisation à signer.",
                "level": "warning",
                "audience": { "scope": "classe", "classe_id": 99 }
            }))
            .await
            .assert_status_not_found();

        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("accounts", "classes")))]
    async fn test_alert_to_users_skips_missing(pool: SqlitePool) -> sqlx::Result<()> {
        let state = create_test_state(pool);
        let server = create_test_server(state.clone());

        let dispatch: serde_json::Value = server
            .post("/api/alerts")
            .add_header(authorization(), bearer(ADMIN))
            .json(&json!({
                "title": "Convocation",
                "content": "Merci de passer au secrétariat.",
                "level": "info",
                "audience": {
                    "scope": "users",
                    "users": [
                        { "type": "student", "id": 1 },
                        { "type": "parent", "id": 1 },
                        { "type": "student", "id": 1 },
                        { "type": "teacher", "id": 77 }
                    ]
                }
            }))
            .await
            .json();
        assert_eq!(dispatch["delivered"], 2);
        assert_eq!(dispatch["skipped"], 1);

        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("accounts", "classes")))]
    async fn test_alert_repeated_missing_user_skipped_once(pool: SqlitePool) -> sqlx::Result<()> {
        let state = create_test_state(pool);
        let server = create_test_server(state.clone());

        let dispatch: serde_json::Value = server
            .post("/api/alerts")
            .add_header(authorization(), bearer(ADMIN))
            .json(&json!({
                "title": "Conseil de classe",
                "content": "Jeudi 18h.",
                "level": "info",
                "audience": {
                    "scope": "users",
                    "users": [
                        { "type": "teacher", "id": 99 },
                        { "type": "teacher", "id": 99 },
                        { "type": "teacher", "id": 1 }
                    ]
                }
            }))
            .await
            .json();
        assert_eq!(dispatch["delivered"], 1);
        assert_eq!(dispatch["skipped"], 1);

        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("accounts", "classes")))]
    async fn test_alert_not_stored_when_notifications_fail(pool: SqlitePool) -> sqlx::Result<()> {
        sqlx::query(
            "CREATE TRIGGER reject_notifications BEFORE INSERT ON notifications \
             BEGIN SELECT RAISE(ABORT, 'unavailable'); END",
        )
        .execute(&pool)
        .await?;
        let state = create_test_state(pool.clone());
        let server = create_test_server(state.clone());

        let response = server
            .post("/api/alerts")
            .add_header(authorization(), bearer(ADMIN))
            .json(&json!({
                "title": "Fermeture",
                "content": "L'école sera fermée lundi.",
                "level": "warning",
                "audience": { "scope": "role", "role": "teacher" }
            }))
            .await;
        response.assert_status_bad_request();

        // né storico né notifiche parziali
        let alerts: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM alerts")
            .fetch_one(&pool)
            .await?;
        assert_eq!(alerts, 0);

        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("accounts", "classes")))]
    async fn test_alerts_reserved_to_staff(pool: SqlitePool) -> sqlx::Result<()> {
        let state = create_test_state(pool);
        let server = create_test_server(state.clone());

        server
            .post("/api/alerts")
            .add_header(authorization(), bearer(PARENT))
            .json(&json!({
                "title": "Spam",
                "content": "Spam",
                "level": "info",
                "audience": { "scope": "everyone" }
            }))
            .await
            .assert_status_forbidden();

        server
            .get("/api/alerts")
            .add_header(authorization(), bearer(STUDENT))
            .await
            .assert_status_forbidden();

        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("accounts", "classes")))]
    async fn test_list_alerts_history(pool: SqlitePool) -> sqlx::Result<()> {
        let state = create_test_state(pool);
        let server = create_test_server(state.clone());

        let page: serde_json::Value = server
            .get("/api/alerts")
            .add_header(authorization(), bearer(ADMIN))
            .await
            .json();
        assert_eq!(page["total"], 0);
        assert_eq!(page["pages"], 0);

        server
            .post("/api/alerts")
            .add_header(authorization(), bearer(ADMIN))
            .json(&json!({
                "title": "Grève",
                "content": "Cantine fermée.",
                "level": "warning",
                "audience": { "scope": "role", "role": "student" }
            }))
            .await
            .assert_status(StatusCode::CREATED);

        let page: serde_json::Value = server
            .get("/api/alerts")
            .add_header(authorization(), bearer(TEACHER))
            .await
            .json();
        assert_eq!(page["total"], 1);
        assert_eq!(page["data"][0]["recipients"], 3);
        assert_eq!(page["data"][0]["audience"], "role:student");

        Ok(())
    }
}
