//! Integration tests per gli endpoints di autenticazione
//!
//! Test per:
//! - POST /api/auth/login
//! - GET /api/auth/me
//! - PATCH /api/auth/password
//! - middleware di autenticazione sulle route protette
//!
//! Questi test usano `#[sqlx::test]` che:
//! - Crea automaticamente un database SQLite di test isolato
//! - Applica le migrations da `migrations/`
//! - Applica i fixtures specificati da `fixtures/`

mod common;

#[cfg(test)]
mod auth_tests {
    use super::common::*;
    use serde_json::json;
    use sqlx::SqlitePool;

    // ============================================================
    // Test per POST /api/auth/login - login_user
    // ============================================================

    #[sqlx::test(fixtures(path = "../fixtures", scripts("accounts")))]
    async fn test_login_success(pool: SqlitePool) -> sqlx::Result<()> {
        let state = create_test_state(pool);
        let server = create_test_server(state.clone());

        let body = json!({
            "email": "marie.curie@school.test",
            "password": FIXTURE_PASSWORD
        });

        let response = server.post("/api/auth/login").json(&body).await;

        response.assert_status_ok();

        let headers = response.headers();
        assert!(
            headers.get("set-cookie").is_some(),
            "Set-Cookie header should be present"
        );
        let auth_header = headers.get("authorization").unwrap().to_str().unwrap();
        assert!(
            auth_header.starts_with("Bearer "),
            "Authorization should start with 'Bearer '"
        );

        let login: serde_json::Value = response.json();
        assert!(login["token"].as_str().is_some_and(|t| !t.is_empty()));
        assert_eq!(login["user"]["type"], "teacher");
        assert_eq!(login["user"]["id"], 1);
        assert_eq!(login["user"]["roles"], json!(["ROLE_TEACHER"]));
        assert!(login["user"].get("password").is_none());

        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("accounts", "classes")))]
    async fn test_login_finds_every_user_type(pool: SqlitePool) -> sqlx::Result<()> {
        let state = create_test_state(pool);
        let server = create_test_server(state.clone());

        for (email, kind) in [
            ("admin@school.test", "administrator"),
            ("paul.martin@school.test", "parent"),
            ("leo.martin@school.test", "student"),
        ] {
            let response = server
                .post("/api/auth/login")
                .json(&json!({ "email": email, "password": FIXTURE_PASSWORD }))
                .await;
            response.assert_status_ok();
            let login: serde_json::Value = response.json();
            assert_eq!(login["user"]["type"], kind, "wrong type for {}", email);
        }

        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("accounts")))]
    async fn test_login_token_authenticates_requests(pool: SqlitePool) -> sqlx::Result<()> {
        let state = create_test_state(pool);
        let server = create_test_server(state.clone());

        let login: serde_json::Value = server
            .post("/api/auth/login")
            .json(&json!({ "email": "paul.martin@school.test", "password": FIXTURE_PASSWORD }))
            .await
            .json();
        let token = login["token"].as_str().unwrap();

        let response = server
            .get("/api/auth/me")
            .add_header(authorization(), format!("Bearer {}", token))
            .await;

        response.assert_status_ok();
        let me: serde_json::Value = response.json();
        assert_eq!(me["type"], "parent");
        assert_eq!(me["phone"], "0601020304");

        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("accounts")))]
    async fn test_login_wrong_password(pool: SqlitePool) -> sqlx::Result<()> {
        let state = create_test_state(pool);
        let server = create_test_server(state.clone());

        let body = json!({
            "email": "marie.curie@school.test",
            "password": "wrongpassword"
        });

        let response = server.post("/api/auth/login").json(&body).await;

        response.assert_status_unauthorized();
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("accounts")))]
    async fn test_login_unknown_email(pool: SqlitePool) -> sqlx::Result<()> {
        let state = create_test_state(pool);
        let server = create_test_server(state.clone());

        let body = json!({
            "email": "nobody@school.test",
            "password": FIXTURE_PASSWORD
        });

        let response = server.post("/api/auth/login").json(&body).await;

        response.assert_status_unauthorized();
        let error: serde_json::Value = response.json();
        assert_eq!(error["error"], "Invalid email or password");
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("accounts")))]
    async fn test_login_missing_password(pool: SqlitePool) -> sqlx::Result<()> {
        let state = create_test_state(pool);
        let server = create_test_server(state.clone());

        let body = json!({
            "email": "marie.curie@school.test"
        });

        let response = server.post("/api/auth/login").json(&body).await;

        // campo obbligatorio mancante -> 400 con corpo JSON
        response.assert_status_bad_request();
        let error: serde_json::Value = response.json();
        assert_eq!(error["error"], "Invalid request body");
        assert!(error["details"].as_str().unwrap().contains("password"));
        Ok(())
    }

    // ============================================================
    // Middleware di autenticazione
    // ============================================================

    #[sqlx::test(fixtures(path = "../fixtures", scripts("accounts")))]
    async fn test_missing_header_is_forbidden(pool: SqlitePool) -> sqlx::Result<()> {
        let state = create_test_state(pool);
        let server = create_test_server(state.clone());

        let response = server.get("/api/auth/me").await;

        response.assert_status_forbidden();
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("accounts")))]
    async fn test_malformed_token_is_unauthorized(pool: SqlitePool) -> sqlx::Result<()> {
        let state = create_test_state(pool);
        let server = create_test_server(state.clone());

        let response = server
            .get("/api/auth/me")
            .add_header(authorization(), "Bearer not.a.token")
            .await;
        response.assert_status_unauthorized();

        let response = server
            .get("/api/auth/me")
            .add_header(authorization(), "Basic YWxpY2U6c2VjcmV0")
            .await;
        response.assert_status_unauthorized();

        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("accounts")))]
    async fn test_token_signed_with_other_secret(pool: SqlitePool) -> sqlx::Result<()> {
        let state = create_test_state(pool);
        let server = create_test_server(state.clone());

        let token = create_test_jwt(TEACHER, "marie.curie@school.test", "un-altro-segreto");
        let response = server
            .get("/api/auth/me")
            .add_header(authorization(), format!("Bearer {}", token))
            .await;

        response.assert_status_unauthorized();
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("accounts")))]
    async fn test_token_for_missing_user(pool: SqlitePool) -> sqlx::Result<()> {
        let state = create_test_state(pool);
        let server = create_test_server(state.clone());

        // Teacher 1 esiste, ma lo stesso id come studente no
        let response = server
            .get("/api/auth/me")
            .add_header(authorization(), bearer(school_server::entities::UserRef::Student(1)))
            .await;

        response.assert_status_unauthorized();
        Ok(())
    }

    // ============================================================
    // Test per GET /api/auth/me e PATCH /api/auth/password
    // ============================================================

    #[sqlx::test(fixtures(path = "../fixtures", scripts("accounts")))]
    async fn test_me_returns_profile_of_token_type(pool: SqlitePool) -> sqlx::Result<()> {
        let state = create_test_state(pool);
        let server = create_test_server(state.clone());

        let response = server
            .get("/api/auth/me")
            .add_header(authorization(), bearer(TEACHER))
            .await;

        response.assert_status_ok();
        let me: serde_json::Value = response.json();
        assert_eq!(me["id"], 1);
        assert_eq!(me["type"], "teacher");
        assert_eq!(me["email"], "marie.curie@school.test");
        assert_eq!(me["subject"], "Physique");

        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("accounts")))]
    async fn test_change_password(pool: SqlitePool) -> sqlx::Result<()> {
        let state = create_test_state(pool);
        let server = create_test_server(state.clone());

        let response = server
            .patch("/api/auth/password")
            .add_header(authorization(), bearer(PARENT))
            .json(&json!({
                "current_password": FIXTURE_PASSWORD,
                "new_password": "NuovaPassword456"
            }))
            .await;
        response.assert_status(axum_test::http::StatusCode::NO_CONTENT);

        server
            .post("/api/auth/login")
            .json(&json!({ "email": "paul.martin@school.test", "password": FIXTURE_PASSWORD }))
            .await
            .assert_status_unauthorized();

        server
            .post("/api/auth/login")
            .json(&json!({ "email": "paul.martin@school.test", "password": "NuovaPassword456" }))
            .await
            .assert_status_ok();

        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("accounts")))]
    async fn test_change_password_wrong_current(pool: SqlitePool) -> sqlx::Result<()> {
        let state = create_test_state(pool);
        let server = create_test_server(state.clone());

        let response = server
            .patch("/api/auth/password")
            .add_header(authorization(), bearer(PARENT))
            .json(&json!({
                "current_password": "sbagliata",
                "new_password": "NuovaPassword456"
            }))
            .await;

        response.assert_status_unauthorized();
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("accounts")))]
    async fn test_change_password_too_short(pool: SqlitePool) -> sqlx::Result<()> {
        let state = create_test_state(pool);
        let server = create_test_server(state.clone());

        let response = server
            .patch("/api/auth/password")
            .add_header(authorization(), bearer(PARENT))
            .json(&json!({
                "current_password": FIXTURE_PASSWORD,
                "new_password": "corta"
            }))
            .await;

        response.assert_status_bad_request();
        Ok(())
    }

    // ============================================================
    // Health check
    // ============================================================

    #[sqlx::test]
    async fn test_root_is_public(pool: SqlitePool) -> sqlx::Result<()> {
        let state = create_test_state(pool);
        let server = create_test_server(state.clone());

        server.get("/").await.assert_status_ok();
        Ok(())
    }
}
