//! Route handlers for registration and the authenticated user's profile.

use axum::{
    extract::{Json, State},
    http::StatusCode,
};
use email_address::EmailAddress;
use serde::Deserialize;

use common::{NewUser, PasswordHash, RawPassword, UserProfile};

use crate::{
    auth::{authenticated_user, Claims},
    config::AppConfig,
    db::{self, Insert},
    AppError,
};

/// The payload for registering a new user.
#[derive(Debug, Deserialize)]
pub struct RegisterUser {
    pub email: EmailAddress,
    pub password: String,
}

/// The payload for updating the authenticated user's profile. Both fields
/// are optional.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateProfile {
    pub email: Option<EmailAddress>,
    pub password: Option<String>,
}

fn hash_password(password: String) -> Result<PasswordHash, AppError> {
    let password = RawPassword::new(password).map_err(|e| AppError::Validation(e.to_string()))?;

    PasswordHash::new(password).map_err(|e| {
        tracing::error!("Error hashing password: {e}");
        AppError::InternalError
    })
}

/// A route handler for registering a new user.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn create_user(
    State(state): State<AppConfig>,
    Json(payload): Json<RegisterUser>,
) -> Result<(StatusCode, Json<UserProfile>), AppError> {
    let password_hash = hash_password(payload.password)?;

    let user = NewUser {
        email: payload.email,
        password_hash,
    }
    .insert(&state.db_connection().lock().unwrap())?;

    Ok((StatusCode::CREATED, Json(user.profile())))
}

/// A route handler for retrieving the authenticated user's profile.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn get_profile(
    State(state): State<AppConfig>,
    claims: Claims,
) -> Result<Json<UserProfile>, AppError> {
    let connection_mutex = state.db_connection();
    let connection = connection_mutex.lock().unwrap();
    let user = authenticated_user(&claims, &connection)?;

    Ok(Json(user.profile()))
}

/// A route handler for updating the authenticated user's email and/or
/// password.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn update_profile(
    State(state): State<AppConfig>,
    claims: Claims,
    Json(changes): Json<UpdateProfile>,
) -> Result<Json<UserProfile>, AppError> {
    // Hash outside the database lock, bcrypt is deliberately slow.
    let password_hash = changes.password.map(hash_password).transpose()?;

    let connection_mutex = state.db_connection();
    let connection = connection_mutex.lock().unwrap();
    let user = authenticated_user(&claims, &connection)?;

    let user = db::update_user(user.id(), changes.email, password_hash, &connection)?;

    Ok(Json(user.profile()))
}

#[cfg(test)]
mod user_api_tests {
    use axum::http::StatusCode;
    use serde_json::{json, Value};

    use common::UserProfile;

    use crate::test_utils::{get_test_server, sign_up};

    #[tokio::test]
    async fn create_user_succeeds() {
        let server = get_test_server();

        let response = server
            .post("/api/user/create")
            .content_type("application/json")
            .json(&json!({
                "email": "user@example.com",
                "password": "testpass123",
            }))
            .await;

        response.assert_status(StatusCode::CREATED);

        let profile = response.json::<UserProfile>();
        assert_eq!(profile.email.to_string(), "user@example.com");
    }

    #[tokio::test]
    async fn create_user_response_does_not_contain_password() {
        let server = get_test_server();

        let response = server
            .post("/api/user/create")
            .content_type("application/json")
            .json(&json!({
                "email": "user@example.com",
                "password": "testpass123",
            }))
            .await;

        let body = response.json::<Value>();

        assert!(body.get("password").is_none());
        assert!(!response.text().contains("testpass123"));
    }

    #[tokio::test]
    async fn create_user_fails_on_duplicate_email() {
        let server = get_test_server();

        let payload = json!({
            "email": "user@example.com",
            "password": "testpass123",
        });

        server
            .post("/api/user/create")
            .content_type("application/json")
            .json(&payload)
            .await
            .assert_status(StatusCode::CREATED);

        server
            .post("/api/user/create")
            .content_type("application/json")
            .json(&payload)
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn create_user_fails_on_short_password() {
        let server = get_test_server();

        server
            .post("/api/user/create")
            .content_type("application/json")
            .json(&json!({
                "email": "user@example.com",
                "password": "test123",
            }))
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn get_profile_requires_auth() {
        let server = get_test_server();

        server
            .get("/api/user/me")
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn get_profile_returns_own_email() {
        let server = get_test_server();
        let token = sign_up(&server, "user@example.com", "testpass123").await;

        let response = server.get("/api/user/me").authorization_bearer(token).await;

        response.assert_status_ok();
        assert_eq!(
            response.json::<UserProfile>().email.to_string(),
            "user@example.com"
        );
    }

    #[tokio::test]
    async fn update_profile_changes_password() {
        let server = get_test_server();
        let token = sign_up(&server, "user@example.com", "testpass123").await;

        server
            .patch("/api/user/me")
            .authorization_bearer(&token)
            .content_type("application/json")
            .json(&json!({ "password": "newpassword456" }))
            .await
            .assert_status_ok();

        // The old password no longer works, the new one does.
        server
            .post("/api/token")
            .content_type("application/json")
            .json(&json!({
                "email": "user@example.com",
                "password": "testpass123",
            }))
            .await
            .assert_status(StatusCode::UNAUTHORIZED);

        server
            .post("/api/token")
            .content_type("application/json")
            .json(&json!({
                "email": "user@example.com",
                "password": "newpassword456",
            }))
            .await
            .assert_status_ok();
    }

    #[tokio::test]
    async fn update_profile_changes_email_and_keeps_token_valid() {
        let server = get_test_server();
        let token = sign_up(&server, "user@example.com", "testpass123").await;

        let response = server
            .patch("/api/user/me")
            .authorization_bearer(&token)
            .content_type("application/json")
            .json(&json!({ "email": "renamed@example.com" }))
            .await;

        response.assert_status_ok();
        assert_eq!(
            response.json::<UserProfile>().email.to_string(),
            "renamed@example.com"
        );

        // Tokens are keyed by user id, so the old token still works.
        let response = server.get("/api/user/me").authorization_bearer(token).await;

        response.assert_status_ok();
        assert_eq!(
            response.json::<UserProfile>().email.to_string(),
            "renamed@example.com"
        );
    }
}
