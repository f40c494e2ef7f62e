//! A REST API for managing personal budgets, income/expense categories and
//! the transactions within them.
//!
//! Every resource is scoped to the user that created it: a request can only
//! ever see or modify rows reachable from the authenticated user, and a row
//! owned by someone else answers exactly like a row that does not exist.

use std::time::Duration;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use axum_server::Handle;
use serde_json::json;
use tokio::signal;

pub use config::AppConfig;

use crate::{db::DbError, filter::FilterError};

pub mod auth;
mod budget;
mod category;
mod config;
pub mod db;
pub mod filter;
mod transaction;
mod user;

/// Return a router with all the app's routes.
pub fn build_router() -> Router<AppConfig> {
    Router::new()
        .route("/api/user/create", post(user::create_user))
        .route("/api/token", post(auth::sign_in))
        .route(
            "/api/user/me",
            get(user::get_profile).patch(user::update_profile),
        )
        .route(
            "/api/budgets",
            get(budget::list_budgets).post(budget::create_budget),
        )
        .route(
            "/api/budgets/:budget_id",
            get(budget::get_budget)
                .put(budget::replace_budget)
                .patch(budget::patch_budget)
                .delete(budget::delete_budget),
        )
        .route(
            "/api/categories",
            get(category::list_categories).post(category::create_category),
        )
        .route(
            "/api/categories/:category_id",
            get(category::get_category)
                .put(category::replace_category)
                .patch(category::patch_category)
                .delete(category::delete_category),
        )
        .route(
            "/api/transactions",
            get(transaction::list_transactions).post(transaction::create_transaction),
        )
        .route(
            "/api/transactions/:transaction_id",
            get(transaction::get_transaction)
                .put(transaction::replace_transaction)
                .patch(transaction::patch_transaction)
                .delete(transaction::delete_transaction),
        )
}

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The outcomes route handlers surface to clients.
#[derive(Debug)]
pub enum AppError {
    /// The request lacked a valid credential.
    Unauthorized,
    /// The requested resource does not exist, or belongs to another user.
    /// The two cases produce identical responses so that clients cannot probe
    /// for other users' resource ids.
    NotFound,
    /// The request carried a parameter or field that failed validation. The
    /// message is safe to show to the client.
    Validation(String),
    /// The database rejected the operation, e.g. a referenced row was deleted
    /// concurrently.
    Conflict,
    /// An unexpected internal failure. Details are logged, never returned.
    InternalError,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "Authentication required".to_string(),
            ),
            AppError::NotFound => (
                StatusCode::NOT_FOUND,
                "The requested resource could not be found.".to_string(),
            ),
            AppError::Validation(description) => (StatusCode::BAD_REQUEST, description),
            AppError::Conflict => (
                StatusCode::CONFLICT,
                "The operation conflicts with existing data.".to_string(),
            ),
            AppError::InternalError => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

impl From<DbError> for AppError {
    fn from(e: DbError) -> Self {
        match e {
            DbError::NotFound => AppError::NotFound,
            DbError::DuplicateEmail => {
                AppError::Validation("a user with this email already exists".to_string())
            }
            DbError::InvalidForeignKey => AppError::Conflict,
            e => {
                tracing::error!("{e:?}");
                AppError::InternalError
            }
        }
    }
}

impl From<FilterError> for AppError {
    fn from(e: FilterError) -> Self {
        AppError::Validation(e.to_string())
    }
}
