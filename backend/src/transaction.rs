//! Route handlers for transactions.
//!
//! A transaction has no owner field of its own; every authorization decision
//! goes through the budget it belongs to.

use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
};

use common::{DatabaseID, NewTransaction, Transaction, TransactionUpdate};

use crate::{
    auth::{authenticated_user, Claims},
    config::AppConfig,
    db, AppError,
};

/// A route handler for listing the transactions in the caller's budgets.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn list_transactions(
    State(state): State<AppConfig>,
    claims: Claims,
) -> Result<Json<Vec<Transaction>>, AppError> {
    let connection_mutex = state.db_connection();
    let connection = connection_mutex.lock().unwrap();
    let user = authenticated_user(&claims, &connection)?;

    let transactions = db::select_transactions(user.id(), &connection)?;

    Ok(Json(transactions))
}

/// A route handler for creating a new transaction.
///
/// This function will return the status code 404 if the referenced budget or
/// category does not exist or belongs to another user, without revealing
/// which.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn create_transaction(
    State(state): State<AppConfig>,
    claims: Claims,
    Json(new_transaction): Json<NewTransaction>,
) -> Result<(StatusCode, Json<Transaction>), AppError> {
    let connection_mutex = state.db_connection();
    let connection = connection_mutex.lock().unwrap();
    let user = authenticated_user(&claims, &connection)?;

    let transaction = db::insert_transaction(new_transaction, user.id(), &connection)?;

    Ok((StatusCode::CREATED, Json(transaction)))
}

/// A route handler for getting a transaction by its database ID.
///
/// This function will return the status code 404 if the requested resource
/// does not exist or sits in another user's budget.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn get_transaction(
    State(state): State<AppConfig>,
    claims: Claims,
    Path(transaction_id): Path<DatabaseID>,
) -> Result<Json<Transaction>, AppError> {
    let connection_mutex = state.db_connection();
    let connection = connection_mutex.lock().unwrap();
    let user = authenticated_user(&claims, &connection)?;

    let transaction = db::select_transaction(transaction_id, user.id(), &connection)?;

    Ok(Json(transaction))
}

/// A route handler for replacing all of a transaction's writable fields.
///
/// The budget reference is not writable and keeps its original value even if
/// the payload names a different budget.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn replace_transaction(
    State(state): State<AppConfig>,
    claims: Claims,
    Path(transaction_id): Path<DatabaseID>,
    Json(replacement): Json<TransactionUpdate>,
) -> Result<Json<Transaction>, AppError> {
    let connection_mutex = state.db_connection();
    let connection = connection_mutex.lock().unwrap();
    let user = authenticated_user(&claims, &connection)?;

    let transaction =
        db::update_transaction(transaction_id, user.id(), replacement, &connection)?;

    Ok(Json(transaction))
}

/// A route handler for updating some of a transaction's writable fields.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn patch_transaction(
    State(state): State<AppConfig>,
    claims: Claims,
    Path(transaction_id): Path<DatabaseID>,
    Json(changes): Json<TransactionUpdate>,
) -> Result<Json<Transaction>, AppError> {
    let connection_mutex = state.db_connection();
    let connection = connection_mutex.lock().unwrap();
    let user = authenticated_user(&claims, &connection)?;

    let transaction = db::update_transaction(transaction_id, user.id(), changes, &connection)?;

    Ok(Json(transaction))
}

/// A route handler for deleting a transaction.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn delete_transaction(
    State(state): State<AppConfig>,
    claims: Claims,
    Path(transaction_id): Path<DatabaseID>,
) -> Result<StatusCode, AppError> {
    let connection_mutex = state.db_connection();
    let connection = connection_mutex.lock().unwrap();
    let user = authenticated_user(&claims, &connection)?;

    db::delete_transaction(transaction_id, user.id(), &connection)?;

    Ok(StatusCode::NO_CONTENT)
}
