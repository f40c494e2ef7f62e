//! Route handlers for budgets, including the filtered list endpoint.

use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
};

use common::{Budget, BudgetUpdate, DatabaseID, NewBudget};

use crate::{
    auth::{authenticated_user, Claims},
    config::AppConfig,
    db,
    filter::{BudgetFilter, BudgetListParams},
    AppError,
};

/// A route handler for listing the caller's budgets.
///
/// The result can be narrowed with the `balance`, `balance_range` and
/// `currencies` query parameters; see [BudgetListParams].
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn list_budgets(
    State(state): State<AppConfig>,
    claims: Claims,
    Query(params): Query<BudgetListParams>,
) -> Result<Json<Vec<Budget>>, AppError> {
    let filter = BudgetFilter::parse(&params)?;

    let connection_mutex = state.db_connection();
    let connection = connection_mutex.lock().unwrap();
    let user = authenticated_user(&claims, &connection)?;

    let budgets = db::select_budgets(user.id(), &filter, &connection)?;

    Ok(Json(budgets))
}

/// A route handler for creating a new budget.
///
/// The budget is always owned by the caller; an owner field in the payload is
/// ignored.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn create_budget(
    State(state): State<AppConfig>,
    claims: Claims,
    Json(new_budget): Json<NewBudget>,
) -> Result<(StatusCode, Json<Budget>), AppError> {
    let connection_mutex = state.db_connection();
    let connection = connection_mutex.lock().unwrap();
    let user = authenticated_user(&claims, &connection)?;

    let budget = db::insert_budget(new_budget, user.id(), &connection)?;

    Ok((StatusCode::CREATED, Json(budget)))
}

/// A route handler for getting a budget by its database ID.
///
/// This function will return the status code 404 if the requested resource
/// does not exist or belongs to another user.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn get_budget(
    State(state): State<AppConfig>,
    claims: Claims,
    Path(budget_id): Path<DatabaseID>,
) -> Result<Json<Budget>, AppError> {
    let connection_mutex = state.db_connection();
    let connection = connection_mutex.lock().unwrap();
    let user = authenticated_user(&claims, &connection)?;

    let budget = db::select_budget(budget_id, user.id(), &connection)?;

    Ok(Json(budget))
}

/// A route handler for replacing all of a budget's writable fields.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn replace_budget(
    State(state): State<AppConfig>,
    claims: Claims,
    Path(budget_id): Path<DatabaseID>,
    Json(replacement): Json<NewBudget>,
) -> Result<Json<Budget>, AppError> {
    let connection_mutex = state.db_connection();
    let connection = connection_mutex.lock().unwrap();
    let user = authenticated_user(&claims, &connection)?;

    let budget = db::update_budget(
        budget_id,
        user.id(),
        BudgetUpdate {
            currency: Some(replacement.currency),
            balance: Some(replacement.balance),
        },
        &connection,
    )?;

    Ok(Json(budget))
}

/// A route handler for updating some of a budget's writable fields.
///
/// The owner cannot be changed; an owner field in the payload is ignored.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn patch_budget(
    State(state): State<AppConfig>,
    claims: Claims,
    Path(budget_id): Path<DatabaseID>,
    Json(changes): Json<BudgetUpdate>,
) -> Result<Json<Budget>, AppError> {
    let connection_mutex = state.db_connection();
    let connection = connection_mutex.lock().unwrap();
    let user = authenticated_user(&claims, &connection)?;

    let budget = db::update_budget(budget_id, user.id(), changes, &connection)?;

    Ok(Json(budget))
}

/// A route handler for deleting a budget and its transactions.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn delete_budget(
    State(state): State<AppConfig>,
    claims: Claims,
    Path(budget_id): Path<DatabaseID>,
) -> Result<StatusCode, AppError> {
    let connection_mutex = state.db_connection();
    let connection = connection_mutex.lock().unwrap();
    let user = authenticated_user(&claims, &connection)?;

    db::delete_budget(budget_id, user.id(), &connection)?;

    Ok(StatusCode::NO_CONTENT)
}
