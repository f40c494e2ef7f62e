//! Route handlers for income and expense categories.

use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
};

use common::{Category, CategoryUpdate, DatabaseID, NewCategory};

use crate::{
    auth::{authenticated_user, Claims},
    config::AppConfig,
    db, AppError,
};

/// A route handler for listing the caller's categories.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn list_categories(
    State(state): State<AppConfig>,
    claims: Claims,
) -> Result<Json<Vec<Category>>, AppError> {
    let connection_mutex = state.db_connection();
    let connection = connection_mutex.lock().unwrap();
    let user = authenticated_user(&claims, &connection)?;

    let categories = db::select_categories(user.id(), &connection)?;

    Ok(Json(categories))
}

/// A route handler for creating a new category.
///
/// The category is always owned by the caller; an owner field in the payload
/// is ignored.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn create_category(
    State(state): State<AppConfig>,
    claims: Claims,
    Json(new_category): Json<NewCategory>,
) -> Result<(StatusCode, Json<Category>), AppError> {
    let connection_mutex = state.db_connection();
    let connection = connection_mutex.lock().unwrap();
    let user = authenticated_user(&claims, &connection)?;

    let category = db::insert_category(new_category, user.id(), &connection)?;

    Ok((StatusCode::CREATED, Json(category)))
}

/// A route handler for getting a category by its database ID.
///
/// This function will return the status code 404 if the requested resource
/// does not exist or belongs to another user.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn get_category(
    State(state): State<AppConfig>,
    claims: Claims,
    Path(category_id): Path<DatabaseID>,
) -> Result<Json<Category>, AppError> {
    let connection_mutex = state.db_connection();
    let connection = connection_mutex.lock().unwrap();
    let user = authenticated_user(&claims, &connection)?;

    let category = db::select_category(category_id, user.id(), &connection)?;

    Ok(Json(category))
}

/// A route handler for replacing all of a category's writable fields.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn replace_category(
    State(state): State<AppConfig>,
    claims: Claims,
    Path(category_id): Path<DatabaseID>,
    Json(replacement): Json<NewCategory>,
) -> Result<Json<Category>, AppError> {
    let connection_mutex = state.db_connection();
    let connection = connection_mutex.lock().unwrap();
    let user = authenticated_user(&claims, &connection)?;

    let category = db::update_category(
        category_id,
        user.id(),
        CategoryUpdate {
            name: Some(replacement.name),
            category_type: Some(replacement.category_type),
        },
        &connection,
    )?;

    Ok(Json(category))
}

/// A route handler for updating some of a category's writable fields.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn patch_category(
    State(state): State<AppConfig>,
    claims: Claims,
    Path(category_id): Path<DatabaseID>,
    Json(changes): Json<CategoryUpdate>,
) -> Result<Json<Category>, AppError> {
    let connection_mutex = state.db_connection();
    let connection = connection_mutex.lock().unwrap();
    let user = authenticated_user(&claims, &connection)?;

    let category = db::update_category(category_id, user.id(), changes, &connection)?;

    Ok(Json(category))
}

/// A route handler for deleting a category and its transactions.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn delete_category(
    State(state): State<AppConfig>,
    claims: Claims,
    Path(category_id): Path<DatabaseID>,
) -> Result<StatusCode, AppError> {
    let connection_mutex = state.db_connection();
    let connection = connection_mutex.lock().unwrap();
    let user = authenticated_user(&claims, &connection)?;

    db::delete_category(category_id, user.id(), &connection)?;

    Ok(StatusCode::NO_CONTENT)
}
