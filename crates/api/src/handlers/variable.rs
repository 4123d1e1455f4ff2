//! Handlers for the variable registry: variables and their allowed options.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use cype_core::error::CoreError;
use cype_core::types::DbId;
use cype_db::models::variable::{
    CreateVariable, CreateVariableOption, SetDefaultOption, UpdateVariableOption, Variable,
};
use cype_db::repositories::VariableRepo;

use crate::error::{AppError, AppResult};
use crate::handlers::element_type::ensure_element_type_exists;
use crate::response::DataResponse;
use crate::state::AppState;

/// Verify that a variable exists, returning the full row.
async fn ensure_variable_exists(pool: &sqlx::PgPool, id: DbId) -> AppResult<Variable> {
    VariableRepo::find_by_id(pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Variable",
            id,
        }))
}

/// GET /api/v1/element-types/{id}/variables
///
/// Variables in display order, each with its options and input type.
pub async fn list_variables(
    State(state): State<AppState>,
    Path(element_type_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    ensure_element_type_exists(&state.pool, element_type_id).await?;
    let variables = VariableRepo::list_with_options(&state.pool, element_type_id).await?;
    Ok(Json(DataResponse { data: variables }))
}

/// POST /api/v1/element-types/{id}/variables
pub async fn define_variable(
    State(state): State<AppState>,
    Path(element_type_id): Path<DbId>,
    Json(input): Json<CreateVariable>,
) -> AppResult<impl IntoResponse> {
    let variable = VariableRepo::define(&state.pool, element_type_id, &input).await?;

    Ok((StatusCode::CREATED, Json(DataResponse { data: variable })))
}

/// DELETE /api/v1/variables/{id}
///
/// Fails with 409 while any template mapping or project value uses it.
pub async fn delete_variable(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if VariableRepo::delete(&state.pool, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound {
            entity: "Variable",
            id,
        }))
    }
}

/// GET /api/v1/variables/{id}/options
pub async fn list_options(
    State(state): State<AppState>,
    Path(variable_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    ensure_variable_exists(&state.pool, variable_id).await?;
    let options = VariableRepo::list_options(&state.pool, variable_id).await?;
    Ok(Json(DataResponse { data: options }))
}

/// POST /api/v1/variables/{id}/options
pub async fn add_option(
    State(state): State<AppState>,
    Path(variable_id): Path<DbId>,
    Json(input): Json<CreateVariableOption>,
) -> AppResult<impl IntoResponse> {
    let option = VariableRepo::add_option(&state.pool, variable_id, &input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: option })))
}

/// PUT /api/v1/variables/{id}/options/default
///
/// Mark one existing option as the default; any previous default is cleared.
pub async fn set_default_option(
    State(state): State<AppState>,
    Path(variable_id): Path<DbId>,
    Json(input): Json<SetDefaultOption>,
) -> AppResult<impl IntoResponse> {
    let option = VariableRepo::set_default_option(&state.pool, variable_id, &input.value).await?;
    Ok(Json(DataResponse { data: option }))
}

/// PUT /api/v1/variables/{id}/options/{option_id}
///
/// Partial update; `is_default: true` moves the default to this option.
pub async fn update_option(
    State(state): State<AppState>,
    Path((variable_id, option_id)): Path<(DbId, DbId)>,
    Json(input): Json<UpdateVariableOption>,
) -> AppResult<impl IntoResponse> {
    let option = VariableRepo::update_option(&state.pool, variable_id, option_id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "VariableOption",
            id: option_id,
        }))?;
    Ok(Json(DataResponse { data: option }))
}

/// DELETE /api/v1/variables/{id}/options/{option_id}
pub async fn remove_option(
    State(state): State<AppState>,
    Path((variable_id, option_id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    if VariableRepo::remove_option(&state.pool, variable_id, option_id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound {
            entity: "VariableOption",
            id: option_id,
        }))
    }
}
