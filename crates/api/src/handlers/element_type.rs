//! Handlers for the element type catalog and its category vocabulary.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use cype_core::categories;
use cype_core::error::CoreError;
use cype_core::types::DbId;
use cype_db::models::element_type::{CreateElementType, ElementType, UpdateElementType};
use cype_db::repositories::ElementTypeRepo;

use crate::error::{AppError, AppResult};
use crate::query::CategoryFilter;
use crate::response::DataResponse;
use crate::state::AppState;

/// Verify that an element type exists, returning the full row.
pub async fn ensure_element_type_exists(
    pool: &sqlx::PgPool,
    id: DbId,
) -> AppResult<ElementType> {
    ElementTypeRepo::find_by_id(pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "ElementType",
            id,
        }))
}

/// GET /api/v1/categories
pub async fn list_categories() -> impl IntoResponse {
    Json(DataResponse {
        data: categories::grouped(),
    })
}

/// GET /api/v1/element-types?category=
pub async fn list(
    State(state): State<AppState>,
    Query(filter): Query<CategoryFilter>,
) -> AppResult<impl IntoResponse> {
    let items = ElementTypeRepo::list(&state.pool, filter.category.as_deref()).await?;
    Ok(Json(DataResponse { data: items }))
}

/// POST /api/v1/element-types
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateElementType>,
) -> AppResult<impl IntoResponse> {
    let element_type = ElementTypeRepo::create(&state.pool, &input).await?;

    Ok((StatusCode::CREATED, Json(DataResponse { data: element_type })))
}

/// GET /api/v1/element-types/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let element_type = ensure_element_type_exists(&state.pool, id).await?;
    Ok(Json(DataResponse { data: element_type }))
}

/// GET /api/v1/element-types/by-code/{code}
pub async fn get_by_code(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> AppResult<impl IntoResponse> {
    let element_type = ElementTypeRepo::find_by_code(&state.pool, &code)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Element type with code '{code}' not found")))?;
    Ok(Json(DataResponse { data: element_type }))
}

/// PUT /api/v1/element-types/{id}
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateElementType>,
) -> AppResult<impl IntoResponse> {
    let element_type = ElementTypeRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "ElementType",
            id,
        }))?;
    Ok(Json(DataResponse { data: element_type }))
}

/// DELETE /api/v1/element-types/{id}
///
/// Cascades to variables, options and template versions. Fails with 409
/// while any project element still references the type.
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if ElementTypeRepo::delete(&state.pool, id).await? {
        tracing::info!(element_type_id = id, "Element type deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound {
            entity: "ElementType",
            id,
        }))
    }
}
