//! Handlers for project element instances, their values and their
//! rendered descriptions.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use cype_core::error::CoreError;
use cype_core::types::DbId;
use cype_db::models::element_value::SetElementValue;
use cype_db::models::project_element::{CreateProjectElement, ProjectElement};
use cype_db::repositories::{ElementValueRepo, ProjectElementRepo, RenderedDescriptionRepo};

use crate::error::{AppError, AppResult};
use crate::handlers::project::ensure_project_exists;
use crate::response::DataResponse;
use crate::state::AppState;

/// Verify that a project element exists, returning the full row.
async fn ensure_project_element_exists(
    pool: &sqlx::PgPool,
    id: DbId,
) -> AppResult<ProjectElement> {
    ProjectElementRepo::find_by_id(pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "ProjectElement",
            id,
        }))
}

/// GET /api/v1/projects/{id}/elements
pub async fn list_for_project(
    State(state): State<AppState>,
    Path(project_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    ensure_project_exists(&state.pool, project_id).await?;
    let elements = ProjectElementRepo::list_for_project(&state.pool, project_id).await?;
    Ok(Json(DataResponse { data: elements }))
}

/// POST /api/v1/projects/{id}/elements
///
/// Without `template_version_id` the element is pinned to the version of its
/// type that is active when it is created. Later activations do not move it.
pub async fn create(
    State(state): State<AppState>,
    Path(project_id): Path<DbId>,
    Json(input): Json<CreateProjectElement>,
) -> AppResult<impl IntoResponse> {
    let element = ProjectElementRepo::create(&state.pool, project_id, &input).await?;

    Ok((StatusCode::CREATED, Json(DataResponse { data: element })))
}

/// GET /api/v1/project-elements/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let element = ensure_project_element_exists(&state.pool, id).await?;
    Ok(Json(DataResponse { data: element }))
}

/// GET /api/v1/project-elements/{id}/values
pub async fn list_values(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    ensure_project_element_exists(&state.pool, id).await?;
    let values = ElementValueRepo::list_for_element(&state.pool, id).await?;
    Ok(Json(DataResponse { data: values }))
}

/// PUT /api/v1/project-elements/{id}/values/{variable_id}
///
/// Upsert a value. Marks any cached rendering stale.
pub async fn set_value(
    State(state): State<AppState>,
    Path((id, variable_id)): Path<(DbId, DbId)>,
    Json(input): Json<SetElementValue>,
) -> AppResult<impl IntoResponse> {
    let value = ElementValueRepo::set(&state.pool, id, variable_id, &input).await?;
    Ok(Json(DataResponse { data: value }))
}

/// DELETE /api/v1/project-elements/{id}/values/{variable_id}
///
/// Idempotent: removing a value that was never set still returns 204.
pub async fn remove_value(
    State(state): State<AppState>,
    Path((id, variable_id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    ElementValueRepo::remove(&state.pool, id, variable_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/project-elements/{id}/render
///
/// Render now and refresh the cache.
pub async fn render(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let result = RenderedDescriptionRepo::render(&state.pool, id).await?;

    if !result.unresolved.is_empty() {
        tracing::debug!(
            project_element_id = id,
            unresolved = ?result.unresolved,
            "Rendered with unresolved placeholders"
        );
    }

    Ok(Json(DataResponse { data: result }))
}

/// GET /api/v1/project-elements/{id}/rendered
///
/// Cached rendering, recomputed first when missing or stale.
pub async fn get_rendered(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let rendered = RenderedDescriptionRepo::get_or_render(&state.pool, id).await?;
    Ok(Json(DataResponse { data: rendered }))
}
