//! Handlers for projects.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use cype_core::error::CoreError;
use cype_core::types::DbId;
use cype_db::models::project::{CreateProject, Project, UpdateProjectStatus};
use cype_db::models::status::ProjectStatus;
use cype_db::repositories::ProjectRepo;

use crate::error::{AppError, AppResult};
use crate::query::ProjectStatusFilter;
use crate::response::DataResponse;
use crate::state::AppState;

/// Verify that a project exists, returning the full row.
pub async fn ensure_project_exists(pool: &sqlx::PgPool, id: DbId) -> AppResult<Project> {
    ProjectRepo::find_by_id(pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Project",
            id,
        }))
}

/// GET /api/v1/projects?status=
pub async fn list(
    State(state): State<AppState>,
    Query(filter): Query<ProjectStatusFilter>,
) -> AppResult<impl IntoResponse> {
    let status = filter
        .status
        .as_deref()
        .map(ProjectStatus::from_name)
        .transpose()?;
    let projects = ProjectRepo::list(&state.pool, status).await?;
    Ok(Json(DataResponse { data: projects }))
}

/// POST /api/v1/projects
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateProject>,
) -> AppResult<impl IntoResponse> {
    let project = ProjectRepo::create(&state.pool, &input).await?;

    Ok((StatusCode::CREATED, Json(DataResponse { data: project })))
}

/// GET /api/v1/projects/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let project = ensure_project_exists(&state.pool, id).await?;
    Ok(Json(DataResponse { data: project }))
}

/// GET /api/v1/projects/by-code/{code}
pub async fn get_by_code(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> AppResult<impl IntoResponse> {
    let project = ProjectRepo::find_by_code(&state.pool, &code)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Project with code '{code}' not found")))?;
    Ok(Json(DataResponse { data: project }))
}

/// PUT /api/v1/projects/{id}/status
pub async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateProjectStatus>,
) -> AppResult<impl IntoResponse> {
    let status = ProjectStatus::from_name(&input.status)?;
    let project = ProjectRepo::update_status(&state.pool, id, status)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Project",
            id,
        }))?;

    Ok(Json(DataResponse { data: project }))
}
