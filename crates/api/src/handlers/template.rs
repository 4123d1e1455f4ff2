//! Handlers for template versions and the three-step approval workflow.
//!
//! Approver identity travels in the request body; every accepted action is
//! recorded as an approval record in the same transaction as the state
//! change.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use cype_core::error::CoreError;
use cype_core::types::DbId;
use cype_db::models::template_version::{
    ApproveTemplate, RejectTemplate, SubmitTemplateDraft, TemplateVersion, ValidateTemplate,
};
use cype_db::repositories::{ApprovalRepo, TemplateVersionRepo};

use crate::error::{AppError, AppResult};
use crate::handlers::element_type::ensure_element_type_exists;
use crate::query::PendingFilter;
use crate::response::DataResponse;
use crate::state::AppState;

/// Verify that a template version exists, returning the full row.
async fn ensure_version_exists(pool: &sqlx::PgPool, id: DbId) -> AppResult<TemplateVersion> {
    TemplateVersionRepo::find_by_id(pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "TemplateVersion",
            id,
        }))
}

/// POST /api/v1/element-types/{id}/templates/validate
///
/// Report undefined placeholders and unreferenced required variables
/// without creating anything.
pub async fn validate_template(
    State(state): State<AppState>,
    Path(element_type_id): Path<DbId>,
    Json(input): Json<ValidateTemplate>,
) -> AppResult<impl IntoResponse> {
    let diagnostics =
        TemplateVersionRepo::validate(&state.pool, element_type_id, &input.template_text).await?;
    Ok(Json(DataResponse { data: diagnostics }))
}

/// POST /api/v1/element-types/{id}/templates
///
/// Create a DRAFT version with its derived placeholder mappings.
pub async fn create_draft(
    State(state): State<AppState>,
    Path(element_type_id): Path<DbId>,
    Json(input): Json<SubmitTemplateDraft>,
) -> AppResult<impl IntoResponse> {
    let draft = input.into_draft(element_type_id);
    let created = TemplateVersionRepo::create_draft(&state.pool, &draft).await?;

    Ok((StatusCode::CREATED, Json(DataResponse { data: created })))
}

/// GET /api/v1/element-types/{id}/templates
///
/// Full version history, newest first.
pub async fn list_history(
    State(state): State<AppState>,
    Path(element_type_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    ensure_element_type_exists(&state.pool, element_type_id).await?;
    let versions = TemplateVersionRepo::list_for_element_type(&state.pool, element_type_id).await?;
    Ok(Json(DataResponse { data: versions }))
}

/// GET /api/v1/element-types/{id}/templates/active
///
/// `data` is `null` when the element type has no active version yet.
pub async fn get_active(
    State(state): State<AppState>,
    Path(element_type_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    ensure_element_type_exists(&state.pool, element_type_id).await?;
    let active = TemplateVersionRepo::get_active(&state.pool, element_type_id).await?;
    Ok(Json(DataResponse { data: active }))
}

/// GET /api/v1/templates/pending?element_type_id=
///
/// Versions awaiting a decision, grouped by element type with the ones
/// closest to activation first.
pub async fn list_pending(
    State(state): State<AppState>,
    Query(filter): Query<PendingFilter>,
) -> AppResult<impl IntoResponse> {
    let pending = TemplateVersionRepo::list_pending(&state.pool, filter.element_type_id).await?;
    Ok(Json(DataResponse { data: pending }))
}

/// GET /api/v1/templates/{id}
pub async fn get_version(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let version = ensure_version_exists(&state.pool, id).await?;
    Ok(Json(DataResponse { data: version }))
}

/// GET /api/v1/templates/{id}/mappings
pub async fn list_mappings(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    ensure_version_exists(&state.pool, id).await?;
    let mappings = TemplateVersionRepo::list_mappings(&state.pool, id).await?;
    Ok(Json(DataResponse { data: mappings }))
}

/// GET /api/v1/templates/{id}/approvals
pub async fn list_approvals(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    ensure_version_exists(&state.pool, id).await?;
    let records = ApprovalRepo::list_for_version(&state.pool, id).await?;
    Ok(Json(DataResponse { data: records }))
}

/// POST /api/v1/templates/{id}/approve
pub async fn approve(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<ApproveTemplate>,
) -> AppResult<impl IntoResponse> {
    let outcome = TemplateVersionRepo::approve(&state.pool, id, &input).await?;

    Ok(Json(DataResponse { data: outcome }))
}

/// POST /api/v1/templates/{id}/reject
///
/// A reason is mandatory.
pub async fn reject(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<RejectTemplate>,
) -> AppResult<impl IntoResponse> {
    let outcome = TemplateVersionRepo::reject(&state.pool, id, &input).await?;

    Ok(Json(DataResponse { data: outcome }))
}
