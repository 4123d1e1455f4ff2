//! Route definitions for template versions and the approval workflow.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::template;
use crate::state::AppState;

/// Routes mounted at `/templates`.
///
/// ```text
/// GET    /pending             list_pending
/// GET    /{id}                get_version
/// GET    /{id}/mappings       list_mappings
/// GET    /{id}/approvals      list_approvals
/// POST   /{id}/approve        approve
/// POST   /{id}/reject         reject
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/pending", get(template::list_pending))
        .route("/{id}", get(template::get_version))
        .route("/{id}/mappings", get(template::list_mappings))
        .route("/{id}/approvals", get(template::list_approvals))
        .route("/{id}/approve", post(template::approve))
        .route("/{id}/reject", post(template::reject))
}
