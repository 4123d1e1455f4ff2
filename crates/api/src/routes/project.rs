use axum::routing::{get, put};
use axum::Router;

use crate::handlers::{project, project_element};
use crate::state::AppState;

/// Routes mounted at `/projects`.
///
/// ```text
/// GET, POST   /                   list, create
/// GET         /by-code/{code}     get_by_code
/// GET         /{id}               get_by_id
/// PUT         /{id}/status        update_status
/// GET, POST   /{id}/elements      list_for_project, create
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(project::list).post(project::create))
        .route("/by-code/{code}", get(project::get_by_code))
        .route("/{id}", get(project::get_by_id))
        .route("/{id}/status", put(project::update_status))
        .route(
            "/{id}/elements",
            get(project_element::list_for_project).post(project_element::create),
        )
}
