use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::project_element;
use crate::state::AppState;

/// Routes mounted at `/project-elements`.
///
/// ```text
/// GET           /{id}                          get_by_id
/// GET           /{id}/values                   list_values
/// PUT, DELETE   /{id}/values/{variable_id}     set_value, remove_value
/// POST          /{id}/render                   render
/// GET           /{id}/rendered                 get_rendered
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{id}", get(project_element::get_by_id))
        .route("/{id}/values", get(project_element::list_values))
        .route(
            "/{id}/values/{variable_id}",
            put(project_element::set_value).delete(project_element::remove_value),
        )
        .route("/{id}/render", post(project_element::render))
        .route("/{id}/rendered", get(project_element::get_rendered))
}
