//! Route definitions for element types and their nested collections.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{element_type, template, variable};
use crate::state::AppState;

/// Routes mounted at `/element-types`.
///
/// ```text
/// GET, POST       /                           list, create
/// GET             /by-code/{code}             get_by_code
/// GET, PUT, DEL   /{id}                       get, update, delete
/// GET, POST       /{id}/variables             list_variables, define_variable
/// GET, POST       /{id}/templates             list_history, create_draft
/// POST            /{id}/templates/validate    validate_template
/// GET             /{id}/templates/active      get_active
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(element_type::list).post(element_type::create))
        .route("/by-code/{code}", get(element_type::get_by_code))
        .route(
            "/{id}",
            get(element_type::get_by_id)
                .put(element_type::update)
                .delete(element_type::delete),
        )
        .route(
            "/{id}/variables",
            get(variable::list_variables).post(variable::define_variable),
        )
        .route(
            "/{id}/templates",
            get(template::list_history).post(template::create_draft),
        )
        .route("/{id}/templates/validate", post(template::validate_template))
        .route("/{id}/templates/active", get(template::get_active))
}
