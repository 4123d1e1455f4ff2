use axum::routing::{delete, get, put};
use axum::Router;

use crate::handlers::variable;
use crate::state::AppState;

/// Routes mounted at `/variables`.
///
/// ```text
/// DELETE      /{id}                          delete_variable
/// GET, POST   /{id}/options                  list_options, add_option
/// PUT         /{id}/options/default          set_default_option
/// PUT, DELETE /{id}/options/{option_id}      update_option, remove_option
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{id}", delete(variable::delete_variable))
        .route(
            "/{id}/options",
            get(variable::list_options).post(variable::add_option),
        )
        .route("/{id}/options/default", put(variable::set_default_option))
        .route(
            "/{id}/options/{option_id}",
            put(variable::update_option).delete(variable::remove_option),
        )
}
