pub mod element_type;
pub mod health;
pub mod project;
pub mod project_element;
pub mod template;
pub mod variable;

use axum::routing::get;
use axum::Router;

use crate::handlers;
use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /categories                                      grouped category catalog
///
/// /element-types                                   list, create
/// /element-types/by-code/{code}                    get by code
/// /element-types/{id}                              get, update, delete
/// /element-types/{id}/variables                    list, define
/// /element-types/{id}/templates                    history, create draft
/// /element-types/{id}/templates/validate           diagnostics preview (POST)
/// /element-types/{id}/templates/active             active version
///
/// /variables/{id}                                  delete
/// /variables/{id}/options                          list, add
/// /variables/{id}/options/default                  set default (PUT)
/// /variables/{id}/options/{option_id}              update (PUT), remove (DELETE)
///
/// /templates/pending                               review queue
/// /templates/{id}                                  get
/// /templates/{id}/mappings                         placeholder mappings
/// /templates/{id}/approvals                        approval history
/// /templates/{id}/approve                          approve (POST)
/// /templates/{id}/reject                           reject (POST)
///
/// /projects                                        list, create
/// /projects/by-code/{code}                         get by code
/// /projects/{id}                                   get
/// /projects/{id}/status                            update status (PUT)
/// /projects/{id}/elements                          list, create instance
///
/// /project-elements/{id}                           get
/// /project-elements/{id}/values                    list values
/// /project-elements/{id}/values/{variable_id}      set (PUT), remove (DELETE)
/// /project-elements/{id}/render                    render now (POST)
/// /project-elements/{id}/rendered                  cached rendering (GET)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/categories", get(handlers::element_type::list_categories))
        .nest("/element-types", element_type::router())
        .nest("/variables", variable::router())
        .nest("/templates", template::router())
        .nest("/projects", project::router())
        .nest("/project-elements", project_element::router())
}
