//! HTTP-level integration tests for template drafts, the approval workflow,
//! projects and description rendering.

mod common;

use axum::http::StatusCode;
use common::{body_json, delete, get, post_json, put_json};
use serde_json::json;
use sqlx::PgPool;

const WALL: &str = "Muro de {espesor} cm de {material}";

/// Element type with `espesor` and `material`, both required.
async fn seed_wall(pool: &PgPool) -> (i64, i64, i64) {
    let et = common::create_element_type(pool, "EHM010").await;
    let espesor = common::define_variable(pool, et, "espesor", "NUMERIC", true).await;
    let material = common::define_variable(pool, et, "material", "TEXT", true).await;
    (et, espesor, material)
}

async fn create_project(pool: &PgPool, code: &str) -> i64 {
    let app = common::build_test_app(pool.clone());
    let response = post_json(
        app,
        "/api/v1/projects",
        json!({"code": code, "name": "Nave logística", "location": "Zaragoza"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"]["id"].as_i64().unwrap()
}

async fn create_instance(pool: &PgPool, project_id: i64, element_type_id: i64, code: &str) -> i64 {
    let app = common::build_test_app(pool.clone());
    let response = post_json(
        app,
        &format!("/api/v1/projects/{project_id}/elements"),
        json!({"element_type_id": element_type_id, "instance_code": code}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"]["id"].as_i64().unwrap()
}

// ---------------------------------------------------------------------------
// Templates
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_validate_reports_diagnostics_without_creating(pool: PgPool) {
    let (et, _, _) = seed_wall(&pool).await;

    let app = common::build_test_app(pool.clone());
    let response = post_json(
        app,
        &format!("/api/v1/element-types/{et}/templates/validate"),
        json!({"template_text": "Muro de {espesor} cm de {acabado}"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["data"]["placeholders"], json!(["espesor", "acabado"]));
    assert_eq!(json["data"]["undefined_placeholders"], json!(["acabado"]));
    assert_eq!(json["data"]["missing_required_variables"], json!(["material"]));

    let app = common::build_test_app(pool);
    let history = body_json(get(app, &format!("/api/v1/element-types/{et}/templates")).await).await;
    assert!(history["data"].as_array().unwrap().is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_draft_returns_mappings(pool: PgPool) {
    let (et, espesor, material) = seed_wall(&pool).await;

    let app = common::build_test_app(pool);
    let response = post_json(
        app,
        &format!("/api/v1/element-types/{et}/templates"),
        json!({"template_text": WALL, "created_by": "redactor"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = body_json(response).await;
    assert_eq!(json["data"]["state"], "S0");
    assert_eq!(json["data"]["version_number"], 1);
    assert_eq!(json["data"]["is_active"], false);

    let mappings = json["data"]["mappings"].as_array().unwrap();
    assert_eq!(mappings.len(), 2);
    assert_eq!(mappings[0]["placeholder"], "espesor");
    assert_eq!(mappings[0]["variable_id"], espesor);
    assert_eq!(mappings[0]["position"], 1);
    assert_eq!(mappings[1]["variable_id"], material);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_invalid_draft_returns_400_with_details(pool: PgPool) {
    let (et, _, _) = seed_wall(&pool).await;

    let app = common::build_test_app(pool);
    let response = post_json(
        app,
        &format!("/api/v1/element-types/{et}/templates"),
        json!({"template_text": "Muro de {grosor} cm", "created_by": "redactor"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert_eq!(json["code"], "INVALID_TEMPLATE");
    assert_eq!(json["details"]["undefined_placeholders"], json!(["grosor"]));
    assert_eq!(
        json["details"]["missing_required_variables"],
        json!(["espesor", "material"])
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_three_approvals_activate_and_supersede(pool: PgPool) {
    let (et, _, _) = seed_wall(&pool).await;
    let v1 = common::submit_draft(&pool, et, WALL).await;
    common::approve_to_active(&pool, v1).await;

    let v2 = common::submit_draft(&pool, et, "Muro {material} de {espesor} cm").await;
    for approver in ["tecnico", "jefe_obra"] {
        let app = common::build_test_app(pool.clone());
        post_json(
            app,
            &format!("/api/v1/templates/{v2}/approve"),
            json!({"approver": approver}),
        )
        .await;
    }

    let app = common::build_test_app(pool.clone());
    let response = post_json(
        app,
        &format!("/api/v1/templates/{v2}/approve"),
        json!({"approver": "direccion", "comment": "OK", "expected_state": "REVIEW2"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["data"]["version"]["state"], "S3");
    assert_eq!(json["data"]["version"]["is_active"], true);
    assert_eq!(json["data"]["record"]["from_state"], "S2");
    assert_eq!(json["data"]["record"]["to_state"], "S3");
    assert_eq!(json["data"]["superseded_version_id"], v1);

    let app = common::build_test_app(pool.clone());
    let active =
        body_json(get(app, &format!("/api/v1/element-types/{et}/templates/active")).await).await;
    assert_eq!(active["data"]["id"], v2);

    let app = common::build_test_app(pool);
    let old = body_json(get(app, &format!("/api/v1/templates/{v1}")).await).await;
    assert_eq!(old["data"]["is_active"], false);
    assert_eq!(old["data"]["state"], "S3");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_active_is_null_before_any_activation(pool: PgPool) {
    let (et, _, _) = seed_wall(&pool).await;

    let app = common::build_test_app(pool.clone());
    let response = get(app, &format!("/api/v1/element-types/{et}/templates/active")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_json(response).await["data"].is_null());

    let app = common::build_test_app(pool);
    let response = get(app, "/api/v1/element-types/999999/templates/active").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_reject_requires_reason_and_is_terminal(pool: PgPool) {
    let (et, _, _) = seed_wall(&pool).await;
    let v1 = common::submit_draft(&pool, et, WALL).await;
    let reject_uri = format!("/api/v1/templates/{v1}/reject");

    let app = common::build_test_app(pool.clone());
    let response = post_json(app, &reject_uri, json!({"approver": "tecnico"})).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let app = common::build_test_app(pool.clone());
    let response = post_json(
        app,
        &reject_uri,
        json!({"approver": "tecnico", "reason": "Falta la unidad"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["version"]["state"], "D");

    let app = common::build_test_app(pool.clone());
    let response = post_json(
        app,
        &format!("/api/v1/templates/{v1}/approve"),
        json!({"approver": "jefe_obra"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(response).await["code"], "INVALID_TRANSITION");

    let app = common::build_test_app(pool);
    let approvals = body_json(get(app, &format!("/api/v1/templates/{v1}/approvals")).await).await;
    let records = approvals["data"].as_array().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["comment"], "Falta la unidad");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_stale_expected_state_returns_409(pool: PgPool) {
    let (et, _, _) = seed_wall(&pool).await;
    let v1 = common::submit_draft(&pool, et, WALL).await;

    let app = common::build_test_app(pool);
    let response = post_json(
        app,
        &format!("/api/v1/templates/{v1}/approve"),
        json!({"approver": "tecnico", "expected_state": "REVIEW1"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_pending_queue_excludes_terminal_versions(pool: PgPool) {
    let (et, _, _) = seed_wall(&pool).await;
    let active = common::submit_draft(&pool, et, WALL).await;
    common::approve_to_active(&pool, active).await;
    let draft = common::submit_draft(&pool, et, WALL).await;
    let reviewed = common::submit_draft(&pool, et, WALL).await;

    let app = common::build_test_app(pool.clone());
    post_json(
        app,
        &format!("/api/v1/templates/{reviewed}/approve"),
        json!({"approver": "tecnico"}),
    )
    .await;

    let app = common::build_test_app(pool);
    let response = get(app, &format!("/api/v1/templates/pending?element_type_id={et}")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    let ids: Vec<i64> = json["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![reviewed, draft]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_mappings_endpoint_joins_variables(pool: PgPool) {
    let (et, _, _) = seed_wall(&pool).await;
    let v1 = common::submit_draft(&pool, et, WALL).await;

    let app = common::build_test_app(pool);
    let json = body_json(get(app, &format!("/api/v1/templates/{v1}/mappings")).await).await;
    let mappings = json["data"].as_array().unwrap();
    assert_eq!(mappings[0]["variable_name"], "espesor");
    assert_eq!(mappings[0]["kind"], "NUMERIC");
    assert_eq!(mappings[1]["variable_name"], "material");
}

// ---------------------------------------------------------------------------
// Projects
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_project_lifecycle(pool: PgPool) {
    let id = create_project(&pool, "P-2026-001").await;

    let app = common::build_test_app(pool.clone());
    let json = body_json(get(app, &format!("/api/v1/projects/{id}")).await).await;
    assert_eq!(json["data"]["status"], "PLANNING");

    let app = common::build_test_app(pool.clone());
    let response = put_json(
        app,
        &format!("/api/v1/projects/{id}/status"),
        json!({"status": "ACTIVE"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["status"], "ACTIVE");

    let app = common::build_test_app(pool.clone());
    let json = body_json(get(app, "/api/v1/projects?status=ACTIVE").await).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 1);

    let app = common::build_test_app(pool.clone());
    let response = get(app, "/api/v1/projects?status=ARCHIVED").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let app = common::build_test_app(pool);
    let response = get(app, "/api/v1/projects/by-code/P-2026-001").await;
    assert_eq!(body_json(response).await["data"]["id"], id);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_instance_without_active_version_returns_400(pool: PgPool) {
    let (et, _, _) = seed_wall(&pool).await;
    let project = create_project(&pool, "P-1").await;

    let app = common::build_test_app(pool);
    let response = post_json(
        app,
        &format!("/api/v1/projects/{project}/elements"),
        json!({"element_type_id": et, "instance_code": "M-01"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "INVALID_VERSION");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_duplicate_instance_code_returns_409(pool: PgPool) {
    let (et, _, _) = seed_wall(&pool).await;
    let v1 = common::submit_draft(&pool, et, WALL).await;
    common::approve_to_active(&pool, v1).await;
    let project = create_project(&pool, "P-1").await;
    create_instance(&pool, project, et, "M-01").await;

    let app = common::build_test_app(pool);
    let response = post_json(
        app,
        &format!("/api/v1/projects/{project}/elements"),
        json!({"element_type_id": et, "instance_code": "M-01"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(response).await["code"], "DUPLICATE_INSTANCE_CODE");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_elements_of_missing_project_returns_404(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = get(app, "/api/v1/projects/999999/elements").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Values and rendering
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_render_substitutes_values_and_tracks_staleness(pool: PgPool) {
    let (et, espesor, material) = seed_wall(&pool).await;
    let v1 = common::submit_draft(&pool, et, WALL).await;
    common::approve_to_active(&pool, v1).await;
    let project = create_project(&pool, "P-1").await;
    let pe = create_instance(&pool, project, et, "M-01").await;

    let app = common::build_test_app(pool.clone());
    let response = put_json(
        app,
        &format!("/api/v1/project-elements/{pe}/values/{espesor}"),
        json!({"value": "30", "updated_by": "tecnico"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let app = common::build_test_app(pool.clone());
    let uri = format!("/api/v1/project-elements/{pe}/render");
    let response = post_json(app, &uri, json!({})).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["text"], "Muro de 30 cm de {material}");
    assert_eq!(json["data"]["unresolved"], json!(["material"]));
    assert_eq!(json["data"]["template_version_id"], v1);

    let app = common::build_test_app(pool.clone());
    put_json(
        app,
        &format!("/api/v1/project-elements/{pe}/values/{material}"),
        json!({"value": "hormigón HA-25"}),
    )
    .await;

    let app = common::build_test_app(pool.clone());
    let response = get(app, &format!("/api/v1/project-elements/{pe}/rendered")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["rendered_text"], "Muro de 30 cm de hormigón HA-25");
    assert_eq!(json["data"]["is_stale"], false);

    let app = common::build_test_app(pool.clone());
    let response = delete(app, &format!("/api/v1/project-elements/{pe}/values/{material}")).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let app = common::build_test_app(pool.clone());
    let json = body_json(get(app, &format!("/api/v1/project-elements/{pe}/rendered")).await).await;
    assert_eq!(json["data"]["rendered_text"], "Muro de 30 cm de {material}");

    let app = common::build_test_app(pool);
    let json = body_json(get(app, &format!("/api/v1/project-elements/{pe}/values")).await).await;
    let values = json["data"].as_array().unwrap();
    assert_eq!(values.len(), 1);
    assert_eq!(values[0]["variable_name"], "espesor");
    assert_eq!(values[0]["value"], "30");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_value_for_foreign_variable_returns_400(pool: PgPool) {
    let (et, _, _) = seed_wall(&pool).await;
    let v1 = common::submit_draft(&pool, et, WALL).await;
    common::approve_to_active(&pool, v1).await;
    let other = common::create_element_type(&pool, "EAS010").await;
    let foreign = common::define_variable(&pool, other, "perfil", "TEXT", false).await;
    let project = create_project(&pool, "P-1").await;
    let pe = create_instance(&pool, project, et, "M-01").await;

    let app = common::build_test_app(pool);
    let response = put_json(
        app,
        &format!("/api/v1/project-elements/{pe}/values/{foreign}"),
        json!({"value": "HEB-200"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VARIABLE_MISMATCH");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_render_missing_element_returns_404(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = post_json(app, "/api/v1/project-elements/999999/render", json!({})).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
