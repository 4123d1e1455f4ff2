#![allow(dead_code)]

use cype_db::models::element_type::{CreateElementType, ElementType};
use cype_db::models::project::{CreateProject, Project};
use cype_db::models::project_element::{CreateProjectElement, ProjectElement};
use cype_db::models::template_version::{ApproveTemplate, CreateTemplateDraft, TemplateVersion};
use cype_db::models::variable::{CreateVariable, Variable};
use cype_db::repositories::{
    ElementTypeRepo, ProjectElementRepo, ProjectRepo, TemplateVersionRepo, VariableRepo,
};
use sqlx::PgPool;

pub const WALL_TEMPLATE: &str = "Wall {width} cm of {material}";

pub fn new_element_type(code: &str) -> CreateElementType {
    CreateElementType {
        code: code.to_string(),
        name: format!("Element {code}"),
        category: None,
        price: None,
        created_by: None,
    }
}

pub fn new_variable(name: &str, kind: &str, required: bool) -> CreateVariable {
    CreateVariable {
        name: name.to_string(),
        kind: kind.to_string(),
        unit: None,
        default_value: None,
        is_required: Some(required),
        display_order: None,
    }
}

pub fn approval(approver: &str) -> ApproveTemplate {
    ApproveTemplate {
        approver: approver.to_string(),
        comment: None,
        expected_state: None,
    }
}

/// The `WALL` element type with required `width` (NUMERIC) and `material` (TEXT).
pub struct Wall {
    pub element_type: ElementType,
    pub width: Variable,
    pub material: Variable,
}

pub async fn seed_wall(pool: &PgPool, code: &str) -> Wall {
    let element_type = ElementTypeRepo::create(pool, &new_element_type(code))
        .await
        .unwrap();
    let mut width = new_variable("width", "NUMERIC", true);
    width.unit = Some("cm".to_string());
    width.display_order = Some(1);
    let width = VariableRepo::define(pool, element_type.id, &width).await.unwrap();
    let mut material = new_variable("material", "TEXT", true);
    material.display_order = Some(2);
    let material = VariableRepo::define(pool, element_type.id, &material)
        .await
        .unwrap();
    Wall {
        element_type,
        width,
        material,
    }
}

pub async fn create_draft(pool: &PgPool, element_type_id: i64, text: &str) -> TemplateVersion {
    TemplateVersionRepo::create_draft(
        pool,
        &CreateTemplateDraft {
            element_type_id,
            template_text: text.to_string(),
            created_by: "author".to_string(),
        },
    )
    .await
    .unwrap()
    .version
}

/// Approve a version three times, taking it from DRAFT to ACTIVE.
pub async fn activate(pool: &PgPool, version_id: i64) -> TemplateVersion {
    let mut version = None;
    for approver in ["first", "second", "third"] {
        let outcome = TemplateVersionRepo::approve(pool, version_id, &approval(approver))
            .await
            .unwrap();
        version = Some(outcome.version);
    }
    version.unwrap()
}

pub async fn create_project(pool: &PgPool, code: &str) -> Project {
    ProjectRepo::create(
        pool,
        &CreateProject {
            code: code.to_string(),
            name: format!("Project {code}"),
            status: None,
            start_date: None,
            end_date: None,
            location: None,
            created_by: None,
        },
    )
    .await
    .unwrap()
}

pub fn new_project_element(
    element_type_id: i64,
    template_version_id: Option<i64>,
    instance_code: &str,
) -> CreateProjectElement {
    CreateProjectElement {
        element_type_id,
        template_version_id,
        instance_code: instance_code.to_string(),
        instance_name: None,
        location: None,
        created_by: None,
    }
}

pub async fn create_project_element(
    pool: &PgPool,
    project_id: i64,
    element_type_id: i64,
    template_version_id: i64,
    instance_code: &str,
) -> ProjectElement {
    ProjectElementRepo::create(
        pool,
        project_id,
        &new_project_element(element_type_id, Some(template_version_id), instance_code),
    )
    .await
    .unwrap()
}
