//! Repository for the `project_elements` table.
//!
//! A project element is locked to one ACTIVE template version when it is
//! created; no method ever changes that lock.

use cype_core::error::CoreError;
use cype_core::types::DbId;
use cype_core::variables::validate_code;
use cype_core::workflow::TemplateState;
use sqlx::{PgConnection, PgPool};

use crate::error::{map_unique, DbError};
use crate::models::project_element::{CreateProjectElement, ProjectElement};

/// Column list for project_elements queries.
const COLUMNS: &str = "id, project_id, element_type_id, template_version_id, instance_code, \
    instance_name, location, created_by, created_at, updated_at";

/// Provides operations for project element instances.
pub struct ProjectElementRepo;

impl ProjectElementRepo {
    /// Create an element instance in a project, locked to a template version.
    ///
    /// Fails with `InvalidVersion` if the version belongs to another element
    /// type or is not ACTIVE, and with `DuplicateInstanceCode` if the code is
    /// already used in the project.
    pub async fn create(
        pool: &PgPool,
        project_id: DbId,
        input: &CreateProjectElement,
    ) -> Result<ProjectElement, DbError> {
        validate_code("Instance code", &input.instance_code)?;
        let instance_code = input.instance_code.trim();

        let mut tx = pool.begin().await?;

        let project: Option<(DbId,)> = sqlx::query_as("SELECT id FROM projects WHERE id = $1")
            .bind(project_id)
            .fetch_optional(&mut *tx)
            .await?;
        if project.is_none() {
            return Err(CoreError::NotFound {
                entity: "Project",
                id: project_id,
            }
            .into());
        }

        let element_type: Option<(DbId,)> =
            sqlx::query_as("SELECT id FROM element_types WHERE id = $1")
                .bind(input.element_type_id)
                .fetch_optional(&mut *tx)
                .await?;
        if element_type.is_none() {
            return Err(CoreError::NotFound {
                entity: "ElementType",
                id: input.element_type_id,
            }
            .into());
        }

        let template_version_id =
            resolve_version(&mut *tx, input.element_type_id, input.template_version_id).await?;

        let query = format!(
            "INSERT INTO project_elements
                (project_id, element_type_id, template_version_id, instance_code,
                 instance_name, location, created_by)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {COLUMNS}"
        );
        let element = sqlx::query_as::<_, ProjectElement>(&query)
            .bind(project_id)
            .bind(input.element_type_id)
            .bind(template_version_id)
            .bind(instance_code)
            .bind(&input.instance_name)
            .bind(&input.location)
            .bind(&input.created_by)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| {
                map_unique(e, "uq_project_elements_project_instance_code", || {
                    CoreError::DuplicateInstanceCode {
                        instance_code: instance_code.to_string(),
                    }
                })
            })?;

        tx.commit().await?;

        tracing::info!(
            project_id,
            project_element_id = element.id,
            element_type_id = element.element_type_id,
            version_id = element.template_version_id,
            instance_code = %element.instance_code,
            "Project element created"
        );
        Ok(element)
    }

    /// Find a project element by its primary key.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<ProjectElement>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM project_elements WHERE id = $1");
        sqlx::query_as::<_, ProjectElement>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List a project's element instances ordered by instance code.
    pub async fn list_for_project(
        pool: &PgPool,
        project_id: DbId,
    ) -> Result<Vec<ProjectElement>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM project_elements
             WHERE project_id = $1
             ORDER BY instance_code ASC"
        );
        sqlx::query_as::<_, ProjectElement>(&query)
            .bind(project_id)
            .fetch_all(pool)
            .await
    }

    /// Lock a project element row for the rest of the caller's transaction.
    ///
    /// Value writes and renders both take this lock, so a render never
    /// interleaves with a value write and its cache invalidation.
    pub async fn lock(conn: &mut PgConnection, id: DbId) -> Result<ProjectElement, DbError> {
        let query = format!("SELECT {COLUMNS} FROM project_elements WHERE id = $1 FOR UPDATE");
        let element = sqlx::query_as::<_, ProjectElement>(&query)
            .bind(id)
            .fetch_optional(conn)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "ProjectElement",
                id,
            })?;
        Ok(element)
    }
}

/// Pick the version to lock onto and check it is lockable.
async fn resolve_version(
    conn: &mut PgConnection,
    element_type_id: DbId,
    requested: Option<DbId>,
) -> Result<DbId, DbError> {
    let row: Option<(DbId, DbId, String)> = match requested {
        Some(version_id) => {
            sqlx::query_as("SELECT id, element_type_id, state FROM template_versions WHERE id = $1")
                .bind(version_id)
                .fetch_optional(&mut *conn)
                .await?
        }
        None => {
            sqlx::query_as(
                "SELECT id, element_type_id, state FROM template_versions
                 WHERE element_type_id = $1 AND is_active",
            )
            .bind(element_type_id)
            .fetch_optional(&mut *conn)
            .await?
        }
    };

    let (version_id, version_element_type_id, state) = match (row, requested) {
        (Some(row), _) => row,
        (None, Some(version_id)) => {
            return Err(CoreError::NotFound {
                entity: "TemplateVersion",
                id: version_id,
            }
            .into())
        }
        (None, None) => {
            return Err(CoreError::InvalidVersion(format!(
                "Element type {element_type_id} has no active template version"
            ))
            .into())
        }
    };

    if version_element_type_id != element_type_id {
        return Err(CoreError::InvalidVersion(format!(
            "Template version {version_id} belongs to element type {version_element_type_id}, not {element_type_id}"
        ))
        .into());
    }
    let state = TemplateState::from_code(&state)?;
    if state != TemplateState::Active {
        return Err(CoreError::InvalidVersion(format!(
            "Template version {version_id} is {state}; only ACTIVE versions can be used"
        ))
        .into());
    }
    Ok(version_id)
}
