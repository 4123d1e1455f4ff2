//! Repository for the `projects` table.

use cype_core::error::CoreError;
use cype_core::types::DbId;
use cype_core::variables::{validate_code, validate_name};
use sqlx::PgPool;

use crate::error::{map_unique, DbError};
use crate::models::project::{CreateProject, Project};
use crate::models::status::ProjectStatus;

/// Column list for projects queries, qualified for the status join.
const COLUMNS: &str = "p.id, p.code, p.name, p.status_id, s.name AS status, p.start_date, \
    p.end_date, p.location, p.created_by, p.created_at, p.updated_at";

/// Provides CRUD operations for projects.
pub struct ProjectRepo;

impl ProjectRepo {
    /// Insert a new project, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateProject) -> Result<Project, DbError> {
        validate_code("Project code", &input.code)?;
        validate_name("Project name", &input.name)?;
        let status = match input.status.as_deref() {
            Some(name) => ProjectStatus::from_name(name)?,
            None => ProjectStatus::Planning,
        };
        if let (Some(start), Some(end)) = (input.start_date, input.end_date) {
            if end < start {
                return Err(CoreError::Validation(
                    "Project end date must not be before its start date".to_string(),
                )
                .into());
            }
        }

        let query = format!(
            "WITH p AS (
                INSERT INTO projects
                    (code, name, status_id, start_date, end_date, location, created_by)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                RETURNING *
             )
             SELECT {COLUMNS} FROM p JOIN project_statuses s ON s.id = p.status_id"
        );
        let project = sqlx::query_as::<_, Project>(&query)
            .bind(input.code.trim())
            .bind(input.name.trim())
            .bind(status.id())
            .bind(input.start_date)
            .bind(input.end_date)
            .bind(&input.location)
            .bind(&input.created_by)
            .fetch_one(pool)
            .await
            .map_err(|e| {
                map_unique(e, "uq_projects_code", || {
                    CoreError::Conflict(format!(
                        "Project code '{}' already exists",
                        input.code.trim()
                    ))
                })
            })?;

        tracing::info!(project_id = project.id, code = %project.code, "Project created");
        Ok(project)
    }

    /// Find a project by its primary key.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Project>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM projects p
             JOIN project_statuses s ON s.id = p.status_id
             WHERE p.id = $1"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a project by its unique code.
    pub async fn find_by_code(pool: &PgPool, code: &str) -> Result<Option<Project>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM projects p
             JOIN project_statuses s ON s.id = p.status_id
             WHERE p.code = $1"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(code)
            .fetch_optional(pool)
            .await
    }

    /// List projects ordered by code, optionally filtered by status.
    pub async fn list(
        pool: &PgPool,
        status: Option<ProjectStatus>,
    ) -> Result<Vec<Project>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM projects p
             JOIN project_statuses s ON s.id = p.status_id
             WHERE ($1::SMALLINT IS NULL OR p.status_id = $1)
             ORDER BY p.code ASC"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(status.map(ProjectStatus::id))
            .fetch_all(pool)
            .await
    }

    /// Change a project's status. Returns `None` if the project does not exist.
    pub async fn update_status(
        pool: &PgPool,
        id: DbId,
        status: ProjectStatus,
    ) -> Result<Option<Project>, sqlx::Error> {
        let query = format!(
            "WITH p AS (
                UPDATE projects SET status_id = $2 WHERE id = $1 RETURNING *
             )
             SELECT {COLUMNS} FROM p JOIN project_statuses s ON s.id = p.status_id"
        );
        let project = sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .bind(status.id())
            .fetch_optional(pool)
            .await?;
        if let Some(project) = &project {
            tracing::info!(
                project_id = project.id,
                status = %project.status,
                "Project status updated"
            );
        }
        Ok(project)
    }
}
