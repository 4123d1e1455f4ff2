//! Repository for the `element_values` table.
//!
//! Every write invalidates the element's cached rendering inside the same
//! transaction.

use std::collections::HashMap;

use cype_core::error::CoreError;
use cype_core::types::DbId;
use sqlx::{PgConnection, PgPool};

use crate::error::DbError;
use crate::models::element_value::{ElementValue, ElementValueDetail, SetElementValue};
use crate::repositories::{ProjectElementRepo, RenderedDescriptionRepo};

/// Column list for element_values queries.
const COLUMNS: &str =
    "id, project_element_id, variable_id, value, updated_by, created_at, updated_at";

/// Provides value assignment for project elements.
pub struct ElementValueRepo;

impl ElementValueRepo {
    /// Assign (insert or overwrite) a variable's value on a project element.
    ///
    /// Fails with `VariableMismatch` if the variable belongs to a different
    /// element type. Values are stored verbatim; no kind coercion.
    pub async fn set(
        pool: &PgPool,
        project_element_id: DbId,
        variable_id: DbId,
        input: &SetElementValue,
    ) -> Result<ElementValue, DbError> {
        let mut tx = pool.begin().await?;

        let element = ProjectElementRepo::lock(&mut *tx, project_element_id).await?;

        let variable: Option<(DbId,)> =
            sqlx::query_as("SELECT element_type_id FROM element_variables WHERE id = $1")
                .bind(variable_id)
                .fetch_optional(&mut *tx)
                .await?;
        let (variable_element_type_id,) = variable.ok_or(CoreError::NotFound {
            entity: "Variable",
            id: variable_id,
        })?;
        if variable_element_type_id != element.element_type_id {
            return Err(CoreError::VariableMismatch {
                variable_id,
                element_type_id: element.element_type_id,
            }
            .into());
        }

        let query = format!(
            "INSERT INTO element_values (project_element_id, variable_id, value, updated_by)
             VALUES ($1, $2, $3, $4)
             ON CONFLICT (project_element_id, variable_id)
             DO UPDATE SET value = EXCLUDED.value, updated_by = EXCLUDED.updated_by
             RETURNING {COLUMNS}"
        );
        let value = sqlx::query_as::<_, ElementValue>(&query)
            .bind(project_element_id)
            .bind(variable_id)
            .bind(&input.value)
            .bind(&input.updated_by)
            .fetch_one(&mut *tx)
            .await?;

        RenderedDescriptionRepo::invalidate(&mut *tx, project_element_id).await?;

        tx.commit().await?;

        tracing::debug!(project_element_id, variable_id, "Element value set");
        Ok(value)
    }

    /// Remove a variable's value. Succeeds whether or not a value existed;
    /// returns `true` if one was deleted.
    pub async fn remove(
        pool: &PgPool,
        project_element_id: DbId,
        variable_id: DbId,
    ) -> Result<bool, DbError> {
        let mut tx = pool.begin().await?;

        ProjectElementRepo::lock(&mut *tx, project_element_id).await?;

        let result = sqlx::query(
            "DELETE FROM element_values WHERE project_element_id = $1 AND variable_id = $2",
        )
        .bind(project_element_id)
        .bind(variable_id)
        .execute(&mut *tx)
        .await?;

        let removed = result.rows_affected() > 0;
        if removed {
            RenderedDescriptionRepo::invalidate(&mut *tx, project_element_id).await?;
        }

        tx.commit().await?;

        tracing::debug!(project_element_id, variable_id, removed, "Element value removed");
        Ok(removed)
    }

    /// An element's values with their variable definitions, in variable
    /// display order.
    pub async fn list_for_element(
        pool: &PgPool,
        project_element_id: DbId,
    ) -> Result<Vec<ElementValueDetail>, sqlx::Error> {
        sqlx::query_as::<_, ElementValueDetail>(
            "SELECT ev.variable_id, v.name AS variable_name, v.kind, v.unit,
                    ev.value, ev.updated_by, ev.updated_at
             FROM element_values ev
             JOIN element_variables v ON v.id = ev.variable_id
             WHERE ev.project_element_id = $1
             ORDER BY v.display_order ASC, v.name ASC",
        )
        .bind(project_element_id)
        .fetch_all(pool)
        .await
    }

    /// Values keyed by variable id, for rendering.
    pub async fn values_by_variable(
        conn: &mut PgConnection,
        project_element_id: DbId,
    ) -> Result<HashMap<DbId, String>, sqlx::Error> {
        let rows: Vec<(DbId, String)> = sqlx::query_as(
            "SELECT variable_id, value FROM element_values WHERE project_element_id = $1",
        )
        .bind(project_element_id)
        .fetch_all(conn)
        .await?;
        Ok(rows.into_iter().collect())
    }
}
