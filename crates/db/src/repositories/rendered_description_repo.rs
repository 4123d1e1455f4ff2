//! Repository for the `rendered_descriptions` cache.
//!
//! Rendering always reads the project element's locked template version,
//! never the element type's current active one. The cache row is only ever
//! marked fresh here; value writes mark it stale via [`RenderedDescriptionRepo::invalidate`].

use cype_core::error::CoreError;
use cype_core::rendering::{needs_render, render_template, PlaceholderBinding, RenderOutput};
use cype_core::types::DbId;
use sqlx::{PgConnection, PgPool};

use crate::error::DbError;
use crate::models::rendered_description::{RenderResult, RenderedDescription};
use crate::repositories::{ElementValueRepo, ProjectElementRepo, TemplateVersionRepo};

/// Column list for rendered_descriptions queries.
const COLUMNS: &str =
    "project_element_id, rendered_text, is_stale, rendered_at, created_at, updated_at";

/// Provides rendering and cache access.
pub struct RenderedDescriptionRepo;

impl RenderedDescriptionRepo {
    /// Render a project element against its locked template and store the
    /// result as a fresh cache entry.
    pub async fn render(pool: &PgPool, project_element_id: DbId) -> Result<RenderResult, DbError> {
        let mut tx = pool.begin().await?;
        let (output, cached, template_version_id) =
            render_locked(&mut *tx, project_element_id).await?;
        tx.commit().await?;

        Ok(RenderResult {
            project_element_id,
            template_version_id,
            text: output.text,
            unresolved: output.unresolved,
            rendered_at: cached.rendered_at,
        })
    }

    /// Return the cached rendering, re-rendering first when it is missing
    /// or stale.
    pub async fn get_or_render(
        pool: &PgPool,
        project_element_id: DbId,
    ) -> Result<RenderedDescription, DbError> {
        let cached = Self::find(pool, project_element_id).await?;
        if let Some(cached) = cached {
            if !needs_render(Some(cached.is_stale)) {
                return Ok(cached);
            }
        }

        let mut tx = pool.begin().await?;
        let (_, fresh, _) = render_locked(&mut *tx, project_element_id).await?;
        tx.commit().await?;
        Ok(fresh)
    }

    /// The cached rendering for a project element, if one exists.
    pub async fn find(
        pool: &PgPool,
        project_element_id: DbId,
    ) -> Result<Option<RenderedDescription>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM rendered_descriptions WHERE project_element_id = $1"
        );
        sqlx::query_as::<_, RenderedDescription>(&query)
            .bind(project_element_id)
            .fetch_optional(pool)
            .await
    }

    /// Mark the element's cached rendering stale, if there is one. Must run
    /// in the same transaction as the value change.
    pub async fn invalidate(
        conn: &mut PgConnection,
        project_element_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE rendered_descriptions SET is_stale = true WHERE project_element_id = $1",
        )
        .bind(project_element_id)
        .execute(conn)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}

/// Render under the project element's row lock and upsert the cache row.
async fn render_locked(
    conn: &mut PgConnection,
    project_element_id: DbId,
) -> Result<(RenderOutput, RenderedDescription, DbId), DbError> {
    let element = ProjectElementRepo::lock(&mut *conn, project_element_id).await?;

    let template: Option<(String,)> =
        sqlx::query_as("SELECT template_text FROM template_versions WHERE id = $1")
            .bind(element.template_version_id)
            .fetch_optional(&mut *conn)
            .await?;
    let Some((template_text,)) = template else {
        tracing::error!(
            project_element_id,
            version_id = element.template_version_id,
            "Locked template version is missing"
        );
        return Err(CoreError::Internal(format!(
            "Template version {} locked by project element {project_element_id} is missing",
            element.template_version_id
        ))
        .into());
    };

    let mappings =
        TemplateVersionRepo::mappings_for_version(&mut *conn, element.template_version_id).await?;
    let bindings: Vec<PlaceholderBinding> = mappings.iter().map(PlaceholderBinding::from).collect();
    let values = ElementValueRepo::values_by_variable(&mut *conn, project_element_id).await?;

    let output = render_template(&template_text, &bindings, &values);

    let query = format!(
        "INSERT INTO rendered_descriptions (project_element_id, rendered_text, is_stale, rendered_at)
         VALUES ($1, $2, false, NOW())
         ON CONFLICT (project_element_id)
         DO UPDATE SET rendered_text = EXCLUDED.rendered_text,
                       is_stale = false,
                       rendered_at = EXCLUDED.rendered_at
         RETURNING {COLUMNS}"
    );
    let cached = sqlx::query_as::<_, RenderedDescription>(&query)
        .bind(project_element_id)
        .bind(&output.text)
        .fetch_one(&mut *conn)
        .await?;

    tracing::debug!(
        project_element_id,
        version_id = element.template_version_id,
        unresolved = output.unresolved.len(),
        "Description rendered"
    );
    Ok((output, cached, element.template_version_id))
}
