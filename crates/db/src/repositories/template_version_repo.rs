//! Repository for the `template_versions` and `template_mappings` tables.
//!
//! Versions are created as drafts together with their placeholder mappings
//! and only ever change state through [`TemplateVersionRepo::approve`] and
//! [`TemplateVersionRepo::reject`].

use cype_core::error::CoreError;
use cype_core::placeholder::{
    analyze_template, derive_mappings, validate_template_text, DeclaredVariable,
    MappingDiagnostics,
};
use cype_core::types::DbId;
use cype_core::variables::validate_name;
use cype_core::workflow::{
    ensure_expected_state, next_state, validate_approver, validate_comment,
    validate_rejection_reason, TemplateState, WorkflowAction,
};
use sqlx::{PgConnection, PgPool};

use crate::error::{unique_violation, DbError};
use crate::models::approval::NewApprovalRecord;
use crate::models::mapping::{MappingDetail, TemplateMapping};
use crate::models::template_version::{
    ApproveTemplate, CreateTemplateDraft, RejectTemplate, TemplateVersion,
    TemplateVersionWithMappings, TransitionOutcome,
};
use crate::repositories::ApprovalRepo;

/// Column list for template_versions queries.
const COLUMNS: &str = "id, element_type_id, version_number, template_text, state, is_active, \
    created_by, created_at, updated_at";

/// Column list for template_mappings queries.
const MAPPING_COLUMNS: &str =
    "id, template_version_id, variable_id, placeholder, position, created_at, updated_at";

/// Provides the template store and approval workflow operations.
pub struct TemplateVersionRepo;

impl TemplateVersionRepo {
    /// Check a template against an element type's variables without
    /// persisting anything.
    pub async fn validate(
        pool: &PgPool,
        element_type_id: DbId,
        template_text: &str,
    ) -> Result<MappingDiagnostics, DbError> {
        validate_template_text(template_text)?;

        let mut conn = pool.acquire().await?;
        ensure_element_type(&mut *conn, element_type_id, false).await?;
        let declared = load_declared_variables(&mut *conn, element_type_id).await?;

        Ok(analyze_template(&declared, template_text))
    }

    /// Create a new DRAFT version and its placeholder mappings atomically.
    ///
    /// Fails with `InvalidTemplate` if any placeholder is undefined or any
    /// required variable is not referenced; nothing is written in that case.
    /// The element type row is locked so concurrent drafts get distinct
    /// version numbers.
    pub async fn create_draft(
        pool: &PgPool,
        input: &CreateTemplateDraft,
    ) -> Result<TemplateVersionWithMappings, DbError> {
        validate_template_text(&input.template_text)?;
        validate_name("Template author", &input.created_by)?;

        let mut tx = pool.begin().await?;

        ensure_element_type(&mut *tx, input.element_type_id, true).await?;
        let declared = load_declared_variables(&mut *tx, input.element_type_id).await?;
        let derived = derive_mappings(&declared, &input.template_text)?;

        let next_version: (i32,) = sqlx::query_as(
            "SELECT COALESCE(MAX(version_number), 0) + 1
             FROM template_versions WHERE element_type_id = $1",
        )
        .bind(input.element_type_id)
        .fetch_one(&mut *tx)
        .await?;

        let query = format!(
            "INSERT INTO template_versions
                (element_type_id, version_number, template_text, state, is_active, created_by)
             VALUES ($1, $2, $3, $4, false, $5)
             RETURNING {COLUMNS}"
        );
        let version = sqlx::query_as::<_, TemplateVersion>(&query)
            .bind(input.element_type_id)
            .bind(next_version.0)
            .bind(&input.template_text)
            .bind(TemplateState::Draft.code())
            .bind(input.created_by.trim())
            .fetch_one(&mut *tx)
            .await?;

        let insert_mapping = format!(
            "INSERT INTO template_mappings (template_version_id, variable_id, placeholder, position)
             VALUES ($1, $2, $3, $4)
             RETURNING {MAPPING_COLUMNS}"
        );
        let mut mappings = Vec::with_capacity(derived.len());
        for mapping in &derived {
            let row = sqlx::query_as::<_, TemplateMapping>(&insert_mapping)
                .bind(version.id)
                .bind(mapping.variable_id)
                .bind(&mapping.placeholder)
                .bind(mapping.position)
                .fetch_one(&mut *tx)
                .await?;
            mappings.push(row);
        }

        tx.commit().await?;

        tracing::info!(
            element_type_id = version.element_type_id,
            version_id = version.id,
            version_number = version.version_number,
            mappings = mappings.len(),
            "Template draft created"
        );
        Ok(TemplateVersionWithMappings { version, mappings })
    }

    /// Find a template version by its primary key.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<TemplateVersion>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM template_versions WHERE id = $1");
        sqlx::query_as::<_, TemplateVersion>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// The element type's single active version, if any.
    pub async fn get_active(
        pool: &PgPool,
        element_type_id: DbId,
    ) -> Result<Option<TemplateVersion>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM template_versions
             WHERE element_type_id = $1 AND is_active"
        );
        sqlx::query_as::<_, TemplateVersion>(&query)
            .bind(element_type_id)
            .fetch_optional(pool)
            .await
    }

    /// Full version history for an element type, newest first.
    pub async fn list_for_element_type(
        pool: &PgPool,
        element_type_id: DbId,
    ) -> Result<Vec<TemplateVersion>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM template_versions
             WHERE element_type_id = $1
             ORDER BY version_number DESC"
        );
        sqlx::query_as::<_, TemplateVersion>(&query)
            .bind(element_type_id)
            .fetch_all(pool)
            .await
    }

    /// Versions still in review, ordered by element type, then closest to
    /// approval first, then oldest first.
    pub async fn list_pending(
        pool: &PgPool,
        element_type_id: Option<DbId>,
    ) -> Result<Vec<TemplateVersion>, sqlx::Error> {
        let pending: Vec<&str> = TemplateState::PENDING.iter().map(|s| s.code()).collect();
        let query = format!(
            "SELECT {COLUMNS} FROM template_versions
             WHERE state = ANY($1)
               AND ($2::BIGINT IS NULL OR element_type_id = $2)
             ORDER BY element_type_id ASC, state DESC, created_at ASC, id ASC"
        );
        sqlx::query_as::<_, TemplateVersion>(&query)
            .bind(&pending)
            .bind(element_type_id)
            .fetch_all(pool)
            .await
    }

    /// A version's mappings in position order, with variable details.
    pub async fn list_mappings(
        pool: &PgPool,
        template_version_id: DbId,
    ) -> Result<Vec<MappingDetail>, sqlx::Error> {
        sqlx::query_as::<_, MappingDetail>(
            "SELECT m.placeholder, m.position, m.variable_id,
                    v.name AS variable_name, v.kind, v.unit, v.is_required
             FROM template_mappings m
             JOIN element_variables v ON v.id = m.variable_id
             WHERE m.template_version_id = $1
             ORDER BY m.position ASC",
        )
        .bind(template_version_id)
        .fetch_all(pool)
        .await
    }

    /// Raw mapping rows for a version, in position order.
    pub async fn mappings_for_version(
        conn: &mut PgConnection,
        template_version_id: DbId,
    ) -> Result<Vec<TemplateMapping>, sqlx::Error> {
        let query = format!(
            "SELECT {MAPPING_COLUMNS} FROM template_mappings
             WHERE template_version_id = $1
             ORDER BY position ASC"
        );
        sqlx::query_as::<_, TemplateMapping>(&query)
            .bind(template_version_id)
            .fetch_all(conn)
            .await
    }

    // -----------------------------------------------------------------------
    // Approval workflow
    // -----------------------------------------------------------------------

    /// Advance a version one review step. Approving a REVIEW2 version
    /// activates it and deactivates the element type's previous active
    /// version in the same transaction.
    pub async fn approve(
        pool: &PgPool,
        id: DbId,
        input: &ApproveTemplate,
    ) -> Result<TransitionOutcome, DbError> {
        if let Some(comment) = input.comment.as_deref() {
            validate_comment(comment)?;
        }
        transition(
            pool,
            id,
            WorkflowAction::Approve,
            &input.approver,
            input.comment.as_deref(),
            input.expected_state,
        )
        .await
    }

    /// Reject a pending version. A reason is required.
    pub async fn reject(
        pool: &PgPool,
        id: DbId,
        input: &RejectTemplate,
    ) -> Result<TransitionOutcome, DbError> {
        let reason = validate_rejection_reason(input.reason.as_deref())?;
        transition(
            pool,
            id,
            WorkflowAction::Reject,
            &input.approver,
            Some(reason),
            input.expected_state,
        )
        .await
    }
}

/// Apply `action` to a version as a compare-and-swap on its current state.
async fn transition(
    pool: &PgPool,
    id: DbId,
    action: WorkflowAction,
    approver: &str,
    comment: Option<&str>,
    expected: Option<TemplateState>,
) -> Result<TransitionOutcome, DbError> {
    validate_approver(approver)?;
    let approver = approver.trim();

    let not_found = || CoreError::NotFound {
        entity: "TemplateVersion",
        id,
    };
    let mut tx = pool.begin().await?;

    // Lock the element type before the version, in the same order as
    // `create_draft` and `ElementTypeRepo::delete`. This also serializes
    // activations per element type.
    let owner: Option<(DbId,)> =
        sqlx::query_as("SELECT element_type_id FROM template_versions WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
    let (element_type_id,) = owner.ok_or_else(not_found)?;
    match ensure_element_type(&mut *tx, element_type_id, true).await {
        Err(DbError::Core(CoreError::NotFound { .. })) => return Err(not_found().into()),
        other => other?,
    }

    let query = format!("SELECT {COLUMNS} FROM template_versions WHERE id = $1 FOR UPDATE");
    let current = sqlx::query_as::<_, TemplateVersion>(&query)
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(not_found)?;

    let from = current.template_state()?;
    ensure_expected_state(from, expected, action)?;
    let to = next_state(from, action)?;
    let activating = to == TemplateState::Active;

    let mut superseded_version_id = None;
    if activating {
        let previous: Option<(DbId,)> = sqlx::query_as(
            "UPDATE template_versions SET is_active = false
             WHERE element_type_id = $1 AND is_active AND id <> $2
             RETURNING id",
        )
        .bind(current.element_type_id)
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;
        superseded_version_id = previous.map(|(prev,)| prev);
    }

    let query = format!(
        "UPDATE template_versions SET state = $2, is_active = $3
         WHERE id = $1 AND state = $4
         RETURNING {COLUMNS}"
    );
    let version = sqlx::query_as::<_, TemplateVersion>(&query)
        .bind(id)
        .bind(to.code())
        .bind(activating)
        .bind(from.code())
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| {
            if unique_violation(&e) == Some("uq_template_versions_one_active") {
                tracing::error!(
                    element_type_id = current.element_type_id,
                    version_id = id,
                    "Second active template version rejected by database"
                );
                DbError::Core(CoreError::Internal(
                    "Two active template versions for one element type".to_string(),
                ))
            } else {
                DbError::Database(e)
            }
        })?
        .ok_or_else(|| CoreError::InvalidTransition {
            state: from.name().to_string(),
            action: action.as_str().to_string(),
        })?;

    let record = ApprovalRepo::append(
        &mut *tx,
        &NewApprovalRecord {
            template_version_id: id,
            from_state: from.code(),
            to_state: to.code(),
            approver,
            comment,
        },
    )
    .await?;

    tx.commit().await?;

    tracing::info!(
        element_type_id = version.element_type_id,
        version_id = id,
        from_state = %from,
        to_state = %to,
        approver,
        superseded_version_id,
        "Template version transitioned"
    );

    Ok(TransitionOutcome {
        version,
        record,
        superseded_version_id,
    })
}

/// Verify the element type exists, optionally locking its row.
async fn ensure_element_type(
    conn: &mut PgConnection,
    element_type_id: DbId,
    lock: bool,
) -> Result<(), DbError> {
    let query = if lock {
        "SELECT id FROM element_types WHERE id = $1 FOR UPDATE"
    } else {
        "SELECT id FROM element_types WHERE id = $1"
    };
    let row: Option<(DbId,)> = sqlx::query_as(query)
        .bind(element_type_id)
        .fetch_optional(conn)
        .await?;
    match row {
        Some(_) => Ok(()),
        None => Err(CoreError::NotFound {
            entity: "ElementType",
            id: element_type_id,
        }
        .into()),
    }
}

async fn load_declared_variables(
    conn: &mut PgConnection,
    element_type_id: DbId,
) -> Result<Vec<DeclaredVariable>, sqlx::Error> {
    let rows: Vec<(DbId, String, bool)> = sqlx::query_as(
        "SELECT id, name, is_required FROM element_variables
         WHERE element_type_id = $1
         ORDER BY display_order ASC, name ASC",
    )
    .bind(element_type_id)
    .fetch_all(conn)
    .await?;

    Ok(rows
        .into_iter()
        .map(|(variable_id, name, required)| DeclaredVariable {
            variable_id,
            name,
            required,
        })
        .collect())
}
