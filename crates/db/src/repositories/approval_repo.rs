//! Repository for the append-only `approval_records` table.

use cype_core::types::DbId;
use sqlx::{PgConnection, PgPool};

use crate::models::approval::{ApprovalRecord, NewApprovalRecord};

/// Column list for approval_records queries.
const COLUMNS: &str = "id, template_version_id, from_state, to_state, approver, comment, \
    decided_at, created_at, updated_at";

/// Appends and reads approval records. There is no update or delete path.
pub struct ApprovalRepo;

impl ApprovalRepo {
    /// Append a record inside the caller's transaction.
    pub async fn append(
        conn: &mut PgConnection,
        input: &NewApprovalRecord<'_>,
    ) -> Result<ApprovalRecord, sqlx::Error> {
        let query = format!(
            "INSERT INTO approval_records
                (template_version_id, from_state, to_state, approver, comment)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ApprovalRecord>(&query)
            .bind(input.template_version_id)
            .bind(input.from_state)
            .bind(input.to_state)
            .bind(input.approver)
            .bind(input.comment)
            .fetch_one(conn)
            .await
    }

    /// List a version's approval history in chronological order.
    pub async fn list_for_version(
        pool: &PgPool,
        template_version_id: DbId,
    ) -> Result<Vec<ApprovalRecord>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM approval_records
             WHERE template_version_id = $1
             ORDER BY decided_at ASC, id ASC"
        );
        sqlx::query_as::<_, ApprovalRecord>(&query)
            .bind(template_version_id)
            .fetch_all(pool)
            .await
    }
}
