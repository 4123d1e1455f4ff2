//! Approval audit trail models.

use cype_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `approval_records` table. Append-only.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ApprovalRecord {
    pub id: DbId,
    pub template_version_id: DbId,
    pub from_state: String,
    pub to_state: String,
    pub approver: String,
    pub comment: Option<String>,
    pub decided_at: Timestamp,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Input for appending an approval record.
#[derive(Debug, Clone)]
pub struct NewApprovalRecord<'a> {
    pub template_version_id: DbId,
    pub from_state: &'a str,
    pub to_state: &'a str,
    pub approver: &'a str,
    pub comment: Option<&'a str>,
}
