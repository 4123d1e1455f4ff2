//! Template approval workflow.
//!
//! A template version moves `DRAFT -> REVIEW1 -> REVIEW2 -> ACTIVE` through
//! three approvals, or to `REJECTED` from any non-terminal state. `ACTIVE`
//! and `REJECTED` are terminal: a correction always starts a new draft.
//!
//! States are persisted with the short codes `S0`, `S1`, `S2`, `S3` and `D`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Maximum length for an approver identity.
pub const MAX_APPROVER_LENGTH: usize = 100;

/// Maximum length for an approval comment or rejection reason.
pub const MAX_COMMENT_LENGTH: usize = 2_000;

/// Review state of a template version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TemplateState {
    Draft,
    Review1,
    Review2,
    Active,
    Rejected,
}

impl TemplateState {
    pub const ALL: [TemplateState; 5] = [
        TemplateState::Draft,
        TemplateState::Review1,
        TemplateState::Review2,
        TemplateState::Active,
        TemplateState::Rejected,
    ];

    /// States still moving through review.
    pub const PENDING: [TemplateState; 3] = [
        TemplateState::Draft,
        TemplateState::Review1,
        TemplateState::Review2,
    ];

    /// Persisted wire code.
    pub fn code(self) -> &'static str {
        match self {
            TemplateState::Draft => "S0",
            TemplateState::Review1 => "S1",
            TemplateState::Review2 => "S2",
            TemplateState::Active => "S3",
            TemplateState::Rejected => "D",
        }
    }

    /// Parse a persisted wire code.
    pub fn from_code(code: &str) -> Result<Self, CoreError> {
        Self::ALL
            .into_iter()
            .find(|s| s.code() == code)
            .ok_or_else(|| CoreError::Internal(format!("unknown template state code '{code}'")))
    }

    pub fn name(self) -> &'static str {
        match self {
            TemplateState::Draft => "DRAFT",
            TemplateState::Review1 => "REVIEW1",
            TemplateState::Review2 => "REVIEW2",
            TemplateState::Active => "ACTIVE",
            TemplateState::Rejected => "REJECTED",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, TemplateState::Active | TemplateState::Rejected)
    }

    pub fn is_pending(self) -> bool {
        !self.is_terminal()
    }
}

impl fmt::Display for TemplateState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TemplateState {
    type Err = CoreError;

    /// Accepts either the display name (`REVIEW1`) or the wire code (`S1`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|st| st.name() == s || st.code() == s)
            .ok_or_else(|| CoreError::Validation(format!("Unknown template state '{s}'")))
    }
}

/// A reviewer's action on a template version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkflowAction {
    Approve,
    Reject,
}

impl WorkflowAction {
    pub fn as_str(self) -> &'static str {
        match self {
            WorkflowAction::Approve => "approve",
            WorkflowAction::Reject => "reject",
        }
    }
}

/// Compute the state that `action` moves `from` into.
pub fn next_state(from: TemplateState, action: WorkflowAction) -> Result<TemplateState, CoreError> {
    use TemplateState::*;

    let to = match (from, action) {
        (Draft, WorkflowAction::Approve) => Review1,
        (Review1, WorkflowAction::Approve) => Review2,
        (Review2, WorkflowAction::Approve) => Active,
        (Draft | Review1 | Review2, WorkflowAction::Reject) => Rejected,
        (Active | Rejected, _) => {
            return Err(CoreError::InvalidTransition {
                state: from.name().to_string(),
                action: action.as_str().to_string(),
            })
        }
    };
    Ok(to)
}

/// Reject a transition attempted against a state the caller no longer sees.
pub fn ensure_expected_state(
    current: TemplateState,
    expected: Option<TemplateState>,
    action: WorkflowAction,
) -> Result<(), CoreError> {
    match expected {
        Some(expected) if expected != current => Err(CoreError::InvalidTransition {
            state: current.name().to_string(),
            action: format!("{} (expected {expected})", action.as_str()),
        }),
        _ => Ok(()),
    }
}

/// Validate an approver identity: must be non-blank and within length limit.
pub fn validate_approver(approver: &str) -> Result<(), CoreError> {
    if approver.trim().is_empty() {
        return Err(CoreError::Validation(
            "Approver identity must not be empty".to_string(),
        ));
    }
    if approver.len() > MAX_APPROVER_LENGTH {
        return Err(CoreError::Validation(format!(
            "Approver identity exceeds maximum length of {MAX_APPROVER_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Validate a rejection reason: required and within length limit.
pub fn validate_rejection_reason(reason: Option<&str>) -> Result<&str, CoreError> {
    let reason = reason.map(str::trim).unwrap_or_default();
    if reason.is_empty() {
        return Err(CoreError::Validation(
            "A rejection must include a reason".to_string(),
        ));
    }
    validate_comment(reason)?;
    Ok(reason)
}

/// Validate an optional approval comment: length check only.
pub fn validate_comment(comment: &str) -> Result<(), CoreError> {
    if comment.len() > MAX_COMMENT_LENGTH {
        return Err(CoreError::Validation(format!(
            "Comment exceeds maximum length of {MAX_COMMENT_LENGTH} characters (got {})",
            comment.len()
        )));
    }
    Ok(())
}
