//! Placeholder extraction and template-to-variable mapping.
//!
//! A description template references element variables with `{identifier}`
//! tokens. Before a template version is stored, every token must resolve to
//! a declared variable and every required variable must appear at least
//! once. The resulting mapping rows record each placeholder's variable and
//! its 1-based first-occurrence position.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::error::CoreError;
use crate::types::DbId;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Regex pattern matching `{identifier}` tokens. The identifier is captured
/// in group 1.
pub const PLACEHOLDER_PATTERN: &str = r"\{([A-Za-z_][A-Za-z0-9_]*)\}";

/// Maximum length for a description template in characters.
pub const MAX_TEMPLATE_LENGTH: usize = 20_000;

/// Compiled regex for `{identifier}` extraction. Compiled once, reused forever.
pub(crate) static PLACEHOLDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(PLACEHOLDER_PATTERN).expect("valid regex"));

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// The parts of a variable definition the mapper needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclaredVariable {
    pub variable_id: DbId,
    pub name: String,
    pub required: bool,
}

/// One placeholder-to-variable row derived from a template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DerivedMapping {
    pub placeholder: String,
    pub variable_id: DbId,
    /// 1-based order of first appearance in the template text.
    pub position: i32,
}

/// Outcome of checking a template against an element type's variables.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MappingDiagnostics {
    /// Distinct placeholders in first-occurrence order.
    pub placeholders: Vec<String>,
    /// Placeholders with no matching variable, in first-occurrence order.
    pub undefined_placeholders: Vec<String>,
    /// Required variables absent from the template, in the order given.
    pub missing_required_variables: Vec<String>,
}

impl MappingDiagnostics {
    pub fn is_valid(&self) -> bool {
        self.undefined_placeholders.is_empty() && self.missing_required_variables.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Extraction
// ---------------------------------------------------------------------------

/// Extract the distinct placeholder names from a template, without braces,
/// in order of first appearance.
pub fn extract_placeholders(template: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    PLACEHOLDER_RE
        .captures_iter(template)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str())
        .filter(|name| seen.insert(*name))
        .map(str::to_string)
        .collect()
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate raw template text: must be non-blank and within length limit.
pub fn validate_template_text(text: &str) -> Result<(), CoreError> {
    if text.trim().is_empty() {
        return Err(CoreError::Validation(
            "Template text must not be empty".to_string(),
        ));
    }
    let len = text.chars().count();
    if len > MAX_TEMPLATE_LENGTH {
        return Err(CoreError::Validation(format!(
            "Template text exceeds maximum length of {MAX_TEMPLATE_LENGTH} characters (got {len})"
        )));
    }
    Ok(())
}

/// Compare a template's placeholders with the declared variables without
/// failing. Used both for previews and as the first step of
/// [`derive_mappings`].
pub fn analyze_template(variables: &[DeclaredVariable], template: &str) -> MappingDiagnostics {
    let placeholders = extract_placeholders(template);

    let declared: HashSet<&str> = variables.iter().map(|v| v.name.as_str()).collect();
    let used: HashSet<&str> = placeholders.iter().map(String::as_str).collect();

    let undefined_placeholders = placeholders
        .iter()
        .filter(|p| !declared.contains(p.as_str()))
        .cloned()
        .collect();

    let missing_required_variables = variables
        .iter()
        .filter(|v| v.required && !used.contains(v.name.as_str()))
        .map(|v| v.name.clone())
        .collect();

    MappingDiagnostics {
        placeholders,
        undefined_placeholders,
        missing_required_variables,
    }
}

/// Derive the placeholder mappings for a template.
///
/// Fails with [`CoreError::InvalidTemplate`] when any placeholder has no
/// variable or any required variable is never referenced. On success there
/// is exactly one mapping per distinct placeholder, with contiguous
/// positions starting at 1. Text limits are checked separately by
/// [`validate_template_text`].
pub fn derive_mappings(
    variables: &[DeclaredVariable],
    template: &str,
) -> Result<Vec<DerivedMapping>, CoreError> {
    let diagnostics = analyze_template(variables, template);
    if !diagnostics.is_valid() {
        return Err(CoreError::InvalidTemplate {
            undefined_placeholders: diagnostics.undefined_placeholders,
            missing_required_variables: diagnostics.missing_required_variables,
        });
    }

    let mut mappings = Vec::with_capacity(diagnostics.placeholders.len());
    for (index, placeholder) in diagnostics.placeholders.into_iter().enumerate() {
        let variable = variables
            .iter()
            .find(|v| v.name == placeholder)
            .ok_or_else(|| {
                CoreError::Internal(format!("placeholder '{placeholder}' lost its variable"))
            })?;
        mappings.push(DerivedMapping {
            placeholder,
            variable_id: variable.variable_id,
            position: index as i32 + 1,
        });
    }
    Ok(mappings)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
