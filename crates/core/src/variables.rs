//! Variable kinds, input types and field validation for the variable registry.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Maximum length for a variable name.
pub const MAX_VARIABLE_NAME_LENGTH: usize = 100;

/// Maximum length for a unit string (e.g. `cm`, `kg/m²`).
pub const MAX_UNIT_LENGTH: usize = 20;

/// Maximum length for an option value or label.
pub const MAX_OPTION_LENGTH: usize = 255;

/// Maximum length for element type, project and instance codes.
pub const MAX_CODE_LENGTH: usize = 50;

/// Maximum length for display names.
pub const MAX_NAME_LENGTH: usize = 255;

static IDENTIFIER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid regex"));

/// Declared type of a variable. Values are always stored as text; the kind
/// only informs the input boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum VariableKind {
    Text,
    Numeric,
    Date,
}

impl VariableKind {
    pub fn as_str(self) -> &'static str {
        match self {
            VariableKind::Text => "TEXT",
            VariableKind::Numeric => "NUMERIC",
            VariableKind::Date => "DATE",
        }
    }
}

impl fmt::Display for VariableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VariableKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "TEXT" => Ok(VariableKind::Text),
            "NUMERIC" => Ok(VariableKind::Numeric),
            "DATE" => Ok(VariableKind::Date),
            other => Err(CoreError::InvalidKind {
                kind: other.to_string(),
            }),
        }
    }
}

/// How a variable is presented for input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InputType {
    /// Closed choice among the variable's allowed options.
    Dropdown,
    FreeInput,
}

impl InputType {
    pub fn for_option_count(count: usize) -> Self {
        if count > 0 {
            InputType::Dropdown
        } else {
            InputType::FreeInput
        }
    }
}

/// Validate a variable name. Names are referenced as `{name}` placeholders,
/// so they must be identifiers.
pub fn validate_variable_name(name: &str) -> Result<(), CoreError> {
    if name.is_empty() {
        return Err(CoreError::Validation(
            "Variable name must not be empty".to_string(),
        ));
    }
    if name.len() > MAX_VARIABLE_NAME_LENGTH {
        return Err(CoreError::Validation(format!(
            "Variable name exceeds maximum length of {MAX_VARIABLE_NAME_LENGTH} characters"
        )));
    }
    if !IDENTIFIER_RE.is_match(name) {
        return Err(CoreError::Validation(format!(
            "Variable name '{name}' must start with a letter or underscore and contain only letters, digits and underscores"
        )));
    }
    Ok(())
}

/// Validate an optional unit: length check only.
pub fn validate_unit(unit: Option<&str>) -> Result<(), CoreError> {
    if let Some(unit) = unit {
        if unit.chars().count() > MAX_UNIT_LENGTH {
            return Err(CoreError::Validation(format!(
                "Unit exceeds maximum length of {MAX_UNIT_LENGTH} characters"
            )));
        }
    }
    Ok(())
}

/// Validate an option value: must be non-empty and within length limit.
pub fn validate_option_value(value: &str) -> Result<(), CoreError> {
    if value.trim().is_empty() {
        return Err(CoreError::Validation(
            "Option value must not be empty".to_string(),
        ));
    }
    if value.chars().count() > MAX_OPTION_LENGTH {
        return Err(CoreError::Validation(format!(
            "Option value exceeds maximum length of {MAX_OPTION_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Validate a business code (element type, project or instance code).
pub fn validate_code(field: &str, code: &str) -> Result<(), CoreError> {
    if code.trim().is_empty() {
        return Err(CoreError::Validation(format!("{field} must not be empty")));
    }
    if code.chars().count() > MAX_CODE_LENGTH {
        return Err(CoreError::Validation(format!(
            "{field} exceeds maximum length of {MAX_CODE_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Validate a display name: must be non-empty and within length limit.
pub fn validate_name(field: &str, name: &str) -> Result<(), CoreError> {
    if name.trim().is_empty() {
        return Err(CoreError::Validation(format!("{field} must not be empty")));
    }
    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(CoreError::Validation(format!(
            "{field} exceeds maximum length of {MAX_NAME_LENGTH} characters"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn kinds_parse_from_closed_set() {
        assert_eq!("TEXT".parse::<VariableKind>().unwrap(), VariableKind::Text);
        assert_eq!("NUMERIC".parse::<VariableKind>().unwrap(), VariableKind::Numeric);
        assert_eq!("DATE".parse::<VariableKind>().unwrap(), VariableKind::Date);
    }

    #[test]
    fn unknown_kind_is_invalid_kind() {
        assert_matches!(
            "BOOLEAN".parse::<VariableKind>(),
            Err(CoreError::InvalidKind { kind }) if kind == "BOOLEAN"
        );
        assert!("text".parse::<VariableKind>().is_err());
    }

    #[test]
    fn input_type_follows_options() {
        assert_eq!(InputType::for_option_count(0), InputType::FreeInput);
        assert_eq!(InputType::for_option_count(3), InputType::Dropdown);
    }

    #[test]
    fn variable_names_must_be_identifiers() {
        assert!(validate_variable_name("espesor_cm").is_ok());
        assert!(validate_variable_name("_x1").is_ok());
        assert!(validate_variable_name("").is_err());
        assert!(validate_variable_name("1width").is_err());
        assert!(validate_variable_name("wall width").is_err());
        assert!(validate_variable_name("ancho-muro").is_err());
    }

    #[test]
    fn unit_length_checked() {
        assert!(validate_unit(None).is_ok());
        assert!(validate_unit(Some("kg/m²")).is_ok());
        assert!(validate_unit(Some(&"u".repeat(MAX_UNIT_LENGTH + 1))).is_err());
    }

    #[test]
    fn option_value_must_be_present() {
        assert!(validate_option_value("HA-25").is_ok());
        assert!(validate_option_value(" ").is_err());
    }

    #[test]
    fn codes_and_names_checked() {
        assert!(validate_code("Element code", "EHM010").is_ok());
        let err = validate_code("Element code", "").unwrap_err();
        assert!(err.to_string().contains("Element code must not be empty"));
        assert!(validate_code("Project code", &"P".repeat(MAX_CODE_LENGTH + 1)).is_err());
        assert!(validate_name("Project name", "Nave logística").is_ok());
        assert!(validate_name("Project name", "").is_err());
    }
}
