//! Description rendering: substitutes stored values into a locked template.
//!
//! Rendering is a pure function of the template text, its placeholder
//! mappings and the assigned values. A placeholder whose variable has no
//! value is left in the output verbatim, so an incomplete rendering is a
//! normal, inspectable result rather than an error.

use std::collections::{HashMap, HashSet};

use regex::Captures;
use serde::Serialize;

use crate::placeholder::PLACEHOLDER_RE;
use crate::types::DbId;

/// A placeholder token and the variable it is mapped to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceholderBinding {
    pub placeholder: String,
    pub variable_id: DbId,
}

/// Result of rendering a template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderOutput {
    pub text: String,
    /// Distinct placeholders left in `text`, in first-occurrence order.
    pub unresolved: Vec<String>,
}

impl RenderOutput {
    pub fn is_complete(&self) -> bool {
        self.unresolved.is_empty()
    }
}

/// Render `template` by replacing each `{placeholder}` with the value of the
/// variable it is bound to.
///
/// Matching is exact and case-sensitive. Tokens are replaced left to right
/// in a single pass, so a value that itself contains `{name}` is never
/// expanded again. Tokens without a binding or without a value stay as-is.
pub fn render_template(
    template: &str,
    bindings: &[PlaceholderBinding],
    values: &HashMap<DbId, String>,
) -> RenderOutput {
    let by_placeholder: HashMap<&str, DbId> = bindings
        .iter()
        .map(|b| (b.placeholder.as_str(), b.variable_id))
        .collect();

    let mut unresolved = Vec::new();
    let mut seen_unresolved = HashSet::new();

    let text = PLACEHOLDER_RE.replace_all(template, |caps: &Captures<'_>| {
        let name = &caps[1];
        let value = by_placeholder
            .get(name)
            .and_then(|variable_id| values.get(variable_id));
        match value {
            Some(value) => value.clone(),
            None => {
                if seen_unresolved.insert(name.to_string()) {
                    unresolved.push(name.to_string());
                }
                caps[0].to_string()
            }
        }
    });

    RenderOutput {
        text: text.into_owned(),
        unresolved,
    }
}

/// Whether a cached rendering must be recomputed. `None` means no cache row.
pub fn needs_render(cached_stale: Option<bool>) -> bool {
    cached_stale.unwrap_or(true)
}
