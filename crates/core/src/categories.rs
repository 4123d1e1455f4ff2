//! Construction categories an element type may be filed under.
//!
//! The catalog is fixed: 33 categories, each belonging to one logical group
//! used when organizing exports.

use serde::Serialize;

use crate::error::CoreError;

/// Group reported for a category that belongs to no known group.
pub const FALLBACK_GROUP: &str = "OTROS";

/// Logical groups and their categories, in export order.
pub const CATEGORY_GROUPS: &[(&str, &[&str])] = &[
    (
        "CIVIL_CIMENTACION",
        &[
            "GEOTECNICO",
            "MOVIMIENTO DE TIERRAS",
            "CIMENTACION",
            "PILOTATGE",
            "ENCEPADOS",
            "OBRA CIVIL",
        ],
    ),
    (
        "ESTRUCTURAS",
        &[
            "ESTRUCTURA DE MADERA",
            "ESTRUCTURA METALICA",
            "ESTRUCTURA PREFABRICADA",
            "SOLERAS",
        ],
    ),
    (
        "ENVOLVENTE",
        &[
            "CUBIERTAS Y FACHADAS",
            "MURO CORTINA",
            "CARPINTERIA",
            "CARPINTERIA INDUSTRIAL",
            "INAUFUGACION",
        ],
    ),
    (
        "SANEAMIENTO",
        &[
            "SANEAMIENTO PLUVIALES CUBIERTA",
            "SANEAMIENTO RESIDUALES",
            "SANEAMIENTO URBANIZACION",
            "SLOTDRAIN",
            "SUMINISTRO SEPARADORES DE HIDROCARBURO",
        ],
    ),
    ("FONTANERIA_PCI", &["FONTANERIA", "INSTALACION PCI"]),
    (
        "ELECTRICIDAD",
        &[
            "INSTALACION BT",
            "SUMINISTROS DE ILUMINACION",
            "SUMINISTRO DE CT Y CS",
            "INSTALACION DE PARARRAYOS",
            "GRUPO ELECTROGENO",
        ],
    ),
    (
        "CLIMATIZACION",
        &["INSTALACION DE CLIMA Y VENTILACION", "INSTALACION DE FRIO"],
    ),
    (
        "EQUIPAMIENTO_ACABADOS",
        &["EQUIPAMIENTOS", "CARTELERIA", "ASCENSOR"],
    ),
    ("URBANIZACION", &["URBANIZACION EXTERIOR"]),
];

/// A category group as returned to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryGroup {
    pub group: &'static str,
    pub categories: Vec<&'static str>,
}

/// All categories, alphabetically.
pub fn all_categories() -> Vec<&'static str> {
    let mut all: Vec<&'static str> = CATEGORY_GROUPS
        .iter()
        .flat_map(|(_, cats)| cats.iter().copied())
        .collect();
    all.sort_unstable();
    all
}

/// Whether `category` is one of the official categories. Case-sensitive.
pub fn is_valid_category(category: &str) -> bool {
    CATEGORY_GROUPS
        .iter()
        .any(|(_, cats)| cats.iter().any(|c| *c == category))
}

/// The logical group of a category, or [`FALLBACK_GROUP`].
pub fn group_of(category: &str) -> &'static str {
    CATEGORY_GROUPS
        .iter()
        .find(|(_, cats)| cats.iter().any(|c| *c == category))
        .map(|(group, _)| *group)
        .unwrap_or(FALLBACK_GROUP)
}

/// Categories organized by group, in export order.
pub fn grouped() -> Vec<CategoryGroup> {
    CATEGORY_GROUPS
        .iter()
        .map(|(group, cats)| CategoryGroup {
            group: *group,
            categories: cats.to_vec(),
        })
        .collect()
}

/// Validate an optional category against the catalog.
pub fn validate_category(category: Option<&str>) -> Result<(), CoreError> {
    match category {
        Some(c) if !is_valid_category(c) => Err(CoreError::Validation(format!(
            "Invalid category '{c}'. Must be one of: {}",
            all_categories().join(", ")
        ))),
        _ => Ok(()),
    }
}
