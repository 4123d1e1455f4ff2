//! Repository for the `element_types` table.

use cype_core::categories::validate_category;
use cype_core::error::CoreError;
use cype_core::types::DbId;
use cype_core::variables::{validate_code, validate_name};
use sqlx::PgPool;

use crate::error::{foreign_key_violation, map_unique, DbError};
use crate::models::element_type::{CreateElementType, ElementType, UpdateElementType};

/// Column list for element_types queries.
const COLUMNS: &str = "id, code, name, category, price, created_by, created_at, updated_at";

/// Provides CRUD operations for element types.
pub struct ElementTypeRepo;

impl ElementTypeRepo {
    /// Insert a new element type, returning the created row.
    ///
    /// Fails with `Conflict` if the code is already registered.
    pub async fn create(pool: &PgPool, input: &CreateElementType) -> Result<ElementType, DbError> {
        validate_code("Element type code", &input.code)?;
        validate_name("Element type name", &input.name)?;
        validate_category(input.category.as_deref())?;
        validate_price(input.price)?;

        let query = format!(
            "INSERT INTO element_types (code, name, category, price, created_by)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        let element_type = sqlx::query_as::<_, ElementType>(&query)
            .bind(input.code.trim())
            .bind(input.name.trim())
            .bind(&input.category)
            .bind(input.price)
            .bind(&input.created_by)
            .fetch_one(pool)
            .await
            .map_err(|e| {
                map_unique(e, "uq_element_types_code", || {
                    CoreError::Conflict(format!(
                        "Element type code '{}' already exists",
                        input.code.trim()
                    ))
                })
            })?;

        tracing::info!(
            element_type_id = element_type.id,
            code = %element_type.code,
            "Element type created"
        );
        Ok(element_type)
    }

    /// Find an element type by its primary key.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<ElementType>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM element_types WHERE id = $1");
        sqlx::query_as::<_, ElementType>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find an element type by its unique code.
    pub async fn find_by_code(
        pool: &PgPool,
        code: &str,
    ) -> Result<Option<ElementType>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM element_types WHERE code = $1");
        sqlx::query_as::<_, ElementType>(&query)
            .bind(code)
            .fetch_optional(pool)
            .await
    }

    /// List element types ordered by code, optionally filtered by category.
    pub async fn list(
        pool: &PgPool,
        category: Option<&str>,
    ) -> Result<Vec<ElementType>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM element_types
             WHERE ($1::TEXT IS NULL OR category = $1)
             ORDER BY code ASC"
        );
        sqlx::query_as::<_, ElementType>(&query)
            .bind(category)
            .fetch_all(pool)
            .await
    }

    /// Rename an element type and/or change its unit price. Only non-`None`
    /// fields are applied. Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateElementType,
    ) -> Result<Option<ElementType>, DbError> {
        if let Some(name) = &input.name {
            validate_name("Element type name", name)?;
        }
        validate_price(input.price)?;

        let query = format!(
            "UPDATE element_types SET
                name = COALESCE($2, name),
                price = COALESCE($3, price)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let updated = sqlx::query_as::<_, ElementType>(&query)
            .bind(id)
            .bind(input.name.as_deref().map(str::trim))
            .bind(input.price)
            .fetch_optional(pool)
            .await?;
        Ok(updated)
    }

    /// Delete an element type together with its variables and template
    /// history. Fails with `Conflict` while any project element uses it.
    ///
    /// Template versions go first: their mappings hold `NO ACTION` references
    /// to the variables, which PostgreSQL checks after each cascade step.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, DbError> {
        let mut tx = pool.begin().await?;

        let locked: Option<(DbId,)> =
            sqlx::query_as("SELECT id FROM element_types WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        if locked.is_none() {
            return Ok(false);
        }

        sqlx::query("DELETE FROM template_versions WHERE element_type_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(map_in_use)?;

        let result = sqlx::query("DELETE FROM element_types WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(map_in_use)?;

        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }
}

/// Foreign keys from `project_elements` that block deleting an element type.
const PROJECT_ELEMENT_REFERENCES: [&str; 2] = [
    "project_elements_element_type_id_fkey",
    "project_elements_template_version_id_fkey",
];

fn map_in_use(err: sqlx::Error) -> DbError {
    let in_use = matches!(
        foreign_key_violation(&err),
        Some(constraint) if PROJECT_ELEMENT_REFERENCES.contains(&constraint)
    );
    if in_use {
        DbError::Core(CoreError::Conflict(
            "Element type is used by project elements".to_string(),
        ))
    } else {
        DbError::Database(err)
    }
}

fn validate_price(price: Option<f64>) -> Result<(), CoreError> {
    match price {
        Some(p) if !p.is_finite() || p < 0.0 => Err(CoreError::Validation(
            "Price must be a non-negative number".to_string(),
        )),
        _ => Ok(()),
    }
}
