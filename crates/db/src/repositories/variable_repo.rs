//! Repository for the `element_variables` and `variable_options` tables.

use std::collections::HashMap;

use cype_core::error::CoreError;
use cype_core::types::DbId;
use cype_core::variables::{
    validate_option_value, validate_unit, validate_variable_name, VariableKind,
};
use sqlx::PgPool;

use crate::error::{foreign_key_violation, map_unique, DbError};
use crate::models::variable::{
    CreateVariable, CreateVariableOption, UpdateVariableOption, Variable, VariableOption,
    VariableWithOptions,
};

/// Column list for element_variables queries.
const COLUMNS: &str = "id, element_type_id, name, kind, unit, default_value, is_required, \
    display_order, created_at, updated_at";

/// Column list for variable_options queries.
const OPTION_COLUMNS: &str =
    "id, variable_id, value, label, display_order, is_default, created_at, updated_at";

/// Provides operations for the variable registry.
pub struct VariableRepo;

impl VariableRepo {
    /// Define a new variable for an element type.
    ///
    /// Fails with `InvalidKind` for an unknown kind and `DuplicateName` if
    /// the name is already used by this element type.
    pub async fn define(
        pool: &PgPool,
        element_type_id: DbId,
        input: &CreateVariable,
    ) -> Result<Variable, DbError> {
        validate_variable_name(&input.name)?;
        let kind: VariableKind = input.kind.parse()?;
        validate_unit(input.unit.as_deref())?;

        let exists: Option<(DbId,)> = sqlx::query_as("SELECT id FROM element_types WHERE id = $1")
            .bind(element_type_id)
            .fetch_optional(pool)
            .await?;
        if exists.is_none() {
            return Err(CoreError::NotFound {
                entity: "ElementType",
                id: element_type_id,
            }
            .into());
        }

        let query = format!(
            "INSERT INTO element_variables
                (element_type_id, name, kind, unit, default_value, is_required, display_order)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {COLUMNS}"
        );
        let variable = sqlx::query_as::<_, Variable>(&query)
            .bind(element_type_id)
            .bind(&input.name)
            .bind(kind.as_str())
            .bind(&input.unit)
            .bind(&input.default_value)
            .bind(input.is_required.unwrap_or(true))
            .bind(input.display_order.unwrap_or(0))
            .fetch_one(pool)
            .await
            .map_err(|e| {
                map_unique(e, "uq_element_variables_element_type_name", || {
                    CoreError::DuplicateName {
                        name: input.name.clone(),
                    }
                })
            })?;

        tracing::info!(
            element_type_id,
            variable_id = variable.id,
            name = %variable.name,
            kind = %variable.kind,
            "Variable defined"
        );
        Ok(variable)
    }

    /// Find a variable by its primary key.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Variable>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM element_variables WHERE id = $1");
        sqlx::query_as::<_, Variable>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List an element type's variables by display order, then name.
    pub async fn list_for_element_type(
        pool: &PgPool,
        element_type_id: DbId,
    ) -> Result<Vec<Variable>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM element_variables
             WHERE element_type_id = $1
             ORDER BY display_order ASC, name ASC"
        );
        sqlx::query_as::<_, Variable>(&query)
            .bind(element_type_id)
            .fetch_all(pool)
            .await
    }

    /// List an element type's variables, each with its allowed options.
    pub async fn list_with_options(
        pool: &PgPool,
        element_type_id: DbId,
    ) -> Result<Vec<VariableWithOptions>, sqlx::Error> {
        let variables = Self::list_for_element_type(pool, element_type_id).await?;
        let ids: Vec<DbId> = variables.iter().map(|v| v.id).collect();

        let query = format!(
            "SELECT {OPTION_COLUMNS} FROM variable_options
             WHERE variable_id = ANY($1)
             ORDER BY display_order ASC, value ASC"
        );
        let options = sqlx::query_as::<_, VariableOption>(&query)
            .bind(&ids)
            .fetch_all(pool)
            .await?;

        let mut by_variable: HashMap<DbId, Vec<VariableOption>> = HashMap::new();
        for option in options {
            by_variable.entry(option.variable_id).or_default().push(option);
        }

        Ok(variables
            .into_iter()
            .map(|v| {
                let options = by_variable.remove(&v.id).unwrap_or_default();
                VariableWithOptions::new(v, options)
            })
            .collect())
    }

    /// Delete a variable. Fails with `VariableInUse` while any template
    /// mapping or project value references it.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, DbError> {
        let Some(variable) = Self::find_by_id(pool, id).await? else {
            return Ok(false);
        };

        let result = sqlx::query("DELETE FROM element_variables WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await
            .map_err(|e| {
                if foreign_key_violation(&e).is_some() {
                    DbError::Core(CoreError::VariableInUse {
                        name: variable.name.clone(),
                    })
                } else {
                    DbError::Database(e)
                }
            })?;

        if result.rows_affected() > 0 {
            tracing::info!(variable_id = id, name = %variable.name, "Variable deleted");
        }
        Ok(result.rows_affected() > 0)
    }

    // -----------------------------------------------------------------------
    // Options
    // -----------------------------------------------------------------------

    /// Register an allowed option for a variable.
    ///
    /// Fails with `DuplicateOption` if the value is already registered. When
    /// `is_default` is set, any previous default is cleared in the same
    /// transaction.
    pub async fn add_option(
        pool: &PgPool,
        variable_id: DbId,
        input: &CreateVariableOption,
    ) -> Result<VariableOption, DbError> {
        validate_option_value(&input.value)?;
        let is_default = input.is_default.unwrap_or(false);

        let mut tx = pool.begin().await?;

        lock_variable(&mut *tx, variable_id).await?;

        if is_default {
            clear_default(&mut *tx, variable_id).await?;
        }

        let query = format!(
            "INSERT INTO variable_options (variable_id, value, label, display_order, is_default)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {OPTION_COLUMNS}"
        );
        let option = sqlx::query_as::<_, VariableOption>(&query)
            .bind(variable_id)
            .bind(&input.value)
            .bind(&input.label)
            .bind(input.display_order.unwrap_or(0))
            .bind(is_default)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| {
                map_unique(e, "uq_variable_options_variable_value", || {
                    CoreError::DuplicateOption {
                        value: input.value.clone(),
                    }
                })
            })?;

        tx.commit().await?;
        Ok(option)
    }

    /// List a variable's options by display order, then value.
    pub async fn list_options(
        pool: &PgPool,
        variable_id: DbId,
    ) -> Result<Vec<VariableOption>, sqlx::Error> {
        let query = format!(
            "SELECT {OPTION_COLUMNS} FROM variable_options
             WHERE variable_id = $1
             ORDER BY display_order ASC, value ASC"
        );
        sqlx::query_as::<_, VariableOption>(&query)
            .bind(variable_id)
            .fetch_all(pool)
            .await
    }

    /// Make the option with `value` the variable's only default.
    pub async fn set_default_option(
        pool: &PgPool,
        variable_id: DbId,
        value: &str,
    ) -> Result<VariableOption, DbError> {
        let mut tx = pool.begin().await?;

        lock_variable(&mut *tx, variable_id).await?;
        clear_default(&mut *tx, variable_id).await?;

        let query = format!(
            "UPDATE variable_options SET is_default = true
             WHERE variable_id = $1 AND value = $2
             RETURNING {OPTION_COLUMNS}"
        );
        let option = sqlx::query_as::<_, VariableOption>(&query)
            .bind(variable_id)
            .bind(value)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| {
                CoreError::Validation(format!(
                    "Option '{value}' is not registered for variable {variable_id}"
                ))
            })?;

        tx.commit().await?;
        Ok(option)
    }

    /// Update an option's value, label, order or default flag.
    ///
    /// Returns `None` if the option does not belong to the variable. Renaming
    /// onto a value already registered fails with `DuplicateOption`.
    pub async fn update_option(
        pool: &PgPool,
        variable_id: DbId,
        option_id: DbId,
        input: &UpdateVariableOption,
    ) -> Result<Option<VariableOption>, DbError> {
        if let Some(value) = &input.value {
            validate_option_value(value)?;
        }

        let mut tx = pool.begin().await?;

        lock_variable(&mut *tx, variable_id).await?;

        if input.is_default == Some(true) {
            clear_default(&mut *tx, variable_id).await?;
        }

        let query = format!(
            "UPDATE variable_options SET
                value = COALESCE($3, value),
                label = COALESCE($4, label),
                display_order = COALESCE($5, display_order),
                is_default = COALESCE($6, is_default)
             WHERE id = $1 AND variable_id = $2
             RETURNING {OPTION_COLUMNS}"
        );
        let option = sqlx::query_as::<_, VariableOption>(&query)
            .bind(option_id)
            .bind(variable_id)
            .bind(&input.value)
            .bind(&input.label)
            .bind(input.display_order)
            .bind(input.is_default)
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| {
                map_unique(e, "uq_variable_options_variable_value", || {
                    CoreError::DuplicateOption {
                        value: input.value.clone().unwrap_or_default(),
                    }
                })
            })?;

        // An unknown option leaves the previous default in place.
        let Some(option) = option else {
            return Ok(None);
        };

        tx.commit().await?;
        tracing::info!(variable_id, option_id, value = %option.value, "Variable option updated");
        Ok(Some(option))
    }

    /// Remove an option. Returns `true` if a row was deleted.
    pub async fn remove_option(
        pool: &PgPool,
        variable_id: DbId,
        option_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM variable_options WHERE id = $1 AND variable_id = $2")
            .bind(option_id)
            .bind(variable_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

/// Lock the variable row so concurrent default changes serialize.
async fn lock_variable(conn: &mut sqlx::PgConnection, variable_id: DbId) -> Result<(), DbError> {
    let row: Option<(DbId,)> =
        sqlx::query_as("SELECT id FROM element_variables WHERE id = $1 FOR UPDATE")
            .bind(variable_id)
            .fetch_optional(conn)
            .await?;
    match row {
        Some(_) => Ok(()),
        None => Err(CoreError::NotFound {
            entity: "Variable",
            id: variable_id,
        }
        .into()),
    }
}

async fn clear_default(
    conn: &mut sqlx::PgConnection,
    variable_id: DbId,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE variable_options SET is_default = false
         WHERE variable_id = $1 AND is_default",
    )
    .bind(variable_id)
    .execute(conn)
    .await?;
    Ok(())
}
