//! Database operations for the `customers` table.

use chrono::{DateTime, Utc};
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

// ---------------------------------------------------------------------------
// Row and parameter types
// ---------------------------------------------------------------------------

const CUSTOMER_COLUMNS: &str = "id, public_id, name, phone_number, instagram, address, email, \
     description, country, category, status, source, notes, contact_history, \
     last_contacted_at, created_at, updated_at";

/// A row from the `customers` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CustomerRow {
    pub id: i64,
    pub public_id: Uuid,
    pub name: String,
    pub phone_number: Option<String>,
    pub instagram: Option<String>,
    pub address: Option<String>,
    pub email: Option<String>,
    pub description: Option<String>,
    pub country: String,
    pub category: String,
    pub status: String,
    pub source: String,
    pub notes: serde_json::Value,
    pub contact_history: serde_json::Value,
    pub last_contacted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields for a new customer. Lifecycle fields (`status`, `notes`,
/// `contact_history`) start at their column defaults.
#[derive(Debug, Clone, Default)]
pub struct NewCustomer<'a> {
    pub name: &'a str,
    pub phone_number: Option<&'a str>,
    pub instagram: Option<&'a str>,
    pub address: Option<&'a str>,
    pub email: Option<&'a str>,
    pub description: Option<&'a str>,
    pub country: &'a str,
    pub category: &'a str,
    pub source: &'a str,
}

/// Sparse update: `None` keeps the current value.
#[derive(Debug, Clone, Default)]
pub struct UpdateCustomer<'a> {
    pub name: Option<&'a str>,
    pub phone_number: Option<&'a str>,
    pub instagram: Option<&'a str>,
    pub address: Option<&'a str>,
    pub email: Option<&'a str>,
    pub description: Option<&'a str>,
    pub country: Option<&'a str>,
    pub category: Option<&'a str>,
}

/// List filters; `None` means "any". `search` matches name or phone number.
#[derive(Debug, Clone, Default)]
pub struct CustomerFilter {
    pub status: Option<String>,
    pub country: Option<String>,
    pub category: Option<String>,
    pub source: Option<String>,
    pub search: Option<String>,
    pub limit: i64,
    pub offset: i64,
}

const FILTER_WHERE: &str = "($1::text IS NULL OR status = $1) \
     AND ($2::text IS NULL OR country = $2) \
     AND ($3::text IS NULL OR category = $3) \
     AND ($4::text IS NULL OR source = $4) \
     AND ($5::text IS NULL OR name ILIKE '%' || $5 || '%' \
          OR phone_number ILIKE '%' || $5 || '%')";

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Inserts a new customer and returns the full inserted row.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails — including the unique
/// constraint violation on `phone_number`, which callers distinguish via
/// [`crate::is_unique_violation`].
pub async fn insert_customer(
    pool: &PgPool,
    new: &NewCustomer<'_>,
) -> Result<CustomerRow, DbError> {
    let sql = format!(
        "INSERT INTO customers \
         (name, phone_number, instagram, address, email, description, country, category, source) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
         RETURNING {CUSTOMER_COLUMNS}"
    );
    let row = sqlx::query_as::<_, CustomerRow>(&sql)
        .bind(new.name)
        .bind(new.phone_number)
        .bind(new.instagram)
        .bind(new.address)
        .bind(new.email)
        .bind(new.description)
        .bind(new.country)
        .bind(new.category)
        .bind(new.source)
        .fetch_one(pool)
        .await?;

    Ok(row)
}

/// Returns `true` when a customer with this phone number already exists.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn phone_exists(pool: &PgPool, phone_number: &str) -> Result<bool, DbError> {
    let exists = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM customers WHERE phone_number = $1)",
    )
    .bind(phone_number)
    .fetch_one(pool)
    .await?;

    Ok(exists)
}

/// Returns a single customer by public id, or `None` if not found.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_customer(pool: &PgPool, public_id: Uuid) -> Result<Option<CustomerRow>, DbError> {
    let sql = format!("SELECT {CUSTOMER_COLUMNS} FROM customers WHERE public_id = $1");
    let row = sqlx::query_as::<_, CustomerRow>(&sql)
        .bind(public_id)
        .fetch_optional(pool)
        .await?;

    Ok(row)
}

/// Returns a filtered page of customers (newest first) plus the total count
/// matching the filter.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if either query fails.
pub async fn list_customers(
    pool: &PgPool,
    filter: &CustomerFilter,
) -> Result<(Vec<CustomerRow>, i64), DbError> {
    let count_sql = format!("SELECT COUNT(*) FROM customers WHERE {FILTER_WHERE}");
    let total = sqlx::query_scalar::<_, i64>(&count_sql)
        .bind(filter.status.as_deref())
        .bind(filter.country.as_deref())
        .bind(filter.category.as_deref())
        .bind(filter.source.as_deref())
        .bind(filter.search.as_deref())
        .fetch_one(pool)
        .await?;

    let page_sql = format!(
        "SELECT {CUSTOMER_COLUMNS} FROM customers WHERE {FILTER_WHERE} \
         ORDER BY created_at DESC, id DESC LIMIT $6 OFFSET $7"
    );
    let rows = sqlx::query_as::<_, CustomerRow>(&page_sql)
        .bind(filter.status.as_deref())
        .bind(filter.country.as_deref())
        .bind(filter.category.as_deref())
        .bind(filter.source.as_deref())
        .bind(filter.search.as_deref())
        .bind(filter.limit)
        .bind(filter.offset)
        .fetch_all(pool)
        .await?;

    Ok((rows, total))
}

/// Sparse update of contact and classification fields. Returns the updated
/// row, or `None` if no customer has this public id.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn update_customer(
    pool: &PgPool,
    public_id: Uuid,
    update: &UpdateCustomer<'_>,
) -> Result<Option<CustomerRow>, DbError> {
    let sql = format!(
        "UPDATE customers SET \
         name = COALESCE($2, name), \
         phone_number = COALESCE($3, phone_number), \
         instagram = COALESCE($4, instagram), \
         address = COALESCE($5, address), \
         email = COALESCE($6, email), \
         description = COALESCE($7, description), \
         country = COALESCE($8, country), \
         category = COALESCE($9, category), \
         updated_at = NOW() \
         WHERE public_id = $1 \
         RETURNING {CUSTOMER_COLUMNS}"
    );
    let row = sqlx::query_as::<_, CustomerRow>(&sql)
        .bind(public_id)
        .bind(update.name)
        .bind(update.phone_number)
        .bind(update.instagram)
        .bind(update.address)
        .bind(update.email)
        .bind(update.description)
        .bind(update.country)
        .bind(update.category)
        .fetch_optional(pool)
        .await?;

    Ok(row)
}

/// Appends a note to the customer's append-only note list.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn append_note(
    pool: &PgPool,
    public_id: Uuid,
    note: &str,
) -> Result<Option<CustomerRow>, DbError> {
    let entry = json!([{ "text": note, "at": Utc::now() }]);
    let sql = format!(
        "UPDATE customers SET notes = notes || $2::jsonb, updated_at = NOW() \
         WHERE public_id = $1 RETURNING {CUSTOMER_COLUMNS}"
    );
    let row = sqlx::query_as::<_, CustomerRow>(&sql)
        .bind(public_id)
        .bind(entry)
        .fetch_optional(pool)
        .await?;

    Ok(row)
}

/// Appends a contact-history entry and stamps `last_contacted_at`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn record_contact(
    pool: &PgPool,
    public_id: Uuid,
    method: &str,
    note: Option<&str>,
) -> Result<Option<CustomerRow>, DbError> {
    let entry = json!([{ "method": method, "note": note, "at": Utc::now() }]);
    let sql = format!(
        "UPDATE customers SET contact_history = contact_history || $2::jsonb, \
         last_contacted_at = NOW(), updated_at = NOW() \
         WHERE public_id = $1 RETURNING {CUSTOMER_COLUMNS}"
    );
    let row = sqlx::query_as::<_, CustomerRow>(&sql)
        .bind(public_id)
        .bind(entry)
        .fetch_optional(pool)
        .await?;

    Ok(row)
}

/// Moves the customer to a new pipeline stage. The caller validates the
/// stage against the closed enumeration before calling.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn set_status(
    pool: &PgPool,
    public_id: Uuid,
    status: &str,
) -> Result<Option<CustomerRow>, DbError> {
    let sql = format!(
        "UPDATE customers SET status = $2, updated_at = NOW() \
         WHERE public_id = $1 RETURNING {CUSTOMER_COLUMNS}"
    );
    let row = sqlx::query_as::<_, CustomerRow>(&sql)
        .bind(public_id)
        .bind(status)
        .fetch_optional(pool)
        .await?;

    Ok(row)
}

/// Hard-deletes a customer. Returns `true` when a row was removed.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn delete_customer(pool: &PgPool, public_id: Uuid) -> Result<bool, DbError> {
    let result = sqlx::query("DELETE FROM customers WHERE public_id = $1")
        .bind(public_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}
