//! CRM customer endpoints.
//!
//! Single-record operations identify the customer through the required
//! `x-customer-id` header (a customer public id) rather than a path
//! parameter; `GET` without the header lists with filters and pagination.

use axum::{
    extract::{Query, State},
    http::HeaderMap,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{map_db_error, normalize_limit, ApiError, AppState};
use leadsdb_core::{Category, CustomerStatus, LeadSource};
use leadsdb_db::{CustomerFilter, CustomerRow, UpdateCustomer};

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

/// Customer as presented on the wire; `id` is the public id.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(in crate::api) struct CustomerBody {
    pub id: Uuid,
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

impl From<CustomerRow> for CustomerBody {
    fn from(row: CustomerRow) -> Self {
        Self {
            id: row.public_id,
            name: row.name,
            phone_number: row.phone_number,
            instagram: row.instagram,
            address: row.address,
            email: row.email,
            description: row.description,
            country: row.country,
            category: row.category,
            status: row.status,
            source: row.source,
            notes: row.notes,
            contact_history: row.contact_history,
            last_contacted_at: row.last_contacted_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(in crate::api) struct ListQuery {
    status: Option<String>,
    country: Option<String>,
    category: Option<String>,
    source: Option<String>,
    search: Option<String>,
    page: Option<i64>,
    limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub(in crate::api) struct ListResponse {
    customers: Vec<CustomerBody>,
    total: i64,
    page: i64,
    limit: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(in crate::api) struct UpdateRequest {
    name: Option<String>,
    phone_number: Option<String>,
    instagram: Option<String>,
    address: Option<String>,
    email: Option<String>,
    description: Option<String>,
    country: Option<String>,
    category: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
enum PatchRequest {
    AddNote { note: String },
    AddContact { method: String, note: Option<String> },
    UpdateStatus { status: String },
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/customers — single lookup when `x-customer-id` is present,
/// filtered list otherwise.
pub(in crate::api) async fn get_or_list_customers(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<ListQuery>,
) -> Result<axum::response::Response, ApiError> {
    use axum::response::IntoResponse;

    if headers.contains_key("x-customer-id") {
        let id = required_customer_id(&headers)?;
        let row = leadsdb_db::get_customer(&state.pool, id)
            .await
            .map_err(|e| map_db_error(&e))?
            .ok_or_else(|| ApiError::not_found("customer not found"))?;
        return Ok(Json(CustomerBody::from(row)).into_response());
    }

    if let Some(status) = query.status.as_deref() {
        parse_status(status)?;
    }
    if let Some(category) = query.category.as_deref() {
        parse_wire_category(category)?;
    }
    if let Some(source) = query.source.as_deref() {
        source
            .parse::<LeadSource>()
            .map_err(|_| ApiError::bad_request(format!("unknown source \"{source}\"")))?;
    }

    let limit = normalize_limit(query.limit);
    let page = query.page.unwrap_or(1).max(1);
    let filter = CustomerFilter {
        status: query.status,
        country: query.country,
        category: query.category,
        source: query.source,
        search: query.search,
        limit,
        offset: (page - 1) * limit,
    };

    let (rows, total) = leadsdb_db::list_customers(&state.pool, &filter)
        .await
        .map_err(|e| map_db_error(&e))?;

    Ok(Json(ListResponse {
        customers: rows.into_iter().map(CustomerBody::from).collect(),
        total,
        page,
        limit,
    })
    .into_response())
}

/// PUT /api/customers — sparse update of contact and classification fields.
pub(in crate::api) async fn update_customer(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<UpdateRequest>,
) -> Result<Json<CustomerBody>, ApiError> {
    let id = required_customer_id(&headers)?;

    let name = body.name.as_deref().map(str::trim);
    if name.is_some_and(str::is_empty) {
        return Err(ApiError::bad_request("name must not be empty"));
    }
    if let Some(category) = body.category.as_deref() {
        parse_wire_category(category)?;
    }

    let update = UpdateCustomer {
        name,
        phone_number: body.phone_number.as_deref(),
        instagram: body.instagram.as_deref(),
        address: body.address.as_deref(),
        email: body.email.as_deref(),
        description: body.description.as_deref(),
        country: body.country.as_deref(),
        category: body.category.as_deref(),
    };

    let row = leadsdb_db::update_customer(&state.pool, id, &update)
        .await
        .map_err(|e| map_db_error(&e))?
        .ok_or_else(|| ApiError::not_found("customer not found"))?;

    Ok(Json(CustomerBody::from(row)))
}

/// PATCH /api/customers — lifecycle actions: `add_note`, `add_contact`,
/// `update_status`.
pub(in crate::api) async fn patch_customer(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<serde_json::Value>,
) -> Result<Json<CustomerBody>, ApiError> {
    let id = required_customer_id(&headers)?;

    let request: PatchRequest = serde_json::from_value(body)
        .map_err(|e| ApiError::bad_request(format!("invalid patch request: {e}")))?;

    let row = match request {
        PatchRequest::AddNote { note } => {
            let note = note.trim();
            if note.is_empty() {
                return Err(ApiError::bad_request("note must not be empty"));
            }
            leadsdb_db::append_note(&state.pool, id, note).await
        }
        PatchRequest::AddContact { method, note } => {
            leadsdb_db::record_contact(&state.pool, id, method.trim(), note.as_deref()).await
        }
        PatchRequest::UpdateStatus { status } => {
            let status = parse_status(&status)?;
            leadsdb_db::set_status(&state.pool, id, status.as_str()).await
        }
    }
    .map_err(|e| map_db_error(&e))?
    .ok_or_else(|| ApiError::not_found("customer not found"))?;

    Ok(Json(CustomerBody::from(row)))
}

/// DELETE /api/customers — hard delete.
pub(in crate::api) async fn delete_customer(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>, ApiError> {
    let id = required_customer_id(&headers)?;

    let deleted = leadsdb_db::delete_customer(&state.pool, id)
        .await
        .map_err(|e| map_db_error(&e))?;
    if !deleted {
        return Err(ApiError::not_found("customer not found"));
    }

    Ok(Json(serde_json::json!({ "deleted": true })))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn required_customer_id(headers: &HeaderMap) -> Result<Uuid, ApiError> {
    let raw = headers
        .get("x-customer-id")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::bad_request("x-customer-id header is required"))?;

    Uuid::parse_str(raw.trim())
        .map_err(|_| ApiError::bad_request("x-customer-id must be a valid customer id"))
}

fn parse_status(raw: &str) -> Result<CustomerStatus, ApiError> {
    raw.parse::<CustomerStatus>()
        .map_err(|_| ApiError::bad_request(format!("unknown status \"{raw}\"")))
}

fn parse_wire_category(raw: &str) -> Result<Category, ApiError> {
    raw.parse::<Category>()
        .map_err(|_| ApiError::bad_request(format!("unknown category \"{raw}\"")))
}
