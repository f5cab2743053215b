//! `POST /api/save` — persist extracted business records as customers.
//!
//! Two modes share the endpoint. Bulk mode (`businesses` present) validates
//! the whole batch up front, then writes records one at a time, collecting
//! per-record failures instead of aborting — a write-time duplicate must not
//! sink an otherwise good import. Single mode pre-checks the phone number
//! and surfaces duplicates as a distinct conflict.

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};

use super::customers::CustomerBody;
use super::{map_db_error, ApiError, AppState};
use leadsdb_core::{Category, LeadSource};
use leadsdb_crawler::BusinessRecord;
use leadsdb_db::{insert_customer, is_unique_violation, phone_exists, NewCustomer};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(in crate::api) struct SaveRequest {
    // Bulk mode.
    businesses: Option<Vec<BusinessRecord>>,
    country: Option<String>,
    category: Option<String>,
    // Single mode.
    name: Option<String>,
    phone_number: Option<String>,
    instagram: Option<String>,
    address: Option<String>,
    email: Option<String>,
    description: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(in crate::api) struct BulkSaveResponse {
    saved: usize,
    total: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    errors: Vec<BulkSaveError>,
}

#[derive(Debug, Serialize)]
pub(in crate::api) struct BulkSaveError {
    name: String,
    error: String,
}

pub(in crate::api) async fn save_businesses(
    State(state): State<AppState>,
    Json(mut body): Json<SaveRequest>,
) -> Result<axum::response::Response, ApiError> {
    use axum::response::IntoResponse;

    if let Some(businesses) = body.businesses.take() {
        let response = save_bulk(&state, businesses, body.country.take(), body.category.take()).await?;
        return Ok(Json(response).into_response());
    }

    let customer = save_single(&state, &body).await?;
    Ok((StatusCode::CREATED, Json(customer)).into_response())
}

async fn save_bulk(
    state: &AppState,
    businesses: Vec<BusinessRecord>,
    country: Option<String>,
    category: Option<String>,
) -> Result<BulkSaveResponse, ApiError> {
    if businesses.is_empty() {
        return Err(ApiError::bad_request("businesses must be a non-empty list"));
    }

    let Some(country) = country.as_deref().map(str::trim).filter(|c| !c.is_empty()) else {
        return Err(ApiError::bad_request("country is required for bulk save"));
    };

    let Some(category_raw) = category.as_deref().map(str::trim).filter(|c| !c.is_empty()) else {
        return Err(ApiError::bad_request("category is required for bulk save"));
    };
    let category = parse_category(category_raw)?;

    // Fail fast before any write: one nameless record rejects the batch.
    if businesses.iter().any(|b| b.name.trim().is_empty()) {
        return Err(ApiError::bad_request(
            "every business must have a non-empty name",
        ));
    }

    let total = businesses.len();
    let mut saved = 0usize;
    let mut errors = Vec::new();

    for record in &businesses {
        let new = NewCustomer {
            name: record.name.trim(),
            phone_number: record.phone_number.as_deref(),
            instagram: record.instagram.as_deref(),
            address: record.address.as_deref(),
            email: record.email.as_deref(),
            description: record.description.as_deref(),
            country,
            category: category.as_str(),
            source: LeadSource::Crawl.as_str(),
        };

        match insert_customer(&state.pool, &new).await {
            Ok(_) => saved += 1,
            Err(err) => {
                let message = if is_unique_violation(&err) {
                    "a customer with this phone number already exists".to_string()
                } else {
                    tracing::error!(name = %record.name, error = %err, "bulk save: record failed");
                    "failed to save customer".to_string()
                };
                errors.push(BulkSaveError {
                    name: record.name.clone(),
                    error: message,
                });
            }
        }
    }

    tracing::info!(saved, total, failed = errors.len(), "bulk save finished");
    Ok(BulkSaveResponse {
        saved,
        total,
        errors,
    })
}

async fn save_single(state: &AppState, body: &SaveRequest) -> Result<CustomerBody, ApiError> {
    let Some(name) = body.name.as_deref().map(str::trim).filter(|n| !n.is_empty()) else {
        return Err(ApiError::bad_request("name is required"));
    };

    let category = match body.category.as_deref().map(str::trim) {
        Some(raw) if !raw.is_empty() => parse_category(raw)?,
        _ => Category::Other,
    };

    let phone_number = body
        .phone_number
        .as_deref()
        .map(str::trim)
        .filter(|p| !p.is_empty());

    // Duplicate pre-check by phone number, distinct from the storage-layer
    // unique index so callers can branch on "already exists".
    if let Some(phone) = phone_number {
        let exists = phone_exists(&state.pool, phone)
            .await
            .map_err(|e| map_db_error(&e))?;
        if exists {
            return Err(ApiError::conflict(
                "a customer with this phone number already exists",
            ));
        }
    }

    let new = NewCustomer {
        name,
        phone_number,
        instagram: body.instagram.as_deref(),
        address: body.address.as_deref(),
        email: body.email.as_deref(),
        description: body.description.as_deref(),
        country: body.country.as_deref().map(str::trim).unwrap_or_default(),
        category: category.as_str(),
        source: LeadSource::Manual.as_str(),
    };

    let row = insert_customer(&state.pool, &new).await.map_err(|e| {
        // The pre-check races with concurrent saves; the unique index is
        // the authority.
        if is_unique_violation(&e) {
            ApiError::conflict("a customer with this phone number already exists")
        } else {
            map_db_error(&e)
        }
    })?;

    Ok(CustomerBody::from(row))
}

fn parse_category(raw: &str) -> Result<Category, ApiError> {
    raw.parse::<Category>()
        .map_err(|_| ApiError::bad_request(format!("unknown category \"{raw}\"")))
}
