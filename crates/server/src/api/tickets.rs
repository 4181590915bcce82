//! Ticket API handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use triage_core::{
    ticket::{MAX_DESCRIPTION_LEN, MAX_SUBJECT_LEN},
    Category, CreateTicketRequest, Priority, Ticket, TicketFilter, TicketStats, TicketStatus,
};

use crate::state::AppState;

/// Maximum allowed limit for ticket queries
const MAX_LIMIT: i64 = 1000;

/// Default limit for ticket queries
const DEFAULT_LIMIT: i64 = 100;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for creating a ticket
#[derive(Debug, Deserialize)]
pub struct CreateTicketBody {
    /// Short summary of the issue
    pub subject: String,
    /// Full description of the issue
    pub description: String,
}

/// Query parameters for listing tickets
#[derive(Debug, Deserialize)]
pub struct ListTicketsParams {
    /// Filter by lifecycle status
    pub status: Option<String>,
    /// Filter by assigned category
    pub category: Option<String>,
    /// Filter by assigned priority
    pub priority: Option<String>,
    /// Maximum number of tickets to return
    pub limit: Option<i64>,
    /// Pagination offset
    pub offset: Option<i64>,
}

/// Response for ticket operations
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketResponse {
    pub id: String,
    pub subject: String,
    pub description: String,
    pub status: TicketStatus,
    pub category: Option<Category>,
    pub priority: Option<Priority>,
    pub sentiment: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Ticket> for TicketResponse {
    fn from(ticket: Ticket) -> Self {
        Self {
            id: ticket.id,
            subject: ticket.subject,
            description: ticket.description,
            status: ticket.status,
            category: ticket.category,
            priority: ticket.priority,
            sentiment: ticket.sentiment,
            error_message: ticket.error_message,
            created_at: ticket.created_at.to_rfc3339(),
            updated_at: ticket.updated_at.to_rfc3339(),
        }
    }
}

/// Response for listing tickets
#[derive(Debug, Serialize)]
pub struct ListTicketsResponse {
    pub tickets: Vec<TicketResponse>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct TicketErrorResponse {
    pub error: String,
}

fn bad_request(message: impl Into<String>) -> (StatusCode, Json<TicketErrorResponse>) {
    (
        StatusCode::BAD_REQUEST,
        Json(TicketErrorResponse {
            error: message.into(),
        }),
    )
}

fn internal_error(e: impl std::fmt::Display) -> (StatusCode, Json<TicketErrorResponse>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(TicketErrorResponse {
            error: e.to_string(),
        }),
    )
}

// ============================================================================
// Handlers
// ============================================================================

/// Create a new ticket
pub async fn create_ticket(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateTicketBody>,
) -> Result<(StatusCode, Json<TicketResponse>), impl IntoResponse> {
    if body.subject.trim().is_empty() {
        return Err(bad_request("subject must not be blank"));
    }
    if body.subject.chars().count() > MAX_SUBJECT_LEN {
        return Err(bad_request(format!(
            "subject must be at most {} characters",
            MAX_SUBJECT_LEN
        )));
    }
    if body.description.trim().is_empty() {
        return Err(bad_request("description must not be blank"));
    }
    if body.description.chars().count() > MAX_DESCRIPTION_LEN {
        return Err(bad_request(format!(
            "description must be at most {} characters",
            MAX_DESCRIPTION_LEN
        )));
    }

    let request = CreateTicketRequest {
        subject: body.subject,
        description: body.description,
    };

    match state.orchestrator().create_ticket(request) {
        Ok(ticket) => Ok((StatusCode::CREATED, Json(TicketResponse::from(ticket)))),
        Err(e) => Err(internal_error(e)),
    }
}

/// Get a ticket by ID
pub async fn get_ticket(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<TicketResponse>, impl IntoResponse> {
    match state.ticket_store().get(&id) {
        Ok(Some(ticket)) => Ok(Json(TicketResponse::from(ticket))),
        Ok(None) => Err((
            StatusCode::NOT_FOUND,
            Json(TicketErrorResponse {
                error: format!("Ticket not found: {}", id),
            }),
        )),
        Err(e) => Err(internal_error(e)),
    }
}

/// List tickets with optional filters
pub async fn list_tickets(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListTicketsParams>,
) -> Result<Json<ListTicketsResponse>, impl IntoResponse> {
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
    let offset = params.offset.unwrap_or(0).max(0);

    let mut filter = TicketFilter::new().with_limit(limit).with_offset(offset);

    if let Some(ref token) = params.status {
        match TicketStatus::from_str_token(token) {
            Some(status) => filter = filter.with_status(status),
            None => return Err(bad_request(format!("unknown status: {}", token))),
        }
    }

    if let Some(ref token) = params.category {
        match Category::from_str_token(token) {
            Some(category) => filter = filter.with_category(category),
            None => return Err(bad_request(format!("unknown category: {}", token))),
        }
    }

    if let Some(ref token) = params.priority {
        match Priority::from_str_token(token) {
            Some(priority) => filter = filter.with_priority(priority),
            None => return Err(bad_request(format!("unknown priority: {}", token))),
        }
    }

    let tickets = match state.ticket_store().list(&filter) {
        Ok(tickets) => tickets,
        Err(e) => return Err(internal_error(e)),
    };

    // Get total count (without pagination)
    let count_filter = TicketFilter {
        limit: i64::MAX,
        offset: 0,
        ..filter.clone()
    };

    let total = match state.ticket_store().count(&count_filter) {
        Ok(count) => count,
        Err(e) => return Err(internal_error(e)),
    };

    Ok(Json(ListTicketsResponse {
        tickets: tickets.into_iter().map(TicketResponse::from).collect(),
        total,
        limit,
        offset,
    }))
}

/// Aggregate ticket counts by status, category and priority
pub async fn get_stats(
    State(state): State<Arc<AppState>>,
) -> Result<Json<TicketStats>, impl IntoResponse> {
    match state.ticket_store().stats() {
        Ok(stats) => Ok(Json(stats)),
        Err(e) => Err(internal_error(e)),
    }
}
