//! Request handlers: thin translation between HTTP and the orchestration
//! layer. Identity arrives in the `X-User-Name` header.

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::domain::{
    FlightPage, PrivilegeInfoResponse, TicketPurchaseRequest, TicketPurchaseResponse, TicketView,
    UserInfoResponse,
};
use crate::error::{GatewayError, GatewayResult};
use crate::http::server::AppState;

/// Pagination query parameters for the flight listing.
#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub page: Option<u32>,
    pub size: Option<u32>,
}

fn username(headers: &HeaderMap) -> GatewayResult<&str> {
    headers
        .get("x-user-name")
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
        .ok_or_else(|| GatewayError::Validation("X-User-Name header is required".to_string()))
}

pub async fn list_flights(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<FlightPage>, GatewayError> {
    Ok(Json(state.flights.list(query.page, query.size).await?))
}

pub async fn list_tickets(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<TicketView>>, GatewayError> {
    let username = username(&headers)?;
    Ok(Json(state.reader.tickets_for_user(username).await?))
}

pub async fn get_ticket(
    State(state): State<AppState>,
    Path(ticket_uid): Path<Uuid>,
    headers: HeaderMap,
) -> Result<Json<TicketView>, GatewayError> {
    let username = username(&headers)?;
    Ok(Json(state.reader.ticket_for_user(username, ticket_uid).await?))
}

pub async fn buy_ticket(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<TicketPurchaseRequest>,
) -> Result<Json<TicketPurchaseResponse>, GatewayError> {
    let username = username(&headers)?;
    Ok(Json(state.purchases.purchase(username, &body).await?))
}

pub async fn cancel_ticket(
    State(state): State<AppState>,
    Path(ticket_uid): Path<Uuid>,
    headers: HeaderMap,
) -> Result<StatusCode, GatewayError> {
    let username = username(&headers)?;
    state.refunds.refund(username, ticket_uid).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn user_info(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<UserInfoResponse>, GatewayError> {
    let username = username(&headers)?;
    Ok(Json(state.reader.user_info(username).await?))
}

pub async fn privilege_info(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<PrivilegeInfoResponse>, GatewayError> {
    let username = username(&headers)?;
    Ok(Json(state.reader.privilege_info(username).await?))
}

pub async fn health() -> StatusCode {
    StatusCode::OK
}
