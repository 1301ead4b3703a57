//! Wire types shared between the gateway and the downstream services.
//!
//! All DTOs use the backends' camelCase JSON convention. The gateway never
//! persists any of these; they live for the duration of one request.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Ticket lifecycle status as recorded by the ticket service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TicketStatus {
    #[serde(rename = "PAID")]
    Paid,
    #[serde(rename = "CANCELLED")]
    Cancelled,
}

/// Bonus-ledger operation kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OperationType {
    #[serde(rename = "DEBIT_THE_ACCOUNT")]
    DebitTheAccount,
    #[serde(rename = "FILL_IN_BALANCE")]
    FillInBalance,
}

/// A flight as issued by the flight inventory service. Read-only here.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Flight {
    pub flight_number: String,
    pub from_airport: String,
    pub to_airport: String,
    pub date: DateTime<Utc>,
    pub price: i64,
}

impl Flight {
    /// Placeholder used when the flight backend is unavailable and a
    /// listing must still render: sentinel route endpoints, zero price.
    pub fn placeholder(flight_number: &str) -> Self {
        Self {
            flight_number: flight_number.to_string(),
            from_airport: "XXX".to_string(),
            to_airport: "XXX".to_string(),
            date: DateTime::<Utc>::UNIX_EPOCH,
            price: 0,
        }
    }
}

/// One page of the flight inventory listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightPage {
    pub page: u32,
    pub page_size: u32,
    pub total_elements: u64,
    pub items: Vec<Flight>,
}

/// A ticket record owned by the ticket service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    pub ticket_uid: Uuid,
    pub username: String,
    pub flight_number: String,
    pub price: i64,
    pub status: TicketStatus,
}

/// Body for creating a ticket record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketCreateRequest {
    pub ticket_uid: Uuid,
    pub username: String,
    pub flight_number: String,
    pub price: i64,
}

/// A bonus account owned by the privilege service. Mutated only through
/// ledger transactions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Privilege {
    pub id: i64,
    pub username: String,
    pub balance: i64,
    pub status: String,
}

/// One bonus-ledger entry, keyed by (username, ticket uid) at the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrivilegeHistoryEntry {
    pub datetime: DateTime<Utc>,
    pub ticket_uid: Uuid,
    pub balance_diff: i64,
    pub operation_type: OperationType,
}

/// Body for appending a ledger transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddTransactionRequest {
    pub privilege_id: i64,
    pub ticket_uid: Uuid,
    pub datetime: DateTime<Utc>,
    pub balance_diff: i64,
    pub operation_type: OperationType,
}

// ---- Gateway-facing responses ----

/// Balance and tier summary embedded in composed responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrivilegeShortInfo {
    pub balance: i64,
    pub status: String,
}

/// A ticket joined with its flight data for listings and single-ticket views.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketView {
    pub ticket_uid: Uuid,
    pub flight_number: String,
    pub from_airport: String,
    pub to_airport: String,
    pub date: DateTime<Utc>,
    pub price: i64,
    pub status: TicketStatus,
}

/// Purchase input: flight, requested price, and whether to draw from the
/// bonus balance first.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketPurchaseRequest {
    pub flight_number: String,
    pub price: i64,
    pub paid_from_balance: bool,
}

/// Composed purchase receipt including the refreshed bonus balance.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketPurchaseResponse {
    pub ticket_uid: Uuid,
    pub flight_number: String,
    pub from_airport: String,
    pub to_airport: String,
    pub date: DateTime<Utc>,
    pub price: i64,
    pub paid_by_money: i64,
    pub paid_by_bonuses: i64,
    pub status: TicketStatus,
    pub privilege: PrivilegeShortInfo,
}

/// Combined "me" view. Either section may be degraded independently when its
/// backend is unavailable: `tickets` to empty, `privilege` to null.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfoResponse {
    pub tickets: Vec<TicketView>,
    pub privilege: Option<PrivilegeShortInfo>,
}

/// One row of the bonus history in the privilege view.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceHistory {
    pub date: DateTime<Utc>,
    pub ticket_uid: Uuid,
    pub balance_diff: i64,
    pub operation_type: OperationType,
}

/// Bonus account view with full history.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrivilegeInfoResponse {
    pub balance: i64,
    pub status: String,
    pub history: Vec<BalanceHistory>,
}
