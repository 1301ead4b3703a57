//! Combined read views over multiple backends.
//!
//! Partial responses are a first-class outcome: each section of an
//! aggregate view degrades independently when its backend's breaker is
//! open, instead of failing the whole request.

use std::sync::Arc;

use uuid::Uuid;

use crate::clients::{FlightClient, PrivilegeClient, TicketClient};
use crate::domain::{
    BalanceHistory, PrivilegeInfoResponse, PrivilegeShortInfo, Ticket, TicketView,
    UserInfoResponse,
};
use crate::error::{GatewayError, GatewayResult};

/// Fans out to the downstream clients for combined views.
pub struct AggregationReader {
    flights: Arc<FlightClient>,
    tickets: Arc<TicketClient>,
    privileges: Arc<PrivilegeClient>,
}

impl AggregationReader {
    pub fn new(
        flights: Arc<FlightClient>,
        tickets: Arc<TicketClient>,
        privileges: Arc<PrivilegeClient>,
    ) -> Self {
        Self {
            flights,
            tickets,
            privileges,
        }
    }

    /// All of a user's tickets, each joined with its flight. Degraded
    /// flights render the placeholder route; listing rows price from the
    /// flight record.
    pub async fn tickets_for_user(&self, username: &str) -> GatewayResult<Vec<TicketView>> {
        if self.privileges.for_user(username).await?.is_none() {
            return Err(GatewayError::NotFound("user"));
        }
        let tickets = self.tickets.for_user(username).await?;

        let mut rows = Vec::with_capacity(tickets.len());
        for ticket in tickets {
            rows.push(self.listing_row(ticket).await);
        }
        Ok(rows)
    }

    /// The combined "me" view. The privilege and ticket sections are
    /// fetched independently; an unavailable backend degrades its own
    /// section (privilege → null, tickets → empty) without failing the
    /// response. An existing-but-unknown user is still a not-found.
    pub async fn user_info(&self, username: &str) -> GatewayResult<UserInfoResponse> {
        let (privilege, tickets) = tokio::join!(
            self.privileges.for_user(username),
            self.tickets.for_user(username)
        );

        let privilege = match privilege {
            Ok(Some(privilege)) => Some(privilege),
            Ok(None) => return Err(GatewayError::NotFound("user")),
            Err(err) if err.is_unavailable() => None,
            Err(err) => return Err(err),
        };
        let tickets = match tickets {
            Ok(tickets) => tickets,
            Err(err) if err.is_unavailable() => Vec::new(),
            Err(err) => return Err(err),
        };

        let mut rows = Vec::with_capacity(tickets.len());
        for ticket in tickets {
            rows.push(self.listing_row(ticket).await);
        }

        Ok(UserInfoResponse {
            tickets: rows,
            privilege: privilege.map(|p| PrivilegeShortInfo {
                balance: p.balance,
                status: p.status,
            }),
        })
    }

    /// One ticket, owner-checked, joined with its flight. The single-ticket
    /// view prices from the ticket record (what was actually paid).
    pub async fn ticket_for_user(
        &self,
        username: &str,
        ticket_uid: Uuid,
    ) -> GatewayResult<TicketView> {
        let ticket = self
            .tickets
            .get(ticket_uid)
            .await?
            .ok_or(GatewayError::NotFound("ticket"))?;

        if ticket.username != username {
            return Err(GatewayError::Ownership);
        }

        let flight = self.flights.by_number_or_default(&ticket.flight_number).await;
        Ok(TicketView {
            ticket_uid: ticket.ticket_uid,
            flight_number: ticket.flight_number,
            from_airport: flight.from_airport,
            to_airport: flight.to_airport,
            date: flight.date,
            price: ticket.price,
            status: ticket.status,
        })
    }

    /// Bonus account with full ledger history. History unavailability
    /// propagates: this view has no degraded rendition.
    pub async fn privilege_info(&self, username: &str) -> GatewayResult<PrivilegeInfoResponse> {
        let privilege = self
            .privileges
            .for_user(username)
            .await?
            .ok_or(GatewayError::NotFound("user"))?;
        let history = self.privileges.history(username).await?;

        Ok(PrivilegeInfoResponse {
            balance: privilege.balance,
            status: privilege.status,
            history: history
                .into_iter()
                .map(|entry| BalanceHistory {
                    date: entry.datetime,
                    ticket_uid: entry.ticket_uid,
                    balance_diff: entry.balance_diff,
                    operation_type: entry.operation_type,
                })
                .collect(),
        })
    }

    async fn listing_row(&self, ticket: Ticket) -> TicketView {
        let flight = self.flights.by_number_or_default(&ticket.flight_number).await;
        TicketView {
            ticket_uid: ticket.ticket_uid,
            flight_number: ticket.flight_number,
            from_airport: flight.from_airport,
            to_airport: flight.to_airport,
            date: flight.date,
            price: flight.price,
            status: ticket.status,
        }
    }
}
