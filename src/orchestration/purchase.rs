//! Ticket purchase orchestration.
//!
//! One logical "buy" touches two backends without a shared transaction:
//! the bonus ledger is written first, then the ticket is created. If ticket
//! creation fails after the ledger write, the inconsistency is logged and
//! left for operational resolution — there is no automatic rollback on this
//! path.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::clients::{FlightClient, PrivilegeClient, TicketClient};
use crate::domain::{
    AddTransactionRequest, OperationType, PrivilegeShortInfo, TicketCreateRequest,
    TicketPurchaseRequest, TicketPurchaseResponse, TicketStatus,
};
use crate::error::{GatewayError, GatewayResult};

/// Composes flight lookup, privilege lookup, payment split, ledger write and
/// ticket creation into one buy operation.
pub struct PurchaseOrchestrator {
    flights: Arc<FlightClient>,
    tickets: Arc<TicketClient>,
    privileges: Arc<PrivilegeClient>,
}

impl PurchaseOrchestrator {
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

    /// Buy a ticket for `username`.
    ///
    /// Payment split: `paid_by_bonus = min(balance, price)` when drawing
    /// from the balance, else 0; the money part is the remainder. Purchases
    /// paid fully with money accrue `price / 10` bonus points.
    pub async fn purchase(
        &self,
        username: &str,
        request: &TicketPurchaseRequest,
    ) -> GatewayResult<TicketPurchaseResponse> {
        let flight = self
            .flights
            .by_number(&request.flight_number)
            .await?
            .ok_or_else(|| GatewayError::Validation("flight does not exist".to_string()))?;

        let privilege = self
            .privileges
            .for_user(username)
            .await?
            .ok_or_else(|| GatewayError::Validation("user does not exist".to_string()))?;

        let ticket_uid = Uuid::new_v4();
        let now = Utc::now();

        let paid_by_bonus = if request.paid_from_balance {
            privilege.balance.min(flight.price)
        } else {
            0
        };
        let paid_by_money = flight.price - paid_by_bonus;

        // Ledger write always precedes ticket creation.
        let mut ledger_written = false;
        if request.paid_from_balance {
            if paid_by_bonus > 0 {
                self.privileges
                    .append_transaction(
                        username,
                        &AddTransactionRequest {
                            privilege_id: privilege.id,
                            ticket_uid,
                            datetime: now,
                            balance_diff: paid_by_bonus,
                            operation_type: OperationType::DebitTheAccount,
                        },
                    )
                    .await?;
                ledger_written = true;
            }
        } else {
            self.privileges
                .append_transaction(
                    username,
                    &AddTransactionRequest {
                        privilege_id: privilege.id,
                        ticket_uid,
                        datetime: now,
                        balance_diff: paid_by_money / 10,
                        operation_type: OperationType::FillInBalance,
                    },
                )
                .await?;
            ledger_written = true;
        }

        let refreshed = self
            .privileges
            .for_user(username)
            .await?
            .ok_or_else(|| GatewayError::Validation("user does not exist".to_string()))?;

        if let Err(err) = self
            .tickets
            .create(&TicketCreateRequest {
                ticket_uid,
                username: username.to_string(),
                flight_number: flight.flight_number.clone(),
                price: paid_by_money,
            })
            .await
        {
            if ledger_written {
                tracing::warn!(
                    ticket_uid = %ticket_uid,
                    username,
                    "Ticket creation failed after ledger write; ledger left inconsistent"
                );
            }
            return Err(err);
        }

        Ok(TicketPurchaseResponse {
            ticket_uid,
            flight_number: flight.flight_number,
            from_airport: flight.from_airport,
            to_airport: flight.to_airport,
            date: now,
            price: flight.price,
            paid_by_money,
            paid_by_bonuses: paid_by_bonus,
            status: TicketStatus::Paid,
            privilege: PrivilegeShortInfo {
                balance: refreshed.balance,
                status: refreshed.status,
            },
        })
    }
}
