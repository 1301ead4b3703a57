//! End-to-end tests for the gateway against programmable mock backends.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use flight_gateway::config::GatewayConfig;
use flight_gateway::http::GatewayServer;
use flight_gateway::lifecycle::Shutdown;
use serde_json::{json, Value};

mod common;

const TICKET_UID: &str = "7f3d60fe-0bd4-4fd6-9524-1f5b78bd1c37";

fn config_for(
    flights: SocketAddr,
    tickets: SocketAddr,
    privileges: SocketAddr,
) -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config.listener.bind_address = "127.0.0.1:0".to_string();
    config.backends.flights_url = format!("http://{flights}");
    config.backends.tickets_url = format!("http://{tickets}");
    config.backends.privileges_url = format!("http://{privileges}");
    config.health_check.enabled = false;
    config
}

async fn start_gateway(config: GatewayConfig) -> (String, Arc<Shutdown>) {
    let shutdown = Arc::new(Shutdown::new());
    let server = GatewayServer::new(config, shutdown.clone()).unwrap();
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = server.run(listener).await;
    });
    tokio::time::sleep(Duration::from_millis(150)).await;
    (format!("http://{addr}"), shutdown)
}

fn flight_json(number: &str, price: i64) -> String {
    json!({
        "flightNumber": number,
        "fromAirport": "SVO",
        "toAirport": "LED",
        "date": "2021-10-08T19:59:19Z",
        "price": price,
    })
    .to_string()
}

fn privilege_json(balance: i64) -> String {
    json!({"id": 1, "username": "alice", "balance": balance, "status": "GOLD"}).to_string()
}

fn ticket_json(uid: &str, username: &str, status: &str, price: i64) -> String {
    json!({
        "ticketUid": uid,
        "username": username,
        "flightNumber": "AFL031",
        "price": price,
        "status": status,
    })
    .to_string()
}

fn history_entry_json(uid: &str) -> String {
    json!({
        "datetime": "2021-10-08T19:59:19Z",
        "ticketUid": uid,
        "balanceDiff": 300,
        "operationType": "DEBIT_THE_ACCOUNT",
    })
    .to_string()
}

/// Flight backend that knows a single flight priced at 500.
async fn start_flight_backend() -> SocketAddr {
    common::start_json_backend(|method, path, _body| async move {
        match (method.as_str(), path.as_str()) {
            ("GET", "/flights/AFL031") => (200, flight_json("AFL031", 500)),
            _ => (404, "{}".to_string()),
        }
    })
    .await
}

/// Privilege backend with a mutable balance and an event log shared with
/// the test body.
async fn start_privilege_backend(
    balance: Arc<Mutex<i64>>,
    events: Arc<Mutex<Vec<String>>>,
) -> SocketAddr {
    common::start_json_backend(move |method, path, body| {
        let balance = balance.clone();
        let events = events.clone();
        async move {
            match (method.as_str(), path.as_str()) {
                ("GET", "/privilege/alice") => {
                    let value = *balance.lock().unwrap();
                    (200, privilege_json(value))
                }
                ("POST", "/privilege/alice/history") => {
                    let tx: Value = serde_json::from_str(&body).unwrap();
                    let diff = tx["balanceDiff"].as_i64().unwrap();
                    let op = tx["operationType"].as_str().unwrap().to_string();
                    {
                        let mut value = balance.lock().unwrap();
                        if op == "DEBIT_THE_ACCOUNT" {
                            *value -= diff;
                        } else {
                            *value += diff;
                        }
                    }
                    events.lock().unwrap().push(format!("ledger:{op}:{diff}"));
                    (200, "{}".to_string())
                }
                _ => (404, "{}".to_string()),
            }
        }
    })
    .await
}

#[tokio::test]
async fn test_purchase_split_paid_from_balance() {
    let flights = start_flight_backend().await;

    let balance = Arc::new(Mutex::new(300i64));
    let events = Arc::new(Mutex::new(Vec::<String>::new()));
    let privileges = start_privilege_backend(balance, events.clone()).await;

    let ticket_events = events.clone();
    let tickets = common::start_json_backend(move |method, path, _body| {
        let events = ticket_events.clone();
        async move {
            match (method.as_str(), path.as_str()) {
                ("POST", "/tickets") => {
                    events.lock().unwrap().push("ticket-create".to_string());
                    (200, "{}".to_string())
                }
                _ => (404, "{}".to_string()),
            }
        }
    })
    .await;

    let (gateway, shutdown) = start_gateway(config_for(flights, tickets, privileges)).await;

    let client = reqwest::Client::new();
    let response = client
        .post(format!("{gateway}/api/v1/tickets"))
        .header("X-User-Name", "alice")
        .json(&json!({"flightNumber": "AFL031", "price": 500, "paidFromBalance": true}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let receipt: Value = response.json().await.unwrap();
    assert_eq!(receipt["paidByBonuses"], 300);
    assert_eq!(receipt["paidByMoney"], 200);
    assert_eq!(receipt["status"], "PAID");
    assert_eq!(receipt["privilege"]["balance"], 0);

    // Ledger transaction is issued before ticket creation.
    let recorded = events.lock().unwrap().clone();
    assert_eq!(
        recorded,
        vec![
            "ledger:DEBIT_THE_ACCOUNT:300".to_string(),
            "ticket-create".to_string()
        ]
    );

    shutdown.trigger();
}

#[tokio::test]
async fn test_purchase_without_balance_accrues_bonus() {
    let flights = start_flight_backend().await;

    let balance = Arc::new(Mutex::new(300i64));
    let events = Arc::new(Mutex::new(Vec::<String>::new()));
    let privileges = start_privilege_backend(balance, events.clone()).await;

    let tickets = common::start_json_backend(|method, path, _body| async move {
        match (method.as_str(), path.as_str()) {
            ("POST", "/tickets") => (200, "{}".to_string()),
            _ => (404, "{}".to_string()),
        }
    })
    .await;

    let (gateway, shutdown) = start_gateway(config_for(flights, tickets, privileges)).await;

    let client = reqwest::Client::new();
    let response = client
        .post(format!("{gateway}/api/v1/tickets"))
        .header("X-User-Name", "alice")
        .json(&json!({"flightNumber": "AFL031", "price": 500, "paidFromBalance": false}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let receipt: Value = response.json().await.unwrap();
    assert_eq!(receipt["paidByBonuses"], 0);
    assert_eq!(receipt["paidByMoney"], 500);
    // 500 / 10 accrued as a reward.
    assert_eq!(receipt["privilege"]["balance"], 350);

    let recorded = events.lock().unwrap().clone();
    assert_eq!(recorded, vec!["ledger:FILL_IN_BALANCE:50".to_string()]);

    shutdown.trigger();
}

#[tokio::test]
async fn test_cancel_requires_paid_status() {
    let flights = start_flight_backend().await;
    let privileges = common::start_json_backend(|_m, _p, _b| async move {
        (200, privilege_json(300))
    })
    .await;

    let deletes = Arc::new(AtomicU32::new(0));
    let delete_count = deletes.clone();
    let tickets = common::start_json_backend(move |method, path, _body| {
        let deletes = delete_count.clone();
        async move {
            match (method.as_str(), path.as_str()) {
                ("GET", p) if p.starts_with("/tickets/") => {
                    (200, ticket_json(TICKET_UID, "alice", "CANCELLED", 500))
                }
                ("DELETE", p) if p.starts_with("/tickets/") => {
                    deletes.fetch_add(1, Ordering::SeqCst);
                    (204, String::new())
                }
                _ => (404, "{}".to_string()),
            }
        }
    })
    .await;

    let (gateway, shutdown) = start_gateway(config_for(flights, tickets, privileges)).await;

    let client = reqwest::Client::new();
    let response = client
        .delete(format!("{gateway}/api/v1/tickets/{TICKET_UID}"))
        .header("X-User-Name", "alice")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);
    assert_eq!(deletes.load(Ordering::SeqCst), 0, "no deletion on invalid state");

    shutdown.trigger();
}

#[tokio::test]
async fn test_cancel_rejects_foreign_ticket() {
    let flights = start_flight_backend().await;
    let privileges = common::start_json_backend(|_m, _p, _b| async move {
        (200, privilege_json(300))
    })
    .await;

    let tickets = common::start_json_backend(|method, path, _body| async move {
        match (method.as_str(), path.as_str()) {
            ("GET", p) if p.starts_with("/tickets/") => {
                (200, ticket_json(TICKET_UID, "bob", "PAID", 500))
            }
            _ => (404, "{}".to_string()),
        }
    })
    .await;

    let (gateway, shutdown) = start_gateway(config_for(flights, tickets, privileges)).await;

    let client = reqwest::Client::new();
    let response = client
        .delete(format!("{gateway}/api/v1/tickets/{TICKET_UID}"))
        .header("X-User-Name", "alice")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 403);

    shutdown.trigger();
}

#[tokio::test]
async fn test_cancel_deletes_even_when_rollback_never_succeeds() {
    let flights = start_flight_backend().await;

    let rollbacks = Arc::new(AtomicU32::new(0));
    let rollback_count = rollbacks.clone();
    let privileges = common::start_json_backend(move |method, path, _body| {
        let rollbacks = rollback_count.clone();
        async move {
            match (method.as_str(), path.as_str()) {
                ("GET", "/privilege/alice") => (200, privilege_json(300)),
                // Ledger lookup stays unavailable for the whole retry budget.
                ("GET", p) if p.starts_with("/privilege/alice/history/") => {
                    (503, "{}".to_string())
                }
                ("DELETE", p) if p.starts_with("/privilege/alice/history/") => {
                    rollbacks.fetch_add(1, Ordering::SeqCst);
                    (200, "{}".to_string())
                }
                _ => (404, "{}".to_string()),
            }
        }
    })
    .await;

    let deletes = Arc::new(AtomicU32::new(0));
    let delete_count = deletes.clone();
    let tickets = common::start_json_backend(move |method, path, _body| {
        let deletes = delete_count.clone();
        async move {
            match (method.as_str(), path.as_str()) {
                ("GET", p) if p.starts_with("/tickets/") => {
                    (200, ticket_json(TICKET_UID, "alice", "PAID", 500))
                }
                ("DELETE", p) if p.starts_with("/tickets/") => {
                    deletes.fetch_add(1, Ordering::SeqCst);
                    (204, String::new())
                }
                _ => (404, "{}".to_string()),
            }
        }
    })
    .await;

    let mut config = config_for(flights, tickets, privileges);
    config.refund.retry_interval_secs = 1;
    config.refund.retry_deadline_secs = 2;
    let (gateway, shutdown) = start_gateway(config).await;

    let client = reqwest::Client::new();
    let response = client
        .delete(format!("{gateway}/api/v1/tickets/{TICKET_UID}"))
        .header("X-User-Name", "alice")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 204, "deletion responds before compensation");
    assert_eq!(deletes.load(Ordering::SeqCst), 1);

    // Let the retry budget run out.
    tokio::time::sleep(Duration::from_millis(3500)).await;
    assert_eq!(rollbacks.load(Ordering::SeqCst), 0, "rollback never reached");

    shutdown.trigger();
}

#[tokio::test]
async fn test_rollback_retried_until_ledger_visible() {
    let flights = start_flight_backend().await;

    let lookups = Arc::new(AtomicU32::new(0));
    let rollbacks = Arc::new(AtomicU32::new(0));
    let lookup_count = lookups.clone();
    let rollback_count = rollbacks.clone();
    let privileges = common::start_json_backend(move |method, path, _body| {
        let lookups = lookup_count.clone();
        let rollbacks = rollback_count.clone();
        async move {
            match (method.as_str(), path.as_str()) {
                ("GET", "/privilege/alice") => (200, privilege_json(300)),
                ("GET", p) if p.starts_with("/privilege/alice/history/") => {
                    // Unavailable twice, then the ledger entry shows up.
                    if lookups.fetch_add(1, Ordering::SeqCst) < 2 {
                        (503, "{}".to_string())
                    } else {
                        (200, history_entry_json(TICKET_UID))
                    }
                }
                ("DELETE", p) if p.starts_with("/privilege/alice/history/") => {
                    rollbacks.fetch_add(1, Ordering::SeqCst);
                    (200, "{}".to_string())
                }
                _ => (404, "{}".to_string()),
            }
        }
    })
    .await;

    let tickets = common::start_json_backend(|method, path, _body| async move {
        match (method.as_str(), path.as_str()) {
            ("GET", p) if p.starts_with("/tickets/") => {
                (200, ticket_json(TICKET_UID, "alice", "PAID", 500))
            }
            ("DELETE", p) if p.starts_with("/tickets/") => (204, String::new()),
            _ => (404, "{}".to_string()),
        }
    })
    .await;

    let (gateway, shutdown) = start_gateway(config_for(flights, tickets, privileges)).await;

    let client = reqwest::Client::new();
    let response = client
        .delete(format!("{gateway}/api/v1/tickets/{TICKET_UID}"))
        .header("X-User-Name", "alice")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 204);

    tokio::time::sleep(Duration::from_millis(4000)).await;
    assert_eq!(rollbacks.load(Ordering::SeqCst), 1, "rollback issued once found");

    shutdown.trigger();
}

#[tokio::test]
async fn test_profile_degrades_ticket_section() {
    let flights = start_flight_backend().await;
    let privileges = common::start_json_backend(|_m, _p, _b| async move {
        (200, privilege_json(300))
    })
    .await;
    // Ticket backend is down entirely.
    let tickets = common::start_json_backend(|_m, _p, _b| async move {
        (500, "{}".to_string())
    })
    .await;

    let (gateway, shutdown) = start_gateway(config_for(flights, tickets, privileges)).await;

    let client = reqwest::Client::new();
    let response = client
        .get(format!("{gateway}/api/v1/me"))
        .header("X-User-Name", "alice")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let profile: Value = response.json().await.unwrap();
    assert_eq!(profile["tickets"].as_array().unwrap().len(), 0);
    assert_eq!(profile["privilege"]["balance"], 300);

    shutdown.trigger();
}

#[tokio::test]
async fn test_profile_degrades_privilege_and_flight_sections() {
    // Privilege and flight backends down; tickets healthy.
    let flights = common::start_json_backend(|_m, _p, _b| async move {
        (500, "{}".to_string())
    })
    .await;
    let privileges = common::start_json_backend(|_m, _p, _b| async move {
        (500, "{}".to_string())
    })
    .await;
    let tickets = common::start_json_backend(|method, path, _body| async move {
        match (method.as_str(), path.as_str()) {
            ("GET", "/tickets/user/alice") => {
                (200, format!("[{}]", ticket_json(TICKET_UID, "alice", "PAID", 500)))
            }
            _ => (404, "{}".to_string()),
        }
    })
    .await;

    let (gateway, shutdown) = start_gateway(config_for(flights, tickets, privileges)).await;

    let client = reqwest::Client::new();
    let response = client
        .get(format!("{gateway}/api/v1/me"))
        .header("X-User-Name", "alice")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let profile: Value = response.json().await.unwrap();
    assert!(profile["privilege"].is_null());
    let rows = profile["tickets"].as_array().unwrap();
    assert_eq!(rows.len(), 1);
    // Degraded flight join renders the placeholder route.
    assert_eq!(rows[0]["fromAirport"], "XXX");
    assert_eq!(rows[0]["price"], 0);
    assert_eq!(rows[0]["status"], "PAID");

    shutdown.trigger();
}

#[tokio::test]
async fn test_not_found_is_not_a_breaker_failure() {
    let hits = Arc::new(AtomicU32::new(0));
    let hit_count = hits.clone();
    let flights = common::start_json_backend(move |method, path, _body| {
        let hits = hit_count.clone();
        async move {
            hits.fetch_add(1, Ordering::SeqCst);
            match (method.as_str(), path.as_str()) {
                ("GET", "/flights/AFL031") => (200, flight_json("AFL031", 500)),
                _ => (404, "{}".to_string()),
            }
        }
    })
    .await;

    let balance = Arc::new(Mutex::new(300i64));
    let events = Arc::new(Mutex::new(Vec::<String>::new()));
    let privileges = start_privilege_backend(balance, events).await;

    let tickets = common::start_json_backend(|method, path, _body| async move {
        match (method.as_str(), path.as_str()) {
            ("POST", "/tickets") => (200, "{}".to_string()),
            _ => (404, "{}".to_string()),
        }
    })
    .await;

    let mut config = config_for(flights, tickets, privileges);
    // A single failure outcome would open the circuit.
    config.breaker.failure_threshold = 1;
    let (gateway, shutdown) = start_gateway(config).await;

    let client = reqwest::Client::new();
    for _ in 0..3 {
        let response = client
            .post(format!("{gateway}/api/v1/tickets"))
            .header("X-User-Name", "alice")
            .json(&json!({"flightNumber": "UNKNOWN", "price": 500, "paidFromBalance": false}))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 400, "missing flight is a validation error");
    }

    // The breaker stayed closed: the next lookup reaches the backend.
    let response = client
        .post(format!("{gateway}/api/v1/tickets"))
        .header("X-User-Name", "alice")
        .json(&json!({"flightNumber": "AFL031", "price": 500, "paidFromBalance": false}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(hits.load(Ordering::SeqCst), 4);

    shutdown.trigger();
}

#[tokio::test]
async fn test_breaker_opens_and_fails_fast() {
    let hits = Arc::new(AtomicU32::new(0));
    let hit_count = hits.clone();
    let flights = common::start_json_backend(move |_m, _p, _b| {
        let hits = hit_count.clone();
        async move {
            hits.fetch_add(1, Ordering::SeqCst);
            (500, "{}".to_string())
        }
    })
    .await;
    let privileges = common::start_json_backend(|_m, _p, _b| async move {
        (200, privilege_json(300))
    })
    .await;
    let tickets = common::start_json_backend(|_m, _p, _b| async move {
        (200, "[]".to_string())
    })
    .await;

    let mut config = config_for(flights, tickets, privileges);
    config.breaker.failure_threshold = 2;
    let (gateway, shutdown) = start_gateway(config).await;

    let client = reqwest::Client::new();
    for _ in 0..2 {
        let response = client
            .get(format!("{gateway}/api/v1/flights"))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 503);
    }
    assert_eq!(hits.load(Ordering::SeqCst), 2);

    // Open circuit: rejected without reaching the backend.
    let response = client
        .get(format!("{gateway}/api/v1/flights"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 503);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Flights Service unavailable");
    assert_eq!(hits.load(Ordering::SeqCst), 2);

    shutdown.trigger();
}

#[tokio::test]
async fn test_breaker_recovers_after_timeout() {
    let healthy = Arc::new(AtomicBool::new(false));
    let hits = Arc::new(AtomicU32::new(0));
    let healthy_flag = healthy.clone();
    let hit_count = hits.clone();
    let flights = common::start_json_backend(move |_m, _p, _b| {
        let healthy = healthy_flag.clone();
        let hits = hit_count.clone();
        async move {
            hits.fetch_add(1, Ordering::SeqCst);
            if healthy.load(Ordering::SeqCst) {
                (
                    200,
                    json!({"page": 1, "pageSize": 10, "totalElements": 0, "items": []})
                        .to_string(),
                )
            } else {
                (500, "{}".to_string())
            }
        }
    })
    .await;
    let privileges = common::start_json_backend(|_m, _p, _b| async move {
        (200, privilege_json(300))
    })
    .await;
    let tickets = common::start_json_backend(|_m, _p, _b| async move {
        (200, "[]".to_string())
    })
    .await;

    let mut config = config_for(flights, tickets, privileges);
    config.breaker.failure_threshold = 1;
    config.breaker.recovery_timeout_secs = 1;
    let (gateway, shutdown) = start_gateway(config).await;

    let client = reqwest::Client::new();
    let response = client.get(format!("{gateway}/api/v1/flights")).send().await.unwrap();
    assert_eq!(response.status(), 503);
    assert_eq!(hits.load(Ordering::SeqCst), 1);

    // Still open: fail fast.
    let response = client.get(format!("{gateway}/api/v1/flights")).send().await.unwrap();
    assert_eq!(response.status(), 503);
    assert_eq!(hits.load(Ordering::SeqCst), 1);

    healthy.store(true, Ordering::SeqCst);
    tokio::time::sleep(Duration::from_millis(1200)).await;

    // Half-open probe succeeds and closes the circuit.
    let response = client.get(format!("{gateway}/api/v1/flights")).send().await.unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(hits.load(Ordering::SeqCst), 2);

    let response = client.get(format!("{gateway}/api/v1/flights")).send().await.unwrap();
    assert_eq!(response.status(), 200);

    shutdown.trigger();
}

#[tokio::test]
async fn test_privilege_view_includes_history() {
    let flights = start_flight_backend().await;
    let tickets = common::start_json_backend(|_m, _p, _b| async move {
        (200, "[]".to_string())
    })
    .await;
    let privileges = common::start_json_backend(|method, path, _body| async move {
        match (method.as_str(), path.as_str()) {
            ("GET", "/privilege/alice") => (200, privilege_json(300)),
            ("GET", "/privilege/alice/history") => {
                (200, format!("[{}]", history_entry_json(TICKET_UID)))
            }
            _ => (404, "{}".to_string()),
        }
    })
    .await;

    let (gateway, shutdown) = start_gateway(config_for(flights, tickets, privileges)).await;

    let client = reqwest::Client::new();
    let response = client
        .get(format!("{gateway}/api/v1/privilege"))
        .header("X-User-Name", "alice")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let view: Value = response.json().await.unwrap();
    assert_eq!(view["balance"], 300);
    assert_eq!(view["status"], "GOLD");
    let history = view["history"].as_array().unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0]["operationType"], "DEBIT_THE_ACCOUNT");
    assert_eq!(history[0]["balanceDiff"], 300);

    shutdown.trigger();
}

#[tokio::test]
async fn test_missing_identity_header_is_rejected() {
    let flights = start_flight_backend().await;
    let tickets = common::start_json_backend(|_m, _p, _b| async move {
        (200, "[]".to_string())
    })
    .await;
    let privileges = common::start_json_backend(|_m, _p, _b| async move {
        (200, privilege_json(300))
    })
    .await;

    let (gateway, shutdown) = start_gateway(config_for(flights, tickets, privileges)).await;

    let client = reqwest::Client::new();
    let response = client.get(format!("{gateway}/api/v1/me")).send().await.unwrap();
    assert_eq!(response.status(), 400);

    shutdown.trigger();
}
