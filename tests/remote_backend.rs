//! Remote table backend against an in-process stub server

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::get;
use axum::{Json, Router};
use chrono::NaiveDate;
use serde_json::{json, Value};
use tempfile::TempDir;

use pension_ledger::models::{Entry, EntryKind, EntryUpdate, Ledger, Money, NewEntry};
use pension_ledger::services::EntryStore;
use pension_ledger::storage::{Backend, LocalBackend, Persistence, RemoteBackend};

const KEY: &str = "test-key";

#[derive(Clone, Default)]
struct Table {
    rows: Arc<Mutex<Vec<Value>>>,
}

impl Table {
    fn seeded(rows: Vec<Value>) -> Self {
        Self {
            rows: Arc::new(Mutex::new(rows)),
        }
    }

    fn snapshot(&self) -> Vec<Value> {
        self.rows.lock().unwrap().clone()
    }
}

fn authorized(headers: &HeaderMap) -> bool {
    let apikey = headers.get("apikey").and_then(|v| v.to_str().ok());
    let bearer = headers.get("authorization").and_then(|v| v.to_str().ok());
    apikey == Some(KEY) && bearer == Some(format!("Bearer {}", KEY).as_str())
}

fn id_param(query: &HashMap<String, String>) -> Option<String> {
    query.get("id")?.strip_prefix("eq.").map(str::to_string)
}

async fn list_rows(
    State(table): State<Table>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Result<Json<Vec<Value>>, StatusCode> {
    if !authorized(&headers) {
        return Err(StatusCode::UNAUTHORIZED);
    }
    let mut rows = table.snapshot();
    if query.get("order").map(String::as_str) == Some("date.asc") {
        rows.sort_by(|a, b| a["date"].as_str().cmp(&b["date"].as_str()));
    }
    Ok(Json(rows))
}

async fn insert_row(
    State(table): State<Table>,
    headers: HeaderMap,
    Json(row): Json<Value>,
) -> StatusCode {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED;
    }
    table.rows.lock().unwrap().push(row);
    StatusCode::CREATED
}

async fn update_row(
    State(table): State<Table>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
    Json(row): Json<Value>,
) -> StatusCode {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED;
    }
    let Some(id) = id_param(&query) else {
        return StatusCode::BAD_REQUEST;
    };
    let mut rows = table.rows.lock().unwrap();
    for existing in rows.iter_mut() {
        if existing["id"] == id.as_str() {
            *existing = row.clone();
        }
    }
    StatusCode::NO_CONTENT
}

async fn delete_row(
    State(table): State<Table>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> StatusCode {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED;
    }
    let Some(id) = id_param(&query) else {
        return StatusCode::BAD_REQUEST;
    };
    table.rows.lock().unwrap().retain(|row| row["id"] != id.as_str());
    StatusCode::NO_CONTENT
}

async fn spawn_stub(table: Table) -> String {
    let app = Router::new()
        .route(
            "/rest/v1/entries",
            get(list_rows)
                .post(insert_row)
                .patch(update_row)
                .delete(delete_row),
        )
        .with_state(table);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

/// Address nothing is listening on
async fn dead_address() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

fn entry(day: u32, description: &str, cents: i64, kind: EntryKind) -> Entry {
    Entry::new(
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
        description,
        Money::from_cents(cents),
        kind,
    )
}

fn remote_persistence(temp_dir: &TempDir, url: &str) -> Persistence {
    Persistence::new(
        LocalBackend::new(temp_dir.path().join("snapshot.json")),
        Backend::Remote(RemoteBackend::new(url, KEY)),
    )
}

#[tokio::test]
async fn test_insert_and_list_in_date_order() {
    let table = Table::default();
    let backend = RemoteBackend::new(&spawn_stub(table.clone()).await, KEY);

    let later = entry(20, "Pension", 150000, EntryKind::Income);
    let earlier = entry(3, "Electricity", 6025, EntryKind::Expense);
    backend.insert(&later).await.unwrap();
    backend.insert(&earlier).await.unwrap();

    let rows = table.snapshot();
    assert_eq!(rows[0]["amount"], json!(1500.0));
    assert_eq!(rows[0]["type"], "income");

    let listed = backend.list().await.unwrap();
    assert_eq!(listed, vec![earlier, later]);
}

#[tokio::test]
async fn test_update_and_delete_by_id() {
    let table = Table::default();
    let backend = RemoteBackend::new(&spawn_stub(table.clone()).await, KEY);

    let mut groceries = entry(5, "Groceries", 4200, EntryKind::Expense);
    let tea = entry(6, "Tea", 350, EntryKind::Expense);
    backend.insert(&groceries).await.unwrap();
    backend.insert(&tea).await.unwrap();

    groceries.amount = Money::from_cents(4850);
    backend.update(&groceries).await.unwrap();
    backend.delete(tea.id).await.unwrap();

    let listed = backend.list().await.unwrap();
    assert_eq!(listed, vec![groceries]);
}

#[tokio::test]
async fn test_rejected_key_is_backend_unavailable() {
    let url = spawn_stub(Table::default()).await;
    let backend = RemoteBackend::new(&url, "wrong-key");

    let err = backend.list().await.unwrap_err();
    assert!(err.is_backend_unavailable());
}

#[tokio::test]
async fn test_invalid_rows_are_skipped() {
    let good = entry(1, "Pension", 100000, EntryKind::Income);
    let table = Table::seeded(vec![
        serde_json::to_value(pension_ledger::storage::RemoteRow::from(&good)).unwrap(),
        json!({
            "id": "5f0c9a40-5b7e-4d7e-9a55-0d9b8d3f2a11",
            "date": "2024-01-02",
            "description": "Broken",
            "amount": -5.0,
            "type": "expense"
        }),
    ]);
    let backend = RemoteBackend::new(&spawn_stub(table).await, KEY);

    assert_eq!(backend.list().await.unwrap(), vec![good]);
}

#[tokio::test]
async fn test_remote_load_wins_and_refreshes_snapshot() {
    let temp_dir = TempDir::new().unwrap();
    let remote_entry = entry(2, "Pension", 90000, EntryKind::Income);
    let table = Table::seeded(vec![
        serde_json::to_value(pension_ledger::storage::RemoteRow::from(&remote_entry)).unwrap(),
    ]);
    let persistence = remote_persistence(&temp_dir, &spawn_stub(table).await);

    let stale = Ledger::with_entries(
        Money::from_cents(5000),
        vec![entry(1, "Old local entry", 100, EntryKind::Expense)],
    );
    persistence.save_local(&stale).unwrap();

    let loaded = persistence.load().await;
    assert!(loaded.is_clean());
    assert_eq!(loaded.value.entries, vec![remote_entry]);
    assert_eq!(loaded.value.starting_balance.cents(), 5000);

    let snapshot = persistence.local().load().unwrap().unwrap();
    assert_eq!(snapshot, loaded.value);
}

#[tokio::test]
async fn test_unreachable_remote_falls_back_to_snapshot() {
    let temp_dir = TempDir::new().unwrap();
    let persistence = remote_persistence(&temp_dir, &dead_address().await);
    let saved = Ledger::with_entries(
        Money::from_cents(100000),
        vec![entry(1, "Pension", 50000, EntryKind::Income)],
    );
    persistence.save_local(&saved).unwrap();

    let loaded = persistence.load().await;
    assert_eq!(loaded.value, saved);
    assert_eq!(loaded.warnings.len(), 1);
    assert!(loaded.warnings[0].is_backend_unavailable());
}

#[tokio::test]
async fn test_store_mutations_are_mirrored() {
    let temp_dir = TempDir::new().unwrap();
    let table = Table::default();
    let persistence = remote_persistence(&temp_dir, &spawn_stub(table.clone()).await);
    let mut store = EntryStore::load_initial(persistence).await.value;

    let added = store
        .add_entry(NewEntry {
            description: "Pharmacy".into(),
            amount: Money::from_cents(1899),
            date: NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
            kind: EntryKind::Expense,
        })
        .await
        .unwrap();
    assert!(added.is_clean());
    assert_eq!(table.snapshot().len(), 1);

    let updated = store
        .update_entry(added.value.id, EntryUpdate::new().description("Prescriptions"))
        .await
        .unwrap();
    assert!(updated.is_clean());
    assert_eq!(table.snapshot()[0]["description"], "Prescriptions");

    let removed = store.remove_entry(added.value.id).await;
    assert!(removed.is_clean());
    assert!(table.snapshot().is_empty());
}

#[tokio::test]
async fn test_remote_outage_keeps_change_locally() {
    let temp_dir = TempDir::new().unwrap();
    let persistence = remote_persistence(&temp_dir, &dead_address().await);
    let loaded = EntryStore::load_initial(persistence).await;
    assert_eq!(loaded.warnings.len(), 1);
    let mut store = loaded.value;

    let added = store
        .add_entry(NewEntry {
            description: "Bus pass".into(),
            amount: Money::from_cents(2500),
            date: NaiveDate::from_ymd_opt(2024, 2, 3).unwrap(),
            kind: EntryKind::Expense,
        })
        .await
        .unwrap();

    assert_eq!(added.warnings.len(), 1);
    assert!(added.warnings[0].is_backend_unavailable());
    assert!(added.warnings[0].to_string().contains("remote insert failed"));
    assert_eq!(store.entries(), &[added.value.clone()]);

    let snapshot = store.persistence().local().load().unwrap().unwrap();
    assert_eq!(snapshot.entries, vec![added.value]);
}
