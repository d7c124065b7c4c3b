//! Stale-response guard integration tests
//!
//! A lookup for key A resolving after the page has moved to key B must never
//! reach the form state for B. The mock source here lets the test hold the
//! first response hostage until a newer lookup has completed.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::json;

use stoker::form::{EditKey, Mode, Record, RecordSink, Ack};
use stoker::loader::{ExistenceLoader, LoadOutcome, RecordSource};
use stoker::page::{Capabilities, ModulePage, PageContext};
use stoker::schema::SchemaRegistry;
use stoker::types::Result;
use tokio::sync::Notify;

fn key(unit: &str) -> EditKey {
    EditKey::Unit {
        unit: unit.into(),
        date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
    }
}

/// Source that parks requests for one unit until released; every response
/// echoes its unit so the test can tell responses apart.
struct GatedSource {
    gate: Arc<Notify>,
    slow_unit: String,
}

#[async_trait]
impl RecordSource for GatedSource {
    async fn fetch(&self, key: &EditKey) -> Result<Option<Record>> {
        let unit = match key {
            EditKey::Unit { unit, .. } => unit.clone(),
            _ => unreachable!("unit keys only in this test"),
        };
        if unit == self.slow_unit {
            self.gate.notified().await;
        }
        Ok(Some(
            json!({ "remarks": unit }).as_object().unwrap().clone(),
        ))
    }
}

#[async_trait]
impl RecordSink for GatedSource {
    async fn upsert(&self, _key: &EditKey, _payload: &Record) -> Result<Ack> {
        Ok(Ack::default())
    }
}

#[tokio::test]
async fn stale_loader_response_is_discarded() {
    let gate = Arc::new(Notify::new());
    let loader = Arc::new(ExistenceLoader::new(GatedSource {
        gate: gate.clone(),
        slow_unit: "Unit-1".into(),
    }));

    let slow = {
        let loader = loader.clone();
        tokio::spawn(async move { loader.load(&key("Unit-1")).await })
    };
    tokio::task::yield_now().await;

    // The newer lookup wins.
    match loader.load(&key("Unit-2")).await.unwrap() {
        LoadOutcome::Found(record) => assert_eq!(record["remarks"], json!("Unit-2")),
        other => panic!("expected Found, got {other:?}"),
    }

    // The parked response resolves afterwards and reports itself stale.
    gate.notify_one();
    assert_eq!(slow.await.unwrap().unwrap(), LoadOutcome::Superseded);
}

/// Source that fails for one unit and answers for the rest.
struct FlakySource {
    failing_unit: String,
}

#[async_trait]
impl RecordSource for FlakySource {
    async fn fetch(&self, key: &EditKey) -> Result<Option<Record>> {
        let unit = match key {
            EditKey::Unit { unit, .. } => unit.clone(),
            _ => unreachable!("unit keys only in this test"),
        };
        if unit == self.failing_unit {
            return Err(stoker::EngineError::Server {
                status: 500,
                detail: "db down".into(),
            });
        }
        Ok(Some(
            json!({ "remarks": unit }).as_object().unwrap().clone(),
        ))
    }
}

#[async_trait]
impl RecordSink for FlakySource {
    async fn upsert(&self, _key: &EditKey, _payload: &Record) -> Result<Ack> {
        Ok(Ack::default())
    }
}

#[tokio::test]
async fn lookup_failure_leaves_page_state_untouched() {
    let source = Arc::new(FlakySource {
        failing_unit: "Unit-2".into(),
    });

    let registry = SchemaRegistry::builtin().unwrap();
    let schema = registry.get("unit_report").unwrap().clone();
    let mut page = ModulePage::new(
        schema,
        source.clone(),
        source,
        PageContext {
            capabilities: Capabilities::full(),
            edit_credential: None,
        },
    );

    // A good load first.
    page.select_key(key("Unit-1")).await.unwrap();
    assert_eq!(page.state().mode, Mode::Edit);
    assert_eq!(page.state().value("remarks"), Some("Unit-1"));

    // The failing lookup surfaces its error and resets nothing.
    let err = page.select_key(key("Unit-2")).await.unwrap_err();
    assert!(err.to_string().contains("db down"));
    assert_eq!(page.state().value("remarks"), Some("Unit-1"));
    assert_eq!(page.state().mode, Mode::Edit);
}
