//! Existence loader.
//!
//! Whenever a page's edit key changes (date picker, unit selector), the
//! loader asks the backend whether a record already exists under that key.
//! A found record flips the form into edit mode; a 404 means create mode.
//!
//! Responses can arrive out of order: a lookup for key A may resolve after
//! the user has already moved to key B. Each call takes a fresh generation
//! number and a response whose generation is no longer current comes back as
//! [`LoadOutcome::Superseded`], which callers must discard without touching
//! form state.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::form::{EditKey, Record};
use crate::types::Result;

/// Where records come from. The real source is the HTTP client; tests plug
/// in mocks.
#[async_trait]
pub trait RecordSource: Send + Sync {
    /// Fetch the record under `key`, or `None` when the backend has no
    /// record there (its 404). Transport and server failures are errors.
    async fn fetch(&self, key: &EditKey) -> Result<Option<Record>>;
}

// Shared sources behind Arc keep the same contract.
#[async_trait]
impl<T: RecordSource + ?Sized> RecordSource for std::sync::Arc<T> {
    async fn fetch(&self, key: &EditKey) -> Result<Option<Record>> {
        (**self).fetch(key).await
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    /// A record exists; the page applies it and enters edit mode.
    Found(Record),
    /// No record under this key; the page resets to create mode.
    NotFound,
    /// A newer load started while this one was in flight. Discard.
    Superseded,
}

pub struct ExistenceLoader<S: RecordSource> {
    source: S,
    generation: AtomicU64,
}

impl<S: RecordSource> ExistenceLoader<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            generation: AtomicU64::new(0),
        }
    }

    /// Look up `key`, superseding any in-flight lookup for an older key.
    ///
    /// Errors are only surfaced for the current generation; a stale request
    /// that fails reports `Superseded` instead, since the page has already
    /// moved on.
    pub async fn load(&self, key: &EditKey) -> Result<LoadOutcome> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(key = ?key, generation, "existence lookup");

        let result = self.source.fetch(key).await;

        if self.generation.load(Ordering::SeqCst) != generation {
            debug!(key = ?key, generation, "lookup superseded, discarding");
            return Ok(LoadOutcome::Superseded);
        }

        match result {
            Ok(Some(record)) => Ok(LoadOutcome::Found(record)),
            Ok(None) => Ok(LoadOutcome::NotFound),
            Err(e) => {
                warn!(key = ?key, error = %e, "existence lookup failed");
                Err(e)
            }
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;
    use std::sync::Arc;
    use tokio::sync::Notify;

    fn key(unit: &str) -> EditKey {
        EditKey::Unit {
            unit: unit.into(),
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        }
    }

    struct StaticSource {
        record: Option<Record>,
    }

    #[async_trait]
    impl RecordSource for StaticSource {
        async fn fetch(&self, _key: &EditKey) -> Result<Option<Record>> {
            Ok(self.record.clone())
        }
    }

    #[tokio::test]
    async fn found_and_not_found() {
        let record: Record = json!({"generation_mu": 500}).as_object().unwrap().clone();
        let loader = ExistenceLoader::new(StaticSource {
            record: Some(record.clone()),
        });
        assert_eq!(
            loader.load(&key("Unit-1")).await.unwrap(),
            LoadOutcome::Found(record)
        );

        let loader = ExistenceLoader::new(StaticSource { record: None });
        assert_eq!(
            loader.load(&key("Unit-1")).await.unwrap(),
            LoadOutcome::NotFound
        );
    }

    /// Source that blocks the first request until released, so a second
    /// request can overtake it.
    struct GatedSource {
        gate: Arc<Notify>,
        slow_key: String,
    }

    #[async_trait]
    impl RecordSource for GatedSource {
        async fn fetch(&self, key: &EditKey) -> Result<Option<Record>> {
            let unit = match key {
                EditKey::Unit { unit, .. } => unit.clone(),
                _ => String::new(),
            };
            if unit == self.slow_key {
                self.gate.notified().await;
            }
            Ok(Some(
                json!({ "unit": unit }).as_object().unwrap().clone(),
            ))
        }
    }

    #[tokio::test]
    async fn stale_response_is_superseded() {
        let gate = Arc::new(Notify::new());
        let loader = Arc::new(ExistenceLoader::new(GatedSource {
            gate: gate.clone(),
            slow_key: "Unit-1".into(),
        }));

        let slow = {
            let loader = loader.clone();
            tokio::spawn(async move { loader.load(&key("Unit-1")).await })
        };
        // Let the slow request reach its gate before overtaking it.
        tokio::task::yield_now().await;

        let fast = loader.load(&key("Unit-2")).await.unwrap();
        match fast {
            LoadOutcome::Found(record) => {
                assert_eq!(record["unit"], json!("Unit-2"));
            }
            other => panic!("expected Found, got {other:?}"),
        }

        gate.notify_one();
        let stale = slow.await.unwrap().unwrap();
        assert_eq!(stale, LoadOutcome::Superseded);
    }
}
