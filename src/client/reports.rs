//! Unit and station daily report endpoints.
//!
//! The report store is also where the generic loader/pipeline seams attach:
//! `ApiClient` implements [`RecordSource`] and [`RecordSink`] by dispatching
//! on the edit key variant, so a page never sees endpoint paths.

use async_trait::async_trait;
use serde_json::Value;

use crate::form::{Ack, EditKey, Record, RecordSink};
use crate::loader::RecordSource;
use crate::types::Result;

use super::ApiClient;

impl ApiClient {
    /// `GET /reports/single/{unit}/{date}` — unit record or absence.
    pub async fn unit_report(&self, unit: &str, date: chrono::NaiveDate) -> Result<Option<Record>> {
        self.get_optional(&format!("/reports/single/{unit}/{date}"), &[])
            .await
    }

    /// `GET /reports/station/{date}` — station record or absence.
    pub async fn station_report(&self, date: chrono::NaiveDate) -> Result<Option<Record>> {
        self.get_optional(&format!("/reports/station/{date}"), &[])
            .await
    }

    /// `POST /reports/` — upsert a unit or station record. The payload
    /// carries `report_date`, every schema field (null when unset), and
    /// `edit_password` when updating.
    pub async fn post_report(&self, payload: &Record) -> Result<Ack> {
        let body: Value = self.post_json("/reports/", payload).await?;
        Ok(ack_from_body(body))
    }
}

pub(crate) fn ack_from_body(body: Value) -> Ack {
    let message = body
        .get("message")
        .and_then(Value::as_str)
        .map(str::to_string);
    Ack { message }
}

#[async_trait]
impl RecordSource for ApiClient {
    async fn fetch(&self, key: &EditKey) -> Result<Option<Record>> {
        match key {
            EditKey::Unit { unit, date } => self.unit_report(unit, *date).await,
            EditKey::Station { date } => self.station_report(*date).await,
            EditKey::Module { module, date } => self.module_record(module, *date).await,
        }
    }
}

#[async_trait]
impl RecordSink for ApiClient {
    async fn upsert(&self, key: &EditKey, payload: &Record) -> Result<Ack> {
        match key {
            EditKey::Unit { .. } | EditKey::Station { .. } => self.post_report(payload).await,
            EditKey::Module { .. } => self.post_module_record(payload).await,
        }
    }
}
