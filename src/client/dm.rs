//! DM plant and generic chemistry/coal module endpoints.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::form::{Ack, Record};
use crate::report::{rows_from_report, AggregateReport, AggregateRow};
use crate::types::Result;

use super::reports::ack_from_body;
use super::ApiClient;

/// One parameter reading inside a section submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectionEntry {
    pub parameter: String,
    pub value: Option<f64>,
    #[serde(default)]
    pub remarks: String,
}

/// Body of `POST /dm-plant/add-section`.
#[derive(Debug, Clone, Serialize)]
pub struct SectionSubmission {
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub unit: String,
    pub section: String,
    pub entries: Vec<SectionEntry>,
}

impl SectionSubmission {
    /// Entries with a value; blank rows are never posted.
    pub fn filled(mut self) -> Self {
        self.entries.retain(|e| e.value.is_some());
        self
    }
}

impl ApiClient {
    /// `GET /dm-plant/report?date=` — the day's aggregate statistics,
    /// flattened into ordered display rows.
    pub async fn dm_plant_report(&self, date: NaiveDate) -> Result<Vec<AggregateRow>> {
        let report: AggregateReport = self
            .get_json("/dm-plant/report", &[("date", date.to_string())])
            .await?;
        Ok(rows_from_report(&report))
    }

    /// `POST /dm-plant/add-section`.
    pub async fn add_section(&self, submission: &SectionSubmission) -> Result<Ack> {
        let body: Value = self.post_json("/dm-plant/add-section", submission).await?;
        Ok(ack_from_body(body))
    }

    /// `GET /dm/raw?date=&module=` — the persisted record for a generic
    /// module key, or absence.
    pub async fn module_record(&self, module: &str, date: NaiveDate) -> Result<Option<Record>> {
        self.get_optional(
            "/dm/raw",
            &[("date", date.to_string()), ("module", module.to_string())],
        )
        .await
    }

    /// `GET /dm/report?date=&module=` — per-module aggregate rows.
    pub async fn module_report(&self, module: &str, date: NaiveDate) -> Result<Vec<AggregateRow>> {
        let report: AggregateReport = self
            .get_json(
                "/dm/report",
                &[("date", date.to_string()), ("module", module.to_string())],
            )
            .await?;
        Ok(rows_from_report(&report))
    }

    /// `POST /dm/add` — upsert a generic module record. Body shape is
    /// driven by the module's FormSchema plus its location selections.
    pub async fn post_module_record(&self, payload: &Record) -> Result<Ack> {
        let body: Value = self.post_json("/dm/add", payload).await?;
        Ok(ack_from_body(body))
    }
}
