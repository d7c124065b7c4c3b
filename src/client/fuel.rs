//! Fuel ledger endpoints.
//!
//! The ledger derives `opening_stock`/`closing_stock` server-side from
//! consecutive entries; clients post receipts and consumption and read the
//! derived figures back.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::form::Ack;
use crate::types::Result;

use super::reports::ack_from_body;
use super::ApiClient;

/// One day of the fuel ledger as the backend returns it.
#[derive(Debug, Clone, Deserialize)]
pub struct FuelDay {
    pub date: NaiveDate,
    pub receipt_kl: Option<f64>,
    pub consumption_kl: Option<f64>,
    /// Derived; only present once the backend has a baseline.
    pub opening_stock: Option<f64>,
    pub closing_stock: Option<f64>,
}

/// Monthly or yearly rollup.
#[derive(Debug, Clone, Deserialize)]
pub struct FuelPeriod {
    pub receipt_kl: Option<f64>,
    pub consumption_kl: Option<f64>,
    pub opening_stock: Option<f64>,
    pub closing_stock: Option<f64>,
}

/// Body of `POST /fuel/`. `opening_stock` is sent only when the backend has
/// no baseline yet for this fuel type; otherwise the stored chain wins.
#[derive(Debug, Clone, Serialize)]
pub struct FuelEntry {
    pub fuel_type: String,
    pub date: NaiveDate,
    pub receipt_kl: Option<f64>,
    pub consumption_kl: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opening_stock: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remarks: Option<String>,
}

impl ApiClient {
    /// `GET /fuel/daily/{type}/{date}`.
    pub async fn fuel_daily(&self, fuel_type: &str, date: NaiveDate) -> Result<Option<FuelDay>> {
        self.get_optional(&format!("/fuel/daily/{fuel_type}/{date}"), &[])
            .await
    }

    /// `GET /fuel/monthly/{type}/{year}/{month}`.
    pub async fn fuel_monthly(
        &self,
        fuel_type: &str,
        year: i32,
        month: u32,
    ) -> Result<Option<FuelPeriod>> {
        self.get_optional(&format!("/fuel/monthly/{fuel_type}/{year}/{month}"), &[])
            .await
    }

    /// `GET /fuel/yearly/{type}/{year}`.
    pub async fn fuel_yearly(&self, fuel_type: &str, year: i32) -> Result<Option<FuelPeriod>> {
        self.get_optional(&format!("/fuel/yearly/{fuel_type}/{year}"), &[])
            .await
    }

    /// `POST /fuel/` — upsert one ledger day.
    pub async fn post_fuel(&self, entry: &FuelEntry) -> Result<Ack> {
        let body: Value = self.post_json("/fuel/", entry).await?;
        Ok(ack_from_body(body))
    }
}
