//! Admin and configuration endpoints: KPI offsets, totalizer resets, and
//! session capability resolution.
//!
//! An offset is a manually entered historical correction added to computed
//! monthly/yearly aggregates, covering data that predates the system. A
//! totalizer reset records a new meter baseline so daily deltas stay
//! meaningful across the reset.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::form::Ack;
use crate::page::Capabilities;
use crate::types::{EngineError, Result};

use super::reports::ack_from_body;
use super::ApiClient;

/// One KPI definition as served by `GET /admin/kpis/config`.
#[derive(Debug, Clone, Deserialize)]
pub struct KpiDefinition {
    pub key: String,
    pub label: String,
    #[serde(default)]
    pub unit: Option<String>,
}

/// A historical correction applied to one KPI's aggregates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KpiOffset {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub kpi: String,
    pub year: i32,
    /// None = yearly offset, Some = monthly.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub month: Option<u32>,
    pub value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Body of `POST /admin/totalizers/reset`.
#[derive(Debug, Clone, Serialize)]
pub struct TotalizerReset {
    pub meter_id: String,
    /// Reading recorded as the new baseline.
    pub baseline: f64,
    pub reset_date: NaiveDate,
}

/// Wire shape of one row from the permissions endpoint.
#[derive(Debug, Clone, Deserialize)]
struct PermissionRow {
    #[serde(default)]
    can_create: bool,
    #[serde(default)]
    can_edit_own: bool,
    #[serde(default)]
    can_edit_any: bool,
}

impl ApiClient {
    /// `GET /admin/kpis/config`.
    pub async fn kpi_config(&self) -> Result<Vec<KpiDefinition>> {
        self.get_json("/admin/kpis/config", &[]).await
    }

    /// `GET /admin/kpi-offsets`.
    pub async fn kpi_offsets(&self) -> Result<Vec<KpiOffset>> {
        self.get_json("/admin/kpi-offsets", &[]).await
    }

    /// `POST /admin/kpi-offsets`.
    pub async fn create_kpi_offset(&self, offset: &KpiOffset) -> Result<Ack> {
        let body: Value = self.post_json("/admin/kpi-offsets", offset).await?;
        Ok(ack_from_body(body))
    }

    /// `DELETE /admin/kpi-offsets/{id}`.
    pub async fn delete_kpi_offset(&self, id: i64) -> Result<()> {
        self.delete(&format!("/admin/kpi-offsets/{id}")).await
    }

    /// `POST /admin/totalizers/reset` — record a meter baseline.
    pub async fn reset_totalizer(&self, reset: &TotalizerReset) -> Result<Ack> {
        let body: Value = self.post_json("/admin/totalizers/reset", reset).await?;
        Ok(ack_from_body(body))
    }

    /// Resolve the session's capability set from `GET /permissions/me`,
    /// once per session. A denied or missing endpoint fails closed to
    /// read-only rather than guessing.
    pub async fn resolve_capabilities(&self) -> Capabilities {
        match self.get_json::<PermissionRow>("/permissions/me", &[]).await {
            Ok(row) => Capabilities {
                can_create: row.can_create,
                can_edit_own: row.can_edit_own,
                can_edit_any: row.can_edit_any,
            },
            Err(EngineError::Server { status, .. }) if status == 401 || status == 403 => {
                warn!(status, "permissions denied, session is read-only");
                Capabilities::read_only()
            }
            Err(e) => {
                warn!(error = %e, "permissions unavailable, session is read-only");
                Capabilities::read_only()
            }
        }
    }
}
