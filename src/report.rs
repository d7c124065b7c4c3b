//! Report/aggregation viewer.
//!
//! Fetches the day's precomputed aggregate statistics and presents them as
//! rows keyed by (unit, section, parameter). The backend emits the grouping
//! key in two encodings: the summary endpoint pipe-joins the parts
//! (`"Unit-1 | Condensate Water | pH"`), while rows that passed through the
//! older aggregation path arrive as stringified tuples
//! (`"(Unit-1, Boiler, conductivity)"`). Both parse to the same shape; a key
//! that matches neither degrades to a display-only row instead of aborting
//! the batch.

use std::collections::HashMap;
use std::fmt;

use serde::Deserialize;

/// Parsed grouping key of one aggregate row.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GroupKey {
    pub unit: String,
    pub section: String,
    pub parameter: String,
}

impl GroupKey {
    /// Parse either key encoding. Unparseable input becomes
    /// `(raw, "", "")` so the row still renders.
    pub fn parse(raw: &str) -> Self {
        if raw.contains('|') {
            let mut parts = raw.splitn(3, '|').map(str::trim);
            return Self {
                unit: parts.next().unwrap_or_default().to_string(),
                section: parts.next().unwrap_or_default().to_string(),
                parameter: parts.next().unwrap_or_default().to_string(),
            };
        }

        let trimmed = raw.trim();
        if trimmed.starts_with('(') && trimmed.ends_with(')') {
            let inner = &trimmed[1..trimmed.len() - 1];
            let parts: Vec<&str> = inner.splitn(3, ',').map(str::trim).collect();
            if parts.len() == 3 {
                return Self {
                    unit: parts[0].trim_matches(|c| c == '\'' || c == '"').to_string(),
                    section: parts[1].trim_matches(|c| c == '\'' || c == '"').to_string(),
                    parameter: parts[2].trim_matches(|c| c == '\'' || c == '"').to_string(),
                };
            }
        }

        Self {
            unit: raw.to_string(),
            section: String::new(),
            parameter: String::new(),
        }
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} | {} | {}", self.unit, self.section, self.parameter)
    }
}

/// Aggregate statistics for one grouping key, as the backend sends them.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct StatSummary {
    pub avg: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    #[serde(default)]
    pub count: u64,
}

/// Wire shape of `GET /dm-plant/report`.
#[derive(Debug, Clone, Deserialize)]
pub struct AggregateReport {
    #[serde(default)]
    pub total_entries: u64,
    #[serde(default)]
    pub stats: HashMap<String, StatSummary>,
}

/// One display row. Read-only; derived entirely from the backend's stats.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateRow {
    pub group: GroupKey,
    pub avg: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub count: u64,
}

impl AggregateRow {
    /// Missing stats render as an explicit marker, never as zero.
    pub fn display_stat(value: Option<f64>) -> String {
        match value {
            Some(v) => crate::form::state::display_value(&serde_json::json!(v)),
            None => "-".to_string(),
        }
    }
}

/// Flatten a report into rows, ordered by grouping key for deterministic
/// rendering. Malformed keys degrade per-row; nothing here throws.
pub fn rows_from_report(report: &AggregateReport) -> Vec<AggregateRow> {
    let mut rows: Vec<AggregateRow> = report
        .stats
        .iter()
        .map(|(raw, stats)| AggregateRow {
            group: GroupKey::parse(raw),
            avg: stats.avg,
            min: stats.min,
            max: stats.max,
            count: stats.count,
        })
        .collect();
    rows.sort_by(|a, b| {
        (&a.group.unit, &a.group.section, &a.group.parameter).cmp(&(
            &b.group.unit,
            &b.group.section,
            &b.group.parameter,
        ))
    });
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_pipe_delimited_keys() {
        let key = GroupKey::parse("Unit-1 | Condensate Water | pH");
        assert_eq!(key.unit, "Unit-1");
        assert_eq!(key.section, "Condensate Water");
        assert_eq!(key.parameter, "pH");
    }

    #[test]
    fn parses_stringified_tuples() {
        let key = GroupKey::parse("(Unit-1, Boiler, conductivity)");
        assert_eq!(key.unit, "Unit-1");
        assert_eq!(key.section, "Boiler");
        assert_eq!(key.parameter, "conductivity");

        // Python repr quotes survive too
        let key = GroupKey::parse("('Unit-2', 'Feed Water', 'ph')");
        assert_eq!(key.unit, "Unit-2");
        assert_eq!(key.parameter, "ph");
    }

    #[test]
    fn malformed_keys_degrade_to_display_only_rows() {
        let key = GroupKey::parse("garbage");
        assert_eq!(key.unit, "garbage");
        assert_eq!(key.section, "");
        assert_eq!(key.parameter, "");
    }

    #[test]
    fn missing_stats_render_as_marker_not_zero() {
        assert_eq!(AggregateRow::display_stat(None), "-");
        assert_eq!(AggregateRow::display_stat(Some(7.25)), "7.25");
        assert_eq!(AggregateRow::display_stat(Some(7.0)), "7");
    }

    #[test]
    fn rows_are_ordered_and_tolerate_mixed_encodings() {
        let report: AggregateReport = serde_json::from_value(json!({
            "total_entries": 3,
            "stats": {
                "Unit-2 | Drum Water | ph": {"avg": 9.8, "min": 9.6, "max": 10.0, "count": 4},
                "(Unit-1, Boiler, conductivity)": {"avg": 12.0, "count": 2},
                "garbage": {"count": 0}
            }
        }))
        .unwrap();

        let rows = rows_from_report(&report);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].group.unit, "Unit-1");
        assert_eq!(rows[1].group.unit, "Unit-2");
        assert_eq!(rows[2].group.unit, "garbage");
        assert_eq!(rows[1].min, Some(9.6));
        assert_eq!(rows[0].min, None);
    }
}
