//! Typed domain records for the mock snapshot
//!
//! The wire shape is the camelCase JSON the dashboard consumes. Snapshots are
//! validated once at the load boundary; rendering code can then trust the
//! required fields and treat everything optional as genuinely optional.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

use crate::error::{DashError, Result};

/// One full mock snapshot: services, alerts, and snapshot-level settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(rename = "lastSync", default)]
    pub last_sync: Option<String>,

    pub services: Vec<Service>,

    #[serde(default)]
    pub alerts: Vec<Alert>,

    #[serde(default)]
    pub settings: SnapshotSettings,
}

/// Settings shipped inside the snapshot (distinct from user preferences).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SnapshotSettings {
    #[serde(default)]
    pub endpoints: BTreeMap<String, String>,

    #[serde(rename = "featureFlags", default)]
    pub feature_flags: BTreeMap<String, bool>,
}

/// A monitored service.
///
/// `dependencies` holds weak references: an entry may name a service that is
/// not present in the snapshot, and consumers must tolerate that.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Service {
    pub id: String,
    pub name: String,

    #[serde(default)]
    pub category: Option<String>,

    #[serde(default)]
    pub status: ServiceStatus,

    #[serde(default)]
    pub version: Option<String>,

    #[serde(rename = "latencyMs", default)]
    pub latency_ms: Option<f64>,

    #[serde(rename = "cpuPct", default)]
    pub cpu_pct: Option<f64>,

    #[serde(rename = "ramMb", default)]
    pub ram_mb: Option<f64>,

    #[serde(rename = "uptimePct24h", default)]
    pub uptime_pct_24h: Option<f64>,

    #[serde(default)]
    pub dependencies: Vec<String>,

    #[serde(default)]
    pub metrics: Option<Metrics>,

    #[serde(default)]
    pub logs: Vec<LogEntry>,

    #[serde(default)]
    pub actions: Vec<ServiceAction>,

    #[serde(default)]
    pub config: Option<serde_json::Value>,
}

/// Named time series attached to a service.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Metrics {
    /// Series name (e.g. "cpuPct") to `[rfc3339-timestamp, value]` points.
    #[serde(default)]
    pub timeseries: BTreeMap<String, Vec<(String, f64)>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceStatus {
    Healthy,
    Running,
    Warning,
    Degraded,
    Error,
    Critical,
    #[default]
    #[serde(other)]
    Unknown,
}

impl ServiceStatus {
    /// True for the states the dashboard counts as "up".
    pub fn is_healthy(&self) -> bool {
        matches!(self, ServiceStatus::Healthy | ServiceStatus::Running)
    }

    /// Hex color used by tiles and the dependency graph.
    pub fn color(&self) -> &'static str {
        match self {
            ServiceStatus::Healthy | ServiceStatus::Running => "#10b981",
            ServiceStatus::Warning | ServiceStatus::Degraded => "#f59e0b",
            ServiceStatus::Error | ServiceStatus::Critical => "#ef4444",
            ServiceStatus::Unknown => "#94a3b8",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceStatus::Healthy => "healthy",
            ServiceStatus::Running => "running",
            ServiceStatus::Warning => "warning",
            ServiceStatus::Degraded => "degraded",
            ServiceStatus::Error => "error",
            ServiceStatus::Critical => "critical",
            ServiceStatus::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    pub id: String,

    #[serde(rename = "serviceId")]
    pub service_id: String,

    pub severity: Severity,
    pub title: String,

    #[serde(rename = "createdAt")]
    pub created_at: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    Error,
    Warning,
    Info,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "critical",
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
        }
    }
}

impl std::str::FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "critical" => Ok(Severity::Critical),
            "error" => Ok(Severity::Error),
            "warning" => Ok(Severity::Warning),
            "info" => Ok(Severity::Info),
            other => Err(format!("unknown severity: {other}")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub ts: String,
    pub level: LogLevel,
    pub msg: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
        }
    }
}

impl std::str::FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "error" => Ok(LogLevel::Error),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            other => Err(format!("unknown log level: {other}")),
        }
    }
}

/// A mock action a service exposes (restart, clear cache, ...).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceAction {
    pub key: String,
    pub label: String,

    #[serde(default)]
    pub danger: bool,
}

impl Snapshot {
    /// Validate the snapshot at the load boundary.
    ///
    /// Ids must be non-empty and unique per collection. Dangling references
    /// (a dependency or an alert's serviceId naming an absent service) are
    /// tolerated per the weak-reference rule, but logged for debugging.
    pub fn validate(&self) -> Result<()> {
        let mut service_ids = HashSet::new();
        for svc in &self.services {
            if svc.id.is_empty() {
                return Err(DashError::InvalidSnapshot("service with empty id".into()));
            }
            if !service_ids.insert(svc.id.as_str()) {
                return Err(DashError::InvalidSnapshot(format!(
                    "duplicate service id: {}",
                    svc.id
                )));
            }
        }

        let mut alert_ids = HashSet::new();
        for alert in &self.alerts {
            if alert.id.is_empty() {
                return Err(DashError::InvalidSnapshot("alert with empty id".into()));
            }
            if !alert_ids.insert(alert.id.as_str()) {
                return Err(DashError::InvalidSnapshot(format!(
                    "duplicate alert id: {}",
                    alert.id
                )));
            }
            if !service_ids.contains(alert.service_id.as_str()) {
                tracing::debug!(alert = %alert.id, service = %alert.service_id,
                    "alert references unknown service");
            }
        }

        for svc in &self.services {
            for dep in &svc.dependencies {
                if !service_ids.contains(dep.as_str()) {
                    tracing::debug!(service = %svc.id, dependency = %dep,
                        "dependency references unknown service");
                }
            }
        }

        Ok(())
    }

    pub fn service(&self, id: &str) -> Option<&Service> {
        self.services.iter().find(|s| s.id == id)
    }

    pub fn alert(&self, id: &str) -> Option<&Alert> {
        self.alerts.iter().find(|a| a.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_service(id: &str) -> Service {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "name": id,
        }))
        .unwrap()
    }

    #[test]
    fn status_parses_unknown_strings_to_unknown() {
        let svc: Service = serde_json::from_value(serde_json::json!({
            "id": "svc-1",
            "name": "Gateway",
            "status": "flapping",
        }))
        .unwrap();
        assert_eq!(svc.status, ServiceStatus::Unknown);
    }

    #[test]
    fn optional_fields_default() {
        let svc = minimal_service("svc-1");
        assert_eq!(svc.status, ServiceStatus::Unknown);
        assert!(svc.dependencies.is_empty());
        assert!(svc.logs.is_empty());
        assert!(svc.metrics.is_none());
    }

    #[test]
    fn validate_rejects_duplicate_service_ids() {
        let snap = Snapshot {
            last_sync: None,
            services: vec![minimal_service("a"), minimal_service("a")],
            alerts: vec![],
            settings: SnapshotSettings::default(),
        };
        assert!(snap.validate().is_err());
    }

    #[test]
    fn validate_tolerates_dangling_references() {
        let mut svc = minimal_service("a");
        svc.dependencies = vec!["ghost".into()];
        let snap = Snapshot {
            last_sync: None,
            services: vec![svc],
            alerts: vec![Alert {
                id: "al-1".into(),
                service_id: "ghost".into(),
                severity: Severity::Warning,
                title: "orphaned".into(),
                created_at: "2024-01-01T00:00:00Z".into(),
            }],
            settings: SnapshotSettings::default(),
        };
        assert!(snap.validate().is_ok());
    }

    #[test]
    fn metric_points_deserialize_as_pairs() {
        let m: Metrics = serde_json::from_value(serde_json::json!({
            "timeseries": {
                "cpuPct": [["2024-01-01T00:00:00Z", 12.5], ["2024-01-01T00:05:00Z", 14.0]]
            }
        }))
        .unwrap();
        assert_eq!(m.timeseries["cpuPct"].len(), 2);
        assert_eq!(m.timeseries["cpuPct"][1].1, 14.0);
    }
}
