//! Dashboard overview: health summary and service KPIs

use crate::model::Service;
use crate::store::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthBanner {
    AllOperational,
    MinorIssues,
    CriticalIssues,
}

impl HealthBanner {
    pub fn text(&self) -> &'static str {
        match self {
            HealthBanner::AllOperational => "All Systems Operational",
            HealthBanner::MinorIssues => "Minor Issues",
            HealthBanner::CriticalIssues => "Critical Issues",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HealthSummary {
    pub services_up: usize,
    pub services_down: usize,
    pub total_services: usize,
    pub alerts_open: usize,
    pub health_pct: u32,
    pub banner: HealthBanner,
    pub last_sync: Option<String>,
}

impl HealthSummary {
    /// Summarize the current snapshot; `None` while data is still loading.
    pub fn compute(state: &AppState) -> Option<Self> {
        let data = state.data.as_ref()?;
        let total_services = data.services.len();
        let services_up = data
            .services
            .iter()
            .filter(|s| s.status.is_healthy())
            .count();
        let services_down = total_services - services_up;
        let alerts_open = data
            .alerts
            .iter()
            .filter(|a| !state.acks.contains(&a.id))
            .count();
        let health_pct = if total_services == 0 {
            100
        } else {
            (services_up as f64 / total_services as f64 * 100.0).round() as u32
        };
        let banner = if health_pct == 100 {
            HealthBanner::AllOperational
        } else if health_pct >= 75 {
            HealthBanner::MinorIssues
        } else {
            HealthBanner::CriticalIssues
        };
        Some(Self {
            services_up,
            services_down,
            total_services,
            alerts_open,
            health_pct,
            banner,
            last_sync: data.last_sync.clone(),
        })
    }
}

/// KPI label/value pairs for one service tile. Missing KPIs render as "-".
pub fn service_kpis(service: &Service) -> Vec<(&'static str, String)> {
    fn fmt(value: Option<f64>, unit: &str) -> String {
        match value {
            Some(v) => format!("{v}{unit}"),
            None => "-".to_string(),
        }
    }
    vec![
        ("CPU", fmt(service.cpu_pct, "%")),
        ("RAM", fmt(service.ram_mb, " MB")),
        ("Uptime", fmt(service.uptime_pct_24h, "%")),
        ("Latency", fmt(service.latency_ms, " ms")),
    ]
}
