//! Logs center: aggregation, filtering, search

use chrono::DateTime;

use crate::config::DEFAULT_LOG_LIMIT;
use crate::model::{LogLevel, Snapshot};

/// A log line with its owning service attached, as shown in the logs table.
#[derive(Debug, Clone)]
pub struct AggregatedLog {
    pub service_id: String,
    pub service_name: String,
    pub service_category: Option<String>,
    pub ts: String,
    pub level: LogLevel,
    pub msg: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Newest first.
    #[default]
    Desc,
    Asc,
}

#[derive(Debug, Clone)]
pub struct LogFilter {
    pub service: Option<String>,
    pub level: Option<LogLevel>,
    /// Case-insensitive substring match over message and service name.
    pub search: String,
    pub sort: SortOrder,
    pub limit: usize,
}

impl Default for LogFilter {
    fn default() -> Self {
        Self {
            service: None,
            level: None,
            search: String::new(),
            sort: SortOrder::Desc,
            limit: DEFAULT_LOG_LIMIT,
        }
    }
}

/// Per-level counts over the filtered (pre-limit) set, for the stats bar.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LevelCounts {
    pub error: usize,
    pub warn: usize,
    pub info: usize,
    pub debug: usize,
}

/// Collect every service's logs into one list, tagging each line with the
/// service it came from.
pub fn aggregate(snapshot: &Snapshot) -> Vec<AggregatedLog> {
    let mut logs = Vec::new();
    for svc in &snapshot.services {
        for entry in &svc.logs {
            logs.push(AggregatedLog {
                service_id: svc.id.clone(),
                service_name: svc.name.clone(),
                service_category: svc.category.clone(),
                ts: entry.ts.clone(),
                level: entry.level,
                msg: entry.msg.clone(),
            });
        }
    }
    logs
}

/// Sort, filter, and truncate `logs` per `filter`. Returns the display set
/// plus the filtered-before-limit total.
pub fn apply(logs: Vec<AggregatedLog>, filter: &LogFilter) -> (Vec<AggregatedLog>, usize) {
    let mut logs = logs;
    logs.sort_by_key(|log| epoch_ms(&log.ts));
    if filter.sort == SortOrder::Desc {
        logs.reverse();
    }

    let query = filter.search.trim().to_lowercase();
    let filtered: Vec<AggregatedLog> = logs
        .into_iter()
        .filter(|log| {
            if let Some(service) = &filter.service {
                if log.service_id != *service {
                    return false;
                }
            }
            if let Some(level) = filter.level {
                if log.level != level {
                    return false;
                }
            }
            if !query.is_empty() {
                let in_msg = log.msg.to_lowercase().contains(&query);
                let in_service = log.service_name.to_lowercase().contains(&query);
                if !in_msg && !in_service {
                    return false;
                }
            }
            true
        })
        .collect();

    let total = filtered.len();
    let display: Vec<AggregatedLog> = filtered.into_iter().take(filter.limit).collect();
    (display, total)
}

pub fn level_counts(logs: &[AggregatedLog]) -> LevelCounts {
    let mut counts = LevelCounts::default();
    for log in logs {
        match log.level {
            LogLevel::Error => counts.error += 1,
            LogLevel::Warn => counts.warn += 1,
            LogLevel::Info => counts.info += 1,
            LogLevel::Debug => counts.debug += 1,
        }
    }
    counts
}

/// Epoch millis for sorting; unparsable timestamps sort first.
fn epoch_ms(ts: &str) -> i64 {
    DateTime::parse_from_rfc3339(ts)
        .map(|dt| dt.timestamp_millis())
        .unwrap_or(i64::MIN)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SnapshotSettings;

    fn snapshot() -> Snapshot {
        serde_json::from_value(serde_json::json!({
            "services": [
                {
                    "id": "db", "name": "Postgres", "category": "storage",
                    "logs": [
                        {"ts": "2024-01-01T10:00:00Z", "level": "error", "msg": "connection refused"},
                        {"ts": "2024-01-01T12:00:00Z", "level": "info", "msg": "checkpoint complete"}
                    ]
                },
                {
                    "id": "web", "name": "Nginx",
                    "logs": [
                        {"ts": "2024-01-01T11:00:00Z", "level": "warn", "msg": "upstream slow"}
                    ]
                }
            ]
        }))
        .unwrap()
    }

    #[test]
    fn aggregation_tags_logs_with_service() {
        let logs = aggregate(&snapshot());
        assert_eq!(logs.len(), 3);
        assert!(logs.iter().any(|l| l.service_name == "Nginx"));
        assert_eq!(
            logs.iter().filter(|l| l.service_id == "db").count(),
            2
        );
    }

    #[test]
    fn default_sort_is_newest_first() {
        let (logs, total) = apply(aggregate(&snapshot()), &LogFilter::default());
        assert_eq!(total, 3);
        assert_eq!(logs[0].msg, "checkpoint complete");
        assert_eq!(logs[2].msg, "connection refused");
    }

    #[test]
    fn ascending_sort_is_oldest_first() {
        let filter = LogFilter {
            sort: SortOrder::Asc,
            ..Default::default()
        };
        let (logs, _) = apply(aggregate(&snapshot()), &filter);
        assert_eq!(logs[0].msg, "connection refused");
    }

    #[test]
    fn search_matches_message_and_service_name() {
        let filter = LogFilter {
            search: "NGINX".into(),
            ..Default::default()
        };
        let (logs, _) = apply(aggregate(&snapshot()), &filter);
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].msg, "upstream slow");

        let filter = LogFilter {
            search: "checkpoint".into(),
            ..Default::default()
        };
        let (logs, _) = apply(aggregate(&snapshot()), &filter);
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].service_id, "db");
    }

    #[test]
    fn level_and_service_filters() {
        let filter = LogFilter {
            level: Some(LogLevel::Error),
            ..Default::default()
        };
        let (logs, _) = apply(aggregate(&snapshot()), &filter);
        assert_eq!(logs.len(), 1);

        let filter = LogFilter {
            service: Some("web".into()),
            ..Default::default()
        };
        let (logs, _) = apply(aggregate(&snapshot()), &filter);
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].level, LogLevel::Warn);
    }

    #[test]
    fn limit_truncates_but_total_reflects_filtered_set() {
        let filter = LogFilter {
            limit: 2,
            ..Default::default()
        };
        let (logs, total) = apply(aggregate(&snapshot()), &filter);
        assert_eq!(logs.len(), 2);
        assert_eq!(total, 3);
    }

    #[test]
    fn counts_by_level() {
        let logs = aggregate(&snapshot());
        let counts = level_counts(&logs);
        assert_eq!(
            counts,
            LevelCounts {
                error: 1,
                warn: 1,
                info: 1,
                debug: 0
            }
        );
    }

    #[test]
    fn services_without_logs_contribute_nothing() {
        let snap = Snapshot {
            last_sync: None,
            services: vec![serde_json::from_value(
                serde_json::json!({"id": "s", "name": "S"}),
            )
            .unwrap()],
            alerts: vec![],
            settings: SnapshotSettings::default(),
        };
        assert!(aggregate(&snap).is_empty());
    }
}
