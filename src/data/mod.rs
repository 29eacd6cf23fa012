//! Mock data source and simulated action trigger
//!
//! The dashboard has no backend: its snapshot comes from a JSON file (or the
//! bundled demo snapshot) and service actions are simulated with a fixed
//! latency. Every load returns an independent copy, validated at the
//! boundary; load failures propagate to the caller, which decides whether to
//! leave the store's `data` absent.

use once_cell::sync::Lazy;
use rand::Rng;
use std::path::Path;
use tokio::time::{sleep, Duration};

use crate::config::ACTION_LATENCY_MS;
use crate::error::{DashError, Result};
use crate::model::Snapshot;

static DEMO_JSON: &str = include_str!("../../mock/homelab.json");

static DEMO_SNAPSHOT: Lazy<Snapshot> = Lazy::new(|| {
    // The bundled snapshot is part of the crate; a parse failure here is a
    // packaging bug, caught by tests.
    serde_json::from_str(DEMO_JSON).expect("bundled mock snapshot is valid JSON")
});

/// Load and validate a snapshot from `path`.
pub async fn load(path: impl AsRef<Path>) -> Result<Snapshot> {
    let path = path.as_ref();
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|_| DashError::SnapshotNotFound(path.to_path_buf()))?;
    let snapshot: Snapshot = serde_json::from_str(&text)?;
    snapshot.validate()?;
    Ok(snapshot)
}

/// An independent copy of the bundled demo snapshot.
pub fn load_embedded() -> Snapshot {
    DEMO_SNAPSHOT.clone()
}

/// Outcome of a simulated service action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionOutcome {
    pub ok: bool,
    pub message: String,
}

/// Trigger a mock action: waits a simulated latency, then succeeds about 90%
/// of the time. No retries, no queueing; the caller surfaces the outcome.
pub async fn trigger_action(service_id: &str, action_key: &str) -> ActionOutcome {
    sleep(Duration::from_millis(ACTION_LATENCY_MS)).await;
    let failed = rand::thread_rng().gen_bool(0.1);
    if failed {
        tracing::debug!(service = service_id, action = action_key, "mock action failed");
        ActionOutcome {
            ok: false,
            message: "Mock failure".to_string(),
        }
    } else {
        ActionOutcome {
            ok: true,
            message: "Action completed (mock)".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn embedded_snapshot_parses_and_validates() {
        let snapshot = load_embedded();
        assert!(!snapshot.services.is_empty());
        assert!(snapshot.validate().is_ok());
    }

    #[test]
    fn embedded_loads_are_independent_copies() {
        let mut a = load_embedded();
        let b = load_embedded();
        a.services.clear();
        assert!(!b.services.is_empty());
    }

    #[tokio::test]
    async fn load_rejects_missing_file() {
        let err = load("/nonexistent/homelab.json").await.unwrap_err();
        assert!(matches!(err, DashError::SnapshotNotFound(_)));
    }

    #[tokio::test]
    async fn load_rejects_invalid_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{not json").unwrap();
        let err = load(file.path()).await.unwrap_err();
        assert!(matches!(err, DashError::Json(_)));
    }

    #[tokio::test]
    async fn load_rejects_duplicate_ids() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"services": [{{"id": "a", "name": "A"}}, {{"id": "a", "name": "A2"}}]}}"#
        )
        .unwrap();
        let err = load(file.path()).await.unwrap_err();
        assert!(matches!(err, DashError::InvalidSnapshot(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn action_resolves_after_simulated_latency() {
        let outcome = trigger_action("svc-1", "restart").await;
        assert!(!outcome.message.is_empty());
    }
}
