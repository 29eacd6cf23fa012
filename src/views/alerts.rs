//! Alerts center: filtering, acknowledgement, snooze

use crate::model::{Alert, Severity};
use crate::store::{AppState, StatePatch};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AckFilter {
    #[default]
    All,
    /// Unacknowledged alerts only.
    Active,
    Acknowledged,
}

#[derive(Debug, Clone, Default)]
pub struct AlertFilter {
    pub severity: Option<Severity>,
    pub service: Option<String>,
    pub ack: AckFilter,
}

/// Alerts visible under `filter` at `now_ms`. Snoozed alerts (deadline in
/// the future) are suppressed regardless of the other criteria.
pub fn visible_alerts<'a>(
    state: &'a AppState,
    filter: &AlertFilter,
    now_ms: i64,
) -> Vec<&'a Alert> {
    let Some(data) = &state.data else {
        return Vec::new();
    };
    data.alerts
        .iter()
        .filter(|alert| {
            if let Some(&until) = state.alert_snooze.get(&alert.id) {
                if until > now_ms {
                    return false;
                }
            }
            if let Some(severity) = filter.severity {
                if alert.severity != severity {
                    return false;
                }
            }
            if let Some(service) = &filter.service {
                if alert.service_id != *service {
                    return false;
                }
            }
            match filter.ack {
                AckFilter::All => true,
                AckFilter::Active => !state.acks.contains(&alert.id),
                AckFilter::Acknowledged => state.acks.contains(&alert.id),
            }
        })
        .collect()
}

/// Patch toggling the acknowledgement of one alert.
pub fn toggle_ack(state: &AppState, alert_id: &str) -> StatePatch {
    let mut acks = state.acks.clone();
    if !acks.remove(alert_id) {
        acks.insert(alert_id.to_string());
    }
    StatePatch::new().acks(acks)
}

/// Patch acknowledging every alert in `alert_ids` (bulk ack).
pub fn acknowledge_all<'a>(
    state: &AppState,
    alert_ids: impl IntoIterator<Item = &'a str>,
) -> StatePatch {
    let mut acks = state.acks.clone();
    acks.extend(alert_ids.into_iter().map(String::from));
    StatePatch::new().acks(acks)
}

/// Patch clearing the acknowledgement of every alert in `alert_ids`.
pub fn unacknowledge_all<'a>(
    state: &AppState,
    alert_ids: impl IntoIterator<Item = &'a str>,
) -> StatePatch {
    let mut acks = state.acks.clone();
    for id in alert_ids {
        acks.remove(id);
    }
    StatePatch::new().acks(acks)
}

/// Patch snoozing one alert until `until_ms` (epoch millis).
pub fn snooze(state: &AppState, alert_id: &str, until_ms: i64) -> StatePatch {
    let mut snoozes = state.alert_snooze.clone();
    snoozes.insert(alert_id.to_string(), until_ms);
    StatePatch::new().alert_snooze(snoozes)
}

/// Patch attaching a free-text note to one alert.
pub fn set_note(state: &AppState, alert_id: &str, note: &str) -> StatePatch {
    let mut notes = state.alert_notes.clone();
    notes.insert(alert_id.to_string(), note.to_string());
    StatePatch::new().alert_notes(notes)
}
