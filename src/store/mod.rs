//! Reactive application state store
//!
//! Single source of truth for UI-relevant state. Every mutation goes through
//! [`Store::set`], which shallow-merges a patch, writes the persisted subset
//! through the key-value storage, and synchronously notifies every
//! subscriber with the merged state. Stores are explicitly constructed and
//! passed to whoever needs them; there are no ambient singletons.

pub mod persist;

use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use crate::model::Snapshot;
use persist::{
    KvStorage, MemoryStorage, KEY_ACKS, KEY_ALERT_NOTES, KEY_ALERT_SNOOZE, KEY_DASHBOARD_LAYOUT,
    KEY_ENDPOINTS, KEY_THEME,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    #[default]
    System,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
            Theme::System => "system",
        }
    }
}

impl std::str::FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            "system" => Ok(Theme::System),
            other => Err(format!("unknown theme: {other}")),
        }
    }
}

/// User-editable settings, persisted across sessions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserSettings {
    #[serde(default)]
    pub endpoints: BTreeMap<String, String>,
}

/// The full application state seen by subscribers.
///
/// `data` is either fully absent or a fully populated snapshot; no
/// partial-load state is ever observable.
#[derive(Debug, Clone, Default)]
pub struct AppState {
    pub data: Option<Snapshot>,
    pub acks: BTreeSet<String>,
    pub theme: Theme,
    pub settings: UserSettings,
    pub alert_notes: BTreeMap<String, String>,
    /// Alert id -> epoch-millis deadline; the alert is suppressed until then.
    pub alert_snooze: BTreeMap<String, i64>,
    /// Opaque to the core; consumed by the dashboard view only.
    pub dashboard_layout: Option<serde_json::Value>,
}

/// A shallow patch: a field that is `Some` replaces the corresponding
/// top-level value wholesale. There is no deep merge.
#[derive(Debug, Clone, Default)]
pub struct StatePatch {
    pub data: Option<Snapshot>,
    pub acks: Option<BTreeSet<String>>,
    pub theme: Option<Theme>,
    pub settings: Option<UserSettings>,
    pub alert_notes: Option<BTreeMap<String, String>>,
    pub alert_snooze: Option<BTreeMap<String, i64>>,
    pub dashboard_layout: Option<serde_json::Value>,
}

impl StatePatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn data(mut self, snapshot: Snapshot) -> Self {
        self.data = Some(snapshot);
        self
    }

    pub fn acks(mut self, acks: BTreeSet<String>) -> Self {
        self.acks = Some(acks);
        self
    }

    pub fn theme(mut self, theme: Theme) -> Self {
        self.theme = Some(theme);
        self
    }

    pub fn settings(mut self, settings: UserSettings) -> Self {
        self.settings = Some(settings);
        self
    }

    pub fn alert_notes(mut self, notes: BTreeMap<String, String>) -> Self {
        self.alert_notes = Some(notes);
        self
    }

    pub fn alert_snooze(mut self, snooze: BTreeMap<String, i64>) -> Self {
        self.alert_snooze = Some(snooze);
        self
    }

    pub fn dashboard_layout(mut self, layout: serde_json::Value) -> Self {
        self.dashboard_layout = Some(layout);
        self
    }
}

type Callback = Arc<dyn Fn(&AppState) + Send + Sync>;

struct StoreInner {
    state: Mutex<AppState>,
    subscribers: Mutex<Vec<(u64, Callback)>>,
    next_id: AtomicU64,
    storage: Box<dyn KvStorage>,
}

/// Handle returned by [`Store::subscribe`]; removes exactly that
/// registration. The same closure subscribed twice yields two independent
/// handles.
pub struct Subscription {
    id: u64,
    inner: Weak<StoreInner>,
}

impl Subscription {
    pub fn unsubscribe(self) {
        if let Some(inner) = self.inner.upgrade() {
            inner.subscribers.lock().retain(|(id, _)| *id != self.id);
        }
    }
}

/// The reactive store. Cheap to clone; clones share state and subscribers.
#[derive(Clone)]
pub struct Store {
    inner: Arc<StoreInner>,
}

impl Store {
    /// Store with in-memory persistence (nothing survives the process).
    pub fn new() -> Self {
        Self::with_storage(Box::new(MemoryStorage::new()))
    }

    /// Store backed by `storage`. Persisted fields are loaded now; a missing
    /// or corrupt entry yields that field's empty default, never an error.
    pub fn with_storage(storage: Box<dyn KvStorage>) -> Self {
        let state = AppState {
            data: None,
            acks: load_field(storage.as_ref(), KEY_ACKS),
            theme: load_field(storage.as_ref(), KEY_THEME),
            settings: UserSettings {
                endpoints: load_field(storage.as_ref(), KEY_ENDPOINTS),
            },
            alert_notes: load_field(storage.as_ref(), KEY_ALERT_NOTES),
            alert_snooze: load_field(storage.as_ref(), KEY_ALERT_SNOOZE),
            dashboard_layout: load_field(storage.as_ref(), KEY_DASHBOARD_LAYOUT),
        };
        Self {
            inner: Arc::new(StoreInner {
                state: Mutex::new(state),
                subscribers: Mutex::new(Vec::new()),
                next_id: AtomicU64::new(1),
                storage,
            }),
        }
    }

    /// Current state snapshot. Callers must not treat this as a live view;
    /// all mutation goes through [`Store::set`].
    pub fn get(&self) -> AppState {
        self.inner.state.lock().clone()
    }

    /// Shallow-merge `patch`, persist the designated fields, then notify
    /// every subscriber with the merged state before returning.
    ///
    /// Persistence is write-through but best-effort: a storage failure is
    /// logged and the in-memory update and notifications still happen.
    pub fn set(&self, patch: StatePatch) {
        let merged = {
            let mut state = self.inner.state.lock();
            if let Some(data) = patch.data {
                state.data = Some(data);
            }
            if let Some(acks) = patch.acks {
                state.acks = acks;
            }
            if let Some(theme) = patch.theme {
                state.theme = theme;
            }
            if let Some(settings) = patch.settings {
                state.settings = settings;
            }
            if let Some(notes) = patch.alert_notes {
                state.alert_notes = notes;
            }
            if let Some(snooze) = patch.alert_snooze {
                state.alert_snooze = snooze;
            }
            if let Some(layout) = patch.dashboard_layout {
                state.dashboard_layout = Some(layout);
            }
            self.persist(&state);
            state.clone()
        };

        // Snapshot the list so callbacks run without any lock held;
        // subscribing or unsubscribing from inside a callback is fine.
        let subscribers: Vec<Callback> = {
            let subs = self.inner.subscribers.lock();
            subs.iter().map(|(_, cb)| Arc::clone(cb)).collect()
        };
        for cb in subscribers {
            cb(&merged);
        }
    }

    /// Register `callback` to run on every future [`Store::set`], in
    /// registration order relative to other subscribers.
    pub fn subscribe(&self, callback: impl Fn(&AppState) + Send + Sync + 'static) -> Subscription {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        self.inner
            .subscribers
            .lock()
            .push((id, Arc::new(callback)));
        Subscription {
            id,
            inner: Arc::downgrade(&self.inner),
        }
    }

    fn persist(&self, state: &AppState) {
        let storage = self.inner.storage.as_ref();
        store_field(storage, KEY_THEME, &state.theme);
        store_field(storage, KEY_ACKS, &state.acks);
        store_field(storage, KEY_ENDPOINTS, &state.settings.endpoints);
        store_field(storage, KEY_ALERT_NOTES, &state.alert_notes);
        store_field(storage, KEY_ALERT_SNOOZE, &state.alert_snooze);
        store_field(storage, KEY_DASHBOARD_LAYOUT, &state.dashboard_layout);
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

fn load_field<T: DeserializeOwned + Default>(storage: &dyn KvStorage, key: &str) -> T {
    match storage.load(key) {
        Some(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
            tracing::warn!(key, error = %e, "malformed persisted value, using default");
            T::default()
        }),
        None => T::default(),
    }
}

fn store_field<T: Serialize>(storage: &dyn KvStorage, key: &str, value: &T) {
    let raw = match serde_json::to_string(value) {
        Ok(raw) => raw,
        Err(e) => {
            tracing::warn!(key, error = %e, "failed to serialize preference");
            return;
        }
    };
    if let Err(e) = storage.store(key, &raw) {
        tracing::warn!(key, error = %e, "failed to persist preference");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{DashError, Result};
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn set_is_shallow_merge_last_write_wins() {
        let store = Store::new();
        store.set(StatePatch::new().theme(Theme::Dark));
        store.set(
            StatePatch::new()
                .acks(["a1".to_string()].into_iter().collect())
                .theme(Theme::Light),
        );

        let state = store.get();
        assert_eq!(state.theme, Theme::Light);
        assert!(state.acks.contains("a1"));
        // Untouched keys keep their values.
        assert!(state.data.is_none());
    }

    #[test]
    fn patch_replaces_top_level_value_wholesale() {
        let store = Store::new();
        let mut notes = BTreeMap::new();
        notes.insert("al-1".to_string(), "first".to_string());
        store.set(StatePatch::new().alert_notes(notes));

        let mut replacement = BTreeMap::new();
        replacement.insert("al-2".to_string(), "second".to_string());
        store.set(StatePatch::new().alert_notes(replacement));

        let state = store.get();
        assert!(!state.alert_notes.contains_key("al-1"));
        assert_eq!(state.alert_notes["al-2"], "second");
    }

    #[test]
    fn subscribers_get_one_notification_per_set() {
        let store = Store::new();
        let count = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&count);
        let sub = store.subscribe(move |_| {
            c.fetch_add(1, Ordering::SeqCst);
        });

        store.set(StatePatch::new().theme(Theme::Dark));
        store.set(StatePatch::new().theme(Theme::Light));
        assert_eq!(count.load(Ordering::SeqCst), 2);

        sub.unsubscribe();
        store.set(StatePatch::new().theme(Theme::System));
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn duplicate_subscriptions_are_independent() {
        let store = Store::new();
        let count = Arc::new(AtomicUsize::new(0));

        let c1 = Arc::clone(&count);
        let sub_a = store.subscribe(move |_| {
            c1.fetch_add(1, Ordering::SeqCst);
        });
        let c2 = Arc::clone(&count);
        let _sub_b = store.subscribe(move |_| {
            c2.fetch_add(1, Ordering::SeqCst);
        });

        store.set(StatePatch::new().theme(Theme::Dark));
        assert_eq!(count.load(Ordering::SeqCst), 2);

        sub_a.unsubscribe();
        store.set(StatePatch::new().theme(Theme::Light));
        assert_eq!(count.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn subscriber_sees_merged_state() {
        let store = Store::new();
        let seen = Arc::new(Mutex::new(None));
        let s = Arc::clone(&seen);
        let _sub = store.subscribe(move |state| {
            *s.lock() = Some(state.theme);
        });
        store.set(StatePatch::new().theme(Theme::Dark));
        assert_eq!(*seen.lock(), Some(Theme::Dark));
    }

    #[test]
    fn persisted_acks_restore_on_init() {
        let storage = MemoryStorage::new().seed(KEY_ACKS, r#"["a1","a2"]"#);
        let store = Store::with_storage(Box::new(storage));
        let acks = store.get().acks;
        assert_eq!(acks.len(), 2);
        assert!(acks.contains("a1") && acks.contains("a2"));
    }

    #[test]
    fn malformed_persisted_values_default_to_empty() {
        let storage = MemoryStorage::new()
            .seed(KEY_ACKS, "{not json")
            .seed(KEY_THEME, "42")
            .seed(KEY_ALERT_SNOOZE, r#""nope""#);
        let store = Store::with_storage(Box::new(storage));

        let state = store.get();
        assert!(state.acks.is_empty());
        assert_eq!(state.theme, Theme::System);
        assert!(state.alert_snooze.is_empty());
    }

    #[test]
    fn preferences_round_trip_through_storage() {
        let storage = Arc::new(MemoryStorage::new());

        struct Shared(Arc<MemoryStorage>);
        impl KvStorage for Shared {
            fn load(&self, key: &str) -> Option<String> {
                self.0.load(key)
            }
            fn store(&self, key: &str, value: &str) -> Result<()> {
                self.0.store(key, value)
            }
        }

        let store = Store::with_storage(Box::new(Shared(Arc::clone(&storage))));
        store.set(StatePatch::new().theme(Theme::Dark));
        drop(store);

        let revived = Store::with_storage(Box::new(Shared(storage)));
        assert_eq!(revived.get().theme, Theme::Dark);
    }

    #[test]
    fn storage_failure_does_not_block_update_or_notification() {
        struct BrokenStorage;
        impl KvStorage for BrokenStorage {
            fn load(&self, _key: &str) -> Option<String> {
                None
            }
            fn store(&self, _key: &str, _value: &str) -> Result<()> {
                Err(DashError::Storage("quota exceeded".into()))
            }
        }

        let store = Store::with_storage(Box::new(BrokenStorage));
        let count = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&count);
        let _sub = store.subscribe(move |_| {
            c.fetch_add(1, Ordering::SeqCst);
        });

        store.set(StatePatch::new().theme(Theme::Dark));
        assert_eq!(store.get().theme, Theme::Dark);
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }
}
