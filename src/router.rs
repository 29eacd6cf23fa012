//! Hash-fragment router
//!
//! Maps a location string (the `#/...` fragment in the browser prototype) to
//! a registered handler. Handlers are registered once at startup; `start`
//! moves the router from idle to listening and performs one eager dispatch
//! so the initial view renders without a navigation event. Unmatched paths
//! degrade to the injected not-found fallback; dispatch never panics and
//! never returns an error.

use std::collections::HashMap;

/// Handler for a route. Literal routes receive `None`; the `/services/:id`
/// pattern receives `Some(id)`.
pub type RouteHandler = Box<dyn FnMut(Option<&str>) + Send>;

/// Fallback invoked with the unmatched path.
pub type NotFoundHandler = Box<dyn FnMut(&str) + Send>;

/// Pattern for the single parameterized route.
pub const SERVICE_DETAIL_PATTERN: &str = "/services/:id";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RouterState {
    Idle,
    Listening,
}

pub struct Router {
    routes: HashMap<String, RouteHandler>,
    not_found: NotFoundHandler,
    state: RouterState,
}

impl Router {
    pub fn new() -> Self {
        Self {
            routes: HashMap::new(),
            not_found: Box::new(|path| {
                tracing::warn!(path, "no route matched and no not-found handler installed");
            }),
            state: RouterState::Idle,
        }
    }

    /// Register a handler for a literal path or for
    /// [`SERVICE_DETAIL_PATTERN`]. Registering the same pattern twice
    /// overwrites the prior handler.
    pub fn register(&mut self, pattern: impl Into<String>, handler: RouteHandler) {
        self.routes.insert(pattern.into(), handler);
    }

    /// Install the not-found fallback (the "output region" of the prototype).
    pub fn on_not_found(&mut self, handler: NotFoundHandler) {
        self.not_found = handler;
    }

    /// Begin listening and dispatch once for the current location.
    /// There is no transition back to idle.
    pub fn start(&mut self, location: &str) {
        self.state = RouterState::Listening;
        self.dispatch(location);
    }

    /// Location-change notification. Ignored until [`Router::start`].
    pub fn on_change(&mut self, location: &str) {
        if self.state == RouterState::Listening {
            self.dispatch(location);
        }
    }

    pub fn is_listening(&self) -> bool {
        self.state == RouterState::Listening
    }

    fn dispatch(&mut self, location: &str) {
        let path = resolve(location);
        tracing::debug!(%path, "dispatching route");

        if path == "/" {
            if let Some(handler) = self.routes.get_mut("/") {
                handler(None);
            } else {
                (self.not_found)(&path);
            }
            return;
        }

        if let Some(id) = path.strip_prefix("/services/") {
            if let Some(handler) = self.routes.get_mut(SERVICE_DETAIL_PATTERN) {
                handler(Some(id));
                return;
            }
        }

        if path == "/compare" {
            if let Some(handler) = self.routes.get_mut("/compare") {
                handler(None);
                return;
            }
        }

        match self.routes.get_mut(path.as_str()) {
            Some(handler) => handler(None),
            None => (self.not_found)(&path),
        }
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

/// Normalize a raw location: strip the leading fragment marker, treat empty
/// as `/`, and drop any query-string suffix before matching.
fn resolve(location: &str) -> String {
    let path = location.strip_prefix('#').unwrap_or(location);
    let path = path.split('?').next().unwrap_or("");
    if path.is_empty() {
        "/".to_string()
    } else {
        path.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    fn recording_router() -> (Router, Arc<Mutex<Vec<String>>>) {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let mut router = Router::new();

        for pattern in ["/", "/alerts", "/settings", "/compare"] {
            let calls = Arc::clone(&calls);
            router.register(
                pattern,
                Box::new(move |arg| {
                    calls.lock().push(format!("{pattern}:{}", arg.unwrap_or("")));
                }),
            );
        }
        let c = Arc::clone(&calls);
        router.register(
            SERVICE_DETAIL_PATTERN,
            Box::new(move |arg| {
                c.lock().push(format!("detail:{}", arg.unwrap_or("")));
            }),
        );
        let c = Arc::clone(&calls);
        router.on_not_found(Box::new(move |path| {
            c.lock().push(format!("404:{path}"));
        }));

        (router, calls)
    }

    #[test]
    fn start_dispatches_eagerly() {
        let (mut router, calls) = recording_router();
        assert!(!router.is_listening());
        router.start("#/");
        assert!(router.is_listening());
        assert_eq!(calls.lock().as_slice(), ["/:"]);
    }

    #[test]
    fn idle_router_ignores_changes() {
        let (mut router, calls) = recording_router();
        router.on_change("#/alerts");
        assert!(calls.lock().is_empty());
    }

    #[test]
    fn service_detail_receives_the_id() {
        let (mut router, calls) = recording_router();
        router.start("#/services/svc-7");
        assert_eq!(calls.lock().as_slice(), ["detail:svc-7"]);
    }

    #[test]
    fn empty_location_is_root() {
        let (mut router, calls) = recording_router();
        router.start("");
        router.on_change("#");
        assert_eq!(calls.lock().as_slice(), ["/:", "/:"]);
    }

    #[test]
    fn query_string_is_stripped() {
        let (mut router, calls) = recording_router();
        router.start("#/alerts?severity=critical");
        assert_eq!(calls.lock().as_slice(), ["/alerts:"]);
    }

    #[test]
    fn unmatched_path_hits_not_found_without_invoking_handlers() {
        let (mut router, calls) = recording_router();
        router.start("#/nope");
        assert_eq!(calls.lock().as_slice(), ["404:/nope"]);
    }

    #[test]
    fn last_registration_wins() {
        let (mut router, calls) = recording_router();
        let c = Arc::clone(&calls);
        router.register(
            "/alerts",
            Box::new(move |_| {
                c.lock().push("alerts-v2".to_string());
            }),
        );
        router.start("#/alerts");
        assert_eq!(calls.lock().as_slice(), ["alerts-v2"]);
    }

    #[test]
    fn compare_route_dispatches() {
        let (mut router, calls) = recording_router();
        router.start("#/compare");
        assert_eq!(calls.lock().as_slice(), ["/compare:"]);
    }
}
