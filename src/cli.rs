//! CLI definitions and command execution
//!
//! Each subcommand loads the snapshot (bundled demo or `--mock` file) into a
//! store backed by the on-disk preference file, runs one view or mutation,
//! and prints plain text. The `view` subcommand drives the same output
//! through the router, dispatching on a location string exactly as the
//! browser prototype dispatched on the URL hash.

use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::{Config, CANVAS_HEIGHT, CANVAS_WIDTH, DEFAULT_LOG_LIMIT};
use crate::data;
use crate::error::{DashError, Result};
use crate::graph::layout::{self, LayoutParams};
use crate::graph::Graph;
use crate::model::{LogLevel, Severity};
use crate::render::charts::{self, ChartOptions};
use crate::render::graph::dependency_graph_svg;
use crate::router::{Router, SERVICE_DETAIL_PATTERN};
use crate::store::persist::FileStorage;
use crate::store::{AppState, StatePatch, Store, Theme};
use crate::views::alerts::{self, AckFilter, AlertFilter};
use crate::views::dashboard::{self, HealthSummary};
use crate::views::logs::{self, LogFilter, SortOrder};

const HELP_TEMPLATE: &str = r#"
{about}

{usage-heading} {usage}

{all-args}

{after-help}"#;

#[derive(Parser)]
#[command(name = "labdash")]
#[command(author, version)]
#[command(about = "Homelab monitoring dashboard: services, alerts, logs, dependency graph")]
#[command(after_help = "Examples:
  labdash overview                  Health summary and service tiles
  labdash graph --svg               Dependency graph layout as SVG
  labdash alerts --severity critical --active
  labdash alerts --ack al-1001      Acknowledge an alert
  labdash logs --search error -n 20
  labdash action mqtt restart       Trigger a mock service action
  labdash view \"#/services/mqtt\"    Render the view for a location")]
#[command(help_template = HELP_TEMPLATE)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Snapshot JSON file (defaults to the bundled demo snapshot)
    #[arg(long, global = true, value_name = "FILE")]
    pub mock: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the health summary and service tiles
    Overview,

    /// Compute the dependency graph layout
    Graph(GraphArgs),

    /// List alerts; acknowledge, snooze, or annotate them
    Alerts(AlertsArgs),

    /// Show aggregated logs across all services
    Logs(LogsArgs),

    /// Show or set the color theme
    Theme {
        /// light, dark, or system; omit to show the current theme
        value: Option<Theme>,
    },

    /// Trigger a mock action on a service
    Action(ActionArgs),

    /// Render the view for a location string (e.g. "#/alerts")
    View(ViewArgs),
}

#[derive(Args)]
pub struct GraphArgs {
    /// Emit a full SVG document instead of JSON node positions
    #[arg(long)]
    pub svg: bool,

    /// Canvas width in pixels
    #[arg(long, default_value_t = CANVAS_WIDTH)]
    pub width: f64,

    /// Canvas height in pixels
    #[arg(long, default_value_t = CANVAS_HEIGHT)]
    pub height: f64,
}

#[derive(Args)]
pub struct AlertsArgs {
    /// Only alerts of this severity
    #[arg(short, long)]
    pub severity: Option<Severity>,

    /// Only alerts for this service id
    #[arg(long)]
    pub service: Option<String>,

    /// Only unacknowledged alerts
    #[arg(long, conflicts_with = "acked")]
    pub active: bool,

    /// Only acknowledged alerts
    #[arg(long)]
    pub acked: bool,

    /// Acknowledge an alert (repeatable)
    #[arg(long, value_name = "ALERT_ID")]
    pub ack: Vec<String>,

    /// Clear the acknowledgement of an alert (repeatable)
    #[arg(long, value_name = "ALERT_ID")]
    pub unack: Vec<String>,

    /// Acknowledge every alert in the snapshot
    #[arg(long)]
    pub ack_all: bool,

    /// Snooze an alert for --minutes
    #[arg(long, value_name = "ALERT_ID")]
    pub snooze: Option<String>,

    /// Snooze duration in minutes
    #[arg(long, default_value_t = 30)]
    pub minutes: u64,

    /// Attach a note to an alert (requires --text)
    #[arg(long, value_name = "ALERT_ID", requires = "text")]
    pub note: Option<String>,

    /// Note text
    #[arg(long, requires = "note")]
    pub text: Option<String>,
}

#[derive(Args)]
pub struct LogsArgs {
    /// Only logs from this service id
    #[arg(long)]
    pub service: Option<String>,

    /// Only logs at this level
    #[arg(short, long)]
    pub level: Option<LogLevel>,

    /// Case-insensitive substring match over message and service name
    #[arg(long)]
    pub search: Option<String>,

    /// Maximum number of lines to show
    #[arg(short = 'n', long, default_value_t = DEFAULT_LOG_LIMIT)]
    pub limit: usize,

    /// Oldest first instead of newest first
    #[arg(long)]
    pub asc: bool,
}

#[derive(Args)]
pub struct ActionArgs {
    /// Service id
    pub service: String,

    /// Action key as listed on the service detail view
    pub action: String,
}

#[derive(Args)]
pub struct ViewArgs {
    /// Location string; the "#/" prefix is optional
    #[arg(default_value = "#/")]
    pub location: String,
}

pub async fn run(cli: Cli) -> Result<()> {
    let store = open_store()?;
    let snapshot = match &cli.mock {
        Some(path) => data::load(path).await?,
        None => data::load_embedded(),
    };
    store.set(StatePatch::new().data(snapshot));

    match cli.command {
        Commands::Overview => {
            println!("{}", overview_text(&store.get()));
            Ok(())
        }
        Commands::Graph(args) => run_graph(&store, args),
        Commands::Alerts(args) => run_alerts(&store, args),
        Commands::Logs(args) => {
            let filter = LogFilter {
                service: args.service,
                level: args.level,
                search: args.search.unwrap_or_default(),
                sort: if args.asc { SortOrder::Asc } else { SortOrder::Desc },
                limit: args.limit,
            };
            println!("{}", logs_text(&store.get(), &filter));
            Ok(())
        }
        Commands::Theme { value } => run_theme(&store, value),
        Commands::Action(args) => run_action(&store, args).await,
        Commands::View(args) => run_view(store, &args.location),
    }
}

fn open_store() -> Result<Store> {
    Config::ensure_home()?;
    let storage = FileStorage::open(Config::prefs_path()?);
    Ok(Store::with_storage(Box::new(storage)))
}

fn run_graph(store: &Store, args: GraphArgs) -> Result<()> {
    let state = store.get();
    let services = state.data.as_ref().map(|d| d.services.as_slice()).unwrap_or(&[]);
    let mut graph = Graph::from_services(services);
    let params = LayoutParams {
        width: args.width,
        height: args.height,
        ..LayoutParams::default()
    };
    let iterations = layout::run(&mut graph, &params);
    tracing::debug!(
        nodes = graph.nodes.len(),
        edges = graph.edges.len(),
        iterations,
        "layout complete"
    );

    if args.svg {
        println!("{}", dependency_graph_svg(&graph, &params));
    } else {
        println!("{}", serde_json::to_string_pretty(&graph)?);
    }
    Ok(())
}

fn run_alerts(store: &Store, args: AlertsArgs) -> Result<()> {
    let now_ms = Utc::now().timestamp_millis();
    let state = store.get();
    for id in args.ack.iter().chain(&args.unack) {
        require_alert(&state, id)?;
    }

    if args.ack_all {
        let ids: Vec<String> = state
            .data
            .as_ref()
            .map(|d| d.alerts.iter().map(|a| a.id.clone()).collect())
            .unwrap_or_default();
        store.set(alerts::acknowledge_all(
            &store.get(),
            ids.iter().map(String::as_str),
        ));
    }
    if !args.ack.is_empty() {
        store.set(alerts::acknowledge_all(
            &store.get(),
            args.ack.iter().map(String::as_str),
        ));
    }
    if !args.unack.is_empty() {
        store.set(alerts::unacknowledge_all(
            &store.get(),
            args.unack.iter().map(String::as_str),
        ));
    }
    if let Some(id) = &args.snooze {
        require_alert(&state, id)?;
        let until_ms = now_ms + args.minutes as i64 * 60_000;
        store.set(alerts::snooze(&store.get(), id, until_ms));
        println!("Snoozed {id} for {} minutes\n", args.minutes);
    }
    if let (Some(id), Some(text)) = (&args.note, &args.text) {
        require_alert(&state, id)?;
        store.set(alerts::set_note(&store.get(), id, text));
    }

    let filter = AlertFilter {
        severity: args.severity,
        service: args.service,
        ack: if args.active {
            AckFilter::Active
        } else if args.acked {
            AckFilter::Acknowledged
        } else {
            AckFilter::All
        },
    };
    println!("{}", alerts_text(&store.get(), &filter, now_ms));
    Ok(())
}

fn require_alert(state: &AppState, id: &str) -> Result<()> {
    let known = state.data.as_ref().is_some_and(|d| d.alert(id).is_some());
    if known {
        Ok(())
    } else {
        Err(DashError::AlertNotFound(id.to_string()))
    }
}

fn run_theme(store: &Store, value: Option<Theme>) -> Result<()> {
    match value {
        Some(theme) => {
            store.set(StatePatch::new().theme(theme));
            println!("Theme set to {}", theme.as_str());
        }
        None => println!("Theme: {}", store.get().theme.as_str()),
    }
    Ok(())
}

async fn run_action(store: &Store, args: ActionArgs) -> Result<()> {
    let state = store.get();
    let svc = state
        .data
        .as_ref()
        .and_then(|d| d.service(&args.service))
        .ok_or_else(|| DashError::ServiceNotFound(args.service.clone()))?;
    if !svc.actions.iter().any(|a| a.key == args.action) {
        return Err(DashError::UnknownAction {
            service: args.service.clone(),
            action: args.action.clone(),
        });
    }

    let outcome = data::trigger_action(&args.service, &args.action).await;
    println!("{}: {}", svc.name, outcome.message);
    Ok(())
}

/// Wire every view to the router and dispatch once for `location`, the same
/// boot sequence the browser prototype ran on page load.
fn run_view(store: Store, location: &str) -> Result<()> {
    let mut router = Router::new();

    let s = store.clone();
    router.register("/", Box::new(move |_| println!("{}", overview_text(&s.get()))));

    let s = store.clone();
    router.register(
        "/alerts",
        Box::new(move |_| {
            let now_ms = Utc::now().timestamp_millis();
            println!("{}", alerts_text(&s.get(), &AlertFilter::default(), now_ms));
        }),
    );

    let s = store.clone();
    router.register(
        "/logs",
        Box::new(move |_| println!("{}", logs_text(&s.get(), &LogFilter::default()))),
    );

    let s = store.clone();
    router.register(
        SERVICE_DETAIL_PATTERN,
        Box::new(move |id| {
            if let Some(id) = id {
                println!("{}", service_detail_text(&s.get(), id));
            }
        }),
    );

    let s = store.clone();
    router.register(
        "/settings",
        Box::new(move |_| println!("{}", settings_text(&s.get()))),
    );

    let s = store.clone();
    router.register(
        "/compare",
        Box::new(move |_| println!("{}", compare_text(&s.get()))),
    );

    router.on_not_found(Box::new(|path| println!("404: no view for {path}")));

    router.start(location);
    Ok(())
}

fn overview_text(state: &AppState) -> String {
    let Some(summary) = HealthSummary::compute(state) else {
        return "No snapshot loaded".to_string();
    };

    let mut out = format!(
        "{} ({}% healthy)\n",
        summary.banner.text(),
        summary.health_pct
    );
    out.push_str(&format!(
        "Services: {} up, {} down ({} total) | Open alerts: {}\n",
        summary.services_up, summary.services_down, summary.total_services, summary.alerts_open
    ));
    if let Some(sync) = &summary.last_sync {
        out.push_str(&format!("Last sync: {sync}\n"));
    }
    out.push('\n');

    if let Some(data) = &state.data {
        for svc in &data.services {
            let kpis: Vec<String> = dashboard::service_kpis(svc)
                .iter()
                .map(|(label, value)| format!("{label} {value}"))
                .collect();
            out.push_str(&format!(
                "  {:<20} {:<10} {}\n",
                svc.name,
                svc.status.as_str(),
                kpis.join("  ")
            ));
        }
    }
    out
}

fn alerts_text(state: &AppState, filter: &AlertFilter, now_ms: i64) -> String {
    let visible = alerts::visible_alerts(state, filter, now_ms);
    if visible.is_empty() {
        return "No alerts match".to_string();
    }

    let mut out = String::new();
    for alert in visible {
        let ack = if state.acks.contains(&alert.id) { "ack" } else { "   " };
        out.push_str(&format!(
            "  {:<8} [{:<8}] {ack} {:<16} {}",
            alert.id,
            alert.severity.as_str(),
            alert.service_id,
            alert.title
        ));
        if let Some(note) = state.alert_notes.get(&alert.id) {
            out.push_str(&format!("  (note: {note})"));
        }
        out.push('\n');
    }
    out
}

fn logs_text(state: &AppState, filter: &LogFilter) -> String {
    let Some(data) = &state.data else {
        return "No snapshot loaded".to_string();
    };

    let all = logs::aggregate(data);
    // Counts cover the whole filtered set, not just the displayed page.
    let (filtered, _) = logs::apply(
        all.clone(),
        &LogFilter {
            limit: usize::MAX,
            ..filter.clone()
        },
    );
    let counts = logs::level_counts(&filtered);
    let (display, total) = logs::apply(all, filter);

    let mut out = String::new();
    for log in &display {
        out.push_str(&format!(
            "  {} {:<5} {:<16} {}\n",
            log.ts,
            log.level.as_str(),
            log.service_name,
            log.msg
        ));
    }
    out.push_str(&format!(
        "{} of {} lines | error {} warn {} info {} debug {}\n",
        display.len(),
        total,
        counts.error,
        counts.warn,
        counts.info,
        counts.debug
    ));
    out
}

fn service_detail_text(state: &AppState, id: &str) -> String {
    let Some(data) = &state.data else {
        return "No snapshot loaded".to_string();
    };
    let Some(svc) = data.service(id) else {
        return format!("404: unknown service {id}");
    };

    let mut out = format!("{} ({})\n", svc.name, svc.id);
    out.push_str(&format!("Status: {}", svc.status.as_str()));
    if let Some(version) = &svc.version {
        out.push_str(&format!(" | Version: {version}"));
    }
    // User-configured endpoints shadow the snapshot's.
    let endpoint = state
        .settings
        .endpoints
        .get(id)
        .or_else(|| data.settings.endpoints.get(id));
    if let Some(endpoint) = endpoint {
        out.push_str(&format!(" | {endpoint}"));
    }
    out.push('\n');

    for (label, value) in dashboard::service_kpis(svc) {
        out.push_str(&format!("  {label}: {value}\n"));
    }
    if !svc.dependencies.is_empty() {
        out.push_str(&format!("Depends on: {}\n", svc.dependencies.join(", ")));
    }
    if !svc.actions.is_empty() {
        let keys: Vec<String> = svc
            .actions
            .iter()
            .map(|a| {
                if a.danger {
                    format!("{} (danger)", a.key)
                } else {
                    a.key.clone()
                }
            })
            .collect();
        out.push_str(&format!("Actions: {}\n", keys.join(", ")));
    }

    if let Some(metrics) = &svc.metrics {
        for (series, points) in &metrics.timeseries {
            let opts = ChartOptions {
                label: Some(series.clone()),
                chart_id: format!("{id}-{series}"),
                ..ChartOptions::default()
            };
            out.push_str(&charts::line_chart(points, &opts));
            out.push('\n');
        }
    }

    if !svc.logs.is_empty() {
        out.push_str("Recent logs:\n");
        for entry in svc.logs.iter().rev().take(5) {
            out.push_str(&format!(
                "  {} {:<5} {}\n",
                entry.ts,
                entry.level.as_str(),
                entry.msg
            ));
        }
    }
    out
}

fn settings_text(state: &AppState) -> String {
    let mut out = format!("Theme: {}\n", state.theme.as_str());

    let mut endpoints = state
        .data
        .as_ref()
        .map(|d| d.settings.endpoints.clone())
        .unwrap_or_default();
    endpoints.extend(state.settings.endpoints.clone());
    if !endpoints.is_empty() {
        out.push_str("Endpoints:\n");
        for (id, url) in &endpoints {
            out.push_str(&format!("  {id:<16} {url}\n"));
        }
    }

    if let Some(data) = &state.data {
        if !data.settings.feature_flags.is_empty() {
            out.push_str("Feature flags:\n");
            for (flag, enabled) in &data.settings.feature_flags {
                out.push_str(&format!("  {flag:<24} {enabled}\n"));
            }
        }
    }
    out
}

fn compare_text(state: &AppState) -> String {
    let Some(data) = &state.data else {
        return "No snapshot loaded".to_string();
    };

    let mut out = format!(
        "  {:<20} {:<10} {:>8} {:>10} {:>8} {:>10}\n",
        "Service", "Status", "CPU", "RAM", "Uptime", "Latency"
    );
    for svc in &data.services {
        let kpis = dashboard::service_kpis(svc);
        out.push_str(&format!(
            "  {:<20} {:<10} {:>8} {:>10} {:>8} {:>10}\n",
            svc.name,
            svc.status.as_str(),
            kpis[0].1,
            kpis[1].1,
            kpis[2].1,
            kpis[3].1
        ));
    }
    out
}
