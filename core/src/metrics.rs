use log::warn;
use once_cell::sync::Lazy;
use prometheus::{Encoder, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};

use crate::alerts::AlertKind;
use crate::insights::InsightKind;

/// Tellere for motoren, i et eget register som verten kan eksponere.
pub struct Metrics {
    pub registry: Registry,
    pub engine_runs_total: IntCounter,
    pub insights_total: IntCounterVec,
    pub alerts_total: IntCounterVec,
    pub archives_total: IntCounterVec,
}

impl Metrics {
    pub fn new() -> prometheus::Result<Self> {
        let registry = Registry::new();

        let engine_runs_total = IntCounter::new(
            "squadpower_engine_runs_total",
            "Number of completed engine runs",
        )?;
        let insights_total = IntCounterVec::new(
            Opts::new("squadpower_insights_total", "Insights emitted, by kind"),
            &["kind"],
        )?;
        let alerts_total = IntCounterVec::new(
            Opts::new("squadpower_alerts_total", "Alerts emitted, by kind"),
            &["kind"],
        )?;
        let archives_total = IntCounterVec::new(
            Opts::new("squadpower_archives_total", "Season archive requests, by outcome"),
            &["outcome"],
        )?;

        registry.register(Box::new(engine_runs_total.clone()))?;
        registry.register(Box::new(insights_total.clone()))?;
        registry.register(Box::new(alerts_total.clone()))?;
        registry.register(Box::new(archives_total.clone()))?;

        Ok(Self {
            registry,
            engine_runs_total,
            insights_total,
            alerts_total,
            archives_total,
        })
    }
}

static METRICS: Lazy<Option<Metrics>> = Lazy::new(|| match Metrics::new() {
    Ok(m) => Some(m),
    Err(e) => {
        warn!("metrics disabled: {e}");
        None
    }
});

/// Globale tellere; `None` hvis registreringen feilet.
pub fn metrics() -> Option<&'static Metrics> {
    METRICS.as_ref()
}

pub fn engine_run_total() {
    if let Some(m) = metrics() {
        m.engine_runs_total.inc();
    }
}

pub fn insight_emitted_total(kind: InsightKind) {
    if let Some(m) = metrics() {
        m.insights_total.with_label_values(&[kind.as_str()]).inc();
    }
}

pub fn alert_emitted_total(kind: AlertKind) {
    if let Some(m) = metrics() {
        m.alerts_total.with_label_values(&[kind.as_str()]).inc();
    }
}

/// outcome: "created", "already_archived", "refused", "recomputed"
pub fn archive_request_total(outcome: &str) {
    if let Some(m) = metrics() {
        m.archives_total.with_label_values(&[outcome]).inc();
    }
}

/// Tekstformat (Prometheus exposition) for verten.
pub fn gather_metrics() -> anyhow::Result<String> {
    let Some(m) = metrics() else {
        return Ok(String::new());
    };
    let mut buf = Vec::new();
    TextEncoder::new().encode(&m.registry.gather(), &mut buf)?;
    Ok(String::from_utf8(buf)?)
}
