//! Prometheus metrics for the editing workflow
//!
//! Tracks translation gateway calls, content saves, edit-mode toggles and
//! API requests. Call `init_metrics()` at startup; if registration fails,
//! every recording function becomes a no-op.

use prometheus::{
    register_counter_vec, register_gauge, CounterVec, Encoder, Gauge, TextEncoder,
};
use std::sync::OnceLock;

use crate::models::Language;

struct EditorMetrics {
    translations: CounterVec,
    saves: CounterVec,
    edit_mode: Gauge,
    api_requests: CounterVec,
}

static EDITOR_METRICS: OnceLock<Option<EditorMetrics>> = OnceLock::new();

fn register() -> Result<EditorMetrics, prometheus::Error> {
    Ok(EditorMetrics {
        translations: register_counter_vec!(
            "frontedit_translations_total",
            "Translation gateway calls by target language and outcome",
            &["target", "outcome"]
        )?,
        saves: register_counter_vec!(
            "frontedit_saves_total",
            "Content saves by target kind and outcome",
            &["kind", "outcome"]
        )?,
        edit_mode: register_gauge!(
            "frontedit_edit_mode_enabled",
            "1 when inline edit mode is enabled"
        )?,
        api_requests: register_counter_vec!(
            "frontedit_api_requests_total",
            "API requests by endpoint and status",
            &["endpoint", "status"]
        )?,
    })
}

/// Register all metrics with the default registry
///
/// Registration runs once; later calls report the first attempt's outcome.
pub fn init_metrics() -> Result<(), String> {
    let metrics = EDITOR_METRICS.get_or_init(|| match register() {
        Ok(metrics) => Some(metrics),
        Err(e) => {
            tracing::warn!(error = %e, "Metrics registration failed, metrics disabled");
            None
        }
    });

    if metrics.is_some() {
        Ok(())
    } else {
        Err("metrics registration failed".to_string())
    }
}

fn metrics() -> Option<&'static EditorMetrics> {
    EDITOR_METRICS.get().and_then(Option::as_ref)
}

fn outcome(ok: bool) -> &'static str {
    if ok {
        "success"
    } else {
        "failure"
    }
}

pub fn record_translation(target: Language, ok: bool) {
    if let Some(m) = metrics() {
        m.translations
            .with_label_values(&[target.code(), outcome(ok)])
            .inc();
    }
}

/// `kind` is the target kind: `setting`, `record`, `setting_image` or `record_image`
pub fn record_save(kind: &str, ok: bool) {
    if let Some(m) = metrics() {
        m.saves.with_label_values(&[kind, outcome(ok)]).inc();
    }
}

pub fn set_edit_mode(enabled: bool) {
    if let Some(m) = metrics() {
        m.edit_mode.set(if enabled { 1.0 } else { 0.0 });
    }
}

pub fn record_api_request(endpoint: &str, status: u16) {
    if let Some(m) = metrics() {
        let status = status.to_string();
        m.api_requests
            .with_label_values(&[endpoint, status.as_str()])
            .inc();
    }
}

/// Render all registered metrics in the Prometheus text format
pub fn gather() -> String {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&prometheus::gather(), &mut buffer) {
        tracing::warn!(error = %e, "Failed to encode metrics");
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_is_idempotent() {
        assert!(init_metrics().is_ok());
        assert!(init_metrics().is_ok());
    }

    #[test]
    fn test_recorded_metrics_are_gathered() {
        init_metrics().ok();
        record_translation(Language::Th, true);
        record_save("setting", false);

        let text = gather();
        assert!(text.contains("frontedit_translations_total"));
        assert!(text.contains("frontedit_saves_total"));
    }
}
