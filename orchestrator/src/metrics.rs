use once_cell::sync::Lazy;
use prometheus::{
    register_histogram, register_int_counter_vec, Encoder, Histogram, IntCounterVec, TextEncoder,
};
use tracing::error;

pub static REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "tutor_requests_total",
        "Messages handled by the pipeline, by tool and status",
        &["tool", "status"]
    )
    .expect("tutor_requests_total registers once")
});

pub static PLANNER_FALLBACKS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "tutor_planner_fallbacks_total",
        "Times the rule-based planner replaced the model planner, by reason",
        &["reason"]
    )
    .expect("tutor_planner_fallbacks_total registers once")
});

pub static PIPELINE_DURATION: Lazy<Histogram> = Lazy::new(|| {
    register_histogram!(
        "tutor_pipeline_duration_seconds",
        "End-to-end pipeline latency"
    )
    .expect("tutor_pipeline_duration_seconds registers once")
});

/// Text exposition of the default registry and its content type.
pub fn render() -> (Vec<u8>, String) {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = vec![];
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        error!("Failed to encode metrics: {}", e);
    }
    (buffer, encoder.format_type().to_string())
}
