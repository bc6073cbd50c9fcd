// Prometheus metrics for the judgekit API
use lazy_static::lazy_static;
use prometheus::{
    register_histogram, register_int_counter_vec, Encoder, Histogram, IntCounterVec, TextEncoder,
};

lazy_static! {
    pub static ref RUNS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "judgekit_runs_total",
        "Automated test runs by language and verdict",
        &["language", "verdict"]
    )
    .expect("judgekit_runs_total can be registered");
    pub static ref GENERATIONS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "judgekit_generations_total",
        "Wrapped program generations by language and outcome",
        &["language", "outcome"]
    )
    .expect("judgekit_generations_total can be registered");
    pub static ref RUN_DURATION_SECONDS: Histogram = register_histogram!(
        "judgekit_run_duration_seconds",
        "Wall-clock duration of automated test runs, including queueing"
    )
    .expect("judgekit_run_duration_seconds can be registered");
}

/// Touch every metric so it is exported before its first observation
pub fn init() {
    lazy_static::initialize(&RUNS_TOTAL);
    lazy_static::initialize(&GENERATIONS_TOTAL);
    lazy_static::initialize(&RUN_DURATION_SECONDS);
}

pub fn record_run(language: &str, verdict: &str, seconds: f64) {
    RUNS_TOTAL.with_label_values(&[language, verdict]).inc();
    RUN_DURATION_SECONDS.observe(seconds);
}

pub fn record_generation(language: &str, outcome: &str) {
    GENERATIONS_TOTAL.with_label_values(&[language, outcome]).inc();
}

/// Prometheus text exposition of the default registry
pub fn render() -> Result<String, prometheus::Error> {
    let mut buffer = Vec::new();
    TextEncoder::new().encode(&prometheus::gather(), &mut buffer)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}
