// Prometheus metrics for the relay

use lazy_static::lazy_static;
use prometheus::{Encoder, Histogram, HistogramOpts, IntCounterVec, Opts, Registry, TextEncoder};

lazy_static! {
    pub static ref EXEC_REQUESTS: IntCounterVec = IntCounterVec::new(
        Opts::new("playground_exec_requests_total", "Run requests handled by the relay"),
        &["outcome"]
    )
    .expect("metric definition is valid");

    pub static ref EXEC_DURATION: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            "playground_exec_duration_seconds",
            "Wall time of run requests, including the backend call"
        )
        .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 20.0, 30.0])
    )
    .expect("metric definition is valid");

    static ref REGISTRY: Registry = {
        let registry = Registry::new();
        registry
            .register(Box::new(EXEC_REQUESTS.clone()))
            .expect("metric registered once");
        registry
            .register(Box::new(EXEC_DURATION.clone()))
            .expect("metric registered once");
        registry
    };
}

pub fn record(outcome: &str, elapsed_secs: f64) {
    EXEC_REQUESTS.with_label_values(&[outcome]).inc();
    EXEC_DURATION.observe(elapsed_secs);
}

/// Text exposition of every registered metric
pub fn gather() -> Result<String, prometheus::Error> {
    let mut buffer = Vec::new();
    TextEncoder::new().encode(&REGISTRY.gather(), &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
}
