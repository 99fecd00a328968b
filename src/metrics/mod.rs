use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder,
};

// ============================================================================
// Metrics Module - Prometheus metrics for the admin shell
// ============================================================================
//
// Provides:
// - Record store request counts and latency per operation
// - Order command outcomes (applied, rejected, stale, store_error)
// - Retry attempts on idempotent reads
//
// The CLI prints the text exposition on request.
// ============================================================================

pub struct Metrics {
    registry: Registry,

    pub store_requests: IntCounterVec,
    pub store_request_duration: HistogramVec,
    pub order_commands: IntCounterVec,
    pub retry_attempts: IntCounterVec,
}

impl Metrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let store_requests = IntCounterVec::new(
            Opts::new("store_requests_total", "Record store requests by outcome"),
            &["operation", "outcome"],
        )?;
        registry.register(Box::new(store_requests.clone()))?;

        let store_request_duration = HistogramVec::new(
            HistogramOpts::new("store_request_duration_seconds", "Record store request duration")
                .buckets(vec![0.005, 0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 5.0]),
            &["operation"],
        )?;
        registry.register(Box::new(store_request_duration.clone()))?;

        let order_commands = IntCounterVec::new(
            Opts::new("order_commands_total", "Order commands by outcome"),
            &["command", "outcome"],
        )?;
        registry.register(Box::new(order_commands.clone()))?;

        let retry_attempts = IntCounterVec::new(
            Opts::new("retry_attempts_total", "Retried store reads"),
            &["operation", "attempt"],
        )?;
        registry.register(Box::new(retry_attempts.clone()))?;

        Ok(Self {
            registry,
            store_requests,
            store_request_duration,
            order_commands,
            retry_attempts,
        })
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn record_store_request(&self, operation: &str, duration_secs: f64, success: bool) {
        let outcome = if success { "ok" } else { "error" };
        self.store_requests.with_label_values(&[operation, outcome]).inc();
        self.store_request_duration
            .with_label_values(&[operation])
            .observe(duration_secs);
    }

    pub fn record_order_command(&self, command: &str, outcome: &str) {
        self.order_commands.with_label_values(&[command, outcome]).inc();
    }

    pub fn record_retry_attempt(&self, operation: &str, attempt: u32) {
        self.retry_attempts
            .with_label_values(&[operation, &attempt.to_string()])
            .inc();
    }

    /// Text exposition format
    pub fn render(&self) -> Result<String, prometheus::Error> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}
