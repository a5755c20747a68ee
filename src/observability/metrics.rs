use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, Opts, Registry, TextEncoder,
};

#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    pub store_reads_total: IntCounterVec,
    pub store_writes_total: IntCounterVec,
    pub store_read_latency_seconds: HistogramVec,
    pub degraded_results_total: IntCounterVec,
    pub live_subscribers: IntGauge,
}

impl Metrics {
    pub fn new() -> Self {
        let registry = Registry::new();

        let store_reads_total = IntCounterVec::new(
            Opts::new("store_reads_total", "Remote store reads by collection and outcome"),
            &["collection", "outcome"],
        )
        .expect("valid store_reads_total metric");

        let store_writes_total = IntCounterVec::new(
            Opts::new("store_writes_total", "Remote store writes by operation and outcome"),
            &["operation", "outcome"],
        )
        .expect("valid store_writes_total metric");

        let store_read_latency_seconds = HistogramVec::new(
            HistogramOpts::new(
                "store_read_latency_seconds",
                "Latency of remote store reads in seconds",
            ),
            &["collection"],
        )
        .expect("valid store_read_latency_seconds metric");

        let degraded_results_total = IntCounterVec::new(
            Opts::new(
                "degraded_results_total",
                "Dashboard reads answered with a fallback value",
            ),
            &["operation"],
        )
        .expect("valid degraded_results_total metric");

        let live_subscribers =
            IntGauge::new("live_subscribers", "Currently open live driver feeds")
                .expect("valid live_subscribers metric");

        registry
            .register(Box::new(store_reads_total.clone()))
            .expect("register store_reads_total");
        registry
            .register(Box::new(store_writes_total.clone()))
            .expect("register store_writes_total");
        registry
            .register(Box::new(store_read_latency_seconds.clone()))
            .expect("register store_read_latency_seconds");
        registry
            .register(Box::new(degraded_results_total.clone()))
            .expect("register degraded_results_total");
        registry
            .register(Box::new(live_subscribers.clone()))
            .expect("register live_subscribers");

        Self {
            registry,
            store_reads_total,
            store_writes_total,
            store_read_latency_seconds,
            degraded_results_total,
            live_subscribers,
        }
    }

    pub fn record_degraded(&self, operation: &str) {
        self.degraded_results_total
            .with_label_values(&[operation])
            .inc();
    }

    pub fn encode(&self) -> Result<String, String> {
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();

        TextEncoder::new()
            .encode(&metric_families, &mut buffer)
            .map_err(|err| format!("failed to encode metrics: {err}"))?;

        String::from_utf8(buffer).map_err(|err| format!("metrics are not valid utf8: {err}"))
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
