use std::{env, sync::LazyLock};

use strum_macros::EnumIter;

static CONNECTION_URI: LazyLock<String> = LazyLock::new(|| {
    let host = env::var("PROMETHEUS_HOST").unwrap_or("localhost".into());
    let port = env::var("PROMETHEUS_PORT").unwrap_or("9090".into());

    format!("http://{host}:{port}/api/v1/otlp/v1/metrics")
});

// exporting is opt-in so tests and one-off runs never open a connection
static ENABLED: LazyLock<bool> = LazyLock::new(|| {
    env::var("PHOTO_METRICS_ENABLED")
        .map(|value| matches!(value.trim(), "1" | "true" | "yes"))
        .unwrap_or(false)
});

const SERVICE_NAME: &str = "photo-loader";

#[derive(Debug, EnumIter, Hash, Eq, PartialEq)]
pub enum Metrics {
    /// Counter for photos whose image was fetched and decoded
    PhotoLoadSucceeded,
    /// Counter for fetches that failed at the network layer
    PhotoLoadFailed,
    /// Counter for fetched bodies that were not a decodable image
    PhotoDecodeFailed,
    /// Counter for cache lookups that produced an image
    CacheHit,
    /// Counter for cache lookups that came back empty
    CacheMiss,
}

impl Metrics {
    fn to_string(&self) -> String {
        match self {
            Metrics::PhotoLoadSucceeded => "PHOTO_LOAD_SUCCEEDED".to_string(),
            Metrics::PhotoLoadFailed => "PHOTO_LOAD_FAILED".to_string(),
            Metrics::PhotoDecodeFailed => "PHOTO_DECODE_FAILED".to_string(),
            Metrics::CacheHit => "CACHE_HIT".to_string(),
            Metrics::CacheMiss => "CACHE_MISS".to_string(),
        }
    }
}

pub fn enabled() -> bool {
    *ENABLED
}

pub mod _private {
    pub use opentelemetry::KeyValue;

    use std::{collections::HashMap, sync::LazyLock, time::Duration};

    use opentelemetry::{
        global,
        metrics::{Counter, Meter},
    };
    use opentelemetry_otlp::{MetricExporter, Protocol, WithExportConfig};
    use opentelemetry_sdk::{
        Resource,
        metrics::{PeriodicReader, SdkMeterProvider},
    };
    use strum::IntoEnumIterator;

    use crate::{CONNECTION_URI, Metrics, SERVICE_NAME};

    static OTEL_METER: LazyLock<Meter> = LazyLock::new(|| {
        global::set_meter_provider(PROVIDER.clone());
        global::meter(SERVICE_NAME)
    });

    pub static PROVIDER: LazyLock<SdkMeterProvider> = LazyLock::new(|| {
        let exporter = MetricExporter::builder()
            .with_http()
            .with_protocol(Protocol::HttpBinary)
            .with_endpoint(CONNECTION_URI.to_string())
            .build()
            .expect("Expect Prometheus exporter to build");

        let reader = PeriodicReader::builder(exporter)
            .with_interval(Duration::from_secs(1))
            .build();

        let resource = Resource::builder().with_service_name(SERVICE_NAME).build();

        SdkMeterProvider::builder()
            .with_reader(reader)
            .with_resource(resource)
            .build()
    });

    pub static COUNTERS: LazyLock<HashMap<Metrics, Counter<u64>>> = LazyLock::new(|| {
        let mut mapping: HashMap<Metrics, Counter<u64>> = HashMap::new();

        for metric in crate::Metrics::iter() {
            let metric_meter = OTEL_METER.u64_counter(metric.to_string()).build();

            mapping.insert(metric, metric_meter);
        }

        mapping
    });
}

/// Bumps a counter when `PHOTO_METRICS_ENABLED` is set, otherwise does
/// nothing and never touches the exporter.
#[macro_export]
macro_rules! put_metric {
    ($metric_name:expr, $added_value:expr $(, $key:literal => $value:expr)* $(,)?) => {
        if $crate::enabled() {
            use $crate::_private::{KeyValue, COUNTERS};
            use $crate::Metrics;

            let metric_name: Metrics = $metric_name;
            let added_value: u64 = $added_value;

            let attributes: &[KeyValue] = &[
                $(KeyValue::new($key, $value),)*
            ];

            if let Some(counter) = COUNTERS.get(&metric_name) {
                counter.add(added_value, attributes);
            }
        }
    };
}

/// Flushes pending counters, only meaningful when metrics are enabled.
pub fn shutdown() {
    if enabled() {
        let _ = _private::PROVIDER.shutdown();
    }
}
