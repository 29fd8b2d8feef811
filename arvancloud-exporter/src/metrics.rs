//! Metric descriptors and samples.
//!
//! A [`Desc`] is the static identity of a metric (name, help, label names).
//! A [`Sample`] is one value written for a descriptor during a collection
//! pass. Producers declare their descriptors up front and only ever emit
//! samples for them.

use std::sync::{Arc, LazyLock};

use crate::error::CollectError;

/// Namespace prefixed to every metric this exporter emits.
pub const NAMESPACE: &str = "arvancloud";

/// Build a fully qualified metric name from its parts.
///
/// Empty parts are skipped, the rest are joined with `_`, so
/// `build_fq_name("arvancloud", "", "up")` is `arvancloud_up`.
pub fn build_fq_name(namespace: &str, subsystem: &str, name: &str) -> String {
    if name.is_empty() {
        return String::new();
    }

    [namespace, subsystem, name]
        .iter()
        .filter(|part| !part.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join("_")
}

/// Prometheus metric type of a sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    Gauge,
    Counter,
}

impl ValueType {
    /// Get the Prometheus type string.
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueType::Gauge => "gauge",
            ValueType::Counter => "counter",
        }
    }
}

/// Static description of a metric.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Desc {
    fq_name: String,
    help: String,
    label_names: Vec<String>,
}

impl Desc {
    /// Create a descriptor shared between a producer and the samples it emits.
    pub fn new(
        fq_name: impl Into<String>,
        help: impl Into<String>,
        label_names: &[&str],
    ) -> Arc<Self> {
        Arc::new(Self {
            fq_name: fq_name.into(),
            help: help.into(),
            label_names: label_names.iter().map(|l| l.to_string()).collect(),
        })
    }

    /// The fully qualified metric name.
    pub fn fq_name(&self) -> &str {
        &self.fq_name
    }

    pub fn help(&self) -> &str {
        &self.help
    }

    pub fn label_names(&self) -> &[String] {
        &self.label_names
    }
}

/// A single metric value bound to its descriptor.
#[derive(Debug, Clone)]
pub struct Sample {
    desc: Arc<Desc>,
    label_values: Vec<String>,
    value: f64,
    value_type: ValueType,
}

impl Sample {
    /// Create a sample, checking the label values against the descriptor.
    pub fn new(
        desc: &Arc<Desc>,
        value_type: ValueType,
        value: f64,
        label_values: &[&str],
    ) -> Result<Self, CollectError> {
        if label_values.len() != desc.label_names.len() {
            return Err(CollectError::InconsistentLabels {
                metric: desc.fq_name.clone(),
                expected: desc.label_names.len(),
                got: label_values.len(),
            });
        }

        Ok(Self {
            desc: Arc::clone(desc),
            label_values: label_values.iter().map(|v| v.to_string()).collect(),
            value,
            value_type,
        })
    }

    pub fn desc(&self) -> &Arc<Desc> {
        &self.desc
    }

    pub fn label_values(&self) -> &[String] {
        &self.label_values
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn value_type(&self) -> ValueType {
        self.value_type
    }

    /// Label name/value pairs in descriptor order.
    pub fn labels(&self) -> impl Iterator<Item = (&str, &str)> {
        self.desc
            .label_names
            .iter()
            .zip(&self.label_values)
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

static SCRAPE_DURATION_DESC: LazyLock<Arc<Desc>> = LazyLock::new(|| {
    Desc::new(
        build_fq_name(NAMESPACE, "scrape", "collector_duration_seconds"),
        "arvancloud: duration of a collector scrape",
        &[],
    )
});

static SCRAPE_SUCCESS_DESC: LazyLock<Arc<Desc>> = LazyLock::new(|| {
    Desc::new(
        build_fq_name(NAMESPACE, "scrape", "collector_success"),
        "arvancloud: whether a collector succeeded",
        &[],
    )
});

/// Descriptor of the per-pass duration meta-metric.
pub fn scrape_duration_desc() -> &'static Arc<Desc> {
    &SCRAPE_DURATION_DESC
}

/// Descriptor of the per-pass success meta-metric.
pub fn scrape_success_desc() -> &'static Arc<Desc> {
    &SCRAPE_SUCCESS_DESC
}
