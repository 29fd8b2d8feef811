//! Write-only destinations for descriptors and samples.

use std::sync::Arc;

use crate::metrics::{Desc, Sample};

/// Receives descriptors during the description phase.
pub trait DescriptorSink {
    fn describe(&mut self, desc: Arc<Desc>);
}

impl DescriptorSink for Vec<Arc<Desc>> {
    fn describe(&mut self, desc: Arc<Desc>) {
        self.push(desc);
    }
}

/// Receives samples during a collection pass.
///
/// Only the producer currently running writes to the sink, so
/// implementations need no internal locking.
pub trait SampleSink: Send {
    fn emit(&mut self, sample: Sample);
}

impl SampleSink for Vec<Sample> {
    fn emit(&mut self, sample: Sample) {
        self.push(sample);
    }
}

/// Samples buffered from one collection pass, in emission order.
#[derive(Debug, Clone, Default)]
pub struct MetricSet {
    samples: Vec<Sample>,
}

impl MetricSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// All samples emitted for the given metric name.
    pub fn by_name<'a>(&'a self, fq_name: &'a str) -> impl Iterator<Item = &'a Sample> + 'a {
        self.samples
            .iter()
            .filter(move |s| s.desc().fq_name() == fq_name)
    }

    /// Value of the first sample with the given metric name.
    pub fn value_of(&self, fq_name: &str) -> Option<f64> {
        self.by_name(fq_name).next().map(Sample::value)
    }

    pub fn into_samples(self) -> Vec<Sample> {
        self.samples
    }
}

impl SampleSink for MetricSet {
    fn emit(&mut self, sample: Sample) {
        self.samples.push(sample);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::ValueType;

    #[test]
    fn test_metric_set_lookup() {
        let a = Desc::new("metric_a", "a", &[]);
        let b = Desc::new("metric_b", "b", &["k"]);

        let mut set = MetricSet::new();
        set.emit(Sample::new(&a, ValueType::Gauge, 1.0, &[]).unwrap());
        set.emit(Sample::new(&b, ValueType::Gauge, 2.0, &["x"]).unwrap());
        set.emit(Sample::new(&b, ValueType::Gauge, 3.0, &["y"]).unwrap());

        assert_eq!(set.len(), 3);
        assert_eq!(set.value_of("metric_a"), Some(1.0));
        assert_eq!(set.by_name("metric_b").count(), 2);
        assert_eq!(set.value_of("missing"), None);
    }

    #[test]
    fn test_vec_descriptor_sink() {
        let mut sink: Vec<Arc<Desc>> = Vec::new();
        sink.describe(Desc::new("metric_a", "a", &[]));
        assert_eq!(sink.len(), 1);
        assert_eq!(sink[0].fq_name(), "metric_a");
    }
}
