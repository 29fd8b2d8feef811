//! Per-pass state handed to every producer.

use std::sync::Arc;

use crate::error::CollectError;
use crate::metrics::{Desc, Sample, ValueType};
use crate::sink::SampleSink;

/// Context for one collection pass.
///
/// Built once per pass by the collector and dropped when the pass ends.
/// Producers write samples through it and read the API token from it.
pub struct CollectionContext<'a> {
    sink: &'a mut dyn SampleSink,
    token: &'a str,
}

impl<'a> CollectionContext<'a> {
    pub fn new(sink: &'a mut dyn SampleSink, token: &'a str) -> Self {
        Self { sink, token }
    }

    /// The API token used to authenticate upstream requests.
    pub fn token(&self) -> &str {
        self.token
    }

    /// Write an already built sample.
    pub fn emit(&mut self, sample: Sample) {
        self.sink.emit(sample);
    }

    /// Write a gauge sample for `desc`.
    pub fn gauge(
        &mut self,
        desc: &Arc<Desc>,
        value: f64,
        label_values: &[&str],
    ) -> Result<(), CollectError> {
        let sample = Sample::new(desc, ValueType::Gauge, value, label_values)?;
        self.sink.emit(sample);
        Ok(())
    }

    /// Write a counter sample for `desc`.
    pub fn counter(
        &mut self,
        desc: &Arc<Desc>,
        value: f64,
        label_values: &[&str],
    ) -> Result<(), CollectError> {
        let sample = Sample::new(desc, ValueType::Counter, value, label_values)?;
        self.sink.emit(sample);
        Ok(())
    }
}
