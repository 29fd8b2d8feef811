//! Collector that runs every registered producer on each scrape.

use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::RwLock;
use tracing::{debug, error, info};

use crate::client::ApiClient;
use crate::config::ExporterConfig;
use crate::context::CollectionContext;
use crate::error::{CollectError, Result};
use crate::metrics::{Desc, Sample, ValueType, scrape_duration_desc, scrape_success_desc};
use crate::producer::Producer;
use crate::producers::{CdnProducer, ObjectStorageProducer};
use crate::sink::{DescriptorSink, MetricSet, SampleSink};

/// Default timeout for upstream API requests.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Outcome bookkeeping across collection passes.
#[derive(Debug, Clone, Default)]
pub struct ScrapeStats {
    /// Total passes run.
    pub passes_total: u64,
    /// Passes in which a producer failed.
    pub passes_failed: u64,
    /// Outcome of the most recent pass, if any.
    pub last_success: Option<bool>,
    /// Duration of the most recent pass.
    pub last_duration: Duration,
}

enum ProducerOption {
    Cdn,
    ObjectStorage,
    Custom(Box<dyn Producer>),
}

/// Builder for [`Collector`].
///
/// Producers are registered in the order their options are applied. The
/// resulting list is fixed once [`build`](Self::build) returns.
pub struct CollectorBuilder {
    token: String,
    api_url: String,
    report_period: String,
    timeout: Duration,
    options: Vec<ProducerOption>,
}

impl CollectorBuilder {
    fn new(config: &ExporterConfig) -> Self {
        Self {
            token: config.token.clone(),
            api_url: config.api.url.clone(),
            report_period: config.api.report_period.clone(),
            timeout: DEFAULT_TIMEOUT,
            options: Vec::new(),
        }
    }

    /// Enable CDN metrics.
    pub fn with_cdn(mut self) -> Self {
        self.options.push(ProducerOption::Cdn);
        self
    }

    /// Enable Object Storage metrics.
    pub fn with_object_storage(mut self) -> Self {
        self.options.push(ProducerOption::ObjectStorage);
        self
    }

    /// Register an arbitrary producer.
    pub fn with_producer(mut self, producer: Box<dyn Producer>) -> Self {
        self.options.push(ProducerOption::Custom(producer));
        self
    }

    /// Set the timeout for upstream API requests.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Apply the product switches from the configuration.
    pub fn with_products(self, config: &ExporterConfig) -> Self {
        let mut builder = self;
        if config.products.cdn {
            builder = builder.with_cdn();
        }
        if config.products.object_storage {
            builder = builder.with_object_storage();
        }
        builder
    }

    /// Build the collector, constructing producers in registration order.
    pub fn build(self) -> Result<Collector> {
        info!("Setting up collector for products");

        let client = ApiClient::new(&self.api_url, self.timeout)?;

        let producers: Vec<Box<dyn Producer>> = self
            .options
            .into_iter()
            .map(|option| -> Box<dyn Producer> {
                match option {
                    ProducerOption::Cdn => {
                        Box::new(CdnProducer::new(client.clone(), self.report_period.clone()))
                    }
                    ProducerOption::ObjectStorage => {
                        Box::new(ObjectStorageProducer::new(client.clone()))
                    }
                    ProducerOption::Custom(producer) => producer,
                }
            })
            .collect();

        for producer in &producers {
            info!(producer = producer.name(), "Registered producer");
        }

        Ok(Collector {
            producers,
            timeout: self.timeout,
            token: self.token,
            stats: RwLock::new(ScrapeStats::default()),
        })
    }
}

/// Runs all registered producers under one timing and success envelope.
pub struct Collector {
    producers: Vec<Box<dyn Producer>>,
    timeout: Duration,
    token: String,
    stats: RwLock<ScrapeStats>,
}

impl Collector {
    /// Start building a collector from the base configuration.
    pub fn builder(config: &ExporterConfig) -> CollectorBuilder {
        CollectorBuilder::new(config)
    }

    /// Emit the meta-metric descriptors, then every producer's descriptors.
    pub fn describe(&self, sink: &mut dyn DescriptorSink) {
        sink.describe(Arc::clone(scrape_duration_desc()));
        sink.describe(Arc::clone(scrape_success_desc()));

        for producer in &self.producers {
            for desc in producer.describe() {
                sink.describe(desc);
            }
        }
    }

    /// Collect the descriptors into a vector.
    pub fn descriptors(&self) -> Vec<Arc<Desc>> {
        let mut descs = Vec::new();
        self.describe(&mut descs);
        descs
    }

    /// Run one collection pass, writing samples into `sink`.
    ///
    /// Producers run in registration order. The first failing producer ends
    /// the pass: its earlier samples and those of the producers before it
    /// are kept, and the producers after it are skipped. The duration and
    /// success meta-metrics are emitted in every case.
    pub async fn collect(&self, sink: &mut dyn SampleSink) {
        let begin = Instant::now();

        let result = {
            let mut ctx = CollectionContext::new(&mut *sink, &self.token);
            self.collect_producers(&mut ctx).await
        };

        let duration = begin.elapsed();
        let success = match &result {
            Ok(()) => {
                debug!(
                    duration_secs = duration.as_secs_f64(),
                    "OK: collector succeeded"
                );
                1.0
            }
            Err(e) => {
                error!(
                    duration_secs = duration.as_secs_f64(),
                    error = %e,
                    "ERROR: collector failed"
                );
                0.0
            }
        };

        sink.emit(meta_sample(scrape_duration_desc(), duration.as_secs_f64()));
        sink.emit(meta_sample(scrape_success_desc(), success));

        let mut stats = self.stats.write();
        stats.passes_total += 1;
        if result.is_err() {
            stats.passes_failed += 1;
        }
        stats.last_success = Some(result.is_ok());
        stats.last_duration = duration;
    }

    async fn collect_producers(
        &self,
        ctx: &mut CollectionContext<'_>,
    ) -> std::result::Result<(), CollectError> {
        for producer in &self.producers {
            debug!(producer = producer.name(), "Collecting");
            producer.collect(ctx).await?;
        }
        Ok(())
    }

    /// Run one collection pass into a fresh buffer.
    pub async fn scrape(&self) -> MetricSet {
        let mut set = MetricSet::new();
        self.collect(&mut set).await;
        set
    }

    /// Names of the registered producers, in order.
    pub fn producer_names(&self) -> Vec<&'static str> {
        self.producers.iter().map(|p| p.name()).collect()
    }

    /// Timeout applied to upstream API requests.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    /// Get collection statistics.
    pub fn stats(&self) -> ScrapeStats {
        self.stats.read().clone()
    }
}

/// Create a shareable collector handle.
pub type SharedCollector = Arc<Collector>;

fn meta_sample(desc: &Arc<Desc>, value: f64) -> Sample {
    // Meta descriptors carry no labels, so this cannot fail
    match Sample::new(desc, ValueType::Gauge, value, &[]) {
        Ok(sample) => sample,
        Err(e) => unreachable!("meta-metric {} rejected: {}", desc.fq_name(), e),
    }
}
