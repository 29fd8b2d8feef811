//! Object Storage usage producer.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::client::ApiClient;
use crate::context::CollectionContext;
use crate::error::CollectError;
use crate::metrics::{Desc, NAMESPACE, build_fq_name};
use crate::producer::Producer;

const SUBSYSTEM: &str = "object_storage";

#[derive(Debug, Deserialize)]
struct BucketList {
    data: Vec<Bucket>,
}

#[derive(Debug, Deserialize)]
struct Bucket {
    name: String,
    #[serde(default)]
    region: String,
    /// Stored bytes.
    #[serde(default)]
    size: f64,
    #[serde(default)]
    objects_count: f64,
}

/// Collects per-bucket size and object counts.
pub struct ObjectStorageProducer {
    client: ApiClient,
    buckets: Arc<Desc>,
    bucket_size: Arc<Desc>,
    bucket_objects: Arc<Desc>,
}

impl ObjectStorageProducer {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            buckets: Desc::new(
                build_fq_name(NAMESPACE, SUBSYSTEM, "buckets"),
                "Number of Object Storage buckets",
                &[],
            ),
            bucket_size: Desc::new(
                build_fq_name(NAMESPACE, SUBSYSTEM, "bucket_size_bytes"),
                "Bytes stored in the bucket",
                &["bucket", "region"],
            ),
            bucket_objects: Desc::new(
                build_fq_name(NAMESPACE, SUBSYSTEM, "bucket_objects"),
                "Number of objects stored in the bucket",
                &["bucket", "region"],
            ),
        }
    }
}

#[async_trait]
impl Producer for ObjectStorageProducer {
    fn name(&self) -> &'static str {
        "object_storage"
    }

    fn describe(&self) -> Vec<Arc<Desc>> {
        vec![
            Arc::clone(&self.buckets),
            Arc::clone(&self.bucket_size),
            Arc::clone(&self.bucket_objects),
        ]
    }

    async fn collect(&self, ctx: &mut CollectionContext<'_>) -> Result<(), CollectError> {
        let list: BucketList = self.client.get_json("/obs/1.0/buckets", ctx.token()).await?;

        ctx.gauge(&self.buckets, list.data.len() as f64, &[])?;

        for bucket in &list.data {
            let labels = [bucket.name.as_str(), bucket.region.as_str()];
            ctx.gauge(&self.bucket_size, bucket.size, &labels)?;
            ctx.gauge(&self.bucket_objects, bucket.objects_count, &labels)?;
        }

        debug!(buckets = list.data.len(), "Collected Object Storage metrics");
        Ok(())
    }
}
