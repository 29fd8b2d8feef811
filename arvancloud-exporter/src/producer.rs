//! The producer capability implemented by every product collector.

use std::sync::Arc;

use async_trait::async_trait;

use crate::context::CollectionContext;
use crate::error::CollectError;
use crate::metrics::Desc;

/// A unit that fetches usage data for one Arvancloud product and emits it
/// as metric samples.
///
/// Producers are registered on a [`CollectorBuilder`](crate::CollectorBuilder)
/// and invoked in registration order on every scrape.
#[async_trait]
pub trait Producer: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Every descriptor this producer may emit.
    ///
    /// Must not contact the upstream API and must return the same set on
    /// every call.
    fn describe(&self) -> Vec<Arc<Desc>>;

    /// Run one pass against the upstream API, writing samples into `ctx`.
    ///
    /// Samples written before an error stay written.
    async fn collect(&self, ctx: &mut CollectionContext<'_>) -> Result<(), CollectError>;
}
