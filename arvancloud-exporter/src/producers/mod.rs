//! Concrete producers, one per Arvancloud product.
//!
//! Each producer owns a clone of the shared [`ApiClient`](crate::client::ApiClient)
//! and a fixed set of descriptors built at construction.

pub mod cdn;
pub mod object_storage;

pub use cdn::CdnProducer;
pub use object_storage::ObjectStorageProducer;
