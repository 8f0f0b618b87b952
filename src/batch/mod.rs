//! # Batched Fetch Module
//!
//! Splits an unbounded list of identifiers into fixed-size batches, issues
//! one request per batch concurrently and merges the results in batch order.
//!
//! ## Key Components
//!
//! | Component | Description |
//! |-----------|-------------|
//! | [`partition`] | Order-preserving split into batches of at most N items |
//! | [`BatchFetcher`] | Partition, dispatch, classify and aggregate |
//! | [`Classification`] | Per-response verdict: records, empty or failed |
//! | [`FetchError`] | Invalid batch size, or failed batches with every outcome |
//!
//! ## Example
//!
//! ```rust
//! use oms_client::batch::{BatchFetcher, Classification};
//!
//! # tokio_test::block_on(async {
//! let ids: Vec<String> = (0..45).map(|i| format!("SHIP_{}", i)).collect();
//! let records = BatchFetcher::new(20)
//!     .fetch_all(
//!         ids,
//!         |batch: &[String]| batch.to_vec(),
//!         |request: Vec<String>| async move { Ok::<_, String>(request) },
//!         |response: &Vec<String>| Classification::Records(response.clone()),
//!     )
//!     .await
//!     .unwrap();
//! assert_eq!(records.len(), 45);
//! # });
//! ```
//!
//! Any failed batch fails the whole fetch; no partial result is returned.
//! Bounding concurrency is opt-in via [`BatchFetcherConfig::with_max_concurrency`].

mod fetcher;
mod partition;

pub use fetcher::{
    fetch_all, BatchFailure, BatchFetcher, BatchFetcherConfig, Classification, FetchError,
};
pub use partition::{batch_count, partition};
