//! Batched aggregate fetcher.

use super::partition::partition;
use futures::stream::{self, StreamExt};
use std::future::Future;

/// How a single batch response contributes to the aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification<R> {
    /// Success carrying zero or more records.
    Records(Vec<R>),
    /// The backend reported "no matching records"; contributes nothing.
    Empty,
    /// Any other error condition. Fails the whole fetch.
    Failed(String),
}

/// A failed batch: its position in dispatch order and why it failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchFailure {
    pub index: usize,
    pub reason: String,
}

impl BatchFailure {
    pub fn new(index: usize, reason: impl Into<String>) -> Self {
        Self {
            index,
            reason: reason.into(),
        }
    }
}

#[derive(Debug)]
pub enum FetchError<Resp, E> {
    /// `max_batch_size` was zero. Nothing was dispatched.
    InvalidBatchSize(usize),
    /// At least one batch failed. `outcomes` holds every batch's outcome in
    /// batch order; no records are returned.
    PartialFailure {
        failed: Vec<BatchFailure>,
        outcomes: Vec<Result<Resp, E>>,
    },
}

impl<Resp, E> FetchError<Resp, E> {
    pub fn failed(&self) -> &[BatchFailure] {
        match self {
            FetchError::InvalidBatchSize(_) => &[],
            FetchError::PartialFailure { failed, .. } => failed,
        }
    }
}

impl<Resp, E> std::fmt::Display for FetchError<Resp, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchError::InvalidBatchSize(size) => {
                write!(f, "max batch size must be positive, got {}", size)
            }
            FetchError::PartialFailure { failed, outcomes } => write!(
                f,
                "{} of {} batches failed",
                failed.len(),
                outcomes.len()
            ),
        }
    }
}

impl<Resp, E> std::error::Error for FetchError<Resp, E>
where
    Resp: std::fmt::Debug,
    E: std::fmt::Debug,
{
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchFetcherConfig {
    pub max_batch_size: usize,
    /// Cap on in-flight batch requests. `None` dispatches every batch at once.
    pub max_concurrency: Option<usize>,
}

impl BatchFetcherConfig {
    pub fn new(max_batch_size: usize) -> Self {
        Self {
            max_batch_size,
            max_concurrency: None,
        }
    }
    pub fn with_max_concurrency(mut self, n: usize) -> Self {
        self.max_concurrency = Some(n.max(1));
        self
    }
}

/// Splits identifiers into batches, dispatches one request per batch
/// concurrently and concatenates the records in batch order.
///
/// The fetcher holds no state between calls and may be shared freely.
#[derive(Debug, Clone, Copy)]
pub struct BatchFetcher {
    config: BatchFetcherConfig,
}

impl BatchFetcher {
    pub fn new(max_batch_size: usize) -> Self {
        Self {
            config: BatchFetcherConfig::new(max_batch_size),
        }
    }
    pub fn with_config(config: BatchFetcherConfig) -> Self {
        Self { config }
    }
    pub fn config(&self) -> &BatchFetcherConfig {
        &self.config
    }

    /// Fetch records for all `identifiers`.
    ///
    /// `build_request` turns a batch into a request, `dispatch` performs it and
    /// `classify` decides what each response contributes. Transport errors
    /// returned by `dispatch` count as failures of their batch. Sibling
    /// requests always run to completion so every failure is reported.
    pub async fn fetch_all<Id, Req, Resp, Rec, E, B, D, Fut, C>(
        &self,
        identifiers: Vec<Id>,
        build_request: B,
        dispatch: D,
        classify: C,
    ) -> Result<Vec<Rec>, FetchError<Resp, E>>
    where
        B: Fn(&[Id]) -> Req,
        D: Fn(Req) -> Fut,
        Fut: Future<Output = Result<Resp, E>>,
        C: Fn(&Resp) -> Classification<Rec>,
        E: std::fmt::Display,
    {
        let batches = partition(identifiers, self.config.max_batch_size)
            .ok_or(FetchError::InvalidBatchSize(self.config.max_batch_size))?;
        if batches.is_empty() {
            return Ok(Vec::new());
        }

        let requests: Vec<Req> = batches.iter().map(|b| build_request(b.as_slice())).collect();
        let in_flight = requests.into_iter().map(|r| dispatch(r));

        // Both paths yield outcomes in batch order, whatever the completion order.
        let outcomes: Vec<Result<Resp, E>> = match self.config.max_concurrency {
            None => futures::future::join_all(in_flight).await,
            Some(n) => stream::iter(in_flight).buffered(n).collect().await,
        };

        let mut failed = Vec::new();
        let mut records = Vec::new();
        for (index, outcome) in outcomes.iter().enumerate() {
            match outcome {
                Ok(response) => match classify(response) {
                    Classification::Records(batch) => records.extend(batch),
                    Classification::Empty => {}
                    Classification::Failed(reason) => {
                        failed.push(BatchFailure::new(index, reason))
                    }
                },
                Err(e) => failed.push(BatchFailure::new(index, e.to_string())),
            }
        }

        if !failed.is_empty() {
            return Err(FetchError::PartialFailure { failed, outcomes });
        }
        Ok(records)
    }
}

/// One-shot form of [`BatchFetcher::fetch_all`].
pub async fn fetch_all<Id, Req, Resp, Rec, E, B, D, Fut, C>(
    identifiers: Vec<Id>,
    max_batch_size: usize,
    build_request: B,
    dispatch: D,
    classify: C,
) -> Result<Vec<Rec>, FetchError<Resp, E>>
where
    B: Fn(&[Id]) -> Req,
    D: Fn(Req) -> Fut,
    Fut: Future<Output = Result<Resp, E>>,
    C: Fn(&Resp) -> Classification<Rec>,
    E: std::fmt::Display,
{
    BatchFetcher::new(max_batch_size)
        .fetch_all(identifiers, build_request, dispatch, classify)
        .await
}
