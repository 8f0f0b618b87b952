//! # oms-client
//!
//! Async client for an order-management backend, as used by store
//! fulfillment apps: order queries, shipment updates, item rejection,
//! pick lists, and batched shipment-item lookups.
//!
//! ## Overview
//!
//! Every backend call goes through one seam, [`transport::Dispatch`], which
//! turns an [`transport::ApiRequest`] into an [`transport::ApiResponse`].
//! [`orders::OrderService`] maps each business operation onto a request and
//! hands the response back untouched. The one operation with real logic is
//! the batched fetch in [`batch`]: ids are split into fixed-size chunks,
//! requested concurrently, and merged in chunk order. The backend's
//! `"No record found"` reply counts as an empty chunk, and any other failure
//! fails the whole fetch.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use oms_client::{ClientConfig, OrderService};
//!
//! #[tokio::main]
//! async fn main() -> oms_client::Result<()> {
//!     let config = ClientConfig::new("demo").with_token("api-token");
//!     let service = OrderService::from_config(&config)?;
//!
//!     let items = service
//!         .get_shipment_items(vec!["SHIP_1".into(), "SHIP_2".into()])
//!         .await?;
//!     println!("{} items", items.len());
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`batch`] | Partitioning and the batched aggregate fetcher |
//! | [`orders`] | Order service operations and domain types |
//! | [`transport`] | Request/response model, `Dispatch` seam, HTTP transport |
//! | [`cache`] | Response caching with pluggable backends |
//! | [`config`] | Client configuration and instance URL resolution |
//! | [`notify`] | Loader and toast side effects for presentation helpers |

pub mod batch;
pub mod cache;
pub mod config;
pub mod notify;
pub mod orders;
pub mod transport;

// Re-export main types for convenience
pub use config::ClientConfig;
pub use notify::{UiEvent, UiSink};
pub use orders::{OrderService, RejectItemPayload, ShipmentItem};
pub use transport::{ApiRequest, ApiResponse, Dispatch, HttpTransport};

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the library
pub mod error;
pub use error::{Error, ErrorContext};
