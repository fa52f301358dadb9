//! Conditional-request transport for the orders collection
//!
//! This crate owns the cheap half of keeping a local copy of a remote
//! collection fresh: it remembers the `ETag` / `Last-Modified` validators of the
//! last changed response, sends them back as `If-None-Match` /
//! `If-Modified-Since`, and classifies each attempt as one of three outcomes:
//!
//! ```text
//! 304            -> FetchOutcome::Unchanged
//! 200 + JSON [ ] -> FetchOutcome::Updated { snapshot }
//! anything else  -> FetchOutcome::Failed { cause }
//! ```
//!
//! The HTTP call itself goes through the [`HttpClient`] trait so the transport
//! can run against `reqwest` ([`ReqwestClient`]) or a scripted client in tests.
//!
//! ```rust,no_run
//! use sync_transport::{FetchOutcome, ReqwestClient, SyncTransport};
//!
//! # async fn demo() -> Result<(), sync_transport::TransportError> {
//! let client = ReqwestClient::new()?;
//! let mut transport: SyncTransport<serde_json::Value> =
//!     SyncTransport::new(client, "http://localhost:8000/api")?;
//!
//! match transport.fetch(None).await {
//!     FetchOutcome::Updated { snapshot } => println!("{} orders", snapshot.len()),
//!     FetchOutcome::Unchanged => println!("nothing new"),
//!     FetchOutcome::Failed { cause } => eprintln!("fetch failed: {}", cause),
//! }
//! # Ok(())
//! # }
//! ```

mod error;
mod http;
mod outcome;
mod transport;
mod validators;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use error::{FetchError, TransportError};
pub use http::{
    HttpClient, HttpRequest, HttpResponse, Method, ReqwestClient, DEFAULT_CONNECT_TIMEOUT,
    DEFAULT_REQUEST_TIMEOUT,
};
pub use outcome::FetchOutcome;
pub use transport::{collection_url, Fetcher, SyncTransport, TransportStats, COLLECTION_PATH, SINCE_PARAM};
pub use validators::CacheValidators;
