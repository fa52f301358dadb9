//! # orderboard
//!
//! Client for a restaurant order board that keeps itself up to date without a
//! push channel.
//!
//! ```rust,no_run
//! use orderboard::{DashboardConfig, OrderBoard};
//!
//! #[tokio::main]
//! async fn main() -> orderboard::Result<()> {
//!     let board = OrderBoard::connect(DashboardConfig::default())?;
//!     let mut updates = board.subscribe();
//!
//!     while updates.changed().await.is_ok() {
//!         let state = updates.borrow().clone();
//!         println!(
//!             "{}: {} orders, next poll in {:?}",
//!             state.status,
//!             state.snapshot.as_ref().map_or(0, Vec::len),
//!             state.current_interval
//!         );
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! orderboard (OrderBoard, OrdersApi, Order model)
//!     ↓
//! poll-scheduler (adaptive interval, refresh/stop, watch channel)
//!     ↓
//! sync-transport (conditional GET, ETag / Last-Modified, outcome classification)
//! ```
//!
//! Polling starts at the base interval, backs off geometrically while the
//! server keeps answering `304 Not Modified`, and drops straight back to the
//! base interval as soon as anything changes or the caller mutates an order.

mod api;
mod board;
mod config;
mod error;
mod model;

pub mod logging;

pub use api::OrdersApi;
pub use board::{BoardState, OrderBoard};
pub use config::{
    DashboardConfig, DEFAULT_API_URL, ENV_API_URL, ENV_BACKOFF_MULTIPLIER, ENV_BASE_INTERVAL_MS,
    ENV_MAX_INTERVAL_MS,
};
pub use error::{ApiError, OrderBoardError, Result};
pub use model::{NewOrder, Order, OrderItem, OrderStatus};

pub use poll_scheduler::{ConnectionStatus, PollConfig};
pub use sync_transport::{HttpClient, ReqwestClient};
