//! OrderBoard - self-refreshing view of the orders collection
//!
//! An `OrderBoard` owns one poll loop and one orders API client. The poll
//! loop keeps the collection fresh in the background; mutations go through the
//! API and then ask the loop to resynchronize right away.

use std::time::Duration;

use poll_scheduler::{ConnectionStatus, PollScheduler, PollState};
use sync_transport::{HttpClient, ReqwestClient, SyncTransport, DEFAULT_CONNECT_TIMEOUT};
use tokio::sync::watch;
use tracing::{debug, info};

use crate::api::OrdersApi;
use crate::config::DashboardConfig;
use crate::error::Result;
use crate::model::{NewOrder, Order, OrderStatus};

/// Read-only view published by the board
pub type BoardState = PollState<Vec<Order>>;

/// Live order board client
///
/// # Example
///
/// ```rust,no_run
/// use orderboard::{DashboardConfig, OrderBoard, OrderStatus};
///
/// # async fn demo() -> orderboard::Result<()> {
/// let board = OrderBoard::connect(DashboardConfig::from_env()?)?;
///
/// let mut updates = board.subscribe();
/// updates.changed().await.ok();
/// for order in board.orders() {
///     println!("{} {}", order.display_label(), order.status);
/// }
///
/// board.update_status("ORD-1714566600-4821", OrderStatus::Ready).await?;
/// # Ok(())
/// # }
/// ```
pub struct OrderBoard<C = ReqwestClient> {
    config: DashboardConfig,
    scheduler: PollScheduler<Vec<Order>>,
    api: OrdersApi<C>,
}

impl OrderBoard<ReqwestClient> {
    /// Start polling `config.base_url` with a reqwest client.
    ///
    /// Must be called from within a tokio runtime. The first fetch goes out
    /// immediately.
    pub fn connect(config: DashboardConfig) -> Result<Self> {
        let client = ReqwestClient::with_timeouts(DEFAULT_CONNECT_TIMEOUT, config.request_timeout)?;
        Self::with_client(config, client)
    }
}

impl<C> OrderBoard<C>
where
    C: HttpClient + Clone + 'static,
{
    /// Start polling with a caller-supplied HTTP client
    pub fn with_client(config: DashboardConfig, client: C) -> Result<Self> {
        config.validate()?;

        let transport: SyncTransport<Order, C> =
            SyncTransport::new(client.clone(), &config.base_url)?;
        let api = OrdersApi::new(client, &config.base_url)?;
        let scheduler = PollScheduler::start(config.poll.clone(), transport)?;

        info!(base_url = %config.base_url, "Order board connected");

        Ok(Self {
            config,
            scheduler,
            api,
        })
    }

    /// Change an order's status, then resynchronize the board immediately.
    ///
    /// The board is only refreshed when the server accepted the change.
    pub async fn update_status(&self, id: &str, status: OrderStatus) -> Result<Order> {
        let order = self.api.update_status(id, &status).await?;
        debug!(order_id = id, status = %order.status, "Status updated, refreshing board");
        self.scheduler.refresh();
        Ok(order)
    }

    /// Fetch a single order straight from the server
    pub async fn order(&self, id: &str) -> Result<Order> {
        Ok(self.api.get_order(id).await?)
    }

    /// Create an order, then resynchronize the board immediately
    pub async fn create_order(&self, order: &NewOrder) -> Result<Order> {
        let created = self.api.create_order(order).await?;
        self.scheduler.refresh();
        Ok(created)
    }

    pub fn api(&self) -> &OrdersApi<C> {
        &self.api
    }
}

impl<C> OrderBoard<C> {
    pub fn state(&self) -> BoardState {
        self.scheduler.state()
    }

    /// Receiver that wakes on every poll transition
    pub fn subscribe(&self) -> watch::Receiver<BoardState> {
        self.scheduler.subscribe()
    }

    /// Orders from the last successful fetch; empty until one arrives
    pub fn orders(&self) -> Vec<Order> {
        self.scheduler.snapshot().unwrap_or_default()
    }

    /// Orders in the current snapshot with the given status
    pub fn orders_with_status(&self, status: &OrderStatus) -> Vec<Order> {
        self.orders()
            .into_iter()
            .filter(|order| &order.status == status)
            .collect()
    }

    /// Look up an order in the current snapshot without a request
    pub fn find_order(&self, id: &str) -> Option<Order> {
        self.orders().into_iter().find(|order| order.id == id)
    }

    pub fn status(&self) -> ConnectionStatus {
        self.scheduler.status()
    }

    pub fn current_interval(&self) -> Duration {
        self.scheduler.current_interval()
    }

    pub fn is_loading(&self) -> bool {
        self.scheduler.is_loading()
    }

    pub fn last_error(&self) -> Option<String> {
        self.scheduler.state().last_error
    }

    /// Skip the pending wait and fetch now
    pub fn refresh(&self) {
        self.scheduler.refresh();
    }

    /// Stop polling; the last snapshot stays readable
    pub fn stop(&self) {
        self.scheduler.stop();
    }

    /// Stop polling and wait for the loop to finish
    pub async fn shutdown(self) -> Result<()> {
        Ok(self.scheduler.shutdown().await?)
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }
}

impl<C> std::fmt::Debug for OrderBoard<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderBoard")
            .field("base_url", &self.config.base_url)
            .field("scheduler", &self.scheduler)
            .finish()
    }
}
