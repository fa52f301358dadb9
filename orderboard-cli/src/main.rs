use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use orderboard::logging::{self, LoggingMode};
use orderboard::{ConnectionStatus, DashboardConfig, OrderBoard, OrderStatus, OrdersApi};
use tracing::{debug, info, warn};

mod render;

/// Order board terminal client
///
/// Watches the orders collection with adaptive polling, or performs one-shot
/// order operations. Connection settings come from ORDERBOARD_* environment
/// variables and can be overridden with flags.
#[derive(Parser, Debug)]
#[command(name = "orderboard")]
#[command(about = "Terminal client for the restaurant order board")]
#[command(version)]
pub struct Cli {
    /// API base URL (env: ORDERBOARD_API_URL)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Interval after a change, in milliseconds (env: ORDERBOARD_BASE_INTERVAL_MS)
    #[arg(long, global = true)]
    pub base_interval_ms: Option<u64>,

    /// Backoff ceiling, in milliseconds (env: ORDERBOARD_MAX_INTERVAL_MS)
    #[arg(long, global = true)]
    pub max_interval_ms: Option<u64>,

    /// Interval growth per unchanged response (env: ORDERBOARD_BACKOFF_MULTIPLIER)
    #[arg(long, global = true)]
    pub backoff_multiplier: Option<f64>,

    /// Request timeout in seconds
    #[arg(long, global = true, default_value = "10")]
    pub timeout: u64,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Keep printing the board as it changes, until Ctrl+C
    Watch {
        /// Only show orders with this status
        #[arg(long)]
        status: Option<OrderStatus>,
    },
    /// Print the current orders once
    List {
        /// Only show orders with this status
        #[arg(long)]
        status: Option<OrderStatus>,
    },
    /// Change the status of an order
    SetStatus {
        id: String,
        status: OrderStatus,
    },
    /// Print one order in full
    Show { id: String },
}

impl Cli {
    /// Validate command line arguments
    pub fn validate(&self) -> Result<()> {
        match self.log_level.to_lowercase().as_str() {
            "error" | "warn" | "info" | "debug" | "trace" => {}
            _ => bail!(
                "Invalid log level '{}'. Valid levels: error, warn, info, debug, trace",
                self.log_level
            ),
        }

        if self.timeout == 0 {
            bail!("Timeout must be positive");
        }

        if let Command::SetStatus { id, .. } | Command::Show { id } = &self.command {
            if id.trim().is_empty() {
                bail!("Order id must not be empty");
            }
        }

        Ok(())
    }

    /// Environment configuration with command line overrides applied
    pub fn dashboard_config(&self) -> Result<DashboardConfig> {
        let mut config = DashboardConfig::from_env().context("Invalid ORDERBOARD_* environment")?;

        if let Some(url) = &self.api_url {
            config.base_url = url.clone();
        }
        if let Some(ms) = self.base_interval_ms {
            config.poll.base_interval = Duration::from_millis(ms);
        }
        if let Some(ms) = self.max_interval_ms {
            config.poll.max_interval = Duration::from_millis(ms);
        }
        if let Some(multiplier) = self.backoff_multiplier {
            config.poll.backoff_multiplier = multiplier;
        }
        config.request_timeout = Duration::from_secs(self.timeout);

        config.validate().context("Invalid configuration")?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    cli.validate()?;

    logging::init_logging_with_filter(LoggingMode::Development, &cli.log_level.to_lowercase())
        .context("Failed to initialize logging")?;

    let config = cli.dashboard_config()?;
    debug!(?config, "Resolved configuration");

    match cli.command {
        Command::Watch { status } => watch(config, status).await,
        Command::List { status } => list(config, status).await,
        Command::SetStatus { id, status } => set_status(config, &id, status).await,
        Command::Show { id } => show(config, &id).await,
    }
}

async fn watch(config: DashboardConfig, filter: Option<OrderStatus>) -> Result<()> {
    let board = OrderBoard::connect(config).context("Failed to start order board")?;
    let mut updates = board.subscribe();
    info!("Watching orders, press Ctrl+C to stop");

    loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = updates.borrow_and_update().clone();
                if state.is_loading {
                    continue;
                }

                println!("{}", render::format_board_header(&state));
                let orders = render::select_orders(state.snapshot.unwrap_or_default(), filter.as_ref());
                let now = Utc::now();
                for order in &orders {
                    println!("  {}", render::format_order_line(order, now));
                }
                println!();
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Shutting down");
                break;
            }
        }
    }

    board.shutdown().await.context("Failed to stop poll loop")?;
    Ok(())
}

async fn list(config: DashboardConfig, filter: Option<OrderStatus>) -> Result<()> {
    let timeout = config.request_timeout + Duration::from_secs(1);
    let board = OrderBoard::connect(config).context("Failed to start order board")?;
    let mut updates = board.subscribe();

    let state = tokio::time::timeout(timeout, updates.wait_for(|state| !state.is_loading))
        .await
        .context("Timed out waiting for the first fetch")?
        .map_err(|_| anyhow!("Poll loop ended before the first fetch"))?
        .clone();

    board.shutdown().await.context("Failed to stop poll loop")?;

    if state.status == ConnectionStatus::Error {
        bail!(
            "Failed to fetch orders: {}",
            state.last_error.unwrap_or_else(|| "unknown error".to_string())
        );
    }

    let orders = render::select_orders(state.snapshot.unwrap_or_default(), filter.as_ref());
    if orders.is_empty() {
        println!("No orders");
    }
    let now = Utc::now();
    for order in &orders {
        println!("{}", render::format_order_line(order, now));
    }
    Ok(())
}

fn api(config: &DashboardConfig) -> Result<OrdersApi> {
    OrdersApi::from_config(config).context("Failed to create API client")
}

async fn set_status(config: DashboardConfig, id: &str, status: OrderStatus) -> Result<()> {
    if let OrderStatus::Other(value) = &status {
        warn!(status = %value, "Status is not one of the known order statuses");
    }

    let order = api(&config)?
        .update_status(id, &status)
        .await
        .with_context(|| format!("Failed to set order {} to {}", id, status))?;

    println!("{} is now {}", order.display_label(), order.status);
    Ok(())
}

async fn show(config: DashboardConfig, id: &str) -> Result<()> {
    let order = api(&config)?
        .get_order(id)
        .await
        .with_context(|| format!("Failed to fetch order {}", id))?;

    print!("{}", render::format_order_detail(&order));
    Ok(())
}
