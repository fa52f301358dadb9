//! Plain-text rendering of orders and board state

use chrono::{DateTime, Utc};
use orderboard::{BoardState, Order, OrderStatus};

/// `"45s"`, `"12m"`, `"3h"`, `"2d"`
pub fn format_age(since: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let seconds = (now - since).num_seconds().max(0);
    match seconds {
        0..=59 => format!("{}s", seconds),
        60..=3599 => format!("{}m", seconds / 60),
        3600..=86399 => format!("{}h", seconds / 3600),
        _ => format!("{}d", seconds / 86400),
    }
}

/// One line per order, for list views
pub fn format_order_line(order: &Order, now: DateTime<Utc>) -> String {
    format!(
        "{:<6} {:<10} {:<20} {:>9} {:>3} items  {} ago",
        order.display_label(),
        order.status,
        truncate(&order.customer_name, 20),
        format!("${:.2}", order.total_amount),
        order.item_count(),
        format_age(order.created_at, now),
    )
}

/// Status line shown above the order list
pub fn format_board_header(state: &BoardState) -> String {
    let count = state.snapshot.as_ref().map_or(0, Vec::len);
    let mut line = format!(
        "[{}] {} orders, next poll in {:.1}s",
        state.status,
        count,
        state.current_interval.as_secs_f64()
    );

    if let Some(error) = &state.last_error {
        line.push_str(&format!(" (last error: {})", error));
    }
    line
}

/// Full multi-line description of one order
pub fn format_order_detail(order: &Order) -> String {
    let mut out = format!(
        "Order {} ({})\n  Status:   {}\n  Customer: {} ({})\n  Address:  {}\n  Created:  {}\n  Updated:  {}\n",
        order.display_label(),
        order.id,
        order.status,
        order.customer_name,
        order.customer_phone,
        order.delivery_address,
        order.created_at.to_rfc3339(),
        order.updated_at.to_rfc3339(),
    );

    if let Some(ready_at) = order.ready_at {
        out.push_str(&format!("  Ready:    {}\n", ready_at.to_rfc3339()));
    }
    if let Some(completed_at) = order.completed_at {
        out.push_str(&format!("  Done:     {}\n", completed_at.to_rfc3339()));
    }
    if let Some(note) = &order.special_instructions {
        out.push_str(&format!("  Note:     {}\n", note));
    }

    out.push_str("  Items:\n");
    for item in &order.items {
        out.push_str(&format!(
            "    {}x {} @ ${:.2}\n",
            item.quantity, item.name, item.price
        ));
        if let Some(note) = &item.special_instructions {
            out.push_str(&format!("       ({})\n", note));
        }
    }
    out.push_str(&format!("  Total:    ${:.2}\n", order.total_amount));
    out
}

/// Orders to show for an optional status filter, newest first
pub fn select_orders(orders: Vec<Order>, status: Option<&OrderStatus>) -> Vec<Order> {
    let mut selected: Vec<Order> = orders
        .into_iter()
        .filter(|order| status.map_or(true, |status| &order.status == status))
        .collect();
    selected.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    selected
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut short: String = text.chars().take(width.saturating_sub(1)).collect();
    short.push('…');
    short
}
