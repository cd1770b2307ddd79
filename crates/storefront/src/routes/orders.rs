//! Order history route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Path, State};
use chrono::{DateTime, Utc};
use threadline_core::OrderId;
use threadline_core::models::order::partition_by_progress;
use threadline_core::models::{Order, OrderItem};
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::{PageContext, RequireCustomer};
use crate::state::AppState;

fn format_date(at: DateTime<Utc>) -> String {
    at.format("%B %-d, %Y").to_string()
}

/// Order row in the history lists.
#[derive(Debug, Clone)]
pub struct OrderSummaryView {
    pub id: String,
    pub status: &'static str,
    pub status_slug: &'static str,
    pub placed_on: String,
    pub total: String,
    pub item_count: u32,
}

impl From<&Order> for OrderSummaryView {
    fn from(order: &Order) -> Self {
        Self {
            id: order.order_id.to_string(),
            status: order.status.label(),
            status_slug: order.status.slug(),
            placed_on: format_date(order.created_at),
            total: order.total().display(),
            item_count: order.items.iter().map(|item| item.quantity).sum(),
        }
    }
}

/// Order line display data.
#[derive(Debug, Clone)]
pub struct OrderLineView {
    pub variant_id: String,
    pub name: String,
    pub quantity: u32,
    pub price: String,
    pub line_total: String,
}

impl From<&OrderItem> for OrderLineView {
    fn from(item: &OrderItem) -> Self {
        Self {
            variant_id: item.variant_id.to_string(),
            name: item.variant_name.clone(),
            quantity: item.quantity,
            price: item.price_at_purchase.display(),
            line_total: item.line_total().display(),
        }
    }
}

/// Single order display data.
#[derive(Debug, Clone)]
pub struct OrderDetailView {
    pub summary: OrderSummaryView,
    pub estimated_arrival: String,
    /// Arrival estimate only applies while the order is moving.
    pub in_progress: bool,
    pub lines: Vec<OrderLineView>,
}

impl From<&Order> for OrderDetailView {
    fn from(order: &Order) -> Self {
        Self {
            summary: OrderSummaryView::from(order),
            estimated_arrival: format_date(order.estimated_arrival()),
            in_progress: order.status.is_open(),
            lines: order.items.iter().map(OrderLineView::from).collect(),
        }
    }
}

/// Order history page template.
#[derive(Template, WebTemplate)]
#[template(path = "orders/index.html")]
pub struct OrdersTemplate {
    pub page: PageContext,
    pub open: Vec<OrderSummaryView>,
    pub completed: Vec<OrderSummaryView>,
}

/// Order detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "orders/show.html")]
pub struct OrderShowTemplate {
    pub page: PageContext,
    pub order: OrderDetailView,
}

/// Split orders into open and completed lists, newest first.
#[must_use]
pub fn split_orders(mut orders: Vec<Order>) -> (Vec<OrderSummaryView>, Vec<OrderSummaryView>) {
    orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    let (open, completed) = partition_by_progress(orders);
    (
        open.iter().map(OrderSummaryView::from).collect(),
        completed.iter().map(OrderSummaryView::from).collect(),
    )
}

/// Display the customer's orders.
#[instrument(skip(state, customer, page))]
pub async fn index(
    State(state): State<AppState>,
    RequireCustomer(customer): RequireCustomer,
    page: PageContext,
) -> Result<OrdersTemplate> {
    let orders = state
        .backend_for(&customer)
        .orders_for_user(&customer.user_id)
        .await?;

    let (open, completed) = split_orders(orders);
    Ok(OrdersTemplate {
        page,
        open,
        completed,
    })
}

/// Display one order. Orders belonging to someone else are reported missing.
#[instrument(skip(state, customer, page), fields(order_id = %id))]
pub async fn show(
    State(state): State<AppState>,
    RequireCustomer(customer): RequireCustomer,
    page: PageContext,
    Path(id): Path<String>,
) -> Result<OrderShowTemplate> {
    let order = state
        .backend_for(&customer)
        .get_order(&OrderId::new(id.clone()))
        .await?;

    if order.user_id != customer.user_id {
        tracing::warn!(order_id = %id, "Order requested by another customer");
        return Err(AppError::NotFound(format!("order {id}")));
    }

    Ok(OrderShowTemplate {
        page,
        order: OrderDetailView::from(&order),
    })
}
