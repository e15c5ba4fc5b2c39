//! Order Repository
//!
//! Read side of the order domain: listings, the full order graph and the
//! daily summary. Writes that must be transactional (creation, status
//! changes) live in [`crate::orders`].

use sqlx::SqlitePool;

use super::RepoResult;
use crate::db::models::{
    Order, OrderDetail, OrderItem, OrderItemModifier, OrderItemWithModifiers, OrderListEntry,
    OrderListQuery, OrderSummaryRow, Payment,
};

#[derive(Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// List orders in an organization, newest first, with line counts.
    pub async fn find_all(
        &self,
        organization_id: &str,
        query: &OrderListQuery,
    ) -> RepoResult<Vec<OrderListEntry>> {
        let mut sql = String::from("SELECT * FROM orders WHERE organization_id = ?");
        if query.status.is_some() {
            sql.push_str(" AND status = ?");
        }
        if query.table_id.is_some() {
            sql.push_str(" AND table_id = ?");
        }
        if query.waiter_id.is_some() {
            sql.push_str(" AND waiter_id = ?");
        }
        if query.date.is_some() {
            sql.push_str(" AND date(created_at) = ?");
        }
        sql.push_str(" ORDER BY created_at DESC");

        let mut q = sqlx::query_as::<_, Order>(&sql).bind(organization_id);
        if let Some(status) = query.status {
            q = q.bind(status);
        }
        if let Some(table_id) = &query.table_id {
            q = q.bind(table_id);
        }
        if let Some(waiter_id) = &query.waiter_id {
            q = q.bind(waiter_id);
        }
        if let Some(date) = &query.date {
            q = q.bind(date);
        }

        let orders = q.fetch_all(&self.pool).await?;

        let mut entries = Vec::with_capacity(orders.len());
        for order in orders {
            let (item_count,): (i64,) =
                sqlx::query_as("SELECT COUNT(*) FROM order_items WHERE order_id = ?")
                    .bind(&order.id)
                    .fetch_one(&self.pool)
                    .await?;
            entries.push(OrderListEntry { order, item_count });
        }
        Ok(entries)
    }

    pub async fn find_by_id(&self, organization_id: &str, id: &str) -> RepoResult<Option<Order>> {
        let order = sqlx::query_as::<_, Order>(
            "SELECT * FROM orders WHERE id = ? AND organization_id = ?",
        )
        .bind(id)
        .bind(organization_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(order)
    }

    /// Full order graph: lines with product names and modifiers, payments.
    pub async fn find_detail(
        &self,
        organization_id: &str,
        id: &str,
    ) -> RepoResult<Option<OrderDetail>> {
        let Some(order) = self.find_by_id(organization_id, id).await? else {
            return Ok(None);
        };
        let detail = self.load_detail(order).await?;
        Ok(Some(detail))
    }

    /// Assemble the detail graph for an already-fetched order row.
    pub async fn load_detail(&self, order: Order) -> RepoResult<OrderDetail> {
        let rows = sqlx::query_as::<_, OrderItem>(
            "SELECT * FROM order_items WHERE order_id = ? ORDER BY created_at",
        )
        .bind(&order.id)
        .fetch_all(&self.pool)
        .await?;

        let mut items = Vec::with_capacity(rows.len());
        for item in rows {
            let (product_name,): (String,) =
                sqlx::query_as("SELECT name FROM products WHERE id = ?")
                    .bind(&item.product_id)
                    .fetch_one(&self.pool)
                    .await?;
            let modifiers = sqlx::query_as::<_, OrderItemModifier>(
                "SELECT * FROM order_item_modifiers WHERE order_item_id = ?",
            )
            .bind(&item.id)
            .fetch_all(&self.pool)
            .await?;
            items.push(OrderItemWithModifiers {
                item,
                product_name,
                modifiers,
            });
        }

        let payments = sqlx::query_as::<_, Payment>(
            "SELECT * FROM payments WHERE order_id = ? ORDER BY processed_at",
        )
        .bind(&order.id)
        .fetch_all(&self.pool)
        .await?;

        Ok(OrderDetail {
            order,
            items,
            payments,
        })
    }

    /// Per-status counts and totals for one day (defaults to today).
    pub async fn daily_summary(
        &self,
        organization_id: &str,
        date: &str,
    ) -> RepoResult<Vec<OrderSummaryRow>> {
        let rows = sqlx::query_as::<_, OrderSummaryRow>(
            "SELECT status, COUNT(*) AS order_count, COALESCE(SUM(total_amount), 0) AS total_amount \
             FROM orders WHERE organization_id = ? AND date(created_at) = ? \
             GROUP BY status ORDER BY status",
        )
        .bind(organization_id)
        .bind(date)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
