//! 订单与菜品状态机
//!
//! 订单沿 `pending → confirmed → preparing → ready → served → paid`
//! 逐步推进，`cancelled` 可从任意非终态进入；菜品只能向前走
//! `pending → preparing → ready`。转移表在 [`shared::status`]，
//! 非法跳转返回 409。
//!
//! 桌台释放规则：订单到达 served 或 cancelled 时，若该桌已无其他
//! 未完结订单，桌台回到 available 并广播。

use chrono::Utc;
use shared::ErrorCode;
use shared::events::{OrderItemStatusChangedEvent, OrderStatusChangedEvent, TableStatusChangedEvent, event};
use shared::status::{OrderItemStatus, OrderStatus, TableStatus};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{Order, OrderItem};
use crate::utils::{AppError, AppResult};

/// 推进订单状态。
pub async fn update_order_status(
    state: &ServerState,
    user: &CurrentUser,
    order_id: &str,
    new_status: OrderStatus,
) -> AppResult<Order> {
    let order = fetch_order(state, &user.organization_id, order_id).await?;

    if !order.status.can_transition_to(new_status) {
        return Err(AppError::InvalidOrderTransition {
            from: order.status,
            to: new_status,
        });
    }

    let now = Utc::now();
    let timestamp_column = match new_status {
        OrderStatus::Confirmed => Some("confirmed_at"),
        OrderStatus::Ready => Some("ready_at"),
        OrderStatus::Served => Some("served_at"),
        OrderStatus::Cancelled => Some("cancelled_at"),
        _ => None,
    };

    match timestamp_column {
        Some(col) => {
            let sql =
                format!("UPDATE orders SET status = ?, {col} = ?, updated_at = ? WHERE id = ?");
            sqlx::query(&sql)
                .bind(new_status)
                .bind(now)
                .bind(now)
                .bind(order_id)
                .execute(&state.db)
                .await?;
        }
        None => {
            sqlx::query("UPDATE orders SET status = ?, updated_at = ? WHERE id = ?")
                .bind(new_status)
                .bind(now)
                .bind(order_id)
                .execute(&state.db)
                .await?;
        }
    }

    state
        .relay
        .emit_to_org(
            &user.organization_id,
            event::ORDER_STATUS_CHANGED,
            &OrderStatusChangedEvent {
                order_id: order.id.clone(),
                order_number: order.order_number.clone(),
                status: new_status,
                timestamp: now,
            },
        )
        .await;

    // 出餐时单独提醒下单的服务员
    if new_status == OrderStatus::Ready
        && let Some(waiter_id) = &order.waiter_id
    {
        state
            .relay
            .emit_to_user(
                waiter_id,
                event::ORDER_STATUS_CHANGED,
                &OrderStatusChangedEvent {
                    order_id: order.id.clone(),
                    order_number: order.order_number.clone(),
                    status: new_status,
                    timestamp: now,
                },
            )
            .await;
    }

    // served / cancelled 不再占桌
    if !new_status.is_active()
        && new_status != OrderStatus::Paid
        && let Some(table_id) = &order.table_id
    {
        release_table_if_idle(state, &user.organization_id, table_id).await?;
    }

    fetch_order(state, &user.organization_id, order_id).await
}

/// 推进一行菜品的状态 (REST 路径，订单 ID 已知)。
pub async fn update_order_item_status(
    state: &ServerState,
    user: &CurrentUser,
    order_id: &str,
    item_id: &str,
    new_status: OrderItemStatus,
) -> AppResult<OrderItem> {
    let order = fetch_order(state, &user.organization_id, order_id).await?;

    let item = sqlx::query_as::<_, OrderItem>(
        "SELECT * FROM order_items WHERE id = ? AND order_id = ?",
    )
    .bind(item_id)
    .bind(order_id)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| {
        AppError::not_found(
            ErrorCode::OrderItemNotFound,
            format!("Order item {} not found", item_id),
        )
    })?;

    apply_item_transition(state, user, &order, item, new_status).await
}

/// 推进一行菜品的状态 (Socket.IO 路径，按菜品 ID 反查订单)。
pub async fn update_item_status_by_item_id(
    state: &ServerState,
    user: &CurrentUser,
    item_id: &str,
    new_status: OrderItemStatus,
) -> AppResult<OrderItem> {
    let row = sqlx::query_as::<_, OrderItem>(
        "SELECT i.* FROM order_items i \
         JOIN orders o ON o.id = i.order_id \
         WHERE i.id = ? AND o.organization_id = ?",
    )
    .bind(item_id)
    .bind(&user.organization_id)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| {
        AppError::not_found(
            ErrorCode::OrderItemNotFound,
            format!("Order item {} not found", item_id),
        )
    })?;

    let order_id = row.order_id.clone();
    let order = fetch_order(state, &user.organization_id, &order_id).await?;
    apply_item_transition(state, user, &order, row, new_status).await
}

async fn apply_item_transition(
    state: &ServerState,
    user: &CurrentUser,
    order: &Order,
    item: OrderItem,
    new_status: OrderItemStatus,
) -> AppResult<OrderItem> {
    if !item.status.can_transition_to(new_status) {
        return Err(AppError::InvalidItemTransition {
            from: item.status,
            to: new_status,
        });
    }

    // 转移表只允许向前，新状态必然是 preparing 或 ready
    let now = Utc::now();
    let timestamp_column = match new_status {
        OrderItemStatus::Preparing => "started_at",
        _ => "completed_at",
    };
    let sql = format!("UPDATE order_items SET status = ?, {timestamp_column} = ? WHERE id = ?");
    sqlx::query(&sql)
        .bind(new_status)
        .bind(now)
        .bind(&item.id)
        .execute(&state.db)
        .await?;

    state
        .relay
        .emit_to_org(
            &user.organization_id,
            event::ORDER_ITEM_STATUS_CHANGED,
            &OrderItemStatusChangedEvent {
                order_item_id: item.id.clone(),
                order_id: order.id.clone(),
                order_number: order.order_number.clone(),
                table_id: order.table_id.clone(),
                status: new_status,
                timestamp: now,
            },
        )
        .await;

    // 最后一道菜就绪时整单自动置为 ready，并追加一条订单级广播
    if new_status == OrderItemStatus::Ready
        && matches!(order.status, OrderStatus::Confirmed | OrderStatus::Preparing)
    {
        let (unready,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM order_items WHERE order_id = ? AND status != 'ready'",
        )
        .bind(&order.id)
        .fetch_one(&state.db)
        .await?;

        if unready == 0 {
            sqlx::query("UPDATE orders SET status = 'ready', ready_at = ?, updated_at = ? WHERE id = ?")
                .bind(now)
                .bind(now)
                .bind(&order.id)
                .execute(&state.db)
                .await?;

            state
                .relay
                .emit_to_org(
                    &user.organization_id,
                    event::ORDER_STATUS_CHANGED,
                    &OrderStatusChangedEvent {
                        order_id: order.id.clone(),
                        order_number: order.order_number.clone(),
                        status: OrderStatus::Ready,
                        timestamp: now,
                    },
                )
                .await;

            if let Some(waiter_id) = &order.waiter_id {
                state
                    .relay
                    .emit_to_user(
                        waiter_id,
                        event::ORDER_STATUS_CHANGED,
                        &OrderStatusChangedEvent {
                            order_id: order.id.clone(),
                            order_number: order.order_number.clone(),
                            status: OrderStatus::Ready,
                            timestamp: now,
                        },
                    )
                    .await;
            }
        }
    }

    let updated = sqlx::query_as::<_, OrderItem>("SELECT * FROM order_items WHERE id = ?")
        .bind(&item.id)
        .fetch_one(&state.db)
        .await?;
    Ok(updated)
}

/// 桌上已无未完结订单时释放桌台并广播。
pub(crate) async fn release_table_if_idle(
    state: &ServerState,
    organization_id: &str,
    table_id: &str,
) -> AppResult<()> {
    let (active,): (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM orders WHERE table_id = ? \
         AND status NOT IN ('served', 'paid', 'cancelled')",
    )
    .bind(table_id)
    .fetch_one(&state.db)
    .await?;

    if active > 0 {
        return Ok(());
    }

    let table = sqlx::query_as::<_, crate::db::models::DiningTable>(
        "UPDATE dining_tables SET status = 'available' \
         WHERE id = ? AND organization_id = ? AND status != 'available' RETURNING *",
    )
    .bind(table_id)
    .bind(organization_id)
    .fetch_optional(&state.db)
    .await?;

    if let Some(t) = table {
        state
            .relay
            .emit_to_org(
                organization_id,
                event::TABLE_STATUS_CHANGED,
                &TableStatusChangedEvent {
                    table_id: t.id,
                    table_number: t.number,
                    status: TableStatus::Available,
                    timestamp: Utc::now(),
                },
            )
            .await;
    }
    Ok(())
}

pub(crate) async fn fetch_order(
    state: &ServerState,
    organization_id: &str,
    order_id: &str,
) -> AppResult<Order> {
    sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = ? AND organization_id = ?")
        .bind(order_id)
        .bind(organization_id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| {
            AppError::not_found(
                ErrorCode::OrderNotFound,
                format!("Order {} not found", order_id),
            )
        })
}
