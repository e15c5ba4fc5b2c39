//! 下单事务
//!
//! 一次下单在单个 SQLite 事务内完成：取号、商品校验、定价、写入
//! 订单图、占桌。任何一行商品不可用整单回滚，不留下半个订单。
//!
//! 定价全程使用 Decimal，见 [`super::money`]。

use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use shared::ErrorCode;
use shared::events::{NewOrderEvent, TableStatusChangedEvent, event};
use shared::status::{ProductStatus, TableStatus};
use sqlx::{Sqlite, Transaction};

use super::money;
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{CreateOrderRequest, OrderDetail, Product};
use crate::db::repository::{OrderRepository, OrganizationRepository, new_id};
use crate::utils::{AppError, AppResult};
use validator::Validate;

/// 无预计制作时间时的兜底 (分钟)
const DEFAULT_PREP_MINUTES: i64 = 15;

/// 提交一张新订单。
///
/// 成功后返回完整订单图，并向组织房间广播 `newOrder`；占用了桌台时
/// 追加一条 `tableStatusChanged`。
pub async fn create_order(
    state: &ServerState,
    user: &CurrentUser,
    req: CreateOrderRequest,
) -> AppResult<OrderDetail> {
    req.validate()?;

    let org = OrganizationRepository::new(state.db.clone())
        .find_by_id(&user.organization_id)
        .await?
        .ok_or_else(|| AppError::not_found(ErrorCode::NotFound, "Organization not found"))?;

    let mut tx = state.db.begin().await?;
    let now = Utc::now();

    // 桌台必须存在于本租户
    let table = match &req.table_id {
        Some(table_id) => {
            let table = sqlx::query_as::<_, crate::db::models::DiningTable>(
                "SELECT * FROM dining_tables WHERE id = ? AND organization_id = ?",
            )
            .bind(table_id)
            .bind(&user.organization_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| {
                AppError::not_found(
                    ErrorCode::TableNotFound,
                    format!("Table {} not found", table_id),
                )
            })?;
            Some(table)
        }
        None => None,
    };

    let order_number = next_order_number(&mut tx, &user.organization_id).await?;

    // 逐行定价
    let order_id = new_id();
    let mut subtotal = Decimal::ZERO;
    let mut max_prep_minutes: Option<i64> = None;
    let mut lines: Vec<PricedLine> = Vec::with_capacity(req.items.len());

    for item in &req.items {
        let product = sqlx::query_as::<_, Product>(
            "SELECT * FROM products WHERE id = ? AND organization_id = ?",
        )
        .bind(&item.product_id)
        .bind(&user.organization_id)
        .fetch_optional(&mut *tx)
        .await?
        // 不存在、不在本租户、已下架对下单方是同一回事
        .ok_or_else(|| {
            AppError::business(
                ErrorCode::ProductUnavailable,
                format!("Product {} is not available", item.product_id),
            )
        })?;

        if !product.is_active || product.status != ProductStatus::Available {
            return Err(AppError::business(
                ErrorCode::ProductUnavailable,
                format!("Product '{}' is not available", product.name),
            ));
        }

        if let Some(prep) = product.prep_time_minutes {
            max_prep_minutes = Some(max_prep_minutes.map_or(prep, |m| m.max(prep)));
        }

        let quantity = Decimal::from(item.quantity);
        let mut line_total = money::to_decimal(product.price) * quantity;

        // 修饰符选项必须属于该商品且可用
        let mut priced_modifiers = Vec::with_capacity(item.modifiers.len());
        for modifier in &item.modifiers {
            let option = sqlx::query_as::<_, ModifierOptionRow>(
                "SELECT o.id, o.name, o.price_adjustment, o.is_active, m.is_active AS group_active \
                 FROM modifier_options o \
                 JOIN product_modifiers m ON m.id = o.modifier_id \
                 WHERE o.id = ? AND m.product_id = ?",
            )
            .bind(&modifier.modifier_option_id)
            .bind(&item.product_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| {
                AppError::business(
                    ErrorCode::ModifierUnavailable,
                    format!(
                        "Modifier option {} is not available for product {}",
                        modifier.modifier_option_id, item.product_id
                    ),
                )
            })?;

            if !option.is_active || !option.group_active {
                return Err(AppError::business(
                    ErrorCode::ModifierUnavailable,
                    format!("Modifier option '{}' is not available", option.name),
                ));
            }
            if modifier.quantity < 1 {
                return Err(AppError::validation("Modifier quantity must be positive"));
            }

            // option adjustment applies per modifier unit, per line unit
            let modifier_total = money::to_decimal(option.price_adjustment)
                * Decimal::from(modifier.quantity)
                * quantity;
            line_total += modifier_total;

            priced_modifiers.push(PricedModifier {
                option_id: option.id,
                quantity: modifier.quantity,
                unit_price: option.price_adjustment,
                total: money::to_f64(modifier_total),
            });
        }

        subtotal += line_total;
        lines.push(PricedLine {
            product_id: product.id,
            quantity: item.quantity,
            unit_price: product.price,
            total: money::to_f64(line_total),
            notes: item.notes.clone(),
            modifiers: priced_modifiers,
        });
    }

    let totals = money::compute_totals(subtotal, org.tax_rate, org.service_charge_rate);
    let estimated_ready_time =
        now + Duration::minutes(max_prep_minutes.unwrap_or(DEFAULT_PREP_MINUTES));

    sqlx::query(
        "INSERT INTO orders \
         (id, organization_id, order_number, table_id, waiter_id, customer_name, guest_count, \
          status, subtotal, tax_amount, service_charge, total_amount, notes, \
          estimated_ready_time, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, 'pending', ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&order_id)
    .bind(&user.organization_id)
    .bind(&order_number)
    .bind(&req.table_id)
    .bind(&user.id)
    .bind(&req.customer_name)
    .bind(req.guest_count)
    .bind(totals.subtotal)
    .bind(totals.tax)
    .bind(totals.service_charge)
    .bind(totals.total)
    .bind(&req.notes)
    .bind(estimated_ready_time)
    .bind(now)
    .bind(now)
    .execute(&mut *tx)
    .await?;

    for line in &lines {
        let item_id = new_id();
        sqlx::query(
            "INSERT INTO order_items \
             (id, order_id, product_id, quantity, unit_price, total_price, status, notes, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, 'pending', ?, ?)",
        )
        .bind(&item_id)
        .bind(&order_id)
        .bind(&line.product_id)
        .bind(line.quantity)
        .bind(line.unit_price)
        .bind(line.total)
        .bind(&line.notes)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        for modifier in &line.modifiers {
            sqlx::query(
                "INSERT INTO order_item_modifiers \
                 (id, order_item_id, modifier_option_id, quantity, unit_price, total_price) \
                 VALUES (?, ?, ?, ?, ?, ?)",
            )
            .bind(new_id())
            .bind(&item_id)
            .bind(&modifier.option_id)
            .bind(modifier.quantity)
            .bind(modifier.unit_price)
            .bind(modifier.total)
            .execute(&mut *tx)
            .await?;
        }
    }

    // 同一事务内占桌
    let occupied_table = match &table {
        Some(t) if t.status != TableStatus::Occupied => {
            sqlx::query("UPDATE dining_tables SET status = 'occupied' WHERE id = ?")
                .bind(&t.id)
                .execute(&mut *tx)
                .await?;
            Some(t.clone())
        }
        _ => None,
    };

    tx.commit().await?;

    // 当日汇总已经过期
    state
        .cache
        .delete_prefix(&format!("orders_summary:{}:", user.organization_id));

    let detail = OrderRepository::new(state.db.clone())
        .find_detail(&user.organization_id, &order_id)
        .await?
        .ok_or_else(|| AppError::internal("Order vanished after commit"))?;

    // 提交之后才广播
    let order_json = serde_json::to_value(&detail)
        .map_err(|e| AppError::internal(format!("Order serialization failed: {e}")))?;
    state
        .relay
        .emit_to_org(
            &user.organization_id,
            event::NEW_ORDER,
            &NewOrderEvent {
                order: order_json,
                timestamp: now,
            },
        )
        .await;

    if let Some(t) = occupied_table {
        state
            .relay
            .emit_to_org(
                &user.organization_id,
                event::TABLE_STATUS_CHANGED,
                &TableStatusChangedEvent {
                    table_id: t.id,
                    table_number: t.number,
                    status: TableStatus::Occupied,
                    timestamp: now,
                },
            )
            .await;
    }

    tracing::info!(
        order_number = %order_number,
        total = totals.total,
        items = lines.len(),
        "Order created"
    );

    Ok(detail)
}

/// 组织内按天取号：`ORD-<YYYYMMDD>-<四位序号>`。
///
/// 计数器用 upsert 原子自增并在同一事务里读回，并发提交不会拿到
/// 相同的号。
async fn next_order_number(
    tx: &mut Transaction<'_, Sqlite>,
    organization_id: &str,
) -> AppResult<String> {
    let day = Utc::now().format("%Y%m%d").to_string();
    let (value,): (i64,) = sqlx::query_as(
        "INSERT INTO order_counters (organization_id, day, value) VALUES (?, ?, 1) \
         ON CONFLICT (organization_id, day) DO UPDATE SET value = value + 1 \
         RETURNING value",
    )
    .bind(organization_id)
    .bind(&day)
    .fetch_one(&mut **tx)
    .await?;

    Ok(format!("ORD-{day}-{value:04}"))
}

#[derive(sqlx::FromRow)]
struct ModifierOptionRow {
    id: String,
    name: String,
    price_adjustment: f64,
    is_active: bool,
    group_active: bool,
}

struct PricedLine {
    product_id: String,
    quantity: i64,
    unit_price: f64,
    total: f64,
    notes: Option<String>,
    modifiers: Vec<PricedModifier>,
}

struct PricedModifier {
    option_id: String,
    quantity: i64,
    unit_price: f64,
    total: f64,
}
