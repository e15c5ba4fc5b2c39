//! 收款与结账
//!
//! 一张订单可以分多笔收款；累计实收覆盖应收总额时订单转为 paid。
//! 现金超付部分记为找零，不计入实收。

use chrono::Utc;
use shared::ErrorCode;
use shared::events::{OrderStatusChangedEvent, event};
use shared::status::{OrderStatus, PaymentMethod};

use super::money;
use super::status::{fetch_order, release_table_if_idle};
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{CreatePaymentRequest, OrderDetail, Payment};
use crate::db::repository::{OrderRepository, PaymentRepository, new_id};
use crate::utils::{AppError, AppResult};
use validator::Validate;

/// 对 served 状态的订单记录一笔收款。
///
/// 返回更新后的完整订单图 (含全部收款记录)。
pub async fn record_payment(
    state: &ServerState,
    user: &CurrentUser,
    order_id: &str,
    req: CreatePaymentRequest,
) -> AppResult<OrderDetail> {
    req.validate()?;

    let order = fetch_order(state, &user.organization_id, order_id).await?;

    if order.status != OrderStatus::Served {
        return Err(AppError::business(
            ErrorCode::BusinessRule,
            format!(
                "Order must be served before payment (current status: {})",
                order.status
            ),
        ));
    }

    let amount = money::round2(req.amount);
    let tip = money::round2(req.tip_amount);
    if !amount.is_finite() || !tip.is_finite() {
        return Err(AppError::validation("Payment amounts must be finite"));
    }

    let payment_repo = PaymentRepository::new(state.db.clone());
    let already_paid = payment_repo.total_paid(order_id).await?;
    let remaining = money::round2(order.total_amount - already_paid);

    // 只有现金允许超付并找零；卡和移动支付不能收多
    let change = if amount > remaining {
        if req.method != PaymentMethod::Cash {
            return Err(AppError::business(
                ErrorCode::BusinessRule,
                "Non-cash payment exceeds the remaining balance",
            ));
        }
        money::round2(amount - remaining)
    } else {
        0.0
    };

    let now = Utc::now();
    sqlx::query(
        "INSERT INTO payments (id, order_id, cashier_id, method, amount, tip_amount, change_amount, processed_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(new_id())
    .bind(order_id)
    .bind(&user.id)
    .bind(req.method)
    .bind(amount)
    .bind(tip)
    .bind(change)
    .bind(now)
    .execute(&state.db)
    .await?;

    let paid = payment_repo.total_paid(order_id).await?;
    let covered = paid + money::MONEY_TOLERANCE >= order.total_amount;

    if covered {
        sqlx::query("UPDATE orders SET status = 'paid', updated_at = ? WHERE id = ?")
            .bind(now)
            .bind(order_id)
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
                    status: OrderStatus::Paid,
                    timestamp: now,
                },
            )
            .await;

        if let Some(table_id) = &order.table_id {
            release_table_if_idle(state, &user.organization_id, table_id).await?;
        }

        tracing::info!(order_number = %order.order_number, total = order.total_amount, "Order paid in full");
    }

    OrderRepository::new(state.db.clone())
        .find_detail(&user.organization_id, order_id)
        .await?
        .ok_or_else(|| AppError::internal("Order vanished after payment"))
}

/// 收款记录查询 (对账)。
pub async fn list_payments(
    state: &ServerState,
    user: &CurrentUser,
    order_id: &str,
) -> AppResult<Vec<Payment>> {
    // 确认订单属于本租户
    fetch_order(state, &user.organization_id, order_id).await?;

    let payments = PaymentRepository::new(state.db.clone())
        .find_by_order(order_id)
        .await?;
    Ok(payments)
}
