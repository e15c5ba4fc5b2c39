//! Order lifecycle integration tests: pricing, numbering, the status
//! machine, table occupancy and payment settlement.

mod common;

use shared::ErrorCode;
use shared::status::{OrderItemStatus, OrderStatus, PaymentMethod};
use taptab_server::db::models::{
    CreateOrderItemModifier, CreateOrderItemRequest, CreateOrderRequest, CreatePaymentRequest,
};
use taptab_server::orders;
use taptab_server::utils::AppError;

use common::*;

fn burger_and_cola_cart(table_id: Option<&str>) -> CreateOrderRequest {
    CreateOrderRequest {
        table_id: table_id.map(String::from),
        customer_name: None,
        guest_count: 2,
        notes: None,
        items: vec![
            CreateOrderItemRequest {
                product_id: BURGER_ID.to_string(),
                quantity: 2,
                notes: None,
                modifiers: vec![],
            },
            CreateOrderItemRequest {
                product_id: COLA_ID.to_string(),
                quantity: 1,
                notes: None,
                modifiers: vec![CreateOrderItemModifier {
                    modifier_option_id: EXTRA_ICE_ID.to_string(),
                    quantity: 1,
                }],
            },
        ],
    }
}

#[tokio::test]
async fn order_totals_follow_the_rounding_policy() {
    let env = test_env().await;
    let waiter = user("waiter");

    let detail = orders::create_order(&env.state, &waiter, burger_and_cola_cart(Some(TABLE_1_ID)))
        .await
        .expect("order creation");

    // 2x 12.99 + 1x 2.99 = 28.97; 8% tax -> 2.32, 10% service -> 2.90
    assert_eq!(detail.order.subtotal, 28.97);
    assert_eq!(detail.order.tax_amount, 2.32);
    assert_eq!(detail.order.service_charge, 2.90);
    assert_eq!(detail.order.total_amount, 34.19);
    assert_eq!(
        detail.order.total_amount,
        detail.order.subtotal + detail.order.tax_amount + detail.order.service_charge
    );
    assert_eq!(detail.order.status, OrderStatus::Pending);
    assert_eq!(detail.items.len(), 2);
}

#[tokio::test]
async fn modifier_surcharges_multiply_by_line_quantity() {
    let env = test_env().await;
    let waiter = user("waiter");

    let req = CreateOrderRequest {
        table_id: None,
        customer_name: None,
        guest_count: 1,
        notes: None,
        items: vec![CreateOrderItemRequest {
            product_id: COLA_ID.to_string(),
            quantity: 3,
            notes: None,
            modifiers: vec![CreateOrderItemModifier {
                modifier_option_id: LARGE_ID.to_string(),
                quantity: 1,
            }],
        }],
    };

    let detail = orders::create_order(&env.state, &waiter, req)
        .await
        .expect("order creation");

    // 3x (2.99 + 0.50) = 10.47
    assert_eq!(detail.order.subtotal, 10.47);
    assert_eq!(detail.items[0].item.total_price, 10.47);
    assert_eq!(detail.items[0].modifiers[0].total_price, 1.50);
}

#[tokio::test]
async fn unavailable_product_rolls_back_the_whole_order() {
    let env = test_env().await;
    let waiter = user("waiter");

    let req = CreateOrderRequest {
        table_id: Some(TABLE_1_ID.to_string()),
        customer_name: None,
        guest_count: 1,
        notes: None,
        items: vec![
            CreateOrderItemRequest {
                product_id: BURGER_ID.to_string(),
                quantity: 1,
                notes: None,
                modifiers: vec![],
            },
            CreateOrderItemRequest {
                product_id: SOLD_OUT_ID.to_string(),
                quantity: 1,
                notes: None,
                modifiers: vec![],
            },
        ],
    };

    let err = orders::create_order(&env.state, &waiter, req)
        .await
        .expect_err("sold-out product must fail the order");
    assert_eq!(err.code(), ErrorCode::ProductUnavailable);

    // Nothing persisted, table untouched
    let (orders_count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM orders")
        .fetch_one(&env.state.db)
        .await
        .unwrap();
    assert_eq!(orders_count, 0);
    let (items_count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM order_items")
        .fetch_one(&env.state.db)
        .await
        .unwrap();
    assert_eq!(items_count, 0);
    let (table_status,): (String,) =
        sqlx::query_as("SELECT status FROM dining_tables WHERE id = ?")
            .bind(TABLE_1_ID)
            .fetch_one(&env.state.db)
            .await
            .unwrap();
    assert_eq!(table_status, "available");
}

#[tokio::test]
async fn order_numbers_are_sequential_per_day() {
    let env = test_env().await;
    let waiter = user("waiter");
    let day = chrono::Utc::now().format("%Y%m%d").to_string();

    let first = orders::create_order(&env.state, &waiter, burger_and_cola_cart(None))
        .await
        .unwrap();
    let second = orders::create_order(&env.state, &waiter, burger_and_cola_cart(None))
        .await
        .unwrap();

    assert_eq!(first.order.order_number, format!("ORD-{day}-0001"));
    assert_eq!(second.order.order_number, format!("ORD-{day}-0002"));
}

#[tokio::test]
async fn simultaneous_orders_never_share_a_number() {
    let env = test_env().await;
    let waiter = user("waiter");
    let day = chrono::Utc::now().format("%Y%m%d").to_string();

    let (first, second) = tokio::join!(
        orders::create_order(&env.state, &waiter, burger_and_cola_cart(None)),
        orders::create_order(&env.state, &waiter, burger_and_cola_cart(None)),
    );
    let first = first.expect("first concurrent order");
    let second = second.expect("second concurrent order");

    let mut numbers = vec![first.order.order_number, second.order.order_number];
    numbers.sort();
    assert_eq!(
        numbers,
        vec![format!("ORD-{day}-0001"), format!("ORD-{day}-0002")]
    );
}

#[tokio::test]
async fn status_machine_rejects_illegal_jumps() {
    let env = test_env().await;
    let waiter = user("waiter");

    let detail = orders::create_order(&env.state, &waiter, burger_and_cola_cart(None))
        .await
        .unwrap();
    let order_id = detail.order.id.clone();

    // pending -> served is two steps too far
    let err = orders::update_order_status(&env.state, &waiter, &order_id, OrderStatus::Served)
        .await
        .expect_err("illegal jump must fail");
    assert_eq!(err.code(), ErrorCode::InvalidStatusTransition);

    // The legal path works step by step
    for status in [
        OrderStatus::Confirmed,
        OrderStatus::Preparing,
        OrderStatus::Ready,
        OrderStatus::Served,
    ] {
        let order = orders::update_order_status(&env.state, &waiter, &order_id, status)
            .await
            .expect("legal transition");
        assert_eq!(order.status, status);
    }

    // No moving backwards once served
    let err = orders::update_order_status(&env.state, &waiter, &order_id, OrderStatus::Preparing)
        .await
        .expect_err("served order cannot go back to preparing");
    assert_eq!(err.code(), ErrorCode::InvalidStatusTransition);
}

#[tokio::test]
async fn cancelling_a_preparing_order_is_allowed() {
    let env = test_env().await;
    let waiter = user("waiter");

    let detail = orders::create_order(&env.state, &waiter, burger_and_cola_cart(Some(TABLE_2_ID)))
        .await
        .unwrap();
    let order_id = detail.order.id.clone();

    orders::update_order_status(&env.state, &waiter, &order_id, OrderStatus::Confirmed)
        .await
        .unwrap();
    orders::update_order_status(&env.state, &waiter, &order_id, OrderStatus::Preparing)
        .await
        .unwrap();
    let order = orders::update_order_status(&env.state, &waiter, &order_id, OrderStatus::Cancelled)
        .await
        .unwrap();
    assert_eq!(order.status, OrderStatus::Cancelled);
    assert!(order.cancelled_at.is_some());

    // Cancellation frees the table
    let (table_status,): (String,) =
        sqlx::query_as("SELECT status FROM dining_tables WHERE id = ?")
            .bind(TABLE_2_ID)
            .fetch_one(&env.state.db)
            .await
            .unwrap();
    assert_eq!(table_status, "available");
}

#[tokio::test]
async fn last_ready_item_promotes_the_order() {
    let env = test_env().await;
    let waiter = user("waiter");
    let kitchen = user("kitchen");

    let detail = orders::create_order(&env.state, &waiter, burger_and_cola_cart(Some(TABLE_1_ID)))
        .await
        .unwrap();
    let order_id = detail.order.id.clone();
    orders::update_order_status(&env.state, &waiter, &order_id, OrderStatus::Confirmed)
        .await
        .unwrap();
    orders::update_order_status(&env.state, &waiter, &order_id, OrderStatus::Preparing)
        .await
        .unwrap();

    let item_ids: Vec<String> = detail.items.iter().map(|i| i.item.id.clone()).collect();

    for (index, item_id) in item_ids.iter().enumerate() {
        orders::update_order_item_status(
            &env.state,
            &kitchen,
            &order_id,
            item_id,
            OrderItemStatus::Preparing,
        )
        .await
        .unwrap();
        let item = orders::update_order_item_status(
            &env.state,
            &kitchen,
            &order_id,
            item_id,
            OrderItemStatus::Ready,
        )
        .await
        .unwrap();
        assert_eq!(item.status, OrderItemStatus::Ready);
        assert!(item.completed_at.is_some());

        let (order_status,): (String,) = sqlx::query_as("SELECT status FROM orders WHERE id = ?")
            .bind(&order_id)
            .fetch_one(&env.state.db)
            .await
            .unwrap();
        if index + 1 == item_ids.len() {
            assert_eq!(order_status, "ready", "last ready item promotes the order");
        } else {
            assert_eq!(order_status, "preparing");
        }
    }
}

#[tokio::test]
async fn item_status_cannot_move_backwards() {
    let env = test_env().await;
    let waiter = user("waiter");
    let kitchen = user("kitchen");

    let detail = orders::create_order(&env.state, &waiter, burger_and_cola_cart(None))
        .await
        .unwrap();
    let order_id = detail.order.id.clone();
    let item_id = detail.items[0].item.id.clone();

    orders::update_order_item_status(
        &env.state,
        &kitchen,
        &order_id,
        &item_id,
        OrderItemStatus::Ready,
    )
    .await
    .unwrap();

    let err = orders::update_order_item_status(
        &env.state,
        &kitchen,
        &order_id,
        &item_id,
        OrderItemStatus::Preparing,
    )
    .await
    .expect_err("items never move backwards");
    assert!(matches!(err, AppError::InvalidItemTransition { .. }));
}

#[tokio::test]
async fn table_is_occupied_and_released_around_the_order() {
    let env = test_env().await;
    let waiter = user("waiter");

    let detail = orders::create_order(&env.state, &waiter, burger_and_cola_cart(Some(TABLE_1_ID)))
        .await
        .unwrap();
    let order_id = detail.order.id.clone();

    let (status,): (String,) = sqlx::query_as("SELECT status FROM dining_tables WHERE id = ?")
        .bind(TABLE_1_ID)
        .fetch_one(&env.state.db)
        .await
        .unwrap();
    assert_eq!(status, "occupied");

    // A second order on the same table keeps it occupied after the first ends
    let second = orders::create_order(&env.state, &waiter, burger_and_cola_cart(Some(TABLE_1_ID)))
        .await
        .unwrap();

    for status in [
        OrderStatus::Confirmed,
        OrderStatus::Preparing,
        OrderStatus::Ready,
        OrderStatus::Served,
    ] {
        orders::update_order_status(&env.state, &waiter, &order_id, status)
            .await
            .unwrap();
    }

    let (status,): (String,) = sqlx::query_as("SELECT status FROM dining_tables WHERE id = ?")
        .bind(TABLE_1_ID)
        .fetch_one(&env.state.db)
        .await
        .unwrap();
    assert_eq!(status, "occupied", "second active order still holds the table");

    orders::update_order_status(&env.state, &waiter, &second.order.id, OrderStatus::Cancelled)
        .await
        .unwrap();

    let (status,): (String,) = sqlx::query_as("SELECT status FROM dining_tables WHERE id = ?")
        .bind(TABLE_1_ID)
        .fetch_one(&env.state.db)
        .await
        .unwrap();
    assert_eq!(status, "available");
}

#[tokio::test]
async fn payments_settle_the_order_once_covered() {
    let env = test_env().await;
    let waiter = user("waiter");
    let cashier = user("cashier");

    let detail = orders::create_order(&env.state, &waiter, burger_and_cola_cart(None))
        .await
        .unwrap();
    let order_id = detail.order.id.clone();

    // Paying before service is a business rule violation
    let err = orders::record_payment(
        &env.state,
        &cashier,
        &order_id,
        CreatePaymentRequest {
            method: PaymentMethod::Card,
            amount: 34.19,
            tip_amount: 0.0,
        },
    )
    .await
    .expect_err("cannot pay an unserved order");
    assert_eq!(err.code(), ErrorCode::BusinessRule);

    for status in [
        OrderStatus::Confirmed,
        OrderStatus::Preparing,
        OrderStatus::Ready,
        OrderStatus::Served,
    ] {
        orders::update_order_status(&env.state, &waiter, &order_id, status)
            .await
            .unwrap();
    }

    // Partial card payment leaves the order served
    let detail = orders::record_payment(
        &env.state,
        &cashier,
        &order_id,
        CreatePaymentRequest {
            method: PaymentMethod::Card,
            amount: 20.00,
            tip_amount: 0.0,
        },
    )
    .await
    .unwrap();
    assert_eq!(detail.order.status, OrderStatus::Served);
    assert_eq!(detail.payments.len(), 1);

    // Cash covers the rest with change
    let detail = orders::record_payment(
        &env.state,
        &cashier,
        &order_id,
        CreatePaymentRequest {
            method: PaymentMethod::Cash,
            amount: 20.00,
            tip_amount: 2.00,
        },
    )
    .await
    .unwrap();
    assert_eq!(detail.order.status, OrderStatus::Paid);
    assert_eq!(detail.payments.len(), 2);
    assert_eq!(detail.payments[1].change_amount, 5.81);
}

#[tokio::test]
async fn non_cash_overpayment_is_rejected() {
    let env = test_env().await;
    let waiter = user("waiter");
    let cashier = user("cashier");

    let detail = orders::create_order(&env.state, &waiter, burger_and_cola_cart(None))
        .await
        .unwrap();
    let order_id = detail.order.id.clone();
    for status in [
        OrderStatus::Confirmed,
        OrderStatus::Preparing,
        OrderStatus::Ready,
        OrderStatus::Served,
    ] {
        orders::update_order_status(&env.state, &waiter, &order_id, status)
            .await
            .unwrap();
    }

    let err = orders::record_payment(
        &env.state,
        &cashier,
        &order_id,
        CreatePaymentRequest {
            method: PaymentMethod::Card,
            amount: 50.00,
            tip_amount: 0.0,
        },
    )
    .await
    .expect_err("card cannot overpay");
    assert_eq!(err.code(), ErrorCode::BusinessRule);
}

#[tokio::test]
async fn orders_are_invisible_across_tenants() {
    let env = test_env().await;
    let waiter = user("waiter");
    let outsider = other_org_user("waiter");

    let detail = orders::create_order(&env.state, &waiter, burger_and_cola_cart(None))
        .await
        .unwrap();

    let err = orders::update_order_status(
        &env.state,
        &outsider,
        &detail.order.id,
        OrderStatus::Confirmed,
    )
    .await
    .expect_err("other tenant must not see the order");
    assert_eq!(err.code(), ErrorCode::OrderNotFound);
}

#[tokio::test]
async fn cross_tenant_products_cannot_be_ordered() {
    let env = test_env().await;
    let outsider = other_org_user("waiter");

    // Another tenant's catalog reads exactly like a sold-out product
    let err = orders::create_order(&env.state, &outsider, burger_and_cola_cart(None))
        .await
        .expect_err("products belong to another organization");
    assert_eq!(err.code(), ErrorCode::ProductUnavailable);
}

#[tokio::test]
async fn unknown_product_ids_read_as_unavailable() {
    let env = test_env().await;
    let waiter = user("waiter");

    let mut cart = burger_and_cola_cart(None);
    cart.items[0].product_id = "no-such-product".to_string();

    let err = orders::create_order(&env.state, &waiter, cart)
        .await
        .expect_err("unknown product id must fail the order");
    assert_eq!(err.code(), ErrorCode::ProductUnavailable);
}

#[tokio::test]
async fn unknown_modifier_options_read_as_unavailable() {
    let env = test_env().await;
    let waiter = user("waiter");

    let req = CreateOrderRequest {
        table_id: None,
        customer_name: None,
        guest_count: 1,
        notes: None,
        items: vec![CreateOrderItemRequest {
            product_id: COLA_ID.to_string(),
            quantity: 1,
            notes: None,
            modifiers: vec![CreateOrderItemModifier {
                modifier_option_id: "no-such-option".to_string(),
                quantity: 1,
            }],
        }],
    };

    let err = orders::create_order(&env.state, &waiter, req)
        .await
        .expect_err("unknown modifier option must fail the order");
    assert_eq!(err.code(), ErrorCode::ModifierUnavailable);
}
