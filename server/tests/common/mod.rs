//! Shared fixtures for integration tests.
//!
//! Builds a full `ServerState` against a temporary on-disk SQLite file
//! (in-memory SQLite is per-connection, which breaks pooled access) and
//! seeds one organization with staff, a small menu and a few tables.

use socketioxide::SocketIo;
use sqlx::SqlitePool;
use std::sync::Arc;
use tempfile::TempDir;

use taptab_server::api;
use taptab_server::auth::{CurrentUser, JwtService, permissions};
use taptab_server::cache::CacheService;
use taptab_server::core::{Config, ServerState};
use taptab_server::db::DbService;
use taptab_server::realtime::RelayService;

pub const ORG_ID: &str = "org-1";
pub const OTHER_ORG_ID: &str = "org-2";
pub const WAITER_ID: &str = "user-waiter";
pub const KITCHEN_ID: &str = "user-kitchen";
pub const CASHIER_ID: &str = "user-cashier";
pub const BURGER_ID: &str = "prod-burger";
pub const COLA_ID: &str = "prod-cola";
pub const EXTRA_ICE_ID: &str = "opt-extra-ice";
pub const LARGE_ID: &str = "opt-large";
pub const SOLD_OUT_ID: &str = "prod-soldout";
pub const TABLE_1_ID: &str = "table-1";
pub const TABLE_2_ID: &str = "table-2";
pub const PASSWORD: &str = "correct horse battery staple";

/// Keeps the temp dir alive for the lifetime of the test state.
pub struct TestEnv {
    pub state: ServerState,
    _dir: TempDir,
}

pub async fn test_env() -> TestEnv {
    let dir = TempDir::new().expect("temp dir");
    let db_path = dir.path().join("test.db");

    let config = Config::with_overrides(db_path.to_string_lossy().to_string(), 0);
    let db = DbService::new(&config.database_path)
        .await
        .expect("open test database");

    let (_layer, io) = SocketIo::builder().build_layer();

    let state = ServerState {
        config: config.clone(),
        db: db.pool.clone(),
        cache: CacheService::new(1000),
        jwt_service: Arc::new(test_jwt_service()),
        relay: RelayService::new(io),
    };

    // Broadcasts need the root namespace registered, same as in production
    taptab_server::realtime::register(&state);

    seed(&db.pool).await;

    TestEnv { state, _dir: dir }
}

pub fn test_jwt_service() -> JwtService {
    JwtService::with_config(taptab_server::auth::JwtConfig {
        secret: "integration-test-secret-0123456789abcdef".to_string(),
        expiration_minutes: 60,
        refresh_expiration_secs: 3600,
        issuer: "taptab-server".to_string(),
        audience: "taptab-clients".to_string(),
    })
}

pub fn user(role: &str) -> CurrentUser {
    let id = match role {
        "waiter" => WAITER_ID,
        "kitchen" => KITCHEN_ID,
        "cashier" => CASHIER_ID,
        _ => "user-admin",
    };
    CurrentUser {
        id: id.to_string(),
        organization_id: ORG_ID.to_string(),
        email: format!("{role}@taptab.test"),
        role: role.to_string(),
        permissions: permissions::default_permissions(role),
    }
}

pub fn other_org_user(role: &str) -> CurrentUser {
    CurrentUser {
        id: "user-other".to_string(),
        organization_id: OTHER_ORG_ID.to_string(),
        email: format!("{role}@other.test"),
        role: role.to_string(),
        permissions: permissions::default_permissions(role),
    }
}

pub fn bearer_token(state: &ServerState, user: &CurrentUser) -> String {
    state
        .jwt_service
        .generate_token(
            &user.id,
            &user.organization_id,
            &user.email,
            &user.role,
            &user.permissions,
        )
        .expect("token generation")
}

pub fn test_router(state: &ServerState) -> axum::Router {
    api::create_router(state.clone())
}

async fn seed(pool: &SqlitePool) {
    let now = chrono::Utc::now();
    let hash = api::auth::hash_password(PASSWORD).expect("hash");

    for (org_id, name) in [(ORG_ID, "The Dugout"), (OTHER_ORG_ID, "Corner Pocket")] {
        sqlx::query(
            "INSERT INTO organizations (id, name, tax_rate, service_charge_rate, created_at) \
             VALUES (?, ?, 0.08, 0.10, ?)",
        )
        .bind(org_id)
        .bind(name)
        .bind(now)
        .execute(pool)
        .await
        .expect("seed org");
    }

    for (id, org, email, role) in [
        ("user-admin", ORG_ID, "admin@taptab.test", "admin"),
        (WAITER_ID, ORG_ID, "waiter@taptab.test", "waiter"),
        (KITCHEN_ID, ORG_ID, "kitchen@taptab.test", "kitchen"),
        (CASHIER_ID, ORG_ID, "cashier@taptab.test", "cashier"),
        ("user-other", OTHER_ORG_ID, "waiter@other.test", "waiter"),
    ] {
        sqlx::query(
            "INSERT INTO users \
             (id, organization_id, email, password_hash, first_name, last_name, role, status, created_at) \
             VALUES (?, ?, ?, ?, 'Test', 'User', ?, 'active', ?)",
        )
        .bind(id)
        .bind(org)
        .bind(email)
        .bind(&hash)
        .bind(role)
        .bind(now)
        .execute(pool)
        .await
        .expect("seed user");
    }

    for (id, name, price, status, prep) in [
        (BURGER_ID, "Stadium Burger", 12.99_f64, "available", Some(20_i64)),
        (COLA_ID, "Cola", 2.99, "available", Some(2)),
        (SOLD_OUT_ID, "Wings", 9.99, "unavailable", Some(15)),
    ] {
        sqlx::query(
            "INSERT INTO products \
             (id, organization_id, name, price, status, prep_time_minutes, is_active, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, 1, ?, ?)",
        )
        .bind(id)
        .bind(ORG_ID)
        .bind(name)
        .bind(price)
        .bind(status)
        .bind(prep)
        .bind(now)
        .bind(now)
        .execute(pool)
        .await
        .expect("seed product");
    }

    sqlx::query(
        "INSERT INTO product_modifiers (id, product_id, name, is_active) VALUES ('mod-size', ?, 'Size', 1)",
    )
    .bind(COLA_ID)
    .execute(pool)
    .await
    .expect("seed modifier");

    for (id, name, adj) in [(EXTRA_ICE_ID, "Extra Ice", 0.0_f64), (LARGE_ID, "Large", 0.50)] {
        sqlx::query(
            "INSERT INTO modifier_options (id, modifier_id, name, price_adjustment, is_active) \
             VALUES (?, 'mod-size', ?, ?, 1)",
        )
        .bind(id)
        .bind(name)
        .bind(adj)
        .execute(pool)
        .await
        .expect("seed option");
    }

    for (id, org, number) in [
        (TABLE_1_ID, ORG_ID, 1_i64),
        (TABLE_2_ID, ORG_ID, 2),
        ("table-other", OTHER_ORG_ID, 1),
    ] {
        sqlx::query(
            "INSERT INTO dining_tables (id, organization_id, number, capacity, status) \
             VALUES (?, ?, ?, 4, 'available')",
        )
        .bind(id)
        .bind(org)
        .bind(number)
        .execute(pool)
        .await
        .expect("seed table");
    }
}
