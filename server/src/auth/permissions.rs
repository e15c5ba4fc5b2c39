//! Permission Definitions
//!
//! Capability-based RBAC for the POS backend.
//!
//! ## 设计原则
//! - 能力字符串形如 `resource:action`，粒度落在操作级别
//! - 角色只是默认权限集的名字，最终生效的是用户的权限列表
//! - REST 和 Socket.IO 共用同一套能力字符串

// ========== Orders ==========
pub const ORDERS_VIEW: &str = "orders:view";
pub const ORDERS_CREATE: &str = "orders:create";
pub const ORDERS_UPDATE_STATUS: &str = "orders:update_status";
pub const ORDERS_PAY: &str = "orders:pay";

// ========== Products ==========
pub const PRODUCTS_VIEW: &str = "products:view";
pub const PRODUCTS_MANAGE: &str = "products:manage";

// ========== Tables ==========
pub const TABLES_VIEW: &str = "tables:view";
pub const TABLES_MANAGE: &str = "tables:manage";

/// 可配置权限列表
pub const ALL_PERMISSIONS: &[&str] = &[
    ORDERS_VIEW,
    ORDERS_CREATE,
    ORDERS_UPDATE_STATUS,
    ORDERS_PAY,
    PRODUCTS_VIEW,
    PRODUCTS_MANAGE,
    TABLES_VIEW,
    TABLES_MANAGE,
];

/// Admin 专属权限（不在可配置列表中）
pub const ADMIN_ONLY_PERMISSIONS: &[&str] = &[
    "users:manage", // 用户管理
    "all",          // 超级权限
];

/// Default role permissions
pub const DEFAULT_ADMIN_PERMISSIONS: &[&str] = &["all"];

/// 经理：全部可配置权限
pub const DEFAULT_MANAGER_PERMISSIONS: &[&str] = &[
    ORDERS_VIEW,
    ORDERS_CREATE,
    ORDERS_UPDATE_STATUS,
    ORDERS_PAY,
    PRODUCTS_VIEW,
    PRODUCTS_MANAGE,
    TABLES_VIEW,
    TABLES_MANAGE,
];

/// 服务员：点单、改单、桌台
pub const DEFAULT_WAITER_PERMISSIONS: &[&str] = &[
    ORDERS_VIEW,
    ORDERS_CREATE,
    ORDERS_UPDATE_STATUS,
    PRODUCTS_VIEW,
    TABLES_VIEW,
    TABLES_MANAGE,
];

/// 后厨：只看订单、推进菜品状态
pub const DEFAULT_KITCHEN_PERMISSIONS: &[&str] = &[ORDERS_VIEW, ORDERS_UPDATE_STATUS, PRODUCTS_VIEW];

/// 收银：查看与收款
pub const DEFAULT_CASHIER_PERMISSIONS: &[&str] =
    &[ORDERS_VIEW, ORDERS_PAY, PRODUCTS_VIEW, TABLES_VIEW];

/// Get permissions for a role name
pub fn default_permissions(role_name: &str) -> Vec<String> {
    let set: &[&str] = match role_name {
        "admin" => DEFAULT_ADMIN_PERMISSIONS,
        "manager" => DEFAULT_MANAGER_PERMISSIONS,
        "waiter" => DEFAULT_WAITER_PERMISSIONS,
        "kitchen" => DEFAULT_KITCHEN_PERMISSIONS,
        "cashier" => DEFAULT_CASHIER_PERMISSIONS,
        _ => &[],
    };
    set.iter().map(|s| s.to_string()).collect()
}

/// Validate if a permission string is valid
pub fn is_valid_permission(permission: &str) -> bool {
    ALL_PERMISSIONS.contains(&permission)
        || ADMIN_ONLY_PERMISSIONS.contains(&permission)
        || permission.ends_with(":*")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kitchen_cannot_create_orders() {
        let perms = default_permissions("kitchen");
        assert!(perms.contains(&ORDERS_UPDATE_STATUS.to_string()));
        assert!(!perms.contains(&ORDERS_CREATE.to_string()));
    }

    #[test]
    fn unknown_role_gets_nothing() {
        assert!(default_permissions("intern").is_empty());
    }

    #[test]
    fn wildcard_is_valid() {
        assert!(is_valid_permission("orders:*"));
        assert!(is_valid_permission("orders:pay"));
        assert!(!is_valid_permission("orders:launch"));
    }
}
