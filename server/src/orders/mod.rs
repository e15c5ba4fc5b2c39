//! 订单域 - 下单、状态机与收款
//!
//! # 模块
//!
//! - [`money`] - 金额计算 (Decimal 内部运算，两位小数半进位)
//! - [`assembly`] - 下单事务：定价、取号、占桌，全部或全不
//! - [`status`] - 订单/菜品状态机与桌台释放
//! - [`payment`] - 收款与结账
//!
//! 广播在事务提交之后发出，失败只记日志，不影响已提交的数据。

pub mod assembly;
pub mod money;
pub mod payment;
pub mod status;

pub use assembly::create_order;
pub use payment::record_payment;
pub use status::{update_item_status_by_item_id, update_order_item_status, update_order_status};
