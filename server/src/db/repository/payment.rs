//! Payment Repository

use sqlx::SqlitePool;

use super::RepoResult;
use crate::db::models::Payment;

#[derive(Clone)]
pub struct PaymentRepository {
    pool: SqlitePool,
}

impl PaymentRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn find_by_order(&self, order_id: &str) -> RepoResult<Vec<Payment>> {
        let payments = sqlx::query_as::<_, Payment>(
            "SELECT * FROM payments WHERE order_id = ? ORDER BY processed_at",
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(payments)
    }

    /// Sum of amounts already recorded against an order (tips excluded).
    pub async fn total_paid(&self, order_id: &str) -> RepoResult<f64> {
        let (total,): (f64,) = sqlx::query_as(
            "SELECT COALESCE(SUM(amount - change_amount), 0.0) FROM payments WHERE order_id = ?",
        )
        .bind(order_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(total)
    }
}
