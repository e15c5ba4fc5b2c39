//! Dining Table Repository

use sqlx::SqlitePool;

use super::{RepoError, RepoResult, new_id};
use crate::db::models::{CreateTableRequest, DiningTable, Order, TableWithOrders};
use shared::status::TableStatus;

#[derive(Clone)]
pub struct DiningTableRepository {
    pool: SqlitePool,
}

impl DiningTableRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// All tables in an organization ordered by table number.
    pub async fn find_all(&self, organization_id: &str) -> RepoResult<Vec<DiningTable>> {
        let tables = sqlx::query_as::<_, DiningTable>(
            "SELECT * FROM dining_tables WHERE organization_id = ? ORDER BY number",
        )
        .bind(organization_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(tables)
    }

    /// Floor plan view: every table with its active (unfinished) orders.
    pub async fn find_all_with_orders(
        &self,
        organization_id: &str,
    ) -> RepoResult<Vec<TableWithOrders>> {
        let tables = self.find_all(organization_id).await?;
        let mut result = Vec::with_capacity(tables.len());
        for table in tables {
            let active_orders = self.active_orders(&table.id).await?;
            result.push(TableWithOrders {
                table,
                active_orders,
            });
        }
        Ok(result)
    }

    pub async fn find_by_id(
        &self,
        organization_id: &str,
        id: &str,
    ) -> RepoResult<Option<DiningTable>> {
        let table = sqlx::query_as::<_, DiningTable>(
            "SELECT * FROM dining_tables WHERE id = ? AND organization_id = ?",
        )
        .bind(id)
        .bind(organization_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(table)
    }

    /// Orders on this table that still hold it (not served, paid or cancelled).
    pub async fn active_orders(&self, table_id: &str) -> RepoResult<Vec<Order>> {
        let orders = sqlx::query_as::<_, Order>(
            "SELECT * FROM orders WHERE table_id = ? \
             AND status NOT IN ('served', 'paid', 'cancelled') \
             ORDER BY created_at",
        )
        .bind(table_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(orders)
    }

    /// Create a table; number must be unique within the organization.
    pub async fn create(
        &self,
        organization_id: &str,
        data: CreateTableRequest,
    ) -> RepoResult<DiningTable> {
        let id = new_id();
        let capacity = data.capacity.unwrap_or(4);

        let inserted = sqlx::query(
            "INSERT INTO dining_tables (id, organization_id, number, name, capacity, status) \
             VALUES (?, ?, ?, ?, ?, 'available')",
        )
        .bind(&id)
        .bind(organization_id)
        .bind(data.number)
        .bind(&data.name)
        .bind(capacity)
        .execute(&self.pool)
        .await;

        match inserted {
            Ok(_) => {}
            Err(e) => {
                let repo_err = RepoError::from(e);
                if let RepoError::Duplicate(_) = repo_err {
                    return Err(RepoError::Duplicate(format!(
                        "Table number {} already exists",
                        data.number
                    )));
                }
                return Err(repo_err);
            }
        }

        self.find_by_id(organization_id, &id)
            .await?
            .ok_or_else(|| RepoError::Database("Table vanished after insert".to_string()))
    }

    /// Change table status. Returns the updated row, `None` when absent.
    pub async fn set_status(
        &self,
        organization_id: &str,
        id: &str,
        status: TableStatus,
    ) -> RepoResult<Option<DiningTable>> {
        let result = sqlx::query(
            "UPDATE dining_tables SET status = ? WHERE id = ? AND organization_id = ?",
        )
        .bind(status)
        .bind(id)
        .bind(organization_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.find_by_id(organization_id, id).await
    }

    /// Hard delete. Refused while the table has unfinished orders.
    pub async fn delete(&self, organization_id: &str, id: &str) -> RepoResult<Option<()>> {
        if self.find_by_id(organization_id, id).await?.is_none() {
            return Ok(None);
        }

        let active = self.active_orders(id).await?;
        if !active.is_empty() {
            return Err(RepoError::Validation(
                "Cannot delete a table with active orders".to_string(),
            ));
        }

        // Historical orders keep their table reference; detach them first so
        // the foreign key does not block the delete.
        let mut tx = self.pool.begin().await?;
        sqlx::query("UPDATE orders SET table_id = NULL WHERE table_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM dining_tables WHERE id = ? AND organization_id = ?")
            .bind(id)
            .bind(organization_id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(Some(()))
    }
}
