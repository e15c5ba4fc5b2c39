//! Product Repository
//!
//! Catalog CRUD. Creation writes the product and its nested modifier
//! groups in one transaction; deletion degrades to deactivation when
//! order history references the product.

use sqlx::SqlitePool;

use super::{RepoError, RepoResult, new_id};
use crate::db::models::{
    CreateProductRequest, ModifierOption, Product, ProductListQuery, ProductModifier,
    ProductModifierWithOptions, ProductWithModifiers, UpdateProductRequest,
};
use chrono::Utc;
use shared::status::ProductStatus;

#[derive(Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// List products in an organization, newest first.
    pub async fn find_all(
        &self,
        organization_id: &str,
        query: &ProductListQuery,
    ) -> RepoResult<Vec<Product>> {
        let mut sql = String::from("SELECT * FROM products WHERE organization_id = ?");
        if !query.include_inactive.unwrap_or(false) {
            sql.push_str(" AND is_active = 1");
        }
        if query.status.is_some() {
            sql.push_str(" AND status = ?");
        }
        if query.search.is_some() {
            sql.push_str(" AND name LIKE ?");
        }
        sql.push_str(" ORDER BY name");

        let mut q = sqlx::query_as::<_, Product>(&sql).bind(organization_id);
        if let Some(status) = query.status {
            q = q.bind(status);
        }
        if let Some(search) = &query.search {
            q = q.bind(format!("%{}%", search));
        }

        Ok(q.fetch_all(&self.pool).await?)
    }

    /// Find one product within an organization.
    pub async fn find_by_id(
        &self,
        organization_id: &str,
        id: &str,
    ) -> RepoResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(
            "SELECT * FROM products WHERE id = ? AND organization_id = ?",
        )
        .bind(id)
        .bind(organization_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(product)
    }

    /// Find one product with its modifier groups and options.
    pub async fn find_with_modifiers(
        &self,
        organization_id: &str,
        id: &str,
    ) -> RepoResult<Option<ProductWithModifiers>> {
        let Some(product) = self.find_by_id(organization_id, id).await? else {
            return Ok(None);
        };

        let groups = sqlx::query_as::<_, ProductModifier>(
            "SELECT * FROM product_modifiers WHERE product_id = ? AND is_active = 1 ORDER BY name",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        let mut modifiers = Vec::with_capacity(groups.len());
        for group in groups {
            let options = sqlx::query_as::<_, ModifierOption>(
                "SELECT * FROM modifier_options WHERE modifier_id = ? AND is_active = 1 ORDER BY name",
            )
            .bind(&group.id)
            .fetch_all(&self.pool)
            .await?;
            modifiers.push(ProductModifierWithOptions {
                modifier: group,
                options,
            });
        }

        Ok(Some(ProductWithModifiers { product, modifiers }))
    }

    /// Create a product with its nested modifier groups in one transaction.
    pub async fn create(
        &self,
        organization_id: &str,
        data: CreateProductRequest,
    ) -> RepoResult<ProductWithModifiers> {
        let mut tx = self.pool.begin().await?;
        let now = Utc::now();
        let product_id = new_id();

        sqlx::query(
            "INSERT INTO products \
             (id, organization_id, name, sku, price, status, prep_time_minutes, is_active, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, 'available', ?, 1, ?, ?)",
        )
        .bind(&product_id)
        .bind(organization_id)
        .bind(&data.name)
        .bind(&data.sku)
        .bind(crate::orders::money::round2(data.price))
        .bind(data.prep_time_minutes)
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        for group in &data.modifiers {
            let modifier_id = new_id();
            sqlx::query(
                "INSERT INTO product_modifiers (id, product_id, name, is_active) VALUES (?, ?, ?, 1)",
            )
            .bind(&modifier_id)
            .bind(&product_id)
            .bind(&group.name)
            .execute(&mut *tx)
            .await?;

            for option in &group.options {
                sqlx::query(
                    "INSERT INTO modifier_options (id, modifier_id, name, price_adjustment, is_active) \
                     VALUES (?, ?, ?, ?, 1)",
                )
                .bind(new_id())
                .bind(&modifier_id)
                .bind(&option.name)
                .bind(crate::orders::money::round2(option.price_adjustment))
                .execute(&mut *tx)
                .await?;
            }
        }

        tx.commit().await?;

        self.find_with_modifiers(organization_id, &product_id)
            .await?
            .ok_or_else(|| RepoError::Database("Product vanished after insert".to_string()))
    }

    /// Partial update of the product's own fields.
    pub async fn update(
        &self,
        organization_id: &str,
        id: &str,
        data: UpdateProductRequest,
    ) -> RepoResult<Option<Product>> {
        let Some(existing) = self.find_by_id(organization_id, id).await? else {
            return Ok(None);
        };

        let name = data.name.unwrap_or(existing.name);
        let sku = data.sku.or(existing.sku);
        let price = data
            .price
            .map(crate::orders::money::round2)
            .unwrap_or(existing.price);
        let prep_time = data.prep_time_minutes.or(existing.prep_time_minutes);

        sqlx::query(
            "UPDATE products SET name = ?, sku = ?, price = ?, prep_time_minutes = ?, updated_at = ? \
             WHERE id = ? AND organization_id = ?",
        )
        .bind(&name)
        .bind(&sku)
        .bind(price)
        .bind(prep_time)
        .bind(Utc::now())
        .bind(id)
        .bind(organization_id)
        .execute(&self.pool)
        .await?;

        self.find_by_id(organization_id, id).await
    }

    /// Change availability status.
    pub async fn set_status(
        &self,
        organization_id: &str,
        id: &str,
        status: ProductStatus,
    ) -> RepoResult<Option<Product>> {
        let result = sqlx::query(
            "UPDATE products SET status = ?, updated_at = ? WHERE id = ? AND organization_id = ?",
        )
        .bind(status)
        .bind(Utc::now())
        .bind(id)
        .bind(organization_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.find_by_id(organization_id, id).await
    }

    /// Delete a product. Hard delete when nothing references it;
    /// otherwise deactivate so order history stays resolvable.
    ///
    /// Returns `Ok(None)` when the product does not exist (in this tenant),
    /// `Ok(Some(true))` on hard delete, `Ok(Some(false))` on deactivation.
    pub async fn delete(&self, organization_id: &str, id: &str) -> RepoResult<Option<bool>> {
        if self.find_by_id(organization_id, id).await?.is_none() {
            return Ok(None);
        }

        let (references,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM order_items WHERE product_id = ?")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;

        if references > 0 {
            sqlx::query(
                "UPDATE products SET is_active = 0, status = 'withdrawn', updated_at = ? \
                 WHERE id = ? AND organization_id = ?",
            )
            .bind(Utc::now())
            .bind(id)
            .bind(organization_id)
            .execute(&self.pool)
            .await?;
            return Ok(Some(false));
        }

        let mut tx = self.pool.begin().await?;
        sqlx::query(
            "DELETE FROM modifier_options WHERE modifier_id IN \
             (SELECT id FROM product_modifiers WHERE product_id = ?)",
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;
        sqlx::query("DELETE FROM product_modifiers WHERE product_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM products WHERE id = ? AND organization_id = ?")
            .bind(id)
            .bind(organization_id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        Ok(Some(true))
    }
}
