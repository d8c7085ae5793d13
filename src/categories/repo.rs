use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::categories::repo_types::{Category, NewCategory};
use crate::db::StoreResult;

/// Owner-scoped category storage. Every mutation matches on `id` and
/// `user_id` together; `false` means "absent or not yours".
#[async_trait]
pub trait CategoryStore: Send + Sync {
    /// All categories of `user_id`, by title ascending.
    async fn list_by_owner(&self, user_id: Uuid) -> StoreResult<Vec<Category>>;
    async fn create(&self, category: NewCategory) -> StoreResult<Category>;
    async fn update(&self, user_id: Uuid, id: Uuid, title: &str) -> StoreResult<bool>;
    /// Fails with `ForeignKeyViolation` while expenses still point at the row.
    async fn delete(&self, user_id: Uuid, id: Uuid) -> StoreResult<bool>;
}

#[derive(Clone)]
pub struct PgCategoryStore {
    db: PgPool,
}

impl PgCategoryStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CategoryStore for PgCategoryStore {
    async fn list_by_owner(&self, user_id: Uuid) -> StoreResult<Vec<Category>> {
        let rows = sqlx::query_as::<_, Category>(
            r#"
            SELECT id, title, user_id, created_at, updated_at
            FROM categories
            WHERE user_id = $1
            ORDER BY title ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }

    async fn create(&self, category: NewCategory) -> StoreResult<Category> {
        let row = sqlx::query_as::<_, Category>(
            r#"
            INSERT INTO categories (id, title, user_id)
            VALUES ($1, $2, $3)
            RETURNING id, title, user_id, created_at, updated_at
            "#,
        )
        .bind(category.id)
        .bind(&category.title)
        .bind(category.user_id)
        .fetch_one(&self.db)
        .await?;
        Ok(row)
    }

    async fn update(&self, user_id: Uuid, id: Uuid, title: &str) -> StoreResult<bool> {
        let res = sqlx::query(
            r#"
            UPDATE categories
               SET title = $1, updated_at = NOW()
             WHERE id = $2 AND user_id = $3
            "#,
        )
        .bind(title)
        .bind(id)
        .bind(user_id)
        .execute(&self.db)
        .await?;
        Ok(res.rows_affected() > 0)
    }

    async fn delete(&self, user_id: Uuid, id: Uuid) -> StoreResult<bool> {
        let res = sqlx::query("DELETE FROM categories WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.db)
            .await?;
        Ok(res.rows_affected() > 0)
    }
}
