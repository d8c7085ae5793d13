use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::db::StoreResult;
use crate::expenses::query::ExpenseQuery;
use crate::expenses::repo_types::{Expense, ExpenseChanges, NewExpense};

/// Owner-scoped expense storage. Deletion is a tombstone (`deleted_at`);
/// tombstoned rows are invisible to every method below.
#[async_trait]
pub trait ExpenseStore: Send + Sync {
    /// Filters, then sorts, then paginates the caller's live expenses.
    async fn list(&self, user_id: Uuid, query: &ExpenseQuery) -> StoreResult<Vec<Expense>>;
    /// `category_id` must reference an existing category (`ForeignKeyViolation` otherwise).
    async fn create(&self, expense: NewExpense) -> StoreResult<Expense>;
    async fn update(&self, user_id: Uuid, id: Uuid, changes: ExpenseChanges) -> StoreResult<bool>;
    async fn delete(&self, user_id: Uuid, id: Uuid) -> StoreResult<bool>;
}

const EXPENSE_COLUMNS: &str =
    "id, title, description, amount, category_id, user_id, created_at, updated_at";

/// Builds the list statement. Sort column and direction come from closed enums,
/// every user-supplied value is a bind parameter.
pub(crate) fn list_query(user_id: Uuid, query: &ExpenseQuery) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new("SELECT ");
    qb.push(EXPENSE_COLUMNS)
        .push(" FROM expenses WHERE deleted_at IS NULL AND user_id = ")
        .push_bind(user_id);

    if let Some(category_id) = query.filter.category_id {
        qb.push(" AND category_id = ").push_bind(category_id);
    }
    if let Some(from) = query.filter.created_from() {
        qb.push(" AND created_at >= ").push_bind(from);
    }
    if let Some(before) = query.filter.created_before() {
        qb.push(" AND created_at < ").push_bind(before);
    }

    let dir = query.order.keyword();
    qb.push(" ORDER BY ")
        .push(query.sort_by.column())
        .push(" ")
        .push(dir)
        .push(", id ")
        .push(dir);

    qb.push(" LIMIT ")
        .push_bind(query.pagination.limit)
        .push(" OFFSET ")
        .push_bind(query.pagination.offset());
    qb
}

#[derive(Clone)]
pub struct PgExpenseStore {
    db: PgPool,
}

impl PgExpenseStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ExpenseStore for PgExpenseStore {
    async fn list(&self, user_id: Uuid, query: &ExpenseQuery) -> StoreResult<Vec<Expense>> {
        let mut qb = list_query(user_id, query);
        let rows = qb
            .build_query_as::<Expense>()
            .fetch_all(&self.db)
            .await?;
        Ok(rows)
    }

    async fn create(&self, expense: NewExpense) -> StoreResult<Expense> {
        let row = sqlx::query_as::<_, Expense>(
            r#"
            INSERT INTO expenses (id, title, description, amount, category_id, user_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, NOW(), NOW())
            RETURNING id, title, description, amount, category_id, user_id, created_at, updated_at
            "#,
        )
        .bind(expense.id)
        .bind(&expense.title)
        .bind(&expense.description)
        .bind(expense.amount)
        .bind(expense.category_id)
        .bind(expense.user_id)
        .fetch_one(&self.db)
        .await?;
        Ok(row)
    }

    async fn update(&self, user_id: Uuid, id: Uuid, changes: ExpenseChanges) -> StoreResult<bool> {
        let res = sqlx::query(
            r#"
            UPDATE expenses
               SET title = $1, description = $2, amount = $3, category_id = $4, updated_at = NOW()
             WHERE id = $5 AND user_id = $6 AND deleted_at IS NULL
            "#,
        )
        .bind(&changes.title)
        .bind(&changes.description)
        .bind(changes.amount)
        .bind(changes.category_id)
        .bind(id)
        .bind(user_id)
        .execute(&self.db)
        .await?;
        Ok(res.rows_affected() > 0)
    }

    async fn delete(&self, user_id: Uuid, id: Uuid) -> StoreResult<bool> {
        let res = sqlx::query(
            r#"
            UPDATE expenses
               SET deleted_at = NOW()
             WHERE id = $1 AND user_id = $2 AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .bind(user_id)
        .execute(&self.db)
        .await?;
        Ok(res.rows_affected() > 0)
    }
}
