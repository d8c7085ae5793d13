//! In-memory store double used by unit and router tests.

use std::cmp::Ordering;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::auth::repo::UserStore;
use crate::auth::repo_types::{NewUser, User};
use crate::categories::repo::CategoryStore;
use crate::categories::repo_types::{Category, NewCategory};
use crate::db::{StoreError, StoreResult};
use crate::expenses::query::{ExpenseQuery, SortBy, SortOrder};
use crate::expenses::repo::ExpenseStore;
use crate::expenses::repo_types::{Expense, ExpenseChanges, NewExpense};

struct StoredExpense {
    expense: Expense,
    deleted_at: Option<OffsetDateTime>,
}

#[derive(Default)]
struct Inner {
    users: Vec<User>,
    categories: Vec<Category>,
    expenses: Vec<StoredExpense>,
}

/// Mirrors the Postgres schema constraints: unique ids and emails, and
/// category foreign keys from expenses.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryStore {
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().expect("memory store poisoned")
    }

    /// Overrides `created_at` so date filters and date ordering can be exercised.
    pub fn backdate(&self, id: Uuid, created_at: OffsetDateTime) {
        let mut inner = self.lock();
        if let Some(row) = inner.expenses.iter_mut().find(|e| e.expense.id == id) {
            row.expense.created_at = created_at;
        }
    }

    /// Raw row including tombstoned ones.
    pub fn raw_expense(&self, id: Uuid) -> Option<(Expense, Option<OffsetDateTime>)> {
        self.lock()
            .expenses
            .iter()
            .find(|e| e.expense.id == id)
            .map(|e| (e.expense.clone(), e.deleted_at))
    }

    pub fn raw_category(&self, id: Uuid) -> Option<Category> {
        self.lock().categories.iter().find(|c| c.id == id).cloned()
    }
}

fn matches(query: &ExpenseQuery, expense: &Expense) -> bool {
    let f = &query.filter;
    f.category_id.map_or(true, |c| expense.category_id == c)
        && f.created_from().map_or(true, |from| expense.created_at >= from)
        && f.created_before().map_or(true, |before| expense.created_at < before)
}

fn compare(query: &ExpenseQuery, a: &Expense, b: &Expense) -> Ordering {
    let primary = match query.sort_by {
        SortBy::Date => a.created_at.cmp(&b.created_at),
        SortBy::Amount => a.amount.cmp(&b.amount),
    };
    let ord = primary.then_with(|| a.id.cmp(&b.id));
    match query.order {
        SortOrder::Asc => ord,
        SortOrder::Desc => ord.reverse(),
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create(&self, user: NewUser) -> StoreResult<User> {
        let mut inner = self.lock();
        if inner.users.iter().any(|u| u.email == user.email) {
            return Err(StoreError::UniqueViolation("users_email_key".into()));
        }
        if inner.users.iter().any(|u| u.id == user.id) {
            return Err(StoreError::UniqueViolation("users_pkey".into()));
        }
        let now = OffsetDateTime::now_utc();
        let row = User {
            id: user.id,
            name: user.name,
            email: user.email,
            password_hash: user.password_hash,
            created_at: now,
            updated_at: now,
        };
        inner.users.push(row.clone());
        Ok(row)
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        Ok(self.lock().users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
        Ok(self.lock().users.iter().find(|u| u.id == id).cloned())
    }
}

#[async_trait]
impl CategoryStore for MemoryStore {
    async fn list_by_owner(&self, user_id: Uuid) -> StoreResult<Vec<Category>> {
        let mut rows: Vec<Category> = self
            .lock()
            .categories
            .iter()
            .filter(|c| c.user_id == user_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.title.cmp(&b.title));
        Ok(rows)
    }

    async fn create(&self, category: NewCategory) -> StoreResult<Category> {
        let mut inner = self.lock();
        if inner.categories.iter().any(|c| c.id == category.id) {
            return Err(StoreError::UniqueViolation("categories_pkey".into()));
        }
        let now = OffsetDateTime::now_utc();
        let row = Category {
            id: category.id,
            title: category.title,
            user_id: category.user_id,
            created_at: now,
            updated_at: now,
        };
        inner.categories.push(row.clone());
        Ok(row)
    }

    async fn update(&self, user_id: Uuid, id: Uuid, title: &str) -> StoreResult<bool> {
        let mut inner = self.lock();
        let Some(row) = inner
            .categories
            .iter_mut()
            .find(|c| c.id == id && c.user_id == user_id)
        else {
            return Ok(false);
        };
        row.title = title.to_string();
        row.updated_at = OffsetDateTime::now_utc();
        Ok(true)
    }

    async fn delete(&self, user_id: Uuid, id: Uuid) -> StoreResult<bool> {
        let mut inner = self.lock();
        let Some(pos) = inner
            .categories
            .iter()
            .position(|c| c.id == id && c.user_id == user_id)
        else {
            return Ok(false);
        };
        if inner.expenses.iter().any(|e| e.expense.category_id == id) {
            return Err(StoreError::ForeignKeyViolation("expenses_category_id_fkey".into()));
        }
        inner.categories.remove(pos);
        Ok(true)
    }
}

#[async_trait]
impl ExpenseStore for MemoryStore {
    async fn list(&self, user_id: Uuid, query: &ExpenseQuery) -> StoreResult<Vec<Expense>> {
        let mut rows: Vec<Expense> = self
            .lock()
            .expenses
            .iter()
            .filter(|e| e.deleted_at.is_none() && e.expense.user_id == user_id)
            .map(|e| e.expense.clone())
            .filter(|e| matches(query, e))
            .collect();
        rows.sort_by(|a, b| compare(query, a, b));

        let offset = usize::try_from(query.pagination.offset()).unwrap_or(usize::MAX);
        let limit = usize::try_from(query.pagination.limit).unwrap_or(usize::MAX);
        Ok(rows.into_iter().skip(offset).take(limit).collect())
    }

    async fn create(&self, expense: NewExpense) -> StoreResult<Expense> {
        let mut inner = self.lock();
        if !inner.categories.iter().any(|c| c.id == expense.category_id) {
            return Err(StoreError::ForeignKeyViolation("expenses_category_id_fkey".into()));
        }
        if inner.expenses.iter().any(|e| e.expense.id == expense.id) {
            return Err(StoreError::UniqueViolation("expenses_pkey".into()));
        }
        let now = OffsetDateTime::now_utc();
        let row = Expense {
            id: expense.id,
            title: expense.title,
            description: expense.description,
            amount: expense.amount,
            category_id: expense.category_id,
            user_id: expense.user_id,
            created_at: now,
            updated_at: now,
        };
        inner.expenses.push(StoredExpense {
            expense: row.clone(),
            deleted_at: None,
        });
        Ok(row)
    }

    async fn update(&self, user_id: Uuid, id: Uuid, changes: ExpenseChanges) -> StoreResult<bool> {
        let mut guard = self.lock();
        let inner = &mut *guard;
        let category_exists = inner.categories.iter().any(|c| c.id == changes.category_id);
        let Some(row) = inner.expenses.iter_mut().find(|e| {
            e.expense.id == id && e.expense.user_id == user_id && e.deleted_at.is_none()
        }) else {
            return Ok(false);
        };
        if !category_exists {
            return Err(StoreError::ForeignKeyViolation("expenses_category_id_fkey".into()));
        }
        row.expense.title = changes.title;
        row.expense.description = changes.description;
        row.expense.amount = changes.amount;
        row.expense.category_id = changes.category_id;
        row.expense.updated_at = OffsetDateTime::now_utc();
        Ok(true)
    }

    async fn delete(&self, user_id: Uuid, id: Uuid) -> StoreResult<bool> {
        let mut inner = self.lock();
        let Some(row) = inner.expenses.iter_mut().find(|e| {
            e.expense.id == id && e.expense.user_id == user_id && e.deleted_at.is_none()
        }) else {
            return Ok(false);
        };
        row.deleted_at = Some(OffsetDateTime::now_utc());
        Ok(true)
    }
}
