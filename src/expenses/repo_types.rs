use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// Live expense row. Tombstoned rows are never loaded into this type.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Expense {
    pub id: Uuid,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub amount: Decimal,
    pub category_id: Uuid,
    pub user_id: Uuid,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct NewExpense {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub amount: Decimal,
    pub category_id: Uuid,
    pub user_id: Uuid,
}

/// Full replacement of the mutable fields.
#[derive(Debug, Clone)]
pub struct ExpenseChanges {
    pub title: String,
    pub description: Option<String>,
    pub amount: Decimal,
    pub category_id: Uuid,
}
