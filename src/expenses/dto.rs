use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::expenses::repo_types::{Expense, ExpenseChanges};

/// Raw `GET /expenses` query. Everything is kept as text so that bad values
/// fall back to defaults instead of failing extraction.
#[derive(Debug, Default, Deserialize)]
pub struct ListExpensesParams {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub sort_by: Option<String>,
    pub order: Option<String>,
    pub category_id: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ListExpensesResponse {
    pub page: i64,
    pub limit: i64,
    pub expenses: Vec<Expense>,
}

/// Exclusive bound of the `NUMERIC(12, 2)` amount column.
fn max_amount() -> Decimal {
    Decimal::new(10_000_000_000, 0)
}

/// Body of both `POST /expenses` and `PUT /expenses/:id`.
#[derive(Debug, Deserialize)]
pub struct ExpensePayload {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub amount: Decimal,
    pub category_id: Uuid,
}

impl ExpensePayload {
    pub fn validate(self) -> Result<ExpenseChanges, AppError> {
        let title = self.title.trim().to_string();
        if title.is_empty() {
            return Err(AppError::Validation("title is required".into()));
        }
        if self.amount < Decimal::ZERO {
            return Err(AppError::Validation("amount must not be negative".into()));
        }
        if self.amount >= max_amount() {
            return Err(AppError::Validation("amount is too large".into()));
        }
        if self.amount.normalize().scale() > 2 {
            return Err(AppError::Validation(
                "amount must have at most two decimal places".into(),
            ));
        }
        let description = self
            .description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());
        Ok(ExpenseChanges {
            title,
            description,
            amount: self.amount,
            category_id: self.category_id,
        })
    }
}
