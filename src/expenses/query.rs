//! Listing parameters for expenses. Parsing never fails: anything that does
//! not parse falls back to its default.

use time::{macros::format_description, Date, OffsetDateTime};
use uuid::Uuid;

use crate::expenses::dto::ListExpensesParams;

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_LIMIT: i64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortBy {
    #[default]
    Date,
    Amount,
}

impl SortBy {
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some("amount") => SortBy::Amount,
            _ => SortBy::Date,
        }
    }

    pub fn column(self) -> &'static str {
        match self {
            SortBy::Date => "created_at",
            SortBy::Amount => "amount",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some("asc") => SortOrder::Asc,
            _ => SortOrder::Desc,
        }
    }

    pub fn keyword(self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl Pagination {
    /// Pages below 1 become 1; non-positive limits become the default.
    pub fn new(page: Option<i64>, limit: Option<i64>) -> Self {
        Self {
            page: page.filter(|p| *p >= 1).unwrap_or(DEFAULT_PAGE),
            limit: limit.filter(|l| *l >= 1).unwrap_or(DEFAULT_LIMIT),
        }
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpenseFilter {
    pub category_id: Option<Uuid>,
    pub start_date: Option<Date>,
    pub end_date: Option<Date>,
}

impl ExpenseFilter {
    /// Inclusive lower bound on `created_at`.
    pub fn created_from(&self) -> Option<OffsetDateTime> {
        self.start_date.map(|d| d.midnight().assume_utc())
    }

    /// Exclusive upper bound on `created_at`: midnight after `end_date`.
    pub fn created_before(&self) -> Option<OffsetDateTime> {
        self.end_date
            .and_then(Date::next_day)
            .map(|d| d.midnight().assume_utc())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpenseQuery {
    pub filter: ExpenseFilter,
    pub pagination: Pagination,
    pub sort_by: SortBy,
    pub order: SortOrder,
}

fn parse_date(raw: &str) -> Option<Date> {
    Date::parse(raw.trim(), format_description!("[year]-[month]-[day]")).ok()
}

fn parse_int(raw: &Option<String>) -> Option<i64> {
    raw.as_deref().and_then(|v| v.trim().parse::<i64>().ok())
}

impl From<&ListExpensesParams> for ExpenseQuery {
    fn from(params: &ListExpensesParams) -> Self {
        Self {
            filter: ExpenseFilter {
                category_id: params
                    .category_id
                    .as_deref()
                    .and_then(|v| Uuid::parse_str(v.trim()).ok()),
                start_date: params.start_date.as_deref().and_then(parse_date),
                end_date: params.end_date.as_deref().and_then(parse_date),
            },
            pagination: Pagination::new(parse_int(&params.page), parse_int(&params.limit)),
            sort_by: SortBy::parse(params.sort_by.as_deref()),
            order: SortOrder::parse(params.order.as_deref()),
        }
    }
}
