use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::database::query_builder::{FieldChanges, SqlValue};

pub const COLUMNS: &str = r#"id, title, salary, equity, company_handle AS "companyHandle""#;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: i32,
    pub title: String,
    pub salary: Option<i32>,
    /// Serialized as a decimal string, matching the NUMERIC column
    pub equity: Option<Decimal>,
    #[sqlx(rename = "companyHandle")]
    pub company_handle: String,
}

#[derive(Debug, Clone)]
pub struct NewJob {
    pub title: String,
    pub salary: Option<i32>,
    pub equity: Option<Decimal>,
    pub company_handle: String,
}

/// Job change set. The owning company is fixed at creation.
#[derive(Debug, Clone, Default)]
pub struct JobUpdate {
    pub title: Option<String>,
    pub salary: Option<i32>,
    pub equity: Option<Decimal>,
}

impl JobUpdate {
    pub fn changes(&self) -> FieldChanges {
        let mut changes: FieldChanges = Vec::new();
        if let Some(v) = &self.title {
            changes.push(("title", SqlValue::from(v.as_str())));
        }
        if let Some(v) = self.salary {
            changes.push(("salary", SqlValue::from(v)));
        }
        if let Some(v) = self.equity {
            changes.push(("equity", SqlValue::from(v)));
        }
        changes
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobFilter {
    pub title: Option<String>,
    pub min_salary: Option<i32>,
    pub has_equity: bool,
}
