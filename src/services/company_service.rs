use sqlx::PgPool;

use crate::database::models::company::{self, Company, CompanyFilter, CompanyUpdate, NewCompany};
use crate::database::query_builder::{bind_values, contains_pattern, sql_for_partial_update, WhereClause};

use super::ServiceError;

pub struct CompanyService {
    pool: PgPool,
}

impl CompanyService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a company; a taken handle or name is a conflict
    pub async fn create(&self, new: NewCompany) -> Result<Company, ServiceError> {
        let sql = format!(
            "INSERT INTO companies (handle, name, description, num_employees, logo_url)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {}",
            company::COLUMNS
        );

        sqlx::query_as::<_, Company>(&sql)
            .bind(&new.handle)
            .bind(&new.name)
            .bind(&new.description)
            .bind(new.num_employees)
            .bind(&new.logo_url)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| duplicate(e, &new.handle, Some(new.name.as_str())))
    }

    /// Companies matching every given filter, ordered by name
    pub async fn find_all(&self, filter: &CompanyFilter) -> Result<Vec<Company>, ServiceError> {
        let mut clause = WhereClause::new();
        if let Some(min) = filter.min_employees {
            clause.push("num_employees", ">=", min);
        }
        if let Some(max) = filter.max_employees {
            clause.push("num_employees", "<=", max);
        }
        if let Some(name) = filter.name.as_deref().filter(|n| !n.is_empty()) {
            clause.push("name", "ILIKE", contains_pattern(name));
        }

        let sql = format!("SELECT {} FROM companies{} ORDER BY name", company::COLUMNS, clause.to_sql());
        let companies = bind_values(sqlx::query_as::<_, Company>(&sql), clause.values())
            .fetch_all(&self.pool)
            .await?;

        Ok(companies)
    }

    pub async fn get(&self, handle: &str) -> Result<Company, ServiceError> {
        let sql = format!("SELECT {} FROM companies WHERE handle = $1", company::COLUMNS);

        sqlx::query_as::<_, Company>(&sql)
            .bind(handle)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| not_found(handle))
    }

    /// Apply a partial update. The handle itself is never part of the change set.
    pub async fn update(&self, handle: &str, update: &CompanyUpdate) -> Result<Company, ServiceError> {
        let changes = update.changes();
        let partial = sql_for_partial_update(&changes, company::COLUMN_NAMES)?;
        let sql = format!(
            "UPDATE companies SET {} WHERE handle = ${} RETURNING {}",
            partial.set_clause,
            partial.next_param(),
            company::COLUMNS
        );

        bind_values(sqlx::query_as::<_, Company>(&sql), &partial.values)
            .bind(handle)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| duplicate(e, handle, update.name.as_deref()))?
            .ok_or_else(|| not_found(handle))
    }

    pub async fn remove(&self, handle: &str) -> Result<(), ServiceError> {
        sqlx::query_as::<_, (String,)>("DELETE FROM companies WHERE handle = $1 RETURNING handle")
            .bind(handle)
            .fetch_optional(&self.pool)
            .await?
            .map(|_| ())
            .ok_or_else(|| not_found(handle))
    }
}

fn not_found(handle: &str) -> ServiceError {
    ServiceError::NotFound(format!("No company: {}", handle))
}

/// Handle and name are both unique; the violated constraint tells which one clashed
fn duplicate(error: sqlx::Error, handle: &str, name: Option<&str>) -> ServiceError {
    match (ServiceError::from(error), name) {
        (ServiceError::Conflict(constraint), Some(name)) if names_column(&constraint) => {
            ServiceError::Conflict(format!("Duplicate company name: {}", name))
        }
        (ServiceError::Conflict(_), _) => ServiceError::Conflict(format!("Duplicate company: {}", handle)),
        (other, _) => other,
    }
}

/// `companies_name_key` and the like; the primary key is `companies_pkey`
fn names_column(constraint: &str) -> bool {
    constraint.contains("name")
}
