use sqlx::PgPool;

use crate::database::models::job::{self, Job, JobFilter, JobUpdate, NewJob};
use crate::database::query_builder::{bind_values, contains_pattern, sql_for_partial_update, WhereClause};

use super::ServiceError;

pub struct JobService {
    pool: PgPool,
}

impl JobService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a job under an existing company
    pub async fn create(&self, new: NewJob) -> Result<Job, ServiceError> {
        let sql = format!(
            "INSERT INTO jobs (title, salary, equity, company_handle)
             VALUES ($1, $2, $3, $4)
             RETURNING {}",
            job::COLUMNS
        );

        sqlx::query_as::<_, Job>(&sql)
            .bind(&new.title)
            .bind(new.salary)
            .bind(new.equity)
            .bind(&new.company_handle)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| match ServiceError::from(e) {
                ServiceError::InvalidReference(_) => {
                    ServiceError::InvalidReference(format!("No company: {}", new.company_handle))
                }
                other => other,
            })
    }

    /// Jobs matching every given filter, ordered by title
    pub async fn find_all(&self, filter: &JobFilter) -> Result<Vec<Job>, ServiceError> {
        let mut clause = WhereClause::new();
        if let Some(min) = filter.min_salary {
            clause.push("salary", ">=", min);
        }
        if filter.has_equity {
            clause.push_raw("equity > 0");
        }
        if let Some(title) = filter.title.as_deref().filter(|t| !t.is_empty()) {
            clause.push("title", "ILIKE", contains_pattern(title));
        }

        let sql = format!("SELECT {} FROM jobs{} ORDER BY title", job::COLUMNS, clause.to_sql());
        let jobs = bind_values(sqlx::query_as::<_, Job>(&sql), clause.values())
            .fetch_all(&self.pool)
            .await?;

        Ok(jobs)
    }

    pub async fn get(&self, id: i32) -> Result<Job, ServiceError> {
        let sql = format!("SELECT {} FROM jobs WHERE id = $1", job::COLUMNS);

        sqlx::query_as::<_, Job>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| not_found(id))
    }

    pub async fn update(&self, id: i32, update: &JobUpdate) -> Result<Job, ServiceError> {
        let changes = update.changes();
        let partial = sql_for_partial_update(&changes, &[])?;
        let sql = format!(
            "UPDATE jobs SET {} WHERE id = ${} RETURNING {}",
            partial.set_clause,
            partial.next_param(),
            job::COLUMNS
        );

        bind_values(sqlx::query_as::<_, Job>(&sql), &partial.values)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| not_found(id))
    }

    pub async fn remove(&self, id: i32) -> Result<(), ServiceError> {
        sqlx::query_as::<_, (i32,)>("DELETE FROM jobs WHERE id = $1 RETURNING id")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(|_| ())
            .ok_or_else(|| not_found(id))
    }
}

fn not_found(id: i32) -> ServiceError {
    ServiceError::NotFound(format!("No job: {}", id))
}
