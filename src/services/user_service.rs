use sqlx::PgPool;
use tracing::debug;

use crate::auth::{hash_password, verify_password};
use crate::database::models::user::{self, NewUser, User, UserRecord, UserUpdate};
use crate::database::query_builder::{bind_values, sql_for_partial_update, SqlValue};

use super::ServiceError;

/// Argon2id hash with default parameters that no password matches
const UNKNOWN_USER_HASH: &str =
    "$argon2id$v=19$m=19456,t=2,p=1$c29tZXNhbHRzb21lc2FsdA$AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA";

pub struct UserService {
    pool: PgPool,
}

impl UserService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Store a new user with a hashed password
    pub async fn register(&self, new: NewUser) -> Result<User, ServiceError> {
        let password_hash = hash_password(&new.password)?;
        let sql = format!(
            "INSERT INTO users (username, password, first_name, last_name, email, is_admin)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {}",
            user::COLUMNS
        );

        sqlx::query_as::<_, User>(&sql)
            .bind(&new.username)
            .bind(&password_hash)
            .bind(&new.first_name)
            .bind(&new.last_name)
            .bind(&new.email)
            .bind(new.is_admin)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| duplicate(e, &new.username))
    }

    /// Same as [`register`](Self::register); named for the admin-facing create route
    pub async fn create(&self, new: NewUser) -> Result<User, ServiceError> {
        self.register(new).await
    }

    /// Check credentials; unknown users and wrong passwords fail the same way
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<User, ServiceError> {
        let sql = format!("SELECT {}, password FROM users WHERE username = $1", user::COLUMNS);
        let record = sqlx::query_as::<_, UserRecord>(&sql)
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;

        let verified = match &record {
            Some(record) => verify_password(password, &record.password)?,
            None => {
                // Unknown users pay the same hashing cost as wrong passwords
                let _ = verify_password(password, UNKNOWN_USER_HASH);
                false
            }
        };

        match record {
            Some(record) if verified => Ok(record.user),
            _ => {
                debug!("Rejected credentials for {}", username);
                Err(ServiceError::InvalidCredentials)
            }
        }
    }

    pub async fn find_all(&self) -> Result<Vec<User>, ServiceError> {
        let sql = format!("SELECT {} FROM users ORDER BY username", user::COLUMNS);
        let users = sqlx::query_as::<_, User>(&sql).fetch_all(&self.pool).await?;
        Ok(users)
    }

    pub async fn get(&self, username: &str) -> Result<User, ServiceError> {
        let sql = format!("SELECT {} FROM users WHERE username = $1", user::COLUMNS);

        sqlx::query_as::<_, User>(&sql)
            .bind(username)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| not_found(username))
    }

    /// Partial update; a new password is hashed before it is stored
    pub async fn update(&self, username: &str, update: &UserUpdate) -> Result<User, ServiceError> {
        let mut changes = update.changes();
        if let Some(password) = &update.password {
            changes.push(("password", SqlValue::Text(hash_password(password)?)));
        }

        let partial = sql_for_partial_update(&changes, user::COLUMN_NAMES)?;
        let sql = format!(
            "UPDATE users SET {} WHERE username = ${} RETURNING {}",
            partial.set_clause,
            partial.next_param(),
            user::COLUMNS
        );

        bind_values(sqlx::query_as::<_, User>(&sql), &partial.values)
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| duplicate(e, username))?
            .ok_or_else(|| not_found(username))
    }

    pub async fn remove(&self, username: &str) -> Result<(), ServiceError> {
        sqlx::query_as::<_, (String,)>("DELETE FROM users WHERE username = $1 RETURNING username")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?
            .map(|_| ())
            .ok_or_else(|| not_found(username))
    }
}

fn not_found(username: &str) -> ServiceError {
    ServiceError::NotFound(format!("No user: {}", username))
}

/// Username and email are both unique; the violated constraint tells which one clashed
fn duplicate(error: sqlx::Error, username: &str) -> ServiceError {
    match ServiceError::from(error) {
        ServiceError::Conflict(constraint) if constraint.contains("email") => {
            ServiceError::Conflict("Duplicate email".to_string())
        }
        ServiceError::Conflict(_) => ServiceError::Conflict(format!("Duplicate username: {}", username)),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_user_hash_parses_and_never_matches() {
        assert!(!verify_password("password", UNKNOWN_USER_HASH).unwrap());
        assert!(!verify_password("", UNKNOWN_USER_HASH).unwrap());
    }

    #[test]
    fn non_conflict_errors_pass_through() {
        let err = duplicate(sqlx::Error::RowNotFound, "u1");
        assert!(matches!(err, ServiceError::NotFound(_)));
    }
}
