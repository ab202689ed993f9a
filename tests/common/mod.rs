#![allow(dead_code)]

use anyhow::{Context, Result};
use jobly_api::{
    auth::TokenSubject,
    config::{AppConfig, Environment},
    database::Database,
    server,
    state::AppState,
};
use reqwest::StatusCode;
use serde_json::Value;
use tokio::net::TcpListener;
use uuid::Uuid;

/// Tables used by the API. Created on demand; existing tables are left alone.
const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS companies (
        handle VARCHAR(25) PRIMARY KEY,
        name TEXT UNIQUE NOT NULL,
        num_employees INTEGER CHECK (num_employees >= 0),
        description TEXT NOT NULL,
        logo_url TEXT
    )",
    "CREATE TABLE IF NOT EXISTS jobs (
        id SERIAL PRIMARY KEY,
        title TEXT NOT NULL,
        salary INTEGER CHECK (salary >= 0),
        equity NUMERIC CHECK (equity <= 1.0),
        company_handle VARCHAR(25) NOT NULL REFERENCES companies ON DELETE CASCADE
    )",
    "CREATE TABLE IF NOT EXISTS users (
        username VARCHAR(30) PRIMARY KEY,
        password TEXT NOT NULL,
        first_name TEXT NOT NULL,
        last_name TEXT NOT NULL,
        email TEXT UNIQUE NOT NULL CHECK (position('@' IN email) > 1),
        is_admin BOOLEAN NOT NULL DEFAULT FALSE
    )",
];

/// Serializes schema setup across concurrently running tests
const SCHEMA_LOCK_KEY: i64 = 7_310_001;

pub struct TestServer {
    pub base_url: String,
    pub state: AppState,
    pub client: reqwest::Client,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Token signed with the server's key; no matching user row is needed
    pub fn token(&self, username: &str, is_admin: bool) -> String {
        self.state
            .tokens
            .issue(&TokenSubject::new(username, is_admin))
            .expect("token issue")
    }

    pub fn admin_token(&self) -> String {
        self.token("test-admin", true)
    }
}

fn test_config() -> AppConfig {
    let mut config = AppConfig::for_environment(Environment::Test);
    if let Ok(url) = std::env::var("DATABASE_URL") {
        config.database.url = url;
    }
    config
}

async fn start(config: AppConfig, db: Database) -> Result<TestServer> {
    // Pick an unused port for isolation
    let port = portpicker::pick_unused_port().context("failed to pick free port")?;
    let listener = TcpListener::bind(("127.0.0.1", port)).await?;
    let state = AppState::new(config, db);

    let app = server::app(state.clone());
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    // The listener is already bound, so requests queue until the server task picks them up
    Ok(TestServer {
        base_url: format!("http://127.0.0.1:{}", port),
        state,
        client: reqwest::Client::new(),
    })
}

/// Server whose pool connects lazily; enough for requests that never reach the database
pub async fn spawn_server() -> Result<TestServer> {
    let config = test_config();
    let db = Database::connect_lazy(&config.database)?;
    start(config, db).await
}

/// Server backed by a real database, or `None` when `DATABASE_URL` is not set
pub async fn spawn_with_database() -> Result<Option<TestServer>> {
    if std::env::var("DATABASE_URL").is_err() {
        eprintln!("DATABASE_URL not set; skipping database-backed test");
        return Ok(None);
    }

    let config = test_config();
    let db = Database::connect(&config.database).await?;
    create_schema(&db).await?;
    start(config, db).await.map(Some)
}

async fn create_schema(db: &Database) -> Result<()> {
    let mut conn = db.pool().acquire().await?;
    sqlx::query("SELECT pg_advisory_lock($1)")
        .bind(SCHEMA_LOCK_KEY)
        .execute(&mut *conn)
        .await?;
    for statement in SCHEMA {
        sqlx::query(statement).execute(&mut *conn).await?;
    }
    sqlx::query("SELECT pg_advisory_unlock($1)")
        .bind(SCHEMA_LOCK_KEY)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

/// Short lowercase key that will not collide with other tests
pub fn unique(prefix: &str) -> String {
    format!("{}-{}", prefix, &Uuid::new_v4().simple().to_string()[..10])
}

pub async fn json(resp: reqwest::Response) -> Result<(StatusCode, Value)> {
    let status = resp.status();
    let body = resp.json::<Value>().await?;
    Ok((status, body))
}
