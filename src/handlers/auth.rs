use axum::extract::State;
use serde::Deserialize;
use serde_json::{json, Value};
use validator::Validate;

use super::users::NewUserBody;
use crate::api::{required, JsonBody};
use crate::auth::TokenSubject;
use crate::database::models::NewUser;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct TokenRequest {
    #[validate(required(message = "username is required"))]
    pub username: Option<String>,

    #[validate(required(message = "password is required"))]
    pub password: Option<String>,
}

impl TokenRequest {
    fn into_credentials(self) -> Result<(String, String), ApiError> {
        self.validate()?;
        Ok((required("username", self.username)?, required("password", self.password)?))
    }
}

/// Self-registration. Always creates a regular (non-admin) user.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct RegisterRequest {
    pub username: Option<String>,
    pub password: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
}

impl RegisterRequest {
    fn into_user(self) -> Result<NewUser, ApiError> {
        NewUserBody {
            username: self.username,
            password: self.password,
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            is_admin: None,
        }
        .into_user()
    }
}

/// POST /auth/token - exchange credentials for a token
pub async fn token(State(state): State<AppState>, JsonBody(body): JsonBody<TokenRequest>) -> ApiResult<Value> {
    let (username, password) = body.into_credentials()?;
    let user = state.users().authenticate(&username, &password).await?;
    let token = state.tokens.issue(&TokenSubject::new(user.username, user.is_admin))?;
    Ok(ApiResponse::success(json!({ "token": token })))
}

/// POST /auth/register
pub async fn register(State(state): State<AppState>, JsonBody(body): JsonBody<RegisterRequest>) -> ApiResult<Value> {
    let user = state.users().register(body.into_user()?).await?;
    let token = state.tokens.issue(&TokenSubject::new(user.username, user.is_admin))?;
    Ok(ApiResponse::created(json!({ "token": token })))
}
