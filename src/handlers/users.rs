use axum::extract::State;
use serde::Deserialize;
use serde_json::{json, Value};
use validator::Validate;

use crate::api::{required, JsonBody, PathParam};
use crate::auth::TokenSubject;
use crate::database::models::{NewUser, UserUpdate};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, RequestContext};
use crate::state::AppState;

/// Admin-created user; unlike self-registration this may set `isAdmin`
#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct NewUserBody {
    #[validate(
        required(message = "username is required"),
        length(min = 1, max = 30, message = "username must be between 1 and 30 characters")
    )]
    pub username: Option<String>,

    #[validate(
        required(message = "password is required"),
        length(min = 5, max = 20, message = "password must be between 5 and 20 characters")
    )]
    pub password: Option<String>,

    #[validate(
        required(message = "firstName is required"),
        length(min = 1, max = 30, message = "firstName must be between 1 and 30 characters")
    )]
    pub first_name: Option<String>,

    #[validate(
        required(message = "lastName is required"),
        length(min = 1, max = 30, message = "lastName must be between 1 and 30 characters")
    )]
    pub last_name: Option<String>,

    #[validate(
        required(message = "email is required"),
        length(min = 6, max = 60, message = "email must be between 6 and 60 characters"),
        email(message = "email is not a valid email address")
    )]
    pub email: Option<String>,

    pub is_admin: Option<bool>,
}

impl NewUserBody {
    pub(crate) fn into_user(self) -> Result<NewUser, ApiError> {
        self.validate()?;
        Ok(NewUser {
            username: required("username", self.username)?,
            password: required("password", self.password)?,
            first_name: required("firstName", self.first_name)?,
            last_name: required("lastName", self.last_name)?,
            email: required("email", self.email)?,
            is_admin: self.is_admin.unwrap_or(false),
        })
    }
}

/// PATCH body. The username is the key and is not accepted.
#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct UserUpdateBody {
    #[validate(length(min = 1, max = 30, message = "firstName must be between 1 and 30 characters"))]
    pub first_name: Option<String>,

    #[validate(length(min = 1, max = 30, message = "lastName must be between 1 and 30 characters"))]
    pub last_name: Option<String>,

    #[validate(length(min = 5, max = 20, message = "password must be between 5 and 20 characters"))]
    pub password: Option<String>,

    #[validate(
        length(min = 6, max = 60, message = "email must be between 6 and 60 characters"),
        email(message = "email is not a valid email address")
    )]
    pub email: Option<String>,

    pub is_admin: Option<bool>,
}

impl UserUpdateBody {
    fn into_update(self) -> Result<UserUpdate, ApiError> {
        self.validate()?;
        Ok(UserUpdate {
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            password: self.password,
            is_admin: self.is_admin,
        })
    }
}

/// POST /users
pub async fn create(State(state): State<AppState>, JsonBody(body): JsonBody<NewUserBody>) -> ApiResult<Value> {
    let user = state.users().create(body.into_user()?).await?;
    let token = state.tokens.issue(&TokenSubject::new(&user.username, user.is_admin))?;
    Ok(ApiResponse::created(json!({ "user": user, "token": token })))
}

/// GET /users
pub async fn list(State(state): State<AppState>) -> ApiResult<Value> {
    let users = state.users().find_all().await?;
    Ok(ApiResponse::success(json!({ "users": users })))
}

/// GET /users/:username
pub async fn show(State(state): State<AppState>, PathParam(username): PathParam<String>) -> ApiResult<Value> {
    let user = state.users().get(&username).await?;
    Ok(ApiResponse::success(json!({ "user": user })))
}

/// PATCH /users/:username. Only admins may change the admin flag.
pub async fn update(
    State(state): State<AppState>,
    ctx: RequestContext,
    PathParam(username): PathParam<String>,
    JsonBody(body): JsonBody<UserUpdateBody>,
) -> ApiResult<Value> {
    if body.is_admin.is_some() {
        ctx.require_admin()?;
    }
    let user = state.users().update(&username, &body.into_update()?).await?;
    Ok(ApiResponse::success(json!({ "user": user })))
}

/// DELETE /users/:username
pub async fn delete(State(state): State<AppState>, PathParam(username): PathParam<String>) -> ApiResult<Value> {
    state.users().remove(&username).await?;
    Ok(ApiResponse::success(json!({ "deleted": username })))
}
