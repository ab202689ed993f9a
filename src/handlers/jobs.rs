use axum::extract::State;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{json, Value};
use validator::Validate;

use super::companies::parse_int;
use crate::api::validation::unit_interval;
use crate::api::{required, JsonBody, PathParam, QueryParams};
use crate::database::models::{JobFilter, JobUpdate, NewJob};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct NewJobBody {
    #[validate(required(message = "title is required"), length(min = 1, message = "title must not be empty"))]
    pub title: Option<String>,

    #[validate(range(min = 0, message = "salary must be greater than or equal to 0"))]
    pub salary: Option<i32>,

    #[validate(custom(function = "unit_interval", message = "equity must be between 0 and 1"))]
    pub equity: Option<Decimal>,

    #[validate(required(message = "companyHandle is required"))]
    pub company_handle: Option<String>,
}

impl NewJobBody {
    fn into_job(self) -> Result<NewJob, ApiError> {
        self.validate()?;
        Ok(NewJob {
            title: required("title", self.title)?,
            salary: self.salary,
            equity: self.equity,
            company_handle: required("companyHandle", self.company_handle)?,
        })
    }
}

/// PATCH body. Neither the id nor the owning company can be changed.
#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct JobUpdateBody {
    #[validate(length(min = 1, message = "title must not be empty"))]
    pub title: Option<String>,

    #[validate(range(min = 0, message = "salary must be greater than or equal to 0"))]
    pub salary: Option<i32>,

    #[validate(custom(function = "unit_interval", message = "equity must be between 0 and 1"))]
    pub equity: Option<Decimal>,
}

impl JobUpdateBody {
    fn into_update(self) -> Result<JobUpdate, ApiError> {
        self.validate()?;
        Ok(JobUpdate {
            title: self.title,
            salary: self.salary,
            equity: self.equity,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobQuery {
    pub title: Option<String>,
    pub min_salary: Option<String>,
    pub has_equity: Option<String>,
}

impl JobQuery {
    fn into_filter(self) -> Result<JobFilter, ApiError> {
        let min_salary = parse_int("minSalary", self.min_salary.as_deref())?;
        let has_equity = match self.has_equity.as_deref().map(str::trim) {
            None | Some("") | Some("false") => false,
            Some("true") => true,
            Some(_) => return Err(ApiError::bad_request("hasEquity must be true or false")),
        };

        Ok(JobFilter {
            title: self.title.filter(|title| !title.is_empty()),
            min_salary,
            has_equity,
        })
    }
}

/// Ids that are not integers cannot name a job, so they read as missing
fn parse_id(raw: &str) -> Result<i32, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::not_found(format!("No job: {}", raw)))
}

/// POST /jobs
pub async fn create(State(state): State<AppState>, JsonBody(body): JsonBody<NewJobBody>) -> ApiResult<Value> {
    let job = state.jobs().create(body.into_job()?).await?;
    Ok(ApiResponse::created(json!({ "job": job })))
}

/// GET /jobs?title=&minSalary=&hasEquity=
pub async fn list(State(state): State<AppState>, QueryParams(query): QueryParams<JobQuery>) -> ApiResult<Value> {
    let filter = query.into_filter()?;
    let jobs = state.jobs().find_all(&filter).await?;
    Ok(ApiResponse::success(json!({ "jobs": jobs })))
}

/// GET /jobs/:id
pub async fn show(State(state): State<AppState>, PathParam(id): PathParam<String>) -> ApiResult<Value> {
    let job = state.jobs().get(parse_id(&id)?).await?;
    Ok(ApiResponse::success(json!({ "job": job })))
}

/// PATCH /jobs/:id
pub async fn update(
    State(state): State<AppState>,
    PathParam(id): PathParam<String>,
    JsonBody(body): JsonBody<JobUpdateBody>,
) -> ApiResult<Value> {
    let id = parse_id(&id)?;
    let job = state.jobs().update(id, &body.into_update()?).await?;
    Ok(ApiResponse::success(json!({ "job": job })))
}

/// DELETE /jobs/:id
pub async fn delete(State(state): State<AppState>, PathParam(id): PathParam<String>) -> ApiResult<Value> {
    let id = parse_id(&id)?;
    state.jobs().remove(id).await?;
    Ok(ApiResponse::success(json!({ "deleted": id })))
}
