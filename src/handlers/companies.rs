use axum::extract::State;
use serde::Deserialize;
use serde_json::{json, Value};
use validator::Validate;

use crate::api::{required, JsonBody, PathParam, QueryParams};
use crate::database::models::{CompanyFilter, CompanyUpdate, NewCompany};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct NewCompanyBody {
    #[validate(
        required(message = "handle is required"),
        length(min = 1, max = 25, message = "handle must be between 1 and 25 characters")
    )]
    pub handle: Option<String>,

    #[validate(
        required(message = "name is required"),
        length(min = 1, max = 128, message = "name must be between 1 and 128 characters")
    )]
    pub name: Option<String>,

    #[validate(required(message = "description is required"))]
    pub description: Option<String>,

    #[validate(range(min = 0, message = "numEmployees must be greater than or equal to 0"))]
    pub num_employees: Option<i32>,

    #[validate(url(message = "logoUrl is not a valid URL"))]
    pub logo_url: Option<String>,
}

impl NewCompanyBody {
    fn into_company(self) -> Result<NewCompany, ApiError> {
        self.validate()?;
        Ok(NewCompany {
            handle: required("handle", self.handle)?,
            name: required("name", self.name)?,
            description: required("description", self.description)?,
            num_employees: self.num_employees,
            logo_url: self.logo_url,
        })
    }
}

/// PATCH body. The handle is not accepted here, so it can never change.
#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct CompanyUpdateBody {
    #[validate(length(min = 1, max = 128, message = "name must be between 1 and 128 characters"))]
    pub name: Option<String>,

    pub description: Option<String>,

    #[validate(range(min = 0, message = "numEmployees must be greater than or equal to 0"))]
    pub num_employees: Option<i32>,

    #[validate(url(message = "logoUrl is not a valid URL"))]
    pub logo_url: Option<String>,
}

impl CompanyUpdateBody {
    fn into_update(self) -> Result<CompanyUpdate, ApiError> {
        self.validate()?;
        Ok(CompanyUpdate {
            name: self.name,
            description: self.description,
            num_employees: self.num_employees,
            logo_url: self.logo_url,
        })
    }
}

/// Raw query string; numbers are parsed by hand so bad input gets a readable message
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyQuery {
    pub min_employees: Option<String>,
    pub max_employees: Option<String>,
    pub name: Option<String>,
}

impl CompanyQuery {
    fn into_filter(self) -> Result<CompanyFilter, ApiError> {
        let min_employees = parse_int("minEmployees", self.min_employees.as_deref())?;
        let max_employees = parse_int("maxEmployees", self.max_employees.as_deref())?;

        if let (Some(min), Some(max)) = (min_employees, max_employees) {
            if min > max {
                return Err(ApiError::bad_request("minEmployees cannot be greater than maxEmployees."));
            }
        }

        Ok(CompanyFilter {
            min_employees,
            max_employees,
            name: self.name.filter(|name| !name.is_empty()),
        })
    }
}

pub(crate) fn parse_int(field: &str, raw: Option<&str>) -> Result<Option<i32>, ApiError> {
    raw.map(|s| {
        s.trim()
            .parse::<i32>()
            .map_err(|_| ApiError::bad_request(format!("{} must be an integer", field)))
    })
    .transpose()
}

/// POST /companies
pub async fn create(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<NewCompanyBody>,
) -> ApiResult<Value> {
    let company = state.companies().create(body.into_company()?).await?;
    Ok(ApiResponse::created(json!({ "company": company })))
}

/// GET /companies?minEmployees=&maxEmployees=&name=
pub async fn list(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<CompanyQuery>,
) -> ApiResult<Value> {
    let filter = query.into_filter()?;
    let companies = state.companies().find_all(&filter).await?;
    Ok(ApiResponse::success(json!({ "companies": companies })))
}

/// GET /companies/:handle
pub async fn show(State(state): State<AppState>, PathParam(handle): PathParam<String>) -> ApiResult<Value> {
    let company = state.companies().get(&handle).await?;
    Ok(ApiResponse::success(json!({ "company": company })))
}

/// PATCH /companies/:handle
pub async fn update(
    State(state): State<AppState>,
    PathParam(handle): PathParam<String>,
    JsonBody(body): JsonBody<CompanyUpdateBody>,
) -> ApiResult<Value> {
    let company = state.companies().update(&handle, &body.into_update()?).await?;
    Ok(ApiResponse::success(json!({ "company": company })))
}

/// DELETE /companies/:handle
pub async fn delete(State(state): State<AppState>, PathParam(handle): PathParam<String>) -> ApiResult<Value> {
    state.companies().remove(&handle).await?;
    Ok(ApiResponse::success(json!({ "deleted": handle })))
}
