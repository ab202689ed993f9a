//! Request validation glue.
//!
//! Request bodies derive [`validator::Validate`]. This module flattens the
//! collected `ValidationErrors` into one message per failure so a single 400
//! response can list them all, and holds the custom rules the derive refers to.

use rust_decimal::Decimal;
use validator::{ValidationError, ValidationErrors};

use crate::error::ApiError;

/// Every field failure as a readable message, grouped by field name
pub fn messages(errors: &ValidationErrors) -> Vec<String> {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));

    fields
        .into_iter()
        .flat_map(|(field, errors)| {
            errors
                .iter()
                .map(move |error| match &error.message {
                    Some(message) => message.to_string(),
                    None => format!("{} is invalid", field),
                })
        })
        .collect()
}

/// Unwrap a field that `#[validate(required)]` has already checked
pub fn required<T>(field: &str, value: Option<T>) -> Result<T, ApiError> {
    value.ok_or_else(|| ApiError::bad_request(vec![format!("{} is required", field)]))
}

/// Fractions such as job equity must lie in `[0, 1]`
pub fn unit_interval(value: &Decimal) -> Result<(), ValidationError> {
    if *value < Decimal::ZERO || *value > Decimal::ONE {
        return Err(ValidationError::new("unit_interval"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Debug, Default, Validate)]
    struct Sample {
        #[validate(required(message = "name is required"), length(min = 1, max = 5, message = "name must be between 1 and 5 characters"))]
        name: Option<String>,
        #[validate(email(message = "email is not a valid email address"))]
        email: Option<String>,
        #[validate(range(min = 0, message = "count must be greater than or equal to 0"))]
        count: Option<i32>,
        #[validate(custom(function = "unit_interval", message = "share must be between 0 and 1"))]
        share: Option<Decimal>,
        #[validate(url(message = "link is not a valid URL"))]
        link: Option<String>,
    }

    #[test]
    fn collects_every_failure() {
        let sample = Sample {
            name: None,
            email: Some("nope".into()),
            count: Some(-1),
            share: Some(Decimal::new(15, 1)),
            link: Some("not-a-url".into()),
        };
        let errors = sample.validate().unwrap_err();

        assert_eq!(
            messages(&errors),
            vec![
                "count must be greater than or equal to 0",
                "email is not a valid email address",
                "link is not a valid URL",
                "name is required",
                "share must be between 0 and 1",
            ]
        );
    }

    #[test]
    fn converts_into_bad_request_list() {
        let errors = Sample::default().validate().unwrap_err();
        let err = ApiError::from(errors);
        assert_eq!(err.status_code(), 400);
        assert_eq!(err.to_json()["error"]["message"], serde_json::json!(["name is required"]));
    }

    #[test]
    fn absent_optional_fields_are_not_checked() {
        let sample = Sample { name: Some("ok".into()), ..Default::default() };
        assert!(sample.validate().is_ok());
    }

    #[test]
    fn length_counts_characters() {
        let sample = Sample { name: Some("ééééé".into()), ..Default::default() };
        assert!(sample.validate().is_ok());

        let sample = Sample { name: Some("toolong".into()), ..Default::default() };
        assert_eq!(
            messages(&sample.validate().unwrap_err()),
            vec!["name must be between 1 and 5 characters"]
        );
    }

    #[test]
    fn unit_interval_bounds_are_inclusive() {
        assert!(unit_interval(&Decimal::ZERO).is_ok());
        assert!(unit_interval(&Decimal::ONE).is_ok());
        assert!(unit_interval(&Decimal::new(-1, 2)).is_err());
        assert!(unit_interval(&Decimal::new(101, 2)).is_err());
    }

    #[test]
    fn required_unwraps_present_values() {
        assert_eq!(required("name", Some(3)).unwrap(), 3);
        assert_eq!(required::<i32>("name", None).unwrap_err().to_string(), "name is required");
    }
}
