use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::database::query_builder::{FieldChanges, SqlValue};

/// Request field → column names that differ between the two
pub const COLUMN_NAMES: &[(&str, &str)] = &[("numEmployees", "num_employees"), ("logoUrl", "logo_url")];

/// Selected with `num_employees AS "numEmployees"` style aliases so rows map directly
pub const COLUMNS: &str = r#"handle, name, description, num_employees AS "numEmployees", logo_url AS "logoUrl""#;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub handle: String,
    pub name: String,
    pub description: String,
    #[sqlx(rename = "numEmployees")]
    pub num_employees: Option<i32>,
    #[sqlx(rename = "logoUrl")]
    pub logo_url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewCompany {
    pub handle: String,
    pub name: String,
    pub description: String,
    pub num_employees: Option<i32>,
    pub logo_url: Option<String>,
}

/// Sparse company change set; `None` fields are left untouched
#[derive(Debug, Clone, Default)]
pub struct CompanyUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub num_employees: Option<i32>,
    pub logo_url: Option<String>,
}

impl CompanyUpdate {
    pub fn changes(&self) -> FieldChanges {
        let mut changes: FieldChanges = Vec::new();
        if let Some(v) = &self.name {
            changes.push(("name", SqlValue::from(v.as_str())));
        }
        if let Some(v) = &self.description {
            changes.push(("description", SqlValue::from(v.as_str())));
        }
        if let Some(v) = self.num_employees {
            changes.push(("numEmployees", SqlValue::from(v)));
        }
        if let Some(v) = &self.logo_url {
            changes.push(("logoUrl", SqlValue::from(v.as_str())));
        }
        changes
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompanyFilter {
    pub min_employees: Option<i32>,
    pub max_employees: Option<i32>,
    pub name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::query_builder::sql_for_partial_update;

    #[test]
    fn update_translates_camel_case_fields() {
        let update = CompanyUpdate {
            num_employees: Some(7),
            logo_url: Some("http://new.img".into()),
            ..Default::default()
        };
        let sql = sql_for_partial_update(&update.changes(), COLUMN_NAMES).unwrap();

        assert_eq!(sql.set_clause, "\"num_employees\"=$1, \"logo_url\"=$2");
    }

    #[test]
    fn empty_update_has_no_changes() {
        assert!(CompanyUpdate::default().changes().is_empty());
    }

    #[test]
    fn serializes_camel_case() {
        let company = Company {
            handle: "c1".into(),
            name: "C1".into(),
            description: "Desc1".into(),
            num_employees: Some(1),
            logo_url: None,
        };
        let value = serde_json::to_value(&company).unwrap();
        assert_eq!(value["numEmployees"], 1);
        assert!(value["logoUrl"].is_null());
    }
}
