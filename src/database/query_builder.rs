use rust_decimal::Decimal;
use sqlx::{
    postgres::{PgArguments, PgRow},
    query::QueryAs,
    FromRow, Postgres,
};
use thiserror::Error;

/// A value bound to a positional `$n` parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqlValue {
    Text(String),
    Integer(i32),
    Decimal(Decimal),
    Bool(bool),
}

impl From<String> for SqlValue {
    fn from(v: String) -> Self {
        SqlValue::Text(v)
    }
}

impl From<&str> for SqlValue {
    fn from(v: &str) -> Self {
        SqlValue::Text(v.to_string())
    }
}

impl From<i32> for SqlValue {
    fn from(v: i32) -> Self {
        SqlValue::Integer(v)
    }
}

impl From<Decimal> for SqlValue {
    fn from(v: Decimal) -> Self {
        SqlValue::Decimal(v)
    }
}

impl From<bool> for SqlValue {
    fn from(v: bool) -> Self {
        SqlValue::Bool(v)
    }
}

/// Ordered field → new value pairs for a partial update
pub type FieldChanges = Vec<(&'static str, SqlValue)>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SqlBuildError {
    #[error("No data")]
    NoData,
}

/// SET-clause fragment (`"col1"=$1, "col2"=$2`) with its values in placeholder order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartialUpdate {
    pub set_clause: String,
    pub values: Vec<SqlValue>,
}

impl PartialUpdate {
    /// Placeholder index available for the WHERE clause that follows the SET values
    pub fn next_param(&self) -> usize {
        self.values.len() + 1
    }
}

/// Translate sparse field changes into a SQL assignment list.
///
/// `column_names` maps application field names to storage columns; fields
/// without an entry are used verbatim. Input order is preserved. Column
/// existence and value types are left for the store to check.
pub fn sql_for_partial_update(
    changes: &[(&str, SqlValue)],
    column_names: &[(&str, &str)],
) -> Result<PartialUpdate, SqlBuildError> {
    if changes.is_empty() {
        return Err(SqlBuildError::NoData);
    }

    let assignments: Vec<String> = changes
        .iter()
        .enumerate()
        .map(|(idx, (field, _))| {
            let column = column_names
                .iter()
                .find(|(name, _)| name == field)
                .map_or(*field, |(_, column)| *column);
            format!("{}=${}", quote_identifier(column), idx + 1)
        })
        .collect();

    Ok(PartialUpdate {
        set_clause: assignments.join(", "),
        values: changes.iter().map(|(_, value)| value.clone()).collect(),
    })
}

/// AND-joined WHERE conditions with their bound values
#[derive(Debug, Default)]
pub struct WhereClause {
    conditions: Vec<String>,
    values: Vec<SqlValue>,
}

impl WhereClause {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `<expr> <op> $n`, binding `value` to the next placeholder
    pub fn push(&mut self, expr: &str, op: &str, value: impl Into<SqlValue>) {
        self.values.push(value.into());
        self.conditions.push(format!("{} {} ${}", expr, op, self.values.len()));
    }

    /// Add a condition that binds nothing
    pub fn push_raw(&mut self, condition: &str) {
        self.conditions.push(condition.to_string());
    }

    /// ` WHERE a AND b`, or an empty string when there are no conditions
    pub fn to_sql(&self) -> String {
        if self.conditions.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", self.conditions.join(" AND "))
        }
    }

    pub fn values(&self) -> &[SqlValue] {
        &self.values
    }
}

/// Case-insensitive substring pattern for ILIKE with wildcard characters escaped
pub fn contains_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

/// Quote SQL identifier to prevent injection
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Bind each value in order to the query's placeholders
pub fn bind_values<'q, O>(
    mut q: QueryAs<'q, Postgres, O, PgArguments>,
    values: &'q [SqlValue],
) -> QueryAs<'q, Postgres, O, PgArguments>
where
    O: for<'r> FromRow<'r, PgRow>,
{
    for v in values {
        q = match v {
            SqlValue::Text(s) => q.bind(s.as_str()),
            SqlValue::Integer(i) => q.bind(*i),
            SqlValue::Decimal(d) => q.bind(*d),
            SqlValue::Bool(b) => q.bind(*b),
        };
    }
    q
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_field_without_translation() {
        let update = sql_for_partial_update(&[("firstName", "New".into())], &[]).unwrap();
        assert_eq!(update.set_clause, "\"firstName\"=$1");
        assert_eq!(update.values, vec![SqlValue::Text("New".into())]);
        assert_eq!(update.next_param(), 2);
    }

    #[test]
    fn translates_mapped_fields_and_keeps_order() {
        let update = sql_for_partial_update(
            &[
                ("name", "Acme".into()),
                ("numEmployees", 12.into()),
                ("logoUrl", "http://acme.test/logo.png".into()),
            ],
            &[("numEmployees", "num_employees"), ("logoUrl", "logo_url")],
        )
        .unwrap();

        assert_eq!(update.set_clause, "\"name\"=$1, \"num_employees\"=$2, \"logo_url\"=$3");
        assert_eq!(
            update.values,
            vec![
                SqlValue::Text("Acme".into()),
                SqlValue::Integer(12),
                SqlValue::Text("http://acme.test/logo.png".into()),
            ]
        );
    }

    #[test]
    fn empty_changes_fail() {
        assert_eq!(sql_for_partial_update(&[], &[("a", "b")]), Err(SqlBuildError::NoData));
    }

    #[test]
    fn quotes_embedded_quotes() {
        let update = sql_for_partial_update(&[("we\"ird", true.into())], &[]).unwrap();
        assert_eq!(update.set_clause, "\"we\"\"ird\"=$1");
    }

    #[test]
    fn where_clause_numbers_placeholders() {
        let mut clause = WhereClause::new();
        assert_eq!(clause.to_sql(), "");

        clause.push("num_employees", ">=", 5);
        clause.push_raw("equity > 0");
        clause.push("name", "ILIKE", contains_pattern("net"));

        assert_eq!(clause.to_sql(), " WHERE num_employees >= $1 AND equity > 0 AND name ILIKE $2");
        assert_eq!(clause.values(), &[SqlValue::Integer(5), SqlValue::Text("%net%".into())]);
    }

    #[test]
    fn pattern_escapes_wildcards() {
        assert_eq!(contains_pattern("50%_off\\"), "%50\\%\\_off\\\\%");
    }
}
