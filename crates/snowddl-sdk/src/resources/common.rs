//! Clauses and rows shared by several resources.

use chrono::{DateTime, Utc};
use snowddl_core::validation::{
    err_exactly_one_of, err_not_set, err_one_of, exactly_one_value_set, ValidationErrors,
};
use snowddl_core::{
    AccountObjectIdentifier, DatabaseObjectIdentifier, Result, SchemaObjectIdentifier, Validate,
};
use snowddl_derive::{Ddl, ScanRow};

/// `LIKE '<pattern>'` filter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Ddl)]
pub struct Like {
    #[ddl(keyword, single_quotes)]
    pub pattern: String,
}

impl Like {
    /// Creates a filter matching `pattern`.
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
        }
    }
}

/// `IN ACCOUNT | DATABASE <db> | SCHEMA <schema>` scope.
#[derive(Debug, Clone, Default, PartialEq, Eq, Ddl)]
pub struct In {
    #[ddl(keyword = "ACCOUNT")]
    pub account: Option<bool>,
    #[ddl(identifier = "DATABASE")]
    pub database: Option<AccountObjectIdentifier>,
    #[ddl(identifier = "SCHEMA")]
    pub schema: Option<DatabaseObjectIdentifier>,
}

impl In {
    /// Scope covering the whole account.
    #[must_use]
    pub fn account() -> Self {
        Self {
            account: Some(true),
            ..Default::default()
        }
    }

    /// Scope covering one database.
    #[must_use]
    pub fn database(id: AccountObjectIdentifier) -> Self {
        Self {
            database: Some(id),
            ..Default::default()
        }
    }

    /// Scope covering one schema.
    #[must_use]
    pub fn schema(id: DatabaseObjectIdentifier) -> Self {
        Self {
            schema: Some(id),
            ..Default::default()
        }
    }
}

impl Validate for In {
    fn validate(&self) -> Result<()> {
        let mut errors = ValidationErrors::new();
        errors.check(
            !exactly_one_value_set(&[&self.account, &self.database, &self.schema]),
            || err_exactly_one_of("In", &["account", "database", "schema"]),
        );
        if let Some(database) = &self.database {
            errors.identifier(database, "In", "database");
        }
        if let Some(schema) = &self.schema {
            errors.identifier(schema, "In", "schema");
        }
        errors.finish()
    }
}

/// `LIMIT <rows> [FROM '<name>']` pagination.
#[derive(Debug, Clone, Default, PartialEq, Eq, Ddl)]
pub struct LimitFrom {
    #[ddl(keyword)]
    pub rows: Option<i32>,
    #[ddl(parameter = "FROM", no_equals, single_quotes)]
    pub from: Option<String>,
}

impl Validate for LimitFrom {
    fn validate(&self) -> Result<()> {
        let mut errors = ValidationErrors::new();
        errors.check(self.rows.is_none(), || err_not_set("LimitFrom", "rows"));
        errors.finish()
    }
}

/// `<tag> = '<value>'` pair used by `WITH TAG` and `SET TAG`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Ddl)]
pub struct TagAssociation {
    #[ddl(identifier)]
    pub name: SchemaObjectIdentifier,
    #[ddl(static = "=")]
    pub eq: (),
    #[ddl(keyword, single_quotes)]
    pub value: String,
}

impl TagAssociation {
    /// Creates a tag assignment.
    pub fn new(name: SchemaObjectIdentifier, value: impl Into<String>) -> Self {
        Self {
            name,
            value: value.into(),
            ..Default::default()
        }
    }
}

/// Validates every tag name and value in `tags`.
///
/// An empty value would emit a dangling `=`.
pub(crate) fn validate_tags(
    errors: &mut ValidationErrors,
    tags: &[TagAssociation],
    structure: &'static str,
    field: &'static str,
) {
    for tag in tags {
        errors.identifier(&tag.name, structure, field);
        errors.check(tag.value.is_empty(), || {
            err_not_set(structure, &format!("{field}.value"))
        });
    }
}

/// Validates every identifier in `ids`.
pub(crate) fn validate_ids(
    errors: &mut ValidationErrors,
    ids: &[SchemaObjectIdentifier],
    structure: &'static str,
    field: &'static str,
) {
    for id in ids {
        errors.identifier(id, structure, field);
    }
}

/// Time-travel point: `TIMESTAMP => '...'`, `OFFSET => n` or `STATEMENT => '...'`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Ddl)]
pub struct TimeTravel {
    #[ddl(parameter = "TIMESTAMP =>", no_equals, single_quotes)]
    pub timestamp: Option<String>,
    #[ddl(parameter = "OFFSET =>", no_equals)]
    pub offset: Option<i64>,
    #[ddl(parameter = "STATEMENT =>", no_equals, single_quotes)]
    pub statement: Option<String>,
}

impl Validate for TimeTravel {
    fn validate(&self) -> Result<()> {
        let mut errors = ValidationErrors::new();
        errors.check(
            !exactly_one_value_set(&[&self.timestamp, &self.offset, &self.statement]),
            || err_exactly_one_of("TimeTravel", &["timestamp", "offset", "statement"]),
        );
        errors.finish()
    }
}

/// `AT (...)` / `BEFORE (...)` suffix of a clone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Ddl)]
pub struct CloneAt {
    #[ddl(keyword = "AT", parentheses)]
    pub at: Option<TimeTravel>,
    #[ddl(keyword = "BEFORE", parentheses)]
    pub before: Option<TimeTravel>,
}

impl Validate for CloneAt {
    fn validate(&self) -> Result<()> {
        let mut errors = ValidationErrors::new();
        errors.check(self.at.is_some() && self.before.is_some(), || {
            err_one_of("CloneAt", &["at", "before"])
        });
        errors.nested(self.at.validate());
        errors.nested(self.before.validate());
        errors.finish()
    }
}

/// Row returned by `DESCRIBE DATABASE | SCHEMA | WAREHOUSE`.
#[derive(Debug, Clone, PartialEq, ScanRow)]
pub struct ObjectDetailRow {
    pub created_on: Option<DateTime<Utc>>,
    pub name: String,
    pub kind: Option<String>,
}

/// One object listed by a describe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectDetail {
    pub created_on: Option<DateTime<Utc>>,
    pub name: String,
    pub kind: Option<String>,
}

impl From<ObjectDetailRow> for ObjectDetail {
    fn from(row: ObjectDetailRow) -> Self {
        Self {
            created_on: row.created_on,
            name: row.name,
            kind: row.kind.filter(|kind| !kind.is_empty()),
        }
    }
}

/// `property` / `value` row returned by describes of parameterised objects.
#[derive(Debug, Clone, PartialEq, Eq, ScanRow)]
pub struct PropertyRow {
    pub property: String,
    pub value: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use snowddl_core::Ddl;

    #[test]
    fn test_in_renders_each_scope() {
        assert_eq!(In::account().to_ddl().unwrap(), "ACCOUNT");
        assert_eq!(
            In::database(AccountObjectIdentifier::new("db")).to_ddl().unwrap(),
            r#"DATABASE "db""#
        );
        assert_eq!(
            In::schema(DatabaseObjectIdentifier::new("db", "sc")).to_ddl().unwrap(),
            r#"SCHEMA "db"."sc""#
        );
    }

    #[test]
    fn test_in_requires_exactly_one_scope() {
        assert!(In::default().validate().is_err());
        let both = In {
            account: Some(true),
            database: Some(AccountObjectIdentifier::new("db")),
            ..Default::default()
        };
        assert!(both.validate().is_err());
        assert!(In::account().validate().is_ok());
    }

    #[test]
    fn test_limit_from() {
        let limit = LimitFrom {
            rows: Some(10),
            from: Some(String::from("WH_B")),
        };
        assert_eq!(limit.to_ddl().unwrap(), "10 FROM 'WH_B'");
        assert!(LimitFrom::default().validate().is_err());
    }

    #[test]
    fn test_time_travel() {
        let at = CloneAt {
            at: Some(TimeTravel {
                offset: Some(-60),
                ..Default::default()
            }),
            ..Default::default()
        };
        assert_eq!(at.to_ddl().unwrap(), "AT (OFFSET => -60)");
        assert!(at.validate().is_ok());

        let both = CloneAt {
            at: Some(TimeTravel::default()),
            before: Some(TimeTravel::default()),
        };
        let err = both.validate().unwrap_err();
        assert_eq!(err.errors().len(), 3);
    }

    #[test]
    fn test_tag_association() {
        let tag = TagAssociation::new(SchemaObjectIdentifier::new("db", "sc", "cost"), "1'0");
        assert_eq!(tag.to_ddl().unwrap(), r#""db"."sc"."cost" = '1''0'"#);
    }

    #[test]
    fn test_tag_without_value_is_rejected() {
        let mut errors = ValidationErrors::default();
        let tags = [TagAssociation::new(SchemaObjectIdentifier::new("db", "sc", "cost"), "")];
        validate_tags(&mut errors, &tags, "AlterWarehouseOptions", "set_tag");
        let err = errors.finish().unwrap_err();
        assert!(err.to_string().contains("set_tag.value"));
    }
}
