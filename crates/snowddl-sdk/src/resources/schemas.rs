//! Schemas: database-level containers of tables, alerts and functions.

use chrono::{DateTime, Utc};
use snowddl_core::validation::{
    err_exactly_one_of, err_one_of, exactly_one_value_set, value_set, ValidationErrors,
};
use snowddl_core::{
    DatabaseObjectIdentifier, ObjectIdentifier, Result, SchemaObjectIdentifier, Validate,
    ValidationError,
};
use snowddl_derive::{Ddl, ScanRow};

use super::common::{
    validate_ids, validate_tags, CloneAt, In, LimitFrom, Like, ObjectDetail, ObjectDetailRow,
    TagAssociation,
};
use super::{find_one, Identified};
use crate::client::Client;
use crate::context::Context;
use crate::driver::Driver;
use crate::safe::{safe_drop, safe_show_by_id};

/// `CLONE <source> [AT | BEFORE (...)]` source of a new schema.
#[derive(Debug, Clone, Default, Ddl)]
pub struct SchemaClone {
    #[ddl(identifier)]
    pub source: DatabaseObjectIdentifier,
    #[ddl(keyword)]
    pub at_or_before: Option<CloneAt>,
}

impl Validate for SchemaClone {
    fn validate(&self) -> Result<()> {
        let mut errors = ValidationErrors::new();
        errors.identifier(&self.source, "SchemaClone", "source");
        errors.nested(self.at_or_before.validate());
        errors.finish()
    }
}

/// `CREATE SCHEMA` options.
#[derive(Debug, Clone, Default, Ddl)]
pub struct CreateSchemaOptions {
    #[ddl(static = "CREATE")]
    pub create: (),
    #[ddl(keyword = "OR REPLACE")]
    pub or_replace: Option<bool>,
    #[ddl(keyword = "TRANSIENT")]
    pub transient: Option<bool>,
    #[ddl(static = "SCHEMA")]
    pub schema: (),
    #[ddl(keyword = "IF NOT EXISTS")]
    pub if_not_exists: Option<bool>,
    #[ddl(identifier)]
    pub name: DatabaseObjectIdentifier,
    #[ddl(keyword = "CLONE")]
    pub clone: Option<SchemaClone>,
    #[ddl(keyword = "WITH MANAGED ACCESS")]
    pub with_managed_access: Option<bool>,
    #[ddl(parameter = "DATA_RETENTION_TIME_IN_DAYS")]
    pub data_retention_time_in_days: Option<i32>,
    #[ddl(parameter = "MAX_DATA_EXTENSION_TIME_IN_DAYS")]
    pub max_data_extension_time_in_days: Option<i32>,
    #[ddl(parameter = "DEFAULT_DDL_COLLATION", single_quotes)]
    pub default_ddl_collation: Option<String>,
    #[ddl(parameter = "COMMENT", single_quotes)]
    pub comment: Option<String>,
    #[ddl(keyword = "WITH TAG", parentheses)]
    pub tag: Vec<TagAssociation>,
}

impl Validate for CreateSchemaOptions {
    fn validate(&self) -> Result<()> {
        const S: &str = "CreateSchemaOptions";
        let mut errors = ValidationErrors::new();
        errors.identifier(&self.name, S, "name");
        errors.check(
            self.or_replace == Some(true) && self.if_not_exists == Some(true),
            || err_one_of(S, &["or_replace", "if_not_exists"]),
        );
        errors.nested(self.clone.validate());
        validate_tags(&mut errors, &self.tag, S, "tag");
        errors.finish()
    }
}

/// Properties changed by `ALTER SCHEMA ... SET`.
#[derive(Debug, Clone, Default, Ddl)]
pub struct SchemaSet {
    #[ddl(parameter = "DATA_RETENTION_TIME_IN_DAYS")]
    pub data_retention_time_in_days: Option<i32>,
    #[ddl(parameter = "MAX_DATA_EXTENSION_TIME_IN_DAYS")]
    pub max_data_extension_time_in_days: Option<i32>,
    #[ddl(parameter = "DEFAULT_DDL_COLLATION", single_quotes)]
    pub default_ddl_collation: Option<String>,
    #[ddl(parameter = "COMMENT", single_quotes)]
    pub comment: Option<String>,
}

/// Properties reset by `ALTER SCHEMA ... UNSET`.
#[derive(Debug, Clone, Default, Ddl)]
pub struct SchemaUnset {
    #[ddl(keyword = "DATA_RETENTION_TIME_IN_DAYS")]
    pub data_retention_time_in_days: Option<bool>,
    #[ddl(keyword = "MAX_DATA_EXTENSION_TIME_IN_DAYS")]
    pub max_data_extension_time_in_days: Option<bool>,
    #[ddl(keyword = "DEFAULT_DDL_COLLATION")]
    pub default_ddl_collation: Option<bool>,
    #[ddl(keyword = "COMMENT")]
    pub comment: Option<bool>,
}

/// `ALTER SCHEMA` options. Exactly one action may be set.
#[derive(Debug, Clone, Default, Ddl)]
pub struct AlterSchemaOptions {
    #[ddl(static = "ALTER SCHEMA")]
    pub alter: (),
    #[ddl(keyword = "IF EXISTS")]
    pub if_exists: Option<bool>,
    #[ddl(identifier)]
    pub name: DatabaseObjectIdentifier,
    #[ddl(identifier = "RENAME TO")]
    pub new_name: Option<DatabaseObjectIdentifier>,
    #[ddl(identifier = "SWAP WITH")]
    pub swap_with: Option<DatabaseObjectIdentifier>,
    #[ddl(keyword = "SET")]
    pub set: Option<SchemaSet>,
    #[ddl(keyword = "UNSET")]
    pub unset: Option<SchemaUnset>,
    #[ddl(keyword = "SET TAG", no_parentheses)]
    pub set_tag: Vec<TagAssociation>,
    #[ddl(keyword = "UNSET TAG", no_parentheses)]
    pub unset_tag: Vec<SchemaObjectIdentifier>,
    #[ddl(keyword = "ENABLE MANAGED ACCESS")]
    pub enable_managed_access: Option<bool>,
    #[ddl(keyword = "DISABLE MANAGED ACCESS")]
    pub disable_managed_access: Option<bool>,
}

impl Validate for AlterSchemaOptions {
    fn validate(&self) -> Result<()> {
        const S: &str = "AlterSchemaOptions";
        let mut errors = ValidationErrors::new();
        errors.identifier(&self.name, S, "name");
        errors.check(
            !exactly_one_value_set(&[
                &self.new_name,
                &self.swap_with,
                &self.set,
                &self.unset,
                &self.set_tag,
                &self.unset_tag,
                &self.enable_managed_access,
                &self.disable_managed_access,
            ]),
            || {
                err_exactly_one_of(
                    S,
                    &[
                        "new_name",
                        "swap_with",
                        "set",
                        "unset",
                        "set_tag",
                        "unset_tag",
                        "enable_managed_access",
                        "disable_managed_access",
                    ],
                )
            },
        );
        if let Some(new_name) = &self.new_name {
            errors.identifier(new_name, S, "new_name");
            errors.check(new_name.database_name() != self.name.database_name(), || {
                ValidationError::new(
                    "AlterSchemaOptions.new_name must stay in the same database",
                )
            });
        }
        if let Some(swap_with) = &self.swap_with {
            errors.identifier(swap_with, S, "swap_with");
        }
        if let Some(set) = &self.set {
            errors.check(!value_set(set), || {
                ValidationError::new("SchemaSet needs at least one property")
            });
        }
        if let Some(unset) = &self.unset {
            errors.check(!value_set(unset), || {
                ValidationError::new("SchemaUnset needs at least one property")
            });
        }
        validate_tags(&mut errors, &self.set_tag, S, "set_tag");
        validate_ids(&mut errors, &self.unset_tag, S, "unset_tag");
        errors.finish()
    }
}

/// `DROP SCHEMA` options.
#[derive(Debug, Clone, Default, Ddl)]
pub struct DropSchemaOptions {
    #[ddl(static = "DROP SCHEMA")]
    pub drop: (),
    #[ddl(keyword = "IF EXISTS")]
    pub if_exists: Option<bool>,
    #[ddl(identifier)]
    pub name: DatabaseObjectIdentifier,
    #[ddl(keyword = "CASCADE")]
    pub cascade: Option<bool>,
    #[ddl(keyword = "RESTRICT")]
    pub restrict: Option<bool>,
}

impl Validate for DropSchemaOptions {
    fn validate(&self) -> Result<()> {
        const S: &str = "DropSchemaOptions";
        let mut errors = ValidationErrors::new();
        errors.identifier(&self.name, S, "name");
        errors.check(
            self.cascade == Some(true) && self.restrict == Some(true),
            || err_one_of(S, &["cascade", "restrict"]),
        );
        errors.finish()
    }
}

/// `SHOW SCHEMAS` options.
#[derive(Debug, Clone, Default, Ddl)]
pub struct ShowSchemaOptions {
    #[ddl(static = "SHOW")]
    pub show: (),
    #[ddl(keyword = "TERSE")]
    pub terse: Option<bool>,
    #[ddl(static = "SCHEMAS")]
    pub schemas: (),
    #[ddl(keyword = "HISTORY")]
    pub history: Option<bool>,
    #[ddl(keyword = "LIKE")]
    pub like: Option<Like>,
    #[ddl(keyword = "IN")]
    pub in_: Option<In>,
    #[ddl(parameter = "STARTS WITH", no_equals, single_quotes)]
    pub starts_with: Option<String>,
    #[ddl(keyword = "LIMIT")]
    pub limit: Option<LimitFrom>,
}

impl ShowSchemaOptions {
    /// Options narrowing the listing to `id` inside its database.
    #[must_use]
    pub fn for_id(id: &DatabaseObjectIdentifier) -> Self {
        Self {
            like: Some(Like::new(id.name())),
            in_: Some(In::database(id.database_id())),
            ..Default::default()
        }
    }
}

impl Validate for ShowSchemaOptions {
    fn validate(&self) -> Result<()> {
        let mut errors = ValidationErrors::new();
        errors.nested(self.in_.validate());
        errors.nested(self.limit.validate());
        errors.finish()
    }
}

/// `DESCRIBE SCHEMA` options.
#[derive(Debug, Clone, Default, Ddl)]
pub struct DescribeSchemaOptions {
    #[ddl(static = "DESCRIBE SCHEMA")]
    pub describe: (),
    #[ddl(identifier)]
    pub name: DatabaseObjectIdentifier,
}

impl Validate for DescribeSchemaOptions {
    fn validate(&self) -> Result<()> {
        let mut errors = ValidationErrors::new();
        errors.identifier(&self.name, "DescribeSchemaOptions", "name");
        errors.finish()
    }
}

/// Row of `SHOW SCHEMAS`.
#[derive(Debug, Clone, PartialEq, ScanRow)]
pub struct SchemaRow {
    pub created_on: Option<DateTime<Utc>>,
    pub name: String,
    pub kind: Option<String>,
    pub database_name: String,
    pub is_default: Option<bool>,
    pub is_current: Option<bool>,
    pub owner: Option<String>,
    pub comment: Option<String>,
    pub options: Option<String>,
    pub retention_time: Option<String>,
    pub dropped_on: Option<DateTime<Utc>>,
    pub owner_role_type: Option<String>,
}

/// A schema as listed by `SHOW SCHEMAS`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    pub created_on: Option<DateTime<Utc>>,
    pub name: String,
    pub database_name: String,
    pub kind: Option<String>,
    pub is_default: bool,
    pub is_current: bool,
    pub owner: Option<String>,
    pub comment: Option<String>,
    pub transient: bool,
    pub managed_access: bool,
    pub retention_time: Option<i64>,
    pub dropped_on: Option<DateTime<Utc>>,
    pub owner_role_type: Option<String>,
}

impl From<SchemaRow> for Schema {
    fn from(row: SchemaRow) -> Self {
        let options = row.options.unwrap_or_default().to_ascii_uppercase();
        Self {
            created_on: row.created_on,
            name: row.name,
            database_name: row.database_name,
            kind: row.kind.filter(|s| !s.is_empty()),
            is_default: row.is_default.unwrap_or(false),
            is_current: row.is_current.unwrap_or(false),
            owner: row.owner.filter(|s| !s.is_empty()),
            comment: row.comment.filter(|s| !s.is_empty()),
            transient: options.contains("TRANSIENT"),
            managed_access: options.contains("MANAGED ACCESS"),
            retention_time: row.retention_time.and_then(|s| s.trim().parse().ok()),
            dropped_on: row.dropped_on,
            owner_role_type: row.owner_role_type.filter(|s| !s.is_empty()),
        }
    }
}

impl Identified for Schema {
    type Id = DatabaseObjectIdentifier;

    fn id(&self) -> Self::Id {
        DatabaseObjectIdentifier::new(&self.database_name, &self.name)
    }
}

/// Schema operations.
pub struct Schemas<'a, D> {
    client: &'a Client<D>,
}

impl<'a, D: Driver> Schemas<'a, D> {
    pub(crate) const fn new(client: &'a Client<D>) -> Self {
        Self { client }
    }

    /// Creates a schema.
    pub async fn create(
        &self,
        ctx: &Context,
        id: &DatabaseObjectIdentifier,
        opts: Option<CreateSchemaOptions>,
    ) -> Result<()> {
        let mut opts = opts.unwrap_or_default();
        opts.name = id.clone();
        self.client.exec_options(ctx, &opts).await
    }

    /// Alters a schema.
    pub async fn alter(
        &self,
        ctx: &Context,
        id: &DatabaseObjectIdentifier,
        opts: Option<AlterSchemaOptions>,
    ) -> Result<()> {
        let mut opts = opts.unwrap_or_default();
        opts.name = id.clone();
        self.client.exec_options(ctx, &opts).await
    }

    /// Drops a schema.
    pub async fn drop(
        &self,
        ctx: &Context,
        id: &DatabaseObjectIdentifier,
        opts: Option<DropSchemaOptions>,
    ) -> Result<()> {
        let mut opts = opts.unwrap_or_default();
        opts.name = id.clone();
        self.client.exec_options(ctx, &opts).await
    }

    /// Lists schemas.
    pub async fn show(&self, ctx: &Context, opts: Option<ShowSchemaOptions>) -> Result<Vec<Schema>> {
        let opts = opts.unwrap_or_default();
        let rows: Vec<SchemaRow> = self.client.query_options(ctx, &opts).await?;
        Ok(rows.into_iter().map(Schema::from).collect())
    }

    /// Returns the schema named by `id`.
    pub async fn show_by_id(&self, ctx: &Context, id: &DatabaseObjectIdentifier) -> Result<Schema> {
        let schemas = self.show(ctx, Some(ShowSchemaOptions::for_id(id))).await?;
        find_one(schemas, id)
    }

    /// Lists the objects of a schema.
    pub async fn describe(
        &self,
        ctx: &Context,
        id: &DatabaseObjectIdentifier,
    ) -> Result<Vec<ObjectDetail>> {
        let opts = DescribeSchemaOptions {
            name: id.clone(),
            ..Default::default()
        };
        let rows: Vec<ObjectDetailRow> = self.client.query_options(ctx, &opts).await?;
        Ok(rows.into_iter().map(ObjectDetail::from).collect())
    }

    /// [`Self::show_by_id`] through [`safe_show_by_id`].
    pub async fn show_by_id_safely(
        &self,
        ctx: &Context,
        id: &DatabaseObjectIdentifier,
    ) -> Result<Schema> {
        safe_show_by_id(self.client, ctx, id, || self.show_by_id(ctx, id)).await
    }

    /// [`Self::drop`] through [`safe_drop`].
    pub async fn drop_safely(
        &self,
        ctx: &Context,
        id: &DatabaseObjectIdentifier,
        opts: Option<DropSchemaOptions>,
    ) -> Result<()> {
        safe_drop(self.client, ctx, id, || self.drop(ctx, id, opts)).await
    }
}
