//! Databases: account-level containers of schemas.

use chrono::{DateTime, Utc};
use snowddl_core::validation::{
    err_exactly_one_of, err_one_of, exactly_one_value_set, value_set, ValidationErrors,
};
use snowddl_core::{
    AccountObjectIdentifier, ObjectIdentifier, Result, SchemaObjectIdentifier, Validate,
    ValidationError,
};
use snowddl_derive::{Ddl, ScanRow};

use super::common::{
    validate_ids, validate_tags, CloneAt, LimitFrom, Like, ObjectDetail, ObjectDetailRow,
    TagAssociation,
};
use super::{find_one, Identified};
use crate::client::Client;
use crate::context::Context;
use crate::driver::Driver;
use crate::safe::{safe_drop, safe_show_by_id};

/// `CLONE <source> [AT | BEFORE (...)]` source of a new database.
#[derive(Debug, Clone, Default, Ddl)]
pub struct DatabaseClone {
    #[ddl(identifier)]
    pub source: AccountObjectIdentifier,
    #[ddl(keyword)]
    pub at_or_before: Option<CloneAt>,
}

impl Validate for DatabaseClone {
    fn validate(&self) -> Result<()> {
        let mut errors = ValidationErrors::new();
        errors.identifier(&self.source, "DatabaseClone", "source");
        errors.nested(self.at_or_before.validate());
        errors.finish()
    }
}

/// `CREATE DATABASE` options.
#[derive(Debug, Clone, Default, Ddl)]
pub struct CreateDatabaseOptions {
    #[ddl(static = "CREATE")]
    pub create: (),
    #[ddl(keyword = "OR REPLACE")]
    pub or_replace: Option<bool>,
    #[ddl(keyword = "TRANSIENT")]
    pub transient: Option<bool>,
    #[ddl(static = "DATABASE")]
    pub database: (),
    #[ddl(keyword = "IF NOT EXISTS")]
    pub if_not_exists: Option<bool>,
    #[ddl(identifier)]
    pub name: AccountObjectIdentifier,
    #[ddl(keyword = "CLONE")]
    pub clone: Option<DatabaseClone>,
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

impl Validate for CreateDatabaseOptions {
    fn validate(&self) -> Result<()> {
        const S: &str = "CreateDatabaseOptions";
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

/// Properties changed by `ALTER DATABASE ... SET`.
#[derive(Debug, Clone, Default, Ddl)]
pub struct DatabaseSet {
    #[ddl(parameter = "DATA_RETENTION_TIME_IN_DAYS")]
    pub data_retention_time_in_days: Option<i32>,
    #[ddl(parameter = "MAX_DATA_EXTENSION_TIME_IN_DAYS")]
    pub max_data_extension_time_in_days: Option<i32>,
    #[ddl(parameter = "DEFAULT_DDL_COLLATION", single_quotes)]
    pub default_ddl_collation: Option<String>,
    #[ddl(parameter = "COMMENT", single_quotes)]
    pub comment: Option<String>,
}

/// Properties reset by `ALTER DATABASE ... UNSET`.
#[derive(Debug, Clone, Default, Ddl)]
pub struct DatabaseUnset {
    #[ddl(keyword = "DATA_RETENTION_TIME_IN_DAYS")]
    pub data_retention_time_in_days: Option<bool>,
    #[ddl(keyword = "MAX_DATA_EXTENSION_TIME_IN_DAYS")]
    pub max_data_extension_time_in_days: Option<bool>,
    #[ddl(keyword = "DEFAULT_DDL_COLLATION")]
    pub default_ddl_collation: Option<bool>,
    #[ddl(keyword = "COMMENT")]
    pub comment: Option<bool>,
}

/// `ALTER DATABASE` options. Exactly one action may be set.
#[derive(Debug, Clone, Default, Ddl)]
pub struct AlterDatabaseOptions {
    #[ddl(static = "ALTER DATABASE")]
    pub alter: (),
    #[ddl(keyword = "IF EXISTS")]
    pub if_exists: Option<bool>,
    #[ddl(identifier)]
    pub name: AccountObjectIdentifier,
    #[ddl(identifier = "RENAME TO")]
    pub new_name: Option<AccountObjectIdentifier>,
    #[ddl(identifier = "SWAP WITH")]
    pub swap_with: Option<AccountObjectIdentifier>,
    #[ddl(keyword = "SET")]
    pub set: Option<DatabaseSet>,
    #[ddl(keyword = "UNSET")]
    pub unset: Option<DatabaseUnset>,
    #[ddl(keyword = "SET TAG", no_parentheses)]
    pub set_tag: Vec<TagAssociation>,
    #[ddl(keyword = "UNSET TAG", no_parentheses)]
    pub unset_tag: Vec<SchemaObjectIdentifier>,
}

impl Validate for AlterDatabaseOptions {
    fn validate(&self) -> Result<()> {
        const S: &str = "AlterDatabaseOptions";
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
            ]),
            || {
                err_exactly_one_of(
                    S,
                    &["new_name", "swap_with", "set", "unset", "set_tag", "unset_tag"],
                )
            },
        );
        if let Some(new_name) = &self.new_name {
            errors.identifier(new_name, S, "new_name");
        }
        if let Some(swap_with) = &self.swap_with {
            errors.identifier(swap_with, S, "swap_with");
        }
        if let Some(set) = &self.set {
            errors.check(!value_set(set), || {
                ValidationError::new("DatabaseSet needs at least one property")
            });
        }
        if let Some(unset) = &self.unset {
            errors.check(!value_set(unset), || {
                ValidationError::new("DatabaseUnset needs at least one property")
            });
        }
        validate_tags(&mut errors, &self.set_tag, S, "set_tag");
        validate_ids(&mut errors, &self.unset_tag, S, "unset_tag");
        errors.finish()
    }
}

/// `DROP DATABASE` options.
#[derive(Debug, Clone, Default, Ddl)]
pub struct DropDatabaseOptions {
    #[ddl(static = "DROP DATABASE")]
    pub drop: (),
    #[ddl(keyword = "IF EXISTS")]
    pub if_exists: Option<bool>,
    #[ddl(identifier)]
    pub name: AccountObjectIdentifier,
    #[ddl(keyword = "CASCADE")]
    pub cascade: Option<bool>,
    #[ddl(keyword = "RESTRICT")]
    pub restrict: Option<bool>,
}

impl Validate for DropDatabaseOptions {
    fn validate(&self) -> Result<()> {
        const S: &str = "DropDatabaseOptions";
        let mut errors = ValidationErrors::new();
        errors.identifier(&self.name, S, "name");
        errors.check(
            self.cascade == Some(true) && self.restrict == Some(true),
            || err_one_of(S, &["cascade", "restrict"]),
        );
        errors.finish()
    }
}

/// `SHOW DATABASES` options.
#[derive(Debug, Clone, Default, Ddl)]
pub struct ShowDatabaseOptions {
    #[ddl(static = "SHOW")]
    pub show: (),
    #[ddl(keyword = "TERSE")]
    pub terse: Option<bool>,
    #[ddl(static = "DATABASES")]
    pub databases: (),
    #[ddl(keyword = "HISTORY")]
    pub history: Option<bool>,
    #[ddl(keyword = "LIKE")]
    pub like: Option<Like>,
    #[ddl(parameter = "STARTS WITH", no_equals, single_quotes)]
    pub starts_with: Option<String>,
    #[ddl(keyword = "LIMIT")]
    pub limit: Option<LimitFrom>,
}

impl ShowDatabaseOptions {
    /// Options narrowing the listing to `id`.
    #[must_use]
    pub fn for_id(id: &AccountObjectIdentifier) -> Self {
        Self {
            like: Some(Like::new(id.name())),
            ..Default::default()
        }
    }
}

impl Validate for ShowDatabaseOptions {
    fn validate(&self) -> Result<()> {
        self.limit.validate()
    }
}

/// `DESCRIBE DATABASE` options.
#[derive(Debug, Clone, Default, Ddl)]
pub struct DescribeDatabaseOptions {
    #[ddl(static = "DESCRIBE DATABASE")]
    pub describe: (),
    #[ddl(identifier)]
    pub name: AccountObjectIdentifier,
}

impl Validate for DescribeDatabaseOptions {
    fn validate(&self) -> Result<()> {
        let mut errors = ValidationErrors::new();
        errors.identifier(&self.name, "DescribeDatabaseOptions", "name");
        errors.finish()
    }
}

/// Row of `SHOW DATABASES`. `TERSE` listings omit most columns.
#[derive(Debug, Clone, PartialEq, ScanRow)]
pub struct DatabaseRow {
    pub created_on: Option<DateTime<Utc>>,
    pub name: String,
    pub kind: Option<String>,
    pub is_default: Option<bool>,
    pub is_current: Option<bool>,
    pub origin: Option<String>,
    pub owner: Option<String>,
    pub comment: Option<String>,
    pub options: Option<String>,
    pub retention_time: Option<String>,
    pub dropped_on: Option<DateTime<Utc>>,
    pub owner_role_type: Option<String>,
}

/// A database as listed by `SHOW DATABASES`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Database {
    pub created_on: Option<DateTime<Utc>>,
    pub name: String,
    pub kind: Option<String>,
    pub is_default: bool,
    pub is_current: bool,
    pub origin: Option<String>,
    pub owner: Option<String>,
    pub comment: Option<String>,
    pub transient: bool,
    pub retention_time: Option<i64>,
    pub dropped_on: Option<DateTime<Utc>>,
    pub owner_role_type: Option<String>,
}

impl From<DatabaseRow> for Database {
    fn from(row: DatabaseRow) -> Self {
        let options = row.options.unwrap_or_default();
        Self {
            created_on: row.created_on,
            name: row.name,
            kind: row.kind.filter(|s| !s.is_empty()),
            is_default: row.is_default.unwrap_or(false),
            is_current: row.is_current.unwrap_or(false),
            origin: row.origin.filter(|s| !s.is_empty()),
            owner: row.owner.filter(|s| !s.is_empty()),
            comment: row.comment.filter(|s| !s.is_empty()),
            transient: options.to_ascii_uppercase().contains("TRANSIENT"),
            retention_time: row.retention_time.and_then(|s| s.trim().parse().ok()),
            dropped_on: row.dropped_on,
            owner_role_type: row.owner_role_type.filter(|s| !s.is_empty()),
        }
    }
}

impl Identified for Database {
    type Id = AccountObjectIdentifier;

    fn id(&self) -> Self::Id {
        AccountObjectIdentifier::new(&self.name)
    }
}

/// Database operations.
pub struct Databases<'a, D> {
    client: &'a Client<D>,
}

impl<'a, D: Driver> Databases<'a, D> {
    pub(crate) const fn new(client: &'a Client<D>) -> Self {
        Self { client }
    }

    /// Creates a database.
    pub async fn create(
        &self,
        ctx: &Context,
        id: &AccountObjectIdentifier,
        opts: Option<CreateDatabaseOptions>,
    ) -> Result<()> {
        let mut opts = opts.unwrap_or_default();
        opts.name = id.clone();
        self.client.exec_options(ctx, &opts).await
    }

    /// Alters a database.
    pub async fn alter(
        &self,
        ctx: &Context,
        id: &AccountObjectIdentifier,
        opts: Option<AlterDatabaseOptions>,
    ) -> Result<()> {
        let mut opts = opts.unwrap_or_default();
        opts.name = id.clone();
        self.client.exec_options(ctx, &opts).await
    }

    /// Drops a database.
    pub async fn drop(
        &self,
        ctx: &Context,
        id: &AccountObjectIdentifier,
        opts: Option<DropDatabaseOptions>,
    ) -> Result<()> {
        let mut opts = opts.unwrap_or_default();
        opts.name = id.clone();
        self.client.exec_options(ctx, &opts).await
    }

    /// Lists databases.
    pub async fn show(
        &self,
        ctx: &Context,
        opts: Option<ShowDatabaseOptions>,
    ) -> Result<Vec<Database>> {
        let opts = opts.unwrap_or_default();
        let rows: Vec<DatabaseRow> = self.client.query_options(ctx, &opts).await?;
        Ok(rows.into_iter().map(Database::from).collect())
    }

    /// Returns the database named by `id`.
    pub async fn show_by_id(&self, ctx: &Context, id: &AccountObjectIdentifier) -> Result<Database> {
        let databases = self.show(ctx, Some(ShowDatabaseOptions::for_id(id))).await?;
        find_one(databases, id)
    }

    /// Lists the schemas of a database.
    pub async fn describe(
        &self,
        ctx: &Context,
        id: &AccountObjectIdentifier,
    ) -> Result<Vec<ObjectDetail>> {
        let opts = DescribeDatabaseOptions {
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
        id: &AccountObjectIdentifier,
    ) -> Result<Database> {
        safe_show_by_id(self.client, ctx, id, || self.show_by_id(ctx, id)).await
    }

    /// [`Self::drop`] through [`safe_drop`].
    pub async fn drop_safely(
        &self,
        ctx: &Context,
        id: &AccountObjectIdentifier,
        opts: Option<DropDatabaseOptions>,
    ) -> Result<()> {
        safe_drop(self.client, ctx, id, || self.drop(ctx, id, opts)).await
    }
}
