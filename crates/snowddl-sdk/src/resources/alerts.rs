//! Alerts: scheduled conditions that run an action when they hold.

use chrono::{DateTime, Utc};
use snowddl_core::validation::{
    err_exactly_one_of, err_not_set, err_one_of, exactly_one_value_set, value_set, ValidationErrors,
};
use snowddl_core::{
    ddl_enum, AccountObjectIdentifier, ObjectIdentifier, Result, SchemaObjectIdentifier, Validate,
    ValidationError,
};
use snowddl_derive::{Ddl, ScanRow};

use super::common::{In, Like};
use super::{find_one, Identified};
use crate::client::Client;
use crate::context::Context;
use crate::driver::Driver;
use crate::safe::{safe_drop, safe_show_by_id};

ddl_enum! {
    /// `ALTER ALERT` state change.
    pub enum AlertOperation {
        Resume => "RESUME",
        Suspend => "SUSPEND",
    }
}

ddl_enum! {
    /// State reported by `SHOW ALERTS`.
    pub enum AlertState {
        Started => "STARTED",
        Suspended => "SUSPENDED",
    }
}

/// `IF (EXISTS (<query>))` guard of an alert.
#[derive(Debug, Clone, Default, PartialEq, Eq, Ddl)]
pub struct AlertCondition {
    #[ddl(keyword = "EXISTS", parentheses)]
    pub exists: String,
}

impl AlertCondition {
    /// Creates a condition from the query whose rows trigger the alert.
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            exists: query.into(),
        }
    }
}

/// `CREATE ALERT` options.
#[derive(Debug, Clone, Default, Ddl)]
pub struct CreateAlertOptions {
    #[ddl(static = "CREATE")]
    pub create: (),
    #[ddl(keyword = "OR REPLACE")]
    pub or_replace: Option<bool>,
    #[ddl(static = "ALERT")]
    pub alert: (),
    #[ddl(keyword = "IF NOT EXISTS")]
    pub if_not_exists: Option<bool>,
    #[ddl(identifier)]
    pub name: SchemaObjectIdentifier,
    #[ddl(identifier = "WAREHOUSE", equals)]
    pub warehouse: AccountObjectIdentifier,
    #[ddl(parameter = "SCHEDULE", single_quotes)]
    pub schedule: String,
    #[ddl(parameter = "COMMENT", single_quotes)]
    pub comment: Option<String>,
    #[ddl(keyword = "IF", parentheses)]
    pub condition: AlertCondition,
    #[ddl(keyword = "THEN")]
    pub action: String,
}

impl Validate for CreateAlertOptions {
    fn validate(&self) -> Result<()> {
        const S: &str = "CreateAlertOptions";
        let mut errors = ValidationErrors::new();
        errors.identifier(&self.name, S, "name");
        errors.identifier(&self.warehouse, S, "warehouse");
        errors.check(
            self.or_replace == Some(true) && self.if_not_exists == Some(true),
            || err_one_of(S, &["or_replace", "if_not_exists"]),
        );
        errors.check(self.schedule.trim().is_empty(), || err_not_set(S, "schedule"));
        errors.check(self.condition.exists.trim().is_empty(), || {
            err_not_set(S, "condition")
        });
        errors.check(self.action.trim().is_empty(), || err_not_set(S, "action"));
        errors.finish()
    }
}

/// Properties changed by `ALTER ALERT ... SET`.
#[derive(Debug, Clone, Default, Ddl)]
pub struct AlertSet {
    #[ddl(identifier = "WAREHOUSE", equals)]
    pub warehouse: Option<AccountObjectIdentifier>,
    #[ddl(parameter = "SCHEDULE", single_quotes)]
    pub schedule: Option<String>,
    #[ddl(parameter = "COMMENT", single_quotes)]
    pub comment: Option<String>,
}

/// Properties reset by `ALTER ALERT ... UNSET`.
#[derive(Debug, Clone, Default, Ddl)]
pub struct AlertUnset {
    #[ddl(keyword = "WAREHOUSE")]
    pub warehouse: Option<bool>,
    #[ddl(keyword = "SCHEDULE")]
    pub schedule: Option<bool>,
    #[ddl(keyword = "COMMENT")]
    pub comment: Option<bool>,
}

/// `ALTER ALERT` options. Exactly one action may be set.
#[derive(Debug, Clone, Default, Ddl)]
pub struct AlterAlertOptions {
    #[ddl(static = "ALTER ALERT")]
    pub alter: (),
    #[ddl(keyword = "IF EXISTS")]
    pub if_exists: Option<bool>,
    #[ddl(identifier)]
    pub name: SchemaObjectIdentifier,
    #[ddl(keyword)]
    pub operation: Option<AlertOperation>,
    #[ddl(keyword = "SET")]
    pub set: Option<AlertSet>,
    #[ddl(keyword = "UNSET")]
    pub unset: Option<AlertUnset>,
    #[ddl(keyword = "MODIFY CONDITION EXISTS", parentheses)]
    pub modify_condition: Option<String>,
    #[ddl(keyword = "MODIFY ACTION")]
    pub modify_action: Option<String>,
}

impl Validate for AlterAlertOptions {
    fn validate(&self) -> Result<()> {
        const S: &str = "AlterAlertOptions";
        let mut errors = ValidationErrors::new();
        errors.identifier(&self.name, S, "name");
        errors.check(
            !exactly_one_value_set(&[
                &self.operation,
                &self.set,
                &self.unset,
                &self.modify_condition,
                &self.modify_action,
            ]),
            || {
                err_exactly_one_of(
                    S,
                    &["operation", "set", "unset", "modify_condition", "modify_action"],
                )
            },
        );
        if let Some(set) = &self.set {
            errors.check(!value_set(set), || {
                ValidationError::new("AlertSet needs at least one property")
            });
            if let Some(warehouse) = &set.warehouse {
                errors.identifier(warehouse, "AlertSet", "warehouse");
            }
        }
        if let Some(unset) = &self.unset {
            errors.check(!value_set(unset), || {
                ValidationError::new("AlertUnset needs at least one property")
            });
        }
        errors.finish()
    }
}

/// `DROP ALERT` options.
#[derive(Debug, Clone, Default, Ddl)]
pub struct DropAlertOptions {
    #[ddl(static = "DROP ALERT")]
    pub drop: (),
    #[ddl(keyword = "IF EXISTS")]
    pub if_exists: Option<bool>,
    #[ddl(identifier)]
    pub name: SchemaObjectIdentifier,
}

impl Validate for DropAlertOptions {
    fn validate(&self) -> Result<()> {
        let mut errors = ValidationErrors::new();
        errors.identifier(&self.name, "DropAlertOptions", "name");
        errors.finish()
    }
}

/// `SHOW ALERTS` options.
#[derive(Debug, Clone, Default, Ddl)]
pub struct ShowAlertOptions {
    #[ddl(static = "SHOW")]
    pub show: (),
    #[ddl(keyword = "TERSE")]
    pub terse: Option<bool>,
    #[ddl(static = "ALERTS")]
    pub alerts: (),
    #[ddl(keyword = "LIKE")]
    pub like: Option<Like>,
    #[ddl(keyword = "IN")]
    pub in_: Option<In>,
    #[ddl(parameter = "STARTS WITH", no_equals, single_quotes)]
    pub starts_with: Option<String>,
    #[ddl(parameter = "LIMIT", no_equals)]
    pub limit: Option<i32>,
}

impl ShowAlertOptions {
    /// Options narrowing the listing to `id` inside its schema.
    #[must_use]
    pub fn for_id(id: &SchemaObjectIdentifier) -> Self {
        Self {
            like: Some(Like::new(id.name())),
            in_: Some(In::schema(id.schema_id())),
            ..Default::default()
        }
    }
}

impl Validate for ShowAlertOptions {
    fn validate(&self) -> Result<()> {
        let mut errors = ValidationErrors::new();
        errors.nested(self.in_.validate());
        errors.check(self.limit.is_some_and(|n| n < 1), || {
            ValidationError::new("ShowAlertOptions.limit must be positive")
        });
        errors.finish()
    }
}

/// `DESCRIBE ALERT` options.
#[derive(Debug, Clone, Default, Ddl)]
pub struct DescribeAlertOptions {
    #[ddl(static = "DESCRIBE ALERT")]
    pub describe: (),
    #[ddl(identifier)]
    pub name: SchemaObjectIdentifier,
}

impl Validate for DescribeAlertOptions {
    fn validate(&self) -> Result<()> {
        let mut errors = ValidationErrors::new();
        errors.identifier(&self.name, "DescribeAlertOptions", "name");
        errors.finish()
    }
}

/// Row of `SHOW ALERTS` and `DESCRIBE ALERT`.
#[derive(Debug, Clone, PartialEq, ScanRow)]
pub struct AlertRow {
    pub created_on: Option<DateTime<Utc>>,
    pub name: String,
    pub database_name: String,
    pub schema_name: String,
    pub owner: Option<String>,
    pub comment: Option<String>,
    pub warehouse: Option<String>,
    pub schedule: Option<String>,
    pub state: Option<String>,
    pub condition: Option<String>,
    pub action: Option<String>,
}

/// An alert as listed by `SHOW ALERTS`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub created_on: Option<DateTime<Utc>>,
    pub name: String,
    pub database_name: String,
    pub schema_name: String,
    pub owner: Option<String>,
    pub comment: Option<String>,
    pub warehouse: Option<String>,
    pub schedule: Option<String>,
    pub state: Option<AlertState>,
    pub condition: Option<String>,
    pub action: Option<String>,
}

impl From<AlertRow> for Alert {
    fn from(row: AlertRow) -> Self {
        Self {
            created_on: row.created_on,
            name: row.name,
            database_name: row.database_name,
            schema_name: row.schema_name,
            owner: row.owner.filter(|s| !s.is_empty()),
            comment: row.comment.filter(|s| !s.is_empty()),
            warehouse: row.warehouse.filter(|s| !s.is_empty()),
            schedule: row.schedule.filter(|s| !s.is_empty()),
            state: row.state.and_then(|s| s.parse().ok()),
            condition: row.condition.filter(|s| !s.is_empty()),
            action: row.action.filter(|s| !s.is_empty()),
        }
    }
}

impl Identified for Alert {
    type Id = SchemaObjectIdentifier;

    fn id(&self) -> Self::Id {
        SchemaObjectIdentifier::new(&self.database_name, &self.schema_name, &self.name)
    }
}

/// Alert operations.
pub struct Alerts<'a, D> {
    client: &'a Client<D>,
}

impl<'a, D: Driver> Alerts<'a, D> {
    pub(crate) const fn new(client: &'a Client<D>) -> Self {
        Self { client }
    }

    /// Creates an alert.
    pub async fn create(
        &self,
        ctx: &Context,
        id: &SchemaObjectIdentifier,
        opts: Option<CreateAlertOptions>,
    ) -> Result<()> {
        let mut opts = opts.unwrap_or_default();
        opts.name = id.clone();
        self.client.exec_options(ctx, &opts).await
    }

    /// Alters an alert.
    pub async fn alter(
        &self,
        ctx: &Context,
        id: &SchemaObjectIdentifier,
        opts: Option<AlterAlertOptions>,
    ) -> Result<()> {
        let mut opts = opts.unwrap_or_default();
        opts.name = id.clone();
        self.client.exec_options(ctx, &opts).await
    }

    /// Drops an alert.
    pub async fn drop(
        &self,
        ctx: &Context,
        id: &SchemaObjectIdentifier,
        opts: Option<DropAlertOptions>,
    ) -> Result<()> {
        let mut opts = opts.unwrap_or_default();
        opts.name = id.clone();
        self.client.exec_options(ctx, &opts).await
    }

    /// Lists alerts.
    pub async fn show(&self, ctx: &Context, opts: Option<ShowAlertOptions>) -> Result<Vec<Alert>> {
        let opts = opts.unwrap_or_default();
        let rows: Vec<AlertRow> = self.client.query_options(ctx, &opts).await?;
        Ok(rows.into_iter().map(Alert::from).collect())
    }

    /// Returns the alert named by `id`.
    pub async fn show_by_id(&self, ctx: &Context, id: &SchemaObjectIdentifier) -> Result<Alert> {
        let alerts = self.show(ctx, Some(ShowAlertOptions::for_id(id))).await?;
        find_one(alerts, id)
    }

    /// Describes an alert.
    pub async fn describe(&self, ctx: &Context, id: &SchemaObjectIdentifier) -> Result<Alert> {
        let opts = DescribeAlertOptions {
            name: id.clone(),
            ..Default::default()
        };
        let rows: Vec<AlertRow> = self.client.query_options(ctx, &opts).await?;
        let alerts = rows.into_iter().map(Alert::from).collect();
        find_one(alerts, id)
    }

    /// [`Self::show_by_id`] through [`safe_show_by_id`].
    pub async fn show_by_id_safely(
        &self,
        ctx: &Context,
        id: &SchemaObjectIdentifier,
    ) -> Result<Alert> {
        safe_show_by_id(self.client, ctx, id, || self.show_by_id(ctx, id)).await
    }

    /// [`Self::drop`] through [`safe_drop`].
    pub async fn drop_safely(
        &self,
        ctx: &Context,
        id: &SchemaObjectIdentifier,
        opts: Option<DropAlertOptions>,
    ) -> Result<()> {
        safe_drop(self.client, ctx, id, || self.drop(ctx, id, opts)).await
    }
}
