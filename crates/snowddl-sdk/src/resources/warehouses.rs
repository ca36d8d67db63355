//! Warehouses: account-level compute clusters.

use chrono::{DateTime, Utc};
use snowddl_core::validation::{
    err_exactly_one_of, err_one_of, exactly_one_value_set, value_set, ValidationErrors,
};
use snowddl_core::{
    ddl_enum, AccountObjectIdentifier, ObjectIdentifier, Result, SchemaObjectIdentifier,
    Validate, ValidationError,
};
use snowddl_derive::{Ddl, ScanRow};

use super::common::{
    validate_ids, validate_tags, Like, ObjectDetail, ObjectDetailRow, TagAssociation,
};
use super::{find_one, Identified};
use crate::client::Client;
use crate::context::Context;
use crate::driver::Driver;
use crate::safe::{safe_drop, safe_show_by_id};

ddl_enum! {
    /// Warehouse flavour.
    pub enum WarehouseType {
        Standard => "STANDARD",
        SnowparkOptimized => "SNOWPARK-OPTIMIZED",
    }
}

ddl_enum! {
    /// Warehouse size. Sizes read back from the warehouse may use the
    /// `X-Small` / `2X-Large` spellings.
    pub enum WarehouseSize {
        XSmall => "XSMALL" | "X-SMALL",
        Small => "SMALL",
        Medium => "MEDIUM",
        Large => "LARGE",
        XLarge => "XLARGE" | "X-LARGE",
        XXLarge => "XXLARGE" | "X2LARGE" | "2X-LARGE",
        XXXLarge => "XXXLARGE" | "X3LARGE" | "3X-LARGE",
        X4Large => "X4LARGE" | "4X-LARGE",
        X5Large => "X5LARGE" | "5X-LARGE",
        X6Large => "X6LARGE" | "6X-LARGE",
    }
}

ddl_enum! {
    /// Multi-cluster scaling policy.
    pub enum ScalingPolicy {
        Standard => "STANDARD",
        Economy => "ECONOMY",
    }
}

ddl_enum! {
    /// Runtime state reported by `SHOW WAREHOUSES`.
    pub enum WarehouseState {
        Started => "STARTED",
        Suspended => "SUSPENDED",
        Suspending => "SUSPENDING",
        Resizing => "RESIZING",
        Resuming => "RESUMING",
    }
}

/// `CREATE WAREHOUSE` options.
#[derive(Debug, Clone, Default, Ddl)]
pub struct CreateWarehouseOptions {
    #[ddl(static = "CREATE")]
    pub create: (),
    #[ddl(keyword = "OR REPLACE")]
    pub or_replace: Option<bool>,
    #[ddl(static = "WAREHOUSE")]
    pub warehouse: (),
    #[ddl(keyword = "IF NOT EXISTS")]
    pub if_not_exists: Option<bool>,
    #[ddl(identifier)]
    pub name: AccountObjectIdentifier,

    #[ddl(parameter = "WAREHOUSE_TYPE", single_quotes)]
    pub warehouse_type: Option<WarehouseType>,
    #[ddl(parameter = "WAREHOUSE_SIZE", single_quotes)]
    pub warehouse_size: Option<WarehouseSize>,
    #[ddl(parameter = "MAX_CLUSTER_COUNT")]
    pub max_cluster_count: Option<i32>,
    #[ddl(parameter = "MIN_CLUSTER_COUNT")]
    pub min_cluster_count: Option<i32>,
    #[ddl(parameter = "SCALING_POLICY", single_quotes)]
    pub scaling_policy: Option<ScalingPolicy>,
    #[ddl(parameter = "AUTO_SUSPEND")]
    pub auto_suspend: Option<i32>,
    #[ddl(parameter = "AUTO_RESUME")]
    pub auto_resume: Option<bool>,
    #[ddl(parameter = "INITIALLY_SUSPENDED")]
    pub initially_suspended: Option<bool>,
    #[ddl(identifier = "RESOURCE_MONITOR", equals)]
    pub resource_monitor: Option<AccountObjectIdentifier>,
    #[ddl(parameter = "COMMENT", single_quotes)]
    pub comment: Option<String>,
    #[ddl(parameter = "ENABLE_QUERY_ACCELERATION")]
    pub enable_query_acceleration: Option<bool>,
    #[ddl(parameter = "QUERY_ACCELERATION_MAX_SCALE_FACTOR")]
    pub query_acceleration_max_scale_factor: Option<i32>,

    #[ddl(parameter = "MAX_CONCURRENCY_LEVEL")]
    pub max_concurrency_level: Option<i32>,
    #[ddl(parameter = "STATEMENT_QUEUED_TIMEOUT_IN_SECONDS")]
    pub statement_queued_timeout_in_seconds: Option<i32>,
    #[ddl(parameter = "STATEMENT_TIMEOUT_IN_SECONDS")]
    pub statement_timeout_in_seconds: Option<i32>,
    #[ddl(keyword = "WITH TAG", parentheses)]
    pub tag: Vec<TagAssociation>,
}

fn check_cluster_counts(
    errors: &mut ValidationErrors,
    structure: &'static str,
    min: Option<i32>,
    max: Option<i32>,
) {
    if let (Some(min), Some(max)) = (min, max) {
        errors.check(min > max, || {
            ValidationError::new(format!(
                "{structure} min_cluster_count ({min}) must not exceed max_cluster_count ({max})"
            ))
        });
    }
}

impl Validate for CreateWarehouseOptions {
    fn validate(&self) -> Result<()> {
        const S: &str = "CreateWarehouseOptions";
        let mut errors = ValidationErrors::new();
        errors.identifier(&self.name, S, "name");
        errors.check(
            self.or_replace == Some(true) && self.if_not_exists == Some(true),
            || err_one_of(S, &["or_replace", "if_not_exists"]),
        );
        if let Some(monitor) = &self.resource_monitor {
            errors.identifier(monitor, S, "resource_monitor");
        }
        check_cluster_counts(&mut errors, S, self.min_cluster_count, self.max_cluster_count);
        validate_tags(&mut errors, &self.tag, S, "tag");
        errors.finish()
    }
}

/// Properties changed by `ALTER WAREHOUSE ... SET`.
#[derive(Debug, Clone, Default, Ddl)]
pub struct WarehouseSet {
    #[ddl(parameter = "WAREHOUSE_TYPE", single_quotes)]
    pub warehouse_type: Option<WarehouseType>,
    #[ddl(parameter = "WAREHOUSE_SIZE", single_quotes)]
    pub warehouse_size: Option<WarehouseSize>,
    #[ddl(parameter = "WAIT_FOR_COMPLETION")]
    pub wait_for_completion: Option<bool>,
    #[ddl(parameter = "MAX_CLUSTER_COUNT")]
    pub max_cluster_count: Option<i32>,
    #[ddl(parameter = "MIN_CLUSTER_COUNT")]
    pub min_cluster_count: Option<i32>,
    #[ddl(parameter = "SCALING_POLICY", single_quotes)]
    pub scaling_policy: Option<ScalingPolicy>,
    #[ddl(parameter = "AUTO_SUSPEND")]
    pub auto_suspend: Option<i32>,
    #[ddl(parameter = "AUTO_RESUME")]
    pub auto_resume: Option<bool>,
    #[ddl(identifier = "RESOURCE_MONITOR", equals)]
    pub resource_monitor: Option<AccountObjectIdentifier>,
    #[ddl(parameter = "COMMENT", single_quotes)]
    pub comment: Option<String>,
    #[ddl(parameter = "ENABLE_QUERY_ACCELERATION")]
    pub enable_query_acceleration: Option<bool>,
    #[ddl(parameter = "QUERY_ACCELERATION_MAX_SCALE_FACTOR")]
    pub query_acceleration_max_scale_factor: Option<i32>,
    #[ddl(parameter = "MAX_CONCURRENCY_LEVEL")]
    pub max_concurrency_level: Option<i32>,
    #[ddl(parameter = "STATEMENT_QUEUED_TIMEOUT_IN_SECONDS")]
    pub statement_queued_timeout_in_seconds: Option<i32>,
    #[ddl(parameter = "STATEMENT_TIMEOUT_IN_SECONDS")]
    pub statement_timeout_in_seconds: Option<i32>,
}

impl Validate for WarehouseSet {
    fn validate(&self) -> Result<()> {
        const S: &str = "WarehouseSet";
        let mut errors = ValidationErrors::new();
        errors.check(!value_set(self), || {
            ValidationError::new(format!("{S} needs at least one property"))
        });
        errors.check(
            self.wait_for_completion.is_some() && self.warehouse_size.is_none(),
            || ValidationError::new(format!("{S} wait_for_completion needs warehouse_size")),
        );
        if let Some(monitor) = &self.resource_monitor {
            errors.identifier(monitor, S, "resource_monitor");
        }
        check_cluster_counts(&mut errors, S, self.min_cluster_count, self.max_cluster_count);
        errors.finish()
    }
}

/// Properties reset by `ALTER WAREHOUSE ... UNSET`.
#[derive(Debug, Clone, Default, Ddl)]
pub struct WarehouseUnset {
    #[ddl(keyword = "WAREHOUSE_TYPE")]
    pub warehouse_type: Option<bool>,
    #[ddl(keyword = "WAREHOUSE_SIZE")]
    pub warehouse_size: Option<bool>,
    #[ddl(keyword = "WAIT_FOR_COMPLETION")]
    pub wait_for_completion: Option<bool>,
    #[ddl(keyword = "MAX_CLUSTER_COUNT")]
    pub max_cluster_count: Option<bool>,
    #[ddl(keyword = "MIN_CLUSTER_COUNT")]
    pub min_cluster_count: Option<bool>,
    #[ddl(keyword = "SCALING_POLICY")]
    pub scaling_policy: Option<bool>,
    #[ddl(keyword = "AUTO_SUSPEND")]
    pub auto_suspend: Option<bool>,
    #[ddl(keyword = "AUTO_RESUME")]
    pub auto_resume: Option<bool>,
    #[ddl(keyword = "RESOURCE_MONITOR")]
    pub resource_monitor: Option<bool>,
    #[ddl(keyword = "COMMENT")]
    pub comment: Option<bool>,
    #[ddl(keyword = "ENABLE_QUERY_ACCELERATION")]
    pub enable_query_acceleration: Option<bool>,
    #[ddl(keyword = "QUERY_ACCELERATION_MAX_SCALE_FACTOR")]
    pub query_acceleration_max_scale_factor: Option<bool>,
    #[ddl(keyword = "MAX_CONCURRENCY_LEVEL")]
    pub max_concurrency_level: Option<bool>,
    #[ddl(keyword = "STATEMENT_QUEUED_TIMEOUT_IN_SECONDS")]
    pub statement_queued_timeout_in_seconds: Option<bool>,
    #[ddl(keyword = "STATEMENT_TIMEOUT_IN_SECONDS")]
    pub statement_timeout_in_seconds: Option<bool>,
}

/// `ALTER WAREHOUSE` options. Exactly one action may be set.
#[derive(Debug, Clone, Default, Ddl)]
pub struct AlterWarehouseOptions {
    #[ddl(static = "ALTER WAREHOUSE")]
    pub alter: (),
    #[ddl(keyword = "IF EXISTS")]
    pub if_exists: Option<bool>,
    #[ddl(identifier)]
    pub name: AccountObjectIdentifier,

    #[ddl(keyword = "SUSPEND")]
    pub suspend: Option<bool>,
    #[ddl(keyword = "RESUME")]
    pub resume: Option<bool>,
    #[ddl(keyword = "IF SUSPENDED")]
    pub if_suspended: Option<bool>,
    #[ddl(keyword = "ABORT ALL QUERIES")]
    pub abort_all_queries: Option<bool>,
    #[ddl(identifier = "RENAME TO")]
    pub new_name: Option<AccountObjectIdentifier>,
    #[ddl(keyword = "SET")]
    pub set: Option<WarehouseSet>,
    #[ddl(keyword = "UNSET")]
    pub unset: Option<WarehouseUnset>,
    #[ddl(keyword = "SET TAG", no_parentheses)]
    pub set_tag: Vec<TagAssociation>,
    #[ddl(keyword = "UNSET TAG", no_parentheses)]
    pub unset_tag: Vec<SchemaObjectIdentifier>,
}

impl Validate for AlterWarehouseOptions {
    fn validate(&self) -> Result<()> {
        const S: &str = "AlterWarehouseOptions";
        let mut errors = ValidationErrors::new();
        errors.identifier(&self.name, S, "name");
        errors.check(
            !exactly_one_value_set(&[
                &self.suspend,
                &self.resume,
                &self.abort_all_queries,
                &self.new_name,
                &self.set,
                &self.unset,
                &self.set_tag,
                &self.unset_tag,
            ]),
            || {
                err_exactly_one_of(
                    S,
                    &[
                        "suspend",
                        "resume",
                        "abort_all_queries",
                        "new_name",
                        "set",
                        "unset",
                        "set_tag",
                        "unset_tag",
                    ],
                )
            },
        );
        errors.check(
            self.if_suspended == Some(true) && self.resume != Some(true),
            || ValidationError::new(format!("{S} if_suspended needs resume")),
        );
        if let Some(new_name) = &self.new_name {
            errors.identifier(new_name, S, "new_name");
        }
        if let Some(set) = &self.set {
            errors.nested(set.validate());
        }
        if let Some(unset) = &self.unset {
            errors.check(!value_set(unset), || {
                ValidationError::new("WarehouseUnset needs at least one property")
            });
        }
        validate_tags(&mut errors, &self.set_tag, S, "set_tag");
        validate_ids(&mut errors, &self.unset_tag, S, "unset_tag");
        errors.finish()
    }
}

/// `DROP WAREHOUSE` options.
#[derive(Debug, Clone, Default, Ddl)]
pub struct DropWarehouseOptions {
    #[ddl(static = "DROP WAREHOUSE")]
    pub drop: (),
    #[ddl(keyword = "IF EXISTS")]
    pub if_exists: Option<bool>,
    #[ddl(identifier)]
    pub name: AccountObjectIdentifier,
}

impl Validate for DropWarehouseOptions {
    fn validate(&self) -> Result<()> {
        let mut errors = ValidationErrors::new();
        errors.identifier(&self.name, "DropWarehouseOptions", "name");
        errors.finish()
    }
}

/// `SHOW WAREHOUSES` options.
#[derive(Debug, Clone, Default, Ddl)]
pub struct ShowWarehouseOptions {
    #[ddl(static = "SHOW WAREHOUSES")]
    pub show: (),
    #[ddl(keyword = "LIKE")]
    pub like: Option<Like>,
}

impl ShowWarehouseOptions {
    /// Options narrowing the listing to `id`.
    #[must_use]
    pub fn for_id(id: &AccountObjectIdentifier) -> Self {
        Self {
            like: Some(Like::new(id.name())),
            ..Default::default()
        }
    }
}

impl Validate for ShowWarehouseOptions {
    fn validate(&self) -> Result<()> {
        Ok(())
    }
}

/// `DESCRIBE WAREHOUSE` options.
#[derive(Debug, Clone, Default, Ddl)]
pub struct DescribeWarehouseOptions {
    #[ddl(static = "DESCRIBE WAREHOUSE")]
    pub describe: (),
    #[ddl(identifier)]
    pub name: AccountObjectIdentifier,
}

impl Validate for DescribeWarehouseOptions {
    fn validate(&self) -> Result<()> {
        let mut errors = ValidationErrors::new();
        errors.identifier(&self.name, "DescribeWarehouseOptions", "name");
        errors.finish()
    }
}

/// Row of `SHOW WAREHOUSES`.
#[derive(Debug, Clone, PartialEq, ScanRow)]
pub struct WarehouseRow {
    pub name: String,
    pub state: Option<String>,
    #[column(name = "type")]
    pub warehouse_type: Option<String>,
    pub size: Option<String>,
    pub min_cluster_count: Option<i64>,
    pub max_cluster_count: Option<i64>,
    pub started_clusters: Option<i64>,
    pub running: Option<i64>,
    pub queued: Option<i64>,
    pub is_default: Option<bool>,
    pub is_current: Option<bool>,
    pub auto_suspend: Option<i64>,
    pub auto_resume: Option<bool>,
    pub created_on: Option<DateTime<Utc>>,
    pub resumed_on: Option<DateTime<Utc>>,
    pub updated_on: Option<DateTime<Utc>>,
    pub owner: Option<String>,
    pub comment: Option<String>,
    pub enable_query_acceleration: Option<bool>,
    pub query_acceleration_max_scale_factor: Option<i64>,
    pub resource_monitor: Option<String>,
    pub scaling_policy: Option<String>,
    pub owner_role_type: Option<String>,
}

/// A warehouse as listed by `SHOW WAREHOUSES`.
#[derive(Debug, Clone, PartialEq)]
pub struct Warehouse {
    pub name: String,
    pub state: Option<WarehouseState>,
    pub warehouse_type: Option<WarehouseType>,
    pub size: Option<WarehouseSize>,
    pub min_cluster_count: Option<i64>,
    pub max_cluster_count: Option<i64>,
    pub started_clusters: Option<i64>,
    pub running: Option<i64>,
    pub queued: Option<i64>,
    pub is_default: bool,
    pub is_current: bool,
    /// `None` when auto suspend is disabled.
    pub auto_suspend: Option<i64>,
    pub auto_resume: bool,
    pub created_on: Option<DateTime<Utc>>,
    pub resumed_on: Option<DateTime<Utc>>,
    pub updated_on: Option<DateTime<Utc>>,
    pub owner: Option<String>,
    pub comment: Option<String>,
    pub enable_query_acceleration: bool,
    pub query_acceleration_max_scale_factor: Option<i64>,
    pub resource_monitor: Option<String>,
    pub scaling_policy: Option<ScalingPolicy>,
    pub owner_role_type: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case("null"))
}

impl From<WarehouseRow> for Warehouse {
    fn from(row: WarehouseRow) -> Self {
        Self {
            name: row.name,
            state: row.state.and_then(|s| s.parse().ok()),
            warehouse_type: row.warehouse_type.and_then(|s| s.parse().ok()),
            size: row.size.and_then(|s| s.parse().ok()),
            min_cluster_count: row.min_cluster_count,
            max_cluster_count: row.max_cluster_count,
            started_clusters: row.started_clusters,
            running: row.running,
            queued: row.queued,
            is_default: row.is_default.unwrap_or(false),
            is_current: row.is_current.unwrap_or(false),
            auto_suspend: row.auto_suspend.filter(|secs| *secs > 0),
            auto_resume: row.auto_resume.unwrap_or(false),
            created_on: row.created_on,
            resumed_on: row.resumed_on,
            updated_on: row.updated_on,
            owner: non_empty(row.owner),
            comment: non_empty(row.comment),
            enable_query_acceleration: row.enable_query_acceleration.unwrap_or(false),
            query_acceleration_max_scale_factor: row.query_acceleration_max_scale_factor,
            resource_monitor: non_empty(row.resource_monitor),
            scaling_policy: row.scaling_policy.and_then(|s| s.parse().ok()),
            owner_role_type: non_empty(row.owner_role_type),
        }
    }
}

impl Identified for Warehouse {
    type Id = AccountObjectIdentifier;

    fn id(&self) -> Self::Id {
        AccountObjectIdentifier::new(&self.name)
    }
}

/// Warehouse operations.
pub struct Warehouses<'a, D> {
    client: &'a Client<D>,
}

impl<'a, D: Driver> Warehouses<'a, D> {
    pub(crate) const fn new(client: &'a Client<D>) -> Self {
        Self { client }
    }

    /// Creates a warehouse.
    pub async fn create(
        &self,
        ctx: &Context,
        id: &AccountObjectIdentifier,
        opts: Option<CreateWarehouseOptions>,
    ) -> Result<()> {
        let mut opts = opts.unwrap_or_default();
        opts.name = id.clone();
        self.client.exec_options(ctx, &opts).await
    }

    /// Alters a warehouse.
    pub async fn alter(
        &self,
        ctx: &Context,
        id: &AccountObjectIdentifier,
        opts: Option<AlterWarehouseOptions>,
    ) -> Result<()> {
        let mut opts = opts.unwrap_or_default();
        opts.name = id.clone();
        self.client.exec_options(ctx, &opts).await
    }

    /// Drops a warehouse.
    pub async fn drop(
        &self,
        ctx: &Context,
        id: &AccountObjectIdentifier,
        opts: Option<DropWarehouseOptions>,
    ) -> Result<()> {
        let mut opts = opts.unwrap_or_default();
        opts.name = id.clone();
        self.client.exec_options(ctx, &opts).await
    }

    /// Lists warehouses.
    pub async fn show(
        &self,
        ctx: &Context,
        opts: Option<ShowWarehouseOptions>,
    ) -> Result<Vec<Warehouse>> {
        let opts = opts.unwrap_or_default();
        let rows: Vec<WarehouseRow> = self.client.query_options(ctx, &opts).await?;
        Ok(rows.into_iter().map(Warehouse::from).collect())
    }

    /// Returns the warehouse named by `id`.
    pub async fn show_by_id(&self, ctx: &Context, id: &AccountObjectIdentifier) -> Result<Warehouse> {
        let warehouses = self.show(ctx, Some(ShowWarehouseOptions::for_id(id))).await?;
        find_one(warehouses, id)
    }

    /// Describes a warehouse.
    pub async fn describe(
        &self,
        ctx: &Context,
        id: &AccountObjectIdentifier,
    ) -> Result<Vec<ObjectDetail>> {
        let opts = DescribeWarehouseOptions {
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
    ) -> Result<Warehouse> {
        safe_show_by_id(self.client, ctx, id, || self.show_by_id(ctx, id)).await
    }

    /// [`Self::drop`] through [`safe_drop`].
    pub async fn drop_safely(
        &self,
        ctx: &Context,
        id: &AccountObjectIdentifier,
        opts: Option<DropWarehouseOptions>,
    ) -> Result<()> {
        safe_drop(self.client, ctx, id, || self.drop(ctx, id, opts)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use snowddl_core::row::{Row, ScanRow};

    #[test]
    fn test_size_parses_spellings() {
        assert_eq!("X-Small".parse::<WarehouseSize>().unwrap(), WarehouseSize::XSmall);
        assert_eq!("2X-Large".parse::<WarehouseSize>().unwrap(), WarehouseSize::XXLarge);
        assert_eq!("xxlarge".parse::<WarehouseSize>().unwrap(), WarehouseSize::XXLarge);
        assert!("HUGE".parse::<WarehouseSize>().is_err());
    }

    #[test]
    fn test_row_conversion() {
        let row = Row::new()
            .with("name", "WH1")
            .with("state", "SUSPENDED")
            .with("type", "STANDARD")
            .with("size", "X-Small")
            .with("auto_suspend", "0")
            .with("auto_resume", "true")
            .with("is_default", "N")
            .with("comment", "")
            .with("scaling_policy", "ECONOMY");
        let warehouse = Warehouse::from(WarehouseRow::scan(&row).unwrap());
        assert_eq!(warehouse.state, Some(WarehouseState::Suspended));
        assert_eq!(warehouse.warehouse_type, Some(WarehouseType::Standard));
        assert_eq!(warehouse.size, Some(WarehouseSize::XSmall));
        assert_eq!(warehouse.auto_suspend, None);
        assert!(warehouse.auto_resume);
        assert!(!warehouse.is_default);
        assert_eq!(warehouse.comment, None);
        assert_eq!(warehouse.scaling_policy, Some(ScalingPolicy::Economy));
        assert_eq!(warehouse.id(), AccountObjectIdentifier::new("WH1"));
    }

    #[test]
    fn test_create_rejects_conflicting_flags() {
        let opts = CreateWarehouseOptions {
            or_replace: Some(true),
            if_not_exists: Some(true),
            name: AccountObjectIdentifier::new("WH1"),
            ..Default::default()
        };
        let err = opts.validate().unwrap_err();
        assert!(err.to_string().contains("[or_replace if_not_exists]"));
    }

    #[test]
    fn test_cluster_counts_checked() {
        let opts = CreateWarehouseOptions {
            name: AccountObjectIdentifier::new("WH1"),
            min_cluster_count: Some(3),
            max_cluster_count: Some(2),
            ..Default::default()
        };
        assert!(opts.validate().is_err());
    }
}
