//! The operation pipeline shared by every resource.

use std::future::Future;
use std::time::Duration;

use snowddl_core::ddl::Ddl;
use snowddl_core::row::{Row, ScanRow};
use snowddl_core::validation::Validate;
use snowddl_core::{DriverError, Error, Result};
use tracing::debug;

use crate::classify::classify;
use crate::config::ClientConfig;
use crate::context::Context;
use crate::driver::{Driver, ExecResult};
use crate::resources::alerts::Alerts;
use crate::resources::databases::Databases;
use crate::resources::functions::Functions;
use crate::resources::schemas::Schemas;
use crate::resources::warehouses::Warehouses;

/// Validates `opts` and emits its statement.
///
/// This is the pure half of every operation; nothing is sent anywhere.
pub fn render<O: Ddl + Validate>(opts: &O) -> Result<String> {
    opts.validate()?;
    Ok(opts.to_ddl()?)
}

/// Entry point of the SDK.
///
/// The client owns a driver and the configuration applied to every call.
/// It keeps no other state, so a single client can serve concurrent callers.
#[derive(Debug, Clone)]
pub struct Client<D> {
    driver: D,
    config: ClientConfig,
}

impl<D: Driver> Client<D> {
    /// Creates a client with the default configuration.
    pub fn new(driver: D) -> Self {
        Self::with_config(driver, ClientConfig::default())
    }

    /// Creates a client with an explicit configuration.
    pub const fn with_config(driver: D, config: ClientConfig) -> Self {
        Self { driver, config }
    }

    /// Returns the driver.
    pub const fn driver(&self) -> &D {
        &self.driver
    }

    /// Returns the configuration.
    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Warehouse operations.
    pub const fn warehouses(&self) -> Warehouses<'_, D> {
        Warehouses::new(self)
    }

    /// Database operations.
    pub const fn databases(&self) -> Databases<'_, D> {
        Databases::new(self)
    }

    /// Schema operations.
    pub const fn schemas(&self) -> Schemas<'_, D> {
        Schemas::new(self)
    }

    /// Alert operations.
    pub const fn alerts(&self) -> Alerts<'_, D> {
        Alerts::new(self)
    }

    /// Function operations.
    pub const fn functions(&self) -> Functions<'_, D> {
        Functions::new(self)
    }

    /// Runs a raw statement that produces no rows.
    pub async fn exec(&self, ctx: &Context, sql: &str) -> Result<ExecResult> {
        self.run(ctx, sql, self.driver.exec(ctx, sql)).await
    }

    /// Runs a raw statement and returns its rows undecoded.
    pub async fn query_rows(&self, ctx: &Context, sql: &str) -> Result<Vec<Row>> {
        self.run(ctx, sql, self.driver.query(ctx, sql)).await
    }

    /// Runs a raw statement and decodes every row into `R`.
    pub async fn query<R: ScanRow>(&self, ctx: &Context, sql: &str) -> Result<Vec<R>> {
        let rows = self.query_rows(ctx, sql).await?;
        rows.iter()
            .map(|row| R::scan(row).map_err(Error::from))
            .collect()
    }

    pub(crate) async fn exec_options<O: Ddl + Validate>(
        &self,
        ctx: &Context,
        opts: &O,
    ) -> Result<()> {
        let sql = render(opts)?;
        self.exec(ctx, &sql).await.map(|_| ())
    }

    pub(crate) async fn query_options<O: Ddl + Validate, R: ScanRow>(
        &self,
        ctx: &Context,
        opts: &O,
    ) -> Result<Vec<R>> {
        let sql = render(opts)?;
        self.query(ctx, &sql).await
    }

    fn timeout(&self, ctx: &Context) -> Option<Duration> {
        ctx.remaining().or_else(|| self.config.statement_timeout())
    }

    async fn run<T>(
        &self,
        ctx: &Context,
        sql: &str,
        call: impl Future<Output = std::result::Result<T, DriverError>>,
    ) -> Result<T> {
        if ctx.is_cancelled() {
            return Err(Error::Cancelled);
        }
        if self.config.log_sql {
            let account = ctx
                .account_locator()
                .or(self.config.account_locator.as_deref())
                .unwrap_or_default();
            debug!(sql = %sql, account = %account, "Executing statement");
        }

        let timeout = self.timeout(ctx);
        let guarded = async {
            match timeout {
                Some(limit) => tokio::time::timeout(limit, call)
                    .await
                    .map_err(|_| Error::Timeout(limit))?
                    .map_err(classify),
                None => call.await.map_err(classify),
            }
        };

        tokio::select! {
            biased;
            () = ctx.cancelled() => {
                if self.config.log_sql {
                    debug!(sql = %sql, "Statement cancelled");
                } else {
                    debug!("Statement cancelled");
                }
                Err(Error::Cancelled)
            }
            result = guarded => result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use snowddl_core::AccountObjectIdentifier;

    use crate::resources::warehouses::{AlterWarehouseOptions, WarehouseSet};

    #[test]
    fn test_render_validates_before_emitting() {
        let opts = AlterWarehouseOptions {
            name: AccountObjectIdentifier::new("WH1"),
            ..Default::default()
        };
        let err = render(&opts).unwrap_err();
        assert!(err.is(snowddl_core::ErrorKind::Validation));
    }

    #[test]
    fn test_render_is_deterministic() {
        let opts = AlterWarehouseOptions {
            name: AccountObjectIdentifier::new("WH1"),
            set: Some(WarehouseSet {
                auto_suspend: Some(300),
                ..Default::default()
            }),
            ..Default::default()
        };
        assert_eq!(render(&opts).unwrap(), render(&opts).unwrap());
    }
}
