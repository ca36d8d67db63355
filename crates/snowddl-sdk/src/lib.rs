//! # snowddl-sdk
//!
//! Typed client for managing warehouse objects: warehouses, databases,
//! schemas, alerts and functions.
//!
//! Every resource exposes the same operation vocabulary (`create`, `alter`,
//! `drop`, `show`, `show_by_id`, `describe`) and every operation follows the
//! same pipeline: fill in the identifier, validate, emit the statement,
//! dispatch it through a [`Driver`], decode the rows and classify errors.
//!
//! ## Example
//!
//! ```rust,ignore
//! use snowddl_core::AccountObjectIdentifier;
//! use snowddl_sdk::prelude::*;
//!
//! let driver = SqlxDriver::connect("sqlite::memory:").await?;
//! let client = Client::new(driver);
//! let ctx = Context::new();
//!
//! let id = AccountObjectIdentifier::new("WH1");
//! client
//!     .warehouses()
//!     .create(&ctx, &id, Some(CreateWarehouseOptions {
//!         warehouse_size: Some(WarehouseSize::Small),
//!         auto_suspend: Some(600),
//!         ..Default::default()
//!     }))
//!     .await?;
//! ```

pub mod classify;
pub mod client;
pub mod config;
pub mod context;
pub mod driver;
pub mod resources;
pub mod safe;

pub use client::{render, Client};
pub use config::{ClientConfig, ConfigError};
pub use context::Context;
pub use driver::{Driver, ExecResult, SqlxDriver};
pub use snowddl_core::{Error, ErrorKind, Result};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::client::{render, Client};
    pub use crate::config::ClientConfig;
    pub use crate::context::Context;
    pub use crate::driver::{Driver, ExecResult, SqlxDriver};
    pub use crate::resources::alerts::*;
    pub use crate::resources::common::*;
    pub use crate::resources::databases::*;
    pub use crate::resources::functions::*;
    pub use crate::resources::schemas::*;
    pub use crate::resources::warehouses::*;
    pub use crate::resources::Identified;
    pub use crate::safe::{safe_drop, safe_show_by_id};
    pub use snowddl_core::{Error, ErrorKind, Result};
}
