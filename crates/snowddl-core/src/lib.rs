//! # snowddl-core
//!
//! The pure half of the snowddl SDK: everything needed to turn a typed
//! request into a warehouse DDL statement, without touching the network.
//!
//! This crate provides:
//! - A four-level identifier model with quoting and fully-qualified-name parsing
//! - A declarative emission engine driven by per-field metadata
//! - Reusable validation combinators shared by every options struct
//! - A dynamic row model that typed row structs are scanned from
//!
//! ## Declarative DDL
//!
//! Options structs describe their statement purely as data. The
//! `#[derive(Ddl)]` macro from `snowddl-derive` compiles the field attributes
//! into an emitter:
//!
//! ```rust,ignore
//! use snowddl_core::ddl::Ddl;
//! use snowddl_core::ident::AccountObjectIdentifier;
//! use snowddl_derive::Ddl;
//!
//! #[derive(Debug, Default, Ddl)]
//! struct DropWarehouse {
//!     #[ddl(static = "DROP WAREHOUSE")]
//!     drop: (),
//!     #[ddl(keyword = "IF EXISTS")]
//!     if_exists: Option<bool>,
//!     #[ddl(identifier)]
//!     name: AccountObjectIdentifier,
//! }
//!
//! let sql = DropWarehouse {
//!     if_exists: Some(true),
//!     name: AccountObjectIdentifier::new("WH1"),
//!     ..Default::default()
//! }
//! .to_ddl()?;
//!
//! assert_eq!(sql, r#"DROP WAREHOUSE IF EXISTS "WH1""#);
//! ```

pub mod ddl;
pub mod error;
pub mod ident;
pub mod row;
pub mod validation;

pub use ddl::{Ddl, DdlBuilder, DdlValue, EmissionError, ToDdlValue, ValueSet};
pub use error::{DriverError, Error, ErrorKind, Result};
pub use ident::{
    AccountObjectIdentifier, Ancestor, DatabaseObjectIdentifier, IdentifierError,
    ObjectIdentifier, SchemaObjectIdentifier, SchemaObjectIdentifierWithArguments,
};
pub use row::{Cell, FromCell, Row, ScanError, ScanRow};
pub use validation::{Validate, ValidationError, ValidationErrors};
