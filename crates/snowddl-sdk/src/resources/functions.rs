//! User-defined functions. Overloads share a name, so identifiers carry the
//! argument types.

use chrono::{DateTime, Utc};
use snowddl_core::ident::split_top_level;
use snowddl_core::validation::ValidationErrors;
use snowddl_core::{ObjectIdentifier, Result, SchemaObjectIdentifierWithArguments, Validate};
use snowddl_derive::{Ddl, ScanRow};

use super::common::{In, Like, PropertyRow};
use super::{find_one, Identified};
use crate::client::Client;
use crate::context::Context;
use crate::driver::Driver;
use crate::safe::{safe_drop, safe_show_by_id};

/// `DROP FUNCTION` options.
#[derive(Debug, Clone, Default, Ddl)]
pub struct DropFunctionOptions {
    #[ddl(static = "DROP FUNCTION")]
    pub drop: (),
    #[ddl(keyword = "IF EXISTS")]
    pub if_exists: Option<bool>,
    #[ddl(identifier)]
    pub name: SchemaObjectIdentifierWithArguments,
}

impl Validate for DropFunctionOptions {
    fn validate(&self) -> Result<()> {
        let mut errors = ValidationErrors::new();
        errors.identifier(&self.name, "DropFunctionOptions", "name");
        errors.finish()
    }
}

/// `SHOW USER FUNCTIONS` options.
#[derive(Debug, Clone, Default, Ddl)]
pub struct ShowFunctionOptions {
    #[ddl(static = "SHOW USER FUNCTIONS")]
    pub show: (),
    #[ddl(keyword = "LIKE")]
    pub like: Option<Like>,
    #[ddl(keyword = "IN")]
    pub in_: Option<In>,
}

impl ShowFunctionOptions {
    /// Options narrowing the listing to the overloads of `id`.
    #[must_use]
    pub fn for_id(id: &SchemaObjectIdentifierWithArguments) -> Self {
        Self {
            like: Some(Like::new(id.name())),
            in_: Some(In::schema(id.schema_id())),
            ..Default::default()
        }
    }
}

impl Validate for ShowFunctionOptions {
    fn validate(&self) -> Result<()> {
        self.in_.validate()
    }
}

/// `DESCRIBE FUNCTION` options.
#[derive(Debug, Clone, Default, Ddl)]
pub struct DescribeFunctionOptions {
    #[ddl(static = "DESCRIBE FUNCTION")]
    pub describe: (),
    #[ddl(identifier)]
    pub name: SchemaObjectIdentifierWithArguments,
}

impl Validate for DescribeFunctionOptions {
    fn validate(&self) -> Result<()> {
        let mut errors = ValidationErrors::new();
        errors.identifier(&self.name, "DescribeFunctionOptions", "name");
        errors.finish()
    }
}

/// Row of `SHOW USER FUNCTIONS`.
#[derive(Debug, Clone, PartialEq, ScanRow)]
pub struct FunctionRow {
    pub created_on: Option<DateTime<Utc>>,
    pub name: String,
    pub schema_name: String,
    pub catalog_name: String,
    pub is_builtin: Option<bool>,
    pub is_aggregate: Option<bool>,
    pub is_ansi: Option<bool>,
    pub min_num_arguments: Option<i64>,
    pub max_num_arguments: Option<i64>,
    pub arguments: String,
    pub description: Option<String>,
    pub is_table_function: Option<bool>,
    pub valid_for_clustering: Option<bool>,
    pub is_secure: Option<bool>,
    pub is_external_function: Option<bool>,
    pub language: Option<String>,
}

/// A function overload as listed by `SHOW USER FUNCTIONS`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Function {
    pub created_on: Option<DateTime<Utc>>,
    pub name: String,
    pub schema_name: String,
    pub database_name: String,
    pub argument_data_types: Vec<String>,
    pub return_type: Option<String>,
    pub arguments: String,
    pub description: Option<String>,
    pub is_aggregate: bool,
    pub is_table_function: bool,
    pub is_secure: bool,
    pub is_external_function: bool,
    pub language: Option<String>,
}

/// Splits the `arguments` column (`NAME(T1, T2) RETURN R`) into argument
/// types and return type.
///
/// Returns empty argument types when the column cannot be parsed.
#[must_use]
pub fn parse_signature(arguments: &str) -> (Vec<String>, Option<String>) {
    let Some(open) = arguments.find('(') else {
        return (Vec::new(), None);
    };
    let mut depth = 0_usize;
    let mut close = None;
    for (index, c) in arguments[open..].char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    close = Some(open + index);
                    break;
                }
            }
            _ => {}
        }
    }
    let Some(close) = close else {
        return (Vec::new(), None);
    };

    let argument_data_types = split_top_level(&arguments[open + 1..close]);
    let rest = arguments[close + 1..].trim();
    let return_type = rest
        .strip_prefix("RETURN")
        .map(|r| r.trim().to_string())
        .filter(|r| !r.is_empty());
    (argument_data_types, return_type)
}

impl From<FunctionRow> for Function {
    fn from(row: FunctionRow) -> Self {
        let (argument_data_types, return_type) = parse_signature(&row.arguments);
        Self {
            created_on: row.created_on,
            name: row.name,
            schema_name: row.schema_name,
            database_name: row.catalog_name,
            argument_data_types,
            return_type,
            arguments: row.arguments,
            description: row.description.filter(|s| !s.is_empty()),
            is_aggregate: row.is_aggregate.unwrap_or(false),
            is_table_function: row.is_table_function.unwrap_or(false),
            is_secure: row.is_secure.unwrap_or(false),
            is_external_function: row.is_external_function.unwrap_or(false),
            language: row.language.filter(|s| !s.is_empty()),
        }
    }
}

impl Identified for Function {
    type Id = SchemaObjectIdentifierWithArguments;

    fn id(&self) -> Self::Id {
        SchemaObjectIdentifierWithArguments::new(
            &self.database_name,
            &self.schema_name,
            &self.name,
            self.argument_data_types.clone(),
        )
    }
}

/// One `property` / `value` pair of `DESCRIBE FUNCTION`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionDetail {
    pub property: String,
    pub value: Option<String>,
}

impl From<PropertyRow> for FunctionDetail {
    fn from(row: PropertyRow) -> Self {
        Self {
            property: row.property,
            value: row.value,
        }
    }
}

/// The argument types are reported in upper case.
fn normalized(id: &SchemaObjectIdentifierWithArguments) -> SchemaObjectIdentifierWithArguments {
    SchemaObjectIdentifierWithArguments::new(
        id.database_name(),
        id.schema_name(),
        id.name(),
        id.argument_data_types()
            .iter()
            .map(|t| t.trim().to_ascii_uppercase())
            .collect(),
    )
}

/// Function operations.
pub struct Functions<'a, D> {
    client: &'a Client<D>,
}

impl<'a, D: Driver> Functions<'a, D> {
    pub(crate) const fn new(client: &'a Client<D>) -> Self {
        Self { client }
    }

    /// Drops one overload.
    pub async fn drop(
        &self,
        ctx: &Context,
        id: &SchemaObjectIdentifierWithArguments,
        opts: Option<DropFunctionOptions>,
    ) -> Result<()> {
        let mut opts = opts.unwrap_or_default();
        opts.name = id.clone();
        self.client.exec_options(ctx, &opts).await
    }

    /// Lists user functions.
    pub async fn show(
        &self,
        ctx: &Context,
        opts: Option<ShowFunctionOptions>,
    ) -> Result<Vec<Function>> {
        let opts = opts.unwrap_or_default();
        let rows: Vec<FunctionRow> = self.client.query_options(ctx, &opts).await?;
        Ok(rows.into_iter().map(Function::from).collect())
    }

    /// Returns the overload whose argument types match `id`.
    pub async fn show_by_id(
        &self,
        ctx: &Context,
        id: &SchemaObjectIdentifierWithArguments,
    ) -> Result<Function> {
        let functions = self.show(ctx, Some(ShowFunctionOptions::for_id(id))).await?;
        find_one(functions, &normalized(id))
    }

    /// Describes one overload.
    pub async fn describe(
        &self,
        ctx: &Context,
        id: &SchemaObjectIdentifierWithArguments,
    ) -> Result<Vec<FunctionDetail>> {
        let opts = DescribeFunctionOptions {
            name: id.clone(),
            ..Default::default()
        };
        let rows: Vec<PropertyRow> = self.client.query_options(ctx, &opts).await?;
        Ok(rows.into_iter().map(FunctionDetail::from).collect())
    }

    /// [`Self::show_by_id`] through [`safe_show_by_id`].
    pub async fn show_by_id_safely(
        &self,
        ctx: &Context,
        id: &SchemaObjectIdentifierWithArguments,
    ) -> Result<Function> {
        safe_show_by_id(self.client, ctx, id, || self.show_by_id(ctx, id)).await
    }

    /// [`Self::drop`] through [`safe_drop`].
    pub async fn drop_safely(
        &self,
        ctx: &Context,
        id: &SchemaObjectIdentifierWithArguments,
        opts: Option<DropFunctionOptions>,
    ) -> Result<()> {
        safe_drop(self.client, ctx, id, || self.drop(ctx, id, opts)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::render;

    fn id() -> SchemaObjectIdentifierWithArguments {
        SchemaObjectIdentifierWithArguments::new(
            "db",
            "sc",
            "add",
            vec![String::from("NUMBER(38, 0)"), String::from("VARCHAR")],
        )
    }

    #[test]
    fn test_drop() {
        let opts = DropFunctionOptions {
            if_exists: Some(true),
            name: id(),
            ..Default::default()
        };
        assert_eq!(
            render(&opts).unwrap(),
            r#"DROP FUNCTION IF EXISTS "db"."sc"."add"(NUMBER(38, 0), VARCHAR)"#
        );
    }

    #[test]
    fn test_show_for_id() {
        assert_eq!(
            render(&ShowFunctionOptions::for_id(&id())).unwrap(),
            r#"SHOW USER FUNCTIONS LIKE 'add' IN SCHEMA "db"."sc""#
        );
    }

    #[test]
    fn test_parse_signature() {
        let (args, ret) = parse_signature("ADD(NUMBER(38, 0), VARCHAR) RETURN NUMBER(38, 0)");
        assert_eq!(args, vec!["NUMBER(38, 0)", "VARCHAR"]);
        assert_eq!(ret.as_deref(), Some("NUMBER(38, 0)"));

        let (args, ret) = parse_signature("NOW() RETURN TIMESTAMP_LTZ");
        assert!(args.is_empty());
        assert_eq!(ret.as_deref(), Some("TIMESTAMP_LTZ"));

        assert_eq!(parse_signature("broken(").0, Vec::<String>::new());
    }

    #[test]
    fn test_normalized_uppercases_argument_types() {
        let lower = SchemaObjectIdentifierWithArguments::new(
            "db",
            "sc",
            "add",
            vec![String::from("number(38, 0)"), String::from(" varchar")],
        );
        assert_eq!(normalized(&lower), id());
    }
}
