//! Subcommands and the statements they render.

use clap::{Args, Subcommand};
use snowddl_core::validation::value_set;
use snowddl_core::{
    AccountObjectIdentifier, Ancestor, DatabaseObjectIdentifier, ObjectIdentifier,
    SchemaObjectIdentifier, SchemaObjectIdentifierWithArguments, ValidationError,
};
use snowddl_sdk::prelude::*;

/// A rendered statement and whether it returns rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    pub sql: String,
    pub returns_rows: bool,
}

impl Statement {
    fn exec(sql: String) -> Self {
        Self {
            sql,
            returns_rows: false,
        }
    }

    fn query(sql: String) -> Self {
        Self {
            sql,
            returns_rows: true,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Warehouse statements.
    #[command(subcommand)]
    Warehouse(WarehouseCommand),

    /// Database statements.
    #[command(subcommand)]
    Database(DatabaseCommand),

    /// Schema statements.
    #[command(subcommand)]
    Schema(SchemaCommand),

    /// Alert statements.
    #[command(subcommand)]
    Alert(AlertCommand),

    /// Function statements.
    #[command(subcommand)]
    Function(FunctionCommand),

    /// Parse an identifier and print its quoted form and ancestors.
    Ident {
        /// Identifier, e.g. `db.sc.leaf` or `"db"."sc"."f"(NUMBER)`.
        input: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum WarehouseCommand {
    /// CREATE WAREHOUSE.
    Create {
        name: AccountObjectIdentifier,
        #[arg(long)]
        or_replace: bool,
        #[arg(long)]
        if_not_exists: bool,
        #[arg(long = "type")]
        warehouse_type: Option<WarehouseType>,
        #[arg(long)]
        size: Option<WarehouseSize>,
        #[arg(long)]
        min_cluster_count: Option<i32>,
        #[arg(long)]
        max_cluster_count: Option<i32>,
        #[arg(long)]
        auto_suspend: Option<i32>,
        #[arg(long)]
        auto_resume: Option<bool>,
        #[arg(long)]
        initially_suspended: Option<bool>,
        #[arg(long)]
        comment: Option<String>,
    },
    /// ALTER WAREHOUSE, one action at a time.
    Alter {
        name: AccountObjectIdentifier,
        #[arg(long)]
        suspend: bool,
        #[arg(long)]
        resume: bool,
        #[arg(long, requires = "resume")]
        if_suspended: bool,
        #[arg(long)]
        abort_all_queries: bool,
        #[arg(long)]
        rename: Option<AccountObjectIdentifier>,
        #[command(flatten)]
        set: WarehouseSetArgs,
        /// Properties to reset, e.g. `--unset comment --unset auto_suspend`.
        #[arg(long = "unset")]
        unset: Vec<String>,
    },
    /// DROP WAREHOUSE.
    Drop {
        name: AccountObjectIdentifier,
        #[arg(long)]
        if_exists: bool,
    },
    /// SHOW WAREHOUSES.
    Show {
        #[arg(long)]
        like: Option<String>,
    },
    /// DESCRIBE WAREHOUSE.
    Describe { name: AccountObjectIdentifier },
}

#[derive(Args, Debug, Default)]
pub struct WarehouseSetArgs {
    #[arg(long)]
    set_size: Option<WarehouseSize>,
    #[arg(long)]
    set_auto_suspend: Option<i32>,
    #[arg(long)]
    set_auto_resume: Option<bool>,
    #[arg(long)]
    set_comment: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum DatabaseCommand {
    /// CREATE DATABASE.
    Create {
        name: AccountObjectIdentifier,
        #[arg(long)]
        or_replace: bool,
        #[arg(long)]
        if_not_exists: bool,
        #[arg(long)]
        transient: bool,
        /// Clone an existing database.
        #[arg(long)]
        clone: Option<AccountObjectIdentifier>,
        #[arg(long)]
        data_retention_time_in_days: Option<i32>,
        #[arg(long)]
        comment: Option<String>,
    },
    /// ALTER DATABASE ... RENAME TO.
    Rename {
        name: AccountObjectIdentifier,
        new_name: AccountObjectIdentifier,
    },
    /// DROP DATABASE.
    Drop {
        name: AccountObjectIdentifier,
        #[arg(long)]
        if_exists: bool,
        #[arg(long, conflicts_with = "restrict")]
        cascade: bool,
        #[arg(long)]
        restrict: bool,
    },
    /// SHOW DATABASES.
    Show {
        #[arg(long)]
        terse: bool,
        #[arg(long)]
        like: Option<String>,
        #[arg(long)]
        starts_with: Option<String>,
        #[arg(long)]
        limit: Option<i32>,
    },
}

#[derive(Subcommand, Debug)]
pub enum SchemaCommand {
    /// CREATE SCHEMA.
    Create {
        name: DatabaseObjectIdentifier,
        #[arg(long)]
        or_replace: bool,
        #[arg(long)]
        if_not_exists: bool,
        #[arg(long)]
        transient: bool,
        #[arg(long)]
        managed_access: bool,
        #[arg(long)]
        comment: Option<String>,
    },
    /// DROP SCHEMA.
    Drop {
        name: DatabaseObjectIdentifier,
        #[arg(long)]
        if_exists: bool,
        #[arg(long, conflicts_with = "restrict")]
        cascade: bool,
        #[arg(long)]
        restrict: bool,
    },
    /// SHOW SCHEMAS IN DATABASE.
    Show {
        database: AccountObjectIdentifier,
        #[arg(long)]
        like: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum AlertCommand {
    /// CREATE ALERT.
    Create {
        name: SchemaObjectIdentifier,
        #[arg(long)]
        warehouse: AccountObjectIdentifier,
        #[arg(long)]
        schedule: String,
        /// Query whose rows trigger the alert.
        #[arg(long)]
        condition: String,
        #[arg(long)]
        action: String,
        #[arg(long)]
        comment: Option<String>,
        #[arg(long)]
        or_replace: bool,
    },
    /// ALTER ALERT ... RESUME.
    Resume { name: SchemaObjectIdentifier },
    /// ALTER ALERT ... SUSPEND.
    Suspend { name: SchemaObjectIdentifier },
    /// DROP ALERT.
    Drop {
        name: SchemaObjectIdentifier,
        #[arg(long)]
        if_exists: bool,
    },
    /// SHOW ALERTS LIKE ... IN SCHEMA ...
    Show { name: SchemaObjectIdentifier },
}

#[derive(Subcommand, Debug)]
pub enum FunctionCommand {
    /// DROP FUNCTION.
    Drop {
        name: SchemaObjectIdentifierWithArguments,
        #[arg(long)]
        if_exists: bool,
    },
    /// DESCRIBE FUNCTION.
    Describe {
        name: SchemaObjectIdentifierWithArguments,
    },
    /// SHOW USER FUNCTIONS IN SCHEMA.
    Show { schema: DatabaseObjectIdentifier },
}

const fn flag(set: bool) -> Option<bool> {
    if set {
        Some(true)
    } else {
        None
    }
}

/// Renders the statement for `command`. `Ident` renders nothing.
pub fn render_command(command: &Commands) -> Result<Option<Statement>> {
    let statement = match command {
        Commands::Warehouse(command) => warehouse(command)?,
        Commands::Database(command) => database(command)?,
        Commands::Schema(command) => schema(command)?,
        Commands::Alert(command) => alert(command)?,
        Commands::Function(command) => function(command)?,
        Commands::Ident { .. } => return Ok(None),
    };
    Ok(Some(statement))
}

fn warehouse_unset(properties: &[String]) -> std::result::Result<Option<WarehouseUnset>, String> {
    if properties.is_empty() {
        return Ok(None);
    }
    let mut unset = WarehouseUnset::default();
    for property in properties {
        let slot = match property.to_ascii_lowercase().as_str() {
            "warehouse_type" => &mut unset.warehouse_type,
            "warehouse_size" => &mut unset.warehouse_size,
            "max_cluster_count" => &mut unset.max_cluster_count,
            "min_cluster_count" => &mut unset.min_cluster_count,
            "scaling_policy" => &mut unset.scaling_policy,
            "auto_suspend" => &mut unset.auto_suspend,
            "auto_resume" => &mut unset.auto_resume,
            "resource_monitor" => &mut unset.resource_monitor,
            "comment" => &mut unset.comment,
            other => return Err(format!("unknown warehouse property `{other}`")),
        };
        *slot = Some(true);
    }
    Ok(Some(unset))
}

fn warehouse(command: &WarehouseCommand) -> Result<Statement> {
    match command {
        WarehouseCommand::Create {
            name,
            or_replace,
            if_not_exists,
            warehouse_type,
            size,
            min_cluster_count,
            max_cluster_count,
            auto_suspend,
            auto_resume,
            initially_suspended,
            comment,
        } => render(&CreateWarehouseOptions {
            or_replace: flag(*or_replace),
            if_not_exists: flag(*if_not_exists),
            name: name.clone(),
            warehouse_type: *warehouse_type,
            warehouse_size: *size,
            min_cluster_count: *min_cluster_count,
            max_cluster_count: *max_cluster_count,
            auto_suspend: *auto_suspend,
            auto_resume: *auto_resume,
            initially_suspended: *initially_suspended,
            comment: comment.clone(),
            ..Default::default()
        })
        .map(Statement::exec),
        WarehouseCommand::Alter {
            name,
            suspend,
            resume,
            if_suspended,
            abort_all_queries,
            rename,
            set,
            unset,
        } => {
            let set = WarehouseSet {
                warehouse_size: set.set_size,
                auto_suspend: set.set_auto_suspend,
                auto_resume: set.set_auto_resume,
                comment: set.set_comment.clone(),
                ..Default::default()
            };
            let unset = warehouse_unset(unset)
                .map_err(|message| Error::Validation(ValidationError::new(message)))?;
            render(&AlterWarehouseOptions {
                name: name.clone(),
                suspend: flag(*suspend),
                resume: flag(*resume),
                if_suspended: flag(*if_suspended),
                abort_all_queries: flag(*abort_all_queries),
                new_name: rename.clone(),
                set: value_set(&set).then_some(set),
                unset,
                ..Default::default()
            })
            .map(Statement::exec)
        }
        WarehouseCommand::Drop { name, if_exists } => render(&DropWarehouseOptions {
            if_exists: flag(*if_exists),
            name: name.clone(),
            ..Default::default()
        })
        .map(Statement::exec),
        WarehouseCommand::Show { like } => render(&ShowWarehouseOptions {
            like: like.as_deref().map(Like::new),
            ..Default::default()
        })
        .map(Statement::query),
        WarehouseCommand::Describe { name } => render(&DescribeWarehouseOptions {
            name: name.clone(),
            ..Default::default()
        })
        .map(Statement::query),
    }
}

fn database(command: &DatabaseCommand) -> Result<Statement> {
    match command {
        DatabaseCommand::Create {
            name,
            or_replace,
            if_not_exists,
            transient,
            clone,
            data_retention_time_in_days,
            comment,
        } => render(&CreateDatabaseOptions {
            or_replace: flag(*or_replace),
            transient: flag(*transient),
            if_not_exists: flag(*if_not_exists),
            name: name.clone(),
            clone: clone.clone().map(|source| DatabaseClone {
                source,
                at_or_before: None,
            }),
            data_retention_time_in_days: *data_retention_time_in_days,
            comment: comment.clone(),
            ..Default::default()
        })
        .map(Statement::exec),
        DatabaseCommand::Rename { name, new_name } => render(&AlterDatabaseOptions {
            name: name.clone(),
            new_name: Some(new_name.clone()),
            ..Default::default()
        })
        .map(Statement::exec),
        DatabaseCommand::Drop {
            name,
            if_exists,
            cascade,
            restrict,
        } => render(&DropDatabaseOptions {
            if_exists: flag(*if_exists),
            name: name.clone(),
            cascade: flag(*cascade),
            restrict: flag(*restrict),
            ..Default::default()
        })
        .map(Statement::exec),
        DatabaseCommand::Show {
            terse,
            like,
            starts_with,
            limit,
        } => render(&ShowDatabaseOptions {
            terse: flag(*terse),
            like: like.as_deref().map(Like::new),
            starts_with: starts_with.clone(),
            limit: limit.map(|rows| LimitFrom {
                rows: Some(rows),
                from: None,
            }),
            ..Default::default()
        })
        .map(Statement::query),
    }
}

fn schema(command: &SchemaCommand) -> Result<Statement> {
    match command {
        SchemaCommand::Create {
            name,
            or_replace,
            if_not_exists,
            transient,
            managed_access,
            comment,
        } => render(&CreateSchemaOptions {
            or_replace: flag(*or_replace),
            transient: flag(*transient),
            if_not_exists: flag(*if_not_exists),
            name: name.clone(),
            with_managed_access: flag(*managed_access),
            comment: comment.clone(),
            ..Default::default()
        })
        .map(Statement::exec),
        SchemaCommand::Drop {
            name,
            if_exists,
            cascade,
            restrict,
        } => render(&DropSchemaOptions {
            if_exists: flag(*if_exists),
            name: name.clone(),
            cascade: flag(*cascade),
            restrict: flag(*restrict),
            ..Default::default()
        })
        .map(Statement::exec),
        SchemaCommand::Show { database, like } => render(&ShowSchemaOptions {
            like: like.as_deref().map(Like::new),
            in_: Some(In::database(database.clone())),
            ..Default::default()
        })
        .map(Statement::query),
    }
}

fn alert(command: &AlertCommand) -> Result<Statement> {
    let operation = |name: &SchemaObjectIdentifier, operation| {
        render(&AlterAlertOptions {
            name: name.clone(),
            operation: Some(operation),
            ..Default::default()
        })
        .map(Statement::exec)
    };
    match command {
        AlertCommand::Create {
            name,
            warehouse,
            schedule,
            condition,
            action,
            comment,
            or_replace,
        } => render(&CreateAlertOptions {
            or_replace: flag(*or_replace),
            name: name.clone(),
            warehouse: warehouse.clone(),
            schedule: schedule.clone(),
            comment: comment.clone(),
            condition: AlertCondition::new(condition.clone()),
            action: action.clone(),
            ..Default::default()
        })
        .map(Statement::exec),
        AlertCommand::Resume { name } => operation(name, AlertOperation::Resume),
        AlertCommand::Suspend { name } => operation(name, AlertOperation::Suspend),
        AlertCommand::Drop { name, if_exists } => render(&DropAlertOptions {
            if_exists: flag(*if_exists),
            name: name.clone(),
            ..Default::default()
        })
        .map(Statement::exec),
        AlertCommand::Show { name } => render(&ShowAlertOptions::for_id(name)).map(Statement::query),
    }
}

fn function(command: &FunctionCommand) -> Result<Statement> {
    match command {
        FunctionCommand::Drop { name, if_exists } => render(&DropFunctionOptions {
            if_exists: flag(*if_exists),
            name: name.clone(),
            ..Default::default()
        })
        .map(Statement::exec),
        FunctionCommand::Describe { name } => render(&DescribeFunctionOptions {
            name: name.clone(),
            ..Default::default()
        })
        .map(Statement::query),
        FunctionCommand::Show { schema } => render(&ShowFunctionOptions {
            in_: Some(In::schema(schema.clone())),
            ..Default::default()
        })
        .map(Statement::query),
    }
}

/// Describes an identifier: quoted form, then one line per ancestor.
///
/// The input is tried as a function signature first, then from the most
/// qualified form down to an account-level name.
pub fn describe_identifier(input: &str) -> Result<Vec<String>> {
    fn lines(id: &impl ObjectIdentifier, kind: &str) -> Vec<String> {
        let mut out = vec![format!("{kind} {}", id.fully_qualified_name())];
        out.extend(id.ancestors().iter().map(|ancestor| match ancestor {
            Ancestor::Schema(schema) => format!("  in schema {schema}"),
            Ancestor::Database(database) => format!("  in database {database}"),
        }));
        out
    }

    if input.contains('(') {
        let id: SchemaObjectIdentifierWithArguments = input.parse()?;
        return Ok(lines(&id, "function"));
    }
    if let Ok(id) = input.parse::<SchemaObjectIdentifier>() {
        return Ok(lines(&id, "schema object"));
    }
    if let Ok(id) = input.parse::<DatabaseObjectIdentifier>() {
        return Ok(lines(&id, "database object"));
    }
    let id: AccountObjectIdentifier = input.parse()?;
    Ok(lines(&id, "account object"))
}
