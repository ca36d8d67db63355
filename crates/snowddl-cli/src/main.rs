//! snowddl CLI
//!
//! Renders DDL for warehouses, databases, schemas, alerts and functions.
//! With `--database-url` the statement is also executed.

mod commands;

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::Parser;
use serde_json::{Map, Value};
use snowddl_core::row::{Cell, Row};
use snowddl_sdk::{Client, ClientConfig, Context, SqlxDriver};
use tracing::{debug, info, Level};
use tracing_subscriber::FmtSubscriber;

use commands::{describe_identifier, render_command, Commands};

/// Render and run warehouse DDL.
#[derive(Parser, Debug)]
#[command(name = "snowddl")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Execute the rendered statement against this database URL.
    #[arg(long, env = "SNOWDDL_DATABASE_URL")]
    database_url: Option<String>,

    /// JSON client configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

fn load_config(path: Option<&Path>) -> anyhow::Result<ClientConfig> {
    let Some(path) = path else {
        return Ok(ClientConfig::from_env()?);
    };
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("reading config file {}", path.display()))?;
    Ok(ClientConfig::from_json(&json)?)
}

fn cell_to_json(cell: &Cell) -> Value {
    match cell {
        Cell::Null => Value::Null,
        Cell::Bool(b) => Value::Bool(*b),
        Cell::Int(n) => Value::from(*n),
        Cell::Float(f) => Value::from(*f),
        Cell::Text(s) => Value::String(s.clone()),
        Cell::Timestamp(ts) => Value::String(ts.to_rfc3339()),
    }
}

fn row_to_json(row: &Row) -> Value {
    let object: Map<String, Value> = row
        .cells()
        .map(|(column, cell)| (column.to_string(), cell_to_json(cell)))
        .collect();
    Value::Object(object)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .without_time()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    if let Commands::Ident { input } = &cli.command {
        for line in describe_identifier(input)? {
            println!("{line}");
        }
        return Ok(());
    }

    let Some(statement) = render_command(&cli.command)? else {
        return Ok(());
    };
    println!("{};", statement.sql);

    let Some(url) = &cli.database_url else {
        debug!("No database URL, statement not executed");
        return Ok(());
    };

    let config = load_config(cli.config.as_deref())?;
    let driver = SqlxDriver::connect(url).await?;
    let client = Client::with_config(driver, config);
    let ctx = Context::new();

    if statement.returns_rows {
        let rows = client.query_rows(&ctx, &statement.sql).await?;
        for row in &rows {
            println!("{}", row_to_json(row));
        }
        info!("{} row(s)", rows.len());
    } else {
        let result = client.exec(&ctx, &statement.sql).await?;
        info!("Statement executed, {} row(s) affected", result.rows_affected);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use std::io::Write;

    fn render_args(args: &[&str]) -> String {
        let cli = Cli::try_parse_from(std::iter::once("snowddl").chain(args.iter().copied()))
            .unwrap();
        render_command(&cli.command).unwrap().unwrap().sql
    }

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_warehouse_create() {
        assert_eq!(
            render_args(&[
                "warehouse",
                "create",
                "WH1",
                "--type",
                "standard",
                "--size",
                "small",
                "--auto-suspend",
                "600",
                "--comment",
                "hi",
            ]),
            r#"CREATE WAREHOUSE "WH1" WAREHOUSE_TYPE = 'STANDARD' WAREHOUSE_SIZE = 'SMALL' AUTO_SUSPEND = 600 COMMENT = 'hi'"#
        );
    }

    #[test]
    fn test_warehouse_alter_set() {
        assert_eq!(
            render_args(&["warehouse", "alter", "WH1", "--set-auto-suspend", "300"]),
            r#"ALTER WAREHOUSE "WH1" SET AUTO_SUSPEND = 300"#
        );
    }

    #[test]
    fn test_warehouse_alter_set_and_unset_rejected() {
        let cli = Cli::try_parse_from([
            "snowddl",
            "warehouse",
            "alter",
            "WH1",
            "--set-auto-suspend",
            "300",
            "--unset",
            "comment",
        ])
        .unwrap();
        assert!(render_command(&cli.command).is_err());
    }

    #[test]
    fn test_alert_show_scoping() {
        assert_eq!(
            render_args(&["alert", "show", "db.sc.leaf"]),
            r#"SHOW ALERTS LIKE 'leaf' IN SCHEMA "db"."sc""#
        );
    }

    #[test]
    fn test_schema_drop_cascade() {
        assert_eq!(
            render_args(&["schema", "drop", "db.sc", "--cascade"]),
            r#"DROP SCHEMA "db"."sc" CASCADE"#
        );
    }

    #[test]
    fn test_malformed_identifier_is_a_parse_error() {
        assert!(Cli::try_parse_from(["snowddl", "alert", "show", "db.sc"]).is_err());
    }

    #[test]
    fn test_describe_identifier() {
        assert_eq!(
            describe_identifier("db.sc.leaf").unwrap(),
            vec![
                r#"schema object "db"."sc"."leaf""#,
                r#"  in schema "db"."sc""#,
                r#"  in database "db""#,
            ]
        );
        assert_eq!(
            describe_identifier("WH1").unwrap(),
            vec![r#"account object "WH1""#]
        );
    }

    #[test]
    fn test_row_to_json() {
        let row = Row::new().with("name", "WH1").with("running", 2_i64);
        assert_eq!(
            row_to_json(&row).to_string(),
            r#"{"name":"WH1","running":2}"#
        );
    }

    #[test]
    fn test_load_config_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"statement_timeout_secs": 30, "account_locator": "AB12345"}}"#
        )
        .unwrap();

        let config = load_config(Some(file.path())).unwrap();
        assert_eq!(config.statement_timeout_secs, Some(30));
        assert_eq!(config.account_locator.as_deref(), Some("AB12345"));
        assert!(config.log_sql);
    }

    #[test]
    fn test_load_config_rejects_bad_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert!(load_config(Some(file.path())).is_err());
    }
}
