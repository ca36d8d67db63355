//! The operation pipeline end to end against a scripted driver: statement
//! dispatch, row decoding, error classification, cancellation and deadlines.

mod common;
use common::*;

use std::io::Write;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use snowddl_core::{AccountObjectIdentifier, ErrorKind, SchemaObjectIdentifier};
use snowddl_sdk::prelude::*;
use snowddl_sdk::Error;

fn leaf() -> SchemaObjectIdentifier {
    SchemaObjectIdentifier::new("db", "sc", "leaf")
}

#[tokio::test]
async fn create_dispatches_rendered_statement() {
    let (driver, client) = client();
    let ctx = Context::new();
    client
        .warehouses()
        .create(&ctx, &AccountObjectIdentifier::new("WH1"), None)
        .await
        .unwrap();
    assert_eq!(driver.executed(), vec![r#"CREATE WAREHOUSE "WH1""#]);
}

#[tokio::test]
async fn invalid_options_never_reach_the_driver() {
    let (driver, client) = client();
    let ctx = Context::new();
    let err = client
        .warehouses()
        .alter(&ctx, &AccountObjectIdentifier::new("WH1"), None)
        .await
        .unwrap_err();
    assert!(err.is(ErrorKind::Validation));
    assert!(driver.executed().is_empty());
}

#[tokio::test]
async fn show_by_id_picks_the_matching_row() {
    let (driver, client) = client();
    driver.on(
        "SHOW ALERTS",
        Reply::Rows(vec![
            alert_row("db", "sc", "leaf_2"),
            alert_row("db", "sc", "leaf"),
            alert_row("db", "other", "leaf"),
        ]),
    );
    let ctx = Context::new();

    let alert = client.alerts().show_by_id(&ctx, &leaf()).await.unwrap();

    assert_eq!(
        driver.executed(),
        vec![r#"SHOW ALERTS LIKE 'leaf' IN SCHEMA "db"."sc""#]
    );
    assert_eq!(alert.id(), leaf());
    assert_eq!(alert.state, Some(AlertState::Started));
    assert_eq!(alert.warehouse.as_deref(), Some("WH1"));
    assert!(alert.created_on.is_some());
}

#[tokio::test]
async fn show_by_id_without_match_is_object_not_found() {
    let (driver, client) = client();
    driver.on(
        "SHOW ALERTS",
        Reply::Rows(vec![alert_row("db", "sc", "leaf_2")]),
    );
    let ctx = Context::new();

    let err = client.alerts().show_by_id(&ctx, &leaf()).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ObjectNotFound);
    assert!(err.to_string().contains(r#""db"."sc"."leaf""#));
}

#[tokio::test]
async fn missing_column_is_a_scan_error() {
    let (driver, client) = client();
    driver.on(
        "SHOW ALERTS",
        Reply::Rows(vec![snowddl_core::Row::new().with("name", "leaf")]),
    );
    let ctx = Context::new();

    let err = client.alerts().show(&ctx, None).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Scan);
}

#[tokio::test]
async fn driver_errors_are_classified() {
    let (driver, client) = client();
    driver.on("DROP ALERT", Reply::Error(NOT_AUTHORIZED.to_string()));
    driver.on(
        "DROP SCHEMA",
        Reply::Error(String::from(
            "Schema 'DB.SC' does not exist, or operation cannot be performed.",
        )),
    );
    driver.on("DROP DATABASE", Reply::Error(String::from("syntax error")));
    let ctx = Context::new();

    let err = client.alerts().drop(&ctx, &leaf(), None).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ObjectNotExistOrAuthorized);

    let err = client
        .schemas()
        .drop(&ctx, &leaf().schema_id(), None)
        .await
        .unwrap_err();
    assert_eq!(
        err.kind(),
        ErrorKind::DoesNotExistOrOperationCannotBePerformed
    );

    let err = client
        .databases()
        .drop(&ctx, &leaf().database_id(), None)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Driver);
}

#[tokio::test]
async fn cancelled_context_skips_the_driver() {
    let (driver, client) = client();
    let ctx = Context::new();
    ctx.cancel();

    let err = client
        .warehouses()
        .drop(&ctx, &AccountObjectIdentifier::new("WH1"), None)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Cancelled));
    assert!(driver.executed().is_empty());
}

#[tokio::test]
async fn cancellation_interrupts_a_running_statement() {
    let (driver, client) = client();
    driver.on("DROP WAREHOUSE", Reply::Pending);
    let ctx = Context::new();
    let canceller = ctx.clone();
    let warehouses = client.warehouses();
    let id = AccountObjectIdentifier::new("WH1");

    let (result, ()) = tokio::join!(
        warehouses.drop(&ctx, &id, None),
        async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            canceller.cancel();
        }
    );

    assert!(matches!(result, Err(Error::Cancelled)));
    assert!(driver.ran("DROP WAREHOUSE"));
}

#[derive(Clone, Default)]
struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl LogBuffer {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// Cancels a pending `DROP WAREHOUSE` and returns what was logged.
async fn logs_of_cancelled_drop(log_sql: bool) -> String {
    let logs = LogBuffer::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();
    let _guard = tracing::subscriber::set_default(subscriber);

    let driver = FakeDriver::new();
    driver.on("DROP WAREHOUSE", Reply::Pending);
    let config = ClientConfig {
        log_sql,
        ..ClientConfig::default()
    };
    let client = Client::with_config(driver, config);
    let ctx = Context::new();
    let canceller = ctx.clone();
    let warehouses = client.warehouses();
    let id = AccountObjectIdentifier::new("SECRET_WH");

    let (result, ()) = tokio::join!(warehouses.drop(&ctx, &id, None), async move {
        tokio::time::sleep(Duration::from_millis(10)).await;
        canceller.cancel();
    });
    assert!(matches!(result, Err(Error::Cancelled)));
    logs.contents()
}

#[tokio::test]
async fn cancelled_statement_text_is_logged_only_when_enabled() {
    let quiet = logs_of_cancelled_drop(false).await;
    assert!(quiet.contains("Statement cancelled"));
    assert!(!quiet.contains("SECRET_WH"));

    let verbose = logs_of_cancelled_drop(true).await;
    assert!(verbose.contains("Statement cancelled"));
    assert!(verbose.contains("SECRET_WH"));
}

#[tokio::test]
async fn deadline_bounds_a_running_statement() {
    let (driver, client) = client();
    driver.on("SHOW WAREHOUSES", Reply::Pending);
    let ctx = Context::new().with_timeout(Duration::from_millis(20));

    let err = client.warehouses().show(&ctx, None).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Timeout);
}

#[tokio::test]
async fn raw_exec_reports_rows_affected() {
    let (driver, client) = client();
    driver.on("DELETE", Reply::Exec(3));
    let ctx = Context::new();

    let result = client.exec(&ctx, "DELETE FROM t").await.unwrap();
    assert_eq!(result.rows_affected, 3);
}

#[test]
fn pipeline_runs_on_a_plain_runtime() {
    let (driver, client) = client();
    driver.on(
        "SHOW DATABASES",
        Reply::Rows(vec![database_row("DB1"), database_row("DB10")]),
    );
    let ctx = Context::new();
    let id = AccountObjectIdentifier::new("DB1");

    let database = tokio_test::block_on(client.databases().show_by_id(&ctx, &id)).unwrap();
    assert_eq!(database.name, "DB1");
    assert!(!database.transient);
}
