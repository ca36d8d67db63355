//! Hierarchy-aware wrappers: ancestor walks after ambiguous "does not exist"
//! errors.

mod common;
use common::*;

use snowddl_core::{
    AccountObjectIdentifier, DatabaseObjectIdentifier, ErrorKind, SchemaObjectIdentifier,
    SchemaObjectIdentifierWithArguments,
};
use snowddl_sdk::prelude::*;

fn leaf() -> SchemaObjectIdentifier {
    SchemaObjectIdentifier::new("db", "sc", "leaf")
}

// ================================================================
// safe_drop
// ================================================================

#[tokio::test]
async fn drop_succeeds_when_database_is_gone() {
    let (driver, client) = client();
    driver.on("DROP ALERT", Reply::Error(NOT_AUTHORIZED.to_string()));
    driver.on(
        "SHOW SCHEMAS",
        Reply::Error(String::from(
            "Database 'DB' does not exist or not authorized.",
        )),
    );
    driver.on("SHOW DATABASES", Reply::Rows(Vec::new()));
    let ctx = Context::new();

    client
        .alerts()
        .drop_safely(&ctx, &leaf(), None)
        .await
        .unwrap();

    assert_eq!(
        driver.executed(),
        vec![
            r#"DROP ALERT "db"."sc"."leaf""#,
            r#"SHOW SCHEMAS LIKE 'sc' IN DATABASE "db""#,
            r#"SHOW DATABASES LIKE 'db'"#,
        ]
    );
}

#[tokio::test]
async fn drop_succeeds_when_schema_is_gone() {
    let (driver, client) = client();
    driver.on("DROP ALERT", Reply::Error(NOT_AUTHORIZED.to_string()));
    driver.on("SHOW SCHEMAS", Reply::Rows(Vec::new()));
    let ctx = Context::new();

    client
        .alerts()
        .drop_safely(&ctx, &leaf(), None)
        .await
        .unwrap();
    assert!(!driver.ran("SHOW DATABASES"));
}

#[tokio::test]
async fn drop_keeps_error_when_ancestors_exist() {
    let (driver, client) = client();
    driver.on("DROP ALERT", Reply::Error(NOT_AUTHORIZED.to_string()));
    driver.on("SHOW SCHEMAS", Reply::Rows(vec![schema_row("db", "sc")]));
    driver.on("SHOW DATABASES", Reply::Rows(vec![database_row("db")]));
    let ctx = Context::new();

    let err = client
        .alerts()
        .drop_safely(&ctx, &leaf(), None)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ObjectNotExistOrAuthorized);
}

#[tokio::test]
async fn drop_passes_other_errors_through() {
    let (driver, client) = client();
    driver.on("DROP ALERT", Reply::Error(String::from("warehouse busy")));
    let ctx = Context::new();

    let err = client
        .alerts()
        .drop_safely(&ctx, &leaf(), None)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Driver);
    assert_eq!(driver.executed().len(), 1);
}

#[tokio::test]
async fn drop_of_function_overload_walks_its_schema() {
    let (driver, client) = client();
    driver.on("DROP FUNCTION", Reply::Error(NOT_AUTHORIZED.to_string()));
    driver.on("SHOW SCHEMAS", Reply::Rows(Vec::new()));
    let ctx = Context::new();
    let id = SchemaObjectIdentifierWithArguments::new(
        "db",
        "sc",
        "f",
        vec![String::from("NUMBER")],
    );

    client
        .functions()
        .drop_safely(&ctx, &id, None)
        .await
        .unwrap();
    assert!(driver.ran(r#"DROP FUNCTION "db"."sc"."f"(NUMBER)"#));
}

// ================================================================
// safe_show_by_id
// ================================================================

#[tokio::test]
async fn show_stops_at_missing_schema() {
    let (driver, client) = client();
    driver.on("SHOW ALERTS", Reply::Error(NOT_AUTHORIZED.to_string()));
    driver.on("SHOW SCHEMAS", Reply::Rows(Vec::new()));
    let ctx = Context::new();

    let err = client
        .alerts()
        .show_by_id_safely(&ctx, &leaf())
        .await
        .unwrap_err();

    let errors = err.errors();
    assert_eq!(errors.len(), 2);
    assert_eq!(errors[0].kind(), ErrorKind::ObjectNotExistOrAuthorized);
    assert_eq!(errors[1].kind(), ErrorKind::ObjectNotFound);
    assert!(errors[1].to_string().contains(r#""db"."sc""#));
    assert!(!driver.ran("SHOW DATABASES"));
}

#[tokio::test]
async fn show_lists_missing_database_after_existing_schema() {
    let (driver, client) = client();
    driver.on("SHOW ALERTS", Reply::Error(NOT_AUTHORIZED.to_string()));
    driver.on("SHOW SCHEMAS", Reply::Rows(vec![schema_row("db", "sc")]));
    driver.on("SHOW DATABASES", Reply::Rows(Vec::new()));
    let ctx = Context::new();

    let err = client
        .alerts()
        .show_by_id_safely(&ctx, &leaf())
        .await
        .unwrap_err();

    assert!(err.is(ErrorKind::ObjectNotExistOrAuthorized));
    assert!(err.is(ErrorKind::ObjectNotFound));
    let errors = err.errors();
    assert_eq!(errors.len(), 2);
    assert!(errors[1].to_string().contains(r#""db""#));
}

#[tokio::test]
async fn show_returns_plain_not_found_unchanged() {
    let (driver, client) = client();
    driver.on("SHOW ALERTS", Reply::Rows(Vec::new()));
    let ctx = Context::new();

    let err = client
        .alerts()
        .show_by_id_safely(&ctx, &leaf())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ObjectNotFound);
    assert_eq!(driver.executed().len(), 1);
}

#[tokio::test]
async fn show_of_schema_probes_only_its_database() {
    let (driver, client) = client();
    driver.on("SHOW SCHEMAS", Reply::Error(NOT_AUTHORIZED.to_string()));
    driver.on("SHOW DATABASES", Reply::Rows(Vec::new()));
    let ctx = Context::new();

    let err = client
        .schemas()
        .show_by_id_safely(&ctx, &DatabaseObjectIdentifier::new("db", "sc"))
        .await
        .unwrap_err();
    assert_eq!(err.errors().len(), 2);
    assert_eq!(
        driver.executed(),
        vec![
            r#"SHOW SCHEMAS LIKE 'sc' IN DATABASE "db""#,
            r#"SHOW DATABASES LIKE 'db'"#,
        ]
    );
}

#[tokio::test]
async fn account_level_objects_have_no_ancestors() {
    let (driver, client) = client();
    driver.on("SHOW WAREHOUSES", Reply::Error(NOT_AUTHORIZED.to_string()));
    let ctx = Context::new();

    let err = client
        .warehouses()
        .show_by_id_safely(&ctx, &AccountObjectIdentifier::new("WH1"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ObjectNotExistOrAuthorized);
    assert_eq!(driver.executed().len(), 1);
}
