//! Statement emission for the bundled resources, through the public
//! `render` entry point.

use snowddl_core::{
    AccountObjectIdentifier, DatabaseObjectIdentifier, ErrorKind, SchemaObjectIdentifier,
};
use snowddl_sdk::prelude::*;

fn wh1() -> AccountObjectIdentifier {
    AccountObjectIdentifier::new("WH1")
}

// ================================================================
// Warehouses
// ================================================================

#[test]
fn create_with_required_fields_only() {
    let opts = CreateWarehouseOptions {
        name: wh1(),
        ..Default::default()
    };
    assert_eq!(render(&opts).unwrap(), r#"CREATE WAREHOUSE "WH1""#);
}

#[test]
fn create_with_parameter_group() {
    let opts = CreateWarehouseOptions {
        name: wh1(),
        warehouse_type: Some(WarehouseType::Standard),
        warehouse_size: Some(WarehouseSize::Small),
        auto_suspend: Some(600),
        comment: Some(String::from("hi")),
        ..Default::default()
    };
    assert_eq!(
        render(&opts).unwrap(),
        r#"CREATE WAREHOUSE "WH1" WAREHOUSE_TYPE = 'STANDARD' WAREHOUSE_SIZE = 'SMALL' AUTO_SUSPEND = 600 COMMENT = 'hi'"#
    );
}

#[test]
fn alter_with_set_only() {
    let opts = AlterWarehouseOptions {
        name: wh1(),
        set: Some(WarehouseSet {
            auto_suspend: Some(300),
            ..Default::default()
        }),
        ..Default::default()
    };
    assert_eq!(
        render(&opts).unwrap(),
        r#"ALTER WAREHOUSE "WH1" SET AUTO_SUSPEND = 300"#
    );
}

#[test]
fn alter_with_set_and_unset_is_rejected() {
    let opts = AlterWarehouseOptions {
        name: wh1(),
        set: Some(WarehouseSet {
            auto_suspend: Some(300),
            ..Default::default()
        }),
        unset: Some(WarehouseUnset {
            comment: Some(true),
            ..Default::default()
        }),
        ..Default::default()
    };
    let err = render(&opts).unwrap_err();
    assert!(err.is(ErrorKind::Validation));
    let message = err.to_string();
    assert!(message.contains("set"), "{message}");
    assert!(message.contains("unset"), "{message}");
}

#[test]
fn comment_quotes_are_doubled() {
    let opts = CreateWarehouseOptions {
        name: wh1(),
        comment: Some(String::from("it's")),
        ..Default::default()
    };
    assert_eq!(
        render(&opts).unwrap(),
        r#"CREATE WAREHOUSE "WH1" COMMENT = 'it''s'"#
    );
}

#[test]
fn identifier_quotes_are_doubled() {
    let opts = DropWarehouseOptions {
        name: AccountObjectIdentifier::new(r#"a"b"#),
        ..Default::default()
    };
    assert_eq!(render(&opts).unwrap(), r#"DROP WAREHOUSE "a""b""#);
}

#[test]
fn empty_identifier_is_rejected_before_emission() {
    let err = render(&CreateWarehouseOptions::default()).unwrap_err();
    assert!(err.is(ErrorKind::InvalidIdentifier));
}

#[test]
fn create_with_tags() {
    let opts = CreateWarehouseOptions {
        name: wh1(),
        tag: vec![
            TagAssociation::new(SchemaObjectIdentifier::new("db", "sc", "cost"), "10"),
            TagAssociation::new(SchemaObjectIdentifier::new("db", "sc", "team"), "data"),
        ],
        ..Default::default()
    };
    assert_eq!(
        render(&opts).unwrap(),
        r#"CREATE WAREHOUSE "WH1" WITH TAG ("db"."sc"."cost" = '10', "db"."sc"."team" = 'data')"#
    );
}

#[test]
fn alter_resume_if_suspended() {
    let opts = AlterWarehouseOptions {
        name: wh1(),
        resume: Some(true),
        if_suspended: Some(true),
        ..Default::default()
    };
    assert_eq!(
        render(&opts).unwrap(),
        r#"ALTER WAREHOUSE "WH1" RESUME IF SUSPENDED"#
    );
}

#[test]
fn show_warehouses_like() {
    assert_eq!(
        render(&ShowWarehouseOptions::for_id(&wh1())).unwrap(),
        "SHOW WAREHOUSES LIKE 'WH1'"
    );
}

// ================================================================
// Databases and schemas
// ================================================================

#[test]
fn alter_database_rename() {
    let opts = AlterDatabaseOptions {
        name: AccountObjectIdentifier::new("DB1"),
        new_name: Some(AccountObjectIdentifier::new("DB2")),
        ..Default::default()
    };
    assert_eq!(
        render(&opts).unwrap(),
        r#"ALTER DATABASE "DB1" RENAME TO "DB2""#
    );
}

#[test]
fn alter_database_unset() {
    let opts = AlterDatabaseOptions {
        name: AccountObjectIdentifier::new("DB1"),
        unset: Some(DatabaseUnset {
            comment: Some(true),
            data_retention_time_in_days: Some(true),
            ..Default::default()
        }),
        ..Default::default()
    };
    assert_eq!(
        render(&opts).unwrap(),
        r#"ALTER DATABASE "DB1" UNSET DATA_RETENTION_TIME_IN_DAYS COMMENT"#
    );
}

#[test]
fn drop_schema_cascade() {
    let opts = DropSchemaOptions {
        if_exists: Some(true),
        name: DatabaseObjectIdentifier::new("db", "sc"),
        cascade: Some(true),
        ..Default::default()
    };
    assert_eq!(
        render(&opts).unwrap(),
        r#"DROP SCHEMA IF EXISTS "db"."sc" CASCADE"#
    );
}

#[test]
fn show_schemas_in_account_with_limit_from() {
    let opts = ShowSchemaOptions {
        in_: Some(In::account()),
        limit: Some(LimitFrom {
            rows: Some(10),
            from: Some(String::from("B")),
        }),
        ..Default::default()
    };
    assert_eq!(
        render(&opts).unwrap(),
        "SHOW SCHEMAS IN ACCOUNT LIMIT 10 FROM 'B'"
    );
}

// ================================================================
// Alerts and functions
// ================================================================

#[test]
fn show_alert_by_id_scoping() {
    let id = SchemaObjectIdentifier::new("db", "sc", "leaf");
    assert_eq!(
        render(&ShowAlertOptions::for_id(&id)).unwrap(),
        r#"SHOW ALERTS LIKE 'leaf' IN SCHEMA "db"."sc""#
    );
}

#[test]
fn alter_alert_set() {
    let opts = AlterAlertOptions {
        name: SchemaObjectIdentifier::new("db", "sc", "leaf"),
        set: Some(AlertSet {
            warehouse: Some(AccountObjectIdentifier::new("WH2")),
            schedule: Some(String::from("USING CRON 0 * * * * UTC")),
            ..Default::default()
        }),
        ..Default::default()
    };
    assert_eq!(
        render(&opts).unwrap(),
        r#"ALTER ALERT "db"."sc"."leaf" SET WAREHOUSE = "WH2" SCHEDULE = 'USING CRON 0 * * * * UTC'"#
    );
}

#[test]
fn describe_function_with_arguments() {
    let id: snowddl_core::SchemaObjectIdentifierWithArguments =
        r#""db"."sc"."f"(NUMBER, VARCHAR)"#.parse().unwrap();
    let opts = DescribeFunctionOptions {
        name: id,
        ..Default::default()
    };
    assert_eq!(
        render(&opts).unwrap(),
        r#"DESCRIBE FUNCTION "db"."sc"."f"(NUMBER, VARCHAR)"#
    );
}
