#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use snowddl_core::row::Row;
use snowddl_core::DriverError;
use snowddl_sdk::{Client, Context, Driver, ExecResult};

/// What the fake answers to a statement.
#[derive(Debug, Clone)]
pub enum Reply {
    Rows(Vec<Row>),
    Exec(u64),
    Error(String),
    /// Never completes.
    Pending,
}

/// Scripted driver: replies are chosen by the first rule whose pattern is a
/// substring of the statement. Unmatched statements succeed with no rows.
#[derive(Debug, Default)]
pub struct FakeDriver {
    rules: Mutex<Vec<(String, Reply)>>,
    executed: Mutex<Vec<String>>,
}

impl FakeDriver {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn on(&self, pattern: &str, reply: Reply) {
        self.rules
            .lock()
            .unwrap()
            .push((pattern.to_string(), reply));
    }

    pub fn executed(&self) -> Vec<String> {
        self.executed.lock().unwrap().clone()
    }

    pub fn ran(&self, pattern: &str) -> bool {
        self.executed().iter().any(|sql| sql.contains(pattern))
    }

    fn reply(&self, sql: &str) -> Option<Reply> {
        self.executed.lock().unwrap().push(sql.to_string());
        self.rules
            .lock()
            .unwrap()
            .iter()
            .find(|(pattern, _)| sql.contains(pattern.as_str()))
            .map(|(_, reply)| reply.clone())
    }
}

impl Driver for FakeDriver {
    async fn exec(&self, _ctx: &Context, sql: &str) -> Result<ExecResult, DriverError> {
        match self.reply(sql) {
            None | Some(Reply::Rows(_)) => Ok(ExecResult::default()),
            Some(Reply::Exec(rows_affected)) => Ok(ExecResult { rows_affected }),
            Some(Reply::Error(message)) => Err(DriverError::new(message)),
            Some(Reply::Pending) => std::future::pending().await,
        }
    }

    async fn query(&self, _ctx: &Context, sql: &str) -> Result<Vec<Row>, DriverError> {
        match self.reply(sql) {
            None | Some(Reply::Exec(_)) => Ok(Vec::new()),
            Some(Reply::Rows(rows)) => Ok(rows),
            Some(Reply::Error(message)) => Err(DriverError::new(message)),
            Some(Reply::Pending) => std::future::pending().await,
        }
    }
}

pub fn client() -> (Arc<FakeDriver>, Client<Arc<FakeDriver>>) {
    let driver = FakeDriver::new();
    (driver.clone(), Client::new(driver))
}

pub fn alert_row(database: &str, schema: &str, name: &str) -> Row {
    Row::new()
        .with("created_on", "2024-01-02 03:04:05.000 +0000")
        .with("name", name)
        .with("database_name", database)
        .with("schema_name", schema)
        .with("owner", "SYSADMIN")
        .with("warehouse", "WH1")
        .with("schedule", "5 MINUTE")
        .with("state", "started")
        .with("condition", "SELECT 1")
        .with("action", "SELECT 2")
}

pub fn schema_row(database: &str, name: &str) -> Row {
    Row::new()
        .with("name", name)
        .with("database_name", database)
}

pub fn database_row(name: &str) -> Row {
    Row::new().with("name", name).with("options", "")
}

pub const NOT_AUTHORIZED: &str =
    "SQL compilation error: Object 'DB.SC.LEAF' does not exist or not authorized.";
