#![allow(dead_code)]

use flix_core::{open_db_in_memory, populate, PopulateSummary};
use rusqlite::Connection;
use std::path::PathBuf;

pub fn fixture_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("data")
}

/// In-memory database loaded with the 14-movie fixture catalogue.
pub fn populated_db() -> Connection {
    populated_db_with_summary().0
}

pub fn populated_db_with_summary() -> (Connection, PopulateSummary) {
    let conn = open_db_in_memory().unwrap();
    let summary = populate(&conn, fixture_dir()).unwrap();
    (conn, summary)
}

pub fn count_rows(conn: &Connection, table: &str) -> i64 {
    conn.query_row(&format!("SELECT COUNT(*) FROM {table};"), [], |row| {
        row.get(0)
    })
    .unwrap()
}
