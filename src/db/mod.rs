pub mod migrations;
pub mod queries;

use anyhow::Context;
use rusqlite::Connection;

pub fn init_db(path: &str) -> anyhow::Result<Connection> {
    let conn = Connection::open(path).context("failed to open database")?;

    // In-memory databases report "memory" and keep their journal mode.
    let mode: String = conn
        .query_row("PRAGMA journal_mode=WAL", [], |row| row.get(0))
        .context("failed to set database pragmas")?;
    tracing::debug!(journal_mode = %mode, "opened result backend");

    migrations::run_migrations(&conn)?;

    Ok(conn)
}
