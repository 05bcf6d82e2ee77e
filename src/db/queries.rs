use anyhow::Context;
use chrono::{NaiveDateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use serde_json::Value;

use crate::models::{TaskRecord, TaskStatus};

const TS_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

fn fmt_ts(ts: &NaiveDateTime) -> String {
    ts.format(TS_FORMAT).to_string()
}

fn parse_ts(s: &str) -> anyhow::Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, TS_FORMAT)
        .with_context(|| format!("invalid stored timestamp: {s}"))
}

// ── Task results ──

pub fn insert_task(conn: &Connection, record: &TaskRecord) -> anyhow::Result<()> {
    let args = serde_json::to_string(&record.args)?;
    conn.execute(
        "INSERT INTO task_results (id, name, args, status, created_at, expires_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            record.id,
            record.name,
            args,
            record.status.as_str(),
            fmt_ts(&record.created_at),
            fmt_ts(&record.expires_at),
        ],
    )?;
    Ok(())
}

pub fn mark_started(conn: &Connection, id: &str) -> anyhow::Result<()> {
    conn.execute(
        "UPDATE task_results SET status = ?1 WHERE id = ?2",
        params![TaskStatus::Started.as_str(), id],
    )?;
    Ok(())
}

/// Stores the outcome and restarts the expiry clock from completion time.
pub fn finish_task(
    conn: &Connection,
    id: &str,
    outcome: &Result<Value, String>,
    expires_at: &NaiveDateTime,
) -> anyhow::Result<()> {
    let now = fmt_ts(&Utc::now().naive_utc());
    let (status, result, error) = match outcome {
        Ok(value) => (TaskStatus::Success, Some(serde_json::to_string(value)?), None),
        Err(e) => (TaskStatus::Failure, None, Some(e.as_str())),
    };

    conn.execute(
        "UPDATE task_results
         SET status = ?1, result = ?2, error = ?3, finished_at = ?4, expires_at = ?5
         WHERE id = ?6",
        params![status.as_str(), result, error, now, fmt_ts(expires_at), id],
    )?;
    Ok(())
}

pub fn delete_task(conn: &Connection, id: &str) -> anyhow::Result<()> {
    conn.execute("DELETE FROM task_results WHERE id = ?1", params![id])?;
    Ok(())
}

pub fn get_task(conn: &Connection, id: &str) -> anyhow::Result<Option<TaskRecord>> {
    let now = fmt_ts(&Utc::now().naive_utc());
    let row = conn
        .query_row(
            "SELECT id, name, args, status, result, error, created_at, finished_at, expires_at
             FROM task_results WHERE id = ?1 AND expires_at > ?2",
            params![id, now],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, Option<String>>(4)?,
                    row.get::<_, Option<String>>(5)?,
                    row.get::<_, String>(6)?,
                    row.get::<_, Option<String>>(7)?,
                    row.get::<_, String>(8)?,
                ))
            },
        )
        .optional()?;

    let Some((id, name, args, status, result, error, created_at, finished_at, expires_at)) = row
    else {
        return Ok(None);
    };

    let args = serde_json::from_str(&args)
        .with_context(|| format!("invalid stored args for task {id}"))?;
    let status = TaskStatus::parse(&status)
        .with_context(|| format!("unknown status {status:?} for task {id}"))?;
    let result = result
        .map(|r| serde_json::from_str(&r))
        .transpose()
        .with_context(|| format!("invalid stored result for task {id}"))?;

    Ok(Some(TaskRecord {
        args,
        status,
        result,
        error,
        created_at: parse_ts(&created_at)?,
        finished_at: finished_at.as_deref().map(parse_ts).transpose()?,
        expires_at: parse_ts(&expires_at)?,
        id,
        name,
    }))
}

pub fn expire_old_results(conn: &Connection) -> anyhow::Result<usize> {
    let now = fmt_ts(&Utc::now().naive_utc());
    let count = conn.execute(
        "DELETE FROM task_results WHERE expires_at <= ?1",
        params![now],
    )?;
    Ok(count)
}
