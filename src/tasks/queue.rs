use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::Utc;
use rusqlite::Connection;
use serde_json::Value;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use uuid::Uuid;

use super::TaskRegistry;
use crate::config::QueueConfig;
use crate::db::queries;
use crate::errors::AppError;
use crate::models::{TaskRecord, TaskStatus};

struct Job {
    id: String,
    name: String,
    args: Value,
}

/// In-process broker: a bounded channel drained by a fixed pool of workers,
/// with outcomes kept in the `task_results` table until they expire.
///
/// Failed tasks are recorded and never retried.
#[derive(Clone)]
pub struct TaskQueue {
    registry: Arc<TaskRegistry>,
    db: Arc<Mutex<Connection>>,
    sender: mpsc::Sender<Job>,
    result_expires: chrono::Duration,
}

impl TaskQueue {
    /// Spawns the workers; must be called inside a tokio runtime.
    pub fn start(registry: TaskRegistry, db: Arc<Mutex<Connection>>, config: &QueueConfig) -> Self {
        let (sender, receiver) = mpsc::channel(config.capacity.max(1));
        let receiver = Arc::new(tokio::sync::Mutex::new(receiver));
        let registry = Arc::new(registry);
        let result_expires =
            chrono::Duration::from_std(config.result_expires).unwrap_or(chrono::Duration::hours(1));

        for worker in 0..config.worker_concurrency.max(1) {
            tokio::spawn(worker_loop(
                worker,
                Arc::clone(&receiver),
                Arc::clone(&registry),
                Arc::clone(&db),
                result_expires,
            ));
        }

        tracing::info!(
            workers = config.worker_concurrency.max(1),
            tasks = ?registry.names(),
            "task queue started"
        );

        Self {
            registry,
            db,
            sender,
            result_expires,
        }
    }

    pub fn registered(&self) -> Vec<&str> {
        self.registry.names()
    }

    /// Schedules `name` and returns its id without waiting for it to run.
    pub fn enqueue(&self, name: &str, args: Value) -> Result<Uuid, AppError> {
        if !self.registry.contains(name) {
            return Err(AppError::UnknownTask(name.to_string()));
        }

        let id = Uuid::new_v4();
        let now = Utc::now().naive_utc();
        let record = TaskRecord {
            id: id.to_string(),
            name: name.to_string(),
            args: args.clone(),
            status: TaskStatus::Pending,
            result: None,
            error: None,
            created_at: now,
            finished_at: None,
            expires_at: now + self.result_expires,
        };
        with_db(&self.db, |conn| queries::insert_task(conn, &record))?;

        let job = Job {
            id: record.id,
            name: record.name,
            args,
        };
        if let Err(e) = self.sender.try_send(job) {
            let reason = match e {
                mpsc::error::TrySendError::Full(_) => "queue is full",
                mpsc::error::TrySendError::Closed(_) => "workers have stopped",
            };
            with_db(&self.db, |conn| queries::delete_task(conn, &id.to_string()))?;
            tracing::warn!(task = name, reason, "rejected task");
            return Err(AppError::Queue(reason.to_string()));
        }

        tracing::info!(task_id = %id, task = name, "task enqueued");
        Ok(id)
    }

    /// Latest state of a task, or `None` once its result has expired.
    pub fn result(&self, id: &str) -> Result<Option<TaskRecord>, AppError> {
        with_db(&self.db, |conn| queries::get_task(conn, id))
    }

    /// Polls until the task finishes or `timeout` elapses; returns the last
    /// state seen.
    pub async fn wait(&self, id: &str, timeout: Duration) -> Result<Option<TaskRecord>, AppError> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            let record = self.result(id)?;
            let finished = record.as_ref().map(|r| r.status.is_finished()).unwrap_or(true);
            if finished || tokio::time::Instant::now() >= deadline {
                return Ok(record);
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    }

    pub fn sweep_expired(&self) -> Result<usize, AppError> {
        with_db(&self.db, queries::expire_old_results)
    }

    pub fn spawn_sweeper(&self, interval: Duration) -> JoinHandle<()> {
        let queue = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                match queue.sweep_expired() {
                    Ok(0) => {}
                    Ok(n) => tracing::info!(removed = n, "expired task results"),
                    Err(e) => tracing::error!(error = %e, "failed to expire task results"),
                }
            }
        })
    }
}

fn with_db<T>(
    db: &Mutex<Connection>,
    f: impl FnOnce(&Connection) -> anyhow::Result<T>,
) -> Result<T, AppError> {
    let conn = db
        .lock()
        .map_err(|_| AppError::Internal("database lock poisoned".to_string()))?;
    f(&conn).map_err(AppError::Storage)
}

async fn worker_loop(
    worker: usize,
    receiver: Arc<tokio::sync::Mutex<mpsc::Receiver<Job>>>,
    registry: Arc<TaskRegistry>,
    db: Arc<Mutex<Connection>>,
    result_expires: chrono::Duration,
) {
    loop {
        let job = receiver.lock().await.recv().await;
        let Some(job) = job else { break };
        run_job(worker, job, &registry, &db, result_expires).await;
    }
    tracing::debug!(worker, "task worker stopped");
}

async fn run_job(
    worker: usize,
    job: Job,
    registry: &TaskRegistry,
    db: &Mutex<Connection>,
    result_expires: chrono::Duration,
) {
    let Job { id, name, args } = job;

    if let Err(e) = with_db(db, |conn| queries::mark_started(conn, &id)) {
        tracing::error!(task_id = %id, error = %e, "failed to mark task started");
    }

    let outcome = match registry.get(&name) {
        Some(handler) => {
            // Run detached so a panicking handler fails the task, not the worker.
            match tokio::spawn(async move { handler.run(args).await }).await {
                Ok(Ok(value)) => Ok(value),
                Ok(Err(e)) => Err(e.to_string()),
                Err(e) => Err(format!("task panicked: {e}")),
            }
        }
        None => Err(AppError::UnknownTask(name.clone()).to_string()),
    };

    match &outcome {
        Ok(_) => tracing::info!(worker, task_id = %id, task = %name, "task succeeded"),
        Err(e) => tracing::error!(worker, task_id = %id, task = %name, error = %e, "task failed"),
    }

    let expires_at = Utc::now().naive_utc() + result_expires;
    if let Err(e) = with_db(db, |conn| queries::finish_task(conn, &id, &outcome, &expires_at)) {
        tracing::error!(task_id = %id, error = %e, "failed to store task result");
    }
}
