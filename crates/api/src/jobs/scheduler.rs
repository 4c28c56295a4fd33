//! Periodic background job runner.

use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{error, info, warn};

/// Failure of one job run. The job is retried on its next tick.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct JobError(pub String);

impl From<sqlx::Error> for JobError {
    fn from(err: sqlx::Error) -> Self {
        JobError(format!("Database error: {}", err))
    }
}

/// A unit of periodic background work.
#[async_trait::async_trait]
pub trait Job: Send + Sync {
    fn name(&self) -> &'static str;

    /// Time between runs.
    fn interval(&self) -> Duration;

    /// Run once. Returns the number of items processed.
    async fn execute(&self) -> Result<usize, JobError>;
}

/// Runs registered jobs on their intervals until shut down.
pub struct JobScheduler {
    jobs: Vec<Arc<dyn Job>>,
    shutdown_tx: watch::Sender<bool>,
    handles: Vec<JoinHandle<()>>,
}

impl JobScheduler {
    pub fn new() -> Self {
        let (shutdown_tx, _) = watch::channel(false);
        Self {
            jobs: Vec::new(),
            shutdown_tx,
            handles: Vec::new(),
        }
    }

    pub fn register<J: Job + 'static>(&mut self, job: J) {
        self.jobs.push(Arc::new(job));
    }

    pub fn job_count(&self) -> usize {
        self.jobs.len()
    }

    /// Spawns one task per job. The first run happens one interval after start.
    pub fn start(&mut self) {
        info!(jobs = self.jobs.len(), "Starting job scheduler");

        for job in &self.jobs {
            let job = Arc::clone(job);
            let shutdown_rx = self.shutdown_tx.subscribe();
            self.handles.push(tokio::spawn(run_job(job, shutdown_rx)));
        }
    }

    /// Signals every job to stop after its current run.
    pub fn shutdown(&self) {
        info!("Stopping job scheduler");
        let _ = self.shutdown_tx.send(true);
    }

    /// Waits for job tasks to finish, giving up after `timeout`.
    pub async fn wait_for_shutdown(self, timeout: Duration) {
        let handles = self.handles;
        let all_done = async {
            for handle in handles {
                if let Err(e) = handle.await {
                    warn!(error = %e, "Job task panicked");
                }
            }
        };

        if tokio::time::timeout(timeout, all_done).await.is_err() {
            warn!(timeout_secs = timeout.as_secs(), "Job shutdown timed out");
        } else {
            info!("All jobs stopped");
        }
    }
}

impl Default for JobScheduler {
    fn default() -> Self {
        Self::new()
    }
}

async fn run_job(job: Arc<dyn Job>, mut shutdown_rx: watch::Receiver<bool>) {
    let name = job.name();
    let mut ticker = tokio::time::interval(job.interval());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    ticker.tick().await;

    info!(job = name, interval_secs = job.interval().as_secs(), "Job scheduled");

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let start = Instant::now();
                match job.execute().await {
                    Ok(processed) => info!(
                        job = name,
                        processed,
                        elapsed_ms = start.elapsed().as_millis() as u64,
                        "Job run finished"
                    ),
                    Err(e) => error!(
                        job = name,
                        elapsed_ms = start.elapsed().as_millis() as u64,
                        error = %e,
                        "Job run failed"
                    ),
                }
            }
            changed = shutdown_rx.changed() => {
                if changed.is_err() || *shutdown_rx.borrow() {
                    info!(job = name, "Job stopped");
                    break;
                }
            }
        }
    }
}
