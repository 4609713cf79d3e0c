//! Workers: stateless loops that pull binary jobs from the coordinator.

mod client;
#[cfg(test)]
mod mock;
mod worker_loop;

pub use client::{ClientError, CoordinatorClient, HttpCoordinatorClient};
pub use worker_loop::{WorkerLoop, WorkerState};

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Handle to `n` worker loops sharing one client.
/// - `request_shutdown` stops new polls; a job being computed is still reported
/// - `shutdown_and_join` waits for every loop to exit
pub struct WorkerGroup {
    shutdown_tx: watch::Sender<bool>,
    joins: Vec<JoinHandle<()>>,
}

impl WorkerGroup {
    pub fn spawn(n: usize, client: Arc<dyn CoordinatorClient>, poll_interval: Duration) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let joins = (0..n)
            .map(|worker_id| {
                let worker = WorkerLoop::new(worker_id, Arc::clone(&client), poll_interval);
                tokio::spawn(worker.run(shutdown_rx.clone()))
            })
            .collect();

        info!(workers = n, ?poll_interval, "worker group started");
        Self { shutdown_tx, joins }
    }

    pub fn len(&self) -> usize {
        self.joins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.joins.is_empty()
    }

    pub fn request_shutdown(&self) {
        // Receivers may already be gone.
        let _ = self.shutdown_tx.send(true);
    }

    pub async fn shutdown_and_join(self) {
        self.request_shutdown();
        for join in self.joins {
            if let Err(err) = join.await {
                warn!(error = %err, "worker task ended abnormally");
            }
        }
        info!("worker group stopped");
    }
}
