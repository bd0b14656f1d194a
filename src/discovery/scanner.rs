//! Scan engine: probes a platform's catalog with a bounded worker pool.
//!
//! Pipeline: one producer feeds a bounded job queue, N workers pull
//! models off it and call `PlatformAdapter::probe`, and the calling task
//! collects results until every worker has finished. Every suspension
//! point races against the cancellation token.
//!
//! On cancellation the scan returns `ScanError::Cancelled` carrying the
//! results that workers had already published (including any still
//! buffered in the result channel) when the collector noticed. Probes in
//! flight at that moment are abandoned.

use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::exclude;
use crate::adapters::{Model, PlatformAdapter, ProbeResult};

#[derive(Debug, Error)]
pub enum ScanError {
    /// The catalog query failed; nothing was probed.
    #[error("list models failed: {0:#}")]
    Listing(anyhow::Error),
    /// The scan was cancelled before every probe completed.
    #[error("scan cancelled ({} result(s) completed)", partial.len())]
    Cancelled { partial: Vec<ProbeResult> },
}

/// Drives one adapter through list → exclude → probe.
pub struct Scanner {
    adapter: Arc<dyn PlatformAdapter>,
    workers: usize,
}

impl Scanner {
    /// A width of 0 is treated as 1.
    pub fn new(adapter: Arc<dyn PlatformAdapter>, workers: usize) -> Self {
        Self { adapter, workers: workers.max(1) }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// List the catalog once, drop excluded models, and probe the rest.
    ///
    /// Returns exactly one result per probed model, in no particular
    /// order. Only a listing failure or cancellation is an error.
    pub async fn scan(
        &self,
        cancel: &CancellationToken,
        extra_excludes: &[String],
    ) -> Result<Vec<ProbeResult>, ScanError> {
        // Dropping the scan future also stops its workers.
        let scope = cancel.child_token();
        let _guard = scope.clone().drop_guard();

        let platform = self.adapter.name().to_string();
        let scan_start = Utc::now();

        let listed = tokio::select! {
            biased;
            _ = scope.cancelled() => return Err(ScanError::Cancelled { partial: Vec::new() }),
            listed = self.adapter.list_models() => listed.map_err(ScanError::Listing)?,
        };

        let listed_count = listed.len();
        let probe_set = exclude::filter_models(listed, extra_excludes);
        let total = probe_set.len();

        info!(
            platform = %platform,
            listed = listed_count,
            skipped = listed_count - total,
            probing = total,
            workers = self.workers,
            "Scanning models"
        );

        let (job_tx, job_rx) = mpsc::channel::<Model>(self.workers);
        let (result_tx, mut result_rx) = mpsc::channel::<ProbeResult>(self.workers);
        let job_rx = Arc::new(Mutex::new(job_rx));

        let mut pool = JoinSet::new();
        for worker_id in 0..self.workers {
            pool.spawn(run_worker(
                worker_id,
                Arc::clone(&self.adapter),
                Arc::clone(&job_rx),
                result_tx.clone(),
                scope.clone(),
            ));
        }
        // Only workers hold senders; the channel closes when the last exits.
        drop(result_tx);
        drop(job_rx);

        pool.spawn(produce(probe_set, job_tx, scope.clone()));

        let mut collected: Vec<ProbeResult> = Vec::with_capacity(total);
        loop {
            tokio::select! {
                biased;
                _ = scope.cancelled() => {
                    while let Ok(result) = result_rx.try_recv() {
                        collected.push(result);
                    }
                    warn!(
                        platform = %platform,
                        completed = collected.len(),
                        total,
                        "Scan cancelled; abandoning in-flight probes"
                    );
                    return Err(ScanError::Cancelled { partial: collected });
                }
                next = result_rx.recv() => match next {
                    Some(result) => collected.push(result),
                    None => break,
                },
            }
        }

        while let Some(joined) = pool.join_next().await {
            if let Err(e) = joined {
                error!(platform = %platform, "Scan task failed: {}", e);
            }
        }
        if collected.len() != total {
            warn!(
                platform = %platform,
                expected = total,
                received = collected.len(),
                "Scan finished with missing results"
            );
        }

        log_summary(&platform, &collected, scan_start);
        Ok(collected)
    }
}

/// Pull jobs until the queue closes, publishing one result per model.
async fn run_worker(
    worker_id: usize,
    adapter: Arc<dyn PlatformAdapter>,
    jobs: Arc<Mutex<mpsc::Receiver<Model>>>,
    results: mpsc::Sender<ProbeResult>,
    cancel: CancellationToken,
) {
    loop {
        let model = tokio::select! {
            biased;
            _ = cancel.cancelled() => return,
            next = next_job(&jobs) => match next {
                Some(model) => model,
                None => return,
            },
        };

        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => return,
            result = adapter.probe(&model) => result,
        };

        debug!(
            worker = worker_id,
            model = %result.model,
            status = %result.status,
            "Probed model"
        );

        tokio::select! {
            biased;
            _ = cancel.cancelled() => return,
            sent = results.send(result) => {
                if sent.is_err() {
                    return;
                }
            }
        }
    }
}

async fn next_job(jobs: &Mutex<mpsc::Receiver<Model>>) -> Option<Model> {
    jobs.lock().await.recv().await
}

/// Enqueue the probe set, then close the queue by dropping the sender.
async fn produce(models: Vec<Model>, jobs: mpsc::Sender<Model>, cancel: CancellationToken) {
    for model in models {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => return,
            sent = jobs.send(model) => {
                if sent.is_err() {
                    return;
                }
            }
        }
    }
}

fn log_summary(platform: &str, results: &[ProbeResult], started: chrono::DateTime<Utc>) {
    let mut by_status: BTreeMap<&str, usize> = BTreeMap::new();
    for r in results {
        *by_status.entry(r.status.as_str()).or_insert(0) += 1;
    }
    let available = results.iter().filter(|r| r.available).count();

    info!(
        platform = %platform,
        total = results.len(),
        available,
        by_status = ?by_status,
        duration_ms = (Utc::now() - started).num_milliseconds(),
        "Scan complete"
    );
}
