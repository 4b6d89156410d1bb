//! Background worker spawn helpers, kept out of `main.rs`.

use std::sync::Arc;

use chrono::Utc;

use crate::services::sync::{ShowSyncManager, SyncStatus};

/// Spawn the periodic show sync worker.
///
/// Returns the `JoinHandle`s so the caller can await shutdown. The worker
/// listens for a shutdown notification via a `tokio::sync::broadcast`
/// channel and exits between passes.
pub fn spawn_background_workers(
    state: Arc<crate::AppState>,
    shutdown: tokio::sync::broadcast::Sender<()>,
) -> Vec<tokio::task::JoinHandle<()>> {
    let mut handles = Vec::new();

    {
        let mut shutdown_rx = shutdown.subscribe();
        let state = state.clone();
        handles.push(tokio::spawn(async move {
            if !state.config.sync.enabled {
                tracing::info!("Background show sync disabled by configuration");
                return;
            }

            loop {
                tracing::info!("Starting periodic show synchronization");

                let report = ShowSyncManager::sync_approved_shows(
                    state.cms.as_ref(),
                    state.radio.as_ref(),
                )
                .await;

                if report.success {
                    tracing::info!(
                        "Periodic sync finished: {} show(s) synced",
                        report.synced_count.unwrap_or(0)
                    );
                } else {
                    tracing::warn!(
                        "Periodic sync failed: {}",
                        report.error.as_deref().unwrap_or("unknown error")
                    );
                }

                *state.last_sync.write().await = Some(SyncStatus {
                    finished_at: Utc::now(),
                    report,
                });

                // Sleep until the next pass or exit early on shutdown.
                tokio::select! {
                    _ = shutdown_rx.recv() => {
                        tracing::info!("Show sync worker shutting down");
                        break;
                    }
                    _ = tokio::time::sleep(std::time::Duration::from_secs(
                        state.config.sync.interval_seconds,
                    )) => {}
                }
            }
        }));
    }

    handles
}
