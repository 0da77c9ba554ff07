use crate::infrastructure::storage::local::METADATA_FILE;
use crate::modules::jobs::JobRecord;
use crate::state::AppState;
use chrono::Utc;
use std::path::Path;
use time::OffsetDateTime;
use tracing::{debug, info, warn};
use uuid::Uuid;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SweepReport {
    /// Registry entries past their TTL.
    pub expired: usize,
    /// Identity directories on disk with no live entry.
    pub orphaned: usize,
}

pub async fn start_reaper(state: AppState) {
    info!("🧹 Starting reaper (ttl {}s)...", state.config.job_ttl_secs);

    // Leftovers from a previous run are collected right away.
    log_report(run_sweep(&state, OffsetDateTime::now_utc()).await);

    let schedule = state.config.reaper_schedule.clone();
    loop {
        let Some(next) = schedule.upcoming(Utc).next() else {
            warn!("Reaper schedule has no upcoming runs, stopping");
            return;
        };

        let wait = (next - Utc::now()).to_std().unwrap_or_default();
        tokio::time::sleep(wait).await;

        log_report(run_sweep(&state, OffsetDateTime::now_utc()).await);
    }
}

fn log_report(report: SweepReport) {
    if report.expired > 0 || report.orphaned > 0 {
        info!(
            expired = report.expired,
            orphaned = report.orphaned,
            "🧹 Reaper removed stale jobs"
        );
    } else {
        debug!("Reaper found nothing to remove");
    }
}

/// One pass: expire registry entries, then delete identity directories that
/// no live job owns and that are older than the TTL.
pub async fn run_sweep(state: &AppState, now: OffsetDateTime) -> SweepReport {
    let ttl = state.config.job_ttl();

    let expired = state.jobs.sweep(ttl, now);
    for record in &expired {
        // A concurrent download may already have removed these.
        state.storage.purge(&record.id).await;
    }

    let orphaned = sweep_orphans(state, ttl, now).await;

    SweepReport {
        expired: expired.len(),
        orphaned,
    }
}

async fn sweep_orphans(state: &AppState, ttl: time::Duration, now: OffsetDateTime) -> usize {
    let mut entries = match tokio::fs::read_dir(state.storage.root()).await {
        Ok(entries) => entries,
        Err(e) => {
            warn!("Reaper could not list {}: {}", state.storage.root().display(), e);
            return 0;
        }
    };

    let mut removed = 0;
    loop {
        let entry = match entries.next_entry().await {
            Ok(Some(entry)) => entry,
            Ok(None) => break,
            Err(e) => {
                warn!("Reaper stopped listing uploads: {}", e);
                break;
            }
        };

        let Some(id) = entry
            .file_name()
            .to_str()
            .and_then(|name| Uuid::parse_str(name).ok())
        else {
            continue;
        };

        if state.jobs.contains(&id) {
            continue;
        }

        let Ok(meta) = entry.metadata().await else {
            continue;
        };
        if !meta.is_dir() {
            continue;
        }

        let created_at = match recorded_creation(&entry.path()).await {
            Some(created_at) => created_at,
            None => match meta.modified() {
                Ok(modified) => OffsetDateTime::from(modified),
                Err(_) => continue,
            },
        };

        if now - created_at > ttl {
            state.storage.purge(&id).await;
            removed += 1;
        }
    }

    removed
}

async fn recorded_creation(dir: &Path) -> Option<OffsetDateTime> {
    let bytes = tokio::fs::read(dir.join(METADATA_FILE)).await.ok()?;
    serde_json::from_slice::<JobRecord>(&bytes)
        .ok()
        .map(|record| record.created_at)
}
