//! Human-readable sync log lines.
//!
//! Every line is emitted on the `pvp_sync` tracing target so the CLI can route
//! it to a dedicated file with a `[%Y-%m-%d %H:%M:%S]` timestamp. The
//! `format_*` functions are pure and return the message text.

use std::time::Duration;

use super::outcome::{BatchOutcome, format_counts};

/// Tracing target for sync log lines.
pub const TARGET: &str = "pvp_sync";

const BATCH_SAMPLES: usize = 3;

pub fn separator() -> String {
    "═".repeat(80)
}

pub fn format_cycle_start(cycle_id: i64, season_name: &str, regions: &[String]) -> String {
    format!(
        "SYNC CYCLE #{} STARTED  |  Season: {}  |  Regions: {}",
        cycle_id,
        season_name,
        regions.join(", ")
    )
}

pub fn format_leaderboards(region: &str, total: usize, to_sync: usize, skipped: usize) -> String {
    format!(
        "  [leaderboards] {:<3}  {} chars → {} to sync  ({} recently synced)",
        region.to_uppercase(),
        total,
        to_sync,
        skipped
    )
}

pub fn format_batch(outcome: &BatchOutcome) -> String {
    let succeeded = outcome.success_count();
    let failures = outcome.failures();
    let failed = failures.len();

    let mut line = format!("  [batch]  {}/{} ok", succeeded, succeeded + failed);
    if failed > 0 {
        line.push_str(&format!(", {} failed", failed));
    }
    line.push_str(&format!("  {{ {} }}", format_counts(&outcome.counts_by_status())));

    if !failures.is_empty() {
        let samples = failures
            .iter()
            .take(BATCH_SAMPLES)
            .map(|f| format!("char {}: {}", f.id, f.error))
            .collect::<Vec<_>>()
            .join(" | ");
        line.push_str(&format!("  ⚠ {}", samples));
        if failed > BATCH_SAMPLES {
            line.push_str(&format!(" (+{} more)", failed - BATCH_SAMPLES));
        }
    }

    line
}

pub fn format_aggregations(items: u64, enchants: u64, gems: u64) -> String {
    format!(
        "  [aggregations]  items={}  enchants={}  gems={}",
        items, enchants, gems
    )
}

pub fn format_cycle_end(cycle_id: i64, elapsed: Option<Duration>) -> String {
    match elapsed {
        Some(elapsed) => format!(
            "SYNC CYCLE #{} COMPLETE  ({})",
            cycle_id,
            format_elapsed(elapsed)
        ),
        None => format!("SYNC CYCLE #{} COMPLETE", cycle_id),
    }
}

pub fn format_error(message: &str) -> String {
    format!("  [error]  {}", message)
}

/// `12.3s` under a minute, `Mm Ss` above.
pub fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs_f64();
    if secs < 60.0 {
        return format!("{:.1}s", secs);
    }
    let minutes = (secs / 60.0).floor() as u64;
    let seconds = (secs % 60.0).round() as u64;
    format!("{}m {}s", minutes, seconds)
}

// ─── Emitters ────────────────────────────────────────────────────────────────

pub fn cycle_started(cycle_id: i64, season_name: &str, regions: &[String]) {
    tracing::info!(target: TARGET, "{}", separator());
    tracing::info!(target: TARGET, "{}", format_cycle_start(cycle_id, season_name, regions));
    tracing::info!(target: TARGET, "{}", separator());
}

pub fn leaderboards_synced(region: &str, total: usize, to_sync: usize, skipped: usize) {
    tracing::info!(target: TARGET, "{}", format_leaderboards(region, total, to_sync, skipped));
}

pub fn batch_complete(outcome: &BatchOutcome) {
    tracing::info!(target: TARGET, "{}", format_batch(outcome));
}

pub fn aggregations_complete(items: u64, enchants: u64, gems: u64) {
    tracing::info!(target: TARGET, "{}", format_aggregations(items, enchants, gems));
}

pub fn cycle_complete(cycle_id: i64, elapsed: Option<Duration>) {
    tracing::info!(target: TARGET, "{}", format_cycle_end(cycle_id, elapsed));
    tracing::info!(target: TARGET, "{}", separator());
    tracing::info!(target: TARGET, "");
}

pub fn error(message: &str) {
    tracing::error!(target: TARGET, "{}", format_error(message));
}
