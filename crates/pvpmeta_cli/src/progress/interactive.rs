use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use pvpmeta::sync::SyncProgress;

const TICK: Duration = Duration::from_millis(100);

/// Consolidated progress state to avoid multiple mutex locks.
#[derive(Default)]
struct ProgressState {
    /// Cycle-level spinner (leaderboards, item icons, aggregation).
    phase: Option<ProgressBar>,
    /// One bar per region lane, keyed by region.
    regions: HashMap<String, ProgressBar>,
}

/// Interactive progress reporter using indicatif.
pub struct InteractiveReporter {
    multi: MultiProgress,
    state: Mutex<ProgressState>,
}

impl InteractiveReporter {
    pub fn new() -> Self {
        Self {
            multi: MultiProgress::new(),
            state: Mutex::new(ProgressState::default()),
        }
    }

    fn phase_bar(&self, state: &mut ProgressState) -> ProgressBar {
        state
            .phase
            .get_or_insert_with(|| {
                let pb = self.multi.add(ProgressBar::new_spinner());
                pb.set_style(Self::spinner_style());
                pb.set_prefix("cycle");
                pb.enable_steady_tick(TICK);
                pb
            })
            .clone()
    }

    fn region_bar(&self, state: &mut ProgressState, region: &str) -> ProgressBar {
        state
            .regions
            .entry(region.to_string())
            .or_insert_with(|| {
                let pb = self.multi.add(ProgressBar::new_spinner());
                pb.set_style(Self::spinner_style());
                pb.set_prefix(region.to_uppercase());
                pb.enable_steady_tick(TICK);
                pb
            })
            .clone()
    }

    pub fn handle(&self, event: SyncProgress) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());

        match event {
            SyncProgress::CycleStarted {
                cycle_id, season, ..
            } => {
                self.phase_bar(&mut state)
                    .set_message(format!("#{} {} - syncing leaderboards", cycle_id, season));
            }

            SyncProgress::BracketsDiscovered { region, count } => {
                self.region_bar(&mut state, &region)
                    .set_message(format!("{} brackets", count));
            }

            SyncProgress::LeaderboardSynced {
                region,
                bracket,
                entries,
            } => {
                self.region_bar(&mut state, &region)
                    .set_message(format!("{} ({} entries)", bracket, entries));
            }

            SyncProgress::LeaderboardFailed {
                region,
                bracket,
                error,
            } => {
                let _ = self.multi.println(format!(
                    "\x1b[33m⚠ {} {}: {}\x1b[0m",
                    region.to_uppercase(),
                    bracket,
                    error
                ));
            }

            SyncProgress::CharactersSelected {
                region,
                total,
                to_sync,
                recently_synced,
            } => {
                self.region_bar(&mut state, &region).set_message(format!(
                    "{} characters, {} to sync ({} recent)",
                    total, to_sync, recently_synced
                ));
            }

            SyncProgress::SyncingCharacterMeta { region, count } => {
                self.region_bar(&mut state, &region)
                    .set_message(format!("refreshing {} profiles", count));
            }

            SyncProgress::BatchStarted {
                region,
                batch,
                batches,
                ..
            } => {
                let pb = self.region_bar(&mut state, &region);
                if pb.length() != Some(batches as u64) {
                    pb.set_length(batches as u64);
                    pb.set_style(Self::bar_style());
                }
                pb.set_position(batch.saturating_sub(1) as u64);
            }

            SyncProgress::BatchComplete {
                region,
                batch,
                succeeded,
                failed,
                ..
            } => {
                let pb = self.region_bar(&mut state, &region);
                pb.set_position(batch as u64);
                pb.set_message(format!("{} ok, {} failed", succeeded, failed));
            }

            SyncProgress::ItemMetaSynced { synced, missing } => {
                self.phase_bar(&mut state)
                    .set_message(format!("{} item icons ({} missing)", synced, missing));
            }

            SyncProgress::Aggregating { .. } => {
                for pb in state.regions.values() {
                    if !pb.is_finished() {
                        pb.finish();
                    }
                }
                self.phase_bar(&mut state)
                    .set_message("aggregating popularity");
            }

            SyncProgress::AggregationComplete {
                items,
                enchants,
                gems,
            } => {
                self.phase_bar(&mut state).set_message(format!(
                    "aggregated {} items, {} enchants, {} gems",
                    items, enchants, gems
                ));
            }

            SyncProgress::CycleComplete { cycle_id, elapsed } => {
                self.phase_bar(&mut state).finish_with_message(format!(
                    "#{} complete in {}s",
                    cycle_id,
                    elapsed.as_secs()
                ));
            }

            SyncProgress::CycleFailed { cycle_id, error } => {
                self.phase_bar(&mut state)
                    .abandon_with_message(format!("#{} failed: {}", cycle_id, error));
            }

            SyncProgress::ShutdownRequested => {
                let _ = self
                    .multi
                    .println("Shutdown requested, stopping at the next batch boundary");
            }

            SyncProgress::Warning { message } => {
                let _ = self.multi.println(format!("\x1b[33m⚠ {}\x1b[0m", message));
            }

            _ => {}
        }
    }

    pub fn finish(&self) {
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        for pb in state.regions.values().chain(state.phase.iter()) {
            if !pb.is_finished() {
                pb.finish();
            }
        }
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::default_spinner()
            .template("{prefix:>5.bold.cyan} {spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ ")
    }

    fn bar_style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{prefix:>5.bold.cyan} [{bar:40.cyan/blue}] {pos:>3}/{len:3} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓░")
    }
}

impl Default for InteractiveReporter {
    fn default() -> Self {
        Self::new()
    }
}
