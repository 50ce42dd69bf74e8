//! Stale tile cleanup.
//!
//! After compositing, tiles persisted by earlier cycles whose coordinates no
//! longer appear in the live node set are deleted. Each deletion is an
//! independent work item with no shared mutable state, so the fan-out runs as
//! a parallel-for under a configurable worker cap with no ordering guarantee.

use crate::coord::TileCoord;
use crate::store::TileStore;
use rayon::prelude::*;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{debug, warn};

/// Counters for one cleanup pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanupStats {
    /// Stale finished tiles deleted
    pub finished_removed: usize,
    /// Stale raw snapshots deleted
    pub raw_removed: usize,
    /// Deletions skipped after an error; retried next cycle
    pub failures: usize,
}

/// Delete persisted tiles not referenced by the live node set.
///
/// `live_finished` covers all zoom levels; `live_raw` is the super-tile set
/// that server mode keeps snapshots for (empty when server mode is off, which
/// retires the whole snapshot cache). `workers` caps the fan-out: values
/// above 1 build a dedicated pool, 1 runs serially, anything else uses full
/// parallelism.
pub fn remove_stale_tiles(
    store: &dyn TileStore,
    live_finished: &HashSet<TileCoord>,
    live_raw: &HashSet<TileCoord>,
    workers: i32,
    finished_listing: Vec<TileCoord>,
    raw_listing: Vec<TileCoord>,
) -> CleanupStats {
    let stale_finished: Vec<TileCoord> = finished_listing
        .into_iter()
        .filter(|coord| !live_finished.contains(coord))
        .collect();
    let stale_raw: Vec<TileCoord> = raw_listing
        .into_iter()
        .filter(|coord| !live_raw.contains(coord))
        .collect();

    let failures = AtomicUsize::new(0);
    let finished_removed = AtomicUsize::new(0);
    let raw_removed = AtomicUsize::new(0);

    run_parallel(&stale_finished, workers, |coord| {
        match store.remove_finished_tile(*coord) {
            Ok(()) => {
                finished_removed.fetch_add(1, Ordering::Relaxed);
            }
            Err(err) => {
                warn!(tile = %coord, error = %err,
                      "Failed to delete stale tile; will retry next cycle");
                failures.fetch_add(1, Ordering::Relaxed);
            }
        }
    });
    run_parallel(&stale_raw, workers, |coord| {
        match store.remove_raw_snapshot(*coord) {
            Ok(()) => {
                raw_removed.fetch_add(1, Ordering::Relaxed);
            }
            Err(err) => {
                warn!(tile = %coord, error = %err,
                      "Failed to delete stale raw snapshot; will retry next cycle");
                failures.fetch_add(1, Ordering::Relaxed);
            }
        }
    });

    let stats = CleanupStats {
        finished_removed: finished_removed.into_inner(),
        raw_removed: raw_removed.into_inner(),
        failures: failures.into_inner(),
    };
    debug!(?stats, "Stale tile cleanup complete");
    stats
}

/// Run a closure over independent items under the configured worker cap.
fn run_parallel<F>(items: &[TileCoord], workers: i32, f: F)
where
    F: Fn(&TileCoord) + Send + Sync,
{
    if items.is_empty() {
        return;
    }
    match workers {
        1 => items.iter().for_each(f),
        n if n > 1 => match rayon::ThreadPoolBuilder::new().num_threads(n as usize).build() {
            Ok(pool) => pool.install(|| items.par_iter().for_each(|item| f(item))),
            Err(err) => {
                warn!(error = %err, "Failed to build worker pool; running serially");
                items.iter().for_each(f);
            }
        },
        // -1 (or any other value): fully parallel on the global pool
        _ => items.par_iter().for_each(|item| f(item)),
    }
}
