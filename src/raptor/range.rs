use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::raptor::{
    self, Allocator, ParetoFront, Path,
    path::sort_paths,
    request::SearchContext,
    worker::{RunOutcome, run_departure},
};

/// Why a search stopped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum StopReason {
    /// Every departure offset ran to convergence or its round limit.
    #[default]
    Completed,
    Cancelled,
    DeadlineExceeded,
}

/// Counters describing how a search went.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SearchStats {
    /// Departure offsets in the window.
    pub offsets: usize,
    /// Offsets that ran without being interrupted.
    pub offsets_completed: usize,
    /// Most rounds any offset needed.
    pub rounds: usize,
    /// Stop arrivals created across all offsets.
    pub arrivals: usize,
    /// Some offset still had improvements when it hit the round limit.
    pub round_limit_reached: bool,
    pub stop_reason: StopReason,
}

/// Non-dominated journeys ordered by arrival time, then cost.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RaptorResponse {
    pub paths: Vec<Path>,
    pub stats: SearchStats,
}

impl RaptorResponse {
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

/// Runs every departure offset of the window and merges the results.
pub(crate) fn search(ctx: &SearchContext) -> Result<RaptorResponse, raptor::Error> {
    debug!(
        "Searching {} departure offsets from {}",
        ctx.offsets.len(),
        ctx.offsets.first().copied().unwrap_or_default()
    );
    let runs: Vec<RunOutcome> = if ctx.parallel {
        ctx.offsets
            .par_iter()
            .map_init(
                || Allocator::new(ctx.timetable),
                |allocator, &departure| run_departure(ctx, departure, allocator),
            )
            .collect::<Result<Vec<_>, raptor::Error>>()?
    } else {
        let mut allocator = Allocator::new(ctx.timetable);
        ctx.offsets
            .iter()
            .map(|&departure| run_departure(ctx, departure, &mut allocator))
            .collect::<Result<Vec<_>, raptor::Error>>()?
    };
    Ok(merge(ctx, runs))
}

/// Merges the runs in ascending departure order so that ties resolve the
/// same way however the offsets were scheduled.
fn merge(ctx: &SearchContext, runs: Vec<RunOutcome>) -> RaptorResponse {
    let set = ctx.merge.departure.apply(ctx.criteria);
    let mut front = ParetoFront::new(set, ctx.merge.tie_break);
    let mut stats = SearchStats {
        offsets: runs.len(),
        ..Default::default()
    };
    for run in runs {
        stats.rounds = stats.rounds.max(run.rounds);
        stats.arrivals += run.arrivals;
        stats.round_limit_reached |= run.round_limit_reached;
        if run.completed {
            stats.offsets_completed += 1;
        }
        if let Some(reason) = run.interrupted
            && stats.stop_reason == StopReason::Completed
        {
            warn!("Search stopped at departure {}: {reason:?}", run.departure);
            stats.stop_reason = reason;
        }
        front.merge_with(run.paths);
    }

    let mut paths = front.into_vec();
    sort_paths(&mut paths);
    info!(
        "Found {} paths over {}/{} offsets",
        paths.len(),
        stats.offsets_completed,
        stats.offsets
    );
    RaptorResponse { paths, stats }
}
