use tracing::{debug, trace};

use crate::{
    raptor::{
        self, Allocator, Path, StopReason, discovery, explorer,
        frontier::Criteria,
        path::backtrack,
        request::SearchContext,
    },
    shared::Time,
};

/// Where a departure run is in its round loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Phase {
    /// Access legs seed round 0.
    Init,
    /// Routes touched by the last round are scanned.
    TransitScan,
    /// Transfers from this round's transit arrivals are relaxed.
    TransferRelax,
    Converged(Convergence),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Convergence {
    /// A round ended without any new arrival.
    Exhausted,
    RoundLimit,
    Interrupted(StopReason),
}

/// What one departure run produced.
#[derive(Debug, Clone)]
pub(crate) struct RunOutcome {
    pub departure: Time,
    pub paths: Vec<Path>,
    pub rounds: usize,
    pub arrivals: usize,
    pub round_limit_reached: bool,
    /// Some when the run was stopped or never started.
    pub interrupted: Option<StopReason>,
    pub completed: bool,
}

impl RunOutcome {
    fn skipped(departure: Time, reason: StopReason) -> Self {
        Self {
            departure,
            paths: Vec::new(),
            rounds: 0,
            arrivals: 0,
            round_limit_reached: false,
            interrupted: Some(reason),
            completed: false,
        }
    }
}

/// Runs multi-criteria RAPTOR for a single departure time.
pub(crate) fn run_departure(
    ctx: &SearchContext,
    departure: Time,
    allocator: &mut Allocator,
) -> Result<RunOutcome, raptor::Error> {
    if let Some(reason) = ctx.interruption() {
        return Ok(RunOutcome::skipped(departure, reason));
    }
    allocator.prepare(ctx);

    let mut round = 0;
    let mut phase = Phase::Init;
    let convergence = loop {
        trace!("Departure {departure} round {round} {phase:?}");
        phase = match phase {
            Phase::Init => {
                let mut seeded = 0;
                for (leg_idx, access) in ctx.access.iter().enumerate() {
                    let criteria = Criteria::new(departure + access.duration, access.cost, 0);
                    if allocator.insert_access(access.stop, criteria, leg_idx as u32) {
                        seeded += 1;
                    }
                }
                debug!("Departure {departure} seeded {seeded} access arrivals");
                Phase::TransitScan
            }
            Phase::TransitScan => {
                if let Some(reason) = ctx.interruption() {
                    Phase::Converged(Convergence::Interrupted(reason))
                } else if round == ctx.max_rounds {
                    Phase::Converged(Convergence::RoundLimit)
                } else {
                    round += 1;
                    let active = discovery::mark_routes(ctx.timetable, allocator);
                    allocator.round_arrivals.clear();
                    explorer::explore_routes(ctx, round, allocator);
                    let accepted = allocator.run_updates(round);
                    trace!("Round {round} scanned {active} routes, {accepted} transit arrivals");
                    Phase::TransferRelax
                }
            }
            Phase::TransferRelax => {
                explorer::explore_transfers(ctx, round, allocator);
                let accepted = allocator.run_updates(round);
                trace!("Round {round} relaxed {accepted} transfer arrivals");
                discovery::collect_destination_arrivals(ctx, round, allocator);
                if allocator.marked_stops.not_any() {
                    Phase::Converged(Convergence::Exhausted)
                } else {
                    Phase::TransitScan
                }
            }
            Phase::Converged(convergence) => break convergence,
        };
    };

    let labels = &allocator.labels;
    let paths = labels
        .destination
        .iter()
        .map(|destination| backtrack(ctx, &labels.arena, destination))
        .collect::<Result<Vec<_>, raptor::Error>>()?;
    debug!(
        "Departure {departure} finished after {round} rounds ({convergence:?}), {} paths",
        paths.len()
    );

    let interrupted = match convergence {
        Convergence::Interrupted(reason) => Some(reason),
        _ => None,
    };
    Ok(RunOutcome {
        departure,
        paths,
        rounds: round,
        arrivals: labels.arena.len(),
        round_limit_reached: convergence == Convergence::RoundLimit,
        interrupted,
        completed: interrupted.is_none(),
    })
}
