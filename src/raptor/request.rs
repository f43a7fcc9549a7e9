use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Instant,
};

use bitvec::prelude::*;

use crate::{
    config::{CostModel, MergePolicy, RaptorConfig},
    raptor::{self, AccessEgress, CriteriaSet, StopReason},
    shared::{Duration, Time},
    timetable::{Timetable, Trip},
};

/// Highest round limit a request may ask for. Frontiers are allocated per
/// round and stop up front.
pub const MAX_ROUNDS: usize = 32;

/// A flag shared between the caller and a running search.
///
/// Cancelling stops the search at the next round or departure offset, the
/// journeys found so far are still returned.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Everything one routing request asks for.
///
/// Unset parameters fall back to the engine's [`RaptorConfig`].
#[derive(Debug, Clone)]
pub struct SearchRequest {
    pub access: Vec<AccessEgress>,
    pub egress: Vec<AccessEgress>,
    pub earliest_departure: Time,
    pub latest_departure: Option<Time>,
    pub departure_step: Option<Duration>,
    pub criteria: Option<CriteriaSet>,
    pub max_rounds: Option<usize>,
    pub services: Option<Vec<u32>>,
    pub deadline: Option<Instant>,
    pub cancellation: Option<CancellationToken>,
}

impl SearchRequest {
    pub fn new(access: Vec<AccessEgress>, egress: Vec<AccessEgress>) -> Self {
        Self {
            access,
            egress,
            earliest_departure: Time::now(),
            latest_departure: None,
            departure_step: None,
            criteria: None,
            max_rounds: None,
            services: None,
            deadline: None,
            cancellation: None,
        }
    }

    /// Searches a single departure time.
    pub fn departure_at(mut self, departure: Time) -> Self {
        self.earliest_departure = departure;
        self.latest_departure = Some(departure);
        self
    }

    pub fn departure_window(mut self, earliest: Time, latest: Time) -> Self {
        self.earliest_departure = earliest;
        self.latest_departure = Some(latest);
        self
    }

    pub fn departure_step(mut self, step: Duration) -> Self {
        self.departure_step = Some(step);
        self
    }

    pub fn criteria(mut self, criteria: CriteriaSet) -> Self {
        self.criteria = Some(criteria);
        self
    }

    /// Limits the number of transit legs in a journey.
    pub fn max_rounds(mut self, rounds: usize) -> Self {
        self.max_rounds = Some(rounds);
        self
    }

    pub fn max_transfers(self, transfers: usize) -> Self {
        self.max_rounds(transfers.saturating_add(1))
    }

    /// Only trips running under one of these services are boarded.
    pub fn services<I: IntoIterator<Item = u32>>(mut self, services: I) -> Self {
        self.services = Some(services.into_iter().collect());
        self
    }

    pub fn deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }
}

/// A validated request with every default resolved.
#[derive(Debug)]
pub(crate) struct SearchContext<'a> {
    pub timetable: &'a Timetable,
    pub access: &'a [AccessEgress],
    pub egress: &'a [AccessEgress],
    /// Egress legs by stop, indices into `egress`.
    pub egress_by_stop: Vec<Vec<u32>>,
    pub offsets: Vec<Time>,
    pub criteria: CriteriaSet,
    pub max_rounds: usize,
    pub board_slack: Duration,
    pub cost: CostModel,
    pub merge: MergePolicy,
    pub parallel: bool,
    services: Option<BitVec<usize, Lsb0>>,
    deadline: Option<Instant>,
    cancellation: Option<CancellationToken>,
}

impl<'a> SearchContext<'a> {
    pub fn new(
        timetable: &'a Timetable,
        config: &RaptorConfig,
        request: &'a SearchRequest,
    ) -> Result<Self, raptor::Error> {
        if request.access.is_empty() {
            return Err(raptor::Error::EmptyAccess);
        }
        if request.egress.is_empty() {
            return Err(raptor::Error::EmptyEgress);
        }
        let stop_count = timetable.stop_count();
        for (kind, legs) in [("Access", &request.access), ("Egress", &request.egress)] {
            if let Some(leg) = legs.iter().find(|leg| leg.stop as usize >= stop_count) {
                return Err(raptor::Error::StopOutOfRange {
                    kind,
                    stop: leg.stop,
                    count: stop_count,
                });
            }
        }

        let earliest = request.earliest_departure;
        let latest = request
            .latest_departure
            .unwrap_or(earliest + config.search_window);
        if latest < earliest {
            return Err(raptor::Error::InvalidWindow {
                start: earliest,
                end: latest,
            });
        }
        let step = request.departure_step.unwrap_or(config.departure_step);
        if step.is_zero() && latest > earliest {
            return Err(raptor::Error::ZeroDepartureStep);
        }

        let criteria = request.criteria.unwrap_or(config.criteria);
        if criteria.for_single_departure().is_empty() {
            return Err(raptor::Error::NoActiveCriteria);
        }
        let max_rounds = request.max_rounds.unwrap_or(config.max_rounds);
        if max_rounds == 0 {
            return Err(raptor::Error::ZeroRounds);
        }
        if max_rounds > MAX_ROUNDS {
            return Err(raptor::Error::RoundLimitTooLarge {
                rounds: max_rounds,
                max: MAX_ROUNDS,
            });
        }

        let mut egress_by_stop = vec![Vec::new(); stop_count];
        request.egress.iter().enumerate().for_each(|(i, leg)| {
            egress_by_stop[leg.stop as usize].push(i as u32);
        });

        let services = request.services.as_ref().map(|services| {
            let count = timetable.service_count();
            let mut active = bitvec!(usize, Lsb0; 0; count);
            services
                .iter()
                .filter(|&&service| (service as usize) < count)
                .for_each(|&service| active.set(service as usize, true));
            active
        });

        Ok(Self {
            timetable,
            access: &request.access,
            egress: &request.egress,
            egress_by_stop,
            offsets: departure_offsets(earliest, latest, step),
            // Departure time only matters when runs are merged.
            criteria: criteria.for_single_departure(),
            max_rounds,
            board_slack: config.board_slack,
            cost: CostModel::from(&config.cost),
            merge: config.merge,
            parallel: config.parallel,
            services,
            deadline: request.deadline,
            cancellation: request.cancellation.clone(),
        })
    }

    /// True when the trip runs under one of the requested services.
    #[inline(always)]
    pub fn accepts(&self, trip: &Trip) -> bool {
        match &self.services {
            Some(active) => active
                .get(trip.service_idx as usize)
                .map(|bit| *bit)
                .unwrap_or(false),
            None => true,
        }
    }

    pub fn has_egress(&self, stop: u32) -> bool {
        !self.egress_by_stop[stop as usize].is_empty()
    }

    /// Set once the caller cancelled or the deadline passed.
    pub fn interruption(&self) -> Option<StopReason> {
        if self
            .cancellation
            .as_ref()
            .map(|token| token.is_cancelled())
            .unwrap_or(false)
        {
            return Some(StopReason::Cancelled);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Some(StopReason::DeadlineExceeded),
            _ => None,
        }
    }
}

/// Every departure from `earliest` to `latest` spaced `step` apart.
pub fn departure_offsets(earliest: Time, latest: Time, step: Duration) -> Vec<Time> {
    let mut offsets = vec![earliest];
    if step.is_zero() {
        return offsets;
    }
    let mut current = earliest;
    while let Some(next) = current
        .as_seconds()
        .checked_add(step.as_seconds())
        .map(Time::from_seconds)
        .filter(|next| *next <= latest)
    {
        offsets.push(next);
        current = next;
    }
    offsets
}

#[test]
fn offsets_cover_window() {
    let offsets = departure_offsets(
        Time::from_seconds(0),
        Time::from_seconds(600),
        Duration::from_seconds(300),
    );
    assert_eq!(
        offsets,
        vec![
            Time::from_seconds(0),
            Time::from_seconds(300),
            Time::from_seconds(600)
        ]
    );
}

#[test]
fn offsets_of_empty_window() {
    let offsets = departure_offsets(
        Time::from_seconds(42),
        Time::from_seconds(42),
        Duration::from_seconds(0),
    );
    assert_eq!(offsets, vec![Time::from_seconds(42)]);
}
