use crate::{
    raptor::{
        CriteriaSet, ParetoFront, TieBreak,
        arrival::{ArrivalArena, ArrivalId, ArrivalKind, StopArrival},
        destination::DestinationArrival,
        frontier::Criteria,
        request::SearchContext,
        state::{FrontierEntry, Update},
    },
    timetable::Timetable,
};
use bitvec::prelude::*;

/// The labels of one departure run: every arrival made so far, the
/// per (round, stop) Pareto frontiers and the destination frontier.
///
/// Read-only while routes and transfers are explored in parallel, written
/// only when the batched updates are applied.
pub struct Labels {
    pub(crate) arena: ArrivalArena,
    /// A flattened 2D matrix [round][stop_index] of frontiers.
    pub(crate) frontiers: Vec<ParetoFront<FrontierEntry>>,
    /// Frontier cells that hold at least one entry.
    touched: Vec<usize>,
    pub(crate) destination: ParetoFront<DestinationArrival>,
    pub(crate) criteria: CriteriaSet,
    /// Stops with at least one egress leg.
    egress_stops: BitVec<usize, Lsb0>,
    stop_count: usize,
}

impl Labels {
    fn new(stop_count: usize) -> Self {
        Self {
            arena: ArrivalArena::with_capacity(1024),
            frontiers: Vec::new(),
            touched: Vec::with_capacity(1024),
            destination: ParetoFront::new(CriteriaSet::default(), TieBreak::KeepFirst),
            criteria: CriteriaSet::default(),
            egress_stops: bitvec!(usize, Lsb0; 0; stop_count),
            stop_count,
        }
    }

    #[inline(always)]
    pub(crate) fn frontier(&self, round: usize, stop: u32) -> &ParetoFront<FrontierEntry> {
        &self.frontiers[flat_matrix(round, stop as usize, self.stop_count)]
    }

    /// True while the arrival has not been pushed out of its frontier.
    pub(crate) fn is_live(&self, id: ArrivalId) -> bool {
        let arrival = self.arena.get(id);
        self.frontier(arrival.round as usize, arrival.stop)
            .iter()
            .any(|entry| entry.id == id)
    }

    /// An arrival from an earlier round that is no worse on time and cost
    /// makes a new one useless, it already used fewer transit legs.
    ///
    /// Transit arrivals may go on with a transfer, transfer and access
    /// arrivals may not, so a transit candidate only yields to earlier transit
    /// arrivals. Access arrivals cannot be egressed, so at an egress stop they
    /// prune nothing.
    pub(crate) fn pruned_by_earlier_round(
        &self,
        stop: u32,
        round: usize,
        criteria: &Criteria,
        transit: bool,
    ) -> bool {
        let set = self.criteria.without_transfers();
        let first = usize::from(self.egress_stops[stop as usize]);
        (first..round).any(|earlier| {
            self.frontier(earlier, stop).iter().any(|entry| {
                (entry.transit || !transit) && entry.criteria.compare(criteria, &set).no_worse()
            })
        })
    }

    /// Egress legs only add time and cost, so anything a destination
    /// arrival already beats can be dropped.
    pub(crate) fn pruned_by_destination(&self, criteria: &Criteria) -> bool {
        self.destination
            .iter()
            .any(|destination| destination.criteria.compare(criteria, &self.criteria).no_worse())
    }

    /// Read-only version of [`Labels::insert`].
    pub(crate) fn would_accept(
        &self,
        stop: u32,
        round: usize,
        criteria: &Criteria,
        transit: bool,
    ) -> bool {
        let entry = FrontierEntry {
            id: self.arena.next_id(),
            criteria: *criteria,
            transit,
        };
        !self.pruned_by_destination(criteria)
            && !self.pruned_by_earlier_round(stop, round, criteria, transit)
            && self.frontier(round, stop).accepts(&entry)
    }

    fn insert(&mut self, round: usize, arrival: StopArrival) -> Option<ArrivalId> {
        let transit = arrival.kind.is_transit();
        let criteria = arrival.criteria();
        if self.pruned_by_earlier_round(arrival.stop, round, &criteria, transit) {
            return None;
        }
        let id = self.arena.next_id();
        let cell = flat_matrix(round, arrival.stop as usize, self.stop_count);
        let front = &mut self.frontiers[cell];
        let was_empty = front.is_empty();
        if !front.insert(FrontierEntry {
            id,
            criteria,
            transit,
        }) {
            return None;
        }
        if was_empty {
            self.touched.push(cell);
        }
        Some(self.arena.push(arrival))
    }

    fn reset(&mut self) {
        self.touched
            .drain(..)
            .for_each(|cell| self.frontiers[cell].clear());
        self.arena.clear();
        self.destination.clear();
    }
}

/// A memory pool for one departure run.
///
/// Pre-allocates all buffers a run needs so that the offsets of a range
/// search, which all run against the same timetable, can reuse them.
pub struct Allocator {
    pub(crate) labels: Labels,
    /// Tracks which stops were improved in the current round and need to be explored in the next.
    pub(crate) marked_stops: BitVec<usize, Lsb0>,
    /// Tracks the earliest relevant stop position for each route in the current round.
    pub(crate) active: Vec<u32>,
    pub(crate) active_mask: BitVec<usize, Lsb0>,
    /// Buffer used to batch updates before applying them to the labels.
    pub(crate) updates: Vec<Update>,
    /// Arrivals accepted during the current round.
    pub(crate) round_arrivals: Vec<ArrivalId>,
    stop_count: usize,
}

impl Allocator {
    /// Creates a new allocator sized for the given timetable.
    ///
    /// # Warning
    /// The allocator must be used with the exact same `Timetable` it was created for.
    pub fn new(timetable: &Timetable) -> Self {
        Self {
            labels: Labels::new(timetable.stop_count()),
            marked_stops: bitvec!(usize, Lsb0; 0; timetable.stop_count()),
            active: vec![u32::MAX; timetable.route_count()],
            active_mask: bitvec!(usize, Lsb0; 0; timetable.route_count()),
            updates: Vec::with_capacity(1024),
            round_arrivals: Vec::with_capacity(256),
            stop_count: timetable.stop_count(),
        }
    }

    /// Clears the previous run and sizes the frontiers for the request.
    pub(crate) fn prepare(&mut self, ctx: &SearchContext) {
        self.reset();
        let cells = ctx.max_rounds.saturating_add(1).saturating_mul(self.stop_count);
        if self.labels.criteria != ctx.criteria || self.labels.frontiers.len() < cells {
            self.labels.criteria = ctx.criteria;
            self.labels.frontiers = vec![ParetoFront::new(ctx.criteria, TieBreak::KeepFirst); cells];
        }
        self.labels.destination = ParetoFront::new(ctx.criteria, TieBreak::KeepFirst);
        self.labels.egress_stops.fill(false);
        ctx.egress
            .iter()
            .for_each(|leg| self.labels.egress_stops.set(leg.stop as usize, true));
    }

    /// Resets the internal buffers to their initial state, allowing the allocator
    /// to be reused for a new run without re-allocating memory.
    pub fn reset(&mut self) {
        self.labels.reset();
        self.marked_stops.fill(false);
        self.active.fill(u32::MAX);
        self.active_mask.fill(false);
        self.updates.clear();
        self.round_arrivals.clear();
    }

    pub(crate) fn insert_access(&mut self, stop: u32, criteria: Criteria, leg: u32) -> bool {
        let arrival = StopArrival {
            stop,
            round: 0,
            arrival_time: criteria.arrival_time,
            cost: criteria.cost,
            transfers: criteria.transfers,
            kind: ArrivalKind::Access { leg },
            previous: None,
        };
        match self.labels.insert(0, arrival) {
            Some(_) => {
                self.marked_stops.set(stop as usize, true);
                true
            }
            None => false,
        }
    }

    /// Applies the batched updates in order and returns how many were accepted.
    pub(crate) fn run_updates(&mut self, round: usize) -> usize {
        let mut accepted = 0;
        for update in self.updates.drain(..) {
            let arrival = StopArrival {
                stop: update.stop,
                round: round as u32,
                arrival_time: update.criteria.arrival_time,
                cost: update.criteria.cost,
                transfers: update.criteria.transfers,
                kind: update.kind,
                previous: Some(update.previous),
            };
            if let Some(id) = self.labels.insert(round, arrival) {
                self.marked_stops.set(update.stop as usize, true);
                self.round_arrivals.push(id);
                accepted += 1;
            }
        }
        accepted
    }
}

/// Converts a (round, stop_index) coordinate into a flat index
/// for the 1D frontier array.
#[inline(always)] // Hint to compiler to inline for performance
pub(crate) fn flat_matrix(outer: usize, inner: usize, count: usize) -> usize {
    (outer * count) + inner
}

#[test]
fn flat_matrix_test() {
    let a = flat_matrix(0, 0, 10);
    let b = flat_matrix(0, 1, 10);
    assert_eq!(a + 1, b);

    let a = flat_matrix(2, 0, 10);
    let b = flat_matrix(2, 1, 10);
    assert_eq!(a + 1, b);

    let a = flat_matrix(0, 0, 10);
    let b = flat_matrix(1, 0, 10);
    assert_eq!(a + 10, b);
}
