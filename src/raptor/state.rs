use crate::{
    raptor::{
        arrival::{ArrivalId, ArrivalKind},
        frontier::{Criteria, CriteriaSet, Dominance, DominanceBuilder, ParetoItem},
    },
    shared::{Cost, CostFactor, Time},
};

/// A proposed arrival, batched while routes are scanned in parallel and
/// applied to the frontiers afterwards.
#[derive(Debug, Clone)]
pub(crate) struct Update {
    pub stop: u32,
    pub criteria: Criteria,
    pub kind: ArrivalKind,
    pub previous: ArrivalId,
}

impl Update {
    pub fn new(stop: u32, criteria: Criteria, kind: ArrivalKind, previous: ArrivalId) -> Self {
        Self {
            stop,
            criteria,
            kind,
            previous,
        }
    }
}

/// What a (stop, round) frontier holds.
#[derive(Debug, Clone, Copy)]
pub(crate) struct FrontierEntry {
    pub id: ArrivalId,
    pub criteria: Criteria,
    pub transit: bool,
}

impl ParetoItem for FrontierEntry {
    fn compare(&self, other: &Self, set: &CriteriaSet) -> Dominance {
        self.criteria.compare(&other.criteria, set)
    }
}

/// A passenger riding a trip while a route is scanned.
#[derive(Debug, Clone, Copy)]
pub(crate) struct OnboardLabel {
    pub previous: ArrivalId,
    pub trip_idx: u32,
    pub trip_order: u32,
    pub board_stop: u32,
    pub board_pos: u32,
    pub board_time: Time,
    pub cost_at_board: Cost,
    /// `cost_at_board - transit_factor * board_time`. Adding
    /// `transit_factor * t` gives the cost when alighting at time `t`, which is
    /// what makes two labels on different trips comparable down the route.
    pub relative_cost: i64,
    pub transfers: u32,
}

impl OnboardLabel {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        previous: ArrivalId,
        trip_idx: u32,
        trip_order: u32,
        board_stop: u32,
        board_pos: u32,
        board_time: Time,
        cost_at_board: Cost,
        transfers: u32,
        transit: CostFactor,
    ) -> Self {
        let relative_cost = cost_at_board.as_units() as i64
            - transit.as_units() as i64 * board_time.as_seconds() as i64;
        Self {
            previous,
            trip_idx,
            trip_order,
            board_stop,
            board_pos,
            board_time,
            cost_at_board,
            relative_cost,
            transfers,
        }
    }

    pub fn cost_at(&self, arrival_time: Time, transit: CostFactor) -> Cost {
        self.cost_at_board + Cost::weighted(arrival_time - self.board_time, transit)
    }
}

impl ParetoItem for OnboardLabel {
    fn compare(&self, other: &Self, set: &CriteriaSet) -> Dominance {
        // An earlier trip is never later at any stop further down the route,
        // so trip order stands in for arrival time even when it is inactive.
        DominanceBuilder::default()
            .lower(self.trip_order, other.trip_order)
            .lower_if(set.cost, self.relative_cost, other.relative_cost)
            .lower_if(set.transfers, self.transfers, other.transfers)
            .build()
    }
}

#[test]
fn relative_cost_matches_alight_cost() {
    let factor = CostFactor::from_reluctance(1.0);
    let label = OnboardLabel::new(
        ArrivalId::from_raw(0),
        0,
        0,
        0,
        0,
        Time::from_seconds(100),
        Cost::new(500),
        0,
        factor,
    );
    let alight = Time::from_seconds(160);
    let cost = label.cost_at(alight, factor);
    assert_eq!(cost, Cost::new(500 + 60 * 100));
    assert_eq!(
        cost.as_units() as i64,
        label.relative_cost + factor.as_units() as i64 * alight.as_seconds() as i64
    );
}
