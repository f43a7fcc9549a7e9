use std::fmt::Display;

use serde::Serialize;
use tracing::trace;

use crate::{
    raptor::{
        self, AccessLeg, EgressLeg, Leg, TransferLeg, TransitLeg,
        arrival::{ArrivalArena, ArrivalKind, StopArrival},
        destination::DestinationArrival,
        frontier::{Criteria, CriteriaSet, Dominance, ParetoItem},
        request::SearchContext,
    },
    shared::{Cost, Time},
};

/// A complete journey from origin to destination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Path {
    pub legs: Vec<Leg>,
    pub departure_time: Time,
    pub arrival_time: Time,
    pub cost: Cost,
    pub transfers: u32,
}

impl Path {
    pub fn criteria(&self) -> Criteria {
        Criteria {
            departure_time: self.departure_time,
            arrival_time: self.arrival_time,
            cost: self.cost,
            transfers: self.transfers,
        }
    }

    pub fn transit_legs(&self) -> impl Iterator<Item = &TransitLeg> {
        self.legs.iter().filter_map(Leg::as_transit)
    }

    /// Number of transit legs, the round the journey was found in.
    pub fn rounds(&self) -> usize {
        self.transit_legs().count()
    }

    pub fn duration(&self) -> crate::shared::Duration {
        self.arrival_time - self.departure_time
    }
}

impl ParetoItem for Path {
    fn compare(&self, other: &Self, set: &CriteriaSet) -> Dominance {
        self.criteria().compare(&other.criteria(), set)
    }
}

impl Display for Path {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} - {} ({}) {} transfers: {}",
            self.departure_time,
            self.arrival_time,
            self.duration(),
            self.cost,
            self.transfers
        )?;
        for leg in &self.legs {
            write!(f, "\n  {leg}")?;
        }
        Ok(())
    }
}

/// Orders journeys by arrival, then cost, then the later departure, then
/// fewer transfers.
pub fn sort_paths(paths: &mut [Path]) {
    paths.sort_by(|a, b| {
        a.arrival_time
            .cmp(&b.arrival_time)
            .then(a.cost.cmp(&b.cost))
            .then(b.departure_time.cmp(&a.departure_time))
            .then(a.transfers.cmp(&b.transfers))
    });
}

/// Walks the arrival chain of a destination arrival back to its access leg
/// and turns it into a [`Path`].
///
/// The access leg is shifted to arrive just in time for the first boarding.
pub(crate) fn backtrack(
    ctx: &SearchContext,
    arena: &ArrivalArena,
    destination: &DestinationArrival,
) -> Result<Path, raptor::Error> {
    let mut chain: Vec<&StopArrival> = arena.chain(destination.arrival).collect();
    chain.reverse();

    let (first, rest) = chain
        .split_first()
        .ok_or(raptor::Error::FailedToBuildPath)?;
    let ArrivalKind::Access { leg } = first.kind else {
        return Err(raptor::Error::FailedToBuildPath);
    };
    let access = ctx
        .access
        .get(leg as usize)
        .ok_or(raptor::Error::FailedToBuildPath)?;
    let first_board = rest
        .iter()
        .find_map(|arrival| match arrival.kind {
            ArrivalKind::Transit { board_time, .. } => Some(board_time),
            _ => None,
        })
        .ok_or(raptor::Error::FailedToBuildPath)?;

    let access_arrival = first_board
        .checked_sub(ctx.board_slack)
        .map(|latest| latest.max(first.arrival_time))
        .unwrap_or(first.arrival_time);
    let departure_time = access_arrival
        .checked_sub(access.duration)
        .ok_or(raptor::Error::FailedToBuildPath)?;

    let mut legs = Vec::with_capacity(chain.len() + 1);
    legs.push(Leg::Access(AccessLeg {
        to_stop: first.stop,
        departure_time,
        arrival_time: access_arrival,
        cost: first.cost,
    }));

    let mut previous: StopArrival = **first;
    for arrival in rest {
        let cost = arrival.cost - previous.cost;
        let leg = match arrival.kind {
            ArrivalKind::Transit {
                trip_idx,
                route_idx,
                board_stop,
                board_pos,
                alight_pos,
                board_time,
            } => Leg::Transit(TransitLeg {
                trip_idx,
                trip_id: ctx
                    .timetable
                    .trips
                    .get(trip_idx as usize)
                    .map(|trip| trip.id.to_string())
                    .ok_or(raptor::Error::FailedToBuildPath)?,
                route_idx,
                from_stop: board_stop,
                to_stop: arrival.stop,
                board_pos,
                alight_pos,
                departure_time: board_time,
                arrival_time: arrival.arrival_time,
                cost,
            }),
            ArrivalKind::Transfer { from_stop, .. } => Leg::Transfer(TransferLeg {
                from_stop,
                to_stop: arrival.stop,
                departure_time: previous.arrival_time,
                arrival_time: arrival.arrival_time,
                cost,
            }),
            ArrivalKind::Access { .. } => return Err(raptor::Error::FailedToBuildPath),
        };
        trace!("Backtracked {leg}");
        legs.push(leg);
        previous = **arrival;
    }

    let egress = ctx
        .egress
        .get(destination.egress as usize)
        .ok_or(raptor::Error::FailedToBuildPath)?;
    legs.push(Leg::Egress(EgressLeg {
        from_stop: previous.stop,
        departure_time: previous.arrival_time,
        arrival_time: previous.arrival_time + egress.duration,
        cost: egress.cost,
    }));

    Ok(Path {
        legs,
        departure_time,
        arrival_time: destination.arrival_time(),
        cost: destination.cost(),
        transfers: destination.transfers(),
    })
}

#[cfg(test)]
fn summary(departure: u32, arrival: u32, cost: u32, transfers: u32) -> Path {
    Path {
        legs: vec![],
        departure_time: Time::from_seconds(departure),
        arrival_time: Time::from_seconds(arrival),
        cost: Cost::new(cost),
        transfers,
    }
}

#[test]
fn sorts_by_arrival_then_cost() {
    let mut paths = vec![
        summary(0, 200, 10, 0),
        summary(0, 100, 50, 1),
        summary(0, 100, 20, 1),
        summary(50, 200, 10, 0),
    ];
    sort_paths(&mut paths);
    assert_eq!(paths[0], summary(0, 100, 20, 1));
    assert_eq!(paths[1], summary(0, 100, 50, 1));
    assert_eq!(paths[2], summary(50, 200, 10, 0));
    assert_eq!(paths[3], summary(0, 200, 10, 0));
}

#[test]
fn duration_spans_departure_to_arrival() {
    assert_eq!(
        summary(100, 250, 0, 0).duration(),
        crate::shared::Duration::from_seconds(150)
    );
}
