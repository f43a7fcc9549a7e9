use std::fmt::Display;

use crate::{
    raptor::{
        AccessEgress,
        arrival::{ArrivalId, StopArrival},
        frontier::{Criteria, CriteriaSet, Dominance, ParetoItem},
    },
    shared::{Cost, Duration, Time},
};

/// A stop arrival extended with one of its egress legs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DestinationArrival {
    /// The stop arrival the egress leg leaves from.
    pub arrival: ArrivalId,
    /// Index into the request's egress legs.
    pub egress: u32,
    pub from_stop: u32,
    pub round: u32,
    pub egress_duration: Duration,
    pub criteria: Criteria,
}

impl DestinationArrival {
    pub fn new(
        id: ArrivalId,
        arrival: &StopArrival,
        egress_idx: u32,
        egress: &AccessEgress,
    ) -> Self {
        Self {
            arrival: id,
            egress: egress_idx,
            from_stop: arrival.stop,
            round: arrival.round,
            egress_duration: egress.duration,
            criteria: Criteria::new(
                arrival.arrival_time + egress.duration,
                arrival.cost + egress.cost,
                arrival.transfers,
            ),
        }
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn arrival_time(&self) -> Time {
        self.criteria.arrival_time
    }

    pub fn cost(&self) -> Cost {
        self.criteria.cost
    }

    pub fn transfers(&self) -> u32 {
        self.criteria.transfers
    }
}

impl ParetoItem for DestinationArrival {
    fn compare(&self, other: &Self, set: &CriteriaSet) -> Dominance {
        self.criteria.compare(&other.criteria, set)
    }
}

impl Display for DestinationArrival {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Egress {{ round: {}, from-stop: {}, duration: {}, arrival-time: {} {} }}",
            self.round,
            self.from_stop,
            self.egress_duration,
            self.arrival_time(),
            self.cost()
        )
    }
}

#[cfg(test)]
fn transit_arrival() -> StopArrival {
    StopArrival {
        stop: 101,
        round: 1,
        arrival_time: Time::from_hms("08:14:00").unwrap_or_default(),
        cost: Cost::new(1000),
        transfers: 0,
        kind: crate::raptor::ArrivalKind::Transit {
            trip_idx: 0,
            route_idx: 0,
            board_stop: 100,
            board_pos: 0,
            alight_pos: 1,
            board_time: Time::from_seconds(0),
        },
        previous: Some(ArrivalId::from_raw(0)),
    }
}

#[test]
fn adds_egress_to_arrival() {
    let egress = AccessEgress::new(101, Duration::from_seconds(50), Cost::new(120));
    let arrival = DestinationArrival::new(ArrivalId::from_raw(1), &transit_arrival(), 0, &egress);
    assert_eq!(arrival.arrival_time().to_hms_string(), "08:14:50");
    assert_eq!(arrival.cost(), Cost::new(1120));
    assert_eq!(arrival.round(), 1);
}

#[test]
fn display() {
    let egress = AccessEgress::new(101, Duration::from_seconds(50), Cost::new(120));
    let arrival = DestinationArrival::new(ArrivalId::from_raw(1), &transit_arrival(), 0, &egress);
    assert_eq!(
        arrival.to_string(),
        "Egress { round: 1, from-stop: 101, duration: 50s, arrival-time: 08:14:50 $1120 }"
    );
}
