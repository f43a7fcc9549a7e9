use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::shared::{Cost, Duration, Time};

/// A street connection between the origin (or destination) of a request and a stop.
///
/// Produced by the linking layer, the same type is used for both ends of a
/// journey.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessEgress {
    pub stop: u32,
    pub duration: Duration,
    pub cost: Cost,
}

impl AccessEgress {
    pub fn new(stop: u32, duration: Duration, cost: Cost) -> Self {
        Self {
            stop,
            duration,
            cost,
        }
    }

    /// A walk priced at reluctance `1.0`.
    pub fn walk(stop: u32, duration: Duration) -> Self {
        Self::new(stop, duration, Cost::from_seconds(duration))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AccessLeg {
    pub to_stop: u32,
    pub departure_time: Time,
    pub arrival_time: Time,
    pub cost: Cost,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransitLeg {
    pub trip_idx: u32,
    pub trip_id: String,
    pub route_idx: u32,
    pub from_stop: u32,
    pub to_stop: u32,
    pub board_pos: u32,
    pub alight_pos: u32,
    pub departure_time: Time,
    pub arrival_time: Time,
    pub cost: Cost,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TransferLeg {
    pub from_stop: u32,
    pub to_stop: u32,
    pub departure_time: Time,
    pub arrival_time: Time,
    pub cost: Cost,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EgressLeg {
    pub from_stop: u32,
    pub departure_time: Time,
    pub arrival_time: Time,
    pub cost: Cost,
}

/// One part of a journey.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Leg {
    Access(AccessLeg),
    Transit(TransitLeg),
    Transfer(TransferLeg),
    Egress(EgressLeg),
}

impl Leg {
    pub fn departure_time(&self) -> Time {
        match self {
            Leg::Access(leg) => leg.departure_time,
            Leg::Transit(leg) => leg.departure_time,
            Leg::Transfer(leg) => leg.departure_time,
            Leg::Egress(leg) => leg.departure_time,
        }
    }

    pub fn arrival_time(&self) -> Time {
        match self {
            Leg::Access(leg) => leg.arrival_time,
            Leg::Transit(leg) => leg.arrival_time,
            Leg::Transfer(leg) => leg.arrival_time,
            Leg::Egress(leg) => leg.arrival_time,
        }
    }

    pub fn duration(&self) -> Duration {
        self.arrival_time() - self.departure_time()
    }

    pub fn cost(&self) -> Cost {
        match self {
            Leg::Access(leg) => leg.cost,
            Leg::Transit(leg) => leg.cost,
            Leg::Transfer(leg) => leg.cost,
            Leg::Egress(leg) => leg.cost,
        }
    }

    pub fn is_transit(&self) -> bool {
        matches!(self, Leg::Transit(_))
    }

    pub fn as_transit(&self) -> Option<&TransitLeg> {
        match self {
            Leg::Transit(leg) => Some(leg),
            _ => None,
        }
    }
}

impl Display for Leg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Leg::Access(leg) => write!(
                f,
                "Access {{ to-stop: {}, {} - {} {} }}",
                leg.to_stop, leg.departure_time, leg.arrival_time, leg.cost
            ),
            Leg::Transit(leg) => write!(
                f,
                "Transit {{ trip: {}, {} -> {}, {} - {} {} }}",
                leg.trip_id,
                leg.from_stop,
                leg.to_stop,
                leg.departure_time,
                leg.arrival_time,
                leg.cost
            ),
            Leg::Transfer(leg) => write!(
                f,
                "Transfer {{ {} -> {}, {} - {} {} }}",
                leg.from_stop, leg.to_stop, leg.departure_time, leg.arrival_time, leg.cost
            ),
            Leg::Egress(leg) => write!(
                f,
                "Egress {{ from-stop: {}, {} - {} {} }}",
                leg.from_stop, leg.departure_time, leg.arrival_time, leg.cost
            ),
        }
    }
}
