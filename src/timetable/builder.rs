use std::{collections::HashMap, sync::Arc};

use tracing::debug;

use crate::{
    shared::{Cost, Duration, Time},
    timetable::{self, Route, RouteStop, Stop, StopTime, StopTimeSlice, Timetable, Transfer, Trip},
};

/// One scheduled call of a trip at a stop.
#[derive(Debug, Clone, Copy)]
pub struct Call {
    pub stop_idx: u32,
    pub arrival_time: Time,
    pub departure_time: Time,
}

impl Call {
    pub fn new(stop_idx: u32, arrival_time: Time, departure_time: Time) -> Self {
        Self {
            stop_idx,
            arrival_time,
            departure_time,
        }
    }

    /// A call where the vehicle leaves as soon as it arrives.
    pub fn at(stop_idx: u32, time: Time) -> Self {
        Self::new(stop_idx, time, time)
    }
}

#[derive(Debug, Clone)]
struct PendingTrip {
    id: Arc<str>,
    service_idx: u32,
    calls: Vec<Call>,
}

/// Collects stops, trips and transfers handed over by the ingestion layer
/// and turns them into a [`Timetable`].
#[derive(Debug, Clone, Default)]
pub struct TimetableBuilder {
    stops: Vec<Stop>,
    trips: Vec<PendingTrip>,
    transfers: Vec<(u32, u32, Duration, Cost)>,
}

impl TimetableBuilder {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn add_stop(&mut self, id: &str, name: &str) -> u32 {
        let index = self.stops.len() as u32;
        self.stops.push(Stop {
            index,
            id: id.into(),
            name: name.into(),
        });
        index
    }

    pub fn add_trip(&mut self, id: &str, service_idx: u32, calls: Vec<Call>) -> &mut Self {
        self.trips.push(PendingTrip {
            id: id.into(),
            service_idx,
            calls,
        });
        self
    }

    pub fn add_transfer(
        &mut self,
        from_stop_idx: u32,
        to_stop_idx: u32,
        duration: Duration,
        cost: Cost,
    ) -> &mut Self {
        self.transfers
            .push((from_stop_idx, to_stop_idx, duration, cost));
        self
    }

    /// Validates the collected data and builds the route patterns.
    pub fn build(self) -> Result<Timetable, timetable::Error> {
        let stop_count = self.stops.len();
        self.trips
            .iter()
            .try_for_each(|trip| validate_trip(trip, stop_count))?;

        // Raptor requires each route's trips to have an identical set of stops.
        // So we group trips by their stop sequence, keeping the order in which
        // a sequence was first seen so the build is deterministic.
        let mut group_lookup: HashMap<Vec<u32>, usize> = HashMap::new();
        let mut groups: Vec<(Vec<u32>, Vec<usize>)> = Vec::new();
        self.trips.iter().enumerate().for_each(|(i, trip)| {
            let signature: Vec<u32> = trip.calls.iter().map(|call| call.stop_idx).collect();
            match group_lookup.get(&signature) {
                Some(&group) => groups[group].1.push(i),
                None => {
                    group_lookup.insert(signature.clone(), groups.len());
                    groups.push((signature, vec![i]));
                }
            }
        });

        let mut routes: Vec<Route> = Vec::new();
        let mut trips: Vec<Trip> = Vec::with_capacity(self.trips.len());
        let mut stop_times: Vec<StopTime> = Vec::new();
        let mut stop_to_routes: Vec<Vec<RouteStop>> = vec![Vec::new(); stop_count];

        for (signature, mut members) in groups {
            members.sort_by_key(|&i| (self.trips[i].calls[0].departure_time, i));

            // Binary search on departure only works if no trip overtakes
            // another one, so overtaking trips are moved to a route of their own.
            let mut lanes: Vec<Vec<usize>> = Vec::new();
            for member in members {
                let calls = &self.trips[member].calls;
                let lane = lanes.iter_mut().find(|lane| {
                    lane.last()
                        .map(|&last| never_overtaken(&self.trips[last].calls, calls))
                        .unwrap_or(true)
                });
                match lane {
                    Some(lane) => lane.push(member),
                    None => lanes.push(vec![member]),
                }
            }

            for lane in lanes {
                let route_idx = routes.len() as u32;
                let mut route_trips = Vec::with_capacity(lane.len());
                for member in lane {
                    let pending = &self.trips[member];
                    let trip_idx = trips.len() as u32;
                    let start_idx = stop_times.len() as u32;
                    stop_times.extend(pending.calls.iter().map(|call| {
                        StopTime::new(call.stop_idx, call.arrival_time, call.departure_time)
                    }));
                    trips.push(Trip {
                        index: trip_idx,
                        id: pending.id.clone(),
                        route_idx,
                        service_idx: pending.service_idx,
                        slice: StopTimeSlice {
                            start_idx,
                            count: pending.calls.len() as u32,
                        },
                    });
                    route_trips.push(trip_idx);
                }
                signature.iter().enumerate().for_each(|(pos, &stop_idx)| {
                    stop_to_routes[stop_idx as usize].push(RouteStop {
                        route_idx,
                        pos: pos as u32,
                    });
                });
                routes.push(Route {
                    index: route_idx,
                    stops: signature.clone().into(),
                    trips: route_trips.into(),
                });
            }
        }

        let mut transfers: Vec<Transfer> = Vec::with_capacity(self.transfers.len());
        let mut stop_to_transfers: Vec<Vec<u32>> = vec![Vec::new(); stop_count];
        for (from, to, duration, cost) in self.transfers {
            if from as usize >= stop_count || to as usize >= stop_count {
                return Err(timetable::Error::TransferStopOutOfRange {
                    from,
                    to,
                    count: stop_count,
                });
            }
            let index = transfers.len() as u32;
            stop_to_transfers[from as usize].push(index);
            transfers.push(Transfer {
                index,
                from_stop_idx: from,
                to_stop_idx: to,
                duration,
                cost,
            });
        }

        let service_count = trips
            .iter()
            .map(|trip| trip.service_idx + 1)
            .max()
            .unwrap_or(0);

        debug!(
            "Built timetable with {} stops, {} routes, {} trips and {} transfers",
            stop_count,
            routes.len(),
            trips.len(),
            transfers.len()
        );

        Ok(Timetable {
            stops: self.stops.into(),
            routes: routes.into(),
            trips: trips.into(),
            stop_times: stop_times.into(),
            transfers: transfers.into(),
            stop_to_routes: stop_to_routes.into_iter().map(Into::into).collect(),
            stop_to_transfers: stop_to_transfers.into_iter().map(Into::into).collect(),
            service_count,
        })
    }
}

fn validate_trip(trip: &PendingTrip, stop_count: usize) -> Result<(), timetable::Error> {
    if trip.calls.len() < 2 {
        return Err(timetable::Error::TooFewCalls(trip.id.to_string()));
    }
    if let Some(call) = trip
        .calls
        .iter()
        .find(|call| call.stop_idx as usize >= stop_count)
    {
        return Err(timetable::Error::TripStopOutOfRange {
            trip: trip.id.to_string(),
            stop: call.stop_idx,
            count: stop_count,
        });
    }
    let mut previous_departure = Time::from_seconds(0);
    for (pos, call) in trip.calls.iter().enumerate() {
        if call.departure_time < call.arrival_time || call.arrival_time < previous_departure {
            return Err(timetable::Error::NonMonotonicTimes {
                trip: trip.id.to_string(),
                pos,
            });
        }
        previous_departure = call.departure_time;
    }
    Ok(())
}

/// True when `later` never runs ahead of `earlier` at any call.
fn never_overtaken(earlier: &[Call], later: &[Call]) -> bool {
    earlier.iter().zip(later).all(|(a, b)| {
        a.arrival_time <= b.arrival_time && a.departure_time <= b.departure_time
    })
}

#[test]
fn overtaking_trip_gets_its_own_route() {
    let mut builder = TimetableBuilder::new();
    let a = builder.add_stop("a", "A");
    let b = builder.add_stop("b", "B");
    builder.add_trip(
        "slow",
        0,
        vec![
            Call::at(a, Time::from_seconds(100)),
            Call::at(b, Time::from_seconds(1000)),
        ],
    );
    builder.add_trip(
        "express",
        0,
        vec![
            Call::at(a, Time::from_seconds(200)),
            Call::at(b, Time::from_seconds(500)),
        ],
    );
    let timetable = builder.build().unwrap();
    assert_eq!(timetable.route_count(), 2);
    assert_eq!(timetable.routes_serving_stop(a).len(), 2);
}
