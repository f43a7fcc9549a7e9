pub mod builder;
mod entities;

pub use builder::*;
pub use entities::*;

use crate::shared::Time;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Trip {trip} calls at stop {stop} but the timetable only has {count} stops")]
    TripStopOutOfRange {
        trip: String,
        stop: u32,
        count: usize,
    },
    #[error("Transfer {from} -> {to} references a stop outside of the {count} known stops")]
    TransferStopOutOfRange { from: u32, to: u32, count: usize },
    #[error("Trip {0} needs at least two calls")]
    TooFewCalls(String),
    #[error("Trip {trip} goes back in time at call {pos}")]
    NonMonotonicTimes { trip: String, pos: usize },
}

/// A trip together with its position in its route's ordered trip list.
#[derive(Debug, Clone, Copy)]
pub struct TripRef<'a> {
    /// Position in [`Route::trips`], lower means earlier at every stop.
    pub order: u32,
    pub trip: &'a Trip,
}

/// The immutable schedule the search runs against.
///
/// Built once by a [`TimetableBuilder`] and shared read-only between
/// requests and between the parallel departure runs of one request.
#[derive(Debug, Clone, Default)]
pub struct Timetable {
    pub stops: Box<[Stop]>,
    pub routes: Box<[Route]>,
    pub trips: Box<[Trip]>,
    pub stop_times: Box<[StopTime]>,
    pub transfers: Box<[Transfer]>,

    pub(crate) stop_to_routes: Box<[Box<[RouteStop]>]>,
    pub(crate) stop_to_transfers: Box<[Box<[u32]>]>,
    pub(crate) service_count: u32,
}

impl Timetable {
    pub fn stop_count(&self) -> usize {
        self.stops.len()
    }

    pub fn route_count(&self) -> usize {
        self.routes.len()
    }

    pub fn trip_count(&self) -> usize {
        self.trips.len()
    }

    /// Number of distinct service indices referenced by the trips.
    pub fn service_count(&self) -> usize {
        self.service_count as usize
    }

    pub fn stop_by_id(&self, id: &str) -> Option<&Stop> {
        self.stops.iter().find(|stop| &*stop.id == id)
    }

    pub fn trip_by_id(&self, id: &str) -> Option<&Trip> {
        self.trips.iter().find(|trip| &*trip.id == id)
    }

    /// The trips of a route ordered by departure time.
    /// An unknown route has no trips.
    pub fn trips_of_route(&self, route_idx: u32) -> &[u32] {
        self.routes
            .get(route_idx as usize)
            .map(|route| &*route.trips)
            .unwrap_or_default()
    }

    /// Every (route, position) pair where the stop is served.
    pub fn routes_serving_stop(&self, stop_idx: u32) -> &[RouteStop] {
        self.stop_to_routes
            .get(stop_idx as usize)
            .map(|routes| &**routes)
            .unwrap_or_default()
    }

    /// Indices into [`Timetable::transfers`] leaving the stop.
    pub fn transfers_from(&self, stop_idx: u32) -> &[u32] {
        self.stop_to_transfers
            .get(stop_idx as usize)
            .map(|transfers| &**transfers)
            .unwrap_or_default()
    }

    pub fn stop_times_by_trip_idx(&self, trip_idx: u32) -> &[StopTime] {
        let slice = self.trips[trip_idx as usize].slice;
        let start = slice.start_idx as usize;
        &self.stop_times[start..start + slice.count as usize]
    }

    #[inline(always)]
    pub fn stop_time(&self, trip_idx: u32, pos: usize) -> &StopTime {
        let slice = self.trips[trip_idx as usize].slice;
        &self.stop_times[slice.start_idx as usize + pos]
    }

    /// Finds the earliest trip of the route leaving position `pos` at or after `not_before`.
    pub fn earliest_trip_departing(
        &self,
        route_idx: u32,
        pos: usize,
        not_before: Time,
    ) -> Option<TripRef<'_>> {
        self.earliest_trip_departing_where(route_idx, pos, not_before, |_| true)
    }

    /// Same as [`Timetable::earliest_trip_departing`] but skips trips rejected by `accept`.
    pub fn earliest_trip_departing_where<F>(
        &self,
        route_idx: u32,
        pos: usize,
        not_before: Time,
        accept: F,
    ) -> Option<TripRef<'_>>
    where
        F: Fn(&Trip) -> bool,
    {
        let route = self.routes.get(route_idx as usize)?;
        if pos >= route.stops.len() {
            return None;
        }
        let first = route.trips.partition_point(|&trip_idx| {
            self.stop_time(trip_idx, pos).departure_time < not_before
        });
        route.trips[first..]
            .iter()
            .enumerate()
            .map(|(i, &trip_idx)| TripRef {
                order: (first + i) as u32,
                trip: &self.trips[trip_idx as usize],
            })
            .find(|trip_ref| accept(trip_ref.trip))
    }
}
