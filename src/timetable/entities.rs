use std::sync::Arc;

use crate::shared::{Cost, Duration, Time};

/// A physical point where passengers can board or alight from a vehicle.
#[derive(Debug, Default, Clone)]
pub struct Stop {
    /// The global internal index used for O(1) array lookups in the timetable.
    pub index: u32,
    /// Unique external identifier for the stop.
    pub id: Arc<str>,
    /// Human-readable name (e.g., "Main St & 4th Ave").
    pub name: Arc<str>,
}

/// Individual event within a trip where a vehicle calls at a stop.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct StopTime {
    /// Internal index of the associated [`Stop`].
    pub stop_idx: u32,
    /// Scheduled arrival time (stored as seconds since midnight).
    pub arrival_time: Time,
    /// Scheduled departure time (stored as seconds since midnight).
    pub departure_time: Time,
}

impl StopTime {
    pub fn new(stop_idx: u32, arrival_time: Time, departure_time: Time) -> Self {
        Self {
            stop_idx,
            arrival_time,
            departure_time,
        }
    }
}

/// Metadata describing a contiguous range within the global `stop_times` array.
#[derive(Default, Debug, Clone, Copy)]
pub struct StopTimeSlice {
    /// The index where the trip's stop-times begin.
    pub start_idx: u32,
    /// The total number of stops in the trip.
    pub count: u32,
}

/// A specific journey taken by a vehicle through a sequence of stops.
#[derive(Debug, Default, Clone)]
pub struct Trip {
    pub index: u32,
    pub id: Arc<str>,
    /// Pointer to the [`Route`] whose stop pattern this trip follows.
    pub route_idx: u32,
    /// The service calendar entry this trip runs under.
    pub service_idx: u32,
    pub slice: StopTimeSlice,
}

/// A routing pattern.
///
/// Every trip in a `Route` shares the *exact same stop sequence*, and no trip
/// overtakes another, so `trips` is sorted by departure at every position.
#[derive(Debug, Default, Clone)]
pub struct Route {
    pub index: u32,
    /// List of stop indices served by this route in order.
    pub stops: Arc<[u32]>,
    /// List of trip indices that follow this stop sequence, earliest first.
    pub trips: Arc<[u32]>,
}

/// A position of a stop within a route pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteStop {
    pub route_idx: u32,
    pub pos: u32,
}

/// A precomputed walking connection between two stops.
#[derive(Debug, Default, Clone)]
pub struct Transfer {
    pub index: u32,
    pub from_stop_idx: u32,
    pub to_stop_idx: u32,
    pub duration: Duration,
    pub cost: Cost,
}
