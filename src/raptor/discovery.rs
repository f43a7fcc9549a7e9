use crate::{
    raptor::{
        Allocator,
        destination::DestinationArrival,
        request::SearchContext,
    },
    timetable::Timetable,
};
use tracing::trace;

/// Marks every route serving a stop improved in the last round, remembering
/// the earliest improved position per route, and clears the stop marks.
///
/// Returns the number of active routes.
pub(crate) fn mark_routes(timetable: &Timetable, allocator: &mut Allocator) -> usize {
    allocator.active.fill(u32::MAX);
    allocator.active_mask.fill(false);
    // Only the earliest marked position of a route matters, the scan
    // passes every later one anyway.
    // 0 1 2 3 4 5 6 7 8
    //   ^   ^     ^
    for stop_idx in allocator.marked_stops.iter_ones() {
        for serving in timetable.routes_serving_stop(stop_idx as u32) {
            let route_idx = serving.route_idx as usize;
            if serving.pos < allocator.active[route_idx] {
                allocator.active[route_idx] = serving.pos;
                allocator.active_mask.set(route_idx, true);
            }
        }
    }
    allocator.marked_stops.fill(false);
    allocator.active_mask.count_ones()
}

/// Offers every arrival accepted in this round that can reach the
/// destination to the destination frontier.
///
/// Returns the number of destination arrivals added.
pub(crate) fn collect_destination_arrivals(
    ctx: &SearchContext,
    round: usize,
    allocator: &mut Allocator,
) -> usize {
    let labels = &mut allocator.labels;
    let mut added = 0;
    for &id in &allocator.round_arrivals {
        let arrival = *labels.arena.get(id);
        if !ctx.has_egress(arrival.stop) || !labels.is_live(id) {
            continue;
        }
        for &egress_idx in &ctx.egress_by_stop[arrival.stop as usize] {
            let egress = &ctx.egress[egress_idx as usize];
            let candidate = DestinationArrival::new(id, &arrival, egress_idx, egress);
            trace!("Destination candidate {candidate}");
            if labels.destination.insert(candidate) {
                added += 1;
            }
        }
    }
    trace!("Round {round} added {added} destination arrivals");
    added
}
