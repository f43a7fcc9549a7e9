use crate::{
    raptor::{
        Allocator, ParetoFront, TieBreak,
        allocator::Labels,
        arrival::ArrivalKind,
        frontier::Criteria,
        request::SearchContext,
        state::{OnboardLabel, Update},
    },
    shared::Cost,
};
use rayon::prelude::*;

/// Explores all active routes and adds any updates to the update buffer in the allocator.
pub(crate) fn explore_routes(ctx: &SearchContext, round: usize, allocator: &mut Allocator) {
    let labels = &allocator.labels;
    let active = &allocator.active;
    let routes: Vec<usize> = allocator.active_mask.iter_ones().collect();
    let updates = routes
        .par_iter()
        .map_init(
            || ParetoFront::new(labels.criteria, TieBreak::KeepFirst),
            |bag, &route_idx| {
                bag.clear();
                scan_route(ctx, round, labels, route_idx, active[route_idx] as usize, bag)
            },
        )
        .flatten();
    allocator.updates.par_extend(updates);
}

/// Walks down a route from `start`, carrying a bag of passengers on board.
///
/// At each position the bag first alights at the stop, then boards whatever
/// the previous round left at that stop.
fn scan_route(
    ctx: &SearchContext,
    round: usize,
    labels: &Labels,
    route_idx: usize,
    start: usize,
    bag: &mut ParetoFront<OnboardLabel>,
) -> Vec<Update> {
    let timetable = ctx.timetable;
    let route = &timetable.routes[route_idx];
    let mut updates = Vec::new();

    for (pos, &stop_idx) in route.stops.iter().enumerate().skip(start) {
        // PART A
        // Alight every passenger on board and keep what improves the stop
        for label in bag.iter() {
            let arrival_time = timetable.stop_time(label.trip_idx, pos).arrival_time;
            let criteria = Criteria::new(
                arrival_time,
                label.cost_at(arrival_time, ctx.cost.transit),
                label.transfers,
            );
            if labels.would_accept(stop_idx, round, &criteria, true) {
                updates.push(Update::new(
                    stop_idx,
                    criteria,
                    ArrivalKind::Transit {
                        trip_idx: label.trip_idx,
                        route_idx: route_idx as u32,
                        board_stop: label.board_stop,
                        board_pos: label.board_pos,
                        alight_pos: pos as u32,
                        board_time: label.board_time,
                    },
                    label.previous,
                ));
            }
        }

        // PART B
        // Board from every arrival the previous round made here
        if pos + 1 >= route.stops.len() {
            continue;
        }
        for entry in labels.frontier(round - 1, stop_idx).iter() {
            let arrival = labels.arena.get(entry.id);
            let Some(trip) = timetable.earliest_trip_departing_where(
                route_idx as u32,
                pos,
                arrival.arrival_time + ctx.board_slack,
                |trip| ctx.accepts(trip),
            ) else {
                continue;
            };
            let board_time = timetable.stop_time(trip.trip.index, pos).departure_time;
            let first_boarding = arrival.kind.is_access();
            let mut cost_at_board = arrival.cost + ctx.cost.board_cost;
            if !first_boarding {
                cost_at_board = cost_at_board
                    + ctx.cost.transfer_cost
                    + Cost::weighted(board_time - arrival.arrival_time, ctx.cost.wait);
            }
            let transfers = if first_boarding {
                arrival.transfers
            } else {
                arrival.transfers + 1
            };
            bag.insert(OnboardLabel::new(
                entry.id,
                trip.trip.index,
                trip.order,
                stop_idx,
                pos as u32,
                board_time,
                cost_at_board,
                transfers,
                ctx.cost.transit,
            ));
        }
    }
    updates
}

/// Relaxes the transfers leaving every stop reached by transit in this round.
///
/// Transfer arrivals stay in the round of the transit arrival they leave
/// from and never lead to another transfer.
pub(crate) fn explore_transfers(ctx: &SearchContext, round: usize, allocator: &mut Allocator) {
    let labels = &allocator.labels;
    let timetable = ctx.timetable;
    let updates = allocator
        .round_arrivals
        .par_iter()
        .filter(|&&id| labels.arena.get(id).kind.is_transit() && labels.is_live(id))
        .flat_map_iter(|&id| {
            let arrival = labels.arena.get(id);
            timetable
                .transfers_from(arrival.stop)
                .iter()
                .filter_map(move |&transfer_idx| {
                    let transfer = &timetable.transfers[transfer_idx as usize];
                    let criteria = Criteria::new(
                        arrival.arrival_time + transfer.duration,
                        arrival.cost + transfer.cost,
                        arrival.transfers,
                    );
                    labels
                        .would_accept(transfer.to_stop_idx, round, &criteria, false)
                        .then(|| {
                            Update::new(
                                transfer.to_stop_idx,
                                criteria,
                                ArrivalKind::Transfer {
                                    from_stop: arrival.stop,
                                    transfer_idx,
                                },
                                id,
                            )
                        })
                })
        });
    allocator.updates.par_extend(updates);
}
