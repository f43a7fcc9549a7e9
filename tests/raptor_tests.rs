mod common;

use std::time::Instant;

use common::*;
use rangeraptor::{prelude::*, raptor};

#[test]
fn single_trip_gives_single_path() {
    let mut builder = stops(2);
    trip(&mut builder, "t1", &[(0, 100), (1, 160)]);
    let timetable = builder.build().unwrap();

    let request = SearchRequest::new(vec![walk(0, 0)], vec![walk(1, 20)]).departure_at(t(0));
    let response = solve(&timetable, &request);

    assert_eq!(response.paths.len(), 1);
    let path = &response.paths[0];
    assert_eq!(path.arrival_time, t(180));
    assert_eq!(path.transfers, 0);
    // Board 60s + ride 60s + walk 20s
    assert_eq!(path.cost, Cost::new(14_000));
    assert_eq!(path.legs.len(), 3);
    assert!(matches!(path.legs[0], Leg::Access(_)));
    assert_eq!(
        path.legs[1].to_string(),
        "Transit { trip: t1, 0 -> 1, 00:01:40 - 00:02:40 $12000 }"
    );
    assert!(matches!(path.legs[2], Leg::Egress(_)));
    assert_eq!(response.stats.stop_reason, StopReason::Completed);
}

#[test]
fn access_leg_departs_just_in_time() {
    let mut builder = stops(2);
    trip(&mut builder, "t1", &[(0, 1000), (1, 1100)]);
    let timetable = builder.build().unwrap();

    let request = SearchRequest::new(vec![walk(0, 120)], vec![walk(1, 0)]).departure_at(t(0));
    let response = solve(&timetable, &request);

    let path = &response.paths[0];
    // 1000 - 60s board slack - 120s walk
    assert_eq!(path.departure_time, t(820));
    assert_eq!(path.legs[0].departure_time(), t(820));
    assert_eq!(path.legs[0].arrival_time(), t(940));
}

#[test]
fn transfer_path_kept_when_faster() {
    let timetable = transfer_network(1000);
    let request = SearchRequest::new(vec![walk(0, 0)], vec![walk(3, 0)]).departure_at(t(0));
    let response = solve(&timetable, &request);

    assert_eq!(response.paths.len(), 2);
    let via = &response.paths[0];
    assert_eq!(via.arrival_time, t(800));
    assert_eq!(via.transfers, 1);
    assert_eq!(via.cost, Cost::new(82_000));
    assert_eq!(via.rounds(), 2);
    assert!(matches!(via.legs[2], Leg::Transfer(_)));
    assert_eq!(via.legs[2].cost(), Cost::new(30_000));

    let direct = &response.paths[1];
    assert_eq!(direct.arrival_time, t(1000));
    assert_eq!(direct.transfers, 0);
    assert_eq!(direct.rounds(), 1);
}

#[test]
fn transfer_path_dropped_when_dominated() {
    let timetable = transfer_network(700);
    let request = SearchRequest::new(vec![walk(0, 0)], vec![walk(3, 0)]).departure_at(t(0));
    let response = solve(&timetable, &request);

    assert_eq!(response.paths.len(), 1);
    assert_eq!(response.paths[0].arrival_time, t(700));
    assert_eq!(response.paths[0].transfers, 0);
}

#[test]
fn journey_may_end_with_a_transfer() {
    let timetable = transfer_network(1000);
    let request = SearchRequest::new(vec![walk(0, 0)], vec![walk(2, 0)]).departure_at(t(0));
    let response = solve(&timetable, &request);

    assert_eq!(response.paths.len(), 1);
    let path = &response.paths[0];
    assert_eq!(path.arrival_time, t(500));
    assert_eq!(path.transfers, 0);
    let kinds: Vec<_> = path
        .legs
        .iter()
        .map(|leg| match leg {
            Leg::Access(_) => "access",
            Leg::Transit(_) => "transit",
            Leg::Transfer(_) => "transfer",
            Leg::Egress(_) => "egress",
        })
        .collect();
    assert_eq!(kinds, vec!["access", "transit", "transfer", "egress"]);
}

#[test]
fn round_limit_gives_empty_result() {
    let timetable = chain_network();
    let request = SearchRequest::new(vec![walk(0, 0)], vec![walk(3, 0)])
        .departure_at(t(0))
        .max_rounds(1);
    let response = solve(&timetable, &request);

    assert!(response.is_empty());
    assert!(response.stats.round_limit_reached);
    assert_eq!(response.stats.stop_reason, StopReason::Completed);
}

#[test]
fn enough_rounds_find_the_chain() {
    let timetable = chain_network();
    let request = SearchRequest::new(vec![walk(0, 0)], vec![walk(3, 0)])
        .departure_at(t(0))
        .max_transfers(2);
    let response = solve(&timetable, &request);

    assert_eq!(response.paths.len(), 1);
    assert_eq!(response.paths[0].transfers, 2);
    assert_eq!(response.paths[0].rounds(), 3);
    assert_eq!(response.paths[0].arrival_time, t(600));
}

#[test]
fn unreachable_destination_is_not_an_error() {
    let mut builder = stops(3);
    trip(&mut builder, "t1", &[(0, 100), (1, 200)]);
    let timetable = builder.build().unwrap();

    let request = SearchRequest::new(vec![walk(0, 0)], vec![walk(2, 0)]).departure_at(t(0));
    let response = solve(&timetable, &request);
    assert!(response.is_empty());
    assert_eq!(response.stats.stop_reason, StopReason::Completed);
}

#[test]
fn walking_alone_is_not_a_journey() {
    let mut builder = stops(2);
    trip(&mut builder, "t1", &[(0, 100), (1, 200)]);
    let timetable = builder.build().unwrap();

    let request = SearchRequest::new(vec![walk(1, 0)], vec![walk(1, 0)]).departure_at(t(0));
    assert!(solve(&timetable, &request).is_empty());
}

#[test]
fn board_slack_is_respected() {
    let mut builder = stops(2);
    trip(&mut builder, "t1", &[(0, 30), (1, 90)]);
    let timetable = builder.build().unwrap();
    let request = SearchRequest::new(vec![walk(0, 0)], vec![walk(1, 0)]).departure_at(t(0));

    assert!(solve(&timetable, &request).is_empty());

    let config = RaptorConfig {
        board_slack: Duration::ZERO,
        ..Default::default()
    };
    let response = solve_with(&timetable, config, &request);
    assert_eq!(response.paths.len(), 1);
    assert_eq!(response.paths[0].departure_time, t(30));
}

#[test]
fn cost_keeps_slower_cheaper_egress() {
    let mut builder = stops(2);
    trip(&mut builder, "t1", &[(0, 100), (1, 160)]);
    let timetable = builder.build().unwrap();

    let taxi = AccessEgress::new(1, secs(10), Cost::new(100_000));
    let egress = vec![walk(1, 20), taxi];
    let request = SearchRequest::new(vec![walk(0, 0)], egress.clone()).departure_at(t(0));
    let response = solve(&timetable, &request);
    assert_eq!(response.paths.len(), 2);
    assert_eq!(response.paths[0].arrival_time, t(170));
    assert_eq!(response.paths[1].arrival_time, t(180));

    let request = SearchRequest::new(vec![walk(0, 0)], egress)
        .departure_at(t(0))
        .criteria(CriteriaSet::arrival_and_transfers());
    let response = solve(&timetable, &request);
    assert_eq!(response.paths.len(), 1);
    assert_eq!(response.paths[0].arrival_time, t(170));
}

#[test]
fn service_filter_skips_trips() {
    let mut builder = stops(2);
    builder.add_trip(
        "weekday",
        0,
        vec![Call::at(0, t(100)), Call::at(1, t(200))],
    );
    builder.add_trip(
        "sunday",
        1,
        vec![Call::at(0, t(300)), Call::at(1, t(400))],
    );
    let timetable = builder.build().unwrap();
    assert_eq!(timetable.service_count(), 2);

    let request = SearchRequest::new(vec![walk(0, 0)], vec![walk(1, 0)])
        .departure_at(t(0))
        .services([1]);
    let response = solve(&timetable, &request);
    assert_eq!(response.paths.len(), 1);
    let transit = response.paths[0].transit_legs().next().unwrap();
    assert_eq!(transit.trip_id, "sunday");

    let request = SearchRequest::new(vec![walk(0, 0)], vec![walk(1, 0)])
        .departure_at(t(0))
        .services([]);
    assert!(solve(&timetable, &request).is_empty());

    // Unknown services are ignored.
    let request = SearchRequest::new(vec![walk(0, 0)], vec![walk(1, 0)])
        .departure_at(t(0))
        .services([0, 7]);
    let response = solve(&timetable, &request);
    assert_eq!(response.paths.len(), 1);
    let transit = response.paths[0].transit_legs().next().unwrap();
    assert_eq!(transit.trip_id, "weekday");
}

#[test]
fn trips_past_midnight() {
    let mut builder = stops(2);
    trip(&mut builder, "night", &[(0, 90_000), (1, 90_600)]);
    let timetable = builder.build().unwrap();

    let request =
        SearchRequest::new(vec![walk(0, 0)], vec![walk(1, 60)]).departure_at(t(89_000));
    let response = solve(&timetable, &request);
    assert_eq!(response.paths[0].arrival_time.to_hms_string(), "25:11:00");
}

#[test]
fn cancelled_request_returns_partial_result() {
    let timetable = chain_network();
    let token = CancellationToken::new();
    token.cancel();
    let request = SearchRequest::new(vec![walk(0, 0)], vec![walk(3, 0)])
        .departure_window(t(0), t(300))
        .departure_step(secs(60))
        .cancellation(token);
    let response = solve(&timetable, &request);

    assert!(response.is_empty());
    assert_eq!(response.stats.stop_reason, StopReason::Cancelled);
    assert_eq!(response.stats.offsets, 6);
    assert_eq!(response.stats.offsets_completed, 0);
}

#[test]
fn passed_deadline_is_a_soft_stop() {
    let timetable = chain_network();
    let request = SearchRequest::new(vec![walk(0, 0)], vec![walk(3, 0)])
        .departure_at(t(0))
        .deadline(Instant::now());
    let response = solve(&timetable, &request);
    assert_eq!(response.stats.stop_reason, StopReason::DeadlineExceeded);
}

#[test]
fn malformed_requests_are_rejected() {
    let timetable = chain_network();
    let engine = timetable.raptor();
    let base = || SearchRequest::new(vec![walk(0, 0)], vec![walk(3, 0)]).departure_at(t(0));

    let err = engine
        .solve(&SearchRequest::new(vec![], vec![walk(3, 0)]))
        .unwrap_err();
    assert_eq!(err, raptor::Error::EmptyAccess);
    assert!(err.is_invalid_input());

    let err = engine
        .solve(&SearchRequest::new(vec![walk(0, 0)], vec![]))
        .unwrap_err();
    assert_eq!(err, raptor::Error::EmptyEgress);

    let err = engine
        .solve(&base().departure_window(t(500), t(100)))
        .unwrap_err();
    assert_eq!(
        err,
        raptor::Error::InvalidWindow {
            start: t(500),
            end: t(100)
        }
    );

    let err = engine
        .solve(
            &base()
                .departure_window(t(0), t(100))
                .departure_step(Duration::ZERO),
        )
        .unwrap_err();
    assert_eq!(err, raptor::Error::ZeroDepartureStep);

    let none = CriteriaSet {
        arrival_time: false,
        cost: false,
        transfers: false,
        departure_time: true,
        distinct_departures: true,
    };
    let err = engine.solve(&base().criteria(none)).unwrap_err();
    assert_eq!(err, raptor::Error::NoActiveCriteria);

    let err = engine.solve(&base().max_rounds(0)).unwrap_err();
    assert_eq!(err, raptor::Error::ZeroRounds);
    assert!(!err.is_data_integrity());
}

#[test]
fn out_of_range_stops_are_data_integrity_errors() {
    let timetable = chain_network();
    let request = SearchRequest::new(vec![walk(0, 0)], vec![walk(42, 0)]).departure_at(t(0));
    let err = timetable.raptor().solve(&request).unwrap_err();
    assert_eq!(
        err,
        raptor::Error::StopOutOfRange {
            kind: "Egress",
            stop: 42,
            count: 4
        }
    );
    assert!(err.is_data_integrity());
    assert!(!err.is_invalid_input());
}

#[test]
fn same_request_same_result() {
    let timetable = grid_network(5, 600);
    let request = SearchRequest::new(vec![walk(0, 60), walk(1, 120)], vec![walk(24, 30)])
        .departure_window(t(6 * 3600), t(6 * 3600 + 1800))
        .departure_step(secs(300));

    let first = solve(&timetable, &request);
    let second = solve(&timetable, &request);
    assert!(!first.is_empty());
    assert_eq!(first.paths, second.paths);

    let sequential = solve_with(&timetable, sequential(), &request);
    assert_eq!(first.paths, sequential.paths);
    assert_eq!(first.stats, sequential.stats);
}

#[test]
fn paths_are_causal_and_consistent() {
    let timetable = grid_network(5, 600);
    let config = RaptorConfig::default();
    let start = t(6 * 3600);
    let request = SearchRequest::new(
        vec![walk(0, 60), walk(1, 120)],
        vec![walk(24, 30), walk(23, 0)],
    )
    .departure_window(start, start + Duration::from_minutes(30))
    .departure_step(secs(300));
    let response = solve_with(&timetable, config.clone(), &request);
    assert!(!response.is_empty());

    for path in &response.paths {
        assert!(path.departure_time >= start);
        assert!(matches!(path.legs.first(), Some(Leg::Access(_))));
        assert!(matches!(path.legs.last(), Some(Leg::Egress(_))));
        assert_eq!(path.departure_time, path.legs[0].departure_time());
        assert_eq!(path.arrival_time, path.legs[path.legs.len() - 1].arrival_time());
        assert_eq!(path.cost, path.legs.iter().map(Leg::cost).sum::<Cost>());
        assert_eq!(path.rounds(), path.transfers as usize + 1);
        assert!(path.rounds() <= config.max_rounds);

        for pair in path.legs.windows(2) {
            let (previous, next) = (&pair[0], &pair[1]);
            assert!(next.departure_time() >= previous.arrival_time(), "{path}");
            if next.is_transit() {
                assert!(
                    next.departure_time() >= previous.arrival_time() + config.board_slack,
                    "{path}"
                );
            }
            assert!(!(matches!(previous, Leg::Transfer(_)) && matches!(next, Leg::Transfer(_))));
        }
    }
}

#[test]
fn result_is_mutually_non_dominated() {
    let timetable = grid_network(4, 300);
    let request = SearchRequest::new(vec![walk(0, 0)], vec![walk(15, 0)])
        .departure_window(t(6 * 3600), t(6 * 3600 + 1200))
        .departure_step(secs(120));
    let response = solve(&timetable, &request);
    assert!(!response.is_empty());

    let set = CriteriaSet::default().across_departures();
    for (i, a) in response.paths.iter().enumerate() {
        for (j, b) in response.paths.iter().enumerate() {
            if i != j {
                assert!(
                    !a.criteria().compare(&b.criteria(), &set).no_worse(),
                    "{a}\nkeeps\n{b}"
                );
            }
        }
    }
}

#[test]
fn oversized_round_limits_are_rejected() {
    let timetable = chain_network();
    let engine = timetable.raptor();
    let base = || SearchRequest::new(vec![walk(0, 0)], vec![walk(3, 0)]).departure_at(t(0));

    let err = engine.solve(&base().max_rounds(usize::MAX)).unwrap_err();
    assert_eq!(
        err,
        raptor::Error::RoundLimitTooLarge {
            rounds: usize::MAX,
            max: raptor::MAX_ROUNDS
        }
    );
    assert!(err.is_invalid_input());
    assert!(engine.solve(&base().max_transfers(usize::MAX)).is_err());

    let response = engine.solve(&base().max_rounds(raptor::MAX_ROUNDS)).unwrap();
    assert_eq!(response.paths.len(), 1);
}

#[test]
fn access_to_egress_stop_does_not_hide_transit() {
    // The origin can also walk to the egress stop, but walking alone is not
    // a journey, so the ride plus transfer must survive.
    let mut builder = stops(3);
    trip(&mut builder, "t1", &[(0, 100), (1, 200)]);
    builder.add_transfer(1, 2, secs(100), Cost::from_seconds(secs(100)));
    let timetable = builder.build().unwrap();

    let request = SearchRequest::new(vec![walk(0, 0), walk(2, 50)], vec![walk(2, 0)])
        .departure_at(t(0));
    let response = solve(&timetable, &request);

    assert_eq!(response.paths.len(), 1);
    let path = &response.paths[0];
    assert_eq!(path.arrival_time, t(300));
    assert_eq!(path.transfers, 0);
    assert!(matches!(path.legs[2], Leg::Transfer(_)));
}
