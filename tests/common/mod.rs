#![allow(dead_code)]

use rangeraptor::prelude::*;
use tracing_subscriber::EnvFilter;

/// Installs a subscriber that writes through the test harness.
/// Use `RUST_LOG=rangeraptor=trace` to see the rounds.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn t(secs: u32) -> Time {
    Time::from_seconds(secs)
}

pub fn secs(secs: u32) -> Duration {
    Duration::from_seconds(secs)
}

pub fn walk(stop: u32, duration: u32) -> AccessEgress {
    AccessEgress::walk(stop, secs(duration))
}

/// Adds a trip that leaves each stop as soon as it arrives.
pub fn trip(builder: &mut TimetableBuilder, id: &str, calls: &[(u32, u32)]) {
    builder.add_trip(
        id,
        0,
        calls
            .iter()
            .map(|&(stop, time)| Call::at(stop, t(time)))
            .collect(),
    );
}

/// A builder holding stops `s0..s{count}`.
pub fn stops(count: u32) -> TimetableBuilder {
    let mut builder = TimetableBuilder::new();
    for i in 0..count {
        builder.add_stop(&format!("s{i}"), &format!("Stop {i}"));
    }
    builder
}

pub fn sequential() -> RaptorConfig {
    RaptorConfig {
        parallel: false,
        ..Default::default()
    }
}

pub fn solve(timetable: &Timetable, request: &SearchRequest) -> RaptorResponse {
    init_tracing();
    timetable
        .raptor()
        .solve(request)
        .expect("request should be valid")
}

pub fn solve_with(
    timetable: &Timetable,
    config: RaptorConfig,
    request: &SearchRequest,
) -> RaptorResponse {
    init_tracing();
    timetable
        .raptor()
        .with_config(config)
        .solve(request)
        .expect("request should be valid")
}

/// Stops a, x, y, d. Route 1 runs a -> x, route 2 runs y -> d and a
/// 300 second walk links x to y. A direct route runs a -> d.
pub fn transfer_network(direct_arrival: u32) -> Timetable {
    let mut builder = stops(4);
    trip(&mut builder, "r1", &[(0, 100), (1, 200)]);
    trip(&mut builder, "r2", &[(2, 600), (3, 800)]);
    trip(&mut builder, "direct", &[(0, 100), (3, direct_arrival)]);
    builder.add_transfer(1, 2, secs(300), Cost::from_seconds(secs(300)));
    builder.build().expect("valid timetable")
}

/// Stops 0..4 chained by three routes meeting at stops 1 and 2.
pub fn chain_network() -> Timetable {
    let mut builder = stops(4);
    trip(&mut builder, "first", &[(0, 100), (1, 200)]);
    trip(&mut builder, "second", &[(1, 300), (2, 400)]);
    trip(&mut builder, "third", &[(2, 500), (3, 600)]);
    builder.build().expect("valid timetable")
}

/// A `size` x `size` grid of stops with a line along every row and every
/// column running every `headway` seconds from 06:00 for two hours.
pub fn grid_network(size: u32, headway: u32) -> Timetable {
    let mut builder = stops(size * size);
    let hop = 120;
    let first = 6 * 3600;
    for line in 0..size {
        let row: Vec<u32> = (0..size).map(|i| line * size + i).collect();
        let column: Vec<u32> = (0..size).map(|i| i * size + line).collect();
        for (name, pattern) in [("row", row), ("column", column)] {
            let mut start = first;
            while start < first + 2 * 3600 {
                let calls: Vec<(u32, u32)> = pattern
                    .iter()
                    .enumerate()
                    .map(|(i, &stop)| (stop, start + i as u32 * hop))
                    .collect();
                trip(&mut builder, &format!("{name}{line}@{start}"), &calls);
                start += headway;
            }
        }
    }
    builder.build().expect("valid timetable")
}
