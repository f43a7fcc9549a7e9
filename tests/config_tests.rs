mod common;

use common::*;
use rangeraptor::prelude::*;

#[test]
fn empty_document_gives_defaults() {
    let config: RaptorConfig = serde_json::from_str("{}").unwrap();
    assert_eq!(config, RaptorConfig::default());
    assert_eq!(config.board_slack, secs(60));
    assert_eq!(config.max_rounds, 8);
    assert_eq!(config.merge.departure, DepartureRule::KeepDistinct);
    assert_eq!(config.merge.tie_break, TieBreak::KeepFirst);
}

#[test]
fn partial_document_keeps_other_defaults() {
    let config: RaptorConfig = serde_json::from_str(
        r#"{
            "max_rounds": 3,
            "board_slack": 30,
            "criteria": { "cost": false },
            "cost": { "transfer_cost": 500, "wait_reluctance": 2.5 },
            "merge": { "tie_break": "KeepLast" }
        }"#,
    )
    .unwrap();
    assert_eq!(config.max_rounds, 3);
    assert_eq!(config.board_slack, secs(30));
    assert!(config.criteria.arrival_time);
    assert!(!config.criteria.cost);
    assert!(config.criteria.transfers);
    assert_eq!(config.cost.transfer_cost, Cost::new(500));
    assert_eq!(config.cost.wait_reluctance, 2.5);
    assert_eq!(config.cost.board_cost, CostConfig::default().board_cost);
    assert_eq!(config.merge.tie_break, TieBreak::KeepLast);
    assert_eq!(config.merge.departure, DepartureRule::KeepDistinct);
    assert!(config.parallel);
}

#[test]
fn departure_rule_reads_by_name() {
    let config: RaptorConfig =
        serde_json::from_str(r#"{ "merge": { "departure": "PreferLater" } }"#).unwrap();
    assert_eq!(config.merge.departure, DepartureRule::PreferLater);
    assert_eq!(config.merge.tie_break, TieBreak::KeepFirst);
}

#[test]
fn config_serializes_back() {
    let config = RaptorConfig {
        max_rounds: 4,
        parallel: false,
        ..Default::default()
    };
    let json = serde_json::to_string(&config).unwrap();
    let back: RaptorConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(config, back);
}

#[test]
fn transfer_cost_is_charged_per_transfer() {
    let timetable = transfer_network(1000);
    let request = SearchRequest::new(vec![walk(0, 0)], vec![walk(3, 0)]).departure_at(t(0));
    let config = RaptorConfig {
        cost: CostConfig {
            transfer_cost: Cost::new(5_000),
            ..Default::default()
        },
        ..Default::default()
    };
    let response = solve_with(&timetable, config, &request);
    let via = response
        .paths
        .iter()
        .find(|path| path.transfers == 1)
        .unwrap();
    assert_eq!(via.cost, Cost::new(87_000));
    let direct = response
        .paths
        .iter()
        .find(|path| path.transfers == 0)
        .unwrap();
    assert_eq!(direct.cost, Cost::new(96_000));
}

#[test]
fn response_serializes() {
    let timetable = chain_network();
    let request = SearchRequest::new(vec![walk(0, 0)], vec![walk(3, 0)]).departure_at(t(0));
    let response = solve(&timetable, &request);
    let json = serde_json::to_value(&response).unwrap();
    assert_eq!(json["paths"][0]["arrival_time"], 600);
    assert_eq!(json["paths"][0]["transfers"], 2);
    assert_eq!(json["stats"]["stop_reason"], "Completed");
    assert!(json["paths"][0]["legs"][1]["Transit"]["trip_id"].is_string());
}
