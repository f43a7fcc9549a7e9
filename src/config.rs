use serde::{Deserialize, Serialize};

use crate::{
    raptor::{CriteriaSet, TieBreak},
    shared::{Cost, CostFactor, Duration},
};

/// Engine wide tuning, plus the defaults used when a request leaves a
/// parameter unset.
///
/// Every field has a default so a partial document deserializes cleanly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RaptorConfig {
    /// Minimum time between arriving at a stop and boarding a trip there.
    pub board_slack: Duration,
    /// Default round limit, one round per transit leg.
    pub max_rounds: usize,
    /// Default width of the departure window.
    pub search_window: Duration,
    /// Default distance between two departure offsets in the window.
    pub departure_step: Duration,
    /// Criteria used when the request does not pick its own.
    pub criteria: CriteriaSet,
    pub cost: CostConfig,
    pub merge: MergePolicy,
    /// Run route scans and departure offsets on the rayon pool.
    pub parallel: bool,
}

impl Default for RaptorConfig {
    fn default() -> Self {
        Self {
            board_slack: Duration::from_seconds(60),
            max_rounds: 8,
            search_window: Duration::from_minutes(60),
            departure_step: Duration::from_minutes(1),
            criteria: CriteriaSet::default(),
            cost: CostConfig::default(),
            merge: MergePolicy::default(),
            parallel: true,
        }
    }
}

/// Generalized cost parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CostConfig {
    /// Added on every boarding.
    pub board_cost: Cost,
    /// Added on every boarding after the first one.
    pub transfer_cost: Cost,
    /// Weight of time spent waiting at a stop between two transit legs.
    pub wait_reluctance: f64,
    /// Weight of time spent on board.
    pub transit_reluctance: f64,
}

impl Default for CostConfig {
    fn default() -> Self {
        Self {
            board_cost: Cost::from_seconds(Duration::from_minutes(1)),
            transfer_cost: Cost::ZERO,
            wait_reluctance: 1.0,
            transit_reluctance: 1.0,
        }
    }
}

/// How the results of separate departure offsets are merged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MergePolicy {
    /// How departure time takes part when comparing journeys of different
    /// offsets.
    pub departure: DepartureRule,
    /// Which of two equally good journeys to keep.
    pub tie_break: TieBreak,
}

impl Default for MergePolicy {
    fn default() -> Self {
        Self {
            departure: DepartureRule::KeepDistinct,
            tie_break: TieBreak::KeepFirst,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DepartureRule {
    /// A later departure is better, but journeys equal on every other
    /// criterion are all kept when they leave at different times.
    #[default]
    KeepDistinct,
    /// A later departure is better, also when it is the only difference.
    PreferLater,
    /// Departure time is not compared.
    Ignore,
}

impl DepartureRule {
    pub const fn apply(self, set: CriteriaSet) -> CriteriaSet {
        match self {
            DepartureRule::KeepDistinct => set.across_departures(),
            DepartureRule::PreferLater => set.for_single_departure().with_departure_time(true),
            DepartureRule::Ignore => set.for_single_departure(),
        }
    }
}

/// [`CostConfig`] converted to integer factors once per request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CostModel {
    pub board_cost: Cost,
    pub transfer_cost: Cost,
    pub wait: CostFactor,
    pub transit: CostFactor,
}

impl From<&CostConfig> for CostModel {
    fn from(value: &CostConfig) -> Self {
        Self {
            board_cost: value.board_cost,
            transfer_cost: value.transfer_cost,
            wait: CostFactor::from_reluctance(value.wait_reluctance),
            transit: CostFactor::from_reluctance(value.transit_reluctance),
        }
    }
}
