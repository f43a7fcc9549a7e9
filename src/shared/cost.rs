use std::{
    fmt::Display,
    iter::Sum,
    ops::{Add, AddAssign, Sub},
};

use serde::{Deserialize, Serialize};

use crate::shared::Duration;

/// Number of cost units one second is worth at a reluctance of `1.0`.
pub const UNITS_PER_SECOND: u32 = 100;

/// Generalized cost, measured in centi-seconds.
///
/// Fares, time penalties and rider preferences are all folded into this one
/// scalar so that it can be compared like any other criterion.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Cost(u32);

impl Cost {
    pub const ZERO: Cost = Cost(0);

    pub const fn new(units: u32) -> Self {
        Self(units)
    }

    pub const fn as_units(&self) -> u32 {
        self.0
    }

    /// The cost of spending `duration` at reluctance `1.0`.
    pub const fn from_seconds(duration: Duration) -> Self {
        Self(duration.as_seconds() * UNITS_PER_SECOND)
    }

    pub const fn weighted(duration: Duration, factor: CostFactor) -> Self {
        Self(duration.as_seconds().saturating_mul(factor.0))
    }
}

impl From<u32> for Cost {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl Add for Cost {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for Cost {
    fn add_assign(&mut self, rhs: Self) {
        self.0 = self.0.saturating_add(rhs.0)
    }
}

impl Sub for Cost {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0.saturating_sub(rhs.0))
    }
}

impl Sum for Cost {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Cost::ZERO, |acc, cost| acc + cost)
    }
}

impl Display for Cost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "${}", self.0)
    }
}

/// A reluctance expressed as cost units per second.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct CostFactor(u32);

impl CostFactor {
    pub const fn per_second(units: u32) -> Self {
        Self(units)
    }

    pub fn from_reluctance(reluctance: f64) -> Self {
        let units = (reluctance.max(0.0) * UNITS_PER_SECOND as f64).round();
        Self(units as u32)
    }

    pub const fn as_units(&self) -> u32 {
        self.0
    }
}

#[test]
fn reluctance_to_factor() {
    assert_eq!(CostFactor::from_reluctance(1.0).as_units(), 100);
    assert_eq!(CostFactor::from_reluctance(1.5).as_units(), 150);
    assert_eq!(CostFactor::from_reluctance(-2.0).as_units(), 0);
}

#[test]
fn weighted_cost() {
    let factor = CostFactor::from_reluctance(2.0);
    let cost = Cost::weighted(Duration::from_minutes(1), factor);
    assert_eq!(cost, Cost::new(12_000));
    assert_eq!(Cost::from_seconds(Duration::from_seconds(3)), Cost::new(300));
}
