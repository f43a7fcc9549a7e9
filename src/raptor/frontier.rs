use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::shared::{Cost, Time};

/// The criteria that take part in dominance checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CriteriaSet {
    pub arrival_time: bool,
    pub cost: bool,
    pub transfers: bool,
    /// Later is better. Only meaningful when comparing journeys that may have
    /// left at different times, so it is off inside a single departure run.
    pub departure_time: bool,
    /// Two journeys equal on every other criterion are both kept when they
    /// leave at different times.
    pub distinct_departures: bool,
}

impl Default for CriteriaSet {
    fn default() -> Self {
        Self {
            arrival_time: true,
            cost: true,
            transfers: true,
            departure_time: false,
            distinct_departures: false,
        }
    }
}

impl CriteriaSet {
    pub const fn arrival_and_transfers() -> Self {
        Self {
            arrival_time: true,
            cost: false,
            transfers: true,
            departure_time: false,
            distinct_departures: false,
        }
    }

    pub const fn is_empty(&self) -> bool {
        !(self.arrival_time || self.cost || self.transfers || self.departure_time)
    }

    pub const fn with_departure_time(mut self, departure_time: bool) -> Self {
        self.departure_time = departure_time;
        self
    }

    /// Compares journeys from different departure offsets: a later departure
    /// is better but does not win on its own.
    pub const fn across_departures(self) -> Self {
        self.with_departure_time(true).with_distinct_departures(true)
    }

    pub const fn with_distinct_departures(mut self, distinct: bool) -> Self {
        self.distinct_departures = distinct;
        self
    }

    /// Drops the departure criteria, which only apply across offsets.
    pub const fn for_single_departure(self) -> Self {
        self.with_departure_time(false).with_distinct_departures(false)
    }

    pub const fn without_transfers(mut self) -> Self {
        self.transfers = false;
        self
    }
}

/// Outcome of comparing `a` against `b`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dominance {
    Dominates,
    DominatedBy,
    Equal,
    Incomparable,
}

impl Dominance {
    /// `a` is at least as good as `b` on every active criterion.
    pub fn no_worse(self) -> bool {
        matches!(self, Dominance::Dominates | Dominance::Equal)
    }
}

/// Accumulates per criterion comparisons into a [`Dominance`].
#[derive(Debug, Default, Clone, Copy)]
pub struct DominanceBuilder {
    better: bool,
    worse: bool,
}

impl DominanceBuilder {
    /// Records a criterion where the lower value wins.
    pub fn lower<T: Ord>(mut self, a: T, b: T) -> Self {
        match a.cmp(&b) {
            Ordering::Less => self.better = true,
            Ordering::Greater => self.worse = true,
            Ordering::Equal => {}
        }
        self
    }

    /// Records a criterion where the higher value wins.
    pub fn higher<T: Ord>(self, a: T, b: T) -> Self {
        self.lower(b, a)
    }

    pub fn lower_if<T: Ord>(self, active: bool, a: T, b: T) -> Self {
        if active { self.lower(a, b) } else { self }
    }

    pub fn higher_if<T: Ord>(self, active: bool, a: T, b: T) -> Self {
        if active { self.higher(a, b) } else { self }
    }

    pub fn build(self) -> Dominance {
        match (self.better, self.worse) {
            (true, false) => Dominance::Dominates,
            (false, true) => Dominance::DominatedBy,
            (false, false) => Dominance::Equal,
            (true, true) => Dominance::Incomparable,
        }
    }
}

/// The values compared for stop arrivals, destination arrivals and paths.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Criteria {
    pub departure_time: Time,
    pub arrival_time: Time,
    pub cost: Cost,
    pub transfers: u32,
}

impl Criteria {
    pub fn new(arrival_time: Time, cost: Cost, transfers: u32) -> Self {
        Self {
            departure_time: Time::default(),
            arrival_time,
            cost,
            transfers,
        }
    }

    pub fn compare(&self, other: &Self, set: &CriteriaSet) -> Dominance {
        let outcome = DominanceBuilder::default()
            .lower_if(set.arrival_time, self.arrival_time, other.arrival_time)
            .lower_if(set.cost, self.cost, other.cost)
            .lower_if(set.transfers, self.transfers, other.transfers);
        if set.distinct_departures
            && self.departure_time != other.departure_time
            && outcome.build() == Dominance::Equal
        {
            return Dominance::Incomparable;
        }
        outcome
            .higher_if(set.departure_time, self.departure_time, other.departure_time)
            .build()
    }
}

/// Anything that can be kept in a [`ParetoFront`].
pub trait ParetoItem {
    fn compare(&self, other: &Self, set: &CriteriaSet) -> Dominance;
}

impl ParetoItem for Criteria {
    fn compare(&self, other: &Self, set: &CriteriaSet) -> Dominance {
        Criteria::compare(self, other, set)
    }
}

/// Which of two items equal on every active criterion survives.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TieBreak {
    /// The item inserted first stays, the newcomer is rejected.
    #[default]
    KeepFirst,
    /// The newcomer replaces the equal item.
    KeepLast,
}

/// A set of mutually non-dominated items.
///
/// Insertion order is preserved, which keeps iteration and therefore the
/// whole search deterministic.
#[derive(Debug, Clone)]
pub struct ParetoFront<T> {
    elements: Vec<T>,
    set: CriteriaSet,
    tie_break: TieBreak,
}

impl<T: ParetoItem> Default for ParetoFront<T> {
    fn default() -> Self {
        Self::new(CriteriaSet::default(), TieBreak::default())
    }
}

impl<T: ParetoItem> ParetoFront<T> {
    pub fn new(set: CriteriaSet, tie_break: TieBreak) -> Self {
        Self {
            elements: Vec::new(),
            set,
            tie_break,
        }
    }

    pub fn criteria(&self) -> &CriteriaSet {
        &self.set
    }

    /// True when `item` would make it into the front.
    pub fn accepts(&self, item: &T) -> bool {
        self.elements.iter().all(|old| {
            match item.compare(old, &self.set) {
                Dominance::DominatedBy => false,
                Dominance::Equal => self.tie_break == TieBreak::KeepLast,
                Dominance::Dominates | Dominance::Incomparable => true,
            }
        })
    }

    /// True when some member is no worse than `item` on every active criterion.
    pub fn dominates(&self, item: &T) -> bool {
        self.elements
            .iter()
            .any(|old| old.compare(item, &self.set).no_worse())
    }

    /// Inserts `item` unless a member dominates it, dropping every member
    /// it dominates. Returns whether the item was added.
    pub fn insert(&mut self, item: T) -> bool {
        if !self.accepts(&item) {
            return false;
        }
        let set = self.set;
        self.elements.retain(|old| {
            !matches!(
                item.compare(old, &set),
                Dominance::Dominates | Dominance::Equal
            )
        });
        self.elements.push(item);
        true
    }

    pub fn merge_with<I: IntoIterator<Item = T>>(&mut self, items: I) {
        for item in items {
            self.insert(item);
        }
    }
}

impl<T> ParetoFront<T> {
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn clear(&mut self) {
        self.elements.clear();
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.elements.iter()
    }

    pub fn into_vec(self) -> Vec<T> {
        self.elements
    }
}

impl<T> IntoIterator for ParetoFront<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.elements.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a ParetoFront<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.elements.iter()
    }
}

#[test]
fn equal_items_keep_first() {
    let mut front = ParetoFront::new(CriteriaSet::default(), TieBreak::KeepFirst);
    let a = Criteria::new(Time::from_seconds(10), Cost::new(5), 0);
    assert!(front.insert(a));
    assert!(!front.insert(a));
    assert_eq!(front.len(), 1);
}

#[test]
fn equal_items_keep_last() {
    let mut front = ParetoFront::new(CriteriaSet::default(), TieBreak::KeepLast);
    let a = Criteria::new(Time::from_seconds(10), Cost::new(5), 0);
    assert!(front.insert(a));
    assert!(front.insert(a));
    assert_eq!(front.len(), 1);
}

#[test]
fn departure_time_prefers_later() {
    let set = CriteriaSet::default().with_departure_time(true);
    let mut early = Criteria::new(Time::from_seconds(100), Cost::new(5), 0);
    early.departure_time = Time::from_seconds(10);
    let mut late = early;
    late.departure_time = Time::from_seconds(20);
    assert_eq!(late.compare(&early, &set), Dominance::Dominates);
    assert_eq!(early.compare(&late, &set), Dominance::DominatedBy);
    assert_eq!(
        early.compare(&late, &CriteriaSet::default()),
        Dominance::Equal
    );
}

#[test]
fn later_departure_alone_does_not_dominate() {
    let set = CriteriaSet::default().across_departures();
    let mut early = Criteria::new(Time::from_seconds(100), Cost::new(5), 0);
    early.departure_time = Time::from_seconds(10);
    let mut late = early;
    late.departure_time = Time::from_seconds(20);
    assert_eq!(late.compare(&early, &set), Dominance::Incomparable);
    assert_eq!(early.compare(&early, &set), Dominance::Equal);

    let mut faster = late;
    faster.arrival_time = Time::from_seconds(90);
    assert_eq!(faster.compare(&early, &set), Dominance::Dominates);

    let mut front = ParetoFront::new(set, TieBreak::KeepFirst);
    assert!(front.insert(early));
    assert!(front.insert(late));
    assert!(!front.insert(early));
    assert_eq!(front.len(), 2);
    assert!(front.insert(faster));
    assert_eq!(front.len(), 1);
}

#[test]
fn default_front_uses_default_criteria() {
    let mut front = ParetoFront::<Criteria>::default();
    assert_eq!(front.criteria(), &CriteriaSet::default());
    assert!(front.insert(Criteria::new(Time::from_seconds(10), Cost::new(5), 0)));
    assert!(!front.insert(Criteria::new(Time::from_seconds(10), Cost::new(6), 0)));
    assert_eq!(front.len(), 1);
}
