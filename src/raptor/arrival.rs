use crate::{
    raptor::frontier::Criteria,
    shared::{Cost, Time},
};

/// Index of a [`StopArrival`] inside an [`ArrivalArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ArrivalId(u32);

impl ArrivalId {
    pub const fn index(&self) -> usize {
        self.0 as usize
    }

    #[cfg(test)]
    pub(crate) const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }
}

/// How a stop was reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrivalKind {
    /// Reached from the origin, `leg` indexes the request's access legs.
    Access { leg: u32 },
    Transit {
        trip_idx: u32,
        route_idx: u32,
        board_stop: u32,
        board_pos: u32,
        alight_pos: u32,
        board_time: Time,
    },
    Transfer { from_stop: u32, transfer_idx: u32 },
}

impl ArrivalKind {
    pub fn is_access(&self) -> bool {
        matches!(self, ArrivalKind::Access { .. })
    }

    pub fn is_transit(&self) -> bool {
        matches!(self, ArrivalKind::Transit { .. })
    }

    pub fn is_transfer(&self) -> bool {
        matches!(self, ArrivalKind::Transfer { .. })
    }
}

/// "Stop reached in a round via a leg from a previous arrival."
///
/// Only access arrivals have no `previous`. A transit arrival sits one round
/// above its predecessor and a transfer arrival shares the round of the
/// transit arrival it leaves from, so following `previous` always terminates.
#[derive(Debug, Clone, Copy)]
pub struct StopArrival {
    pub stop: u32,
    pub round: u32,
    pub arrival_time: Time,
    pub cost: Cost,
    pub transfers: u32,
    pub kind: ArrivalKind,
    pub previous: Option<ArrivalId>,
}

impl StopArrival {
    pub fn criteria(&self) -> Criteria {
        Criteria::new(self.arrival_time, self.cost, self.transfers)
    }
}

/// Append only storage for the arrivals of one departure run.
#[derive(Debug, Clone, Default)]
pub struct ArrivalArena {
    arrivals: Vec<StopArrival>,
}

impl ArrivalArena {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            arrivals: Vec::with_capacity(capacity),
        }
    }

    /// The id the next pushed arrival will get.
    pub fn next_id(&self) -> ArrivalId {
        ArrivalId(self.arrivals.len() as u32)
    }

    pub fn push(&mut self, arrival: StopArrival) -> ArrivalId {
        debug_assert!(
            arrival
                .previous
                .map(|previous| previous.index() < self.arrivals.len())
                .unwrap_or(arrival.kind.is_access()),
            "an arrival may only point back at an existing arrival"
        );
        let id = self.next_id();
        self.arrivals.push(arrival);
        id
    }

    #[inline(always)]
    pub fn get(&self, id: ArrivalId) -> &StopArrival {
        &self.arrivals[id.index()]
    }

    pub fn len(&self) -> usize {
        self.arrivals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arrivals.is_empty()
    }

    pub fn clear(&mut self) {
        self.arrivals.clear();
    }

    /// Walks the chain from `id` back to its access arrival.
    pub fn chain(&self, id: ArrivalId) -> Chain<'_> {
        Chain {
            arena: self,
            next: Some(id),
        }
    }
}

pub struct Chain<'a> {
    arena: &'a ArrivalArena,
    next: Option<ArrivalId>,
}

impl<'a> Iterator for Chain<'a> {
    type Item = &'a StopArrival;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.next?;
        let arrival = self.arena.arrivals.get(id.index())?;
        self.next = arrival.previous;
        Some(arrival)
    }
}

#[test]
fn chain_walks_back_to_access() {
    let mut arena = ArrivalArena::default();
    let access = arena.push(StopArrival {
        stop: 0,
        round: 0,
        arrival_time: Time::from_seconds(10),
        cost: Cost::new(10),
        transfers: 0,
        kind: ArrivalKind::Access { leg: 0 },
        previous: None,
    });
    let transit = arena.push(StopArrival {
        stop: 1,
        round: 1,
        arrival_time: Time::from_seconds(100),
        cost: Cost::new(100),
        transfers: 0,
        kind: ArrivalKind::Transit {
            trip_idx: 0,
            route_idx: 0,
            board_stop: 0,
            board_pos: 0,
            alight_pos: 1,
            board_time: Time::from_seconds(50),
        },
        previous: Some(access),
    });
    let stops: Vec<_> = arena.chain(transit).map(|arrival| arrival.stop).collect();
    assert_eq!(stops, vec![1, 0]);
}
