mod allocator;
mod arrival;
mod destination;
mod discovery;
mod explorer;
mod frontier;
mod leg;
mod path;
mod range;
mod request;
mod state;
mod worker;

pub(crate) use allocator::Allocator;
pub use arrival::{ArrivalArena, ArrivalId, ArrivalKind, StopArrival};
pub use destination::DestinationArrival;
pub use frontier::*;
pub use leg::*;
pub use path::{Path, sort_paths};
pub use range::{RaptorResponse, SearchStats, StopReason};
pub use request::{CancellationToken, MAX_ROUNDS, SearchRequest, departure_offsets};

use crate::{config::RaptorConfig, shared::Time, timetable::Timetable};
use request::SearchContext;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("The request has no access legs")]
    EmptyAccess,
    #[error("The request has no egress legs")]
    EmptyEgress,
    #[error("Departure window ends at {end} before it starts at {start}")]
    InvalidWindow { start: Time, end: Time },
    #[error("Departure step must be positive for a window wider than one departure")]
    ZeroDepartureStep,
    #[error("At least one of arrival time, cost or transfers must be active")]
    NoActiveCriteria,
    #[error("The round limit must allow at least one transit leg")]
    ZeroRounds,
    #[error("Round limit {rounds} exceeds the maximum of {max}")]
    RoundLimitTooLarge { rounds: usize, max: usize },
    #[error("{kind} leg references stop {stop} but the timetable only has {count} stops")]
    StopOutOfRange {
        kind: &'static str,
        stop: u32,
        count: usize,
    },
    #[error("A path was found but failed to build it")]
    FailedToBuildPath,
}

impl Error {
    /// The request itself was malformed.
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            Error::EmptyAccess
                | Error::EmptyEgress
                | Error::InvalidWindow { .. }
                | Error::ZeroDepartureStep
                | Error::NoActiveCriteria
                | Error::ZeroRounds
                | Error::RoundLimitTooLarge { .. }
        )
    }

    /// The request or the timetable references data that does not exist.
    pub fn is_data_integrity(&self) -> bool {
        matches!(self, Error::StopOutOfRange { .. } | Error::FailedToBuildPath)
    }
}

/// Multi-criteria range RAPTOR over a [`Timetable`].
///
/// The timetable is only read, one engine can serve any number of requests
/// concurrently.
pub struct Raptor<'a> {
    timetable: &'a Timetable,
    config: RaptorConfig,
}

impl<'a> Raptor<'a> {
    pub fn new(timetable: &'a Timetable) -> Self {
        Self {
            timetable,
            config: RaptorConfig::default(),
        }
    }

    pub fn with_config(mut self, config: RaptorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &RaptorConfig {
        &self.config
    }

    /// Finds every non-dominated journey for the request.
    ///
    /// Finding nothing is not an error, the response is simply empty.
    pub fn solve(&self, request: &SearchRequest) -> Result<RaptorResponse, self::Error> {
        let ctx = SearchContext::new(self.timetable, &self.config, request)?;
        debug!(
            "Solving {} access and {} egress legs, {} rounds, {:?}",
            ctx.access.len(),
            ctx.egress.len(),
            ctx.max_rounds,
            ctx.criteria
        );
        range::search(&ctx)
    }
}

impl Timetable {
    /// Shorthand for [`Raptor::new`].
    pub fn raptor(&self) -> Raptor<'_> {
        Raptor::new(self)
    }
}
