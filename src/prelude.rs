pub use crate::config::{CostConfig, DepartureRule, MergePolicy, RaptorConfig};
pub use crate::raptor::{
    AccessEgress, CancellationToken, CriteriaSet, Leg, Path, Raptor, RaptorResponse,
    SearchRequest, SearchStats, StopReason, TieBreak,
};
pub use crate::shared::{Cost, Duration, Time};
pub use crate::timetable::{Call, Timetable, TimetableBuilder};
