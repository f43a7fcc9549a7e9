//! Multi-criteria Range-RAPTOR over an in-memory timetable.
//!
//! Build a [`timetable::Timetable`] once with a [`timetable::TimetableBuilder`],
//! then answer any number of [`raptor::SearchRequest`]s against it with a
//! [`raptor::Raptor`] engine.
pub mod config;
pub mod prelude;
pub mod raptor;
pub mod shared;
pub mod timetable;
