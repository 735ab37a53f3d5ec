//! Line of sight tracing and the rules that govern it

pub mod result;
pub mod rules;
pub mod scenario;
pub mod status;
pub mod trace;

pub use result::{Blockage, Hindrance, HindranceKind, LosResult};
pub use scenario::{GameQueries, NoCounters, Oba, ScenarioState, Smoke, Vehicle};
pub use status::LosStatus;
