//! Travel preference collection.
//!
//! The collector tracks five required fields (departure city, region scope,
//! start date, duration, interests), coerces free-form answers into typed
//! values, and derives the return date. Reaching `Complete` is the signal
//! for the orchestrator to move on to suggestions.

pub mod collector;
pub mod model;
pub mod parse;

pub use collector::{CollectionState, CollectionStatus, PreferenceCollector};
pub use model::{PreferenceField, RegionScope, TravelPreferences};
