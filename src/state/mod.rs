//! Persistent agent state
//!
//! The only state kept across boots is the run-once marker.

mod marker;

pub use marker::RunMarker;
