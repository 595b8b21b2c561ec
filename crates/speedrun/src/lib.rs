//! speedrun.com leaderboard integration.
//!
//! Provides the HTTP transport, a single-flight paginating gateway over
//! it, raw payload types, normalization into [`bests_core`] entities, and
//! the progression service that assembles per-unit record timelines.

pub mod api;
pub mod gateway;
#[cfg(any(test, feature = "test-support"))]
pub mod memory;
pub mod normalize;
pub mod payload;
pub mod service;
