//! Domain logic for leaderboard record progressions.
//!
//! Pure, I/O-free building blocks: canonical entities, duration text
//! normalization, competitive-unit slug matching, the world-record /
//! personal-record progression computer, the shared bar scale, and
//! current standings.

pub mod duration;
pub mod entities;
pub mod error;
pub mod progression;
pub mod request;
pub mod scale;
pub mod slug;
pub mod standings;
pub mod types;
