pub mod competitors;
pub mod games;
pub mod progressions;
