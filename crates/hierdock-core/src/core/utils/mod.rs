pub mod geometry;
pub mod spatial;
