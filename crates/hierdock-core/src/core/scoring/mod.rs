//! Residue-pair score tables, score weights and interface summaries.

pub mod summary;
pub mod table;
pub mod weights;
