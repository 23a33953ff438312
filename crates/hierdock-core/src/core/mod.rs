//! # Core Module
//!
//! Building blocks shared by every docking protocol.
//!
//! - **Body Representation** ([`models`]) - Rigid bodies, residues, transforms and symmetry
//! - **Transform Sampling** ([`sampling`]) - The multi-resolution sampling hierarchies
//! - **Scoring** ([`scoring`]) - Score tables, weights and interface summaries
//! - **File I/O** ([`io`]) - Body readers and structure dumpers
//! - **Utilities** ([`utils`]) - Geometry helpers and the spatial point index

pub mod io;
pub mod models;
pub mod sampling;
pub mod scoring;
pub mod utils;
