//! # Engine Module
//!
//! The search machinery shared by every docking protocol.
//!
//! ## Overview
//!
//! A search walks the transform hierarchy from its coarsest level down. Each level's candidates
//! are scored by a protocol-specific [`evaluators::Evaluator`], the best survivors are expanded
//! into their children, and the final level is reduced to a non-redundant set of placements.
//!
//! ## Architecture
//!
//! - **Configuration** ([`config`]) - Validated search parameters and their builder
//! - **Candidate Batches** ([`batch`]) - Structure-of-arrays storage for one level
//! - **Evaluators** ([`evaluators`]) - Per-placement clash checks, trimming and interface scores
//! - **Beam Search** ([`search`]) - The coarse-to-fine driver
//! - **Redundancy Filter** ([`redundancy`]) - Greedy de-duplication of final placements
//! - **Trimming** ([`trim`]) - Validation of trimmed residue ranges
//! - **Progress Monitoring** ([`progress`]) - Callback-based progress reporting
//! - **Error Handling** ([`error`]) - Engine-level error aggregation

pub mod batch;
pub mod config;
pub mod error;
pub mod evaluators;
pub mod progress;
pub mod redundancy;
pub mod search;
pub mod trim;
