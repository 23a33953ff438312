//! # hierdock Core Library
//!
//! Hierarchical search over rigid-body placements of protein bodies. Placements are sampled
//! on a multi-resolution partition of translation × rotation space, scored with residue-pair
//! lookup tables, pruned with a coarse-to-fine beam search and de-duplicated before they are
//! reported.
//!
//! ## Architectural Philosophy
//!
//! The library follows a three-layer layout:
//!
//! - **[`core`]: The Foundation.** Stateless data models (`RigidBody`, `Symmetry`, `CageArch`),
//!   the sampling hierarchies (`XformHier`, `OriCart1Hier`, `MultiAxisHier`), score tables and
//!   weights, and I/O helpers.
//!
//! - **[`engine`]: The Logic Core.** Validated search configuration, per-candidate evaluators
//!   for each docking protocol, the beam-search driver and the redundancy filter.
//!
//! - **[`workflows`]: The Public API.** Complete docking protocols (`plug`, `cyclic`, `cage`)
//!   that tie the engine and core together and assemble a labeled, persistable
//!   [`workflows::result::DockResult`].

pub mod core;
pub mod engine;
pub mod workflows;
