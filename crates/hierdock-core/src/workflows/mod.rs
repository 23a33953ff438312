//! # Workflows Module
//!
//! Complete docking protocols, the public entry points of the library.
//!
//! ## Overview
//!
//! Each workflow validates its configuration, builds a default sampling hierarchy when none is
//! given, runs the hierarchical search with its protocol evaluator, removes redundant
//! placements and assembles a labeled [`result::DockResult`] with per-interface score
//! breakdowns. The top models can optionally be written through a structure dumper.
//!
//! ## Architecture
//!
//! - **Plug Workflow** ([`plug`]) - A monomer docked into the hole of a cyclic oligomer
//! - **Cyclic Workflow** ([`cyclic`]) - A monomer assembled into a cyclic oligomer
//! - **Cage Workflow** ([`cage`]) - Two or three cyclic components assembled into a T, O or I cage
//! - **Results** ([`result`]) - The persistable result table and its provenance

pub(crate) mod assembly;
pub mod cage;
pub mod cyclic;
pub mod plug;
pub mod result;
