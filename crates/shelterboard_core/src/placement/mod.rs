//! Placement of cats onto the floorplan.
//!
//! # Responsibility
//! - Parse drop-target tokens into structured targets.
//! - Resolve a drop into a placement intent or a silent rejection.
//!
//! # Invariants
//! - This module is the single authority on capacity and divider rules;
//!   presentation code must not re-derive them.

pub mod drop_target;
pub mod resolver;
