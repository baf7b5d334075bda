//! Use-case services above the store and the pure placement logic.
//!
//! # Responsibility
//! - Hold session state for presentation layers.
//! - Keep presentation code decoupled from storage details.

pub mod board;
