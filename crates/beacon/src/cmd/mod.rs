//! Command implementations for the Beacon CLI

pub mod ops;
pub mod serve;
