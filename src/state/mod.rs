//! State management module
//!
//! Handles cursor tracking and persistence between sync runs.
//!
//! # Overview
//!
//! The state module provides:
//! - `CursorTracker` - Per-stream high-water mark over a cursor field
//! - `State` - Connector state: one cursor mapping per stream
//! - `StateManager` - File-based state persistence

mod manager;
mod tracker;
mod types;

pub use manager::StateManager;
pub use tracker::CursorTracker;
pub use types::State;

#[cfg(test)]
mod tests;
