//! Stateless validity checks against a metric's current value and recent window.
//!
//! This crate provides:
//! - Null/zero, negative-number, flatline and extreme-value checks
//! - `RuleEngine`, which runs them in a fixed order and collects findings

pub mod checks;
pub mod engine;
pub mod math;

pub use engine::RuleEngine;
