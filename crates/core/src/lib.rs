//! Core closure logic for Clausura.
//!
//! This crate contains pure business logic with ZERO web or database
//! dependencies. All domain types, rule evaluation, and the closure state
//! machine live here.
//!
//! # Modules
//!
//! - `period` - Fiscal period facts, state resolution, steps, validation gates
//! - `closure` - Closure rules, state machine, forced-closure auditing
//! - `store` - Storage traits and the in-memory reference implementation
//! - `clock` - Clock abstraction so "now" is always an explicit input

pub mod clock;
pub mod closure;
pub mod period;
pub mod store;
