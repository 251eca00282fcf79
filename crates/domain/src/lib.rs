//! # gardenhub-domain
//!
//! Pure domain model for the gardenhub garden management system.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers, error conventions, timestamps
//! - Define the **Garden** aggregate and the **Plants** it owns
//! - Define **value objects** (surface areas, humidity levels, plant types)
//! - Define **domain events** raised by every accepted state transition
//! - Enforce the garden invariants: capacity, humidity range, non-blank names
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;
pub mod time;

pub mod event;
pub mod garden;
pub mod value;
