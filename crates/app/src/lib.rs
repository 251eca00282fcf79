//! # gardenhub-app
//!
//! Application layer: use-cases, **port definitions** (traits) and the
//! integration event publisher.
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement (driven/outbound ports):
//!   - `GardenRepository`: load gardens, with or without their plants
//!   - `UnitOfWork`: commit a [`ChangeSet`](ports::ChangeSet) atomically
//!   - `MessageTransport`: hand one integration message off for delivery
//! - Define the **integration message** contracts consumed by other systems
//! - Translate domain events into messages and dispatch them in order
//!   ([`EventPublisher`](publisher::EventPublisher))
//! - Define **driving/inbound ports** as use-case structs:
//!   - `GardenService`: create, get, list, update, delete gardens
//!   - `PlantService`: add, list, get, update, remove plants
//! - Provide **in-process infrastructure** (broadcast transport) that doesn't need IO
//!
//! ## Dependency rule
//! Depends on `gardenhub-domain` only (plus `tokio::sync` for channels).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod context;
pub mod messages;
pub mod ports;
pub mod publisher;
pub mod services;
pub mod transport;
