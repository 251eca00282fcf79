//! # gardenhub-adapter-http-axum
//!
//! HTTP adapter built on [axum](https://docs.rs/axum).
//!
//! ## Responsibilities
//! - Serve the **garden management JSON API** under `/api/v1/management`
//!   (gardens, and the plants nested under each garden)
//! - Map HTTP requests into application service calls (driving adapter)
//! - Map application results and errors into HTTP responses
//! - Lift the `x-correlation-id` header into the request context so the
//!   published integration messages carry it
//!
//! ## Dependency rule
//! Depends on `gardenhub-app` (for port traits and services) and
//! `gardenhub-domain` (for domain types used in request/response mapping).
//! Never leaks axum types into the domain.

pub mod api;
pub mod error;
pub mod router;
pub mod state;
