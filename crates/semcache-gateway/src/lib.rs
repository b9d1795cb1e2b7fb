//! HTTP surface for the semcache semantic cache gateway.
//!
//! `semcache-core` defines the cache decision itself; this crate wires it to
//! an axum server: request/response shaping (`responder`), the upstream
//! provider client (`upstream`), process configuration (`config`), and
//! routing/health/readiness (`gateway`).

pub mod config;
pub mod gateway;
pub mod responder;
pub mod upstream;
