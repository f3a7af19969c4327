//! Reverie — background self-reflection engine
//!
//! A single cooperative worker periodically synthesizes short templated
//! reflections, scores them with randomized attributes, persists them to an
//! append-only log and nudges a small state vector based on the result.
//!
//! - `context`: time/activity classification and quiet hours
//! - `generator`: template tables, content assembly, attribute scoring
//! - `reflection`: the immutable record type and its category set
//! - `state`: engine state, update rules and the durable store
//! - `store`: append-only log plus per-record documents
//! - `engine`: controller surface and the scheduler loop

pub mod config;
pub mod context;
pub mod engine;
pub mod generator;
pub mod reflection;
pub mod state;
pub mod store;
