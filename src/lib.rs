//! hwsnap - bounded, filterable snapshot of host hardware state
//!
//! Walks a curated set of `/proc` and `/sys` paths (or, on hosts without
//! them, runs a few diagnostic commands) and turns every visited entry into a
//! uniform [`record::Record`]. Reads are capped per file and across the run,
//! content is classified as text or binary, and every failure is recorded
//! instead of aborting the run.

pub mod budget;
pub mod capture;
pub mod classify;
pub mod cli;
pub mod commands;
pub mod config;
pub mod emitter;
pub mod filter;
pub mod json_output;
pub mod platform;
pub mod record;
pub mod snapshot;
pub mod text_output;
pub mod traversal;
