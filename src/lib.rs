//! meshpipe - filter pipelines for triangle-mesh geometry
//!
//! meshpipe keeps scientific data in a hierarchical, path-addressed store
//! and transforms it with filters: self-describing units of work that
//! validate their inputs up front (preflight) and then apply their changes
//! all-or-nothing (execute). Filters are chained into pipelines.
//!
//! # Architecture
//!
//! - [`core`] - Data paths, objects, the store, geometry, config
//! - [`codec`] - Mesh readers (STL, OFF), the container format, XDMF
//! - [`filter`] - Filter contract, parameters, diagnostics, staged changes
//! - [`filters`] - Built-in filters
//! - [`engine`] - Pipelines, failure policies, pipeline files
//! - [`cli`] - The `mpipe` command-line interface
//!
//! # Correctness Invariants
//!
//! 1. Every object in the store is reachable by exactly one path
//! 2. Preflight never modifies the store
//! 3. A filter's changes are applied completely or not at all
//! 4. Problems are reported as diagnostics with stable numeric codes

pub mod cli;
pub mod codec;
pub mod core;
pub mod engine;
pub mod filter;
pub mod filters;
