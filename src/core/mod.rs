//! core
//!
//! Core domain types for meshpipe.
//!
//! # Modules
//!
//! - [`path`] - `DataPath`, the address of an object in the store
//! - [`object`] - Arrays, attribute matrices, groups and geometries
//! - [`geometry`] - Triangle geometry and its validation
//! - [`store`] - `DataStructure`, the hierarchical object store
//! - [`config`] - Configuration schema and loading
//! - [`fsio`] - Atomic file writes
//!
//! # Design Principles
//!
//! - Strong typing prevents invalid states at compile time
//! - Objects are owned by the store and addressed only by path
//! - All validation is deterministic

pub mod config;
pub mod fsio;
pub mod geometry;
pub mod object;
pub mod path;
pub mod store;
