//! # inv-core
//!
//! Core types, identifier set algebra, and error types for the inventory engine.
//!
//! This crate provides the foundational types shared across all inventory crates:
//! - Resource kinds and the association tables that join them
//! - Entity structs for every resource (products, teams, hostgroups, ...)
//! - The `Resource` trait describing validation, foreign references and association sets
//! - Pure set algebra over numeric identifiers
//! - List filters with pagination and cardinality bounds
//! - The cross-cutting `InventoryError` taxonomy
//! - Caller identity and write intent passed to the policy gate

pub mod entities;
pub mod errors;
pub mod filter;
pub mod identity;
pub mod ids;
pub mod kinds;
pub mod resource;
