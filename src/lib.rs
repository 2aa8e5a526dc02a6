//! Sports clip search service library.
//!
//! This library exposes the core modules for integration testing while
//! keeping the actual binary entry point in main.rs.

pub mod catalog;
pub mod config;
pub mod error;
pub mod keepalive;
pub mod metrics;
pub mod notice;
pub mod orchestrator;
pub mod presenter;
pub mod search;
pub mod session;
pub mod web;
