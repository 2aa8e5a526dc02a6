//! Browser-facing HTTP surface: HTML pages, form handlers and health.

pub mod pages;
mod routes;

pub use routes::{router, AppState};
