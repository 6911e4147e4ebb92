//! Phono API service
//!
//! HTTP backend for cataloguing vinyl records: the shared record catalog,
//! each user's collection of owned copies, and comments on records.

pub mod config;
pub mod error;
pub mod jwt;
pub mod middleware;
pub mod models;
pub mod password;
pub mod repositories;
pub mod routes;
pub mod state;
pub mod validation;

pub use state::AppState;
