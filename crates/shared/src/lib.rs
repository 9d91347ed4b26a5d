//! Shared errors, configuration, and token types for SalesDesk.
//!
//! This crate provides common types used across all other crates:
//! - Application-wide error types
//! - Configuration management
//! - JWT claims and the token service

pub mod auth;
pub mod config;
pub mod error;
pub mod jwt;

pub use auth::{Claims, LoginRequest, LoginResponse};
pub use config::AppConfig;
pub use error::AppError;
pub use jwt::{JwtConfig, JwtError, JwtService};
