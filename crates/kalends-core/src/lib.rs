//! Shared configuration, constants, and error types for kalends.

pub mod config;
pub mod constants;
pub mod error;
