//! Core types for User Directory.
//!
//! This module provides the user record shape and its type-safe id.

pub mod id;
pub mod user;

pub use id::UserId;
pub use user::{Address, Company, User};
