//! User Directory Core - user model and in-memory user store.
//!
//! This crate holds everything that neither touches the network nor renders
//! HTML. It is shared by:
//! - `web` - The server-rendered user-management page
//! - `integration-tests` - End-to-end tests against a stub directory
//!
//! # Architecture
//!
//! The core crate contains types, the store and the traits at its seams -
//! no HTTP clients, no templates. The remote directory is reached through
//! the [`UserDirectory`] port, which the web crate implements with `reqwest`.
//!
//! # Modules
//!
//! - [`types`] - User record shape and the type-safe [`UserId`]
//! - [`store`] - Collection state, reducer, observers and the load lifecycle
//! - [`directory`] - The remote directory port and its error type
//! - [`ids`] - Id allocation strategies for locally created users

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod directory;
pub mod ids;
pub mod store;
pub mod types;

pub use directory::{DirectoryError, UserDirectory};
pub use ids::{ClockIds, IdAllocator, SequentialIds};
pub use store::{LoadStatus, StoreObserver, UserAction, UserState, UserStore};
pub use types::*;
