//! User Directory web library.
//!
//! Server-rendered user-management page over a [`user_directory_core::UserStore`]:
//! a card grid, the three dialog flows (details, create/edit form, delete
//! confirmation) and a live-update stream. Exposed as a library so the
//! binary and the integration tests build the same router.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod components;
pub mod config;
pub mod directory;
pub mod error;
pub mod filters;
pub mod live;
pub mod routes;
pub mod state;
