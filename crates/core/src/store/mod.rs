//! In-memory user store.
//!
//! [`UserState`] is plain data with a pure reducer over [`UserAction`].
//! [`UserStore`] wraps it for sharing across handlers, drives the load
//! lifecycle against a [`crate::UserDirectory`], and notifies
//! [`StoreObserver`]s after every transition.
//!
//! # Load lifecycle
//!
//! ```text
//! idle --load--> loading --ok--> loaded
//!                loading --err--> idle (error set)
//! loaded --load--> loading
//! ```
//!
//! Local mutations (add, update, delete) apply in any status and never
//! touch the status fields.

mod state;
mod user_store;

pub use state::{LoadStatus, UserAction, UserState};
pub use user_store::{StoreObserver, UserStore};
