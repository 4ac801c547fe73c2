//! Reusable UI components.
//!
//! View models rendered by the user list page and the dialog primitive
//! shared by its three modal flows.

pub mod dialog;
pub mod user_form;
pub mod user_views;

pub use dialog::{Dialog, DialogFrame, DialogView};
pub use user_form::{FormMode, UserDraft, UserFormView};
pub use user_views::{ConfirmDeleteView, UserCardView, UserDetailsView};
