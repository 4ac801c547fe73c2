//! Dialog state and the dialog primitive.
//!
//! At most one dialog is open at a time, so the open dialog is a single
//! tagged [`Dialog`] rather than one flag per flow. The route decides which
//! dialog is open; the dialog frame never decides for itself. Escape and
//! backdrop clicks only *request* a close by navigating to the owner's
//! close target, and a closed dialog renders no markup at all.

use user_directory_core::{IdAllocator, UserId, UserStore};

use super::user_form::UserFormView;
use super::user_views::{ConfirmDeleteView, UserDetailsView};

/// Where a close request navigates to: the plain list.
pub const CLOSE_HREF: &str = "/";

/// Which dialog the page shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialog {
    Closed,
    Viewing(UserId),
    Editing(UserId),
    Creating,
    ConfirmingDelete(UserId),
}

impl Dialog {
    /// Build the dialog's content from the current store.
    ///
    /// A dialog naming a user the store no longer holds resolves to `None`,
    /// i.e. the page renders with no dialog open. Opening the create form
    /// allocates a fresh id every time.
    #[must_use]
    pub fn resolve(self, store: &UserStore, ids: &dyn IdAllocator) -> Option<DialogView> {
        match self {
            Self::Closed => None,
            Self::Viewing(id) => store
                .find(id)
                .map(|user| DialogView::Details(UserDetailsView::from(&user))),
            Self::Editing(id) => store
                .find(id)
                .map(|user| DialogView::Form(UserFormView::edit(&user))),
            Self::Creating => {
                let id = ids.next_id(store.max_id());
                Some(DialogView::Form(UserFormView::create(id)))
            }
            Self::ConfirmingDelete(id) => store
                .find(id)
                .map(|user| DialogView::ConfirmDelete(ConfirmDeleteView::from(&user))),
        }
    }
}

/// Chrome around a dialog body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogFrame {
    pub title: &'static str,
    pub close_href: &'static str,
}

/// Content of the open dialog.
#[derive(Debug, Clone)]
pub enum DialogView {
    Details(UserDetailsView),
    Form(UserFormView),
    ConfirmDelete(ConfirmDeleteView),
}

impl DialogView {
    #[must_use]
    pub const fn frame(&self) -> DialogFrame {
        let title = match self {
            Self::Details(_) => "User Details",
            Self::Form(form) => form.title(),
            Self::ConfirmDelete(_) => "Delete User",
        };
        DialogFrame {
            title,
            close_href: CLOSE_HREF,
        }
    }

    #[must_use]
    pub const fn details(&self) -> Option<&UserDetailsView> {
        match self {
            Self::Details(details) => Some(details),
            _ => None,
        }
    }

    #[must_use]
    pub const fn form(&self) -> Option<&UserFormView> {
        match self {
            Self::Form(form) => Some(form),
            _ => None,
        }
    }

    #[must_use]
    pub const fn confirm_delete(&self) -> Option<&ConfirmDeleteView> {
        match self {
            Self::ConfirmDelete(confirm) => Some(confirm),
            _ => None,
        }
    }
}
