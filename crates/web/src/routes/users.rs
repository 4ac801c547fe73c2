//! User list page and its dialog flows.
//!
//! Every GET renders the full page: the card grid plus, at most, one open
//! dialog chosen by the route. Every POST dispatches one store mutation and
//! redirects back to the plain list, which closes the dialog.

use askama::Template;
use axum::{
    Form,
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use tracing::instrument;

use user_directory_core::UserId;

use crate::components::{
    Dialog, DialogFrame, DialogView, FormMode, UserCardView, UserDraft, UserFormView,
};
use crate::error::Result;
use crate::filters;
use crate::state::AppState;

/// User list page template.
#[derive(Template)]
#[template(path = "users/index.html")]
pub struct UsersIndexTemplate {
    pub users: Vec<UserCardView>,
    /// Nothing has loaded yet and a fetch is in flight.
    pub show_loading: bool,
    /// A reload is in flight while earlier cards stay visible.
    pub refreshing: bool,
    pub error: Option<String>,
    pub dialog: Option<DialogView>,
    pub frame: Option<DialogFrame>,
    pub source_url: String,
}

/// Render the page with `dialog` open (or none).
fn render_page(state: &AppState, dialog: Option<DialogView>) -> Result<Html<String>> {
    state.ensure_initial_load();

    let snapshot = state.store().snapshot();
    let template = UsersIndexTemplate {
        users: snapshot.users.iter().map(UserCardView::from).collect(),
        show_loading: snapshot.shows_loading_indicator(),
        refreshing: snapshot.loading && snapshot.loaded,
        error: snapshot.error,
        frame: dialog.as_ref().map(DialogView::frame),
        dialog,
        source_url: state.config().source_url.to_string(),
    };

    Ok(Html(template.render()?))
}

fn render_dialog(state: &AppState, dialog: Dialog) -> Result<Html<String>> {
    let view = dialog.resolve(state.store(), state.ids());
    if view.is_none() && dialog != Dialog::Closed {
        tracing::debug!(?dialog, "dialog target not in store, rendering list");
    }
    render_page(state, view)
}

/// Re-render the form with the blank required fields listed.
fn reject_draft(state: &AppState, mode: FormMode, draft: UserDraft) -> Result<Response> {
    let form = UserFormView::rejected(mode, draft);
    tracing::info!(missing = ?form.missing, "rejected user form");
    let page = render_page(state, Some(DialogView::Form(form)))?;
    Ok((StatusCode::UNPROCESSABLE_ENTITY, page).into_response())
}

/// GET /
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Result<Html<String>> {
    render_dialog(&state, Dialog::Closed)
}

/// GET /users/{id}
#[instrument(skip(state))]
pub async fn show(State(state): State<AppState>, Path(id): Path<i64>) -> Result<Html<String>> {
    render_dialog(&state, Dialog::Viewing(UserId::new(id)))
}

/// GET /users/new
#[instrument(skip(state))]
pub async fn new_form(State(state): State<AppState>) -> Result<Html<String>> {
    render_dialog(&state, Dialog::Creating)
}

/// GET /users/{id}/edit
#[instrument(skip(state))]
pub async fn edit_form(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Html<String>> {
    render_dialog(&state, Dialog::Editing(UserId::new(id)))
}

/// GET /users/{id}/delete
#[instrument(skip(state))]
pub async fn confirm_delete(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Html<String>> {
    render_dialog(&state, Dialog::ConfirmingDelete(UserId::new(id)))
}

/// POST /users
///
/// A posted id is kept only if no stored user holds it; otherwise the user
/// gets a fresh id from the allocator.
#[instrument(skip(state, draft), fields(id = draft.id))]
pub async fn create(State(state): State<AppState>, Form(draft): Form<UserDraft>) -> Result<Response> {
    if !draft.missing_required().is_empty() {
        return reject_draft(&state, FormMode::Create, draft);
    }

    let store = state.store();
    let id = match draft.id.map(UserId::new) {
        Some(id) if store.find(id).is_none() => id,
        posted => {
            let fresh = state.ids().next_id(store.max_id());
            tracing::debug!(?posted, %fresh, "allocated id for new user");
            fresh
        }
    };

    store.add_user(draft.into_user(id));
    tracing::info!(%id, "user added");
    Ok(Redirect::to("/").into_response())
}

/// POST /users/{id}
///
/// The path id wins over the posted one; an id the store does not hold is
/// a silent no-op.
#[instrument(skip(state, draft))]
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Form(mut draft): Form<UserDraft>,
) -> Result<Response> {
    draft.id = Some(id);
    if !draft.missing_required().is_empty() {
        return reject_draft(&state, FormMode::Edit, draft);
    }

    state.store().update_user(draft.into_user(UserId::new(id)));
    tracing::info!("user updated");
    Ok(Redirect::to("/").into_response())
}

/// POST /users/{id}/delete
///
/// Only reachable from the confirmation dialog's "Yes" button.
#[instrument(skip(state))]
pub async fn delete(State(state): State<AppState>, Path(id): Path<i64>) -> Redirect {
    state.store().delete_user(UserId::new(id));
    tracing::info!("user deleted");
    Redirect::to("/")
}

/// POST /reload
#[instrument(skip(state))]
pub async fn reload(State(state): State<AppState>) -> Redirect {
    state.spawn_load();
    Redirect::to("/")
}
