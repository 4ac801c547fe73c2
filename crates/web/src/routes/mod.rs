//! HTTP route handlers for the user directory.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                    - User list, no dialog
//! GET  /health              - Health check
//! GET  /events              - Store transitions (SSE)
//! POST /reload              - Refetch the collection
//!
//! # Users
//! GET  /users/new           - List with the create form open
//! POST /users               - Create (422 re-renders the form)
//! GET  /users/{id}          - List with the details dialog open
//! POST /users/{id}          - Update (422 re-renders the form)
//! GET  /users/{id}/edit     - List with the edit form open
//! GET  /users/{id}/delete   - List with the delete confirmation open
//! POST /users/{id}/delete   - Delete
//! ```

pub mod users;

use std::time::Duration;

use axum::{
    Router,
    http::{Request, Response, Uri},
    routing::{get, post},
};
use tower_http::services::ServeDir;
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

use crate::error::AppError;
use crate::live;
use crate::state::AppState;

/// User page routes.
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users", post(users::create))
        .route("/users/new", get(users::new_form))
        .route("/users/{id}", get(users::show).post(users::update))
        .route("/users/{id}/edit", get(users::edit_form))
        .route(
            "/users/{id}/delete",
            get(users::confirm_delete).post(users::delete),
        )
}

/// All page and API routes, without middleware.
pub fn routes() -> Router<AppState> {
    Router::new()
        // List page
        .route("/", get(users::index))
        .merge(user_routes())
        // Manual refetch
        .route("/reload", post(users::reload))
        // Live updates
        .route("/events", get(live::events))
}

/// Build the complete application with state, static assets and tracing.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .merge(routes())
        .nest_service(
            "/static",
            ServeDir::new(concat!(env!("CARGO_MANIFEST_DIR"), "/static")),
        )
        .fallback(not_found)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(|response: &Response<_>, latency: Duration, span: &Span| {
                    span.record("status", response.status().as_u16());
                    span.record(
                        "latency_ms",
                        u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                    );
                    DefaultOnResponse::default().on_response(response, latency, span);
                }),
        )
        .with_state(state)
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check the directory.
async fn health() -> &'static str {
    "ok"
}

async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(uri.path().to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::body::{Body, to_bytes};
    use axum::http::{StatusCode, header};
    use tower::ServiceExt;
    use url::Url;
    use user_directory_core::{
        DirectoryError, SequentialIds, User, UserDirectory, UserId,
    };

    use super::*;
    use crate::config::DirectoryConfig;

    /// Directory that never answers, so the store stays as tests leave it.
    struct PendingDirectory;

    #[async_trait]
    impl UserDirectory for PendingDirectory {
        async fn fetch_all(&self) -> Result<Vec<User>, DirectoryError> {
            std::future::pending().await
        }
    }

    fn test_state() -> AppState {
        let config = DirectoryConfig::local(Url::parse("http://127.0.0.1:9/users").unwrap());
        let state = AppState::new(
            config,
            Arc::new(PendingDirectory),
            Arc::new(SequentialIds::starting_at(100)),
        );
        // Claim the initial load so pages render the store as seeded here.
        assert!(state.store().begin_initial_load());
        let mut ann = User::blank(UserId::new(1));
        ann.name = "Ann Lee".to_string();
        ann.username = "ann".to_string();
        state.store().add_user(ann);
        state
    }

    async fn body_text(response: axum::response::Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn get_req(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn post_form(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let response = app(test_state()).oneshot(get_req("/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "ok");
    }

    #[tokio::test]
    async fn test_index_lists_users_without_dialog() {
        let response = app(test_state()).oneshot(get_req("/")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_text(response).await;
        assert!(body.contains("Ann Lee"));
        assert!(body.contains("@ann"));
        assert!(!body.contains("role=\"dialog\""));
    }

    #[tokio::test]
    async fn test_details_dialog_for_known_user() {
        let response = app(test_state()).oneshot(get_req("/users/1")).await.unwrap();
        let body = body_text(response).await;
        assert!(body.contains("role=\"dialog\""));
        assert!(body.contains("User Details"));
    }

    #[tokio::test]
    async fn test_dialog_for_missing_user_renders_plain_list() {
        let response = app(test_state())
            .oneshot(get_req("/users/999/edit"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(!body_text(response).await.contains("role=\"dialog\""));
    }

    #[tokio::test]
    async fn test_new_form_is_seeded_with_next_id() {
        let response = app(test_state()).oneshot(get_req("/users/new")).await.unwrap();
        let body = body_text(response).await;
        assert!(body.contains("Add New User"));
        assert!(body.contains("name=\"id\" value=\"100\""));
    }

    #[tokio::test]
    async fn test_create_redirects_and_stores_user() {
        let state = test_state();
        let response = app(state.clone())
            .oneshot(post_form(
                "/users",
                "id=7&name=Bo&username=bo&email=bo%40example.com&phone=555",
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/");
        assert_eq!(state.store().find(UserId::new(7)).unwrap().name, "Bo");
    }

    #[tokio::test]
    async fn test_create_without_id_allocates_distinct_ids() {
        let state = test_state();
        for _ in 0..2 {
            let response = app(state.clone())
                .oneshot(post_form(
                    "/users",
                    "name=Bo&username=bo&email=bo%40e.c&phone=5",
                ))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::SEE_OTHER);
        }

        let ids: Vec<i64> = state
            .store()
            .snapshot()
            .users
            .iter()
            .map(|u| u.id.as_i64())
            .collect();
        assert_eq!(ids, vec![1, 100, 101]);
    }

    #[tokio::test]
    async fn test_create_with_taken_or_blank_id_allocates_fresh_one() {
        let state = test_state();
        for body in [
            "id=1&name=Bo&username=bo&email=bo%40e.c&phone=5",
            "id=&name=Cy&username=cy&email=cy%40e.c&phone=6",
        ] {
            let response = app(state.clone())
                .oneshot(post_form("/users", body))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::SEE_OTHER);
        }

        let snapshot = state.store().snapshot();
        assert_eq!(snapshot.find(UserId::new(1)).unwrap().name, "Ann Lee");
        assert_eq!(snapshot.find(UserId::new(100)).unwrap().name, "Bo");
        assert_eq!(snapshot.find(UserId::new(101)).unwrap().name, "Cy");
    }

    #[tokio::test]
    async fn test_create_with_blank_required_field_is_rejected() {
        let state = test_state();
        let response = app(state.clone())
            .oneshot(post_form("/users", "id=7&name=Bo&username=&email=&phone=555"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = body_text(response).await;
        assert!(body.contains("Please fill in: Username, Email"));
        assert!(state.store().find(UserId::new(7)).is_none());
    }

    #[tokio::test]
    async fn test_update_uses_path_id() {
        let state = test_state();
        let response = app(state.clone())
            .oneshot(post_form(
                "/users/1",
                "id=55&name=Ann+B&username=ann&email=a%40b.c&phone=1",
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(state.store().find(UserId::new(1)).unwrap().name, "Ann B");
        assert!(state.store().find(UserId::new(55)).is_none());
    }

    #[tokio::test]
    async fn test_delete_removes_user() {
        let state = test_state();
        let response = app(state.clone())
            .oneshot(post_form("/users/1/delete", ""))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert!(state.store().find(UserId::new(1)).is_none());
    }

    #[tokio::test]
    async fn test_unknown_path_is_not_found() {
        let response = app(test_state()).oneshot(get_req("/nope")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
