//! Integration tests for User Directory.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p user-directory-integration-tests
//! ```
//!
//! Every test starts its own stub directory and its own application on
//! ephemeral loopback ports, so tests run in parallel and need no network.
//!
//! # Test Categories
//!
//! - `http_directory` - the reqwest-backed directory client
//! - `user_page` - list, dialogs and mutations through the router
//! - `live_updates` - the server-sent event stream

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Router;
use axum::routing::get;
use reqwest::Client;
use tokio::sync::Notify;
use url::Url;

use user_directory_core::SequentialIds;
use user_directory_web::config::DirectoryConfig;
use user_directory_web::directory::HttpUserDirectory;
use user_directory_web::routes;
use user_directory_web::state::AppState;

/// Two records in the remote directory's shape, with keys the model ignores.
pub const TWO_USERS: &str = r#"[
  {
    "id": 1,
    "name": "Leanne Graham",
    "username": "Bret",
    "email": "Sincere@april.biz",
    "address": {
      "street": "Kulas Light",
      "suite": "Apt. 556",
      "city": "Gwenborough",
      "zipcode": "92998-3874",
      "geo": { "lat": "-37.3159", "lng": "81.1496" }
    },
    "phone": "1-770-736-8031 x56442",
    "website": "hildegard.org",
    "company": {
      "name": "Romaguera-Crona",
      "catchPhrase": "Multi-layered client-server neural-net",
      "bs": "harness real-time e-markets"
    }
  },
  {
    "id": 2,
    "name": "Ervin Howell",
    "username": "Antonette",
    "email": "Shanna@melissa.tv",
    "address": {
      "street": "Victor Plains",
      "suite": "Suite 879",
      "city": "Wisokyburgh",
      "zipcode": "90566-7771",
      "geo": { "lat": "-43.9509", "lng": "-34.4618" }
    },
    "phone": "010-692-6593 x09125",
    "website": "anastasia.net",
    "company": {
      "name": "Deckow-Crist",
      "catchPhrase": "Proactive didactic contingency",
      "bs": "synergize scalable supply-chains"
    }
  }
]"#;

/// What the stub directory answers with.
#[derive(Debug, Clone)]
pub struct StubResponse {
    pub status: StatusCode,
    pub body: String,
}

impl StubResponse {
    #[must_use]
    pub fn ok(body: &str) -> Self {
        Self {
            status: StatusCode::OK,
            body: body.to_string(),
        }
    }

    #[must_use]
    pub fn status(status: StatusCode) -> Self {
        Self {
            status,
            body: String::new(),
        }
    }
}

#[derive(Debug)]
struct StubInner {
    response: Mutex<StubResponse>,
    /// When set, each request waits for one `release()`.
    gate: Option<Notify>,
}

/// Remote directory stand-in served over real HTTP.
#[derive(Debug, Clone)]
pub struct StubDirectory {
    inner: Arc<StubInner>,
    url: Url,
}

impl StubDirectory {
    /// Serve `response` at `/users` immediately.
    pub async fn serve(response: StubResponse) -> Self {
        Self::start(response, None).await
    }

    /// Serve `response` at `/users`, holding each request until released.
    pub async fn gated(response: StubResponse) -> Self {
        Self::start(response, Some(Notify::new())).await
    }

    async fn start(response: StubResponse, gate: Option<Notify>) -> Self {
        let inner = Arc::new(StubInner {
            response: Mutex::new(response),
            gate,
        });
        let app = Router::new()
            .route("/users", get(stub_users))
            .with_state(Arc::clone(&inner));
        let addr = spawn_server(app).await;
        let url = Url::parse(&format!("http://{addr}/users")).unwrap();
        Self { inner, url }
    }

    #[must_use]
    pub const fn url(&self) -> &Url {
        &self.url
    }

    /// Answer later requests with `response`.
    pub fn set_response(&self, response: StubResponse) {
        *self.inner.response.lock().unwrap() = response;
    }

    /// Let one held request through.
    pub fn release(&self) {
        if let Some(gate) = &self.inner.gate {
            gate.notify_one();
        }
    }
}

async fn stub_users(State(inner): State<Arc<StubInner>>) -> impl IntoResponse {
    if let Some(gate) = &inner.gate {
        gate.notified().await;
    }
    let response = inner.response.lock().unwrap().clone();
    (
        response.status,
        [("content-type", "application/json")],
        response.body,
    )
}

async fn spawn_server(app: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

/// A running application wired to a stub directory.
#[derive(Debug)]
pub struct TestContext {
    pub client: Client,
    pub base_url: String,
    pub state: AppState,
    pub directory: StubDirectory,
}

impl TestContext {
    /// Start the application against `directory`.
    ///
    /// New users get ids from 1000 upward (or above the largest id held).
    pub async fn start(directory: StubDirectory) -> Self {
        let config = DirectoryConfig::local(directory.url().clone());
        let http = HttpUserDirectory::new(&config).unwrap();
        let state = AppState::new(
            config,
            Arc::new(http),
            Arc::new(SequentialIds::starting_at(1000)),
        );
        let addr = spawn_server(routes::app(state.clone())).await;

        let client = Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .unwrap();

        Self {
            client,
            base_url: format!("http://{addr}"),
            state,
            directory,
        }
    }

    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// GET `path` and return status and body.
    pub async fn get(&self, path: &str) -> (StatusCode, String) {
        let response = self.client.get(self.url(path)).send().await.unwrap();
        let status = response.status();
        (status, response.text().await.unwrap())
    }

    /// POST a form to `path` and return the raw response.
    pub async fn post_form(&self, path: &str, fields: &[(&str, &str)]) -> reqwest::Response {
        self.client
            .post(self.url(path))
            .form(fields)
            .send()
            .await
            .unwrap()
    }

    /// Poll the list page until its body contains `needle`.
    pub async fn wait_for_page(&self, needle: &str) -> String {
        for _ in 0..100 {
            let (_, body) = self.get("/").await;
            if body.contains(needle) {
                return body;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        panic!("page never contained {needle:?}");
    }

    /// Start against a directory serving [`TWO_USERS`] and wait for them.
    pub async fn loaded() -> Self {
        let ctx = Self::start(StubDirectory::serve(StubResponse::ok(TWO_USERS)).await).await;
        ctx.wait_for_page("Ervin Howell").await;
        ctx
    }
}
