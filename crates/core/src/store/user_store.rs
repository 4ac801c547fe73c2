//! Shared, observable user store.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::instrument;

use super::state::{UserAction, UserState};
use crate::directory::UserDirectory;
use crate::types::{User, UserId};

/// Receives every accepted transition, after it is applied.
///
/// Observers run synchronously while the store is locked, in registration
/// order. They must not call back into the store.
pub trait StoreObserver: Send + Sync {
    fn on_transition(&self, action: &UserAction, state: &UserState);
}

impl<F> StoreObserver for F
where
    F: Fn(&UserAction, &UserState) + Send + Sync,
{
    fn on_transition(&self, action: &UserAction, state: &UserState) {
        self(action, state);
    }
}

/// Single source of truth for the user collection.
///
/// Created once by the composition root and shared behind an `Arc`.
#[derive(Default)]
pub struct UserStore {
    inner: Mutex<Inner>,
    initial_load_claimed: AtomicBool,
}

#[derive(Default)]
struct Inner {
    state: UserState,
    observers: Vec<Arc<dyn StoreObserver>>,
}

impl std::fmt::Debug for UserStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.lock();
        f.debug_struct("UserStore")
            .field("state", &inner.state)
            .field("observers", &inner.observers.len())
            .finish()
    }
}

impl UserStore {
    /// Empty store: no users, not loading, no error.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register an observer for all subsequent transitions.
    pub fn subscribe(&self, observer: Arc<dyn StoreObserver>) {
        self.lock().observers.push(observer);
    }

    /// Clone of the current state.
    #[must_use]
    pub fn snapshot(&self) -> UserState {
        self.lock().state.clone()
    }

    /// First user with `id`, if any.
    #[must_use]
    pub fn find(&self, id: UserId) -> Option<User> {
        self.lock().state.find(id).cloned()
    }

    /// Largest id currently held.
    #[must_use]
    pub fn max_id(&self) -> Option<UserId> {
        self.lock().state.max_id()
    }

    /// Apply an action built from the current state and notify observers.
    fn transition(&self, build: impl FnOnce(&UserState) -> UserAction) -> bool {
        let mut inner = self.lock();
        let action = build(&inner.state);
        let accepted = inner.state.apply(&action);
        if accepted {
            tracing::debug!(action = action.kind(), users = inner.state.users.len(), "store transition");
            for observer in &inner.observers {
                observer.on_transition(&action, &inner.state);
            }
        } else {
            tracing::debug!(action = action.kind(), "discarded stale fetch completion");
        }
        accepted
    }

    /// Apply `action` and notify observers.
    ///
    /// Returns `false` when the action was a stale fetch completion.
    pub fn dispatch(&self, action: UserAction) -> bool {
        self.transition(|_| action)
    }

    /// Append `user`. Duplicate ids are not rejected.
    pub fn add_user(&self, user: User) {
        self.dispatch(UserAction::Add(user));
    }

    /// Replace the first user with `user.id`, in place. No-op if absent.
    pub fn update_user(&self, user: User) {
        self.dispatch(UserAction::Update(user));
    }

    /// Remove every user with `id`. No-op if absent.
    pub fn delete_user(&self, id: UserId) {
        self.dispatch(UserAction::Delete(id));
    }

    /// Returns `true` exactly once per store, to whoever should trigger the
    /// first load.
    pub fn begin_initial_load(&self) -> bool {
        !self.initial_load_claimed.swap(true, Ordering::AcqRel)
    }

    /// Fetch the collection from `directory` and apply the outcome.
    ///
    /// Failures are absorbed into [`UserState::error`]. If another load
    /// starts before this one resolves, this one's outcome is discarded.
    pub async fn load(&self, directory: &dyn UserDirectory) {
        let generation = self.begin_load();
        self.finish_load(generation, directory).await;
    }

    /// First half of [`Self::load`]: enter the loading state now and return
    /// the generation the completion must carry.
    ///
    /// Lets a caller show the loading state before handing the fetch to a
    /// background task.
    pub fn begin_load(&self) -> u64 {
        let mut generation = 0;
        self.transition(|state| {
            generation = state.next_generation();
            UserAction::FetchStarted { generation }
        });
        generation
    }

    /// Second half of [`Self::load`]: fetch and apply the outcome for
    /// `generation`.
    #[instrument(skip(self, directory))]
    pub async fn finish_load(&self, generation: u64, directory: &dyn UserDirectory) {
        let action = match directory.fetch_all().await {
            Ok(users) => {
                tracing::info!(generation, count = users.len(), "fetched users");
                UserAction::FetchSucceeded { generation, users }
            }
            Err(e) => {
                tracing::warn!(generation, error = %e, "failed to fetch users");
                UserAction::FetchFailed {
                    generation,
                    message: e.message().to_string(),
                }
            }
        };

        self.dispatch(action);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use std::collections::VecDeque;

    use async_trait::async_trait;
    use tokio::sync::oneshot;

    use super::*;
    use crate::directory::{DirectoryError, FETCH_FAILED_MESSAGE};

    fn user(id: i64, name: &str) -> User {
        User {
            name: name.to_string(),
            ..User::blank(UserId::new(id))
        }
    }

    /// Directory returning a fixed outcome.
    struct FixedDirectory(Result<Vec<User>, DirectoryError>);

    #[async_trait]
    impl UserDirectory for FixedDirectory {
        async fn fetch_all(&self) -> Result<Vec<User>, DirectoryError> {
            self.0.clone()
        }
    }

    /// Directory whose responses are released by the test, one receiver per
    /// call, in call order.
    struct GatedDirectory {
        responses: Mutex<VecDeque<oneshot::Receiver<Vec<User>>>>,
    }

    #[async_trait]
    impl UserDirectory for GatedDirectory {
        async fn fetch_all(&self) -> Result<Vec<User>, DirectoryError> {
            let next = self.responses.lock().unwrap().pop_front();
            match next {
                Some(rx) => rx
                    .await
                    .map_err(|_| DirectoryError::FetchFailed("gate dropped".to_string())),
                None => Err(DirectoryError::FetchFailed("no response queued".to_string())),
            }
        }
    }

    /// Records `(action kind, loading, user count)` per transition.
    fn recorder(store: &UserStore) -> Arc<Mutex<Vec<(&'static str, bool, usize)>>> {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        store.subscribe(Arc::new(move |action: &UserAction, state: &UserState| {
            sink.lock()
                .unwrap()
                .push((action.kind(), state.loading, state.users.len()));
        }));
        seen
    }

    #[test]
    fn test_new_store_is_empty_and_idle() {
        let store = UserStore::new();
        let state = store.snapshot();
        assert!(state.users.is_empty());
        assert!(!state.loading);
        assert_eq!(state.error, None);
    }

    #[tokio::test]
    async fn test_load_success_passes_through_loading() {
        let store = UserStore::new();
        let seen = recorder(&store);
        let directory = FixedDirectory(Ok(vec![user(1, "Ann"), user(2, "Ben")]));

        store.load(&directory).await;

        let state = store.snapshot();
        assert!(!state.loading);
        assert!(state.loaded);
        let ids: Vec<i64> = state.users.iter().map(|u| u.id.as_i64()).collect();
        assert_eq!(ids, vec![1, 2]);

        let seen = seen.lock().unwrap();
        assert_eq!(
            *seen,
            vec![("fetch_started", true, 0), ("fetch_succeeded", false, 2)]
        );
    }

    #[tokio::test]
    async fn test_load_failure_records_message_and_keeps_users() {
        let store = UserStore::new();
        let directory = FixedDirectory(Err(DirectoryError::FetchFailed(
            FETCH_FAILED_MESSAGE.to_string(),
        )));

        store.load(&directory).await;

        let state = store.snapshot();
        assert!(!state.loading);
        assert_eq!(state.error.as_deref(), Some("Failed to fetch users"));
        assert!(state.users.is_empty());
    }

    #[tokio::test]
    async fn test_failed_reload_does_not_blank_collection() {
        let store = UserStore::new();
        store.load(&FixedDirectory(Ok(vec![user(1, "Ann")]))).await;
        store
            .load(&FixedDirectory(Err(DirectoryError::FetchFailed(
                "connection reset".to_string(),
            ))))
            .await;

        let state = store.snapshot();
        assert_eq!(state.users, vec![user(1, "Ann")]);
        assert_eq!(state.error.as_deref(), Some("connection reset"));
    }

    #[tokio::test]
    async fn test_stale_load_is_discarded() {
        let (first_tx, first_rx) = oneshot::channel();
        let (second_tx, second_rx) = oneshot::channel();
        let directory = GatedDirectory {
            responses: Mutex::new(VecDeque::from([first_rx, second_rx])),
        };
        let store = UserStore::new();

        let mut first = Box::pin(store.load(&directory));
        let mut second = Box::pin(store.load(&directory));
        assert!(futures::poll!(first.as_mut()).is_pending());
        assert!(futures::poll!(second.as_mut()).is_pending());

        second_tx.send(vec![user(2, "Fresh")]).unwrap();
        second.await;
        first_tx.send(vec![user(1, "Stale")]).unwrap();
        first.await;

        let state = store.snapshot();
        assert_eq!(state.users, vec![user(2, "Fresh")]);
        assert!(!state.loading);
    }

    #[tokio::test]
    async fn test_begin_load_shows_loading_before_fetch_runs() {
        let store = UserStore::new();

        let generation = store.begin_load();
        assert!(store.snapshot().loading);
        assert!(store.snapshot().shows_loading_indicator());

        store
            .finish_load(generation, &FixedDirectory(Ok(vec![user(1, "Ann")])))
            .await;
        assert!(!store.snapshot().loading);
        assert_eq!(store.snapshot().users.len(), 1);
    }

    #[test]
    fn test_local_mutations_notify_observers_in_order() {
        let store = UserStore::new();
        let seen = recorder(&store);

        store.add_user(user(1, "Ann"));
        store.add_user(user(2, "Ben"));
        store.update_user(user(2, "Benjamin"));
        store.delete_user(UserId::new(1));
        store.delete_user(UserId::new(1));

        let kinds: Vec<&str> = seen.lock().unwrap().iter().map(|(k, _, _)| *k).collect();
        assert_eq!(kinds, vec!["add", "add", "update", "delete", "delete"]);

        let state = store.snapshot();
        assert_eq!(state.users.len(), 1);
        assert_eq!(state.users[0].name, "Benjamin");
    }

    #[test]
    fn test_find_and_max_id() {
        let store = UserStore::new();
        store.add_user(user(3, "Ann"));
        store.add_user(user(8, "Ben"));

        assert_eq!(store.find(UserId::new(8)).unwrap().name, "Ben");
        assert!(store.find(UserId::new(5)).is_none());
        assert_eq!(store.max_id(), Some(UserId::new(8)));
    }

    #[test]
    fn test_initial_load_is_claimed_once() {
        let store = UserStore::new();
        assert!(store.begin_initial_load());
        assert!(!store.begin_initial_load());
    }
}
