//! Collection state and its reducer.

use crate::types::{User, UserId};

/// Everything the store holds.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserState {
    /// Users in insertion/fetch order.
    pub users: Vec<User>,
    /// A fetch is in flight.
    pub loading: bool,
    /// Message of the last failed fetch, cleared when a new fetch starts.
    pub error: Option<String>,
    /// At least one fetch has succeeded.
    pub loaded: bool,
    /// Generation of the most recently started fetch.
    generation: u64,
}

/// A transition request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserAction {
    /// A fetch began.
    FetchStarted { generation: u64 },
    /// A fetch resolved with the full collection.
    FetchSucceeded { generation: u64, users: Vec<User> },
    /// A fetch failed.
    FetchFailed { generation: u64, message: String },
    /// Append a user.
    Add(User),
    /// Replace the first user with the same id.
    Update(User),
    /// Remove every user with this id.
    Delete(UserId),
}

impl UserAction {
    /// Short name used in logs and live-update events.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::FetchStarted { .. } => "fetch_started",
            Self::FetchSucceeded { .. } => "fetch_succeeded",
            Self::FetchFailed { .. } => "fetch_failed",
            Self::Add(_) => "add",
            Self::Update(_) => "update",
            Self::Delete(_) => "delete",
        }
    }
}

/// Load status as presented to the UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadStatus {
    Idle,
    Loading,
    Loaded,
    Failed(String),
}

impl UserState {
    /// Empty collection, not loading, no error.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Generation the next fetch should start with.
    #[must_use]
    pub const fn next_generation(&self) -> u64 {
        self.generation + 1
    }

    /// Apply `action`.
    ///
    /// Returns `false` only for a fetch completion that belongs to a fetch
    /// other than the most recent one; such completions leave the state
    /// untouched. Every other action is accepted, including updates and
    /// deletes that match nothing.
    pub fn apply(&mut self, action: &UserAction) -> bool {
        match action {
            UserAction::FetchStarted { generation } => {
                self.generation = *generation;
                self.loading = true;
                self.error = None;
            }
            UserAction::FetchSucceeded { generation, users } => {
                if *generation != self.generation {
                    return false;
                }
                self.users.clone_from(users);
                self.loading = false;
                self.loaded = true;
            }
            UserAction::FetchFailed {
                generation,
                message,
            } => {
                if *generation != self.generation {
                    return false;
                }
                self.loading = false;
                self.error = Some(message.clone());
            }
            UserAction::Add(user) => self.users.push(user.clone()),
            UserAction::Update(user) => {
                if let Some(slot) = self.users.iter_mut().find(|u| u.id == user.id) {
                    slot.clone_from(user);
                }
            }
            UserAction::Delete(id) => self.users.retain(|u| u.id != *id),
        }
        true
    }

    /// Derived load status.
    #[must_use]
    pub fn status(&self) -> LoadStatus {
        if self.loading {
            LoadStatus::Loading
        } else if let Some(message) = &self.error {
            LoadStatus::Failed(message.clone())
        } else if self.loaded {
            LoadStatus::Loaded
        } else {
            LoadStatus::Idle
        }
    }

    /// First user with `id`.
    #[must_use]
    pub fn find(&self, id: UserId) -> Option<&User> {
        self.users.iter().find(|u| u.id == id)
    }

    /// Largest id in the collection.
    #[must_use]
    pub fn max_id(&self) -> Option<UserId> {
        self.users.iter().map(|u| u.id).max()
    }

    /// Whether the list should show the loading indicator: a fetch is in
    /// flight and nothing has been loaded yet.
    #[must_use]
    pub const fn shows_loading_indicator(&self) -> bool {
        self.loading && !self.loaded
    }
}
