//! User record shape.
//!
//! Mirrors the JSON served by the remote directory. Every field except the
//! id is a plain string; unknown keys in the payload (such as `address.geo`)
//! are ignored, but a missing or mistyped key fails decoding.

use serde::{Deserialize, Serialize};

use super::UserId;

/// A person in the directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub username: String,
    pub email: String,
    pub phone: String,
    pub website: String,
    pub address: Address,
    pub company: Company,
}

/// Postal address of a [`User`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub street: String,
    pub suite: String,
    pub city: String,
    pub zipcode: String,
}

/// Employer of a [`User`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Company {
    pub name: String,
    #[serde(rename = "catchPhrase")]
    pub catch_phrase: String,
    /// Business tagline.
    pub bs: String,
}

impl User {
    /// An empty record carrying only an id.
    ///
    /// This is the template the create form starts from.
    #[must_use]
    pub fn blank(id: UserId) -> Self {
        Self {
            id,
            name: String::new(),
            username: String::new(),
            email: String::new(),
            phone: String::new(),
            website: String::new(),
            address: Address::default(),
            company: Company::default(),
        }
    }
}
