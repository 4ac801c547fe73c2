//! Read-only projections of a [`User`] for templates.

use user_directory_core::User;

/// Avatar image for a user id at a square pixel size.
fn avatar_url(user: &User, size: u32) -> String {
    format!("https://picsum.photos/seed/{}/{size}/{size}", user.id)
}

/// Card in the user grid.
#[derive(Debug, Clone)]
pub struct UserCardView {
    pub id: i64,
    pub name: String,
    pub username: String,
    pub email: String,
    pub phone: String,
    pub company: String,
    pub avatar_url: String,
}

impl From<&User> for UserCardView {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.as_i64(),
            name: user.name.clone(),
            username: user.username.clone(),
            email: user.email.clone(),
            phone: user.phone.clone(),
            company: user.company.name.clone(),
            avatar_url: avatar_url(user, 100),
        }
    }
}

/// Body of the details dialog.
#[derive(Debug, Clone)]
pub struct UserDetailsView {
    pub name: String,
    pub username: String,
    pub email: String,
    pub phone: String,
    pub website: String,
    /// "street, suite"
    pub address_line: String,
    /// "city, zipcode"
    pub locality_line: String,
    pub company_name: String,
    pub catch_phrase: String,
    pub bs: String,
    pub avatar_url: String,
}

impl From<&User> for UserDetailsView {
    fn from(user: &User) -> Self {
        Self {
            name: user.name.clone(),
            username: user.username.clone(),
            email: user.email.clone(),
            phone: user.phone.clone(),
            website: user.website.clone(),
            address_line: format!("{}, {}", user.address.street, user.address.suite),
            locality_line: format!("{}, {}", user.address.city, user.address.zipcode),
            company_name: user.company.name.clone(),
            catch_phrase: user.company.catch_phrase.clone(),
            bs: user.company.bs.clone(),
            avatar_url: avatar_url(user, 120),
        }
    }
}

/// Body of the delete confirmation dialog.
#[derive(Debug, Clone)]
pub struct ConfirmDeleteView {
    pub id: i64,
    pub name: String,
}

impl From<&User> for ConfirmDeleteView {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.as_i64(),
            name: user.name.clone(),
        }
    }
}
