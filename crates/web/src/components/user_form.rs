//! Create/edit form shared by both flows.
//!
//! The form posts a flat [`UserDraft`]; nested address and company fields
//! are prefixed. Required fields are marked `required` in the markup and
//! re-checked for presence here; there is no format validation beyond the
//! browser's own `type="email"` check.

use serde::{Deserialize, Deserializer};

use user_directory_core::{Address, Company, User, UserId};

/// Working copy of a user held by the form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct UserDraft {
    /// Absent for a submission that never saw the create form.
    #[serde(deserialize_with = "blank_as_none")]
    pub id: Option<i64>,
    pub name: String,
    pub username: String,
    pub email: String,
    pub phone: String,
    pub website: String,
    pub street: String,
    pub suite: String,
    pub city: String,
    pub zipcode: String,
    pub company_name: String,
    pub catch_phrase: String,
    pub bs: String,
}

impl From<&User> for UserDraft {
    fn from(user: &User) -> Self {
        Self {
            id: Some(user.id.as_i64()),
            name: user.name.clone(),
            username: user.username.clone(),
            email: user.email.clone(),
            phone: user.phone.clone(),
            website: user.website.clone(),
            street: user.address.street.clone(),
            suite: user.address.suite.clone(),
            city: user.address.city.clone(),
            zipcode: user.address.zipcode.clone(),
            company_name: user.company.name.clone(),
            catch_phrase: user.company.catch_phrase.clone(),
            bs: user.company.bs.clone(),
        }
    }
}

/// Treats an empty form value as no value.
fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value.parse().map(Some).map_err(serde::de::Error::custom),
    }
}

impl UserDraft {
    /// The user this draft describes, stored under `id`.
    #[must_use]
    pub fn into_user(self, id: UserId) -> User {
        User {
            id,
            name: self.name,
            username: self.username,
            email: self.email,
            phone: self.phone,
            website: self.website,
            address: Address {
                street: self.street,
                suite: self.suite,
                city: self.city,
                zipcode: self.zipcode,
            },
            company: Company {
                name: self.company_name,
                catch_phrase: self.catch_phrase,
                bs: self.bs,
            },
        }
    }

    /// Labels of required fields left blank, in form order.
    #[must_use]
    pub fn missing_required(&self) -> Vec<&'static str> {
        [
            ("Name", &self.name),
            ("Username", &self.username),
            ("Email", &self.email),
            ("Phone", &self.phone),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(label, _)| label)
        .collect()
    }
}

/// Whether the form creates a new user or edits an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit,
}

/// Everything the form dialog renders.
#[derive(Debug, Clone)]
pub struct UserFormView {
    pub mode: FormMode,
    pub draft: UserDraft,
    /// Required fields a previous submission left blank.
    pub missing: Vec<&'static str>,
}

impl UserFormView {
    /// Empty form for a new user with a freshly allocated id.
    #[must_use]
    pub fn create(id: UserId) -> Self {
        Self {
            mode: FormMode::Create,
            draft: UserDraft::from(&User::blank(id)),
            missing: Vec::new(),
        }
    }

    /// Form seeded from an existing user.
    #[must_use]
    pub fn edit(user: &User) -> Self {
        Self {
            mode: FormMode::Edit,
            draft: UserDraft::from(user),
            missing: Vec::new(),
        }
    }

    /// Re-display a rejected submission.
    #[must_use]
    pub fn rejected(mode: FormMode, draft: UserDraft) -> Self {
        let missing = draft.missing_required();
        Self {
            mode,
            draft,
            missing,
        }
    }

    #[must_use]
    pub const fn title(&self) -> &'static str {
        match self.mode {
            FormMode::Create => "Add New User",
            FormMode::Edit => "Edit User",
        }
    }

    #[must_use]
    pub const fn submit_label(&self) -> &'static str {
        match self.mode {
            FormMode::Create => "Add User",
            FormMode::Edit => "Update User",
        }
    }

    /// Where the form posts to.
    #[must_use]
    pub fn action(&self) -> String {
        match (self.mode, self.draft.id) {
            (FormMode::Edit, Some(id)) => format!("/users/{id}"),
            _ => "/users".to_string(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn complete_draft() -> UserDraft {
        UserDraft {
            id: Some(5),
            name: "Ann".to_string(),
            username: "ann".to_string(),
            email: "ann@example.com".to_string(),
            phone: "555-0100".to_string(),
            company_name: "Acme".to_string(),
            catch_phrase: "We make things".to_string(),
            ..UserDraft::default()
        }
    }

    #[test]
    fn test_complete_draft_has_nothing_missing() {
        assert!(complete_draft().missing_required().is_empty());
    }

    #[test]
    fn test_blank_and_whitespace_fields_are_missing() {
        let draft = UserDraft {
            username: "   ".to_string(),
            phone: String::new(),
            ..complete_draft()
        };
        assert_eq!(draft.missing_required(), vec!["Username", "Phone"]);
    }

    #[test]
    fn test_optional_fields_are_not_required() {
        let draft = UserDraft {
            website: String::new(),
            street: String::new(),
            company_name: String::new(),
            ..complete_draft()
        };
        assert!(draft.missing_required().is_empty());
    }

    #[test]
    fn test_draft_round_trips_through_user() {
        let user = complete_draft().into_user(UserId::new(5));
        assert_eq!(user.id, UserId::new(5));
        assert_eq!(user.company.name, "Acme");
        assert_eq!(user.company.catch_phrase, "We make things");
        assert_eq!(UserDraft::from(&user), complete_draft());
    }

    #[test]
    fn test_blank_or_absent_id_is_none() {
        let blank: UserDraft = serde_json::from_str(r#"{"id": " ", "name": "Bo"}"#).unwrap();
        assert_eq!(blank.id, None);

        let absent: UserDraft = serde_json::from_str(r#"{"name": "Bo"}"#).unwrap();
        assert_eq!(absent.id, None);

        let given: UserDraft = serde_json::from_str(r#"{"id": "12"}"#).unwrap();
        assert_eq!(given.id, Some(12));

        assert!(serde_json::from_str::<UserDraft>(r#"{"id": "twelve"}"#).is_err());
    }

    #[test]
    fn test_create_form_is_seeded_blank_with_id() {
        let form = UserFormView::create(UserId::new(42));
        assert_eq!(form.draft.id, Some(42));
        assert!(form.draft.name.is_empty());
        assert_eq!(form.title(), "Add New User");
        assert_eq!(form.action(), "/users");
    }

    #[test]
    fn test_edit_form_posts_to_user() {
        let user = complete_draft().into_user(UserId::new(5));
        let form = UserFormView::edit(&user);
        assert_eq!(form.title(), "Edit User");
        assert_eq!(form.submit_label(), "Update User");
        assert_eq!(form.action(), "/users/5");
    }
}
