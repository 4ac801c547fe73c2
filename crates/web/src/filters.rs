//! Custom Askama template filters.

#![allow(clippy::unnecessary_wraps)]

use std::fmt::Display;

/// Formats a username as an `@handle`.
///
/// Usage in templates: `{{ user.username|handle }}`
#[askama::filter_fn]
pub fn handle(value: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(format!("@{value}"))
}
