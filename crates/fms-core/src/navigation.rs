//! Navigation domain: views, display preference and the pure transition function.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// A view the application can render.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum ViewId {
    #[default]
    Landing,
    Login,
    Signup,
    Profile,
    Scholarships,
    Reminders,
}

impl ViewId {
    /// Returns true for views that are only reachable with a session.
    pub fn requires_auth(self) -> bool {
        matches!(self, Self::Profile | Self::Scholarships | Self::Reminders)
    }
}

/// Light/dark display preference, persisted independently of the session.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum DisplayPreference {
    #[default]
    Light,
    Dark,
}

impl DisplayPreference {
    /// Returns the opposite preference.
    pub fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }
}

/// Maps `(authenticated, requested)` to the view that is actually rendered.
///
/// Protected views redirect to `Login` when unauthenticated. The requested
/// view is not remembered; a later sign-in always lands on `Profile`.
pub fn resolve(authenticated: bool, requested: ViewId) -> ViewId {
    if requested.requires_auth() && !authenticated {
        ViewId::Login
    } else {
        requested
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_scholarships_unauthenticated_resolves_to_login() {
        assert_eq!(resolve(false, ViewId::Scholarships), ViewId::Login);
    }

    #[test]
    fn test_protected_views_never_reachable_without_auth() {
        for view in ViewId::iter() {
            let resolved = resolve(false, view);
            assert!(!resolved.requires_auth(), "{view} leaked as {resolved}");
        }
    }

    #[test]
    fn test_authenticated_views_resolve_verbatim() {
        for view in ViewId::iter() {
            assert_eq!(resolve(true, view), view);
        }
    }

    #[test]
    fn test_public_views_unchanged_when_signed_out() {
        assert_eq!(resolve(false, ViewId::Landing), ViewId::Landing);
        assert_eq!(resolve(false, ViewId::Signup), ViewId::Signup);
    }

    #[test]
    fn test_view_id_parses_case_insensitively() {
        assert_eq!("Scholarships".parse::<ViewId>().unwrap(), ViewId::Scholarships);
        assert_eq!(ViewId::Reminders.to_string(), "reminders");
    }

    #[test]
    fn test_display_preference_toggle() {
        assert_eq!(DisplayPreference::Light.toggled(), DisplayPreference::Dark);
        assert_eq!(DisplayPreference::Dark.toggled(), DisplayPreference::Light);
    }
}
