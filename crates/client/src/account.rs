//! Account profile types.
//!
//! Shapes for `GET`/`PATCH /accounts/profile/`. Updates send only the fields
//! that changed; the name fields are nullable server-side, so they use a
//! double `Option` (`Some(None)` serializes as an explicit `null` to clear
//! the value).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use bee_commerce_core::UserId;

/// The authenticated user's profile record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default)]
    pub id: Option<UserId>,
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub date_joined: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_login: Option<DateTime<Utc>>,
}

/// A partial profile update; unset fields are omitted from the PATCH body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<Option<String>>,
}

impl ProfileUpdate {
    /// Compute the update that turns `current` into the desired values.
    ///
    /// Empty name strings are treated as "clear the field" (explicit null),
    /// mirroring how the profile form submits blanks.
    #[must_use]
    pub fn diff(
        current: &Profile,
        username: &str,
        email: &str,
        first_name: &str,
        last_name: &str,
    ) -> Self {
        let normalize = |s: &str| {
            if s.is_empty() {
                None
            } else {
                Some(s.to_string())
            }
        };

        let mut update = Self::default();
        if username != current.username {
            update.username = Some(username.to_string());
        }
        if email != current.email {
            update.email = Some(email.to_string());
        }
        let new_first = normalize(first_name);
        if new_first != current.first_name {
            update.first_name = Some(new_first);
        }
        let new_last = normalize(last_name);
        if new_last != current.last_name {
            update.last_name = Some(new_last);
        }
        update
    }

    /// Whether the update carries no changes at all.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.username.is_none()
            && self.email.is_none()
            && self.first_name.is_none()
            && self.last_name.is_none()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn profile() -> Profile {
        Profile {
            id: Some(UserId::new(1)),
            username: "bee".to_string(),
            email: "bee@example.com".to_string(),
            first_name: Some("Bea".to_string()),
            last_name: None,
            date_joined: None,
            last_login: None,
        }
    }

    #[test]
    fn test_diff_detects_no_changes() {
        let update = ProfileUpdate::diff(&profile(), "bee", "bee@example.com", "Bea", "");
        assert!(update.is_empty());
    }

    #[test]
    fn test_diff_only_includes_changed_fields() {
        let update = ProfileUpdate::diff(&profile(), "queen", "bee@example.com", "Bea", "Keeper");
        assert_eq!(update.username.as_deref(), Some("queen"));
        assert!(update.email.is_none());
        assert!(update.first_name.is_none());
        assert_eq!(update.last_name, Some(Some("Keeper".to_string())));
    }

    #[test]
    fn test_diff_clears_name_with_explicit_null() {
        let update = ProfileUpdate::diff(&profile(), "bee", "bee@example.com", "", "");
        assert_eq!(update.first_name, Some(None));

        let json = serde_json::to_value(&update).unwrap();
        assert_eq!(json, serde_json::json!({"first_name": null}));
    }
}
