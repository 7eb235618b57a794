use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};
use crate::id::{RoleId, UserId};

use super::{folded_text, required_text};

/// A registered user. `role_id` drives authorization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub role_id: Option<RoleId>,
    pub is_email_verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a user.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub role_id: Option<RoleId>,
}

/// Partial update of a user; at least one field must be present.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UserChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub role_id: Option<RoleId>,
    pub is_email_verified: Option<bool>,
}

impl UserChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.email.is_none()
            && self.role_id.is_none()
            && self.is_email_verified.is_none()
    }
}

impl User {
    pub fn create(input: NewUser, now: DateTime<Utc>) -> DomainResult<Self> {
        Ok(Self {
            id: UserId::new(),
            name: required_text("name", &input.name)?,
            email: normalize_email(&input.email)?,
            role_id: input.role_id,
            is_email_verified: false,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn apply(&mut self, changes: UserChanges, now: DateTime<Utc>) -> DomainResult<()> {
        if changes.is_empty() {
            return Err(DomainError::validation("update must change at least one field"));
        }

        // Validate everything before mutating anything.
        let name = changes.name.as_deref().map(|n| required_text("name", n)).transpose()?;
        let email = changes.email.as_deref().map(normalize_email).transpose()?;

        if let Some(name) = name {
            self.name = name;
        }
        if let Some(email) = email {
            self.email = email;
        }
        if let Some(role_id) = changes.role_id {
            self.role_id = Some(role_id);
        }
        if let Some(verified) = changes.is_email_verified {
            self.is_email_verified = verified;
        }
        self.updated_at = now;
        Ok(())
    }
}

/// Trim + lower-case, then a basic `local@domain.tld` shape check.
pub fn normalize_email(raw: &str) -> DomainResult<String> {
    let email = folded_text("email", raw)?;
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    };
    if !valid {
        return Err(DomainError::validation("invalid email format"));
    }
    Ok(email)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            name: " Alice ".to_string(),
            email: email.to_string(),
            role_id: None,
        }
    }

    #[test]
    fn create_normalizes_name_and_email() {
        let user = User::create(new_user("  Alice@Example.COM "), Utc::now()).unwrap();
        assert_eq!(user.name, "Alice");
        assert_eq!(user.email, "alice@example.com");
        assert!(!user.is_email_verified);
        assert_eq!(user.created_at, user.updated_at);
    }

    #[test]
    fn create_rejects_invalid_email() {
        for bad in ["invalid-email", "a@b", "@example.com", "a@@example.com", "a@example."] {
            assert!(User::create(new_user(bad), Utc::now()).is_err(), "{bad} accepted");
        }
    }

    #[test]
    fn empty_update_is_rejected() {
        let mut user = User::create(new_user("bob@example.com"), Utc::now()).unwrap();
        let err = user.apply(UserChanges::default(), Utc::now()).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn invalid_update_leaves_user_untouched() {
        let mut user = User::create(new_user("bob@example.com"), Utc::now()).unwrap();
        let before = user.clone();
        let changes = UserChanges {
            name: Some("Robert".to_string()),
            email: Some("nope".to_string()),
            ..Default::default()
        };
        assert!(user.apply(changes, Utc::now()).is_err());
        assert_eq!(user, before);
    }

    #[test]
    fn update_assigns_role() {
        let mut user = User::create(new_user("carol@example.com"), Utc::now()).unwrap();
        let role = RoleId::new();
        user.apply(
            UserChanges {
                role_id: Some(role),
                ..Default::default()
            },
            Utc::now(),
        )
        .unwrap();
        assert_eq!(user.role_id, Some(role));
    }

    #[test]
    fn serializes_camel_case() {
        let user = User::create(new_user("dave@example.com"), Utc::now()).unwrap();
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("roleId").is_some());
        assert!(json.get("isEmailVerified").is_some());
        assert!(json.get("createdAt").is_some());
    }
}
