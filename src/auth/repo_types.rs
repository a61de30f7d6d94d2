use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use thiserror::Error;
use time::OffsetDateTime;

/// Account role. Stored as its display name in the `role` column.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Role {
    User,
    Admin,
    Moderator,
}

#[derive(Debug, Error)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "User",
            Role::Admin => "Admin",
            Role::Moderator => "Moderator",
        }
    }
}

impl TryFrom<String> for Role {
    type Error = UnknownRole;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "User" => Ok(Role::User),
            "Admin" => Ok(Role::Admin),
            "Moderator" => Ok(Role::Moderator),
            _ => Err(UnknownRole(value)),
        }
    }
}

/// User record in the database.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password_hash: String, // argon2 PHC string, never leaves the server
    pub xp_level: i32,
    pub phone_number: String,
    #[sqlx(try_from = "String")]
    pub role: Role,
    pub created_at: OffsetDateTime,
    pub last_login_at: Option<OffsetDateTime>,
    pub is_active: bool,
}

/// Insert payload; `id`, `created_at` and `is_active` come from the store.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password_hash: String,
    pub phone_number: String,
    pub role: Role,
    pub xp_level: i32,
}

/// The three columns that must be unique across all users.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniqueField {
    Username,
    Email,
    PhoneNumber,
}

impl UniqueField {
    /// Order in which conflicts are checked and reported.
    pub const CHECK_ORDER: [UniqueField; 3] = [
        UniqueField::Username,
        UniqueField::Email,
        UniqueField::PhoneNumber,
    ];

    /// Wire name of the field.
    pub fn as_str(self) -> &'static str {
        match self {
            UniqueField::Username => "username",
            UniqueField::Email => "email",
            UniqueField::PhoneNumber => "phoneNumber",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            UniqueField::Username => "Username",
            UniqueField::Email => "Email",
            UniqueField::PhoneNumber => "Phone number",
        }
    }

    pub fn constraint(self) -> &'static str {
        match self {
            UniqueField::Username => "users_username_key",
            UniqueField::Email => "users_email_key",
            UniqueField::PhoneNumber => "users_phone_number_key",
        }
    }

    pub fn from_constraint(name: &str) -> Option<Self> {
        Self::CHECK_ORDER
            .into_iter()
            .find(|field| field.constraint() == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_round_trips_through_column_text() {
        for role in [Role::User, Role::Admin, Role::Moderator] {
            assert_eq!(Role::try_from(role.as_str().to_string()).unwrap(), role);
        }
        assert!(Role::try_from("root".to_string()).is_err());
    }

    #[test]
    fn constraint_names_map_back_to_fields() {
        assert_eq!(
            UniqueField::from_constraint("users_email_key"),
            Some(UniqueField::Email)
        );
        assert_eq!(UniqueField::from_constraint("something_else"), None);
    }
}
