use time::OffsetDateTime;
use tracing::{info, warn};

use crate::{
    auth::{
        dto::{
            AuthResponse, CreateAccountRequest, LoginRequest, MessageResponse, PublicUser,
            RegisterRequest,
        },
        jwt::JwtKeys,
        password::CredentialHasher,
        repo::UserRepo,
        repo_types::{NewUser, Role, UniqueField, User},
        validation::{validate_login, validate_registration},
    },
    config::AdminSeed,
    db::StoreError,
    error::AppError,
};

const REGISTRATION_FAILED: &str = "Registration failed";
const LOGIN_FAILED: &str = "Login failed";
const REQUEST_FAILED: &str = "Request failed";

/// Checks username, then email, then phone number; returns the first taken field.
pub async fn check_uniqueness(
    users: &dyn UserRepo,
    username: &str,
    email: &str,
    phone_number: &str,
) -> Result<Option<UniqueField>, StoreError> {
    for field in UniqueField::CHECK_ORDER {
        let value = match field {
            UniqueField::Username => username,
            UniqueField::Email => email,
            UniqueField::PhoneNumber => phone_number,
        };
        if users.exists(field, value).await? {
            return Ok(Some(field));
        }
    }
    Ok(None)
}

impl Role {
    /// Builds the insert payload for an account of this role.
    pub fn provision(self, req: RegisterRequest, password_hash: String) -> NewUser {
        let base = NewUser {
            username: req.username,
            email: req.email,
            first_name: req.first_name.trim().to_string(),
            last_name: req.last_name.trim().to_string(),
            password_hash,
            phone_number: req.phone_number,
            role: self,
            xp_level: 1,
        };
        match self {
            Role::User => base,
            Role::Moderator => {
                info!(username = %base.username, "provisioning moderator account");
                base
            }
            Role::Admin => {
                warn!(username = %base.username, "provisioning admin account");
                base
            }
        }
    }
}

/// Maps an insert failure; a unique-constraint hit loses the check-then-insert race
/// and is reported exactly like a pre-check conflict.
fn insert_error(e: StoreError, message: &'static str) -> AppError {
    if let StoreError::Duplicate(constraint) = &e {
        if let Some(field) = UniqueField::from_constraint(constraint) {
            warn!(field = field.as_str(), "duplicate caught by unique constraint");
            return AppError::Conflict(field);
        }
    }
    AppError::internal(message)(e)
}

/// Validates, hashes and persists a new account. Shared by self-registration
/// and administrator provisioning.
async fn create_user(
    users: &dyn UserRepo,
    hasher: &dyn CredentialHasher,
    req: RegisterRequest,
    role: Role,
    failure: &'static str,
) -> Result<User, AppError> {
    validate_registration(&req)?;

    if let Some(field) = check_uniqueness(users, &req.username, &req.email, &req.phone_number)
        .await
        .map_err(AppError::internal(failure))?
    {
        warn!(field = field.as_str(), "registration conflict");
        return Err(AppError::Conflict(field));
    }

    let hash = hasher.hash(&req.password).map_err(AppError::internal(failure))?;
    let new_user = role.provision(req, hash);

    users
        .create(new_user)
        .await
        .map_err(|e| insert_error(e, failure))
}

pub async fn register(
    users: &dyn UserRepo,
    hasher: &dyn CredentialHasher,
    keys: &JwtKeys,
    req: RegisterRequest,
) -> Result<AuthResponse, AppError> {
    let user = create_user(users, hasher, req, Role::User, REGISTRATION_FAILED).await?;

    let token = keys
        .sign(user.id, &user.email)
        .map_err(AppError::internal(REGISTRATION_FAILED))?;

    // registration counts as the first login
    let user = users
        .record_login(user.id, OffsetDateTime::now_utc())
        .await
        .map_err(AppError::internal(REGISTRATION_FAILED))?;

    info!(user_id = user.id, username = %user.username, "user registered");
    Ok(AuthResponse {
        token,
        user: user.into(),
    })
}

pub async fn login(
    users: &dyn UserRepo,
    hasher: &dyn CredentialHasher,
    keys: &JwtKeys,
    req: LoginRequest,
) -> Result<AuthResponse, AppError> {
    validate_login(&req)?;

    let user = match users
        .find_by_username_or_email(&req.username_or_email)
        .await
        .map_err(AppError::internal(LOGIN_FAILED))?
    {
        Some(u) if u.is_active => u,
        Some(u) => {
            warn!(user_id = u.id, "login on deactivated account");
            return Err(AppError::Unauthorized);
        }
        None => {
            warn!("login unknown user");
            return Err(AppError::Unauthorized);
        }
    };

    if !hasher.verify(&req.password, &user.password_hash) {
        warn!(user_id = user.id, "login invalid password");
        return Err(AppError::Unauthorized);
    }

    let token = keys
        .sign(user.id, &user.email)
        .map_err(AppError::internal(LOGIN_FAILED))?;

    let user = users
        .record_login(user.id, OffsetDateTime::now_utc())
        .await
        .map_err(AppError::internal(LOGIN_FAILED))?;

    info!(user_id = user.id, "user logged in");
    Ok(AuthResponse {
        token,
        user: user.into(),
    })
}

/// Tokens stay valid until they expire; nothing is revoked here.
pub fn logout(user_id: i64) -> MessageResponse {
    info!(user_id, "user logged out");
    MessageResponse {
        message: "Logged out successfully".into(),
    }
}

pub async fn profile(users: &dyn UserRepo, user_id: i64) -> Result<PublicUser, AppError> {
    users
        .find_by_id(user_id)
        .await
        .map_err(AppError::internal(REQUEST_FAILED))?
        .filter(|u| u.is_active)
        .map(PublicUser::from)
        .ok_or(AppError::Unauthorized)
}

pub async fn list_active(users: &dyn UserRepo) -> Result<Vec<PublicUser>, AppError> {
    let rows = users
        .list_active()
        .await
        .map_err(AppError::internal(REQUEST_FAILED))?;
    Ok(rows.into_iter().map(PublicUser::from).collect())
}

/// Administrator-created account; no token is issued and no login is recorded.
pub async fn create_account(
    users: &dyn UserRepo,
    hasher: &dyn CredentialHasher,
    admin_id: i64,
    req: CreateAccountRequest,
) -> Result<PublicUser, AppError> {
    let role = req.role;
    let user = create_user(users, hasher, req.account, role, "Account creation failed").await?;
    info!(admin_id, user_id = user.id, role = role.as_str(), "account created by admin");
    Ok(user.into())
}

pub async fn deactivate(
    users: &dyn UserRepo,
    admin_id: i64,
    target_id: i64,
) -> Result<(), AppError> {
    if admin_id == target_id {
        return Err(AppError::BadRequest("Cannot deactivate your own account".into()));
    }
    let changed = users
        .deactivate(target_id)
        .await
        .map_err(AppError::internal(REQUEST_FAILED))?;
    if !changed {
        return Err(AppError::NotFound("User not found".into()));
    }
    info!(admin_id, user_id = target_id, "user deactivated");
    Ok(())
}

/// Ensures the configured administrator exists. Skipped when the username is taken.
pub async fn seed_admin(
    users: &dyn UserRepo,
    hasher: &dyn CredentialHasher,
    seed: &AdminSeed,
) -> anyhow::Result<()> {
    if users.exists(UniqueField::Username, &seed.username).await? {
        info!(username = %seed.username, "admin user already present");
        return Ok(());
    }

    let req = RegisterRequest {
        username: seed.username.clone(),
        email: seed.email.clone(),
        first_name: "Admin".into(),
        last_name: "Admin".into(),
        password: seed.password.clone(),
        phone_number: seed.phone_number.clone(),
    };
    let user = create_user(users, hasher, req, Role::Admin, "Admin seed failed")
        .await
        .map_err(|e| anyhow::Error::new(e).context("seed admin user"))?;
    info!(user_id = user.id, "seeded admin user");
    Ok(())
}
