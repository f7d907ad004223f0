//! User account routes.

use axum::{extract::State, http::StatusCode, Extension};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    auth::{password, Identity, Role, RoleSet},
    error::{AppError, AppResult},
    http::{AppJson, AppQuery, Envelope},
    pagination::{Page, PageParams},
};

use super::store::UserRecord;
use super::UsersState;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub roles: Option<RoleSet>,
}

#[derive(Debug, Deserialize)]
pub struct ListUsersQuery {
    pub role: Option<Role>,
    pub email: Option<String>,
}

/// Identity-safe projection returned on register and login.
#[derive(Debug, Serialize)]
pub struct UserPublic {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub roles: RoleSet,
}

/// Full profile projection. The password hash never leaves the store.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub roles: RoleSet,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserPublic,
}

impl From<&UserRecord> for UserPublic {
    fn from(record: &UserRecord) -> Self {
        Self {
            id: record.id,
            email: record.email.clone(),
            name: record.name.clone(),
            roles: record.roles.clone(),
        }
    }
}

impl From<&UserRecord> for UserProfile {
    fn from(record: &UserRecord) -> Self {
        Self {
            id: record.id,
            email: record.email.clone(),
            name: record.name.clone(),
            roles: record.roles.clone(),
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

/// `POST /register`
pub async fn register(
    State(state): State<UsersState>,
    AppJson(body): AppJson<RegisterRequest>,
) -> AppResult<(StatusCode, Envelope<UserPublic>)> {
    validate_email(&body.email)?;
    if body.password.len() < 8 {
        return Err(AppError::bad_request(
            "password must be at least 8 characters",
        ));
    }
    if body.name.is_empty() {
        return Err(AppError::bad_request("name must not be empty"));
    }

    // Early check so a duplicate skips the hash work; insert re-checks the
    // email index atomically.
    if state.store.find_by_email(&body.email).is_some() {
        return Err(AppError::conflict("Email already registered"));
    }

    let password_hash = password::hash(body.password).await?;
    let now = Utc::now();
    let record = UserRecord {
        id: Uuid::new_v4(),
        email: body.email,
        password_hash,
        name: body.name,
        roles: RoleSet::from_iter([Role::Engineer]),
        created_at: now,
        updated_at: now,
    };

    let public = UserPublic::from(&record);
    if !state.store.insert(record) {
        return Err(AppError::conflict("Email already registered"));
    }

    tracing::info!(user_id = %public.id, "user registered");
    Ok((StatusCode::CREATED, Envelope::ok(public)))
}

/// `POST /login`
///
/// Unknown email and wrong password are indistinguishable to the caller.
pub async fn login(
    State(state): State<UsersState>,
    AppJson(body): AppJson<LoginRequest>,
) -> AppResult<Envelope<LoginResponse>> {
    validate_email(&body.email)?;
    if body.password.is_empty() {
        return Err(AppError::bad_request("password must not be empty"));
    }

    let Some(user) = state.store.find_by_email(&body.email) else {
        return Err(AppError::bad_request("Invalid credentials"));
    };

    let valid = password::verify(body.password, user.password_hash.clone()).await?;
    if !valid {
        return Err(AppError::bad_request("Invalid credentials"));
    }

    let token = state
        .signer
        .sign(user.id.to_string(), user.email.clone(), user.roles.clone())
        .map_err(AppError::internal)?;

    tracing::info!(user_id = %user.id, "user logged in");
    Ok(Envelope::ok(LoginResponse {
        token,
        user: UserPublic::from(&user),
    }))
}

/// `GET /me`
pub async fn me(
    State(state): State<UsersState>,
    Extension(identity): Extension<Identity>,
) -> AppResult<Envelope<UserProfile>> {
    let user = lookup(&state, &identity.user_id)?;
    Ok(Envelope::ok(UserProfile::from(&user)))
}

/// `PATCH /me`
pub async fn update_me(
    State(state): State<UsersState>,
    Extension(identity): Extension<Identity>,
    AppJson(body): AppJson<UpdateProfileRequest>,
) -> AppResult<Envelope<UserProfile>> {
    if let Some(name) = &body.name {
        if name.is_empty() {
            return Err(AppError::bad_request("name must not be empty"));
        }
    }

    let user = lookup(&state, &identity.user_id)?;

    if body.roles.is_some() && !identity.has_any(&[Role::Admin]) {
        return Err(AppError::forbidden("Only admins can update roles"));
    }

    let updated = state
        .store
        .update_profile(user.id, body.name, body.roles)
        .ok_or_else(|| AppError::not_found("User not found"))?;

    Ok(Envelope::ok(UserProfile::from(&updated)))
}

/// `GET /`, admin only.
pub async fn list_users(
    State(state): State<UsersState>,
    Extension(identity): Extension<Identity>,
    AppQuery(page): AppQuery<PageParams>,
    AppQuery(query): AppQuery<ListUsersQuery>,
) -> AppResult<Envelope<Page<UserProfile>>> {
    identity.require_any(&[Role::Admin])?;
    let pagination = page.resolve()?;

    let mut users = state.store.all();
    if let Some(role) = query.role {
        users.retain(|user| user.roles.contains(role));
    }
    if let Some(email) = &query.email {
        users.retain(|user| user.email.contains(email.as_str()));
    }
    // Iteration order of the store is arbitrary; pin it for stable paging.
    users.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));

    let total = users.len();
    let items = users
        .iter()
        .skip(pagination.offset())
        .take(pagination.limit())
        .map(UserProfile::from)
        .collect();

    Ok(Envelope::ok(Page::new(items, total, pagination)))
}

fn lookup(state: &UsersState, user_id: &str) -> AppResult<UserRecord> {
    let id = Uuid::parse_str(user_id).map_err(|_| AppError::not_found("User not found"))?;
    state
        .store
        .get(id)
        .ok_or_else(|| AppError::not_found("User not found"))
}

fn validate_email(email: &str) -> AppResult<()> {
    let valid = email
        .split_once('@')
        .is_some_and(|(local, domain)| {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.contains(char::is_whitespace)
        });
    if valid {
        Ok(())
    } else {
        Err(AppError::bad_request("email must be a valid address"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_validation_accepts_plain_addresses() {
        assert!(validate_email("a@example.com").is_ok());
        assert!(validate_email("first.last@sub.example.org").is_ok());
    }

    #[test]
    fn email_validation_rejects_malformed_input() {
        for bad in ["", "plain", "@example.com", "a@", "a@nodot", "a b@x.com", "a@.com", "a@com."] {
            assert!(validate_email(bad).is_err(), "accepted {bad:?}");
        }
    }
}
