//! In-memory user records.

use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use uuid::Uuid;

use crate::auth::RoleSet;

#[derive(Debug, Clone)]
pub struct UserRecord {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub name: String,
    pub roles: RoleSet,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Users keyed by id, with a unique email index.
///
/// The index entry is claimed under its shard lock before the record lands,
/// so two concurrent registrations for the same email cannot both succeed.
#[derive(Debug, Default)]
pub struct UserStore {
    users: DashMap<Uuid, UserRecord>,
    email_index: DashMap<String, Uuid>,
}

impl UserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new user; `false` when the email is already registered.
    pub fn insert(&self, record: UserRecord) -> bool {
        match self.email_index.entry(record.email.clone()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(record.id);
                self.users.insert(record.id, record);
                true
            }
        }
    }

    pub fn get(&self, id: Uuid) -> Option<UserRecord> {
        self.users.get(&id).map(|record| record.value().clone())
    }

    pub fn find_by_email(&self, email: &str) -> Option<UserRecord> {
        let id = *self.email_index.get(email)?;
        self.get(id)
    }

    /// Apply a profile update and return the updated record.
    pub fn update_profile(
        &self,
        id: Uuid,
        name: Option<String>,
        roles: Option<RoleSet>,
    ) -> Option<UserRecord> {
        let mut record = self.users.get_mut(&id)?;
        if let Some(name) = name {
            record.name = name;
        }
        if let Some(roles) = roles {
            record.roles = roles;
        }
        record.updated_at = Utc::now();
        Some(record.value().clone())
    }

    /// Snapshot of every record, in no particular order.
    pub fn all(&self) -> Vec<UserRecord> {
        self.users.iter().map(|record| record.value().clone()).collect()
    }
}
