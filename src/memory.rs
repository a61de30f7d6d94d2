//! In-process store backing both repositories. Used by the test suite and by
//! `AppState::in_memory`; enforces the same unique constraints as the schema.

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;

use crate::{
    auth::{
        repo::UserRepo,
        repo_types::{NewUser, UniqueField, User},
    },
    db::StoreError,
    hangouts::{
        repo::HangoutRepo,
        repo_types::{Hangout, JoinOutcome, NewHangout, Participant, PARTICIPANT_UNIQUE},
    },
};

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    hangouts: Vec<Hangout>,
    participants: Vec<Participant>,
    next_user_id: i64,
    next_hangout_id: i64,
    next_participant_id: i64,
}

fn column(user: &User, field: UniqueField) -> &str {
    match field {
        UniqueField::Username => &user.username,
        UniqueField::Email => &user.email,
        UniqueField::PhoneNumber => &user.phone_number,
    }
}

#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepo for MemoryStore {
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, StoreError> {
        let t = self.tables.read().await;
        Ok(t.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_username_or_email(&self, key: &str) -> Result<Option<User>, StoreError> {
        let t = self.tables.read().await;
        let hit = t
            .users
            .iter()
            .find(|u| u.username == key)
            .or_else(|| t.users.iter().find(|u| u.email == key));
        Ok(hit.cloned())
    }

    async fn exists(&self, field: UniqueField, value: &str) -> Result<bool, StoreError> {
        let t = self.tables.read().await;
        Ok(t.users.iter().any(|u| column(u, field) == value))
    }

    async fn create(&self, user: NewUser) -> Result<User, StoreError> {
        let mut t = self.tables.write().await;
        for field in UniqueField::CHECK_ORDER {
            let value = match field {
                UniqueField::Username => &user.username,
                UniqueField::Email => &user.email,
                UniqueField::PhoneNumber => &user.phone_number,
            };
            if t.users.iter().any(|u| column(u, field) == value) {
                return Err(StoreError::Duplicate(field.constraint().to_string()));
            }
        }

        t.next_user_id += 1;
        let created = User {
            id: t.next_user_id,
            username: user.username,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            password_hash: user.password_hash,
            xp_level: user.xp_level,
            phone_number: user.phone_number,
            role: user.role,
            created_at: OffsetDateTime::now_utc(),
            last_login_at: None,
            is_active: true,
        };
        t.users.push(created.clone());
        Ok(created)
    }

    async fn record_login(&self, id: i64, at: OffsetDateTime) -> Result<User, StoreError> {
        let mut t = self.tables.write().await;
        let user = t
            .users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or_else(|| StoreError::Backend(anyhow::anyhow!("user {} not found", id)))?;
        user.last_login_at = Some(at);
        Ok(user.clone())
    }

    async fn deactivate(&self, id: i64) -> Result<bool, StoreError> {
        let mut t = self.tables.write().await;
        match t.users.iter_mut().find(|u| u.id == id && u.is_active) {
            Some(user) => {
                user.is_active = false;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn list_active(&self) -> Result<Vec<User>, StoreError> {
        let t = self.tables.read().await;
        Ok(t.users.iter().filter(|u| u.is_active).cloned().collect())
    }
}

#[async_trait]
impl HangoutRepo for MemoryStore {
    async fn create(&self, h: NewHangout) -> Result<Hangout, StoreError> {
        let mut t = self.tables.write().await;
        t.next_hangout_id += 1;
        let hangout = Hangout {
            id: t.next_hangout_id,
            title: h.title,
            description: h.description,
            planned_date: h.planned_date,
            location: h.location,
            max_participants: h.max_participants,
            estimated_cost: h.estimated_cost,
            created_at: OffsetDateTime::now_utc(),
            is_active: true,
            created_by_user_id: h.created_by_user_id,
        };
        t.hangouts.push(hangout.clone());
        Ok(hangout)
    }

    async fn find_active(&self, id: i64) -> Result<Option<Hangout>, StoreError> {
        let t = self.tables.read().await;
        Ok(t.hangouts.iter().find(|h| h.id == id && h.is_active).cloned())
    }

    async fn list_active(&self) -> Result<Vec<Hangout>, StoreError> {
        let t = self.tables.read().await;
        let mut rows: Vec<Hangout> = t.hangouts.iter().filter(|h| h.is_active).cloned().collect();
        rows.sort_by_key(|h| (h.planned_date, h.id));
        Ok(rows)
    }

    async fn cancel(&self, id: i64) -> Result<bool, StoreError> {
        let mut t = self.tables.write().await;
        match t.hangouts.iter_mut().find(|h| h.id == id && h.is_active) {
            Some(h) => {
                h.is_active = false;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn participants(&self, hangout_id: i64) -> Result<Vec<Participant>, StoreError> {
        let t = self.tables.read().await;
        Ok(t.participants
            .iter()
            .filter(|p| p.hangout_id == hangout_id)
            .cloned()
            .collect())
    }

    async fn join(&self, hangout_id: i64, user_id: i64) -> Result<JoinOutcome, StoreError> {
        let mut t = self.tables.write().await;
        let Some(max) = t
            .hangouts
            .iter()
            .find(|h| h.id == hangout_id && h.is_active)
            .map(|h| h.max_participants)
        else {
            return Ok(JoinOutcome::NotFound);
        };

        let current = t.participants.iter().filter(|p| p.hangout_id == hangout_id);
        if current.clone().any(|p| p.user_id == user_id) {
            return Err(StoreError::Duplicate(PARTICIPANT_UNIQUE.to_string()));
        }
        if current.count() >= max as usize {
            return Ok(JoinOutcome::Full);
        }

        t.next_participant_id += 1;
        let participant = Participant {
            id: t.next_participant_id,
            hangout_id,
            user_id,
            joined_at: OffsetDateTime::now_utc(),
            is_confirmed: false,
        };
        t.participants.push(participant.clone());
        Ok(JoinOutcome::Joined(participant))
    }

    async fn leave(&self, hangout_id: i64, user_id: i64) -> Result<bool, StoreError> {
        let mut t = self.tables.write().await;
        let before = t.participants.len();
        t.participants
            .retain(|p| !(p.hangout_id == hangout_id && p.user_id == user_id));
        Ok(t.participants.len() < before)
    }

    async fn confirm(
        &self,
        hangout_id: i64,
        user_id: i64,
    ) -> Result<Option<Participant>, StoreError> {
        let mut t = self.tables.write().await;
        let row = t
            .participants
            .iter_mut()
            .find(|p| p.hangout_id == hangout_id && p.user_id == user_id);
        Ok(row.map(|p| {
            p.is_confirmed = true;
            p.clone()
        }))
    }
}
