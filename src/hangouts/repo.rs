use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;

use crate::db::StoreError;
use crate::hangouts::repo_types::{
    Hangout, JoinOutcome, NewHangout, Participant, PARTICIPANT_UNIQUE,
};

#[async_trait]
pub trait HangoutRepo: Send + Sync {
    async fn create(&self, hangout: NewHangout) -> Result<Hangout, StoreError>;

    async fn find_active(&self, id: i64) -> Result<Option<Hangout>, StoreError>;

    /// Active hangouts, soonest first.
    async fn list_active(&self) -> Result<Vec<Hangout>, StoreError>;

    async fn cancel(&self, id: i64) -> Result<bool, StoreError>;

    async fn participants(&self, hangout_id: i64) -> Result<Vec<Participant>, StoreError>;

    /// Capacity check and insert happen under a lock on the hangout row.
    async fn join(&self, hangout_id: i64, user_id: i64) -> Result<JoinOutcome, StoreError>;

    async fn leave(&self, hangout_id: i64, user_id: i64) -> Result<bool, StoreError>;

    async fn confirm(
        &self,
        hangout_id: i64,
        user_id: i64,
    ) -> Result<Option<Participant>, StoreError>;
}

#[derive(Clone)]
pub struct PgHangoutRepo {
    db: PgPool,
}

impl PgHangoutRepo {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl HangoutRepo for PgHangoutRepo {
    async fn create(&self, h: NewHangout) -> Result<Hangout, StoreError> {
        let hangout = sqlx::query_as::<_, Hangout>(
            r#"
            INSERT INTO hangouts (title, description, planned_date, location,
                                  max_participants, estimated_cost, created_by_user_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, title, description, planned_date, location, max_participants,
                      estimated_cost, created_at, is_active, created_by_user_id
            "#,
        )
        .bind(&h.title)
        .bind(&h.description)
        .bind(h.planned_date)
        .bind(&h.location)
        .bind(h.max_participants)
        .bind(h.estimated_cost)
        .bind(h.created_by_user_id)
        .fetch_one(&self.db)
        .await?;
        Ok(hangout)
    }

    async fn find_active(&self, id: i64) -> Result<Option<Hangout>, StoreError> {
        let hangout = sqlx::query_as::<_, Hangout>(
            r#"
            SELECT id, title, description, planned_date, location, max_participants,
                   estimated_cost, created_at, is_active, created_by_user_id
            FROM hangouts
            WHERE id = $1 AND is_active
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(hangout)
    }

    async fn list_active(&self) -> Result<Vec<Hangout>, StoreError> {
        let rows = sqlx::query_as::<_, Hangout>(
            r#"
            SELECT id, title, description, planned_date, location, max_participants,
                   estimated_cost, created_at, is_active, created_by_user_id
            FROM hangouts
            WHERE is_active
            ORDER BY planned_date ASC, id ASC
            "#,
        )
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }

    async fn cancel(&self, id: i64) -> Result<bool, StoreError> {
        let res = sqlx::query("UPDATE hangouts SET is_active = FALSE WHERE id = $1 AND is_active")
            .bind(id)
            .execute(&self.db)
            .await?;
        Ok(res.rows_affected() == 1)
    }

    async fn participants(&self, hangout_id: i64) -> Result<Vec<Participant>, StoreError> {
        let rows = sqlx::query_as::<_, Participant>(
            r#"
            SELECT id, hangout_id, user_id, joined_at, is_confirmed
              FROM hangout_participants
             WHERE hangout_id = $1
             ORDER BY joined_at ASC, id ASC
            "#,
        )
        .bind(hangout_id)
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }

    async fn join(&self, hangout_id: i64, user_id: i64) -> Result<JoinOutcome, StoreError> {
        let mut tx = self.db.begin().await.context("begin tx")?;

        let max: Option<i32> = sqlx::query_scalar(
            "SELECT max_participants FROM hangouts WHERE id = $1 AND is_active FOR UPDATE",
        )
        .bind(hangout_id)
        .fetch_optional(&mut *tx)
        .await?;
        let Some(max) = max else {
            return Ok(JoinOutcome::NotFound);
        };

        let already: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM hangout_participants WHERE hangout_id = $1 AND user_id = $2
            )
            "#,
        )
        .bind(hangout_id)
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;
        if already {
            return Err(StoreError::Duplicate(PARTICIPANT_UNIQUE.to_string()));
        }

        let count: i64 =
            sqlx::query_scalar("SELECT count(*) FROM hangout_participants WHERE hangout_id = $1")
                .bind(hangout_id)
                .fetch_one(&mut *tx)
                .await?;
        if count >= i64::from(max) {
            return Ok(JoinOutcome::Full);
        }

        let participant = sqlx::query_as::<_, Participant>(
            r#"
            INSERT INTO hangout_participants (hangout_id, user_id)
            VALUES ($1, $2)
            RETURNING id, hangout_id, user_id, joined_at, is_confirmed
            "#,
        )
        .bind(hangout_id)
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await.context("commit tx")?;
        Ok(JoinOutcome::Joined(participant))
    }

    async fn leave(&self, hangout_id: i64, user_id: i64) -> Result<bool, StoreError> {
        let res = sqlx::query(
            "DELETE FROM hangout_participants WHERE hangout_id = $1 AND user_id = $2",
        )
        .bind(hangout_id)
        .bind(user_id)
        .execute(&self.db)
        .await?;
        Ok(res.rows_affected() == 1)
    }

    async fn confirm(
        &self,
        hangout_id: i64,
        user_id: i64,
    ) -> Result<Option<Participant>, StoreError> {
        let row = sqlx::query_as::<_, Participant>(
            r#"
            UPDATE hangout_participants
               SET is_confirmed = TRUE
             WHERE hangout_id = $1 AND user_id = $2
            RETURNING id, hangout_id, user_id, joined_at, is_confirmed
            "#,
        )
        .bind(hangout_id)
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?;
        Ok(row)
    }
}
