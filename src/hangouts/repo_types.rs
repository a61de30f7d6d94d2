use sqlx::FromRow;
use time::OffsetDateTime;

pub const PARTICIPANT_UNIQUE: &str = "hangout_participants_hangout_user_key";

#[derive(Debug, Clone, FromRow)]
pub struct Hangout {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub planned_date: OffsetDateTime,
    pub location: String,
    pub max_participants: i32,
    pub estimated_cost: Option<f64>,
    pub created_at: OffsetDateTime,
    pub is_active: bool, // false once the creator cancels
    pub created_by_user_id: i64,
}

#[derive(Debug, Clone)]
pub struct NewHangout {
    pub title: String,
    pub description: String,
    pub planned_date: OffsetDateTime,
    pub location: String,
    pub max_participants: i32,
    pub estimated_cost: Option<f64>,
    pub created_by_user_id: i64,
}

#[derive(Debug, Clone, FromRow)]
pub struct Participant {
    pub id: i64,
    pub hangout_id: i64,
    pub user_id: i64,
    pub joined_at: OffsetDateTime,
    pub is_confirmed: bool,
}

#[derive(Debug)]
pub enum JoinOutcome {
    Joined(Participant),
    Full,
    NotFound,
}
