use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::hangouts::repo_types::{Hangout, Participant};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateHangoutRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(with = "time::serde::rfc3339")]
    pub planned_date: OffsetDateTime,
    pub location: String,
    pub max_participants: i32,
    #[serde(default)]
    pub estimated_cost: Option<f64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HangoutResponse {
    pub id: i64,
    pub title: String,
    pub description: String,
    #[serde(with = "time::serde::rfc3339")]
    pub planned_date: OffsetDateTime,
    pub location: String,
    pub max_participants: i32,
    pub estimated_cost: Option<f64>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    pub created_by_user_id: i64,
}

impl From<Hangout> for HangoutResponse {
    fn from(h: Hangout) -> Self {
        Self {
            id: h.id,
            title: h.title,
            description: h.description,
            planned_date: h.planned_date,
            location: h.location,
            max_participants: h.max_participants,
            estimated_cost: h.estimated_cost,
            created_at: h.created_at,
            created_by_user_id: h.created_by_user_id,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantResponse {
    pub user_id: i64,
    pub hangout_id: i64,
    #[serde(with = "time::serde::rfc3339")]
    pub joined_at: OffsetDateTime,
    pub is_confirmed: bool,
}

impl From<Participant> for ParticipantResponse {
    fn from(p: Participant) -> Self {
        Self {
            user_id: p.user_id,
            hangout_id: p.hangout_id,
            joined_at: p.joined_at,
            is_confirmed: p.is_confirmed,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HangoutDetails {
    #[serde(flatten)]
    pub hangout: HangoutResponse,
    pub participants: Vec<ParticipantResponse>,
}
