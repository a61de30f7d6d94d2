use time::OffsetDateTime;
use tracing::{info, warn};

use crate::{
    db::StoreError,
    error::{AppError, FieldError},
    hangouts::{
        dto::{CreateHangoutRequest, HangoutDetails, HangoutResponse, ParticipantResponse},
        repo::HangoutRepo,
        repo_types::{Hangout, JoinOutcome, NewHangout, PARTICIPANT_UNIQUE},
    },
};

const HANGOUT_FAILED: &str = "Hangout request failed";

fn validate(req: &CreateHangoutRequest, now: OffsetDateTime) -> Result<(), AppError> {
    let mut errors = Vec::new();
    let title = req.title.trim().chars().count();
    if !(1..=100).contains(&title) {
        errors.push(FieldError::new("title", "must be between 1 and 100 characters"));
    }
    if req.description.chars().count() > 500 {
        errors.push(FieldError::new("description", "must be at most 500 characters"));
    }
    let location = req.location.trim().chars().count();
    if !(1..=200).contains(&location) {
        errors.push(FieldError::new("location", "must be between 1 and 200 characters"));
    }
    if req.max_participants < 1 {
        errors.push(FieldError::new("maxParticipants", "must be at least 1"));
    }
    if matches!(req.estimated_cost, Some(c) if !c.is_finite() || c < 0.0) {
        errors.push(FieldError::new("estimatedCost", "must not be negative"));
    }
    if req.planned_date <= now {
        errors.push(FieldError::new("plannedDate", "must be in the future"));
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(AppError::Validation(errors))
    }
}

async fn load(hangouts: &dyn HangoutRepo, id: i64) -> Result<Hangout, AppError> {
    hangouts
        .find_active(id)
        .await
        .map_err(AppError::internal(HANGOUT_FAILED))?
        .ok_or_else(|| AppError::NotFound("Hangout not found".into()))
}

pub async fn create(
    hangouts: &dyn HangoutRepo,
    user_id: i64,
    req: CreateHangoutRequest,
) -> Result<HangoutResponse, AppError> {
    validate(&req, OffsetDateTime::now_utc())?;

    let hangout = hangouts
        .create(NewHangout {
            title: req.title.trim().to_string(),
            description: req.description,
            planned_date: req.planned_date,
            location: req.location.trim().to_string(),
            max_participants: req.max_participants,
            estimated_cost: req.estimated_cost,
            created_by_user_id: user_id,
        })
        .await
        .map_err(AppError::internal(HANGOUT_FAILED))?;

    info!(hangout_id = hangout.id, user_id, "hangout created");
    Ok(hangout.into())
}

pub async fn list(hangouts: &dyn HangoutRepo) -> Result<Vec<HangoutResponse>, AppError> {
    let rows = hangouts
        .list_active()
        .await
        .map_err(AppError::internal(HANGOUT_FAILED))?;
    Ok(rows.into_iter().map(HangoutResponse::from).collect())
}

pub async fn details(hangouts: &dyn HangoutRepo, id: i64) -> Result<HangoutDetails, AppError> {
    let hangout = load(hangouts, id).await?;
    let participants = hangouts
        .participants(id)
        .await
        .map_err(AppError::internal(HANGOUT_FAILED))?;
    Ok(HangoutDetails {
        hangout: hangout.into(),
        participants: participants.into_iter().map(ParticipantResponse::from).collect(),
    })
}

pub async fn join(
    hangouts: &dyn HangoutRepo,
    hangout_id: i64,
    user_id: i64,
) -> Result<ParticipantResponse, AppError> {
    match hangouts.join(hangout_id, user_id).await {
        Ok(JoinOutcome::Joined(p)) => {
            info!(hangout_id, user_id, "joined hangout");
            Ok(p.into())
        }
        Ok(JoinOutcome::Full) => Err(AppError::BadRequest("Hangout is full".into())),
        Ok(JoinOutcome::NotFound) => Err(AppError::NotFound("Hangout not found".into())),
        Err(StoreError::Duplicate(c)) if c == PARTICIPANT_UNIQUE => {
            warn!(hangout_id, user_id, "duplicate join");
            Err(AppError::BadRequest("Already joined this hangout".into()))
        }
        Err(e) => Err(AppError::internal(HANGOUT_FAILED)(e)),
    }
}

pub async fn leave(
    hangouts: &dyn HangoutRepo,
    hangout_id: i64,
    user_id: i64,
) -> Result<(), AppError> {
    load(hangouts, hangout_id).await?;
    let left = hangouts
        .leave(hangout_id, user_id)
        .await
        .map_err(AppError::internal(HANGOUT_FAILED))?;
    if !left {
        return Err(AppError::NotFound("Not a participant".into()));
    }
    info!(hangout_id, user_id, "left hangout");
    Ok(())
}

fn ensure_creator(hangout: &Hangout, user_id: i64) -> Result<(), AppError> {
    if hangout.created_by_user_id != user_id {
        warn!(hangout_id = hangout.id, user_id, "non-creator attempted creator action");
        return Err(AppError::Forbidden(
            "Only the creator can manage this hangout".into(),
        ));
    }
    Ok(())
}

pub async fn confirm(
    hangouts: &dyn HangoutRepo,
    hangout_id: i64,
    caller_id: i64,
    participant_user_id: i64,
) -> Result<ParticipantResponse, AppError> {
    let hangout = load(hangouts, hangout_id).await?;
    ensure_creator(&hangout, caller_id)?;

    let participant = hangouts
        .confirm(hangout_id, participant_user_id)
        .await
        .map_err(AppError::internal(HANGOUT_FAILED))?
        .ok_or_else(|| AppError::NotFound("Not a participant".into()))?;
    info!(hangout_id, user_id = participant_user_id, "participation confirmed");
    Ok(participant.into())
}

pub async fn cancel(
    hangouts: &dyn HangoutRepo,
    hangout_id: i64,
    caller_id: i64,
) -> Result<(), AppError> {
    let hangout = load(hangouts, hangout_id).await?;
    ensure_creator(&hangout, caller_id)?;

    if !hangouts
        .cancel(hangout_id)
        .await
        .map_err(AppError::internal(HANGOUT_FAILED))?
    {
        return Err(AppError::NotFound("Hangout not found".into()));
    }
    info!(hangout_id, "hangout cancelled");
    Ok(())
}
