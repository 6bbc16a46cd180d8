//! Doctor question threads: directory, inbox, own questions and messages

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::NaiveDateTime;
use deadpool_postgres::Pool;
use health_core::{QuestionStatus, Role, ThreadSender};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use super::MessageResponse;
use super::input::{optional_number, required_text};
use crate::auth::Claims;
use crate::db::{
    AssignedQuestion, DoctorSummary, OwnQuestion, QuestionRepository, ThreadMessage,
    UserRepository,
};
use crate::error::AppError;

const LIST_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const MESSAGE_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

fn list_date(at: &NaiveDateTime) -> String {
    at.format(LIST_DATE_FORMAT).to_string()
}

#[derive(Serialize)]
pub struct DoctorView {
    id: i32,
    name: String,
    specialization: Option<String>,
}

impl From<DoctorSummary> for DoctorView {
    fn from(d: DoctorSummary) -> Self {
        let name = [d.firstname.as_deref(), d.lastname.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        Self {
            id: d.id,
            name,
            specialization: d.specialization,
        }
    }
}

/// GET /doctors - Public directory of doctors
pub async fn doctors(State(pool): State<Pool>) -> Result<impl IntoResponse, AppError> {
    let doctors = UserRepository::new(pool).doctors().await?;
    let views: Vec<DoctorView> = doctors.into_iter().map(Into::into).collect();
    Ok(Json(views))
}

#[derive(Debug, Deserialize)]
pub struct AskRequest {
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub message: String,
    pub doctor_id: Option<JsonValue>,
}

#[derive(Serialize)]
pub struct AskResponse {
    message: &'static str,
    question_id: i32,
}

/// POST /doctor-questions - Ask a doctor a question
pub async fn ask(
    State(pool): State<Pool>,
    Extension(claims): Extension<Claims>,
    Json(body): Json<AskRequest>,
) -> Result<impl IntoResponse, AppError> {
    let missing = || AppError::bad_request("Başlık, mesaj ve doktor seçimi zorunludur");

    let subject = required_text(&body.subject).ok_or_else(missing)?;
    let message = required_text(&body.message).ok_or_else(missing)?;
    let doctor_id: i32 = optional_number(body.doctor_id.as_ref(), "doctor_id")?.ok_or_else(missing)?;

    if !UserRepository::new(pool.clone()).is_doctor(doctor_id).await? {
        return Err(AppError::not_found("Doktor bulunamadı"));
    }

    let question_id = QuestionRepository::new(pool)
        .create(claims.user_id, doctor_id, subject, message)
        .await?;
    tracing::info!(question_id, user_id = claims.user_id, doctor_id, "Question created");

    Ok((
        StatusCode::CREATED,
        Json(AskResponse {
            message: "Soru oluşturuldu",
            question_id,
        }),
    ))
}

#[derive(Serialize)]
pub struct AssignedQuestionView {
    id: i32,
    subject: String,
    message: Option<String>,
    user_name: String,
    gender: Option<String>,
    status: QuestionStatus,
    doctor_reply: Option<String>,
    created_at: String,
}

impl From<AssignedQuestion> for AssignedQuestionView {
    fn from(q: AssignedQuestion) -> Self {
        Self {
            created_at: list_date(&q.created_at),
            id: q.id,
            subject: q.subject,
            message: q.message,
            user_name: q.user_name,
            gender: q.gender,
            status: q.status,
            doctor_reply: q.doctor_reply,
        }
    }
}

/// GET /doctor-questions - Inbox of the calling doctor
pub async fn inbox(
    State(pool): State<Pool>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    if claims.role != Role::Doctor {
        return Err(AppError::forbidden());
    }

    let questions = QuestionRepository::new(pool)
        .assigned_to(claims.user_id)
        .await?;
    let views: Vec<AssignedQuestionView> = questions.into_iter().map(Into::into).collect();
    Ok(Json(views))
}

#[derive(Serialize)]
pub struct OwnQuestionView {
    id: i32,
    subject: String,
    message: Option<String>,
    doctor_reply: Option<String>,
    user_reply: Option<String>,
    status: QuestionStatus,
    created_at: String,
}

impl From<OwnQuestion> for OwnQuestionView {
    fn from(q: OwnQuestion) -> Self {
        Self {
            created_at: list_date(&q.created_at),
            id: q.id,
            subject: q.subject,
            message: q.message,
            doctor_reply: q.doctor_reply,
            user_reply: q.user_reply,
            status: q.status,
        }
    }
}

/// GET /my-questions - Questions asked by the caller
pub async fn mine(
    State(pool): State<Pool>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let questions = QuestionRepository::new(pool).asked_by(claims.user_id).await?;
    let views: Vec<OwnQuestionView> = questions.into_iter().map(Into::into).collect();
    Ok(Json(views))
}

/// Load a thread and make sure the caller takes part in it
async fn authorize_thread(
    repo: &QuestionRepository,
    question_id: i32,
    claims: &Claims,
) -> Result<(), AppError> {
    let participants = repo
        .participants(question_id)
        .await?
        .ok_or_else(|| AppError::not_found("Soru bulunamadı"))?;

    if !participants.includes(claims.user_id) {
        tracing::warn!(question_id, user_id = claims.user_id, "Thread access denied");
        return Err(AppError::forbidden());
    }
    Ok(())
}

async fn post_to_thread(
    pool: Pool,
    question_id: i32,
    claims: &Claims,
    message: &str,
) -> Result<(), AppError> {
    let message = required_text(message).ok_or_else(|| AppError::bad_request("Mesaj boş olamaz"))?;

    let repo = QuestionRepository::new(pool);
    authorize_thread(&repo, question_id, claims).await?;

    let sender: ThreadSender = claims.role.thread_sender();
    repo.add_message(question_id, sender, message).await?;
    tracing::info!(question_id, sender = sender.as_str(), "Thread message added");
    Ok(())
}

#[derive(Debug, Deserialize)]
pub struct ThreadMessageRequest {
    #[serde(default)]
    pub message: String,
}

/// POST /doctor-question/{id}/messages - Continue a thread
pub async fn add_message(
    State(pool): State<Pool>,
    Extension(claims): Extension<Claims>,
    Path(question_id): Path<i32>,
    Json(body): Json<ThreadMessageRequest>,
) -> Result<impl IntoResponse, AppError> {
    post_to_thread(pool, question_id, &claims, &body.message).await?;
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: "Mesaj eklendi",
        }),
    ))
}

#[derive(Debug, Deserialize)]
pub struct ReplyRequest {
    #[serde(default)]
    pub reply: String,
}

/// POST /doctor-question/{id}/reply - Doctor panel reply
pub async fn reply(
    State(pool): State<Pool>,
    Extension(claims): Extension<Claims>,
    Path(question_id): Path<i32>,
    Json(body): Json<ReplyRequest>,
) -> Result<impl IntoResponse, AppError> {
    if claims.role != Role::Doctor {
        return Err(AppError::forbidden());
    }

    post_to_thread(pool, question_id, &claims, &body.reply).await?;
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: "Mesaj eklendi",
        }),
    ))
}

#[derive(Serialize)]
pub struct ThreadMessageView {
    id: i32,
    sender: ThreadSender,
    message: String,
    created_at: String,
}

impl From<ThreadMessage> for ThreadMessageView {
    fn from(m: ThreadMessage) -> Self {
        Self {
            id: m.id,
            sender: m.sender,
            message: m.message,
            created_at: m.created_at.format(MESSAGE_DATE_FORMAT).to_string(),
        }
    }
}

/// GET /doctor-question/{id}/messages - Full thread, oldest first
pub async fn messages(
    State(pool): State<Pool>,
    Extension(claims): Extension<Claims>,
    Path(question_id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let repo = QuestionRepository::new(pool);
    authorize_thread(&repo, question_id, &claims).await?;

    let messages = repo.messages(question_id).await?;
    let views: Vec<ThreadMessageView> = messages.into_iter().map(Into::into).collect();
    Ok(Json(views))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn doctor_name_joins_present_parts() {
        let view = DoctorView::from(DoctorSummary {
            id: 4,
            firstname: Some("Zeynep".into()),
            lastname: Some(" Kaya ".into()),
            specialization: Some("Kardiyoloji".into()),
        });
        assert_eq!(view.name, "Zeynep Kaya");

        let view = DoctorView::from(DoctorSummary {
            id: 5,
            firstname: Some("Mehmet".into()),
            lastname: None,
            specialization: None,
        });
        assert_eq!(view.name, "Mehmet");
    }

    #[test]
    fn own_question_uses_list_date_format() {
        let created_at = NaiveDate::from_ymd_opt(2025, 1, 2)
            .and_then(|d| d.and_hms_micro_opt(8, 5, 9, 123_456))
            .unwrap();
        let view = OwnQuestionView::from(OwnQuestion {
            id: 1,
            subject: "Baş ağrısı".into(),
            message: Some("Sabahları başım ağrıyor".into()),
            doctor_reply: None,
            user_reply: None,
            status: QuestionStatus::Pending,
            created_at,
        });
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["created_at"], "2025-01-02 08:05:09");
        assert_eq!(json["status"], "pending");
        assert!(json["doctor_reply"].is_null());
    }
}
