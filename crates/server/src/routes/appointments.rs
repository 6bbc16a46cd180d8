//! Appointment handlers

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use deadpool_postgres::Pool;
use serde::{Deserialize, Serialize};

use super::MessageResponse;
use super::input::required_text;
use crate::auth::Claims;
use crate::db::{Appointment, AppointmentRepository};
use crate::error::AppError;

/// ISO-8601 local datetime as returned to clients
const OUTPUT_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

const INPUT_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Parse the datetime forms produced by browser date pickers.
///
/// Offsets are converted to UTC and dropped; a bare date means midnight.
pub fn parse_datetime(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();

    if let Some(dt) = INPUT_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
    {
        return Some(dt);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

#[derive(Debug, Serialize)]
pub struct AppointmentView {
    id: i32,
    title: String,
    datetime: String,
}

impl From<Appointment> for AppointmentView {
    fn from(a: Appointment) -> Self {
        Self {
            id: a.id,
            title: a.title,
            datetime: a.datetime.format(OUTPUT_FORMAT).to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateAppointmentRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub datetime: String,
}

#[derive(Serialize)]
pub struct CreatedAppointment {
    #[serde(flatten)]
    appointment: AppointmentView,
    message: &'static str,
}

/// GET /appointments - The caller's appointments, earliest first
pub async fn list(
    State(pool): State<Pool>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let appointments = AppointmentRepository::new(pool).list(claims.user_id).await?;
    let views: Vec<AppointmentView> = appointments.into_iter().map(Into::into).collect();
    Ok(Json(views))
}

/// POST /appointments - Schedule an appointment
pub async fn create(
    State(pool): State<Pool>,
    Extension(claims): Extension<Claims>,
    Json(body): Json<CreateAppointmentRequest>,
) -> Result<impl IntoResponse, AppError> {
    let (Some(title), Some(raw_datetime)) =
        (required_text(&body.title), required_text(&body.datetime))
    else {
        return Err(AppError::bad_request("Başlık ve tarih gereklidir"));
    };

    let datetime =
        parse_datetime(raw_datetime).ok_or_else(|| AppError::bad_request("Geçersiz tarih formatı"))?;

    let appointment = AppointmentRepository::new(pool)
        .create(claims.user_id, title, datetime)
        .await?;
    tracing::info!(user_id = claims.user_id, appointment_id = appointment.id, "Appointment created");

    Ok((
        StatusCode::CREATED,
        Json(CreatedAppointment {
            appointment: appointment.into(),
            message: "Randevu eklendi",
        }),
    ))
}

/// DELETE /appointments/{id} - Remove one of the caller's appointments
pub async fn delete(
    State(pool): State<Pool>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    if !AppointmentRepository::new(pool)
        .delete(claims.user_id, id)
        .await?
    {
        return Err(AppError::not_found("Randevu bulunamadı"));
    }

    Ok(Json(MessageResponse {
        message: "Randevu silindi",
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d)
            .and_then(|date| date.and_hms_opt(h, mi, s))
            .unwrap()
    }

    #[test]
    fn accepts_picker_formats() {
        assert_eq!(parse_datetime("2025-03-14T09:30"), Some(at(2025, 3, 14, 9, 30, 0)));
        assert_eq!(parse_datetime("2025-03-14T09:30:15"), Some(at(2025, 3, 14, 9, 30, 15)));
        assert_eq!(parse_datetime("2025-03-14 09:30"), Some(at(2025, 3, 14, 9, 30, 0)));
        assert_eq!(parse_datetime("2025-03-14"), Some(at(2025, 3, 14, 0, 0, 0)));
    }

    #[test]
    fn offsets_are_normalised_to_utc() {
        assert_eq!(
            parse_datetime("2025-03-14T09:30:00+03:00"),
            Some(at(2025, 3, 14, 6, 30, 0))
        );
        assert_eq!(
            parse_datetime("2025-03-14T09:30:00.000Z"),
            Some(at(2025, 3, 14, 9, 30, 0))
        );
    }

    #[test]
    fn rejects_other_text() {
        assert_eq!(parse_datetime("14.03.2025"), None);
        assert_eq!(parse_datetime("yarın"), None);
        assert_eq!(parse_datetime("2025-02-30"), None);
    }

    #[test]
    fn output_keeps_seconds() {
        let view = AppointmentView::from(Appointment {
            id: 1,
            title: "Diş".into(),
            datetime: at(2025, 3, 14, 9, 30, 0),
        });
        assert_eq!(view.datetime, "2025-03-14T09:30:00");
    }
}
