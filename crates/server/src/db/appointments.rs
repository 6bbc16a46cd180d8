use chrono::NaiveDateTime;
use deadpool_postgres::Pool;

use crate::error::AppError;

/// A stored appointment
#[derive(Debug, Clone)]
pub struct Appointment {
    pub id: i32,
    pub title: String,
    pub datetime: NaiveDateTime,
}

#[derive(Clone)]
pub struct AppointmentRepository {
    pool: Pool,
}

impl AppointmentRepository {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    /// Appointments owned by `user_id`, earliest first
    pub async fn list(&self, user_id: i32) -> Result<Vec<Appointment>, AppError> {
        let client = self.pool.get().await?;
        let rows = client
            .query(
                "SELECT id, title, datetime FROM appointments
                 WHERE user_id = $1
                 ORDER BY datetime, id",
                &[&user_id],
            )
            .await?;

        Ok(rows
            .iter()
            .map(|row| Appointment {
                id: row.get("id"),
                title: row.get("title"),
                datetime: row.get("datetime"),
            })
            .collect())
    }

    pub async fn create(
        &self,
        user_id: i32,
        title: &str,
        datetime: NaiveDateTime,
    ) -> Result<Appointment, AppError> {
        let client = self.pool.get().await?;
        let row = client
            .query_one(
                "INSERT INTO appointments (user_id, title, datetime)
                 VALUES ($1, $2, $3)
                 RETURNING id, title, datetime",
                &[&user_id, &title, &datetime],
            )
            .await?;

        Ok(Appointment {
            id: row.get("id"),
            title: row.get("title"),
            datetime: row.get("datetime"),
        })
    }

    /// Delete one of the user's appointments. Returns false when no row matched.
    pub async fn delete(&self, user_id: i32, id: i32) -> Result<bool, AppError> {
        let client = self.pool.get().await?;
        let deleted = client
            .execute(
                "DELETE FROM appointments WHERE id = $1 AND user_id = $2",
                &[&id, &user_id],
            )
            .await?;

        Ok(deleted > 0)
    }
}
