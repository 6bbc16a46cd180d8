//! Doctor question threads
//!
//! A question belongs to the user who asked it and the doctor it was
//! assigned to. Its messages form a flat thread; the question status tracks
//! who is expected to answer next.

use chrono::NaiveDateTime;
use deadpool_postgres::Pool;
use health_core::{QuestionStatus, ThreadSender};
use tokio_postgres::Row;

use crate::error::AppError;

/// The two accounts allowed to read and write a thread
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThreadParticipants {
    pub user_id: i32,
    pub doctor_id: i32,
}

impl ThreadParticipants {
    pub fn includes(&self, account_id: i32) -> bool {
        self.user_id == account_id || self.doctor_id == account_id
    }
}

/// Row of a doctor's inbox
#[derive(Debug, Clone)]
pub struct AssignedQuestion {
    pub id: i32,
    pub subject: String,
    /// First message of the asking user
    pub message: Option<String>,
    pub user_name: String,
    pub gender: Option<String>,
    pub status: QuestionStatus,
    /// Latest doctor message
    pub doctor_reply: Option<String>,
    pub created_at: NaiveDateTime,
}

/// Row of a user's own question list
#[derive(Debug, Clone)]
pub struct OwnQuestion {
    pub id: i32,
    pub subject: String,
    pub message: Option<String>,
    pub doctor_reply: Option<String>,
    /// Latest user message after the opening one
    pub user_reply: Option<String>,
    pub status: QuestionStatus,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone)]
pub struct ThreadMessage {
    pub id: i32,
    pub sender: ThreadSender,
    pub message: String,
    pub created_at: NaiveDateTime,
}

fn corrupt(err: impl std::fmt::Display) -> AppError {
    AppError::Internal(format!("Corrupt question row: {}", err))
}

fn status_from_row(row: &Row) -> Result<QuestionStatus, AppError> {
    row.get::<_, String>("status").parse().map_err(corrupt)
}

const FIRST_USER_MESSAGE: &str = "(SELECT m.message FROM doctor_messages m
      WHERE m.question_id = q.id AND m.sender = 'user'
      ORDER BY m.created_at, m.id LIMIT 1)";

const LATEST_DOCTOR_MESSAGE: &str = "(SELECT m.message FROM doctor_messages m
      WHERE m.question_id = q.id AND m.sender = 'doctor'
      ORDER BY m.created_at DESC, m.id DESC LIMIT 1)";

#[derive(Clone)]
pub struct QuestionRepository {
    pool: Pool,
}

impl QuestionRepository {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    /// Open a pending question together with its first message
    pub async fn create(
        &self,
        user_id: i32,
        doctor_id: i32,
        subject: &str,
        message: &str,
    ) -> Result<i32, AppError> {
        let mut client = self.pool.get().await?;
        let tx = client.transaction().await?;

        let row = tx
            .query_one(
                "INSERT INTO doctor_questions (user_id, doctor_id, subject, status)
                 VALUES ($1, $2, $3, $4)
                 RETURNING id",
                &[
                    &user_id,
                    &doctor_id,
                    &subject,
                    &QuestionStatus::Pending.as_str(),
                ],
            )
            .await?;
        let question_id: i32 = row.get(0);

        tx.execute(
            "INSERT INTO doctor_messages (question_id, sender, message) VALUES ($1, $2, $3)",
            &[&question_id, &ThreadSender::User.as_str(), &message],
        )
        .await?;

        tx.commit().await?;
        Ok(question_id)
    }

    pub async fn participants(&self, question_id: i32) -> Result<Option<ThreadParticipants>, AppError> {
        let client = self.pool.get().await?;
        let row = client
            .query_opt(
                "SELECT user_id, doctor_id FROM doctor_questions WHERE id = $1",
                &[&question_id],
            )
            .await?;

        Ok(row.map(|row| ThreadParticipants {
            user_id: row.get("user_id"),
            doctor_id: row.get("doctor_id"),
        }))
    }

    /// Append a message and move the question to the sender's resulting status
    pub async fn add_message(
        &self,
        question_id: i32,
        sender: ThreadSender,
        message: &str,
    ) -> Result<(), AppError> {
        let mut client = self.pool.get().await?;
        let tx = client.transaction().await?;

        tx.execute(
            "INSERT INTO doctor_messages (question_id, sender, message) VALUES ($1, $2, $3)",
            &[&question_id, &sender.as_str(), &message],
        )
        .await?;
        tx.execute(
            "UPDATE doctor_questions SET status = $1 WHERE id = $2",
            &[&sender.resulting_status().as_str(), &question_id],
        )
        .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Inbox of a doctor, newest first
    pub async fn assigned_to(&self, doctor_id: i32) -> Result<Vec<AssignedQuestion>, AppError> {
        let client = self.pool.get().await?;
        let sql = format!(
            "SELECT q.id, q.subject, q.status, q.created_at,
                    u.username AS user_name, u.gender,
                    {FIRST_USER_MESSAGE} AS message,
                    {LATEST_DOCTOR_MESSAGE} AS doctor_reply
             FROM doctor_questions q
             JOIN users u ON u.id = q.user_id
             WHERE q.doctor_id = $1
             ORDER BY q.created_at DESC, q.id DESC"
        );
        let rows = client.query(sql.as_str(), &[&doctor_id]).await?;

        rows.iter()
            .map(|row| {
                Ok(AssignedQuestion {
                    id: row.get("id"),
                    subject: row.get("subject"),
                    message: row.get("message"),
                    user_name: row.get("user_name"),
                    gender: row.get("gender"),
                    status: status_from_row(row)?,
                    doctor_reply: row.get("doctor_reply"),
                    created_at: row.get("created_at"),
                })
            })
            .collect()
    }

    /// Questions asked by a user, newest first
    pub async fn asked_by(&self, user_id: i32) -> Result<Vec<OwnQuestion>, AppError> {
        let client = self.pool.get().await?;
        let sql = format!(
            "SELECT q.id, q.subject, q.status, q.created_at,
                    {FIRST_USER_MESSAGE} AS message,
                    {LATEST_DOCTOR_MESSAGE} AS doctor_reply,
                    (SELECT m.message FROM doctor_messages m
                      WHERE m.question_id = q.id AND m.sender = 'user'
                      ORDER BY m.created_at DESC, m.id DESC
                      LIMIT 1) AS latest_user_message,
                    (SELECT COUNT(*) FROM doctor_messages m
                      WHERE m.question_id = q.id AND m.sender = 'user') AS user_messages
             FROM doctor_questions q
             WHERE q.user_id = $1
             ORDER BY q.created_at DESC, q.id DESC"
        );
        let rows = client.query(sql.as_str(), &[&user_id]).await?;

        rows.iter()
            .map(|row| {
                let user_messages: i64 = row.get("user_messages");
                // the opening message is not a reply
                let user_reply = if user_messages > 1 {
                    row.get("latest_user_message")
                } else {
                    None
                };
                Ok(OwnQuestion {
                    id: row.get("id"),
                    subject: row.get("subject"),
                    message: row.get("message"),
                    doctor_reply: row.get("doctor_reply"),
                    user_reply,
                    status: status_from_row(row)?,
                    created_at: row.get("created_at"),
                })
            })
            .collect()
    }

    /// Thread messages, oldest first
    pub async fn messages(&self, question_id: i32) -> Result<Vec<ThreadMessage>, AppError> {
        let client = self.pool.get().await?;
        let rows = client
            .query(
                "SELECT id, sender, message, created_at FROM doctor_messages
                 WHERE question_id = $1
                 ORDER BY created_at, id",
                &[&question_id],
            )
            .await?;

        rows.iter()
            .map(|row| {
                Ok(ThreadMessage {
                    id: row.get("id"),
                    sender: row.get::<_, String>("sender").parse().map_err(corrupt)?,
                    message: row.get("message"),
                    created_at: row.get("created_at"),
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn participants_include_asker_and_doctor_only() {
        let thread = ThreadParticipants {
            user_id: 3,
            doctor_id: 7,
        };
        assert!(thread.includes(3));
        assert!(thread.includes(7));
        assert!(!thread.includes(4));
    }
}
