//! Account roles and doctor-question thread states

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// Account role stored in `users.role` and carried in bearer tokens
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Doctor,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Doctor => "doctor",
        }
    }

    /// Who a message posted by this role is attributed to in a question thread
    pub fn thread_sender(self) -> ThreadSender {
        match self {
            Role::Doctor => ThreadSender::Doctor,
            Role::User => ThreadSender::User,
        }
    }
}

impl FromStr for Role {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "doctor" => Ok(Role::Doctor),
            other => Err(CoreError::UnknownRole(other.to_string())),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status of a doctor question
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum QuestionStatus {
    Pending,
    Answered,
}

impl QuestionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            QuestionStatus::Pending => "pending",
            QuestionStatus::Answered => "answered",
        }
    }
}

impl FromStr for QuestionStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(QuestionStatus::Pending),
            "answered" => Ok(QuestionStatus::Answered),
            other => Err(CoreError::UnknownStatus(other.to_string())),
        }
    }
}

/// Author of a message inside a doctor-question thread
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ThreadSender {
    User,
    Doctor,
}

impl ThreadSender {
    pub fn as_str(self) -> &'static str {
        match self {
            ThreadSender::User => "user",
            ThreadSender::Doctor => "doctor",
        }
    }

    /// A doctor's message answers the question; a user's follow-up reopens it.
    pub fn resulting_status(self) -> QuestionStatus {
        match self {
            ThreadSender::Doctor => QuestionStatus::Answered,
            ThreadSender::User => QuestionStatus::Pending,
        }
    }
}

impl FromStr for ThreadSender {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(ThreadSender::User),
            "doctor" => Ok(ThreadSender::Doctor),
            other => Err(CoreError::UnknownSender(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_round_trips_through_str() {
        assert_eq!("doctor".parse::<Role>(), Ok(Role::Doctor));
        assert_eq!("user".parse::<Role>(), Ok(Role::User));
        assert_eq!(Role::Doctor.to_string(), "doctor");
    }

    #[test]
    fn unknown_role_is_rejected() {
        assert_eq!(
            "admin".parse::<Role>(),
            Err(CoreError::UnknownRole("admin".to_string()))
        );
    }

    #[test]
    fn doctor_messages_answer_and_user_messages_reopen() {
        assert_eq!(
            Role::Doctor.thread_sender().resulting_status(),
            QuestionStatus::Answered
        );
        assert_eq!(
            Role::User.thread_sender().resulting_status(),
            QuestionStatus::Pending
        );
    }

    #[test]
    fn serde_uses_lowercase_names() {
        let json = serde_json::to_string(&QuestionStatus::Answered).unwrap();
        assert_eq!(json, "\"answered\"");
        let role: Role = serde_json::from_str("\"doctor\"").unwrap();
        assert_eq!(role, Role::Doctor);
    }
}
