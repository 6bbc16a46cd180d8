//! Registration and login

use axum::{Extension, Json, extract::State, response::IntoResponse};
use deadpool_postgres::Pool;
use health_core::Role;
use serde::{Deserialize, Serialize};

use super::input::{optional_text, required_text};
use crate::auth::{TokenKeys, hash_password, verify_password};
use crate::chat::ChatStore;
use crate::db::{NewUser, UserRepository};
use crate::error::AppError;

const EMPTY_CREDENTIALS: &str = "Kullanıcı adı ve şifre boş olamaz";

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub firstname: String,
    #[serde(default)]
    pub lastname: String,
    #[serde(default)]
    pub gender: String,
    pub role: Option<String>,
    pub specialization: Option<String>,
    pub license_number: Option<String>,
}

#[derive(Serialize)]
pub struct RegisterResponse {
    message: &'static str,
    role: Role,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    token: String,
    role: Role,
}

/// PBKDF2 with a high iteration count, kept off the async workers
async fn hash_blocking(password: String) -> Result<String, AppError> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| AppError::Internal(format!("Password hashing task failed: {}", e)))
}

async fn verify_blocking(password: String, stored: String) -> Result<bool, AppError> {
    tokio::task::spawn_blocking(move || verify_password(&password, &stored))
        .await
        .map_err(|e| AppError::Internal(format!("Password check task failed: {}", e)))
}

/// POST /register - Create a user or doctor account
pub async fn register(
    State(pool): State<Pool>,
    Extension(chats): Extension<ChatStore>,
    Json(body): Json<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    let username = required_text(&body.username).ok_or_else(|| AppError::bad_request(EMPTY_CREDENTIALS))?;
    if body.password.is_empty() {
        return Err(AppError::bad_request(EMPTY_CREDENTIALS));
    }

    let role = match optional_text(body.role.clone()) {
        Some(raw) => raw
            .parse::<Role>()
            .map_err(|_| AppError::bad_request("Geçersiz rol"))?,
        None => Role::User,
    };

    let (specialization, license_number) = match role {
        Role::Doctor => {
            let specialization = optional_text(body.specialization.clone());
            let license_number = optional_text(body.license_number.clone());
            if specialization.is_none() || license_number.is_none() {
                return Err(AppError::bad_request(
                    "Doktor kaydı için uzmanlık ve lisans numarası zorunludur",
                ));
            }
            (specialization, license_number)
        }
        Role::User => (None, None),
    };

    let password_hash = hash_blocking(body.password.clone()).await?;

    let repo = UserRepository::new(pool);
    let created = repo
        .create(&NewUser {
            username,
            password_hash: &password_hash,
            firstname: body.firstname.trim(),
            lastname: body.lastname.trim(),
            gender: body.gender.trim(),
            role,
            specialization: specialization.as_deref(),
            license_number: license_number.as_deref(),
        })
        .await?;

    let Some(user_id) = created else {
        return Err(AppError::bad_request("Kullanıcı zaten var"));
    };

    chats.reset(username);
    tracing::info!(user_id, username = %username, role = %role, "Registered account");

    Ok(Json(RegisterResponse {
        message: "Kayıt başarılı",
        role,
    }))
}

/// POST /login - Exchange credentials for a bearer token
pub async fn login(
    State(pool): State<Pool>,
    Extension(keys): Extension<TokenKeys>,
    Extension(chats): Extension<ChatStore>,
    Json(body): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let username = required_text(&body.username).ok_or_else(|| AppError::bad_request(EMPTY_CREDENTIALS))?;
    if body.password.is_empty() {
        return Err(AppError::bad_request(EMPTY_CREDENTIALS));
    }

    let repo = UserRepository::new(pool);
    let credentials = repo.credentials(username).await?;

    let Some(user) = credentials else {
        tracing::info!(username = %username, "Login for unknown user");
        return Err(AppError::Unauthorized(
            "Kullanıcı adı veya şifre hatalı".to_string(),
        ));
    };

    if !verify_blocking(body.password.clone(), user.password_hash).await? {
        tracing::info!(username = %username, "Login with wrong password");
        return Err(AppError::Unauthorized(
            "Kullanıcı adı veya şifre hatalı".to_string(),
        ));
    }

    let token = keys.issue(user.id, username, user.role)?;
    chats.open(username);

    Ok(Json(LoginResponse {
        token,
        role: user.role,
    }))
}
