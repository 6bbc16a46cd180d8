use deadpool_postgres::Pool;
use health_core::{HealthProfile, Role};
use tokio_postgres::Row;

use crate::error::AppError;

/// Account to be inserted by registration
pub struct NewUser<'a> {
    pub username: &'a str,
    pub password_hash: &'a str,
    pub firstname: &'a str,
    pub lastname: &'a str,
    pub gender: &'a str,
    pub role: Role,
    pub specialization: Option<&'a str>,
    pub license_number: Option<&'a str>,
}

/// What login needs to check a password and issue a token
pub struct UserCredentials {
    pub id: i32,
    pub password_hash: String,
    pub role: Role,
}

/// Editable profile as stored
pub struct UserProfile {
    pub username: String,
    pub firstname: Option<String>,
    pub lastname: Option<String>,
    pub gender: Option<String>,
    pub age: Option<i32>,
    pub height: Option<f64>,
    pub weight: Option<f64>,
    pub chronic: Option<String>,
    pub avatar: Option<String>,
}

/// Partial profile update; `None` keeps the stored value
#[derive(Debug, Default)]
pub struct ProfileUpdate {
    pub firstname: Option<String>,
    pub lastname: Option<String>,
    pub age: Option<i32>,
    pub height: Option<f64>,
    pub weight: Option<f64>,
    pub chronic: Option<String>,
}

/// Entry of the public doctor directory
pub struct DoctorSummary {
    pub id: i32,
    pub firstname: Option<String>,
    pub lastname: Option<String>,
    pub specialization: Option<String>,
}

fn role_from_row(row: &Row) -> Result<Role, AppError> {
    let raw: String = row.get("role");
    raw.parse()
        .map_err(|e| AppError::Internal(format!("Corrupt user row: {}", e)))
}

/// Repository for account and profile data
#[derive(Clone)]
pub struct UserRepository {
    pool: Pool,
}

impl UserRepository {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    /// Insert a new account. Returns `None` when the username is taken.
    pub async fn create(&self, user: &NewUser<'_>) -> Result<Option<i32>, AppError> {
        let client = self.pool.get().await?;
        let row = client
            .query_opt(
                "INSERT INTO users (username, password_hash, firstname, lastname, gender, role, specialization, license_number)
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                 ON CONFLICT (username) DO NOTHING
                 RETURNING id",
                &[
                    &user.username,
                    &user.password_hash,
                    &user.firstname,
                    &user.lastname,
                    &user.gender,
                    &user.role.as_str(),
                    &user.specialization,
                    &user.license_number,
                ],
            )
            .await?;

        Ok(row.map(|r| r.get(0)))
    }

    pub async fn credentials(&self, username: &str) -> Result<Option<UserCredentials>, AppError> {
        let client = self.pool.get().await?;
        let row = client
            .query_opt(
                "SELECT id, password_hash, role FROM users WHERE username = $1",
                &[&username],
            )
            .await?;

        row.map(|row| {
            Ok(UserCredentials {
                id: row.get("id"),
                password_hash: row.get("password_hash"),
                role: role_from_row(&row)?,
            })
        })
        .transpose()
    }

    pub async fn profile(&self, user_id: i32) -> Result<Option<UserProfile>, AppError> {
        let client = self.pool.get().await?;
        let row = client
            .query_opt(
                "SELECT username, firstname, lastname, gender, age, height, weight, chronic, avatar
                 FROM users WHERE id = $1",
                &[&user_id],
            )
            .await?;

        Ok(row.map(|row| UserProfile {
            username: row.get("username"),
            firstname: row.get("firstname"),
            lastname: row.get("lastname"),
            gender: row.get("gender"),
            age: row.get("age"),
            height: row.get("height"),
            weight: row.get("weight"),
            chronic: row.get("chronic"),
            avatar: row.get("avatar"),
        }))
    }

    /// Health fields used to personalise chat answers
    pub async fn health_profile(&self, user_id: i32) -> Result<HealthProfile, AppError> {
        let client = self.pool.get().await?;
        let row = client
            .query_opt(
                "SELECT age, height, weight, chronic FROM users WHERE id = $1",
                &[&user_id],
            )
            .await?;

        Ok(row
            .map(|row| HealthProfile {
                age: row.get("age"),
                height_cm: row.get("height"),
                weight_kg: row.get("weight"),
                chronic: row.get("chronic"),
            })
            .unwrap_or_default())
    }

    /// Apply a partial update. Returns false when the user does not exist.
    pub async fn update_profile(
        &self,
        user_id: i32,
        update: &ProfileUpdate,
    ) -> Result<bool, AppError> {
        let client = self.pool.get().await?;
        let updated = client
            .execute(
                "UPDATE users
                 SET firstname = COALESCE($1, firstname),
                     lastname = COALESCE($2, lastname),
                     age = COALESCE($3, age),
                     height = COALESCE($4, height),
                     weight = COALESCE($5, weight),
                     chronic = COALESCE($6, chronic)
                 WHERE id = $7",
                &[
                    &update.firstname,
                    &update.lastname,
                    &update.age,
                    &update.height,
                    &update.weight,
                    &update.chronic,
                    &user_id,
                ],
            )
            .await?;

        Ok(updated > 0)
    }

    /// Point the profile at a stored avatar file, returning the previous one
    pub async fn set_avatar(&self, user_id: i32, filename: &str) -> Result<Option<String>, AppError> {
        let client = self.pool.get().await?;
        let row = client
            .query_opt(
                "UPDATE users u SET avatar = $1
                 FROM (SELECT id, avatar FROM users WHERE id = $2) old
                 WHERE u.id = old.id
                 RETURNING old.avatar",
                &[&filename, &user_id],
            )
            .await?;

        Ok(row.and_then(|r| r.get(0)))
    }

    pub async fn doctors(&self) -> Result<Vec<DoctorSummary>, AppError> {
        let client = self.pool.get().await?;
        let rows = client
            .query(
                "SELECT id, firstname, lastname, specialization
                 FROM users WHERE role = 'doctor'
                 ORDER BY id",
                &[],
            )
            .await?;

        Ok(rows
            .iter()
            .map(|row| DoctorSummary {
                id: row.get("id"),
                firstname: row.get("firstname"),
                lastname: row.get("lastname"),
                specialization: row.get("specialization"),
            })
            .collect())
    }

    pub async fn is_doctor(&self, user_id: i32) -> Result<bool, AppError> {
        let client = self.pool.get().await?;
        let row = client
            .query_opt(
                "SELECT 1 FROM users WHERE id = $1 AND role = 'doctor'",
                &[&user_id],
            )
            .await?;

        Ok(row.is_some())
    }
}
