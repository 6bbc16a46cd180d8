//! Profile and avatar handlers

use axum::{
    Extension, Json,
    extract::{Multipart, State},
    response::IntoResponse,
};
use deadpool_postgres::Pool;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use std::path::PathBuf;

use super::MessageResponse;
use super::input::{optional_number, optional_text};
use crate::auth::Claims;
use crate::db::{ProfileUpdate, UserRepository};
use crate::error::AppError;

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp"];

/// Where avatars are stored and how their URLs are built
#[derive(Debug, Clone)]
pub struct UploadSettings {
    pub dir: PathBuf,
    pub public_base_url: String,
}

impl UploadSettings {
    pub fn avatar_url(&self, filename: &str) -> String {
        format!(
            "{}/uploads/{}",
            self.public_base_url.trim_end_matches('/'),
            filename
        )
    }
}

/// Reduce a client-supplied filename to a safe ASCII name.
///
/// Directory components are dropped, whitespace becomes `_` and anything
/// outside `[A-Za-z0-9._-]` is removed. Leading dots and underscores are
/// stripped so the result can never be hidden or relative.
pub fn sanitize_filename(raw: &str) -> String {
    let base = raw.rsplit(|c: char| c == '/' || c == '\\').next().unwrap_or_default();
    let cleaned: String = base
        .chars()
        .filter_map(|c| {
            if c.is_whitespace() {
                Some('_')
            } else if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                Some(c)
            } else {
                None
            }
        })
        .collect();

    cleaned.trim_start_matches(|c: char| c == '.' || c == '_').to_string()
}

fn has_image_extension(filename: &str) -> bool {
    filename.rsplit_once('.').is_some_and(|(stem, ext)| {
        !stem.is_empty()
            && IMAGE_EXTENSIONS
                .iter()
                .any(|allowed| ext.eq_ignore_ascii_case(allowed))
    })
}

fn or_blank<T: Into<JsonValue>>(value: Option<T>) -> JsonValue {
    value.map(Into::into).unwrap_or_else(|| JsonValue::String(String::new()))
}

/// GET /profile - Current user's profile
pub async fn get(
    State(pool): State<Pool>,
    Extension(claims): Extension<Claims>,
    Extension(uploads): Extension<UploadSettings>,
) -> Result<impl IntoResponse, AppError> {
    let repo = UserRepository::new(pool);
    let profile = repo
        .profile(claims.user_id)
        .await?
        .ok_or_else(|| AppError::not_found("Kullanıcı bulunamadı"))?;

    let avatar = profile
        .avatar
        .as_deref()
        .map(|file| uploads.avatar_url(file))
        .unwrap_or_default();

    let mut body = Map::new();
    body.insert("username".into(), profile.username.into());
    body.insert("firstname".into(), or_blank(profile.firstname));
    body.insert("lastname".into(), or_blank(profile.lastname));
    body.insert("gender".into(), or_blank(profile.gender));
    body.insert("age".into(), or_blank(profile.age));
    body.insert("height".into(), or_blank(profile.height));
    body.insert("weight".into(), or_blank(profile.weight));
    body.insert("chronic_diseases".into(), or_blank(profile.chronic));
    body.insert("avatar".into(), avatar.into());

    Ok(Json(JsonValue::Object(body)))
}

/// Profile form; numbers may arrive as strings
#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub firstname: Option<String>,
    pub lastname: Option<String>,
    pub age: Option<JsonValue>,
    pub height: Option<JsonValue>,
    pub weight: Option<JsonValue>,
    pub chronic_diseases: Option<String>,
}

impl UpdateProfileRequest {
    fn into_update(self) -> Result<ProfileUpdate, AppError> {
        Ok(ProfileUpdate {
            firstname: optional_text(self.firstname),
            lastname: optional_text(self.lastname),
            age: optional_number(self.age.as_ref(), "age")?,
            height: optional_number(self.height.as_ref(), "height")?,
            weight: optional_number(self.weight.as_ref(), "weight")?,
            chronic: optional_text(self.chronic_diseases),
        })
    }
}

/// POST /profile - Update the editable profile fields
pub async fn update(
    State(pool): State<Pool>,
    Extension(claims): Extension<Claims>,
    Json(body): Json<UpdateProfileRequest>,
) -> Result<impl IntoResponse, AppError> {
    let update = body.into_update()?;

    let repo = UserRepository::new(pool);
    if !repo.update_profile(claims.user_id, &update).await? {
        return Err(AppError::not_found("Kullanıcı bulunamadı"));
    }

    tracing::info!(user_id = claims.user_id, "Profile updated");
    Ok(Json(MessageResponse {
        message: "Profil güncellendi",
    }))
}

#[derive(Serialize)]
pub struct AvatarResponse {
    avatar: String,
}

/// POST /profile/avatar - Store a new profile picture
pub async fn upload_avatar(
    State(pool): State<Pool>,
    Extension(claims): Extension<Claims>,
    Extension(uploads): Extension<UploadSettings>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let mut upload = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some("avatar") {
            let filename = field.file_name().unwrap_or_default().to_string();
            let bytes = field.bytes().await?;
            upload = Some((filename, bytes));
            break;
        }
    }

    let Some((original_name, bytes)) = upload else {
        return Err(AppError::bad_request("Dosya yok"));
    };
    if bytes.is_empty() {
        return Err(AppError::bad_request("Dosya yok"));
    }

    let safe_name = sanitize_filename(&original_name);
    if !has_image_extension(&safe_name) {
        return Err(AppError::bad_request("Desteklenmeyen dosya türü"));
    }

    let stored_name = format!("{}_{}", uuid::Uuid::new_v4().simple(), safe_name);
    tokio::fs::create_dir_all(&uploads.dir)
        .await
        .map_err(|e| AppError::Internal(format!("Upload directory unavailable: {}", e)))?;
    tokio::fs::write(uploads.dir.join(&stored_name), &bytes)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to store avatar: {}", e)))?;

    let repo = UserRepository::new(pool);
    let previous = repo.set_avatar(claims.user_id, &stored_name).await?;

    if let Some(previous) = previous.filter(|p| p != &stored_name) {
        if let Err(e) = tokio::fs::remove_file(uploads.dir.join(&previous)).await {
            tracing::warn!(file = %previous, error = %e, "Could not remove previous avatar");
        }
    }

    tracing::info!(
        user_id = claims.user_id,
        file = %stored_name,
        size = bytes.len(),
        "Avatar stored"
    );

    Ok(Json(AvatarResponse {
        avatar: uploads.avatar_url(&stored_name),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_drops_directories_and_odd_characters() {
        assert_eq!(sanitize_filename("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_filename("C:\\Users\\ali\\my photo.png"), "my_photo.png");
        assert_eq!(sanitize_filename("özçekim.jpg"), "zekim.jpg");
        assert_eq!(sanitize_filename(".hidden.png"), "hidden.png");
        assert_eq!(sanitize_filename(".."), "");
    }

    #[test]
    fn only_image_extensions_are_accepted() {
        assert!(has_image_extension("avatar.PNG"));
        assert!(has_image_extension("me.jpeg"));
        assert!(!has_image_extension("script.html"));
        assert!(!has_image_extension(".png"));
        assert!(!has_image_extension("png"));
    }

    #[test]
    fn avatar_url_joins_base_and_file() {
        let uploads = UploadSettings {
            dir: PathBuf::from("uploads"),
            public_base_url: "http://127.0.0.1:5000/".into(),
        };
        assert_eq!(
            uploads.avatar_url("a.png"),
            "http://127.0.0.1:5000/uploads/a.png"
        );
    }

    #[test]
    fn blank_profile_fields_keep_stored_values() {
        let body: UpdateProfileRequest = serde_json::from_value(serde_json::json!({
            "firstname": "",
            "age": "34",
            "height": 172.5,
            "weight": "",
            "chronic_diseases": "Astım"
        }))
        .unwrap();
        let update = body.into_update().unwrap();
        assert_eq!(update.firstname, None);
        assert_eq!(update.lastname, None);
        assert_eq!(update.age, Some(34));
        assert_eq!(update.height, Some(172.5));
        assert_eq!(update.weight, None);
        assert_eq!(update.chronic.as_deref(), Some("Astım"));
    }
}
