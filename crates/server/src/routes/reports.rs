//! Lab report upload and analysis

use axum::{
    Extension, Json,
    extract::Multipart,
    response::IntoResponse,
};
use health_core::{ChatLine, lab, prompt};

use super::chat::ReplyResponse;
use crate::ai::{Assistant, assistant::REPORT_FALLBACK};
use crate::auth::Claims;
use crate::chat::ChatStore;
use crate::error::AppError;
use crate::pdf;

/// POST /upload_pdf - Flag out-of-range lab values and ask the model for advice
pub async fn upload_pdf(
    Extension(claims): Extension<Claims>,
    Extension(chats): Extension<ChatStore>,
    Extension(assistant): Extension<Assistant>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let mut upload = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some("pdf") {
            let filename = field.file_name().unwrap_or_default().to_string();
            let bytes = field.bytes().await?;
            upload = Some((filename, bytes));
            break;
        }
    }

    let Some((filename, bytes)) = upload else {
        return Err(AppError::bad_request("PDF dosyası bulunamadı"));
    };
    if !pdf::has_pdf_extension(&filename) {
        return Err(AppError::bad_request("Yalnızca PDF dosyaları kabul edilir"));
    }

    let text = pdf::extract_text(bytes.to_vec()).await?;
    let findings = lab::analyze(&text);
    metrics::counter!("lab_findings_total").increment(findings.len() as u64);
    tracing::info!(
        username = %claims.username,
        file = %filename,
        chars = text.chars().count(),
        findings = findings.len(),
        "Lab report analysed"
    );

    let ai_reply = assistant
        .ask("report", &prompt::report_prompt(&text), REPORT_FALLBACK)
        .await;
    let reply = prompt::compose_report_reply(&findings, &ai_reply);

    chats.append(
        &claims.username,
        ChatLine::user(format!("[PDF dosyası yüklendi] {}", filename)),
    );
    chats.append(
        &claims.username,
        ChatLine::bot(format!("[PDF Analizi]\n{}", reply)),
    );

    Ok(Json(ReplyResponse { reply }))
}
