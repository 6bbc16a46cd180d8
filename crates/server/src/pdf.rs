//! PDF text extraction for uploaded lab reports

use crate::error::AppError;

/// Extract the text layer of every page, in page order.
///
/// Parsing is CPU-bound and the underlying parser may panic on malformed
/// files, so it runs on the blocking pool and a panic is reported as an
/// unreadable document.
pub async fn extract_text(bytes: Vec<u8>) -> Result<String, AppError> {
    let result = tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&bytes))
        .await
        .map_err(|e| {
            tracing::warn!(error = %e, "PDF parser aborted");
            AppError::bad_request("PDF dosyası okunamadı")
        })?;

    result.map_err(|e| {
        tracing::warn!(error = %e, "PDF text extraction failed");
        AppError::bad_request("PDF dosyası okunamadı")
    })
}

/// True when the uploaded filename carries a `.pdf` extension
pub fn has_pdf_extension(filename: &str) -> bool {
    filename
        .rsplit_once('.')
        .is_some_and(|(_, ext)| ext.eq_ignore_ascii_case("pdf"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pdf_extension_is_case_insensitive() {
        assert!(has_pdf_extension("tahlil.pdf"));
        assert!(has_pdf_extension("TAHLIL.PDF"));
        assert!(!has_pdf_extension("tahlil.png"));
        assert!(!has_pdf_extension("pdf"));
    }

    #[tokio::test]
    async fn garbage_bytes_are_rejected() {
        let result = extract_text(b"not a pdf at all".to_vec()).await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }
}
