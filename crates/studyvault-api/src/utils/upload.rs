//! Multipart parsing for document submissions

use axum::extract::multipart::MultipartError;
use axum::extract::Multipart;
use axum::http::StatusCode;
use bytes::Bytes;
use studyvault_core::models::{Category, NewSubmission};
use studyvault_core::AppError;

const MAX_FILENAME_LENGTH: usize = 255;

fn multipart_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(e.body_text())
    } else {
        AppError::InvalidInput(format!("Failed to read multipart: {}", e.body_text()))
    }
}

fn required(value: Option<String>, field: &str) -> Result<String, AppError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::InvalidInput(format!("Missing required field: {}", field)))
}

fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Read the submission form: exactly one `file` part plus the metadata fields.
/// Unknown fields are ignored.
pub async fn extract_submission_form(mut multipart: Multipart) -> Result<NewSubmission, AppError> {
    let mut file: Option<(Bytes, Option<String>, Option<String>)> = None;
    let mut title = None;
    let mut subject = None;
    let mut description = None;
    let mut department = None;
    let mut category = None;
    let mut submitter = None;
    let mut submitter_id = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let field_name = field.name().map(|s| s.to_string()).unwrap_or_default();

        if field_name == "file" {
            if file.is_some() {
                return Err(AppError::InvalidInput(
                    "Multiple file fields are not allowed; send exactly one field named 'file'"
                        .to_string(),
                ));
            }
            let filename = field.file_name().map(str::to_string);
            let content_type = field.content_type().map(str::to_string);
            let data = field.bytes().await.map_err(multipart_error)?;
            file = Some((data, filename, content_type));
            continue;
        }

        let slot = match field_name.as_str() {
            "title" => &mut title,
            "subject" => &mut subject,
            "description" => &mut description,
            "department" => &mut department,
            "category" => &mut category,
            "submitter" | "uploaded_by" => &mut submitter,
            "submitter_id" => &mut submitter_id,
            _ => continue,
        };
        *slot = Some(field.text().await.map_err(multipart_error)?);
    }

    let (data, filename, content_type) =
        file.ok_or_else(|| AppError::InvalidInput("No file provided".to_string()))?;

    let category = required(category, "category")?
        .parse::<Category>()
        .map_err(|e| AppError::InvalidInput(e.to_string()))?;

    Ok(NewSubmission {
        title: required(title, "title")?,
        subject: required(subject, "subject")?,
        description: optional(description),
        department: required(department, "department")?,
        category,
        submitter: required(submitter, "submitter")?,
        submitter_id: optional(submitter_id),
        file_name: sanitize_filename(filename.as_deref().unwrap_or("document"))?,
        content_type: content_type.unwrap_or_else(|| "application/octet-stream".to_string()),
        data,
    })
}

/// Strip directories and replace anything outside `[A-Za-z0-9._-]`.
pub fn sanitize_filename(filename: &str) -> Result<String, AppError> {
    if filename.contains("..") {
        return Err(AppError::InvalidInput(
            "Filename contains invalid path traversal".to_string(),
        ));
    }

    let filename_only = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(filename);

    let sanitized: String = filename_only
        .chars()
        .take(MAX_FILENAME_LENGTH)
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    if sanitized.trim_matches(['_', '.']).is_empty() {
        return Err(AppError::InvalidInput(format!(
            "Invalid filename: {}",
            filename
        )));
    }

    Ok(sanitized)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_filename_rejects_path_traversal() {
        assert!(sanitize_filename("..").is_err());
        assert!(sanitize_filename("foo/../bar.pdf").is_err());
        assert!(sanitize_filename("....").is_err());
    }

    #[test]
    fn sanitize_filename_strips_directories_and_symbols() {
        assert_eq!(sanitize_filename("notes.pdf").unwrap(), "notes.pdf");
        assert_eq!(
            sanitize_filename("C:\\Users\\me\\DSA Unit 1.pdf").unwrap(),
            "DSA_Unit_1.pdf"
        );
        assert_eq!(sanitize_filename("dir/lab-manual_2.docx").unwrap(), "lab-manual_2.docx");
    }

    #[test]
    fn sanitize_filename_rejects_empty_names() {
        assert!(sanitize_filename("").is_err());
        assert!(sanitize_filename("???").is_err());
    }

    #[test]
    fn required_fields_are_trimmed() {
        assert_eq!(required(Some("  CS ".to_string()), "department").unwrap(), "CS");
        assert!(required(Some("   ".to_string()), "department").is_err());
        assert!(required(None, "title").is_err());
        assert_eq!(optional(Some(" ".to_string())), None);
    }
}
