use std::path::Path;

use studyvault_core::AppError;

use crate::kind::DocumentKind;

/// Generic content types browsers send when they cannot tell.
const GENERIC_CONTENT_TYPES: &[&str] = &["application/octet-stream", "binary/octet-stream", ""];

#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("File too large: {size} bytes (max: {max} bytes)")]
    FileTooLarge { size: usize, max: usize },

    #[error("Invalid file extension: {extension} (allowed: {allowed:?})")]
    InvalidExtension {
        extension: String,
        allowed: Vec<String>,
    },

    #[error("Content type {content_type} does not match extension '{extension}' (expected {expected})")]
    ContentTypeMismatch {
        content_type: String,
        extension: String,
        expected: &'static str,
    },

    #[error("Invalid filename: {0}")]
    InvalidFilename(String),

    #[error("Empty file")]
    EmptyFile,
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::FileTooLarge { .. } => AppError::PayloadTooLarge(err.to_string()),
            ValidationError::InvalidExtension { .. }
            | ValidationError::ContentTypeMismatch { .. } => {
                AppError::UnsupportedFileType(err.to_string())
            }
            ValidationError::InvalidFilename(_) | ValidationError::EmptyFile => {
                AppError::InvalidInput(err.to_string())
            }
        }
    }
}

/// Upload constraints for submitted documents.
#[derive(Debug, Clone)]
pub struct UploadValidator {
    max_file_size: usize,
    allowed_extensions: Vec<String>,
}

impl UploadValidator {
    pub fn new(max_file_size: usize, allowed_extensions: Vec<String>) -> Self {
        Self {
            max_file_size,
            allowed_extensions: allowed_extensions
                .into_iter()
                .map(|e| e.trim_start_matches('.').to_lowercase())
                .collect(),
        }
    }

    pub fn max_file_size(&self) -> usize {
        self.max_file_size
    }

    pub fn validate_file_size(&self, size: usize) -> Result<(), ValidationError> {
        if size == 0 {
            return Err(ValidationError::EmptyFile);
        }

        if size > self.max_file_size {
            return Err(ValidationError::FileTooLarge {
                size,
                max: self.max_file_size,
            });
        }

        Ok(())
    }

    /// Returns the lowercased extension when allowed.
    pub fn validate_extension(&self, filename: &str) -> Result<String, ValidationError> {
        let extension = Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .ok_or_else(|| ValidationError::InvalidFilename(filename.to_string()))?;

        if !self.allowed_extensions.contains(&extension)
            || DocumentKind::from_extension(&extension).is_none()
        {
            return Err(ValidationError::InvalidExtension {
                extension,
                allowed: self.allowed_extensions.clone(),
            });
        }

        Ok(extension)
    }

    /// Reject a declared content type that contradicts the extension.
    /// Generic types are accepted.
    pub fn validate_extension_content_type_match(
        &self,
        extension: &str,
        content_type: &str,
    ) -> Result<(), ValidationError> {
        let normalized = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_lowercase();
        if GENERIC_CONTENT_TYPES.contains(&normalized.as_str()) {
            return Ok(());
        }

        let Some(kind) = DocumentKind::from_extension(extension) else {
            return Ok(());
        };
        if normalized != kind.content_type() {
            return Err(ValidationError::ContentTypeMismatch {
                content_type: content_type.to_string(),
                extension: extension.to_string(),
                expected: kind.content_type(),
            });
        }
        Ok(())
    }

    /// Validate size, extension and declared type; returns the detected kind.
    pub fn validate_all(
        &self,
        filename: &str,
        content_type: &str,
        data: &[u8],
    ) -> Result<DocumentKind, ValidationError> {
        self.validate_file_size(data.len())?;
        let extension = self.validate_extension(filename)?;
        self.validate_extension_content_type_match(&extension, content_type)?;

        DocumentKind::detect(filename, data).ok_or(ValidationError::InvalidExtension {
            extension,
            allowed: self.allowed_extensions.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validator() -> UploadValidator {
        UploadValidator::new(
            1024,
            vec!["pdf".to_string(), ".DOCX".to_string(), "pptx".to_string()],
        )
    }

    #[test]
    fn size_limits() {
        let v = validator();
        assert!(v.validate_file_size(1024).is_ok());
        assert!(matches!(
            v.validate_file_size(1025),
            Err(ValidationError::FileTooLarge { size: 1025, max: 1024 })
        ));
        assert!(matches!(
            v.validate_file_size(0),
            Err(ValidationError::EmptyFile)
        ));
    }

    #[test]
    fn extensions_are_case_insensitive() {
        let v = validator();
        assert_eq!(v.validate_extension("Notes.DocX").unwrap(), "docx");
        assert!(v.validate_extension("old.doc").is_err());
        assert!(v.validate_extension("script.exe").is_err());
        assert!(matches!(
            v.validate_extension("noext"),
            Err(ValidationError::InvalidFilename(_))
        ));
    }

    #[test]
    fn content_type_must_match_extension() {
        let v = validator();
        assert!(v
            .validate_extension_content_type_match("pdf", "application/pdf")
            .is_ok());
        assert!(v
            .validate_extension_content_type_match("pdf", "application/octet-stream")
            .is_ok());
        assert!(v
            .validate_extension_content_type_match("pdf", "image/png")
            .is_err());
    }

    #[test]
    fn validate_all_detects_pdf() {
        let v = validator();
        let kind = v
            .validate_all("paper.pdf", "application/pdf", b"%PDF-1.4 x")
            .unwrap();
        assert_eq!(kind, DocumentKind::Pdf);
    }

    #[test]
    fn validation_errors_map_to_app_errors() {
        let too_large: AppError = ValidationError::FileTooLarge { size: 2, max: 1 }.into();
        assert!(matches!(too_large, AppError::PayloadTooLarge(_)));

        let bad_type: AppError = ValidationError::InvalidExtension {
            extension: "exe".to_string(),
            allowed: vec![],
        }
        .into();
        assert!(matches!(bad_type, AppError::UnsupportedFileType(_)));
    }
}
