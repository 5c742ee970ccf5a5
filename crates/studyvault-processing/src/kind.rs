use std::fmt::{Display, Formatter, Result as FmtResult};
use std::path::Path;

/// Accepted document formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentKind {
    Pdf,
    Doc,
    Docx,
    Ppt,
    Pptx,
}

const PDF_MAGIC: &[u8] = b"%PDF";

impl DocumentKind {
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.trim_start_matches('.').to_lowercase().as_str() {
            "pdf" => Some(DocumentKind::Pdf),
            "doc" => Some(DocumentKind::Doc),
            "docx" => Some(DocumentKind::Docx),
            "ppt" => Some(DocumentKind::Ppt),
            "pptx" => Some(DocumentKind::Pptx),
            _ => None,
        }
    }

    /// Detect the kind of an upload. The `%PDF` magic wins over the file
    /// name; everything else is recognized by extension.
    pub fn detect(file_name: &str, data: &[u8]) -> Option<Self> {
        if data.starts_with(PDF_MAGIC) {
            return Some(DocumentKind::Pdf);
        }
        Path::new(file_name)
            .extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }

    pub fn extension(&self) -> &'static str {
        match self {
            DocumentKind::Pdf => "pdf",
            DocumentKind::Doc => "doc",
            DocumentKind::Docx => "docx",
            DocumentKind::Ppt => "ppt",
            DocumentKind::Pptx => "pptx",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            DocumentKind::Pdf => "application/pdf",
            DocumentKind::Doc => "application/msword",
            DocumentKind::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
            DocumentKind::Ppt => "application/vnd.ms-powerpoint",
            DocumentKind::Pptx => {
                "application/vnd.openxmlformats-officedocument.presentationml.presentation"
            }
        }
    }

    /// Only PDFs go through extraction and classification.
    pub fn is_classifiable(&self) -> bool {
        matches!(self, DocumentKind::Pdf)
    }
}

impl Display for DocumentKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.extension())
    }
}
