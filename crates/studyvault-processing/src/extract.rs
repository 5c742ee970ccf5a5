//! Bounded plain-text excerpts from uploaded documents.
//!
//! Text is pulled page by page; the excerpt keeps the first `page_cap` pages in
//! order, joined with `\n`.

use async_trait::async_trait;
use bytes::Bytes;
use studyvault_core::AppError;

#[derive(Debug, thiserror::Error)]
pub enum ExtractionError {
    #[error("document could not be parsed: {0}")]
    Corrupt(String),

    #[error("no extractable text in document")]
    NoText,

    #[error("page cap must be at least 1")]
    InvalidPageCap,

    #[error("extraction task failed: {0}")]
    Task(String),
}

impl From<ExtractionError> for AppError {
    fn from(err: ExtractionError) -> Self {
        AppError::Extraction(err.to_string())
    }
}

/// Seam between the intake pipeline and the document parser.
#[async_trait]
pub trait TextExtractor: Send + Sync {
    async fn extract(&self, data: Bytes, page_cap: usize) -> Result<String, ExtractionError>;
}

/// Keep the first `page_cap` pages of already-extracted per-page text.
pub fn excerpt_from_pages<I, S>(pages: I, page_cap: usize) -> Result<String, ExtractionError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    if page_cap == 0 {
        return Err(ExtractionError::InvalidPageCap);
    }

    let excerpt = pages
        .into_iter()
        .take(page_cap)
        .map(|page| page.as_ref().trim().to_string())
        .collect::<Vec<_>>()
        .join("\n");

    if excerpt.trim().is_empty() {
        return Err(ExtractionError::NoText);
    }
    Ok(excerpt)
}

/// Extract an excerpt from PDF bytes. CPU bound; call from a blocking context.
#[cfg(feature = "pdf")]
pub fn extract_excerpt(data: &[u8], page_cap: usize) -> Result<String, ExtractionError> {
    if page_cap == 0 {
        return Err(ExtractionError::InvalidPageCap);
    }
    let pages = pdf_extract::extract_text_from_mem_by_pages(data)
        .map_err(|e| ExtractionError::Corrupt(e.to_string()))?;
    excerpt_from_pages(pages, page_cap)
}

/// `pdf-extract` on the blocking pool.
#[cfg(feature = "pdf")]
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfTextExtractor;

#[cfg(feature = "pdf")]
#[async_trait]
impl TextExtractor for PdfTextExtractor {
    async fn extract(&self, data: Bytes, page_cap: usize) -> Result<String, ExtractionError> {
        let size = data.len();
        let started = std::time::Instant::now();

        // pdf-extract panics on some malformed inputs; the join error covers that.
        let result = tokio::task::spawn_blocking(move || extract_excerpt(&data, page_cap))
            .await
            .map_err(|e| ExtractionError::Task(e.to_string()))?;

        match &result {
            Ok(excerpt) => tracing::debug!(
                size_bytes = size,
                excerpt_chars = excerpt.chars().count(),
                duration_ms = started.elapsed().as_millis() as u64,
                "PDF excerpt extracted"
            ),
            Err(e) => tracing::warn!(size_bytes = size, error = %e, "PDF extraction failed"),
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn excerpt_keeps_first_pages_in_order() {
        let pages = ["page one", "page two", "page three", "page four"];
        assert_eq!(excerpt_from_pages(pages, 2).unwrap(), "page one\npage two");
        assert_eq!(
            excerpt_from_pages(pages, 10).unwrap(),
            "page one\npage two\npage three\npage four"
        );
    }

    #[test]
    fn single_page_is_trimmed() {
        assert_eq!(
            excerpt_from_pages(["  Unit 1: Kinematics  "], 5).unwrap(),
            "Unit 1: Kinematics"
        );
    }

    #[test]
    fn blank_text_is_an_error() {
        assert!(matches!(
            excerpt_from_pages(["  ", "\n"], 5),
            Err(ExtractionError::NoText)
        ));
        assert!(matches!(
            excerpt_from_pages(Vec::<String>::new(), 5),
            Err(ExtractionError::NoText)
        ));
    }

    #[test]
    fn zero_page_cap_is_rejected() {
        assert!(matches!(
            excerpt_from_pages(["text"], 0),
            Err(ExtractionError::InvalidPageCap)
        ));
    }

    /// PDF with one Helvetica line per page: `PAGEMARK1`, `PAGEMARK2`, ...
    #[cfg(feature = "pdf")]
    fn marked_pdf(page_count: usize) -> Vec<u8> {
        use lopdf::content::{Content, Operation};
        use lopdf::{dictionary, Document, Object, Stream};

        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });

        let kids: Vec<Object> = (1..=page_count)
            .map(|n| {
                let content = Content {
                    operations: vec![
                        Operation::new("BT", vec![]),
                        Operation::new("Tf", vec!["F1".into(), 24.into()]),
                        Operation::new("Td", vec![72.into(), 700.into()]),
                        Operation::new(
                            "Tj",
                            vec![Object::string_literal(format!("PAGEMARK{}", n))],
                        ),
                        Operation::new("ET", vec![]),
                    ],
                };
                let content_id =
                    doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
                let page_id = doc.add_object(dictionary! {
                    "Type" => "Page",
                    "Parent" => pages_id,
                    "Contents" => content_id,
                });
                page_id.into()
            })
            .collect();

        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => page_count as i64,
                "Resources" => resources_id,
                "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut out = Vec::new();
        doc.save_to(&mut out).unwrap();
        out
    }

    #[cfg(feature = "pdf")]
    #[test]
    fn pdf_excerpt_stops_at_page_cap() {
        let excerpt = extract_excerpt(&marked_pdf(7), 5).unwrap();

        for n in 1..=5 {
            assert!(excerpt.contains(&format!("PAGEMARK{}", n)), "{}", excerpt);
        }
        assert!(!excerpt.contains("PAGEMARK6"), "{}", excerpt);
        assert!(!excerpt.contains("PAGEMARK7"), "{}", excerpt);
        assert_eq!(excerpt.lines().filter(|l| l.contains("PAGEMARK")).count(), 5);

        let first = excerpt.find("PAGEMARK1").unwrap();
        let fifth = excerpt.find("PAGEMARK5").unwrap();
        assert!(first < fifth);
    }

    #[cfg(feature = "pdf")]
    #[test]
    fn short_pdf_keeps_every_page() {
        let excerpt = extract_excerpt(&marked_pdf(2), 5).unwrap();
        assert!(excerpt.contains("PAGEMARK1"));
        assert!(excerpt.contains("PAGEMARK2"));
    }

    #[cfg(feature = "pdf")]
    #[tokio::test]
    async fn corrupt_pdf_fails_without_panicking_the_caller() {
        let result = PdfTextExtractor
            .extract(Bytes::from_static(b"%PDF-1.4 not really a pdf"), 5)
            .await;
        assert!(result.is_err());
    }

    #[test]
    fn extraction_error_maps_to_app_error() {
        let err: AppError = ExtractionError::NoText.into();
        assert!(matches!(err, AppError::Extraction(_)));
    }
}
