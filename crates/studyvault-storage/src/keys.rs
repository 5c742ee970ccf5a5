//! Shared key generation for storage backends.

use std::path::Path;

use uuid::Uuid;

/// Generate `{prefix}/{unix_millis}-{short_id}.{ext}` for an uploaded file.
///
/// The original file name only contributes its (lowercased) extension. Files
/// without one get `bin`.
pub fn generate_storage_key(prefix: &str, filename: &str) -> String {
    let ext = Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .filter(|e| !e.is_empty() && e.chars().all(|c| c.is_ascii_alphanumeric()))
        .unwrap_or_else(|| "bin".to_string());
    let id = Uuid::new_v4().simple().to_string();
    let prefix = prefix.trim_matches('/');

    format!(
        "{}/{}-{}.{}",
        prefix,
        chrono::Utc::now().timestamp_millis(),
        &id[..8],
        ext
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_uses_prefix_and_extension() {
        let key = generate_storage_key("question-paper", "DSA Mid Term.PDF");
        assert!(key.starts_with("question-paper/"));
        assert!(key.ends_with(".pdf"));
        assert!(!key.contains(' '));
    }

    #[test]
    fn key_without_extension_falls_back() {
        let key = generate_storage_key("/lab-manual/", "README");
        assert!(key.starts_with("lab-manual/"));
        assert!(key.ends_with(".bin"));
    }

    #[test]
    fn keys_are_unique() {
        let a = generate_storage_key("study-material", "a.pdf");
        let b = generate_storage_key("study-material", "a.pdf");
        assert_ne!(a, b);
    }

    #[test]
    fn hostile_filename_cannot_escape_prefix() {
        let key = generate_storage_key("study-material", "../../etc/passwd");
        assert!(!key.contains(".."));
    }
}
