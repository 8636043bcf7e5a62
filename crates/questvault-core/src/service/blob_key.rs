//! Unique storage keys for uploaded files.

use derive_more::{Deref, Display};
use uuid::Uuid;

/// Prefix shared by every question paper key.
pub const BLOB_KEY_PREFIX: &str = "questions/";

const MAX_FILE_NAME_LEN: usize = 100;
const FALLBACK_FILE_NAME: &str = "document.pdf";

/// Storage key of an uploaded question paper.
///
/// Keys have the shape `questions/{uuid-v7}-{sanitized file name}`. The
/// version 7 UUID combines a millisecond timestamp with random bits, so two
/// generated keys never collide and keys sort by upload time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deref, Display)]
pub struct BlobKey(String);

impl BlobKey {
    /// Generates a fresh key for a file with the given client-side name.
    pub fn generate(file_name: &str) -> Self {
        Self(format!(
            "{BLOB_KEY_PREFIX}{}-{}",
            Uuid::now_v7().simple(),
            sanitize_file_name(file_name)
        ))
    }

    /// Returns the key as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the key, returning the inner string.
    #[inline]
    pub fn into_inner(self) -> String {
        self.0
    }
}

/// Reduces a client-supplied file name to a safe key segment.
///
/// Directory components are dropped, characters outside `[A-Za-z0-9._-]` are
/// replaced with `_` and leading dots are stripped.
pub fn sanitize_file_name(file_name: &str) -> String {
    let base = file_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default();

    let sanitized: String = base
        .chars()
        .map(|c| match c {
            'a'..='z' | 'A'..='Z' | '0'..='9' | '.' | '_' | '-' => c,
            _ => '_',
        })
        .skip_while(|c| *c == '.')
        .take(MAX_FILE_NAME_LEN)
        .collect();

    if sanitized.trim_matches(['_', '.', '-']).is_empty() {
        FALLBACK_FILE_NAME.to_owned()
    } else {
        sanitized
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn keys_are_unique_and_prefixed() {
        let keys: HashSet<_> = (0..256).map(|_| BlobKey::generate("exam.pdf")).collect();
        assert_eq!(keys.len(), 256);
        assert!(keys.iter().all(|key| key.starts_with(BLOB_KEY_PREFIX)));
        assert!(keys.iter().all(|key| key.ends_with("-exam.pdf")));
    }

    #[test]
    fn sanitizes_paths_and_symbols() {
        assert_eq!(sanitize_file_name("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_file_name("C:\\exams\\CSC 301 (2023).pdf"), "CSC_301__2023_.pdf");
        assert_eq!(sanitize_file_name("..hidden.pdf"), "hidden.pdf");
        assert_eq!(sanitize_file_name("déjà.pdf"), "d_j_.pdf");
    }

    #[test]
    fn falls_back_when_nothing_usable_remains() {
        assert_eq!(sanitize_file_name(""), FALLBACK_FILE_NAME);
        assert_eq!(sanitize_file_name("///"), FALLBACK_FILE_NAME);
        assert_eq!(sanitize_file_name("..."), FALLBACK_FILE_NAME);
    }

    #[test]
    fn long_names_are_truncated() {
        let long = format!("{}.pdf", "a".repeat(300));
        assert_eq!(sanitize_file_name(&long).len(), MAX_FILE_NAME_LEN);
    }
}
