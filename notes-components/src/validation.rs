//! Input checks for values that end up in filesystem paths.

use std::path::{Component as PathComponent, Path};

use crate::error::{ComponentError, ComponentResult};

const MAX_IDENTIFIER_LENGTH: usize = 255;

/// Validate a plugin identifier before it is used as a directory name.
///
/// Identifiers come from synced items and third-party manifests, so anything
/// that could step outside the components directory is rejected.
pub fn validate_identifier(identifier: &str) -> ComponentResult<()> {
    let reject = |reason: &'static str| {
        Err(ComponentError::InvalidIdentifier {
            identifier: identifier.to_string(),
            reason,
        })
    };

    if identifier.is_empty() {
        return reject("identifier is empty");
    }
    if identifier.len() > MAX_IDENTIFIER_LENGTH {
        return reject("identifier is too long");
    }
    if identifier.chars().any(|c| c.is_control()) {
        return reject("identifier contains control characters");
    }
    if identifier.contains('/') || identifier.contains('\\') {
        return reject("identifier contains a path separator");
    }
    if identifier == "." || identifier == ".." || identifier.contains("..") {
        return reject("identifier contains a parent directory reference");
    }

    Ok(())
}

/// Validate a manifest-declared entry path relative to the install directory.
pub fn validate_index_path(identifier: &str, index_path: &str) -> ComponentResult<()> {
    let invalid = || ComponentError::InvalidIndexPath {
        identifier: identifier.to_string(),
        path: index_path.to_string(),
    };

    if index_path.is_empty() || index_path.contains('\0') || index_path.contains('\\') {
        return Err(invalid());
    }

    let path = Path::new(index_path);
    let all_normal = path
        .components()
        .all(|c| matches!(c, PathComponent::Normal(_) | PathComponent::CurDir));
    if !all_normal {
        return Err(invalid());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_identifier() {
        assert!(validate_identifier("org.example.markdown-editor").is_ok());
        assert!(validate_identifier("com.example.editor").is_ok());

        assert!(validate_identifier("").is_err());
        assert!(validate_identifier("..").is_err());
        assert!(validate_identifier("../etc").is_err());
        assert!(validate_identifier("a/b").is_err());
        assert!(validate_identifier("a\\b").is_err());
        assert!(validate_identifier("bad\0id").is_err());
        assert!(validate_identifier(&"x".repeat(300)).is_err());
    }

    #[test]
    fn test_validate_index_path() {
        assert!(validate_index_path("id", "index.html").is_ok());
        assert!(validate_index_path("id", "dist/index.html").is_ok());
        assert!(validate_index_path("id", "./dist/index.html").is_ok());

        assert!(validate_index_path("id", "").is_err());
        assert!(validate_index_path("id", "../index.html").is_err());
        assert!(validate_index_path("id", "/etc/passwd").is_err());
        assert!(validate_index_path("id", "dist/../../x.html").is_err());
    }
}
