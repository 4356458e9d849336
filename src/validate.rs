use camino::{Utf8Path, Utf8PathBuf};
use thiserror::Error;

use crate::options::TreeOptions;

/// Precondition failures detected before any mutation. These map to the
/// `error:` diagnostic on stdout and exit code 1 at the CLI layer, unlike
/// runtime filesystem errors which terminate the run through `anyhow`.
#[derive(Debug, Error)]
pub enum ValidateError {
    #[error("'{0}' is not a directory")]
    NotADirectory(Utf8PathBuf),
    #[error("'{path}' is not a module (no {marker} file)")]
    NotAModule { path: Utf8PathBuf, marker: String },
    #[error("'{0}' directory is missing")]
    MissingCategory(Utf8PathBuf),
}

/// Check every precondition in one pass over the root. Nothing is mutated
/// here; a failure leaves the tree exactly as it was found.
pub fn check_tree(root: &Utf8Path, options: &TreeOptions) -> Result<(), ValidateError> {
    if !root.is_dir() {
        return Err(ValidateError::NotADirectory(root.to_owned()));
    }
    if !root.join(&options.marker).is_file() {
        return Err(ValidateError::NotAModule {
            path: root.to_owned(),
            marker: options.marker.clone(),
        });
    }
    for category in &options.categories {
        let subdir = root.join(category);
        if !subdir.is_dir() {
            return Err(ValidateError::MissingCategory(subdir));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use camino::Utf8PathBuf;
    use tempfile::TempDir;

    use super::*;

    fn scratch() -> (TempDir, Utf8PathBuf) {
        let dir = TempDir::new().unwrap();
        let path = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
        (dir, path)
    }

    #[test]
    fn rejects_missing_root() {
        let (_guard, root) = scratch();
        let missing = root.join("nope");
        let err = check_tree(&missing, &TreeOptions::python_defaults()).unwrap_err();
        assert!(matches!(err, ValidateError::NotADirectory(path) if path == missing));
    }

    #[test]
    fn rejects_root_without_marker() {
        let (_guard, root) = scratch();
        let err = check_tree(&root, &TreeOptions::python_defaults()).unwrap_err();
        assert!(matches!(err, ValidateError::NotAModule { .. }));
    }

    #[test]
    fn rejects_missing_category() {
        let (_guard, root) = scratch();
        fs::write(root.join("__init__.py"), "").unwrap();
        fs::create_dir(root.join("models")).unwrap();
        let err = check_tree(&root, &TreeOptions::python_defaults()).unwrap_err();
        assert!(matches!(err, ValidateError::MissingCategory(path) if path == root.join("pages")));
    }

    #[test]
    fn accepts_complete_tree() {
        let (_guard, root) = scratch();
        fs::write(root.join("__init__.py"), "").unwrap();
        fs::create_dir(root.join("models")).unwrap();
        fs::create_dir(root.join("pages")).unwrap();
        check_tree(&root, &TreeOptions::python_defaults()).unwrap();
    }
}
