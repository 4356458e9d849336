use std::fs;

use anyhow::{Context, Result, anyhow};
use camino::{Utf8Path, Utf8PathBuf};

use crate::options::TreeOptions;

/// State of a directory's marker file at snapshot time.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MarkerState {
    Absent,
    Empty,
    /// Present with content; never deleted by cleanup.
    Annotated,
}

/// Immutable snapshot of one directory inside a category subtree, taken
/// before any mutation. The whole category is captured as a tree of these,
/// so planning never has to re-read a filesystem it is about to change.
#[derive(Debug)]
pub struct DirSnapshot {
    pub path: Utf8PathBuf,
    /// Path relative to the category root; empty for the category root.
    pub rel: Utf8PathBuf,
    /// Eligible source filenames found directly in this directory.
    pub sources: Vec<String>,
    pub marker: MarkerState,
    /// Entries that are neither sources, nor the marker, nor directories.
    /// Any stray entry pins this directory and its ancestors in place.
    pub stray: usize,
    pub children: Vec<DirSnapshot>,
}

/// Recursively snapshot one category subtree. Entries are visited in name
/// order so plans are deterministic.
pub fn scan_category(category_root: &Utf8Path, options: &TreeOptions) -> Result<DirSnapshot> {
    scan_dir(category_root, Utf8PathBuf::new(), options)
}

fn scan_dir(path: &Utf8Path, rel: Utf8PathBuf, options: &TreeOptions) -> Result<DirSnapshot> {
    let mut entries = Vec::new();
    for entry in fs::read_dir(path).with_context(|| format!("reading directory {path}"))? {
        entries.push(entry.with_context(|| format!("reading directory {path}"))?);
    }
    entries.sort_by_key(|entry| entry.file_name());

    let mut snapshot = DirSnapshot {
        path: path.to_owned(),
        rel,
        sources: Vec::new(),
        marker: MarkerState::Absent,
        stray: 0,
        children: Vec::new(),
    };

    for entry in entries {
        let name = entry
            .file_name()
            .into_string()
            .map_err(|raw| anyhow!("non-UTF-8 entry {:?} in {path}", raw))?;
        let metadata = entry
            .metadata()
            .with_context(|| format!("reading metadata of {}", path.join(&name)))?;

        if metadata.is_dir() {
            let child = scan_dir(&path.join(&name), snapshot.rel.join(&name), options)?;
            snapshot.children.push(child);
        } else if name == options.marker {
            snapshot.marker = if metadata.len() == 0 {
                MarkerState::Empty
            } else {
                MarkerState::Annotated
            };
        } else if options.source_stem(&name).is_some() {
            snapshot.sources.push(name);
        } else {
            snapshot.stray += 1;
        }
    }

    Ok(snapshot)
}

#[cfg(test)]
mod tests {
    use camino::Utf8PathBuf;
    use tempfile::TempDir;

    use super::*;

    fn scratch() -> (TempDir, Utf8PathBuf) {
        let dir = TempDir::new().unwrap();
        let path = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
        (dir, path)
    }

    #[test]
    fn captures_sources_markers_and_strays() {
        let (_guard, root) = scratch();
        fs::write(root.join("__init__.py"), "").unwrap();
        fs::write(root.join("login.py"), "class Login: pass\n").unwrap();
        fs::write(root.join("readme.txt"), "stray").unwrap();
        fs::create_dir(root.join("sub")).unwrap();
        fs::write(root.join("sub").join("__init__.py"), "import something\n").unwrap();
        fs::write(root.join("sub").join("detail.py"), "").unwrap();

        let snapshot = scan_category(&root, &TreeOptions::python_defaults()).unwrap();
        assert_eq!(snapshot.sources, vec!["login.py".to_owned()]);
        assert_eq!(snapshot.marker, MarkerState::Empty);
        assert_eq!(snapshot.stray, 1);
        assert_eq!(snapshot.children.len(), 1);

        let sub = &snapshot.children[0];
        assert_eq!(sub.rel, Utf8PathBuf::from("sub"));
        assert_eq!(sub.sources, vec!["detail.py".to_owned()]);
        assert_eq!(sub.marker, MarkerState::Annotated);
        assert_eq!(sub.stray, 0);
    }

    #[test]
    fn missing_marker_is_absent() {
        let (_guard, root) = scratch();
        fs::write(root.join("page.py"), "").unwrap();
        let snapshot = scan_category(&root, &TreeOptions::python_defaults()).unwrap();
        assert_eq!(snapshot.marker, MarkerState::Absent);
    }

    #[test]
    fn entries_are_sorted_by_name() {
        let (_guard, root) = scratch();
        for name in ["zeta.py", "alpha.py", "mid.py"] {
            fs::write(root.join(name), "").unwrap();
        }
        let snapshot = scan_category(&root, &TreeOptions::python_defaults()).unwrap();
        assert_eq!(snapshot.sources, vec!["alpha.py", "mid.py", "zeta.py"]);
    }
}
