use std::fs::{self, OpenOptions};
use std::io::{self, Write};

use anyhow::{Context, Result};
use camino::Utf8Path;

use crate::plan::Op;

/// Marker files are group-writable, matching the layout convention of the
/// trees this tool rewrites.
const MARKER_MODE: u32 = 0o664;

/// Execution strategy for a plan. The live executor mutates the filesystem;
/// the trace executor records what the live one would do.
pub trait Executor {
    fn execute(&mut self, op: &Op) -> Result<()>;
}

/// Applies each operation with blocking std `fs` calls. Creation is
/// idempotent, cleanup is best-effort; everything else fails fast with the
/// offending path in the error chain.
pub struct LiveExecutor;

impl Executor for LiveExecutor {
    fn execute(&mut self, op: &Op) -> Result<()> {
        match op {
            Op::MakeDir(path) => {
                fs::create_dir_all(path).with_context(|| format!("creating directory {path}"))
            }
            Op::TouchMarker(path) => touch_marker(path),
            Op::MoveFile { from, to } => {
                fs::rename(from, to).with_context(|| format!("moving {from} to {to}"))
            }
            Op::Annotate { marker, line } => annotate(marker, line),
            Op::RemoveMarker(path) => match fs::remove_file(path) {
                Err(err) if err.kind() != io::ErrorKind::NotFound => {
                    Err(err).with_context(|| format!("removing marker {path}"))
                }
                _ => Ok(()),
            },
            // A directory that gained entries since the snapshot is left in
            // place; cleanup never fails the run over a non-empty directory.
            Op::RemoveDir(path) => match fs::remove_dir(path) {
                Err(err)
                    if !matches!(
                        err.kind(),
                        io::ErrorKind::NotFound | io::ErrorKind::DirectoryNotEmpty
                    ) =>
                {
                    Err(err).with_context(|| format!("removing directory {path}"))
                }
                _ => Ok(()),
            },
        }
    }
}

/// Create the marker if absent, without truncating an existing one.
fn touch_marker(path: &Utf8Path) -> Result<()> {
    let mut open = OpenOptions::new();
    open.write(true).create(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        open.mode(MARKER_MODE);
    }
    open.open(path)
        .map(drop)
        .with_context(|| format!("creating marker {path}"))
}

/// Append the import line followed by a blank line, unless the marker
/// already carries that exact line. Re-runs therefore never duplicate
/// annotations.
fn annotate(marker: &Utf8Path, line: &str) -> Result<()> {
    let existing =
        fs::read_to_string(marker).with_context(|| format!("reading marker {marker}"))?;
    if existing.lines().any(|present| present == line) {
        return Ok(());
    }
    let mut file = OpenOptions::new()
        .append(true)
        .open(marker)
        .with_context(|| format!("opening marker {marker}"))?;
    write!(file, "{line}\n\n").with_context(|| format!("annotating marker {marker}"))
}

/// Records the dry-run trace: one shell-like line per operation, in exactly
/// the order the live executor would apply them.
#[derive(Debug, Default)]
pub struct TraceExecutor {
    lines: Vec<String>,
}

impl TraceExecutor {
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn into_lines(self) -> Vec<String> {
        self.lines
    }
}

impl Executor for TraceExecutor {
    fn execute(&mut self, op: &Op) -> Result<()> {
        self.lines.push(op.to_string());
        Ok(())
    }
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
    fn touch_preserves_existing_content() {
        let (_guard, root) = scratch();
        let marker = root.join("__init__.py");
        fs::write(&marker, "import something\n").unwrap();
        LiveExecutor.execute(&Op::TouchMarker(marker.clone())).unwrap();
        assert_eq!(fs::read_to_string(&marker).unwrap(), "import something\n");
    }

    #[test]
    fn annotation_is_idempotent() {
        let (_guard, root) = scratch();
        let marker = root.join("__init__.py");
        fs::write(&marker, "").unwrap();
        let op = Op::Annotate {
            marker: marker.clone(),
            line: "import proj.login".to_owned(),
        };
        LiveExecutor.execute(&op).unwrap();
        LiveExecutor.execute(&op).unwrap();
        assert_eq!(
            fs::read_to_string(&marker).unwrap(),
            "import proj.login\n\n",
        );
    }

    #[test]
    fn remove_dir_skips_non_empty() {
        let (_guard, root) = scratch();
        let dir = root.join("keep");
        fs::create_dir(&dir).unwrap();
        fs::write(dir.join("readme.txt"), "stray").unwrap();
        LiveExecutor.execute(&Op::RemoveDir(dir.clone())).unwrap();
        assert!(dir.is_dir());
    }

    #[test]
    fn remove_marker_tolerates_missing_file() {
        let (_guard, root) = scratch();
        LiveExecutor
            .execute(&Op::RemoveMarker(root.join("__init__.py")))
            .unwrap();
    }

    #[test]
    fn trace_renders_without_touching_anything() {
        let (_guard, root) = scratch();
        let mut trace = TraceExecutor::default();
        trace
            .execute(&Op::MakeDir(root.join("login")))
            .unwrap();
        trace
            .execute(&Op::MoveFile {
                from: root.join("pages/login.py"),
                to: root.join("login/pages.py"),
            })
            .unwrap();
        assert_eq!(
            trace.into_lines(),
            vec![
                format!("mkdir -p {root}/login"),
                format!("mv {root}/pages/login.py {root}/login/pages.py"),
            ],
        );
        assert!(!root.join("login").exists());
    }
}
