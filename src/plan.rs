use std::collections::HashMap;
use std::fmt;

use anyhow::{Context, Result, bail};
use camino::{Utf8Path, Utf8PathBuf};

use crate::discover::{DirSnapshot, MarkerState};
use crate::options::{Layout, TreeOptions};

/// One intended filesystem mutation. The `Display` form is the shell-like
/// line printed in dry-run mode; the live executor performs the equivalent
/// call in the same order.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Op {
    MakeDir(Utf8PathBuf),
    TouchMarker(Utf8PathBuf),
    MoveFile {
        from: Utf8PathBuf,
        to: Utf8PathBuf,
    },
    Annotate {
        marker: Utf8PathBuf,
        line: String,
    },
    RemoveMarker(Utf8PathBuf),
    RemoveDir(Utf8PathBuf),
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Op::MakeDir(path) => write!(f, "mkdir -p {path}"),
            Op::TouchMarker(path) => write!(f, "touch {path}"),
            Op::MoveFile { from, to } => write!(f, "mv {from} {to}"),
            Op::Annotate { marker, line } => write!(f, "echo \"{line}\" >> {marker}"),
            Op::RemoveMarker(path) => write!(f, "rm {path}"),
            Op::RemoveDir(path) => write!(f, "rmdir {path}"),
        }
    }
}

/// Ordered list of mutations for one run: all moves (per category, in
/// discovery order), then empty-marker removals, then bottom-up directory
/// removals.
#[derive(Debug, Default)]
pub struct Plan {
    pub ops: Vec<Op>,
}

impl Plan {
    pub fn moves(&self) -> usize {
        self.ops
            .iter()
            .filter(|op| matches!(op, Op::MoveFile { .. }))
            .count()
    }
}

/// Compute the target module directory for a source file.
pub fn module_dir(root: &Utf8Path, rel_dir: &Utf8Path, stem: &str, layout: Layout) -> Utf8PathBuf {
    match layout {
        Layout::Flat => root.join(stem),
        Layout::Nested if rel_dir.as_str().is_empty() => root.join(stem),
        Layout::Nested => root.join(rel_dir).join(stem),
    }
}

/// Dotted import line for a module directory, relative to the reference
/// root: `root/sub/login` becomes `import sub.login`.
pub fn import_line(module_dir: &Utf8Path, reference_root: &Utf8Path) -> Result<String> {
    let rel = module_dir.strip_prefix(reference_root).with_context(|| {
        format!("module {module_dir} is not under reference root {reference_root}")
    })?;
    Ok(format!("import {}", rel.as_str().replace('/', ".")))
}

/// Assemble the full plan from the per-category snapshots. Fails without
/// emitting anything if two source files map to the same destination.
pub fn build_plan(
    root: &Utf8Path,
    snapshots: &[(String, DirSnapshot)],
    options: &TreeOptions,
) -> Result<Plan> {
    let mut plan = Plan::default();
    let mut destinations: HashMap<Utf8PathBuf, Utf8PathBuf> = HashMap::new();

    for (category, snapshot) in snapshots {
        plan_moves(
            root,
            category,
            snapshot,
            options,
            &mut plan.ops,
            &mut destinations,
        )?;
    }
    for (_, snapshot) in snapshots {
        collect_marker_removals(snapshot, options, &mut plan.ops);
    }
    for (_, snapshot) in snapshots {
        collect_dir_removals(snapshot, &mut plan.ops);
    }
    Ok(plan)
}

fn plan_moves(
    root: &Utf8Path,
    category: &str,
    snapshot: &DirSnapshot,
    options: &TreeOptions,
    ops: &mut Vec<Op>,
    destinations: &mut HashMap<Utf8PathBuf, Utf8PathBuf>,
) -> Result<()> {
    for filename in &snapshot.sources {
        let Some(stem) = options.source_stem(filename) else {
            continue;
        };
        let target_dir = module_dir(root, &snapshot.rel, stem, options.layout);
        let marker = target_dir.join(&options.marker);
        let from = snapshot.path.join(filename);
        let to = target_dir.join(format!("{category}.{}", options.extension));

        if let Some(previous) = destinations.insert(to.clone(), from.clone()) {
            bail!("both {previous} and {from} map to {to}");
        }

        ops.push(Op::MakeDir(target_dir.clone()));
        ops.push(Op::TouchMarker(marker.clone()));
        ops.push(Op::MoveFile { from, to });
        if let Some(reference_root) = &options.reference_root {
            let line = import_line(&target_dir, reference_root)?;
            ops.push(Op::Annotate { marker, line });
        }
    }
    for child in &snapshot.children {
        plan_moves(root, category, child, options, ops, destinations)?;
    }
    Ok(())
}

fn collect_marker_removals(snapshot: &DirSnapshot, options: &TreeOptions, ops: &mut Vec<Op>) {
    if snapshot.marker == MarkerState::Empty {
        ops.push(Op::RemoveMarker(snapshot.path.join(&options.marker)));
    }
    for child in &snapshot.children {
        collect_marker_removals(child, options, ops);
    }
}

/// Emit `RemoveDir` for every directory that will be empty once moves and
/// marker removals have happened, children before parents. Returns whether
/// this directory itself is removable; a pinned child pins every ancestor.
fn collect_dir_removals(snapshot: &DirSnapshot, ops: &mut Vec<Op>) -> bool {
    let mut removable = snapshot.stray == 0 && snapshot.marker != MarkerState::Annotated;
    for child in &snapshot.children {
        if !collect_dir_removals(child, ops) {
            removable = false;
        }
    }
    if removable {
        ops.push(Op::RemoveDir(snapshot.path.clone()));
    }
    removable
}
