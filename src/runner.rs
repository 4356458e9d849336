use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use tracing::{debug, info};

use crate::cli::Cli;
use crate::discover;
use crate::execute::{Executor, LiveExecutor, TraceExecutor};
use crate::options::TreeOptions;
use crate::plan::{self, Plan};
use crate::validate;

pub fn run(cli: Cli) -> Result<()> {
    let options = TreeOptions {
        layout: cli.layout.into(),
        reference_root: cli.root_path.clone(),
        ..TreeOptions::python_defaults()
    };
    transform(&cli.directory, &options, cli.dry_run)
}

/// Validate, snapshot, and plan — no mutation happens in here, so a failure
/// anywhere leaves the tree untouched. Paths in the returned plan are
/// canonical.
pub fn plan_tree(root: &Utf8Path, options: &TreeOptions) -> Result<Plan> {
    validate::check_tree(root, options)?;
    let root = canonical(root)?;
    let reference_root = match &options.reference_root {
        Some(path) => Some(canonical(path)?),
        None => None,
    };
    let options = TreeOptions {
        reference_root,
        ..options.clone()
    };

    let mut snapshots = Vec::new();
    for category in &options.categories {
        let snapshot = discover::scan_category(&root.join(category), &options)?;
        snapshots.push((category.clone(), snapshot));
    }
    plan::build_plan(&root, &snapshots, &options)
}

/// Full run: plan the transformation, then either print the trace (dry run)
/// or apply it in plan order.
pub fn transform(root: &Utf8Path, options: &TreeOptions, dry_run: bool) -> Result<()> {
    let plan = plan_tree(root, options)?;
    info!(moves = plan.moves(), ops = plan.ops.len(), "plan ready");

    if dry_run {
        let mut executor = TraceExecutor::default();
        for op in &plan.ops {
            executor.execute(op)?;
        }
        for line in executor.lines() {
            println!("{line}");
        }
        return Ok(());
    }

    let mut executor = LiveExecutor;
    for op in &plan.ops {
        debug!(%op, "applying");
        executor.execute(op)?;
    }
    info!("tree transformed");
    Ok(())
}

fn canonical(path: &Utf8Path) -> Result<Utf8PathBuf> {
    path.canonicalize_utf8()
        .with_context(|| format!("resolving {path}"))
}
