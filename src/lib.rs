//! Restructure a page/model source tree — flat module lists under
//! category directories like `models/` and `pages/` — into one directory
//! per logical page holding both files.
//!
//! The work is split into phases that never overlap: validate the root,
//! snapshot each category subtree, build an ordered plan of mutations, then
//! hand the plan to an executor. The live executor applies it; the trace
//! executor renders the dry-run output.

pub mod cli;
pub mod discover;
pub mod execute;
pub mod logging;
pub mod options;
pub mod plan;
pub mod runner;
pub mod validate;

pub use options::{Layout, TreeOptions};
pub use plan::{Op, Plan};
pub use runner::{plan_tree, transform};
pub use validate::ValidateError;
