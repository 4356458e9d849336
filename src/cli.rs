use camino::Utf8PathBuf;
use clap::{Parser, ValueEnum};

use crate::options::Layout;

/// Thin argument surface over the tree transformer.
#[derive(Parser, Debug)]
#[command(
    name = "pagetree",
    version,
    about = "Convert a page/model directory tree to one module per page"
)]
pub struct Cli {
    /// File path to the page/model directory tree.
    pub directory: Utf8PathBuf,

    /// Don't touch anything, just show what would be done.
    #[arg(short = 'd', long = "dry-run")]
    pub dry_run: bool,

    /// Root path of the project; import annotations in new marker files are
    /// constructed relative to this path.
    #[arg(short = 'r', long = "root-path")]
    pub root_path: Option<Utf8PathBuf>,

    /// Target layout policy for new module directories.
    #[arg(long = "layout", value_enum, default_value = "nested")]
    pub layout: LayoutArg,
}

#[derive(ValueEnum, Clone, Copy, Debug, Eq, PartialEq)]
pub enum LayoutArg {
    /// Every module lands directly under the tree root.
    Flat,
    /// Modules keep their nesting relative to the category root.
    Nested,
}

impl From<LayoutArg> for Layout {
    fn from(value: LayoutArg) -> Self {
        match value {
            LayoutArg::Flat => Layout::Flat,
            LayoutArg::Nested => Layout::Nested,
        }
    }
}

/// Helper entry point so `main` can stay minimal.
pub fn parse() -> Cli {
    Cli::parse()
}
