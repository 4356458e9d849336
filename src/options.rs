use camino::Utf8PathBuf;

/// Target layout policy for computed module directories.
///
/// `Nested` preserves the source file's position relative to its category
/// root; `Flat` puts every module directly under the tree root. At nesting
/// depth zero the two coincide.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Layout {
    Flat,
    Nested,
}

/// Configuration of one transformation run. The category list is ordered:
/// categories are validated, scanned, and planned in this order.
#[derive(Clone, Debug)]
pub struct TreeOptions {
    pub categories: Vec<String>,
    /// Source file extension, without the leading dot.
    pub extension: String,
    /// Filename whose presence marks a directory as a module.
    pub marker: String,
    pub layout: Layout,
    /// When set, every new marker file gets an import annotation built from
    /// the module path relative to this root.
    pub reference_root: Option<Utf8PathBuf>,
}

impl TreeOptions {
    /// Defaults for Python page/model trees: `models/` and `pages/` holding
    /// `.py` files, `__init__.py` markers.
    pub fn python_defaults() -> Self {
        Self {
            categories: vec!["models".to_owned(), "pages".to_owned()],
            extension: "py".to_owned(),
            marker: "__init__.py".to_owned(),
            layout: Layout::Nested,
            reference_root: None,
        }
    }

    /// Base name of an eligible source file, or `None` if the filename is
    /// the marker or does not carry the source extension.
    pub fn source_stem<'a>(&self, filename: &'a str) -> Option<&'a str> {
        if filename == self.marker {
            return None;
        }
        let stem = filename
            .strip_suffix(self.extension.as_str())
            .and_then(|rest| rest.strip_suffix('.'))?;
        if stem.is_empty() { None } else { Some(stem) }
    }
}
