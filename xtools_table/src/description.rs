//! Table descriptions: which rows, columns and sub-columns to render, and how.

use crate::{Expression, TableError};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use xtools_core::{Named, load_json};

/// A table description, as read from its JSON file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TableDescription {
    /// Test cases to render, in order; all the test cases of the results if absent.
    #[serde(default)]
    pub rows: Option<Rows>,
    /// Columns, each made of sub-columns, in order.
    pub columns: Named<Named<SubColumn>>,
    /// Rendering options.
    #[serde(default)]
    pub parameters: Parameters,
}

/// Row names, given inline or in a separate JSON file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Rows {
    /// Inline list of row names; an empty name stands for a horizontal rule.
    List(Vec<String>),
    /// JSON file holding the list of row names.
    File {
        /// Path of the file, relative to the description file.
        file: PathBuf,
    },
}

/// One value computed from the statistics of a run.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SubColumn {
    /// How to compute the value.
    #[serde(flatten)]
    pub expression: Expression,
    /// Whether the sub-column is rendered.
    #[serde(default = "enabled")]
    pub enabled: bool,
}

fn enabled() -> bool {
    true
}

/// Global rendering options.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Parameters {
    /// Render only the `tabular` environment, without the enclosing `table` and caption.
    pub tabular_only: bool,
    /// Render [`Parameters::placeholder`] for values that cannot be computed,
    /// instead of failing.
    pub ignore_unknown_values: bool,
    /// Replacement text for values that cannot be computed.
    pub placeholder: String,
    /// Table caption; the benchmark name if absent.
    pub caption: Option<String>,
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            tabular_only: false,
            ignore_unknown_values: false,
            placeholder: "--".to_owned(),
            caption: None,
        }
    }
}

impl TableDescription {
    /// Reads a description from a JSON file,
    /// together with the rows file it refers to, if any.
    pub fn load(path: &Path) -> Result<Self, TableError> {
        let mut description: Self = load_json(path)?;
        description.resolve_rows(path.parent().unwrap_or(Path::new("")))?;
        Ok(description)
    }

    /// Reads the rows file, if any, with relative paths taken from `base`.
    pub fn resolve_rows(&mut self, base: &Path) -> Result<(), TableError> {
        if let Some(Rows::File { file }) = &self.rows {
            let rows: Vec<String> = load_json(&base.join(file))?;
            self.rows = Some(Rows::List(rows));
        }
        Ok(())
    }

    /// The enabled sub-columns of each column; columns without any are left out.
    pub fn enabled_columns(&self) -> impl Iterator<Item = (&str, Vec<(&str, &SubColumn)>)> {
        self.columns.iter().filter_map(|(name, sub_columns)| {
            let enabled: Vec<_> = sub_columns
                .iter()
                .filter(|(_, sub)| sub.enabled)
                .map(|(sub_column, sub)| (sub_column.as_str(), sub))
                .collect();
            (!enabled.is_empty()).then_some((name.as_str(), enabled))
        })
    }
}
