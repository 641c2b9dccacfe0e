use crate::{TableDescription, TableError, description::Rows};
use log::warn;
use xtools_bench::{Results, Status};

/// Header of a column group.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnHeader {
    /// Column name, usually a program.
    pub name: String,
    /// Names of the rendered sub-columns.
    pub sub_columns: Vec<String>,
}

/// The content of one column group in one row.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    /// One rendered value per sub-column.
    Values(Vec<String>),
    /// A single text spanning all sub-columns, when there are no values to show.
    Span(String),
}

/// A line of the table body.
#[derive(Debug, Clone, PartialEq)]
pub enum Line {
    /// Horizontal rule.
    Rule,
    /// A test case.
    Row {
        /// Row label.
        label: String,
        /// One cell per column.
        cells: Vec<Cell>,
    },
}

/// A fully evaluated table, ready to be written out.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    /// Caption of the table.
    pub caption: String,
    /// Whether only the tabular part is to be rendered.
    pub tabular_only: bool,
    /// Column groups, in order.
    pub columns: Vec<ColumnHeader>,
    /// Body lines, in order.
    pub lines: Vec<Line>,
}

impl Table {
    /// Evaluates `description` over `results`.
    ///
    /// Rows missing from the results are left out with a warning.
    /// A cell whose run has no record shows `missing`, and one whose run did not succeed
    /// shows its status.
    /// Values that cannot be computed abort evaluation,
    /// unless the description asks to ignore unknown values.
    pub fn build(results: &Results, description: &TableDescription) -> Result<Self, TableError> {
        let params = &description.parameters;
        let columns: Vec<_> = description.enabled_columns().collect();
        let rows: Vec<&str> = match &description.rows {
            Some(Rows::List(rows)) => rows.iter().map(String::as_str).collect(),
            Some(Rows::File { file }) => return Err(TableError::UnresolvedRows(file.clone())),
            None => results.stats.keys().map(String::as_str).collect(),
        };

        let mut lines = Vec::with_capacity(rows.len());
        for row in rows {
            if row.is_empty() {
                lines.push(Line::Rule);
                continue;
            }
            let Some(runs) = results.stats.get(row) else {
                warn!(target: "table", "missing row {row}");
                continue;
            };
            let mut cells = Vec::with_capacity(columns.len());
            for (column, sub_columns) in &columns {
                let Some(run) = runs.get(*column) else {
                    warn!(target: "table", "missing {column} in row {row}");
                    cells.push(Cell::Span("missing".to_owned()));
                    continue;
                };
                if run.status != Status::Success {
                    cells.push(Cell::Span(run.status.to_string()));
                    continue;
                }
                let mut values = Vec::with_capacity(sub_columns.len());
                for (sub_column, sub) in sub_columns {
                    match sub.expression.evaluate(&run.stats) {
                        Ok(value) => values.push(value.to_string()),
                        Err(err) if params.ignore_unknown_values => {
                            warn!(target: "table", "{row}, {column}/{sub_column}: {err}");
                            values.push(params.placeholder.clone());
                        }
                        Err(source) => {
                            return Err(TableError::Eval {
                                row: row.to_owned(),
                                column: column.to_string(),
                                sub_column: sub_column.to_string(),
                                source,
                            });
                        }
                    }
                }
                cells.push(Cell::Values(values));
            }
            lines.push(Line::Row {
                label: row.to_owned(),
                cells,
            });
        }

        Ok(Self {
            caption: params.caption.clone().unwrap_or_else(|| results.name.clone()),
            tabular_only: params.tabular_only,
            columns: columns
                .into_iter()
                .map(|(name, sub_columns)| ColumnHeader {
                    name: name.to_owned(),
                    sub_columns: sub_columns.into_iter().map(|(s, _)| s.to_owned()).collect(),
                })
                .collect(),
            lines,
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::EvalError;
    use xtools_bench::RunResult;

    pub(crate) fn results() -> Results {
        serde_json::from_str(
            r#"{
            "name": "fischer",
            "stats": {
                "f 2": {
                    "reach": { "status": "success", "STATES": "1500", "TIME": "0.126" },
                    "live": { "status": "timeout" }
                },
                "f 3": {
                    "reach": { "status": "success", "STATES": "999" }
                }
            }
        }"#,
        )
        .unwrap()
    }

    pub(crate) fn description(extra: &str) -> TableDescription {
        serde_json::from_str(&format!(
            r#"{{
            {extra}
            "columns": {{
                "reach": {{
                    "states": {{ "readable": {{ "value": {{ "name": "STATES", "type": "int" }} }} }},
                    "time": {{ "round": {{ "decimal": 2, "value": {{ "name": "TIME", "type": "float" }} }} }}
                }},
                "live": {{
                    "states": {{ "value": {{ "name": "STATES" }} }}
                }}
            }}
        }}"#
        ))
        .unwrap()
    }

    #[test]
    fn unknown_value_is_fatal() {
        let res = Table::build(&results(), &description(""));
        assert!(matches!(
            res,
            Err(TableError::Eval { ref row, source: EvalError::UnknownValue(ref name), .. })
                if row == "f 3" && name == "TIME"
        ));
    }

    #[test]
    fn placeholders() {
        let desc = description(
            r#""rows": ["f 3", "", "f 2", "f 9"],
            "parameters": { "ignore-unknown-values": true, "placeholder": "?" },"#,
        );
        let table = Table::build(&results(), &desc).unwrap();
        assert_eq!(table.caption, "fischer");
        assert_eq!(
            table.columns,
            vec![
                ColumnHeader {
                    name: "reach".into(),
                    sub_columns: vec!["states".into(), "time".into()]
                },
                ColumnHeader {
                    name: "live".into(),
                    sub_columns: vec!["states".into()]
                },
            ]
        );
        assert_eq!(
            table.lines,
            vec![
                Line::Row {
                    label: "f 3".into(),
                    cells: vec![
                        Cell::Values(vec!["999".into(), "?".into()]),
                        Cell::Span("missing".into()),
                    ]
                },
                Line::Rule,
                Line::Row {
                    label: "f 2".into(),
                    cells: vec![
                        Cell::Values(vec!["1.5 k".into(), "0.12".into()]),
                        Cell::Span("timeout".into()),
                    ]
                },
            ]
        );
    }

    #[test]
    fn default_rows_follow_results() {
        let mut results = results();
        results.record("f 3", "live", RunResult::new(Status::Skipped));
        let desc = description(r#""parameters": { "ignore-unknown-values": true, "caption": "C" },"#);
        let table = Table::build(&results, &desc).unwrap();
        assert_eq!(table.caption, "C");
        let labels: Vec<_> = table
            .lines
            .iter()
            .map(|line| match line {
                Line::Row { label, .. } => label.as_str(),
                Line::Rule => "",
            })
            .collect();
        assert_eq!(labels, vec!["f 2", "f 3"]);
        assert!(matches!(
            &table.lines[1],
            Line::Row { cells, .. } if cells[1] == Cell::Span("skipped".into())
        ));
    }
}
