use crate::{Cell, Line, Table};
use std::fmt::{self, Write};

impl Table {
    /// Renders the table as LaTeX.
    ///
    /// The first column holds the row labels; every column group gets one
    /// right-aligned column per sub-column and is set off by a double rule.
    pub fn write_latex<W: Write>(&self, w: &mut W) -> fmt::Result {
        let indent = if self.tabular_only { "" } else { "  " };
        if !self.tabular_only {
            writeln!(w, "\\begin{{table}}")?;
        }
        writeln!(w, "{indent}\\begin{{tabular}}{{{}}}", self.tabular_columns())?;
        writeln!(w, "{indent}  \\hline")?;

        write!(w, "{indent}  Models")?;
        for column in &self.columns {
            write!(
                w,
                " & {}",
                multicolumn(column.sub_columns.len(), &column.name)
            )?;
        }
        writeln!(w, " \\\\")?;
        write!(w, "{indent}  ")?;
        for sub_column in self.columns.iter().flat_map(|c| &c.sub_columns) {
            write!(w, " & {sub_column}")?;
        }
        writeln!(w, " \\\\")?;
        writeln!(w, "{indent}  \\hline")?;

        for line in &self.lines {
            match line {
                Line::Rule => writeln!(w, "{indent}  \\hline")?,
                Line::Row { label, cells } => {
                    write!(w, "{indent}  {label}")?;
                    for (cell, column) in cells.iter().zip(&self.columns) {
                        match cell {
                            Cell::Values(values) => {
                                for value in values {
                                    write!(w, " & {value}")?;
                                }
                            }
                            Cell::Span(text) => {
                                write!(w, " & {}", multicolumn(column.sub_columns.len(), text))?
                            }
                        }
                    }
                    writeln!(w, " \\\\")?;
                }
            }
        }

        writeln!(w, "{indent}  \\hline")?;
        writeln!(w, "{indent}\\end{{tabular}}")?;
        if !self.tabular_only {
            writeln!(w, "  \\caption{{{}}}", self.caption)?;
            writeln!(w, "\\end{{table}}")?;
        }
        Ok(())
    }

    /// The table as a LaTeX string.
    pub fn to_latex(&self) -> String {
        let mut latex = String::new();
        self.write_latex(&mut latex)
            .expect("writing to a String cannot fail");
        latex
    }

    fn tabular_columns(&self) -> String {
        let mut spec = String::from("|l|");
        for column in &self.columns {
            spec.push('|');
            spec.push_str(&"r|".repeat(column.sub_columns.len()));
        }
        spec
    }
}

fn multicolumn(span: usize, text: &str) -> String {
    format!("\\multicolumn{{{span}}}{{c|}}{{{text}}}")
}
