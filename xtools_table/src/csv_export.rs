use crate::{Cell, Line, Table, TableError};
use std::io::Write;

impl Table {
    /// Writes the table as CSV, one record per row.
    ///
    /// Header fields are named `column/sub-column`.
    /// A spanning cell repeats its text in every sub-column, and rules are dropped.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<(), TableError> {
        let mut writer = csv::Writer::from_writer(writer);
        let header = std::iter::once("Models".to_owned()).chain(self.columns.iter().flat_map(
            |column| {
                column
                    .sub_columns
                    .iter()
                    .map(move |sub_column| format!("{}/{sub_column}", column.name))
            },
        ));
        writer.write_record(header)?;

        for line in &self.lines {
            let Line::Row { label, cells } = line else {
                continue;
            };
            let mut record = vec![label.as_str()];
            for (cell, column) in cells.iter().zip(&self.columns) {
                match cell {
                    Cell::Values(values) => record.extend(values.iter().map(String::as_str)),
                    Cell::Span(text) => {
                        record.extend(std::iter::repeat_n(text.as_str(), column.sub_columns.len()))
                    }
                }
            }
            writer.write_record(&record)?;
        }
        writer.flush()?;
        Ok(())
    }
}
