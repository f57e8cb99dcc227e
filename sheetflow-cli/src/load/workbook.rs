//! Write datasets as sheets of a new workbook

use std::path::Path;

use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};

use crate::error::{EtlError, EtlResult};
use crate::table::{Dataset, Value};

/// Builds a multi-sheet workbook, one dataset per sheet
pub struct WorkbookWriter {
    workbook: Workbook,
    header_format: Format,
    datetime_format: Format,
    sheets: Vec<String>,
}

impl WorkbookWriter {
    pub fn new() -> Self {
        Self {
            workbook: Workbook::new(),
            header_format: Format::new().set_bold(),
            datetime_format: Format::new().set_num_format("yyyy-mm-dd hh:mm:ss"),
            sheets: Vec::new(),
        }
    }

    /// Add a sheet holding `dataset`: a bold header row, then one row per record
    pub fn add_dataset(&mut self, sheet_name: &str, dataset: &Dataset) -> EtlResult<()> {
        let sink = |e: XlsxError| EtlError::sink_unavailable(format!("sheet '{}'", sheet_name), e);

        let too_large = |what: &str, count: usize| {
            EtlError::sink_unavailable(
                format!("sheet '{}'", sheet_name),
                format!("{} {} do not fit in a worksheet", count, what),
            )
        };
        let col_count = u16::try_from(dataset.columns().len())
            .map_err(|_| too_large("columns", dataset.columns().len()))?;
        let row_count = u32::try_from(dataset.len())
            .ok()
            .and_then(|n| n.checked_add(1))
            .ok_or_else(|| too_large("rows", dataset.len()))?;

        let worksheet = self.workbook.add_worksheet();
        worksheet.set_name(sheet_name).map_err(sink)?;

        for (col, name) in (0..col_count).zip(dataset.columns()) {
            worksheet
                .write_string_with_format(0, col, name, &self.header_format)
                .map_err(sink)?;
        }

        for (row_num, row) in (1..row_count).zip(dataset.rows()) {
            for (col, value) in (0..col_count).zip(row) {
                write_value(worksheet, row_num, col, value, &self.datetime_format)
                    .map_err(sink)?;
            }
        }

        worksheet.autofit();
        self.sheets.push(sheet_name.to_string());
        Ok(())
    }

    /// Write the workbook to disk, replacing any existing file
    pub fn save(mut self, path: &Path) -> EtlResult<()> {
        self.workbook
            .save(path)
            .map_err(|e| EtlError::sink_unavailable(path.display().to_string(), e))?;

        log::info!(
            "Workbook exported to {} (sheets: {})",
            path.display(),
            self.sheets.join(", ")
        );
        Ok(())
    }
}

impl Default for WorkbookWriter {
    fn default() -> Self {
        Self::new()
    }
}

fn write_value(
    ws: &mut Worksheet,
    row: u32,
    col: u16,
    value: &Value,
    datetime_format: &Format,
) -> Result<(), XlsxError> {
    match value {
        Value::Null => { /* Leave cell empty */ }
        Value::Text(s) => {
            ws.write_string(row, col, s)?;
        }
        Value::Int(i) => {
            ws.write_number(row, col, *i as f64)?;
        }
        Value::Float(f) if f.is_finite() => {
            ws.write_number(row, col, *f)?;
        }
        Value::Float(_) => { /* NaN and infinities have no cell representation */ }
        Value::Bool(b) => {
            ws.write_boolean(row, col, *b)?;
        }
        Value::DateTime(dt) => {
            ws.write_datetime_with_format(row, col, dt, datetime_format)?;
        }
    }
    Ok(())
}
