use super::views::{Cell, ReportTables, Table};
use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};
use std::path::Path;

/// Suggested download name for the exported workbook.
pub const REPORT_FILE_NAME: &str = "Loan_Bank_Eligibility_Report.xlsx";

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("failed to build eligibility workbook: {0}")]
    Workbook(#[from] XlsxError),
}

/// Serializes the report tables into an in-memory `.xlsx` workbook.
pub fn workbook_bytes(tables: &ReportTables) -> Result<Vec<u8>, ExportError> {
    let mut workbook = build_workbook(tables)?;
    Ok(workbook.save_to_buffer()?)
}

pub fn save_workbook<P: AsRef<Path>>(tables: &ReportTables, path: P) -> Result<(), ExportError> {
    let mut workbook = build_workbook(tables)?;
    workbook.save(path.as_ref())?;
    Ok(())
}

fn build_workbook(tables: &ReportTables) -> Result<Workbook, XlsxError> {
    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();

    for table in tables.ordered() {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(table.name)?;
        write_table(worksheet, table, &header_format)?;
    }

    Ok(workbook)
}

fn write_table(
    worksheet: &mut Worksheet,
    table: &Table,
    header_format: &Format,
) -> Result<(), XlsxError> {
    for (column, header) in table.headers.iter().enumerate() {
        worksheet.write_string_with_format(0, column as u16, header.as_str(), header_format)?;
    }

    for (index, row) in table.rows.iter().enumerate() {
        let sheet_row = index as u32 + 1;
        for (column, cell) in row.iter().enumerate() {
            let column = column as u16;
            match cell {
                Cell::Text(value) => {
                    worksheet.write_string(sheet_row, column, value.as_str())?;
                }
                Cell::Number(value) => {
                    worksheet.write_number(sheet_row, column, *value)?;
                }
                Cell::Check(indicator) => {
                    worksheet.write_string(sheet_row, column, indicator.label())?;
                }
            }
        }
    }

    Ok(())
}
