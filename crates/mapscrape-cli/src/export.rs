//! Record export: CSV with a UTF-8 byte-order mark, a JSON array, or a
//! single-sheet workbook with a bold header row.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use csv::{Terminator, WriterBuilder};
use mapscrape_core::Record;
use rust_xlsxwriter::{Format, Workbook, XlsxError};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Columns written as numbers in a workbook: `s_no`, `reviews_count`,
/// `reviews_average`, `latitude`, `longitude`.
const NUMERIC_COLUMNS: [usize; 5] = [0, 5, 6, 8, 9];

/// Header row plus one row per record, preceded by a byte-order mark.
pub(crate) fn write_csv<W: Write>(mut w: W, records: &[Record]) -> anyhow::Result<()> {
    w.write_all(UTF8_BOM)?;
    let mut writer = WriterBuilder::new()
        .terminator(Terminator::CRLF)
        .from_writer(w);
    writer.write_record(Record::COLUMNS)?;
    for record in records {
        writer.write_record(record.to_row())?;
    }
    writer.flush()?;
    Ok(())
}

pub(crate) fn write_json<W: Write>(mut w: W, records: &[Record]) -> anyhow::Result<()> {
    serde_json::to_writer_pretty(&mut w, records)?;
    writeln!(w)?;
    w.flush()?;
    Ok(())
}

#[derive(Debug, PartialEq)]
enum Cell<'a> {
    Number(f64),
    Text(&'a str),
    Empty,
}

fn cell(column: usize, value: &str) -> Cell<'_> {
    if value.is_empty() {
        return Cell::Empty;
    }
    if NUMERIC_COLUMNS.contains(&column) {
        if let Ok(number) = value.parse::<f64>() {
            return Cell::Number(number);
        }
    }
    Cell::Text(value)
}

fn grid_index<T: TryFrom<usize>>(index: usize) -> Result<T, XlsxError> {
    T::try_from(index).map_err(|_| XlsxError::RowColumnLimitError)
}

/// Workbook bytes: one sheet, bold header row, a row per record.
pub(crate) fn write_xlsx(records: &[Record]) -> Result<Vec<u8>, XlsxError> {
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();
    let sheet = workbook.add_worksheet();
    sheet.set_name("Sheet1")?;

    for (col, name) in Record::COLUMNS.iter().enumerate() {
        sheet.write_string_with_format(0, grid_index(col)?, *name, &header)?;
    }
    for (index, record) in records.iter().enumerate() {
        let row: u32 = grid_index(index + 1)?;
        for (col, value) in record.to_row().iter().enumerate() {
            let column: u16 = grid_index(col)?;
            match cell(col, value) {
                Cell::Number(number) => {
                    sheet.write_number(row, column, number)?;
                }
                Cell::Text(text) => {
                    sheet.write_string(row, column, text)?;
                }
                Cell::Empty => {}
            }
        }
    }

    workbook.save_to_buffer()
}

pub(crate) fn export_csv(path: &Path, records: &[Record]) -> anyhow::Result<()> {
    let file = File::create(path)?;
    write_csv(BufWriter::new(file), records)
}

pub(crate) fn export_json(path: &Path, records: &[Record]) -> anyhow::Result<()> {
    let file = File::create(path)?;
    write_json(BufWriter::new(file), records)
}

pub(crate) fn export_xlsx(path: &Path, records: &[Record]) -> anyhow::Result<()> {
    std::fs::write(path, write_xlsx(records)?)?;
    Ok(())
}
