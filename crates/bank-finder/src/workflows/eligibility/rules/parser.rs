use super::normalizer::clean_label;
use calamine::{open_workbook_auto, Data, Reader};
use std::io::Read;
use std::path::Path;

/// Rule sheet as read from disk: one column per lender, one row per rule name.
#[derive(Debug)]
pub(crate) struct RuleMatrix {
    pub(crate) lenders: Vec<String>,
    pub(crate) rows: Vec<RuleRow>,
}

#[derive(Debug)]
pub(crate) struct RuleRow {
    pub(crate) label: String,
    /// Raw cells aligned with `RuleMatrix::lenders`; short rows are padded with blanks.
    pub(crate) cells: Vec<String>,
}

impl RuleMatrix {
    /// Builds the matrix from a header row (criteria column first) and the rule rows below it.
    fn from_rows<I>(header: &[String], records: I) -> Self
    where
        I: IntoIterator<Item = Vec<String>>,
    {
        let lenders = header
            .iter()
            .skip(1)
            .map(|name| clean_label(name))
            .collect::<Vec<_>>();

        let rows = records
            .into_iter()
            .filter_map(|record| {
                let label = record.first().map(|raw| clean_label(raw)).unwrap_or_default();
                if label.is_empty() {
                    return None;
                }

                let cells = (1..=lenders.len())
                    .map(|index| record.get(index).cloned().unwrap_or_default())
                    .collect();
                Some(RuleRow { label, cells })
            })
            .collect();

        Self { lenders, rows }
    }
}

pub(crate) fn parse_matrix<R: Read>(reader: R) -> Result<RuleMatrix, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let header = csv_reader
        .headers()?
        .iter()
        .map(str::to_string)
        .collect::<Vec<_>>();

    let records = csv_reader
        .records()
        .map(|record| record.map(|record| record.iter().map(str::to_string).collect()))
        .collect::<Result<Vec<Vec<String>>, _>>()?;

    Ok(RuleMatrix::from_rows(&header, records))
}

/// Reads the first worksheet of an Excel or OpenDocument rule book.
pub(crate) fn parse_workbook(path: &Path) -> Result<RuleMatrix, calamine::Error> {
    let mut workbook = open_workbook_auto(path)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or(calamine::Error::Msg("workbook has no worksheets"))??;

    let mut rows = range
        .rows()
        .map(|row| row.iter().map(cell_text).collect::<Vec<String>>());
    let header = rows.next().unwrap_or_default();

    Ok(RuleMatrix::from_rows(&header, rows))
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(value) => value.trim().to_string(),
        Data::Float(value) => value.to_string(),
        Data::Int(value) => value.to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_cells_render_as_plain_decimals() {
        assert_eq!(cell_text(&Data::Float(0.0025)), "0.0025");
        assert_eq!(cell_text(&Data::Float(1.25)), "1.25");
        assert_eq!(cell_text(&Data::Int(2)), "2");
        assert_eq!(cell_text(&Data::String(" 50% ".to_string())), "50%");
        assert_eq!(cell_text(&Data::Empty), "");
    }

    #[test]
    fn short_records_are_padded_and_blank_labels_skipped() {
        let header = vec!["Criteria".to_string(), "Alpha".to_string(), "Beta".to_string()];
        let records = vec![
            vec!["MinSec".to_string(), "50%".to_string()],
            vec![String::new(), "1".to_string(), "2".to_string()],
        ];

        let matrix = RuleMatrix::from_rows(&header, records);

        assert_eq!(matrix.lenders, vec!["Alpha", "Beta"]);
        assert_eq!(matrix.rows.len(), 1);
        assert_eq!(matrix.rows[0].cells, vec!["50%".to_string(), String::new()]);
    }
}
