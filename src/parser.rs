// Naive reader for the pasted/uploaded export text.
//
// Records end at `\n` and cells at `,`, with quoting switched off in the csv
// reader. Quoted fields containing commas are NOT handled; exports with such
// names get their cells shifted and the numeric normalizer turns the
// misaligned values into `None`.
use crate::types::{ParsedTable, RawRow};
use csv::{ReaderBuilder, Terminator};

pub fn parse_csv_text(text: &str) -> ParsedTable {
    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .terminator(Terminator::Any(b'\n'))
        .from_reader(text.trim().as_bytes());

    // Input is already UTF-8, so records cannot fail to decode.
    let lines: Vec<RawRow> = rdr
        .records()
        .filter_map(Result::ok)
        .map(|record| record.iter().map(clean_cell).collect())
        .collect();
    if lines.len() < 2 {
        return ParsedTable::default();
    }

    let mut lines = lines.into_iter();
    let headers = lines.next().unwrap_or_default();
    let rows = lines
        .filter(|row| row.iter().any(|c| !c.trim().is_empty()))
        .collect();
    ParsedTable { headers, rows }
}

/// Trim, then drop at most one leading and one trailing double quote.
fn clean_cell(raw: &str) -> String {
    let cell = raw.trim();
    let cell = cell.strip_prefix('"').unwrap_or(cell);
    let cell = cell.strip_suffix('"').unwrap_or(cell);
    cell.to_string()
}
