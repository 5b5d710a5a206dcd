use std::collections::BTreeMap;

use anyhow::{Context, Result};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CsvTable {
    pub headers: Vec<String>,
    pub rows: Vec<BTreeMap<String, String>>,
}

/// Parses CSV text into a header list and header→text row mappings.
///
/// Quoted fields may contain commas and doubled-quote escapes; surrounding
/// whitespace is trimmed; blank lines are skipped; rows shorter than the
/// header get empty text for the missing trailing fields. Input without a
/// header row yields an empty table, not an error.
pub fn parse(text: &str) -> CsvTable {
    if text.trim().is_empty() {
        return CsvTable::default();
    }

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = match reader.headers() {
        Ok(headers) => headers.iter().map(str::to_string).collect(),
        Err(_) => return CsvTable::default(),
    };
    if headers.is_empty() {
        return CsvTable::default();
    }

    let mut rows = Vec::new();
    for record in reader.records().flatten() {
        if record.iter().all(str::is_empty) {
            continue;
        }
        let mut row = BTreeMap::new();
        for (idx, header) in headers.iter().enumerate() {
            row.insert(header.clone(), record.get(idx).unwrap_or("").to_string());
        }
        rows.push(row);
    }

    CsvTable { headers, rows }
}

/// Serializes rows back into CSV text: header line plus one newline-terminated
/// line per row. Fields containing a comma, quote, or newline are quoted with
/// inner quotes doubled. Values missing from a row serialize as empty text.
pub fn serialize(headers: &[String], rows: &[BTreeMap<String, String>]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    writer
        .write_record(headers)
        .context("failed to write csv header")?;
    for row in rows {
        let record: Vec<&str> = headers
            .iter()
            .map(|header| row.get(header).map(String::as_str).unwrap_or(""))
            .collect();
        writer
            .write_record(&record)
            .context("failed to write csv row")?;
    }

    let bytes = writer
        .into_inner()
        .context("failed to flush csv output")?;
    String::from_utf8(bytes).context("csv output was not valid utf-8")
}
