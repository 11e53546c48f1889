use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::Path;
use std::str::FromStr;

use crate::error::GeneratorError;
use crate::record::ClaimRecord;
use crate::types::FieldValue;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Csv,
    /// One JSON object per line, keys in column order.
    Ndjson,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Ndjson => "ndjson",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = GeneratorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(OutputFormat::Csv),
            "ndjson" | "jsonl" => Ok(OutputFormat::Ndjson),
            other => Err(GeneratorError::invalid_argument(format!(
                "unknown output format '{other}' (expected csv or ndjson)"
            ))),
        }
    }
}

/// Header from the first record's labels, then one row per record.
/// An empty slice writes nothing.
pub fn write_csv<W: Write>(records: &[ClaimRecord], writer: W) -> Result<(), GeneratorError> {
    let mut w = csv::Writer::from_writer(writer);
    if let Some(first) = records.first() {
        w.write_record(first.labels())?;
    }
    for record in records {
        w.write_record(record.values().map(|v| v.to_string()))?;
    }
    w.flush()?;
    Ok(())
}

pub fn write_ndjson<W: Write>(records: &[ClaimRecord], writer: W) -> Result<(), GeneratorError> {
    let mut w = BufWriter::new(writer);
    for record in records {
        serde_json::to_writer(&mut w, record)?;
        writeln!(w)?;
    }
    w.flush()?;
    Ok(())
}

pub fn write_records<W: Write>(
    records: &[ClaimRecord],
    format: OutputFormat,
    writer: W,
) -> Result<(), GeneratorError> {
    match format {
        OutputFormat::Csv => write_csv(records, writer),
        OutputFormat::Ndjson => write_ndjson(records, writer),
    }
}

/// Create (or truncate) `path` and write `records` to it.
pub fn write_file(
    records: &[ClaimRecord],
    format: OutputFormat,
    path: impl AsRef<Path>,
) -> Result<(), GeneratorError> {
    let path = path.as_ref();
    let file = File::create(path)?;
    write_records(records, format, BufWriter::new(file))?;
    tracing::info!(path = %path.display(), rows = records.len(), ?format, "wrote dataset");
    Ok(())
}

/// Read a dataset written by [`write_csv`] back into records. Every cell
/// comes back as text; empty cells come back as [`FieldValue::Missing`].
pub fn read_csv<R: Read>(reader: R) -> Result<Vec<ClaimRecord>, GeneratorError> {
    let mut r = csv::Reader::from_reader(reader);
    let headers = r.headers()?.clone();
    let mut records = Vec::new();
    for row in r.records() {
        let row = row?;
        records.push(
            headers
                .iter()
                .zip(row.iter())
                .map(|(label, cell)| {
                    let value = if cell.is_empty() {
                        FieldValue::Missing
                    } else {
                        FieldValue::from(cell)
                    };
                    (label.to_string(), value)
                })
                .collect(),
        );
    }
    Ok(records)
}

pub fn read_file(path: impl AsRef<Path>) -> Result<Vec<ClaimRecord>, GeneratorError> {
    let path = path.as_ref();
    let records = read_csv(File::open(path)?)?;
    tracing::info!(path = %path.display(), rows = records.len(), "read dataset");
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_records() -> Vec<ClaimRecord> {
        let mut a = ClaimRecord::new();
        a.push("id", 1i64);
        a.push("insured_address", "12 Main St, Houston");
        a.push("total_incurred", 1_500i64);
        a.push("date_closed", FieldValue::Missing);
        let mut b = ClaimRecord::new();
        b.push("id", 2i64);
        b.push("insured_address", "9 Oak Ave, Miami");
        b.push("total_incurred", "TBC");
        b.push("date_closed", "2023-02-01");
        vec![a, b]
    }

    #[test]
    fn csv_has_header_and_quotes_commas() {
        let mut buf = Vec::new();
        write_csv(&sample_records(), &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "id,insured_address,total_incurred,date_closed");
        assert_eq!(lines[1], r#"1,"12 Main St, Houston",1500,"#);
        assert_eq!(lines[2], r#"2,"9 Oak Ave, Miami",TBC,2023-02-01"#);
    }

    #[test]
    fn csv_reads_back_with_same_shape() {
        let mut buf = Vec::new();
        write_csv(&sample_records(), &mut buf).unwrap();
        let mut reader = csv::Reader::from_reader(buf.as_slice());
        assert_eq!(reader.headers().unwrap().len(), 4);
        let rows: Vec<csv::StringRecord> = reader.records().map(Result::unwrap).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(&rows[0][1], "12 Main St, Houston");
        assert_eq!(&rows[0][3], "");
    }

    #[test]
    fn empty_dataset_writes_nothing() {
        let mut buf = Vec::new();
        write_csv(&[], &mut buf).unwrap();
        assert!(buf.is_empty());
    }

    #[test]
    fn ndjson_one_object_per_line() {
        let mut buf = Vec::new();
        write_ndjson(&sample_records(), &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        let v: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(v["id"], 1);
        assert_eq!(v["total_incurred"], 1500);
        assert_eq!(v["date_closed"], "");
        assert!(lines[0].starts_with(r#"{"id":1,"insured_address""#));
    }

    #[test]
    fn format_parsing() {
        assert_eq!("CSV".parse::<OutputFormat>().unwrap(), OutputFormat::Csv);
        assert_eq!("jsonl".parse::<OutputFormat>().unwrap(), OutputFormat::Ndjson);
        assert!(matches!(
            "xlsx".parse::<OutputFormat>(),
            Err(GeneratorError::InvalidArgument(_))
        ));
    }

    #[test]
    fn unwritable_path_is_an_io_error() {
        let err = write_file(&sample_records(), OutputFormat::Csv, "/nonexistent-dir/claims.csv")
            .unwrap_err();
        assert!(matches!(err, GeneratorError::Io(_)));
    }

    #[test]
    fn read_back_restores_labels_and_blanks() {
        let mut buf = Vec::new();
        write_csv(&sample_records(), &mut buf).unwrap();
        let records = read_csv(buf.as_slice()).unwrap();
        assert_eq!(records.len(), 2);
        assert!(records[0].labels().eq(sample_records()[0].labels()));
        assert_eq!(records[0].get("date_closed"), Some(&FieldValue::Missing));
        assert_eq!(records[1].get("total_incurred").and_then(FieldValue::as_integer), None);
        assert_eq!(records[0].get("total_incurred").and_then(FieldValue::as_integer), Some(1500));
    }
}
