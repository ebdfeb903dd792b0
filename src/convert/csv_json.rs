use crate::convert::ConvertError;
use serde_json::{Map, Value};

/// Convert CSV text into an array of JSON records
///
/// The first record is the header row; every following record becomes an
/// object mapping header names to trimmed cell values, in row order.
/// Records with fewer cells than the header are skipped rather than
/// rejected, matching the tolerant handling expected of exported data sets.
///
/// # Errors
/// `ConvertError::Csv` when the input is not parseable CSV.
pub fn csv_to_records(input: &str) -> Result<Vec<Value>, ConvertError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(input.as_bytes());

    let headers = reader.headers()?.clone();

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row?;

        // Short rows cannot fill every column; skip them
        if row.len() < headers.len() {
            continue;
        }

        let mut record = Map::new();
        for (name, cell) in headers.iter().zip(row.iter()) {
            record.insert(name.to_string(), Value::String(cell.to_string()));
        }
        records.push(Value::Object(record));
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_rows_keyed_by_header() {
        let input = "name,city\nAlice,Oslo\nBob,Turku\n";

        let records = csv_to_records(input).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0], json!({"name": "Alice", "city": "Oslo"}));
        assert_eq!(records[1], json!({"name": "Bob", "city": "Turku"}));
    }

    #[test]
    fn test_cells_are_trimmed() {
        let input = "name,city\n  Alice , Oslo \n";

        let records = csv_to_records(input).unwrap();
        assert_eq!(records[0], json!({"name": "Alice", "city": "Oslo"}));
    }

    #[test]
    fn test_short_rows_skipped() {
        let input = "name,city\nAlice,Oslo\nBob\n";

        let records = csv_to_records(input).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["name"], "Alice");
    }

    #[test]
    fn test_empty_input_produces_no_records() {
        let records = csv_to_records("").unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_header_only_input_produces_no_records() {
        let records = csv_to_records("name,city\n").unwrap();
        assert!(records.is_empty());
    }
}
